use std::any::{Any, TypeId};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::PathBuf;
use std::rc::Rc;

use bytes::Bytes;
use regex::Regex;
use url::Url;
use uuid::Uuid;

use crate::error::CloneResult;
use crate::session::{CloneMode, CloneSession};
use crate::traits::{DeepClone, SharedRef};

fn default_ignored_types() -> HashSet<TypeId> {
    [
        TypeId::of::<bool>(),
        TypeId::of::<char>(),
        TypeId::of::<i8>(),
        TypeId::of::<i16>(),
        TypeId::of::<i32>(),
        TypeId::of::<i64>(),
        TypeId::of::<i128>(),
        TypeId::of::<isize>(),
        TypeId::of::<u8>(),
        TypeId::of::<u16>(),
        TypeId::of::<u32>(),
        TypeId::of::<u64>(),
        TypeId::of::<u128>(),
        TypeId::of::<usize>(),
        TypeId::of::<f32>(),
        TypeId::of::<f64>(),
        TypeId::of::<String>(),
        TypeId::of::<PathBuf>(),
        TypeId::of::<Uuid>(),
        TypeId::of::<Url>(),
        TypeId::of::<Regex>(),
        TypeId::of::<Bytes>(),
    ]
    .into_iter()
    .collect()
}

/// Copies object graphs, preserving shared-reference topology.
///
/// Shared nodes whose type is in the ignore-set, or that were registered
/// with [`Self::ignore_instance`], are never copied. An ignored instance is
/// held weakly: dropping it does not leave its address behind for an
/// unrelated node to match.
#[derive(Clone)]
pub struct ObjectGraphCloner {
    ignored_types: HashSet<TypeId>,
    ignored_instances: HashMap<(usize, TypeId), Rc<dyn Any>>,
}

impl ObjectGraphCloner {
    pub fn new() -> Self {
        Self {
            ignored_types: default_ignored_types(),
            ignored_instances: HashMap::new(),
        }
    }

    /// Never copy shared nodes holding a `T`.
    pub fn ignore_type<T: ?Sized + 'static>(&mut self) -> &mut Self {
        self.ignored_types.insert(TypeId::of::<T>());
        self
    }

    pub fn is_ignored_type<T: ?Sized + 'static>(&self) -> bool {
        self.ignored_types.contains(&TypeId::of::<T>())
    }

    /// Never copy this particular shared node.
    pub fn ignore_instance<P: SharedRef + 'static>(&mut self, instance: &P) -> &mut Self {
        self.ignored_instances
            .insert((instance.addr(), TypeId::of::<P>()), instance.hold());
        self
    }

    /// Copy `value` and every shared node reachable from it.
    pub fn deep_clone<T: DeepClone>(&self, value: &T) -> CloneResult<T> {
        self.run(CloneMode::Deep, value)
    }

    /// Copy `value` only; shared nodes below it are reused.
    pub fn shallow_clone<T: DeepClone>(&self, value: &T) -> CloneResult<T> {
        self.run(CloneMode::Shallow, value)
    }

    fn run<T: DeepClone>(&self, mode: CloneMode, value: &T) -> CloneResult<T> {
        let mut session = CloneSession::new(mode, T::SHARED, &self.ignored_types, &self.ignored_instances);
        let copy = value.clone_with(&mut session)?;
        tracing::trace!(
            ty = std::any::type_name::<T>(),
            ?mode,
            copied = session.copied(),
            "cloned object graph"
        );
        Ok(copy)
    }
}

impl fmt::Debug for ObjectGraphCloner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectGraphCloner")
            .field("ignored_types", &self.ignored_types.len())
            .field("ignored_instances", &self.ignored_instances.len())
            .finish()
    }
}

impl Default for ObjectGraphCloner {
    fn default() -> Self {
        Self::new()
    }
}

/// [`ObjectGraphCloner::deep_clone`] with the default ignore-set.
pub fn deep_clone<T: DeepClone>(value: &T) -> CloneResult<T> {
    ObjectGraphCloner::new().deep_clone(value)
}

/// [`ObjectGraphCloner::shallow_clone`] with the default ignore-set.
pub fn shallow_clone<T: DeepClone>(value: &T) -> CloneResult<T> {
    ObjectGraphCloner::new().shallow_clone(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::{BTreeMap, HashMap};
    use std::rc::Rc;
    use std::sync::{Arc, Mutex, RwLock};

    use crate::error::CloneError;
    use crate::{deep_clone_immutable, deep_clone_struct};

    #[derive(Debug, Default)]
    struct Node {
        label: String,
        next: Option<Rc<RefCell<Node>>>,
    }
    deep_clone_struct!(Node { label, next });

    #[derive(Debug, Default)]
    struct SyncNode {
        label: String,
        children: Vec<Arc<Mutex<SyncNode>>>,
    }
    deep_clone_struct!(SyncNode { label, children });

    #[derive(Default)]
    struct Link {
        next: RefCell<Option<Rc<Link>>>,
    }
    deep_clone_struct!(Link { next } with shell);

    #[derive(Default)]
    struct BareLink {
        next: RefCell<Option<Rc<BareLink>>>,
    }
    deep_clone_struct!(BareLink { next });

    struct Holder {
        name: String,
        child: Rc<RefCell<Node>>,
        twice: (Rc<RefCell<Node>>, Rc<RefCell<Node>>),
    }
    deep_clone_struct!(Holder { name, child, twice });

    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    enum Color {
        Red,
    }
    deep_clone_immutable!(Color);

    fn node(label: &str) -> Rc<RefCell<Node>> {
        Rc::new(RefCell::new(Node {
            label: label.to_string(),
            next: None,
        }))
    }

    fn next_of(n: &Rc<RefCell<Node>>) -> Rc<RefCell<Node>> {
        n.borrow().next.clone().unwrap()
    }

    // -----------------------------------------------------------------------
    // Cycles and topology
    // -----------------------------------------------------------------------

    #[test]
    fn cycle_terminates_and_keeps_topology() {
        let a = node("a");
        let b = node("b");
        a.borrow_mut().next = Some(b.clone());
        b.borrow_mut().next = Some(a.clone());

        let a2 = deep_clone(&a).unwrap();
        assert!(!Rc::ptr_eq(&a, &a2));
        let b2 = next_of(&a2);
        assert!(!Rc::ptr_eq(&b, &b2));
        assert!(Rc::ptr_eq(&next_of(&b2), &a2));
        assert_eq!(a2.borrow().label, "a");
        assert_eq!(b2.borrow().label, "b");

        // Break the cycles so the test does not leak.
        a.borrow_mut().next = None;
        a2.borrow_mut().next = None;
    }

    #[test]
    fn self_loop() {
        let a = node("self");
        a.borrow_mut().next = Some(a.clone());
        let a2 = deep_clone(&a).unwrap();
        assert!(Rc::ptr_eq(&next_of(&a2), &a2));
        a.borrow_mut().next = None;
        a2.borrow_mut().next = None;
    }

    #[test]
    fn cycle_through_plain_rc_with_shell() {
        let a = Rc::new(Link::default());
        let b = Rc::new(Link::default());
        *a.next.borrow_mut() = Some(b.clone());
        *b.next.borrow_mut() = Some(a.clone());

        let a2 = deep_clone(&a).unwrap();
        let b2 = a2.next.borrow().clone().unwrap();
        assert!(!Rc::ptr_eq(&a2, &a));
        assert!(!Rc::ptr_eq(&b2, &b));
        assert!(Rc::ptr_eq(b2.next.borrow().as_ref().unwrap(), &a2));

        a.next.borrow_mut().take();
        a2.next.borrow_mut().take();
    }

    #[test]
    fn cycle_without_shell_is_an_error() {
        let a = Rc::new(BareLink::default());
        let b = Rc::new(BareLink::default());
        *a.next.borrow_mut() = Some(b.clone());
        *b.next.borrow_mut() = Some(a.clone());

        let result = deep_clone(&a);
        assert!(matches!(result, Err(CloneError::Cycle { .. })));

        // The same shape without the loop still copies.
        b.next.borrow_mut().take();
        let copy = deep_clone(&a).unwrap();
        assert!(copy.next.borrow().is_some());
        a.next.borrow_mut().take();
    }

    #[test]
    fn diamond_is_copied_once() {
        let shared = node("shared");
        let holder = Holder {
            name: "h".into(),
            child: node("c"),
            twice: (shared.clone(), shared.clone()),
        };
        let copy = deep_clone(&holder).unwrap();
        assert!(Rc::ptr_eq(&copy.twice.0, &copy.twice.1));
        assert!(!Rc::ptr_eq(&copy.twice.0, &shared));
    }

    #[test]
    fn arc_mutex_cycle() {
        let root = Arc::new(Mutex::new(SyncNode {
            label: "root".into(),
            children: Vec::new(),
        }));
        let child = Arc::new(Mutex::new(SyncNode {
            label: "child".into(),
            children: vec![root.clone()],
        }));
        root.lock().unwrap().children.push(child);

        let copy = deep_clone(&root).unwrap();
        let child_copy = copy.lock().unwrap().children[0].clone();
        let back = child_copy.lock().unwrap().children[0].clone();
        assert!(Arc::ptr_eq(&back, &copy));
        assert!(!Arc::ptr_eq(&copy, &root));

        root.lock().unwrap().children.clear();
        copy.lock().unwrap().children.clear();
    }

    #[test]
    fn arc_rwlock_values() {
        let shared = Arc::new(RwLock::new(vec![1u32, 2, 3]));
        let copy = deep_clone(&shared).unwrap();
        copy.write().unwrap().push(4);
        assert_eq!(shared.read().unwrap().len(), 3);
    }

    // -----------------------------------------------------------------------
    // Shallow vs deep
    // -----------------------------------------------------------------------

    #[test]
    fn shallow_shares_children_deep_copies_them() {
        let holder = Holder {
            name: "h".into(),
            child: node("c"),
            twice: (node("x"), node("y")),
        };
        let shallow = shallow_clone(&holder).unwrap();
        assert!(Rc::ptr_eq(&shallow.child, &holder.child));

        let deep = deep_clone(&holder).unwrap();
        assert!(!Rc::ptr_eq(&deep.child, &holder.child));
        assert_eq!(deep.child.borrow().label, "c");
    }

    #[test]
    fn shallow_copies_a_shared_root() {
        let a = node("a");
        let b = node("b");
        a.borrow_mut().next = Some(b.clone());
        let copy = shallow_clone(&a).unwrap();
        assert!(!Rc::ptr_eq(&copy, &a));
        assert!(Rc::ptr_eq(&next_of(&copy), &b));
    }

    // -----------------------------------------------------------------------
    // Ignoring
    // -----------------------------------------------------------------------

    #[test]
    fn ignored_types_return_the_same_reference() {
        let s = Rc::new(String::from("same"));
        let copy = deep_clone(&s).unwrap();
        assert!(Rc::ptr_eq(&s, &copy));

        let c = Arc::new(Color::Red);
        assert!(Arc::ptr_eq(&c, &deep_clone(&c).unwrap()));
    }

    #[test]
    fn user_ignored_type_and_instance() {
        let a = node("a");
        let mut cloner = ObjectGraphCloner::new();
        cloner.ignore_type::<Node>();
        assert!(cloner.is_ignored_type::<Node>());
        assert!(Rc::ptr_eq(&a, &cloner.deep_clone(&a).unwrap()));

        let b = node("b");
        let c = node("c");
        let mut cloner = ObjectGraphCloner::new();
        cloner.ignore_instance(&b);
        assert!(Rc::ptr_eq(&b, &cloner.deep_clone(&b).unwrap()));
        assert!(!Rc::ptr_eq(&c, &cloner.deep_clone(&c).unwrap()));
    }

    #[test]
    fn dropped_ignored_instance_matches_nothing() {
        let mut cloner = ObjectGraphCloner::new();
        let gone = node("gone");
        cloner.ignore_instance(&gone);
        drop(gone);

        for i in 0..64 {
            let fresh = node(&i.to_string());
            let copy = cloner.deep_clone(&fresh).unwrap();
            assert!(!Rc::ptr_eq(&fresh, &copy));
        }
    }

    #[test]
    fn ignored_instances_by_pointer_kind() {
        let shared = Arc::new(Mutex::new(SyncNode::default()));
        let mut cloner = ObjectGraphCloner::new();
        cloner.ignore_instance(&shared);
        assert!(Arc::ptr_eq(&shared, &cloner.deep_clone(&shared).unwrap()));

        let other = node("other");
        let mut cloner = ObjectGraphCloner::new();
        cloner.ignore_instance(&other);
        let holder = Holder {
            name: "h".into(),
            child: other.clone(),
            twice: (node("x"), node("y")),
        };
        let copy = cloner.deep_clone(&holder).unwrap();
        assert!(Rc::ptr_eq(&copy.child, &other));
        assert!(!Rc::ptr_eq(&copy.twice.0, &holder.twice.0));
    }

    // -----------------------------------------------------------------------
    // Values and errors
    // -----------------------------------------------------------------------

    #[test]
    fn containers_are_copied() {
        let mut map = HashMap::new();
        map.insert("k".to_string(), vec![Some(1u8), None]);
        let mut tree = BTreeMap::new();
        tree.insert(1u32, ([1u8, 2], Box::new("x".to_string())));
        let value = (map, tree, Url::parse("https://example.com/a").unwrap());
        let copy = deep_clone(&value).unwrap();
        assert_eq!(copy.0, value.0);
        assert_eq!(copy.1, value.1);
        assert_eq!(copy.2, value.2);
    }

    #[test]
    fn borrowed_cell_aborts_the_clone() {
        let a = node("a");
        let _guard = a.borrow_mut();
        let err = deep_clone(&a).unwrap_err();
        assert!(matches!(err, CloneError::Borrowed { .. }));
    }

    #[test]
    fn poisoned_lock_aborts_the_clone() {
        let shared = Arc::new(Mutex::new(SyncNode::default()));
        let poison = Arc::clone(&shared);
        let _ = std::thread::spawn(move || {
            let _guard = poison.lock().unwrap();
            panic!("poison the lock");
        })
        .join();
        let err = deep_clone(&shared).unwrap_err();
        assert!(matches!(err, CloneError::Poisoned { .. }));
    }
}
