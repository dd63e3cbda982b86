use std::any::{type_name, Any, TypeId};
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use crate::error::{CloneError, CloneResult};

/// Whether shared references below the root are copied or reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CloneMode {
    Deep,
    Shallow,
}

/// State of one clone call: the identity map plus the cloner's ignore lists.
pub struct CloneSession<'a> {
    mode: CloneMode,
    depth: usize,
    seen: HashMap<(usize, TypeId), Box<dyn Any>>,
    /// Nodes whose contents are being copied and that have no shell yet.
    in_progress: HashSet<(usize, TypeId)>,
    ignored_types: &'a HashSet<TypeId>,
    ignored_instances: &'a HashMap<(usize, TypeId), Rc<dyn Any>>,
}

impl<'a> CloneSession<'a> {
    pub(crate) fn new(
        mode: CloneMode,
        root_is_shared: bool,
        ignored_types: &'a HashSet<TypeId>,
        ignored_instances: &'a HashMap<(usize, TypeId), Rc<dyn Any>>,
    ) -> Self {
        Self {
            mode,
            // A non-shared root counts as already entered, so references it
            // holds directly are "below the root".
            depth: usize::from(!root_is_shared),
            seen: HashMap::new(),
            in_progress: HashSet::new(),
            ignored_types,
            ignored_instances,
        }
    }

    pub fn mode(&self) -> CloneMode {
        self.mode
    }

    /// Number of distinct shared nodes copied so far.
    pub fn copied(&self) -> usize {
        self.seen.len()
    }

    /// Decide whether the shared node at `addr`, held through a pointer of
    /// type `pointer`, is returned by reference.
    pub fn should_share(&self, addr: usize, pointer: TypeId, object_type: TypeId, immutable: bool) -> bool {
        immutable
            || self.ignored_types.contains(&object_type)
            || self.ignored_instances.contains_key(&(addr, pointer))
            || (self.mode == CloneMode::Shallow && self.depth > 0)
    }

    /// Mark the node at `addr` as being copied. Returns `false` when it
    /// already is, i.e. the graph loops back through a node with no shell.
    pub fn begin(&mut self, addr: usize, pointer: TypeId) -> bool {
        self.in_progress.insert((addr, pointer))
    }

    pub fn finish(&mut self, addr: usize, pointer: TypeId) {
        self.in_progress.remove(&(addr, pointer));
    }

    /// The clone already made for the node at `addr`, if any.
    pub fn lookup<P: Clone + 'static>(&self, addr: usize) -> CloneResult<Option<P>> {
        match self.seen.get(&(addr, TypeId::of::<P>())) {
            None => Ok(None),
            Some(existing) => existing
                .downcast_ref::<P>()
                .cloned()
                .map(Some)
                .ok_or(CloneError::TypeMismatch {
                    type_name: type_name::<P>(),
                }),
        }
    }

    /// Record `copy` as the clone of the node at `addr`.
    pub fn register<P: Clone + 'static>(&mut self, addr: usize, copy: &P) {
        self.seen.insert((addr, TypeId::of::<P>()), Box::new(copy.clone()));
    }

    /// Run `f` one shared level deeper.
    pub fn descend<R>(&mut self, f: impl FnOnce(&mut Self) -> CloneResult<R>) -> CloneResult<R> {
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_after_register() {
        let types = HashSet::new();
        let instances = HashMap::new();
        let mut session = CloneSession::new(CloneMode::Deep, true, &types, &instances);
        assert!(session.lookup::<std::rc::Rc<i32>>(7).unwrap().is_none());
        let rc = std::rc::Rc::new(5);
        session.register(7, &rc);
        let found = session.lookup::<std::rc::Rc<i32>>(7).unwrap().unwrap();
        assert!(std::rc::Rc::ptr_eq(&rc, &found));
        assert_eq!(session.copied(), 1);
        // Same address, different pointer type: separate slot.
        assert!(session.lookup::<std::rc::Rc<u8>>(7).unwrap().is_none());
    }

    #[test]
    fn shallow_shares_only_below_root() {
        let types = HashSet::new();
        let instances = HashMap::new();
        let mut session = CloneSession::new(CloneMode::Shallow, true, &types, &instances);
        let id = TypeId::of::<i32>();
        let ptr = TypeId::of::<Rc<i32>>();
        assert!(!session.should_share(1, ptr, id, false));
        let inner = session.descend(|s| Ok(s.should_share(1, ptr, id, false))).unwrap();
        assert!(inner);

        let session = CloneSession::new(CloneMode::Shallow, false, &types, &instances);
        assert!(session.should_share(1, ptr, id, false));
    }

    #[test]
    fn ignored_instance_is_keyed_by_pointer_type() {
        let types = HashSet::new();
        let mut instances: HashMap<(usize, TypeId), Rc<dyn Any>> = HashMap::new();
        instances.insert((1, TypeId::of::<Rc<i32>>()), Rc::new(()));
        let session = CloneSession::new(CloneMode::Deep, true, &types, &instances);
        let id = TypeId::of::<i32>();
        assert!(session.should_share(1, TypeId::of::<Rc<i32>>(), id, false));
        assert!(!session.should_share(1, TypeId::of::<std::sync::Arc<i32>>(), id, false));
    }

    #[test]
    fn begin_reports_reentry() {
        let types = HashSet::new();
        let instances = HashMap::new();
        let mut session = CloneSession::new(CloneMode::Deep, true, &types, &instances);
        let ptr = TypeId::of::<Rc<u8>>();
        assert!(session.begin(3, ptr));
        assert!(!session.begin(3, ptr));
        session.finish(3, ptr);
        assert!(session.begin(3, ptr));
    }
}
