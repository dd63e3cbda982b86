use std::any::{type_name, Any, TypeId};
use std::rc::Rc;
use std::sync::Arc;

use crate::error::{CloneError, CloneResult};
use crate::session::CloneSession;

/// A value that can be copied by an [`crate::ObjectGraphCloner`].
///
/// Plain types copy their fields with `clone_with`. Shared references
/// (`Rc`, `Arc`) consult the session's identity map so that a node reached
/// twice is copied once and cycles terminate.
pub trait DeepClone: Sized {
    /// Values of this type never change; shared references to them are
    /// returned as-is.
    const IMMUTABLE: bool = false;

    /// `true` for shared-reference types.
    const SHARED: bool = false;

    fn clone_with(&self, session: &mut CloneSession<'_>) -> CloneResult<Self>;

    /// An empty placeholder that can be registered before its contents are
    /// copied. Only interior-mutable cells return one.
    fn shell() -> Option<Self> {
        None
    }

    /// Overwrite a shell with a copy of `source`.
    fn fill(&self, source: &Self, session: &mut CloneSession<'_>) -> CloneResult<()> {
        let _ = (source, session);
        Err(CloneError::NotACell {
            type_name: type_name::<Self>(),
        })
    }

    /// Type checked against the ignore-set. Cells report their contents.
    fn object_type() -> TypeId
    where
        Self: 'static,
    {
        TypeId::of::<Self>()
    }
}

/// A reference whose pointee has an identity.
pub trait SharedRef {
    fn addr(&self) -> usize;

    /// A weak handle to the pointee. While it lives the allocation is not
    /// released, so `addr` cannot be handed to another value.
    fn hold(&self) -> Rc<dyn Any>;
}

impl<T: ?Sized + 'static> SharedRef for Rc<T> {
    fn addr(&self) -> usize {
        Rc::as_ptr(self).cast::<()>() as usize
    }

    fn hold(&self) -> Rc<dyn Any> {
        Rc::new(Rc::downgrade(self))
    }
}

impl<T: ?Sized + 'static> SharedRef for Arc<T> {
    fn addr(&self) -> usize {
        Arc::as_ptr(self).cast::<()>() as usize
    }

    fn hold(&self) -> Rc<dyn Any> {
        Rc::new(Arc::downgrade(self))
    }
}

/// Implement [`DeepClone`] for a struct by copying the listed fields.
///
/// ```
/// use ark_clone::{deep_clone, deep_clone_struct};
///
/// struct Point { x: i32, label: String }
/// deep_clone_struct!(Point { x, label });
///
/// let p = Point { x: 1, label: "a".into() };
/// let q = deep_clone(&p).unwrap();
/// assert_eq!(q.label, "a");
/// ```
///
/// Adding `with shell` also lets the struct sit behind an `Rc`/`Arc` on a
/// cycle. The struct must be `Default` and every listed field must be a
/// cell (`RefCell`, `Mutex`, `RwLock`):
///
/// ```
/// use std::cell::RefCell;
/// use std::rc::Rc;
/// use ark_clone::{deep_clone, deep_clone_struct};
///
/// #[derive(Default)]
/// struct Link { next: RefCell<Option<Rc<Link>>> }
/// deep_clone_struct!(Link { next } with shell);
///
/// let a = Rc::new(Link::default());
/// *a.next.borrow_mut() = Some(a.clone());
/// let b = deep_clone(&a).unwrap();
/// assert!(Rc::ptr_eq(b.next.borrow().as_ref().unwrap(), &b));
/// # a.next.borrow_mut().take();
/// # b.next.borrow_mut().take();
/// ```
#[macro_export]
macro_rules! deep_clone_struct {
    ($ty:ty { $($field:ident),* $(,)? } with shell) => {
        impl $crate::DeepClone for $ty {
            fn clone_with(
                &self,
                session: &mut $crate::CloneSession<'_>,
            ) -> $crate::CloneResult<Self> {
                Ok(Self {
                    $($field: $crate::DeepClone::clone_with(&self.$field, session)?,)*
                })
            }

            fn shell() -> ::std::option::Option<Self> {
                Some(<Self as ::std::default::Default>::default())
            }

            fn fill(
                &self,
                source: &Self,
                session: &mut $crate::CloneSession<'_>,
            ) -> $crate::CloneResult<()> {
                $($crate::DeepClone::fill(&self.$field, &source.$field, session)?;)*
                Ok(())
            }
        }
    };
    ($ty:ty { $($field:ident),* $(,)? }) => {
        impl $crate::DeepClone for $ty {
            fn clone_with(
                &self,
                session: &mut $crate::CloneSession<'_>,
            ) -> $crate::CloneResult<Self> {
                Ok(Self {
                    $($field: $crate::DeepClone::clone_with(&self.$field, session)?,)*
                })
            }
        }
    };
}

/// Implement [`DeepClone`] for `Clone` types whose values never change,
/// such as field-less enums.
#[macro_export]
macro_rules! deep_clone_immutable {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::DeepClone for $ty {
                const IMMUTABLE: bool = true;

                fn clone_with(
                    &self,
                    _session: &mut $crate::CloneSession<'_>,
                ) -> $crate::CloneResult<Self> {
                    Ok(::std::clone::Clone::clone(self))
                }
            }
        )+
    };
}
