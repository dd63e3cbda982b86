//! Shared references and interior-mutable cells.

use std::any::{type_name, TypeId};
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::{Arc, Mutex, RwLock};

use crate::error::{CloneError, CloneResult};
use crate::session::CloneSession;
use crate::traits::{DeepClone, SharedRef};

macro_rules! impl_shared_pointer {
    ($ptr:ident) => {
        impl<T: DeepClone + 'static> DeepClone for $ptr<T> {
            const SHARED: bool = true;

            fn clone_with(&self, session: &mut CloneSession<'_>) -> CloneResult<Self> {
                let addr = self.addr();
                let pointer = TypeId::of::<Self>();
                if session.should_share(addr, pointer, T::object_type(), T::IMMUTABLE) {
                    return Ok($ptr::clone(self));
                }
                if let Some(existing) = session.lookup::<Self>(addr)? {
                    return Ok(existing);
                }

                session.descend(|session| match T::shell() {
                    // Register the empty cell first so back-references
                    // inside the contents resolve to it.
                    Some(shell) => {
                        let copy = $ptr::new(shell);
                        session.register(addr, &copy);
                        T::fill(&copy, self, session)?;
                        Ok(copy)
                    }
                    // Without a shell the node can only be registered once
                    // its contents are done, so a loop back to it is fatal.
                    None => {
                        if !session.begin(addr, pointer) {
                            return Err(CloneError::Cycle {
                                type_name: type_name::<T>(),
                            });
                        }
                        let contents = (**self).clone_with(session);
                        session.finish(addr, pointer);
                        let copy = $ptr::new(contents?);
                        session.register(addr, &copy);
                        Ok(copy)
                    }
                })
            }
        }
    };
}

impl_shared_pointer!(Rc);
impl_shared_pointer!(Arc);

impl<T: DeepClone + Default + 'static> DeepClone for RefCell<T> {
    fn clone_with(&self, session: &mut CloneSession<'_>) -> CloneResult<Self> {
        let guard = self.try_borrow().map_err(|_| borrowed::<T>())?;
        Ok(RefCell::new(guard.clone_with(session)?))
    }

    fn shell() -> Option<Self> {
        Some(RefCell::new(T::default()))
    }

    fn fill(&self, source: &Self, session: &mut CloneSession<'_>) -> CloneResult<()> {
        let value = {
            let guard = source.try_borrow().map_err(|_| borrowed::<T>())?;
            guard.clone_with(session)?
        };
        *self.try_borrow_mut().map_err(|_| borrowed::<T>())? = value;
        Ok(())
    }

    fn object_type() -> std::any::TypeId {
        T::object_type()
    }
}

impl<T: DeepClone + Default + 'static> DeepClone for Mutex<T> {
    fn clone_with(&self, session: &mut CloneSession<'_>) -> CloneResult<Self> {
        let guard = self.lock().map_err(|_| poisoned::<T>())?;
        Ok(Mutex::new(guard.clone_with(session)?))
    }

    fn shell() -> Option<Self> {
        Some(Mutex::new(T::default()))
    }

    fn fill(&self, source: &Self, session: &mut CloneSession<'_>) -> CloneResult<()> {
        let value = {
            let guard = source.lock().map_err(|_| poisoned::<T>())?;
            guard.clone_with(session)?
        };
        *self.lock().map_err(|_| poisoned::<T>())? = value;
        Ok(())
    }

    fn object_type() -> std::any::TypeId {
        T::object_type()
    }
}

impl<T: DeepClone + Default + 'static> DeepClone for RwLock<T> {
    fn clone_with(&self, session: &mut CloneSession<'_>) -> CloneResult<Self> {
        let guard = self.read().map_err(|_| poisoned::<T>())?;
        Ok(RwLock::new(guard.clone_with(session)?))
    }

    fn shell() -> Option<Self> {
        Some(RwLock::new(T::default()))
    }

    fn fill(&self, source: &Self, session: &mut CloneSession<'_>) -> CloneResult<()> {
        let value = {
            let guard = source.read().map_err(|_| poisoned::<T>())?;
            guard.clone_with(session)?
        };
        *self.write().map_err(|_| poisoned::<T>())? = value;
        Ok(())
    }

    fn object_type() -> std::any::TypeId {
        T::object_type()
    }
}

fn borrowed<T>() -> CloneError {
    CloneError::Borrowed {
        type_name: type_name::<T>(),
    }
}

fn poisoned<T>() -> CloneError {
    CloneError::Poisoned {
        type_name: type_name::<T>(),
    }
}
