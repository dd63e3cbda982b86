use std::cell::RefCell;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::host::HostRuntime;

thread_local! {
    static CURRENT: RefCell<Option<Arc<dyn HostRuntime>>> = const { RefCell::new(None) };
}

/// Per-thread host consulted by the `thread` resolver.
pub struct ExecutionContext;

impl ExecutionContext {
    /// Install `host` for the calling thread until the guard drops.
    /// Guards nest; dropping one restores the previous host.
    pub fn enter(host: Arc<dyn HostRuntime>) -> ContextGuard {
        let previous = CURRENT.with(|slot| slot.replace(Some(host)));
        ContextGuard {
            previous,
            _not_send: PhantomData,
        }
    }

    pub fn current() -> Option<Arc<dyn HostRuntime>> {
        CURRENT.with(|slot| slot.borrow().clone())
    }
}

/// Restores the previous thread host on drop.
#[must_use = "the host is uninstalled when the guard is dropped"]
pub struct ContextGuard {
    previous: Option<Arc<dyn HostRuntime>>,
    // Must drop on the thread that entered.
    _not_send: PhantomData<*const ()>,
}

impl Drop for ContextGuard {
    fn drop(&mut self) {
        let previous = self.previous.take();
        CURRENT.with(|slot| *slot.borrow_mut() = previous);
    }
}
