use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError};

type Hook = Box<dyn FnOnce() + Send>;

/// Handle returned by [`ShutdownHooks::register`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HookId(u64);

/// Callbacks to run when the host process is about to exit.
///
/// Each hook runs at most once: [`ShutdownHooks::run`] drains the registry
/// before invoking anything, so a hook may deregister itself (or others)
/// without deadlocking and a later `run` finds nothing left.
pub struct ShutdownHooks {
    next_id: AtomicU64,
    hooks: Mutex<BTreeMap<HookId, Hook>>,
}

impl ShutdownHooks {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            hooks: Mutex::new(BTreeMap::new()),
        }
    }

    pub fn register<F>(&self, hook: F) -> HookId
    where
        F: FnOnce() + Send + 'static,
    {
        let id = HookId(self.next_id.fetch_add(1, Ordering::SeqCst));
        self.lock().insert(id, Box::new(hook));
        log::debug!("Registered shutdown hook {:?}, pending: {}", id, self.pending());
        id
    }

    /// Remove a hook. Returns false if it already ran or was never registered.
    pub fn deregister(&self, id: HookId) -> bool {
        let removed = self.lock().remove(&id).is_some();
        if removed {
            log::debug!("Deregistered shutdown hook {:?}", id);
        }
        removed
    }

    /// Run every pending hook in registration order and return how many ran.
    pub fn run(&self) -> usize {
        let hooks = std::mem::take(&mut *self.lock());
        let count = hooks.len();
        if count > 0 {
            log::info!("Running {} shutdown hook(s)", count);
        }
        for (_, hook) in hooks {
            hook();
        }
        count
    }

    pub fn pending(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<HookId, Hook>> {
        self.hooks.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for ShutdownHooks {
    fn default() -> Self {
        Self::new()
    }
}

/// Global registry used by controllers unless they are given another one
static SHUTDOWN_HOOKS: OnceLock<ShutdownHooks> = OnceLock::new();

pub fn shutdown_hooks() -> &'static ShutdownHooks {
    SHUTDOWN_HOOKS.get_or_init(ShutdownHooks::new)
}

/// Run the global hooks. Call this from exit paths and signal handlers.
pub fn run_hooks() -> usize {
    shutdown_hooks().run()
}

/// Runs the global hooks when dropped.
///
/// Hold one in `main` so that returning from it, or unwinding out of it,
/// still stops any player that is left running.
#[must_use = "the hooks run when the guard is dropped"]
pub struct ShutdownGuard {
    _private: (),
}

pub fn guard() -> ShutdownGuard {
    ShutdownGuard { _private: () }
}

impl Drop for ShutdownGuard {
    fn drop(&mut self) {
        run_hooks();
    }
}
