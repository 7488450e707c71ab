pub mod controller;
pub mod shutdown;

pub use controller::{PlaybackController, PlaybackOptions, PlaybackState};
pub use shutdown::{guard, run_hooks, shutdown_hooks, HookId, ShutdownGuard, ShutdownHooks};
