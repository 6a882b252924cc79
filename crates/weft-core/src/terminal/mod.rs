//! Terminal backends.

pub mod crossterm_backend;
pub mod test_backend;
mod traits;

pub use crossterm_backend::CrosstermBackend;
pub use test_backend::{TestBackend, TestOutput};
pub use traits::Backend;

use std::sync::{Arc, Mutex, MutexGuard};

/// A backend shared between the tasks that write to the terminal.
///
/// The mutex serializes write+flush pairs from the diff renderer and
/// the cursor manager.
pub type SharedBackend = Arc<Mutex<Box<dyn Backend>>>;

/// Wrap a backend into a shared handle.
pub fn shared(backend: Box<dyn Backend>) -> SharedBackend {
    Arc::new(Mutex::new(backend))
}

/// Lock the shared backend, recovering from a poisoned mutex.
pub(crate) fn lock(backend: &SharedBackend) -> MutexGuard<'_, Box<dyn Backend>> {
    backend.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}
