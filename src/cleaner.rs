// secret-edit - Cleaner Module
//
// This module handles cleanup operations including:
// - Removing the edit session's temporary file
// - Signal handling (SIGINT, SIGTERM)
// - Cleanup on panic (release builds abort, so destructors never run)
//
// The main flow and the interrupt watcher share one CleanupGuard. Whichever
// reaches it first removes the file; every later call is a no-op.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::JoinHandle;

#[derive(Debug, Default)]
struct GuardState {
    path: Option<PathBuf>,
    cleaned: bool,
}

/// Shared handle on the temp file that must not outlive the process.
#[derive(Debug, Clone, Default)]
pub struct CleanupGuard {
    state: Arc<Mutex<GuardState>>,
}

impl CleanupGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the file to remove on cleanup.
    ///
    /// Arming an already cleaned guard removes the new file immediately, so
    /// a file created after an interrupt still cannot survive.
    pub fn arm(&self, path: PathBuf) {
        let mut state = self.lock();
        if state.cleaned {
            drop(state);
            let _ = remove_file(&path);
        } else {
            state.path = Some(path);
        }
    }

    /// The armed path, if cleanup has not run yet.
    pub fn path(&self) -> Option<PathBuf> {
        self.lock().path.clone()
    }

    pub fn is_cleaned(&self) -> bool {
        self.lock().cleaned
    }

    fn lock(&self) -> MutexGuard<'_, GuardState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Remove the armed file.
    ///
    /// This function is idempotent - safe to call multiple times and from
    /// multiple threads. Only the first call touches the filesystem.
    pub fn cleanup(&self) {
        let path = {
            let mut state = self.lock();
            if state.cleaned {
                return;
            }
            state.cleaned = true;
            state.path.take()
        };

        let Some(path) = path else {
            tracing::debug!("nothing to clean up");
            return;
        };

        tracing::debug!(path = %path.display(), "cleaning up");
        if let Err(e) = remove_file(&path) {
            eprintln!("⚠️  Error cleaning up temporary file {}: {}", path.display(), e);
        }
    }
}

/// Remove a file, treating "already gone" as success.
fn remove_file(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
        _ => Ok(()),
    }
}

/// Receiving end of the process's termination signals.
pub struct Interrupts {
    rx: Receiver<()>,
}

impl Interrupts {
    /// Wrap an existing channel. Used by tests to simulate a signal.
    pub fn from_receiver(rx: Receiver<()>) -> Self {
        Self { rx }
    }
}

/// Setup signal handlers for SIGINT (Ctrl+C) and SIGTERM.
///
/// The handler only forwards into a channel; the actual work happens in the
/// thread started by [`watch`]. Can be called once per process.
///
/// # Example
/// ```no_run
/// use secret_edit::cleaner::{install_signal_handler, watch, CleanupGuard};
///
/// let guard = CleanupGuard::new();
/// let interrupts = install_signal_handler().unwrap();
/// watch(interrupts, guard.clone(), |code| std::process::exit(code));
/// ```
pub fn install_signal_handler() -> Result<Interrupts, ctrlc::Error> {
    let (tx, rx) = mpsc::channel();
    ctrlc::set_handler(move || {
        let _ = tx.send(());
    })?;
    tracing::debug!("signal handlers registered");
    Ok(Interrupts { rx })
}

/// Setup panic handler.
///
/// A release build aborts on panic, so no destructor runs. The hook removes
/// the armed file first and then hands over to the previously installed
/// hook, which prints the panic message.
pub fn install_panic_hook(guard: CleanupGuard) {
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        guard.cleanup();
        previous(panic_info);
    }));
    tracing::debug!("panic hook registered");
}

/// Spawn the interrupt watcher.
///
/// On the first signal the watcher runs `guard.cleanup()` and then calls
/// `exit(1)`, pre-empting whatever the main flow is doing. If every sender
/// is dropped without a signal the watcher simply ends.
pub fn watch<F>(interrupts: Interrupts, guard: CleanupGuard, exit: F) -> JoinHandle<()>
where
    F: FnOnce(i32) + Send + 'static,
{
    std::thread::spawn(move || {
        if interrupts.rx.recv().is_ok() {
            eprintln!("\n🛑 Interrupted, cleaning up...");
            guard.cleanup();
            exit(1);
        }
    })
}
