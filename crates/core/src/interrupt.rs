//! Ctrl-C handling for the whole session.
//!
//! One SIGINT handler is installed process-wide and its behaviour depends on
//! who owns the terminal:
//!
//! - While an [`InterruptGuard`] is alive a child process is running. The
//!   signal is only recorded. The child shares the terminal and still receives
//!   it, so a tunnel or remote shell stops while the menu survives.
//! - Otherwise, once [`exit_on_interrupt`] has been called, the program is
//!   waiting at a prompt. The handler prints [`FAREWELL`] and exits with
//!   status 0.
//! - With neither, the default disposition is restored and the signal
//!   re-raised.
//!
//! A handler is installed rather than `SIG_IGN`: ignored dispositions are
//! inherited across `exec`, handlers are reset to the default.

/// Printed when the user leaves, by menu choice or by Ctrl-C at a prompt.
pub const FAREWELL: &str = "Goodbye!";

#[cfg(any(unix, windows))]
mod imp {
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Once;

    use log::{debug, warn};

    use super::FAREWELL;

    const STDOUT: libc::c_int = 1;

    static INSTALL: Once = Once::new();
    static INTERRUPTED: AtomicBool = AtomicBool::new(false);
    static CHILDREN: AtomicUsize = AtomicUsize::new(0);
    static EXIT_AT_PROMPT: AtomicBool = AtomicBool::new(false);

    fn handler() -> libc::sighandler_t {
        on_interrupt as extern "C" fn(libc::c_int) as libc::sighandler_t
    }

    #[cfg(unix)]
    fn install_failed(previous: libc::sighandler_t) -> bool {
        previous == libc::SIG_ERR
    }

    #[cfg(windows)]
    fn install_failed(previous: libc::sighandler_t) -> bool {
        previous == libc::SIG_ERR as libc::sighandler_t
    }

    fn write_stdout(bytes: &[u8]) {
        // SAFETY: the buffer is valid for its length and write is async-signal-safe.
        unsafe {
            libc::write(STDOUT, bytes.as_ptr().cast(), bytes.len() as _);
        }
    }

    extern "C" fn on_interrupt(signal: libc::c_int) {
        if CHILDREN.load(Ordering::SeqCst) > 0 {
            INTERRUPTED.store(true, Ordering::SeqCst);
            // The Windows CRT resets the disposition before every delivery
            // SAFETY: signal is async-signal-safe.
            unsafe {
                libc::signal(signal, handler());
            }
            return;
        }

        if EXIT_AT_PROMPT.load(Ordering::SeqCst) {
            write_stdout(b"\n");
            write_stdout(FAREWELL.as_bytes());
            write_stdout(b"\n");
            // SAFETY: _exit is async-signal-safe; nothing is left buffered.
            unsafe { libc::_exit(0) }
        }

        // SAFETY: both calls are async-signal-safe. The re-raised signal is
        // delivered with the default disposition once this handler returns.
        unsafe {
            libc::signal(signal, libc::SIG_DFL);
            libc::raise(signal);
        }
    }

    fn ensure_installed() {
        INSTALL.call_once(|| {
            // SAFETY: the handler only touches atomics and async-signal-safe calls.
            let previous = unsafe { libc::signal(libc::SIGINT, handler()) };
            if install_failed(previous) {
                warn!("Could not install SIGINT handler, Ctrl-C will exit the program");
            } else {
                debug!("SIGINT handler installed");
            }
        });
    }

    pub fn exit_on_interrupt() {
        EXIT_AT_PROMPT.store(true, Ordering::SeqCst);
        ensure_installed();
    }

    pub struct InterruptGuard {
        _private: (),
    }

    impl InterruptGuard {
        #[must_use]
        pub fn install() -> Self {
            ensure_installed();
            INTERRUPTED.store(false, Ordering::SeqCst);
            CHILDREN.fetch_add(1, Ordering::SeqCst);
            Self { _private: () }
        }

        #[must_use]
        pub fn interrupted(&self) -> bool {
            INTERRUPTED.load(Ordering::SeqCst)
        }
    }

    impl Drop for InterruptGuard {
        fn drop(&mut self) {
            CHILDREN.fetch_sub(1, Ordering::SeqCst);
        }
    }
}

#[cfg(not(any(unix, windows)))]
mod imp {
    pub fn exit_on_interrupt() {}

    pub struct InterruptGuard;

    impl InterruptGuard {
        #[must_use]
        pub fn install() -> Self {
            Self
        }

        #[must_use]
        pub fn interrupted(&self) -> bool {
            false
        }
    }
}

/// Makes Ctrl-C at a prompt a clean exit: [`FAREWELL`] on stdout, status 0.
///
/// Interrupts while an [`InterruptGuard`] is alive are still only recorded.
pub use imp::exit_on_interrupt;
pub use imp::InterruptGuard;
