use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

/// Cooperative cancellation flag for long-running calculations.
///
/// Cloning is cheap and all clones share the same flag, so one handle can be
/// kept by the caller while another is moved onto a worker thread. Both
/// [`cancel`] and [`is_cancelled`] are safe to call from any thread.
///
/// A cancelled calculation returns [`Error::Cancelled`] and leaves every
/// caller-visible output untouched; results are only ever committed by fully
/// completed calls.
///
/// [`cancel`]: CancellationToken::cancel
/// [`is_cancelled`]: CancellationToken::is_cancelled
/// [`Error::Cancelled`]: crate::Error::Cancelled
#[derive(Clone, Debug, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    /// Create a new token in the "not cancelled" state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Signal every calculation holding a clone of this token to abort.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Whether [`cancel`] has been called on this token or any of its clones.
    ///
    /// [`cancel`]: CancellationToken::cancel
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::CancellationToken;

    #[test]
    fn clones_share_the_flag() {
        let token = CancellationToken::new();
        let clone = token.clone();

        assert!(!clone.is_cancelled());
        token.cancel();
        assert!(clone.is_cancelled());
    }

    #[test]
    fn observable_across_threads() {
        let token = CancellationToken::new();
        let clone = token.clone();

        let handle = std::thread::spawn(move || clone.cancel());
        handle.join().unwrap();

        assert!(token.is_cancelled());
    }
}
