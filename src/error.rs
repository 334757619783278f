/// All the ways a calculation can fail.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum Error {
    /// A hit object carried malformed geometry or timing; the whole load is
    /// rejected, there are no partial results.
    #[error("invalid hit object at index {idx}: {reason}")]
    InvalidObject {
        /// Index of the offending object in the input sequence.
        idx: usize,
        /// What was wrong with it.
        reason: &'static str,
    },
    /// A score carried out-of-range judgment data.
    #[error("invalid score data: {0}")]
    InvalidScoreData(&'static str),
    /// Difficulty attributes fed into the performance calculation were
    /// non-finite or negative.
    #[error("invalid difficulty attributes: {0}")]
    InvalidAttributes(&'static str),
    /// The calculation was aborted through its [`CancellationToken`]. Not a
    /// failure; retrying with the same or a larger prefix is always safe.
    ///
    /// [`CancellationToken`]: crate::CancellationToken
    #[error("calculation was cancelled")]
    Cancelled,
}
