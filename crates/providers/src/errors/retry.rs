//! Retry classification for provider errors.

/// How the reconciliation engine should react to a provider error.
///
/// The classification is decided by the error variant alone; the engine owns
/// the retry budget and backoff schedule.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RetryClass {
    /// Transient failure. Retry the same page with exponential backoff.
    WithBackoff,
    /// The response cannot be trusted. Skip this leaf, log it, do not retry.
    SkipLeaf,
    /// Credentials are bad. The adapter does no further work this run.
    AbortProvider,
}
