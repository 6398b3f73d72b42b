/// Errors produced by the `kbank-core` crate.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum CoreError {
    /// A binding name was empty or contained only whitespace.
    #[error("invalid binding {name:?}: {reason}")]
    InvalidBinding { name: String, reason: String },
}
