//! The two distinguishable error kinds the core can raise (§7), plus the
//! non-error `Outcome` of a successful operation.

/// Errors surfaced to the caller; never raised after a buffer mutation has
/// begun (§7's no-partial-mutation rule).
#[derive(Debug, thiserror::Error)]
pub enum ImportJsError {
    #[error("parse error from linter: {0}")]
    Parse(String),
    #[error("find error: {0}")]
    Find(String),
}

/// The non-error result of a C6 operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Imported {
        variable: String,
        module: String,
        named: bool,
    },
    Message(String),
    NoOp,
}
