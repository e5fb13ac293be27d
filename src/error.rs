use thiserror::Error;

use crate::term::Term;

/// Structural errors raised by the engine and the front end.
///
/// A goal that simply has no solutions is not an error: the solution
/// iterator is empty instead. Likewise a failed unification is `None`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// A variable was used where a callable term (atom or compound) is required.
    #[error("`{0}` is not callable: goals and clause heads must be atoms or compound terms")]
    NotCallable(Term),

    /// The resolution depth bound configured by the host was reached.
    #[error("resolution depth limit of {0} exceeded")]
    DepthLimitExceeded(usize),

    /// The text front end could not parse its input.
    #[error("syntax error: {message} (at `{input}`)")]
    Parse {
        /// The remaining input where parsing stopped
        input: String,
        /// What the parser expected
        message: String,
    },
}

/// Result type used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;
