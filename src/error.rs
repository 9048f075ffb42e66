//! Error types for registry store operations.
//!
//! Every failure surfaces synchronously at the call boundary as one of a
//! closed set of error kinds. Backend status codes are translated into these
//! kinds per operation; the raw status is preserved on [`RegistryError::SystemCall`].

use crate::backend::{status_message, NativeStatus};
use thiserror::Error;

/// Result type alias for registry store operations.
pub type Result<T> = std::result::Result<T, RegistryError>;

/// Errors that can occur during registry store operations.
#[derive(Error, Debug)]
pub enum RegistryError {
    /// Failure with no more specific classification.
    #[error("unknown error!")]
    Unknown,

    /// The backend refused an operation with an unexpected status code.
    #[error("{}", compose_message("system call error", status_detail(.status)))]
    SystemCall {
        /// Native status code reported by the backend.
        status: NativeStatus,
    },

    /// Key or value not found.
    #[error("{}", compose_message("not found", .0))]
    NotFound(String),

    /// Operation attempted on a closed handle. Indicates caller misuse
    /// (use-after-close), not a recoverable condition.
    #[error("null handle reference!")]
    NullReference,

    /// A caller-supplied argument was rejected.
    #[error("{}", compose_message("invalid argument", .0))]
    InvalidArgument(String),

    /// The handle does not hold the rights the operation requires.
    #[error("access denied!")]
    AccessDenied,

    /// A typed read requested a type incompatible with the stored tag.
    #[error("type mismatch: requested {requested} but stored tag is {found}!")]
    TypeMismatch {
        /// Name of the requested semantic type.
        requested: &'static str,
        /// Name of the tag actually stored.
        found: String,
    },
}

impl RegistryError {
    /// Creates a system-call error carrying the backend status code.
    pub fn system(status: NativeStatus) -> Self {
        Self::SystemCall { status }
    }

    /// Creates a not-found error with context about what was being searched.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use reg_store::RegistryError;
    /// let err = RegistryError::not_found("value", "DisplayName");
    /// ```
    pub fn not_found(item_type: &str, name: &str) -> Self {
        Self::NotFound(format!("{} '{}'", item_type, name))
    }

    /// Creates an invalid-argument error naming the rejected argument.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Creates a type-mismatch error from the requested type name and the
    /// stored tag name.
    pub fn type_mismatch(requested: &'static str, found: impl Into<String>) -> Self {
        Self::TypeMismatch {
            requested,
            found: found.into(),
        }
    }
}

fn status_detail(status: &NativeStatus) -> &'static str {
    status_message(*status)
}

/// Composes a user-visible message from a base category text and contextual
/// detail.
///
/// The parts are joined with `": "`; trailing sentence punctuation is trimmed
/// from the detail and the result is terminated with `'!'`.
pub fn compose_message(base: &str, detail: &str) -> String {
    let detail = detail.trim_end_matches(&['.', '!'][..]);
    if detail.is_empty() {
        format!("{}!", base)
    } else {
        format!("{}: {}!", base, detail)
    }
}
