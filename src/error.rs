//! Error type for middleware dispatch.
//!
//! Under the default configuration only one thing can fail a dispatch: a
//! handler reporting an error. Unknown middleware names, malformed inline
//! entries and routes without middleware metadata are *not* errors; they are
//! dropped or treated as "nothing to run".
//!
//! [`MiddlewareError::Unresolved`] only appears when the caller opts into
//! [`UnresolvedPolicy::Reject`](crate::UnresolvedPolicy::Reject).
//!
//! # Examples
//!
//! ```
//! use navigator_middleware::MiddlewareError;
//!
//! let err = MiddlewareError::handler("auth", "session store unreachable");
//! assert_eq!(err.to_string(), "Middleware 'auth' failed: session store unreachable");
//! assert_eq!(err.middleware(), Some("auth"));
//! ```

use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

/// Failure raised while resolving or running a middleware chain.
///
/// Errors returned by a handler travel to the caller of the executor exactly
/// as the handler built them.
#[derive(Debug, Clone)]
pub enum MiddlewareError {
    /// A handler reported failure.
    Handler { middleware: String, message: String },

    /// Declaration entries that could not be resolved (strict policy only).
    Unresolved { names: Vec<String> },

    /// Free-form error.
    Custom { message: String },

    /// Foreign error raised inside a handler.
    Source(Arc<dyn StdError + Send + Sync>),
}

impl MiddlewareError {
    /// Failure attributed to a named middleware.
    pub fn handler(middleware: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Handler {
            middleware: middleware.into(),
            message: message.into(),
        }
    }

    /// Free-form failure.
    pub fn custom(message: impl Into<String>) -> Self {
        Self::Custom {
            message: message.into(),
        }
    }

    /// Wrap any foreign error.
    pub fn other<E>(error: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self::Source(Arc::new(error))
    }

    /// Name of the middleware the failure is attributed to, if any.
    pub fn middleware(&self) -> Option<&str> {
        match self {
            Self::Handler { middleware, .. } => Some(middleware),
            _ => None,
        }
    }

    /// Check if this error lists unresolved declaration entries.
    pub fn is_unresolved(&self) -> bool {
        matches!(self, Self::Unresolved { .. })
    }
}

impl fmt::Display for MiddlewareError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MiddlewareError::Handler {
                middleware,
                message,
            } => {
                write!(f, "Middleware '{}' failed: {}", middleware, message)
            }
            MiddlewareError::Unresolved { names } => {
                write!(f, "Unresolved middleware: {}", names.join(", "))
            }
            MiddlewareError::Custom { message } => write!(f, "{}", message),
            MiddlewareError::Source(source) => write!(f, "{}", source),
        }
    }
}

impl StdError for MiddlewareError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            MiddlewareError::Source(source) => Some(source.as_ref()),
            _ => None,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
