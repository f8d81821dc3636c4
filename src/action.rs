//! Control-flow signals exchanged between handlers, the executor and the
//! host router.
//!
//! Two small enums carry every decision in a dispatch:
//!
//! - [`Flow`] — what a handler tells the executor: keep going
//!   ([`Continue`](Flow::Continue)) or stop because the handler has taken
//!   responsibility for the outcome ([`Handled`](Flow::Handled)).
//! - [`NavigationAction`] — what is handed to the router's proceed callback:
//!   continue to the destination, cancel, or go somewhere else.
//!
//! Handlers written against the boolean protocol keep working: `true`
//! converts to `Flow::Continue`, `false` to `Flow::Handled`.

/// Outcome of a single handler.
///
/// # Example
///
/// ```
/// use navigator_middleware::Flow;
///
/// assert_eq!(Flow::from(true), Flow::Continue);
/// assert!(Flow::from(false).is_handled());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Flow {
    /// Let the next handler run (or the navigation proceed if this was the last).
    Continue,

    /// The handler already redirected, cancelled or deferred the navigation.
    /// No further handler runs and the guard does not auto-proceed.
    Handled,
}

impl Flow {
    /// Check if this outcome lets the chain continue.
    pub fn is_continue(self) -> bool {
        matches!(self, Self::Continue)
    }

    /// Check if the handler took over the navigation.
    pub fn is_handled(self) -> bool {
        matches!(self, Self::Handled)
    }
}

impl From<bool> for Flow {
    fn from(proceed: bool) -> Self {
        if proceed {
            Self::Continue
        } else {
            Self::Handled
        }
    }
}

impl From<Flow> for bool {
    fn from(flow: Flow) -> Self {
        flow.is_continue()
    }
}

/// Instruction passed to the router's proceed callback.
///
/// # Example
///
/// ```
/// use navigator_middleware::NavigationAction;
///
/// let action = NavigationAction::redirect("/login");
/// assert_eq!(action.redirect_path(), Some("/login"));
/// assert!(NavigationAction::deny("Not authorized").is_deny());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationAction {
    /// Continue to the originally requested destination.
    Continue,

    /// Cancel the navigation.
    Deny {
        /// Human-readable reason for cancelling.
        reason: String,
    },

    /// Navigate somewhere else instead.
    Redirect {
        /// Path to redirect to.
        to: String,
        /// Optional human-readable reason for redirecting.
        reason: Option<String>,
    },
}

impl NavigationAction {
    /// Cancel navigation with a reason.
    pub fn deny(reason: impl Into<String>) -> Self {
        Self::Deny {
            reason: reason.into(),
        }
    }

    /// Redirect navigation to a different path.
    pub fn redirect(to: impl Into<String>) -> Self {
        Self::Redirect {
            to: to.into(),
            reason: None,
        }
    }

    /// Redirect with a human-readable reason.
    pub fn redirect_with_reason(to: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Redirect {
            to: to.into(),
            reason: Some(reason.into()),
        }
    }

    /// Check if this action continues to the original destination.
    pub fn is_continue(&self) -> bool {
        matches!(self, Self::Continue)
    }

    /// Check if this action cancels navigation.
    pub fn is_deny(&self) -> bool {
        matches!(self, Self::Deny { .. })
    }

    /// Check if this action redirects navigation.
    pub fn is_redirect(&self) -> bool {
        matches!(self, Self::Redirect { .. })
    }

    /// Get the redirect path, if this is a redirect action.
    pub fn redirect_path(&self) -> Option<&str> {
        match self {
            Self::Redirect { to, .. } => Some(to.as_str()),
            _ => None,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
