//! Sequential chain execution with short-circuit.
//!
//! Handlers run strictly one after another: handler N+1 is not even invoked
//! until handler N's future has resolved, whether that future was ready
//! immediately (sync handler) or had to be awaited.
//!
//! | Handler result | Executor |
//! |----------------|----------|
//! | `Ok(Flow::Continue)` | next handler |
//! | `Ok(Flow::Handled)` | stop, report *handled* |
//! | `Err(e)` | stop, return `e` unchanged |
//!
//! Running off the end of the chain (including an empty chain) reports *not
//! handled*: nobody intervened, so the navigation should go ahead.
//!
//! There is no timeout: a handler whose future never resolves keeps the
//! dispatch pending forever.

use crate::action::Flow;
use crate::context::{CustomProperties, MiddlewareContext};
use crate::error::MiddlewareError;
use crate::resolve::Chain;
use crate::{debug_log, error_log};

impl Chain {
    /// Run every handler in order until one takes over.
    ///
    /// Returns [`Flow::Continue`] when all handlers let the navigation
    /// through and [`Flow::Handled`] as soon as one of them stops it.
    #[cfg_attr(
        not(any(feature = "log", feature = "tracing")),
        allow(unused_variables)
    )]
    pub async fn run(
        &self,
        cx: &MiddlewareContext,
        props: &CustomProperties,
    ) -> Result<Flow, MiddlewareError> {
        for (index, middleware) in self.iter().enumerate() {
            debug_log!(
                "Running middleware '{}' ({}/{}) for '{}'",
                middleware.name(),
                index + 1,
                self.len(),
                cx.to().path
            );

            let flow = match middleware.call(cx.clone(), props.clone()).await {
                Ok(flow) => flow,
                Err(err) => {
                    error_log!("Middleware '{}' failed: {}", middleware.name(), err);
                    return Err(err);
                }
            };

            if flow.is_handled() {
                debug_log!(
                    "Middleware '{}' handled navigation to '{}'; skipping {} remaining",
                    middleware.name(),
                    cx.to().path,
                    self.len() - index - 1
                );
                return Ok(Flow::Handled);
            }
        }

        Ok(Flow::Continue)
    }
}

/// Execute a resolved chain and report whether a handler took over.
///
/// `None` (the route declared no middleware) reports `false` without running
/// anything. Otherwise returns `true` iff a handler stopped the chain.
pub async fn execute(
    chain: Option<&Chain>,
    cx: &MiddlewareContext,
    props: &CustomProperties,
) -> Result<bool, MiddlewareError> {
    let Some(chain) = chain else {
        return Ok(false);
    };
    Ok(chain.run(cx, props).await?.is_handled())
}

// ============================================================================
// Tests
// ============================================================================
