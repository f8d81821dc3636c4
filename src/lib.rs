//! # Navigator Middleware
//!
//! Route-level middleware dispatch for before-navigation guards.
//!
//! Routes declare, in their metadata, an ordered list of middleware (by name
//! or inline). On every navigation the dispatcher:
//!
//! 1. **Merges** the ambient [`AppContext`] with the [`NavigationRequest`]
//!    (`to`, `from`, [`Proceed`]) into a [`MiddlewareContext`].
//! 2. **Resolves** the destination's declaration against a
//!    [`MiddlewareRegistry`] into a [`Chain`], dropping entries it cannot
//!    resolve.
//! 3. **Executes** the chain strictly in order. A handler answers
//!    [`Flow::Continue`] (`true`) or [`Flow::Handled`] (`false`); the first
//!    `Handled` stops the chain.
//! 4. **Proceeds** automatically ([`MiddlewareGuard`]) only if no handler took
//!    over, or reports `handled` to the caller ([`MiddlewareHandler`]).
//!
//! Sync and async handlers mix freely: both are stored behind the same boxed
//! future and awaited one at a time.
//!
//! # Quick Start
//!
//! ```
//! use navigator_middleware::*;
//!
//! let logger = define_sync("logger", |cx, _| {
//!     println!("Visiting: {}", cx.to().path);
//!     true
//! });
//!
//! let auth = define("auth", |cx, _| async move {
//!     if cx.cookie("logged") == Some("true") {
//!         return true;
//!     }
//!     if cx.is_server() {
//!         cx.redirect("/");
//!     } else {
//!         cx.next().redirect("/");
//!     }
//!     false
//! });
//!
//! let app = AppContext::server();
//! let guard = middleware_handler(app.clone(), [logger, auth], CustomProperties::new());
//!
//! let secret = RouteLocation::new("/secret")
//!     .meta(RouteMeta::with_middlewares(["logger", "auth"]));
//! pollster::block_on(guard.before_each(secret, RouteLocation::new("/"), Proceed::noop()))
//!     .unwrap();
//!
//! assert_eq!(app.take_redirect().as_deref(), Some("/"));
//! ```
//!
//! # Feature Flags
//!
//! - `log` (default) - Uses the standard `log` crate for logging
//! - `tracing` - Uses the `tracing` crate for structured logging (mutually exclusive with `log`)
//! - `guard` (default) - The before-navigation adapter ([`MiddlewareGuard`], [`MiddlewareHandler`])

// Lints are configured in Cargo.toml [lints] section

// Logging abstraction
pub mod logging;

// Error handling
pub mod error;

// Core dispatch
pub mod action;
pub mod chain;
pub mod context;
pub mod middleware;
pub mod resolve;

// Route data
pub mod params;
pub mod route;

// Guard adapter
#[cfg(feature = "guard")]
pub mod guards;

pub use action::{Flow, NavigationAction};
pub use chain::execute;
pub use context::{
    merge_context, AppContext, AppContextBuilder, CustomProperties, Head, MiddlewareContext,
    NavigationRequest, Proceed,
};
pub use error::MiddlewareError;
#[cfg(feature = "guard")]
pub use guards::{
    create_middleware_handler, middleware_handler, DispatchConfig, MiddlewareGuard,
    MiddlewareHandler, MiddlewareHandlerBuilder, NavigationGuard,
};
pub use middleware::{
    define, define_sync, BoxFuture, HandlerFuture, IntoFlow, MiddlewareDeclaration,
    MiddlewareDescriptor, MiddlewareEntry, MiddlewareRegistry, RouteMiddleware,
};
pub use params::{QueryParams, RouteParams};
pub use resolve::{resolve, resolve_with, Chain, UnresolvedPolicy};
pub use route::{RouteLocation, RouteMeta};
