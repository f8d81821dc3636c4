//! Before-navigation guard adapter.
//!
//! Plugs the resolver and executor into a host router's `before_each` hook.
//! Two entry points share one configuration:
//!
//! | Entry point | Returns | Calls `proceed()` |
//! |-------------|---------|-------------------|
//! | [`MiddlewareHandler::handle`] | `handled: bool` | never, the caller decides |
//! | [`MiddlewareGuard`] (`before_each`) | `()` | once, only if not handled |
//!
//! When a handler returns [`Flow::Handled`](crate::Flow::Handled) it owns the
//! outcome: it must already have called the proceed / redirect primitive (or
//! requested a server redirect on the ambient context). The guard then stays
//! out of the way.
//!
//! A handler error aborts the dispatch; the guard returns it to the host
//! without calling `proceed`.
//!
//! # Example
//!
//! ```
//! use navigator_middleware::{
//!     define_sync, middleware_handler, AppContext, CustomProperties, NavigationGuard, Proceed,
//!     RouteLocation, RouteMeta,
//! };
//!
//! let logger = define_sync("logger", |cx, _| {
//!     println!("Visiting: {}", cx.to().path);
//!     true
//! });
//! let guard = middleware_handler(AppContext::client(), [logger], CustomProperties::new());
//!
//! let to = RouteLocation::new("/").meta(RouteMeta::with_middlewares(["logger"]));
//! let proceed = Proceed::new(|action| println!("router got {action:?}"));
//! pollster::block_on(guard.before_each(to, RouteLocation::new("/"), proceed)).unwrap();
//! ```

use std::sync::Arc;

use crate::chain::execute;
use crate::context::{merge_context, AppContext, CustomProperties, NavigationRequest, Proceed};
use crate::debug_log;
use crate::error::MiddlewareError;
use crate::middleware::{BoxFuture, MiddlewareDescriptor, MiddlewareRegistry};
use crate::resolve::{resolve_with, UnresolvedPolicy};
use crate::route::RouteLocation;

// ============================================================================
// NavigationGuard trait
// ============================================================================

/// Shape of a host router's before-navigation hook.
///
/// The returned future completes once the whole decision has been made,
/// including any awaited handler.
pub trait NavigationGuard: Send + Sync + 'static {
    fn before_each(
        &self,
        to: RouteLocation,
        from: RouteLocation,
        proceed: Proceed,
    ) -> BoxFuture<'static, Result<(), MiddlewareError>>;

    /// Guard name for debugging.
    fn name(&self) -> &'static str {
        "NavigationGuard"
    }
}

// ============================================================================
// Configuration
// ============================================================================

/// Runtime options of a dispatcher.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchConfig {
    /// Treatment of declaration entries that cannot be resolved.
    pub unresolved: UnresolvedPolicy,
}

// ============================================================================
// MiddlewareHandler (manual form)
// ============================================================================

struct HandlerInner {
    app: AppContext,
    registry: MiddlewareRegistry,
    properties: CustomProperties,
    config: DispatchConfig,
}

/// Dispatcher that reports whether the navigation was handled and leaves
/// the rest to the caller.
///
/// Cheap to clone; clones share registry, properties and ambient context.
///
/// ```
/// use navigator_middleware::{
///     create_middleware_handler, define_sync, AppContext, CustomProperties, NavigationRequest,
///     Proceed, RouteLocation, RouteMeta,
/// };
///
/// let auth = define_sync("auth", |cx, _| {
///     cx.next().redirect("/login");
///     false
/// });
/// let handler = create_middleware_handler(AppContext::client(), [auth], CustomProperties::new());
///
/// let to = RouteLocation::new("/secret").meta(RouteMeta::with_middlewares(["auth"]));
/// let request = NavigationRequest::new(to, RouteLocation::new("/"), Proceed::noop());
/// let handled = pollster::block_on(handler.handle(request)).unwrap();
/// assert!(handled);
/// ```
#[derive(Clone)]
pub struct MiddlewareHandler {
    inner: Arc<HandlerInner>,
}

impl MiddlewareHandler {
    pub fn builder(app: AppContext) -> MiddlewareHandlerBuilder {
        MiddlewareHandlerBuilder::new(app)
    }

    /// Run the middleware declared on `request.to` and report whether one of
    /// them took over the navigation.
    pub async fn handle(&self, request: NavigationRequest) -> Result<bool, MiddlewareError> {
        let inner = &*self.inner;
        let cx = merge_context(&inner.app, request);
        let declared = cx.to().middlewares();
        let chain = resolve_with(declared, &inner.registry, inner.config.unresolved)?;
        execute(chain.as_ref(), &cx, &inner.properties).await
    }

    pub fn app(&self) -> &AppContext {
        &self.inner.app
    }

    pub fn registry(&self) -> &MiddlewareRegistry {
        &self.inner.registry
    }

    pub fn properties(&self) -> &CustomProperties {
        &self.inner.properties
    }

    pub fn config(&self) -> DispatchConfig {
        self.inner.config
    }

    /// Wrap into the automatic guard form.
    pub fn into_guard(self) -> MiddlewareGuard {
        MiddlewareGuard { handler: self }
    }
}

/// Builder for [`MiddlewareHandler`].
#[must_use]
pub struct MiddlewareHandlerBuilder {
    app: AppContext,
    registry: MiddlewareRegistry,
    properties: CustomProperties,
    config: DispatchConfig,
}

impl MiddlewareHandlerBuilder {
    pub fn new(app: AppContext) -> Self {
        Self {
            app,
            registry: MiddlewareRegistry::default(),
            properties: CustomProperties::default(),
            config: DispatchConfig::default(),
        }
    }

    /// Register one middleware.
    pub fn middleware(mut self, middleware: MiddlewareDescriptor) -> Self {
        self.registry.register(middleware);
        self
    }

    /// Register several middlewares, in order.
    pub fn middlewares(
        mut self,
        middlewares: impl IntoIterator<Item = MiddlewareDescriptor>,
    ) -> Self {
        self.registry.extend(middlewares);
        self
    }

    /// Properties handed to every handler.
    pub fn properties(mut self, properties: CustomProperties) -> Self {
        self.properties = properties;
        self
    }

    pub fn unresolved_policy(mut self, policy: UnresolvedPolicy) -> Self {
        self.config.unresolved = policy;
        self
    }

    pub fn config(mut self, config: DispatchConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> MiddlewareHandler {
        debug_log!(
            "Middleware handler built with {} middleware ({:?})",
            self.registry.len(),
            self.config
        );
        MiddlewareHandler {
            inner: Arc::new(HandlerInner {
                app: self.app,
                registry: self.registry,
                properties: self.properties,
                config: self.config,
            }),
        }
    }

    /// Build straight into the automatic guard form.
    pub fn into_guard(self) -> MiddlewareGuard {
        self.build().into_guard()
    }
}

// ============================================================================
// MiddlewareGuard (automatic form)
// ============================================================================

/// Ready-to-install before-navigation hook.
///
/// Proceeds to the destination by itself unless a handler took over.
#[derive(Clone)]
pub struct MiddlewareGuard {
    handler: MiddlewareHandler,
}

impl MiddlewareGuard {
    pub fn handler(&self) -> &MiddlewareHandler {
        &self.handler
    }

    /// Dispatch one navigation, calling `proceed()` if nobody took over.
    pub async fn run(
        &self,
        to: RouteLocation,
        from: RouteLocation,
        proceed: Proceed,
    ) -> Result<(), MiddlewareError> {
        let path = to.path.clone();
        let request = NavigationRequest::new(to, from, proceed.clone());

        if self.handler.handle(request).await? {
            debug_log!("Navigation to '{}' handled by middleware", path);
        } else {
            debug_log!("No middleware intervened; proceeding to '{}'", path);
            proceed.proceed();
        }
        Ok(())
    }
}

impl NavigationGuard for MiddlewareGuard {
    fn before_each(
        &self,
        to: RouteLocation,
        from: RouteLocation,
        proceed: Proceed,
    ) -> BoxFuture<'static, Result<(), MiddlewareError>> {
        let guard = self.clone();
        Box::pin(async move { guard.run(to, from, proceed).await })
    }

    fn name(&self) -> &'static str {
        "MiddlewareGuard"
    }
}

// ============================================================================
// Constructors
// ============================================================================

/// Build the manual dispatcher.
pub fn create_middleware_handler(
    app: AppContext,
    middlewares: impl IntoIterator<Item = MiddlewareDescriptor>,
    properties: CustomProperties,
) -> MiddlewareHandler {
    MiddlewareHandler::builder(app)
        .middlewares(middlewares)
        .properties(properties)
        .build()
}

/// Build the automatic guard.
pub fn middleware_handler(
    app: AppContext,
    middlewares: impl IntoIterator<Item = MiddlewareDescriptor>,
    properties: CustomProperties,
) -> MiddlewareGuard {
    create_middleware_handler(app, middlewares, properties).into_guard()
}

// ============================================================================
// Tests
// ============================================================================
