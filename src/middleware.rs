//! Middleware definition, route declarations and the name registry.
//!
//! A middleware is a **named handler**. The name is how routes refer to it;
//! the handler decides, for one navigation, whether the chain may continue.
//!
//! # Defining middleware
//!
//! | Approach | When to use |
//! |----------|-------------|
//! | [`define`] | Async closure or `async fn` |
//! | [`define_sync`] | Plain closure returning the outcome directly |
//! | Implement [`RouteMiddleware`] + [`MiddlewareDescriptor::new`] | Stateful struct |
//!
//! Handlers may return anything implementing [`IntoFlow`]: `bool` (`true` =
//! continue), [`Flow`], or a `Result` of either. Sync and async handlers end
//! up behind the same boxed future, so the executor treats them alike.
//!
//! # Example
//!
//! ```
//! use navigator_middleware::{define, define_sync, MiddlewareRegistry};
//!
//! let logger = define_sync("logger", |cx, _props| {
//!     println!("Visiting: {}", cx.to().path);
//!     true
//! });
//!
//! let auth = define("auth", |cx, _props| async move {
//!     if cx.cookie("logged") == Some("true") {
//!         return true;
//!     }
//!     cx.next().redirect("/");
//!     false
//! });
//!
//! let registry = MiddlewareRegistry::new([logger, auth]);
//! assert_eq!(registry.names().collect::<Vec<_>>(), ["logger", "auth"]);
//! ```

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::action::Flow;
use crate::context::{CustomProperties, MiddlewareContext};
use crate::error::MiddlewareError;
use crate::{debug_log, info_log};

/// Boxed `Send` future, the uniform shape of every handler result.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Future returned by a single handler invocation.
pub type HandlerFuture = BoxFuture<'static, Result<Flow, MiddlewareError>>;

// ============================================================================
// IntoFlow
// ============================================================================

/// Values a handler may produce.
pub trait IntoFlow {
    fn into_flow(self) -> Result<Flow, MiddlewareError>;
}

impl IntoFlow for Flow {
    fn into_flow(self) -> Result<Flow, MiddlewareError> {
        Ok(self)
    }
}

impl IntoFlow for bool {
    fn into_flow(self) -> Result<Flow, MiddlewareError> {
        Ok(Flow::from(self))
    }
}

impl<T, E> IntoFlow for Result<T, E>
where
    T: IntoFlow,
    E: Into<MiddlewareError>,
{
    fn into_flow(self) -> Result<Flow, MiddlewareError> {
        self.map_err(Into::into)?.into_flow()
    }
}

// ============================================================================
// RouteMiddleware trait
// ============================================================================

/// Handler side of a middleware.
///
/// Closures get this through [`define`] / [`define_sync`]; implement it
/// directly when the handler carries its own state.
///
/// ```
/// use navigator_middleware::{
///     CustomProperties, Flow, HandlerFuture, MiddlewareContext, MiddlewareDescriptor,
///     RouteMiddleware,
/// };
///
/// struct Maintenance {
///     enabled: bool,
/// }
///
/// impl RouteMiddleware for Maintenance {
///     fn handle(&self, cx: MiddlewareContext, _props: CustomProperties) -> HandlerFuture {
///         let enabled = self.enabled;
///         Box::pin(async move {
///             if enabled {
///                 cx.next().redirect("/maintenance");
///                 return Ok(Flow::Handled);
///             }
///             Ok(Flow::Continue)
///         })
///     }
/// }
///
/// let descriptor = MiddlewareDescriptor::new("maintenance", Maintenance { enabled: false });
/// assert_eq!(descriptor.name(), "maintenance");
/// ```
pub trait RouteMiddleware: Send + Sync + 'static {
    /// Run the handler for one navigation.
    fn handle(&self, cx: MiddlewareContext, props: CustomProperties) -> HandlerFuture;
}

/// Middleware backed by an async closure. Built by [`define`].
struct AsyncFnMiddleware<F>(F);

impl<F, Fut, R> RouteMiddleware for AsyncFnMiddleware<F>
where
    F: Fn(MiddlewareContext, CustomProperties) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoFlow + 'static,
{
    fn handle(&self, cx: MiddlewareContext, props: CustomProperties) -> HandlerFuture {
        let fut = (self.0)(cx, props);
        Box::pin(async move { fut.await.into_flow() })
    }
}

/// Middleware backed by a plain closure. Built by [`define_sync`].
struct SyncFnMiddleware<F>(F);

impl<F, R> RouteMiddleware for SyncFnMiddleware<F>
where
    F: Fn(MiddlewareContext, CustomProperties) -> R + Send + Sync + 'static,
    R: IntoFlow,
{
    fn handle(&self, cx: MiddlewareContext, props: CustomProperties) -> HandlerFuture {
        // The closure runs now; only its (already known) outcome is deferred.
        Box::pin(std::future::ready((self.0)(cx, props).into_flow()))
    }
}

// ============================================================================
// MiddlewareDescriptor
// ============================================================================

/// A name bound to a handler. Immutable; clones share the handler.
#[derive(Clone)]
pub struct MiddlewareDescriptor {
    name: Arc<str>,
    handler: Arc<dyn RouteMiddleware>,
}

impl MiddlewareDescriptor {
    /// Bind `name` to a [`RouteMiddleware`] implementation.
    pub fn new<M: RouteMiddleware>(name: impl Into<Arc<str>>, middleware: M) -> Self {
        Self {
            name: name.into(),
            handler: Arc::new(middleware),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether an inline declaration of this descriptor can be used.
    ///
    /// Only the name can be malformed: an empty name is rejected.
    pub fn is_well_formed(&self) -> bool {
        !self.name.is_empty()
    }

    /// Invoke the handler.
    pub fn call(&self, cx: MiddlewareContext, props: CustomProperties) -> HandlerFuture {
        self.handler.handle(cx, props)
    }

    /// Whether both descriptors share the same handler instance.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.handler, &other.handler)
    }
}

impl fmt::Debug for MiddlewareDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MiddlewareDescriptor")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Define a middleware from an async handler.
///
/// No validation is performed on `name`.
pub fn define<F, Fut, R>(name: impl Into<Arc<str>>, handler: F) -> MiddlewareDescriptor
where
    F: Fn(MiddlewareContext, CustomProperties) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoFlow + 'static,
{
    MiddlewareDescriptor::new(name, AsyncFnMiddleware(handler))
}

/// Define a middleware from a synchronous handler.
pub fn define_sync<F, R>(name: impl Into<Arc<str>>, handler: F) -> MiddlewareDescriptor
where
    F: Fn(MiddlewareContext, CustomProperties) -> R + Send + Sync + 'static,
    R: IntoFlow + 'static,
{
    MiddlewareDescriptor::new(name, SyncFnMiddleware(handler))
}

// ============================================================================
// Route declarations
// ============================================================================

/// One element of a route's middleware declaration.
#[derive(Debug, Clone)]
pub enum MiddlewareEntry {
    /// Reference to a registered middleware by name.
    Named(String),

    /// Descriptor declared directly on the route.
    Inline(MiddlewareDescriptor),
}

impl MiddlewareEntry {
    /// Human-readable label used in diagnostics.
    pub fn label(&self) -> String {
        match self {
            Self::Named(name) => name.clone(),
            Self::Inline(descriptor) if descriptor.is_well_formed() => {
                format!("<inline {}>", descriptor.name())
            }
            Self::Inline(_) => "<inline>".to_string(),
        }
    }
}

impl From<&str> for MiddlewareEntry {
    fn from(name: &str) -> Self {
        Self::Named(name.to_string())
    }
}

impl From<String> for MiddlewareEntry {
    fn from(name: String) -> Self {
        Self::Named(name)
    }
}

impl From<MiddlewareDescriptor> for MiddlewareEntry {
    fn from(descriptor: MiddlewareDescriptor) -> Self {
        Self::Inline(descriptor)
    }
}

/// Ordered middleware declaration of a route. Order is execution order.
///
/// ```
/// use navigator_middleware::{define_sync, MiddlewareDeclaration};
///
/// let declaration = MiddlewareDeclaration::new()
///     .named("logger")
///     .inline(define_sync("audit", |_, _| true))
///     .named("auth");
/// assert_eq!(declaration.len(), 3);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MiddlewareDeclaration {
    entries: Vec<MiddlewareEntry>,
}

impl MiddlewareDeclaration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declaration made only of names.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        names
            .into_iter()
            .map(|name| MiddlewareEntry::Named(name.into()))
            .collect()
    }

    /// Append a reference by name.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.entries.push(MiddlewareEntry::Named(name.into()));
        self
    }

    /// Append an inline descriptor.
    pub fn inline(mut self, descriptor: MiddlewareDescriptor) -> Self {
        self.entries.push(MiddlewareEntry::Inline(descriptor));
        self
    }

    pub fn push(&mut self, entry: impl Into<MiddlewareEntry>) {
        self.entries.push(entry.into());
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MiddlewareEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<E: Into<MiddlewareEntry>> FromIterator<E> for MiddlewareDeclaration {
    fn from_iter<I: IntoIterator<Item = E>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl<'a> IntoIterator for &'a MiddlewareDeclaration {
    type Item = &'a MiddlewareEntry;
    type IntoIter = std::slice::Iter<'a, MiddlewareEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

// ============================================================================
// MiddlewareRegistry
// ============================================================================

/// Name → descriptor mapping, built once per application.
///
/// When two descriptors share a name the **first** one registered is the one
/// that resolves; later ones are kept (and iterated) but never looked up.
#[derive(Debug, Clone, Default)]
pub struct MiddlewareRegistry {
    middlewares: Vec<MiddlewareDescriptor>,
    by_name: HashMap<Arc<str>, usize>,
}

impl MiddlewareRegistry {
    /// Build a registry from descriptors, in registration order.
    pub fn new(middlewares: impl IntoIterator<Item = MiddlewareDescriptor>) -> Self {
        let registry: Self = middlewares.into_iter().collect();
        info_log!(
            "Middleware registry built with {} entries",
            registry.middlewares.len()
        );
        registry
    }

    /// Add a descriptor. Returns `false` if its name was already taken.
    pub fn register(&mut self, descriptor: MiddlewareDescriptor) -> bool {
        let index = self.middlewares.len();
        let name = Arc::clone(&descriptor.name);
        self.middlewares.push(descriptor);

        if self.by_name.contains_key(&name) {
            debug_log!(
                "Middleware '{}' registered twice; the first registration wins",
                name
            );
            return false;
        }
        self.by_name.insert(name, index);
        true
    }

    /// First descriptor registered under `name`.
    pub fn get(&self, name: &str) -> Option<&MiddlewareDescriptor> {
        self.by_name.get(name).map(|&index| &self.middlewares[index])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Every registered descriptor, shadowed duplicates included.
    pub fn iter(&self) -> std::slice::Iter<'_, MiddlewareDescriptor> {
        self.middlewares.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.middlewares.iter().map(MiddlewareDescriptor::name)
    }

    pub fn len(&self) -> usize {
        self.middlewares.len()
    }

    pub fn is_empty(&self) -> bool {
        self.middlewares.is_empty()
    }
}

impl FromIterator<MiddlewareDescriptor> for MiddlewareRegistry {
    fn from_iter<I: IntoIterator<Item = MiddlewareDescriptor>>(iter: I) -> Self {
        let mut registry = Self::default();
        for descriptor in iter {
            registry.register(descriptor);
        }
        registry
    }
}

impl Extend<MiddlewareDescriptor> for MiddlewareRegistry {
    fn extend<I: IntoIterator<Item = MiddlewareDescriptor>>(&mut self, iter: I) {
        for descriptor in iter {
            self.register(descriptor);
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{merge_context, AppContext, NavigationRequest, Proceed};
    use crate::route::RouteLocation;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn context(to: &str) -> MiddlewareContext {
        let request = NavigationRequest::new(
            RouteLocation::new(to),
            RouteLocation::new("/"),
            Proceed::noop(),
        );
        merge_context(&AppContext::server(), request)
    }

    fn run(descriptor: &MiddlewareDescriptor) -> Result<Flow, MiddlewareError> {
        pollster::block_on(descriptor.call(context("/page"), CustomProperties::new()))
    }

    #[test]
    fn test_define_sync_bool() {
        let allow = define_sync("allow", |_, _| true);
        let stop = define_sync("stop", |_, _| false);

        assert_eq!(allow.name(), "allow");
        assert_eq!(run(&allow).unwrap(), Flow::Continue);
        assert_eq!(run(&stop).unwrap(), Flow::Handled);
    }

    #[test]
    fn test_define_async_receives_context() {
        let seen = define("seen", |cx, _| async move { cx.to().path == "/page" });
        assert_eq!(run(&seen).unwrap(), Flow::Continue);
    }

    #[test]
    fn test_sync_handler_runs_on_call() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let mw = define_sync("count", move |_, _| {
            counter.fetch_add(1, Ordering::SeqCst);
            Flow::Continue
        });

        let fut = mw.call(context("/"), CustomProperties::new());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(pollster::block_on(fut).is_ok());
    }

    #[test]
    fn test_handler_error_passes_through() {
        let failing = define_sync("failing", |_, _| {
            Err::<bool, _>(MiddlewareError::handler("failing", "boom"))
        });
        let err = run(&failing).unwrap_err();
        assert_eq!(err.middleware(), Some("failing"));
    }

    #[test]
    fn test_custom_middleware_trait() {
        struct Fixed(Flow);

        impl RouteMiddleware for Fixed {
            fn handle(&self, _cx: MiddlewareContext, _props: CustomProperties) -> HandlerFuture {
                Box::pin(std::future::ready(Ok(self.0)))
            }
        }

        let mw = MiddlewareDescriptor::new("fixed", Fixed(Flow::Handled));
        assert_eq!(run(&mw).unwrap(), Flow::Handled);
    }

    #[test]
    fn test_well_formed_requires_name() {
        assert!(define_sync("named", |_, _| true).is_well_formed());
        assert!(!define_sync("", |_, _| true).is_well_formed());
    }

    #[test]
    fn test_entry_labels() {
        assert_eq!(MiddlewareEntry::from("auth").label(), "auth");
        assert_eq!(
            MiddlewareEntry::from(define_sync("audit", |_, _| true)).label(),
            "<inline audit>"
        );
        assert_eq!(
            MiddlewareEntry::from(define_sync("", |_, _| true)).label(),
            "<inline>"
        );
    }

    #[test]
    fn test_declaration_preserves_order() {
        let declaration = MiddlewareDeclaration::from_names(["c", "a", "b"]);
        let labels: Vec<_> = declaration.iter().map(MiddlewareEntry::label).collect();
        assert_eq!(labels, ["c", "a", "b"]);
    }

    #[test]
    fn test_registry_first_registration_wins() {
        let first = define_sync("dup", |_, _| true);
        let second = define_sync("dup", |_, _| false);

        let mut registry = MiddlewareRegistry::default();
        assert!(registry.register(first.clone()));
        assert!(!registry.register(second.clone()));

        assert_eq!(registry.len(), 2);
        assert!(registry.get("dup").unwrap().ptr_eq(&first));
        assert!(!registry.get("dup").unwrap().ptr_eq(&second));
    }

    #[test]
    fn test_registry_lookup() {
        let registry = MiddlewareRegistry::new([
            define_sync("logger", |_, _| true),
            define_sync("auth", |_, _| true),
        ]);

        assert!(registry.contains("auth"));
        assert!(registry.get("missing").is_none());
        assert_eq!(registry.names().collect::<Vec<_>>(), ["logger", "auth"]);
    }
}
