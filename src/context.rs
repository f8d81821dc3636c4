//! Handler-visible context.
//!
//! Two lifetimes meet here and are kept as separate values until the moment a
//! handler is invoked:
//!
//! - [`AppContext`] — **ambient**, created once per application (or per
//!   server request) by the host. Environment flags, the shared initial-state
//!   bag, request cookies, head tags and the server-side redirect slot.
//! - [`NavigationRequest`] — **per navigation**, created by the host router
//!   for every attempt: `to`, `from` and the [`Proceed`] callback.
//!
//! [`merge_context`] combines them into a [`MiddlewareContext`], which derefs
//! to the ambient context so handlers read both through one value.
//!
//! [`CustomProperties`] travel next to the context: fixed when the dispatcher
//! is built and handed unchanged to every handler.
//!
//! In multi-request servers the [`AppContext`] must be request-scoped; nothing
//! here prevents sharing one instance across requests.

use std::collections::BTreeMap;
use std::fmt;
use std::ops::Deref;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::action::NavigationAction;
use crate::route::RouteLocation;

// ============================================================================
// Proceed
// ============================================================================

/// The host router's "continue navigation" primitive.
///
/// Cheap to clone; every clone drives the same callback.
///
/// ```
/// use std::sync::{Arc, Mutex};
/// use navigator_middleware::{NavigationAction, Proceed};
///
/// let calls = Arc::new(Mutex::new(Vec::new()));
/// let sink = calls.clone();
/// let proceed = Proceed::new(move |action| sink.lock().unwrap().push(action));
///
/// proceed.redirect("/login");
/// assert_eq!(*calls.lock().unwrap(), [NavigationAction::redirect("/login")]);
/// ```
#[derive(Clone)]
pub struct Proceed {
    callback: Arc<dyn Fn(NavigationAction) + Send + Sync>,
}

impl Proceed {
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(NavigationAction) + Send + Sync + 'static,
    {
        Self {
            callback: Arc::new(callback),
        }
    }

    /// A callback that ignores every instruction.
    pub fn noop() -> Self {
        Self::new(|_| {})
    }

    /// Hand an instruction to the router.
    pub fn call(&self, action: NavigationAction) {
        (self.callback)(action);
    }

    /// Continue to the original destination.
    pub fn proceed(&self) {
        self.call(NavigationAction::Continue);
    }

    /// Navigate to `to` instead.
    pub fn redirect(&self, to: impl Into<String>) {
        self.call(NavigationAction::redirect(to));
    }

    /// Navigate to `to` instead, telling the router why.
    pub fn redirect_with_reason(&self, to: impl Into<String>, reason: impl Into<String>) {
        self.call(NavigationAction::redirect_with_reason(to, reason));
    }

    /// Cancel the navigation.
    pub fn abort(&self, reason: impl Into<String>) {
        self.call(NavigationAction::deny(reason));
    }
}

impl fmt::Debug for Proceed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Proceed").finish_non_exhaustive()
    }
}

// ============================================================================
// NavigationRequest
// ============================================================================

/// A single navigation attempt, as handed over by the host router.
#[derive(Debug, Clone)]
pub struct NavigationRequest {
    /// Where the navigation is going.
    pub to: RouteLocation,

    /// Where it comes from.
    pub from: RouteLocation,

    /// Router primitive that advances or redirects this navigation.
    pub proceed: Proceed,
}

impl NavigationRequest {
    pub fn new(to: RouteLocation, from: RouteLocation, proceed: Proceed) -> Self {
        Self { to, from, proceed }
    }
}

// ============================================================================
// Head
// ============================================================================

/// Document head state managed by handlers (title and `<meta>` tags).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Head {
    title: Option<String>,
    meta: Vec<(String, String)>,
}

impl Head {
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = Some(title.into());
    }

    /// Set a `<meta name=.. content=..>` tag, replacing one with the same name.
    pub fn set_meta(&mut self, name: impl Into<String>, content: impl Into<String>) {
        let name = name.into();
        let content = content.into();
        match self.meta.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = content,
            None => self.meta.push((name, content)),
        }
    }

    pub fn meta(&self, name: &str) -> Option<&str> {
        self.meta
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, c)| c.as_str())
    }

    /// All meta tags in insertion order.
    pub fn meta_tags(&self) -> &[(String, String)] {
        &self.meta
    }
}

// ============================================================================
// AppContext
// ============================================================================

struct AppInner {
    is_client: bool,
    cookies: BTreeMap<String, String>,
    initial_state: RwLock<Map<String, Value>>,
    head: Mutex<Head>,
    redirect: Mutex<Option<String>>,
}

/// Ambient application context.
///
/// Clones share state: a value stored by one handler is visible to the next
/// one in the same navigation, and to the host afterwards.
///
/// ```
/// use navigator_middleware::AppContext;
///
/// let app = AppContext::builder().cookie("logged", "true").build();
/// assert!(app.is_server());
/// assert_eq!(app.cookie("logged"), Some("true"));
///
/// app.set_state("visits", 3);
/// assert_eq!(app.state_as::<u32>("visits"), Some(3));
/// ```
#[derive(Clone)]
pub struct AppContext {
    inner: Arc<AppInner>,
}

impl AppContext {
    pub fn builder() -> AppContextBuilder {
        AppContextBuilder::default()
    }

    /// Empty browser-side context.
    pub fn client() -> Self {
        Self::builder().client(true).build()
    }

    /// Empty server-side context.
    pub fn server() -> Self {
        Self::builder().build()
    }

    pub fn is_client(&self) -> bool {
        self.inner.is_client
    }

    pub fn is_server(&self) -> bool {
        !self.inner.is_client
    }

    /// Cookie sent with the request being rendered.
    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.inner.cookies.get(name).map(String::as_str)
    }

    pub fn cookies(&self) -> &BTreeMap<String, String> {
        &self.inner.cookies
    }

    /// Clone of a value from the initial-state bag.
    pub fn state(&self, key: &str) -> Option<Value> {
        self.read_state(|state| state.get(key).cloned())
    }

    /// Value from the initial-state bag deserialized as `T`.
    pub fn state_as<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.state(key)
            .and_then(|value| serde_json::from_value(value).ok())
    }

    /// Store a value in the initial-state bag, returning the previous one.
    pub fn set_state(&self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.update_state(|state| state.insert(key.into(), value.into()))
    }

    /// Read the whole initial-state bag.
    pub fn read_state<R>(&self, f: impl FnOnce(&Map<String, Value>) -> R) -> R {
        let state = self
            .inner
            .initial_state
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        f(&state)
    }

    /// Mutate the whole initial-state bag.
    pub fn update_state<R>(&self, f: impl FnOnce(&mut Map<String, Value>) -> R) -> R {
        let mut state = self
            .inner
            .initial_state
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        f(&mut state)
    }

    /// Snapshot of the initial-state bag, ready to serialize into the page.
    pub fn state_snapshot(&self) -> Value {
        Value::Object(self.read_state(Map::clone))
    }

    /// Mutate the document head.
    pub fn update_head<R>(&self, f: impl FnOnce(&mut Head) -> R) -> R {
        let mut head = self
            .inner
            .head
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        f(&mut head)
    }

    /// Snapshot of the document head.
    pub fn head(&self) -> Head {
        self.update_head(|head| head.clone())
    }

    /// Ask the server to answer with a redirect to `location`.
    ///
    /// Consumed by the hosting environment through [`take_redirect`](Self::take_redirect).
    /// A later call replaces an earlier one.
    pub fn redirect(&self, location: impl Into<String>) {
        *self.redirect_slot() = Some(location.into());
    }

    /// Pending server redirect, if a handler requested one.
    pub fn pending_redirect(&self) -> Option<String> {
        self.redirect_slot().clone()
    }

    /// Take the pending server redirect, clearing it.
    pub fn take_redirect(&self) -> Option<String> {
        self.redirect_slot().take()
    }

    fn redirect_slot(&self) -> std::sync::MutexGuard<'_, Option<String>> {
        self.inner
            .redirect
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for AppContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppContext")
            .field("is_client", &self.inner.is_client)
            .field("cookies", &self.inner.cookies)
            .finish_non_exhaustive()
    }
}

/// Builder for [`AppContext`].
#[derive(Debug, Default)]
#[must_use]
pub struct AppContextBuilder {
    is_client: bool,
    cookies: BTreeMap<String, String>,
    initial_state: Map<String, Value>,
}

impl AppContextBuilder {
    /// Whether the context runs in the browser. Defaults to `false`.
    pub fn client(mut self, is_client: bool) -> Self {
        self.is_client = is_client;
        self
    }

    pub fn cookie(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.cookies.insert(name.into(), value.into());
        self
    }

    /// Cookies already parsed by the host.
    pub fn cookies<I, K, V>(mut self, cookies: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.cookies
            .extend(cookies.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Seed the initial-state bag.
    pub fn initial_state(mut self, state: Map<String, Value>) -> Self {
        self.initial_state = state;
        self
    }

    pub fn build(self) -> AppContext {
        AppContext {
            inner: Arc::new(AppInner {
                is_client: self.is_client,
                cookies: self.cookies,
                initial_state: RwLock::new(self.initial_state),
                head: Mutex::new(Head::default()),
                redirect: Mutex::new(None),
            }),
        }
    }
}

// ============================================================================
// CustomProperties
// ============================================================================

/// Open key/value bag passed unchanged to every handler of a dispatch.
///
/// ```
/// use navigator_middleware::CustomProperties;
///
/// let props = CustomProperties::new()
///     .with("login_path", "/login")
///     .with("max_age", 3600);
/// assert_eq!(props.get_as::<String>("login_path").as_deref(), Some("/login"));
/// assert_eq!(props.get_as::<u64>("max_age"), Some(3600));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CustomProperties {
    values: Arc<Map<String, Value>>,
}

impl CustomProperties {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(values: Map<String, Value>) -> Self {
        Self {
            values: Arc::new(values),
        }
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        Arc::make_mut(&mut self.values).insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        T::deserialize(self.values.get(key)?).ok()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.values
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether both handles point at the same bag.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.values, &other.values)
    }
}

impl From<Map<String, Value>> for CustomProperties {
    fn from(values: Map<String, Value>) -> Self {
        Self::from_map(values)
    }
}

// ============================================================================
// MiddlewareContext
// ============================================================================

/// Ambient context merged with one navigation request.
///
/// Derefs to [`AppContext`], so `cx.is_client()` or `cx.cookie(..)` work
/// directly; the navigation fields are reached through [`to`](Self::to),
/// [`from`](Self::from) and [`next`](Self::next).
#[derive(Clone)]
pub struct MiddlewareContext {
    app: AppContext,
    to: Arc<RouteLocation>,
    from: Arc<RouteLocation>,
    proceed: Proceed,
}

impl MiddlewareContext {
    /// Ambient part of the context.
    pub fn app(&self) -> &AppContext {
        &self.app
    }

    /// Destination of the navigation.
    pub fn to(&self) -> &RouteLocation {
        &self.to
    }

    /// Origin of the navigation.
    pub fn from(&self) -> &RouteLocation {
        &self.from
    }

    /// The router's proceed callback for this navigation.
    pub fn next(&self) -> &Proceed {
        &self.proceed
    }
}

impl Deref for MiddlewareContext {
    type Target = AppContext;

    fn deref(&self) -> &AppContext {
        &self.app
    }
}

impl fmt::Debug for MiddlewareContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MiddlewareContext")
            .field("app", &self.app)
            .field("to", &self.to.path)
            .field("from", &self.from.path)
            .finish_non_exhaustive()
    }
}

/// Combine the ambient context with one navigation request.
///
/// The ambient handle is shared, not copied: writes made by handlers through
/// it stay visible to the host.
pub fn merge_context(app: &AppContext, request: NavigationRequest) -> MiddlewareContext {
    MiddlewareContext {
        app: app.clone(),
        to: Arc::new(request.to),
        from: Arc::new(request.from),
        proceed: request.proceed,
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(to: &str, from: &str, proceed: Proceed) -> NavigationRequest {
        NavigationRequest::new(RouteLocation::new(to), RouteLocation::new(from), proceed)
    }

    #[test]
    fn test_proceed_records_actions() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&calls);
        let proceed = Proceed::new(move |action| sink.lock().unwrap().push(action));

        proceed.proceed();
        proceed.clone().redirect("/login");
        proceed.abort("offline");

        assert_eq!(
            *calls.lock().unwrap(),
            [
                NavigationAction::Continue,
                NavigationAction::redirect("/login"),
                NavigationAction::deny("offline"),
            ]
        );
    }

    #[test]
    fn test_merge_exposes_both_parts() {
        let app = AppContext::builder()
            .client(true)
            .cookie("theme", "dark")
            .build();
        let cx = merge_context(&app, request("/secret", "/", Proceed::noop()));

        assert!(cx.is_client());
        assert_eq!(cx.cookie("theme"), Some("dark"));
        assert_eq!(cx.to().path, "/secret");
        assert_eq!(cx.from().path, "/");
    }

    #[test]
    fn test_merge_shares_ambient_state() {
        let app = AppContext::server();
        let cx = merge_context(&app, request("/a", "/", Proceed::noop()));

        cx.set_state("user", json!({ "id": 7 }));
        cx.update_head(|head| head.set_title("Secret"));
        cx.redirect("/");

        assert_eq!(app.state("user"), Some(json!({ "id": 7 })));
        assert_eq!(app.head().title(), Some("Secret"));
        assert_eq!(app.take_redirect().as_deref(), Some("/"));
        assert_eq!(app.pending_redirect(), None);
    }

    #[test]
    fn test_each_merge_is_independent() {
        let app = AppContext::server();
        let first = merge_context(&app, request("/one", "/", Proceed::noop()));
        let second = merge_context(&app, request("/two", "/one", Proceed::noop()));

        assert_eq!(first.to().path, "/one");
        assert_eq!(second.to().path, "/two");
        assert_eq!(second.from().path, "/one");
    }

    #[test]
    fn test_initial_state_seed_and_snapshot() {
        let mut seed = Map::new();
        seed.insert("locale".to_string(), json!("en"));
        let app = AppContext::builder().initial_state(seed).build();

        app.set_state("count", 2);
        assert_eq!(app.state_as::<String>("locale").as_deref(), Some("en"));
        assert_eq!(app.state_snapshot(), json!({ "locale": "en", "count": 2 }));
        assert_eq!(app.state_as::<u32>("locale"), None);
    }

    #[test]
    fn test_head_meta_replaces_by_name() {
        let mut head = Head::default();
        head.set_meta("robots", "index");
        head.set_meta("robots", "noindex");
        head.set_meta("author", "me");

        assert_eq!(head.meta("robots"), Some("noindex"));
        assert_eq!(head.meta_tags().len(), 2);
    }

    #[test]
    fn test_custom_properties() {
        let props = CustomProperties::new().with("retries", 3).with("tag", "x");
        let shared = props.clone();

        assert!(props.ptr_eq(&shared));
        assert_eq!(props.get_as::<u8>("retries"), Some(3));
        assert_eq!(props.get("tag"), Some(&json!("x")));
        assert_eq!(props.get_as::<u8>("tag"), None);
        assert_eq!(props.len(), 2);
    }
}
