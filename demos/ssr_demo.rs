//! SSR Middleware Demo
//!
//! Simulates a server rendering two routes with a `logger` and an `auth`
//! middleware, once without and once with a `logged=true` cookie, then a
//! client-side navigation.
//!
//! Run with `RUST_LOG=debug cargo run --example ssr_demo` to see the
//! dispatcher's own log output.

use std::time::Instant;

use navigator_middleware::{
    define, define_sync, middleware_handler, AppContext, CustomProperties, MiddlewareDescriptor,
    NavigationAction, NavigationGuard, Proceed, RouteLocation, RouteMeta,
};

// ============================================================================
// Middleware
// ============================================================================

/// Logs every visited page.
fn logger() -> MiddlewareDescriptor {
    define("logger", |cx, props| async move {
        let side = if cx.is_client() { "client" } else { "server" };
        let app = props.get_as::<String>("app").unwrap_or_default();
        println!("[{app}/{side}] Visiting: {}", cx.to().path);
        true
    })
}

/// Lets logged-in users through, sends everyone else home.
fn auth() -> MiddlewareDescriptor {
    define_sync("auth", |cx, _| {
        if cx.cookie("logged") == Some("true") {
            return true;
        }

        if cx.is_server() {
            cx.redirect("/");
        } else {
            cx.next().redirect_with_reason("/", "not logged in");
        }
        false
    })
}

// ============================================================================
// Host
// ============================================================================

/// Route table of the demo application.
fn lookup(path: &str) -> RouteLocation {
    let location = RouteLocation::parse(path);
    match location.path.as_str() {
        "/" => location
            .name("Home")
            .meta(RouteMeta::with_middlewares(["logger"])),
        "/secret" => location
            .name("Secret")
            .meta(RouteMeta::with_middlewares(["logger", "auth"])),
        _ => location,
    }
}

/// Minimal `Cookie:` header parsing, as a server host would do it.
fn parse_cookie_header(header: &str) -> Vec<(String, String)> {
    header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .collect()
}

fn printing_proceed(label: &'static str) -> Proceed {
    Proceed::new(move |action| match action {
        NavigationAction::Continue => println!("  {label}: render destination"),
        NavigationAction::Redirect { to, reason } => {
            let why = reason.as_deref().unwrap_or("no reason");
            println!("  {label}: router redirect to {to} ({why})");
        }
        NavigationAction::Deny { reason } => println!("  {label}: cancelled ({reason})"),
    })
}

async fn render_on_server(url: &str, cookie_header: Option<&str>) {
    println!("GET {url} (cookie: {})", cookie_header.unwrap_or("-"));
    let started = Instant::now();

    let app = AppContext::builder()
        .cookies(cookie_header.map(parse_cookie_header).unwrap_or_default())
        .build();
    let guard = middleware_handler(
        app.clone(),
        [logger(), auth()],
        CustomProperties::new().with("app", "demo"),
    );

    let result = guard
        .before_each(lookup(url), lookup("/"), printing_proceed("server"))
        .await;

    match (result, app.take_redirect()) {
        (Err(err), _) => println!("  500: {err}"),
        (Ok(()), Some(location)) => println!("  302 Location: {location}"),
        (Ok(()), None) => println!("  200 OK"),
    }
    println!("  took {:?}\n", started.elapsed());
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    env_logger::init();

    render_on_server("/", None).await;
    render_on_server("/secret", None).await;
    render_on_server("/secret?tab=keys", Some("theme=dark; logged=true")).await;

    println!("client navigation / -> /secret");
    let client = AppContext::client();
    let guard = middleware_handler(client, [logger(), auth()], CustomProperties::new());
    if let Err(err) = guard
        .before_each(lookup("/secret"), lookup("/"), printing_proceed("client"))
        .await
    {
        println!("  navigation failed: {err}");
    }
}
