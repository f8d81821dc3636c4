//! Backend-agnostic log macros.
//!
//! Every diagnostic the dispatcher emits goes through the macros below. Which
//! crate receives the record is decided at compile time by feature flag:
//!
//! | Feature    | Backend         | Default |
//! |------------|-----------------|---------|
//! | `log`      | `log` crate     | yes     |
//! | `tracing`  | `tracing` crate | no      |
//!
//! Enable at most one of the two. With neither enabled the macros expand to
//! nothing and the arguments are never evaluated.
//!
//! What gets logged where:
//!
//! - `trace_log!` — resolver internals (each declaration entry as it is classified).
//! - `debug_log!` — each handler invocation and the short-circuit / auto-proceed decision.
//! - `info_log!` — registry construction.
//! - `warn_log!` — declaration entries dropped by the resolver.
//! - `error_log!` — a handler returned an error and the chain was aborted.
//!
//! ```ignore
//! use navigator_middleware::{debug_log, warn_log};
//!
//! debug_log!("running middleware '{}' for '{}'", name, path);
//! warn_log!("middleware '{}' is not registered", name);
//! ```

#[doc(hidden)]
#[macro_export]
macro_rules! __dispatch_log {
    ($level:ident, $($arg:tt)*) => {
        #[cfg(feature = "tracing")]
        ::tracing::$level!($($arg)*);
        #[cfg(feature = "log")]
        ::log::$level!($($arg)*);
    };
}

/// Trace-level record. Accepts `format!`-style arguments.
#[macro_export]
macro_rules! trace_log {
    ($($arg:tt)*) => { $crate::__dispatch_log!(trace, $($arg)*) };
}

/// Debug-level record. Accepts `format!`-style arguments.
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => { $crate::__dispatch_log!(debug, $($arg)*) };
}

/// Info-level record. Accepts `format!`-style arguments.
#[macro_export]
macro_rules! info_log {
    ($($arg:tt)*) => { $crate::__dispatch_log!(info, $($arg)*) };
}

/// Warn-level record. Accepts `format!`-style arguments.
#[macro_export]
macro_rules! warn_log {
    ($($arg:tt)*) => { $crate::__dispatch_log!(warn, $($arg)*) };
}

/// Error-level record. Accepts `format!`-style arguments.
#[macro_export]
macro_rules! error_log {
    ($($arg:tt)*) => { $crate::__dispatch_log!(error, $($arg)*) };
}
