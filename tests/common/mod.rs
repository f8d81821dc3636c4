//! Test utilities for dispatch tests
//!
//! Recording proceed callbacks, call logs and route fixtures.

#![allow(dead_code)]

use navigator_middleware::*;
use std::sync::{Arc, Mutex};

/// Ordered log of handler invocations
pub type CallLog = Arc<Mutex<Vec<String>>>;

/// Proceed callback that records every instruction it receives
#[derive(Clone, Default)]
pub struct ProceedRecorder {
    calls: Arc<Mutex<Vec<NavigationAction>>>,
}

impl ProceedRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// A `Proceed` that feeds this recorder
    pub fn proceed(&self) -> Proceed {
        let calls = Arc::clone(&self.calls);
        Proceed::new(move |action| calls.lock().unwrap().push(action))
    }

    pub fn calls(&self) -> Vec<NavigationAction> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

/// Create an empty call log
pub fn call_log() -> CallLog {
    Arc::new(Mutex::new(Vec::new()))
}

/// Snapshot of a call log
pub fn entries(log: &CallLog) -> Vec<String> {
    log.lock().unwrap().clone()
}

/// Sync middleware that logs its name and returns `result`
pub fn recording(name: &'static str, log: &CallLog, result: bool) -> MiddlewareDescriptor {
    let log = Arc::clone(log);
    define_sync(name, move |_, _| {
        log.lock().unwrap().push(name.to_string());
        result
    })
}

/// Route location declaring the given middleware names
pub fn route_with(path: &str, names: &[&str]) -> RouteLocation {
    RouteLocation::new(path).meta(RouteMeta::with_middlewares(names.iter().copied()))
}

/// Route location with no middleware metadata
pub fn plain_route(path: &str) -> RouteLocation {
    RouteLocation::new(path)
}
