//! Middleware resolution: route declaration → concrete chain.
//!
//! Resolution is a pure function of the declaration and the
//! [`MiddlewareRegistry`]. Each entry is classified:
//!
//! | Entry | Result |
//! |-------|--------|
//! | `Named(s)`, `s` registered | first descriptor registered as `s` |
//! | `Named(s)`, `s` unknown | dropped |
//! | `Inline(d)` with a non-empty name | `d` as-is |
//! | `Inline(d)` with an empty name | dropped |
//!
//! Dropped entries leave no gap; the remaining ones keep their relative
//! order. A missing or empty declaration resolves to `None`, meaning "no
//! middleware applies" (distinct from a chain that ended up empty).
//!
//! Under the default [`UnresolvedPolicy::Skip`] drops are only reported
//! through `warn_log!`. [`UnresolvedPolicy::Reject`] turns them into
//! [`MiddlewareError::Unresolved`].

use crate::error::MiddlewareError;
use crate::middleware::{
    MiddlewareDeclaration, MiddlewareDescriptor, MiddlewareEntry, MiddlewareRegistry,
};
use crate::{trace_log, warn_log};

/// What to do with declaration entries that cannot be resolved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UnresolvedPolicy {
    /// Drop them and run the rest of the chain.
    #[default]
    Skip,

    /// Fail the dispatch with [`MiddlewareError::Unresolved`].
    Reject,
}

/// Resolved, ordered list of middleware for one navigation.
#[derive(Debug, Clone, Default)]
pub struct Chain {
    middlewares: Vec<MiddlewareDescriptor>,
}

impl Chain {
    pub fn new(middlewares: Vec<MiddlewareDescriptor>) -> Self {
        Self { middlewares }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MiddlewareDescriptor> {
        self.middlewares.iter()
    }

    /// Names in execution order.
    pub fn names(&self) -> Vec<&str> {
        self.middlewares.iter().map(MiddlewareDescriptor::name).collect()
    }

    pub fn len(&self) -> usize {
        self.middlewares.len()
    }

    pub fn is_empty(&self) -> bool {
        self.middlewares.is_empty()
    }
}

impl FromIterator<MiddlewareDescriptor> for Chain {
    fn from_iter<I: IntoIterator<Item = MiddlewareDescriptor>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Resolve a declaration, silently dropping what cannot be resolved.
///
/// ```
/// use navigator_middleware::{define_sync, resolve, MiddlewareDeclaration, MiddlewareRegistry};
///
/// let registry = MiddlewareRegistry::new([
///     define_sync("a", |_, _| true),
///     define_sync("b", |_, _| true),
/// ]);
/// let declaration = MiddlewareDeclaration::from_names(["b", "typo", "a"]);
///
/// let chain = resolve(Some(&declaration), &registry).unwrap();
/// assert_eq!(chain.names(), ["b", "a"]);
///
/// assert!(resolve(None, &registry).is_none());
/// ```
pub fn resolve(
    declared: Option<&MiddlewareDeclaration>,
    known: &MiddlewareRegistry,
) -> Option<Chain> {
    resolve_entries(declared, known).map(|(chain, _)| chain)
}

/// Resolve a declaration under an explicit [`UnresolvedPolicy`].
pub fn resolve_with(
    declared: Option<&MiddlewareDeclaration>,
    known: &MiddlewareRegistry,
    policy: UnresolvedPolicy,
) -> Result<Option<Chain>, MiddlewareError> {
    match resolve_entries(declared, known) {
        Some((_, dropped)) if policy == UnresolvedPolicy::Reject && !dropped.is_empty() => {
            Err(MiddlewareError::Unresolved { names: dropped })
        }
        resolved => Ok(resolved.map(|(chain, _)| chain)),
    }
}

/// Shared resolution pass. Returns the chain and the labels of dropped entries.
fn resolve_entries(
    declared: Option<&MiddlewareDeclaration>,
    known: &MiddlewareRegistry,
) -> Option<(Chain, Vec<String>)> {
    let declared = declared.filter(|d| !d.is_empty())?;

    let mut middlewares = Vec::with_capacity(declared.len());
    let mut dropped = Vec::new();

    for entry in declared {
        if let Some(descriptor) = resolve_entry(entry, known) {
            trace_log!("Resolved middleware entry '{}'", entry.label());
            middlewares.push(descriptor.clone());
        } else {
            warn_log!(
                "Dropping middleware entry '{}': not registered or malformed",
                entry.label()
            );
            dropped.push(entry.label());
        }
    }

    Some((Chain::new(middlewares), dropped))
}

fn resolve_entry<'a>(
    entry: &'a MiddlewareEntry,
    known: &'a MiddlewareRegistry,
) -> Option<&'a MiddlewareDescriptor> {
    match entry {
        MiddlewareEntry::Named(name) => known.get(name),
        MiddlewareEntry::Inline(descriptor) if descriptor.is_well_formed() => Some(descriptor),
        MiddlewareEntry::Inline(_) => None,
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::define_sync;

    fn registry() -> MiddlewareRegistry {
        MiddlewareRegistry::new([
            define_sync("a", |_, _| true),
            define_sync("b", |_, _| true),
            define_sync("c", |_, _| true),
        ])
    }

    #[test]
    fn test_absent_declaration_is_not_applicable() {
        assert!(resolve(None, &registry()).is_none());
    }

    #[test]
    fn test_empty_declaration_is_not_applicable() {
        let declaration = MiddlewareDeclaration::new();
        assert!(resolve(Some(&declaration), &registry()).is_none());
    }

    #[test]
    fn test_declaration_order_wins_over_registration_order() {
        let declaration = MiddlewareDeclaration::from_names(["c", "a", "b"]);
        let chain = resolve(Some(&declaration), &registry()).unwrap();
        assert_eq!(chain.names(), ["c", "a", "b"]);
    }

    #[test]
    fn test_unknown_names_are_dropped_without_gaps() {
        let declaration = MiddlewareDeclaration::from_names(["x", "b", "y", "a"]);
        let chain = resolve(Some(&declaration), &registry()).unwrap();
        assert_eq!(chain.names(), ["b", "a"]);
    }

    #[test]
    fn test_only_unknown_names_yield_empty_chain() {
        let declaration = MiddlewareDeclaration::from_names(["x", "y"]);
        let chain = resolve(Some(&declaration), &registry()).unwrap();
        assert!(chain.is_empty());
    }

    #[test]
    fn test_inline_descriptors() {
        let inline = define_sync("inline", |_, _| true);
        let declaration = MiddlewareDeclaration::new()
            .named("a")
            .inline(inline.clone())
            .inline(define_sync("", |_, _| true))
            .named("b");

        let chain = resolve(Some(&declaration), &registry()).unwrap();
        assert_eq!(chain.names(), ["a", "inline", "b"]);
        assert!(chain.iter().nth(1).unwrap().ptr_eq(&inline));
    }

    #[test]
    fn test_inline_name_does_not_need_registration() {
        let declaration = MiddlewareDeclaration::new().inline(define_sync("a", |_, _| false));
        let chain = resolve(Some(&declaration), &registry()).unwrap();

        // The inline descriptor is used, not the registered "a".
        let registered = registry();
        assert!(!chain.iter().next().unwrap().ptr_eq(registered.get("a").unwrap()));
    }

    #[test]
    fn test_duplicate_names_resolve_to_first() {
        let first = define_sync("dup", |_, _| true);
        let known = MiddlewareRegistry::new([first.clone(), define_sync("dup", |_, _| false)]);
        let declaration = MiddlewareDeclaration::from_names(["dup"]);

        let chain = resolve(Some(&declaration), &known).unwrap();
        assert!(chain.iter().next().unwrap().ptr_eq(&first));
    }

    #[test]
    fn test_reject_policy_lists_every_drop() {
        let declaration = MiddlewareDeclaration::new()
            .named("a")
            .named("typo")
            .inline(define_sync("", |_, _| true));

        let err = resolve_with(Some(&declaration), &registry(), UnresolvedPolicy::Reject)
            .unwrap_err();
        match err {
            MiddlewareError::Unresolved { names } => assert_eq!(names, ["typo", "<inline>"]),
            other => panic!("Expected Unresolved, got {other:?}"),
        }
    }

    #[test]
    fn test_reject_policy_accepts_clean_declaration() {
        let declaration = MiddlewareDeclaration::from_names(["a", "b"]);
        let chain = resolve_with(Some(&declaration), &registry(), UnresolvedPolicy::Reject)
            .unwrap()
            .unwrap();
        assert_eq!(chain.len(), 2);

        assert!(resolve_with(None, &registry(), UnresolvedPolicy::Reject)
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_skip_policy_matches_resolve() {
        let declaration = MiddlewareDeclaration::from_names(["typo", "c"]);
        let chain = resolve_with(Some(&declaration), &registry(), UnresolvedPolicy::Skip)
            .unwrap()
            .unwrap();
        assert_eq!(chain.names(), ["c"]);
    }
}
