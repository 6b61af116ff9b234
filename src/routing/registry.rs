//! Route registry
//!
//! Bindings are kept in insertion order and scanned linearly; the first binding
//! whose path and method both match wins. Registration holds the write lock for
//! the whole check-then-append, lookups share the read lock.

use hyper::Method;
use parking_lot::RwLock;
use std::sync::Arc;

use super::binding::{Handler, RouteBinding};
use crate::error::{Error, Result};
use crate::logger;

#[derive(Debug, Default)]
pub struct Registry {
    routes: RwLock<Vec<Arc<RouteBinding>>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `handler` to `(path, method)`.
    ///
    /// Fails with [`Error::DuplicateRoute`] if the pair is already bound; the
    /// registry is left untouched in that case.
    pub fn register<H: Handler>(
        &self,
        path: impl Into<String>,
        method: Method,
        handler: H,
    ) -> Result<()> {
        let path = path.into();
        if path.is_empty() {
            return Err(Error::InvalidRoute("path must not be empty".to_string()));
        }

        let mut routes = self.routes.write();
        if routes.iter().any(|r| r.matches(&path, &method)) {
            return Err(Error::DuplicateRoute { path, method });
        }

        logger::log_route_registered(&path, &method);
        routes.push(Arc::new(RouteBinding::new(path, method, handler)));
        Ok(())
    }

    /// First binding, in insertion order, for `(path, method)`
    pub fn lookup(&self, path: &str, method: &Method) -> Option<Arc<RouteBinding>> {
        self.routes
            .read()
            .iter()
            .find(|r| r.matches(path, method))
            .cloned()
    }

    /// `(path, method)` pairs in registration order
    pub fn routes(&self) -> Vec<(String, Method)> {
        self.routes
            .read()
            .iter()
            .map(|r| (r.path().to_string(), r.method().clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.routes.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::RequestContext;
    use crate::routing::Reply;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn tagged(tag: &'static str) -> impl Fn(&mut RequestContext) -> Reply<&'static str> {
        move |_ctx: &mut RequestContext| Reply::ok(tag)
    }

    fn body_of(binding: &RouteBinding) -> serde_json::Value {
        let mut ctx = RequestContext::new(binding.method().clone(), binding.path());
        let bytes = binding.respond(&mut ctx).1.unwrap();
        serde_json::from_slice::<serde_json::Value>(&bytes).unwrap()["body"].clone()
    }

    #[test]
    fn test_register_and_lookup() {
        let registry = Registry::new();
        registry.register("/ping", Method::GET, tagged("ping")).unwrap();

        let found = registry.lookup("/ping", &Method::GET).unwrap();
        assert_eq!(found.path(), "/ping");
        assert_eq!(body_of(&found), json!("ping"));
        assert!(registry.lookup("/ping", &Method::POST).is_none());
        assert!(registry.lookup("/pong", &Method::GET).is_none());
    }

    #[test]
    fn test_duplicate_route_rejected() {
        let registry = Registry::new();
        registry.register("/a", Method::GET, tagged("first")).unwrap();

        let err = registry
            .register("/a", Method::GET, tagged("second"))
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateRoute { ref path, .. } if path == "/a"));

        assert_eq!(registry.len(), 1);
        let found = registry.lookup("/a", &Method::GET).unwrap();
        assert_eq!(body_of(&found), json!("first"));
    }

    #[test]
    fn test_same_path_different_methods() {
        let registry = Registry::new();
        registry.register("/item", Method::GET, tagged("get")).unwrap();
        registry.register("/item", Method::POST, tagged("post")).unwrap();

        assert_eq!(registry.len(), 2);
        let post = registry.lookup("/item", &Method::POST).unwrap();
        assert_eq!(body_of(&post), json!("post"));
    }

    #[test]
    fn test_routes_keep_insertion_order() {
        let registry = Registry::new();
        registry.register("/b", Method::GET, tagged("b")).unwrap();
        registry.register("/a", Method::PUT, tagged("a")).unwrap();
        registry.register("/c", Method::DELETE, tagged("c")).unwrap();

        assert_eq!(
            registry.routes(),
            vec![
                ("/b".to_string(), Method::GET),
                ("/a".to_string(), Method::PUT),
                ("/c".to_string(), Method::DELETE),
            ]
        );
    }

    #[test]
    fn test_empty_path_rejected() {
        let registry = Registry::new();
        let err = registry.register("", Method::GET, tagged("x")).unwrap_err();
        assert!(matches!(err, Error::InvalidRoute(_)));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_method_comparison_is_case_sensitive() {
        let registry = Registry::new();
        let lower = Method::from_bytes(b"get").unwrap();
        registry.register("/x", lower.clone(), tagged("lower")).unwrap();
        registry.register("/x", Method::GET, tagged("upper")).unwrap();
        assert_eq!(registry.len(), 2);
        assert!(registry.lookup("/x", &lower).is_some());
    }

    #[test]
    fn test_concurrent_duplicate_registration() {
        let registry = Registry::new();
        let successes = AtomicUsize::new(0);

        std::thread::scope(|s| {
            for _ in 0..8 {
                s.spawn(|| {
                    if registry.register("/race", Method::GET, tagged("r")).is_ok() {
                        successes.fetch_add(1, Ordering::SeqCst);
                    }
                });
            }
        });

        assert_eq!(successes.load(Ordering::SeqCst), 1);
        assert_eq!(registry.len(), 1);
    }
}
