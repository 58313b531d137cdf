use std::any::Any;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tracing::debug;

use crate::pattern::PatternTable;
use crate::store::StateStore;

/// A boxed, `Send`-able future returned by request handlers.
pub type BoxFuture = Pin<Box<dyn Future<Output = ()> + Send>>;

/// Type-erased payload carried by a request.
pub type Payload = Arc<dyn Any + Send + Sync>;

type ErasedHandler = Arc<dyn Fn(String, Payload, Arc<StateStore>) -> BoxFuture + Send + Sync>;

/// Request router: maps path patterns to async handlers.
///
/// Several handlers may match one request path; they run one after another
/// in registration order, each seeing the writes of the previous one.
pub struct Router {
    table: PatternTable<ErasedHandler>,
}

impl Router {
    pub fn new() -> Self {
        Self {
            table: PatternTable::new(),
        }
    }

    /// Register an async handler for a path pattern (`+`/`#` wildcards allowed).
    pub fn on<F, Fut>(&self, pattern: &str, handler: F)
    where
        F: Fn(String, Payload, Arc<StateStore>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let handler: ErasedHandler = Arc::new(
            move |path: String, payload: Payload, store: Arc<StateStore>| -> BoxFuture {
                Box::pin(handler(path, payload, store))
            },
        );
        self.table.insert(pattern, handler);
    }

    /// Dispatch a request to every matching handler. Unmatched requests are
    /// dropped silently.
    pub async fn dispatch(&self, path: &str, payload: Payload, store: Arc<StateStore>) {
        let handlers = self.table.match_path(path);
        if handlers.is_empty() {
            debug!("Router: no handler for {}", path);
            return;
        }
        for handler in handlers {
            handler(path.to_string(), Arc::clone(&payload), Arc::clone(&store)).await;
        }
    }

    /// Whether a handler was registered under exactly this pattern.
    pub fn has_handler(&self, pattern: &str) -> bool {
        self.table.has_pattern(pattern)
    }

    /// Whether any handler would receive a request on `path`.
    pub fn matches(&self, path: &str) -> bool {
        !self.table.match_path(path).is_empty()
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::RwLock;
    use std::sync::atomic::{AtomicU64, Ordering};

    fn test_store() -> Arc<StateStore> {
        Arc::new(StateStore::new())
    }

    // ========================================================================
    // Dispatch
    // ========================================================================

    #[tokio::test]
    async fn dispatch_exact_match() {
        let router = Router::new();
        let called = Arc::new(AtomicU64::new(0));
        let c = called.clone();
        router.on("auth/logout", move |_, _, _| {
            let c = c.clone();
            async move {
                c.fetch_add(1, Ordering::Relaxed);
            }
        });

        router.dispatch("auth/logout", Arc::new(()), test_store()).await;
        router.dispatch("auth/login", Arc::new(()), test_store()).await;
        assert_eq!(called.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn handler_receives_path_and_typed_payload() {
        struct Navigate {
            to: String,
        }

        let router = Router::new();
        let got = Arc::new(RwLock::new(Vec::<String>::new()));
        let g = got.clone();
        router.on("app/+", move |path, payload, _| {
            let g = g.clone();
            async move {
                if let Some(req) = payload.downcast_ref::<Navigate>() {
                    g.write().unwrap().push(format!("{} {}", path, req.to));
                }
            }
        });

        router
            .dispatch("app/navigate", Arc::new(Navigate { to: "/hosts".into() }), test_store())
            .await;
        router.dispatch("app/navigate", Arc::new(42u32), test_store()).await;

        assert_eq!(*got.read().unwrap(), vec!["app/navigate /hosts"]);
    }

    #[tokio::test]
    async fn handler_writes_state() {
        let router = Router::new();
        router.on("locale/set", |_, payload, store: Arc<StateStore>| async move {
            if let Some(code) = payload.downcast_ref::<String>() {
                store.set("app/locale", code.clone());
            }
        });

        let store = test_store();
        router
            .dispatch("locale/set", Arc::new("en-US".to_string()), store.clone())
            .await;
        assert_eq!(store.get_as::<String>("app/locale").unwrap(), "en-US");
    }

    #[tokio::test]
    async fn multiple_handlers_run_in_registration_order() {
        let router = Router::new();
        let order = Arc::new(RwLock::new(Vec::<u8>::new()));
        for (pattern, n) in [("#", 1u8), ("sidebar/toggle", 2), ("sidebar/+", 3)] {
            let o = order.clone();
            router.on(pattern, move |_, _, _| {
                let o = o.clone();
                async move {
                    o.write().unwrap().push(n);
                }
            });
        }

        router.dispatch("sidebar/toggle", Arc::new(()), test_store()).await;
        assert_eq!(*order.read().unwrap(), vec![1, 2, 3]);
    }

    // ========================================================================
    // Introspection
    // ========================================================================

    #[test]
    fn has_handler_and_matches() {
        let router = Router::new();
        router.on("resource/+", |_, _, _| async {});

        assert!(router.has_handler("resource/+"));
        assert!(!router.has_handler("resource/hosts"));
        assert!(router.matches("resource/hosts"));
        assert!(!router.matches("resource"));
    }
}
