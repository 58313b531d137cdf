use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

/// A type-erased, reference-counted state value.
///
/// Cloning only bumps the reference count, so every subscriber and reader
/// sees the same allocation.
#[derive(Clone)]
pub struct StateValue {
    inner: Arc<dyn Any + Send + Sync>,
}

impl StateValue {
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self {
            inner: Arc::new(value),
        }
    }

    /// Borrow the value as `T`. `None` on a type mismatch.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.inner.downcast_ref::<T>()
    }

    /// Clone the value out as `T`. `None` on a type mismatch.
    pub fn cloned<T: Any + Clone>(&self) -> Option<T> {
        self.downcast_ref::<T>().cloned()
    }

    pub fn is<T: Any>(&self) -> bool {
        self.inner.is::<T>()
    }

    pub fn type_id(&self) -> TypeId {
        (*self.inner).type_id()
    }

    /// Number of live handles to the underlying value.
    pub fn ref_count(&self) -> usize {
        Arc::strong_count(&self.inner)
    }
}

impl fmt::Debug for StateValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateValue")
            .field("type_id", &(*self.inner).type_id())
            .finish()
    }
}

/// Handle returned by `StateStore::subscribe()`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub(crate) u64);

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct RouteState {
        path: String,
        page: &'static str,
    }

    #[test]
    fn downcast_matching_type() {
        let v = StateValue::new(RouteState {
            path: "/hosts".into(),
            page: "hosts",
        });
        assert_eq!(v.downcast_ref::<RouteState>().unwrap().page, "hosts");
        assert!(v.is::<RouteState>());
        assert_eq!(v.type_id(), TypeId::of::<RouteState>());
    }

    #[test]
    fn downcast_wrong_type_is_none() {
        let v = StateValue::new("zh-CN".to_string());
        assert!(v.downcast_ref::<u32>().is_none());
        assert!(v.downcast_ref::<&str>().is_none());
        assert!(v.cloned::<RouteState>().is_none());
    }

    #[test]
    fn cloned_returns_owned_copy() {
        let v = StateValue::new(vec!["hostCategory".to_string()]);
        let open: Vec<String> = v.cloned().unwrap();
        assert_eq!(open, vec!["hostCategory"]);
    }

    #[test]
    fn clone_shares_allocation() {
        let v1 = StateValue::new(vec![0u8; 4096]);
        let v2 = v1.clone();
        assert_eq!(v1.ref_count(), 2);

        let p1 = v1.downcast_ref::<Vec<u8>>().unwrap().as_ptr();
        let p2 = v2.downcast_ref::<Vec<u8>>().unwrap().as_ptr();
        assert_eq!(p1, p2);

        drop(v2);
        assert_eq!(v1.ref_count(), 1);
    }

    #[test]
    fn option_values() {
        let v = StateValue::new(None::<String>);
        assert_eq!(v.cloned::<Option<String>>(), Some(None));
    }

    #[test]
    fn debug_format() {
        let debug = format!("{:?}", StateValue::new(1u8));
        assert!(debug.contains("StateValue"));
        assert!(format!("{:?}", SubscriptionId(7)).contains('7'));
    }

    fn _assert_send_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}
        assert_send::<StateValue>();
        assert_sync::<StateValue>();
    }
}
