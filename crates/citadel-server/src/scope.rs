//! Per-request resource scope.
//!
//! A [`RequestScope`] is acquired right before a handler runs and released
//! right after, whether the handler returns, fails or panics. Typical scopes
//! open a database session or install a per-request cache.

use citadel_core::RequestContext;

/// Hooks run around every handler invocation.
pub trait RequestScope: Send + Sync + 'static {
    /// Called before the handler.
    fn acquire(&self, ctx: &RequestContext);

    /// Called after the handler, exactly once per `acquire`.
    fn release(&self, ctx: &RequestContext);
}

/// A scope that does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopScope;

impl RequestScope for NoopScope {
    fn acquire(&self, _ctx: &RequestContext) {}

    fn release(&self, _ctx: &RequestContext) {}
}

/// Releases the scope on drop.
pub(crate) struct ScopeGuard<'a> {
    scope: &'a dyn RequestScope,
    ctx: &'a RequestContext,
}

impl<'a> ScopeGuard<'a> {
    pub(crate) fn acquire(scope: &'a dyn RequestScope, ctx: &'a RequestContext) -> Self {
        scope.acquire(ctx);
        Self { scope, ctx }
    }
}

impl Drop for ScopeGuard<'_> {
    fn drop(&mut self) {
        self.scope.release(self.ctx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct Counting {
        acquired: AtomicUsize,
        released: AtomicUsize,
    }

    impl RequestScope for Counting {
        fn acquire(&self, _ctx: &RequestContext) {
            self.acquired.fetch_add(1, Ordering::SeqCst);
        }

        fn release(&self, _ctx: &RequestContext) {
            self.released.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_guard_releases_on_drop() {
        let scope = Counting::default();
        let ctx = RequestContext::mock();

        {
            let _guard = ScopeGuard::acquire(&scope, &ctx);
            assert_eq!(scope.acquired.load(Ordering::SeqCst), 1);
            assert_eq!(scope.released.load(Ordering::SeqCst), 0);
        }

        assert_eq!(scope.released.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_guard_releases_on_panic() {
        let scope = Counting::default();
        let ctx = RequestContext::mock();

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = ScopeGuard::acquire(&scope, &ctx);
            panic!("handler blew up");
        }));

        assert!(result.is_err());
        assert_eq!(scope.released.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_noop_scope() {
        let ctx = RequestContext::mock();
        let _guard = ScopeGuard::acquire(&NoopScope, &ctx);
    }
}
