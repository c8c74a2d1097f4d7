//! Static-site hit counting
//!
//! A process-wide counter incremented for every request that reaches the
//! static file mount, read by the admin metrics page.

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error,
};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

#[derive(Default)]
pub struct SiteHits {
    count: AtomicI64,
}

impl SiteHits {
    pub fn increment(&self) {
        self.count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn current(&self) -> i64 {
        self.count.load(Ordering::Relaxed)
    }

    pub fn reset(&self) {
        self.count.store(0, Ordering::Relaxed);
    }
}

/// Wraps the static file mount; counts and forwards.
pub struct CountHits {
    hits: Arc<SiteHits>,
}

impl CountHits {
    pub fn new(hits: Arc<SiteHits>) -> Self {
        Self { hits }
    }
}

impl<S, B> Transform<S, ServiceRequest> for CountHits
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = CountHitsService<S>;
    type Future = std::future::Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        std::future::ready(Ok(CountHitsService {
            service,
            hits: self.hits.clone(),
        }))
    }
}

pub struct CountHitsService<S> {
    service: S,
    hits: Arc<SiteHits>,
}

impl<S, B> Service<ServiceRequest> for CountHitsService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = S::Future;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        self.hits.increment();
        self.service.call(req)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_and_resets() {
        let hits = SiteHits::default();
        assert_eq!(hits.current(), 0);

        hits.increment();
        hits.increment();
        assert_eq!(hits.current(), 2);

        hits.reset();
        assert_eq!(hits.current(), 0);
    }
}
