use super::status::Observation;
use crate::error::Result;
use async_trait::async_trait;
use std::fmt;
use std::future::Future;

/// A single status lookup against the remote system.
///
/// Implementations perform exactly one bounded read per call and must be
/// safe to call repeatedly. A missing resource is reported as
/// [`Observation::not_found`], never as an error. Errors are terminal for the
/// watch that issued the call; transient-error retry, if wanted, belongs
/// inside the implementation.
#[async_trait]
pub trait Refresh: Send + Sync {
    type Resource: Send + fmt::Debug;

    async fn refresh(&self) -> Result<Observation<Self::Resource>>;
}

/// Adapter turning an async closure into a [`Refresh`]
pub struct RefreshFn<F> {
    f: F,
}

/// Wrap `f` so it can drive a watch
///
/// ```ignore
/// let refresh = refresh_fn(move || {
///     let api = api.clone();
///     async move { lookup(&api).await }
/// });
/// ```
pub const fn refresh_fn<F>(f: F) -> RefreshFn<F> {
    RefreshFn { f }
}

#[async_trait]
impl<F, Fut, R> Refresh for RefreshFn<F>
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = Result<Observation<R>>> + Send,
    R: Send + fmt::Debug,
{
    type Resource = R;

    async fn refresh(&self) -> Result<Observation<R>> {
        (self.f)().await
    }
}
