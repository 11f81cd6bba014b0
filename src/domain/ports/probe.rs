use async_trait::async_trait;

/// A reachability check against an external dependency.
///
/// Implementations swallow their own errors: a probe answers yes or no.
#[async_trait]
pub trait DependencyProbe: Send + Sync {
    fn name(&self) -> &'static str;
    async fn ping(&self) -> bool;
}
