use async_trait::async_trait;

/// Output port: something that re-renders from a freshly saved snapshot.
#[async_trait]
pub trait RenderSurface: Send + Sync + 'static {
    async fn render(&self, key: &str, serialized: &str);
}
