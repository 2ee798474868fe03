use std::future::Future;

use url::Url;

use crate::types::FormData;

/// The embedding browser shell that owns the target window.
///
/// The coordinator never touches windows directly; it asks the host and
/// records what happened. Report window closure back through
/// [`Coordinator::target_window_closed`](super::Coordinator::target_window_closed).
///
/// # Example
///
/// ```rust,ignore
/// impl WindowHost for Shell {
///     async fn open_target(&self, url: &Url) -> Result<(), Box<dyn Error + Send + Sync>> {
///         self.spawn_webview(url.as_str()).await?;
///         Ok(())
///     }
///
///     async fn focus_target(&self) {
///         self.webview().focus();
///     }
///
///     async fn send_fill(&self, data: &FormData) -> Result<(), Box<dyn Error + Send + Sync>> {
///         self.webview().post_message("fill-form", serde_json::to_value(data)?)?;
///         Ok(())
///     }
/// }
/// ```
pub trait WindowHost: Send + Sync + 'static {
    /// Open the target window on `url`.
    fn open_target(
        &self,
        url: &Url,
    ) -> impl Future<Output = Result<(), Box<dyn std::error::Error + Send + Sync>>> + Send;

    /// Bring the target window to the front.
    fn focus_target(&self) -> impl Future<Output = ()> + Send;

    /// Push field values to the page context (fire-and-forget `fill-form`).
    fn send_fill(
        &self,
        data: &FormData,
    ) -> impl Future<Output = Result<(), Box<dyn std::error::Error + Send + Sync>>> + Send;
}
