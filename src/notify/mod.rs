//! Outbound notification seam. Delivery is fire-and-forget: a failed or
//! missing notification never blocks the operation that triggered it.

use async_trait::async_trait;
use uuid::Uuid;

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, user_id: Uuid, title: &str, message: &str);
}

/// Default backend: structured log lines only. Real delivery channels hang
/// off this trait without touching the services.
#[derive(Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, user_id: Uuid, title: &str, message: &str) {
        tracing::info!(%user_id, title, message, "notification");
    }
}
