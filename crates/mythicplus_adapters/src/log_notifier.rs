use async_trait::async_trait;
use mythicplus_core::entities::RichMessage;
use mythicplus_core::ports::Notifier;
use mythicplus_core::Error;
use tracing::info;

/// Notifier that writes messages to the log instead of a chat channel.
/// Used when no Discord token is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send_message(&self, channel_id: &str, content: &str) -> Result<(), Error> {
        info!(channel_id, %content, "notification");
        Ok(())
    }

    async fn send_rich_message(
        &self,
        channel_id: &str,
        message: &RichMessage,
    ) -> Result<(), Error> {
        info!(
            channel_id,
            title = %message.title,
            content = message.content.as_deref().unwrap_or_default(),
            description = message.description.as_deref().unwrap_or_default(),
            "notification"
        );
        Ok(())
    }
}
