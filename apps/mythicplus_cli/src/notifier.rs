use async_trait::async_trait;
use mythicplus_adapters::{DiscordNotifier, LogNotifier};
use mythicplus_core::entities::RichMessage;
use mythicplus_core::ports::Notifier;
use mythicplus_core::Error;

/// Notifier picked at startup from whether a Discord token is configured
pub enum ChatNotifier {
    Discord(DiscordNotifier),
    Log(LogNotifier),
}

impl ChatNotifier {
    pub fn is_discord(&self) -> bool {
        matches!(self, ChatNotifier::Discord(_))
    }
}

#[async_trait]
impl Notifier for ChatNotifier {
    async fn send_message(&self, channel_id: &str, content: &str) -> Result<(), Error> {
        match self {
            ChatNotifier::Discord(n) => n.send_message(channel_id, content).await,
            ChatNotifier::Log(n) => n.send_message(channel_id, content).await,
        }
    }

    async fn send_rich_message(
        &self,
        channel_id: &str,
        message: &RichMessage,
    ) -> Result<(), Error> {
        match self {
            ChatNotifier::Discord(n) => n.send_rich_message(channel_id, message).await,
            ChatNotifier::Log(n) => n.send_rich_message(channel_id, message).await,
        }
    }
}
