//! Discord REST notifier.
//!
//! Messages are posted with a bot token; no gateway connection is needed to
//! send.

use async_trait::async_trait;
use mythicplus_core::entities::RichMessage;
use mythicplus_core::ports::Notifier;
use mythicplus_core::Error;
use reqwest::{header, Client};
use serde::Serialize;
use tracing::{debug, instrument};

const API_BASE_URL: &str = "https://discord.com/api/v10";

#[derive(Debug, Serialize)]
struct CreateMessage<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<&'a str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    embeds: Vec<Embed<'a>>,
}

#[derive(Debug, Serialize)]
struct Embed<'a> {
    title: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    color: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    image: Option<EmbedMedia<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    thumbnail: Option<EmbedMedia<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    author: Option<EmbedAuthor<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    fields: Vec<EmbedField<'a>>,
}

#[derive(Debug, Serialize)]
struct EmbedField<'a> {
    name: &'a str,
    value: &'a str,
    inline: bool,
}

#[derive(Debug, Serialize)]
struct EmbedMedia<'a> {
    url: &'a str,
}

#[derive(Debug, Serialize)]
struct EmbedAuthor<'a> {
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    icon_url: Option<&'a str>,
}

impl<'a> From<&'a RichMessage> for CreateMessage<'a> {
    fn from(message: &'a RichMessage) -> Self {
        let embed = Embed {
            title: &message.title,
            url: message.url.as_deref(),
            description: message.description.as_deref(),
            color: message.color,
            image: message.image_url.as_deref().map(|url| EmbedMedia { url }),
            thumbnail: message
                .thumbnail_url
                .as_deref()
                .map(|url| EmbedMedia { url }),
            author: message.author.as_ref().map(|a| EmbedAuthor {
                name: &a.name,
                icon_url: a.icon_url.as_deref(),
            }),
            fields: message
                .fields
                .iter()
                .map(|f| EmbedField {
                    name: &f.name,
                    value: &f.value,
                    inline: f.inline,
                })
                .collect(),
        };

        Self {
            content: message.content.as_deref(),
            embeds: vec![embed],
        }
    }
}

pub struct DiscordNotifier {
    client: Client,
    base_url: String,
    token: String,
}

impl DiscordNotifier {
    pub fn new(client: Client, token: impl Into<String>) -> Self {
        Self {
            client,
            base_url: API_BASE_URL.to_string(),
            token: token.into(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn create_message(&self, channel_id: &str, body: &CreateMessage<'_>) -> Result<(), Error> {
        let url = format!("{}/channels/{}/messages", self.base_url, channel_id);

        let response = self
            .client
            .post(&url)
            .header(header::AUTHORIZATION, format!("Bot {}", self.token))
            .json(body)
            .send()
            .await
            .map_err(|e| Error::Notify(format!("discord request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::Notify(format!(
                "discord returned {}",
                response.status()
            )));
        }

        debug!(channel_id, "message sent");
        Ok(())
    }
}

#[async_trait]
impl Notifier for DiscordNotifier {
    #[instrument(skip(self, content))]
    async fn send_message(&self, channel_id: &str, content: &str) -> Result<(), Error> {
        let body = CreateMessage {
            content: Some(content),
            embeds: Vec::new(),
        };
        self.create_message(channel_id, &body).await
    }

    #[instrument(skip(self, message), fields(title = %message.title))]
    async fn send_rich_message(
        &self,
        channel_id: &str,
        message: &RichMessage,
    ) -> Result<(), Error> {
        self.create_message(channel_id, &CreateMessage::from(message))
            .await
    }
}
