//! Telegram Bot API over HTTPS.

use super::{Batch, ChatKind, Inbound, Transport};
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::time::Duration;
use suitwatch_types::AnnouncementHandle;
use thiserror::Error as ThisError;
use url::Url;

/// Slack added to the long-poll timeout before the HTTP request itself times out.
const REQUEST_TIMEOUT_SLACK: Duration = Duration::from_secs(10);

/// Timeout for send and edit requests.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const ALLOWED_UPDATES: [&str; 4] = [
    "message",
    "edited_message",
    "channel_post",
    "edited_channel_post",
];

#[derive(Debug, ThisError)]
pub enum Error {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("invalid endpoint url: {0}")]
    Url(#[from] url::ParseError),
    #[error("{method} rejected: {description}")]
    Api {
        method: &'static str,
        description: String,
    },
    #[error("{method} returned no result")]
    MissingResult { method: &'static str },
}

#[derive(Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

#[derive(Deserialize)]
struct RawUpdate {
    update_id: i64,
    message: Option<RawMessage>,
    edited_message: Option<RawMessage>,
    channel_post: Option<RawMessage>,
    edited_channel_post: Option<RawMessage>,
}

#[derive(Deserialize)]
struct RawMessage {
    message_id: i64,
    chat: RawChat,
    from: Option<RawUser>,
    text: Option<String>,
    caption: Option<String>,
}

#[derive(Deserialize)]
struct RawChat {
    id: i64,
    #[serde(rename = "type")]
    kind: String,
}

#[derive(Deserialize)]
struct RawUser {
    id: i64,
}

#[derive(Serialize)]
struct GetUpdates<'a> {
    offset: i64,
    timeout: u64,
    allowed_updates: &'a [&'a str],
}

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: i64,
    text: &'a str,
}

#[derive(Serialize)]
struct EditMessageText<'a> {
    chat_id: i64,
    message_id: i64,
    text: &'a str,
}

impl RawUpdate {
    fn into_inbound(self) -> Option<Inbound> {
        let update_id = self.update_id;
        let (message, edited) = match (
            self.message,
            self.edited_message,
            self.channel_post,
            self.edited_channel_post,
        ) {
            (Some(message), ..) => (message, false),
            (None, Some(message), ..) => (message, true),
            (None, None, Some(message), _) => (message, false),
            (None, None, None, Some(message)) => (message, true),
            (None, None, None, None) => return None,
        };
        let chat_kind = match message.chat.kind.as_str() {
            "private" => ChatKind::Private,
            "channel" => ChatKind::Channel,
            _ => ChatKind::Group,
        };
        let text = message.text.or(message.caption)?;
        Some(Inbound {
            update_id,
            chat_id: message.chat.id,
            chat_kind,
            sender_id: message.from.map(|user| user.id),
            text,
            edited,
        })
    }
}

/// Updates without text are dropped but still acknowledged through `last_update_id`.
fn into_batch(updates: Vec<RawUpdate>) -> Batch {
    let last_update_id = updates.iter().map(|update| update.update_id).max();
    Batch {
        last_update_id,
        updates: updates
            .into_iter()
            .filter_map(RawUpdate::into_inbound)
            .collect(),
    }
}

/// Bot API client bound to one bot token.
#[derive(Clone)]
pub struct BotApi {
    client: Client,
    endpoint: Url,
}

impl BotApi {
    pub fn new(base_url: &Url, token: &str) -> Result<Self, Error> {
        let base = base_url.as_str().trim_end_matches('/');
        let endpoint = Url::parse(&format!("{base}/bot{token}/"))?;
        Ok(Self {
            client: Client::new(),
            endpoint,
        })
    }

    async fn call<B: Serialize, R: DeserializeOwned>(
        &self,
        method: &'static str,
        body: &B,
        timeout: Duration,
    ) -> Result<R, Error> {
        let url = self.endpoint.join(method)?;
        let response: ApiResponse<R> = self
            .client
            .post(url)
            .timeout(timeout)
            .json(body)
            .send()
            .await?
            .json()
            .await?;
        if !response.ok {
            return Err(Error::Api {
                method,
                description: response
                    .description
                    .unwrap_or_else(|| "no description".to_string()),
            });
        }
        response.result.ok_or(Error::MissingResult { method })
    }
}

impl Transport for BotApi {
    type Error = Error;

    async fn poll(&self, offset: i64, timeout: Duration) -> Result<Batch, Self::Error> {
        let body = GetUpdates {
            offset,
            timeout: timeout.as_secs(),
            allowed_updates: &ALLOWED_UPDATES,
        };
        let updates: Vec<RawUpdate> = self
            .call("getUpdates", &body, timeout + REQUEST_TIMEOUT_SLACK)
            .await?;
        Ok(into_batch(updates))
    }

    async fn send(&self, chat_id: i64, text: &str) -> Result<AnnouncementHandle, Self::Error> {
        let message: RawMessage = self
            .call("sendMessage", &SendMessage { chat_id, text }, REQUEST_TIMEOUT)
            .await?;
        Ok(AnnouncementHandle(message.message_id))
    }

    async fn edit(
        &self,
        chat_id: i64,
        handle: AnnouncementHandle,
        text: &str,
    ) -> Result<(), Self::Error> {
        // editMessageText returns the edited message; only success matters.
        let _: serde_json::Value = self
            .call(
                "editMessageText",
                &EditMessageText {
                    chat_id,
                    message_id: handle.0,
                    text,
                },
                REQUEST_TIMEOUT,
            )
            .await?;
        Ok(())
    }
}
