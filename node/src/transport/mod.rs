//! Chat transport: inbound updates and outbound messages.

use std::{future::Future, time::Duration};
#[cfg(test)]
use std::{
    collections::VecDeque,
    io,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex,
    },
};
use suitwatch_types::AnnouncementHandle;
use tokio::sync::mpsc;
use tracing::{debug, warn};

mod bot_api;

pub use bot_api::{BotApi, Error};

/// Delay before polling again after a failed poll.
pub const POLL_RETRY_DELAY: Duration = Duration::from_secs(5);

/// Kind of chat an update arrived in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChatKind {
    Private,
    Group,
    Channel,
}

/// A text message (new or edited) received by the bot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Inbound {
    pub update_id: i64,
    pub chat_id: i64,
    pub chat_kind: ChatKind,
    pub sender_id: Option<i64>,
    pub text: String,
    pub edited: bool,
}

/// Result of one long poll.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Batch {
    /// Highest update id seen, including updates that carried no text.
    pub last_update_id: Option<i64>,
    pub updates: Vec<Inbound>,
}

/// Trait for interacting with the chat service.
pub trait Transport: Clone + Send + Sync + 'static {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Long-poll for updates with an id of at least `offset`.
    fn poll(
        &self,
        offset: i64,
        timeout: Duration,
    ) -> impl Future<Output = Result<Batch, Self::Error>> + Send;

    /// Send `text` to `chat_id`, returning a handle for later edits.
    fn send(
        &self,
        chat_id: i64,
        text: &str,
    ) -> impl Future<Output = Result<AnnouncementHandle, Self::Error>> + Send;

    /// Replace the text of a message previously sent with [`Transport::send`].
    fn edit(
        &self,
        chat_id: i64,
        handle: AnnouncementHandle,
        text: &str,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;
}

/// Poll `transport` forever, forwarding every update to `sender`.
///
/// Returns once the receiving side is dropped.
pub async fn run_poller<T: Transport>(
    transport: T,
    timeout: Duration,
    sender: mpsc::Sender<Inbound>,
) {
    let mut offset = 0i64;
    loop {
        let batch = match transport.poll(offset, timeout).await {
            Ok(batch) => batch,
            Err(err) => {
                warn!(?err, retry_secs = POLL_RETRY_DELAY.as_secs(), "poll failed");
                tokio::time::sleep(POLL_RETRY_DELAY).await;
                continue;
            }
        };
        if let Some(last) = batch.last_update_id {
            offset = offset.max(last.saturating_add(1));
        }
        for update in batch.updates {
            debug!(update_id = update.update_id, chat_id = update.chat_id, "update received");
            if sender.send(update).await.is_err() {
                debug!("inbound receiver dropped, stopping poller");
                return;
            }
        }
    }
}

/// An in-memory transport for testing.
#[cfg(test)]
#[derive(Clone, Default)]
pub struct Mock {
    pub sent: Arc<Mutex<Vec<(i64, String)>>>,
    #[allow(clippy::type_complexity)]
    pub edited: Arc<Mutex<Vec<(i64, AnnouncementHandle, String)>>>,
    #[allow(clippy::type_complexity)]
    pub polls: Arc<Mutex<VecDeque<Result<Vec<Inbound>, io::ErrorKind>>>>,
    pub offsets: Arc<Mutex<Vec<i64>>>,
    pub fail_sends: Arc<AtomicBool>,
}

#[cfg(test)]
impl Mock {
    pub fn sent(&self) -> Vec<(i64, String)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn edited(&self) -> Vec<(i64, AnnouncementHandle, String)> {
        self.edited.lock().unwrap().clone()
    }

    pub fn set_fail_sends(&self, fail: bool) {
        self.fail_sends.store(fail, Ordering::SeqCst);
    }

    pub fn push_poll(&self, result: Result<Vec<Inbound>, io::ErrorKind>) {
        self.polls.lock().unwrap().push_back(result);
    }
}

#[cfg(test)]
impl Transport for Mock {
    type Error = io::Error;

    async fn poll(&self, offset: i64, _timeout: Duration) -> Result<Batch, Self::Error> {
        self.offsets.lock().unwrap().push(offset);
        let next = self.polls.lock().unwrap().pop_front();
        match next {
            Some(Ok(updates)) => Ok(Batch {
                last_update_id: updates.iter().map(|update| update.update_id).max(),
                updates,
            }),
            Some(Err(kind)) => Err(io::Error::from(kind)),
            None => futures::future::pending().await,
        }
    }

    async fn send(&self, chat_id: i64, text: &str) -> Result<AnnouncementHandle, Self::Error> {
        if self.fail_sends.load(Ordering::SeqCst) {
            return Err(io::Error::from(io::ErrorKind::ConnectionReset));
        }
        let mut sent = self.sent.lock().unwrap();
        sent.push((chat_id, text.to_string()));
        Ok(AnnouncementHandle(sent.len() as i64))
    }

    async fn edit(
        &self,
        chat_id: i64,
        handle: AnnouncementHandle,
        text: &str,
    ) -> Result<(), Self::Error> {
        self.edited
            .lock()
            .unwrap()
            .push((chat_id, handle, text.to_string()));
        Ok(())
    }
}
