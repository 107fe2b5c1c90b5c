//! Background message poller.
//!
//! While the user is in a room the poller fetches from its last cursor on a
//! fixed interval. It stops cooperatively: the shared flag is checked once
//! per tick, so stopping takes at most one interval.

use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use hiroba_shared::protocol::Status;
use tokio::time::MissedTickBehavior;

use crate::api::ChatApi;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Why a poller stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollEnd {
    /// The in-room flag was cleared
    Stopped,
    /// The server refused a request, e.g. because the user is no longer in a room
    Rejected(Status),
}

pub struct Poller {
    api: ChatApi,
    interval: Duration,
    in_room: Arc<AtomicBool>,
}

impl Poller {
    pub fn new(api: ChatApi, interval: Duration, in_room: Arc<AtomicBool>) -> Self {
        Self {
            api,
            interval,
            in_room,
        }
    }

    /// Poll until stopped, handing every non-empty batch to `on_messages`.
    ///
    /// The first tick fetches the baseline cursor, so history from before
    /// the join is never shown. Transport errors are logged and the request
    /// is retried on the next tick.
    pub async fn run<F>(self, mut on_messages: F) -> PollEnd
    where
        F: FnMut(&str),
    {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut cursor = None;

        loop {
            ticker.tick().await;
            if !self.in_room.load(Ordering::Acquire) {
                return PollEnd::Stopped;
            }

            let Some(current) = cursor else {
                match self.api.message_index().await {
                    Ok(Ok(index)) => cursor = Some(index),
                    Ok(Err(status)) => return PollEnd::Rejected(status),
                    Err(e) => tracing::warn!("Failed to get message index: {}", e),
                }
                continue;
            };

            match self.api.fetch(current).await {
                Ok(Ok((text, next))) => {
                    if !text.is_empty() {
                        on_messages(&text);
                    }
                    cursor = Some(next);
                }
                Ok(Err(status)) => return PollEnd::Rejected(status),
                Err(e) => tracing::warn!("Failed to fetch messages: {}", e),
            }
        }
    }
}
