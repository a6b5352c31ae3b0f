use futures_util::StreamExt;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use tokio::sync::watch;

use crate::error::FeedError;
use crate::render::{LiveTable, RenderTarget};
use super::SseDecoder;

/// Lifecycle of a subscription. It moves forward only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionState {
    Unsubscribed,
    Subscribed,
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    /// Shutdown signal received while subscribed.
    Shutdown,
    /// Server closed the stream.
    StreamEnded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionSummary {
    /// Snapshots rendered.
    pub rendered: u64,
    /// Messages dropped because their payload did not parse.
    pub skipped: u64,
    pub reason: EndReason,
}

/// One long-lived connection to a push endpoint.
pub struct Subscription {
    client: reqwest::Client,
    url: String,
    state: SubscriptionState,
}

impl Subscription {
    pub fn new(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
            state: SubscriptionState::Unsubscribed,
        }
    }

    pub fn state(&self) -> SubscriptionState {
        self.state
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Open the stream and render every snapshot onto `table` until the
    /// server ends the stream or `shutdown` flips to `true`.
    ///
    /// Malformed payloads are logged and skipped. Transport errors close the
    /// subscription and are returned; there is no reconnect.
    pub async fn run<T, F>(
        &mut self,
        table: &mut LiveTable<T>,
        mut shutdown: watch::Receiver<bool>,
        mut on_render: F,
    ) -> Result<SubscriptionSummary, FeedError>
    where
        T: RenderTarget,
        F: FnMut(&LiveTable<T>),
    {
        if self.state != SubscriptionState::Unsubscribed {
            return Err(FeedError::AlreadySubscribed);
        }
        let result = self.stream_into(table, &mut shutdown, &mut on_render).await;
        self.state = SubscriptionState::Closed;
        tracing::info!(url = %self.url, "subscription closed");
        result
    }

    async fn stream_into<T, F>(
        &mut self,
        table: &mut LiveTable<T>,
        shutdown: &mut watch::Receiver<bool>,
        on_render: &mut F,
    ) -> Result<SubscriptionSummary, FeedError>
    where
        T: RenderTarget,
        F: FnMut(&LiveTable<T>),
    {
        let request = self
            .client
            .get(&self.url)
            .header(ACCEPT, "text/event-stream")
            .send();

        // The server may accept the connection and never answer; stay cancellable.
        let resp = tokio::select! {
            biased;
            _ = shutdown_requested(shutdown) => {
                tracing::info!(url = %self.url, "shutdown before the feed answered");
                return Ok(SubscriptionSummary {
                    rendered: 0,
                    skipped: 0,
                    reason: EndReason::Shutdown,
                });
            }
            resp = request => resp?,
        };

        let status = resp.status();
        if !status.is_success() {
            return Err(FeedError::UnexpectedStatus(status.as_u16()));
        }
        let content_type = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        if !content_type.starts_with("text/event-stream") {
            return Err(FeedError::UnexpectedContentType(content_type));
        }

        self.state = SubscriptionState::Subscribed;
        tracing::info!(url = %self.url, "subscribed");

        let mut decoder = SseDecoder::new();
        let mut stream = resp.bytes_stream();
        let mut rendered = 0;
        let mut skipped = 0;

        let reason = loop {
            tokio::select! {
                biased;
                _ = shutdown_requested(shutdown) => break EndReason::Shutdown,
                chunk = stream.next() => {
                    let bytes = match chunk {
                        Some(Ok(bytes)) => bytes,
                        Some(Err(e)) => return Err(e.into()),
                        None => break EndReason::StreamEnded,
                    };
                    for event in decoder.feed(&bytes) {
                        if !event.is_message() {
                            tracing::debug!(event = ?event.event, "ignoring non-message event");
                            continue;
                        }
                        match table.apply_payload(&event.data) {
                            Ok(_) => {
                                rendered += 1;
                                on_render(&*table);
                            }
                            Err(FeedError::MalformedPayload(e)) => {
                                skipped += 1;
                                tracing::warn!(%e, "skipping malformed payload");
                            }
                            Err(e) => return Err(e),
                        }
                    }
                }
            }
        };

        Ok(SubscriptionSummary {
            rendered,
            skipped,
            reason,
        })
    }
}

/// Resolves once `shutdown` reads `true` or its sender is dropped.
async fn shutdown_requested(shutdown: &mut watch::Receiver<bool>) {
    let _ = shutdown.wait_for(|stopping| *stopping).await;
}
