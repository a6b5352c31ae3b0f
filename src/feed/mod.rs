//! Client side of the push channel: an event-stream decoder and the
//! subscription that drives a [`LiveTable`](crate::render::LiveTable).

mod decoder;
mod subscription;

pub use decoder::{SseDecoder, SseEvent, MAX_EVENT_LEN};
pub use subscription::{EndReason, Subscription, SubscriptionState, SubscriptionSummary};
