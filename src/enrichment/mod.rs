//! Derived per-message columns.
//!
//! Enrichment is a pure function of the ordered message sequence: calendar fields, marker
//! flags and length come from each row alone, while the previous-message linkage is a single
//! lookback over the already-ordered input. Export order is the only reply signal there is,
//! so nothing here reorders rows.

use tracing::{debug, warn};

use crate::error::AnalysisError;
use crate::models::{CalendarFields, EnrichedMessage, Message, PreviousMessage};

/// WhatsApp placeholder for an omitted photo, video or sticker (Dutch locale export)
pub const DEFAULT_MEDIA_MARKER: &str = "<Media weggelaten>";
/// Prefix of a Tikkie payment request link
pub const DEFAULT_PAYMENT_MARKER: &str = "<https://tikkie.me";

/// Case-sensitive substrings that flag media and payment-link messages
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Markers {
    pub media: String,
    pub payment: String,
}

impl Default for Markers {
    fn default() -> Self {
        Self { media: DEFAULT_MEDIA_MARKER.to_string(), payment: DEFAULT_PAYMENT_MARKER.to_string() }
    }
}

/// Enrich an ordered message sequence.
///
/// Returns one [`EnrichedMessage`] per input message, in input order. The first message gets
/// no previous-message linkage.
///
/// # Errors
///
/// Returns [`AnalysisError::InvalidTimestamp`] for the first message whose timestamp is missing
/// or was unparseable. No rows are enriched in that case.
pub fn enrich(messages: &[Message], markers: &Markers) -> Result<Vec<EnrichedMessage>, AnalysisError> {
    let timestamps = messages
        .iter()
        .enumerate()
        .map(|(index, m)| {
            m.timestamp
                .ok_or_else(|| AnalysisError::InvalidTimestamp { index, author: m.author.clone() })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut enriched = Vec::with_capacity(messages.len());
    let mut out_of_order = 0;

    for (i, (message, timestamp)) in messages.iter().zip(&timestamps).enumerate() {
        let previous = i.checked_sub(1).map(|p| {
            let prev_timestamp = timestamps[p];
            let minutes_since = (*timestamp - prev_timestamp).num_milliseconds() as f64 / 60_000.0;
            if minutes_since < 0.0 {
                out_of_order += 1;
            }
            PreviousMessage {
                author: messages[p].author.clone(),
                timestamp: prev_timestamp,
                minutes_since,
            }
        });

        let text = message.text.as_deref();
        enriched.push(EnrichedMessage {
            author: message.author.clone(),
            timestamp: *timestamp,
            text: message.text.clone(),
            calendar: CalendarFields::from_timestamp(timestamp),
            has_media: text.is_some_and(|t| t.contains(&markers.media)),
            has_payment_link: text.is_some_and(|t| t.contains(&markers.payment)),
            message_length: text.map(|t| t.chars().count()),
            previous,
        });
    }

    if out_of_order > 0 {
        warn!("{} message(s) are timestamped earlier than the message before them", out_of_order);
    }
    debug!("Enriched {} messages", enriched.len());

    Ok(enriched)
}
