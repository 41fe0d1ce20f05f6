use chrono::{Datelike, NaiveDateTime, Weekday};
use serde::{Deserialize, Serialize};

/// One row of a chat export, in export order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub author: String,
    /// `None` when the source value was missing or could not be parsed
    #[serde(default, deserialize_with = "crate::parsers::deserializers::deserialize_timestamp")]
    pub timestamp: Option<NaiveDateTime>,
    #[serde(default, rename = "message", alias = "text")]
    pub text: Option<String>,
}

impl Message {
    pub fn new(author: &str, timestamp: NaiveDateTime, text: Option<&str>) -> Self {
        Self {
            author: author.to_string(),
            timestamp: Some(timestamp),
            text: text.map(str::to_string),
        }
    }
}

/// Calendar decomposition of a message timestamp
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarFields {
    pub day_of_month: u32,
    pub day_name: String,
    pub month_number: u32,
    pub month_name: String,
    pub year: i32,
}

impl CalendarFields {
    pub fn from_timestamp(timestamp: &NaiveDateTime) -> Self {
        let month_number = timestamp.month();
        Self {
            day_of_month: timestamp.day(),
            day_name: weekday_name(timestamp.weekday()).to_string(),
            month_number,
            month_name: month_name(month_number).to_string(),
            year: timestamp.year(),
        }
    }

    /// Calendar quarter, 1 through 4
    pub fn quarter(&self) -> u32 {
        (self.month_number - 1) / 3 + 1
    }
}

pub fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

pub fn month_name(month_number: u32) -> &'static str {
    chrono::Month::try_from(month_number as u8).map(|m| m.name()).unwrap_or("Unknown")
}

/// Values carried over from the immediately preceding message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreviousMessage {
    pub author: String,
    pub timestamp: NaiveDateTime,
    pub minutes_since: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedMessage {
    pub author: String,
    pub timestamp: NaiveDateTime,
    pub text: Option<String>,
    pub calendar: CalendarFields,
    pub has_media: bool,
    pub has_payment_link: bool,
    /// Character count; `None` when the message has no text
    pub message_length: Option<usize>,
    /// `None` for the first message of the export
    pub previous: Option<PreviousMessage>,
}

impl EnrichedMessage {
    pub fn prev_author(&self) -> Option<&str> {
        self.previous.as_ref().map(|p| p.author.as_str())
    }

    pub fn minutes_since_prev(&self) -> Option<f64> {
        self.previous.as_ref().map(|p| p.minutes_since)
    }

    /// The underlying message, without derived columns
    pub fn to_message(&self) -> Message {
        Message { author: self.author.clone(), timestamp: Some(self.timestamp), text: self.text.clone() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoledMessage {
    pub message: EnrichedMessage,
    pub role: String,
    /// Role of the previous message's author, if that author is rostered
    pub prev_role: Option<String>,
}

impl RoledMessage {
    pub fn author(&self) -> &str {
        &self.message.author
    }

    /// A message from a different author than the one right before it
    pub fn is_reply(&self) -> bool {
        self.message.prev_author().is_some_and(|prev| prev != self.message.author)
    }
}
