use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::{new_token, CoreError};

pub type DeckId = String;
pub type CardId = String;

/// Free-form form fields captured verbatim.
pub type Meta = BTreeMap<String, String>;

pub const FILE_FRONT: &str = "file-front";
pub const FILE_BACK: &str = "file-back";

/// Form parts that may carry an attachment, in the order they are handled.
pub const FILE_FIELDS: [&str; 2] = [FILE_FRONT, FILE_BACK];

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Deck {
    pub id: DeckId,
    pub meta: Meta,
    pub created: DateTime<Utc>,
}

impl Deck {
    pub fn new(meta: Meta) -> Self {
        Self {
            id: new_token(),
            meta,
            created: Utc::now(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Card {
    pub id: CardId,
    pub deck_id: DeckId,
    pub meta: Meta,
    pub created: DateTime<Utc>,
}

impl Card {
    pub fn new(deck_id: impl Into<DeckId>, meta: Meta) -> Self {
        Self {
            id: new_token(),
            deck_id: deck_id.into(),
            meta,
            created: Utc::now(),
        }
    }

    pub fn front(&self) -> Option<&str> {
        self.meta.get("front").map(String::as_str)
    }

    pub fn back(&self) -> Option<&str> {
        self.meta.get("back").map(String::as_str)
    }
}

/// An uploaded file as read back from a blob backend.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Blob {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
}

pub fn meta_to_json(meta: &Meta) -> Result<String, CoreError> {
    serde_json::to_string(meta).map_err(|_| CoreError::Invalid("meta"))
}

pub fn meta_from_json(s: &str) -> Result<Meta, CoreError> {
    serde_json::from_str(s).map_err(|_| CoreError::Invalid("meta"))
}

/// Fixed-width RFC 3339 (microseconds, `Z`) so that text order equals time order.
pub fn created_to_str(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn created_from_str(s: &str) -> Result<DateTime<Utc>, CoreError> {
    DateTime::parse_from_rfc3339(s)
        .map_err(|_| CoreError::Invalid("datetime"))
        .map(|dt| dt.with_timezone(&Utc))
}
