use chrono::{DateTime, Utc};
use flashdeck_core::{meta_to_json, Card, CoreError, Deck};
use serde::{Deserialize, Serialize};

/// A deck row; `meta` stays the stored JSON text.
#[derive(Serialize)]
pub struct DeckOut {
    pub id: String,
    pub meta: String,
    pub created: DateTime<Utc>,
}

#[derive(Serialize)]
pub struct CardOut {
    pub id: String,
    #[serde(rename = "deckId")]
    pub deck_id: String,
    pub meta: String,
    pub created: DateTime<Utc>,
}

#[derive(Deserialize)]
pub struct DeckQuery {
    pub id: Option<String>,
}

impl TryFrom<Deck> for DeckOut {
    type Error = CoreError;

    fn try_from(d: Deck) -> Result<Self, CoreError> {
        Ok(Self {
            meta: meta_to_json(&d.meta)?,
            id: d.id,
            created: d.created,
        })
    }
}

impl TryFrom<Card> for CardOut {
    type Error = CoreError;

    fn try_from(c: Card) -> Result<Self, CoreError> {
        Ok(Self {
            meta: meta_to_json(&c.meta)?,
            id: c.id,
            deck_id: c.deck_id,
            created: c.created,
        })
    }
}
