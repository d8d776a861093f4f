use crate::{Card, CoreError, Deck, Meta};
use async_trait::async_trait;
use parking_lot::RwLock;

/// Insertion-ordered store; nothing survives the process.
#[derive(Default)]
pub struct MemoryStore {
    decks: RwLock<Vec<Deck>>,
    cards: RwLock<Vec<Card>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl crate::repo::RecordStore for MemoryStore {
    async fn list_decks(&self) -> Result<Vec<Deck>, CoreError> {
        Ok(self.decks.read().clone())
    }

    async fn create_deck(&self, meta: Meta) -> Result<Deck, CoreError> {
        let deck = Deck::new(meta);
        self.decks.write().push(deck.clone());
        Ok(deck)
    }

    async fn list_cards(&self, deck_id: &str) -> Result<Vec<Card>, CoreError> {
        let mut v: Vec<Card> = self
            .cards
            .read()
            .iter()
            .filter(|c| c.deck_id == deck_id)
            .cloned()
            .collect();
        // stable sort keeps insertion order on equal timestamps
        v.sort_by_key(|c| c.created);
        Ok(v)
    }

    async fn create_card(&self, deck_id: &str, meta: Meta) -> Result<Card, CoreError> {
        let card = Card::new(deck_id, meta);
        self.cards.write().push(card.clone());
        Ok(card)
    }
}
