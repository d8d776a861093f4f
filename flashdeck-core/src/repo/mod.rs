use crate::{Card, CoreError, Deck, Meta};
use async_trait::async_trait;

pub mod memory;
pub use memory::MemoryStore;

#[async_trait]
pub trait RecordStore: Send + Sync {
    // Decks
    async fn list_decks(&self) -> Result<Vec<Deck>, CoreError>;
    async fn create_deck(&self, meta: Meta) -> Result<Deck, CoreError>;

    // Cards
    /// Oldest first. An unknown deck yields an empty list.
    async fn list_cards(&self, deck_id: &str) -> Result<Vec<Card>, CoreError>;
    /// The deck is referenced verbatim; its existence is not checked.
    async fn create_card(&self, deck_id: &str, meta: Meta) -> Result<Card, CoreError>;
}
