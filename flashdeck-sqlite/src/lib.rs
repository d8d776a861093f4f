use flashdeck_core::{
    created_from_str, created_to_str, meta_from_json, meta_to_json, repo::RecordStore, storage_err,
    Card, CoreError, Deck, Meta,
};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Row, SqlitePool,
};
use std::path::Path;

pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Opens (creating if needed) the database file and applies `schema`.
    pub async fn open_file(path: impl AsRef<Path>, schema: &[String]) -> Result<Self, CoreError> {
        let opts = SqliteConnectOptions::new()
            .filename(path.as_ref())
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(opts)
            .await
            .map_err(storage_err("sqlite connect"))?;
        let store = Self { pool };
        store.apply_schema(schema).await?;
        Ok(store)
    }

    pub async fn open_memory(schema: &[String]) -> Result<Self, CoreError> {
        // every connection to :memory: is a separate database
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .map_err(storage_err("sqlite connect"))?;
        let store = Self { pool };
        store.apply_schema(schema).await?;
        Ok(store)
    }

    async fn apply_schema(&self, schema: &[String]) -> Result<(), CoreError> {
        for sql in schema {
            sqlx::query(sql)
                .execute(&self.pool)
                .await
                .map_err(storage_err("sqlite schema"))?;
        }
        tracing::debug!(statements = schema.len(), "sqlite schema applied");
        Ok(())
    }
}

#[async_trait::async_trait]
impl RecordStore for SqliteStore {
    // ===== Decks =====
    async fn list_decks(&self) -> Result<Vec<Deck>, CoreError> {
        let rows = sqlx::query("SELECT id,meta,created FROM deck ORDER BY created ASC, rowid ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(storage_err("list decks"))?;
        let mut v = Vec::with_capacity(rows.len());
        for row in rows {
            v.push(Deck {
                id: row.get::<String, _>("id"),
                meta: meta_from_json(&row.get::<String, _>("meta"))?,
                created: created_from_str(&row.get::<String, _>("created"))?,
            });
        }
        Ok(v)
    }

    async fn create_deck(&self, meta: Meta) -> Result<Deck, CoreError> {
        let deck = Deck::new(meta);
        sqlx::query("INSERT INTO deck (id,meta,created) VALUES (?,?,?)")
            .bind(&deck.id)
            .bind(meta_to_json(&deck.meta)?)
            .bind(created_to_str(deck.created))
            .execute(&self.pool)
            .await
            .map_err(storage_err("insert deck"))?;
        Ok(deck)
    }

    // ===== Cards =====
    async fn list_cards(&self, deck_id: &str) -> Result<Vec<Card>, CoreError> {
        let rows = sqlx::query(
            r#"SELECT id,deckId,meta,created
               FROM card WHERE deckId=? ORDER BY created ASC, rowid ASC"#,
        )
        .bind(deck_id)
        .fetch_all(&self.pool)
        .await
        .map_err(storage_err("list cards"))?;
        let mut v = Vec::with_capacity(rows.len());
        for row in rows {
            v.push(row_into_card(row)?);
        }
        Ok(v)
    }

    async fn create_card(&self, deck_id: &str, meta: Meta) -> Result<Card, CoreError> {
        let card = Card::new(deck_id, meta);
        sqlx::query("INSERT INTO card (id,deckId,meta,created) VALUES (?,?,?,?)")
            .bind(&card.id)
            .bind(&card.deck_id)
            .bind(meta_to_json(&card.meta)?)
            .bind(created_to_str(card.created))
            .execute(&self.pool)
            .await
            .map_err(storage_err("insert card"))?;
        Ok(card)
    }
}

fn row_into_card(row: sqlx::sqlite::SqliteRow) -> Result<Card, CoreError> {
    Ok(Card {
        id: row.get::<String, _>("id"),
        deck_id: row.get::<String, _>("deckId"),
        meta: meta_from_json(&row.get::<String, _>("meta"))?,
        created: created_from_str(&row.get::<String, _>("created"))?,
    })
}
