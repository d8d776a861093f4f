use chrono::{DateTime, Utc};
use flashdeck_core::{
    meta_from_json, meta_to_json, repo::RecordStore, storage_err, Card, CoreError, Deck, Meta,
};
use sqlx::{
    mysql::{MySqlConnectOptions, MySqlPoolOptions},
    Connection, Executor, MySqlConnection, MySqlPool, Row,
};

/// Connection parameters for the client-server engine.
#[derive(Clone, Debug)]
pub struct MySqlOptions {
    pub host: String,
    pub port: Option<u16>,
    pub database: String,
    pub user: Option<String>,
    pub password: Option<String>,
}

impl MySqlOptions {
    fn server(&self) -> MySqlConnectOptions {
        let mut opts = MySqlConnectOptions::new().host(&self.host);
        if let Some(port) = self.port {
            opts = opts.port(port);
        }
        if let Some(user) = &self.user {
            opts = opts.username(user);
        }
        if let Some(password) = &self.password {
            opts = opts.password(password);
        }
        opts
    }
}

pub struct MySqlStore {
    pool: MySqlPool,
}

impl MySqlStore {
    /// Creates the database if absent, binds the pool to it, then applies `schema`.
    pub async fn connect(opts: &MySqlOptions, schema: &[String]) -> Result<Self, CoreError> {
        let database = checked_database_name(&opts.database)?;

        let mut admin = MySqlConnection::connect_with(&opts.server())
            .await
            .map_err(storage_err("mysql connect"))?;
        admin
            .execute(create_database_sql(database).as_str())
            .await
            .map_err(storage_err("mysql create database"))?;
        admin.close().await.ok();

        let pool = MySqlPoolOptions::new()
            .max_connections(10)
            .connect_with(opts.server().database(database))
            .await
            .map_err(storage_err("mysql connect"))?;
        let store = Self { pool };
        store.apply_schema(schema).await?;
        Ok(store)
    }

    async fn apply_schema(&self, schema: &[String]) -> Result<(), CoreError> {
        for sql in schema {
            self.pool
                .execute(sql.as_str())
                .await
                .map_err(storage_err("mysql schema"))?;
        }
        tracing::debug!(statements = schema.len(), "mysql schema applied");
        Ok(())
    }
}

#[async_trait::async_trait]
impl RecordStore for MySqlStore {
    // ===== Decks =====
    async fn list_decks(&self) -> Result<Vec<Deck>, CoreError> {
        let rows = sqlx::query("SELECT id,meta,created FROM deck ORDER BY created ASC, seq ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(storage_err("mysql list decks"))?;
        let mut v = Vec::with_capacity(rows.len());
        for row in rows {
            v.push(Deck {
                id: row.get::<String, _>("id"),
                meta: meta_from_json(&row.get::<String, _>("meta"))?,
                created: row.get::<DateTime<Utc>, _>("created"),
            });
        }
        Ok(v)
    }

    async fn create_deck(&self, meta: Meta) -> Result<Deck, CoreError> {
        let deck = Deck::new(meta);
        sqlx::query("INSERT INTO deck (id,meta,created) VALUES (?,?,?)")
            .bind(&deck.id)
            .bind(meta_to_json(&deck.meta)?)
            .bind(deck.created)
            .execute(&self.pool)
            .await
            .map_err(storage_err("mysql insert deck"))?;
        Ok(deck)
    }

    // ===== Cards =====
    async fn list_cards(&self, deck_id: &str) -> Result<Vec<Card>, CoreError> {
        let rows = sqlx::query(
            r#"SELECT id,deckId,meta,created
               FROM card WHERE deckId=? ORDER BY created ASC, seq ASC"#,
        )
        .bind(deck_id)
        .fetch_all(&self.pool)
        .await
        .map_err(storage_err("mysql list cards"))?;
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
            .bind(card.created)
            .execute(&self.pool)
            .await
            .map_err(storage_err("mysql insert card"))?;
        Ok(card)
    }
}

// ===== helpers =====
fn checked_database_name(name: &str) -> Result<&str, CoreError> {
    let ok = !name.is_empty()
        && name.len() <= 64
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if ok {
        Ok(name)
    } else {
        Err(CoreError::Config(format!("invalid database name: {name:?}")))
    }
}

fn create_database_sql(database: &str) -> String {
    format!("CREATE DATABASE IF NOT EXISTS `{database}`")
}

fn row_into_card(row: sqlx::mysql::MySqlRow) -> Result<Card, CoreError> {
    Ok(Card {
        id: row.get::<String, _>("id"),
        deck_id: row.get::<String, _>("deckId"),
        meta: meta_from_json(&row.get::<String, _>("meta"))?,
        created: row.get::<DateTime<Utc>, _>("created"),
    })
}
