use crate::api::routes::AppState;
use crate::api::server as api_server;
use crate::cli::opts::*;
use crate::config::{AppConfig, DatabaseConfig, StorageConfig};

use anyhow::{Context, Result};
use flashdeck_core::{load_schema, BlobStore, Card, MemoryStore, Meta, RecordStore};
use flashdeck_mysql::MySqlStore;
use flashdeck_sqlite::SqliteStore;
use flashdeck_storage::{LocalDisk, S3Store};
use std::sync::Arc;

pub async fn run_cli(args: Cli) -> Result<()> {
    let cfg = AppConfig::from_cli(&args)?.with_prompted_password()?;
    let records = open_records(&cfg.database).await?;

    match args.cmd.clone().unwrap_or(Command::Serve) {
        Command::Serve => {
            let blobs = open_blobs(&cfg.storage).await?;
            api_server::run(AppState { records, blobs }, &cfg.serve).await
        }
        Command::Deck(cmd) => deck_cmd(records, cmd).await,
        Command::Card(cmd) => card_cmd(records, cmd).await,
    }
}

pub async fn open_records(db: &DatabaseConfig) -> Result<Arc<dyn RecordStore>> {
    match db {
        DatabaseConfig::Sqlite { path, schema } => {
            let stmts = load_schema(schema)?;
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("creating data directory {}", parent.display()))?;
            }
            let s = SqliteStore::open_file(path, &stmts).await?;
            tracing::info!(path = %path.display(), "using sqlite database");
            Ok(Arc::new(s))
        }
        DatabaseConfig::MySql { opts, schema } => {
            let stmts = load_schema(schema)?;
            let s = MySqlStore::connect(opts, &stmts).await?;
            tracing::info!(host = %opts.host, database = %opts.database, "using mysql database");
            Ok(Arc::new(s))
        }
        DatabaseConfig::Memory => {
            tracing::warn!("using in-memory records; nothing will be persisted");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}

pub async fn open_blobs(storage: &StorageConfig) -> Result<Arc<dyn BlobStore>> {
    match storage {
        StorageConfig::File { dir } => {
            let s = LocalDisk::open(dir)?;
            tracing::info!(dir = %dir.display(), "using local upload directory");
            Ok(Arc::new(s))
        }
        StorageConfig::ObjectStore {
            region,
            bucket,
            credentials,
        } => Ok(Arc::new(S3Store::new(region, bucket, credentials).await)),
    }
}

async fn deck_cmd(records: Arc<dyn RecordStore>, cmd: DeckCmd) -> Result<()> {
    match cmd {
        DeckCmd::Add { fields } => {
            let d = records.create_deck(to_meta(fields)).await?;
            println!("{}", d.id);
        }
        DeckCmd::List => {
            for d in records.list_decks().await? {
                println!("{}\t{}\t{}", d.id, d.created.to_rfc3339(), serde_json::to_string(&d.meta)?);
            }
        }
    }
    Ok(())
}

async fn card_cmd(records: Arc<dyn RecordStore>, cmd: CardCmd) -> Result<()> {
    match cmd {
        CardCmd::Add { deck_id, fields } => {
            let c = records.create_card(&deck_id, to_meta(fields)).await?;
            println!("{}", c.id);
        }
        CardCmd::List { deck_id } => {
            for c in records.list_cards(&deck_id).await? {
                println!("{}", card_row(&c)?);
            }
        }
    }
    Ok(())
}

// ===== Helpers =====
fn to_meta(fields: Vec<(String, String)>) -> Meta {
    fields.into_iter().collect()
}

fn card_row(c: &Card) -> Result<String> {
    Ok(format!(
        "{}\t{}\t{}\t{}\t{}",
        c.id,
        c.front().unwrap_or("-"),
        c.back().unwrap_or("-"),
        c.created.to_rfc3339(),
        serde_json::to_string(&c.meta)?
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn card_row_leads_with_both_sides() {
        let mut meta = Meta::new();
        meta.insert("front".into(), "hola".into());
        let c = Card::new("deck", meta);
        let row = card_row(&c).unwrap();
        let cols: Vec<&str> = row.split('\t').collect();
        assert_eq!(cols[0], c.id);
        assert_eq!(cols[1], "hola");
        assert_eq!(cols[2], "-");
        assert_eq!(cols[4], r#"{"front":"hola"}"#);
    }

    #[tokio::test]
    async fn unusable_data_directory_reports_its_cause() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, b"").unwrap();

        let db = DatabaseConfig::Sqlite {
            path: blocker.join("data").join("flashdeck.sqlite3"),
            schema: PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/../schema/sqlite.sql")),
        };
        let err = open_records(&db).await.err().unwrap();
        assert!(err.to_string().starts_with("creating data directory"));
        assert!(err.chain().any(|e| e.downcast_ref::<std::io::Error>().is_some()));
    }
}
