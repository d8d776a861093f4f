use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum UploadsEngine {
    /// Files in a local upload directory
    File,
    /// S3 bucket
    #[value(alias = "object-store")]
    S3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DbDriver {
    /// Embedded database file
    Sqlite,
    /// Client-server database
    Mysql,
    /// Nothing persisted; for trying things out
    Memory,
}

#[derive(Debug, Parser, Clone)]
#[command(name = "flashdeck", version, about = "FlashDeck flashcard server and CLI")]
pub struct Cli {
    #[command(flatten)]
    pub uploads: UploadArgs,

    #[command(flatten)]
    pub db: DbArgs,

    #[command(flatten)]
    pub serve: ServeArgs,

    /// Defaults to `serve`
    #[command(subcommand)]
    pub cmd: Option<Command>,
}

#[derive(Debug, Args, Clone)]
pub struct UploadArgs {
    /// Where uploaded card files are stored
    #[arg(long, env = "UPLOADS_ENGINE", value_enum, default_value_t = UploadsEngine::File)]
    pub uploads_engine: UploadsEngine,

    /// Upload directory for the file engine
    #[arg(long, env = "UPLOAD_DIR", default_value = "uploads")]
    pub upload_dir: PathBuf,

    #[arg(long, env = "REGION")]
    pub region: Option<String>,

    #[arg(long = "bucket", env = "S3_BUCKET")]
    pub bucket: Option<String>,

    #[arg(long, env = "AWS_ACCESS_KEY_ID", hide_env_values = true)]
    pub aws_access_key_id: Option<String>,

    #[arg(long, env = "AWS_SECRET_ACCESS_KEY", hide_env_values = true)]
    pub aws_secret_access_key: Option<String>,

    #[arg(long, env = "AWS_SESSION_TOKEN", hide_env_values = true)]
    pub aws_session_token: Option<String>,
}

#[derive(Debug, Args, Clone)]
pub struct DbArgs {
    #[arg(long = "db", env = "DB_DRIVERNAME", value_enum, default_value_t = DbDriver::Sqlite)]
    pub driver: DbDriver,

    #[arg(long = "db-host", env = "DB_HOST", default_value = "localhost")]
    pub host: String,

    #[arg(long = "db-port", env = "DB_PORT")]
    pub port: Option<u16>,

    /// Database name (mysql) or file path (sqlite)
    #[arg(long = "db-database", env = "DB_DATABASE")]
    pub database: Option<String>,

    #[arg(long = "db-user", env = "DB_USER")]
    pub user: Option<String>,

    /// Prompted for when unset and the engine is mysql
    #[arg(long = "db-password", env = "DB_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// DDL applied at startup (defaults to schema/<engine>.sql)
    #[arg(long, env = "SCHEMA_FILE")]
    pub schema: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct ServeArgs {
    /// Bind address (host:port)
    #[arg(long, env = "LISTEN_ADDR", default_value = "0.0.0.0:80")]
    pub addr: String,

    /// Static pages and assets
    #[arg(long, env = "PUBLIC_DIR", default_value = "public")]
    pub public_dir: PathBuf,

    /// Largest accepted request body, in MiB
    #[arg(long, env = "MAX_UPLOAD_MB", default_value_t = 32)]
    pub max_upload_mb: usize,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Run the web app
    Serve,
    /// Deck operations
    #[command(subcommand)]
    Deck(DeckCmd),
    /// Card operations
    #[command(subcommand)]
    Card(CardCmd),
}

#[derive(Debug, Subcommand, Clone)]
pub enum DeckCmd {
    Add {
        #[arg(long = "field", value_parser = parse_field)]
        fields: Vec<(String, String)>,
    },
    List,
}

#[derive(Debug, Subcommand, Clone)]
pub enum CardCmd {
    Add {
        deck_id: String,
        #[arg(long = "field", value_parser = parse_field)]
        fields: Vec<(String, String)>,
    },
    List {
        deck_id: String,
    },
}

/// `key=value`; the value may itself contain `=`.
pub fn parse_field(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((k, v)) if !k.is_empty() => Ok((k.to_string(), v.to_string())),
        _ => Err(format!("expected key=value, got {s:?}")),
    }
}
