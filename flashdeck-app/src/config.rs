use dialoguer::Password;
use flashdeck_core::CoreError;
use flashdeck_mysql::MySqlOptions;
use flashdeck_storage::S3Credentials;
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::cli::opts::{Cli, DbDriver, UploadsEngine};
use crate::paths::default_sqlite_file;

#[derive(Debug, Clone)]
pub enum StorageConfig {
    File {
        dir: PathBuf,
    },
    ObjectStore {
        region: String,
        bucket: String,
        credentials: S3Credentials,
    },
}

#[derive(Debug, Clone)]
pub enum DatabaseConfig {
    Sqlite { path: PathBuf, schema: PathBuf },
    MySql { opts: MySqlOptions, schema: PathBuf },
    Memory,
}

#[derive(Debug, Clone)]
pub struct ServeConfig {
    pub addr: SocketAddr,
    pub public_dir: PathBuf,
    pub body_limit: usize,
}

/// Everything the process needs, validated once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub storage: StorageConfig,
    pub database: DatabaseConfig,
    pub serve: ServeConfig,
}

impl AppConfig {
    pub fn from_cli(cli: &Cli) -> Result<Self, CoreError> {
        let up = &cli.uploads;
        let storage = match up.uploads_engine {
            UploadsEngine::File => StorageConfig::File {
                dir: up.upload_dir.clone(),
            },
            UploadsEngine::S3 => StorageConfig::ObjectStore {
                region: required(&up.region, "REGION")?,
                bucket: required(&up.bucket, "S3_BUCKET")?,
                credentials: S3Credentials {
                    access_key_id: up.aws_access_key_id.clone(),
                    secret_access_key: up.aws_secret_access_key.clone(),
                    session_token: up.aws_session_token.clone(),
                },
            },
        };

        let db = &cli.db;
        let schema_for = |engine: &str| {
            db.schema
                .clone()
                .unwrap_or_else(|| PathBuf::from(format!("schema/{engine}.sql")))
        };
        let database = match db.driver {
            DbDriver::Sqlite => DatabaseConfig::Sqlite {
                path: db
                    .database
                    .as_ref()
                    .map(PathBuf::from)
                    .unwrap_or_else(default_sqlite_file),
                schema: schema_for("sqlite"),
            },
            DbDriver::Mysql => DatabaseConfig::MySql {
                opts: MySqlOptions {
                    host: db.host.clone(),
                    port: db.port,
                    database: required(&db.database, "DB_DATABASE")?,
                    user: db.user.clone(),
                    password: db.password.clone().filter(|p| !p.is_empty()),
                },
                schema: schema_for("mysql"),
            },
            DbDriver::Memory => DatabaseConfig::Memory,
        };

        let addr = cli
            .serve
            .addr
            .parse()
            .map_err(|_| CoreError::Config(format!("invalid listen address: {}", cli.serve.addr)))?;
        let serve = ServeConfig {
            addr,
            public_dir: cli.serve.public_dir.clone(),
            body_limit: body_limit(cli.serve.max_upload_mb)?,
        };

        Ok(Self {
            storage,
            database,
            serve,
        })
    }

    /// Asks on the terminal, without echo, for a client-server password that was not configured.
    pub fn with_prompted_password(self) -> Result<Self, dialoguer::Error> {
        self.with_password_from(|| {
            Password::new()
                .with_prompt("Database password")
                .allow_empty_password(true)
                .interact()
        })
    }

    fn with_password_from<E>(
        mut self,
        ask: impl FnOnce() -> Result<String, E>,
    ) -> Result<Self, E> {
        if let DatabaseConfig::MySql { opts, .. } = &mut self.database {
            if opts.password.is_none() {
                opts.password = Some(ask()?);
            }
        }
        Ok(self)
    }
}

fn required(v: &Option<String>, name: &str) -> Result<String, CoreError> {
    v.clone()
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| CoreError::Config(format!("{name} must be set")))
}

fn body_limit(mb: usize) -> Result<usize, CoreError> {
    if mb == 0 {
        return Err(CoreError::Config("MAX_UPLOAD_MB must be positive".into()));
    }
    mb.checked_mul(1024 * 1024)
        .ok_or_else(|| CoreError::Config(format!("MAX_UPLOAD_MB is too large: {mb}")))
}
