use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Pg(#[from] postgres::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("required environment variable {name} not set")]
    MissingEnv { name: String },
    #[error("environment variable {name} could not be parsed")]
    BadEnvFormat { name: String },
    #[error("DATABASE_URL/--dsn is required")]
    MissingDatabaseUrl,
    #[error("migrations dir {} not found", .path.display())]
    MissingMigrationsDir { path: PathBuf },
    #[error("duplicate migration file: {}", .path.display())]
    DuplicateMigration { path: PathBuf },
    #[error("migration name must not be empty")]
    EmptyMigrationName,
    #[error("no change")]
    NoChange,
    #[error("no migration applied")]
    NilVersion,
    #[error("no migration available to apply")]
    NothingToMigrate,
    #[error("no migration found for version {version}")]
    UnknownVersion { version: u64 },
    #[error("limit {short} short")]
    ShortLimit { short: u64 },
    #[error("version {version} does not fit in a postgres bigint")]
    VersionOutOfRange { version: String },
    #[error("version {version} is invalid, must be -1 or greater")]
    InvalidVersion { version: i64 },
    #[error("dirty database version {version}. Fix and force version.")]
    Dirty { version: i64 },
}
