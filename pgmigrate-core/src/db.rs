use crate::error::{Error, Result};
use postgres::{Client, NoTls};
use tracing::debug;

static CREATE_MIGRATIONS_TABLE: &str = r#"
  CREATE TABLE IF NOT EXISTS schema_migrations (
      version BIGINT NOT NULL PRIMARY KEY,
      dirty BOOLEAN NOT NULL
  );
"#;

static LOCK_KEY: &str = "hashtext(current_database() || '.schema_migrations')";

/// Stored in place of a version when a rollback past the first migration is
/// in flight and the marker must stay dirty.
const NIL_VERSION: i64 = -1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VersionState {
    pub version: Option<u64>,
    pub dirty: bool,
}

impl VersionState {
    /// The version as stored, with -1 standing for no version.
    pub fn raw_version(&self) -> Result<i64> {
        match self.version {
            None => Ok(NIL_VERSION),
            Some(version) => i64::try_from(version).map_err(|_| Error::VersionOutOfRange {
                version: version.to_string(),
            }),
        }
    }
}

/// Where the version marker lives and where migration SQL runs.
pub trait Driver {
    fn lock(&mut self) -> Result<()>;
    fn unlock(&mut self) -> Result<()>;
    fn version(&mut self) -> Result<VersionState>;
    fn set_version(&mut self, version: Option<u64>, dirty: bool) -> Result<()>;
    fn run(&mut self, sql: &str) -> Result<()>;
}

pub struct Db {
    client: Client,
}

impl Db {
    pub fn connect(connection_string: &str) -> Result<Db> {
        let client = Client::connect(connection_string, NoTls)?;
        Ok(Db { client })
    }

    pub fn create_migrations_table(&mut self) -> Result<()> {
        self.client.batch_execute(CREATE_MIGRATIONS_TABLE)?;
        Ok(())
    }
}

impl Driver for Db {
    fn lock(&mut self) -> Result<()> {
        self.client
            .execute(&format!("SELECT pg_advisory_lock({})", LOCK_KEY), &[])?;
        Ok(())
    }

    fn unlock(&mut self) -> Result<()> {
        self.client
            .execute(&format!("SELECT pg_advisory_unlock({})", LOCK_KEY), &[])?;
        Ok(())
    }

    fn version(&mut self) -> Result<VersionState> {
        let row = self
            .client
            .query_opt("SELECT version, dirty FROM schema_migrations LIMIT 1", &[])?;
        let Some(row) = row else {
            return Ok(VersionState::default());
        };
        let version = row.try_get::<_, i64>("version")?;
        let dirty = row.try_get::<_, bool>("dirty")?;
        Ok(VersionState {
            version: u64::try_from(version).ok(),
            dirty,
        })
    }

    fn set_version(&mut self, version: Option<u64>, dirty: bool) -> Result<()> {
        debug!("setting version {:?} (dirty: {})", version, dirty);
        let raw_version = VersionState { version, dirty }.raw_version()?;
        let mut transaction = self.client.transaction()?;
        transaction.batch_execute("TRUNCATE schema_migrations")?;
        if version.is_some() || dirty {
            transaction.execute(
                "INSERT INTO schema_migrations (version, dirty) VALUES ($1, $2)",
                &[&raw_version, &dirty],
            )?;
        }
        transaction.commit()?;
        Ok(())
    }

    fn run(&mut self, sql: &str) -> Result<()> {
        self.client.batch_execute(sql)?;
        Ok(())
    }
}
