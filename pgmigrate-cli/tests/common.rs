use std::collections::HashMap;
use std::env;
use std::process::Command;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::Result;

static DB_N: AtomicUsize = AtomicUsize::new(1);

/// A throwaway database, dropped again when this goes out of scope.
pub struct TestDatabase {
    pub database: String,
    pub host: String,
    pub port: String,
    pub user: String,
}

impl TestDatabase {
    /// Returns `None` when TEST_PG_HOST, TEST_PG_PORT and TEST_PG_USER aren't
    /// all set, so that database tests are skipped instead of failing.
    pub fn new() -> Result<Option<TestDatabase>> {
        let env_vars = env::vars().collect::<HashMap<String, String>>();
        let (Some(host), Some(port), Some(user)) = (
            env_vars.get("TEST_PG_HOST"),
            env_vars.get("TEST_PG_PORT"),
            env_vars.get("TEST_PG_USER"),
        ) else {
            eprintln!("TEST_PG_HOST/TEST_PG_PORT/TEST_PG_USER not set, skipping");
            return Ok(None);
        };

        let db_n = DB_N.fetch_add(1, Ordering::SeqCst);
        let name = format!("pgmigrate-test-{}-{}", std::process::id(), db_n);
        eprintln!("Creating database {}", &name);
        let result = Command::new("createdb")
            .args(["-h", host.as_str(), "-p", port.as_str(), "-U", user.as_str(), name.as_str()])
            .output()?;
        assert!(result.status.success());
        Ok(Some(TestDatabase {
            database: name,
            host: host.to_owned(),
            port: port.to_owned(),
            user: user.to_owned(),
        }))
    }

    pub fn url(&self) -> String {
        format!(
            "postgres://{}@{}:{}/{}",
            self.user, self.host, self.port, self.database
        )
    }
}

impl Drop for TestDatabase {
    fn drop(&mut self) {
        eprintln!("Dropping {}", &self.database);
        let mut command = Command::new("dropdb");
        command.args(["-h", self.host.as_str(), "-p", self.port.as_str(), "-U", self.user.as_str()]);
        command.arg(&self.database);
        if let Ok(result) = command.output() {
            if !result.status.success() {
                eprintln!("problem dropping database {}", self.database);
            }
        } else {
            eprintln!("problem dropping database {}", self.database);
        }
    }
}
