use crate::error::{Error, Result};
use std::{collections::HashMap, env, path::PathBuf};

pub const DEFAULT_MIGRATIONS_DIR: &str = "migrations";

/// Values given on the command line. These win over the environment.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub migrations_dir: Option<PathBuf>,
    pub database_url: Option<String>,
}

#[derive(Debug)]
pub struct Config {
    pub migrations_dir: PathBuf,
    pub debug: bool,
    dsn: Option<String>,
    env_vars: HashMap<String, String>,
}

impl Config {
    pub fn load(overrides: Overrides) -> Self {
        let env_vars = env::vars().collect::<HashMap<String, String>>();
        Self::from_vars(overrides, env_vars)
    }

    pub fn from_vars(overrides: Overrides, env_vars: HashMap<String, String>) -> Self {
        let migrations_dir = match overrides.migrations_dir {
            Some(dir) => dir,
            None => get_env("MIGRATIONS_DIR", &env_vars)
                .unwrap_or_else(|_| DEFAULT_MIGRATIONS_DIR.to_owned())
                .into(),
        };
        let debug = env_vars.get("DEBUG").map(String::as_str) == Some("true");

        Config {
            migrations_dir,
            debug,
            dsn: overrides.database_url,
            env_vars,
        }
    }

    /// The connection string, required by every command that talks to the
    /// database. The environment is only consulted when no flag was given.
    pub fn database_url(&self) -> Result<String> {
        let url = match &self.dsn {
            Some(url) => Some(url.clone()),
            None => connection_string_from_env(&self.env_vars)?,
        };
        url.filter(|url| !url.is_empty())
            .ok_or(Error::MissingDatabaseUrl)
    }
}

fn get_env(key: &str, vars: &HashMap<String, String>) -> Result<String> {
    vars.get(key)
        .filter(|s| !s.is_empty())
        .map(|s| s.to_owned())
        .ok_or(Error::MissingEnv {
            name: key.to_owned(),
        })
}

fn connection_string_from_env(env_vars: &HashMap<String, String>) -> Result<Option<String>> {
    if let Ok(connection_string) = get_env("DATABASE_URL", env_vars) {
        return Ok(Some(connection_string));
    }
    let Ok(pg_host) = get_env("PG_HOST", env_vars) else {
        return Ok(None);
    };

    let pg_user = get_env("PG_USER", env_vars)?;
    let maybe_pg_password = get_env("PG_PASSWORD", env_vars).ok();
    let pg_port = get_env("PG_PORT", env_vars)?
        .parse::<u16>()
        .map_err(|_| Error::BadEnvFormat {
            name: "PG_PORT".to_string(),
        })?;
    let pg_db = get_env("PG_DB", env_vars)?;

    let connection_string = if let Some(pg_password) = maybe_pg_password {
        format!(
            "postgresql://{}:{}@{}:{}/{}",
            pg_user, pg_password, pg_host, pg_port, pg_db
        )
    } else {
        format!("postgresql://{}@{}:{}/{}", pg_user, pg_host, pg_port, pg_db)
    };

    Ok(Some(connection_string))
}
