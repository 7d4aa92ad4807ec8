use crate::error::{Error, Result};
use crate::migration::{Direction, Migration, MigrationFile, Migrations};
use chrono::{DateTime, Utc};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

static UP_TEMPLATE: &str = "-- write UP migration here\n";
static DOWN_TEMPLATE: &str = "-- write DOWN migration here\n";

/// Reads every migration file in `migrate_dir`. Files whose names don't
/// look like `<version>_<identifier>.<up|down>.<ext>` are skipped.
pub fn list(migrate_dir: impl AsRef<Path>) -> Result<Migrations> {
    let migrate_dir = migrate_dir.as_ref();
    if !migrate_dir.is_dir() {
        return Err(Error::MissingMigrationsDir {
            path: migrate_dir.to_path_buf(),
        });
    }

    let mut migrations = Migrations::new();
    for entry in fs::read_dir(migrate_dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let Some(file_name) = path.file_name().and_then(|name| name.to_str()) else {
            continue;
        };
        let Some((version, identifier, direction)) = parse_file_name(file_name)? else {
            debug!("skipping {}", path.display());
            continue;
        };

        let sql = fs::read_to_string(&path)?;
        if migrations.get(version).is_none() {
            migrations.insert(Migration::new(version, identifier));
        }
        if let Some(migration) = migrations.get_mut(version) {
            let slot = migration.file_mut(direction);
            if slot.is_some() {
                return Err(Error::DuplicateMigration { path });
            }
            *slot = Some(MigrationFile { path, sql });
        }
    }
    Ok(migrations)
}

/// Splits `<version>_<identifier>.<up|down>.<ext>`. Versions are stored as a
/// postgres `bigint`, so anything past `i64::MAX` is an error rather than a
/// file to skip.
fn parse_file_name(file_name: &str) -> Result<Option<(u64, &str, Direction)>> {
    let Some((digits, rest)) = file_name.split_once('_') else {
        return Ok(None);
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Ok(None);
    }

    let up = rest.rfind(".up.").map(|i| (i, Direction::Up));
    let down = rest.rfind(".down.").map(|i| (i, Direction::Down));
    let (index, direction) = match (up, down) {
        (Some(up), Some(down)) => std::cmp::max_by_key(up, down, |(i, _)| *i),
        (Some(found), None) | (None, Some(found)) => found,
        (None, None) => return Ok(None),
    };

    let version = digits
        .parse::<i64>()
        .ok()
        .and_then(|version| u64::try_from(version).ok())
        .ok_or_else(|| Error::VersionOutOfRange {
            version: digits.to_owned(),
        })?;
    Ok(Some((version, &rest[..index], direction)))
}

/// Normalizes a migration name for use in a file name.
pub fn sanitize(name: &str) -> String {
    name.trim().to_lowercase().replace([' ', '-'], "_")
}

/// Writes an empty up/down pair for a new migration named after `now`.
/// Either both files exist afterwards or neither does.
pub fn create_pair(
    migrate_dir: impl AsRef<Path>,
    name: &str,
    now: DateTime<Utc>,
) -> Result<(PathBuf, PathBuf)> {
    let name = sanitize(name);
    if name.is_empty() {
        return Err(Error::EmptyMigrationName);
    }
    let migrate_dir = migrate_dir.as_ref();
    fs::create_dir_all(migrate_dir)?;

    let base = format!("{}_{}", now.format("%Y%m%d%H%M%S"), name);
    let up = migrate_dir.join(format!("{}.{}.sql", base, Direction::Up.suffix()));
    let down = migrate_dir.join(format!("{}.{}.sql", base, Direction::Down.suffix()));

    write_new(&up, UP_TEMPLATE)?;
    if let Err(err) = write_new(&down, DOWN_TEMPLATE) {
        let _ = fs::remove_file(&up);
        return Err(err);
    }
    Ok((up, down))
}

fn write_new(path: &Path, contents: &str) -> Result<()> {
    let mut file = OpenOptions::new().write(true).create_new(true).open(path)?;
    file.write_all(contents.as_bytes())?;
    Ok(())
}
