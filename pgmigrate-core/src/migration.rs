use std::collections::BTreeMap;
use std::fmt::Display;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    pub fn suffix(&self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
        }
    }
}

impl Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Up => write!(f, "u"),
            Direction::Down => write!(f, "d"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationFile {
    pub path: PathBuf,
    pub sql: String,
}

/// One version in the migrations directory. Either file may be missing, in
/// which case moving through the version only updates the version marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Migration {
    pub version: u64,
    pub identifier: String,
    pub up: Option<MigrationFile>,
    pub down: Option<MigrationFile>,
}

impl Migration {
    pub fn new(version: u64, identifier: impl Into<String>) -> Migration {
        Migration {
            version,
            identifier: identifier.into(),
            up: None,
            down: None,
        }
    }

    pub fn file(&self, direction: Direction) -> Option<&MigrationFile> {
        match direction {
            Direction::Up => self.up.as_ref(),
            Direction::Down => self.down.as_ref(),
        }
    }

    pub(crate) fn file_mut(&mut self, direction: Direction) -> &mut Option<MigrationFile> {
        match direction {
            Direction::Up => &mut self.up,
            Direction::Down => &mut self.down,
        }
    }
}

/// All known migrations, ordered by version.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Migrations {
    by_version: BTreeMap<u64, Migration>,
}

impl Migrations {
    pub fn new() -> Migrations {
        Migrations::default()
    }

    pub fn insert(&mut self, migration: Migration) {
        self.by_version.insert(migration.version, migration);
    }

    pub fn is_empty(&self) -> bool {
        self.by_version.is_empty()
    }

    pub fn len(&self) -> usize {
        self.by_version.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Migration> {
        self.by_version.values()
    }

    pub fn get(&self, version: u64) -> Option<&Migration> {
        self.by_version.get(&version)
    }

    pub(crate) fn get_mut(&mut self, version: u64) -> Option<&mut Migration> {
        self.by_version.get_mut(&version)
    }

    pub fn contains(&self, version: u64) -> bool {
        self.by_version.contains_key(&version)
    }

    pub fn first(&self) -> Option<u64> {
        self.by_version.keys().next().copied()
    }

    pub fn next(&self, version: u64) -> Option<u64> {
        self.by_version
            .range(version.checked_add(1)?..)
            .next()
            .map(|(v, _)| *v)
    }

    pub fn prev(&self, version: u64) -> Option<u64> {
        self.by_version
            .range(..version)
            .next_back()
            .map(|(v, _)| *v)
    }

    /// The SQL to run when moving through `version` in `direction`, if there
    /// is any. Blank files count as no SQL.
    pub fn body(&self, version: u64, direction: Direction) -> Option<&str> {
        self.get(version)
            .and_then(|migration| migration.file(direction))
            .map(|file| file.sql.as_str())
            .filter(|sql| !sql.trim().is_empty())
    }
}

impl FromIterator<Migration> for Migrations {
    fn from_iter<I: IntoIterator<Item = Migration>>(iter: I) -> Self {
        let mut migrations = Migrations::new();
        for migration in iter {
            migrations.insert(migration);
        }
        migrations
    }
}
