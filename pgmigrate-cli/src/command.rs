use clap::{ArgGroup, Parser, Subcommand};
use pgmigrate::config::Overrides;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    version,
    name = "pgmigrate",
    about = "pgmigrate: versioned up/down postgresql migrations."
)]
pub enum Command {
    /// Creates a timestamped .up.sql/.down.sql pair in the migrations directory.
    Create {
        /// The name to use for the migration files, e.g., "create users"
        name: String,

        /// Migrations directory [env: MIGRATIONS_DIR] [default: migrations]
        #[arg(long)]
        dir: Option<PathBuf>,
    },

    #[command(flatten)]
    Migrate(MigrateCommand),
}

/// Commands that connect to the database.
#[derive(Subcommand, Debug)]
pub enum MigrateCommand {
    /// Applies all pending migrations, or the next N.
    Up {
        #[command(flatten)]
        connection: ConnectionArgs,

        /// Apply N migrations. 0 applies everything pending.
        #[arg(long, default_value_t = 0)]
        steps: u64,
    },

    /// Rolls back N applied migrations, or all of them.
    #[command(group(ArgGroup::new("amount").required(true).args(["steps", "all"])))]
    Down {
        #[command(flatten)]
        connection: ConnectionArgs,

        /// Roll back N migrations.
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        steps: Option<u64>,

        /// Roll back every applied migration.
        #[arg(long)]
        all: bool,
    },

    /// Migrates up or down to an exact version.
    To {
        #[command(flatten)]
        connection: ConnectionArgs,

        version: u64,
    },

    /// Sets the version without running any SQL, e.g. to recover from a dirty migration.
    /// -1 clears the version.
    Force {
        #[command(flatten)]
        connection: ConnectionArgs,

        #[arg(allow_negative_numbers = true)]
        version: i64,
    },

    /// Prints the current version and whether the database is dirty.
    Version {
        #[command(flatten)]
        connection: ConnectionArgs,
    },
}

#[derive(clap::Args, Debug)]
pub struct ConnectionArgs {
    /// Postgres connection string [env: DATABASE_URL]
    #[arg(long)]
    pub dsn: Option<String>,

    /// Migrations directory [env: MIGRATIONS_DIR] [default: migrations]
    #[arg(long)]
    pub dir: Option<PathBuf>,
}

impl Command {
    pub fn overrides(&self) -> Overrides {
        match self {
            Command::Create { dir, .. } => Overrides {
                migrations_dir: dir.clone(),
                database_url: None,
            },
            Command::Migrate(command) => {
                let connection = command.connection();
                Overrides {
                    migrations_dir: connection.dir.clone(),
                    database_url: connection.dsn.clone(),
                }
            }
        }
    }
}

impl MigrateCommand {
    fn connection(&self) -> &ConnectionArgs {
        match self {
            MigrateCommand::Up { connection, .. }
            | MigrateCommand::Down { connection, .. }
            | MigrateCommand::To { connection, .. }
            | MigrateCommand::Force { connection, .. }
            | MigrateCommand::Version { connection } => connection,
        }
    }
}
