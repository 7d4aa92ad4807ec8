use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use command::{Command, MigrateCommand};
use pgmigrate::config::Config;
use pgmigrate::db::Db;
use pgmigrate::error::Error;
use pgmigrate::file;
use pgmigrate::migrator::Migrator;
use tracing::{debug, info, Level};

mod command;

fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let command = Command::parse();
    let config = Config::load(command.overrides());
    let level = if config.debug {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .without_time()
        .with_target(false)
        .with_max_level(level)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("setting tracing subscriber failed")?;

    match command {
        Command::Create { name, .. } => create(&config, &name),
        Command::Migrate(command) => migrate(&config, command),
    }
}

fn create(config: &Config, name: &str) -> Result<()> {
    let (up, down) = file::create_pair(&config.migrations_dir, name, Utc::now())
        .with_context(|| format!("couldn't create migration {:?}", name))?;
    println!("created:");
    println!("  {}", up.display());
    println!("  {}", down.display());
    Ok(())
}

fn migrate(config: &Config, command: MigrateCommand) -> Result<()> {
    let database_url = config.database_url()?;
    let migrations = file::list(&config.migrations_dir)?;
    debug!(
        "{} migrations in {}",
        migrations.len(),
        config.migrations_dir.display()
    );

    let mut db = Db::connect(&database_url).context("couldn't connect to database")?;
    db.create_migrations_table()
        .context("failed creating migrations table")?;
    let mut migrator = Migrator::new(db, migrations);

    let result = match command {
        MigrateCommand::Up { steps: 0, .. } => migrator.up(),
        MigrateCommand::Up { steps, .. } => migrator.steps(to_signed(steps)?),
        MigrateCommand::Down { all: true, .. } => migrator.down(),
        MigrateCommand::Down { steps, .. } => {
            let steps = steps.context("specify --steps or --all")?;
            migrator.steps(-to_signed(steps)?)
        }
        MigrateCommand::To { version, .. } => migrator.migrate(version),
        MigrateCommand::Force { version, .. } => migrator.force(version),
        MigrateCommand::Version { .. } => match migrator.version() {
            Ok((version, dirty)) => {
                println!("version: {}, dirty={}", version, dirty);
                Ok(())
            }
            Err(Error::NilVersion) => {
                println!("version: 0, dirty=false (no migrations applied)");
                Ok(())
            }
            Err(err) => Err(err),
        },
    };

    match result {
        Err(Error::NoChange) => info!("no change"),
        result => result?,
    }

    Ok(())
}

fn to_signed(steps: u64) -> Result<i64> {
    i64::try_from(steps).context("--steps is too large")
}
