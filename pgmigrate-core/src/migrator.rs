use crate::db::Driver;
use crate::error::{Error, Result};
use crate::migration::Migrations;
use crate::planner::{plan, Plan, Target};
use tracing::{debug, info, warn};

pub struct Migrator<D: Driver> {
    driver: D,
    migrations: Migrations,
}

impl<D: Driver> Migrator<D> {
    pub fn new(driver: D, migrations: Migrations) -> Migrator<D> {
        Migrator { driver, migrations }
    }

    pub fn into_driver(self) -> D {
        self.driver
    }

    /// Applies all pending migrations.
    pub fn up(&mut self) -> Result<()> {
        self.migrate_to(Target::Up)
    }

    /// Rolls back every applied migration.
    pub fn down(&mut self) -> Result<()> {
        self.migrate_to(Target::Down)
    }

    /// Applies `n` migrations, or rolls back `-n` when negative.
    pub fn steps(&mut self, n: i64) -> Result<()> {
        self.migrate_to(Target::Steps(n))
    }

    /// Moves up or down until `version` is the current version.
    pub fn migrate(&mut self, version: u64) -> Result<()> {
        self.migrate_to(Target::Version(version))
    }

    /// Records `version` as the current, clean version without running any
    /// SQL. `-1` clears the version.
    pub fn force(&mut self, version: i64) -> Result<()> {
        if version < -1 {
            return Err(Error::InvalidVersion { version });
        }
        self.with_lock(|migrator| {
            migrator
                .driver
                .set_version(u64::try_from(version).ok(), false)
        })
    }

    /// The current version and dirty flag. Fails with `NilVersion` when no
    /// migration has been applied.
    pub fn version(&mut self) -> Result<(u64, bool)> {
        let state = self.driver.version()?;
        match state.version {
            Some(version) => Ok((version, state.dirty)),
            None => Err(Error::NilVersion),
        }
    }

    fn migrate_to(&mut self, target: Target) -> Result<()> {
        self.with_lock(|migrator| {
            let state = migrator.driver.version()?;
            if state.dirty {
                return Err(Error::Dirty {
                    version: state.raw_version()?,
                });
            }
            let plan = plan(&migrator.migrations, state.version, target)?;
            migrator.execute(&plan)
        })
    }

    fn execute(&mut self, plan: &Plan) -> Result<()> {
        for step in &plan.steps {
            let identifier = self
                .migrations
                .get(step.version)
                .map(|migration| migration.identifier.as_str())
                .unwrap_or_default();
            info!("{} {}", step, identifier);

            self.driver.set_version(step.target, true)?;
            if let Some(body) = self.migrations.body(step.version, step.direction) {
                debug!("{}", body);
                self.driver.run(body)?;
            }
            self.driver.set_version(step.target, false)?;
        }
        match plan.short {
            Some(short) => Err(Error::ShortLimit { short }),
            None => Ok(()),
        }
    }

    fn with_lock<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        self.driver.lock()?;
        let result = f(self);
        match self.driver.unlock() {
            Ok(()) => result,
            Err(err) if result.is_ok() => Err(err),
            Err(err) => {
                warn!("failed to release migration lock: {}", err);
                result
            }
        }
    }
}
