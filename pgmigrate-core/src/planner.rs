use crate::error::{Error, Result};
use crate::migration::{Direction, Migrations};
use std::fmt::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// Every pending migration.
    Up,
    /// Every applied migration, back to no version.
    Down,
    /// Positive values move up, negative values move down.
    Steps(i64),
    /// Exactly this version, in whichever direction it lies.
    Version(u64),
}

/// Run the `direction` file of `version`, then record `target` as the
/// current version. A `target` of `None` means no migration is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub version: u64,
    pub direction: Direction,
    pub target: Option<u64>,
}

impl Step {
    fn up(version: u64) -> Step {
        Step {
            version,
            direction: Direction::Up,
            target: Some(version),
        }
    }

    fn down(version: u64, target: Option<u64>) -> Step {
        Step {
            version,
            direction: Direction::Down,
            target,
        }
    }
}

impl Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.version, self.direction)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    pub steps: Vec<Step>,
    /// How many steps short of a requested limit the plan falls.
    pub short: Option<u64>,
}

pub fn plan(migrations: &Migrations, current: Option<u64>, target: Target) -> Result<Plan> {
    match target {
        Target::Up => plan_up(migrations, current, None),
        Target::Down => plan_down(migrations, current, None),
        Target::Steps(0) => Err(Error::NoChange),
        Target::Steps(n) if n > 0 => plan_up(migrations, current, Some(n.unsigned_abs())),
        Target::Steps(n) => plan_down(migrations, current, Some(n.unsigned_abs())),
        Target::Version(version) => plan_to(migrations, current, version),
    }
}

fn ensure_exists(migrations: &Migrations, version: Option<u64>) -> Result<()> {
    match version {
        Some(version) if !migrations.contains(version) => Err(Error::UnknownVersion { version }),
        _ => Ok(()),
    }
}

fn within(steps: &[Step], limit: Option<u64>) -> bool {
    limit.map_or(true, |limit| (steps.len() as u64) < limit)
}

fn plan_up(migrations: &Migrations, mut from: Option<u64>, limit: Option<u64>) -> Result<Plan> {
    ensure_exists(migrations, from)?;

    let mut steps = Vec::new();
    while within(&steps, limit) {
        let next = match from {
            None => migrations.first(),
            Some(version) => migrations.next(version),
        };
        let Some(next) = next else {
            break;
        };
        steps.push(Step::up(next));
        from = Some(next);
    }
    finish(steps, limit)
}

fn plan_down(migrations: &Migrations, mut from: Option<u64>, limit: Option<u64>) -> Result<Plan> {
    ensure_exists(migrations, from)?;

    let mut steps = Vec::new();
    while within(&steps, limit) {
        let Some(version) = from else {
            break;
        };
        let prev = migrations.prev(version);
        steps.push(Step::down(version, prev));
        from = prev;
    }
    finish(steps, limit)
}

fn plan_to(migrations: &Migrations, mut from: Option<u64>, to: u64) -> Result<Plan> {
    ensure_exists(migrations, from)?;
    ensure_exists(migrations, Some(to))?;
    if from == Some(to) {
        return Err(Error::NoChange);
    }

    let mut steps = Vec::new();
    match from {
        Some(version) if version > to => {
            while let Some(version) = from.filter(|v| *v > to) {
                let prev = migrations.prev(version);
                steps.push(Step::down(version, prev));
                from = prev;
            }
        }
        _ => {
            while from != Some(to) {
                let next = match from {
                    None => migrations.first(),
                    Some(version) => migrations.next(version),
                };
                let Some(next) = next else {
                    break;
                };
                steps.push(Step::up(next));
                from = Some(next);
            }
        }
    }
    Ok(Plan { steps, short: None })
}

fn finish(steps: Vec<Step>, limit: Option<u64>) -> Result<Plan> {
    let count = steps.len() as u64;
    match limit {
        None if count == 0 => Err(Error::NoChange),
        Some(_) if count == 0 => Err(Error::NothingToMigrate),
        Some(limit) if count < limit => Ok(Plan {
            steps,
            short: Some(limit - count),
        }),
        _ => Ok(Plan { steps, short: None }),
    }
}
