//! Periodic refresh of the console, interleaved with operator commands.

use std::future::Future;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::time::{self, MissedTickBehavior};
use tracing::info;

use crate::actions::{AdminConsole, Operator, CANCEL_PROMPT, DELETE_PROMPT};
use crate::models::AppointmentStatus;
use crate::state::DashboardState;

pub const WATCH_HELP: &str = "commands: a <id> approve | r <id> reject | c <id> cancel | d <id> delete | g refresh";

/// One line typed while watching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchCommand {
    Refresh,
    Approve(i64),
    Reject(i64),
    Cancel(i64),
    Delete(i64),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("Unknown command `{0}`")]
    Unknown(String),

    #[error("`{0}` needs an appointment id")]
    MissingId(String),

    #[error("Invalid appointment id `{0}`")]
    InvalidId(String),
}

impl FromStr for WatchCommand {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let verb = words.next().unwrap_or_default().to_ascii_lowercase();
        let id = words.next();

        match verb.as_str() {
            "g" | "refresh" => Ok(WatchCommand::Refresh),
            "a" | "approve" => with_id(&verb, id, WatchCommand::Approve),
            "r" | "reject" => with_id(&verb, id, WatchCommand::Reject),
            "c" | "cancel" => with_id(&verb, id, WatchCommand::Cancel),
            "d" | "delete" => with_id(&verb, id, WatchCommand::Delete),
            _ => Err(CommandError::Unknown(line.trim().to_string())),
        }
    }
}

fn with_id(
    verb: &str,
    id: Option<&str>,
    make: fn(i64) -> WatchCommand,
) -> Result<WatchCommand, CommandError> {
    let raw = id.ok_or_else(|| CommandError::MissingId(verb.to_string()))?;
    raw.parse::<i64>()
        .map(make)
        .map_err(|_| CommandError::InvalidId(raw.to_string()))
}

impl WatchCommand {
    /// The question to ask before sending this command, if any.
    pub fn confirmation(&self) -> Option<&'static str> {
        match self {
            WatchCommand::Cancel(_) => Some(CANCEL_PROMPT),
            WatchCommand::Delete(_) => Some(DELETE_PROMPT),
            _ => None,
        }
    }

    async fn apply<O: Operator>(self, console: &mut AdminConsole<O>) {
        match self {
            WatchCommand::Refresh => console.refresh().await,
            WatchCommand::Approve(id) => {
                console.set_status(id, AppointmentStatus::Approved).await;
            }
            WatchCommand::Reject(id) => {
                console.set_status(id, AppointmentStatus::Rejected).await;
            }
            WatchCommand::Cancel(id) => {
                console.cancel(id).await;
            }
            WatchCommand::Delete(id) => {
                console.delete(id).await;
            }
        }
    }
}

/// Refreshes every `period` (first refresh immediately) and runs each
/// command received on `commands`, handing the state to `on_refresh` after
/// every cycle and every command, until `shutdown` completes.
///
/// A failing cycle only degrades the collections it could not load; the
/// next tick fetches again. Once every sender is gone the loop keeps
/// refreshing.
pub async fn watch<O, F, S>(
    console: &mut AdminConsole<O>,
    period: Duration,
    commands: &mut mpsc::Receiver<WatchCommand>,
    mut on_refresh: F,
    shutdown: S,
) where
    O: Operator,
    F: FnMut(&DashboardState),
    S: Future<Output = ()>,
{
    let mut ticker = time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    tokio::pin!(shutdown);
    let mut commands_open = true;

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("Stopping dashboard refresh");
                break;
            }
            _ = ticker.tick() => {
                console.refresh().await;
                on_refresh(&console.state);
            }
            command = commands.recv(), if commands_open => match command {
                Some(command) => {
                    info!("Running {:?}", command);
                    command.apply(console).await;
                    on_refresh(&console.state);
                }
                None => commands_open = false,
            },
        }
    }
}
