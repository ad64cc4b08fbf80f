use std::str::FromStr;

use alloy_primitives::U256;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::debug;

use crate::events::Event;

/// A user command typed at the prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Authorize,
    Buy,
    Sell(U256),
    /// Approve this much BUSD from the allowance popup
    Allow(U256),
    /// Close the allowance popup
    Close,
    Refresh,
    Help,
    Quit,
}

pub const HELP: &str =
    "commands: authorize | buy | sell <token id> | allow <amount> | close | refresh | help | quit";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("unknown command: {0}")]
    Unknown(String),

    #[error("{0} needs an argument")]
    MissingArgument(&'static str),

    #[error("not a number: {0}")]
    BadNumber(String),

    #[error("unexpected argument: {0}")]
    ExtraArgument(String),
}

impl FromStr for Command {
    type Err = InputError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut parts = line.split_whitespace();
        let word = parts.next().unwrap_or("").to_ascii_lowercase();

        let cmd = match word.as_str() {
            "authorize" | "auth" => Command::Authorize,
            "buy" => Command::Buy,
            "sell" => Command::Sell(number("sell", parts.next())?),
            "allow" | "approve" => Command::Allow(number("allow", parts.next())?),
            "close" => Command::Close,
            "refresh" => Command::Refresh,
            "help" | "?" => Command::Help,
            "quit" | "exit" | "q" => Command::Quit,
            _ => return Err(InputError::Unknown(line.trim().to_string())),
        };

        let rest: Vec<&str> = parts.collect();
        if !rest.is_empty() {
            return Err(InputError::ExtraArgument(rest.join(" ")));
        }
        Ok(cmd)
    }
}

fn number(cmd: &'static str, arg: Option<&str>) -> Result<U256, InputError> {
    let arg = arg.ok_or(InputError::MissingArgument(cmd))?;
    // Decimal only; U256::from_str would also take 0x-prefixed hex
    if arg.is_empty() || !arg.bytes().all(|b| b.is_ascii_digit()) {
        return Err(InputError::BadNumber(arg.to_string()));
    }
    U256::from_str_radix(arg, 10).map_err(|_| InputError::BadNumber(arg.to_string()))
}

/// Spawns a task that reads stdin lines and sends Command events.
/// Sends Shutdown when stdin closes.
pub fn spawn(tx: mpsc::Sender<Event>) {
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    if line.trim().is_empty() {
                        continue;
                    }
                    let event = match line.parse::<Command>() {
                        Ok(cmd) => Event::Command(cmd),
                        Err(e) => Event::InputRejected(format!("{e} ({HELP})")),
                    };
                    if tx.send(event).await.is_err() {
                        break;
                    }
                }
                Ok(None) => {
                    debug!("[input] stdin closed");
                    let _ = tx.send(Event::Shutdown).await;
                    break;
                }
                Err(e) => {
                    debug!("[input] read error: {}", e);
                    let _ = tx.send(Event::Shutdown).await;
                    break;
                }
            }
        }
    });
}
