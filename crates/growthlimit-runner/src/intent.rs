//! User intents and the terminal commands that produce them.
//!
//! The session reacts to four intents. The terminal front end adds a few
//! read-only commands (`list`, `parcels`, ...) that never touch the ledger.
//!
//! | Command                 | Meaning                                  |
//! |-------------------------|------------------------------------------|
//! | `neighborhood <id>`     | Load a neighborhood's parcels            |
//! | `neighborhood`          | Clear the map and the selection          |
//! | `budget <acres>`        | Edit the development limit               |
//! | `toggle <parcel-id>`    | Click a parcel                           |
//! | `export`                | Write the selection to disk              |
//! | `list`                  | Show the selection sidebar               |
//! | `parcels`               | Show the rendered parcels                |
//! | `neighborhoods`         | Show the configured neighborhoods        |
//! | `help`                  | Show this table                          |
//! | `quit`                  | Leave the session                        |

use crate::{Result, RunnerError};
use parcel_ledger::{NeighborhoodId, ParcelId};

/// Something the user asked the session to do.
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    /// A neighborhood was chosen (`None` clears the map).
    NeighborhoodChanged(Option<NeighborhoodId>),
    /// The development limit field was edited.
    BudgetEdited(f64),
    /// A rendered parcel was clicked.
    ParcelClicked(ParcelId),
    /// The download button was pressed.
    ExportRequested,
}

/// A parsed terminal line.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Forwarded to the session.
    Intent(Intent),
    List,
    Parcels,
    Neighborhoods,
    Help,
    Quit,
}

/// Usage text printed by `help`.
pub const HELP_TEXT: &str = "\
commands:
  neighborhood <id>    load a neighborhood (no id clears the map)
  budget <acres>       set the development limit
  toggle <parcel-id>   select or deselect a parcel
  export               write the selection to disk
  list                 show selected parcels
  parcels              show parcels in the loaded neighborhood
  neighborhoods        show configured neighborhoods
  help                 show this text
  quit                 leave";

impl Command {
    /// Parse one input line. Blank lines yield `Ok(None)`.
    pub fn parse(line: &str) -> Result<Option<Command>> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }

        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line, ""),
        };

        let command = match verb.to_ascii_lowercase().as_str() {
            "neighborhood" | "n" => {
                let neighborhood = (!rest.is_empty()).then(|| NeighborhoodId::new(rest));
                Command::Intent(Intent::NeighborhoodChanged(neighborhood))
            }
            "budget" | "b" => {
                let acres = rest.parse::<f64>().map_err(|_| {
                    RunnerError::InvalidCommand(format!("budget expects a number, got '{}'", rest))
                })?;
                Command::Intent(Intent::BudgetEdited(acres))
            }
            "toggle" | "t" | "click" => {
                if rest.is_empty() {
                    return Err(RunnerError::InvalidCommand(
                        "toggle expects a parcel id".to_string(),
                    ));
                }
                Command::Intent(Intent::ParcelClicked(ParcelId::new(rest)))
            }
            "export" | "download" => Command::Intent(Intent::ExportRequested),
            "list" | "ls" => Command::List,
            "parcels" => Command::Parcels,
            "neighborhoods" => Command::Neighborhoods,
            "help" | "?" => Command::Help,
            "quit" | "exit" | "q" => Command::Quit,
            other => {
                return Err(RunnerError::InvalidCommand(format!(
                    "unknown command '{}'",
                    other
                )))
            }
        };
        Ok(Some(command))
    }

    /// The canonical line for this command.
    pub fn to_command_string(&self) -> String {
        match self {
            Command::Intent(Intent::NeighborhoodChanged(Some(id))) => format!("neighborhood {}", id),
            Command::Intent(Intent::NeighborhoodChanged(None)) => "neighborhood".to_string(),
            Command::Intent(Intent::BudgetEdited(acres)) => format!("budget {}", acres),
            Command::Intent(Intent::ParcelClicked(id)) => format!("toggle {}", id),
            Command::Intent(Intent::ExportRequested) => "export".to_string(),
            Command::List => "list".to_string(),
            Command::Parcels => "parcels".to_string(),
            Command::Neighborhoods => "neighborhoods".to_string(),
            Command::Help => "help".to_string(),
            Command::Quit => "quit".to_string(),
        }
    }
}
