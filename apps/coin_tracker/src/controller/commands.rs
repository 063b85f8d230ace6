//! Typed commands parsed from a line of terminal input.

use client_core::DraftField;
use shared::domain::CoinId;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq)]
pub enum UiCommand {
    SetField { field: DraftField, value: String },
    Submit,
    ClearDraft,
    Delete(CoinId),
    List,
    Json,
    Reload,
    PeerAdd {
        name: String,
        symbol: String,
        price: String,
    },
    PeerDelete(CoinId),
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("empty command")]
    Empty,
    #[error("unknown command '{0}'; type 'help'")]
    Unknown(String),
    #[error("usage: {0}")]
    Usage(&'static str),
    #[error("'{0}' is not a coin id")]
    BadId(String),
}

pub const HELP: &str = "\
commands:
  name <text> | symbol <text> | price <text>   edit the draft
  submit                                        create the drafted coin
  clear                                         reset the draft
  delete <id>                                   delete a coin
  list                                          redraw the view
  json                                          print the view as JSON
  reload                                        refetch the full catalog
  peer add <name> <symbol> <price>              create a coin as the peer client
  peer delete <id>                              delete a coin as the peer client
  help | quit";

pub fn parse_command(line: &str) -> Result<UiCommand, CommandError> {
    let line = line.trim();
    let (head, rest) = match line.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (line, ""),
    };

    match head.to_ascii_lowercase().as_str() {
        "" => Err(CommandError::Empty),
        "name" | "symbol" | "price" => {
            let field = head
                .parse::<DraftField>()
                .map_err(|_| CommandError::Unknown(head.to_string()))?;
            Ok(UiCommand::SetField {
                field,
                value: rest.to_string(),
            })
        }
        "submit" | "create" => Ok(UiCommand::Submit),
        "clear" => Ok(UiCommand::ClearDraft),
        "delete" | "rm" => parse_id(rest, "delete <id>").map(UiCommand::Delete),
        "list" | "ls" => Ok(UiCommand::List),
        "json" => Ok(UiCommand::Json),
        "reload" => Ok(UiCommand::Reload),
        "peer" => parse_peer(rest),
        "help" | "?" => Ok(UiCommand::Help),
        "quit" | "exit" => Ok(UiCommand::Quit),
        other => Err(CommandError::Unknown(other.to_string())),
    }
}

fn parse_peer(rest: &str) -> Result<UiCommand, CommandError> {
    const ADD_USAGE: &str = "peer add <name> <symbol> <price>";
    let mut parts = rest.split_whitespace();
    match parts.next() {
        Some("add") => {
            let args: Vec<&str> = parts.collect();
            let [name, symbol, price] = args.as_slice() else {
                return Err(CommandError::Usage(ADD_USAGE));
            };
            Ok(UiCommand::PeerAdd {
                name: name.to_string(),
                symbol: symbol.to_string(),
                price: price.to_string(),
            })
        }
        Some("delete") | Some("rm") => {
            let id = parts.next().unwrap_or_default();
            parse_id(id, "peer delete <id>").map(UiCommand::PeerDelete)
        }
        _ => Err(CommandError::Usage("peer add|delete ...")),
    }
}

fn parse_id(raw: &str, usage: &'static str) -> Result<CoinId, CommandError> {
    let raw = raw.trim().trim_start_matches('#');
    if raw.is_empty() {
        return Err(CommandError::Usage(usage));
    }
    raw.parse::<i64>()
        .map(CoinId)
        .map_err(|_| CommandError::BadId(raw.to_string()))
}
