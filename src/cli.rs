//! Command-line interface for inspecting a session repository.
//!
//! Uses lexopt for minimal binary size overhead.

use std::ffi::OsString;
use std::path::PathBuf;

use serde_json::json;

use crate::repository::Repository;
use crate::session::{codec, DestroyOptions, RequestContext, SessionId, SessionStore};
use crate::{Result, SessionStoreError};

/// Subcommand to run against the repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Print a freshly generated session id.
    GenId,
    /// List stored session ids.
    List,
    /// Print a stored session with its decoded payload.
    Show(SessionId),
    /// Destroy a stored session.
    Delete(SessionId),
}

/// Command-line arguments.
#[derive(Debug, Clone, Default)]
pub struct Args {
    /// Path to configuration file.
    pub config: Option<PathBuf>,
    /// Storage directory (overrides config file).
    pub dir: Option<PathBuf>,
    /// Log level (error, warn, info, debug, trace).
    pub log_level: Option<String>,
    /// Subcommand, if one was given.
    pub command: Option<Command>,
    /// Show version and exit.
    pub version: bool,
    /// Show help and exit.
    pub help: bool,
}

/// Parse command-line arguments.
pub fn parse_args() -> std::result::Result<Args, ArgsError> {
    parse_args_from(std::env::args_os())
}

/// Parse arguments from an iterator (for testing).
pub fn parse_args_from<I>(args: I) -> std::result::Result<Args, ArgsError>
where
    I: IntoIterator<Item = OsString>,
{
    use lexopt::prelude::*;

    let mut result = Args::default();
    let mut positional: Vec<String> = Vec::new();
    let mut parser = lexopt::Parser::from_iter(args);

    while let Some(arg) = parser.next()? {
        match arg {
            Short('h') | Long("help") => {
                result.help = true;
            }
            Short('V') | Long("version") => {
                result.version = true;
            }
            Short('c') | Long("config") => {
                result.config = Some(parser.value()?.parse()?);
            }
            Short('d') | Long("dir") => {
                result.dir = Some(parser.value()?.parse()?);
            }
            Short('l') | Long("log-level") => {
                result.log_level = Some(parser.value()?.parse()?);
            }
            Value(val) => {
                positional.push(val.string()?);
            }
            _ => return Err(arg.unexpected().into()),
        }
    }

    result.command = parse_command(positional)?;
    Ok(result)
}

fn parse_command(positional: Vec<String>) -> std::result::Result<Option<Command>, ArgsError> {
    let mut words = positional.into_iter();
    let Some(name) = words.next() else {
        return Ok(None);
    };

    let command = match name.as_str() {
        "gen-id" => Command::GenId,
        "list" => Command::List,
        "show" | "delete" => {
            let raw = words.next().ok_or(ArgsError::MissingValue("ID"))?;
            let id = SessionId::parse(raw.clone())
                .map_err(|_| ArgsError::InvalidValue("ID", raw))?;
            if name == "show" {
                Command::Show(id)
            } else {
                Command::Delete(id)
            }
        }
        _ => return Err(ArgsError::UnknownCommand(name)),
    };

    if let Some(extra) = words.next() {
        return Err(ArgsError::UnexpectedArgument(extra));
    }

    Ok(Some(command))
}

/// Run a subcommand and return the text to print.
pub async fn run<R: Repository>(command: &Command, store: &SessionStore<R>) -> Result<String> {
    match command {
        Command::GenId => Ok(store.generate_id()?.into_string()),
        Command::List => {
            let ids = store.repository().list_ids().await?;
            Ok(ids
                .iter()
                .map(SessionId::as_str)
                .collect::<Vec<_>>()
                .join("\n"))
        }
        Command::Show(id) => {
            let record = store
                .repository()
                .find_by_id(id)
                .await?
                .ok_or_else(|| SessionStoreError::SessionNotFound(id.to_string()))?;
            let payload = codec::decode(record.data.as_deref())?;

            let document = json!({
                "id": record.id,
                "device_id": record.device_id,
                "user_id": record.user_id,
                "payload": payload,
            });
            Ok(serde_json::to_string_pretty(&document)?)
        }
        Command::Delete(id) => {
            if store.repository().find_by_id(id).await?.is_none() {
                return Err(SessionStoreError::SessionNotFound(id.to_string()));
            }

            let mut ctx = RequestContext::with_session_id(id.clone());
            store
                .destroy_session(&mut ctx, Some(id.as_str()), DestroyOptions::dropped())
                .await?;
            Ok(format!("deleted {}", id))
        }
    }
}

/// Print help message.
pub fn print_help() {
    let version = env!("CARGO_PKG_VERSION");
    println!(
        r#"docstore-sessions {version}
Inspect a document-store session repository

USAGE:
    docstore-sessions [OPTIONS] <COMMAND>

COMMANDS:
    gen-id                  Print a new session id
    list                    List stored session ids
    show <ID>               Print a session and its decoded payload
    delete <ID>             Destroy a session

OPTIONS:
    -c, --config <FILE>     Path to configuration file (JSON)
    -d, --dir <DIR>         Session storage directory [default: sessions]
    -l, --log-level <LVL>   Log level (error, warn, info, debug, trace)
    -h, --help              Print help
    -V, --version           Print version

ENVIRONMENT VARIABLES:
    DOCSTORE_SESSIONS_DIR        Storage directory (overrides config)
    DOCSTORE_SESSIONS_LOG_LEVEL  Log level (overrides config)
    RUST_LOG                     Alternative log level setting

EXAMPLES:
    # List sessions stored under ./sessions
    docstore-sessions list

    # Inspect one session
    docstore-sessions -d /var/lib/app/sessions show 3q2-7wE_xYz...
"#
    );
}

/// Print version.
pub fn print_version() {
    println!("docstore-sessions {}", env!("CARGO_PKG_VERSION"));
}

/// Argument parsing errors.
#[derive(Debug)]
pub enum ArgsError {
    /// Lexopt parsing error.
    Lexopt(lexopt::Error),
    /// Required value was not given.
    MissingValue(&'static str),
    /// Invalid argument value.
    InvalidValue(&'static str, String),
    /// Subcommand is not known.
    UnknownCommand(String),
    /// Unexpected positional argument.
    UnexpectedArgument(String),
}

impl std::fmt::Display for ArgsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Lexopt(e) => write!(f, "{}", e),
            Self::MissingValue(name) => write!(f, "missing required argument <{}>", name),
            Self::InvalidValue(name, value) => {
                write!(f, "invalid value for <{}>: '{}'", name, value)
            }
            Self::UnknownCommand(name) => write!(f, "unknown command: '{}'", name),
            Self::UnexpectedArgument(arg) => {
                write!(f, "unexpected argument: '{}'", arg)
            }
        }
    }
}

impl std::error::Error for ArgsError {}

impl From<lexopt::Error> for ArgsError {
    fn from(e: lexopt::Error) -> Self {
        Self::Lexopt(e)
    }
}
