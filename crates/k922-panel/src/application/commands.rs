//! Console command parsing.
//!
//! One line, one command.  The first word names the command; the rest are
//! its arguments.  `set` takes everything after the field name as the value,
//! so values may contain spaces.  Blank lines and lines starting with `#` are
//! not commands.

use std::path::PathBuf;

/// A parsed console command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Connect { url: Option<String> },
    Disconnect,
    Status,
    Apply,
    Export { path: Option<PathBuf> },
    Import { path: PathBuf },
    Set { field: String, value: String },
    Unset { field: String },
    Check { group: String, value: String },
    Uncheck { group: String, value: String },
    Imu { enabled: bool },
    Show,
    Display,
    Options { field: String },
    Fields,
    Help,
    Quit,
}

/// A line that is not a valid command.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("unknown command {0:?}; type `help`")]
    Unknown(String),

    #[error("usage: {0}")]
    Usage(&'static str),
}

/// Usage line of every command, in `help` order.
pub const USAGE: &[&str] = &[
    "connect [url]             open the backend link (url defaults to the backendUrl field)",
    "disconnect                close the backend link",
    "status                    ask the backend for a status snapshot",
    "apply                     send the form's configuration to the backend",
    "export [path]             write the form's configuration to a JSON file",
    "import <path>             load a JSON configuration file into the form",
    "set <field> <value>       write a field",
    "unset <field>             empty a field (its default applies)",
    "check <group> <value>     check one item of a checkbox group",
    "uncheck <group> <value>   uncheck one item of a checkbox group",
    "imu on|off                set the IMU enabled checkbox",
    "show                      print the configuration the form would produce",
    "display                   print the latest receiver status",
    "options <field>           list the choices of a select field",
    "fields                    list field and group ids",
    "help                      this text",
    "quit                      leave the panel",
];

/// Parses one console line.
///
/// Returns `Ok(None)` for blank and comment lines.
pub fn parse_command(line: &str) -> Result<Option<Command>, CommandError> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let (word, rest) = split_word(line);
    let args: Vec<&str> = rest.split_whitespace().collect();

    let command = match word {
        "connect" => match args.as_slice() {
            [] => Command::Connect { url: None },
            [url] => Command::Connect {
                url: Some((*url).to_string()),
            },
            _ => return Err(CommandError::Usage("connect [url]")),
        },
        "disconnect" => no_args(&args, "disconnect", Command::Disconnect)?,
        "status" => no_args(&args, "status", Command::Status)?,
        "apply" => no_args(&args, "apply", Command::Apply)?,
        "export" => Command::Export {
            path: (!rest.is_empty()).then(|| PathBuf::from(rest)),
        },
        "import" => {
            if rest.is_empty() {
                return Err(CommandError::Usage("import <path>"));
            }
            Command::Import {
                path: PathBuf::from(rest),
            }
        }
        "set" => {
            let (field, value) = split_word(rest);
            if field.is_empty() || value.is_empty() {
                return Err(CommandError::Usage("set <field> <value>"));
            }
            Command::Set {
                field: field.to_string(),
                value: value.to_string(),
            }
        }
        "unset" => match args.as_slice() {
            [field] => Command::Unset {
                field: (*field).to_string(),
            },
            _ => return Err(CommandError::Usage("unset <field>")),
        },
        "check" | "uncheck" => match args.as_slice() {
            [group, value] => {
                let (group, value) = ((*group).to_string(), (*value).to_string());
                if word == "check" {
                    Command::Check { group, value }
                } else {
                    Command::Uncheck { group, value }
                }
            }
            _ if word == "check" => return Err(CommandError::Usage("check <group> <value>")),
            _ => return Err(CommandError::Usage("uncheck <group> <value>")),
        },
        "imu" => match args.as_slice() {
            ["on"] => Command::Imu { enabled: true },
            ["off"] => Command::Imu { enabled: false },
            _ => return Err(CommandError::Usage("imu on|off")),
        },
        "show" => no_args(&args, "show", Command::Show)?,
        "display" => no_args(&args, "display", Command::Display)?,
        "options" => match args.as_slice() {
            [field] => Command::Options {
                field: (*field).to_string(),
            },
            _ => return Err(CommandError::Usage("options <field>")),
        },
        "fields" => Command::Fields,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => return Err(CommandError::Unknown(other.to_string())),
    };
    Ok(Some(command))
}

/// Splits off the first whitespace-delimited word; the remainder is trimmed.
fn split_word(text: &str) -> (&str, &str) {
    match text.find(char::is_whitespace) {
        Some(i) => (&text[..i], text[i..].trim()),
        None => (text, ""),
    }
}

fn no_args(args: &[&str], usage: &'static str, command: Command) -> Result<Command, CommandError> {
    if args.is_empty() {
        Ok(command)
    } else {
        Err(CommandError::Usage(usage))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
