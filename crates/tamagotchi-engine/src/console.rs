//! Line-based console input.
//!
//! Each stdin line is one command:
//!
//! | Line | Command |
//! |---|---|
//! | `feed` | toggle feeding |
//! | `rest` | toggle resting |
//! | `drink` | toggle drinking |
//! | `speed <x>` | set the simulation speed |
//! | `restart` | restart |
//! | `name <name>` | name the pet being created |
//! | `cancel` | cancel pet creation |
//! | `theme <black\|red\|green\|blue>` | change the theme |
//! | `save` | save progress now |
//! | `login <id_token> <refresh_token>` | switch account |
//! | `quit` | stop the session |

use std::io::BufRead;
use std::sync::Arc;
use std::thread::JoinHandle;

use tamagotchi_core::runner::SessionControl;
use tamagotchi_types::{Command, Theme, TokenSet};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, warn};

/// A console line that could not be understood.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// The first word is not a known command.
    #[error("unknown command `{word}`")]
    Unknown {
        /// The offending word.
        word: String,
    },

    /// A required argument is missing.
    #[error("`{command}` needs {what}")]
    MissingArgument {
        /// The command missing an argument.
        command: &'static str,
        /// Description of the argument.
        what: &'static str,
    },

    /// The speed is not a number.
    #[error("`{value}` is not a speed")]
    BadSpeed {
        /// The offending value.
        value: String,
    },

    /// The theme name is not known.
    #[error("unknown theme `{name}`")]
    BadTheme {
        /// The offending name.
        name: String,
    },
}

/// What a console line asks for.
#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    /// A session command.
    Command(Command),
    /// Stop the session.
    Quit,
}

/// Parse one console line. Blank lines yield `None`.
///
/// # Errors
///
/// Returns [`ParseError`] if the line is not a valid command.
pub fn parse_line(line: &str) -> Result<Option<Input>, ParseError> {
    let line = line.trim();
    let Some((word, rest)) = split_word(line) else {
        return Ok(None);
    };
    let command = match word.to_lowercase().as_str() {
        "quit" | "exit" => return Ok(Some(Input::Quit)),
        "feed" => Command::ToggleFeeding,
        "rest" => Command::ToggleResting,
        "drink" => Command::ToggleDrinking,
        "restart" => Command::RequestRestart,
        "cancel" => Command::CancelCreation,
        "save" => Command::SaveProgress,
        "speed" => {
            let value = required(rest, "speed", "a number")?;
            let Ok(speed) = value.parse::<f64>() else {
                return Err(ParseError::BadSpeed {
                    value: value.to_owned(),
                });
            };
            Command::SetSimulationSpeed(speed)
        }
        "name" => Command::NamePet(required(rest, "name", "a pet name")?.to_owned()),
        "theme" => {
            let name = required(rest, "theme", "a theme name")?;
            let theme = Theme::parse(name).ok_or_else(|| ParseError::BadTheme {
                name: name.to_owned(),
            })?;
            Command::SetTheme(theme)
        }
        "login" => {
            let (id_token, rest) = split_word(rest).ok_or(ParseError::MissingArgument {
                command: "login",
                what: "an id token and a refresh token",
            })?;
            let refresh_token = required(rest, "login", "a refresh token")?;
            Command::RequestAccountSwitch(TokenSet::new(id_token, refresh_token))
        }
        _ => {
            return Err(ParseError::Unknown {
                word: word.to_owned(),
            });
        }
    };
    Ok(Some(Input::Command(command)))
}

fn split_word(text: &str) -> Option<(&str, &str)> {
    let text = text.trim_start();
    if text.is_empty() {
        return None;
    }
    Some(
        text.split_once(char::is_whitespace)
            .map_or((text, ""), |(word, rest)| (word, rest.trim())),
    )
}

fn required<'a>(
    rest: &'a str,
    command: &'static str,
    what: &'static str,
) -> Result<&'a str, ParseError> {
    let rest = rest.trim();
    if rest.is_empty() {
        return Err(ParseError::MissingArgument { command, what });
    }
    Ok(rest)
}

/// Forward commands read from `reader` until it closes, `quit` is
/// entered, or the session stops listening.
pub fn read_commands<R: BufRead>(
    reader: R,
    commands: &UnboundedSender<Command>,
    control: &SessionControl,
) {
    for line in reader.lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                warn!(error = %e, "Failed to read console input");
                return;
            }
        };
        match parse_line(&line) {
            Ok(Some(Input::Command(command))) => {
                if commands.send(command).is_err() {
                    return;
                }
            }
            Ok(Some(Input::Quit)) => {
                info!("Quit requested from console");
                control.request_stop();
                return;
            }
            Ok(None) => {}
            Err(e) => warn!(error = %e, "Ignoring console input"),
        }
    }
    debug!("Console input closed");
}

/// Read commands from stdin on a dedicated OS thread.
///
/// A blocking stdin read cannot be cancelled, so the thread is never
/// joined: the process exits without waiting for it and shutdown does
/// not wait for another line of input.
///
/// # Errors
///
/// Returns the I/O error if the thread cannot be spawned.
pub fn spawn_console(
    commands: UnboundedSender<Command>,
    control: Arc<SessionControl>,
) -> std::io::Result<JoinHandle<()>> {
    std::thread::Builder::new()
        .name(String::from("console"))
        .spawn(move || read_commands(std::io::stdin().lock(), &commands, &control))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    fn command(line: &str) -> Command {
        match parse_line(line).unwrap() {
            Some(Input::Command(command)) => command,
            other => panic!("expected a command, got {other:?}"),
        }
    }

    #[test]
    fn toggles() {
        assert_eq!(command("feed"), Command::ToggleFeeding);
        assert_eq!(command("  REST "), Command::ToggleResting);
        assert_eq!(command("drink"), Command::ToggleDrinking);
    }

    #[test]
    fn blank_line_is_nothing() {
        assert_eq!(parse_line("   ").unwrap(), None);
    }

    #[test]
    fn quit() {
        assert_eq!(parse_line("quit").unwrap(), Some(Input::Quit));
    }

    #[test]
    fn speed_takes_a_number() {
        assert_eq!(command("speed 2.5"), Command::SetSimulationSpeed(2.5));
        assert!(matches!(
            parse_line("speed fast"),
            Err(ParseError::BadSpeed { .. })
        ));
        assert!(matches!(
            parse_line("speed"),
            Err(ParseError::MissingArgument { command: "speed", .. })
        ));
    }

    #[test]
    fn name_keeps_spaces() {
        assert_eq!(command("name Sir Mochi"), Command::NamePet(String::from("Sir Mochi")));
    }

    #[test]
    fn theme_by_name() {
        assert_eq!(command("theme green"), Command::SetTheme(Theme::Green));
        assert!(matches!(
            parse_line("theme purple"),
            Err(ParseError::BadTheme { .. })
        ));
    }

    #[test]
    fn login_needs_both_tokens() {
        let Command::RequestAccountSwitch(tokens) = command("login id-1 refresh-1") else {
            panic!("expected account switch");
        };
        assert_eq!(tokens.id_token, "id-1");
        assert_eq!(tokens.refresh_token, "refresh-1");
        assert!(matches!(
            parse_line("login id-1"),
            Err(ParseError::MissingArgument { command: "login", .. })
        ));
    }

    #[test]
    fn reader_forwards_commands_and_stops_on_quit() {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let control = SessionControl::new(0);
        let input = std::io::Cursor::new("feed\n\ndance\nquit\ndrink\n");
        read_commands(input, &tx, &control);

        assert_eq!(rx.try_recv().unwrap(), Command::ToggleFeeding);
        assert!(rx.try_recv().is_err());
        assert!(control.is_stop_requested());
    }

    #[test]
    fn reader_returns_at_end_of_input() {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let control = SessionControl::new(0);
        read_commands(std::io::Cursor::new("rest"), &tx, &control);

        assert_eq!(rx.try_recv().unwrap(), Command::ToggleResting);
        assert!(!control.is_stop_requested());
    }

    #[test]
    fn unknown_word() {
        assert_eq!(
            parse_line("dance"),
            Err(ParseError::Unknown {
                word: String::from("dance"),
            })
        );
    }
}
