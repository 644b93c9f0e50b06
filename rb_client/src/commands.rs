use remote_blackjack::{Action, Phase, Tokens};
use std::fmt;

/// A parsed line of user input.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Command {
    /// Send an action to the controller.
    Play(Action),
    /// Print the command list.
    Help,
    /// Leave the client.
    Quit,
}

/// Errors that can occur during command parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Invalid bet amount (not a positive number).
    InvalidBetAmount(String),
    /// Bet command missing its amount.
    BetMissingAmount,
    /// Unrecognized command.
    UnrecognizedCommand(String),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidBetAmount(value) => write!(
                f,
                "Invalid bet amount '{value}'. Must be a positive number (e.g., 'bet 100')"
            ),
            Self::BetMissingAmount => write!(f, "Bet requires an amount (e.g., 'bet 100')"),
            Self::UnrecognizedCommand(cmd) => write!(
                f,
                "Unrecognized command '{cmd}'. Type 'help' to see available commands"
            ),
        }
    }
}

impl std::error::Error for ParseError {}

pub const HELP: &str = "\
Commands:
  bet N      place a bet of N tokens
  retake     take back the last bet
  deal       close betting and deal
  hit        draw a card
  stand      keep the hand
  double     double the bet and draw one card
  insure     take insurance against a dealer blackjack
  split      split a pair
  continue   resume an interrupted round
  new        discard an interrupted round
  help       show this list
  quit       leave
";

/// Parse a command string into a [`Command`].
///
/// `hit`, `stand` and `double` play the active split hand during
/// `SPLIT_TURN` and the main hand otherwise.
///
/// # Examples
///
/// ```
/// use rb_client::commands::{Command, parse_command};
/// use remote_blackjack::{Action, Phase};
///
/// assert_eq!(parse_command("hit", Phase::MainTurn), Ok(Command::Play(Action::Hit)));
/// assert_eq!(parse_command("hit", Phase::SplitTurn), Ok(Command::Play(Action::SplitHit)));
/// assert_eq!(parse_command("bet 50", Phase::Betting), Ok(Command::Play(Action::PlaceBet(50))));
/// ```
pub fn parse_command(input: &str, phase: Phase) -> Result<Command, ParseError> {
    let trimmed = input.trim();
    let split = phase == Phase::SplitTurn;

    // Try single-word commands first
    let action = match trimmed {
        "help" | "?" => return Ok(Command::Help),
        "quit" | "exit" => return Ok(Command::Quit),
        "retake" => Action::RetakeBet,
        "deal" => Action::StartGame,
        "hit" if split => Action::SplitHit,
        "hit" => Action::Hit,
        "stand" if split => Action::SplitStand,
        "stand" => Action::Stand,
        "double" if split => Action::SplitDouble,
        "double" => Action::Double,
        "insure" => Action::Insurance,
        "split" => Action::Split,
        "continue" => Action::Continue,
        "new" => Action::StartNew,
        _ => {
            let parts: Vec<&str> = trimmed.split_ascii_whitespace().collect();
            return match parts.first() {
                Some(&"bet") => parse_bet_command(&parts),
                _ => Err(ParseError::UnrecognizedCommand(trimmed.to_string())),
            };
        }
    };
    Ok(Command::Play(action))
}

/// Parse a bet command: "bet AMOUNT"
fn parse_bet_command(parts: &[&str]) -> Result<Command, ParseError> {
    let value = parts.get(1).ok_or(ParseError::BetMissingAmount)?;
    match value.parse::<Tokens>() {
        Ok(amount) if amount > 0 => Ok(Command::Play(Action::PlaceBet(amount))),
        _ => Err(ParseError::InvalidBetAmount(value.to_string())),
    }
}
