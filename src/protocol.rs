//! Line-oriented text protocol for driving the engine from another program.
//!
//! Framing follows the Go Text Protocol: each request is one line,
//! optionally prefixed by a numeric id, and each response is `=` (success)
//! or `?` (failure), the id if one was given, a space, the payload, and a
//! blank line.
//!
//! ## Supported Commands
//!
//! - `name` - Return engine name
//! - `version` - Return engine version
//! - `protocol_version` - Return protocol version (2)
//! - `list_commands` - List all supported commands
//! - `known_command <cmd>` - Check if a command is supported
//! - `quit` - Exit the loop
//! - `boardsize <n>` - Start a new game on an n x n board (3 or 4)
//! - `clear_board` - Reset the board to empty
//! - `depth <plies>` - Set the search horizon
//! - `play <row> <col>` - Place the mark of the side to move
//! - `genmove` - Search, play, and return the engine's move as `row col`
//! - `showboard` - Print the board
//! - `final_status` - `ongoing`, `draw`, `X wins` or `O wins`
//!
//! ## Example
//!
//! ```
//! use noughts::board::Board;
//! use noughts::protocol::ProtocolEngine;
//! use noughts::search::SearchConfig;
//!
//! let config = SearchConfig::new().with_max_depth(9);
//! let mut engine = ProtocolEngine::with_config(Board::new(3), config);
//! let mut out = Vec::new();
//! engine.run("play 1 1\ngenmove\nquit\n".as_bytes(), &mut out).unwrap();
//! assert!(String::from_utf8(out).unwrap().starts_with("= \n\n= 0 0\n\n"));
//! ```

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use tracing::debug;

use crate::board::{Board, Cell};
use crate::constants::SUPPORTED_WIDTHS;
use crate::search::{SearchConfig, search};

/// The list of known commands.
const KNOWN_COMMANDS: &[&str] = &[
    "boardsize",
    "clear_board",
    "depth",
    "final_status",
    "genmove",
    "known_command",
    "list_commands",
    "name",
    "play",
    "protocol_version",
    "quit",
    "showboard",
    "version",
];

/// Protocol session state: one board and the search settings.
pub struct ProtocolEngine {
    board: Board,
    config: SearchConfig,
}

impl Default for ProtocolEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ProtocolEngine {
    /// Create an engine with a default-sized board and default search settings.
    pub fn new() -> Self {
        Self::with_config(Board::default(), SearchConfig::default())
    }

    pub fn with_config(board: Board, config: SearchConfig) -> Self {
        Self { board, config }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Serve stdin/stdout until `quit` or end of input.
    pub fn run_stdio(&mut self) -> Result<()> {
        let stdin = io::stdin();
        self.run(stdin.lock(), io::stdout().lock())
    }

    /// Read commands from `input` and write responses to `output` until
    /// `quit` or end of input.
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, mut output: W) -> Result<()> {
        for line in input.lines() {
            let line = line.context("failed to read command")?;

            // Skip empty lines and comments
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (id, command_line) = Self::parse_id(line);
            let parts: Vec<&str> = command_line.split_whitespace().collect();
            let Some((command, args)) = parts.split_first() else {
                continue;
            };
            let command = command.to_lowercase();

            debug!(%command, ?args, "protocol command");
            let (success, message) = self.execute(&command, args);

            let prefix = if success { '=' } else { '?' };
            let id_str = id.map(|i| i.to_string()).unwrap_or_default();
            write!(output, "{prefix}{id_str} {message}\n\n").context("failed to write response")?;
            output.flush().context("failed to flush response")?;

            if command == "quit" {
                break;
            }
        }
        Ok(())
    }

    /// Parse an optional numeric command ID from the beginning of the line.
    fn parse_id(line: &str) -> (Option<u32>, &str) {
        let trimmed = line.trim();
        let end = trimmed
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(trimmed.len());
        if end == 0 {
            return (None, trimmed);
        }
        match trimmed[..end].parse::<u32>() {
            Ok(id) => (Some(id), trimmed[end..].trim()),
            Err(_) => (None, trimmed),
        }
    }

    /// Execute a command and return (success, response).
    fn execute(&mut self, command: &str, args: &[&str]) -> (bool, String) {
        match command {
            "name" => (true, env!("CARGO_PKG_NAME").to_string()),

            "version" => (true, env!("CARGO_PKG_VERSION").to_string()),

            "protocol_version" => (true, "2".to_string()),

            "list_commands" => (true, KNOWN_COMMANDS.join("\n")),

            "known_command" => {
                let Some(name) = args.first() else {
                    return (false, "missing argument".to_string());
                };
                let known = KNOWN_COMMANDS.contains(&name.to_lowercase().as_str());
                (true, known.to_string())
            }

            "quit" => (true, String::new()),

            "boardsize" => {
                let Some(arg) = args.first() else {
                    return (false, "missing argument".to_string());
                };
                match arg.parse::<usize>() {
                    Ok(size) if SUPPORTED_WIDTHS.contains(&size) => {
                        self.board = Board::new(size);
                        (true, String::new())
                    }
                    Ok(size) => (false, format!("unacceptable size {size}")),
                    Err(_) => (false, "invalid size".to_string()),
                }
            }

            "clear_board" => {
                self.board.clear();
                (true, String::new())
            }

            "depth" => {
                let Some(arg) = args.first() else {
                    return (false, "missing argument".to_string());
                };
                match arg.parse::<u32>() {
                    Ok(plies) if plies > 0 => {
                        self.config = self.config.with_max_depth(plies);
                        (true, String::new())
                    }
                    _ => (false, "invalid depth".to_string()),
                }
            }

            "play" => {
                let [row, col] = args else {
                    return (false, "expected: play <row> <col>".to_string());
                };
                let (Ok(row), Ok(col)) = (row.parse::<i32>(), col.parse::<i32>()) else {
                    return (false, "invalid coordinate".to_string());
                };
                match self.board.try_place(row, col) {
                    Ok(()) => (true, String::new()),
                    Err(err) => (false, err.to_string()),
                }
            }

            "genmove" => {
                let result = search(&mut self.board, &self.config);
                let Some(mv) = result.best else {
                    return (false, "no legal moves".to_string());
                };
                match self.board.try_place(mv.row as i32, mv.col as i32) {
                    Ok(()) => (true, mv.to_string()),
                    Err(err) => (false, err.to_string()),
                }
            }

            "showboard" => (true, format!("\n{}", self.board.to_string().trim_end())),

            "final_status" => {
                let status = match (self.board.is_over(), self.board.winner()) {
                    (false, _) => "ongoing".to_string(),
                    (true, Cell::Blank) => "draw".to_string(),
                    (true, winner) => format!("{winner} wins"),
                };
                (true, status)
            }

            _ => (false, format!("unknown command: {command}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classic_engine() -> ProtocolEngine {
        ProtocolEngine::with_config(Board::new(3), SearchConfig::new().with_max_depth(9))
    }

    #[test]
    fn test_parse_id_with_id() {
        let (id, cmd) = ProtocolEngine::parse_id("123 name");
        assert_eq!(id, Some(123));
        assert_eq!(cmd, "name");
    }

    #[test]
    fn test_parse_id_without_id() {
        let (id, cmd) = ProtocolEngine::parse_id("name");
        assert_eq!(id, None);
        assert_eq!(cmd, "name");
    }

    #[test]
    fn test_name_command() {
        let mut engine = ProtocolEngine::new();
        let (success, response) = engine.execute("name", &[]);
        assert!(success);
        assert_eq!(response, "noughts");
    }

    #[test]
    fn test_known_command() {
        let mut engine = ProtocolEngine::new();

        let (success, response) = engine.execute("known_command", &["genmove"]);
        assert!(success);
        assert_eq!(response, "true");

        let (success, response) = engine.execute("known_command", &["komi"]);
        assert!(success);
        assert_eq!(response, "false");
    }

    #[test]
    fn test_boardsize() {
        let mut engine = ProtocolEngine::new();

        let (success, _) = engine.execute("boardsize", &["4"]);
        assert!(success);
        assert_eq!(engine.board().width(), 4);

        let (success, _) = engine.execute("boardsize", &["19"]);
        assert!(!success);
        assert_eq!(engine.board().width(), 4);
    }

    #[test]
    fn test_play_rejects_illegal_moves() {
        let mut engine = classic_engine();

        let (success, _) = engine.execute("play", &["1", "1"]);
        assert!(success);

        let (success, message) = engine.execute("play", &["1", "1"]);
        assert!(!success);
        assert!(message.contains("already marked"), "got '{message}'");

        let (success, _) = engine.execute("play", &["-1", "0"]);
        assert!(!success);

        let (success, _) = engine.execute("play", &["1"]);
        assert!(!success);
    }

    #[test]
    fn test_genmove_until_game_ends() {
        let mut engine = classic_engine();
        for _ in 0..9 {
            let (success, _) = engine.execute("genmove", &[]);
            assert!(success);
        }
        assert_eq!(engine.execute("final_status", &[]), (true, "draw".to_string()));

        let (success, message) = engine.execute("genmove", &[]);
        assert!(!success);
        assert_eq!(message, "no legal moves");

        engine.execute("clear_board", &[]);
        assert_eq!(engine.execute("final_status", &[]), (true, "ongoing".to_string()));
    }

    #[test]
    fn test_run_writes_framed_responses() {
        let mut engine = classic_engine();
        let mut out = Vec::new();
        engine
            .run("# comment\n1 name\nbogus\n2 quit\nname\n".as_bytes(), &mut out)
            .unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, "=1 noughts\n\n? unknown command: bogus\n\n=2 \n\n");
    }
}
