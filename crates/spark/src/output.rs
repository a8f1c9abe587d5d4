//! The output capability commands write through.
//!
//! [`Output`] is the small line-oriented surface the help renderer, the error
//! view and concrete commands use: write a line (optionally in a color), emit
//! a blank line, or style a fragment without writing it.
//!
//! Two implementations ship with the crate:
//!
//! - [`ConsoleOutput`] writes to stdout and styles with ANSI escape codes,
//!   following [`ColorMode`].
//! - [`BufferOutput`] captures lines in memory. Its [`TextMode`] decides
//!   whether colors are dropped (`Plain`) or kept visible as
//!   `[color]text[/color]` tags (`Debug`), which makes colorized output easy
//!   to assert on.

use console::{Style, Term};
use serde::Deserialize;
use std::cell::RefCell;
use std::fmt;
use std::io;
use std::str::FromStr;

/// Named foreground colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Color {
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Purple,
    Cyan,
    White,
    LightGray,
    DarkGray,
    LightRed,
    LightGreen,
    LightYellow,
    LightBlue,
    LightCyan,
}

impl Color {
    /// The lowercase name used in configuration and debug tags.
    pub fn name(&self) -> &'static str {
        match self {
            Color::Black => "black",
            Color::Red => "red",
            Color::Green => "green",
            Color::Yellow => "yellow",
            Color::Blue => "blue",
            Color::Magenta => "magenta",
            Color::Purple => "purple",
            Color::Cyan => "cyan",
            Color::White => "white",
            Color::LightGray => "light_gray",
            Color::DarkGray => "dark_gray",
            Color::LightRed => "light_red",
            Color::LightGreen => "light_green",
            Color::LightYellow => "light_yellow",
            Color::LightBlue => "light_blue",
            Color::LightCyan => "light_cyan",
        }
    }

    fn style(&self) -> Style {
        let style = Style::new();
        match self {
            Color::Black => style.black(),
            Color::Red => style.red(),
            Color::Green => style.green(),
            Color::Yellow => style.yellow(),
            Color::Blue => style.blue(),
            Color::Magenta | Color::Purple => style.magenta(),
            Color::Cyan => style.cyan(),
            Color::White => style.white().bright(),
            Color::LightGray => style.white(),
            Color::DarkGray => style.black().bright(),
            Color::LightRed => style.red().bright(),
            Color::LightGreen => style.green().bright(),
            Color::LightYellow => style.yellow().bright(),
            Color::LightBlue => style.blue().bright(),
            Color::LightCyan => style.cyan().bright(),
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when parsing an unknown color name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown color: {0}")]
pub struct ColorParseError(pub String);

impl FromStr for Color {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let color = match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "black" => Color::Black,
            "red" => Color::Red,
            "green" => Color::Green,
            "yellow" => Color::Yellow,
            "blue" => Color::Blue,
            "magenta" => Color::Magenta,
            "purple" => Color::Purple,
            "cyan" => Color::Cyan,
            "white" => Color::White,
            "light_gray" | "light_grey" => Color::LightGray,
            "dark_gray" | "dark_grey" => Color::DarkGray,
            "light_red" => Color::LightRed,
            "light_green" => Color::LightGreen,
            "light_yellow" => Color::LightYellow,
            "light_blue" => Color::LightBlue,
            "light_cyan" => Color::LightCyan,
            _ => return Err(ColorParseError(s.to_string())),
        };
        Ok(color)
    }
}

/// Whether [`ConsoleOutput`] emits ANSI styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    /// Style only when stdout is a color-capable terminal.
    #[default]
    Auto,
    /// Always style.
    Always,
    /// Never style.
    Never,
}

impl ColorMode {
    /// Resolves `Auto` against the current terminal.
    pub fn enabled(&self) -> bool {
        match self {
            ColorMode::Auto => console::colors_enabled(),
            ColorMode::Always => true,
            ColorMode::Never => false,
        }
    }
}

/// How [`BufferOutput`] treats colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextMode {
    /// Drop colors.
    #[default]
    Plain,
    /// Keep colors visible as `[name]text[/name]`.
    Debug,
}

/// Line-oriented, optionally colored output.
pub trait Output {
    /// Writes one line, optionally in a foreground color.
    fn write(&self, line: &str, color: Option<Color>) -> io::Result<()>;

    /// Writes an empty line.
    fn new_line(&self) -> io::Result<()> {
        self.write("", None)
    }

    /// Returns `text` styled with `color`, without writing it.
    fn color(&self, text: &str, color: Color) -> String;
}

/// Writes to stdout, styling with ANSI codes when enabled.
#[derive(Debug, Clone)]
pub struct ConsoleOutput {
    term: Term,
    styled: bool,
}

impl ConsoleOutput {
    pub fn new(mode: ColorMode) -> Self {
        Self {
            term: Term::stdout(),
            styled: mode.enabled(),
        }
    }

    /// Writes to stderr instead of stdout.
    pub fn stderr(mode: ColorMode) -> Self {
        Self {
            term: Term::stderr(),
            styled: mode.enabled(),
        }
    }
}

impl Default for ConsoleOutput {
    fn default() -> Self {
        Self::new(ColorMode::Auto)
    }
}

impl Output for ConsoleOutput {
    fn write(&self, line: &str, color: Option<Color>) -> io::Result<()> {
        match color {
            Some(color) => self.term.write_line(&self.color(line, color)),
            None => self.term.write_line(line),
        }
    }

    fn color(&self, text: &str, color: Color) -> String {
        if !self.styled || text.is_empty() {
            return text.to_string();
        }
        color
            .style()
            .force_styling(true)
            .apply_to(text)
            .to_string()
    }
}

/// Captures written lines in memory.
#[derive(Debug, Default)]
pub struct BufferOutput {
    mode: TextMode,
    lines: RefCell<Vec<String>>,
}

impl BufferOutput {
    /// A buffer that drops colors.
    pub fn new() -> Self {
        Self::default()
    }

    /// A buffer that keeps colors visible as tags.
    pub fn debug() -> Self {
        Self {
            mode: TextMode::Debug,
            lines: RefCell::default(),
        }
    }

    /// All lines written so far.
    pub fn lines(&self) -> Vec<String> {
        self.lines.borrow().clone()
    }

    /// All lines joined with `\n`.
    pub fn contents(&self) -> String {
        self.lines.borrow().join("\n")
    }

    pub fn clear(&self) {
        self.lines.borrow_mut().clear();
    }
}

impl Output for BufferOutput {
    fn write(&self, line: &str, color: Option<Color>) -> io::Result<()> {
        let line = match color {
            Some(color) => self.color(line, color),
            None => line.to_string(),
        };
        self.lines.borrow_mut().push(line);
        Ok(())
    }

    fn color(&self, text: &str, color: Color) -> String {
        match self.mode {
            TextMode::Plain => text.to_string(),
            TextMode::Debug => format!("[{}]{}[/{}]", color, text, color),
        }
    }
}
