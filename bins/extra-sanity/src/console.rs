// User-facing output. Colors are a pure function of the enabled flag passed in.
use std::fmt::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Emph,
    Green,
    Red,
}

impl Color {
    /// SGR parameter for this color
    pub fn code(self) -> u8 {
        match self {
            Color::Emph => 1,
            Color::Green => 32,
            Color::Red => 31,
        }
    }
}

/// Wrap `text` in an ANSI escape sequence when `enabled`
pub fn colorize(text: &str, color: Color, enabled: bool) -> String {
    if !enabled {
        return text.to_string();
    }
    format!("\x1b[{}m{}\x1b[0m", color.code(), text)
}

#[derive(Debug, Clone, Copy)]
pub struct Console {
    color: bool,
}

impl Console {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    pub fn print(&self, text: impl Display, color: Color) {
        println!("{}", colorize(&text.to_string(), color, self.color));
    }

    /// Echo a command line before it runs
    pub fn command(&self, argv: &[String]) {
        self.print(command_line(argv), Color::Emph);
    }
}

/// `[RUN]` echo for an argv, joined by single spaces
pub fn command_line(argv: &[String]) -> String {
    format!("[RUN] {}", argv.join(" "))
}
