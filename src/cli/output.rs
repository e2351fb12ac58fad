//! Handles all user-facing output for the CLI.
//!
//! This module is responsible for colorizing diagnostics, printing rewritten
//! sources and rendering diffs. By centralizing output logic here, every
//! command writes to the terminal the same way.

use std::io::Write;

use difference::{Changeset, Difference};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::pass::{DiagnosticSink, DIAGNOSTIC_TAG};

// ============================================================================
// DIAGNOSTIC SINK
// ============================================================================

/// Writes pass diagnostics to stderr, tag highlighted when attached to a tty.
pub struct TerminalSink {
    stderr: StandardStream,
}

impl TerminalSink {
    pub fn new() -> Self {
        Self {
            stderr: StandardStream::stderr(color_choice(atty::Stream::Stderr)),
        }
    }
}

impl Default for TerminalSink {
    fn default() -> Self {
        Self::new()
    }
}

impl DiagnosticSink for TerminalSink {
    fn emit(&mut self, message: &str) {
        let _ = self
            .stderr
            .set_color(ColorSpec::new().set_fg(Some(Color::Yellow)).set_bold(true));
        let _ = write!(self.stderr, "{}", DIAGNOSTIC_TAG);
        let _ = self.stderr.reset();
        let _ = writeln!(self.stderr, " {}", message);
    }
}

// ============================================================================
// CORE OUTPUT FUNCTIONS
// ============================================================================

/// Prints a file banner before its contents when several files go to stdout.
pub fn print_file_header(name: &str) {
    let mut stdout = StandardStream::stdout(color_choice(atty::Stream::Stdout));
    let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)).set_bold(true));
    let _ = writeln!(stdout, "// ==> {} <==", name);
    let _ = stdout.reset();
}

/// Prints the line diff between the formatted input and the rewritten output.
pub fn print_file_diff(name: &str, before: &str, after: &str) {
    let mut stdout = StandardStream::stdout(color_choice(atty::Stream::Stdout));
    let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Yellow)).set_bold(true));
    let _ = writeln!(stdout, "--- {}", name);
    let _ = writeln!(stdout, "+++ {} (spoofed)", name);
    let _ = stdout.reset();

    let changeset = Changeset::new(before.trim_end(), after.trim_end(), "\n");
    print_diff(&mut stdout, &changeset.diffs);
    let _ = stdout.reset();
}

// ============================================================================
// PRIVATE HELPERS
// ============================================================================

fn color_choice(stream: atty::Stream) -> ColorChoice {
    if atty::is(stream) {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    }
}

fn print_diff(stdout: &mut StandardStream, diffs: &[Difference]) {
    for diff in diffs {
        let (prefix, color, text) = match diff {
            Difference::Same(x) => (' ', None, x),
            Difference::Add(x) => ('+', Some(Color::Green), x),
            Difference::Rem(x) => ('-', Some(Color::Red), x),
        };
        // A hunk may span several lines; prefix each one.
        for line in text.split('\n') {
            let _ = match color {
                Some(color) => stdout.set_color(ColorSpec::new().set_fg(Some(color))),
                None => stdout.reset(),
            };
            let _ = writeln!(stdout, "{}{}", prefix, line);
        }
    }
}
