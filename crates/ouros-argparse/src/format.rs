use std::fmt::Write as _;

use crate::usage::UsageModel;

/// Renders a [`UsageModel`] as text.
///
/// The engine never formats help itself; implement this trait to control layout
/// (wrapping, colors, terminal width).
pub trait HelpFormatter {
    fn format_usage(&self, model: &UsageModel) -> String;

    fn format_help(&self, model: &UsageModel) -> String;
}

/// Unwrapped, argparse-style layout.
///
/// ```text
/// usage: prog [-h] [--foo FOO] bar
///
/// positional arguments:
///   bar
///
/// options:
///   -h, --help  show this help message and exit
///   --foo FOO
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlainFormatter {
    /// Indentation of entries within a section.
    pub indent: usize,
    /// Help text never starts further right than this column.
    pub max_help_position: usize,
}

impl Default for PlainFormatter {
    fn default() -> Self {
        Self {
            indent: 2,
            max_help_position: 24,
        }
    }
}

impl PlainFormatter {
    /// Column where help text starts: after the longest invocation, capped.
    fn help_position(&self, model: &UsageModel) -> usize {
        let longest = model
            .entries()
            .map(|entry| entry.invocation.chars().count())
            .max()
            .unwrap_or(0);
        (longest + self.indent + 2).min(self.max_help_position)
    }
}

impl HelpFormatter for PlainFormatter {
    fn format_usage(&self, model: &UsageModel) -> String {
        format!("usage: {}\n", model.usage)
    }

    fn format_help(&self, model: &UsageModel) -> String {
        let mut out = self.format_usage(model);
        if let Some(description) = &model.description {
            let _ = write!(out, "\n{description}\n");
        }

        let indent = " ".repeat(self.indent);
        let help_position = self.help_position(model);
        let width = help_position.saturating_sub(self.indent + 2);
        for section in &model.sections {
            let _ = write!(out, "\n{}:\n", section.title);
            if let Some(description) = &section.description {
                let _ = writeln!(out, "{indent}{description}");
            }
            for entry in &section.entries {
                let invocation = &entry.invocation;
                match &entry.help {
                    None => {
                        let _ = writeln!(out, "{indent}{invocation}");
                    }
                    Some(help) if invocation.chars().count() <= width => {
                        let _ = writeln!(out, "{indent}{invocation:<width$}  {help}");
                    }
                    Some(help) => {
                        let _ = writeln!(out, "{indent}{invocation}");
                        let _ = writeln!(out, "{:help_position$}{help}", "");
                    }
                }
            }
        }

        if let Some(epilog) = &model.epilog {
            let _ = write!(out, "\n{epilog}\n");
        }
        out
    }
}
