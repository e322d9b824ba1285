//! Parse tracing infrastructure.
//!
//! The matcher is generic over a [`ParseTracer`] and calls its hooks at each
//! decision point: how a token was classified, how many tokens an option consumed,
//! how a positional run was split across positional arguments, which action ran,
//! and which tokens ended up as extras. With [`NoopTracer`] every hook inlines to
//! nothing.
//!
//! | Tracer | Purpose |
//! |--------|---------|
//! | [`NoopTracer`] | Zero-cost default used by [`Parser::parse`](crate::Parser::parse) |
//! | [`LogTracer`] | Human-readable decisions through the `log` facade |
//! | [`RecordingTracer`] | Full event recording for tests and post-mortem |
//!
//! ```
//! use ouros_argparse::{ArgumentSpec, MemoryFileReader, Nargs, Parser, ParserConfig};
//! use ouros_argparse::tracer::{RecordingTracer, TraceEvent};
//!
//! let mut parser = Parser::new(ParserConfig::new("cp")).unwrap();
//! parser.register(ArgumentSpec::new(["src"]).nargs(Nargs::OneOrMore)).unwrap();
//! parser.register(ArgumentSpec::new(["dst"])).unwrap();
//!
//! let mut tracer = RecordingTracer::new();
//! parser.parse_with(["a", "b", "c"], &MemoryFileReader::new(), &mut tracer).unwrap();
//! assert!(tracer.events().iter().any(|event| matches!(
//!     event,
//!     TraceEvent::PositionalRun { allocation, .. } if allocation == &[("src".to_owned(), 2), ("dst".to_owned(), 1)]
//! )));
//! ```

use crate::spec::Action;

/// Decision recorded by [`RecordingTracer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraceEvent {
    /// A raw token was classified; `flag` is the resolved flag for option tokens.
    Classified { token: String, flag: Option<String> },
    /// An `@file` reference was replaced by `count` tokens.
    FileExpanded { path: String, count: usize },
    /// An option run consumed `consumed` tokens after its flag.
    OptionConsumed { flag: String, consumed: usize },
    /// A positional run of `length` tokens was split as `(dest, tokens taken)`.
    PositionalRun {
        length: usize,
        allocation: Vec<(String, usize)>,
    },
    /// An action was applied to `dest`.
    ActionApplied { dest: String, action: Action },
    /// A token no argument consumed.
    Extra { token: String },
}

/// Hooks called by the matcher. All default to no-ops.
pub trait ParseTracer: std::fmt::Debug {
    #[inline]
    fn on_classify(&mut self, _token: &str, _flag: Option<&str>) {}

    #[inline]
    fn on_file_expanded(&mut self, _path: &str, _count: usize) {}

    #[inline]
    fn on_option(&mut self, _flag: &str, _consumed: usize) {}

    /// Called once per positional run with the number of tokens each served argument took.
    #[inline]
    fn on_positional_run(&mut self, _length: usize, _allocation: &[(&str, usize)]) {}

    #[inline]
    fn on_action(&mut self, _dest: &str, _action: Action) {}

    #[inline]
    fn on_extra(&mut self, _token: &str) {}
}

impl<T: ParseTracer + ?Sized> ParseTracer for &mut T {
    fn on_classify(&mut self, token: &str, flag: Option<&str>) {
        (**self).on_classify(token, flag);
    }

    fn on_file_expanded(&mut self, path: &str, count: usize) {
        (**self).on_file_expanded(path, count);
    }

    fn on_option(&mut self, flag: &str, consumed: usize) {
        (**self).on_option(flag, consumed);
    }

    fn on_positional_run(&mut self, length: usize, allocation: &[(&str, usize)]) {
        (**self).on_positional_run(length, allocation);
    }

    fn on_action(&mut self, dest: &str, action: Action) {
        (**self).on_action(dest, action);
    }

    fn on_extra(&mut self, token: &str) {
        (**self).on_extra(token);
    }
}

/// A tracer that does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTracer;

impl ParseTracer for NoopTracer {}

/// Tracer that reports matching decisions through the `log` facade.
///
/// Classification goes to `trace!`, everything else to `debug!`, all under the
/// `ouros_argparse` target. Nothing is printed unless the embedding program
/// installs a logger.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogTracer;

const TARGET: &str = "ouros_argparse";

impl ParseTracer for LogTracer {
    fn on_classify(&mut self, token: &str, flag: Option<&str>) {
        match flag {
            Some(flag) => log::trace!(target: TARGET, "{token:?} -> option {flag}"),
            None => log::trace!(target: TARGET, "{token:?} -> positional"),
        }
    }

    fn on_file_expanded(&mut self, path: &str, count: usize) {
        log::debug!(target: TARGET, "@{path} expanded to {count} tokens");
    }

    fn on_option(&mut self, flag: &str, consumed: usize) {
        log::debug!(target: TARGET, "{flag} consumed {consumed} token(s)");
    }

    fn on_positional_run(&mut self, length: usize, allocation: &[(&str, usize)]) {
        let split: Vec<String> = allocation.iter().map(|(dest, n)| format!("{dest}={n}")).collect();
        log::debug!(target: TARGET, "positional run of {length}: {}", split.join(" "));
    }

    fn on_action(&mut self, dest: &str, action: Action) {
        log::debug!(target: TARGET, "{action} -> {dest}");
    }

    fn on_extra(&mut self, token: &str) {
        log::debug!(target: TARGET, "extra {token:?}");
    }
}

/// Tracer that records every event.
#[derive(Debug, Default)]
pub struct RecordingTracer {
    events: Vec<TraceEvent>,
}

impl RecordingTracer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn events(&self) -> &[TraceEvent] {
        &self.events
    }

    #[must_use]
    pub fn into_events(self) -> Vec<TraceEvent> {
        self.events
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl ParseTracer for RecordingTracer {
    fn on_classify(&mut self, token: &str, flag: Option<&str>) {
        self.events.push(TraceEvent::Classified {
            token: token.to_owned(),
            flag: flag.map(str::to_owned),
        });
    }

    fn on_file_expanded(&mut self, path: &str, count: usize) {
        self.events.push(TraceEvent::FileExpanded {
            path: path.to_owned(),
            count,
        });
    }

    fn on_option(&mut self, flag: &str, consumed: usize) {
        self.events.push(TraceEvent::OptionConsumed {
            flag: flag.to_owned(),
            consumed,
        });
    }

    fn on_positional_run(&mut self, length: usize, allocation: &[(&str, usize)]) {
        self.events.push(TraceEvent::PositionalRun {
            length,
            allocation: allocation.iter().map(|(dest, n)| ((*dest).to_owned(), *n)).collect(),
        });
    }

    fn on_action(&mut self, dest: &str, action: Action) {
        self.events.push(TraceEvent::ActionApplied {
            dest: dest.to_owned(),
            action,
        });
    }

    fn on_extra(&mut self, token: &str) {
        self.events.push(TraceEvent::Extra { token: token.to_owned() });
    }
}
