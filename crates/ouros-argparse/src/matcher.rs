//! The matching state machine.
//!
//! The classified token stream is walked left to right exactly once. At each step
//! the cursor sits either on an option token, which starts an *option run* (the flag
//! plus whatever its arity consumes), or on a positional token, which starts a
//! *positional run* (every token up to the next option). Positional runs are split
//! across the still-unsatisfied positional arguments in declaration order by
//! [`allocate`]; the split is final, nothing is revisited later.

use crate::{
    action::ActionExecutor,
    error::{ParseError, ParseOutcome},
    parser::{Argument, Parser},
    spec::Nargs,
    tokenizer::{OptionToken, Token},
    tracer::ParseTracer,
};

/// What survives a completed match: the executor holding the namespace, and extras.
pub(crate) struct Matched<'p> {
    pub(crate) executor: ActionExecutor<'p>,
    pub(crate) extras: Vec<String>,
}

pub(crate) struct Matcher<'p, T> {
    parser: &'p Parser,
    tokens: Vec<Token>,
    cursor: usize,
    /// Indices of positional arguments, in declaration order.
    positionals: Vec<usize>,
    /// First positional not yet served by a run.
    next_positional: usize,
    /// Unknown options are errors rather than extras.
    strict: bool,
    extras: Vec<String>,
    executor: ActionExecutor<'p>,
    tracer: T,
}

impl<'p, T: ParseTracer> Matcher<'p, T> {
    pub(crate) fn new(parser: &'p Parser, tokens: Vec<Token>, strict: bool, tracer: T) -> Self {
        let positionals = parser
            .arguments
            .iter()
            .enumerate()
            .filter(|(_, argument)| argument.is_positional())
            .map(|(idx, _)| idx)
            .collect();
        Self {
            parser,
            tokens,
            cursor: 0,
            positionals,
            next_positional: 0,
            strict,
            extras: Vec::new(),
            executor: ActionExecutor::new(parser),
            tracer,
        }
    }

    pub(crate) fn run(mut self) -> Result<Matched<'p>, ParseOutcome> {
        while self.cursor < self.tokens.len() {
            match &self.tokens[self.cursor] {
                Token::Option(option) => {
                    let option = option.clone();
                    self.cursor += 1;
                    self.consume_optional(option)?;
                }
                Token::Positional(_) => {
                    let end = self.run_end(self.cursor);
                    self.consume_positionals(self.cursor, end)?;
                }
            }
        }
        self.finish_positionals()?;
        Ok(Matched {
            executor: self.executor,
            extras: self.extras,
        })
    }

    /// Index of the first option token at or after `start`.
    fn run_end(&self, start: usize) -> usize {
        self.tokens[start..]
            .iter()
            .position(|token| matches!(token, Token::Option(_)))
            .map_or(self.tokens.len(), |offset| start + offset)
    }

    fn push_extra(&mut self, token: String) {
        self.tracer.on_extra(&token);
        self.extras.push(token);
    }

    fn apply(&mut self, index: usize, values: &[String]) -> Result<(), ParseOutcome> {
        let argument = &self.parser.arguments[index];
        self.tracer.on_action(&argument.dest, argument.action);
        self.executor.apply(index, values)
    }

    /// Handles one option run. The cursor already points past the option token.
    fn consume_optional(&mut self, option: OptionToken) -> Result<(), ParseOutcome> {
        let parser = self.parser;
        let Some(mut index) = option.index else {
            if self.strict {
                return Err(ParseError::UnrecognizedOption { option: option.raw }.into());
            }
            self.push_extra(option.raw);
            return Ok(());
        };
        let mut flag = option.flag;
        let mut attached = option.attached;

        loop {
            let argument = &parser.arguments[index];
            let Some(text) = attached.take() else {
                let values = self.take_values(argument, Vec::new())?;
                self.tracer.on_option(&flag, values.len());
                return self.apply(index, &values);
            };
            if argument.arity() != Nargs::Exact(0) {
                let values = self.take_values(argument, vec![text])?;
                self.tracer.on_option(&flag, values.len());
                return self.apply(index, &values);
            }

            // A zero-token short flag with attached text is a cluster: `-vvv`, `-xf`.
            let Some((next_flag, rest)) = self.split_cluster(&flag, &text) else {
                return Err(ParseError::UnexpectedArgument {
                    argument: argument.display_name(),
                    value: text,
                }
                .into());
            };
            let Some(&next_index) = parser.option_index().get(&next_flag) else {
                return Err(ParseError::UnexpectedArgument {
                    argument: argument.display_name(),
                    value: text,
                }
                .into());
            };
            self.tracer.on_option(&flag, 0);
            self.apply(index, &[])?;
            index = next_index;
            flag = next_flag;
            attached = (!rest.is_empty()).then_some(rest);
        }
    }

    /// For a single-prefix short flag like `-v` and attached text `vx`, returns
    /// `("-v", "x")`: the next flag of the cluster and what is left after it.
    fn split_cluster(&self, flag: &str, text: &str) -> Option<(String, String)> {
        let prefix_chars = &self.parser.config().prefix_chars;
        let mut chars = flag.chars();
        let prefix = chars.next()?;
        let short = chars.next()?;
        if chars.next().is_some() || prefix_chars.contains(short) {
            return None;
        }
        let mut rest = text.chars();
        let next = rest.next()?;
        Some((format!("{prefix}{next}"), rest.as_str().to_owned()))
    }

    /// Collects the tokens an option consumes after its flag. `values` holds the
    /// attached value, if any, which counts towards the arity.
    fn take_values(&mut self, argument: &Argument, mut values: Vec<String>) -> Result<Vec<String>, ParseError> {
        let arity = argument.arity();
        let already = values.len();
        let available = self.run_end(self.cursor) - self.cursor;
        let count = match arity {
            Nargs::Remainder => self.tokens.len() - self.cursor,
            Nargs::Optional if already > 0 => 0,
            Nargs::Optional => available.min(1),
            Nargs::Exact(n) => n.saturating_sub(already),
            Nargs::ZeroOrMore | Nargs::OneOrMore => available,
        };
        if (arity != Nargs::Remainder && count > available) || already + count < arity.min() {
            return Err(ParseError::InsufficientArguments {
                argument: argument.display_name(),
                nargs: arity,
            });
        }
        let end = self.cursor + count;
        values.extend(self.tokens[self.cursor..end].iter().map(|token| token.raw().to_owned()));
        self.cursor = end;
        Ok(values)
    }

    /// Serves the positional run `start..end` to the pending positionals.
    fn consume_positionals(&mut self, start: usize, end: usize) -> Result<(), ParseOutcome> {
        let parser = self.parser;
        let pending = &self.positionals[self.next_positional..];
        let arities: Vec<Nargs> = pending.iter().map(|&idx| parser.arguments[idx].arity()).collect();
        let counts = allocate(&arities, end - start);

        if counts.is_empty() {
            if let Some(&first) = pending.first() {
                return Err(ParseError::MissingArgument {
                    argument: parser.arguments[first].display_name(),
                }
                .into());
            }
            self.extras_from(start, end);
            return Ok(());
        }

        let served: Vec<usize> = pending[..counts.len()].to_vec();
        let mut cursor = start;
        let mut batches: Vec<(usize, Vec<String>)> = Vec::with_capacity(served.len());
        for (&index, &count) in served.iter().zip(&counts) {
            let stop = if parser.arguments[index].arity() == Nargs::Remainder {
                self.tokens.len()
            } else {
                cursor + count
            };
            let values = self.tokens[cursor..stop].iter().map(|token| token.raw().to_owned()).collect();
            batches.push((index, values));
            cursor = stop;
        }
        self.next_positional += served.len();

        let allocation: Vec<(&str, usize)> = batches
            .iter()
            .map(|(index, values)| (parser.arguments[*index].dest.as_str(), values.len()))
            .collect();
        self.tracer.on_positional_run(end - start, &allocation);

        for (index, values) in &batches {
            self.apply(*index, values)?;
        }

        if cursor >= end {
            self.cursor = cursor;
        } else {
            self.extras_from(cursor, end);
        }
        Ok(())
    }

    /// Moves the tokens `start..end` to the extras and the cursor past them.
    fn extras_from(&mut self, start: usize, end: usize) {
        for idx in start..end {
            let token = self.tokens[idx].raw().to_owned();
            self.push_extra(token);
        }
        self.cursor = end;
    }

    /// Positionals no run reached: those needing tokens are missing, the rest get
    /// their empty-match value.
    fn finish_positionals(&mut self) -> Result<(), ParseOutcome> {
        let parser = self.parser;
        let pending: Vec<usize> = self.positionals[self.next_positional..].to_vec();
        if let Some(&missing) = pending.iter().find(|&&idx| parser.arguments[idx].arity().min() > 0) {
            return Err(ParseError::MissingArgument {
                argument: parser.arguments[missing].display_name(),
            }
            .into());
        }
        self.next_positional = self.positionals.len();
        for index in pending {
            self.apply(index, &[])?;
        }
        Ok(())
    }
}

/// Splits a run of `length` tokens across pending positionals with the given arities.
///
/// Only the longest prefix of `arities` whose minimums fit in `length` is served; a
/// `Remainder` ends the prefix. Within the prefix each argument takes, in order,
/// as much as it can while leaving the minimums of those after it: exact counts
/// take `n`, `?` takes one token if one is spare, `*` and `+` take every spare
/// token. The returned counts cover the served prefix only.
pub(crate) fn allocate(arities: &[Nargs], length: usize) -> Vec<usize> {
    let mut served = 0;
    let mut minimum: usize = 0;
    for arity in arities {
        if *arity == Nargs::Remainder {
            served += 1;
            break;
        }
        minimum = minimum.saturating_add(arity.min());
        if minimum > length {
            break;
        }
        served += 1;
    }

    let prefix = &arities[..served];
    let mut remaining = length;
    let mut counts = Vec::with_capacity(served);
    for (i, arity) in prefix.iter().enumerate() {
        let reserve = prefix[i + 1..]
            .iter()
            .map(|later| later.min())
            .fold(0, usize::saturating_add);
        let spare = remaining.saturating_sub(reserve);
        let take = match arity {
            Nargs::Exact(n) => *n,
            Nargs::Optional => spare.min(1),
            Nargs::ZeroOrMore | Nargs::OneOrMore => spare,
            Nargs::Remainder => remaining,
        };
        counts.push(take);
        remaining -= take;
    }
    counts
}
