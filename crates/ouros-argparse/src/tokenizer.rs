//! `@file` expansion and option/positional classification.

use crate::{
    error::ParseError,
    io::FileReader,
    parser::{NEGATIVE_NUMBER, Parser},
    tracer::ParseTracer,
};

/// A classified input token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Token {
    Option(OptionToken),
    Positional(String),
}

impl Token {
    pub(crate) fn raw(&self) -> &str {
        match self {
            Self::Option(option) => &option.raw,
            Self::Positional(raw) => raw,
        }
    }
}

/// An option-like token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct OptionToken {
    /// The token as it appeared in the input.
    pub(crate) raw: String,
    /// The registered flag it resolved to, or the raw text when unrecognized.
    pub(crate) flag: String,
    /// Index into the parser's arguments; `None` when unrecognized.
    pub(crate) index: Option<usize>,
    /// Value given as `--flag=value` or `-fVALUE`.
    pub(crate) attached: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Candidate {
    flag: String,
    index: usize,
    attached: Option<String>,
}

pub(crate) struct Tokenizer<'p> {
    parser: &'p Parser,
}

impl<'p> Tokenizer<'p> {
    pub(crate) fn new(parser: &'p Parser) -> Self {
        Self { parser }
    }

    pub(crate) fn tokenize<R, T>(&self, raw: Vec<String>, reader: &R, tracer: &mut T) -> Result<Vec<Token>, ParseError>
    where
        R: FileReader + ?Sized,
        T: ParseTracer,
    {
        let expanded = self.expand_files(raw, reader, tracer)?;
        let recognizes_terminator = self.parser.config().prefix_chars.contains('-');
        let mut tokens = Vec::with_capacity(expanded.len());
        let mut terminated = false;
        for arg in expanded {
            if !terminated && recognizes_terminator && arg == "--" {
                terminated = true;
                continue;
            }
            let classified = if terminated { None } else { self.classify(&arg)? };
            match classified {
                Some(Candidate { flag, index, attached }) => {
                    tracer.on_classify(&arg, Some(&flag));
                    tokens.push(Token::Option(OptionToken {
                        raw: arg,
                        flag,
                        index: Some(index),
                        attached,
                    }));
                }
                None if !terminated && self.is_unknown_option(&arg) => {
                    tracer.on_classify(&arg, None);
                    tokens.push(Token::Option(OptionToken {
                        flag: arg.clone(),
                        raw: arg,
                        index: None,
                        attached: None,
                    }));
                }
                None => {
                    tracer.on_classify(&arg, None);
                    tokens.push(Token::Positional(arg));
                }
            }
        }
        Ok(tokens)
    }

    /// Splices the contents of `@file` references in place. Not recursive.
    fn expand_files<R, T>(&self, raw: Vec<String>, reader: &R, tracer: &mut T) -> Result<Vec<String>, ParseError>
    where
        R: FileReader + ?Sized,
        T: ParseTracer,
    {
        let Some(chars) = self.parser.config().fromfile_prefix_chars.as_deref() else {
            return Ok(raw);
        };
        let mut expanded = Vec::with_capacity(raw.len());
        for arg in raw {
            if let Some(path) = arg.strip_prefix(|c: char| chars.contains(c)) {
                let contents = reader
                    .read_tokens(path)
                    .map_err(|err| ParseError::file_reference(path, &err))?;
                tracer.on_file_expanded(path, contents.len());
                expanded.extend(contents);
            } else {
                expanded.push(arg);
            }
        }
        Ok(expanded)
    }

    fn starts_with_prefix(&self, arg: &str) -> bool {
        let prefix_chars = &self.parser.config().prefix_chars;
        arg.starts_with(|c| prefix_chars.contains(c))
    }

    /// Resolves an option-like token to a registered flag.
    ///
    /// `Ok(None)` means the token is not a recognized option; whether it is a
    /// positional or an unknown option is decided by [`Self::is_unknown_option`].
    fn classify(&self, arg: &str) -> Result<Option<Candidate>, ParseError> {
        if !self.starts_with_prefix(arg) {
            return Ok(None);
        }
        let index = self.parser.option_index();
        if let Some(&idx) = index.get(arg) {
            return Ok(Some(Candidate {
                flag: arg.to_owned(),
                index: idx,
                attached: None,
            }));
        }
        if arg.chars().count() == 1 {
            return Ok(None);
        }
        if let Some((flag, value)) = arg.split_once('=')
            && let Some(&idx) = index.get(flag)
        {
            return Ok(Some(Candidate {
                flag: flag.to_owned(),
                index: idx,
                attached: Some(value.to_owned()),
            }));
        }
        let mut candidates = self.candidates(arg);
        match candidates.len() {
            0 => Ok(None),
            1 => Ok(candidates.pop()),
            _ => Err(ParseError::AmbiguousOption {
                option: arg.to_owned(),
                candidates: candidates.into_iter().map(|candidate| candidate.flag).collect(),
            }),
        }
    }

    /// Whether an unresolved token should still be treated as an option.
    fn is_unknown_option(&self, arg: &str) -> bool {
        if !self.starts_with_prefix(arg) || arg.chars().count() == 1 {
            return false;
        }
        if NEGATIVE_NUMBER.is_match(arg) && !self.parser.has_negative_number_flags() {
            return false;
        }
        !arg.contains(' ')
    }

    /// Flags `arg` may stand for: long-flag abbreviations, a short flag with an
    /// attached value, or short-flag abbreviations. At most one candidate per argument.
    fn candidates(&self, arg: &str) -> Vec<Candidate> {
        let config = self.parser.config();
        let prefix_chars = &config.prefix_chars;
        let mut chars = arg.char_indices();
        chars.next();
        let long = chars.next().is_some_and(|(_, c)| prefix_chars.contains(c));
        if long && !config.allow_abbrev {
            return Vec::new();
        }
        let mut found: Vec<Candidate> = Vec::new();
        let mut push = |candidate: Candidate| {
            if !found.iter().any(|existing| existing.index == candidate.index) {
                found.push(candidate);
            }
        };

        if long {
            let (option_prefix, attached) = match arg.split_once('=') {
                Some((flag, value)) => (flag, Some(value.to_owned())),
                None => (arg, None),
            };
            for (index, argument) in self.parser.arguments.iter().enumerate() {
                for flag in &argument.flags {
                    if flag.starts_with(option_prefix) {
                        push(Candidate {
                            flag: flag.clone(),
                            index,
                            attached: attached.clone(),
                        });
                    }
                }
            }
        } else {
            let split = chars.next().map_or(arg.len(), |(offset, _)| offset);
            let (short, rest) = arg.split_at(split);
            for (index, argument) in self.parser.arguments.iter().enumerate() {
                for flag in &argument.flags {
                    if flag == short {
                        push(Candidate {
                            flag: flag.clone(),
                            index,
                            attached: Some(rest.to_owned()),
                        });
                    } else if config.allow_abbrev && flag.starts_with(arg) {
                        push(Candidate {
                            flag: flag.clone(),
                            index,
                            attached: None,
                        });
                    }
                }
            }
        }
        found
    }
}
