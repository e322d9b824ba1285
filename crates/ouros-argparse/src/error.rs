use std::{fmt, io};

use crate::{spec::Nargs, usage::UsageModel, value::Value};

/// Error raised while configuring a parser: a programming error, not a user error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// `prefix_chars` is empty or contains whitespace.
    InvalidPrefixChars { prefix_chars: String },
    /// The [`ArgumentSpec`](crate::ArgumentSpec) declared no names at all.
    MissingName,
    /// Flags and a positional name were mixed, or a positional got several names.
    InvalidOptionString { name: String, prefix_chars: String },
    /// A flag string is already registered.
    ConflictingOption { flags: Vec<String> },
    /// Two positionals share a name.
    DuplicatePositional { name: String },
    /// The action does not consume tokens, so `nargs` makes no sense.
    NargsNotAllowed { argument: String, action: &'static str },
    /// A positional declared with an action that consumes no tokens.
    InvalidPositionalAction { argument: String, action: &'static str },
    /// `store`/`append` with `nargs=0`.
    ZeroNargs { argument: String },
    /// An exact `nargs` count above [`MAX_EXACT_NARGS`](crate::MAX_EXACT_NARGS).
    ExcessiveNargs { argument: String, nargs: usize },
    /// A positional given an explicit `dest`; its name already is the dest.
    PositionalDest { argument: String },
    /// `const` on `store`/`append` without `nargs='?'`.
    ConstRequiresOptionalNargs { argument: String },
    /// `required` on a positional.
    RequiredPositional { argument: String },
    /// `version` action without a version string.
    MissingVersion { argument: String },
    /// A group handle from another parser was used.
    UnknownGroup { argument: String },
    /// A required argument cannot be part of a mutually exclusive group.
    RequiredInExclusiveGroup { argument: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidPrefixChars { prefix_chars } => {
                write!(f, "invalid prefix_chars {prefix_chars:?}: must be non-empty and without whitespace")
            }
            Self::MissingName => f.write_str("an argument needs at least one name or flag"),
            Self::InvalidOptionString { name, prefix_chars } => {
                write!(f, "invalid option string {name:?}: must start with a character {prefix_chars:?}")
            }
            Self::ConflictingOption { flags } => {
                write!(f, "conflicting option string(s): {}", flags.join(", "))
            }
            Self::DuplicatePositional { name } => write!(f, "positional argument {name:?} is already defined"),
            Self::NargsNotAllowed { argument, action } => {
                write!(f, "argument {argument}: nargs is not allowed with action '{action}'")
            }
            Self::InvalidPositionalAction { argument, action } => {
                write!(f, "argument {argument}: action '{action}' is not valid for positional arguments")
            }
            Self::ZeroNargs { argument } => {
                write!(f, "argument {argument}: nargs for store actions must be != 0")
            }
            Self::ExcessiveNargs { argument, nargs } => write!(
                f,
                "argument {argument}: nargs {nargs} exceeds the limit of {}",
                crate::MAX_EXACT_NARGS
            ),
            Self::PositionalDest { argument } => {
                write!(f, "argument {argument}: dest supplied twice for positional argument")
            }
            Self::ConstRequiresOptionalNargs { argument } => {
                write!(f, "argument {argument}: nargs must be '?' to supply const")
            }
            Self::RequiredPositional { argument } => {
                write!(f, "argument {argument}: 'required' is an invalid argument for positionals")
            }
            Self::MissingVersion { argument } => write!(f, "argument {argument}: version action needs a version string"),
            Self::UnknownGroup { argument } => write!(f, "argument {argument}: unknown argument group"),
            Self::RequiredInExclusiveGroup { argument } => {
                write!(f, "argument {argument}: mutually exclusive arguments must be optional")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Fieldless mirror of [`ParseError`] for matching on the failure class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::IntoStaticStr)]
pub enum ErrorKind {
    FileReferenceError,
    UnrecognizedOptionError,
    UnrecognizedArgumentsError,
    AmbiguousOptionError,
    InsufficientArgumentsError,
    UnexpectedArgumentError,
    MissingArgumentError,
    MissingRequiredError,
    MissingRequiredGroupError,
    InvalidChoiceError,
    InvalidValueError,
    MutuallyExclusiveError,
}

/// A user-facing parse failure. Terminal for the `parse` call that produced it.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseError {
    /// An `@file` reference could not be read.
    FileReference { path: String, reason: String },
    /// An option-like token matched no registered flag.
    UnrecognizedOption { option: String },
    /// Tokens nothing consumed, reported by [`Parser::parse`](crate::Parser::parse).
    UnrecognizedArguments { arguments: Vec<String> },
    /// An abbreviation matched more than one flag.
    AmbiguousOption { option: String, candidates: Vec<String> },
    /// An option did not find the number of tokens its nargs requires.
    InsufficientArguments { argument: String, nargs: Nargs },
    /// An attached `=value` was given to an option that takes no value.
    UnexpectedArgument { argument: String, value: String },
    /// A positional received no tokens.
    MissingArgument { argument: String },
    /// Required optionals that were never matched, in declaration order.
    MissingRequired { arguments: Vec<String> },
    /// A required mutually exclusive group with no matched member.
    MissingRequiredGroup { arguments: Vec<String> },
    /// A converted value is not among the argument's choices.
    InvalidChoice { argument: String, value: Value, choices: String },
    /// The converter rejected a token.
    InvalidValue { argument: String, token: String, reason: String },
    /// Two members of a mutually exclusive group were both given.
    MutuallyExclusive { argument: String, conflicting: String },
}

impl ParseError {
    pub(crate) fn file_reference(path: &str, error: &io::Error) -> Self {
        Self::FileReference {
            path: path.to_owned(),
            reason: error.to_string(),
        }
    }

    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::FileReference { .. } => ErrorKind::FileReferenceError,
            Self::UnrecognizedOption { .. } => ErrorKind::UnrecognizedOptionError,
            Self::UnrecognizedArguments { .. } => ErrorKind::UnrecognizedArgumentsError,
            Self::AmbiguousOption { .. } => ErrorKind::AmbiguousOptionError,
            Self::InsufficientArguments { .. } => ErrorKind::InsufficientArgumentsError,
            Self::UnexpectedArgument { .. } => ErrorKind::UnexpectedArgumentError,
            Self::MissingArgument { .. } => ErrorKind::MissingArgumentError,
            Self::MissingRequired { .. } => ErrorKind::MissingRequiredError,
            Self::MissingRequiredGroup { .. } => ErrorKind::MissingRequiredGroupError,
            Self::InvalidChoice { .. } => ErrorKind::InvalidChoiceError,
            Self::InvalidValue { .. } => ErrorKind::InvalidValueError,
            Self::MutuallyExclusive { .. } => ErrorKind::MutuallyExclusiveError,
        }
    }

    /// Identity of the offending argument, when the error concerns a single one.
    #[must_use]
    pub fn argument(&self) -> Option<&str> {
        match self {
            Self::InsufficientArguments { argument, .. }
            | Self::UnexpectedArgument { argument, .. }
            | Self::MissingArgument { argument }
            | Self::InvalidChoice { argument, .. }
            | Self::InvalidValue { argument, .. }
            | Self::MutuallyExclusive { argument, .. } => Some(argument),
            Self::UnrecognizedOption { option } | Self::AmbiguousOption { option, .. } => Some(option),
            Self::FileReference { .. }
            | Self::UnrecognizedArguments { .. }
            | Self::MissingRequired { .. }
            | Self::MissingRequiredGroup { .. } => None,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FileReference { path, reason } => write!(f, "cannot read argument file '{path}': {reason}"),
            Self::UnrecognizedOption { option } => write!(f, "unrecognized arguments: {option}"),
            Self::UnrecognizedArguments { arguments } => {
                write!(f, "unrecognized arguments: {}", arguments.join(" "))
            }
            Self::AmbiguousOption { option, candidates } => {
                write!(f, "ambiguous option: {option} could match {}", candidates.join(", "))
            }
            Self::InsufficientArguments { argument, nargs } => {
                let expected = match nargs {
                    Nargs::Exact(1) | Nargs::Optional => "expected one argument".to_owned(),
                    Nargs::Exact(n) => format!("expected {n} arguments"),
                    _ => "expected at least one argument".to_owned(),
                };
                write!(f, "argument {argument}: {expected}")
            }
            Self::UnexpectedArgument { argument, value } => {
                write!(f, "argument {argument}: ignored explicit argument '{value}'")
            }
            Self::MissingArgument { argument } => {
                write!(f, "the following arguments are required: {argument}")
            }
            Self::MissingRequired { arguments } => {
                write!(f, "the following arguments are required: {}", arguments.join(", "))
            }
            Self::MissingRequiredGroup { arguments } => {
                write!(f, "one of the arguments {} is required", arguments.join(" "))
            }
            Self::InvalidChoice {
                argument,
                value,
                choices,
            } => write!(
                f,
                "argument {argument}: invalid choice: {} (choose from {choices})",
                value.repr()
            ),
            Self::InvalidValue { argument, reason, .. } => write!(f, "argument {argument}: {reason}"),
            Self::MutuallyExclusive { argument, conflicting } => {
                write!(f, "argument {argument}: not allowed with argument {conflicting}")
            }
        }
    }
}

impl std::error::Error for ParseError {}

/// Every way a parse can end other than with a [`Namespace`](crate::Namespace).
///
/// Help and version requests are successful terminations: they short-circuit the
/// parse but are not failures, which [`ParseOutcome::exit_code`] reflects.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseOutcome {
    Error(ParseError),
    /// A help action was matched; carries the data for rendering help.
    HelpRequested(UsageModel),
    /// A version action was matched; carries the expanded version string.
    VersionRequested(String),
}

impl ParseOutcome {
    #[must_use]
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    #[must_use]
    pub fn error(&self) -> Option<&ParseError> {
        match self {
            Self::Error(error) => Some(error),
            _ => None,
        }
    }

    #[must_use]
    pub fn kind(&self) -> Option<ErrorKind> {
        self.error().map(ParseError::kind)
    }

    /// Conventional process exit status: `0` for help/version, `2` for errors.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Error(_) => 2,
            Self::HelpRequested(_) | Self::VersionRequested(_) => 0,
        }
    }
}

impl fmt::Display for ParseOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error(error) => write!(f, "{error}"),
            Self::HelpRequested(model) => write!(f, "help requested for {}", model.prog),
            Self::VersionRequested(version) => f.write_str(version),
        }
    }
}

impl std::error::Error for ParseOutcome {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Error(error) => Some(error),
            _ => None,
        }
    }
}

impl From<ParseError> for ParseOutcome {
    fn from(error: ParseError) -> Self {
        Self::Error(error)
    }
}
