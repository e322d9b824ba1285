//! Declarative argument specifications.
//!
//! An [`ArgumentSpec`] is what a caller hands to [`Parser::register`](crate::Parser::register).
//! It only records what was declared; whether the names form a flag set or a positional
//! name, the effective `dest`, default and arity are resolved at registration time
//! against the parser's configuration.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::{
    convert::{Choices, ValueType},
    value::Value,
};

/// What happens to the namespace when an argument is matched.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    strum::Display,
    strum::EnumString,
    strum::IntoStaticStr,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Action {
    #[default]
    Store,
    StoreConst,
    StoreTrue,
    StoreFalse,
    Append,
    AppendConst,
    Count,
    Help,
    Version,
}

impl Action {
    /// Whether the action consumes tokens from the input at all.
    #[must_use]
    pub fn takes_values(self) -> bool {
        matches!(self, Self::Store | Self::Append)
    }
}

/// How many tokens an argument consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Nargs {
    /// Exactly `n` tokens.
    Exact(usize),
    /// `?`: zero or one token.
    Optional,
    /// `*`: any number of tokens.
    ZeroOrMore,
    /// `+`: at least one token.
    OneOrMore,
    /// `...`: every remaining token of the input, option-like or not.
    Remainder,
}

impl Nargs {
    /// Smallest number of tokens that satisfies the policy.
    #[must_use]
    pub fn min(self) -> usize {
        match self {
            Self::Exact(n) => n,
            Self::OneOrMore => 1,
            Self::Optional | Self::ZeroOrMore | Self::Remainder => 0,
        }
    }
}

impl fmt::Display for Nargs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(n) => write!(f, "{n}"),
            Self::Optional => f.write_str("?"),
            Self::ZeroOrMore => f.write_str("*"),
            Self::OneOrMore => f.write_str("+"),
            Self::Remainder => f.write_str("..."),
        }
    }
}

/// Error for an unparseable nargs string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidNargs(pub String);

impl fmt::Display for InvalidNargs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid nargs value: {}", self.0)
    }
}

impl std::error::Error for InvalidNargs {}

impl FromStr for Nargs {
    type Err = InvalidNargs;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "?" => Ok(Self::Optional),
            "*" => Ok(Self::ZeroOrMore),
            "+" => Ok(Self::OneOrMore),
            "..." | "A..." => Ok(Self::Remainder),
            other => other
                .parse::<usize>()
                .map(Self::Exact)
                .map_err(|_| InvalidNargs(other.to_owned())),
        }
    }
}

impl TryFrom<String> for Nargs {
    type Error = InvalidNargs;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Nargs> for String {
    fn from(nargs: Nargs) -> Self {
        nargs.to_string()
    }
}

impl From<usize> for Nargs {
    fn from(n: usize) -> Self {
        Self::Exact(n)
    }
}

/// Tri-state default: nothing declared, a value, or "leave the key out".
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefaultValue {
    /// No default declared; the namespace holds `None` until matched.
    #[default]
    Unset,
    Value(Value),
    /// The key is omitted from the namespace unless the argument is matched.
    Suppress,
}

impl DefaultValue {
    #[must_use]
    pub fn is_unset(&self) -> bool {
        matches!(self, Self::Unset)
    }

    #[must_use]
    pub fn is_suppress(&self) -> bool {
        matches!(self, Self::Suppress)
    }

    /// The value seeded into a fresh namespace, if any.
    #[must_use]
    pub fn seed(&self) -> Option<Value> {
        match self {
            Self::Unset => Some(Value::None),
            Self::Value(value) => Some(value.clone()),
            Self::Suppress => None,
        }
    }
}

impl From<Value> for DefaultValue {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

macro_rules! default_from_literal {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for DefaultValue {
                fn from(value: $ty) -> Self {
                    Self::Value(value.into())
                }
            }
        )*
    };
}

default_from_literal!(&str, String, i64, i32, f64, bool);

/// Help text of an argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HelpText {
    Text(String),
    /// Hide the argument from usage and help output.
    Suppress,
}

impl From<&str> for HelpText {
    fn from(text: &str) -> Self {
        Self::Text(text.to_owned())
    }
}

impl From<String> for HelpText {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

/// Handle of an argument group created by [`Parser::add_argument_group`](crate::Parser::add_argument_group).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GroupId(pub(crate) usize);

/// Handle of a group created by
/// [`Parser::add_mutually_exclusive_group`](crate::Parser::add_mutually_exclusive_group).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExclusiveGroupId(pub(crate) usize);

/// Declaration of one argument.
///
/// ```
/// use ouros_argparse::{Action, ArgumentSpec, Nargs};
///
/// let verbose = ArgumentSpec::new(["-v", "--verbose"]).action(Action::Count);
/// let files = ArgumentSpec::new(["files"]).nargs(Nargs::OneOrMore).help("input files");
/// # let _ = (verbose, files);
/// ```
#[derive(Debug, Clone)]
pub struct ArgumentSpec {
    pub(crate) names: SmallVec<[String; 2]>,
    pub(crate) action: Action,
    pub(crate) nargs: Option<Nargs>,
    pub(crate) const_value: Option<Value>,
    pub(crate) default: DefaultValue,
    pub(crate) value_type: Option<ValueType>,
    pub(crate) choices: Option<Choices>,
    pub(crate) required: Option<bool>,
    pub(crate) help: Option<HelpText>,
    pub(crate) metavar: Option<String>,
    pub(crate) dest: Option<String>,
    pub(crate) version: Option<String>,
    pub(crate) group: Option<GroupId>,
    pub(crate) exclusive_group: Option<ExclusiveGroupId>,
}

impl ArgumentSpec {
    /// Declares an argument from its names: flags (`-f`, `--foo`) or a single positional name.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
            action: Action::Store,
            nargs: None,
            const_value: None,
            default: DefaultValue::Unset,
            value_type: None,
            choices: None,
            required: None,
            help: None,
            metavar: None,
            dest: None,
            version: None,
            group: None,
            exclusive_group: None,
        }
    }

    #[must_use]
    pub fn action(mut self, action: Action) -> Self {
        self.action = action;
        self
    }

    #[must_use]
    pub fn nargs(mut self, nargs: impl Into<Nargs>) -> Self {
        self.nargs = Some(nargs.into());
        self
    }

    #[must_use]
    pub fn const_value(mut self, value: impl Into<Value>) -> Self {
        self.const_value = Some(value.into());
        self
    }

    #[must_use]
    pub fn default(mut self, default: impl Into<DefaultValue>) -> Self {
        self.default = default.into();
        self
    }

    /// Shorthand for `default(DefaultValue::Suppress)`.
    #[must_use]
    pub fn suppress_default(mut self) -> Self {
        self.default = DefaultValue::Suppress;
        self
    }

    #[must_use]
    pub fn value_type(mut self, value_type: ValueType) -> Self {
        self.value_type = Some(value_type);
        self
    }

    #[must_use]
    pub fn choices(mut self, choices: impl Into<Choices>) -> Self {
        self.choices = Some(choices.into());
        self
    }

    #[must_use]
    pub fn required(mut self, required: bool) -> Self {
        self.required = Some(required);
        self
    }

    #[must_use]
    pub fn help(mut self, help: impl Into<HelpText>) -> Self {
        self.help = Some(help.into());
        self
    }

    #[must_use]
    pub fn metavar(mut self, metavar: impl Into<String>) -> Self {
        self.metavar = Some(metavar.into());
        self
    }

    #[must_use]
    pub fn dest(mut self, dest: impl Into<String>) -> Self {
        self.dest = Some(dest.into());
        self
    }

    /// Version string reported by [`Action::Version`]; `%(prog)s` is expanded.
    #[must_use]
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    #[must_use]
    pub fn group(mut self, group: GroupId) -> Self {
        self.group = Some(group);
        self
    }

    #[must_use]
    pub fn exclusive_group(mut self, group: ExclusiveGroupId) -> Self {
        self.exclusive_group = Some(group);
        self
    }

    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }
}
