//! Parser configuration, argument registration and the parse entry points.
//!
//! A [`Parser`] is built once: [`Parser::new`] validates the [`ParserConfig`],
//! [`Parser::register`] resolves each [`ArgumentSpec`] into an internal
//! `Argument` (dest, effective default, arity). After that the parser is only
//! read: every `parse*` call builds its own token list, matcher state and
//! namespace, so a `&Parser` can be shared between threads.

use std::sync::LazyLock;

use ahash::AHashMap;
use regex::Regex;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::{
    convert::{Choices, ValueType},
    error::{ConfigError, ParseError, ParseOutcome},
    format::{HelpFormatter, PlainFormatter},
    io::{FileReader, FsFileReader},
    matcher::Matcher,
    namespace::Namespace,
    spec::{Action, ArgumentSpec, DefaultValue, ExclusiveGroupId, GroupId, HelpText, Nargs},
    tokenizer::Tokenizer,
    tracer::{NoopTracer, ParseTracer},
    usage::{self, UsageModel},
    validate,
    value::Value,
};

/// Tokens of this shape are read as negative numbers rather than options.
pub(crate) static NEGATIVE_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-\d+$|^-\d*\.\d+$").expect("negative number pattern is valid"));

/// Largest count accepted for [`Nargs::Exact`].
pub const MAX_EXACT_NARGS: usize = 1024;

/// What to do when a newly registered flag is already taken.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    strum::Display,
    strum::EnumString,
    strum::IntoStaticStr,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ConflictHandler {
    /// Reject the registration with [`ConfigError::ConflictingOption`].
    #[default]
    Error,
    /// Take the flag away from the earlier argument; drop it once it has no flags left.
    Resolve,
}

/// Parser-wide settings.
///
/// Every field has a default, so a partial JSON/TOML document deserializes:
///
/// ```
/// use ouros_argparse::ParserConfig;
///
/// let config = ParserConfig::new("tool").with_prefix_chars("-+").with_allow_abbrev(false);
/// assert_eq!(config.prog, "tool");
/// assert!(config.add_help);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Program name, substituted for `%(prog)s`.
    pub prog: String,
    /// Replaces the generated usage line.
    pub usage: Option<String>,
    pub description: Option<String>,
    pub epilog: Option<String>,
    /// Characters that introduce a flag.
    pub prefix_chars: String,
    /// Characters that introduce an `@file` reference; `None` disables expansion.
    pub fromfile_prefix_chars: Option<String>,
    /// Default applied to every argument that declares none.
    pub argument_default: DefaultValue,
    /// Accept unambiguous prefixes of long flags.
    pub allow_abbrev: bool,
    /// Register `-h/--help`.
    pub add_help: bool,
    pub conflict_handler: ConflictHandler,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            prog: "prog".to_owned(),
            usage: None,
            description: None,
            epilog: None,
            prefix_chars: "-".to_owned(),
            fromfile_prefix_chars: None,
            argument_default: DefaultValue::Unset,
            allow_abbrev: true,
            add_help: true,
            conflict_handler: ConflictHandler::Error,
        }
    }
}

impl ParserConfig {
    #[must_use]
    pub fn new(prog: impl Into<String>) -> Self {
        Self {
            prog: prog.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_usage(mut self, usage: impl Into<String>) -> Self {
        self.usage = Some(usage.into());
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn with_epilog(mut self, epilog: impl Into<String>) -> Self {
        self.epilog = Some(epilog.into());
        self
    }

    #[must_use]
    pub fn with_prefix_chars(mut self, prefix_chars: impl Into<String>) -> Self {
        self.prefix_chars = prefix_chars.into();
        self
    }

    #[must_use]
    pub fn with_fromfile_prefix_chars(mut self, chars: impl Into<String>) -> Self {
        self.fromfile_prefix_chars = Some(chars.into());
        self
    }

    #[must_use]
    pub fn with_argument_default(mut self, default: impl Into<DefaultValue>) -> Self {
        self.argument_default = default.into();
        self
    }

    #[must_use]
    pub fn with_allow_abbrev(mut self, allow_abbrev: bool) -> Self {
        self.allow_abbrev = allow_abbrev;
        self
    }

    #[must_use]
    pub fn with_add_help(mut self, add_help: bool) -> Self {
        self.add_help = add_help;
        self
    }

    #[must_use]
    pub fn with_conflict_handler(mut self, handler: ConflictHandler) -> Self {
        self.conflict_handler = handler;
        self
    }
}

/// A registered argument with everything derived from its spec resolved.
#[derive(Debug, Clone)]
pub(crate) struct Argument {
    /// Empty for positionals.
    pub(crate) flags: SmallVec<[String; 2]>,
    pub(crate) dest: String,
    pub(crate) action: Action,
    /// `None` means the default single-token scalar form.
    pub(crate) nargs: Option<Nargs>,
    pub(crate) const_value: Option<Value>,
    pub(crate) default: DefaultValue,
    pub(crate) value_type: Option<ValueType>,
    pub(crate) choices: Option<Choices>,
    pub(crate) required: bool,
    pub(crate) help: Option<HelpText>,
    pub(crate) metavar: Option<String>,
    pub(crate) version: Option<String>,
    pub(crate) group: Option<GroupId>,
    pub(crate) exclusive_group: Option<ExclusiveGroupId>,
}

impl Argument {
    pub(crate) fn is_positional(&self) -> bool {
        self.flags.is_empty()
    }

    /// Token-consumption policy, with zero-token actions as `Exact(0)`.
    pub(crate) fn arity(&self) -> Nargs {
        if self.action.takes_values() {
            self.nargs.unwrap_or(Nargs::Exact(1))
        } else {
            Nargs::Exact(0)
        }
    }

    /// Name used in error messages: `-f/--foo`, else the metavar, else the dest.
    pub(crate) fn display_name(&self) -> String {
        if self.flags.is_empty() {
            self.metavar.clone().unwrap_or_else(|| self.dest.clone())
        } else {
            self.flags.join("/")
        }
    }

    pub(crate) fn is_hidden(&self) -> bool {
        matches!(self.help, Some(HelpText::Suppress))
    }
}

#[derive(Debug, Clone)]
pub(crate) struct ArgumentGroup {
    pub(crate) title: String,
    pub(crate) description: Option<String>,
}

#[derive(Debug, Clone)]
pub(crate) struct ExclusiveGroup {
    pub(crate) required: bool,
}

/// An argument parser: configuration plus the ordered list of registered arguments.
///
/// ```
/// use ouros_argparse::{Action, ArgumentSpec, Parser, ParserConfig, Value};
///
/// let mut parser = Parser::new(ParserConfig::new("prog")).unwrap();
/// parser.register(ArgumentSpec::new(["-v", "--verbose"]).action(Action::Count)).unwrap();
/// parser.register(ArgumentSpec::new(["name"])).unwrap();
///
/// let ns = parser.parse(["-vv", "world"]).unwrap();
/// assert_eq!(ns["verbose"], Value::Int(2));
/// assert_eq!(ns["name"], Value::from("world"));
/// ```
#[derive(Debug, Clone)]
pub struct Parser {
    config: ParserConfig,
    pub(crate) arguments: Vec<Argument>,
    option_index: AHashMap<String, usize>,
    pub(crate) groups: Vec<ArgumentGroup>,
    pub(crate) exclusive_groups: Vec<ExclusiveGroup>,
    has_negative_number_flags: bool,
}

impl Parser {
    /// Creates a parser, registering `-h/--help` unless `add_help` is off.
    pub fn new(config: ParserConfig) -> Result<Self, ConfigError> {
        let prefix_chars = &config.prefix_chars;
        if prefix_chars.is_empty() || prefix_chars.chars().any(char::is_whitespace) {
            return Err(ConfigError::InvalidPrefixChars {
                prefix_chars: prefix_chars.clone(),
            });
        }
        let help_prefix = if prefix_chars.contains('-') {
            '-'
        } else {
            prefix_chars.chars().next().unwrap_or('-')
        };
        let add_help = config.add_help;
        let mut parser = Self {
            config,
            arguments: Vec::new(),
            option_index: AHashMap::new(),
            groups: Vec::new(),
            exclusive_groups: Vec::new(),
            has_negative_number_flags: false,
        };
        if add_help {
            parser.register(
                ArgumentSpec::new([format!("{help_prefix}h"), format!("{help_prefix}{help_prefix}help")])
                    .action(Action::Help)
                    .help("show this help message and exit"),
            )?;
        }
        Ok(parser)
    }

    #[must_use]
    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    #[must_use]
    pub fn prog(&self) -> &str {
        &self.config.prog
    }

    /// Adds a titled help section; arguments join it through [`ArgumentSpec::group`].
    pub fn add_argument_group(&mut self, title: impl Into<String>, description: Option<&str>) -> GroupId {
        self.groups.push(ArgumentGroup {
            title: title.into(),
            description: description.map(str::to_owned),
        });
        GroupId(self.groups.len() - 1)
    }

    /// Adds a mutually exclusive group; arguments join it through
    /// [`ArgumentSpec::exclusive_group`].
    pub fn add_mutually_exclusive_group(&mut self, required: bool) -> ExclusiveGroupId {
        self.exclusive_groups.push(ExclusiveGroup { required });
        ExclusiveGroupId(self.exclusive_groups.len() - 1)
    }

    /// Registers one argument.
    ///
    /// Declaration order is significant: it is the order positionals are matched in,
    /// the order defaults are seeded in, and the order of the usage line.
    pub fn register(&mut self, spec: ArgumentSpec) -> Result<(), ConfigError> {
        let argument = self.resolve(spec)?;
        if argument.is_positional() {
            if self
                .arguments
                .iter()
                .any(|existing| existing.is_positional() && existing.dest == argument.dest)
            {
                return Err(ConfigError::DuplicatePositional { name: argument.dest });
            }
        } else {
            self.claim_flags(&argument.flags)?;
        }
        self.arguments.push(argument);
        self.rebuild_index();
        Ok(())
    }

    fn is_flag(&self, name: &str) -> bool {
        name.starts_with(|c| self.config.prefix_chars.contains(c))
    }

    fn resolve(&self, spec: ArgumentSpec) -> Result<Argument, ConfigError> {
        let ArgumentSpec {
            names,
            action,
            nargs,
            const_value,
            default,
            value_type,
            choices,
            required,
            help,
            metavar,
            dest,
            version,
            group,
            exclusive_group,
        } = spec;

        let Some(first) = names.first() else {
            return Err(ConfigError::MissingName);
        };
        let positional = !self.is_flag(first);
        if positional {
            if first.is_empty() {
                return Err(ConfigError::MissingName);
            }
            if let Some(extra) = names.get(1) {
                return Err(self.invalid_option_string(extra));
            }
            if dest.is_some() {
                return Err(ConfigError::PositionalDest {
                    argument: first.clone(),
                });
            }
        } else if let Some(bad) = names.iter().find(|name| !self.is_flag(name)) {
            return Err(self.invalid_option_string(bad));
        }

        let dest = dest.unwrap_or_else(|| {
            if positional {
                first.clone()
            } else {
                self.derive_dest(&names)
            }
        });
        let label = if positional { dest.clone() } else { names.join("/") };
        let action_name: &'static str = action.into();

        if positional {
            if required.is_some() {
                return Err(ConfigError::RequiredPositional { argument: label });
            }
            if !action.takes_values() {
                return Err(ConfigError::InvalidPositionalAction {
                    argument: label,
                    action: action_name,
                });
            }
        }
        if action.takes_values() {
            match nargs {
                Some(Nargs::Exact(0)) => return Err(ConfigError::ZeroNargs { argument: label }),
                Some(Nargs::Exact(n)) if n > MAX_EXACT_NARGS => {
                    return Err(ConfigError::ExcessiveNargs { argument: label, nargs: n });
                }
                _ => {}
            }
            if const_value.is_some() && nargs != Some(Nargs::Optional) {
                return Err(ConfigError::ConstRequiresOptionalNargs { argument: label });
            }
        } else if nargs.is_some() {
            return Err(ConfigError::NargsNotAllowed {
                argument: label,
                action: action_name,
            });
        }
        if action == Action::Version && version.is_none() {
            return Err(ConfigError::MissingVersion { argument: label });
        }
        if group.is_some_and(|GroupId(idx)| idx >= self.groups.len())
            || exclusive_group.is_some_and(|ExclusiveGroupId(idx)| idx >= self.exclusive_groups.len())
        {
            return Err(ConfigError::UnknownGroup { argument: label });
        }
        let required = required.unwrap_or(false);
        if required && exclusive_group.is_some() {
            return Err(ConfigError::RequiredInExclusiveGroup { argument: label });
        }

        let default = match action {
            Action::Help | Action::Version => DefaultValue::Suppress,
            _ if !default.is_unset() => default,
            _ if !self.config.argument_default.is_unset() => self.config.argument_default.clone(),
            Action::StoreTrue => DefaultValue::Value(Value::Bool(false)),
            Action::StoreFalse => DefaultValue::Value(Value::Bool(true)),
            _ => DefaultValue::Unset,
        };
        let const_value = match action {
            Action::StoreTrue => Some(Value::Bool(true)),
            Action::StoreFalse => Some(Value::Bool(false)),
            _ => const_value,
        };

        Ok(Argument {
            flags: if positional { SmallVec::new() } else { names },
            dest,
            action,
            nargs,
            const_value,
            default,
            value_type,
            choices,
            required,
            help,
            metavar,
            version,
            group,
            exclusive_group,
        })
    }

    fn invalid_option_string(&self, name: &str) -> ConfigError {
        ConfigError::InvalidOptionString {
            name: name.to_owned(),
            prefix_chars: self.config.prefix_chars.clone(),
        }
    }

    /// First long flag (`--foo-bar`), else the first flag, without prefix chars and
    /// with `-` turned into `_`.
    fn derive_dest(&self, flags: &[String]) -> String {
        let prefix = &self.config.prefix_chars;
        let is_long = |flag: &&String| flag.chars().nth(1).is_some_and(|c| prefix.contains(c));
        let chosen = flags.iter().find(is_long).or_else(|| flags.first());
        chosen
            .map(|flag| flag.trim_start_matches(|c| prefix.contains(c)).replace('-', "_"))
            .unwrap_or_default()
    }

    fn claim_flags(&mut self, flags: &[String]) -> Result<(), ConfigError> {
        let conflicting: Vec<String> = flags
            .iter()
            .filter(|flag| self.option_index.contains_key(flag.as_str()))
            .cloned()
            .collect();
        if conflicting.is_empty() {
            return Ok(());
        }
        match self.config.conflict_handler {
            ConflictHandler::Error => Err(ConfigError::ConflictingOption { flags: conflicting }),
            ConflictHandler::Resolve => {
                // An optional stripped of every flag is dropped, not turned into a positional.
                self.arguments.retain_mut(|argument| {
                    if argument.is_positional() {
                        return true;
                    }
                    argument.flags.retain(|flag| !conflicting.contains(flag));
                    !argument.flags.is_empty()
                });
                Ok(())
            }
        }
    }

    fn rebuild_index(&mut self) {
        self.option_index.clear();
        for (idx, argument) in self.arguments.iter().enumerate() {
            for flag in &argument.flags {
                self.option_index.insert(flag.clone(), idx);
            }
        }
        self.has_negative_number_flags = self.option_index.keys().any(|flag| NEGATIVE_NUMBER.is_match(flag));
    }

    pub(crate) fn option_index(&self) -> &AHashMap<String, usize> {
        &self.option_index
    }

    pub(crate) fn has_negative_number_flags(&self) -> bool {
        self.has_negative_number_flags
    }

    /// Parses `tokens`, treating anything left unconsumed as an error.
    ///
    /// `@file` references, when enabled, are read from the filesystem.
    pub fn parse<I, S>(&self, tokens: I) -> Result<Namespace, ParseOutcome>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.parse_with(tokens, &FsFileReader, NoopTracer)
    }

    /// Like [`Parser::parse`], but returns unconsumed tokens instead of failing on them.
    pub fn parse_known<I, S>(&self, tokens: I) -> Result<(Namespace, Vec<String>), ParseOutcome>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.parse_known_with(tokens, &FsFileReader, NoopTracer)
    }

    /// [`Parser::parse`] with an explicit file reader and tracer.
    pub fn parse_with<I, S, R, T>(&self, tokens: I, reader: &R, tracer: T) -> Result<Namespace, ParseOutcome>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        R: FileReader + ?Sized,
        T: ParseTracer,
    {
        let (namespace, extras) = self.run(tokens, reader, tracer, true)?;
        if extras.is_empty() {
            Ok(namespace)
        } else {
            Err(ParseError::UnrecognizedArguments { arguments: extras }.into())
        }
    }

    /// [`Parser::parse_known`] with an explicit file reader and tracer.
    pub fn parse_known_with<I, S, R, T>(
        &self,
        tokens: I,
        reader: &R,
        tracer: T,
    ) -> Result<(Namespace, Vec<String>), ParseOutcome>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        R: FileReader + ?Sized,
        T: ParseTracer,
    {
        self.run(tokens, reader, tracer, false)
    }

    fn run<I, S, R, T>(
        &self,
        tokens: I,
        reader: &R,
        mut tracer: T,
        strict: bool,
    ) -> Result<(Namespace, Vec<String>), ParseOutcome>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        R: FileReader + ?Sized,
        T: ParseTracer,
    {
        let raw: Vec<String> = tokens.into_iter().map(Into::into).collect();
        let tokens = Tokenizer::new(self).tokenize(raw, reader, &mut tracer)?;
        let matched = Matcher::new(self, tokens, strict, &mut tracer).run()?;
        let namespace = validate::finish(self, matched.executor)?;
        Ok((namespace, matched.extras))
    }

    /// Builds the help/usage data. Independent of any parse.
    #[must_use]
    pub fn describe(&self) -> UsageModel {
        usage::describe(self)
    }

    /// `usage: ...` line rendered by [`PlainFormatter`].
    #[must_use]
    pub fn format_usage(&self) -> String {
        PlainFormatter::default().format_usage(&self.describe())
    }

    /// Full help text rendered by [`PlainFormatter`].
    #[must_use]
    pub fn format_help(&self) -> String {
        PlainFormatter::default().format_help(&self.describe())
    }
}
