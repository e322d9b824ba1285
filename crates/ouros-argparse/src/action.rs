//! Applying matched arguments to the namespace.
//!
//! The executor owns the namespace of one parse. Each call to
//! [`ActionExecutor::apply`] shapes the consumed tokens into a value (conversion,
//! choice check, `const`/default substitution for empty matches) and then performs
//! the argument's action on its `dest`.

use ahash::{AHashMap, AHashSet};

use crate::{
    convert::ConversionError,
    error::{ParseError, ParseOutcome},
    namespace::Namespace,
    parser::{Argument, Parser},
    spec::{Action, DefaultValue, Nargs},
    usage::expand_prog,
    value::Value,
};

/// A shaped value and whether it came from the argument's default.
struct Shaped {
    value: Value,
    from_default: bool,
}

impl Shaped {
    fn given(value: Value) -> Self {
        Self {
            value,
            from_default: false,
        }
    }
}

pub(crate) struct ActionExecutor<'p> {
    parser: &'p Parser,
    pub(crate) namespace: Namespace,
    /// Arguments matched at least once.
    pub(crate) seen: AHashSet<usize>,
    /// Arguments matched with a value other than their default.
    pub(crate) seen_non_default: AHashSet<usize>,
    /// Exclusive group → first member applied with a non-default value.
    exclusive_claims: AHashMap<usize, usize>,
}

impl<'p> ActionExecutor<'p> {
    /// Starts a namespace seeded with every non-suppressed default, in declaration order.
    pub(crate) fn new(parser: &'p Parser) -> Self {
        let mut namespace = Namespace::new();
        for argument in &parser.arguments {
            if namespace.contains(&argument.dest) {
                continue;
            }
            if let Some(seed) = argument.default.seed() {
                namespace.insert(argument.dest.clone(), seed);
            }
        }
        Self {
            parser,
            namespace,
            seen: AHashSet::new(),
            seen_non_default: AHashSet::new(),
            exclusive_claims: AHashMap::new(),
        }
    }

    /// Applies argument `index` with the tokens it consumed.
    pub(crate) fn apply(&mut self, index: usize, values: &[String]) -> Result<(), ParseOutcome> {
        let parser = self.parser;
        let argument = &parser.arguments[index];
        self.seen.insert(index);
        let Some(shaped) = shape(argument, values)? else {
            return Ok(());
        };
        if !shaped.from_default {
            self.claim_exclusive(index)?;
            self.seen_non_default.insert(index);
        }

        let dest = argument.dest.as_str();
        match argument.action {
            Action::Store | Action::StoreConst | Action::StoreTrue | Action::StoreFalse => {
                self.namespace.insert(dest, shaped.value);
            }
            Action::Append | Action::AppendConst => {
                let mut items = match self.namespace.get(dest) {
                    Some(Value::List(items)) => items.clone(),
                    Some(Value::None) | None => Vec::new(),
                    Some(other) => vec![other.clone()],
                };
                items.push(shaped.value);
                self.namespace.insert(dest, Value::List(items));
            }
            Action::Count => match self.namespace.get_mut(dest) {
                Some(Value::Int(count)) => *count += 1,
                _ => {
                    self.namespace.insert(dest, Value::Int(1));
                }
            },
            Action::Help => return Err(ParseOutcome::HelpRequested(parser.describe())),
            Action::Version => {
                let version = argument.version.as_deref().unwrap_or_default();
                return Err(ParseOutcome::VersionRequested(expand_prog(version, parser.prog())));
            }
        }
        Ok(())
    }

    fn claim_exclusive(&mut self, index: usize) -> Result<(), ParseError> {
        let arguments = &self.parser.arguments;
        let Some(group) = arguments[index].exclusive_group else {
            return Ok(());
        };
        let holder = *self.exclusive_claims.entry(group.0).or_insert(index);
        if holder == index {
            Ok(())
        } else {
            Err(ParseError::MutuallyExclusive {
                argument: arguments[index].display_name(),
                conflicting: arguments[holder].display_name(),
            })
        }
    }
}

/// Turns consumed tokens into the value the action stores.
///
/// `Ok(None)` means there is nothing to store: the value would come from a
/// suppressed default.
fn shape(argument: &Argument, values: &[String]) -> Result<Option<Shaped>, ParseError> {
    match argument.action {
        Action::StoreConst | Action::AppendConst | Action::StoreTrue | Action::StoreFalse => {
            return Ok(Some(Shaped::given(argument.const_value.clone().unwrap_or(Value::None))));
        }
        Action::Count | Action::Help | Action::Version => return Ok(Some(Shaped::given(Value::None))),
        Action::Store | Action::Append => {}
    }

    match (argument.nargs, values) {
        (Some(Nargs::Optional), []) => {
            let (value, from_default) = if argument.is_positional() {
                match &argument.default {
                    DefaultValue::Value(value) => (value.clone(), true),
                    DefaultValue::Suppress => return Ok(None),
                    DefaultValue::Unset => (argument.const_value.clone().unwrap_or(Value::None), false),
                }
            } else {
                (argument.const_value.clone().unwrap_or(Value::None), false)
            };
            let value = match value {
                Value::Str(raw) => checked(argument, &raw)?,
                other => other,
            };
            Ok(Some(Shaped { value, from_default }))
        }
        (Some(Nargs::ZeroOrMore), []) if argument.is_positional() => match &argument.default {
            DefaultValue::Value(value) if !value.is_none() => Ok(Some(Shaped {
                value: value.clone(),
                from_default: true,
            })),
            DefaultValue::Suppress => Ok(None),
            _ => Ok(Some(Shaped::given(Value::List(Vec::new())))),
        },
        (None | Some(Nargs::Optional), [raw]) => Ok(Some(Shaped::given(checked(argument, raw)?))),
        (Some(Nargs::Remainder), _) => {
            let items = values
                .iter()
                .map(|raw| convert(argument, raw))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Some(Shaped::given(Value::List(items))))
        }
        _ => {
            let items = values
                .iter()
                .map(|raw| checked(argument, raw))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Some(Shaped::given(Value::List(items))))
        }
    }
}

/// Converts `raw` with the argument's converter; strings pass through unchanged.
pub(crate) fn convert(argument: &Argument, raw: &str) -> Result<Value, ParseError> {
    let Some(value_type) = &argument.value_type else {
        return Ok(Value::Str(raw.to_owned()));
    };
    value_type.convert(raw).map_err(|err| {
        let reason = match err {
            ConversionError::Invalid => {
                format!("invalid {} value: {}", value_type.name(), Value::from(raw).repr())
            }
            ConversionError::Message(message) => message,
        };
        ParseError::InvalidValue {
            argument: argument.display_name(),
            token: raw.to_owned(),
            reason,
        }
    })
}

fn checked(argument: &Argument, raw: &str) -> Result<Value, ParseError> {
    let value = convert(argument, raw)?;
    if let Some(choices) = &argument.choices
        && !choices.contains(&value)
    {
        return Err(ParseError::InvalidChoice {
            argument: argument.display_name(),
            value,
            choices: choices.describe(),
        });
    }
    Ok(value)
}
