//! Help/usage data.
//!
//! [`describe`] turns a parser into a [`UsageModel`]: the usage line, and help
//! sections of `(invocation, help)` entries with placeholders already expanded.
//! Laying the model out as text is left to a [`HelpFormatter`](crate::HelpFormatter).

use serde::Serialize;

use crate::{
    convert::Choices,
    parser::{Argument, Parser},
    spec::{DefaultValue, ExclusiveGroupId, HelpText, Nargs},
    value::Value,
};

/// Everything needed to render usage and help for one parser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UsageModel {
    pub prog: String,
    /// The usage line without the leading `usage: `.
    pub usage: String,
    pub description: Option<String>,
    pub epilog: Option<String>,
    /// Non-empty sections: positionals, options, then argument groups in creation order.
    pub sections: Vec<HelpSection>,
}

impl UsageModel {
    /// All entries across sections, in display order.
    pub fn entries(&self) -> impl Iterator<Item = &HelpEntry> {
        self.sections.iter().flat_map(|section| section.entries.iter())
    }

    #[must_use]
    pub fn section(&self, title: &str) -> Option<&HelpSection> {
        self.sections.iter().find(|section| section.title == title)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HelpSection {
    pub title: String,
    pub description: Option<String>,
    pub entries: Vec<HelpEntry>,
}

/// One argument's line in the help: `-f FOO, --foo FOO` and its help text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HelpEntry {
    pub invocation: String,
    pub help: Option<String>,
}

pub(crate) fn describe(parser: &Parser) -> UsageModel {
    let config = parser.config();
    let prog = config.prog.as_str();
    let usage = match &config.usage {
        Some(usage) => expand_prog(usage, prog),
        None => usage_line(parser),
    };

    let visible = |argument: &&Argument| !argument.is_hidden();
    let mut sections = vec![
        section(
            "positional arguments",
            None,
            parser
                .arguments
                .iter()
                .filter(visible)
                .filter(|argument| argument.group.is_none() && argument.is_positional()),
            prog,
        ),
        section(
            "options",
            None,
            parser
                .arguments
                .iter()
                .filter(visible)
                .filter(|argument| argument.group.is_none() && !argument.is_positional()),
            prog,
        ),
    ];
    for (idx, group) in parser.groups.iter().enumerate() {
        sections.push(section(
            &group.title,
            group.description.as_deref(),
            parser
                .arguments
                .iter()
                .filter(visible)
                .filter(|argument| argument.group.is_some_and(|id| id.0 == idx)),
            prog,
        ));
    }
    sections.retain(|section| !section.entries.is_empty());

    UsageModel {
        prog: prog.to_owned(),
        usage,
        description: config.description.as_deref().map(|text| expand_prog(text, prog)),
        epilog: config.epilog.as_deref().map(|text| expand_prog(text, prog)),
        sections,
    }
}

fn section<'a>(
    title: &str,
    description: Option<&str>,
    arguments: impl Iterator<Item = &'a Argument>,
    prog: &str,
) -> HelpSection {
    HelpSection {
        title: title.to_owned(),
        description: description.map(|text| expand_prog(text, prog)),
        entries: arguments
            .map(|argument| HelpEntry {
                invocation: invocation(argument),
                help: match &argument.help {
                    Some(HelpText::Text(text)) => Some(expand_help(text, argument, prog)),
                    _ => None,
                },
            })
            .collect(),
    }
}

fn metavar(argument: &Argument) -> String {
    if let Some(metavar) = &argument.metavar {
        metavar.clone()
    } else if let Some(choices) = &argument.choices {
        choices.metavar()
    } else if argument.is_positional() {
        argument.dest.clone()
    } else {
        argument.dest.to_uppercase()
    }
}

/// `FOO`, `[FOO]`, `[FOO ...]`, `FOO [FOO ...]`, `...` or `FOO FOO` by arity.
fn args_form(argument: &Argument) -> String {
    let metavar = metavar(argument);
    match argument.nargs {
        None => metavar,
        Some(Nargs::Optional) => format!("[{metavar}]"),
        Some(Nargs::ZeroOrMore) => format!("[{metavar} ...]"),
        Some(Nargs::OneOrMore) => format!("{metavar} [{metavar} ...]"),
        Some(Nargs::Remainder) => "...".to_owned(),
        Some(Nargs::Exact(n)) => vec![metavar; n].join(" "),
    }
}

fn invocation(argument: &Argument) -> String {
    if argument.is_positional() {
        return metavar(argument);
    }
    if !argument.action.takes_values() {
        return argument.flags.join(", ");
    }
    let args = args_form(argument);
    argument
        .flags
        .iter()
        .map(|flag| format!("{flag} {args}"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// The usage part of one argument, without optional brackets.
fn usage_part(argument: &Argument) -> String {
    if argument.is_positional() {
        return args_form(argument);
    }
    let flag = argument.flags.first().map_or("", String::as_str);
    if argument.action.takes_values() {
        format!("{flag} {}", args_form(argument))
    } else {
        flag.to_owned()
    }
}

fn usage_line(parser: &Parser) -> String {
    let mut parts = vec![parser.config().prog.clone()];
    let mut emitted_groups = Vec::new();
    let ordered = parser
        .arguments
        .iter()
        .filter(|argument| !argument.is_positional())
        .chain(parser.arguments.iter().filter(|argument| argument.is_positional()));

    for argument in ordered.filter(|argument| !argument.is_hidden()) {
        if let Some(group) = argument.exclusive_group {
            if emitted_groups.contains(&group) {
                continue;
            }
            emitted_groups.push(group);
            parts.push(exclusive_usage(parser, group));
        } else if argument.is_positional() || argument.required {
            parts.push(usage_part(argument));
        } else {
            parts.push(format!("[{}]", usage_part(argument)));
        }
    }
    parts.join(" ")
}

fn exclusive_usage(parser: &Parser, group: ExclusiveGroupId) -> String {
    let members: Vec<String> = parser
        .arguments
        .iter()
        .filter(|argument| argument.exclusive_group == Some(group) && !argument.is_hidden())
        .map(usage_part)
        .collect();
    let joined = members.join(" | ");
    if parser.exclusive_groups[group.0].required {
        format!("({joined})")
    } else {
        format!("[{joined}]")
    }
}

/// Expands `%(name)c` placeholders through `lookup(name, conversion)`.
///
/// `%%` becomes `%`; placeholders `lookup` does not know are kept verbatim.
pub(crate) fn expand_placeholders(text: &str, lookup: impl Fn(&str, char) -> Option<String>) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(pos) = rest.find('%') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];
        if let Some(after) = tail.strip_prefix("%%") {
            out.push('%');
            rest = after;
            continue;
        }
        if let Some(inner) = tail.strip_prefix("%(")
            && let Some(close) = inner.find(')')
            && let Some(conversion) = inner[close + 1..].chars().next()
            && let Some(value) = lookup(&inner[..close], conversion)
        {
            out.push_str(&value);
            rest = &inner[close + 1 + conversion.len_utf8()..];
            continue;
        }
        out.push('%');
        rest = &tail[1..];
    }
    out.push_str(rest);
    out
}

pub(crate) fn expand_prog(text: &str, prog: &str) -> String {
    expand_placeholders(text, |name, conversion| {
        (name == "prog").then(|| render(&Value::from(prog), conversion)).flatten()
    })
}

fn render(value: &Value, conversion: char) -> Option<String> {
    match conversion {
        's' => Some(value.to_string()),
        'r' => Some(value.repr()),
        'd' => match value {
            Value::Int(i) => Some(i.to_string()),
            Value::Bool(b) => Some(i64::from(*b).to_string()),
            Value::Float(f) => Some(truncate(*f).to_string()),
            _ => None,
        },
        _ => None,
    }
}

#[expect(clippy::cast_possible_truncation, reason = "`%d` truncates floats like Python does")]
fn truncate(f: f64) -> i64 {
    f.trunc() as i64
}

fn expand_help(text: &str, argument: &Argument, prog: &str) -> String {
    expand_placeholders(text, |name, conversion| {
        let value = match name {
            "prog" => Value::from(prog),
            "dest" => Value::from(argument.dest.as_str()),
            "default" => match &argument.default {
                DefaultValue::Unset => Value::None,
                DefaultValue::Value(value) => value.clone(),
                DefaultValue::Suppress => Value::from("==SUPPRESS=="),
            },
            "const" => argument.const_value.clone().unwrap_or(Value::None),
            "metavar" => argument.metavar.clone().into(),
            "choices" => argument.choices.as_ref().map(Choices::listing).into(),
            "nargs" => argument.nargs.map(|nargs| nargs.to_string()).into(),
            "required" => Value::Bool(argument.required),
            "type" => argument.value_type.as_ref().map(|ty| ty.name().to_owned()).into(),
            _ => return None,
        };
        render(&value, conversion)
    })
}
