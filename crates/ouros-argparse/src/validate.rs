//! Post-match checks: string-default conversion, required optionals and required
//! mutually exclusive groups.

use crate::{
    action::{ActionExecutor, convert},
    error::ParseError,
    namespace::Namespace,
    parser::Parser,
    spec::{DefaultValue, ExclusiveGroupId},
    value::Value,
};

pub(crate) fn finish(parser: &Parser, executor: ActionExecutor<'_>) -> Result<Namespace, ParseError> {
    let ActionExecutor {
        mut namespace,
        seen,
        seen_non_default,
        ..
    } = executor;

    let mut missing = Vec::new();
    for (index, argument) in parser.arguments.iter().enumerate() {
        if seen.contains(&index) {
            continue;
        }
        if argument.required {
            missing.push(argument.display_name());
            continue;
        }
        // A string default untouched by the parse goes through the converter.
        if let DefaultValue::Value(Value::Str(raw)) = &argument.default
            && namespace
                .get(&argument.dest)
                .is_some_and(|current| current.as_str() == Some(raw.as_str()))
        {
            let converted = convert(argument, raw)?;
            namespace.insert(argument.dest.clone(), converted);
        }
    }
    if !missing.is_empty() {
        return Err(ParseError::MissingRequired { arguments: missing });
    }

    for (group, exclusive) in parser.exclusive_groups.iter().enumerate() {
        if !exclusive.required {
            continue;
        }
        let members: Vec<usize> = parser
            .arguments
            .iter()
            .enumerate()
            .filter(|(_, argument)| argument.exclusive_group == Some(ExclusiveGroupId(group)))
            .map(|(index, _)| index)
            .collect();
        if members.iter().any(|index| seen_non_default.contains(index)) {
            continue;
        }
        let arguments = members
            .iter()
            .map(|&index| &parser.arguments[index])
            .filter(|argument| !argument.is_hidden())
            .map(|argument| argument.display_name())
            .collect();
        return Err(ParseError::MissingRequiredGroup { arguments });
    }

    Ok(namespace)
}
