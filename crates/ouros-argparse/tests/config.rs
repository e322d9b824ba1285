//! Parser-level settings, defaults and serialization.

use ouros_argparse::{
    Action, ArgumentSpec, ConflictHandler, DefaultValue, Nargs, Parser, ParserConfig, Value, ValueType,
};
use pretty_assertions::assert_eq;
use serde_json::json;

fn parser(config: ParserConfig, specs: Vec<ArgumentSpec>) -> Parser {
    let mut parser = Parser::new(config).unwrap();
    for spec in specs {
        parser.register(spec).unwrap();
    }
    parser
}

fn parsed(parser: &Parser, args: &str) -> String {
    parser.parse(args.split_whitespace()).unwrap().to_string()
}

#[test]
fn argument_default_suppress() {
    let parser = parser(
        ParserConfig::default().with_argument_default(DefaultValue::Suppress),
        vec![
            ArgumentSpec::new(["--foo"]),
            ArgumentSpec::new(["bar"]).nargs(Nargs::Optional),
        ],
    );
    assert_eq!(parsed(&parser, "--foo 1 BAR"), "Namespace(foo='1', bar='BAR')");
    assert_eq!(parsed(&parser, ""), "Namespace()");
}

#[test]
fn argument_default_value() {
    let parser = parser(
        ParserConfig::default().with_argument_default("x"),
        vec![
            ArgumentSpec::new(["--foo"]),
            ArgumentSpec::new(["--bar"]).default("y"),
            ArgumentSpec::new(["--on"]).action(Action::StoreTrue),
        ],
    );
    assert_eq!(parsed(&parser, ""), "Namespace(foo='x', bar='y', on='x')");
}

#[test]
fn explicit_defaults() {
    let parser = parser(ParserConfig::default(), vec![ArgumentSpec::new(["--foo"]).default(42)]);
    assert_eq!(parsed(&parser, "--foo 2"), "Namespace(foo='2')");
    assert_eq!(parsed(&parser, ""), "Namespace(foo=42)");
}

#[test]
fn string_defaults_go_through_the_converter() {
    let parser = parser(
        ParserConfig::default(),
        vec![
            ArgumentSpec::new(["--length"]).default("10").value_type(ValueType::int()),
            ArgumentSpec::new(["--width"]).default(10.5).value_type(ValueType::int()),
        ],
    );
    assert_eq!(parsed(&parser, ""), "Namespace(length=10, width=10.5)");
    assert_eq!(parsed(&parser, "--length 3"), "Namespace(length=3, width=10.5)");
}

#[test]
fn positional_optional_default() {
    let parser = parser(
        ParserConfig::default(),
        vec![ArgumentSpec::new(["foo"]).nargs(Nargs::Optional).default(42)],
    );
    assert_eq!(parsed(&parser, "a"), "Namespace(foo='a')");
    assert_eq!(parsed(&parser, ""), "Namespace(foo=42)");
}

#[test]
fn suppressed_default_leaves_key_out() {
    let parser = parser(
        ParserConfig::default(),
        vec![ArgumentSpec::new(["--foo"]).suppress_default()],
    );
    assert_eq!(parsed(&parser, ""), "Namespace()");
    assert_eq!(parsed(&parser, "--foo 1"), "Namespace(foo='1')");
}

#[test]
fn suppressed_keys_are_appended_when_matched() {
    let parser = parser(
        ParserConfig::default(),
        vec![
            ArgumentSpec::new(["--early"]).suppress_default(),
            ArgumentSpec::new(["--late"]),
        ],
    );
    assert_eq!(parsed(&parser, "--early e"), "Namespace(late=None, early='e')");
}

#[test]
fn dest_derivation_and_override() {
    let parser = parser(
        ParserConfig::default(),
        vec![
            ArgumentSpec::new(["-x", "--dry-run"]).action(Action::StoreTrue),
            ArgumentSpec::new(["-y"]).action(Action::StoreTrue),
            ArgumentSpec::new(["--out"]).dest("target"),
            ArgumentSpec::new(["src"]).metavar("SOURCE"),
        ],
    );
    assert_eq!(
        parsed(&parser, "-x --out o s"),
        "Namespace(dry_run=True, y=False, target='o', src='s')"
    );
}

#[test]
fn conflict_resolution_moves_flags() {
    let parser = parser(
        ParserConfig::new("PROG").with_conflict_handler(ConflictHandler::Resolve),
        vec![
            ArgumentSpec::new(["-f", "--foo"]).help("old foo help"),
            ArgumentSpec::new(["--foo"]).dest("new_foo").help("new foo help"),
            ArgumentSpec::new(["--bar"]).help("old bar"),
            ArgumentSpec::new(["--bar"]).dest("bar2").help("new bar"),
        ],
    );
    let invocations: Vec<String> = parser
        .describe()
        .entries()
        .map(|entry| entry.invocation.clone())
        .collect();
    assert_eq!(invocations, ["-h, --help", "-f FOO", "--foo NEW_FOO", "--bar BAR2"]);
    assert_eq!(
        parsed(&parser, "-f 1 --foo 2 --bar 3"),
        "Namespace(foo='1', new_foo='2', bar2='3')"
    );
}

#[test]
fn config_round_trips_through_json() {
    let config = ParserConfig::new("tool")
        .with_usage("%(prog)s [options]")
        .with_prefix_chars("-+")
        .with_fromfile_prefix_chars("@")
        .with_argument_default(DefaultValue::Suppress)
        .with_allow_abbrev(false)
        .with_conflict_handler(ConflictHandler::Resolve);
    let text = serde_json::to_string(&config).unwrap();
    let back: ParserConfig = serde_json::from_str(&text).unwrap();
    assert_eq!(back, config);
}

#[test]
fn partial_config_uses_defaults() {
    let config: ParserConfig = serde_json::from_value(json!({
        "prog": "tool",
        "argument_default": { "value": 7 },
        "conflict_handler": "resolve",
    }))
    .unwrap();
    assert_eq!(config.prog, "tool");
    assert_eq!(config.prefix_chars, "-");
    assert!(config.add_help);
    assert!(config.allow_abbrev);
    assert_eq!(config.argument_default, DefaultValue::Value(Value::Int(7)));
    assert_eq!(config.conflict_handler, ConflictHandler::Resolve);

    let parser = parser(config, vec![ArgumentSpec::new(["--n"])]);
    assert_eq!(parsed(&parser, ""), "Namespace(n=7)");
}

#[test]
fn enums_parse_from_names() {
    assert_eq!("append_const".parse::<Action>().unwrap(), Action::AppendConst);
    assert_eq!("resolve".parse::<ConflictHandler>().unwrap(), ConflictHandler::Resolve);
    assert_eq!(serde_json::to_value(Nargs::OneOrMore).unwrap(), json!("+"));
    assert_eq!(serde_json::from_value::<Nargs>(json!("3")).unwrap(), Nargs::Exact(3));
    assert!(serde_json::from_value::<Nargs>(json!("lots")).is_err());
    assert_eq!(serde_json::to_value(Action::StoreTrue).unwrap(), json!("store_true"));
}

#[test]
fn namespace_serializes_in_order() {
    let parser = parser(
        ParserConfig::new("PROG"),
        vec![
            ArgumentSpec::new(["--foo"]),
            ArgumentSpec::new(["command"]),
            ArgumentSpec::new(["args"]).nargs(Nargs::Remainder),
            ArgumentSpec::new(["--n"]).value_type(ValueType::int()),
        ],
    );
    let ns = parser.parse("--foo B cmd --arg1 XX".split_whitespace()).unwrap();
    assert_eq!(
        serde_json::to_string(&ns).unwrap(),
        r#"{"foo":"B","command":"cmd","args":["--arg1","XX"],"n":null}"#
    );

    let keys: Vec<&str> = ns.iter().map(|(dest, _)| dest).collect();
    assert_eq!(keys, ["foo", "command", "args", "n"]);
    assert_eq!(ns.len(), 4);
    assert!(ns.contains("n"));
    assert_eq!(ns.get("missing"), None);
}
