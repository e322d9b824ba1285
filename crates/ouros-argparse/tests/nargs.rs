//! Token consumption for every nargs policy, on optionals and positionals.

use ouros_argparse::{ArgumentSpec, ErrorKind, Nargs, ParseOutcome, Parser, ParserConfig, Value};
use pretty_assertions::assert_eq;

fn parser(specs: Vec<ArgumentSpec>) -> Parser {
    let mut parser = Parser::new(ParserConfig::new("PROG")).unwrap();
    for spec in specs {
        parser.register(spec).unwrap();
    }
    parser
}

fn parsed(parser: &Parser, args: &str) -> String {
    parser.parse(args.split_whitespace()).unwrap().to_string()
}

fn failure(parser: &Parser, args: &str) -> ParseOutcome {
    parser.parse(args.split_whitespace()).unwrap_err()
}

#[test]
fn exact_positional_count() {
    let alone = parser(vec![ArgumentSpec::new(["foo"]).nargs(Nargs::Exact(2))]);
    assert_eq!(parsed(&alone, "a b"), "Namespace(foo=['a', 'b'])");

    let err = failure(&alone, "a");
    assert_eq!(err.kind(), Some(ErrorKind::MissingArgumentError));
    assert_eq!(err.to_string(), "the following arguments are required: foo");

    let err = failure(&alone, "a b c");
    assert_eq!(err.to_string(), "unrecognized arguments: c");

    let followed = parser(vec![
        ArgumentSpec::new(["foo"]).nargs(Nargs::Exact(2)),
        ArgumentSpec::new(["bar"]),
    ]);
    assert_eq!(parsed(&followed, "a b c"), "Namespace(foo=['a', 'b'], bar='c')");
}

#[test]
fn exact_counts_on_both_kinds() {
    let parser = parser(vec![
        ArgumentSpec::new(["--foo"]).nargs(Nargs::Exact(2)),
        ArgumentSpec::new(["bar"]).nargs(Nargs::Exact(1)),
    ]);
    assert_eq!(parsed(&parser, "c --foo a b"), "Namespace(foo=['a', 'b'], bar=['c'])");
}

#[test]
fn optional_nargs_uses_const_or_default() {
    let parser = parser(vec![
        ArgumentSpec::new(["--foo"])
            .nargs(Nargs::Optional)
            .const_value("c")
            .default("d"),
        ArgumentSpec::new(["bar"]).nargs(Nargs::Optional).default("d"),
    ]);
    assert_eq!(parsed(&parser, "XX --foo YY"), "Namespace(foo='YY', bar='XX')");
    assert_eq!(parsed(&parser, "XX --foo"), "Namespace(foo='c', bar='XX')");
    assert_eq!(parsed(&parser, ""), "Namespace(foo='d', bar='d')");
}

#[test]
fn optional_nargs_without_default_gives_const() {
    let parser = parser(vec![
        ArgumentSpec::new(["--foo"]).nargs(Nargs::Optional).const_value("c"),
        ArgumentSpec::new(["bar"]).nargs(Nargs::Optional).const_value("k"),
    ]);
    assert_eq!(parsed(&parser, "--foo"), "Namespace(foo='c', bar='k')");
    assert_eq!(parsed(&parser, ""), "Namespace(foo=None, bar='k')");
}

#[test]
fn optional_nargs_does_not_take_an_option() {
    let parser = parser(vec![
        ArgumentSpec::new(["--foo"]).nargs(Nargs::Optional).const_value("c"),
        ArgumentSpec::new(["--bar"]),
    ]);
    assert_eq!(parsed(&parser, "--foo --bar x"), "Namespace(foo='c', bar='x')");
}

#[test]
fn zero_or_more_everywhere() {
    let parser = parser(vec![
        ArgumentSpec::new(["--foo"]).nargs(Nargs::ZeroOrMore),
        ArgumentSpec::new(["--bar"]).nargs(Nargs::ZeroOrMore),
        ArgumentSpec::new(["baz"]).nargs(Nargs::ZeroOrMore),
    ]);
    assert_eq!(
        parsed(&parser, "a b --foo x y --bar 1 2"),
        "Namespace(foo=['x', 'y'], bar=['1', '2'], baz=['a', 'b'])"
    );
    assert_eq!(parsed(&parser, "--foo"), "Namespace(foo=[], bar=None, baz=[])");
}

#[test]
fn zero_or_more_positional_falls_back_to_default() {
    let parser = parser(vec![
        ArgumentSpec::new(["rest"])
            .nargs(Nargs::ZeroOrMore)
            .default(Value::from(vec!["x"])),
    ]);
    assert_eq!(parsed(&parser, ""), "Namespace(rest=['x'])");
    assert_eq!(parsed(&parser, "y z"), "Namespace(rest=['y', 'z'])");
}

#[test]
fn one_or_more_requires_a_token() {
    let parser = parser(vec![ArgumentSpec::new(["foo"]).nargs(Nargs::OneOrMore)]);
    assert_eq!(parsed(&parser, "a b"), "Namespace(foo=['a', 'b'])");

    let err = failure(&parser, "");
    assert_eq!(err.kind(), Some(ErrorKind::MissingArgumentError));
    assert_eq!(err.to_string(), "the following arguments are required: foo");
}

#[test]
fn greedy_positional_reserves_later_minimums() {
    let parser = parser(vec![
        ArgumentSpec::new(["foo"]).nargs(Nargs::OneOrMore),
        ArgumentSpec::new(["bar"]).nargs(Nargs::Exact(1)),
    ]);
    assert_eq!(parsed(&parser, "a b c"), "Namespace(foo=['a', 'b'], bar=['c'])");
    assert_eq!(parsed(&parser, "a b"), "Namespace(foo=['a'], bar=['b'])");
}

#[test]
fn optional_positional_yields_to_required_one() {
    let parser = parser(vec![
        ArgumentSpec::new(["a"]).nargs(Nargs::Optional),
        ArgumentSpec::new(["b"]).nargs(Nargs::Exact(2)),
    ]);
    assert_eq!(parsed(&parser, "x y"), "Namespace(a=None, b=['x', 'y'])");
    assert_eq!(parsed(&parser, "w x y"), "Namespace(a='w', b=['x', 'y'])");
}

#[test]
fn remainder_positional_takes_everything() {
    let parser = parser(vec![
        ArgumentSpec::new(["--foo"]),
        ArgumentSpec::new(["command"]),
        ArgumentSpec::new(["args"]).nargs(Nargs::Remainder),
    ]);
    assert_eq!(
        parsed(&parser, "--foo B cmd --arg1 XX ZZ"),
        "Namespace(foo='B', command='cmd', args=['--arg1', 'XX', 'ZZ'])"
    );
    assert_eq!(
        parsed(&parser, "--foo B cmd"),
        "Namespace(foo='B', command='cmd', args=[])"
    );
    assert_eq!(
        parsed(&parser, "cmd --foo B"),
        "Namespace(foo=None, command='cmd', args=['--foo', 'B'])"
    );
}

#[test]
fn remainder_option_takes_option_like_tokens() {
    let parser = parser(vec![
        ArgumentSpec::new(["--cmd"]).nargs(Nargs::Remainder),
        ArgumentSpec::new(["-x"]),
    ]);
    assert_eq!(
        parsed(&parser, "--cmd -x --y z"),
        "Namespace(cmd=['-x', '--y', 'z'], x=None)"
    );
}

#[test]
fn options_report_insufficient_tokens() {
    let parser = parser(vec![
        ArgumentSpec::new(["--one"]),
        ArgumentSpec::new(["--two"]).nargs(Nargs::Exact(2)),
        ArgumentSpec::new(["--many"]).nargs(Nargs::OneOrMore),
    ]);
    let cases = [
        ("--one", "argument --one: expected one argument"),
        ("--two a", "argument --two: expected 2 arguments"),
        ("--two a --one b", "argument --two: expected 2 arguments"),
        ("--many", "argument --many: expected at least one argument"),
        ("--many --one x", "argument --many: expected at least one argument"),
    ];
    for (args, message) in cases {
        let err = failure(&parser, args);
        assert_eq!(err.kind(), Some(ErrorKind::InsufficientArgumentsError), "{args}");
        assert_eq!(err.to_string(), message, "{args}");
    }
}

#[test]
fn attached_value_counts_towards_arity() {
    let parser = parser(vec![
        ArgumentSpec::new(["--items"]).nargs(Nargs::ZeroOrMore),
        ArgumentSpec::new(["--opt"]).nargs(Nargs::Optional),
        ArgumentSpec::new(["rest"]).nargs(Nargs::ZeroOrMore),
    ]);
    assert_eq!(
        parsed(&parser, "--items=a b c"),
        "Namespace(items=['a', 'b', 'c'], opt=None, rest=[])"
    );
    assert_eq!(
        parsed(&parser, "--opt=a b"),
        "Namespace(items=None, opt='a', rest=['b'])"
    );
}
