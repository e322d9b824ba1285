use ouros_argparse::{
    Action, ArgumentSpec, ErrorKind, Nargs, ParseOutcome, Parser, ParserConfig, Value, ValueType,
};
use pretty_assertions::assert_eq;

fn parser(prog: &str, specs: Vec<ArgumentSpec>) -> Parser {
    let mut parser = Parser::new(ParserConfig::new(prog)).unwrap();
    for spec in specs {
        parser.register(spec).unwrap();
    }
    parser
}

fn parsed(parser: &Parser, args: &str) -> String {
    parser.parse(args.split_whitespace()).unwrap().to_string()
}

#[test]
fn store() {
    let parser = parser("prog", vec![ArgumentSpec::new(["--foo"])]);
    assert_eq!(parsed(&parser, "--foo 1"), "Namespace(foo='1')");
    assert_eq!(parsed(&parser, "--foo 1 --foo 2"), "Namespace(foo='2')");
}

#[test]
fn store_const() {
    let parser = parser(
        "prog",
        vec![ArgumentSpec::new(["--foo"]).action(Action::StoreConst).const_value(42)],
    );
    assert_eq!(parsed(&parser, "--foo"), "Namespace(foo=42)");
    assert_eq!(parsed(&parser, ""), "Namespace(foo=None)");
}

#[test]
fn store_true_and_false() {
    let parser = parser(
        "prog",
        vec![
            ArgumentSpec::new(["--foo"]).action(Action::StoreTrue),
            ArgumentSpec::new(["--bar"]).action(Action::StoreFalse),
            ArgumentSpec::new(["--baz"]).action(Action::StoreFalse),
        ],
    );
    assert_eq!(
        parsed(&parser, "--foo --bar"),
        "Namespace(foo=True, bar=False, baz=True)"
    );
    assert_eq!(parsed(&parser, ""), "Namespace(foo=False, bar=True, baz=True)");
}

#[test]
fn append_keeps_occurrence_order() {
    let untyped = parser(
        "prog",
        vec![ArgumentSpec::new(["--foo"]).action(Action::Append)],
    );
    assert_eq!(parsed(&untyped, "--foo 1 --foo 2"), "Namespace(foo=['1', '2'])");

    let typed = parser(
        "prog",
        vec![
            ArgumentSpec::new(["--foo"])
                .action(Action::Append)
                .value_type(ValueType::int()),
        ],
    );
    let ns = typed.parse(["--foo", "1", "--foo", "2"]).unwrap();
    assert_eq!(ns["foo"], Value::from(vec![1, 2]));
}

#[test]
fn append_with_multiple_nargs_nests_lists() {
    let parser = parser(
        "prog",
        vec![
            ArgumentSpec::new(["--point"])
                .action(Action::Append)
                .nargs(Nargs::Exact(2)),
        ],
    );
    assert_eq!(
        parsed(&parser, "--point 1 2 --point 3 4"),
        "Namespace(point=[['1', '2'], ['3', '4']])"
    );
}

#[test]
fn append_never_mutates_the_default() {
    let parser = parser(
        "prog",
        vec![
            ArgumentSpec::new(["--item"])
                .action(Action::Append)
                .default(Value::from(vec!["base"])),
        ],
    );
    assert_eq!(parsed(&parser, "--item x"), "Namespace(item=['base', 'x'])");
    assert_eq!(parsed(&parser, "--item y"), "Namespace(item=['base', 'y'])");
    assert_eq!(parsed(&parser, ""), "Namespace(item=['base'])");
}

#[test]
fn append_onto_scalar_default() {
    let parser = parser(
        "prog",
        vec![ArgumentSpec::new(["--item"]).action(Action::Append).default("a")],
    );
    assert_eq!(parsed(&parser, "--item x"), "Namespace(item=['a', 'x'])");
}

#[test]
fn append_const_shares_a_dest() {
    let parser = parser(
        "prog",
        vec![
            ArgumentSpec::new(["--str"])
                .dest("types")
                .action(Action::AppendConst)
                .const_value("str"),
            ArgumentSpec::new(["--int"])
                .dest("types")
                .action(Action::AppendConst)
                .const_value("int"),
        ],
    );
    assert_eq!(parsed(&parser, "--str --int"), "Namespace(types=['str', 'int'])");
    assert_eq!(parsed(&parser, "--int --str --int"), "Namespace(types=['int', 'str', 'int'])");
}

#[test]
fn count() {
    let counting = parser(
        "prog",
        vec![ArgumentSpec::new(["--verbose", "-v"]).action(Action::Count)],
    );
    assert_eq!(parsed(&counting, "-vvv"), "Namespace(verbose=3)");
    assert_eq!(parsed(&counting, "-v --verbose -v"), "Namespace(verbose=3)");
    assert_eq!(parsed(&counting, ""), "Namespace(verbose=None)");

    let from_zero = parser(
        "prog",
        vec![ArgumentSpec::new(["-v"]).action(Action::Count).default(0)],
    );
    assert_eq!(parsed(&from_zero, ""), "Namespace(v=0)");
    assert_eq!(parsed(&from_zero, "-vv"), "Namespace(v=2)");
}

#[test]
fn version_short_circuits() {
    let parser = parser(
        "PROG",
        vec![
            ArgumentSpec::new(["--version"])
                .action(Action::Version)
                .version("%(prog)s 2.0"),
            ArgumentSpec::new(["file"]),
        ],
    );
    let outcome = parser.parse(["--version"]).unwrap_err();
    assert_eq!(outcome, ParseOutcome::VersionRequested("PROG 2.0".to_owned()));
    assert_eq!(outcome.exit_code(), 0);
    assert!(!outcome.is_error());
}

#[test]
fn help_short_circuits_before_other_errors() {
    let parser = parser(
        "frobble",
        vec![
            ArgumentSpec::new(["--foo"])
                .action(Action::StoreTrue)
                .help("foo the bars before frobbling"),
            ArgumentSpec::new(["bar"])
                .nargs(Nargs::OneOrMore)
                .help("one of the bars to be frobbled"),
        ],
    );
    for args in [&["-h"][..], &["--help", "--nope"][..], &["x", "-h"][..]] {
        let Err(ParseOutcome::HelpRequested(model)) = parser.parse(args.iter().copied()) else {
            panic!("expected help for {args:?}");
        };
        assert_eq!(model.usage, "frobble [-h] [--foo] bar [bar ...]");
        assert_eq!(model, parser.describe());
    }
    assert_eq!(parser.parse(["-h"]).unwrap_err().exit_code(), 0);
}

#[test]
fn mutually_exclusive_members_conflict() {
    let mut parser = Parser::new(ParserConfig::new("PROG")).unwrap();
    let group = parser.add_mutually_exclusive_group(false);
    parser
        .register(ArgumentSpec::new(["--foo"]).action(Action::StoreTrue).exclusive_group(group))
        .unwrap();
    parser
        .register(ArgumentSpec::new(["--bar"]).action(Action::StoreFalse).exclusive_group(group))
        .unwrap();

    assert_eq!(parsed(&parser, "--foo"), "Namespace(foo=True, bar=True)");
    assert_eq!(parsed(&parser, "--bar"), "Namespace(foo=False, bar=False)");
    assert_eq!(parsed(&parser, "--foo --foo"), "Namespace(foo=True, bar=True)");

    let err = parser.parse(["--foo", "--bar"]).unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::MutuallyExclusiveError));
    assert_eq!(err.to_string(), "argument --bar: not allowed with argument --foo");
}

#[test]
fn required_exclusive_group_needs_a_member() {
    let mut parser = Parser::new(ParserConfig::new("PROG")).unwrap();
    let group = parser.add_mutually_exclusive_group(true);
    parser
        .register(ArgumentSpec::new(["--foo"]).action(Action::StoreTrue).exclusive_group(group))
        .unwrap();
    parser
        .register(ArgumentSpec::new(["--bar"]).exclusive_group(group))
        .unwrap();

    assert_eq!(parsed(&parser, "--bar x"), "Namespace(foo=False, bar='x')");
    let err = parser.parse(Vec::<String>::new()).unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::MissingRequiredGroupError));
    assert_eq!(err.to_string(), "one of the arguments --foo --bar is required");
}

#[test]
fn exclusive_positional_with_default_does_not_conflict() {
    let mut parser = Parser::new(ParserConfig::new("PROG")).unwrap();
    let group = parser.add_mutually_exclusive_group(false);
    parser
        .register(ArgumentSpec::new(["--foo"]).exclusive_group(group))
        .unwrap();
    parser
        .register(
            ArgumentSpec::new(["bar"])
                .nargs(Nargs::Optional)
                .default("b")
                .exclusive_group(group),
        )
        .unwrap();

    assert_eq!(parsed(&parser, "--foo x"), "Namespace(foo='x', bar='b')");
    let err = parser.parse(["--foo", "x", "y"]).unwrap_err();
    assert_eq!(err.to_string(), "argument bar: not allowed with argument --foo");
}
