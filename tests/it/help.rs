use argtree::{
    usage::{help_command, help_flag},
    Arg, Command, Flag, UsageWriter, Value,
};
use expect_test::expect;

use crate::check;

pub fn parse(args: Vec<String>) -> argtree::Result<()> {
    let (mut a, mut long_only, mut b) = (0i32, 0i32, false);
    let (mut input, mut rest) = (String::new(), Vec::<String>::new());
    let (mut output, mut tags) = (String::new(), Vec::<String>::new());

    let sub2_help = "The second command has long explanatory text. \
        Perhaps there is a complex edge case which is very important for a user to know.";

    Command::new("root")
        .help("A root command which does something.")
        .subcommand(help_command(UsageWriter::default()))
        .subcommand(
            Command::new("subcommand1")
                .help("The first command does some things too.")
                .flag(
                    Flag::new("output")
                        .short('o')
                        .placeholder("PATH")
                        .help("Where to write")
                        .value(Value::string(&mut output)),
                )
                .flag(Flag::new("tag").help("Tags to attach").value(Value::strings(&mut tags)))
                .arg(
                    Arg::new("input")
                        .required()
                        .help("File to read")
                        .value(Value::string(&mut input)),
                )
                .arg(Arg::new("rest").help("Extra files").value(Value::strings(&mut rest))),
        )
        .subcommand(Command::new("sub2").help(sub2_help))
        .subcommand(Command::new("secret").hidden())
        .flag(help_flag(UsageWriter::default()))
        .flag(Flag::short_only('v').help("Show version information"))
        .flag(
            Flag::short_only('a')
                .help("Short flag with no long form")
                .value(Value::parse(&mut a)),
        )
        .flag(
            Flag::new("long-only")
                .help("Long flag with no short form")
                .value(Value::parse(&mut long_only)),
        )
        .flag(Flag::new("bool").short('b').help("Boolean flag").value(Value::bool(&mut b)))
        .flag(Flag::new("hidden").help("A hidden flag").hidden())
        .parse(args)?;
    Ok(())
}

#[test]
fn help_flag_renders_usage() {
    check(
        parse,
        "--help",
        expect![[r#"
            Usage: root [<flags>] <command>

            A root command which does something.

            Commands:
              help         Show usage
              sub2         The second command has long explanatory text. Perhaps there is a
                           complex edge case which is very important for a user to know.
              subcommand1  The first command does some things too.

            Options:
              -a VALUE               Short flag with no long form
              -b, --bool             Boolean flag
              -h, --help             Show usage
                  --long-only VALUE  Long flag with no short form
              -v                     Show version information
        "#]],
    );
    check(
        parse,
        "sub2 -h --bogus",
        expect![[r#"
            Usage: root sub2 [<flags>]

            The second command has long explanatory text. Perhaps there is a complex edge
            case which is very important for a user to know.

            Options:
              -a VALUE               Short flag with no long form
              -b, --bool             Boolean flag
              -h, --help             Show usage
                  --long-only VALUE  Long flag with no short form
              -v                     Show version information
        "#]],
    );
}

#[test]
fn help_command_renders_usage() {
    check(
        parse,
        "help subcommand1",
        expect![[r#"
            Usage: root subcommand1 [<flags>] <input> [<rest>...]

            The first command does some things too.

            Arguments:
              input  File to read
              rest   Extra files

            Options:
              -a VALUE               Short flag with no long form
              -b, --bool             Boolean flag
              -h, --help             Show usage
                  --long-only VALUE  Long flag with no short form
              -o, --output PATH      Where to write
                  --tag VALUE...     Tags to attach
              -v                     Show version information
        "#]],
    );
    check(parse, "help nope", expect!["unknown command: `root nope`"]);
    check(parse, "subcommand1 x -b", expect!["()\n"]);
}

#[test]
fn help_is_reported_as_help() {
    let err = parse(vec!["-h".to_string()]).unwrap_err();
    assert!(err.is_help());
    let err = parse(vec!["--bogus".to_string()]).unwrap_err();
    assert!(!err.is_help());
}

#[test]
fn custom_writer() {
    let writer = UsageWriter {
        indent: "    ".to_string(),
        max_line_width: 40,
        ..UsageWriter::default()
    };
    let mut jobs = 0u32;
    let mut inputs = Vec::new();
    let err = Command::new("tool")
        .help("Runs the tool over every input it is given, one at a time.")
        .flag(help_flag(writer))
        .flag(Flag::new("jobs").short('j').placeholder("N").value(Value::parse(&mut jobs)))
        .arg(Arg::new("inputs").value(Value::strings(&mut inputs)))
        .parse(["a", "--help"])
        .unwrap_err();
    expect![[r#"
        Usage: tool [<flags>] [<inputs>...]

        Runs the tool over every input it is
        given, one at a time.

        Arguments:
            inputs

        Options:
            -h, --help    Show usage
            -j, --jobs N
    "#]]
    .assert_eq(&err.to_string());
    assert!(inputs.is_empty());
}

#[test]
fn wide_flag_names() {
    let err = Command::new("tool")
        .flag(help_flag(UsageWriter::default()))
        .flag(Flag::new("abc").help("narrow"))
        .flag(Flag::new("日本語日本語").help("wide"))
        .parse(["--help"])
        .unwrap_err();
    expect![[r#"
        Usage: tool [<flags>]

        Options:
              --abc           narrow
          -h, --help          Show usage
              --日本語日本語  wide
    "#]]
    .assert_eq(&err.to_string());
}

#[derive(Debug, Default)]
struct Verbosity {
    verbose: bool,
    level: u32,
}

fn verbosity(args: Vec<String>) -> argtree::Result<Verbosity> {
    let mut res = Verbosity::default();
    Command::new("tool")
        .flag(help_flag(UsageWriter::default()))
        .flag(
            Flag::new("verbose")
                .short('v')
                .help("Verbose output")
                .value(Value::bool(&mut res.verbose)),
        )
        .subcommand(
            Command::new("sub").flag(
                Flag::new("verbose").help("Verbosity level").value(Value::parse(&mut res.level)),
            ),
        )
        .parse(args)?;
    Ok(res)
}

#[test]
fn partially_shadowed_flags() {
    check(
        verbosity,
        "sub -h",
        expect![[r#"
            Usage: tool sub [<flags>]

            Options:
              -h, --help           Show usage
              -v                   Verbose output
                  --verbose VALUE  Verbosity level
        "#]],
    );
    check(
        verbosity,
        "sub -v --verbose 3",
        expect![[r#"
            Verbosity {
                verbose: true,
                level: 3,
            }
        "#]],
    );
}
