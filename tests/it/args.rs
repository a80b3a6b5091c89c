use argtree::{Arg, Command, Value};
use expect_test::expect;

use crate::check;

#[derive(Debug, Default)]
pub struct Args {
    pub int: i64,
    pub string: String,
    pub bool: bool,
    pub array: Vec<i64>,
}

pub fn parse(args: Vec<String>) -> argtree::Result<Args> {
    let mut res = Args::default();
    Command::new("args")
        .arg(Arg::new("int").value(Value::parse(&mut res.int)))
        .arg(Arg::new("string").value(Value::string(&mut res.string)))
        .arg(Arg::new("bool").value(Value::bool(&mut res.bool)))
        .arg(Arg::new("array").value(Value::list(&mut res.array)))
        .parse(args)?;
    Ok(res)
}

#[test]
fn positional() {
    check(
        parse,
        "",
        expect![[r#"
            Args {
                int: 0,
                string: "",
                bool: false,
                array: [],
            }
        "#]],
    );
    check(
        parse,
        "42",
        expect![[r#"
            Args {
                int: 42,
                string: "",
                bool: false,
                array: [],
            }
        "#]],
    );
    check(
        parse,
        "1 two true 3 4 5",
        expect![[r#"
            Args {
                int: 1,
                string: "two",
                bool: true,
                array: [
                    3,
                    4,
                    5,
                ],
            }
        "#]],
    );
    check(
        parse,
        "foo",
        expect![[r#"invalid value "foo" for `int`: invalid digit found in string"#]],
    );
    check(
        parse,
        "1 two yes",
        expect![[r#"invalid value "yes" for `bool`: expected a boolean, got "yes""#]],
    );
}

#[test]
fn verbatim() {
    check(
        parse,
        "81 -- --foo",
        expect![[r#"
            Args {
                int: 81,
                string: "--foo",
                bool: false,
                array: [],
            }
        "#]],
    );
    check(
        parse,
        "-- -1 - f -2 -3",
        expect![[r#"
            Args {
                int: -1,
                string: "-",
                bool: false,
                array: [
                    -2,
                    -3,
                ],
            }
        "#]],
    );
    check(parse, "1 x true -2", expect!["unknown flag: `-2`"]);
}

#[test]
fn stdin_placeholder() {
    let parse = |args: Vec<String>| -> argtree::Result<Vec<String>> {
        let mut files = Vec::new();
        Command::new("cat").arg(Arg::new("file").value(Value::strings(&mut files))).parse(args)?;
        Ok(files)
    };
    check(
        parse,
        "a - b",
        expect![[r#"
            [
                "a",
                "-",
                "b",
            ]
        "#]],
    );
}

#[test]
fn required() {
    let parse = |args: Vec<String>| -> argtree::Result<(String, String)> {
        let mut src = String::new();
        let mut dst = String::new();
        Command::new("cp")
            .arg(Arg::new("src").required().value(Value::string(&mut src)))
            .arg(Arg::new("dst").value(Value::string(&mut dst).default(["."])))
            .parse(args)?;
        Ok((src, dst))
    };
    check(parse, "", expect!["missing required argument `src`"]);
    check(
        parse,
        "a",
        expect![[r#"
            (
                "a",
                ".",
            )
        "#]],
    );
    check(
        parse,
        "a b",
        expect![[r#"
            (
                "a",
                "b",
            )
        "#]],
    );
    check(parse, "a b c", expect![[r#"unexpected argument: "c""#]]);
}

#[test]
fn aggregate_defaults() {
    let parse = |args: Vec<String>| -> argtree::Result<Vec<u16>> {
        let mut ports = Vec::new();
        Command::new("serve")
            .arg(Arg::new("port").value(Value::list(&mut ports).default(["80", "443"])))
            .parse(args)?;
        Ok(ports)
    };
    check(
        parse,
        "",
        expect![[r#"
            [
                80,
                443,
            ]
        "#]],
    );
    check(
        parse,
        "8080",
        expect![[r#"
            [
                8080,
            ]
        "#]],
    );
}

#[test]
fn valueless_args() {
    let parse = |args: Vec<String>| -> argtree::Result<Vec<String>> {
        let mut cmd = Command::new("valueless").arg(Arg::new("first")).arg(Arg::new("second"));
        let ctx = cmd.parse(args)?;
        Ok(ctx.args().to_vec())
    };
    check(
        parse,
        "test",
        expect![[r#"
            [
                "test",
            ]
        "#]],
    );
    check(parse, "a b c", expect![[r#"unexpected argument: "c""#]]);
}

#[test]
#[should_panic(expected = "argument `ignored` follows aggregate argument `array`")]
fn aggregate_must_be_last() {
    let mut array = Vec::<i64>::new();
    let _ = Command::new("args")
        .arg(Arg::new("array").value(Value::list(&mut array)))
        .arg(Arg::new("ignored"));
}
