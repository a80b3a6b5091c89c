mod args;
mod help;

use std::fmt;

use expect_test::{expect, Expect};

fn check<F, A>(f: F, args: &str, expect: Expect)
where
    F: FnOnce(Vec<String>) -> argtree::Result<A>,
    A: fmt::Debug,
{
    let args = args.split_ascii_whitespace().map(String::from).collect::<Vec<_>>();
    let res = f(args);
    match res {
        Ok(args) => {
            expect.assert_debug_eq(&args);
        }
        Err(err) => {
            expect.assert_eq(&err.to_string());
        }
    }
}

#[test]
fn smoke() {
    check(
        flags::parse,
        "-i27 --bool --string seven",
        expect![[r#"
            Flags {
                int: 27,
                string: "seven",
                bool: true,
                array: [],
            }
        "#]],
    );
    check(
        flags::parse,
        "",
        expect![[r#"
            Flags {
                int: 0,
                string: "default",
                bool: false,
                array: [],
            }
        "#]],
    );
    check(flags::parse, "--int", expect!["expected a value for `--int`"]);
    check(flags::parse, "-i", expect!["expected a value for `-i`"]);
    check(flags::parse, "--not-here", expect!["unknown flag: `--not-here`"]);
    check(flags::parse, "-n", expect!["unknown flag: `-n`"]);
}
