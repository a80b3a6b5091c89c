use argtree::{
    usage::{help_command, help_flag},
    Arg, Command, Flag, UsageWriter, Value,
};

fn main() {
    let mut name = String::new();
    let mut emoji = false;
    let mut times = 1u32;

    let mut cmd = Command::new("hello")
        .help("Greets someone.")
        .subcommand(help_command(UsageWriter::default()))
        .subcommand(
            Command::new("greet")
                .help("Say hello")
                .flag(Flag::new("times").short('n').help("Repeat the greeting").value(
                    Value::parse(&mut times).default(["1"]),
                ))
                .arg(Arg::new("name").required().help("Who to greet").value(Value::string(&mut name))),
        )
        .flag(help_flag(UsageWriter::default()))
        .flag(Flag::new("emoji").short('e').help("Use a fancier bang").value(Value::bool(&mut emoji)));

    if let Err(err) = cmd.parse_from_env() {
        err.exit()
    }
    drop(cmd);

    let bang = if emoji { "❣️" } else { "!" };
    for _ in 0..times {
        println!("Hello {name}{bang}");
    }
}
