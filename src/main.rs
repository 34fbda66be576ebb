mod cli;
mod lib;
mod load;

use clap::{crate_version, App, AppSettings, Arg, ArgMatches, SubCommand};

use cli::{replay, table::Table};
use lib::amount::{self, Style};

/// Positional argument shared by the text subcommands
fn text(help: &'static str) -> Arg<'static, 'static> {
    Arg::with_name("TEXT").help(help).required(true).index(1)
}

fn app() -> App<'static, 'static> {
    App::new("monto")
        .version(crate_version!())
        .about("Normalize, format and replay colón amounts typed into banking forms")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .arg(
            Arg::with_name("style")
                .long("style")
                .help("Display style: es-CR or en-US")
                .takes_value(true)
                .env("MONTO_STYLE")
                .default_value("es-CR")
                .global(true),
        )
        .subcommand(
            SubCommand::with_name("sanitize")
                .about("Print the canonical amount of some typed text")
                .arg(text("Text as typed in the field")),
        )
        .subcommand(
            SubCommand::with_name("format")
                .about("Print a canonical amount as it is displayed")
                .arg(text("Canonical amount, e.g. 1234.5")),
        )
        .subcommand(
            SubCommand::with_name("number")
                .about("Print the numeric value of some typed text")
                .arg(text("Text as typed in the field")),
        )
        .subcommand(
            SubCommand::with_name("type")
                .about("Show the field state after each keystroke")
                .arg(text("Text to type")),
        )
        .subcommand(
            SubCommand::with_name("run")
                .about("Replay a session file and print its statement")
                .arg(
                    Arg::with_name("FILE")
                        .help("Session file")
                        .required(true)
                        .index(1),
                ),
        )
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let matches = app().get_matches();
    let code = match matches.subcommand() {
        (name, Some(sub)) => match sub.value_of("style").unwrap_or("es-CR").parse::<Style>() {
            Ok(style) => run(name, sub, &style),
            Err(e) => {
                eprintln!("{}", e);
                2
            }
        },
        _ => 2,
    };
    std::process::exit(code);
}

/// Execute subcommand `name`, returns the exit status
fn run(name: &str, sub: &ArgMatches, style: &Style) -> i32 {
    let text = sub.value_of("TEXT").unwrap_or_default();
    match name {
        "sanitize" => println!("{}", amount::sanitize(text)),
        "format" => {
            let canonical = amount::sanitize(text);
            if canonical != text {
                log::warn!("'{}' is not canonical, formatting '{}'", text, canonical);
            }
            println!("{}", amount::format_with(&canonical, style));
        }
        "number" => println!("{}", amount::to_number(&amount::sanitize(text))),
        "type" => print!("{}", replay::replay(text, style)),
        "run" => {
            let filename = sub.value_of("FILE").unwrap_or_default();
            let mut errs = load::error::Record::new();
            let account = load::read_session(filename, &mut errs);
            print!("{}", errs);
            match account {
                Some(account) => {
                    print!("{}", Table::statement(&account, style));
                    print!("{}", Table::summary(&account, style));
                }
                None => return 1,
            }
        }
        _ => unreachable!("unknown subcommand {}", name),
    }
    0
}
