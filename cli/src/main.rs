/**
 * @file main.rs
 * @date 19/10/2026
 * @brief Interactive front end of the circuit simulator.
 */
use circuit_board::BoxStore;
use clap::Parser;
use std::io::{self, BufRead, Write};

mod commands;
mod config;

use commands::{Command, Session};

const CONFIG_PATH: &str = "digisim.toml";

/// Build combinational logic circuits from the command line
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Configuration file, missing keys fall back to the defaults
    #[arg(short, long, default_value = CONFIG_PATH)]
    config: String,

    /// Directory of saved circuit boxes, overrides the configuration
    #[arg(short, long)]
    data_dir: Option<String>,

    /// Log filter, overrides the configuration
    #[arg(short, long)]
    log_level: Option<String>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let overrides = config::Overrides {
        data_dir: args.data_dir.as_deref(),
        log_level: args.log_level.as_deref(),
    };
    let config = config::CliConfig::parse(&args.config, &overrides)?;

    // an explicit flag beats RUST_LOG, which beats the file
    let filters = match args.log_level {
        Some(_) => config.log_level.clone(),
        None => std::env::var("RUST_LOG").unwrap_or_else(|_| config.log_level.clone()),
    };
    pretty_env_logger::formatted_builder()
        .parse_filters(&filters)
        .init();
    log::debug!("Config: {:?}", config);

    let mut session = Session::new(BoxStore::new(&config.data_dir));
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    println!("Type help for the list of commands");
    loop {
        print!("{}", config.prompt);
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }

        let command = match Command::parse(&line) {
            Ok(Some(Command::Exit)) => break,
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(err) => {
                eprintln!("{err}");
                continue;
            }
        };

        match session.execute(command) {
            Ok(message) if message.is_empty() => {}
            Ok(message) => println!("{message}"),
            Err(err) => eprintln!("{err}"),
        }
    }

    Ok(())
}
