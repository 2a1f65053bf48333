//! Typeahead - keyboard-driven autocomplete in the terminal

mod driver;
mod error;
mod headless;
mod host;
mod logging;
mod markup;
mod timers;
mod transport;
#[cfg(feature = "tui")]
mod tui;

use std::collections::HashMap;
use std::env;
use std::path::PathBuf;

use typeahead_core::config::{ATTR_EMPTY_MESSAGE, ATTR_LIMIT, ATTR_METHOD, ATTR_PARAM_NAME, ATTR_URL};
use typeahead_core::{InstanceConfig, attach, load_instance_config};

use crate::error::AppError;
use crate::host::TerminalHost;
use crate::transport::Outbox;

fn print_usage() {
    eprintln!("Usage: typeahead [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --url <URL>               Endpoint queried with the input text");
    eprintln!("  --method <METHOD>         HTTP method (default: GET)");
    eprintln!("  --param <NAME>            Query parameter name (default: q)");
    eprintln!("  --limit <N>               Keep the first N results (negative: last N, reversed)");
    eprintln!("  --delay <MS>              Debounce delay in milliseconds (default: 150)");
    eprintln!("  --empty-message <TEXT>    Shown when there are no results");
    eprintln!("  --config <PATH>           Load options and key mappings from TOML file");
    eprintln!("  --response-file <PATH>    Answer every query with this file (offline)");
    eprintln!("  --query <TEXT>            Run one query, print the results, exit");
    eprintln!("  -h, --help                Print help");
    eprintln!();
    eprintln!("Keys: Esc quits, or first closes the results when a mapping binds Esc to close.");
    eprintln!("      Ctrl-C always quits.");
}

fn require_value(args: &[String], i: usize, flag: &str, what: &str) -> String {
    if i >= args.len() {
        eprintln!("Error: {} requires {}", flag, what);
        std::process::exit(1);
    }
    args[i].to_string()
}

fn main() {
    let args: Vec<String> = env::args().collect();

    let mut attributes: HashMap<String, String> = HashMap::new();
    let mut delay_ms: Option<u64> = None;
    let mut config_file: Option<PathBuf> = None;
    let mut response_file: Option<PathBuf> = None;
    let mut query: Option<String> = None;

    let mut i = 1;
    while i < args.len() {
        let flag = args[i].as_str();
        match flag {
            "-h" | "--help" => {
                print_usage();
                return;
            }
            "--url" => {
                i += 1;
                attributes.insert(ATTR_URL.to_string(), require_value(&args, i, flag, "a URL"));
            }
            "--method" => {
                i += 1;
                attributes.insert(ATTR_METHOD.to_string(), require_value(&args, i, flag, "a value"));
            }
            "--param" => {
                i += 1;
                attributes.insert(ATTR_PARAM_NAME.to_string(), require_value(&args, i, flag, "a name"));
            }
            "--limit" => {
                i += 1;
                let value = require_value(&args, i, flag, "a number");
                if value.trim().parse::<i64>().is_err() {
                    eprintln!("Error: --limit expects an integer, got '{}'", value);
                    std::process::exit(1);
                }
                attributes.insert(ATTR_LIMIT.to_string(), value);
            }
            "--delay" => {
                i += 1;
                let value = require_value(&args, i, flag, "milliseconds");
                match value.trim().parse::<u64>() {
                    Ok(ms) => delay_ms = Some(ms),
                    Err(_) => {
                        eprintln!("Error: --delay expects milliseconds, got '{}'", value);
                        std::process::exit(1);
                    }
                }
            }
            "--empty-message" => {
                i += 1;
                attributes.insert(ATTR_EMPTY_MESSAGE.to_string(), require_value(&args, i, flag, "a value"));
            }
            "--config" => {
                i += 1;
                config_file = Some(PathBuf::from(require_value(&args, i, flag, "a file path")));
            }
            "--response-file" => {
                i += 1;
                response_file = Some(PathBuf::from(require_value(&args, i, flag, "a file path")));
            }
            "--query" => {
                i += 1;
                query = Some(require_value(&args, i, flag, "a value"));
            }
            arg => {
                eprintln!("Error: Unknown option: {}", arg);
                print_usage();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    let _log_guard = logging::init(query.is_some());

    let (mut instance, warnings) = load_instance_config(config_file.as_ref());
    for warning in warnings {
        eprintln!("Warning: {}", warning);
    }
    if let Some(ms) = delay_ms {
        instance = instance.with_delay_ms(ms);
    }

    if let Err(e) = run(instance, attributes, response_file, query) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(
    instance: InstanceConfig,
    mut attributes: HashMap<String, String>,
    response_file: Option<PathBuf>,
    query: Option<String>,
) -> anyhow::Result<()> {
    let has_url = attributes.contains_key(ATTR_URL) || instance.url.is_some();
    let outbox = match &response_file {
        Some(path) => {
            if !has_url {
                attributes.insert(ATTR_URL.to_string(), format!("file://{}", path.display()));
            }
            Outbox::fixture(path)?
        }
        None => {
            if !has_url && query.is_some() {
                return Err(AppError::NoEndpoint.into());
            }
            Outbox::http()?
        }
    };

    let host = TerminalHost::new(attributes, outbox);
    let mut engine = attach(host, &instance)?;

    match query {
        Some(query) => {
            let mut stdout = std::io::stdout().lock();
            if !headless::run(&mut engine, &query, &mut stdout)? {
                anyhow::bail!("no results for '{}'", query);
            }
            Ok(())
        }
        None => run_interactive(engine),
    }
}

#[cfg(feature = "tui")]
fn run_interactive(engine: driver::Engine) -> anyhow::Result<()> {
    tui::run(engine)
}

#[cfg(not(feature = "tui"))]
fn run_interactive(_engine: driver::Engine) -> anyhow::Result<()> {
    anyhow::bail!("built without terminal UI support; use --query")
}
