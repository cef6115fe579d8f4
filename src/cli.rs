// File: ./src/cli.rs
//! Command-line inspection of preference namespaces.

use crate::config::Config;
use crate::context::{AppContext, StandardContext};
use crate::namespace::{Namespace, PrefValue};
use anyhow::{Result, anyhow};
use std::path::PathBuf;

/// Environment variable that overrides the storage root, like `--root`.
pub const ROOT_ENV_VAR: &str = "DROIDUTILS_ROOT";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    List,
    Get { key: String },
    Set { key: String, value: PrefValue },
    Remove { key: String },
    Clear,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub root: Option<PathBuf>,
    pub namespace: Option<String>,
    pub verbose: bool,
    pub command: Command,
}

pub fn print_help(binary_name: &str) {
    println!(
        "droidutils v{} - inspect and edit preference namespaces",
        env!("CARGO_PKG_VERSION")
    );
    println!();
    println!("USAGE:");
    println!("    {} [OPTIONS] list", binary_name);
    println!("    {} [OPTIONS] get <key>", binary_name);
    println!("    {} [OPTIONS] set <key> <type> <value>", binary_name);
    println!("    {} [OPTIONS] remove <key>", binary_name);
    println!("    {} [OPTIONS] clear", binary_name);
    println!();
    println!("OPTIONS:");
    println!("    -r, --root <path>     Use a different directory for config and data.");
    println!("    -n, --name <name>     Namespace to use (default: from config, else 'main').");
    println!("    -v, --verbose         Log debug output to stderr.");
    println!("    -h, --help            Show this help message.");
    println!();
    println!("TYPES:");
    println!("    int      32-bit integer");
    println!("    long     64-bit integer");
    println!("    bool     true / false");
    println!("    string   any text");
    println!("    set      comma separated strings (a,b,c)");
    println!();
    println!("ENVIRONMENT:");
    println!("    {}  Same as --root.", ROOT_ENV_VAR);
}

/// Parse a typed value as given on the command line.
pub fn parse_value(kind: &str, raw: &str) -> Result<PrefValue> {
    let value = match kind {
        "int" => PrefValue::Int(
            raw.parse()
                .map_err(|e| anyhow!("'{}' is not a valid int: {}", raw, e))?,
        ),
        "long" => PrefValue::Long(
            raw.parse()
                .map_err(|e| anyhow!("'{}' is not a valid long: {}", raw, e))?,
        ),
        "bool" => PrefValue::Bool(match raw.to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => true,
            "false" | "0" | "no" => false,
            _ => return Err(anyhow!("'{}' is not a valid bool", raw)),
        }),
        "string" => PrefValue::String(raw.to_string()),
        "set" => PrefValue::StringSet(
            raw.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        ),
        other => return Err(anyhow!("Unknown value type '{}'", other)),
    };
    Ok(value)
}

/// Parse arguments, excluding the binary name.
pub fn parse_args(args: &[String]) -> Result<Invocation> {
    let mut root = None;
    let mut namespace = None;
    let mut verbose = false;
    let mut positional: Vec<&str> = Vec::new();

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-h" | "--help" | "help" => {
                return Ok(Invocation {
                    root,
                    namespace,
                    verbose,
                    command: Command::Help,
                });
            }
            "-r" | "--root" => {
                let v = iter.next().ok_or_else(|| anyhow!("{} requires a path", arg))?;
                root = Some(PathBuf::from(v));
            }
            "-n" | "--name" => {
                let v = iter.next().ok_or_else(|| anyhow!("{} requires a name", arg))?;
                namespace = Some(v.clone());
            }
            "-v" | "--verbose" => verbose = true,
            other => positional.push(other),
        }
    }

    let command = match positional.as_slice() {
        [] => Command::Help,
        ["list"] => Command::List,
        ["clear"] => Command::Clear,
        ["get", key] => Command::Get {
            key: key.to_string(),
        },
        ["remove", key] => Command::Remove {
            key: key.to_string(),
        },
        ["set", key, kind, raw] => Command::Set {
            key: key.to_string(),
            value: parse_value(kind, raw)?,
        },
        [cmd, ..] => return Err(anyhow!("Unknown or malformed command '{}'", cmd)),
    };

    Ok(Invocation {
        root,
        namespace,
        verbose,
        command,
    })
}

/// `--root` wins over the environment variable.
pub fn resolve_root(cli_root: Option<PathBuf>) -> Option<PathBuf> {
    cli_root.or_else(|| {
        std::env::var(ROOT_ENV_VAR)
            .ok()
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
    })
}

/// Execute a parsed invocation and return the lines to print.
pub fn execute(ctx: &dyn AppContext, invocation: &Invocation) -> Result<Vec<String>> {
    let name = match &invocation.namespace {
        Some(n) => n.clone(),
        None => Config::load_or_default(ctx).preferences_name,
    };

    let mut out = Vec::new();
    match &invocation.command {
        Command::Help => {}
        Command::List => {
            let ns = Namespace::open(ctx, &name)?;
            for (key, value) in ns.entries() {
                out.push(format!("{} ({}) = {}", key, value.type_name(), value));
            }
        }
        Command::Get { key } => {
            let ns = Namespace::open(ctx, &name)?;
            match ns.get(key) {
                Some(value) => out.push(value.to_string()),
                None => return Err(anyhow!("No value for '{}' in '{}'", key, name)),
            }
        }
        Command::Set { key, value } => {
            Namespace::open(ctx, &name)?
                .edit()
                .put(key, value.clone())
                .commit()?;
        }
        Command::Remove { key } => {
            Namespace::open(ctx, &name)?.edit().remove(key).commit()?;
        }
        Command::Clear => {
            Namespace::open(ctx, &name)?.edit().clear().commit()?;
        }
    }
    Ok(out)
}

/// Entry point used by the `droidprefs` binary.
pub fn run(binary_name: &str, args: &[String]) -> Result<()> {
    let invocation = parse_args(args)?;
    if invocation.command == Command::Help {
        print_help(binary_name);
        return Ok(());
    }

    let ctx = StandardContext::new(resolve_root(invocation.root.clone()));
    let level = if invocation.verbose {
        log::LevelFilter::Debug
    } else {
        Config::load_or_default(&ctx).log_level_filter()
    };
    crate::logging::init(level);

    for line in execute(&ctx, &invocation)? {
        println!("{}", line);
    }
    Ok(())
}
