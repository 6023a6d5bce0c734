// Copyright (c) 2021 James O. D. Hunt.
//
// SPDX-License-Identifier: Apache-2.0
//

/// A simple example showing optional and positional arguments.
///
/// Run with `RUST_LOG=argmatch=trace` to see how the tokens are matched.
use argmatch::{
    App, Arg, Args, Arity, Choices, Count, Error, IntType, Range, Result, StoreTrue, Version,
};
use serde::Deserialize;
use tracing_subscriber::EnvFilter;

/// The options this program supports, bound from the parse result.
#[derive(Debug, Deserialize)]
struct Opts {
    verbose: i64,
    dry_run: bool,
    mode: String,
    jobs: i64,
    files: Vec<String>,
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut args = Args::new();

    args.add(Arg::new(&["-v", "--verbose"]).action(Count).help("more output"))?;
    args.add(Arg::new(&["-n", "--dry-run"]).action(StoreTrue))?;
    args.add(Arg::new(&["--version"]).action(Version))?;

    args.add(
        Arg::new(&["-m", "--mode"])
            .choices(Choices::new(vec!["fast", "slow"]))
            .default("slow"),
    )?;

    args.add(
        Arg::new(&["-j", "--jobs"])
            .type_(IntType)
            .choices(Range::new(1, 64))
            .default(1),
    )?;

    args.add(Arg::new(&["files"]).nargs(Arity::ZeroOrMore))?;

    let app = App::new("simple").version("0.1.0").args(args);

    let attrs = match app.parse() {
        Ok(attrs) => attrs,
        Err(Error::HelpRequested) => {
            println!("usage: {}", app.get_name());

            for arg in app.get_args().iter() {
                println!("  {:<24} {}", arg.to_string(), arg.get_help().unwrap_or(""));
            }

            return Ok(());
        }
        Err(Error::VersionRequested) => {
            println!("{} {}", app.get_name(), app.get_version());
            return Ok(());
        }
        Err(e) => {
            eprintln!("{}: error: {}", app.get_name(), e);
            std::process::exit(2);
        }
    };

    println!("INFO: {}", attrs);

    let opts: Opts = attrs.deserialize()?;

    println!("INFO: {:?}", opts);

    Ok(())
}
