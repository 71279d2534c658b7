use std::io::IsTerminal;

use anyhow::{Context, Result};
use clap::Parser;

use sable_cli::args::CliArgs;
use sable_cli::driver;
use sable_cli::reporter::Reporter;

const EXIT_SUCCESS: i32 = 0;
const EXIT_PARSE_FAILURES: i32 = 1;

fn main() -> Result<()> {
    // Only installs a subscriber when SABLE_LOG or RUST_LOG is set.
    sable_cli::tracing_config::init_tracing();

    let args = CliArgs::parse();
    let summary = driver::run(&args)?;

    if args.json {
        let json = serde_json::to_string_pretty(&summary).context("failed to serialize summary")?;
        println!("{json}");
    } else {
        let color = !args.no_color && std::io::stdout().is_terminal();
        colored::control::set_override(color);
        print!("{}", Reporter::new(color).render(&summary));
    }

    let code = if summary.failed == 0 {
        EXIT_SUCCESS
    } else {
        EXIT_PARSE_FAILURES
    };
    std::process::exit(code);
}
