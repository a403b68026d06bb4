use std::path::Path;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use mailpgp::cli::{self, Cli, Commands};
use mailpgp::config::app_config::AppConfig;

fn main() {
    let args = Cli::parse();
    init_logging(args.verbose, args.quiet);

    if let Err(e) = run(&args) {
        cli::output::error(&format!("Error: {e}"));
        std::process::exit(1);
    }
}

fn run(args: &Cli) -> mailpgp::core::errors::Result<()> {
    let config = AppConfig::load(args.config.as_deref().map(Path::new))?;

    match &args.command {
        Commands::Decrypt {
            file,
            recipients,
            output,
            passphrase,
        } => cli::commands::decrypt::execute(
            &config,
            file.as_deref(),
            recipients,
            output.as_deref(),
            passphrase.as_deref(),
        ),
        Commands::Verify { file } => cli::commands::verify::execute(&config, file.as_deref()),
        Commands::Keys { action } => cli::commands::keys::execute(&config, action),
    }
}

/// `RUST_LOG` wins; otherwise the verbosity flags pick the level.
fn init_logging(verbose: bool, quiet: bool) {
    let default = if verbose {
        "mailpgp=debug"
    } else if quiet {
        "error"
    } else {
        "warn"
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
