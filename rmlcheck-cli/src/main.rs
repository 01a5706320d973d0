mod cli;
mod commands;
mod config;
mod error;
mod output;
mod store;

use clap::Parser;
use cli::{Cli, Commands};
use commands::Settings;
use config::FileConfig;
use error::exit_with_error;

fn init_tracing(cli: &Cli) {
    // --quiet   → always "off"
    // --verbose → RUST_LOG if set, otherwise "info"
    // default   → "off"; RUST_LOG is ignored so logs never mix into reports
    let filter = if cli.quiet {
        tracing_subscriber::EnvFilter::new("off")
    } else if cli.verbose {
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into())
    } else {
        tracing_subscriber::EnvFilter::new("off")
    };

    let ansi = !(cli.no_color || std::env::var_os("NO_COLOR").is_some());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(ansi)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();

    // Reports written to a file never carry escape codes. Piping stdout keeps
    // colors unless NO_COLOR is set, as errors on stderr still reach a terminal.
    if cli.no_color || cli.output.is_some() || std::env::var_os("NO_COLOR").is_some() {
        colored::control::set_override(false);
    }

    init_tracing(&cli);

    if let Err(e) = run(cli) {
        exit_with_error(e);
    }
}

fn run(cli: Cli) -> error::CliResult<()> {
    let file = FileConfig::discover(cli.config.as_deref())?;
    let settings = Settings {
        format: config::resolve_format(cli.format, &file),
        output: cli.output,
    };

    match cli.command {
        Commands::Predicates { mapping } => {
            let mapping = config::resolve_mapping(mapping, &file)?;
            commands::predicates::run(&mapping, &settings)
        }

        Commands::Objects { mapping } => {
            let mapping = config::resolve_mapping(mapping, &file)?;
            commands::objects::run(&mapping, &settings)
        }

        Commands::Templates { mapping, templates } => {
            let mapping = config::resolve_mapping(mapping, &file)?;
            commands::templates::run(&mapping, &templates, &file, &settings)
        }

        Commands::Subjects { mapping, store } => {
            let mapping = config::resolve_mapping(mapping, &file)?;
            commands::subjects::run(&mapping, &store, &file, &settings)
        }

        Commands::Check {
            mapping,
            templates,
            store,
            no_materialize,
        } => {
            let mapping = config::resolve_mapping(mapping, &file)?;
            commands::check::run(
                &mapping,
                &templates,
                &store,
                no_materialize,
                &file,
                &settings,
            )
        }
    }
}
