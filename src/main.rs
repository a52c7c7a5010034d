//! Newsgroups classifier - Main Entry Point

use clap::Parser;
use newsgroups_classifier::cli::{cmd_defaults, cmd_train, Cli, Commands};

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "newsgroups_classifier=info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Train {
            data_dir,
            categories,
            config,
            cv_folds,
            jobs,
            strip_headers,
            report_json,
        } => {
            cmd_train(
                &data_dir,
                &categories,
                config.as_deref(),
                cv_folds,
                jobs,
                strip_headers,
                report_json.as_deref(),
            )?;
        }
        Commands::Defaults => cmd_defaults()?,
    }

    Ok(())
}
