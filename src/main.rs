mod app;
mod cli;
mod config;
mod disposable;
mod error;
mod git;
mod host;
mod panel;
mod registry;
mod render;
mod source;
#[cfg(test)]
mod testing;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let args = cli::Args::parse();

    // Handle shell completion generation
    if let Some(shell) = args.completions {
        cli::generate_completions(shell);
        return Ok(());
    }

    let default_level = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let app = app::App::new(args)?;
    app.run()?;

    Ok(())
}
