use clap::Parser;
use floodcut_cli::cli::{Cli, Commands};
use tracing::error;
use tracing_subscriber::FmtSubscriber;

mod commands;

fn run(cli: &Cli) -> anyhow::Result<()> {
    match &cli.command {
        Commands::Region { plan, out } => commands::region::handle(plan, out.as_deref()),
        Commands::Solve { plan, out, json } => {
            commands::solve::handle(plan, out.as_deref(), json.as_deref())
        }
        Commands::Sweep {
            plan,
            low,
            high,
            max_evaluations,
            out_dir,
            json,
            threads,
        } => {
            commands::util::configure_threads(threads);
            commands::sweep::handle(
                plan,
                *low,
                *high,
                *max_evaluations,
                out_dir.as_deref(),
                json.as_deref(),
            )
        }
        Commands::Network { command } => commands::network::handle(command),
        Commands::Completions { shell, out } => commands::completions::handle(*shell, out.as_deref()),
    }
}

fn main() {
    let cli = Cli::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(cli.log_level)
        .with_writer(std::io::stderr)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("failed to install log subscriber: {e}");
    }

    if let Err(e) = run(&cli) {
        error!("{e:#}");
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
