mod cli;
mod context;
mod handlers;
mod output;

use clap::{CommandFactory, Parser};
use cli::{Cli, Commands};
use context::CliContext;
use taskboard_core::logging::init_tracing;
use taskboard_core::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(if cli.verbose { "debug" } else { "warn" })?;

    if let Err(e) = run(cli).await {
        output::exit_with_error(&format!("{:#}", e));
    }
    Ok(())
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    if let Commands::Completions { shell } = cli.command {
        clap_complete::generate(
            shell,
            &mut Cli::command(),
            "taskboard",
            &mut std::io::stdout(),
        );
        return Ok(());
    }

    let mut config = AppConfig::load();
    if cli.page_size.is_some() {
        config.page_size = cli.page_size;
    }
    let file_path = cli
        .file
        .or_else(|| config.default_file.clone())
        .ok_or_else(|| {
            anyhow::anyhow!("a board FILE is required (argument, TASKBOARD_FILE or config)")
        })?;

    let ctx = CliContext::load(&file_path, &config).await?;

    match cli.command {
        Commands::Columns => handlers::column::handle_columns(&ctx).await?,
        Commands::Show(args) => handlers::column::handle_show(&ctx, args).await?,
        Commands::Move(args) => handlers::task::handle_move(&ctx, args).await?,
        Commands::Filter(args) => handlers::column::handle_filter(&ctx, args).await?,
        Commands::Completions { .. } => {}
    }

    Ok(())
}
