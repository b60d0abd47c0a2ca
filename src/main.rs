use std::process::ExitCode;

use analyze_image_mcp::{cli, infra};
use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    infra::logging::init();

    let args = cli::Cli::parse();
    if let Some(command) = args.command {
        return Ok(cli::run_commands(command).await);
    }

    // No subcommand: serve MCP over stdio or Streamable HTTP per MODE.
    infra::boot::run_server().await?;
    Ok(ExitCode::SUCCESS)
}
