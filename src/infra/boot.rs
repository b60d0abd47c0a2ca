use crate::infra::config::Config;
use crate::infra::runtime::mcp_transport::{analyze_factory, serve_stdio};
use std::net::SocketAddr;

pub async fn run_server() -> anyhow::Result<()> {
    let cfg = Config::from_env_and_toml()?;
    cfg.validate().map_err(|e| anyhow::anyhow!(e))?;
    tracing::info!(
        mode = %cfg.mode,
        port = cfg.port,
        model = %cfg.openai.model,
        base_url = %cfg.openai.base_url,
        api_key_set = cfg.openai.api_key.is_some(),
        "BOOT analyze-image-mcp"
    );
    if cfg.openai.api_key.is_none() {
        tracing::warn!("OPENAI_API_KEY is not set; tool calls will fail until it is");
    }

    if cfg.mode == "stdio" {
        serve_stdio(analyze_factory(cfg.openai))
            .await
            .map_err(|e| anyhow::anyhow!(e))?;
        return Ok(());
    }

    let app = crate::infra::http_app::build_app(cfg.openai);
    let addr: SocketAddr = ([0, 0, 0, 0], cfg.port).into();
    tracing::info!(%addr, "listening");
    axum::serve(tokio::net::TcpListener::bind(addr).await?, app).await?;
    Ok(())
}
