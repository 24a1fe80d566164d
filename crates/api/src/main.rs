use reblog_api::config::ApiConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ApiConfig::from_env()?;
    reblog_observability::init_with(config.log_format);

    if config.dev_secret {
        tracing::warn!("JWT_SECRET not set; using insecure dev default");
    }

    let app = reblog_api::app::build_app(&config).await?;

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(
        session_ttl_secs = config.token.ttl().num_seconds(),
        persistent = config.use_persistent_stores,
        "listening on {}",
        listener.local_addr()?
    );

    axum::serve(listener, app).await?;
    Ok(())
}
