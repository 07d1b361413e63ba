use std::sync::Arc;

use git_http::ForgeMatcher;
use server::config::AdapterConfig;
use server::routes::{build_router, AppState};
use server::upstream::ReqwestUpstreamClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let config = Arc::new(AdapterConfig::from_env()?);
    tracing::info!(
        listen_addr = %config.listen_addr,
        host_user = %config.host_user,
        upstream_base = %config.upstream_base,
        upstream_timeout_ms = config.upstream_timeout.as_millis() as u64,
        "starting import-path redirect adapter"
    );

    let matcher = Arc::new(ForgeMatcher::new(config.host_user.clone()));
    let upstream = Arc::new(ReqwestUpstreamClient::new(
        config.upstream_base.clone(),
        config.upstream_timeout,
    )?);

    let state = AppState { config: config.clone(), matcher, upstream };
    let router = build_router(state);

    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    let result = axum::serve(listener, router)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("received shutdown signal, draining in-flight requests");
        })
        .await;

    match &result {
        Ok(()) => tracing::info!("import-path redirect adapter stopped"),
        Err(err) => tracing::error!(error = %err, "import-path redirect adapter exited with error"),
    }
    result.map_err(Into::into)
}
