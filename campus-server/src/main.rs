use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let ax = campus_server::build()?;

    let host = ax.get("http.host").unwrap_or_else(|| "127.0.0.1".to_string());
    let port = ax.get("http.port").unwrap_or_else(|| "8080".to_string());
    let addr = format!("{host}:{port}");

    tracing::info!("campus api on http://{addr}");

    ax.listen(addr).await?;

    Ok(())
}
