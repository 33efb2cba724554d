use tokio::net::TcpListener;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::DEBUG).finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {e}");
    }

    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let addr = format!("127.0.0.1:{port}");
    let listener = TcpListener::bind(&addr).await?;
    info!(
        "listening on http://{addr}{} (application {}, auth {})",
        mock_server::API_PREFIX,
        mock_server::DEFAULT_APPLICATION,
        mock_server::DEFAULT_AUTH
    );
    mock_server::run(listener).await
}
