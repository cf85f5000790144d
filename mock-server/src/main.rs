use mock_server::{MockConfig, MockState, API_PREFIX};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    tracing_subscriber::fmt::init();

    let env = |key: &str, default: &str| std::env::var(key).unwrap_or_else(|_| default.to_string());
    let port = env("PORT", "3000");
    let config = MockConfig::new(env("MOCK_ORG_NAME", "Test Org"), env("MOCK_API_TOKEN", "api-token"))
        .with_station(env("MOCK_LINE_NAME", "line 1"), env("MOCK_STATION_NAME", "station 1"));

    let addr = format!("127.0.0.1:{port}");
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(org = %config.org_name, "listening on http://{addr}{API_PREFIX}/");
    mock_server::run(listener, MockState::new(config)).await
}
