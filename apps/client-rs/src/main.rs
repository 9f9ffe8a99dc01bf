use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use racing_coach_client::{Config, RacingCoachApp};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .with_file(false)
        .with_line_number(true)
        .init();

    info!("Racing Coach Client v{}", env!("CARGO_PKG_VERSION"));

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            error!("configuration error: {}", e);
            return Err(e.into());
        }
    };

    let app = RacingCoachApp::new(config);
    app.run().await
}
