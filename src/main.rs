use std::error::Error;

use tracing::{debug, error};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Load environment variables from .env file; a missing file is fine,
    // plain environment variables still apply.
    let dotenv = dotenvy::dotenv();

    version_tracker::telemetry::init("info,version_tracker=info,source_host=info,api=info")?;

    if let Err(e) = dotenv {
        debug!("no .env file loaded: {e}");
    }

    if let Err(e) = api::start().await {
        error!("server terminated: {e}");
        return Err(e.into());
    }

    Ok(())
}
