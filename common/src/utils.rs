// common/src/utils.rs
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use crate::error::StartupError;

/// Setup tracing for consistent logging across the service
pub fn setup_tracing() -> Result<(), StartupError> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}
