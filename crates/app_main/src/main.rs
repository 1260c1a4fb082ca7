//! PhotoSwiper - swipe through photos and sort them into albums
//!
//! Main entry point for the terminal front end.

mod app;

use anyhow::Result;

fn main() -> Result<()> {
    // Initialize logging and panic hook first
    let _log_guard = app_log::init()?;

    // Clean up old logs (7 days)
    if let Err(e) = app_log::cleanup_old_logs(7) {
        tracing::warn!("Failed to cleanup old logs: {}", e);
    }

    tracing::info!("PhotoSwiper starting...");

    // Load settings (defaults if the file is missing or unreadable)
    let state = app_core::AppState::init();

    // Run the application
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(app::run(state))
}
