mod app;
mod config;
mod error;
mod ui;

use std::{fs::OpenOptions, sync::Mutex};

use crate::error::Result;

#[tokio::main]
async fn main() -> Result<()> {
    let config = config::load()?;

    // The terminal belongs to the UI, so logs go to a file.
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_file)?;
    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "expense_tui={level},expenses={level}",
            level = config.log_level
        ))
        .with_ansi(false)
        .with_writer(Mutex::new(log_file))
        .init();

    tracing::info!(base_url = %config.base_url, "starting expense tracker");
    let mut app = app::App::new(config)?;
    app.run().await?;
    Ok(())
}
