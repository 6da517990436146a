use chrono::Local;
use eyre::Result;
use fern::Dispatch;

/// Sets up the process-wide logger with console output.
///
/// Indexing progress and dropped-event diagnostics go through the `log`
/// facade; embedders that install their own logger can skip this.
///
/// # Errors
/// * If a global logger was already installed
pub fn setup_logger() -> Result<()> {
    Dispatch::new()
        // Logging level from RUST_LOG env var or default to Info
        .level(
            std::env::var("RUST_LOG")
                .map(|level| level.parse().unwrap_or(log::LevelFilter::Info))
                .unwrap_or(log::LevelFilter::Info),
        )
        .chain(std::io::stdout())
        .format(|out, message, record| {
            out.finish(format_args!(
                "{} [{}] {}",
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                message
            ));
        })
        .apply()?;
    Ok(())
}
