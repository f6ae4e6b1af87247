use anyhow::Result;
use tracing::Level;
use tracing_subscriber::fmt;

/// Warnings (skipped images, swallowed PDF failures) are always emitted;
/// `verbose` raises the floor to debug.
pub fn init(verbose: bool) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    let _ = fmt()
        .with_max_level(level)
        .with_target(false)
        .with_level(true)
        .try_init();
    Ok(())
}
