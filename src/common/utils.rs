//! Small formatting helpers shared by the engine views and the CLI.

use std::path::Path;
use std::time::Duration;

/// Format a duration as zero-padded `HH:MM:SS`.
///
/// Sub-second remainders are truncated, so 1.9s renders as `00:00:01`.
/// Hours are not wrapped at 24.
pub fn format_hms(duration: Duration) -> String {
    let total_seconds = duration.as_secs();
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}

/// Replace the user's home directory prefix with `~` for display.
pub fn private_path(path: &Path) -> String {
    if let Some(home) = dirs::home_dir()
        && let Ok(stripped) = path.strip_prefix(&home)
    {
        return format!("~/{}", stripped.display());
    }
    path.display().to_string()
}
