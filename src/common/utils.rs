//! Small helpers shared across modules.

use std::path::Path;

/// Render a path for logs with the home directory replaced by `~`.
pub fn private_path(path: &Path) -> String {
    if let Some(home) = dirs::home_dir()
        && let Ok(stripped) = path.strip_prefix(&home)
    {
        return format!("~/{}", stripped.display());
    }
    path.display().to_string()
}

/// Render a number of seconds as a compact human duration (`2h 05m`, `3m 20s`, `45s`).
pub fn format_duration_short(total_seconds: u64) -> String {
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    if hours > 0 {
        format!("{hours}h {minutes:02}m")
    } else if minutes > 0 {
        format!("{minutes}m {seconds:02}s")
    } else {
        format!("{seconds}s")
    }
}

/// Whether a process with this PID exists.
pub fn is_process_running(pid: u32) -> bool {
    Path::new(&format!("/proc/{pid}")).exists()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration_short() {
        assert_eq!(format_duration_short(0), "0s");
        assert_eq!(format_duration_short(45), "45s");
        assert_eq!(format_duration_short(200), "3m 20s");
        assert_eq!(format_duration_short(7500), "2h 05m");
    }

    #[test]
    fn test_private_path_outside_home() {
        let path = Path::new("/etc/adhanr/adhanr.toml");
        if dirs::home_dir().is_some_and(|home| home != Path::new("/")) {
            assert_eq!(private_path(path), "/etc/adhanr/adhanr.toml");
        }
    }

    #[test]
    fn test_current_process_is_running() {
        assert!(is_process_running(std::process::id()));
    }
}
