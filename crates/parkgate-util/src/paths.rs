//! Default paths for parkgated components
//!
//! Paths are user-writable by default (no root required):
//! - Request pipe: `$XDG_RUNTIME_DIR/parkgated/requests.pipe` or `/tmp/parkgated-$USER/requests.pipe`
//! - Reply pipes: created next to the request pipe, one per requester

use std::path::{Path, PathBuf};

/// Environment variable for overriding the request pipe path
pub const PARKGATE_PIPE_ENV: &str = "PARKGATE_PIPE";

/// Request pipe filename within the runtime directory
const PIPE_FILENAME: &str = "requests.pipe";

/// Application subdirectory name
const APP_DIR: &str = "parkgated";

/// Get the default request pipe path.
///
/// Order of precedence:
/// 1. `$PARKGATE_PIPE` environment variable (if set)
/// 2. `$XDG_RUNTIME_DIR/parkgated/requests.pipe` (if XDG_RUNTIME_DIR is set)
/// 3. `/tmp/parkgated-$USER/requests.pipe` (fallback)
pub fn default_pipe_path() -> PathBuf {
    if let Ok(path) = std::env::var(PARKGATE_PIPE_ENV) {
        return PathBuf::from(path);
    }

    pipe_path_without_env()
}

/// Get the request pipe path without checking the PARKGATE_PIPE env var.
/// Used for default values where the env var is checked separately.
pub fn pipe_path_without_env() -> PathBuf {
    runtime_dir().join(PIPE_FILENAME)
}

/// Directory holding the request pipe
fn runtime_dir() -> PathBuf {
    if let Ok(runtime_dir) = std::env::var("XDG_RUNTIME_DIR") {
        return PathBuf::from(runtime_dir).join(APP_DIR);
    }

    let username = std::env::var("USER").unwrap_or_else(|_| "unknown".to_string());
    PathBuf::from(format!("/tmp/{}-{}", APP_DIR, username))
}

/// Reply pipe path for an agent, placed in `dir`.
///
/// The process id keeps two agents with the same name apart.
pub fn reply_pipe_path(dir: &Path, agent: &str) -> PathBuf {
    let sanitized: String = agent
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    dir.join(format!("reply-{}-{}.pipe", sanitized, std::process::id()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pipe_path_contains_app_dir() {
        let path = pipe_path_without_env();
        assert!(path.to_string_lossy().contains("parkgated"));
        assert!(path.to_string_lossy().ends_with(".pipe"));
    }

    #[test]
    fn reply_pipe_path_sanitizes_agent_name() {
        let path = reply_pipe_path(Path::new("/tmp/x"), "agent one/../x");
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("reply-agent_one____x-"));
        assert_eq!(path.parent().unwrap(), Path::new("/tmp/x"));
    }
}
