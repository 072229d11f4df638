//! Resolution of the stable worker identity a process allocates under.
//!
//! In containerized deployments the host name is the container id, which
//! survives process restarts inside the same container, so a restarted
//! process resumes the same range history.

use std::env;
use std::fs;

use crate::error::AppError;

const HOSTNAME_FILE: &str = "/etc/hostname";

/// Returns the worker identity.
///
/// Priority:
/// 1. `configured` (from `WORKER_ID`)
/// 2. `HOSTNAME` environment variable
/// 3. Contents of `/etc/hostname`
///
/// # Errors
///
/// Returns [`AppError::Configuration`] if no identity can be determined.
pub fn resolve_worker_id(configured: Option<&str>) -> Result<String, AppError> {
    if let Some(id) = configured.map(str::trim).filter(|id| !id.is_empty()) {
        return Ok(id.to_string());
    }

    if let Ok(host) = env::var("HOSTNAME") {
        let host = host.trim();
        if !host.is_empty() {
            return Ok(host.to_string());
        }
    }

    if let Ok(host) = fs::read_to_string(HOSTNAME_FILE) {
        let host = host.trim();
        if !host.is_empty() {
            return Ok(host.to_string());
        }
    }

    Err(AppError::configuration(
        "cannot determine worker identity; set WORKER_ID",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_configured_identity_wins() {
        assert_eq!(
            resolve_worker_id(Some("33cc6eebd387")).unwrap(),
            "33cc6eebd387"
        );
    }

    #[test]
    fn test_configured_identity_is_trimmed() {
        assert_eq!(resolve_worker_id(Some("  worker-1\n")).unwrap(), "worker-1");
    }

    #[test]
    #[serial]
    fn test_falls_back_to_hostname_env() {
        // SAFETY: Tests are run serially due to #[serial], so no concurrent access
        unsafe {
            env::set_var("HOSTNAME", "container-abc");
        }

        assert_eq!(resolve_worker_id(None).unwrap(), "container-abc");
        assert_eq!(resolve_worker_id(Some("   ")).unwrap(), "container-abc");

        unsafe {
            env::remove_var("HOSTNAME");
        }
    }
}
