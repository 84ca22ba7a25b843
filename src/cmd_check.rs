//! `check-config` subcommand.

use std::path::Path;

use queuewatch_config::{ConfigError, ConfigLoader, ConfigValidator};

/// Load and validate the configuration file, printing every finding.
pub(crate) fn check_config(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let config = ConfigLoader::load(path)?;
    let result = ConfigValidator::validate(&config)?;

    for warning in &result.warnings {
        println!("warning: {}: {}", warning.path, warning.message);
    }
    for error in &result.errors {
        println!("error: {}: {}", error.path, error.message);
    }

    if let Some(e) = ConfigError::from_validation(&result) {
        return Err(e.into());
    }

    println!(
        "{} is valid ({} queues monitored, {:?} backend)",
        path.display(),
        config.monitor.queues.len(),
        config.backend.kind
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_check_valid_config() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[monitor]\nqueues = [\"email\"]").unwrap();
        assert!(check_config(file.path()).is_ok());
    }

    #[test]
    fn test_check_invalid_config() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[backend]\nkind = \"http\"").unwrap();
        assert!(check_config(file.path()).is_err());
    }

    #[test]
    fn test_check_shipped_default_config() {
        let path = Path::new(concat!(env!("CARGO_MANIFEST_DIR"), "/config/default.toml"));
        assert!(check_config(path).is_ok());
    }

    #[test]
    fn test_check_missing_file() {
        assert!(check_config(Path::new("/nonexistent/queuewatch.toml")).is_err());
    }
}
