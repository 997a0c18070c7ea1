use super::Config;
use crate::errors::Error;
use std::fs;

/// Loads and parses the service configuration from a YAML file
///
/// Every section is optional; missing values fall back to their defaults.
///
/// # Arguments
///
/// * `file_path` - Path to the YAML configuration file
///
/// # Errors
///
/// Returns an error if:
/// * The file cannot be read
/// * The YAML content cannot be parsed into a Config
pub fn load_config(file_path: &str) -> Result<Config, Error> {
    let yaml_str = fs::read_to_string(file_path)?;
    let config: Config = serde_yaml::from_str(&yaml_str)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_yaml(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_full_config() {
        let file = write_yaml(
            r#"
server:
  host: 0.0.0.0
  port: 8080
database:
  url: /var/lib/todos/todos.db
  pool_size: 4
  connect_timeout: 2s
testing: true
logging:
  level: debug
  file: true
"#,
        );

        let config = load_config(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.database_url(), "/var/lib/todos/todos.db");
        assert_eq!(config.database.pool_size, 4);
        assert_eq!(config.database.connect_timeout, "2s");
        assert!(config.testing);
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.file);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let file = write_yaml("server:\n  port: 9000\n");

        let config = load_config(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.database.pool_size, 8);
        assert!(!config.testing);
    }

    #[test]
    fn test_invalid_yaml() {
        let file = write_yaml("server:\n  port: not-a-port\n");
        assert!(matches!(
            load_config(file.path().to_str().unwrap()),
            Err(Error::YamlError(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.yaml");
        assert!(matches!(
            load_config(path.to_str().unwrap()),
            Err(Error::IoError(_))
        ));
    }
}
