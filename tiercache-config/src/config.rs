use std::{fs, path};

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parsing error: {0}")]
    YamlParse(#[from] serde_yaml::Error),
}

pub trait Configurable {
    fn config(&self) -> &serde_yaml::Value;

    // read configuration from yaml config
    fn load_config(
        config_file_path: impl AsRef<path::Path>,
    ) -> Result<serde_yaml::Value, ConfigError> {
        let content: String = fs::read_to_string(config_file_path)?;
        let config: serde_yaml::Value = serde_yaml::from_str(&content)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    struct TestApp {
        config: serde_yaml::Value,
    }

    impl Configurable for TestApp {
        fn config(&self) -> &serde_yaml::Value {
            &self.config
        }
    }

    #[test]
    fn test_load_config_valid_yaml() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.yml");
        let mut file = File::create(&config_path).unwrap();
        writeln!(file, "remote:\n  dsn: redis://cache:6379\n  ttl: 60").unwrap();

        let config = TestApp::load_config(&config_path).unwrap();
        assert_eq!(config["remote"]["dsn"].as_str(), Some("redis://cache:6379"));
        assert_eq!(config["remote"]["ttl"].as_u64(), Some(60));
    }

    #[test]
    fn test_load_config_invalid_yaml() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.yml");
        let mut file = File::create(&config_path).unwrap();
        writeln!(file, "invalid: : yaml: content").unwrap();

        let config = TestApp::load_config(&config_path);
        assert!(matches!(config, Err(ConfigError::YamlParse(_))));
    }

    #[test]
    fn test_load_config_missing_file() {
        let config = TestApp::load_config("/definitely/not/here.yml");
        assert!(matches!(config, Err(ConfigError::Io(_))));
    }
}
