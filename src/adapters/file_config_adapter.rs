//! INI file configuration adapter.

use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::path::Path;

#[derive(Debug)]
pub struct FileConfigAdapter {
    config: Ini,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let mut config = Ini::new();
        config.load(path).map_err(std::io::Error::other)?;
        Ok(Self { config })
    }

    pub fn from_string(content: &str) -> Result<Self, String> {
        let mut config = Ini::new();
        config.read(content.to_string())?;
        Ok(Self { config })
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.config.get(section, key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::config_validation::{parse_bool, parse_key, ENGINE, STRATEGY};
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn from_string_parses_both_sections() {
        let content = r#"
[engine]
initial_cash = 10000
strategy_name = ma cross

[strategy]
kind = moving_average
fast_period = 2
"#;
        let adapter = FileConfigAdapter::from_string(content).unwrap();
        assert_eq!(
            adapter.get_string(ENGINE, "strategy_name"),
            Some("ma cross".to_string())
        );
        assert_eq!(
            adapter.get_string(STRATEGY, "kind"),
            Some("moving_average".to_string())
        );
        assert_eq!(parse_key::<usize>(&adapter, STRATEGY, "fast_period").unwrap(), Some(2));
    }

    #[test]
    fn get_string_returns_none_for_missing_key() {
        let adapter = FileConfigAdapter::from_string("[engine]\ninitial_cash = 100\n").unwrap();
        assert_eq!(adapter.get_string(ENGINE, "missing"), None);
        assert_eq!(adapter.get_string("missing_section", "key"), None);
    }

    #[test]
    fn keys_are_case_insensitive() {
        let adapter = FileConfigAdapter::from_string("[Engine]\nInitial_Cash = 5\n").unwrap();
        assert_eq!(adapter.get_string(ENGINE, "initial_cash"), Some("5".to_string()));
    }

    #[test]
    fn unparseable_values_stay_raw() {
        let adapter =
            FileConfigAdapter::from_string("[strategy]\nslow_period = abc\nepsilon = tiny\n")
                .unwrap();
        assert_eq!(adapter.get_string(STRATEGY, "slow_period"), Some("abc".to_string()));
        assert!(parse_key::<usize>(&adapter, STRATEGY, "slow_period").is_err());
        assert!(parse_key::<f64>(&adapter, STRATEGY, "epsilon").is_err());
    }

    #[test]
    fn from_file_reads_config() {
        let file = create_temp_config("[engine]\nforce_close_at_end = no\n");
        let adapter = FileConfigAdapter::from_file(file.path()).unwrap();
        let raw = adapter.get_string(ENGINE, "force_close_at_end").unwrap();
        assert_eq!(parse_bool(&raw), Some(false));
    }

    #[test]
    fn from_file_returns_error_for_missing_file() {
        let result = FileConfigAdapter::from_file("/nonexistent/path/config.ini");
        assert!(result.is_err());
    }
}
