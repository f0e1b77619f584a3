use anyhow::{Result, anyhow};
use std::collections::HashMap;
use std::env;
use std::fmt::Display;
use std::str::FromStr;

/// Reads settings from the process environment, or from a fixed map in tests.
#[derive(Debug, Clone, Default)]
pub struct EnvReader {
    overrides: Option<HashMap<String, String>>,
}

impl EnvReader {
    pub fn process() -> Self {
        Self { overrides: None }
    }

    /// Reader over exactly these pairs; the process environment is ignored
    pub fn from_pairs(pairs: &[(&str, &str)]) -> Self {
        Self {
            overrides: Some(
                pairs
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
            ),
        }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        match &self.overrides {
            Some(map) => map.get(key).cloned(),
            None => env::var(key).ok(),
        }
    }

    pub fn string(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or_else(|| default.to_string())
    }

    pub fn parse<T>(&self, key: &str, default: T) -> Result<T>
    where
        T: FromStr,
        T::Err: Display,
    {
        match self.get(key) {
            Some(raw) => raw
                .trim()
                .parse::<T>()
                .map_err(|e| anyhow!("Failed to parse {}: {}", key, e)),
            None => Ok(default),
        }
    }

    pub fn parse_bool(&self, key: &str, default: bool) -> bool {
        self.get(key)
            .and_then(|raw| raw.trim().to_lowercase().parse::<bool>().ok())
            .unwrap_or(default)
    }

    /// Comma-separated list, blanks dropped
    pub fn list(&self, key: &str, default: &[&str]) -> Vec<String> {
        match self.get(key) {
            Some(raw) => raw
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            None => default.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_unset() {
        let reader = EnvReader::from_pairs(&[]);
        assert_eq!(reader.parse::<usize>("SEQUENCE_LENGTH", 60).unwrap(), 60);
        assert!(reader.parse_bool("FLAG", true));
        assert_eq!(reader.list("WATCHLIST", &["AAPL"]), vec!["AAPL".to_string()]);
    }

    #[test]
    fn test_malformed_number_is_an_error() {
        let reader = EnvReader::from_pairs(&[("SEQUENCE_LENGTH", "sixty")]);
        let err = reader.parse::<usize>("SEQUENCE_LENGTH", 60).unwrap_err();
        assert!(err.to_string().contains("SEQUENCE_LENGTH"));
    }

    #[test]
    fn test_list_parsing() {
        let reader = EnvReader::from_pairs(&[("WATCHLIST", " aapl, ,MSFT ,")]);
        assert_eq!(
            reader.list("WATCHLIST", &[]),
            vec!["aapl".to_string(), "MSFT".to_string()]
        );
    }
}
