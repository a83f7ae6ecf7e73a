use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;
use url::Url;
use crate::{Error, Result};

const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Base origin of the tag service, e.g. `http://localhost:3333`.
    /// May be left out of the file when supplied on the command line.
    #[serde(rename = "Endpoint", default)]
    pub endpoint: String,
    #[serde(rename = "Loglevel")]
    pub loglevel: Option<String>,
    /// Request timeout in seconds.
    #[serde(rename = "Timeout")]
    pub timeout: Option<u64>,
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = Self::read(path)?;
        config.endpoint_url()?;
        Ok(config)
    }

    /// Parse the file without requiring `Endpoint`; call `endpoint_url` once
    /// overrides are applied.
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Combine the config file with an `--endpoint` override. The file is
    /// optional when the override is given.
    pub fn resolve<P: AsRef<Path>>(path: P, endpoint: Option<&str>) -> Result<Self> {
        let path = path.as_ref();
        match endpoint {
            Some(endpoint) if path.exists() => {
                let mut config = Self::read(path)?;
                config.endpoint = endpoint.to_string();
                config.endpoint_url()?;
                Ok(config)
            }
            Some(endpoint) => Self::from_endpoint(endpoint),
            None => Self::load(path),
        }
    }

    pub fn from_endpoint(endpoint: &str) -> Result<Self> {
        let config = Config {
            endpoint: endpoint.to_string(),
            loglevel: None,
            timeout: None,
        };
        config.endpoint_url()?;
        Ok(config)
    }

    pub fn loglevel(&self) -> &str {
        self.loglevel.as_deref().unwrap_or("info")
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }

    /// Parsed endpoint with a trailing slash, so relative joins keep any path prefix.
    pub fn endpoint_url(&self) -> Result<Url> {
        if self.endpoint.trim().is_empty() {
            return Err(Error::InvalidData("Endpoint is not configured".to_string()));
        }
        let mut url = Url::parse(self.endpoint.trim())?;
        if url.cannot_be_a_base() {
            return Err(Error::InvalidData(format!(
                "Endpoint '{}' cannot be used as a base URL",
                self.endpoint
            )));
        }
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "Endpoint = \"http://localhost:3333\"\nLoglevel = \"debug\"\nTimeout = 5"
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.endpoint, "http://localhost:3333");
        assert_eq!(config.loglevel(), "debug");
        assert_eq!(config.timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_endpoint("http://tags.local").unwrap();
        assert_eq!(config.loglevel(), "info");
        assert_eq!(config.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_missing_endpoint_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "Loglevel = \"warn\"").unwrap();
        assert!(matches!(Config::load(file.path()), Err(Error::InvalidData(_))));
    }

    #[test]
    fn test_read_without_endpoint_then_override() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "Loglevel = \"debug\"").unwrap();

        let mut config = Config::read(file.path()).unwrap();
        assert_eq!(config.endpoint, "");
        assert!(config.endpoint_url().is_err());

        config.endpoint = "http://localhost:3333".to_string();
        assert_eq!(config.endpoint_url().unwrap().as_str(), "http://localhost:3333/");
        assert_eq!(config.loglevel(), "debug");
    }

    #[test]
    fn test_resolve_endpoint_flag_over_file_without_endpoint() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "Loglevel = \"debug\"\nTimeout = 3").unwrap();

        let config = Config::resolve(file.path(), Some("http://tags.local/api")).unwrap();
        assert_eq!(config.endpoint, "http://tags.local/api");
        assert_eq!(config.loglevel(), "debug");
        assert_eq!(config.timeout(), Duration::from_secs(3));

        assert!(matches!(Config::resolve(file.path(), None), Err(Error::InvalidData(_))));
    }

    #[test]
    fn test_resolve_flag_replaces_file_endpoint() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "Endpoint = \"http://localhost:3333\"").unwrap();

        let config = Config::resolve(file.path(), Some("http://tags.local")).unwrap();
        assert_eq!(config.endpoint, "http://tags.local");

        let config = Config::resolve(file.path(), None).unwrap();
        assert_eq!(config.endpoint, "http://localhost:3333");
    }

    #[test]
    fn test_resolve_without_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("tagform.toml");

        let config = Config::resolve(&missing, Some("http://tags.local")).unwrap();
        assert_eq!(config.loglevel(), "info");
        assert!(matches!(Config::resolve(&missing, None), Err(Error::Io(_))));
    }

    #[test]
    fn test_malformed_file_is_a_config_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "Timeout = \"soon\"").unwrap();
        assert!(matches!(Config::read(file.path()), Err(Error::Config(_))));
    }

    #[test]
    fn test_invalid_endpoint_is_rejected() {
        assert!(matches!(Config::from_endpoint("not a url"), Err(Error::UrlParse(_))));
        assert!(matches!(
            Config::from_endpoint("mailto:tags@example.com"),
            Err(Error::InvalidData(_))
        ));
    }

    #[test]
    fn test_endpoint_url_keeps_path_prefix() {
        let config = Config::from_endpoint("http://localhost:3333/api").unwrap();
        let url = config.endpoint_url().unwrap();
        assert_eq!(url.join("tags").unwrap().as_str(), "http://localhost:3333/api/tags");

        let config = Config::from_endpoint("http://localhost:3333").unwrap();
        let url = config.endpoint_url().unwrap();
        assert_eq!(url.join("tags").unwrap().as_str(), "http://localhost:3333/tags");
    }
}
