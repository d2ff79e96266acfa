//! Configuration file.

use std::path::Path;

use anyhow::{Context, Result};
use certlife_core::ZoneSource;
use certlife_providers::{NicCredentials, NicSource, PddSource};
use serde::{Deserialize, Serialize};

/// Top-level configuration file.
///
/// Missing sections are disabled and unknown fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// RU-CENTER provider
    pub nic: NicSection,
    /// Yandex PDD provider
    pub pdd: PddSection,
    /// Settings shared by every provider
    pub global: GlobalSection,
}

/// `nic` section
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NicSection {
    pub enabled: bool,
    pub login: String,
    pub password: String,
    pub app_login: String,
    pub app_password: String,
}

/// `pdd` section
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PddSection {
    pub enabled: bool,
    pub token: String,
}

/// `global` section
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalSection {
    /// Regular expressions; matching discovered domains are not probed
    pub exclude_domains: Vec<String>,
    /// Domains probed in addition to the discovered ones, `host[:port]`
    pub add_domains: Vec<String>,
}

impl Config {
    /// Load configuration from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse config file {}", path.display()))?;

        Ok(config)
    }

    /// Example configuration printed by `--sample`
    pub fn sample() -> Self {
        Self {
            nic: NicSection::default(),
            pdd: PddSection {
                enabled: true,
                token: String::new(),
            },
            global: GlobalSection {
                exclude_domains: vec![r"^foo\.com$".into(), r"^ba(r|z)\.(org|ru)".into()],
                add_domains: vec!["baz.io:3000".into(), "fiz.svc.cluster.local:8080".into()],
            },
        }
    }

    /// Returns true if no provider section is enabled
    pub const fn all_disabled(&self) -> bool {
        !self.nic.enabled && !self.pdd.enabled
    }

    /// Build the enabled zone sources, NIC first
    pub fn zone_sources(&self) -> Result<Vec<Box<dyn ZoneSource>>> {
        let mut sources: Vec<Box<dyn ZoneSource>> = Vec::new();

        if self.nic.enabled {
            let credentials = NicCredentials {
                login: self.nic.login.clone(),
                password: self.nic.password.clone(),
                app_login: self.nic.app_login.clone(),
                app_password: self.nic.app_password.clone(),
            };
            sources.push(Box::new(
                NicSource::new(credentials).context("failed to create NIC client")?,
            ));
        }

        if self.pdd.enabled {
            sources.push(Box::new(
                PddSource::new(self.pdd.token.clone()).context("failed to create PDD client")?,
            ));
        }

        Ok(sources)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_full_file() {
        let file = write_config(
            r#"{
                "nic": {"enabled": true, "login": "123/NIC-D", "password": "pw",
                        "app_login": "app", "app_password": "secret"},
                "pdd": {"enabled": false, "token": "t"},
                "global": {"exclude_domains": ["^dev\\."], "add_domains": ["x.io:8443"]}
            }"#,
        );

        let config = Config::load(file.path()).unwrap();
        assert!(config.nic.enabled);
        assert_eq!(config.nic.login, "123/NIC-D");
        assert!(!config.pdd.enabled);
        assert_eq!(config.global.exclude_domains, vec![r"^dev\."]);
        assert_eq!(config.global.add_domains, vec!["x.io:8443"]);
    }

    #[test]
    fn test_missing_sections_are_disabled() {
        let file = write_config(r#"{"global": {"add_domains": ["a.example"]}, "extra": 1}"#);

        let config = Config::load(file.path()).unwrap();
        assert!(config.all_disabled());
        assert!(config.zone_sources().unwrap().is_empty());
        assert_eq!(config.global.add_domains, vec!["a.example"]);
    }

    #[test]
    fn test_unreadable_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(&dir.path().join("missing.json")).unwrap_err();
        assert!(err.to_string().contains("failed to read config file"));
    }

    #[test]
    fn test_invalid_json() {
        let file = write_config("{ not json");
        let err = Config::load(file.path()).unwrap_err();
        assert!(err.to_string().contains("failed to parse config file"));
    }

    #[test]
    fn test_sample_round_trips() {
        let sample = Config::sample();
        let json = serde_json::to_string_pretty(&sample).unwrap();
        assert!(json.contains(r#""add_domains""#));

        let parsed: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, sample);
        assert!(parsed.pdd.enabled);
        assert!(!parsed.nic.enabled);
    }

    #[test]
    fn test_zone_sources_in_configuration_order() {
        let mut config = Config::sample();
        config.nic.enabled = true;

        let names: Vec<_> = config
            .zone_sources()
            .unwrap()
            .iter()
            .map(|s| s.name())
            .collect();
        assert_eq!(names, vec!["nic", "pdd"]);
    }
}
