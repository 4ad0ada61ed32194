use crate::error::ConfigError;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_CONFIG_FILE: &str = "dash-covid.toml";
const DEFAULT_POPULATION_FILE: &str = "population.toml";
/// Upper bound for `max_weeks`, roughly a century
pub const WEEKS_LIMIT: u32 = 5200;

/// Country name -> population. Loaded once, never mutated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PopulationTable {
    entries: BTreeMap<String, u64>,
}

impl PopulationTable {
    /// Build from raw TOML values, rejecting zero or negative counts
    pub fn from_raw(raw: BTreeMap<String, i64>) -> Result<Self, ConfigError> {
        let mut entries = BTreeMap::new();
        for (country, value) in raw {
            if value <= 0 {
                return Err(ConfigError::Population { country, value });
            }
            entries.insert(country, value as u64);
        }
        Ok(Self { entries })
    }

    pub fn parse(content: &str, path: &Path) -> Result<Self, ConfigError> {
        let raw: BTreeMap<String, i64> =
            toml::from_str(content).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        Self::from_raw(raw)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = read(path)?;
        Self::parse(&content, path)
    }

    pub fn get(&self, country: &str) -> Option<u64> {
        self.entries.get(country).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// On-disk shape of `dash-covid.toml`
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    url: String,
    population_file: Option<PathBuf>,
    fetch_timeout_secs: Option<u64>,
    compare: Option<[String; 2]>,
    default_weeks: Option<u32>,
    max_weeks: Option<u32>,
}

/// Resolved dashboard configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP(S) URL or local path of the confirmed-cases CSV
    pub url: String,
    pub population: PopulationTable,
    pub fetch_timeout: Duration,
    /// Fixed pair shown in the comparison chart (primary axis, secondary axis)
    pub compare: [String; 2],
    pub default_weeks: u32,
    pub max_weeks: u32,
}

impl Config {
    /// Load the config file and the population file it points to.
    /// A relative `population_file` is resolved against the config's directory.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = read(path)?;
        let raw: RawConfig = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        let base = path.parent().unwrap_or_else(|| Path::new("."));
        let population_path = base.join(
            raw.population_file
                .clone()
                .unwrap_or_else(|| PathBuf::from(DEFAULT_POPULATION_FILE)),
        );
        let population = PopulationTable::load(&population_path)?;

        Self::from_parts(raw, population)
    }

    fn from_parts(raw: RawConfig, population: PopulationTable) -> Result<Self, ConfigError> {
        let url = raw.url.trim().to_string();
        if url.is_empty() {
            return Err(ConfigError::Invalid {
                key: "url",
                message: "must not be empty".into(),
            });
        }

        let max_weeks = raw.max_weeks.unwrap_or(80);
        if max_weeks == 0 || max_weeks > WEEKS_LIMIT {
            return Err(ConfigError::Invalid {
                key: "max_weeks",
                message: format!("must be within 1..={}", WEEKS_LIMIT),
            });
        }

        let default_weeks = raw.default_weeks.unwrap_or(20);
        if default_weeks == 0 || default_weeks > max_weeks {
            return Err(ConfigError::Invalid {
                key: "default_weeks",
                message: format!("must be within 1..={}", max_weeks),
            });
        }

        let timeout_secs = raw.fetch_timeout_secs.unwrap_or(30);
        if timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                key: "fetch_timeout_secs",
                message: "must be at least 1".into(),
            });
        }

        Ok(Self {
            url,
            population,
            fetch_timeout: Duration::from_secs(timeout_secs),
            compare: raw
                .compare
                .unwrap_or_else(|| ["Spain".to_string(), "Bulgaria".to_string()]),
            default_weeks,
            max_weeks,
        })
    }

    /// Clamp a user-supplied week count into 1..=max_weeks
    pub fn clamp_weeks(&self, weeks: i64) -> u32 {
        weeks.clamp(1, self.max_weeks as i64) as u32
    }
}

fn read(path: &Path) -> Result<String, ConfigError> {
    fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_load_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "population.toml", "Spain = 46754778\nBulgaria = 6948445\n");
        let cfg = write(dir.path(), "dash-covid.toml", "url = \"https://example.org/c.csv\"\n");

        let config = Config::load(&cfg).unwrap();
        assert_eq!(config.url, "https://example.org/c.csv");
        assert_eq!(config.population.get("Spain"), Some(46_754_778));
        assert_eq!(config.population.get("Israel"), None);
        assert_eq!(config.compare, ["Spain".to_string(), "Bulgaria".to_string()]);
        assert_eq!(config.default_weeks, 20);
        assert_eq!(config.max_weeks, 80);
        assert_eq!(config.fetch_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_custom_population_file() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "pop.toml", "Israel = 8841083\n");
        let cfg = write(
            dir.path(),
            "dash-covid.toml",
            "url = \"data.csv\"\npopulation_file = \"pop.toml\"\ncompare = [\"Israel\", \"Portugal\"]\nmax_weeks = 40\ndefault_weeks = 10\n",
        );

        let config = Config::load(&cfg).unwrap();
        assert_eq!(config.population.len(), 1);
        assert_eq!(config.compare[0], "Israel");
        assert_eq!(config.clamp_weeks(100), 40);
        assert_eq!(config.clamp_weeks(-3), 1);
        assert_eq!(config.clamp_weeks(12), 12);
    }

    #[test]
    fn test_missing_population_file() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = write(dir.path(), "dash-covid.toml", "url = \"x.csv\"\n");
        assert!(matches!(Config::load(&cfg), Err(ConfigError::Read { .. })));
    }

    #[test]
    fn test_rejects_non_positive_population() {
        let err = PopulationTable::parse("Spain = 0\n", Path::new("p.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Population { value: 0, .. }));
    }

    #[test]
    fn test_rejects_default_weeks_above_max() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "population.toml", "");
        let cfg = write(
            dir.path(),
            "dash-covid.toml",
            "url = \"x.csv\"\ndefault_weeks = 90\n",
        );
        assert!(matches!(
            Config::load(&cfg),
            Err(ConfigError::Invalid { key: "default_weeks", .. })
        ));
    }

    #[test]
    fn test_rejects_max_weeks_above_limit() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "population.toml", "");
        let cfg = write(
            dir.path(),
            "dash-covid.toml",
            "url = \"x.csv\"\nmax_weeks = 20000000\ndefault_weeks = 20000000\n",
        );
        assert!(matches!(
            Config::load(&cfg),
            Err(ConfigError::Invalid { key: "max_weeks", .. })
        ));

        let cfg = write(
            dir.path(),
            "dash-covid.toml",
            &format!("url = \"x.csv\"\nmax_weeks = {}\n", WEEKS_LIMIT),
        );
        assert_eq!(Config::load(&cfg).unwrap().max_weeks, WEEKS_LIMIT);
    }

    #[test]
    fn test_missing_url_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "population.toml", "");
        let cfg = write(dir.path(), "dash-covid.toml", "max_weeks = 3\n");
        assert!(matches!(Config::load(&cfg), Err(ConfigError::Parse { .. })));
    }
}
