/// Driver configuration
use anyhow::{bail, Result};
use drill_playback::PracticeConfig;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

const DEFAULT_CONFIG_FILE: &str = "drill.toml";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DrillConfig {
    #[serde(default)]
    pub practice: PracticeConfig,

    #[serde(default)]
    pub simulation: SimulationSettings,
}

/// How the simulated player behaves
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SimulationSettings {
    /// Simulated time per driver step
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,

    /// Natural length of recordings without an entry in `track_lengths`
    #[serde(default = "default_track_secs")]
    pub track_secs: u64,

    /// Natural length per audio reference, in seconds
    #[serde(default)]
    pub track_lengths: HashMap<String, u64>,

    /// Seed for the tempo randomizer; entropy when unset
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            tick_ms: default_tick_ms(),
            track_secs: default_track_secs(),
            track_lengths: HashMap::new(),
            seed: None,
        }
    }
}

impl DrillConfig {
    /// Load configuration from file and environment
    ///
    /// An explicitly given file must exist; otherwise `drill.toml` in the
    /// working directory is read when present.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                settings = settings.add_source(config::File::from(path.to_path_buf()).required(true));
            }
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    settings = settings.add_source(config::File::from(default_path));
                }
            }
        }

        // Override with environment variables, e.g. DRILL_PRACTICE__TEMPO_COOLDOWN_MS
        settings = settings.add_source(
            config::Environment::with_prefix("DRILL")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: DrillConfig = settings.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.simulation.tick_ms == 0 {
            bail!("simulation.tick_ms must be greater than zero");
        }
        if self.simulation.track_secs == 0 {
            bail!("simulation.track_secs must be greater than zero");
        }
        if self.practice.min_random_distance > self.practice.max_random_distance {
            bail!(
                "practice.min_random_distance ({}) exceeds practice.max_random_distance ({})",
                self.practice.min_random_distance,
                self.practice.max_random_distance
            );
        }
        Ok(())
    }
}

// Default values
fn default_tick_ms() -> u64 {
    100
}

fn default_track_secs() -> u64 {
    30
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults_without_file() {
        let config = DrillConfig::default();
        assert_eq!(config.practice, PracticeConfig::default());
        assert_eq!(config.simulation.tick_ms, 100);
        assert_eq!(config.simulation.track_secs, 30);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_from_file() {
        let file = write_config(
            r#"
            [practice]
            tempo_cooldown_ms = 500
            loop_single = false

            [simulation]
            track_secs = 12
            seed = 7

            [simulation.track_lengths]
            "scales.mp3" = 45
            "#,
        );

        let config = DrillConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.practice.tempo_cooldown_ms, 500);
        assert!(!config.practice.loop_single);
        // Unset practice fields keep their defaults
        assert_eq!(config.practice.finish_guard_ms, 250);
        assert_eq!(config.simulation.track_secs, 12);
        assert_eq!(config.simulation.seed, Some(7));
        assert_eq!(config.simulation.track_lengths.get("scales.mp3"), Some(&45));
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let result = DrillConfig::load(Some(Path::new("/nonexistent/drill.toml")));
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_distances_rejected() {
        let file = write_config(
            r#"
            [practice]
            min_random_distance = 50
            max_random_distance = 10
            "#,
        );
        assert!(DrillConfig::load(Some(file.path())).is_err());
    }
}
