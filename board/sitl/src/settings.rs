use std::path::PathBuf;

use anyhow::Context;
use autopilot::SimulationConfig;

const DEFAULT_SECONDS: f64 = 20.0;
const DEFAULT_TELEMETRY_PATH: &str = "flight_telemetry.jsonl";

#[derive(Debug)]
pub struct Settings {
    pub config: SimulationConfig,
    pub drones: usize,
    pub seconds: f64,
    pub telemetry_path: PathBuf,
    /// Swarm followers chase drone 0 instead of flying their own waypoints
    pub follow_leader: bool,
}

impl Settings {
    /// Read the optional JSON config file named on the command line, then
    /// apply `SITL_*` environment overrides
    pub fn load() -> anyhow::Result<Self> {
        let config_path = std::env::args().nth(1).map(PathBuf::from);
        Self::resolve(config_path, |key| std::env::var(key).ok())
    }

    pub fn resolve<F>(config_path: Option<PathBuf>, env: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match config_path {
            Some(path) => {
                let text = std::fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read config {}", path.display()))?;
                serde_json::from_str::<SimulationConfig>(&text)
                    .with_context(|| format!("Failed to parse config {}", path.display()))?
            }
            None => SimulationConfig::default(),
        };

        if let Some(seed) = env("SITL_SEED") {
            let seed = seed
                .parse::<u64>()
                .context("SITL_SEED must be an unsigned integer")?;
            config.seed = Some(seed);
        }
        let drones = match env("SITL_DRONES") {
            Some(v) => v.parse::<usize>().context("SITL_DRONES must be a count")?,
            None => 1,
        };
        let seconds = match env("SITL_SECONDS") {
            Some(v) => v.parse::<f64>().context("SITL_SECONDS must be a number")?,
            None => DEFAULT_SECONDS,
        };
        let follow_leader = match env("SITL_FOLLOW") {
            Some(v) => v
                .parse::<bool>()
                .context("SITL_FOLLOW must be true or false")?,
            None => false,
        };
        let telemetry_path = env("SITL_TELEMETRY")
            .unwrap_or_else(|| DEFAULT_TELEMETRY_PATH.to_string())
            .into();

        if drones == 0 {
            anyhow::bail!("SITL_DRONES must be at least 1");
        }
        if !(seconds.is_finite() && seconds > 0.0) {
            anyhow::bail!("SITL_SECONDS must be positive, got {}", seconds);
        }
        config.validate()?;

        Ok(Settings {
            config,
            drones,
            seconds,
            telemetry_path,
            follow_leader,
        })
    }

    pub fn steps(&self, dt: f64) -> usize {
        (self.seconds / dt).round() as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::resolve(None, env_of(&[])).unwrap();
        assert_eq!(settings.drones, 1);
        assert_eq!(settings.config.seed, None);
        assert_eq!(settings.steps(0.05), 400);
        assert_eq!(settings.telemetry_path, PathBuf::from("flight_telemetry.jsonl"));
        assert!(!settings.follow_leader);
    }

    #[test]
    fn test_environment_overrides() {
        let settings = Settings::resolve(
            None,
            env_of(&[
                ("SITL_DRONES", "5"),
                ("SITL_SECONDS", "3"),
                ("SITL_SEED", "42"),
                ("SITL_TELEMETRY", "/tmp/swarm.jsonl"),
                ("SITL_FOLLOW", "true"),
            ]),
        )
        .unwrap();
        assert_eq!(settings.drones, 5);
        assert_eq!(settings.config.seed, Some(42));
        assert_eq!(settings.steps(0.1), 30);
        assert_eq!(settings.telemetry_path, PathBuf::from("/tmp/swarm.jsonl"));
        assert!(settings.follow_leader);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(Settings::resolve(None, env_of(&[("SITL_DRONES", "0")])).is_err());
        assert!(Settings::resolve(None, env_of(&[("SITL_SECONDS", "-1")])).is_err());
        assert!(Settings::resolve(None, env_of(&[("SITL_SEED", "abc")])).is_err());
        assert!(Settings::resolve(None, env_of(&[("SITL_FOLLOW", "maybe")])).is_err());
    }

    #[test]
    fn test_missing_config_file_is_an_error() {
        let path = PathBuf::from("/nonexistent/sitl-config.json");
        assert!(Settings::resolve(Some(path), env_of(&[])).is_err());
    }
}
