//! ETA estimation configuration.

/// Default average vehicle speed in km/h.
const DEFAULT_AVG_SPEED_KMH: f64 = 25.0;

/// Default EMA smoothing factor.
const DEFAULT_SMOOTHING_ALPHA: f64 = 0.3;

/// Default smoothed ETA at or below which an update counts towards "passed".
const DEFAULT_PASSED_THRESHOLD_SECS: f64 = 30.0;

/// Default number of consecutive below-threshold updates that mark a point
/// as passed.
const DEFAULT_PASSED_CONFIRMATIONS: u32 = 3;

/// Error from building or loading an [`EtaConfig`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// A value could not be parsed.
    #[error("{key}: cannot parse {value:?}")]
    Unparsable { key: &'static str, value: String },

    /// A value parsed but is outside its allowed range.
    #[error("{key}: {value} is out of range ({expected})")]
    OutOfRange {
        key: &'static str,
        value: f64,
        expected: &'static str,
    },
}

/// Parameters for ETA estimation.
#[derive(Debug, Clone, PartialEq)]
pub struct EtaConfig {
    /// Assumed average vehicle speed (km/h). Not derived from observed speed.
    pub avg_speed_kmh: f64,

    /// Weight of the newest raw ETA in the moving average, in `(0, 1]`.
    pub smoothing_alpha: f64,

    /// Smoothed ETA (seconds) at or below which the vehicle is considered to
    /// be at the reference point for this update.
    pub passed_threshold_secs: f64,

    /// Consecutive at-threshold updates needed before reporting "passed".
    pub passed_confirmations: u32,
}

impl EtaConfig {
    /// Create a validated configuration.
    pub fn new(
        avg_speed_kmh: f64,
        smoothing_alpha: f64,
        passed_threshold_secs: f64,
        passed_confirmations: u32,
    ) -> Result<Self, ConfigError> {
        if !avg_speed_kmh.is_finite() || avg_speed_kmh <= 0.0 {
            return Err(ConfigError::OutOfRange {
                key: "AVG_SPEED_KMH",
                value: avg_speed_kmh,
                expected: "finite and > 0",
            });
        }
        if !(smoothing_alpha > 0.0 && smoothing_alpha <= 1.0) {
            return Err(ConfigError::OutOfRange {
                key: "ETA_SMOOTH_ALPHA",
                value: smoothing_alpha,
                expected: "in (0, 1]",
            });
        }
        if !passed_threshold_secs.is_finite() || passed_threshold_secs < 0.0 {
            return Err(ConfigError::OutOfRange {
                key: "ETA_PASSED_THRESHOLD_SECS",
                value: passed_threshold_secs,
                expected: "finite and >= 0",
            });
        }
        Ok(Self {
            avg_speed_kmh,
            smoothing_alpha,
            passed_threshold_secs,
            passed_confirmations,
        })
    }

    /// Read overrides from the process environment.
    ///
    /// Unset variables keep their defaults; set but invalid ones are errors.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`from_env`](Self::from_env) with an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let avg_speed_kmh = parse_or(&lookup, "AVG_SPEED_KMH", defaults.avg_speed_kmh)?;
        let smoothing_alpha = parse_or(&lookup, "ETA_SMOOTH_ALPHA", defaults.smoothing_alpha)?;
        let passed_threshold_secs = parse_or(
            &lookup,
            "ETA_PASSED_THRESHOLD_SECS",
            defaults.passed_threshold_secs,
        )?;
        let passed_confirmations = parse_or(
            &lookup,
            "ETA_PASSED_CONFIRMATIONS",
            defaults.passed_confirmations,
        )?;

        Self::new(
            avg_speed_kmh,
            smoothing_alpha,
            passed_threshold_secs,
            passed_confirmations,
        )
    }

    /// Average speed in metres per second.
    pub fn avg_speed_mps(&self) -> f64 {
        self.avg_speed_kmh * 1000.0 / 3600.0
    }
}

impl Default for EtaConfig {
    fn default() -> Self {
        Self {
            avg_speed_kmh: DEFAULT_AVG_SPEED_KMH,
            smoothing_alpha: DEFAULT_SMOOTHING_ALPHA,
            passed_threshold_secs: DEFAULT_PASSED_THRESHOLD_SECS,
            passed_confirmations: DEFAULT_PASSED_CONFIRMATIONS,
        }
    }
}

fn parse_or<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Unparsable {
            key,
            value: raw,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn default_config() {
        let config = EtaConfig::default();

        assert_eq!(config.avg_speed_kmh, 25.0);
        assert_eq!(config.smoothing_alpha, 0.3);
        assert_eq!(config.passed_threshold_secs, 30.0);
        assert_eq!(config.passed_confirmations, 3);
    }

    #[test]
    fn speed_conversion() {
        let config = EtaConfig::new(36.0, 0.5, 10.0, 2).unwrap();
        assert!((config.avg_speed_mps() - 10.0).abs() < 1e-12);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(EtaConfig::new(0.0, 0.3, 30.0, 3).is_err());
        assert!(EtaConfig::new(f64::NAN, 0.3, 30.0, 3).is_err());
        assert!(EtaConfig::new(25.0, 0.0, 30.0, 3).is_err());
        assert!(EtaConfig::new(25.0, 1.5, 30.0, 3).is_err());
        assert!(EtaConfig::new(25.0, f64::NAN, 30.0, 3).is_err());
        assert!(EtaConfig::new(25.0, 0.3, -1.0, 3).is_err());
        assert!(EtaConfig::new(25.0, 1.0, 0.0, 0).is_ok());
    }

    #[test]
    fn lookup_empty_gives_defaults() {
        let config = EtaConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config, EtaConfig::default());
    }

    #[test]
    fn lookup_overrides() {
        let config = EtaConfig::from_lookup(lookup_from(&[
            ("AVG_SPEED_KMH", "40"),
            ("ETA_SMOOTH_ALPHA", " 0.5 "),
            ("ETA_PASSED_CONFIRMATIONS", "5"),
        ]))
        .unwrap();

        assert_eq!(config.avg_speed_kmh, 40.0);
        assert_eq!(config.smoothing_alpha, 0.5);
        assert_eq!(config.passed_threshold_secs, 30.0);
        assert_eq!(config.passed_confirmations, 5);
    }

    #[test]
    fn lookup_unparsable() {
        let err = EtaConfig::from_lookup(lookup_from(&[("AVG_SPEED_KMH", "fast")])).unwrap_err();
        assert_eq!(
            err,
            ConfigError::Unparsable {
                key: "AVG_SPEED_KMH",
                value: "fast".into(),
            }
        );
        assert_eq!(err.to_string(), "AVG_SPEED_KMH: cannot parse \"fast\"");
    }

    #[test]
    fn lookup_out_of_range() {
        let err = EtaConfig::from_lookup(lookup_from(&[("ETA_SMOOTH_ALPHA", "2")])).unwrap_err();
        assert_eq!(
            err.to_string(),
            "ETA_SMOOTH_ALPHA: 2 is out of range (in (0, 1])"
        );
    }
}
