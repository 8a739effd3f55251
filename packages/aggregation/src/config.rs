//! Engine tuning.

use crate::AggregationError;

/// Environment variable overriding [`AggregatorConfig::chunk_size`].
pub const CHUNK_SIZE_ENV: &str = "SANITATION_CHUNK_SIZE";

/// Environment variable overriding [`AggregatorConfig::max_concurrency`].
pub const MAX_CONCURRENCY_ENV: &str = "SANITATION_MAX_CONCURRENCY";

/// How the engine batches and parallelizes its reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregatorConfig {
    /// Maximum ids per geography or provider read.
    pub chunk_size: usize,
    /// Maximum reads in flight at one level.
    pub max_concurrency: usize,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            chunk_size: 500,
            max_concurrency: 8,
        }
    }
}

impl AggregatorConfig {
    /// Defaults overridden by `SANITATION_CHUNK_SIZE` and
    /// `SANITATION_MAX_CONCURRENCY` when set.
    ///
    /// # Errors
    ///
    /// Returns [`AggregationError::Validation`] if a variable is set but is
    /// not a positive integer.
    pub fn from_env() -> Result<Self, AggregationError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AggregationError> {
        let mut config = Self::default();

        if let Some(value) = lookup(CHUNK_SIZE_ENV) {
            config.chunk_size = parse_positive(CHUNK_SIZE_ENV, &value)?;
        }
        if let Some(value) = lookup(MAX_CONCURRENCY_ENV) {
            config.max_concurrency = parse_positive(MAX_CONCURRENCY_ENV, &value)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Rejects zero chunk sizes and zero concurrency.
    ///
    /// # Errors
    ///
    /// Returns [`AggregationError::Validation`] naming the bad field.
    pub fn validate(&self) -> Result<(), AggregationError> {
        if self.chunk_size == 0 {
            return Err(AggregationError::Validation {
                message: "chunk_size must be at least 1".to_string(),
            });
        }
        if self.max_concurrency == 0 {
            return Err(AggregationError::Validation {
                message: "max_concurrency must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

fn parse_positive(key: &str, value: &str) -> Result<usize, AggregationError> {
    match value.trim().parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(AggregationError::Validation {
            message: format!("{key} must be a positive integer, got {value:?}"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_overrides() {
        let config = AggregatorConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config, AggregatorConfig::default());
        assert_eq!(config.chunk_size, 500);
        assert_eq!(config.max_concurrency, 8);
    }

    #[test]
    fn reads_overrides() {
        let config = AggregatorConfig::from_lookup(|key| match key {
            CHUNK_SIZE_ENV => Some("50".to_string()),
            MAX_CONCURRENCY_ENV => Some(" 2 ".to_string()),
            _ => None,
        })
        .unwrap();
        assert_eq!(config.chunk_size, 50);
        assert_eq!(config.max_concurrency, 2);
    }

    #[test]
    fn rejects_zero_and_garbage() {
        let zero = AggregatorConfig::from_lookup(|key| {
            (key == MAX_CONCURRENCY_ENV).then(|| "0".to_string())
        });
        assert!(matches!(zero, Err(AggregationError::Validation { .. })));

        let garbage =
            AggregatorConfig::from_lookup(|key| (key == CHUNK_SIZE_ENV).then(|| "lots".to_string()));
        assert!(matches!(garbage, Err(AggregationError::Validation { .. })));
    }
}
