use thiserror::Error;

use crate::replication::{CollisionPolicy, MutationRates};

/// Rejected simulation parameters.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("tape size must be positive")]
    ZeroTape,
    #[error("resource field size must be positive")]
    ZeroResourceField,
    #[error("{name} = {value} must be between 0.0 and 1.0")]
    InvalidProbability { name: &'static str, value: f64 },
    #[error("harvest cap {0} must be non-negative")]
    NegativeHarvestCap(f64),
    #[error("organism of {len} cells (with its COPY) does not fit on a tape of {tape_size}")]
    GenomeTooLong { len: usize, tape_size: usize },
    #[error("report interval must be positive")]
    ZeroReportInterval,
    #[error("unknown collision policy '{0}', expected one of: overwrite, fitness, overlap")]
    UnknownPolicy(String),
    #[error("unknown ancestor '{0}', expected one of: arith, forager")]
    UnknownAncestor(String),
}

/// Configuration for a tape simulation.
#[derive(Clone, Debug, PartialEq)]
pub struct SimConfig {
    /// Number of cells on the tape.
    pub tape_size: usize,
    /// Number of resource cells, or `None` to run without a resource field.
    pub resource_size: Option<usize>,
    /// Copy error probabilities.
    pub rates: MutationRates,
    /// How offspring displace existing organisms.
    pub policy: CollisionPolicy,
    /// Most resource a single HARVEST can withdraw.
    pub harvest_cap: f64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            tape_size: 2048,
            resource_size: Some(2048),
            rates: MutationRates::default(),
            policy: CollisionPolicy::default(),
            harvest_cap: 1.0,
        }
    }
}

impl SimConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tape_size == 0 {
            return Err(ConfigError::ZeroTape);
        }
        if self.resource_size == Some(0) {
            return Err(ConfigError::ZeroResourceField);
        }
        for (name, value) in [
            ("p_mutate", self.rates.p_mutate),
            ("p_insert", self.rates.p_insert),
            ("p_delete", self.rates.p_delete),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::InvalidProbability { name, value });
            }
        }
        if self.harvest_cap.is_nan() || self.harvest_cap < 0.0 {
            return Err(ConfigError::NegativeHarvestCap(self.harvest_cap));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert_eq!(SimConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_zero_tape_rejected() {
        let config = SimConfig {
            tape_size: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroTape));
    }

    #[test]
    fn test_zero_resource_field_rejected() {
        let config = SimConfig {
            resource_size: Some(0),
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroResourceField));
        let config = SimConfig {
            resource_size: None,
            ..Default::default()
        };
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_probability_out_of_range() {
        let config = SimConfig {
            rates: MutationRates {
                p_insert: 1.5,
                ..MutationRates::NONE
            },
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidProbability {
                name: "p_insert",
                value: 1.5
            })
        );
    }

    #[test]
    fn test_nan_probability_rejected() {
        let config = SimConfig {
            rates: MutationRates {
                p_mutate: f64::NAN,
                ..MutationRates::NONE
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_error_messages() {
        let err = ConfigError::GenomeTooLong { len: 9, tape_size: 8 };
        assert_eq!(
            err.to_string(),
            "organism of 9 cells (with its COPY) does not fit on a tape of 8"
        );
    }
}
