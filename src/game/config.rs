use std::str::FromStr;

use serde::{Deserialize, Serialize};

const DEFAULT_DAY_LIMIT: u32 = 18;
const DEFAULT_DAYS_PER_LOCATION: u32 = 3;
const DEFAULT_TURN_STIPEND: u32 = 5;
const DEFAULT_MONSTER_POOL_SIZE: usize = 2;
const DEFAULT_MAX_UNITS: usize = 3;
const DEFAULT_COST_REDUCTION_PERCENT: u32 = 80;
/// One generated unit in this many is a provocateur.
pub const DEFAULT_PROVOCATEUR_ODDS: u32 = 5;
const DEFAULT_EVENT_LOG_LIMIT: usize = 256;

/// How the turn-start stipend interacts with leftover gold.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StipendPolicy {
    /// Gold is set to the stipend; nothing carries over.
    Reset,
    /// The stipend is added to whatever the player kept.
    Accumulate,
}

impl Default for StipendPolicy {
    fn default() -> Self {
        StipendPolicy::Reset
    }
}

impl FromStr for StipendPolicy {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "reset" | "fixed" => Ok(StipendPolicy::Reset),
            "accumulate" | "carry" | "carryover" => Ok(StipendPolicy::Accumulate),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid engine config json: {0}")]
    Parse(String),
    #[error("`{field}` must be at least {min}")]
    TooSmall { field: &'static str, min: u64 },
    #[error("`cost_reduction_percent` must be within 1..=100, got {0}")]
    CostReductionOutOfRange(u32),
}

/// Every tunable rule constant of the duel.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct EngineConfig {
    pub day_limit: u32,
    pub days_per_location: u32,
    pub turn_stipend: u32,
    pub stipend_policy: StipendPolicy,
    pub monster_pool_size: usize,
    pub max_units: usize,
    pub cost_reduction_percent: u32,
    pub unit_offers: usize,
    pub equipment_offers: usize,
    pub provocateur_odds: u32,
    /// Most recent events kept in the snapshot log.
    pub event_log_limit: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl EngineConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig =
            serde_json::from_str(json).map_err(|error| ConfigError::Parse(error.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_day_limit(mut self, day_limit: u32) -> Self {
        self.day_limit = day_limit;
        self
    }

    pub fn with_stipend_policy(mut self, policy: StipendPolicy) -> Self {
        self.stipend_policy = policy;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let minimums: [(&'static str, u64, u64); 6] = [
            ("day_limit", u64::from(self.day_limit), 1),
            ("days_per_location", u64::from(self.days_per_location), 1),
            ("monster_pool_size", self.monster_pool_size as u64, 1),
            ("max_units", self.max_units as u64, 1),
            ("provocateur_odds", u64::from(self.provocateur_odds), 1),
            ("event_log_limit", self.event_log_limit as u64, 1),
        ];
        for (field, value, min) in minimums {
            if value < min {
                return Err(ConfigError::TooSmall { field, min });
            }
        }
        if self.cost_reduction_percent == 0 || self.cost_reduction_percent > 100 {
            return Err(ConfigError::CostReductionOutOfRange(
                self.cost_reduction_percent,
            ));
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            day_limit: DEFAULT_DAY_LIMIT,
            days_per_location: DEFAULT_DAYS_PER_LOCATION,
            turn_stipend: DEFAULT_TURN_STIPEND,
            stipend_policy: StipendPolicy::default(),
            monster_pool_size: DEFAULT_MONSTER_POOL_SIZE,
            max_units: DEFAULT_MAX_UNITS,
            cost_reduction_percent: DEFAULT_COST_REDUCTION_PERCENT,
            unit_offers: 1,
            equipment_offers: 1,
            provocateur_odds: DEFAULT_PROVOCATEUR_ODDS,
            event_log_limit: DEFAULT_EVENT_LOG_LIMIT,
            seed: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config = EngineConfig::from_json(r#"{"day_limit": 9, "stipend_policy": "accumulate"}"#)
            .expect("config should parse");
        assert_eq!(config.day_limit, 9);
        assert_eq!(config.stipend_policy, StipendPolicy::Accumulate);
        assert_eq!(config.turn_stipend, 5);
        assert_eq!(config.monster_pool_size, 2);
    }

    #[test]
    fn rejects_zero_length_locations() {
        let error = EngineConfig::from_json(r#"{"days_per_location": 0}"#).unwrap_err();
        assert_eq!(
            error,
            ConfigError::TooSmall {
                field: "days_per_location",
                min: 1
            }
        );
    }

    #[test]
    fn event_log_needs_room_for_one_entry() {
        let error = EngineConfig::from_json(r#"{"event_log_limit": 0}"#).unwrap_err();
        assert_eq!(
            error,
            ConfigError::TooSmall {
                field: "event_log_limit",
                min: 1
            }
        );
        assert_eq!(EngineConfig::default().event_log_limit, 256);
    }

    #[test]
    fn rejects_cost_multiplier_above_full_price() {
        let config = EngineConfig {
            cost_reduction_percent: 120,
            ..EngineConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::CostReductionOutOfRange(120))
        );
    }

    #[test]
    fn stipend_policy_parses_aliases() {
        assert_eq!("Carry".parse::<StipendPolicy>(), Ok(StipendPolicy::Accumulate));
        assert_eq!("reset".parse::<StipendPolicy>(), Ok(StipendPolicy::Reset));
        assert!("double".parse::<StipendPolicy>().is_err());
    }
}
