use log::warn;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Queue ordering policies. Each policy maps a job to a sort key with the
/// convention that the smallest key sorts first.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Policy {
    /// Largest expansion factor ((wait + service) / service) first.
    Exp,
    /// Oldest submission first.
    Fcfs,
    /// Newest submission first.
    Lcfs,
    /// Longest walltime first.
    Lpf,
    /// Largest host request first.
    Lqf,
    /// Shortest walltime first.
    Spf,
    /// Smallest host request first.
    Sqf,
}

impl Policy {
    pub fn from_token(token: &str) -> Option<Policy> {
        match token {
            "exp" => Some(Policy::Exp),
            "fcfs" => Some(Policy::Fcfs),
            "lcfs" => Some(Policy::Lcfs),
            "lpf" => Some(Policy::Lpf),
            "lqf" => Some(Policy::Lqf),
            "spf" => Some(Policy::Spf),
            "sqf" => Some(Policy::Sqf),
            _ => None,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("invalid age threshold {0:?}: expected a number of hours")]
    BadThreshold(String),
}

/// Scheduler configuration, parsed from the single argument string handed over
/// by the simulator at init time.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SchedulerConfig {
    pub primary_policy: Policy,
    pub backfill_policy: Policy,
    /// Age rescue threshold in seconds. Jobs that have been waiting longer than
    /// this are promoted ahead of the rest of the primary order. `None` disables
    /// the rule.
    pub age_threshold: Option<f64>,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        SchedulerConfig {
            primary_policy: Policy::Fcfs,
            backfill_policy: Policy::Fcfs,
            age_threshold: None,
        }
    }
}

impl SchedulerConfig {
    /// Parses `policies ['@' hours]` where `policies` is a single policy token
    /// or `primary,backfill`. Quote characters are stripped first and the hour
    /// count is converted to seconds. Unknown policy tokens keep the FCFS
    /// default; a non-numeric hour count is a fatal configuration error.
    pub fn parse(arg: &str) -> Result<SchedulerConfig, ConfigError> {
        let cleaned: String = arg.chars().filter(|c| *c != '\'' && *c != '"').collect();
        let cleaned = cleaned.trim();
        if cleaned.is_empty() {
            return Ok(SchedulerConfig::default());
        }

        let (queue_part, age_threshold) = match cleaned.split_once('@') {
            Some((queues, hours)) => {
                let hours: f64 = hours
                    .trim()
                    .parse()
                    .ok()
                    .filter(|h: &f64| h.is_finite())
                    .ok_or_else(|| ConfigError::BadThreshold(hours.to_string()))?;
                // A negative threshold disables the rule, as in `spf@-1`.
                (queues, Some(hours * 3600.0).filter(|t| *t >= 0.0))
            }
            None => (cleaned, None),
        };

        let (primary_token, backfill_token) = match queue_part.split_once(',') {
            Some((primary, backfill)) => (primary.trim(), backfill.trim()),
            None => (queue_part, queue_part),
        };

        let mut config = SchedulerConfig {
            age_threshold,
            ..SchedulerConfig::default()
        };
        match Policy::from_token(primary_token) {
            Some(policy) => config.primary_policy = policy,
            None => warn!("Unknown primary policy {:?}, keeping {:?}", primary_token, config.primary_policy),
        }
        match Policy::from_token(backfill_token) {
            Some(policy) => config.backfill_policy = policy,
            None => warn!("Unknown backfill policy {:?}, keeping {:?}", backfill_token, config.backfill_policy),
        }
        Ok(config)
    }
}
