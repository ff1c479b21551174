//! Table configuration models.

use serde::{Deserialize, Serialize};

use super::errors::{TableError, TableResult};
use crate::game::MatchSettings;

/// Table configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableConfig {
    /// Table name
    pub name: String,

    /// Capacity of the actor's inbox (default: 100)
    pub inbox_capacity: usize,

    /// Events buffered per subscriber before new ones are dropped
    /// (default: 32)
    pub subscriber_buffer: usize,

    /// Rules for the hosted match
    pub settings: MatchSettings,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            name: "Main Table".to_string(),
            inbox_capacity: 100,
            subscriber_buffer: 32,
            settings: MatchSettings::default(),
        }
    }
}

impl TableConfig {
    /// Validate configuration
    pub fn validate(&self) -> TableResult<()> {
        if self.name.trim().is_empty() {
            return Err(TableError::InvalidConfig(
                "Table name must not be empty".to_string(),
            ));
        }

        if self.inbox_capacity == 0 {
            return Err(TableError::InvalidConfig(
                "Inbox capacity must be greater than 0".to_string(),
            ));
        }

        if self.subscriber_buffer == 0 {
            return Err(TableError::InvalidConfig(
                "Subscriber buffer must be greater than 0".to_string(),
            ));
        }

        self.settings.validate()?;
        Ok(())
    }
}
