//! User goals: what the twin should keep in mind and, when allowed,
//! proactively push toward.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle state of a goal. Only active goals are prompt-eligible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GoalStatus {
    Active,
    Completed,
}

/// A user goal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserGoal {
    /// Unique goal ID
    pub id: String,

    /// Short goal title.
    pub title: String,

    /// Longer description (may be empty).
    pub description: String,

    /// Category label (e.g. "career", "health").
    pub category: String,

    /// Priority rank; lower number sorts first.
    pub priority: u8,

    /// Lifecycle state.
    pub status: GoalStatus,

    /// Optional target date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_date: Option<NaiveDate>,

    /// When this goal was created.
    pub created_at: DateTime<Utc>,
}

impl UserGoal {
    /// Create a new active goal with a generated ID.
    pub fn new(title: impl Into<String>, category: impl Into<String>, priority: u8) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.into(),
            description: String::new(),
            category: category.into(),
            priority,
            status: GoalStatus::Active,
            target_date: None,
            created_at: Utc::now(),
        }
    }

    /// Builder-style description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Builder-style target date.
    pub fn with_target_date(mut self, date: NaiveDate) -> Self {
        self.target_date = Some(date);
        self
    }

    pub fn is_active(&self) -> bool {
        self.status == GoalStatus::Active
    }
}
