//! Action domain models.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::derivatives::ChangeRecord;
use crate::errors::{Error, ValidationError};

pub const ACTION_TYPE_ADD: &str = "ADD";
pub const ACTION_TYPE_UPDATE: &str = "UPDATE";
pub const ACTION_TYPE_DELETE: &str = "DELETE";

/// Kind of lifecycle event an action records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionType {
    Add,
    Update,
    Delete,
}

impl ActionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionType::Add => ACTION_TYPE_ADD,
            ActionType::Update => ACTION_TYPE_UPDATE,
            ActionType::Delete => ACTION_TYPE_DELETE,
        }
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionType {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            ACTION_TYPE_ADD => Ok(ActionType::Add),
            ACTION_TYPE_UPDATE => Ok(ActionType::Update),
            ACTION_TYPE_DELETE => Ok(ActionType::Delete),
            other => Err(Error::Validation(ValidationError::InvalidInput(format!(
                "Unknown action type '{}'",
                other
            )))),
        }
    }
}

/// One audited lifecycle event. Never mutated once recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Action {
    pub id: String,
    #[serde(rename = "type")]
    pub action_type: ActionType,
    pub timestamp: DateTime<Utc>,
    pub derivative_id: String,
    pub user_id: String,
    /// Present only for UPDATE actions.
    pub update_log: Option<Vec<ChangeRecord>>,
}

/// Input model for appending an action to the log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAction {
    #[serde(rename = "type")]
    pub action_type: ActionType,
    pub timestamp: DateTime<Utc>,
    pub derivative_id: String,
    pub user_id: String,
    pub update_log: Option<Vec<ChangeRecord>>,
}

impl NewAction {
    pub fn add(derivative_id: &str, user_id: &str, timestamp: DateTime<Utc>) -> Self {
        Self::without_log(ActionType::Add, derivative_id, user_id, timestamp)
    }

    pub fn delete(derivative_id: &str, user_id: &str, timestamp: DateTime<Utc>) -> Self {
        Self::without_log(ActionType::Delete, derivative_id, user_id, timestamp)
    }

    /// An UPDATE action always carries its log, even when nothing changed.
    pub fn update(
        derivative_id: &str,
        user_id: &str,
        timestamp: DateTime<Utc>,
        update_log: Vec<ChangeRecord>,
    ) -> Self {
        Self {
            action_type: ActionType::Update,
            timestamp,
            derivative_id: derivative_id.to_string(),
            user_id: user_id.to_string(),
            update_log: Some(update_log),
        }
    }

    fn without_log(
        action_type: ActionType,
        derivative_id: &str,
        user_id: &str,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            action_type,
            timestamp,
            derivative_id: derivative_id.to_string(),
            user_id: user_id.to_string(),
            update_log: None,
        }
    }
}

/// Predicate for querying the action log. Unset criteria match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionFilter {
    pub derivative_id: Option<String>,
    pub user_id: Option<String>,
    pub action_type: Option<ActionType>,
}

impl ActionFilter {
    pub fn for_derivative(derivative_id: &str) -> Self {
        Self {
            derivative_id: Some(derivative_id.to_string()),
            ..Self::default()
        }
    }

    pub fn with_user(mut self, user_id: &str) -> Self {
        self.user_id = Some(user_id.to_string());
        self
    }

    pub fn with_type(mut self, action_type: ActionType) -> Self {
        self.action_type = Some(action_type);
        self
    }

    pub fn matches(&self, action: &Action) -> bool {
        self.derivative_id
            .as_ref()
            .map_or(true, |id| &action.derivative_id == id)
            && self.user_id.as_ref().map_or(true, |id| &action.user_id == id)
            && self
                .action_type
                .map_or(true, |action_type| action.action_type == action_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_type_round_trips_through_str() {
        for action_type in [ActionType::Add, ActionType::Update, ActionType::Delete] {
            assert_eq!(
                ActionType::from_str(action_type.as_str()).unwrap(),
                action_type
            );
        }
        assert!(ActionType::from_str("RENAME").is_err());
    }

    #[test]
    fn test_action_type_serializes_upper_case() {
        assert_eq!(
            serde_json::to_string(&ActionType::Update).unwrap(),
            "\"UPDATE\""
        );
    }

    #[test]
    fn test_add_and_delete_actions_have_no_log() {
        let now = Utc::now();
        assert!(NewAction::add("d", "u", now).update_log.is_none());
        assert!(NewAction::delete("d", "u", now).update_log.is_none());
        assert_eq!(
            NewAction::update("d", "u", now, Vec::new()).update_log,
            Some(Vec::new())
        );
    }

    #[test]
    fn test_filter_matches_on_all_criteria() {
        let action = Action {
            id: "a-1".to_string(),
            action_type: ActionType::Delete,
            timestamp: Utc::now(),
            derivative_id: "d-1".to_string(),
            user_id: "u-1".to_string(),
            update_log: None,
        };

        assert!(ActionFilter::default().matches(&action));
        assert!(ActionFilter::for_derivative("d-1")
            .with_user("u-1")
            .with_type(ActionType::Delete)
            .matches(&action));
        assert!(!ActionFilter::for_derivative("d-2").matches(&action));
        assert!(!ActionFilter::for_derivative("d-1")
            .with_type(ActionType::Add)
            .matches(&action));
    }
}
