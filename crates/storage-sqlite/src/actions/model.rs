//! Database model for actions.

use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use derivatex_core::actions::{Action, ActionType, NewAction};
use derivatex_core::derivatives::ChangeRecord;
use derivatex_core::errors::Error;

use crate::errors::{unreadable_row, StorageError};

/// Fixed-width UTC timestamps keep lexical and chronological order aligned.
pub(crate) fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Database model for actions
#[derive(
    Queryable,
    Identifiable,
    Insertable,
    Selectable,
    PartialEq,
    Serialize,
    Deserialize,
    Debug,
    Clone,
)]
#[diesel(table_name = crate::schema::actions)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ActionDB {
    pub id: String,
    pub action_type: String,
    pub timestamp: String,
    pub derivative_id: String,
    pub user_id: String,
    /// JSON array of change records; only set for UPDATE actions.
    pub update_log: Option<String>,
}

impl ActionDB {
    pub fn from_new(id: String, domain: NewAction) -> Result<Self, Error> {
        let update_log = domain
            .update_log
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| StorageError::SerializationError(e.to_string()))?;
        Ok(Self {
            id,
            action_type: domain.action_type.as_str().to_string(),
            timestamp: format_timestamp(domain.timestamp),
            derivative_id: domain.derivative_id,
            user_id: domain.user_id,
            update_log,
        })
    }
}

impl TryFrom<ActionDB> for Action {
    type Error = Error;

    fn try_from(db: ActionDB) -> Result<Self, Self::Error> {
        let timestamp = DateTime::parse_from_rfc3339(&db.timestamp)
            .map_err(|e| {
                unreadable_row("actions", &db.id, format!("timestamp '{}': {}", db.timestamp, e))
            })?
            .with_timezone(&Utc);
        let update_log = db
            .update_log
            .as_deref()
            .map(serde_json::from_str::<Vec<ChangeRecord>>)
            .transpose()
            .map_err(|e| unreadable_row("actions", &db.id, format!("update log: {}", e)))?;
        let action_type = ActionType::from_str(&db.action_type)
            .map_err(|e| unreadable_row("actions", &db.id, e))?;
        Ok(Self {
            action_type,
            timestamp,
            update_log,
            id: db.id,
            derivative_id: db.derivative_id,
            user_id: db.user_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use derivatex_core::derivatives::{AttributeValue, DerivativeAttribute};
    use rust_decimal_macros::dec;

    #[test]
    fn test_update_log_survives_storage_encoding() {
        let timestamp = Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap();
        let log = vec![ChangeRecord {
            attribute: DerivativeAttribute::StrikePrice,
            old_value: AttributeValue::Decimal(dec!(20.20)),
            new_value: AttributeValue::Decimal(dec!(21.5)),
        }];

        let db = ActionDB::from_new(
            "a-1".to_string(),
            NewAction::update("d-1", "u-1", timestamp, log.clone()),
        )
        .unwrap();
        assert_eq!(db.action_type, "UPDATE");
        assert_eq!(db.timestamp, "2024-03-15T12:00:00.000000Z");

        let action = Action::try_from(db).unwrap();
        assert_eq!(action.action_type, ActionType::Update);
        assert_eq!(action.timestamp, timestamp);
        assert_eq!(action.update_log, Some(log));
    }

    #[test]
    fn test_update_log_keeps_every_decimal_digit() {
        let precise = dec!(1234567890.123456789);
        let log = vec![ChangeRecord {
            attribute: DerivativeAttribute::StrikePrice,
            old_value: AttributeValue::Decimal(dec!(20.20)),
            new_value: AttributeValue::Decimal(precise),
        }];

        let db = ActionDB::from_new(
            "a-1".to_string(),
            NewAction::update("d-1", "u-1", Utc::now(), log.clone()),
        )
        .unwrap();
        let column = db.update_log.clone().unwrap();
        assert!(column.contains("\"1234567890.123456789\""), "{}", column);

        let action = Action::try_from(db).unwrap();
        assert_eq!(action.update_log, Some(log));
    }

    #[test]
    fn test_unreadable_rows_are_repository_errors() {
        let db = ActionDB::from_new("a-1".to_string(), NewAction::add("d-1", "u-1", Utc::now()))
            .unwrap();

        let mut bad_log = db.clone();
        bad_log.update_log = Some("[{\"attribute\": \"strike_price\"".to_string());
        let mut bad_timestamp = db.clone();
        bad_timestamp.timestamp = "yesterday".to_string();
        let mut bad_type = db;
        bad_type.action_type = "RENAME".to_string();

        for row in [bad_log, bad_timestamp, bad_type] {
            match Action::try_from(row) {
                Err(Error::Repository(msg)) => assert!(msg.contains("a-1"), "{}", msg),
                other => panic!("unexpected result: {:?}", other),
            }
        }
    }

    #[test]
    fn test_add_action_has_null_log_column() {
        let db = ActionDB::from_new("a-1".to_string(), NewAction::add("d-1", "u-1", Utc::now()))
            .unwrap();
        assert_eq!(db.update_log, None);
        assert_eq!(Action::try_from(db).unwrap().update_log, None);
    }
}
