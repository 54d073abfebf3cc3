//! Database model for derivatives.

use std::str::FromStr;

use chrono::NaiveDate;
use diesel::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use derivatex_core::derivatives::{Derivative, NewDerivative};
use derivatex_core::errors::Error;

use crate::errors::unreadable_row;

/// Calendar dates are stored as ISO-8601 text so they sort lexically.
pub(crate) const DATE_FORMAT: &str = "%Y-%m-%d";

pub(crate) fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn parse_date(row_id: &str, value: &str) -> Result<NaiveDate, Error> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map_err(|e| unreadable_row("derivatives", row_id, format!("date '{}': {}", value, e)))
}

/// Database model for derivatives
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
#[diesel(table_name = crate::schema::derivatives)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct DerivativeDB {
    pub id: String,
    pub code: String,
    pub buying_party: String,
    pub selling_party: String,
    pub asset: String,
    pub quantity: i64,
    pub strike_price: String,
    pub notional_curr_code: String,
    pub date_of_trade: String,
    pub maturity_date: String,
    pub deleted: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// Every column an update may touch. `id` and `created_at` never change.
#[derive(AsChangeset, Debug, Clone)]
#[diesel(table_name = crate::schema::derivatives)]
pub struct DerivativeChangesetDB {
    pub code: String,
    pub buying_party: String,
    pub selling_party: String,
    pub asset: String,
    pub quantity: i64,
    pub strike_price: String,
    pub notional_curr_code: String,
    pub date_of_trade: String,
    pub maturity_date: String,
    pub deleted: bool,
    pub updated_at: String,
}

impl DerivativeDB {
    pub fn from_new(id: String, domain: NewDerivative, now: &str) -> Self {
        Self {
            id,
            code: domain.code,
            buying_party: domain.buying_party,
            selling_party: domain.selling_party,
            asset: domain.asset,
            quantity: domain.quantity,
            strike_price: domain.strike_price.to_string(),
            notional_curr_code: domain.notional_curr_code,
            date_of_trade: format_date(domain.date_of_trade),
            maturity_date: format_date(domain.maturity_date),
            deleted: false,
            created_at: now.to_string(),
            updated_at: now.to_string(),
        }
    }
}

impl DerivativeChangesetDB {
    pub fn from_domain(domain: &Derivative, now: &str) -> Self {
        Self {
            code: domain.code.clone(),
            buying_party: domain.buying_party.clone(),
            selling_party: domain.selling_party.clone(),
            asset: domain.asset.clone(),
            quantity: domain.quantity,
            strike_price: domain.strike_price.to_string(),
            notional_curr_code: domain.notional_curr_code.clone(),
            date_of_trade: format_date(domain.date_of_trade),
            maturity_date: format_date(domain.maturity_date),
            deleted: domain.deleted,
            updated_at: now.to_string(),
        }
    }
}

impl TryFrom<DerivativeDB> for Derivative {
    type Error = Error;

    fn try_from(db: DerivativeDB) -> Result<Self, Self::Error> {
        let strike_price = Decimal::from_str(&db.strike_price).map_err(|e| {
            unreadable_row(
                "derivatives",
                &db.id,
                format!("strike price '{}': {}", db.strike_price, e),
            )
        })?;
        Ok(Self {
            strike_price,
            date_of_trade: parse_date(&db.id, &db.date_of_trade)?,
            maturity_date: parse_date(&db.id, &db.maturity_date)?,
            id: db.id,
            code: db.code,
            buying_party: db.buying_party,
            selling_party: db.selling_party,
            asset: db.asset,
            quantity: db.quantity,
            notional_curr_code: db.notional_curr_code,
            deleted: db.deleted,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn new_derivative() -> NewDerivative {
        NewDerivative {
            code: "doe".to_string(),
            buying_party: "foo".to_string(),
            selling_party: "bar".to_string(),
            asset: "Stocks".to_string(),
            quantity: 1,
            strike_price: dec!(20.20),
            notional_curr_code: "USD".to_string(),
            date_of_trade: NaiveDate::from_ymd_opt(2024, 3, 5).unwrap(),
            maturity_date: NaiveDate::from_ymd_opt(2025, 3, 5).unwrap(),
        }
    }

    #[test]
    fn test_columns_hold_text_encodings() {
        let db = DerivativeDB::from_new("d-1".to_string(), new_derivative(), "now");
        assert_eq!(db.strike_price, "20.20");
        assert_eq!(db.date_of_trade, "2024-03-05");
        assert!(!db.deleted);

        let derivative = Derivative::try_from(db).unwrap();
        assert_eq!(derivative, Derivative::from_new("d-1".to_string(), new_derivative()));
    }

    #[test]
    fn test_corrupt_columns_are_reported() {
        let mut db = DerivativeDB::from_new("d-1".to_string(), new_derivative(), "now");
        db.strike_price = "twenty".to_string();
        match Derivative::try_from(db.clone()) {
            Err(Error::Repository(msg)) => assert!(msg.contains("d-1") && msg.contains("twenty")),
            other => panic!("unexpected result: {:?}", other),
        }

        db.strike_price = "20.20".to_string();
        db.maturity_date = "next year".to_string();
        assert!(matches!(
            Derivative::try_from(db),
            Err(Error::Repository(_))
        ));
    }
}
