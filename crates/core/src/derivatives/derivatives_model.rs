//! Derivative domain models.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::derivatives_guard;
use crate::errors::{Error, Result, ValidationError};

/// Domain model representing one derivative contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Derivative {
    pub id: String,
    pub code: String,
    pub buying_party: String,
    pub selling_party: String,
    pub asset: String,
    pub quantity: i64,
    /// Serialized as a string; accepts either a string or a number.
    #[serde(serialize_with = "rust_decimal::serde::str::serialize")]
    pub strike_price: Decimal,
    pub notional_curr_code: String,
    pub date_of_trade: NaiveDate,
    pub maturity_date: NaiveDate,
    pub deleted: bool,
}

impl Derivative {
    /// Builds the stored form of a new derivative once the store has assigned an id.
    pub fn from_new(id: String, new_derivative: NewDerivative) -> Self {
        Self {
            id,
            code: new_derivative.code,
            buying_party: new_derivative.buying_party,
            selling_party: new_derivative.selling_party,
            asset: new_derivative.asset,
            quantity: new_derivative.quantity,
            strike_price: new_derivative.strike_price,
            notional_curr_code: new_derivative.notional_curr_code,
            date_of_trade: new_derivative.date_of_trade,
            maturity_date: new_derivative.maturity_date,
            deleted: false,
        }
    }

    /// Checks the field-level rules every stored derivative must satisfy.
    ///
    /// Runs on creation and again on the updated copy before it is saved.
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("code", &self.code),
            ("buyingParty", &self.buying_party),
            ("sellingParty", &self.selling_party),
            ("asset", &self.asset),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(Error::Validation(ValidationError::MissingField(
                    field.to_string(),
                )));
            }
        }
        if self.notional_curr_code.len() != 3
            || !self
                .notional_curr_code
                .chars()
                .all(|c| c.is_ascii_alphabetic())
        {
            return Err(Error::Validation(ValidationError::InvalidInput(format!(
                "Notional currency code '{}' must be three letters",
                self.notional_curr_code
            ))));
        }
        if self.quantity < 0 {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "Quantity cannot be negative".to_string(),
            )));
        }
        if self.strike_price.is_sign_negative() && !self.strike_price.is_zero() {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "Strike price cannot be negative".to_string(),
            )));
        }
        if self.maturity_date < self.date_of_trade {
            return Err(Error::Validation(ValidationError::InvalidInput(format!(
                "Maturity date {} precedes date of trade {}",
                self.maturity_date, self.date_of_trade
            ))));
        }
        Ok(())
    }

    /// Current value of a mutable attribute.
    pub fn value_of(&self, attribute: DerivativeAttribute) -> AttributeValue {
        match attribute {
            DerivativeAttribute::Code => AttributeValue::Text(self.code.clone()),
            DerivativeAttribute::BuyingParty => AttributeValue::Text(self.buying_party.clone()),
            DerivativeAttribute::SellingParty => AttributeValue::Text(self.selling_party.clone()),
            DerivativeAttribute::Asset => AttributeValue::Text(self.asset.clone()),
            DerivativeAttribute::Quantity => AttributeValue::Integer(self.quantity),
            DerivativeAttribute::StrikePrice => AttributeValue::Decimal(self.strike_price),
            DerivativeAttribute::NotionalCurrCode => {
                AttributeValue::Text(self.notional_curr_code.clone())
            }
            DerivativeAttribute::DateOfTrade => AttributeValue::Date(self.date_of_trade),
            DerivativeAttribute::MaturityDate => AttributeValue::Date(self.maturity_date),
        }
    }

    /// Whether the derivative is past its trade date relative to `reference_date`.
    pub fn is_absolute(&self, reference_date: NaiveDate) -> bool {
        derivatives_guard::is_absolute(self, reference_date)
    }
}

/// Input model for creating a new derivative.
///
/// The store assigns the identifier, so a value of this type can never carry one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDerivative {
    pub code: String,
    pub buying_party: String,
    pub selling_party: String,
    pub asset: String,
    pub quantity: i64,
    pub strike_price: Decimal,
    pub notional_curr_code: String,
    pub date_of_trade: NaiveDate,
    pub maturity_date: NaiveDate,
}

impl NewDerivative {
    pub fn validate(&self) -> Result<()> {
        Derivative::from_new(String::new(), self.clone()).validate()
    }
}

/// The attributes of a derivative that an update may change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DerivativeAttribute {
    Code,
    BuyingParty,
    SellingParty,
    Asset,
    Quantity,
    StrikePrice,
    NotionalCurrCode,
    DateOfTrade,
    MaturityDate,
}

impl DerivativeAttribute {
    pub const ALL: [DerivativeAttribute; 9] = [
        DerivativeAttribute::Code,
        DerivativeAttribute::BuyingParty,
        DerivativeAttribute::SellingParty,
        DerivativeAttribute::Asset,
        DerivativeAttribute::Quantity,
        DerivativeAttribute::StrikePrice,
        DerivativeAttribute::NotionalCurrCode,
        DerivativeAttribute::DateOfTrade,
        DerivativeAttribute::MaturityDate,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DerivativeAttribute::Code => "code",
            DerivativeAttribute::BuyingParty => "buying_party",
            DerivativeAttribute::SellingParty => "selling_party",
            DerivativeAttribute::Asset => "asset",
            DerivativeAttribute::Quantity => "quantity",
            DerivativeAttribute::StrikePrice => "strike_price",
            DerivativeAttribute::NotionalCurrCode => "notional_curr_code",
            DerivativeAttribute::DateOfTrade => "date_of_trade",
            DerivativeAttribute::MaturityDate => "maturity_date",
        }
    }

    /// Decodes a JSON value into the typed value this attribute holds.
    pub fn decode_value(&self, value: serde_json::Value) -> Result<AttributeValue> {
        let decoded = match self {
            DerivativeAttribute::Quantity => {
                serde_json::from_value::<i64>(value).map(AttributeValue::Integer)
            }
            // Written as a string; numbers are accepted for logs recorded before that.
            DerivativeAttribute::StrikePrice => match value {
                serde_json::Value::String(text) => {
                    return Decimal::from_str(text.trim())
                        .map(AttributeValue::Decimal)
                        .map_err(|e| self.invalid_value(e));
                }
                other => serde_json::from_value::<Decimal>(other).map(AttributeValue::Decimal),
            },
            DerivativeAttribute::DateOfTrade | DerivativeAttribute::MaturityDate => {
                serde_json::from_value::<NaiveDate>(value).map(AttributeValue::Date)
            }
            _ => serde_json::from_value::<String>(value).map(AttributeValue::Text),
        };
        decoded.map_err(|e| self.invalid_value(e))
    }

    fn invalid_value(&self, reason: impl fmt::Display) -> Error {
        Error::Validation(ValidationError::InvalidInput(format!(
            "Invalid value for '{}': {}",
            self.as_str(),
            reason
        )))
    }
}

impl fmt::Display for DerivativeAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DerivativeAttribute {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        DerivativeAttribute::ALL
            .into_iter()
            .find(|attribute| attribute.as_str() == s)
            .ok_or_else(|| {
                Error::Validation(ValidationError::InvalidInput(format!(
                    "Unknown derivative attribute '{}'",
                    s
                )))
            })
    }
}

/// A typed attribute value as it appears in change records.
///
/// Decimals serialize as strings so the audit log keeps every digit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Text(String),
    Integer(i64),
    Decimal(#[serde(serialize_with = "rust_decimal::serde::str::serialize")] Decimal),
    Date(NaiveDate),
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::Text(v) => write!(f, "{}", v),
            AttributeValue::Integer(v) => write!(f, "{}", v),
            AttributeValue::Decimal(v) => write!(f, "{}", v),
            AttributeValue::Date(v) => write!(f, "{}", v),
        }
    }
}

/// One proposed new value for a single attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "attribute", content = "value", rename_all = "snake_case")]
pub enum DerivativeUpdate {
    Code(String),
    BuyingParty(String),
    SellingParty(String),
    Asset(String),
    Quantity(i64),
    StrikePrice(Decimal),
    NotionalCurrCode(String),
    DateOfTrade(NaiveDate),
    MaturityDate(NaiveDate),
}

impl DerivativeUpdate {
    pub fn attribute(&self) -> DerivativeAttribute {
        match self {
            DerivativeUpdate::Code(_) => DerivativeAttribute::Code,
            DerivativeUpdate::BuyingParty(_) => DerivativeAttribute::BuyingParty,
            DerivativeUpdate::SellingParty(_) => DerivativeAttribute::SellingParty,
            DerivativeUpdate::Asset(_) => DerivativeAttribute::Asset,
            DerivativeUpdate::Quantity(_) => DerivativeAttribute::Quantity,
            DerivativeUpdate::StrikePrice(_) => DerivativeAttribute::StrikePrice,
            DerivativeUpdate::NotionalCurrCode(_) => DerivativeAttribute::NotionalCurrCode,
            DerivativeUpdate::DateOfTrade(_) => DerivativeAttribute::DateOfTrade,
            DerivativeUpdate::MaturityDate(_) => DerivativeAttribute::MaturityDate,
        }
    }

    pub fn value(&self) -> AttributeValue {
        match self {
            DerivativeUpdate::Code(v)
            | DerivativeUpdate::BuyingParty(v)
            | DerivativeUpdate::SellingParty(v)
            | DerivativeUpdate::Asset(v)
            | DerivativeUpdate::NotionalCurrCode(v) => AttributeValue::Text(v.clone()),
            DerivativeUpdate::Quantity(v) => AttributeValue::Integer(*v),
            DerivativeUpdate::StrikePrice(v) => AttributeValue::Decimal(*v),
            DerivativeUpdate::DateOfTrade(v) | DerivativeUpdate::MaturityDate(v) => {
                AttributeValue::Date(*v)
            }
        }
    }

    /// Writes the proposed value into `derivative`.
    pub fn apply_to(&self, derivative: &mut Derivative) {
        match self {
            DerivativeUpdate::Code(v) => derivative.code = v.clone(),
            DerivativeUpdate::BuyingParty(v) => derivative.buying_party = v.clone(),
            DerivativeUpdate::SellingParty(v) => derivative.selling_party = v.clone(),
            DerivativeUpdate::Asset(v) => derivative.asset = v.clone(),
            DerivativeUpdate::Quantity(v) => derivative.quantity = *v,
            DerivativeUpdate::StrikePrice(v) => derivative.strike_price = *v,
            DerivativeUpdate::NotionalCurrCode(v) => derivative.notional_curr_code = v.clone(),
            DerivativeUpdate::DateOfTrade(v) => derivative.date_of_trade = *v,
            DerivativeUpdate::MaturityDate(v) => derivative.maturity_date = *v,
        }
    }
}

/// Proposed updates in the order the caller supplied them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DerivativeUpdates(Vec<DerivativeUpdate>);

impl DerivativeUpdates {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an update, builder style.
    pub fn with(mut self, update: DerivativeUpdate) -> Self {
        self.0.push(update);
        self
    }

    pub fn push(&mut self, update: DerivativeUpdate) {
        self.0.push(update);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DerivativeUpdate> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<DerivativeUpdate> for DerivativeUpdates {
    fn from_iter<I: IntoIterator<Item = DerivativeUpdate>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a DerivativeUpdates {
    type Item = &'a DerivativeUpdate;
    type IntoIter = std::slice::Iter<'a, DerivativeUpdate>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// One attribute's old and new value, as captured in an update's audit log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawChangeRecord")]
pub struct ChangeRecord {
    pub attribute: DerivativeAttribute,
    pub old_value: AttributeValue,
    pub new_value: AttributeValue,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawChangeRecord {
    attribute: DerivativeAttribute,
    old_value: serde_json::Value,
    new_value: serde_json::Value,
}

impl TryFrom<RawChangeRecord> for ChangeRecord {
    type Error = Error;

    fn try_from(raw: RawChangeRecord) -> Result<Self> {
        Ok(Self {
            attribute: raw.attribute,
            old_value: raw.attribute.decode_value(raw.old_value)?,
            new_value: raw.attribute.decode_value(raw.new_value)?,
        })
    }
}

/// Result of an update request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum UpdateOutcome {
    /// The derivative was mutable; `changes` lists what actually changed (possibly nothing).
    Applied { changes: Vec<ChangeRecord> },
    /// The derivative is absolute and was left untouched.
    RejectedImmutable,
}

impl UpdateOutcome {
    /// The change records, or `None` when the update was rejected.
    pub fn changes(&self) -> Option<&[ChangeRecord]> {
        match self {
            UpdateOutcome::Applied { changes } => Some(changes),
            UpdateOutcome::RejectedImmutable => None,
        }
    }

    pub fn into_changes(self) -> Option<Vec<ChangeRecord>> {
        match self {
            UpdateOutcome::Applied { changes } => Some(changes),
            UpdateOutcome::RejectedImmutable => None,
        }
    }

    pub fn is_applied(&self) -> bool {
        matches!(self, UpdateOutcome::Applied { .. })
    }
}

/// Result of a delete request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum DeleteOutcome {
    Deleted,
    RejectedImmutable,
}

/// Predicate for querying stored derivatives.
///
/// Soft-deleted derivatives are excluded unless `include_deleted` is set.
/// All other criteria are optional and combined with AND.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivativeFilter {
    #[serde(default)]
    pub include_deleted: bool,
    pub code: Option<String>,
    pub asset: Option<String>,
    /// Matches either the buying or the selling party.
    pub party: Option<String>,
    /// Inclusive lower bound on the date of trade.
    pub traded_from: Option<NaiveDate>,
    /// Inclusive upper bound on the date of trade.
    pub traded_to: Option<NaiveDate>,
}

impl DerivativeFilter {
    pub fn matches(&self, derivative: &Derivative) -> bool {
        if derivative.deleted && !self.include_deleted {
            return false;
        }
        if let Some(code) = &self.code {
            if &derivative.code != code {
                return false;
            }
        }
        if let Some(asset) = &self.asset {
            if &derivative.asset != asset {
                return false;
            }
        }
        if let Some(party) = &self.party {
            if &derivative.buying_party != party && &derivative.selling_party != party {
                return false;
            }
        }
        if let Some(from) = self.traded_from {
            if derivative.date_of_trade < from {
                return false;
            }
        }
        if let Some(to) = self.traded_to {
            if derivative.date_of_trade > to {
                return false;
            }
        }
        true
    }
}
