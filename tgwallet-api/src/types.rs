use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::{Currency, FormError, UserId};

/// Balances of a user. Every field is optional on the wire, absent, `null`
/// and non-numeric values read as zero.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Balance {
    #[serde(default, deserialize_with = "lenient_amount", skip_serializing_if = "Option::is_none")]
    pub usdt: Option<f64>,
    #[serde(default, deserialize_with = "lenient_amount", skip_serializing_if = "Option::is_none")]
    pub rub: Option<f64>,
    #[serde(default, deserialize_with = "lenient_amount", skip_serializing_if = "Option::is_none")]
    pub uzs: Option<f64>,
}

impl Balance {
    pub fn by_currency(&self, curr: Currency) -> f64 {
        match curr {
            Currency::USDT => self.usdt,
            Currency::RUB => self.rub,
            Currency::UZS => self.uzs,
        }
        .unwrap_or(0.0)
    }
}

/// `null` and absent read as zero, like the page's `?? 0`. Non-numeric values
/// also read as zero instead of being shown verbatim.
fn lenient_amount<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| v.as_f64()))
}

/// Kind of a request that waits for the administrator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestType {
    Deposit,
    Withdraw,
}

impl RequestType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestType::Deposit => "deposit",
            RequestType::Withdraw => "withdraw",
        }
    }
}

impl fmt::Display for RequestType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RequestType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "deposit" => Ok(RequestType::Deposit),
            "withdraw" => Ok(RequestType::Withdraw),
            other => Err(format!("Unknown request type `{other}`")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecisionAction {
    Approve,
    Reject,
}

impl DecisionAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            DecisionAction::Approve => "approve",
            DecisionAction::Reject => "reject",
        }
    }
}

impl fmt::Display for DecisionAction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for DecisionAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "approve" => Ok(DecisionAction::Approve),
            "reject" => Ok(DecisionAction::Reject),
            other => Err(format!("Unknown action `{other}`")),
        }
    }
}

/// Administrator verdict on one pending request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Decision {
    pub req_type: RequestType,
    pub req_id: u64,
    pub action: DecisionAction,
}

/// One line of the user history. Rendered verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(rename = "type")]
    pub kind: String,
    pub currency: String,
    pub amount: f64,
    pub status: String,
    pub created_at: String,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct History {
    #[serde(default)]
    pub items: Vec<HistoryItem>,
}

/// Deposit or withdraw request awaiting approval
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingItem {
    pub id: u64,
    #[serde(rename = "type")]
    pub kind: RequestType,
    pub user_id: UserId,
    pub currency: String,
    pub amount: f64,
    pub created_at: String,
}

impl PendingItem {
    pub fn decision(&self, action: DecisionAction) -> Decision {
        Decision {
            req_type: self.kind,
            req_id: self.id,
            action,
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pending {
    #[serde(default)]
    pub items: Vec<PendingItem>,
}

/// Validated deposit or withdraw request, built from user input and sent at once
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OperationRequest {
    pub currency: Currency,
    pub amount: f64,
}

impl OperationRequest {
    pub fn parse(currency: &str, amount: &str) -> Result<Self, FormError> {
        Ok(OperationRequest {
            currency: Currency::from_str(currency)?,
            amount: parse_amount(amount)?,
        })
    }
}

/// Amount must be a positive finite number
pub fn parse_amount(input: &str) -> Result<f64, FormError> {
    let trimmed = input.trim();
    let amount: f64 = trimmed
        .parse()
        .map_err(|_| FormError::MalformedAmount(trimmed.to_owned()))?;
    if amount.is_finite() && amount > 0.0 {
        Ok(amount)
    } else {
        Err(FormError::NonPositiveAmount(amount))
    }
}

/// Admin top-up of a user balance
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceTopUp {
    pub user_id: UserId,
    pub usdt: f64,
    pub rub: f64,
    pub uzs: i64,
}
