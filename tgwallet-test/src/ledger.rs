use chrono::{Duration, NaiveDate, NaiveDateTime};
use std::collections::HashMap;
use std::str::FromStr;
use thiserror::Error;

use tgwallet_api::domain::{Currency, UserId};
use tgwallet_api::types::{Balance, DecisionAction, HistoryItem, PendingItem, RequestType};

pub const HISTORY_LIMIT: usize = 50;
pub const PENDING_LIMIT: usize = 100;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum LedgerError {
    #[error("User not found")]
    UserNotFound,
    #[error("Bad currency")]
    BadCurrency,
    #[error("Amount must be > 0")]
    NonPositiveAmount,
    #[error("Insufficient {0}")]
    InsufficientFunds(Currency),
    #[error("Not admin")]
    NotAdmin,
    #[error("Bad req_type")]
    BadRequestType,
    #[error("Bad action")]
    BadAction,
    #[error("Not found")]
    RequestNotFound,
    #[error("Already processed")]
    AlreadyProcessed,
}

impl LedgerError {
    /// Server status code: 400, 403, 404
    pub fn status(&self) -> u16 {
        match self {
            LedgerError::UserNotFound => 404,
            LedgerError::BadCurrency => 400,
            LedgerError::NonPositiveAmount => 400,
            LedgerError::InsufficientFunds(_) => 400,
            LedgerError::NotAdmin => 403,
            LedgerError::BadRequestType => 400,
            LedgerError::BadAction => 400,
            LedgerError::RequestNotFound => 404,
            LedgerError::AlreadyProcessed => 400,
        }
    }
}

pub type Result<T> = std::result::Result<T, LedgerError>;

#[derive(Debug, Clone, PartialEq)]
pub struct UserRecord {
    pub username: String,
    pub usdt: f64,
    pub rub: f64,
    pub uzs: i64,
}

impl UserRecord {
    fn amount(&self, currency: Currency) -> f64 {
        match currency {
            Currency::USDT => self.usdt,
            Currency::RUB => self.rub,
            Currency::UZS => self.uzs as f64,
        }
    }

    fn credit(&mut self, currency: Currency, amount: f64) {
        match currency {
            Currency::USDT => self.usdt += amount,
            Currency::RUB => self.rub += amount,
            Currency::UZS => self.uzs += amount as i64,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Approved => "approved",
            RequestStatus::Rejected => "rejected",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RequestRecord {
    pub id: u64,
    pub kind: RequestType,
    pub user_id: UserId,
    pub currency: Currency,
    pub amount: f64,
    pub status: RequestStatus,
    pub created_at: NaiveDateTime,
}

impl RequestRecord {
    fn created_at_str(&self) -> String {
        self.created_at.format("%Y-%m-%d %H:%M:%S").to_string()
    }

    fn history_item(&self) -> HistoryItem {
        HistoryItem {
            id: Some(self.id),
            kind: self.kind.to_string(),
            currency: self.currency.ticker_lowercase().to_owned(),
            amount: self.amount,
            status: self.status.as_str().to_owned(),
            created_at: self.created_at_str(),
        }
    }

    fn pending_item(&self) -> PendingItem {
        PendingItem {
            id: self.id,
            kind: self.kind,
            user_id: self.user_id,
            currency: self.currency.ticker_lowercase().to_owned(),
            amount: self.amount,
            created_at: self.created_at_str(),
        }
    }
}

/// One HTTP call as the stub received it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
}

/// In-memory backend state. Deposits and withdraws live in separate tables
/// with their own id sequences.
#[derive(Debug)]
pub struct Ledger {
    pub admin_id: UserId,
    pub users: HashMap<UserId, UserRecord>,
    pub deposits: Vec<RequestRecord>,
    pub withdraws: Vec<RequestRecord>,
    pub calls: Vec<RecordedCall>,
    /// Extra latency before answering calls to a path
    pub delays: HashMap<String, std::time::Duration>,
    ticks: i64,
}

fn validate_currency_amount(currency: &str, amount: f64) -> Result<Currency> {
    let currency = Currency::from_str(currency).map_err(|_| LedgerError::BadCurrency)?;
    if amount <= 0.0 || amount.is_nan() {
        return Err(LedgerError::NonPositiveAmount);
    }
    Ok(currency)
}

impl Ledger {
    pub fn new(admin_id: UserId) -> Self {
        Ledger {
            admin_id,
            users: HashMap::new(),
            deposits: vec![],
            withdraws: vec![],
            calls: vec![],
            delays: HashMap::new(),
            ticks: 0,
        }
    }

    /// Timestamps advance one second per created request, so ordering by
    /// creation time is deterministic.
    fn next_timestamp(&mut self) -> NaiveDateTime {
        self.ticks += 1;
        let epoch = NaiveDate::from_ymd_opt(2024, 1, 1)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .unwrap_or_default();
        epoch + Duration::seconds(self.ticks)
    }

    fn table(&self, kind: RequestType) -> &Vec<RequestRecord> {
        match kind {
            RequestType::Deposit => &self.deposits,
            RequestType::Withdraw => &self.withdraws,
        }
    }

    fn table_mut(&mut self, kind: RequestType) -> &mut Vec<RequestRecord> {
        match kind {
            RequestType::Deposit => &mut self.deposits,
            RequestType::Withdraw => &mut self.withdraws,
        }
    }

    fn guard_admin(&self, admin_id: UserId) -> Result<()> {
        if admin_id == self.admin_id {
            Ok(())
        } else {
            Err(LedgerError::NotAdmin)
        }
    }

    pub fn upsert_user(&mut self, user_id: UserId, username: &str) {
        self.users
            .entry(user_id)
            .or_insert_with(|| UserRecord {
                username: String::new(),
                usdt: 0.0,
                rub: 0.0,
                uzs: 0,
            })
            .username = username.to_owned();
    }

    pub fn user(&self, user_id: UserId) -> Result<&UserRecord> {
        self.users.get(&user_id).ok_or(LedgerError::UserNotFound)
    }

    pub fn balance(&self, user_id: UserId) -> Result<Balance> {
        let user = self.user(user_id)?;
        Ok(Balance {
            usdt: Some(user.usdt),
            rub: Some(user.rub),
            uzs: Some(user.uzs as f64),
        })
    }

    fn insert_request(
        &mut self,
        kind: RequestType,
        user_id: UserId,
        currency: Currency,
        amount: f64,
    ) -> u64 {
        let created_at = self.next_timestamp();
        let table = self.table_mut(kind);
        let id = table.last().map(|r| r.id + 1).unwrap_or(1);
        table.push(RequestRecord {
            id,
            kind,
            user_id,
            currency,
            amount,
            status: RequestStatus::Pending,
            created_at,
        });
        id
    }

    pub fn deposit_request(&mut self, user_id: UserId, currency: &str, amount: f64) -> Result<u64> {
        let currency = validate_currency_amount(currency, amount)?;
        self.user(user_id)?;
        Ok(self.insert_request(RequestType::Deposit, user_id, currency, amount))
    }

    /// Balance is checked when the request is filed and again on approval
    pub fn withdraw_request(&mut self, user_id: UserId, currency: &str, amount: f64) -> Result<u64> {
        let currency = validate_currency_amount(currency, amount)?;
        if self.user(user_id)?.amount(currency) < amount {
            return Err(LedgerError::InsufficientFunds(currency));
        }
        Ok(self.insert_request(RequestType::Withdraw, user_id, currency, amount))
    }

    fn merged_newest_first<'a>(
        &'a self,
        keep: impl Fn(&RequestRecord) -> bool,
        limit: usize,
    ) -> Vec<&'a RequestRecord> {
        let take = |table: &'a Vec<RequestRecord>| {
            table
                .iter()
                .rev()
                .filter(|r| keep(*r))
                .take(limit)
                .collect::<Vec<_>>()
        };
        let mut items = take(&self.deposits);
        items.extend(take(&self.withdraws));
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        items
    }

    pub fn history(&self, user_id: UserId) -> Vec<HistoryItem> {
        self.merged_newest_first(|r| r.user_id == user_id, HISTORY_LIMIT)
            .into_iter()
            .take(HISTORY_LIMIT)
            .map(RequestRecord::history_item)
            .collect()
    }

    pub fn pending(&self, admin_id: UserId) -> Result<Vec<PendingItem>> {
        self.guard_admin(admin_id)?;
        Ok(self
            .merged_newest_first(|r| r.status == RequestStatus::Pending, PENDING_LIMIT)
            .into_iter()
            .map(RequestRecord::pending_item)
            .collect())
    }

    pub fn decision(
        &mut self,
        admin_id: UserId,
        req_type: &str,
        req_id: u64,
        action: &str,
    ) -> Result<RequestStatus> {
        self.guard_admin(admin_id)?;
        let kind = RequestType::from_str(req_type).map_err(|_| LedgerError::BadRequestType)?;
        let action = DecisionAction::from_str(action).map_err(|_| LedgerError::BadAction)?;
        let record = self
            .table(kind)
            .iter()
            .find(|r| r.id == req_id)
            .cloned()
            .ok_or(LedgerError::RequestNotFound)?;
        if record.status != RequestStatus::Pending {
            return Err(LedgerError::AlreadyProcessed);
        }

        let status = match action {
            DecisionAction::Reject => RequestStatus::Rejected,
            DecisionAction::Approve => {
                let user = self
                    .users
                    .get_mut(&record.user_id)
                    .ok_or(LedgerError::UserNotFound)?;
                match kind {
                    RequestType::Deposit => user.credit(record.currency, record.amount),
                    RequestType::Withdraw => {
                        if user.amount(record.currency) < record.amount {
                            return Err(LedgerError::InsufficientFunds(record.currency));
                        }
                        user.credit(record.currency, -record.amount);
                    }
                }
                RequestStatus::Approved
            }
        };
        if let Some(r) = self.table_mut(kind).iter_mut().find(|r| r.id == req_id) {
            r.status = status;
        }
        Ok(status)
    }

    pub fn add_balance(
        &mut self,
        admin_id: UserId,
        user_id: UserId,
        usdt: f64,
        rub: f64,
        uzs: i64,
    ) -> Result<()> {
        self.guard_admin(admin_id)?;
        let user = self.users.get_mut(&user_id).ok_or(LedgerError::UserNotFound)?;
        user.usdt += usdt;
        user.rub += rub;
        user.uzs += uzs;
        Ok(())
    }

    pub fn delay(&mut self, path: &str, latency: std::time::Duration) {
        self.delays.insert(path.to_owned(), latency);
    }

    /// Calls to `path`, oldest first
    pub fn calls_to(&self, path: &str) -> Vec<&RecordedCall> {
        self.calls.iter().filter(|c| c.path == path).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ADMIN: UserId = 1;
    const USER: UserId = 10;

    fn ledger_with_user() -> Ledger {
        let mut ledger = Ledger::new(ADMIN);
        ledger.upsert_user(USER, "alice");
        ledger
    }

    #[test]
    fn unknown_user_has_no_balance() {
        let ledger = Ledger::new(ADMIN);
        assert_eq!(ledger.balance(USER), Err(LedgerError::UserNotFound));
    }

    #[test]
    fn upsert_keeps_balance() {
        let mut ledger = ledger_with_user();
        ledger.add_balance(ADMIN, USER, 5.0, 0.0, 0).unwrap();
        ledger.upsert_user(USER, "alice2");
        assert_eq!(ledger.balance(USER).unwrap().usdt, Some(5.0));
        assert_eq!(ledger.user(USER).unwrap().username, "alice2");
    }

    #[test]
    fn deposit_validation() {
        let mut ledger = ledger_with_user();
        assert_eq!(ledger.deposit_request(USER, "btc", 1.0), Err(LedgerError::BadCurrency));
        assert_eq!(ledger.deposit_request(USER, "usdt", 0.0), Err(LedgerError::NonPositiveAmount));
        assert_eq!(ledger.deposit_request(99, "usdt", 1.0), Err(LedgerError::UserNotFound));
        assert_eq!(ledger.deposit_request(USER, " USDT ", 1.0), Ok(1));
        assert_eq!(ledger.deposit_request(USER, "rub", 1.0), Ok(2));
    }

    #[test]
    fn withdraw_needs_funds() {
        let mut ledger = ledger_with_user();
        assert_eq!(
            ledger.withdraw_request(USER, "rub", 1.0),
            Err(LedgerError::InsufficientFunds(Currency::RUB))
        );
        ledger.add_balance(ADMIN, USER, 0.0, 3.0, 0).unwrap();
        assert_eq!(ledger.withdraw_request(USER, "rub", 1.0), Ok(1));
    }

    #[test]
    fn approve_deposit_credits_and_leaves_queue() {
        let mut ledger = ledger_with_user();
        let id = ledger.deposit_request(USER, "uzs", 1500.0).unwrap();
        assert_eq!(ledger.pending(ADMIN).unwrap().len(), 1);
        assert_eq!(
            ledger.decision(ADMIN, "deposit", id, "approve"),
            Ok(RequestStatus::Approved)
        );
        assert_eq!(ledger.balance(USER).unwrap().uzs, Some(1500.0));
        assert!(ledger.pending(ADMIN).unwrap().is_empty());
        assert_eq!(
            ledger.decision(ADMIN, "deposit", id, "approve"),
            Err(LedgerError::AlreadyProcessed)
        );
    }

    #[test]
    fn approve_withdraw_rechecks_funds() {
        let mut ledger = ledger_with_user();
        ledger.add_balance(ADMIN, USER, 10.0, 0.0, 0).unwrap();
        let first = ledger.withdraw_request(USER, "usdt", 8.0).unwrap();
        let second = ledger.withdraw_request(USER, "usdt", 8.0).unwrap();
        ledger.decision(ADMIN, "withdraw", first, "approve").unwrap();
        assert_eq!(
            ledger.decision(ADMIN, "withdraw", second, "approve"),
            Err(LedgerError::InsufficientFunds(Currency::USDT))
        );
        assert_eq!(
            ledger.decision(ADMIN, "withdraw", second, "reject"),
            Ok(RequestStatus::Rejected)
        );
        assert_eq!(ledger.balance(USER).unwrap().usdt, Some(2.0));
    }

    #[test]
    fn admin_routes_check_admin() {
        let mut ledger = ledger_with_user();
        assert_eq!(ledger.pending(USER), Err(LedgerError::NotAdmin));
        assert_eq!(ledger.decision(USER, "deposit", 1, "approve"), Err(LedgerError::NotAdmin));
        assert_eq!(ledger.decision(ADMIN, "swap", 1, "approve"), Err(LedgerError::BadRequestType));
        assert_eq!(ledger.decision(ADMIN, "deposit", 1, "maybe"), Err(LedgerError::BadAction));
        assert_eq!(ledger.decision(ADMIN, "deposit", 1, "approve"), Err(LedgerError::RequestNotFound));
    }

    #[test]
    fn history_is_newest_first_across_tables() {
        let mut ledger = ledger_with_user();
        ledger.add_balance(ADMIN, USER, 10.0, 0.0, 0).unwrap();
        ledger.deposit_request(USER, "usdt", 1.0).unwrap();
        ledger.withdraw_request(USER, "usdt", 2.0).unwrap();
        ledger.deposit_request(USER, "rub", 3.0).unwrap();
        let kinds: Vec<_> = ledger
            .history(USER)
            .into_iter()
            .map(|i| (i.kind, i.amount))
            .collect();
        assert_eq!(
            kinds,
            vec![
                ("deposit".to_owned(), 3.0),
                ("withdraw".to_owned(), 2.0),
                ("deposit".to_owned(), 1.0)
            ]
        );
        assert!(ledger.history(99).is_empty());
    }
}
