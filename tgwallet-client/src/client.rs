use log::*;
use reqwest::StatusCode;
use thiserror::Error;

use tgwallet_api::domain::{Currency, UserId, UserRef};
use tgwallet_api::types::{Balance, BalanceTopUp, Decision, History, HistoryItem, OperationRequest, Pending, PendingItem};

#[derive(Error, Debug)]
pub enum Error {
    #[error("Requesting server error: {0}")]
    Reqwest(#[from] reqwest::Error),
    #[error("JSON encoding/decoding error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Server responded with {status}: {body}")]
    Status { status: StatusCode, body: String },
}

impl Error {
    /// Status code when the server answered, `None` for transport and decoding failures
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Alias for a `Result` with the error type `self::Error`.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Clone)]
pub struct WalletClient {
    pub client: reqwest::Client,
    pub server: String,
}

impl WalletClient {
    pub fn new(url: &str) -> Self {
        WalletClient {
            client: reqwest::Client::new(),
            server: url.trim_end_matches('/').to_owned(),
        }
    }

    async fn send(&self, path: &str, request: reqwest::Request) -> Result<String> {
        let response = self.client.execute(request).await?;
        let status = response.status();
        let body = response.text().await?;
        debug!("Response {path}: {status} {body}");
        if status.is_success() {
            Ok(body)
        } else {
            Err(Error::Status { status, body })
        }
    }

    pub async fn ping(&self) -> Result<()> {
        let path = "/api/health";
        let endpoint = format!("{}{}", self.server, path);
        let request = self.client.get(endpoint).build()?;
        self.send(path, request).await?;
        Ok(())
    }

    /// Registers the user or refreshes the stored username
    pub async fn upsert_user(&self, user_id: UserRef, username: &str) -> Result<()> {
        let path = "/api/user/upsert";
        let endpoint = format!("{}{}", self.server, path);
        let request = self
            .client
            .post(endpoint)
            .query(&[("user_id", user_id.to_string()), ("username", username.to_owned())])
            .build()?;
        self.send(path, request).await?;
        Ok(())
    }

    pub async fn get_balance(&self, user_id: UserRef) -> Result<Balance> {
        let path = "/api/balance";
        let endpoint = format!("{}{}/{}", self.server, path, user_id);
        let request = self.client.get(endpoint).build()?;
        let response = self.send(path, request).await?;
        Ok(serde_json::from_str(&response)?)
    }

    pub async fn deposit_request(&self, user_id: UserRef, req: &OperationRequest) -> Result<()> {
        self.operation_request("/api/deposit/request", user_id, req).await
    }

    pub async fn withdraw_request(&self, user_id: UserRef, req: &OperationRequest) -> Result<()> {
        self.operation_request("/api/withdraw/request", user_id, req).await
    }

    async fn operation_request(
        &self,
        path: &str,
        user_id: UserRef,
        req: &OperationRequest,
    ) -> Result<()> {
        let endpoint = format!("{}{}", self.server, path);
        let request = self
            .client
            .post(endpoint)
            .query(&[
                ("user_id", user_id.to_string()),
                ("currency", req.currency.ticker_lowercase().to_owned()),
                ("amount", req.amount.to_string()),
            ])
            .build()?;
        self.send(path, request).await?;
        Ok(())
    }

    pub async fn get_history(&self, user_id: UserRef) -> Result<Vec<HistoryItem>> {
        let path = "/api/history";
        let endpoint = format!("{}{}/{}", self.server, path, user_id);
        let request = self.client.get(endpoint).build()?;
        let response = self.send(path, request).await?;
        let history: History = serde_json::from_str(&response)?;
        Ok(history.items)
    }

    pub async fn admin_pending(&self, admin_id: UserId) -> Result<Vec<PendingItem>> {
        let path = "/api/admin/pending";
        let endpoint = format!("{}{}", self.server, path);
        let request = self
            .client
            .get(endpoint)
            .query(&[("admin_id", admin_id)])
            .build()?;
        let response = self.send(path, request).await?;
        let pending: Pending = serde_json::from_str(&response)?;
        Ok(pending.items)
    }

    pub async fn admin_decision(&self, admin_id: UserId, decision: &Decision) -> Result<()> {
        let path = "/api/admin/decision";
        let endpoint = format!("{}{}", self.server, path);
        let request = self
            .client
            .post(endpoint)
            .query(&[
                ("admin_id", admin_id.to_string()),
                ("req_type", decision.req_type.to_string()),
                ("req_id", decision.req_id.to_string()),
                ("action", decision.action.to_string()),
            ])
            .build()?;
        self.send(path, request).await?;
        Ok(())
    }

    pub async fn admin_add_balance(&self, admin_id: UserId, top_up: &BalanceTopUp) -> Result<()> {
        let path = "/api/admin/add_balance";
        let endpoint = format!("{}{}", self.server, path);
        let request = self
            .client
            .post(endpoint)
            .query(&[
                ("admin_id", admin_id.to_string()),
                ("user_id", top_up.user_id.to_string()),
                (Currency::USDT.ticker_lowercase(), top_up.usdt.to_string()),
                (Currency::RUB.ticker_lowercase(), top_up.rub.to_string()),
                (Currency::UZS.ticker_lowercase(), top_up.uzs.to_string()),
            ])
            .build()?;
        self.send(path, request).await?;
        Ok(())
    }
}
