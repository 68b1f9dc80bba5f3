use log::*;
use std::sync::Arc;
use tokio::sync::Mutex;

use tgwallet_api::domain::{InitData, UserRef};
use tgwallet_api::types::{Balance, BalanceTopUp, OperationRequest};
use tgwallet_client::client::{self, WalletClient};

use crate::config::{AdminGate, AppConfig};
use crate::error::Result;
use crate::form::ask_currency_amount;
use crate::host::Host;
use crate::messages::Messages;
use crate::render::Renderer;
use crate::screen::{BalanceView, DecisionControl, Panel, Screen};

/// Which branch an action ended in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    /// Backend accepted the call
    Done,
    /// Backend answered with a non-success status
    Rejected(u16),
    /// User input did not make a valid request, nothing was sent
    Invalid,
    /// No usable answer: transport failure or undecodable body
    Failed,
}

/// Wires host input and the screen to backend calls. Handlers are independent
/// and may overlap; the last response to arrive wins the panel.
pub struct ViewController<H: Host> {
    host: H,
    client: WalletClient,
    gate: AdminGate,
    messages: &'static Messages,
    renderer: Renderer,
    init_data: InitData,
    screen: Arc<Mutex<Screen>>,
}

impl<H: Host> ViewController<H> {
    /// Signals readiness to the host and resolves the identity it injected
    pub fn new(host: H, config: &AppConfig) -> Result<Self> {
        let messages = Messages::for_language(config.language);
        host.ready();
        let init_data = host.init_data();
        if !init_data.user_ref().is_resolved() {
            warn!("Host gave no user, requests will carry an undefined identity");
        }
        Ok(ViewController {
            host,
            client: WalletClient::new(&config.api_url),
            gate: config.admin_gate(),
            messages,
            renderer: Renderer::new(messages)?,
            init_data,
            screen: Arc::new(Mutex::new(Screen::default())),
        })
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn user_ref(&self) -> UserRef {
        self.init_data.user_ref()
    }

    pub fn is_admin_visible(&self) -> bool {
        self.gate.is_visible_for(self.user_ref())
    }

    pub async fn screen(&self) -> Screen {
        self.screen.lock().await.clone()
    }

    pub async fn screen_text(&self) -> Result<String> {
        let screen = self.screen().await;
        self.renderer.screen_text(&screen)
    }

    pub async fn panel_html(&self) -> Result<String> {
        let screen = self.screen().await;
        self.renderer.panel_html(&screen.panel)
    }

    async fn set_panel(&self, panel: Panel) {
        self.screen.lock().await.panel = panel;
    }

    pub async fn check_backend(&self) -> Result<()> {
        Ok(self.client.ping().await?)
    }

    /// Writes the user label and admin visibility, then loads balances
    pub async fn start(&self) -> ActionOutcome {
        {
            let mut screen = self.screen.lock().await;
            screen.user_label = self.init_data.display_name();
            screen.admin_visible = self.is_admin_visible();
        }
        self.load_balance().await
    }

    /// Missing fields and rejected responses render as zero. A transport
    /// failure keeps the previous values.
    pub async fn load_balance(&self) -> ActionOutcome {
        let (balance, outcome) = match self.client.get_balance(self.user_ref()).await {
            Ok(balance) => (balance, ActionOutcome::Done),
            Err(client::Error::Reqwest(e)) => {
                error!("Failed to load balance: {e}");
                self.host.show_alert(self.messages.network_error);
                return ActionOutcome::Failed;
            }
            Err(err) => {
                warn!("Balance not available for {}: {err}", self.user_ref());
                let outcome = err
                    .status()
                    .map(|s| ActionOutcome::Rejected(s.as_u16()))
                    .unwrap_or(ActionOutcome::Failed);
                (Balance::default(), outcome)
            }
        };
        self.screen.lock().await.balance = BalanceView::from(&balance);
        outcome
    }

    pub fn ask_currency_amount(&self) -> Option<OperationRequest> {
        match ask_currency_amount(&self.host, self.messages) {
            Ok(req) => Some(req),
            Err(e) => {
                debug!("Request form abandoned: {e}");
                None
            }
        }
    }

    fn report(
        &self,
        action: &str,
        res: client::Result<()>,
        done_msg: &str,
        rejected_msg: &str,
    ) -> ActionOutcome {
        match res {
            Ok(()) => {
                info!("{action} accepted");
                self.host.show_alert(done_msg);
                ActionOutcome::Done
            }
            Err(err) => match err.status() {
                Some(status) => {
                    warn!("{action} rejected: {err}");
                    self.host.show_alert(rejected_msg);
                    ActionOutcome::Rejected(status.as_u16())
                }
                None => {
                    error!("{action} failed: {err}");
                    self.host.show_alert(self.messages.network_error);
                    ActionOutcome::Failed
                }
            },
        }
    }

    /// Balance is not refreshed afterwards, the request stays pending
    pub async fn deposit(&self) -> ActionOutcome {
        let req = match self.ask_currency_amount() {
            Some(req) => req,
            None => {
                self.host.show_alert(self.messages.invalid_input);
                return ActionOutcome::Invalid;
            }
        };
        let res = self.client.deposit_request(self.user_ref(), &req).await;
        self.report(
            "Deposit request",
            res,
            self.messages.deposit_sent,
            self.messages.request_failed,
        )
    }

    pub async fn withdraw(&self) -> ActionOutcome {
        let req = match self.ask_currency_amount() {
            Some(req) => req,
            None => {
                self.host.show_alert(self.messages.invalid_input);
                return ActionOutcome::Invalid;
            }
        };
        let res = self.client.withdraw_request(self.user_ref(), &req).await;
        self.report(
            "Withdraw request",
            res,
            self.messages.withdraw_sent,
            self.messages.withdraw_failed,
        )
    }

    async fn show_list_failure(&self, what: &str, err: client::Error) -> ActionOutcome {
        self.set_panel(Panel::Failed).await;
        match err.status() {
            Some(status) => {
                warn!("{what} rejected: {err}");
                self.host.show_alert(self.messages.request_failed);
                ActionOutcome::Rejected(status.as_u16())
            }
            None => {
                error!("{what} failed: {err}");
                self.host.show_alert(self.messages.network_error);
                ActionOutcome::Failed
            }
        }
    }

    /// Items are shown in the order the backend sent them
    pub async fn history(&self) -> ActionOutcome {
        self.set_panel(Panel::Loading).await;
        match self.client.get_history(self.user_ref()).await {
            Ok(items) => {
                debug!("History has {} items", items.len());
                self.set_panel(Panel::history(items)).await;
                ActionOutcome::Done
            }
            Err(err) => self.show_list_failure("History", err).await,
        }
    }

    /// Fetches the queue with the configured admin id, whoever the user is
    pub async fn admin_pending(&self) -> ActionOutcome {
        if !self.is_admin_visible() {
            warn!("Admin queue requested by {}", self.user_ref());
        }
        self.set_panel(Panel::Loading).await;
        match self.client.admin_pending(self.gate.admin_id()).await {
            Ok(items) => {
                debug!("{} pending requests", items.len());
                self.set_panel(Panel::pending(items)).await;
                ActionOutcome::Done
            }
            Err(err) => self.show_list_failure("Pending list", err).await,
        }
    }

    /// Posts the verdict, then reloads balances whatever the outcome. The
    /// pending list is not refetched.
    pub async fn decision(&self, control: DecisionControl) -> ActionOutcome {
        let res = self
            .client
            .admin_decision(self.gate.admin_id(), &control)
            .await;
        let outcome = self.report(
            &format!("Decision {} on {} {}", control.action, control.req_type, control.req_id),
            res,
            self.messages.decision_done,
            self.messages.request_failed,
        );
        self.load_balance().await;
        outcome
    }

    /// Registers the host user with the backend, as the bot does on `/start`
    pub async fn register(&self) -> ActionOutcome {
        let username = self
            .init_data
            .user
            .as_ref()
            .and_then(|u| u.username.clone())
            .unwrap_or_default();
        let res = self.client.upsert_user(self.user_ref(), &username).await;
        self.report(
            "Registration",
            res,
            self.messages.registered,
            self.messages.request_failed,
        )
    }

    pub async fn add_balance(&self, top_up: BalanceTopUp) -> ActionOutcome {
        let res = self
            .client
            .admin_add_balance(self.gate.admin_id(), &top_up)
            .await;
        self.report(
            &format!("Top-up of {}", top_up.user_id),
            res,
            self.messages.decision_done,
            self.messages.request_failed,
        )
    }
}
