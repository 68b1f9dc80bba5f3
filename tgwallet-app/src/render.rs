use handlebars::Handlebars;
use serde::Serialize;
use serde_json::json;

use tgwallet_api::domain::UserId;
use tgwallet_api::types::{HistoryItem, PendingItem};

use crate::error::Result;
use crate::messages::Messages;
use crate::screen::{fmt_amount, Panel, Screen};

const NOTICE: &str = "notice";
const HISTORY: &str = "history";
const PENDING: &str = "pending";
const SCREEN: &str = "screen";

#[derive(Serialize)]
struct HistoryRow<'a> {
    kind: String,
    currency: String,
    amount: String,
    status: &'a str,
    created_at: &'a str,
}

impl<'a> From<&'a HistoryItem> for HistoryRow<'a> {
    fn from(item: &'a HistoryItem) -> Self {
        HistoryRow {
            kind: item.kind.to_uppercase(),
            currency: item.currency.to_uppercase(),
            amount: fmt_amount(item.amount),
            status: &item.status,
            created_at: &item.created_at,
        }
    }
}

#[derive(Serialize)]
struct PendingRow<'a> {
    id: u64,
    kind: &'static str,
    kind_label: String,
    user_id: UserId,
    currency: String,
    amount: String,
    created_at: &'a str,
}

impl<'a> From<&'a PendingItem> for PendingRow<'a> {
    fn from(item: &'a PendingItem) -> Self {
        PendingRow {
            id: item.id,
            kind: item.kind.as_str(),
            kind_label: item.kind.as_str().to_uppercase(),
            user_id: item.user_id,
            currency: item.currency.to_uppercase(),
            amount: fmt_amount(item.amount),
            created_at: &item.created_at,
        }
    }
}

/// Renders the panel as page markup or as terminal text. Item fields are
/// escaped in markup.
pub struct Renderer {
    html: Handlebars<'static>,
    text: Handlebars<'static>,
    messages: &'static Messages,
}

impl Renderer {
    pub fn new(messages: &'static Messages) -> Result<Self> {
        let mut html = Handlebars::new();
        html.register_template_string(NOTICE, include_str!("../templates/notice.html.hbs"))?;
        html.register_template_string(HISTORY, include_str!("../templates/history.html.hbs"))?;
        html.register_template_string(PENDING, include_str!("../templates/pending.html.hbs"))?;

        let mut text = Handlebars::new();
        text.register_escape_fn(handlebars::no_escape);
        text.register_template_string(HISTORY, include_str!("../templates/history.txt.hbs"))?;
        text.register_template_string(PENDING, include_str!("../templates/pending.txt.hbs"))?;
        text.register_template_string(SCREEN, include_str!("../templates/screen.txt.hbs"))?;

        Ok(Renderer {
            html,
            text,
            messages,
        })
    }

    fn history_context(&self, items: &[HistoryItem]) -> serde_json::Value {
        let rows: Vec<HistoryRow> = items.iter().map(HistoryRow::from).collect();
        json!({ "title": self.messages.history_title, "rows": rows })
    }

    fn pending_context(&self, items: &[PendingItem]) -> serde_json::Value {
        let rows: Vec<PendingRow> = items.iter().map(PendingRow::from).collect();
        json!({
            "title": self.messages.pending_title,
            "rows": rows,
            "user_label": self.messages.user_label,
            "approve_label": self.messages.approve,
            "reject_label": self.messages.reject,
        })
    }

    fn notice_html(&self, message: &str) -> Result<String> {
        Ok(self.html.render(NOTICE, &json!({ "message": message }))?)
    }

    pub fn panel_html(&self, panel: &Panel) -> Result<String> {
        match panel {
            Panel::Hidden => Ok(String::new()),
            Panel::Loading => Ok(handlebars::html_escape(self.messages.loading)),
            Panel::Failed => self.notice_html(self.messages.request_failed),
            Panel::HistoryEmpty => self.notice_html(self.messages.history_empty),
            Panel::PendingEmpty => self.notice_html(self.messages.pending_empty),
            Panel::History(items) => Ok(self.html.render(HISTORY, &self.history_context(items))?),
            Panel::Pending(items) => Ok(self.html.render(PENDING, &self.pending_context(items))?),
        }
    }

    pub fn panel_text(&self, panel: &Panel) -> Result<String> {
        match panel {
            Panel::Hidden => Ok(String::new()),
            Panel::Loading => Ok(self.messages.loading.to_owned()),
            Panel::Failed => Ok(self.messages.request_failed.to_owned()),
            Panel::HistoryEmpty => Ok(self.messages.history_empty.to_owned()),
            Panel::PendingEmpty => Ok(self.messages.pending_empty.to_owned()),
            Panel::History(items) => Ok(self.text.render(HISTORY, &self.history_context(items))?),
            Panel::Pending(items) => Ok(self.text.render(PENDING, &self.pending_context(items))?),
        }
    }

    pub fn screen_text(&self, screen: &Screen) -> Result<String> {
        let context = json!({
            "user_label": screen.user_label,
            "balance": {
                "usdt": screen.balance.usdt,
                "rub": screen.balance.rub,
                "uzs": screen.balance.uzs,
            },
            "panel": self.panel_text(&screen.panel)?,
        });
        Ok(self.text.render(SCREEN, &context)?)
    }
}
