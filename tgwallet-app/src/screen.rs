use tgwallet_api::domain::Currency;
use tgwallet_api::types::{Balance, Decision, DecisionAction, HistoryItem, PendingItem};

/// Approve or reject control bound to one pending item
pub type DecisionControl = Decision;

/// Amounts are shown in the shortest form that round-trips: `10`, `12.5`
pub fn fmt_amount(amount: f64) -> String {
    amount.to_string()
}

/// Text of the three balance cells
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalanceView {
    pub usdt: String,
    pub rub: String,
    pub uzs: String,
}

impl Default for BalanceView {
    fn default() -> Self {
        BalanceView {
            usdt: "…".to_owned(),
            rub: "…".to_owned(),
            uzs: "…".to_owned(),
        }
    }
}

impl From<&Balance> for BalanceView {
    fn from(balance: &Balance) -> Self {
        BalanceView {
            usdt: fmt_amount(balance.by_currency(Currency::USDT)),
            rub: fmt_amount(balance.by_currency(Currency::RUB)),
            uzs: fmt_amount(balance.by_currency(Currency::UZS)),
        }
    }
}

/// Content of the shared panel below the buttons
#[derive(Debug, Clone, PartialEq)]
pub enum Panel {
    Hidden,
    Loading,
    Failed,
    HistoryEmpty,
    History(Vec<HistoryItem>),
    PendingEmpty,
    Pending(Vec<PendingItem>),
}

impl Panel {
    pub fn history(items: Vec<HistoryItem>) -> Self {
        if items.is_empty() {
            Panel::HistoryEmpty
        } else {
            Panel::History(items)
        }
    }

    pub fn pending(items: Vec<PendingItem>) -> Self {
        if items.is_empty() {
            Panel::PendingEmpty
        } else {
            Panel::Pending(items)
        }
    }

    pub fn is_visible(&self) -> bool {
        *self != Panel::Hidden
    }
}

/// Everything the page shows. Mutated only by the controller.
#[derive(Debug, Clone, PartialEq)]
pub struct Screen {
    pub user_label: String,
    pub balance: BalanceView,
    pub admin_visible: bool,
    pub panel: Panel,
}

impl Default for Screen {
    fn default() -> Self {
        Screen {
            user_label: String::new(),
            balance: BalanceView::default(),
            admin_visible: false,
            panel: Panel::Hidden,
        }
    }
}

impl Screen {
    /// Controls of the pending list, approve then reject per item, in list order
    pub fn controls(&self) -> Vec<DecisionControl> {
        match &self.panel {
            Panel::Pending(items) => items
                .iter()
                .flat_map(|item| {
                    [
                        item.decision(DecisionAction::Approve),
                        item.decision(DecisionAction::Reject),
                    ]
                })
                .collect(),
            _ => vec![],
        }
    }

    /// Finds the control the user picked; stale or forged choices are ignored
    pub fn control(&self, choice: &DecisionControl) -> Option<DecisionControl> {
        self.controls().into_iter().find(|c| c == choice)
    }
}
