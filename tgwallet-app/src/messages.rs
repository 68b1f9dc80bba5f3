use tgwallet_api::domain::Language;

/// Localized strings shown by the view controller
#[derive(Debug)]
pub struct Messages {
    pub currency_prompt: &'static str,
    pub amount_prompt: &'static str,
    pub invalid_input: &'static str,
    pub deposit_sent: &'static str,
    pub withdraw_sent: &'static str,
    pub request_failed: &'static str,
    pub withdraw_failed: &'static str,
    pub decision_done: &'static str,
    pub registered: &'static str,
    pub network_error: &'static str,
    pub loading: &'static str,
    pub history_title: &'static str,
    pub history_empty: &'static str,
    pub pending_title: &'static str,
    pub pending_empty: &'static str,
    pub user_label: &'static str,
    pub approve: &'static str,
    pub reject: &'static str,
}

pub const UZBEK: Messages = Messages {
    currency_prompt: "Valyuta: usdt / rub / uzs",
    amount_prompt: "Miqdor:",
    invalid_input: "❌ Noto‘g‘ri ma’lumot",
    deposit_sent: "✅ Deposit so‘rovi yuborildi (pending)",
    withdraw_sent: "✅ Withdraw so‘rovi yuborildi (pending)",
    request_failed: "❌ Xatolik",
    withdraw_failed: "❌ Xatolik (balans yetmasligi mumkin)",
    decision_done: "✅ Bajarildi",
    registered: "✅ Ro‘yxatdan o‘tildi",
    network_error: "❌ Server bilan aloqa yo‘q",
    loading: "Yuklanmoqda...",
    history_title: "Tarix",
    history_empty: "Tarix bo‘sh",
    pending_title: "Admin: Pending",
    pending_empty: "Pending so‘rov yo‘q",
    user_label: "user",
    approve: "✅ Approve",
    reject: "❌ Reject",
};

pub const ENGLISH: Messages = Messages {
    currency_prompt: "Currency: usdt / rub / uzs",
    amount_prompt: "Amount:",
    invalid_input: "❌ Invalid data",
    deposit_sent: "✅ Deposit request sent (pending)",
    withdraw_sent: "✅ Withdraw request sent (pending)",
    request_failed: "❌ Error",
    withdraw_failed: "❌ Error (balance may be insufficient)",
    decision_done: "✅ Done",
    registered: "✅ Registered",
    network_error: "❌ Server is unreachable",
    loading: "Loading...",
    history_title: "History",
    history_empty: "History is empty",
    pending_title: "Admin: Pending",
    pending_empty: "No pending requests",
    user_label: "user",
    approve: "✅ Approve",
    reject: "❌ Reject",
};

impl Messages {
    pub fn for_language(lang: Language) -> &'static Messages {
        match lang {
            Language::Uzbek => &UZBEK,
            Language::English => &ENGLISH,
        }
    }
}
