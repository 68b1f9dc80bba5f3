use tgwallet_api::domain::InitData;

/// Environment that embeds the wallet view: the Telegram WebApp page, or a
/// terminal. Prompts block the caller until the user answers.
pub trait Host: Send + Sync {
    /// Lifecycle signal sent once the controller is wired
    fn ready(&self) {}

    /// Identity injected by the host. Unverified.
    fn init_data(&self) -> InitData;

    /// Asks for one line of input, `None` when the user cancels
    fn prompt(&self, message: &str, default: &str) -> Option<String>;

    /// Modal message
    fn show_alert(&self, message: &str);
}
