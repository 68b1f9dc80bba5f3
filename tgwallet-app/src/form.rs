use tgwallet_api::domain::FormError;
use tgwallet_api::types::OperationRequest;

use crate::host::Host;
use crate::messages::Messages;

pub const DEFAULT_CURRENCY: &str = "usdt";
pub const DEFAULT_AMOUNT: &str = "10";

/// Two-step currency and amount input. Both prompts are always asked, the
/// answers are validated together afterwards.
pub fn ask_currency_amount<H: Host + ?Sized>(
    host: &H,
    messages: &Messages,
) -> Result<OperationRequest, FormError> {
    let currency = host.prompt(messages.currency_prompt, DEFAULT_CURRENCY);
    let amount = host.prompt(messages.amount_prompt, DEFAULT_AMOUNT);
    match (currency, amount) {
        (Some(currency), Some(amount)) => OperationRequest::parse(&currency, &amount),
        _ => Err(FormError::Cancelled),
    }
}
