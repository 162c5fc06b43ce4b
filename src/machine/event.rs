use crate::gateway::GatewayError;

pub const CURRENCY: &str = "PHP";

/// Local guard failures. Nothing is sent to the backend when one of these trips.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    NoSlot,
    NoPayment,
    KeypadFull,
    InvalidKey,
    PaymentOverflow,
    NothingToEject,
}

/// The transition that last touched the machine. Its `Display` output is the panel message.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Welcome,
    LoadFailed(GatewayError),
    Selected { slot: String, price: Option<f64> },
    Typing(String),
    InputCleared,
    Rejected(Rejection),
    CoinInserted { amount: u32, total: u32 },
    CashInserted { amount: u32, total: u32 },
    Ejected(u32),
    Processing(String),
    Dispensed { name: String, change: f64 },
    PurchaseFailed(GatewayError),
    Refilling(String),
    Refilled(String),
    RefillFailed(GatewayError),
    ThankYou,
    Notice(String),
}

pub fn money(amount: f64) -> String {
    format!("{CURRENCY} {amount:.2}")
}

impl std::fmt::Display for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Event::Welcome => write!(f, "Welcome! Please select a drink or insert money."),
            Event::LoadFailed(e) => write!(f, "Error: {e}"),
            Event::Selected {
                slot,
                price: Some(price),
            } => write!(f, "Selected: {slot}. Price: {}.", money(*price)),
            Event::Selected { slot, price: None } => write!(f, "Selected: {slot}. Item not found."),
            Event::Typing(input) => write!(f, "Keypad input: {input}"),
            Event::InputCleared => {
                write!(f, "Input cleared. Please select a drink or insert money.")
            }
            Event::Rejected(Rejection::NoSlot) => write!(f, "Please enter a slot or select a drink."),
            Event::Rejected(Rejection::NoPayment) => write!(f, "Please insert money first!"),
            Event::Rejected(Rejection::KeypadFull) => write!(f, "Max 2 characters for slot."),
            Event::Rejected(Rejection::InvalidKey) => write!(f, "Press one key at a time."),
            Event::Rejected(Rejection::PaymentOverflow) => {
                write!(f, "The machine cannot accept that much money.")
            }
            Event::Rejected(Rejection::NothingToEject) => write!(f, "No money to return."),
            Event::CoinInserted { amount, total } => write!(
                f,
                "Inserted {}. Total: {}",
                money(f64::from(*amount)),
                money(f64::from(*total))
            ),
            Event::CashInserted { amount, total } => write!(
                f,
                "Inserted {} bill. Total: {}",
                money(f64::from(*amount)),
                money(f64::from(*total))
            ),
            Event::Ejected(amount) => write!(
                f,
                "Returning {}. Transaction cancelled.",
                money(f64::from(*amount))
            ),
            Event::Processing(slot) => write!(f, "Processing purchase for '{slot}'..."),
            Event::Dispensed { name, change } => {
                write!(f, "Enjoy your {name}! Change: {}.", money(*change))
            }
            Event::PurchaseFailed(e) => write!(f, "Error: {e}"),
            Event::Refilling(slot) => write!(f, "Attempting to refill slot {slot}..."),
            Event::Refilled(message) => write!(f, "{message}"),
            Event::RefillFailed(e) => write!(f, "Refill Error: {e}"),
            Event::ThankYou => write!(
                f,
                "Thank you! Please make a new selection or insert coins."
            ),
            Event::Notice(message) => write!(f, "{message}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::Operation;

    #[test]
    fn amounts_render_with_two_decimals() {
        assert_eq!(
            Event::CashInserted {
                amount: 20,
                total: 25
            }
            .to_string(),
            "Inserted PHP 20.00 bill. Total: PHP 25.00"
        );
        assert_eq!(
            Event::Dispensed {
                name: String::from("Cola"),
                change: 2.5
            }
            .to_string(),
            "Enjoy your Cola! Change: PHP 2.50."
        );
    }

    #[test]
    fn gateway_failures_keep_their_operation_prefix() {
        let e = GatewayError::remote(Operation::Refill, "Slot B2 is already full");
        assert_eq!(
            Event::RefillFailed(e).to_string(),
            "Refill Error: Failed to refill drink: Slot B2 is already full"
        );
        assert_eq!(
            Event::LoadFailed(GatewayError::Configuration(Operation::FetchInventory)).to_string(),
            "Error: API Base URL is not configured. Cannot fetch inventory."
        );
    }
}
