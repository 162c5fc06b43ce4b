use crate::models::{Drink, Payment};
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, PartialEq)]
pub struct Receipt {
    pub drink: Drink,
    pub change: f64,
    pub dispensed_at: DateTime<Utc>,
}

impl Receipt {
    pub fn new(drink: Drink, change: f64) -> Self {
        Receipt {
            drink,
            change,
            dispensed_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Dispensed(Receipt),
    Ejected(u32),
}

/// One customer's in-progress interaction with the machine.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CustomerSession {
    pub selected_slot: Option<String>,
    pub keypad_input: String,
    pub payment_total: u32,
    pub payment_coins: u32,
    pub payment_cash: u32,
    pub selected_drink_price: Option<f64>,
    pub last_outcome: Option<Outcome>,
}

impl CustomerSession {
    #[must_use]
    pub fn payment(&self) -> Payment {
        Payment {
            coins: self.payment_coins,
            cash: self.payment_cash,
            total: self.payment_total,
        }
    }

    /// Leaves the session untouched and returns false if the total would overflow.
    pub(crate) fn add_coins(&mut self, amount: u32) -> bool {
        match (
            self.payment_coins.checked_add(amount),
            self.payment_total.checked_add(amount),
        ) {
            (Some(coins), Some(total)) => {
                self.payment_coins = coins;
                self.payment_total = total;
                true
            }
            _ => false,
        }
    }

    pub(crate) fn add_cash(&mut self, amount: u32) -> bool {
        match (
            self.payment_cash.checked_add(amount),
            self.payment_total.checked_add(amount),
        ) {
            (Some(cash), Some(total)) => {
                self.payment_cash = cash;
                self.payment_total = total;
                true
            }
            _ => false,
        }
    }

    /// Zeroes every accumulator and hands back what was inserted.
    pub(crate) fn take_payment(&mut self) -> u32 {
        let total = self.payment_total;
        self.payment_total = 0;
        self.payment_coins = 0;
        self.payment_cash = 0;
        total
    }
}
