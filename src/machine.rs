use crate::gateway::InventoryGateway;
use crate::models::{Drink, InventoryResponse, MachineBalance};
use log::{debug, error, info, warn};
use std::time::Duration;
use tokio::time::Instant;

pub mod event;
pub mod session;

pub use event::{Event, Rejection};
pub use session::{CustomerSession, Outcome, Receipt};

pub const CLEAR_KEY: &str = "Clear";
pub const SLOT_CODE_LEN: usize = 2;
pub const DEFAULT_RESET_DELAY: Duration = Duration::from_secs(2);

/// Everything the backend last told us about the machine.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub drinks: Vec<Drink>,
    pub balance: MachineBalance,
}

impl From<InventoryResponse> for Snapshot {
    fn from(inventory: InventoryResponse) -> Self {
        Snapshot {
            drinks: inventory.drinks,
            balance: MachineBalance {
                coins: inventory.coins,
                cash: inventory.cash,
            },
        }
    }
}

impl Snapshot {
    #[must_use]
    pub fn find(&self, slot: &str) -> Option<&Drink> {
        self.drinks.iter().find(|drink| drink.slot == slot)
    }
}

pub struct VendingMachine<G> {
    gateway: G,
    snapshot: Snapshot,
    is_loading: bool,
    load_error: Option<String>,
    session: CustomerSession,
    message: String,
    reset_delay: Duration,
    reset_deadline: Option<Instant>,
}

impl<G: InventoryGateway> VendingMachine<G> {
    pub fn new(gateway: G, reset_delay: Duration) -> Self {
        VendingMachine {
            gateway,
            snapshot: Snapshot::default(),
            is_loading: true,
            load_error: None,
            session: CustomerSession::default(),
            message: Event::Welcome.to_string(),
            reset_delay,
            reset_deadline: None,
        }
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn session(&self) -> &CustomerSession {
        &self.session
    }

    pub fn inventory(&self) -> &[Drink] {
        &self.snapshot.drinks
    }

    pub fn balance(&self) -> MachineBalance {
        self.snapshot.balance
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    pub fn has_pending_reset(&self) -> bool {
        self.reset_deadline.is_some()
    }

    fn emit(&mut self, event: Event) {
        self.message = event.to_string();
        debug!("{:?} -> \"{}\"", event, self.message);
    }

    fn price_of(&self, slot: &str) -> Option<f64> {
        self.snapshot.find(slot).map(|drink| drink.price)
    }

    // A new customer action inside the post-purchase display window finishes
    // the previous transaction right away instead of letting the timer clobber it later
    fn settle_pending_reset(&mut self) {
        if self.reset_deadline.take().is_some() {
            info!("Reset delay cut short by a new operation, starting a fresh transaction");
            self.session = CustomerSession::default();
        }
    }

    pub fn reset_transaction(&mut self) {
        self.reset_deadline = None;
        self.session = CustomerSession::default();
    }

    pub fn notify(&mut self, message: impl Into<String>) {
        self.emit(Event::Notice(message.into()));
    }

    pub async fn fetch_initial_data(&mut self) {
        self.is_loading = true;
        self.load_error = None;

        match self.gateway.fetch_inventory().await {
            Ok(inventory) => {
                self.snapshot = Snapshot::from(inventory);
                self.is_loading = false;
                debug!(
                    "Loaded {} drinks, machine holds {} in coins and {} in cash",
                    self.snapshot.drinks.len(),
                    self.snapshot.balance.coins,
                    self.snapshot.balance.cash
                );
            }
            Err(e) => {
                error!("Error fetching initial data: {}", e);
                self.is_loading = false;
                self.load_error = Some(e.to_string());
                self.emit(Event::LoadFailed(e));
            }
        }
    }

    pub fn select_slot(&mut self, slot: &str) {
        self.settle_pending_reset();

        let price = self.price_of(slot);
        self.session.selected_slot = Some(slot.to_string());
        self.session.keypad_input = slot.to_string();
        self.session.selected_drink_price = price;
        self.emit(Event::Selected {
            slot: slot.to_string(),
            price,
        });
    }

    pub fn handle_keypad_press(&mut self, key: &str) {
        self.settle_pending_reset();
        self.session.last_outcome = None;

        if key == CLEAR_KEY {
            self.session.keypad_input.clear();
            self.emit(Event::InputCleared);
            return;
        }

        if key.chars().count() != 1 {
            warn!("Rejecting key '{}', keys are a single character", key);
            self.emit(Event::Rejected(Rejection::InvalidKey));
            return;
        }

        if self.session.keypad_input.chars().count() >= SLOT_CODE_LEN {
            warn!(
                "Rejecting key '{}', keypad already holds '{}'",
                key, self.session.keypad_input
            );
            self.emit(Event::Rejected(Rejection::KeypadFull));
            return;
        }

        self.session.keypad_input.push_str(key);
        let input = self.session.keypad_input.clone();
        let price = self.price_of(&input);
        self.session.selected_drink_price = price;

        if input.chars().count() == SLOT_CODE_LEN {
            self.emit(Event::Selected { slot: input, price });
        } else {
            self.emit(Event::Typing(input));
        }
    }

    pub fn insert_coin(&mut self, amount: u32) {
        self.settle_pending_reset();

        if !self.session.add_coins(amount) {
            warn!(
                "Rejecting {} in coins, total of {} cannot grow further",
                amount, self.session.payment_total
            );
            self.emit(Event::Rejected(Rejection::PaymentOverflow));
            return;
        }
        self.session.last_outcome = None;
        self.session.selected_drink_price = None;
        let total = self.session.payment_total;
        self.emit(Event::CoinInserted { amount, total });
    }

    pub fn insert_cash(&mut self, amount: u32) {
        self.settle_pending_reset();

        if !self.session.add_cash(amount) {
            warn!(
                "Rejecting {} in cash, total of {} cannot grow further",
                amount, self.session.payment_total
            );
            self.emit(Event::Rejected(Rejection::PaymentOverflow));
            return;
        }
        self.session.last_outcome = None;
        self.session.selected_drink_price = None;
        let total = self.session.payment_total;
        self.emit(Event::CashInserted { amount, total });
    }

    pub fn eject_money(&mut self) {
        self.settle_pending_reset();

        if self.session.payment_total == 0 {
            warn!("Nothing to eject");
            self.emit(Event::Rejected(Rejection::NothingToEject));
            return;
        }

        let amount = self.session.take_payment();
        self.session.last_outcome = Some(Outcome::Ejected(amount));
        self.session.selected_slot = None;
        self.session.keypad_input.clear();
        info!("Returned {} to the customer", amount);
        self.emit(Event::Ejected(amount));
    }

    pub async fn buy_drink(&mut self) {
        self.settle_pending_reset();
        self.session.last_outcome = None;

        if self.session.keypad_input.is_empty() {
            warn!("Rejecting purchase, no slot selected");
            self.emit(Event::Rejected(Rejection::NoSlot));
            return;
        }
        if self.session.payment_total == 0 {
            warn!(
                "Rejecting purchase of {}, no money inserted",
                self.session.keypad_input
            );
            self.emit(Event::Rejected(Rejection::NoPayment));
            return;
        }

        let slot = self.session.keypad_input.clone();
        let payment = self.session.payment();
        self.emit(Event::Processing(slot.clone()));

        match self.gateway.buy_drink(&slot, payment).await {
            Ok(purchase) => {
                info!(
                    "Dispensed {} from slot {}, change {:.2}",
                    purchase.purchased_drink.name, slot, purchase.change
                );
                let event = Event::Dispensed {
                    name: purchase.purchased_drink.name.clone(),
                    change: purchase.change,
                };
                self.session.last_outcome = Some(Outcome::Dispensed(Receipt::new(
                    purchase.purchased_drink,
                    purchase.change,
                )));
                self.emit(event);

                self.fetch_initial_data().await;
                self.reset_deadline = Some(Instant::now() + self.reset_delay);
            }
            Err(e) => {
                error!("Purchase of slot {} failed: {}", slot, e);
                self.emit(Event::PurchaseFailed(e));
            }
        }
    }

    pub async fn refill_drink(&mut self, slot: &str) {
        self.emit(Event::Refilling(slot.to_string()));

        match self.gateway.refill_drink(slot).await {
            Ok(refill) => {
                info!(
                    "Refilled slot {} (new quantity {:?})",
                    slot, refill.new_quantity
                );
                self.emit(Event::Refilled(refill.message));
                self.fetch_initial_data().await;
            }
            Err(e) => {
                error!("Refill of slot {} failed: {}", slot, e);
                self.emit(Event::RefillFailed(e));
            }
        }
    }

    /// Resolves once the post-purchase display delay elapses, then resets the session.
    /// Never resolves while no reset is pending, so it can sit in a `select!` loop.
    pub async fn wait_for_reset(&mut self) {
        match self.reset_deadline {
            Some(deadline) => {
                tokio::time::sleep_until(deadline).await;
                self.reset_deadline = None;
                info!("Display delay elapsed, resetting transaction");
                self.session = CustomerSession::default();
                self.emit(Event::ThankYou);
            }
            None => std::future::pending::<()>().await,
        }
    }
}
