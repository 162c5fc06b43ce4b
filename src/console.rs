use crate::gateway::InventoryGateway;
use crate::machine::event::money;
use crate::machine::{Outcome, VendingMachine, CLEAR_KEY};
use crate::models::Drink;
use itertools::Itertools;
use lazy_static::lazy_static;
use log::debug;
use regex::Regex;

lazy_static! {
    static ref SLOT_CODE: Regex = Regex::new(r"^[A-Za-z][0-9]$").unwrap();
}

pub const COIN_DENOMINATIONS: [u32; 5] = [5, 10, 20, 50, 100];
pub const BILL_DENOMINATIONS: [u32; 6] = [20, 50, 100, 200, 500, 1000];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    List,
    Select(String),
    Key(String),
    Coin(u32),
    Cash(u32),
    Eject,
    Buy,
    Refill(String),
    Reload,
    Status,
    Help,
    Quit,
}

pub enum Reply {
    Show(String),
    Quit,
}

pub const HELP: &str = "Commands:
  list              show every slot
  select <slot>     pick a slot, e.g. select A1
  key <key>         press a keypad key (A, B, C, 1, 2, 3)
  clear             clear the keypad
  coin <amount>     insert a coin (5, 10, 20, 50, 100)
  cash <amount>     insert a bill (20, 50, 100, 200, 500, 1000)
  eject             return inserted money
  buy               buy the drink on the keypad
  refill <slot>     restock a slot
  reload            fetch inventory again
  status            show the display
  quit";

fn slot_code(arg: Option<&&str>) -> Result<String, String> {
    match arg {
        Some(slot) if SLOT_CODE.is_match(slot) => Ok(slot.to_ascii_uppercase()),
        Some(slot) => Err(format!(
            "'{slot}' is not a slot code, expected a row letter and a column digit like A1"
        )),
        None => Err(String::from("Make sure you provide a slot!")),
    }
}

fn denomination(arg: Option<&&str>, accepted: &[u32], kind: &str) -> Result<u32, String> {
    let amount = arg
        .and_then(|amount| amount.parse::<u32>().ok())
        .ok_or_else(|| format!("Make sure you provide the {kind} amount!"))?;
    if accepted.contains(&amount) {
        Ok(amount)
    } else {
        Err(format!(
            "PHP {amount} is not an accepted {kind}. Accepted: {}",
            accepted.iter().join(", ")
        ))
    }
}

pub fn parse(line: &str) -> Result<Command, String> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    let command = match parts.first() {
        Some(command) => command.to_ascii_lowercase(),
        None => return Err(String::from("Please specify a command")),
    };

    match command.as_str() {
        "list" | "ls" => Ok(Command::List),
        "select" => slot_code(parts.get(1)).map(Command::Select),
        "key" => match parts.get(1) {
            Some(key) if key.eq_ignore_ascii_case(CLEAR_KEY) => {
                Ok(Command::Key(CLEAR_KEY.to_string()))
            }
            Some(key) if key.chars().count() == 1 => Ok(Command::Key(key.to_ascii_uppercase())),
            Some(key) => Err(format!("'{key}' is not a key on the keypad")),
            None => Err(String::from("Make sure you provide a key!")),
        },
        "clear" => Ok(Command::Key(CLEAR_KEY.to_string())),
        "coin" => denomination(parts.get(1), &COIN_DENOMINATIONS, "coin").map(Command::Coin),
        "cash" | "bill" => {
            denomination(parts.get(1), &BILL_DENOMINATIONS, "bill").map(Command::Cash)
        }
        "eject" => Ok(Command::Eject),
        "buy" => Ok(Command::Buy),
        "refill" => slot_code(parts.get(1)).map(Command::Refill),
        "reload" => Ok(Command::Reload),
        "status" => Ok(Command::Status),
        "help" | "?" => Ok(Command::Help),
        "quit" | "exit" => Ok(Command::Quit),
        _ => Err(format!("Unknown command '{command}', try 'help'")),
    }
}

pub fn render_drink(drink: &Drink) -> String {
    let stock = if drink.is_out_of_stock() {
        String::from("Out of Stock")
    } else {
        format!("Stock: {}", drink.quantity)
    };
    format!(
        "{}  {:<16} {:>12}  {}{}",
        drink.slot,
        drink.name,
        money(drink.price),
        stock,
        if drink.needs_refill() { "  [refill]" } else { "" }
    )
}

pub fn render_inventory(drinks: &[Drink]) -> String {
    if drinks.is_empty() {
        return String::from("No drinks available in the machine.");
    }
    drinks.iter().map(render_drink).join("\n")
}

pub fn render_display<G: InventoryGateway>(machine: &VendingMachine<G>) -> String {
    let session = machine.session();
    let balance = machine.balance();
    let keypad = if session.keypad_input.is_empty() {
        "_ _"
    } else {
        session.keypad_input.as_str()
    };
    let outcome = match &session.last_outcome {
        Some(Outcome::Dispensed(receipt)) => format!(
            "\n  Tray: {} (change {}, {})",
            receipt.drink.name,
            money(receipt.change),
            receipt.dispensed_at.format("%H:%M:%S")
        ),
        Some(Outcome::Ejected(amount)) => {
            format!("\n  Coin return: {}", money(f64::from(*amount)))
        }
        None => String::new(),
    };

    format!(
        "[{}]\n  Inserted {} (coins: {}, cash: {})  Keypad: {}\n  Machine balance  coins: {}  cash: {}{}",
        machine.message(),
        money(f64::from(session.payment_total)),
        session.payment_coins,
        session.payment_cash,
        keypad,
        balance.coins,
        balance.cash,
        outcome
    )
}

pub async fn run<G: InventoryGateway>(machine: &mut VendingMachine<G>, command: Command) -> Reply {
    debug!("Running {:?}", command);
    match command {
        Command::List => {
            if let Some(error) = machine.load_error() {
                return Reply::Show(format!("Error: {error}\nTry 'reload'."));
            }
            return Reply::Show(render_inventory(machine.inventory()));
        }
        Command::Select(slot) => {
            let sold_out = machine
                .inventory()
                .iter()
                .any(|drink| drink.slot == slot && drink.is_out_of_stock());
            if sold_out {
                machine.notify(format!("Slot {slot} is out of stock."));
            } else {
                machine.select_slot(&slot);
            }
        }
        Command::Key(key) => machine.handle_keypad_press(&key),
        Command::Coin(amount) => machine.insert_coin(amount),
        Command::Cash(amount) => machine.insert_cash(amount),
        Command::Eject => machine.eject_money(),
        Command::Buy => machine.buy_drink().await,
        Command::Refill(slot) => machine.refill_drink(&slot).await,
        Command::Reload => {
            machine.fetch_initial_data().await;
            return Reply::Show(format!(
                "{}\n{}",
                render_inventory(machine.inventory()),
                render_display(machine)
            ));
        }
        Command::Status => {}
        Command::Help => return Reply::Show(HELP.to_string()),
        Command::Quit => return Reply::Quit,
    }
    Reply::Show(render_display(machine))
}
