use dotenvy::dotenv;
use log::{error, info};
use std::env;
use tokio::io::{AsyncBufReadExt, BufReader};

use vending::config::{Config, BASE_URL_VAR};
use vending::console::{self, Reply};
use vending::gateway::client::HttpGateway;
use vending::machine::VendingMachine;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env file
    dotenv().ok();
    // Set logging levels if not already set
    if env::var_os("RUST_LOG").is_none() {
        env::set_var("RUST_LOG", "vending=debug");
    }

    // Initialize tracing with previously set logging levels
    tracing_subscriber::fmt::init();

    let config = Config::from_env()?;
    if config.base_url.is_none() {
        error!(
            "{} is not defined in the environment. Please check your .env file.",
            BASE_URL_VAR
        );
    }

    let gateway = HttpGateway::new(config.base_url.clone());
    let mut machine = VendingMachine::new(gateway, config.reset_delay);
    info!(
        "Vending machine initialized against {}",
        config.base_url.as_deref().unwrap_or("<unset>")
    );

    machine.fetch_initial_data().await;
    println!("{}", console::render_inventory(machine.inventory()));
    println!("{}", console::render_display(&machine));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let line = match line? {
                    Some(line) => line,
                    None => break,
                };
                if line.trim().is_empty() {
                    continue;
                }
                match console::parse(&line) {
                    Ok(command) => match console::run(&mut machine, command).await {
                        Reply::Show(text) => println!("{text}"),
                        Reply::Quit => break,
                    },
                    Err(message) => println!("{message}"),
                }
            }
            _ = machine.wait_for_reset() => {
                println!("{}", console::render_display(&machine));
            }
        }
    }

    info!("Shutting down");
    Ok(())
}
