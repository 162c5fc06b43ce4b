pub mod config;
pub mod console;
pub mod gateway;
pub mod machine;
pub mod models;
