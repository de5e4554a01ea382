pub mod bot;
mod callbacks;
pub mod chatbot;
mod commands;
pub mod completion;
pub mod config;
pub mod error;
pub mod history;
pub mod markdown;
pub mod models;
pub mod preferences;
pub mod types;

pub use bot::run;
