//! AI chatbot module - relays chat messages to the completion API.

mod context;
mod conversation;
mod handler;
mod mention;
mod response;

pub use conversation::generate_reply;
pub use handler::message_endpoint;
pub use mention::{ChatScope, prepare_prompt};
