pub mod chat;
pub mod host;
pub mod onboard;
