// Adapters layer: concrete implementations of the domain ports (http, notifications).

pub mod http;
pub mod notify;
