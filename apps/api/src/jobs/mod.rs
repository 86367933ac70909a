pub mod handlers;
pub mod search;
pub mod service;
