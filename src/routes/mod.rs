pub mod ai;
pub mod auth;
pub mod candidates;
pub mod health;
pub mod offers;
