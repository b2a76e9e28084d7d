pub mod ai;
pub mod candidate;
pub mod offer;
pub mod user;
