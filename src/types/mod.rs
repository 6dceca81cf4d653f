pub mod holding;
pub mod user;
