pub mod browser;
pub mod observability;
pub mod persistence;
