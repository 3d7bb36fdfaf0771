//! `coinshop-accounts` — account identity and balance rules.

pub mod account;

pub use account::{Account, Credential, STARTING_BALANCE, validate_name};
