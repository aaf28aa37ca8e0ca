//! Wire and domain types shared between the registry backend contract and its clients.

pub mod domain;
pub mod error;
pub mod protocol;
