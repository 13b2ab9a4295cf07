//! Game rules.

pub mod numble;
