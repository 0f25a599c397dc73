//! # Timeline Core
//!
//! Domain types, error taxonomy and the pure scheduling rules of the booking
//! platform. Nothing in this crate touches the database: persistence is
//! reached through the traits in [`store`], implemented by `timeline-db`.

pub mod errors;
pub mod models;
pub mod scheduling;
pub mod store;
