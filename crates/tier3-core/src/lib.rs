#![warn(clippy::unwrap_used)]

//! Domain types shared by every stage of the Tier 3 decision pipeline:
//! loyalty identifiers, customer/daily-count records, catalog and
//! allowance data, basket lines at each stage of enrichment, rewards,
//! and the age-verification audit record.

pub mod avt;
pub mod basket;
pub mod catalog;
pub mod clock;
pub mod config;
pub mod customer;
pub mod error;
pub mod lid;
pub mod money;
pub mod reward;

pub use clock::Clock;
pub use config::AppConfig;
pub use error::{EngineError, EngineResult};
pub use lid::LoyaltyId;
