//! Tournament points (TP) earned from placements, and the rank tiers derived
//! from them.

pub mod ledger;

pub use ledger::{Award, PointsLedger, Rank};
