//! SeaORM entities mirroring the tables created by the `migration` crate.

pub mod task;
pub mod user;
