//! Test organization:
//! - support.rs: mock senders and shared builders
//! - scenarios.rs: end-to-end outcome scenarios per target
//! - layering.rs: stack ordering, deadlines, cross-target independence
//! - persistence.rs: delivery log durability through the distributor

pub mod support;

mod layering;
mod persistence;
mod scenarios;
