//! OfficePlan Server - SpacetimeDB Module
//!
//! Hosted database for the office planner: buildings, floors, placed objects,
//! personnel and feedback. Reducers validate every edit with
//! `officeplan-logic`; clients are thin views over the public tables.

mod reducers;
mod tables;

pub use reducers::*;
pub use tables::*;
