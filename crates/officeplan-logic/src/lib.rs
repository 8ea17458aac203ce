//! Pure planning logic for OfficePlan.
//!
//! This crate contains all office-planning logic that is independent of any
//! database or renderer. Functions take plain data and return results, making
//! them unit-testable and usable from the SpacetimeDB module (WASM) and the
//! native simtest harness alike.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`capacity`] | Floor occupancy ratio, capacity tiers, heat colors |
//! | [`catalog`] | Zone types and menu furniture with fixed footprints |
//! | [`config`] | Planner configuration, env overrides and validation |
//! | [`constants`] | Persisted object type codes, thresholds, scene sizes |
//! | [`floor`] | Building/floor/object/personnel records and the floor plan |
//! | [`grid`] | Occupancy grid: all-or-nothing placement and whole-item removal |
//! | [`layout`] | Office layout JSON import/export, rasterizing and generation |
//! | [`mutation`] | Optimistic changes with commit/rollback |
//! | [`scene`] | Renderer-agnostic 3D scene nodes for floors and buildings |
//! | [`seating`] | Personnel seat assignment on workspace cells |
//! | [`validation`] | Shared validation finding type |

pub mod capacity;
pub mod catalog;
pub mod config;
pub mod constants;
pub mod floor;
pub mod grid;
pub mod layout;
pub mod mutation;
pub mod scene;
pub mod seating;
pub mod validation;
