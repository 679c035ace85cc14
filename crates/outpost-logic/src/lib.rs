//! Pure decision logic for Outpost.
//!
//! This crate contains all colonist behavior math that is independent of
//! the ECS world or any runtime. Functions take plain data and return
//! results, making them unit-testable and portable.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`capacity`] | Capability scalars and movement/work throughput factors |
//! | [`constants`] | Priorities, radii, rates, timeouts (tuning in one place) |
//! | [`cover`] | Cover value math: angle/distance multipliers, stacking |
//! | [`geometry`] | 2D vectors, bounds, angle helpers |
//! | [`intent`] | Intent scoring, baseline priorities, switch rules |
//! | [`needs`] | Hunger/fatigue/health accumulation and recovery |
//! | [`rescue`] | Stuck-rescue probe ring and stall thresholds |
//! | [`threat`] | Deterministic threat scoring and target selection |

pub mod capacity;
pub mod constants;
pub mod cover;
pub mod geometry;
pub mod intent;
pub mod needs;
pub mod rescue;
pub mod threat;
