//! Component definitions for the behavior engine.

mod actors;
mod common;
mod world;

pub use actors::*;
pub use common::*;
pub use world::*;
