//! Domain logic shared by the Reelsmith service and studio client.
//!
//! Everything here is provider-agnostic: input normalization, the task
//! model reported by the generation provider, the bounded poll loop, and
//! the ad script builder.

pub mod error;
pub mod normalize;
pub mod poll;
pub mod script;
pub mod task;
