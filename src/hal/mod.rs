// src/hal/mod.rs
//! Hardware abstraction layer for the acquisition platform

pub mod traits;
pub mod types;
pub mod simulation;
pub mod simulator;


pub use traits::*;
pub use types::*;
