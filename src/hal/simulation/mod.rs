//! Platform simulation support
//! Location: src/hal/simulation/mod.rs

pub mod faults;
pub mod profiles;
pub mod rf_generator;

pub use faults::FaultPlan;
pub use profiles::ProbeProfile;
pub use rf_generator::RfLineGenerator;
