//! Sensor module - inertial sample types and stream simulation

mod kinematics;
mod simulator;

pub use kinematics::*;
pub use simulator::ImuSimulator;
