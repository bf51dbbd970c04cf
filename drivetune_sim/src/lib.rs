//! # drivetune Simulation Backend
//!
//! Software stand-ins for the robot hardware so the tuner and teleop loop can
//! run without a robot.
//!
//! - [`SimDrive`] - drive plant implementing `DriveHandle`
//! - [`SimMechanisms`] - teleop mechanisms implementing `Mechanisms`
//! - [`pid`] - lift position controller

pub mod drive;
pub mod mechanisms;
pub mod pid;

pub use crate::drive::SimDrive;
pub use crate::mechanisms::SimMechanisms;
