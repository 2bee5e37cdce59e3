pub mod hbridge;
pub mod motor_shield;
