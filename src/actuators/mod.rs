pub mod motor;

use core::task::Poll;

use crate::error::Error;

// run inspired by https://github.com/rtic-rs/rfcs/pull/0052
// poll inspired by https://docs.rs/stepper
pub trait Actuator {
    type Action;
    type Error: Error;

    fn run(&mut self, action: &Self::Action);
    fn poll(&mut self) -> Poll<Result<(), Self::Error>>;
}

/// A fixed group of actuators of one kind, addressed by id.
pub trait ActuatorSet {
    type Action;
    type Id: Copy + 'static;
    type Error: Error;

    fn ids(&self) -> &'static [Self::Id];
    fn run(&mut self, id: &Self::Id, action: &Self::Action);
    fn poll(&mut self, id: &Self::Id) -> Poll<Result<(), Self::Error>>;
}
