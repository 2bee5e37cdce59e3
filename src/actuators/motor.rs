use core::fmt::Debug;
use core::task::Poll;
use defmt::Format;

use super::{Actuator, ActuatorSet};
use crate::error::Error;

pub const MOTOR_MAX_SPEED: u8 = 255;

#[derive(Clone, Copy, Debug, Format, PartialEq, Eq)]
pub enum MotorDirection {
    Forward,
    Backward,
    Release,
}

#[derive(Clone, Copy, Debug, Format, PartialEq, Eq)]
pub enum MotorAction {
    Run(MotorDirection),
    SetSpeed { speed: u8 },
}

/// A single DC motor channel.
pub trait MotorDriver {
    type Error: Error;

    fn run(&mut self, direction: MotorDirection) -> Result<(), Self::Error>;
    fn set_speed(&mut self, speed: u8) -> Result<(), Self::Error>;

    fn stop(&mut self) -> Result<(), Self::Error> {
        self.run(MotorDirection::Release)
    }
}

/// Scale a 0-255 motor speed onto a PWM duty range.
pub fn speed_to_duty(speed: u8, max_duty: u16) -> u16 {
    ((max_duty as u32 * speed as u32) / MOTOR_MAX_SPEED as u32) as u16
}

pub trait AnyMotor: Actuator<Action = MotorAction> {}
impl<T: Actuator<Action = MotorAction>> AnyMotor for T {}

pub struct MotorDevice<Driver>
where
    Driver: MotorDriver,
{
    driver: Driver,
    next_action: Option<MotorAction>,
}

impl<Driver> MotorDevice<Driver>
where
    Driver: MotorDriver,
{
    pub fn new(driver: Driver) -> Self {
        Self {
            driver,
            next_action: None,
        }
    }

    pub fn driver(&self) -> &Driver {
        &self.driver
    }
}

impl<Driver> Actuator for MotorDevice<Driver>
where
    Driver: MotorDriver,
{
    type Action = MotorAction;
    type Error = Driver::Error;

    fn run(&mut self, action: &Self::Action) {
        self.next_action = Some(*action);
    }

    // motors take commands without acknowledgement, so one poll applies the action
    fn poll(&mut self) -> Poll<Result<(), Self::Error>> {
        match self.next_action.take() {
            Some(MotorAction::Run(direction)) => {
                self.driver.run(direction)?;
            }
            Some(MotorAction::SetSpeed { speed }) => {
                self.driver.set_speed(speed)?;
            }
            None => {}
        }

        Poll::Ready(Ok(()))
    }
}

#[derive(Clone, Copy, Debug, Format, PartialEq, Eq)]
pub enum MotorId {
    Stick,
    Boom,
    Rotator,
    Grip,
}

/// The four motor channels of the arm.
pub struct ArmMotors<Stick, Boom, Rotator, Grip>
where
    Stick: AnyMotor,
    Boom: AnyMotor<Error = Stick::Error>,
    Rotator: AnyMotor<Error = Stick::Error>,
    Grip: AnyMotor<Error = Stick::Error>,
{
    pub stick: Stick,
    pub boom: Boom,
    pub rotator: Rotator,
    pub grip: Grip,
}

impl<Stick, Boom, Rotator, Grip> ArmMotors<Stick, Boom, Rotator, Grip>
where
    Stick: AnyMotor,
    Boom: AnyMotor<Error = Stick::Error>,
    Rotator: AnyMotor<Error = Stick::Error>,
    Grip: AnyMotor<Error = Stick::Error>,
{
    pub fn new(stick: Stick, boom: Boom, rotator: Rotator, grip: Grip) -> Self {
        Self {
            stick,
            boom,
            rotator,
            grip,
        }
    }
}

impl<Stick, Boom, Rotator, Grip> ActuatorSet for ArmMotors<Stick, Boom, Rotator, Grip>
where
    Stick: AnyMotor,
    Boom: AnyMotor<Error = Stick::Error>,
    Rotator: AnyMotor<Error = Stick::Error>,
    Grip: AnyMotor<Error = Stick::Error>,
{
    type Action = MotorAction;
    type Id = MotorId;
    type Error = Stick::Error;

    fn ids(&self) -> &'static [Self::Id] {
        &[MotorId::Stick, MotorId::Boom, MotorId::Rotator, MotorId::Grip]
    }

    fn run(&mut self, id: &Self::Id, action: &Self::Action) {
        match id {
            MotorId::Stick => self.stick.run(action),
            MotorId::Boom => self.boom.run(action),
            MotorId::Rotator => self.rotator.run(action),
            MotorId::Grip => self.grip.run(action),
        }
    }

    fn poll(&mut self, id: &Self::Id) -> Poll<Result<(), Self::Error>> {
        match id {
            MotorId::Stick => self.stick.poll(),
            MotorId::Boom => self.boom.poll(),
            MotorId::Rotator => self.rotator.poll(),
            MotorId::Grip => self.grip.poll(),
        }
    }
}
