//! Alternative to the motor shield for boards that wire an H-bridge driver
//! (L293D, L298N) straight to GPIO and PWM pins. Swap it in for `ShieldMotor`
//! when building `ArmMotors`.

use core::fmt::Debug;
use embedded_hal::digital::v2::OutputPin;
use embedded_hal::PwmPin;

use crate::actuators::motor::{speed_to_duty, MotorDirection, MotorDriver};
use crate::error::Error;

#[derive(Clone, Copy, Debug)]
pub enum HBridgeError<PinError: Debug> {
    PinSet(PinError),
}

impl<PinError: Debug> Error for HBridgeError<PinError> {}

/// One H-bridge channel with its own direction inputs and PWM enable line,
/// e.g. half of an L293D or L298N wired straight to the board.
pub struct HBridgeMotor<In1, In2, Pwm> {
    in1: In1,
    in2: In2,
    pwm: Pwm,
}

impl<In1, In2, Pwm, PinError> HBridgeMotor<In1, In2, Pwm>
where
    In1: OutputPin<Error = PinError>,
    In2: OutputPin<Error = PinError>,
    PinError: Debug,
    Pwm: PwmPin<Duty = u16>,
{
    pub fn new(in1: In1, in2: In2, mut pwm: Pwm) -> Result<Self, HBridgeError<PinError>> {
        pwm.set_duty(0);
        pwm.enable();

        let mut motor = Self { in1, in2, pwm };
        motor.stop()?;

        Ok(motor)
    }

    pub fn pwm(&self) -> &Pwm {
        &self.pwm
    }
}

impl<In1, In2, Pwm, PinError> MotorDriver for HBridgeMotor<In1, In2, Pwm>
where
    In1: OutputPin<Error = PinError>,
    In2: OutputPin<Error = PinError>,
    PinError: Debug,
    Pwm: PwmPin<Duty = u16>,
{
    type Error = HBridgeError<PinError>;

    // always drop the opposing input first so both are never high together
    fn run(&mut self, direction: MotorDirection) -> Result<(), Self::Error> {
        match direction {
            MotorDirection::Forward => {
                self.in2.set_low().map_err(HBridgeError::PinSet)?;
                self.in1.set_high().map_err(HBridgeError::PinSet)?;
            }
            MotorDirection::Backward => {
                self.in1.set_low().map_err(HBridgeError::PinSet)?;
                self.in2.set_high().map_err(HBridgeError::PinSet)?;
            }
            MotorDirection::Release => {
                self.in1.set_low().map_err(HBridgeError::PinSet)?;
                self.in2.set_low().map_err(HBridgeError::PinSet)?;
            }
        }

        Ok(())
    }

    fn set_speed(&mut self, speed: u8) -> Result<(), Self::Error> {
        let duty = speed_to_duty(speed, self.pwm.get_max_duty());
        self.pwm.set_duty(duty);

        Ok(())
    }
}
