// https://learn.adafruit.com/adafruit-motor-shield
//
// Direction bits for all four L293D channels live in one 74HC595 shift register,
// speed is a separate PWM line per channel.

use alloc::rc::Rc;
use core::cell::RefCell;
use core::fmt::Debug;
use defmt::Format;
use embedded_hal::digital::v2::OutputPin;
use embedded_hal::PwmPin;

use crate::actuators::motor::{speed_to_duty, MotorDirection, MotorDriver};
use crate::error::Error;

#[derive(Clone, Copy, Debug, Format, PartialEq, Eq)]
pub enum MotorChannel {
    M1,
    M2,
    M3,
    M4,
}

impl MotorChannel {
    /// Latch bit positions of the (A, B) direction inputs.
    pub fn bits(&self) -> (u8, u8) {
        match self {
            MotorChannel::M1 => (2, 3),
            MotorChannel::M2 => (1, 4),
            MotorChannel::M3 => (5, 7),
            MotorChannel::M4 => (0, 6),
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub enum MotorShieldError<PinError: Debug> {
    PinSet(PinError),
    RegisterBusy,
}

impl<PinError: Debug> Error for MotorShieldError<PinError> {}

pub(crate) struct ShiftRegister<Latch, Clock, Data, Enable> {
    latch: Latch,
    clock: Clock,
    data: Data,
    enable: Enable,
    latch_state: u8,
}

impl<Latch, Clock, Data, Enable, PinError> ShiftRegister<Latch, Clock, Data, Enable>
where
    Latch: OutputPin<Error = PinError>,
    Clock: OutputPin<Error = PinError>,
    Data: OutputPin<Error = PinError>,
    Enable: OutputPin<Error = PinError>,
    PinError: Debug,
{
    fn set_direction(
        &mut self,
        channel: MotorChannel,
        direction: MotorDirection,
    ) -> Result<(), MotorShieldError<PinError>> {
        let (a, b) = channel.bits();

        let (a_high, b_high) = match direction {
            MotorDirection::Forward => (true, false),
            MotorDirection::Backward => (false, true),
            MotorDirection::Release => (false, false),
        };

        self.write_bit(a, a_high);
        self.write_bit(b, b_high);

        self.transmit()
    }

    fn write_bit(&mut self, bit: u8, is_high: bool) {
        if is_high {
            self.latch_state |= 1 << bit;
        } else {
            self.latch_state &= !(1 << bit);
        }
    }

    // shift the latch byte out MSB first, outputs update on the latch rising edge
    fn transmit(&mut self) -> Result<(), MotorShieldError<PinError>> {
        self.latch.set_low().map_err(MotorShieldError::PinSet)?;
        self.data.set_low().map_err(MotorShieldError::PinSet)?;

        for index in (0..8).rev() {
            self.clock.set_low().map_err(MotorShieldError::PinSet)?;

            if self.latch_state & (1 << index) != 0 {
                self.data.set_high().map_err(MotorShieldError::PinSet)?;
            } else {
                self.data.set_low().map_err(MotorShieldError::PinSet)?;
            }

            self.clock.set_high().map_err(MotorShieldError::PinSet)?;
        }

        self.latch.set_high().map_err(MotorShieldError::PinSet)?;

        Ok(())
    }
}

pub struct MotorShield<Latch, Clock, Data, Enable> {
    pub(crate) register: Rc<RefCell<ShiftRegister<Latch, Clock, Data, Enable>>>,
}

impl<Latch, Clock, Data, Enable, PinError> MotorShield<Latch, Clock, Data, Enable>
where
    Latch: OutputPin<Error = PinError>,
    Clock: OutputPin<Error = PinError>,
    Data: OutputPin<Error = PinError>,
    Enable: OutputPin<Error = PinError>,
    PinError: Debug,
{
    /// Clears every direction bit and enables the shift register outputs.
    pub fn new(
        latch: Latch,
        clock: Clock,
        data: Data,
        enable: Enable,
    ) -> Result<Self, MotorShieldError<PinError>> {
        let mut register = ShiftRegister {
            latch,
            clock,
            data,
            enable,
            latch_state: 0,
        };

        register.transmit()?;

        // output enable is active low
        register
            .enable
            .set_low()
            .map_err(MotorShieldError::PinSet)?;

        Ok(Self {
            register: Rc::new(RefCell::new(register)),
        })
    }

    /// Claim a channel on the shield. The channel starts released with zero speed.
    pub fn motor<Pwm>(
        &self,
        channel: MotorChannel,
        mut pwm: Pwm,
    ) -> Result<ShieldMotor<Latch, Clock, Data, Enable, Pwm>, MotorShieldError<PinError>>
    where
        Pwm: PwmPin<Duty = u16>,
    {
        self.register
            .try_borrow_mut()
            .map_err(|_| MotorShieldError::RegisterBusy)?
            .set_direction(channel, MotorDirection::Release)?;

        pwm.set_duty(0);
        pwm.enable();

        Ok(ShieldMotor {
            register: self.register.clone(),
            channel,
            pwm,
        })
    }

    pub fn latch_state(&self) -> u8 {
        self.register.borrow().latch_state
    }
}

pub struct ShieldMotor<Latch, Clock, Data, Enable, Pwm> {
    register: Rc<RefCell<ShiftRegister<Latch, Clock, Data, Enable>>>,
    channel: MotorChannel,
    pwm: Pwm,
}

impl<Latch, Clock, Data, Enable, Pwm> ShieldMotor<Latch, Clock, Data, Enable, Pwm> {
    pub fn pwm(&self) -> &Pwm {
        &self.pwm
    }
}

impl<Latch, Clock, Data, Enable, Pwm, PinError> MotorDriver
    for ShieldMotor<Latch, Clock, Data, Enable, Pwm>
where
    Latch: OutputPin<Error = PinError>,
    Clock: OutputPin<Error = PinError>,
    Data: OutputPin<Error = PinError>,
    Enable: OutputPin<Error = PinError>,
    PinError: Debug,
    Pwm: PwmPin<Duty = u16>,
{
    type Error = MotorShieldError<PinError>;

    fn run(&mut self, direction: MotorDirection) -> Result<(), Self::Error> {
        self.register
            .try_borrow_mut()
            .map_err(|_| MotorShieldError::RegisterBusy)?
            .set_direction(self.channel, direction)
    }

    fn set_speed(&mut self, speed: u8) -> Result<(), Self::Error> {
        let duty = speed_to_duty(speed, self.pwm.get_max_duty());
        self.pwm.set_duty(duty);

        Ok(())
    }
}
