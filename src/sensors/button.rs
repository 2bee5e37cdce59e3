use core::fmt::Debug;
use core::marker::PhantomData;
use defmt::Format;
use embedded_hal::digital::v2::InputPin;

use super::{Sensor, SensorSet};
use crate::error::Error;

#[derive(Clone, Copy, Debug, Format, PartialEq, Eq)]
pub enum ButtonStatus {
    Pressed,
    Released,
}

impl ButtonStatus {
    pub fn is_pressed(&self) -> bool {
        matches!(self, ButtonStatus::Pressed)
    }
}

#[derive(Clone, Copy, Debug, Format, PartialEq, Eq)]
pub struct ButtonUpdate {
    pub status: ButtonStatus,
}

/// Which electrical level of the pin means "pressed".
pub trait ButtonActive {
    fn is_pressed<P: InputPin>(pin: &P) -> Result<bool, P::Error>;
}

/// Pulled-up input, the button shorts the pin to ground.
pub struct ButtonActiveLow;

impl ButtonActive for ButtonActiveLow {
    fn is_pressed<P: InputPin>(pin: &P) -> Result<bool, P::Error> {
        pin.is_low()
    }
}

pub struct ButtonActiveHigh;

impl ButtonActive for ButtonActiveHigh {
    fn is_pressed<P: InputPin>(pin: &P) -> Result<bool, P::Error> {
        pin.is_high()
    }
}

pub struct ButtonDevice<P, A>
where
    P: InputPin,
    A: ButtonActive,
{
    pin: P,
    status: ButtonStatus,
    active: PhantomData<A>,
}

impl<P> ButtonDevice<P, ButtonActiveLow>
where
    P: InputPin,
{
    pub fn new_active_low(pin: P) -> Self {
        Self::new(pin)
    }
}

impl<P> ButtonDevice<P, ButtonActiveHigh>
where
    P: InputPin,
{
    pub fn new_active_high(pin: P) -> Self {
        Self::new(pin)
    }
}

impl<P, A> ButtonDevice<P, A>
where
    P: InputPin,
    A: ButtonActive,
{
    // every button starts released, so one held down at boot reports on the first sense
    fn new(pin: P) -> Self {
        Self {
            pin,
            status: ButtonStatus::Released,
            active: PhantomData,
        }
    }

    pub fn status(&self) -> ButtonStatus {
        self.status
    }
}

#[derive(Clone, Copy, Debug)]
pub enum ButtonError<PinError: Debug> {
    PinRead(PinError),
}

impl<PinError: Debug> Error for ButtonError<PinError> {}

impl<P, A> Sensor for ButtonDevice<P, A>
where
    P: InputPin,
    P::Error: Debug,
    A: ButtonActive,
{
    type Message = ButtonUpdate;
    type Error = ButtonError<P::Error>;

    fn sense(&mut self) -> Result<Option<Self::Message>, Self::Error> {
        let is_pressed = A::is_pressed(&self.pin).map_err(ButtonError::PinRead)?;

        let status = if is_pressed {
            ButtonStatus::Pressed
        } else {
            ButtonStatus::Released
        };

        if status == self.status {
            return Ok(None);
        }

        self.status = status;

        Ok(Some(ButtonUpdate { status }))
    }
}

#[derive(Clone, Copy, Debug, Format, PartialEq, Eq)]
pub enum ButtonId {
    StickForward,
    StickBackward,
    RotationLeft,
    RotationRight,
}

/// The four joystick buttons of the arm.
pub struct ArmButtons<StickForward, StickBackward, RotationLeft, RotationRight>
where
    StickForward: Sensor<Message = ButtonUpdate>,
    StickBackward: Sensor<Message = ButtonUpdate, Error = StickForward::Error>,
    RotationLeft: Sensor<Message = ButtonUpdate, Error = StickForward::Error>,
    RotationRight: Sensor<Message = ButtonUpdate, Error = StickForward::Error>,
{
    pub stick_forward: StickForward,
    pub stick_backward: StickBackward,
    pub rotation_left: RotationLeft,
    pub rotation_right: RotationRight,
}

impl<StickForward, StickBackward, RotationLeft, RotationRight>
    ArmButtons<StickForward, StickBackward, RotationLeft, RotationRight>
where
    StickForward: Sensor<Message = ButtonUpdate>,
    StickBackward: Sensor<Message = ButtonUpdate, Error = StickForward::Error>,
    RotationLeft: Sensor<Message = ButtonUpdate, Error = StickForward::Error>,
    RotationRight: Sensor<Message = ButtonUpdate, Error = StickForward::Error>,
{
    pub fn new(
        stick_forward: StickForward,
        stick_backward: StickBackward,
        rotation_left: RotationLeft,
        rotation_right: RotationRight,
    ) -> Self {
        Self {
            stick_forward,
            stick_backward,
            rotation_left,
            rotation_right,
        }
    }
}

impl<StickForward, StickBackward, RotationLeft, RotationRight> SensorSet
    for ArmButtons<StickForward, StickBackward, RotationLeft, RotationRight>
where
    StickForward: Sensor<Message = ButtonUpdate>,
    StickBackward: Sensor<Message = ButtonUpdate, Error = StickForward::Error>,
    RotationLeft: Sensor<Message = ButtonUpdate, Error = StickForward::Error>,
    RotationRight: Sensor<Message = ButtonUpdate, Error = StickForward::Error>,
{
    type Id = ButtonId;
    type Message = ButtonUpdate;
    type Error = StickForward::Error;

    fn sense(&mut self, id: &Self::Id) -> Result<Option<Self::Message>, Self::Error> {
        match id {
            ButtonId::StickForward => self.stick_forward.sense(),
            ButtonId::StickBackward => self.stick_backward.sense(),
            ButtonId::RotationLeft => self.rotation_left.sense(),
            ButtonId::RotationRight => self.rotation_right.sense(),
        }
    }
}
