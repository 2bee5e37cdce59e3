pub mod button;

use crate::error::Error;

pub trait Sensor {
    type Message;
    type Error: Error;

    fn sense(&mut self) -> Result<Option<Self::Message>, Self::Error>;
}

/// A fixed group of sensors addressed by id.
pub trait SensorSet {
    type Id: Copy;
    type Message;
    type Error: Error;

    fn sense(&mut self, id: &Self::Id) -> Result<Option<Self::Message>, Self::Error>;
}
