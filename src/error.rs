use core::convert::Infallible;
use core::fmt::Debug;

pub trait Error: Debug {}

impl Error for Infallible {}
