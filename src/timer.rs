use core::fmt::Debug;
use fugit::TimerDurationU32 as TimerDuration;
use fugit_timer::Timer;

use crate::error::Error;

/// Restarts a one-shot timer every time it fires, giving a fixed period.
pub struct Ticker<T, const TIMER_HZ: u32>
where
    T: Timer<TIMER_HZ>,
{
    timer: T,
    period: TimerDuration<TIMER_HZ>,
    is_started: bool,
}

#[derive(Clone, Copy, Debug)]
pub enum TickerError<TimerError: Debug> {
    NotStarted,
    TimerStart(TimerError),
    TimerWait(TimerError),
}

impl<TimerError: Debug> Error for TickerError<TimerError> {}

impl<T, const TIMER_HZ: u32> Ticker<T, TIMER_HZ>
where
    T: Timer<TIMER_HZ>,
    T::Error: Debug,
{
    pub fn new(timer: T, period: TimerDuration<TIMER_HZ>) -> Self {
        Self {
            timer,
            period,
            is_started: false,
        }
    }

    pub fn is_started(&self) -> bool {
        self.is_started
    }

    pub fn start(&mut self) -> Result<(), TickerError<T::Error>> {
        self.timer
            .start(self.period)
            .map_err(TickerError::TimerStart)?;

        self.is_started = true;

        Ok(())
    }

    pub fn wait(&mut self) -> nb::Result<(), TickerError<T::Error>> {
        if !self.is_started {
            return Err(nb::Error::Other(TickerError::NotStarted));
        }

        match self.timer.wait() {
            Ok(()) => {
                self.start()?;

                Ok(())
            }
            Err(nb::Error::WouldBlock) => Err(nb::Error::WouldBlock),
            Err(nb::Error::Other(err)) => Err(nb::Error::Other(TickerError::TimerWait(err))),
        }
    }
}
