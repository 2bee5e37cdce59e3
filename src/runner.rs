use core::fmt::Debug;
use core::task::Poll;
use defmt::Format;
use heapless::Deque;

use crate::actuators::{motor::MotorAction, ActuatorSet};
use crate::error::Error;

#[derive(Clone, Copy, Debug, Format, PartialEq, Eq)]
pub enum Command<MotorId>
where
    MotorId: Debug + Format,
{
    Motor(MotorId, MotorAction),
}

#[derive(Clone, Copy, Debug, Format)]
pub enum RunnerAction<Command> {
    Run(Command),
    Reset,
}

#[derive(Clone, Copy, Debug)]
pub enum RunnerError<MotorId, MotorSetError>
where
    MotorId: Debug + Format,
    MotorSetError: Debug,
{
    Motor(MotorId, MotorSetError),
    QueueFull,
}

impl<MotorId, MotorSetError> Error for RunnerError<MotorId, MotorSetError>
where
    MotorId: Debug + Format,
    MotorSetError: Debug,
{
}

pub struct Runner<MotorSet, const ACTIVE_COMMANDS_COUNT: usize>
where
    MotorSet: ActuatorSet<Action = MotorAction>,
    MotorSet::Id: Debug + Format,
{
    active_commands: Deque<Command<MotorSet::Id>, ACTIVE_COMMANDS_COUNT>,
    motors: MotorSet,
}

impl<MotorSet, const ACTIVE_COMMANDS_COUNT: usize> Runner<MotorSet, ACTIVE_COMMANDS_COUNT>
where
    MotorSet: ActuatorSet<Action = MotorAction>,
    MotorSet::Id: Debug + Format,
{
    pub fn new(motors: MotorSet) -> Self {
        Self {
            active_commands: Deque::new(),
            motors,
        }
    }

    pub fn motors(&self) -> &MotorSet {
        &self.motors
    }

    pub fn run(
        &mut self,
        action: &RunnerAction<Command<MotorSet::Id>>,
    ) -> Result<(), RunnerError<MotorSet::Id, MotorSet::Error>> {
        match action {
            RunnerAction::Run(command) => {
                self.active_commands
                    .push_back(*command)
                    .map_err(|_| RunnerError::QueueFull)?;

                match command {
                    Command::Motor(id, action) => self.motors.run(id, action),
                }
            }
            RunnerAction::Reset => self.reset(),
        }

        Ok(())
    }

    pub fn reset(&mut self) {
        self.active_commands.clear()
    }

    pub fn poll(&mut self) -> Poll<Result<(), RunnerError<MotorSet::Id, MotorSet::Error>>> {
        let num_commands = self.active_commands.len();
        for _command_index in 0..num_commands {
            let command = match self.active_commands.pop_front() {
                Some(command) => command,
                None => break,
            };

            let result = match command {
                Command::Motor(id, _) => self
                    .motors
                    .poll(&id)
                    .map_err(|err| RunnerError::Motor(id, err)),
            };

            match result {
                Poll::Ready(Ok(())) => {}
                Poll::Ready(Err(err)) => {
                    // leave the failed command queued, a later reset clears it
                    self.active_commands
                        .push_back(command)
                        .map_err(|_| RunnerError::QueueFull)?;

                    return Poll::Ready(Err(err));
                }
                Poll::Pending => {
                    self.active_commands
                        .push_back(command)
                        .map_err(|_| RunnerError::QueueFull)?;
                }
            }
        }

        if self.active_commands.is_empty() {
            Poll::Ready(Ok(()))
        } else {
            Poll::Pending
        }
    }
}
