use core::fmt::Debug;
use core::task::Poll;
use defmt::Format;
use heapless::Vec;

use crate::actuators::{
    motor::{MotorAction, MotorDirection},
    ActuatorSet,
};
use crate::error::Error;
use crate::runner::{Command, Runner, RunnerAction, RunnerError};
use crate::sensors::{button::ButtonUpdate, SensorSet};

/// Drive `motor` in `direction` while `button` is held.
#[derive(Clone, Copy, Debug, Format, PartialEq, Eq)]
pub struct Binding<ButtonId, MotorId> {
    pub button: ButtonId,
    pub motor: MotorId,
    pub direction: MotorDirection,
}

#[derive(Clone, Copy, Debug, Format, PartialEq, Eq)]
pub enum ArmControllerBuildError {
    TooManyBindings,
    ReleaseBinding { index: usize },
    DuplicateButton { index: usize },
}

impl Error for ArmControllerBuildError {}

#[derive(Clone, Copy, Debug)]
pub enum ControllerError<ButtonId, ButtonError, RunnerError>
where
    ButtonId: Debug,
    ButtonError: Debug,
    RunnerError: Debug,
{
    Button(ButtonId, ButtonError),
    Runner(RunnerError),
    // a motor did not finish its command on the first poll
    CommandPending,
}

impl<ButtonId, ButtonError, RunnerError> Error
    for ControllerError<ButtonId, ButtonError, RunnerError>
where
    ButtonId: Debug,
    ButtonError: Debug,
    RunnerError: Debug,
{
}

pub type ArmControllerError<Buttons, Motors> = ControllerError<
    <Buttons as SensorSet>::Id,
    <Buttons as SensorSet>::Error,
    RunnerError<<Motors as ActuatorSet>::Id, <Motors as ActuatorSet>::Error>,
>;

pub struct ArmController<
    Buttons,
    Motors,
    const BINDINGS_COUNT: usize,
    const ACTIVE_COMMANDS_COUNT: usize,
> where
    Buttons: SensorSet<Message = ButtonUpdate>,
    Buttons::Id: Debug + Format + PartialEq,
    Motors: ActuatorSet<Action = MotorAction>,
    Motors::Id: Debug + Format,
{
    buttons: Buttons,
    runner: Runner<Motors, ACTIVE_COMMANDS_COUNT>,
    bindings: Vec<Binding<Buttons::Id, Motors::Id>, BINDINGS_COUNT>,
}

impl<Buttons, Motors, const BINDINGS_COUNT: usize, const ACTIVE_COMMANDS_COUNT: usize>
    ArmController<Buttons, Motors, BINDINGS_COUNT, ACTIVE_COMMANDS_COUNT>
where
    Buttons: SensorSet<Message = ButtonUpdate>,
    Buttons::Id: Debug + Format + PartialEq,
    Motors: ActuatorSet<Action = MotorAction>,
    Motors::Id: Debug + Format,
{
    pub fn new(
        buttons: Buttons,
        motors: Motors,
        bindings: &[Binding<Buttons::Id, Motors::Id>],
    ) -> Result<Self, ArmControllerBuildError> {
        for (index, binding) in bindings.iter().enumerate() {
            if binding.direction == MotorDirection::Release {
                return Err(ArmControllerBuildError::ReleaseBinding { index });
            }

            // a second binding on the same button would never see a transition
            if bindings[..index]
                .iter()
                .any(|other| other.button == binding.button)
            {
                return Err(ArmControllerBuildError::DuplicateButton { index });
            }
        }

        let bindings =
            Vec::from_slice(bindings).map_err(|_| ArmControllerBuildError::TooManyBindings)?;

        Ok(Self {
            buttons,
            runner: Runner::new(motors),
            bindings,
        })
    }

    pub fn motors(&self) -> &Motors {
        self.runner.motors()
    }

    /// Apply the start commands, in order, before the first poll.
    pub fn setup(
        &mut self,
        start_commands: &[Command<Motors::Id>],
    ) -> Result<(), ArmControllerError<Buttons, Motors>> {
        for command in start_commands.iter() {
            defmt::println!("Start: {}", command);

            self.submit(command)?;
        }

        Ok(())
    }

    /// One polling cycle: an edge check for every binding, in order.
    pub fn poll(&mut self) -> Result<(), ArmControllerError<Buttons, Motors>> {
        for index in 0..self.bindings.len() {
            let binding = self.bindings[index];

            self.check_button(&binding)?;
        }

        Ok(())
    }

    /// Sense the bound button and, on a transition, command its motor: run in the
    /// bound direction when pressed, release when let go.
    pub fn check_button(
        &mut self,
        binding: &Binding<Buttons::Id, Motors::Id>,
    ) -> Result<Option<Command<Motors::Id>>, ArmControllerError<Buttons, Motors>> {
        let update = self
            .buttons
            .sense(&binding.button)
            .map_err(|err| ControllerError::Button(binding.button, err))?;

        let update = match update {
            Some(update) => update,
            None => return Ok(None),
        };

        let direction = if update.status.is_pressed() {
            binding.direction
        } else {
            MotorDirection::Release
        };

        let command = Command::Motor(binding.motor, MotorAction::Run(direction));

        defmt::println!("{}: {} -> {}", binding.button, update.status, command);

        self.submit(&command)?;

        Ok(Some(command))
    }

    /// Release every motor, dropping whatever was queued. Keeps going past a
    /// failing motor and returns the first error once all were tried.
    pub fn release_all(&mut self) -> Result<(), ArmControllerError<Buttons, Motors>> {
        self.runner
            .run(&RunnerAction::Reset)
            .map_err(ControllerError::Runner)?;

        let mut first_error = None;

        for id in self.runner.motors().ids() {
            let command = Command::Motor(*id, MotorAction::Run(MotorDirection::Release));

            if let Err(err) = self.submit(&command) {
                defmt::println!("Failed to release {}", id);

                first_error.get_or_insert(err);
            }
        }

        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    // motor actuators apply their action on the first poll, so one poll flushes
    // the command to the hardware before the next is issued
    fn submit(
        &mut self,
        command: &Command<Motors::Id>,
    ) -> Result<(), ArmControllerError<Buttons, Motors>> {
        self.runner
            .run(&RunnerAction::Run(*command))
            .map_err(ControllerError::Runner)?;

        match self.runner.poll() {
            Poll::Ready(Ok(())) => Ok(()),
            Poll::Ready(Err(err)) => {
                self.runner.reset();

                Err(ControllerError::Runner(err))
            }
            Poll::Pending => {
                self.runner.reset();

                Err(ControllerError::CommandPending)
            }
        }
    }
}
