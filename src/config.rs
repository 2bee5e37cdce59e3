use crate::actuators::motor::{MotorAction, MotorDirection, MotorId, MOTOR_MAX_SPEED};
use crate::controller::Binding;
use crate::runner::Command;
use crate::sensors::button::ButtonId;

pub const TICK_TIMER_HZ: u32 = 1_000_000;

pub const POLL_INTERVAL_MILLIS: u32 = 50;

// must comfortably exceed one polling cycle
pub const WATCHDOG_TIMEOUT_MILLIS: u32 = 500;

pub const DIAGNOSTIC_BAUD_RATE: u32 = 115_200;

pub const MOTOR_PWM_HZ: u32 = 64_000;

pub const HEAP_SIZE: usize = 2048;

pub const BINDINGS_COUNT: usize = 4;
// commands are flushed to the motors one at a time
pub const ACTIVE_COMMANDS_COUNT: usize = 1;

pub type ArmBinding = Binding<ButtonId, MotorId>;
pub type ArmCommand = Command<MotorId>;

/// Checked in this order every cycle.
pub fn get_button_bindings() -> [ArmBinding; BINDINGS_COUNT] {
    [
        Binding {
            button: ButtonId::StickForward,
            motor: MotorId::Boom,
            direction: MotorDirection::Forward,
        },
        Binding {
            button: ButtonId::StickBackward,
            motor: MotorId::Boom,
            direction: MotorDirection::Backward,
        },
        // TODO confirm rotation left/right against the rotator wiring, both are guesses
        Binding {
            button: ButtonId::RotationLeft,
            motor: MotorId::Rotator,
            direction: MotorDirection::Forward,
        },
        Binding {
            button: ButtonId::RotationRight,
            motor: MotorId::Rotator,
            direction: MotorDirection::Backward,
        },
    ]
}

pub fn get_start_commands() -> [ArmCommand; 6] {
    [
        Command::Motor(MotorId::Stick, MotorAction::Run(MotorDirection::Release)),
        Command::Motor(MotorId::Boom, MotorAction::Run(MotorDirection::Release)),
        Command::Motor(MotorId::Rotator, MotorAction::Run(MotorDirection::Release)),
        Command::Motor(MotorId::Grip, MotorAction::Run(MotorDirection::Release)),
        Command::Motor(
            MotorId::Boom,
            MotorAction::SetSpeed {
                speed: MOTOR_MAX_SPEED,
            },
        ),
        Command::Motor(
            MotorId::Rotator,
            MotorAction::SetSpeed {
                speed: MOTOR_MAX_SPEED,
            },
        ),
    ]
}
