#![no_std]
#![no_main]

extern crate alloc;

use robot_arm as _; // memory layout + panic handler + others

// See https://crates.io/crates/defmt-test/0.3.0 for more documentation (e.g. about the 'state'
// feature)
#[defmt_test::tests]
mod tests {
    use alloc::rc::Rc;
    use core::array;
    use core::cell::{Cell, RefCell};
    use core::convert::Infallible;
    use core::task::Poll;
    use defmt::{assert, assert_eq, Format};
    use embedded_hal::digital::v2::InputPin;
    use heapless::Vec;

    use robot_arm::{
        actuators::{
            motor::{ArmMotors, MotorAction, MotorDevice, MotorDirection, MotorDriver, MotorId},
            ActuatorSet,
        },
        config::{
            get_button_bindings, get_start_commands, ArmBinding, ACTIVE_COMMANDS_COUNT,
            BINDINGS_COUNT,
        },
        controller::{ArmController, ArmControllerBuildError, Binding, ControllerError},
        error::Error,
        init_heap,
        runner::{Command, RunnerError},
        sensors::button::{ArmButtons, ButtonActiveLow, ButtonDevice, ButtonError, ButtonId},
    };

    #[derive(Clone, Copy, Debug)]
    struct PinFault;

    struct MockInputPin {
        is_high: Rc<Cell<bool>>,
        fault: Rc<Cell<bool>>,
    }

    impl MockInputPin {
        fn level(&self) -> Result<bool, PinFault> {
            if self.fault.get() {
                Err(PinFault)
            } else {
                Ok(self.is_high.get())
            }
        }
    }

    impl InputPin for MockInputPin {
        type Error = PinFault;

        fn is_high(&self) -> Result<bool, Self::Error> {
            self.level()
        }

        fn is_low(&self) -> Result<bool, Self::Error> {
            self.level().map(|is_high| !is_high)
        }
    }

    #[derive(Clone, Copy, Debug, Format, PartialEq)]
    struct MotorCall {
        motor: MotorId,
        action: MotorAction,
    }

    type CallLog = Rc<RefCell<Vec<MotorCall, 32>>>;

    #[derive(Clone, Copy, Debug)]
    struct MotorFault;

    impl Error for MotorFault {}

    struct RecordingMotor {
        id: MotorId,
        log: CallLog,
        fault: Rc<Cell<bool>>,
    }

    impl RecordingMotor {
        fn record(&mut self, action: MotorAction) -> Result<(), MotorFault> {
            if self.fault.get() {
                return Err(MotorFault);
            }

            self.log
                .borrow_mut()
                .push(MotorCall {
                    motor: self.id,
                    action,
                })
                .ok();

            Ok(())
        }
    }

    impl MotorDriver for RecordingMotor {
        type Error = MotorFault;

        fn run(&mut self, direction: MotorDirection) -> Result<(), Self::Error> {
            self.record(MotorAction::Run(direction))
        }

        fn set_speed(&mut self, speed: u8) -> Result<(), Self::Error> {
            self.record(MotorAction::SetSpeed { speed })
        }
    }

    // a motor set whose commands never finish
    struct StalledMotors;

    impl ActuatorSet for StalledMotors {
        type Action = MotorAction;
        type Id = MotorId;
        type Error = Infallible;

        fn ids(&self) -> &'static [Self::Id] {
            &[MotorId::Boom]
        }

        fn run(&mut self, _id: &Self::Id, _action: &Self::Action) {}

        fn poll(&mut self, _id: &Self::Id) -> Poll<Result<(), Self::Error>> {
            Poll::Pending
        }
    }

    type Button = ButtonDevice<MockInputPin, ButtonActiveLow>;
    type Motor = MotorDevice<RecordingMotor>;
    type Buttons = ArmButtons<Button, Button, Button, Button>;
    type Motors = ArmMotors<Motor, Motor, Motor, Motor>;
    type Controller = ArmController<Buttons, Motors, BINDINGS_COUNT, ACTIVE_COMMANDS_COUNT>;

    type Lines = [Rc<Cell<bool>>; 4];

    struct Parts {
        buttons: Buttons,
        motors: Motors,
        // button pin levels, in `ButtonId` order
        levels: Lines,
        pin_faults: Lines,
        // in `MotorId` order
        motor_faults: Lines,
        log: CallLog,
    }

    struct Rig {
        controller: Controller,
        stick_forward: Rc<Cell<bool>>,
        stick_backward: Rc<Cell<bool>>,
        rotation_left: Rc<Cell<bool>>,
        rotation_right: Rc<Cell<bool>>,
        pin_faults: Lines,
        motor_faults: Lines,
        log: CallLog,
    }

    use helpers::*;

    mod helpers {
        use super::*;

        pub(super) fn lines(is_set: bool) -> Lines {
            array::from_fn(|_| Rc::new(Cell::new(is_set)))
        }

        pub(super) fn button(is_high: &Rc<Cell<bool>>, fault: &Rc<Cell<bool>>) -> Button {
            Button::new_active_low(MockInputPin {
                is_high: is_high.clone(),
                fault: fault.clone(),
            })
        }

        pub(super) fn motor(id: MotorId, log: &CallLog, fault: &Rc<Cell<bool>>) -> Motor {
            MotorDevice::new(RecordingMotor {
                id,
                log: log.clone(),
                fault: fault.clone(),
            })
        }

        pub(super) fn parts() -> Parts {
            let log: CallLog = Rc::new(RefCell::new(Vec::new()));

            // pulled up, nothing pressed
            let levels = lines(true);
            let pin_faults = lines(false);
            let motor_faults = lines(false);

            let buttons = ArmButtons::new(
                button(&levels[0], &pin_faults[0]),
                button(&levels[1], &pin_faults[1]),
                button(&levels[2], &pin_faults[2]),
                button(&levels[3], &pin_faults[3]),
            );

            let motors = ArmMotors::new(
                motor(MotorId::Stick, &log, &motor_faults[0]),
                motor(MotorId::Boom, &log, &motor_faults[1]),
                motor(MotorId::Rotator, &log, &motor_faults[2]),
                motor(MotorId::Grip, &log, &motor_faults[3]),
            );

            Parts {
                buttons,
                motors,
                levels,
                pin_faults,
                motor_faults,
                log,
            }
        }

        pub(super) fn rig() -> Rig {
            let parts = parts();
            let [stick_forward, stick_backward, rotation_left, rotation_right] = parts.levels;

            let mut controller =
                Controller::new(parts.buttons, parts.motors, &get_button_bindings()).unwrap();
            controller.setup(&get_start_commands()).unwrap();
            parts.log.borrow_mut().clear();

            Rig {
                controller,
                stick_forward,
                stick_backward,
                rotation_left,
                rotation_right,
                pin_faults: parts.pin_faults,
                motor_faults: parts.motor_faults,
                log: parts.log,
            }
        }

        pub(super) fn run(motor: MotorId, direction: MotorDirection) -> MotorCall {
            MotorCall {
                motor,
                action: MotorAction::Run(direction),
            }
        }

        pub(super) fn take_calls(log: &CallLog) -> Vec<MotorCall, 32> {
            let calls = log.borrow().clone();
            log.borrow_mut().clear();
            calls
        }
    }

    #[init]
    fn init() {
        init_heap();
    }

    #[test]
    fn setup_releases_every_motor_and_sets_full_speed() {
        let parts = parts();
        let mut controller =
            Controller::new(parts.buttons, parts.motors, &get_button_bindings()).unwrap();

        controller.setup(&get_start_commands()).unwrap();

        assert_eq!(
            take_calls(&parts.log).as_slice(),
            &[
                run(MotorId::Stick, MotorDirection::Release),
                run(MotorId::Boom, MotorDirection::Release),
                run(MotorId::Rotator, MotorDirection::Release),
                run(MotorId::Grip, MotorDirection::Release),
                MotorCall {
                    motor: MotorId::Boom,
                    action: MotorAction::SetSpeed { speed: 255 },
                },
                MotorCall {
                    motor: MotorId::Rotator,
                    action: MotorAction::SetSpeed { speed: 255 },
                },
            ][..]
        );
    }

    #[test]
    fn unpressed_buttons_never_command_motors() {
        let mut rig = rig();

        for _cycle in 0..20 {
            rig.controller.poll().unwrap();
        }

        assert!(rig.log.borrow().is_empty());
    }

    #[test]
    fn stick_forward_press_hold_release() {
        let mut rig = rig();

        // cycle 1: pressed
        rig.stick_forward.set(false);
        rig.controller.poll().unwrap();
        assert_eq!(
            take_calls(&rig.log).as_slice(),
            &[run(MotorId::Boom, MotorDirection::Forward)][..]
        );

        // cycle 2: held
        rig.controller.poll().unwrap();
        rig.controller.poll().unwrap();
        assert!(rig.log.borrow().is_empty());

        // cycle 3: let go
        rig.stick_forward.set(true);
        rig.controller.poll().unwrap();
        assert_eq!(
            take_calls(&rig.log).as_slice(),
            &[run(MotorId::Boom, MotorDirection::Release)][..]
        );

        rig.controller.poll().unwrap();
        assert!(rig.log.borrow().is_empty());
    }

    #[test]
    fn check_button_reports_the_issued_command() {
        let mut rig = rig();
        let binding = get_button_bindings()[1];

        assert_eq!(rig.controller.check_button(&binding).unwrap(), None);

        rig.stick_backward.set(false);
        assert_eq!(
            rig.controller.check_button(&binding).unwrap(),
            Some(Command::Motor(
                MotorId::Boom,
                MotorAction::Run(MotorDirection::Backward)
            ))
        );
        assert_eq!(rig.controller.check_button(&binding).unwrap(), None);
        assert_eq!(
            take_calls(&rig.log).as_slice(),
            &[run(MotorId::Boom, MotorDirection::Backward)][..]
        );
    }

    #[test]
    fn rotation_and_boom_do_not_interfere() {
        let mut rig = rig();

        rig.rotation_left.set(false);
        rig.controller.poll().unwrap();
        assert_eq!(
            take_calls(&rig.log).as_slice(),
            &[run(MotorId::Rotator, MotorDirection::Forward)][..]
        );

        rig.stick_backward.set(false);
        rig.controller.poll().unwrap();
        assert_eq!(
            take_calls(&rig.log).as_slice(),
            &[run(MotorId::Boom, MotorDirection::Backward)][..]
        );

        rig.rotation_left.set(true);
        rig.rotation_right.set(false);
        rig.controller.poll().unwrap();
        assert_eq!(
            take_calls(&rig.log).as_slice(),
            &[
                run(MotorId::Rotator, MotorDirection::Release),
                run(MotorId::Rotator, MotorDirection::Backward),
            ][..]
        );

        rig.stick_backward.set(true);
        rig.controller.poll().unwrap();
        assert_eq!(
            take_calls(&rig.log).as_slice(),
            &[run(MotorId::Boom, MotorDirection::Release)][..]
        );
    }

    #[test]
    fn bindings_are_checked_in_order() {
        let mut rig = rig();

        rig.rotation_right.set(false);
        rig.stick_backward.set(false);
        rig.stick_forward.set(false);
        rig.controller.poll().unwrap();

        assert_eq!(
            take_calls(&rig.log).as_slice(),
            &[
                run(MotorId::Boom, MotorDirection::Forward),
                run(MotorId::Boom, MotorDirection::Backward),
                run(MotorId::Rotator, MotorDirection::Backward),
            ][..]
        );
    }

    #[test]
    fn button_held_at_boot_fires_on_first_cycle() {
        let parts = parts();
        parts.levels[2].set(false);

        let mut controller =
            Controller::new(parts.buttons, parts.motors, &get_button_bindings()).unwrap();
        controller.setup(&get_start_commands()).unwrap();
        parts.log.borrow_mut().clear();

        controller.poll().unwrap();
        assert_eq!(
            take_calls(&parts.log).as_slice(),
            &[run(MotorId::Rotator, MotorDirection::Forward)][..]
        );
    }

    #[test]
    fn release_all_stops_every_motor() {
        let mut rig = rig();

        rig.stick_forward.set(false);
        rig.controller.poll().unwrap();
        take_calls(&rig.log);

        rig.controller.release_all().unwrap();
        assert_eq!(
            take_calls(&rig.log).as_slice(),
            &[
                run(MotorId::Stick, MotorDirection::Release),
                run(MotorId::Boom, MotorDirection::Release),
                run(MotorId::Rotator, MotorDirection::Release),
                run(MotorId::Grip, MotorDirection::Release),
            ][..]
        );
    }

    #[test]
    fn release_all_keeps_going_past_a_failed_motor() {
        let mut rig = rig();

        rig.motor_faults[0].set(true);

        assert!(matches!(
            rig.controller.release_all(),
            Err(ControllerError::Runner(RunnerError::Motor(
                MotorId::Stick,
                MotorFault
            )))
        ));
        assert_eq!(
            take_calls(&rig.log).as_slice(),
            &[
                run(MotorId::Boom, MotorDirection::Release),
                run(MotorId::Rotator, MotorDirection::Release),
                run(MotorId::Grip, MotorDirection::Release),
            ][..]
        );
    }

    #[test]
    fn pin_read_failure_names_the_button() {
        let mut rig = rig();

        rig.pin_faults[2].set(true);
        assert!(matches!(
            rig.controller.poll(),
            Err(ControllerError::Button(
                ButtonId::RotationLeft,
                ButtonError::PinRead(PinFault)
            ))
        ));

        rig.pin_faults[2].set(false);
        rig.controller.poll().unwrap();
        assert!(rig.log.borrow().is_empty());
    }

    #[test]
    fn motor_failure_is_reported_and_the_queue_cleared() {
        let mut rig = rig();

        rig.motor_faults[1].set(true);
        rig.stick_forward.set(false);
        assert!(matches!(
            rig.controller.poll(),
            Err(ControllerError::Runner(RunnerError::Motor(
                MotorId::Boom,
                MotorFault
            )))
        ));
        assert!(rig.log.borrow().is_empty());

        // a failed command left queued would fill the single-slot queue
        rig.motor_faults[1].set(false);
        rig.rotation_left.set(false);
        rig.controller.poll().unwrap();
        assert_eq!(
            take_calls(&rig.log).as_slice(),
            &[run(MotorId::Rotator, MotorDirection::Forward)][..]
        );

        rig.stick_forward.set(true);
        rig.controller.poll().unwrap();
        assert_eq!(
            take_calls(&rig.log).as_slice(),
            &[run(MotorId::Boom, MotorDirection::Release)][..]
        );
    }

    #[test]
    fn unfinished_motor_command_is_an_error() {
        let parts = parts();
        let mut controller =
            ArmController::<Buttons, StalledMotors, BINDINGS_COUNT, ACTIVE_COMMANDS_COUNT>::new(
                parts.buttons,
                StalledMotors,
                &[],
            )
            .unwrap();

        let commands = [Command::Motor(
            MotorId::Boom,
            MotorAction::Run(MotorDirection::Forward),
        )];

        assert!(matches!(
            controller.setup(&commands),
            Err(ControllerError::CommandPending)
        ));
        // dropped from the queue, so the next attempt is not refused as full
        assert!(matches!(
            controller.setup(&commands),
            Err(ControllerError::CommandPending)
        ));
    }

    #[test]
    fn bindings_must_drive_a_direction() {
        let parts = parts();
        let mut bindings = get_button_bindings();
        bindings[3].direction = MotorDirection::Release;

        assert!(matches!(
            Controller::new(parts.buttons, parts.motors, &bindings),
            Err(ArmControllerBuildError::ReleaseBinding { index: 3 })
        ));
    }

    #[test]
    fn bindings_must_use_distinct_buttons() {
        let parts = parts();
        let mut bindings = get_button_bindings();
        bindings[2].button = ButtonId::StickForward;

        assert!(matches!(
            Controller::new(parts.buttons, parts.motors, &bindings),
            Err(ArmControllerBuildError::DuplicateButton { index: 2 })
        ));
    }

    #[test]
    fn bindings_must_fit_capacity() {
        let parts = parts();
        let bindings: [ArmBinding; 2] = [
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
        ];

        assert!(matches!(
            ArmController::<Buttons, Motors, 1, ACTIVE_COMMANDS_COUNT>::new(
                parts.buttons,
                parts.motors,
                &bindings
            ),
            Err(ArmControllerBuildError::TooManyBindings)
        ));
    }
}
