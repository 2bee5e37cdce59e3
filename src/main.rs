#![no_main]
#![no_std]

use robot_arm as _;

use core::fmt::Write as _;
use cortex_m_rt::entry;
use defmt::Debug2Format;
use fugit::{ExtU32, RateExtU32, TimerDurationU32 as TimerDuration};
use stm32f7xx_hal::{
    gpio::{Input, Output, Pin, PullUp, PushPull},
    pac,
    prelude::*,
    serial::{Config as SerialConfig, Serial},
    timer::Counter,
    watchdog::IndependentWatchdog,
};

use robot_arm::{
    actuators::motor::{ArmMotors, MotorDevice},
    config::{
        get_button_bindings, get_start_commands, ACTIVE_COMMANDS_COUNT, BINDINGS_COUNT,
        DIAGNOSTIC_BAUD_RATE, MOTOR_PWM_HZ, POLL_INTERVAL_MILLIS, TICK_TIMER_HZ,
        WATCHDOG_TIMEOUT_MILLIS,
    },
    controller::ArmController,
    diagnostics::SerialDiagnostics,
    drivers::motor_shield::{MotorChannel, MotorShield},
    init_heap,
    sensors::button::{ArmButtons, ButtonActiveLow, ButtonDevice},
    timer::{Ticker, TickerError},
};

type TickTimerDevice = Counter<pac::TIM5, TICK_TIMER_HZ>;
type TickTimer = Ticker<TickTimerDevice, TICK_TIMER_HZ>;

/* joystick buttons, Arduino header of the Nucleo-F767ZI */

type StickForwardPin = Pin<'C', 0, Input<PullUp>>; // A1
type StickBackwardPin = Pin<'A', 3, Input<PullUp>>; // A0
type RotationLeftPin = Pin<'C', 3, Input<PullUp>>; // A2
type RotationRightPin = Pin<'F', 3, Input<PullUp>>; // A3

type StickForward = ButtonDevice<StickForwardPin, ButtonActiveLow>;
type StickBackward = ButtonDevice<StickBackwardPin, ButtonActiveLow>;
type RotationLeft = ButtonDevice<RotationLeftPin, ButtonActiveLow>;
type RotationRight = ButtonDevice<RotationRightPin, ButtonActiveLow>;

/* motor shield */

type ShieldLatchPin = Pin<'A', 6, Output<PushPull>>; // D12
type ShieldClockPin = Pin<'F', 14, Output<PushPull>>; // D4
type ShieldDataPin = Pin<'F', 12, Output<PushPull>>; // D8
type ShieldEnablePin = Pin<'F', 13, Output<PushPull>>; // D7

#[entry]
fn main() -> ! {
    init_heap();

    defmt::println!("Init!");

    let p = pac::Peripherals::take().expect("Peripherals already taken");

    let rcc = p.RCC.constrain();
    let clocks = rcc.cfgr.sysclk(216.MHz()).freeze();

    let gpioa = p.GPIOA.split();
    let gpioc = p.GPIOC.split();
    let gpiod = p.GPIOD.split();
    let gpioe = p.GPIOE.split();
    let gpiof = p.GPIOF.split();

    let diagnostic_serial_tx = gpiod.pd8.into_alternate();
    let diagnostic_serial_rx = gpiod.pd9.into_alternate();
    let diagnostic_serial = Serial::new(
        p.USART3,
        (diagnostic_serial_tx, diagnostic_serial_rx),
        &clocks,
        SerialConfig {
            baud_rate: DIAGNOSTIC_BAUD_RATE.bps(),
            ..Default::default()
        },
    );
    let (diagnostic_tx, _diagnostic_rx) = diagnostic_serial.split();
    let mut diagnostics = SerialDiagnostics::new(diagnostic_tx);

    let stick_forward_pin: StickForwardPin = gpioc.pc0.into_pull_up_input();
    let stick_backward_pin: StickBackwardPin = gpioa.pa3.into_pull_up_input();
    let rotation_left_pin: RotationLeftPin = gpioc.pc3.into_pull_up_input();
    let rotation_right_pin: RotationRightPin = gpiof.pf3.into_pull_up_input();

    let buttons = ArmButtons::new(
        StickForward::new_active_low(stick_forward_pin),
        StickBackward::new_active_low(stick_backward_pin),
        RotationLeft::new_active_low(rotation_left_pin),
        RotationRight::new_active_low(rotation_right_pin),
    );

    let shield_latch_pin: ShieldLatchPin = gpioa.pa6.into_push_pull_output();
    let shield_clock_pin: ShieldClockPin = gpiof.pf14.into_push_pull_output();
    let shield_data_pin: ShieldDataPin = gpiof.pf12.into_push_pull_output();
    let shield_enable_pin: ShieldEnablePin = gpiof.pf13.into_push_pull_output();

    let shield = MotorShield::new(
        shield_latch_pin,
        shield_clock_pin,
        shield_data_pin,
        shield_enable_pin,
    )
    .expect("Failed to enable motor shield");

    // D6, D5, D3
    let (rotator_pwm, grip_pwm, boom_pwm) = p
        .TIM1
        .pwm_hz(
            (
                gpioe.pe9.into_alternate(),
                gpioe.pe11.into_alternate(),
                gpioe.pe13.into_alternate(),
            ),
            MOTOR_PWM_HZ.Hz(),
            &clocks,
        )
        .split();

    // D11
    let stick_pwm = p
        .TIM3
        .pwm_hz(gpioa.pa7.into_alternate(), MOTOR_PWM_HZ.Hz(), &clocks)
        .split();

    let stick = MotorDevice::new(
        shield
            .motor(MotorChannel::M1, stick_pwm)
            .expect("Failed to claim stick motor"),
    );
    let boom = MotorDevice::new(
        shield
            .motor(MotorChannel::M2, boom_pwm)
            .expect("Failed to claim boom motor"),
    );
    let rotator = MotorDevice::new(
        shield
            .motor(MotorChannel::M3, rotator_pwm)
            .expect("Failed to claim rotator motor"),
    );
    let grip = MotorDevice::new(
        shield
            .motor(MotorChannel::M4, grip_pwm)
            .expect("Failed to claim grip motor"),
    );

    let motors = ArmMotors::new(stick, boom, rotator, grip);

    let mut controller: ArmController<_, _, BINDINGS_COUNT, ACTIVE_COMMANDS_COUNT> =
        ArmController::new(buttons, motors, &get_button_bindings())
            .expect("Invalid button bindings");

    let tick_timer_device: TickTimerDevice = p.TIM5.counter_us(&clocks);
    let mut ticker: TickTimer = Ticker::new(
        tick_timer_device,
        TimerDuration::<TICK_TIMER_HZ>::millis(POLL_INTERVAL_MILLIS),
    );

    let mut iwdg = IndependentWatchdog::new(p.IWDG);

    if let Err(err) = write!(diagnostics, "robot-arm ready\r\n") {
        defmt::println!("Diagnostic serial error: {}", Debug2Format(&err));
    }

    match controller.setup(&get_start_commands()) {
        Ok(()) => {
            iwdg.start(WATCHDOG_TIMEOUT_MILLIS.millis());

            loop {
                if let Err(err) = controller.poll() {
                    defmt::println!("Unexpected controller error: {}", Debug2Format(&err));
                    break;
                }

                if let Err(err) = wait_interval(&mut ticker, &mut iwdg) {
                    defmt::println!("Unexpected ticker error: {}", Debug2Format(&err));
                    break;
                }
            }
        }
        Err(err) => {
            defmt::println!("Unexpected setup error: {}", Debug2Format(&err));
        }
    }

    if let Err(err) = controller.release_all() {
        defmt::println!("Failed to release motors: {}", Debug2Format(&err));
    }

    // the watchdog is no longer fed, so this ends in a reset once started
    loop {
        cortex_m::asm::nop();
    }
}

fn wait_interval(
    ticker: &mut TickTimer,
    iwdg: &mut IndependentWatchdog,
) -> Result<(), TickerError<<TickTimerDevice as fugit_timer::Timer<TICK_TIMER_HZ>>::Error>> {
    if !ticker.is_started() {
        ticker.start()?;
    }

    loop {
        match ticker.wait() {
            Ok(()) => return Ok(()),
            Err(nb::Error::WouldBlock) => iwdg.feed(),
            Err(nb::Error::Other(err)) => return Err(err),
        }
    }
}
