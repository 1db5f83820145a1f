#![no_std]
#![no_main]
#![deny(
    clippy::mem_forget,
    reason = "mem::forget is generally not safe to do with esp_hal types, especially those \
    holding buffers for the duration of a data transfer."
)]
#![deny(clippy::large_stack_frames)]

use core::fmt::Debug;

use esp_hal::{
    clock::CpuClock,
    delay::Delay,
    gpio::{Input, InputConfig, Level, Output, OutputConfig, Pull},
    i2c::master::{Config as I2cConfig, I2c},
    time::{Instant, Rate},
};
use log::{LevelFilter, info, warn};
use weld_core::{
    app::{Controller, ControllerConfig, ControllerError},
    render,
    sequencer::PulseSequencer,
};
use weld_hal_esp32s3::{platform::display::CharLcd, storage::flash_settings};

#[cfg(feature = "buttons")]
use weld_hal_esp32s3::input::buttons::{ButtonConfig, ButtonInput};
#[cfg(all(feature = "encoder", not(feature = "buttons")))]
use weld_core::input::encoder::EncoderConfig;
#[cfg(all(feature = "encoder", not(feature = "buttons")))]
use weld_hal_esp32s3::input::rotary::{RotaryConfig, RotaryInput};

#[cfg(not(any(feature = "encoder", feature = "buttons")))]
compile_error!("enable the `encoder` or the `buttons` feature");

const TITLE: &str = "CBAPKA";
const SUBTITLE: &str = "cv.fstudio.dev";
const SPLASH_MS: u32 = 2_000;
const POLL_PERIOD_MS: u32 = 1;
const LCD_I2C_ADDRESS: u8 = 0x27;
const LCD_I2C_KHZ: u32 = 100;
const ENCODER_DIRECTION_INVERTED: bool = false;
const ENCODER_DEBOUNCE_POLLS: u8 = 4;
const ENCODER_TRANSITIONS_PER_DETENT: u8 = 4;
const ENCODER_FAST_WINDOW_MS: u32 = 60;
const BUTTON_DEBOUNCE_POLLS: u8 = 10;

/// Remembers which fault classes were already reported.
#[derive(Debug, Default)]
struct FaultLog {
    input: bool,
    display: bool,
    store: bool,
    output: bool,
}

impl FaultLog {
    fn record<I, D, S, O>(&mut self, err: &ControllerError<I, D, S, O>)
    where
        I: Debug,
        D: Debug,
        S: Debug,
        O: Debug,
    {
        let (logged, class) = match err {
            ControllerError::Input(_) => (&mut self.input, "input"),
            ControllerError::Display(_) => (&mut self.display, "display"),
            ControllerError::Store(_) => (&mut self.store, "settings store"),
            ControllerError::Output(_) => (&mut self.output, "semistor output"),
        };
        if !*logged {
            *logged = true;
            warn!("{} fault: {:?}", class, err);
        }
    }
}

#[panic_handler]
fn panic(_: &core::panic::PanicInfo) -> ! {
    loop {}
}

// This creates a default app-descriptor required by the esp-idf bootloader.
// For more information see: <https://docs.espressif.com/projects/esp-idf/en/stable/esp32/api-reference/system/app_image_format.html#application-description>
esp_bootloader_esp_idf::esp_app_desc!();

#[allow(
    clippy::large_stack_frames,
    reason = "it's not unusual to allocate larger buffers etc. in main"
)]
#[esp_hal::main]
fn main() -> ! {
    esp_println::logger::init_logger(LevelFilter::Info);

    let config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
    let peripherals = esp_hal::init(config);

    // Semistor gate: held low until a fire sequence runs.
    let semistor = Output::new(peripherals.GPIO7, Level::Low, OutputConfig::default());

    // LCD backpack wiring: SDA=GPIO8, SCL=GPIO9
    let i2c = I2c::new(
        peripherals.I2C0,
        I2cConfig::default().with_frequency(Rate::from_khz(LCD_I2C_KHZ)),
    )
    .unwrap()
    .with_sda(peripherals.GPIO8)
    .with_scl(peripherals.GPIO9);

    let mut display = CharLcd::new(
        i2c,
        Delay::new(),
        hd44780::Config::default().with_address(LCD_I2C_ADDRESS),
    );
    if let Err(err) = display.initialize() {
        warn!("display initialize failed: {:?}", err);
    }
    if let Err(err) = render::draw_splash(&mut display, TITLE, SUBTITLE) {
        warn!("display splash failed: {:?}", err);
    }

    let delay = Delay::new();
    delay.delay_millis(SPLASH_MS);

    // Encoder wiring: CLK=GPIO10, DT=GPIO11, SW=GPIO12, fire=GPIO4
    #[cfg(all(feature = "encoder", not(feature = "buttons")))]
    let (input, controller_config) = {
        let input_cfg = InputConfig::default().with_pull(Pull::Up);
        (
            RotaryInput::new(
                Input::new(peripherals.GPIO10, input_cfg),
                Input::new(peripherals.GPIO11, input_cfg),
                Input::new(peripherals.GPIO12, input_cfg),
                Input::new(peripherals.GPIO4, input_cfg),
                RotaryConfig::default()
                    .with_direction_inverted(ENCODER_DIRECTION_INVERTED)
                    .with_debounce_polls(ENCODER_DEBOUNCE_POLLS)
                    .with_transitions_per_step(ENCODER_TRANSITIONS_PER_DETENT)
                    .with_encoder(
                        EncoderConfig::default().with_fast_window_ms(ENCODER_FAST_WINDOW_MS),
                    ),
            )
            .unwrap(),
            ControllerConfig::ENCODER,
        )
    };

    // Button wiring: fire=GPIO4, add=GPIO5, subtract=GPIO6, active high
    #[cfg(feature = "buttons")]
    let (input, controller_config) = {
        let button_cfg = InputConfig::default().with_pull(Pull::Down);
        (
            ButtonInput::new(
                Input::new(peripherals.GPIO5, button_cfg),
                Input::new(peripherals.GPIO6, button_cfg),
                Input::new(peripherals.GPIO4, button_cfg),
                ButtonConfig::default()
                    .with_active_high(true)
                    .with_debounce_polls(BUTTON_DEBOUNCE_POLLS),
            ),
            ControllerConfig::BUTTONS,
        )
    };

    let store = match flash_settings::open_settings_store() {
        Ok(store) => Some(store),
        Err(err) => {
            warn!("settings storage unavailable ({:?}); defaults will be volatile", err);
            None
        }
    };

    let mut controller = Controller::new(
        input,
        display,
        store,
        PulseSequencer::new(semistor, Delay::new()),
        controller_config,
    );
    let mut state = controller.boot();
    info!(
        "Welder ready: repeat={} delay_ms={} limits={:?}",
        state.settings.repeat_count, state.settings.delay_ms, controller_config.limits
    );

    let mut faults = FaultLog::default();
    let loop_start = Instant::now();

    loop {
        let now_ms = loop_start.elapsed().as_millis();
        match controller.poll_cycle(&mut state, now_ms) {
            Ok(report) if report.fired => {
                info!(
                    "fired {} pulses x {} ms",
                    state.settings.repeat_count, state.settings.delay_ms
                );
            }
            Ok(_) => {}
            Err(err) => faults.record(&err),
        }

        delay.delay_millis(POLL_PERIOD_MS);
    }
}
