//! Pulse trigger firmware for Raspberry Pi Pico 2
//!
//! Waits for a rising edge on the trigger input, then emits a pulse train on
//! the output pin. Timing is set over UART0 with the `G`/`S` command protocol.
//!
//! # Hardware
//!
//! | Signal        | Pin    |
//! |---------------|--------|
//! | UART0 TX      | GPIO0  |
//! | UART0 RX      | GPIO1  |
//! | Trigger input | GPIO14 |
//! | Pulse output  | GPIO15 |
//!
//! # Usage
//!
//! ```bash
//! cargo build --release --target thumbv8m.main-none-eabihf --features pico2_w --bin pulse_trigger
//! probe-rs run --chip RP2350 target/thumbv8m.main-none-eabihf/release/pulse_trigger
//! ```

#![no_std]
#![no_main]

use core::cell::RefCell;

use critical_section::Mutex;
use fugit::RateExtU32;
use pulse_trigger::platform::error::{PlatformError, SequencerError};
use pulse_trigger::platform::rp2350::{
    Rp2350FeedChannel, Rp2350Sequencer, Rp2350Serial, DREQ_PIO0_TX0,
};
use pulse_trigger::pulse::{FeedCell, FeedEngine, SharedFeed};
use pulse_trigger::{log_error, log_info, FirmwareConfig, FirmwareError, PulseController};
use rp235x_hal as hal;
use {defmt_rtt as _, panic_probe as _};

use hal::clocks::Clock;
use hal::pac::interrupt;
use hal::pio::{Buffers, PIOBuilder, PIOExt, PinDir, ShiftDirection};
use hal::uart::{DataBits, StopBits, UartConfig, UartPeripheral};

/// Tell the Boot ROM about our application
#[link_section = ".start_block"]
#[used]
pub static IMAGE_DEF: hal::block::ImageDef = hal::block::ImageDef::secure_exe();

/// External crystal frequency
const XTAL_FREQ_HZ: u32 = 12_000_000;

/// Host link baud rate
const UART_BAUD: u32 = 115_200;

const TRIGGER_PIN: u8 = 14;
const OUTPUT_PIN: u8 = 15;

/// DMA channel used by the feed engine
const FEED_DMA_CHANNEL: usize = 0;

static FEED: FeedCell<Rp2350FeedChannel> = Mutex::new(RefCell::new(None));

#[hal::entry]
fn main() -> ! {
    let config = FirmwareConfig::DEFAULT;

    let mut pac = hal::pac::Peripherals::take().unwrap();
    let mut watchdog = hal::Watchdog::new(pac.WATCHDOG);
    let clocks = hal::clocks::init_clocks_and_plls(
        XTAL_FREQ_HZ,
        pac.XOSC,
        pac.CLOCKS,
        pac.PLL_SYS,
        pac.PLL_USB,
        &mut pac.RESETS,
        &mut watchdog,
    )
    .unwrap();

    let timer = hal::Timer::new_timer0(pac.TIMER0, &mut pac.RESETS, &clocks);
    let sio = hal::Sio::new(pac.SIO);
    let pins = hal::gpio::Pins::new(
        pac.IO_BANK0,
        pac.PADS_BANK0,
        sio.gpio_bank0,
        &mut pac.RESETS,
    );

    // Host link
    let uart_pins = (
        pins.gpio0.into_function::<hal::gpio::FunctionUart>(),
        pins.gpio1.into_function::<hal::gpio::FunctionUart>(),
    );
    let uart = UartPeripheral::new(pac.UART0, uart_pins, &mut pac.RESETS)
        .enable(
            UartConfig::new(UART_BAUD.Hz(), DataBits::Eight, None, StopBits::One),
            clocks.peripheral_clock.freq(),
        )
        .unwrap();
    let serial = Rp2350Serial::new(uart, timer);

    // Sequencer pins: trigger pulled low when floating, output at full drive
    let _trigger = pins
        .gpio14
        .into_function::<hal::gpio::FunctionPio0>()
        .into_pull_type::<hal::gpio::PullDown>();
    let mut output = pins.gpio15.into_function::<hal::gpio::FunctionPio0>();
    output.set_drive_strength(hal::gpio::OutputDriveStrength::TwelveMilliAmps);

    // `pull block` loads the configuration word once; the loop then takes one
    // offset word per trigger and replays the configuration from ISR.
    let program = pio_proc::pio_asm!(
        ".side_set 1",
        "    pull block          side 0",
        "    mov isr, osr        side 0",
        ".wrap_target",
        "    pull block          side 0",
        "    mov x, osr          side 0",
        "    mov osr, isr        side 0",
        "    out y, 5            side 0",
        "    wait 1 pin 0        side 0",
        "delay:",
        "    jmp x-- delay       side 0",
        "pulse:",
        "    mov osr, isr        side 0",
        "    out null, 5         side 0",
        "    out x, 7            side 1",
        "high:",
        "    jmp x-- high        side 1",
        "    out x, 20           side 0",
        "low:",
        "    jmp x-- low         side 0",
        "    jmp y-- pulse       side 0",
        "    wait 0 pin 0        side 0",
        ".wrap",
    );

    let (mut pio, sm0, _, _, _) = pac.PIO0.split(&mut pac.RESETS);
    let installed = match pio.install(&program.program) {
        Ok(installed) => installed,
        Err(_) => halt(PlatformError::from(SequencerError::ProgramLoadFailed).into()),
    };
    let program_offset = installed.offset();
    let (mut sm, _rx, tx) = PIOBuilder::from_installed_program(installed)
        .side_set_pin_base(OUTPUT_PIN)
        .in_pin_base(TRIGGER_PIN)
        .out_shift_direction(ShiftDirection::Right)
        .autopull(false)
        .buffers(Buffers::OnlyTx)
        .clock_divisor_fixed_point(1, 0)
        .build(sm0);
    sm.set_pindirs([(OUTPUT_PIN, PinDir::Output), (TRIGGER_PIN, PinDir::Input)]);
    let sequencer = Rp2350Sequencer::new(sm, tx, program_offset);

    // Feed engine
    let feed_channel = Rp2350FeedChannel::new(
        pac.DMA,
        &mut pac.RESETS,
        FEED_DMA_CHANNEL,
        sequencer.fifo_address(),
        DREQ_PIO0_TX0,
        config.feed_burst,
    )
    .unwrap_or_else(|e| halt(e.into()));
    let feed = SharedFeed::new(&FEED);
    feed.install(FeedEngine::new(feed_channel));
    unsafe {
        cortex_m::peripheral::NVIC::unmask(hal::pac::Interrupt::DMA_IRQ_1);
    }

    log_info!(
        "Pulse trigger: program at {}, sys clock {} Hz",
        program_offset,
        clocks.system_clock.freq().to_Hz()
    );

    let mut controller = match PulseController::new(serial, sequencer, feed, &config) {
        Ok(controller) => controller,
        Err(e) => halt(e),
    };
    if let Err(e) = controller.start() {
        halt(e);
    }

    loop {
        if let Err(e) = controller.poll() {
            halt(e);
        }
    }
}

fn halt(error: FirmwareError) -> ! {
    log_error!("Fatal: {}", error);
    panic!("pulse controller stopped");
}

/// Feed engine completion: acknowledge and re-arm the same transfer
///
/// A failed re-arm stays recorded in the engine; the next `poll` in the main
/// loop returns it and the firmware halts.
#[interrupt]
fn DMA_IRQ_1() {
    if let Err(e) = SharedFeed::new(&FEED).on_interrupt() {
        log_error!("Feed re-arm failed: {}", e);
    }
}

/// Program metadata for `picotool info`
#[link_section = ".bi_entries"]
#[used]
pub static PICOTOOL_ENTRIES: [hal::binary_info::EntryAddr; 4] = [
    hal::binary_info::rp_cargo_bin_name!(),
    hal::binary_info::rp_cargo_version!(),
    hal::binary_info::rp_program_description!(c"Trigger-synchronised pulse generator"),
    hal::binary_info::rp_program_build_attribute!(),
];
