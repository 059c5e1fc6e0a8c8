//! RP2350 serial link implementation
//!
//! This module provides the command link over a `rp235x-hal` UART, with
//! per-read timeouts measured on the system timer.

use crate::platform::{
    error::{PlatformError, SerialError},
    traits::SerialInterface,
    Result,
};
use rp235x_hal::timer::{CopyableTimer0, Timer};
use rp235x_hal::uart::{
    Enabled, ReadError, ReadErrorType, UartDevice, UartPeripheral, ValidUartPinout,
};

/// RP2350 serial link
///
/// Wraps an enabled `rp235x-hal` UART. Line errors (framing, parity, break,
/// overrun) drop the affected byte and come back as [`SerialError`]; the
/// command parser replies with an error and resynchronises.
pub struct Rp2350Serial<D, P>
where
    D: UartDevice,
    P: ValidUartPinout<D>,
{
    uart: UartPeripheral<Enabled, D, P>,
    timer: Timer<CopyableTimer0>,
}

impl<D, P> Rp2350Serial<D, P>
where
    D: UartDevice,
    P: ValidUartPinout<D>,
{
    /// Create a serial link over an already enabled UART
    pub fn new(uart: UartPeripheral<Enabled, D, P>, timer: Timer<CopyableTimer0>) -> Self {
        Self { uart, timer }
    }

    fn now_us(&self) -> u64 {
        self.timer.get_counter().ticks()
    }

    /// Take one byte from the receive FIFO, if any
    fn try_read(&mut self) -> Result<Option<u8>> {
        if !self.uart.uart_is_readable() {
            return Ok(None);
        }
        let mut byte = [0u8; 1];
        match self.uart.read_raw(&mut byte) {
            Ok(1) => Ok(Some(byte[0])),
            Ok(_) | Err(nb::Error::WouldBlock) => Ok(None),
            Err(nb::Error::Other(ReadError { err_type, .. })) => {
                crate::log_warn!("UART line error, byte dropped");
                Err(PlatformError::Serial(line_error(err_type)))
            }
        }
    }
}

fn line_error(err_type: ReadErrorType) -> SerialError {
    match err_type {
        ReadErrorType::Overrun => SerialError::Overrun,
        ReadErrorType::Break => SerialError::Break,
        ReadErrorType::Parity => SerialError::ParityError,
        ReadErrorType::Framing => SerialError::FramingError,
    }
}

impl<D, P> SerialInterface for Rp2350Serial<D, P>
where
    D: UartDevice,
    P: ValidUartPinout<D>,
{
    fn read_byte(&mut self, timeout_ms: u32) -> Result<Option<u8>> {
        let start = self.now_us();
        let timeout_us = u64::from(timeout_ms) * 1_000;
        loop {
            if let Some(byte) = self.try_read()? {
                return Ok(Some(byte));
            }
            if self.now_us().wrapping_sub(start) >= timeout_us {
                return Ok(None);
            }
        }
    }

    fn write(&mut self, data: &[u8]) -> Result<usize> {
        // write_full_blocking() writes entire buffer
        self.uart.write_full_blocking(data);
        Ok(data.len())
    }

    fn discard_pending(&mut self, quiet_ms: u32) -> Result<usize> {
        let mut discarded = 0;
        loop {
            match self.read_byte(quiet_ms) {
                Ok(Some(_)) | Err(PlatformError::Serial(_)) => discarded += 1,
                Ok(None) => return Ok(discarded),
                Err(e) => return Err(e),
            }
        }
    }

    fn flush(&mut self) -> Result<()> {
        // Wait until UART is no longer busy (all data transmitted)
        while self.uart.uart_is_busy() {
            core::hint::spin_loop();
        }
        Ok(())
    }
}
