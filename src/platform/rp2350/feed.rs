//! RP2350 DMA feed channel implementation
//!
//! One DMA channel copies a word from static memory into the PIO input queue.
//! The read address does not increment, so every transfer re-reads the same
//! word; the write address does not increment either, so every transfer lands
//! in the queue. Pacing comes from the PIO TX data request.
//!
//! Completion is reported on `DMA_IRQ_1`. The channel is driven through raw
//! register access so the interrupt handler can acknowledge and re-arm it
//! without owning any HAL transfer state.

use core::sync::atomic::{AtomicU32, Ordering};

use crate::platform::{
    error::{FeedError, PlatformError},
    traits::FeedChannel,
    Result,
};
use rp235x_hal::pac;

/// Word the feed channel copies into the queue
///
/// The DMA engine reads this location directly.
static FEED_WORD: AtomicU32 = AtomicU32::new(0);

/// Transfer request line for PIO0 state machine 0 TX
pub const DREQ_PIO0_TX0: u8 = 0;

/// Largest transfer count the channel accepts (28-bit count field)
const MAX_TRANS_COUNT: u32 = (1 << 28) - 1;

// CH_CTRL_TRIG: EN
const CTRL_EN: u32 = 1 << 0;

/// RP2350 DMA feed channel
pub struct Rp2350FeedChannel {
    dma: pac::DMA,
    channel: usize,
    dest: u32,
    dreq: u8,
    burst: u32,
}

impl Rp2350FeedChannel {
    /// Take the DMA block out of reset and claim `channel`
    ///
    /// `dest` is the PIO TX FIFO address, `dreq` its data request line and
    /// `burst` the transfer count per arm.
    pub fn new(
        dma: pac::DMA,
        resets: &mut pac::RESETS,
        channel: usize,
        dest: u32,
        dreq: u8,
        burst: u32,
    ) -> Result<Self> {
        if channel >= 16 || burst == 0 || burst > MAX_TRANS_COUNT {
            return Err(PlatformError::InitializationFailed);
        }

        resets.reset().modify(|_, w| w.dma().clear_bit());
        while resets.reset_done().read().dma().bit_is_clear() {}

        Ok(Self {
            dma,
            channel,
            dest,
            dreq,
            burst,
        })
    }

    fn ch(&self) -> &pac::dma::CH {
        self.dma.ch(self.channel)
    }

    fn mask(&self) -> u32 {
        1 << self.channel
    }
}

impl FeedChannel for Rp2350FeedChannel {
    fn start(&mut self, source: u32) -> Result<()> {
        if self.ch().ch_ctrl_trig().read().busy().bit_is_set() {
            return Err(FeedError::Busy.into());
        }
        FEED_WORD.store(source, Ordering::Release);

        // Completion interrupt on IRQ 1
        let mask = self.mask();
        self.dma
            .inte1()
            .modify(|r, w| unsafe { w.bits(r.bits() | mask) });

        let ch = self.ch();
        ch.ch_read_addr()
            .write(|w| unsafe { w.bits(FEED_WORD.as_ptr() as u32) });
        ch.ch_write_addr().write(|w| unsafe { w.bits(self.dest) });
        ch.ch_trans_count().write(|w| unsafe { w.bits(self.burst) });
        ch.ch_ctrl_trig().write(|w| unsafe {
            w.data_size()
                .size_word()
                .incr_read()
                .clear_bit()
                .incr_write()
                .clear_bit()
                .treq_sel()
                .bits(self.dreq)
                .chain_to()
                .bits(self.channel as u8)
                .en()
                .set_bit()
        });
        Ok(())
    }

    fn acknowledge(&mut self) -> bool {
        let mask = self.mask();
        if self.dma.ints1().read().bits() & mask == 0 {
            return false;
        }
        // Write-one-to-clear
        self.dma.ints1().write(|w| unsafe { w.bits(mask) });
        true
    }

    fn restart(&mut self) -> Result<()> {
        let ch = self.ch();
        if ch.ch_ctrl_trig().read().busy().bit_is_set() {
            return Err(FeedError::Busy.into());
        }
        // Same source, destination and control; writing the count triggers
        ch.ch_al1_trans_count_trig()
            .write(|w| unsafe { w.bits(self.burst) });
        Ok(())
    }

    fn set_paused(&mut self, paused: bool) -> Result<()> {
        // CTRL alias 1 does not trigger
        self.ch().ch_al1_ctrl().modify(|r, w| unsafe {
            if paused {
                w.bits(r.bits() & !CTRL_EN)
            } else {
                w.bits(r.bits() | CTRL_EN)
            }
        });
        Ok(())
    }

    fn set_source(&mut self, source: u32) -> Result<()> {
        FEED_WORD.store(source, Ordering::Release);
        Ok(())
    }
}
