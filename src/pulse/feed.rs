//! Continuous feed engine
//!
//! Keeps the sequencer's input queue topped up with the (biased) offset word
//! without main-loop involvement. The underlying channel has a bounded
//! transfer count; the completion interrupt acknowledges and re-arms the same
//! transfer, which gives an unbounded feed.
//!
//! # Ownership
//!
//! The interrupt handler only ever calls [`FeedEngine::on_complete`]. It never
//! sees the parameter set. The main loop reaches the engine through
//! [`FeedControl`], which it uses to arm the engine once at startup and to hold
//! it for the duration of a reconfiguration.
//!
//! A failed re-arm stops the feed for good. The engine keeps the error and
//! reports it through [`FeedControl::fault`] so the main loop can stop too.
//!
//! On hardware the engine lives in a `static` [`FeedCell`] shared with the
//! interrupt handler; [`SharedFeed`] is the main loop's handle to it.

use core::cell::RefCell;
use critical_section::Mutex;

use crate::platform::{
    error::{FeedError, PlatformError},
    traits::FeedChannel,
    Result,
};

/// What happens to the feed engine's source word when the offset changes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "pico2_w", derive(defmt::Format))]
pub enum FeedSourcePolicy {
    /// Source latched once at arming; only the words pushed by a
    /// reconfiguration carry a new offset
    Fixed,
    /// Source rewritten during every reconfiguration, while the feed is held
    TrackOffset,
}

/// Main-loop side of the feed engine
pub trait FeedControl {
    /// Latch `source` and start feeding
    fn arm(&mut self, source: u32) -> Result<()>;

    /// Stop writing into the queue until [`FeedControl::resume`]
    fn pause(&mut self) -> Result<()>;

    /// Release a [`FeedControl::pause`]
    fn resume(&mut self) -> Result<()>;

    /// Replace the latched source word
    fn latch(&mut self, source: u32) -> Result<()>;

    /// Error recorded by the completion interrupt, if the feed has stopped
    fn fault(&self) -> Option<PlatformError>;
}

/// Feed engine over one bulk-transfer channel
#[derive(Debug)]
pub struct FeedEngine<C> {
    channel: C,
    armed: bool,
    completions: u32,
    fault: Option<PlatformError>,
}

impl<C> FeedEngine<C> {
    pub const fn new(channel: C) -> Self {
        Self {
            channel,
            armed: false,
            completions: 0,
            fault: None,
        }
    }

    /// Number of completion interrupts serviced
    pub fn completions(&self) -> u32 {
        self.completions
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }
}

impl<C: FeedChannel> FeedEngine<C> {
    /// Completion interrupt body: acknowledge, then re-arm the same transfer
    ///
    /// Returns `Ok(false)` for a spurious call (flag not raised). A failed
    /// re-arm is kept as the engine's fault; the flag is already cleared, so
    /// no further interrupt will retry it.
    pub fn on_complete(&mut self) -> Result<bool> {
        if !self.channel.acknowledge() {
            return Ok(false);
        }
        if let Err(e) = self.channel.restart() {
            if self.fault.is_none() {
                self.fault = Some(e);
            }
            return Err(e);
        }
        self.completions = self.completions.wrapping_add(1);
        Ok(true)
    }
}

impl<C: FeedChannel> FeedControl for FeedEngine<C> {
    fn arm(&mut self, source: u32) -> Result<()> {
        if self.armed {
            return Err(PlatformError::Feed(FeedError::Busy));
        }
        self.channel.start(source)?;
        self.armed = true;
        crate::log_info!("Feed engine armed with source word {}", source);
        Ok(())
    }

    fn pause(&mut self) -> Result<()> {
        self.channel.set_paused(true)
    }

    fn resume(&mut self) -> Result<()> {
        self.channel.set_paused(false)
    }

    fn latch(&mut self, source: u32) -> Result<()> {
        self.channel.set_source(source)
    }

    fn fault(&self) -> Option<PlatformError> {
        self.fault
    }
}

/// Storage for a feed engine shared with interrupt context
pub type FeedCell<C> = Mutex<RefCell<Option<FeedEngine<C>>>>;

/// Handle to a feed engine held in a [`FeedCell`]
///
/// Every access runs inside a critical section. Before
/// [`SharedFeed::install`] every operation fails with
/// [`PlatformError::ResourceUnavailable`].
pub struct SharedFeed<C: 'static> {
    cell: &'static FeedCell<C>,
}

impl<C: 'static> SharedFeed<C> {
    pub const fn new(cell: &'static FeedCell<C>) -> Self {
        Self { cell }
    }

    /// Move `engine` into the shared cell, replacing any previous one
    pub fn install(&self, engine: FeedEngine<C>) {
        critical_section::with(|cs| {
            self.cell.borrow_ref_mut(cs).replace(engine);
        });
    }

    fn with<R>(&self, f: impl FnOnce(&mut FeedEngine<C>) -> Result<R>) -> Result<R> {
        critical_section::with(|cs| match self.cell.borrow_ref_mut(cs).as_mut() {
            Some(engine) => f(engine),
            None => Err(PlatformError::ResourceUnavailable),
        })
    }

    /// Completion interrupts serviced so far (0 before install)
    pub fn completions(&self) -> u32 {
        critical_section::with(|cs| {
            self.cell
                .borrow_ref(cs)
                .as_ref()
                .map_or(0, FeedEngine::completions)
        })
    }
}

impl<C: FeedChannel + 'static> SharedFeed<C> {
    /// Interrupt handler body
    pub fn on_interrupt(&self) -> Result<bool> {
        self.with(FeedEngine::on_complete)
    }
}

impl<C: FeedChannel + 'static> FeedControl for SharedFeed<C> {
    fn arm(&mut self, source: u32) -> Result<()> {
        self.with(|engine| engine.arm(source))
    }

    fn pause(&mut self) -> Result<()> {
        self.with(FeedControl::pause)
    }

    fn resume(&mut self) -> Result<()> {
        self.with(FeedControl::resume)
    }

    fn latch(&mut self, source: u32) -> Result<()> {
        self.with(|engine| engine.latch(source))
    }

    fn fault(&self) -> Option<PlatformError> {
        critical_section::with(|cs| {
            self.cell
                .borrow_ref(cs)
                .as_ref()
                .and_then(|engine| engine.fault())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::mock::MockHardware;
    use crate::platform::traits::SequencerInterface;

    #[test]
    fn test_arm_once() {
        let hw = MockHardware::new(4);
        let mut engine = FeedEngine::new(hw.feed_channel());
        engine.arm(8).unwrap();
        assert!(engine.is_armed());
        assert_eq!(engine.arm(8), Err(PlatformError::Feed(FeedError::Busy)));
    }

    #[test]
    fn test_spurious_interrupt_is_ignored() {
        let hw = MockHardware::new(4);
        let mut engine = FeedEngine::new(hw.feed_channel());
        engine.arm(8).unwrap();
        assert_eq!(engine.on_complete(), Ok(false));
        assert_eq!(engine.completions(), 0);
    }

    #[test]
    fn test_rearm_gives_unbounded_feed() {
        let hw = MockHardware::new(4);
        hw.sequencer(0).set_enabled(true).unwrap();

        let mut engine = FeedEngine::new(hw.feed_channel());
        engine.arm(8).unwrap();

        for _ in 0..50 {
            hw.service_feed();
            assert!(hw.feed_irq_pending());
            assert_eq!(engine.on_complete(), Ok(true));
            hw.consume(4);
        }
        assert_eq!(engine.completions(), 50);
        assert_eq!(hw.feed_written(), 200);
    }

    #[test]
    fn test_pause_holds_the_channel() {
        let hw = MockHardware::new(4);
        let mut engine = FeedEngine::new(hw.feed_channel());
        engine.arm(8).unwrap();
        engine.pause().unwrap();
        assert_eq!(hw.service_feed(), 0);

        engine.resume().unwrap();
        assert_eq!(hw.service_feed(), 4);
    }

    #[test]
    fn test_latch_replaces_source() {
        let hw = MockHardware::new(2);
        let mut engine = FeedEngine::new(hw.feed_channel());
        engine.arm(8).unwrap();
        engine.latch(48).unwrap();
        hw.service_feed();
        assert_eq!(hw.fifo(), vec![48, 48]);
    }

    #[test]
    fn test_failed_rearm_is_kept_as_fault() {
        let hw = MockHardware::new(4);
        let mut engine = FeedEngine::new(hw.feed_channel());
        engine.arm(8).unwrap();
        assert_eq!(engine.fault(), None);

        hw.service_feed();
        hw.set_feed_restart_fault(true);
        let err = PlatformError::Feed(FeedError::Busy);
        assert_eq!(engine.on_complete(), Err(err));
        assert_eq!(engine.fault(), Some(err));
        assert_eq!(engine.completions(), 0);

        // Flag already cleared: nothing left to retry
        assert_eq!(engine.on_complete(), Ok(false));
        assert_eq!(engine.fault(), Some(err));
    }

    fn leak_cell() -> &'static FeedCell<crate::platform::mock::MockFeedChannel> {
        std::boxed::Box::leak(std::boxed::Box::new(Mutex::new(RefCell::new(None))))
    }

    #[test]
    fn test_shared_feed_requires_install() {
        let mut shared = SharedFeed::new(leak_cell());
        assert_eq!(shared.arm(8), Err(PlatformError::ResourceUnavailable));
        assert_eq!(shared.on_interrupt(), Err(PlatformError::ResourceUnavailable));
        assert_eq!(shared.completions(), 0);
        assert_eq!(shared.fault(), None);
    }

    #[test]
    fn test_shared_feed_interrupt_path() {
        let hw = MockHardware::new(4);
        hw.sequencer(0).set_enabled(true).unwrap();

        let mut shared = SharedFeed::new(leak_cell());
        shared.install(FeedEngine::new(hw.feed_channel()));
        shared.arm(8).unwrap();

        for _ in 0..3 {
            hw.service_feed();
            assert_eq!(shared.on_interrupt(), Ok(true));
            hw.consume(4);
        }
        assert_eq!(shared.completions(), 3);

        shared.pause().unwrap();
        assert!(hw.feed_paused());
        shared.resume().unwrap();
        assert!(!hw.feed_paused());
    }

    #[test]
    fn test_shared_feed_reports_interrupt_fault() {
        let hw = MockHardware::new(4);
        let mut shared = SharedFeed::new(leak_cell());
        shared.install(FeedEngine::new(hw.feed_channel()));
        shared.arm(8).unwrap();

        hw.service_feed();
        hw.set_feed_restart_fault(true);
        let err = PlatformError::Feed(FeedError::Busy);
        assert_eq!(shared.on_interrupt(), Err(err));
        assert_eq!(shared.fault(), Some(err));
    }
}
