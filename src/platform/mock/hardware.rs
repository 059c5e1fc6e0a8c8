//! Shared sequencer + feed channel model
//!
//! The sequencer's input queue is the one resource both the main loop and the
//! feed engine write to, so the mock sequencer and the mock feed channel are
//! two handles onto the same `HardwareState`.

use crate::platform::traits::SequencerInstruction;
use core::cell::RefCell;
use core::fmt;
use std::boxed::Box;
use std::collections::VecDeque;
use std::rc::Rc;
use std::vec::Vec;

/// Depth of the sequencer input queue (TX FIFO joined with the RX FIFO)
pub const TX_FIFO_DEPTH: usize = 8;

/// One operation observed on the modelled hardware, in issue order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HardwareOp {
    /// Sequencer enabled or disabled
    Enable(bool),
    /// Both sequencer queues cleared
    ClearFifos,
    /// Sequencer internal state reset
    Restart,
    /// Instruction injected
    Exec(SequencerInstruction),
    /// Word pushed by the main loop
    Push(u32),
    /// Feed channel paused or released
    FeedPaused(bool),
    /// Feed channel source word replaced
    FeedSource(u32),
    /// Feed channel armed (first start or re-arm)
    FeedArmed,
}

#[derive(Debug, Default)]
pub(super) struct HardwareState {
    pub fifo: VecDeque<u32>,
    pub enabled: bool,
    pub pc: Option<u8>,
    pub osr: Option<u32>,
    pub offline: bool,
    pub interleave_feed: bool,
    pub ops: Vec<HardwareOp>,

    pub feed_source: u32,
    pub feed_armed: bool,
    pub feed_paused: bool,
    pub feed_burst: u32,
    pub feed_remaining: u32,
    pub feed_irq_pending: bool,
    pub feed_written: usize,
    pub feed_restart_fault: bool,
}

impl HardwareState {
    /// Let the feed channel write as far as pacing allows
    pub fn service_feed(&mut self) -> usize {
        if !self.feed_armed || self.feed_paused {
            return 0;
        }

        let mut written = 0;
        while self.feed_remaining > 0 && self.fifo.len() < TX_FIFO_DEPTH {
            self.fifo.push_back(self.feed_source);
            self.feed_remaining -= 1;
            written += 1;
        }
        if written > 0 && self.feed_remaining == 0 {
            self.feed_irq_pending = true;
        }
        self.feed_written += written;
        written
    }

    /// Called before every main-loop hardware access when interleaving is on
    pub fn preempt(&mut self) {
        if self.interleave_feed {
            self.service_feed();
        }
    }
}

/// Code run in place of an interrupt, before a sequencer access
#[derive(Default)]
struct InterruptHook(Option<Box<dyn FnMut()>>);

impl fmt::Debug for InterruptHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = if self.0.is_some() { "set" } else { "unset" };
        write!(f, "InterruptHook({})", state)
    }
}

/// Handle onto the modelled sequencer and feed channel
///
/// Cloning the handle shares the same state.
#[derive(Debug, Clone)]
pub struct MockHardware {
    state: Rc<RefCell<HardwareState>>,
    hook: Rc<RefCell<InterruptHook>>,
}

impl MockHardware {
    /// Create a model whose feed channel moves `feed_burst` words per arm
    pub fn new(feed_burst: u32) -> Self {
        let state = HardwareState {
            feed_burst,
            ..HardwareState::default()
        };
        Self {
            state: Rc::new(RefCell::new(state)),
            hook: Rc::new(RefCell::new(InterruptHook::default())),
        }
    }

    pub(super) fn state(&self) -> &Rc<RefCell<HardwareState>> {
        &self.state
    }

    /// Run `hook` before every sequencer access
    ///
    /// Stands in for an interrupt handler that fires between two main-loop
    /// hardware accesses. The hardware state is not borrowed while it runs,
    /// so the hook may drive the feed channel.
    pub fn set_interrupt_hook(&self, hook: impl FnMut() + 'static) {
        self.hook.borrow_mut().0 = Some(Box::new(hook));
    }

    pub(super) fn run_interrupt_hook(&self) {
        let hook = self.hook.borrow_mut().0.take();
        if let Some(mut hook) = hook {
            hook();
            let mut slot = self.hook.borrow_mut();
            if slot.0.is_none() {
                slot.0 = Some(hook);
            }
        }
    }

    /// Sequencer handle whose microprogram is loaded at `program_offset`
    pub fn sequencer(&self, program_offset: u8) -> super::MockSequencer {
        super::MockSequencer::new(self.clone(), program_offset)
    }

    /// Feed channel handle
    pub fn feed_channel(&self) -> super::MockFeedChannel {
        super::MockFeedChannel::new(self.clone())
    }

    /// Let the feed channel write as far as pacing allows
    ///
    /// Returns the number of words written into the queue.
    pub fn service_feed(&self) -> usize {
        self.state.borrow_mut().service_feed()
    }

    /// Service the feed channel before every sequencer access
    ///
    /// Models the feed engine preempting the main loop at every instruction
    /// boundary of a reconfiguration.
    pub fn set_interleave_feed(&self, interleave: bool) {
        self.state.borrow_mut().interleave_feed = interleave;
    }

    /// Make every feed channel re-arm fail
    pub fn set_feed_restart_fault(&self, fault: bool) {
        self.state.borrow_mut().feed_restart_fault = fault;
    }

    /// Make every sequencer access fail
    pub fn set_offline(&self, offline: bool) {
        self.state.borrow_mut().offline = offline;
    }

    /// Pop up to `count` words as the running microprogram would
    ///
    /// Nothing is consumed while the sequencer is disabled.
    pub fn consume(&self, count: usize) -> Vec<u32> {
        let mut state = self.state.borrow_mut();
        if !state.enabled {
            return Vec::new();
        }
        let take = count.min(state.fifo.len());
        state.fifo.drain(..take).collect()
    }

    /// Snapshot of the input queue, front first
    pub fn fifo(&self) -> Vec<u32> {
        self.state.borrow().fifo.iter().copied().collect()
    }

    /// Every operation issued so far
    pub fn ops(&self) -> Vec<HardwareOp> {
        self.state.borrow().ops.clone()
    }

    /// Forget the operation log
    pub fn clear_ops(&self) {
        self.state.borrow_mut().ops.clear();
    }

    /// Program counter after the last jump, `None` after a restart
    pub fn program_counter(&self) -> Option<u8> {
        self.state.borrow().pc
    }

    /// Whether the sequencer is executing
    pub fn is_enabled(&self) -> bool {
        self.state.borrow().enabled
    }

    /// Word the feed channel currently copies
    pub fn feed_source(&self) -> u32 {
        self.state.borrow().feed_source
    }

    /// Whether the feed channel is held
    pub fn feed_paused(&self) -> bool {
        self.state.borrow().feed_paused
    }

    /// Whether a completion interrupt is waiting to be serviced
    pub fn feed_irq_pending(&self) -> bool {
        self.state.borrow().feed_irq_pending
    }

    /// Total words written by the feed channel
    pub fn feed_written(&self) -> usize {
        self.state.borrow().feed_written
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::traits::{FeedChannel, SequencerInterface};

    #[test]
    fn test_feed_is_paced_by_queue_room() {
        let hw = MockHardware::new(100);
        let mut feed = hw.feed_channel();
        feed.start(7).unwrap();

        assert_eq!(hw.service_feed(), TX_FIFO_DEPTH);
        assert_eq!(hw.service_feed(), 0);
        assert!(!hw.feed_irq_pending());
    }

    #[test]
    fn test_feed_raises_irq_when_count_exhausted() {
        let hw = MockHardware::new(3);
        let mut feed = hw.feed_channel();
        feed.start(7).unwrap();

        assert_eq!(hw.service_feed(), 3);
        assert!(hw.feed_irq_pending());
        assert_eq!(hw.fifo(), vec![7, 7, 7]);
    }

    #[test]
    fn test_paused_feed_writes_nothing() {
        let hw = MockHardware::new(3);
        let mut feed = hw.feed_channel();
        feed.start(7).unwrap();
        feed.set_paused(true).unwrap();

        assert_eq!(hw.service_feed(), 0);
        assert!(hw.fifo().is_empty());
    }

    #[test]
    fn test_consume_requires_enabled_sequencer() {
        let hw = MockHardware::new(3);
        let mut seq = hw.sequencer(0);
        seq.push(1).unwrap();
        seq.push(2).unwrap();

        assert!(hw.consume(1).is_empty());
        seq.set_enabled(true).unwrap();
        assert_eq!(hw.consume(1), vec![1]);
        assert_eq!(hw.fifo(), vec![2]);
    }
}
