//! Mock feed channel implementation for testing

use super::hardware::{HardwareOp, MockHardware};
use crate::platform::{
    error::{FeedError, PlatformError},
    traits::FeedChannel,
    Result,
};

/// Mock feed channel
///
/// Writes into the same queue model as [`super::MockSequencer`]. Words only
/// move when the test calls [`MockHardware::service_feed`] (or when
/// interleaving is enabled).
#[derive(Debug)]
pub struct MockFeedChannel {
    hardware: MockHardware,
}

impl MockFeedChannel {
    pub(super) fn new(hardware: MockHardware) -> Self {
        Self { hardware }
    }
}

impl FeedChannel for MockFeedChannel {
    fn start(&mut self, source: u32) -> Result<()> {
        let mut s = self.hardware.state().borrow_mut();
        if s.feed_armed {
            return Err(PlatformError::Feed(FeedError::Busy));
        }
        s.feed_source = source;
        s.feed_armed = true;
        s.feed_remaining = s.feed_burst;
        s.ops.push(HardwareOp::FeedSource(source));
        s.ops.push(HardwareOp::FeedArmed);
        Ok(())
    }

    fn acknowledge(&mut self) -> bool {
        let mut s = self.hardware.state().borrow_mut();
        core::mem::replace(&mut s.feed_irq_pending, false)
    }

    fn restart(&mut self) -> Result<()> {
        let mut s = self.hardware.state().borrow_mut();
        if !s.feed_armed {
            return Err(FeedError::NotArmed.into());
        }
        if s.feed_remaining > 0 || s.feed_restart_fault {
            return Err(FeedError::Busy.into());
        }
        s.feed_remaining = s.feed_burst;
        s.ops.push(HardwareOp::FeedArmed);
        Ok(())
    }

    fn set_paused(&mut self, paused: bool) -> Result<()> {
        let mut s = self.hardware.state().borrow_mut();
        s.feed_paused = paused;
        s.ops.push(HardwareOp::FeedPaused(paused));
        Ok(())
    }

    fn set_source(&mut self, source: u32) -> Result<()> {
        let mut s = self.hardware.state().borrow_mut();
        s.feed_source = source;
        s.ops.push(HardwareOp::FeedSource(source));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_restart_requires_completed_transfer() {
        let hw = MockHardware::new(4);
        let mut feed = hw.feed_channel();
        assert_eq!(feed.restart(), Err(PlatformError::Feed(FeedError::NotArmed)));

        feed.start(1).unwrap();
        assert_eq!(feed.restart(), Err(PlatformError::Feed(FeedError::Busy)));

        hw.service_feed();
        assert!(feed.acknowledge());
        assert!(!feed.acknowledge());
        feed.restart().unwrap();
    }
}
