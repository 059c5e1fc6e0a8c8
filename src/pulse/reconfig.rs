//! Sequencer reconfiguration
//!
//! Moves the sequencer from the old parameter set to a new one. The feed
//! engine may have partly drained or refilled the queue, so nothing about the
//! queue is assumed: it is cleared, then over-provisioned before execution
//! resumes.
//!
//! # Sequence
//!
//! ```text
//! feed.pause()                        hold the feed channel
//! [feed.latch(offset word)]           TrackOffset policy only
//! 1. disable sequencer
//! 2. clear input + output queues
//! 3. restart, then `pull noblock` + `out null, 32` to flush the shift register
//! 4. push encoded word
//! 5. push offset word × prefill
//! 6. `jmp <program offset>`
//! 7. enable sequencer
//! feed.resume()
//! ```
//!
//! Steps 1-7 must run in this order. Any failure is a hardware fault and is
//! returned to the caller unretried.

use super::codec::EncodedWord;
use super::feed::{FeedControl, FeedSourcePolicy};
use crate::parameters::ParameterSet;
use crate::platform::{
    traits::{SequencerInstruction, SequencerInterface},
    Result,
};

/// Tunables for the reconfiguration sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconfigSettings {
    /// Offset words pushed after the encoded word
    pub prefill_words: usize,
    /// Subtracted from the offset before it is sent to the microprogram
    pub offset_bias: u32,
    /// Whether the feed engine's source follows offset changes
    pub feed_policy: FeedSourcePolicy,
}

/// Drives the sequencer through the reset/reprogram/restart sequence
#[derive(Debug)]
pub struct Reconfigurator<S> {
    sequencer: S,
    settings: ReconfigSettings,
    applied: u32,
}

impl<S: SequencerInterface> Reconfigurator<S> {
    pub fn new(sequencer: S, settings: ReconfigSettings) -> Self {
        Self {
            sequencer,
            settings,
            applied: 0,
        }
    }

    /// Word the microprogram expects for `offset`
    pub fn offset_word(&self, offset: u32) -> u32 {
        offset.saturating_sub(self.settings.offset_bias)
    }

    /// Program `params` into the sequencer
    ///
    /// `feed` is held for the whole sequence so no feed write can land between
    /// the queue clear and the prefill.
    pub fn apply<F: FeedControl>(
        &mut self,
        params: &ParameterSet,
        feed: &mut F,
    ) -> Result<EncodedWord> {
        let word = EncodedWord::from(params);
        let offset_word = self.offset_word(params.offset);

        feed.pause()?;
        if self.settings.feed_policy == FeedSourcePolicy::TrackOffset {
            feed.latch(offset_word)?;
        }
        self.program(word, offset_word)?;
        feed.resume()?;

        self.applied = self.applied.wrapping_add(1);
        crate::log_debug!(
            "Sequencer reprogrammed: word={} offset_word={}",
            word.bits(),
            offset_word
        );
        Ok(word)
    }

    fn program(&mut self, word: EncodedWord, offset_word: u32) -> Result<()> {
        let seq = &mut self.sequencer;

        seq.set_enabled(false)?;
        seq.clear_fifos()?;

        seq.restart()?;
        seq.exec(SequencerInstruction::PullNonBlocking)?;
        seq.exec(SequencerInstruction::OutNull32)?;

        seq.push(word.bits())?;
        for _ in 0..self.settings.prefill_words {
            seq.push(offset_word)?;
        }

        let entry = seq.program_offset();
        seq.exec(SequencerInstruction::Jump(entry))?;
        seq.set_enabled(true)
    }

    /// Number of successful reconfigurations
    pub fn applied(&self) -> u32 {
        self.applied
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::error::{PlatformError, SequencerError};
    use crate::platform::mock::{HardwareOp, MockHardware, MockSequencer, TX_FIFO_DEPTH};
    use crate::pulse::codec::encode;
    use crate::pulse::feed::{FeedCell, FeedEngine, SharedFeed};
    use core::cell::RefCell;
    use critical_section::Mutex;

    const SETTINGS: ReconfigSettings = ReconfigSettings {
        prefill_words: 7,
        offset_bias: 2,
        feed_policy: FeedSourcePolicy::Fixed,
    };

    const PROGRAM_OFFSET: u8 = 5;

    fn setup(
        settings: ReconfigSettings,
    ) -> (
        MockHardware,
        Reconfigurator<MockSequencer>,
        FeedEngine<crate::platform::mock::MockFeedChannel>,
    ) {
        let hw = MockHardware::new(16);
        let reconfig = Reconfigurator::new(hw.sequencer(PROGRAM_OFFSET), settings);
        let feed = FeedEngine::new(hw.feed_channel());
        (hw, reconfig, feed)
    }

    #[test]
    fn test_steps_run_in_order() {
        let (hw, mut reconfig, mut feed) = setup(SETTINGS);
        let params = ParameterSet::new(50, 30, 10, 3);

        let word = reconfig.apply(&params, &mut feed).unwrap();
        assert_eq!(word, encode(3, 30, 10));

        let mut expected = vec![
            HardwareOp::FeedPaused(true),
            HardwareOp::Enable(false),
            HardwareOp::ClearFifos,
            HardwareOp::Restart,
            HardwareOp::Exec(SequencerInstruction::PullNonBlocking),
            HardwareOp::Exec(SequencerInstruction::OutNull32),
            HardwareOp::Push(word.bits()),
        ];
        expected.extend(core::iter::repeat(HardwareOp::Push(48)).take(7));
        expected.extend([
            HardwareOp::Exec(SequencerInstruction::Jump(PROGRAM_OFFSET)),
            HardwareOp::Enable(true),
            HardwareOp::FeedPaused(false),
        ]);
        assert_eq!(hw.ops(), expected);
        assert_eq!(hw.program_counter(), Some(PROGRAM_OFFSET));
        assert!(hw.is_enabled());
        assert_eq!(reconfig.applied(), 1);
    }

    #[test]
    fn test_queue_holds_word_then_prefill() {
        let (hw, mut reconfig, mut feed) = setup(SETTINGS);
        let params = ParameterSet::new(10, 4, 7, 0);

        let word = reconfig.apply(&params, &mut feed).unwrap();

        let mut expected = vec![word.bits()];
        expected.extend([8; 7]);
        assert_eq!(hw.fifo(), expected);
    }

    #[test]
    fn test_stale_queue_contents_are_discarded() {
        let (hw, mut reconfig, mut feed) = setup(SETTINGS);
        feed.arm(1234).unwrap();
        hw.service_feed();
        assert_eq!(hw.fifo().len(), TX_FIFO_DEPTH);

        let word = reconfig
            .apply(&ParameterSet::new(10, 4, 7, 0), &mut feed)
            .unwrap();
        assert_eq!(hw.fifo()[0], word.bits());
        assert!(!hw.fifo().contains(&1234));
    }

    #[test]
    fn test_feed_preempting_every_step_cannot_corrupt_queue() {
        let (hw, mut reconfig, mut feed) = setup(SETTINGS);
        feed.arm(1234).unwrap();
        hw.set_interleave_feed(true);

        let word = reconfig
            .apply(&ParameterSet::new(10, 4, 7, 0), &mut feed)
            .unwrap();

        let mut expected = vec![word.bits()];
        expected.extend([8; 7]);
        assert_eq!(hw.fifo(), expected);
        assert!(!hw.feed_paused());
    }

    #[test]
    fn test_rearm_between_clear_and_push_cannot_corrupt_queue() {
        let hw = MockHardware::new(4);
        let cell: &'static FeedCell<crate::platform::mock::MockFeedChannel> =
            std::boxed::Box::leak(std::boxed::Box::new(Mutex::new(RefCell::new(None))));
        let mut feed = SharedFeed::new(cell);
        feed.install(FeedEngine::new(hw.feed_channel()));
        feed.arm(1234).unwrap();
        hw.service_feed();
        assert!(hw.feed_irq_pending());
        hw.set_interleave_feed(true);

        // Completion handler fires after step 2 (third sequencer access)
        let mut accesses = 0;
        hw.set_interrupt_hook(move || {
            accesses += 1;
            if accesses == 3 {
                assert_eq!(SharedFeed::new(cell).on_interrupt(), Ok(true));
            }
        });

        let mut reconfig = Reconfigurator::new(hw.sequencer(PROGRAM_OFFSET), SETTINGS);
        let word = reconfig
            .apply(&ParameterSet::new(10, 4, 7, 0), &mut feed)
            .unwrap();

        assert_eq!(feed.completions(), 1);
        assert!(!hw.feed_irq_pending());
        let mut expected = vec![word.bits()];
        expected.extend([8; 7]);
        assert_eq!(hw.fifo(), expected);

        let ops = hw.ops();
        let position = |target: HardwareOp| ops.iter().rposition(|op| *op == target);
        let clear = position(HardwareOp::ClearFifos).unwrap();
        let rearm = position(HardwareOp::FeedArmed).unwrap();
        let push = position(HardwareOp::Push(word.bits())).unwrap();
        assert!(clear < rearm && rearm < push);
    }

    #[test]
    fn test_fixed_policy_keeps_feed_source() {
        let (hw, mut reconfig, mut feed) = setup(SETTINGS);
        feed.arm(8).unwrap();
        reconfig
            .apply(&ParameterSet::new(50, 4, 7, 0), &mut feed)
            .unwrap();
        assert_eq!(hw.feed_source(), 8);
    }

    #[test]
    fn test_track_policy_latches_new_offset_while_paused() {
        let settings = ReconfigSettings {
            feed_policy: FeedSourcePolicy::TrackOffset,
            ..SETTINGS
        };
        let (hw, mut reconfig, mut feed) = setup(settings);
        feed.arm(8).unwrap();
        hw.clear_ops();

        reconfig
            .apply(&ParameterSet::new(50, 4, 7, 0), &mut feed)
            .unwrap();
        assert_eq!(hw.feed_source(), 48);

        let ops = hw.ops();
        assert_eq!(ops[0], HardwareOp::FeedPaused(true));
        assert_eq!(ops[1], HardwareOp::FeedSource(48));
        assert_eq!(ops[2], HardwareOp::Enable(false));
    }

    #[test]
    fn test_offset_word_is_biased() {
        let (_hw, reconfig, _feed) = setup(SETTINGS);
        assert_eq!(reconfig.offset_word(2), 0);
        assert_eq!(reconfig.offset_word(50), 48);
        assert_eq!(reconfig.offset_word(0), 0);
    }

    #[test]
    fn test_prefill_overflow_is_fatal() {
        let settings = ReconfigSettings {
            prefill_words: TX_FIFO_DEPTH,
            ..SETTINGS
        };
        let (_hw, mut reconfig, mut feed) = setup(settings);
        assert_eq!(
            reconfig.apply(&ParameterSet::new(10, 4, 7, 0), &mut feed),
            Err(PlatformError::Sequencer(SequencerError::FifoFull))
        );
        assert_eq!(reconfig.applied(), 0);
    }

    #[test]
    fn test_unreachable_sequencer_is_fatal() {
        let (hw, mut reconfig, mut feed) = setup(SETTINGS);
        hw.set_offline(true);
        assert_eq!(
            reconfig.apply(&ParameterSet::new(10, 4, 7, 0), &mut feed),
            Err(PlatformError::ResourceUnavailable)
        );
    }
}
