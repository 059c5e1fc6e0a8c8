//! Pulse controller main loop
//!
//! Ties the serial parser, the parameter store, the reconfiguration engine
//! and the feed engine together. One [`PulseController::poll`] is one main
//! loop iteration: read at most one command, act on it, reply.
//!
//! # Command handling
//!
//! | Input                  | Effect                                  | Reply           |
//! |------------------------|-----------------------------------------|-----------------|
//! | `G <key>`              | none                                    | `<value>\n`     |
//! | `S ...`, within bounds | sequencer reprogrammed, set replaced    | `OK\n`          |
//! | `S ...`, out of bounds | none                                    | `min_<key>=N\n` |
//! | malformed              | queued input discarded                  | `ERR <reason>\n`|
//!
//! Hardware faults end the loop: they come back as [`FirmwareError`]. That
//! includes a feed engine that failed to re-arm in its interrupt handler,
//! which is checked before every command.

use core::fmt;

use crate::config::FirmwareConfig;
use crate::parameters::{BoundViolation, ParamUpdate, ParameterStore};
use crate::platform::{
    traits::{SequencerInterface, SerialInterface},
    PlatformError,
};
use crate::protocol::{Command, CommandParser, ParseOutcome, Reply};
use crate::pulse::{FeedControl, Reconfigurator};

/// Unrecoverable controller error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "pico2_w", derive(defmt::Format))]
pub enum FirmwareError {
    /// Serial link, sequencer or feed channel could not be driven
    Platform(PlatformError),
    /// Built-in defaults violate a parameter bound
    InvalidDefaults(BoundViolation),
}

impl fmt::Display for FirmwareError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FirmwareError::Platform(e) => write!(f, "{}", e),
            FirmwareError::InvalidDefaults(v) => write!(f, "Invalid defaults: {}", v),
        }
    }
}

impl From<PlatformError> for FirmwareError {
    fn from(e: PlatformError) -> Self {
        FirmwareError::Platform(e)
    }
}

/// Controller counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ControllerStats {
    /// Commands parsed, valid or not
    pub commands: u32,
    /// `SET` commands that reached the hardware
    pub sets_applied: u32,
    /// Malformed commands
    pub protocol_errors: u32,
    /// `SET` commands refused by a bound check
    pub bound_violations: u32,
}

/// Main-loop owner of the live parameter set and the hardware
pub struct PulseController<U, S, F> {
    serial: U,
    parser: CommandParser,
    store: ParameterStore,
    reconfig: Reconfigurator<S>,
    feed: F,
    stats: ControllerStats,
}

impl<U, S, F> PulseController<U, S, F>
where
    U: SerialInterface,
    S: SequencerInterface,
    F: FeedControl,
{
    /// Create a controller over the given hardware
    ///
    /// Nothing is programmed until [`PulseController::start`].
    pub fn new(
        serial: U,
        sequencer: S,
        feed: F,
        config: &FirmwareConfig,
    ) -> Result<Self, FirmwareError> {
        let store = ParameterStore::new(config.defaults).map_err(FirmwareError::InvalidDefaults)?;
        Ok(Self {
            serial,
            parser: CommandParser::new(config.timeouts),
            store,
            reconfig: Reconfigurator::new(sequencer, config.reconfig),
            feed,
            stats: ControllerStats::default(),
        })
    }

    /// Program the defaults and arm the feed engine
    pub fn start(&mut self) -> Result<(), FirmwareError> {
        let defaults = *self.store.current();
        let (reconfig, feed) = (&mut self.reconfig, &mut self.feed);
        critical_section::with(|_| reconfig.apply(&defaults, feed))?;

        let source = self.reconfig.offset_word(defaults.offset);
        self.feed.arm(source)?;

        crate::log_info!(
            "Pulse controller started: offset={} length={} spacing={} repeats={}",
            defaults.offset,
            defaults.length,
            defaults.spacing,
            defaults.repeats
        );
        Ok(())
    }

    /// Run one main-loop iteration
    ///
    /// Returns the reply sent, or `None` if no command was pending.
    pub fn poll(&mut self) -> Result<Option<Reply>, FirmwareError> {
        if let Some(fault) = self.feed.fault() {
            crate::log_error!("Feed engine stopped: {}", fault);
            return Err(FirmwareError::Platform(fault));
        }

        let reply = match self.parser.poll(&mut self.serial)? {
            ParseOutcome::Idle => return Ok(None),
            ParseOutcome::Command(command) => {
                self.stats.commands = self.stats.commands.wrapping_add(1);
                self.handle(command)?
            }
            ParseOutcome::Rejected(err) => {
                self.stats.commands = self.stats.commands.wrapping_add(1);
                self.stats.protocol_errors = self.stats.protocol_errors.wrapping_add(1);
                crate::log_warn!("Command rejected: {}", err);
                Reply::Error(err)
            }
        };

        self.serial.write(reply.render().as_bytes())?;
        self.serial.flush()?;
        Ok(Some(reply))
    }

    fn handle(&mut self, command: Command) -> Result<Reply, FirmwareError> {
        match command {
            Command::Get(key) => Ok(Reply::Value(self.store.get(key))),
            Command::Set(update) => self.apply_update(&update),
        }
    }

    fn apply_update(&mut self, update: &ParamUpdate) -> Result<Reply, FirmwareError> {
        let proposal = match self.store.propose(update) {
            Ok(proposal) => proposal,
            Err(violation) => {
                self.stats.bound_violations = self.stats.bound_violations.wrapping_add(1);
                crate::log_warn!("SET refused: {}", violation);
                return Ok(Reply::Bound(violation));
            }
        };

        let (reconfig, feed) = (&mut self.reconfig, &mut self.feed);
        critical_section::with(|_| reconfig.apply(proposal.parameters(), feed))?;
        self.store.commit(proposal);
        self.stats.sets_applied = self.stats.sets_applied.wrapping_add(1);

        let p = self.store.current();
        crate::log_debug!(
            "SET applied: offset={} length={} spacing={} repeats={}",
            p.offset,
            p.length,
            p.spacing,
            p.repeats
        );
        Ok(Reply::Ok)
    }

    pub fn store(&self) -> &ParameterStore {
        &self.store
    }

    pub fn stats(&self) -> ControllerStats {
        self.stats
    }

    pub fn reconfigurator(&self) -> &Reconfigurator<S> {
        &self.reconfig
    }

    pub fn serial(&self) -> &U {
        &self.serial
    }

    pub fn serial_mut(&mut self) -> &mut U {
        &mut self.serial
    }

    pub fn feed(&self) -> &F {
        &self.feed
    }

    pub fn feed_mut(&mut self) -> &mut F {
        &mut self.feed
    }
}
