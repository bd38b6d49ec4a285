//! # AT transaction engine
//!
//! Sends one command at a time and classifies the modem response.
//!
//! A transaction always consumes its full response window before the accumulated response is
//! classified, so a partial read never decides the outcome. The modem handles exactly one
//! outstanding command, which is why the engine is owned by a single [Adapter](crate::wifi::Adapter)
//! and all methods require `&mut self`.
use crate::commands::{AtCommand, ExpectsResponse};
use crate::responses::{Targets, TransactionOutcome};
use crate::serial::{DiagnosticSink, Error, SerialChannel, SerialConfig, RX_BUFFER_SIZE, TX_BUFFER_SIZE};
use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use fugit::TimerDurationU32;
use fugit_timer::Timer;
use log::{debug, warn};

/// Command terminator
const TERMINATOR: &[u8] = b"\r\n";

pub struct Engine<S: SerialChannel, D: DiagnosticSink, T: Timer<TIMER_HZ>, const TIMER_HZ: u32> {
    /// Byte channel to the modem
    pub(crate) channel: S,

    /// Output for transaction results if logging is enabled
    pub(crate) diagnostics: D,

    /// Timer used for timeout measurement and delays
    pub(crate) timer: T,

    /// Active channel configuration, restored after diagnostic redirection
    pub(crate) config: SerialConfig,
}

impl<S: SerialChannel, D: DiagnosticSink, T: Timer<TIMER_HZ>, const TIMER_HZ: u32> Engine<S, D, T, TIMER_HZ> {
    pub fn new(channel: S, diagnostics: D, timer: T) -> Self {
        Self {
            channel,
            diagnostics,
            timer,
            config: SerialConfig::default(),
        }
    }

    /// Applies the given configuration to the channel
    pub fn configure(&mut self, config: SerialConfig) -> Result<(), Error<S::Error>> {
        self.config = config;
        self.channel.configure(&config).map_err(Error::SerialError)?;
        self.channel.set_buffer_sizes(TX_BUFFER_SIZE, RX_BUFFER_SIZE);
        Ok(())
    }

    /// Writes the command followed by CRLF. The response is not touched.
    pub fn execute(&mut self, command: &[u8]) -> Result<(), Error<S::Error>> {
        debug!("AT > {}", String::from_utf8_lossy(command));

        self.channel.write_all(command).map_err(Error::SerialError)?;
        self.channel.write_all(TERMINATOR).map_err(Error::SerialError)?;
        self.channel.flush().map_err(Error::SerialError)
    }

    /// Writes a command which is not followed by a response window
    pub fn send<Cmd: AtCommand>(&mut self, command: &Cmd) -> Result<(), Error<S::Error>> {
        self.execute(command.as_bytes())
    }

    /// Full transaction: writes the command and classifies the response against the command's tokens
    pub fn transaction<Cmd: ExpectsResponse>(&mut self, command: &Cmd) -> TransactionOutcome {
        if let Err(error) = self.send(command) {
            warn!("Writing command failed: {:?}", error);
        }

        self.await_response(&Cmd::TARGETS, Cmd::TIMEOUT_MS)
    }

    /// Accumulates all received data for `timeout_ms` and classifies it afterwards
    ///
    /// Serial errors are absorbed: the channel is not read anymore, but the window is still fully consumed.
    pub fn await_response(&mut self, targets: &Targets, timeout_ms: u32) -> TransactionOutcome {
        let timeout = TimerDurationU32::<TIMER_HZ>::millis(timeout_ms);
        let start = self.timer.now();

        let mut response = Vec::new();
        let mut chunk = [0x0; RX_BUFFER_SIZE];
        let mut readable = true;

        while self.elapsed_since(start) < timeout {
            if !readable {
                continue;
            }

            if let Err(error) = self.read_chunk(&mut chunk, &mut response) {
                warn!("Reading response failed: {:?}", error);
                readable = false;
            }
        }

        let outcome = targets.classify(&response);
        let response = String::from_utf8_lossy(&response);
        debug!("AT < {:?} {}", outcome, response);

        self.log(outcome.label(), &response);
        outcome
    }

    /// Blocks for the given duration without touching the channel
    pub fn pause(&mut self, duration_ms: u32) -> Result<(), Error<S::Error>> {
        self.timer
            .start(TimerDurationU32::millis(duration_ms))
            .map_err(|_| Error::TimerError)?;
        nb::block!(self.timer.wait()).map_err(|_| Error::TimerError)
    }

    /// Writes a diagnostic line if logging is enabled
    ///
    /// A channel sharing its transport with the sink is reconfigured afterwards.
    pub fn log(&mut self, prefix: &str, message: &str) {
        if !self.config.logging_enabled() {
            return;
        }

        let redirected = self.channel.redirect_to_diagnostics().unwrap_or_else(|error| {
            warn!("Redirecting to diagnostics failed: {:?}", error);
            false
        });

        self.diagnostics.write_line(&format!("{} {}", prefix, message));

        if redirected {
            if let Err(error) = self.channel.configure(&self.config) {
                warn!("Restoring channel configuration failed: {:?}", error);
            }
        }
    }

    /// Reads at most one chunk of available bytes, the window is checked between reads
    fn read_chunk(&mut self, chunk: &mut [u8], response: &mut Vec<u8>) -> Result<(), Error<S::Error>> {
        if !self.channel.read_ready().map_err(Error::SerialError)? {
            return Ok(());
        }

        let length = self.channel.read(chunk).map_err(Error::SerialError)?;
        response.extend_from_slice(&chunk[..length]);
        Ok(())
    }

    /// Elapsed time since start, robust against timer overflow
    fn elapsed_since(&mut self, start: fugit::TimerInstantU32<TIMER_HZ>) -> TimerDurationU32<TIMER_HZ> {
        let now = self.timer.now();
        TimerDurationU32::from_ticks(now.ticks().wrapping_sub(start.ticks()))
    }
}
