//! # Serial link to the ESP-AT co-processor
//!
//! The modem is driven over a plain byte stream. Any UART driver can be used by implementing
//! [SerialChannel] on top of the [embedded_io] traits.
use core::fmt::Debug;
use embedded_io::{Read, ReadReady, Write};

/// Size of the UART transmit buffer in bytes
pub const TX_BUFFER_SIZE: usize = 128;

/// Size of the UART receive buffer in bytes. Responses are drained in chunks of this size.
pub const RX_BUFFER_SIZE: usize = 128;

/// Byte channel to the modem
///
/// Reading must never block: the engine checks [ReadReady::read_ready] before every read.
pub trait SerialChannel: Read + ReadReady + Write {
    /// (Re)applies pin and baud rate configuration to the channel
    fn configure(&mut self, config: &SerialConfig) -> Result<(), Self::Error>;

    /// Sets the driver buffer sizes in bytes
    fn set_buffer_sizes(&mut self, tx_size: usize, rx_size: usize);

    /// Routes subsequent output to the diagnostic transport.
    ///
    /// Returns true if the channel was actually redirected. In this case the engine restores the
    /// session configuration by calling [SerialChannel::configure] once the diagnostic line was written.
    /// Channels with a separate diagnostic transport keep the default.
    fn redirect_to_diagnostics(&mut self) -> Result<bool, Self::Error> {
        Ok(false)
    }
}

/// Output for diagnostic lines, e.g. a USB console
pub trait DiagnosticSink {
    /// Writes a single line of text
    fn write_line(&mut self, line: &str);
}

/// Sink discarding all diagnostic lines
#[derive(Default, Copy, Clone, Debug)]
pub struct NoDiagnostics;

impl DiagnosticSink for NoDiagnostics {
    fn write_line(&mut self, _line: &str) {}
}

/// Supported UART baud rates
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BaudRate {
    BaudRate9600,
    BaudRate19200,
    BaudRate38400,
    BaudRate57600,
    BaudRate115200,
}

impl BaudRate {
    /// Returns the rate in bits per second
    pub fn bps(&self) -> u32 {
        match self {
            BaudRate::BaudRate9600 => 9_600,
            BaudRate::BaudRate19200 => 19_200,
            BaudRate::BaudRate38400 => 38_400,
            BaudRate::BaudRate57600 => 57_600,
            BaudRate::BaudRate115200 => 115_200,
        }
    }
}

/// Diagnostic output of transaction results
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Logging {
    Off,
    On,
}

/// Pin, baud rate and logging configuration of a session
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SerialConfig {
    /// Transmit pin number
    pub tx_pin: u8,

    /// Receive pin number
    pub rx_pin: u8,

    /// UART speed
    pub baud_rate: BaudRate,

    /// If enabled, every transaction result is written to the [DiagnosticSink]
    pub logging: Logging,
}

impl SerialConfig {
    pub fn new(tx_pin: u8, rx_pin: u8, baud_rate: BaudRate, logging: Logging) -> Self {
        Self {
            tx_pin,
            rx_pin,
            baud_rate,
            logging,
        }
    }

    /// Returns true if diagnostic logging is enabled
    pub fn logging_enabled(&self) -> bool {
        self.logging == Logging::On
    }
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self::new(17, 16, BaudRate::BaudRate115200, Logging::Off)
    }
}

/// Low level errors of the engine primitives
#[derive(Clone, Debug, PartialEq)]
pub enum Error<E: Debug> {
    /// Upstream serial driver error
    SerialError(E),

    /// Upstream timer error
    TimerError,
}

#[cfg(feature = "defmt")]
impl<E: Debug> defmt::Format for Error<E> {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Error::SerialError(e) => defmt::write!(f, "Error::SerialError({})", defmt::Debug2Format(e)),
            Error::TimerError => defmt::write!(f, "Error::TimerError"),
        }
    }
}
