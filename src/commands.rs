use crate::responses::Targets;
use core::fmt::Write;
use heapless::String;

/// Max. encoded length of a parameterized command, excluding the CRLF terminator
pub const COMMAND_CAPACITY: usize = 128;

/// Max. SSID length in bytes
pub const MAX_SSID_LENGTH: usize = 32;

/// Max. WIFI passphrase length in bytes
pub const MAX_PASSPHRASE_LENGTH: usize = 63;

/// Encoded AT command
pub trait AtCommand {
    /// Returns the command text without terminator
    fn as_bytes(&self) -> &[u8];
}

/// Command which gets answered by the modem and classified against a set of tokens
pub trait ExpectsResponse: AtCommand {
    /// Classification tokens
    const TARGETS: Targets;

    /// Length of the response window
    const TIMEOUT_MS: u32;
}

/// Attention command, just checks that the modem is responding
pub struct TestCommand;

impl AtCommand for TestCommand {
    fn as_bytes(&self) -> &[u8] {
        b"AT"
    }
}

impl ExpectsResponse for TestCommand {
    const TARGETS: Targets = Targets::generic();
    const TIMEOUT_MS: u32 = 1_000;
}

/// Queries the AT and SDK version information
pub struct FirmwareVersionCommand;

impl AtCommand for FirmwareVersionCommand {
    fn as_bytes(&self) -> &[u8] {
        b"AT+GMR"
    }
}

impl ExpectsResponse for FirmwareVersionCommand {
    const TARGETS: Targets = Targets::generic();
    const TIMEOUT_MS: u32 = 1_000;
}

/// Sets the WIFI mode
pub struct WifiModeCommand {
    /// Encoded command including the mode argument
    encoded: &'static [u8],
}

impl WifiModeCommand {
    /// Station mode (1). Other ESP-AT modes are 0: RF disabled, 2: SoftAP, 3: SoftAP+Station.
    pub fn station_mode() -> Self {
        Self {
            encoded: b"AT+CWMODE=1",
        }
    }
}

impl AtCommand for WifiModeCommand {
    fn as_bytes(&self) -> &[u8] {
        self.encoded
    }
}

impl ExpectsResponse for WifiModeCommand {
    const TARGETS: Targets = Targets::generic();
    const TIMEOUT_MS: u32 = 1_000;
}

/// Command for joining the target WIFI access point
pub struct AccessPointConnectCommand {
    encoded: String<COMMAND_CAPACITY>,
}

impl AccessPointConnectCommand {
    /// Returns None if SSID or passphrase exceed the max. length supported by ESP-AT
    pub fn new(ssid: &str, passphrase: &str) -> Option<Self> {
        if ssid.len() > MAX_SSID_LENGTH || passphrase.len() > MAX_PASSPHRASE_LENGTH {
            return None;
        }

        let mut encoded = String::new();
        write!(encoded, "AT+CWJAP=\"{}\",\"{}\"", ssid, passphrase).ok()?;
        Some(Self { encoded })
    }
}

impl AtCommand for AccessPointConnectCommand {
    fn as_bytes(&self) -> &[u8] {
        self.encoded.as_bytes()
    }
}

impl ExpectsResponse for AccessPointConnectCommand {
    const TARGETS: Targets = Targets::join();
    const TIMEOUT_MS: u32 = 5_000;
}

/// Leaves the current access point
pub struct AccessPointDisconnectCommand;

impl AtCommand for AccessPointDisconnectCommand {
    fn as_bytes(&self) -> &[u8] {
        b"AT+CWQAP"
    }
}

impl ExpectsResponse for AccessPointDisconnectCommand {
    const TARGETS: Targets = Targets::generic();
    const TIMEOUT_MS: u32 = 2_000;
}

/// Establishes a TCP connection in single connection mode
pub struct ConnectCommand {
    encoded: String<COMMAND_CAPACITY>,
}

impl ConnectCommand {
    /// TCP connection to the given host name
    ///
    /// If `keep_alive` is set, TCP keep-alive is enabled with an interval of one second.
    pub fn tcp(host: &str, port: u16, keep_alive: bool) -> Option<Self> {
        let mut encoded = String::new();
        write!(encoded, "AT+CIPSTART=\"TCP\",\"{}\",{}", host, port).ok()?;

        if keep_alive {
            encoded.push_str(",1").ok()?;
        }

        Some(Self { encoded })
    }
}

impl AtCommand for ConnectCommand {
    fn as_bytes(&self) -> &[u8] {
        self.encoded.as_bytes()
    }
}

impl ExpectsResponse for ConnectCommand {
    const TARGETS: Targets = Targets::connect();
    const TIMEOUT_MS: u32 = 2_000;
}

/// Announces the length of the following data transmission
pub struct TransmissionPrepareCommand {
    encoded: String<COMMAND_CAPACITY>,
}

impl TransmissionPrepareCommand {
    /// Length in bytes, including the terminator appended by the engine
    pub fn new(length: usize) -> Option<Self> {
        let mut encoded = String::new();
        write!(encoded, "AT+CIPSEND={}", length).ok()?;
        Some(Self { encoded })
    }
}

impl AtCommand for TransmissionPrepareCommand {
    fn as_bytes(&self) -> &[u8] {
        self.encoded.as_bytes()
    }
}

/// Raw socket data, sent after [TransmissionPrepareCommand]
pub struct TransmissionCommand<'a> {
    data: &'a [u8],
}

impl<'a> TransmissionCommand<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }
}

impl AtCommand for TransmissionCommand<'_> {
    fn as_bytes(&self) -> &[u8] {
        self.data
    }
}

impl ExpectsResponse for TransmissionCommand<'_> {
    const TARGETS: Targets = Targets::transmission();
    const TIMEOUT_MS: u32 = 5_000;
}

/// Closes the TCP connection
pub struct CloseSocketCommand;

impl AtCommand for CloseSocketCommand {
    fn as_bytes(&self) -> &[u8] {
        b"AT+CIPCLOSE"
    }
}

impl ExpectsResponse for CloseSocketCommand {
    const TARGETS: Targets = Targets::generic();
    const TIMEOUT_MS: u32 = 2_000;
}
