//! # WIFI session and cloud uplink
//!
//! Joining a network and pushing data to ThingSpeak, AdafruitIO and IFTTT is supported.
//!
//! All operations are best effort: failures are absorbed and only reported by the diagnostic sink
//! (if logging is enabled) and the [log] facade. Whether the network was joined can be queried by
//! [Adapter::is_connected].
//!
//! ## Example
//!
//! ````
//! # use esp_at_uplink::example::{ExampleSerial, ExampleTimer};
//! # use esp_at_uplink::payload::Fields;
//! # use esp_at_uplink::serial::{NoDiagnostics, SerialConfig};
//! # use esp_at_uplink::wifi::Adapter;
//! #
//! let mut adapter: Adapter<_, _, _, 1_000> =
//!     Adapter::new(ExampleSerial::default(), NoDiagnostics, ExampleTimer::default());
//!
//! // Running the join handshake
//! adapter.join(SerialConfig::default(), "test_wifi");
//! assert!(adapter.is_connected());
//!
//! // Updating field1 and field3 of a ThingSpeak channel
//! let fields = Fields::new().with(1, 42.0).with(3, 21.5);
//! adapter.send_to_metrics_channel("write_key", fields);
//! ````
use crate::commands::{
    AccessPointConnectCommand, AccessPointDisconnectCommand, CloseSocketCommand, ConnectCommand,
    FirmwareVersionCommand, TestCommand, TransmissionCommand, TransmissionPrepareCommand, WifiModeCommand,
};
use crate::credential::Credentials;
use crate::engine::Engine;
use crate::payload::{ChannelUpdate, FeedValue, Fields, Payload, WebhookTrigger, WEBHOOK_VALUE_COUNT};
use crate::responses::TransactionOutcome;
use crate::serial::{DiagnosticSink, SerialChannel, SerialConfig};
use fugit_timer::Timer;
use log::{debug, info, warn};

/// Number of connect/send attempts per payload
pub const SEND_ATTEMPTS: usize = 2;

/// Delay in ms between announcing the transmission length and sending the data.
/// ESP-AT needs to switch to data input mode in the meantime.
pub const SETTLE_DELAY_MS: u32 = 500;

/// Length of the terminator which is appended to transmitted data
const TERMINATOR_LENGTH: usize = 2;

/// WIFI session state
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ConnectionState {
    /// No join was attempted yet
    Uninitialized,
    /// Handshake is currently running
    JoinInProgress,
    /// Last handshake was successful
    Connected,
    /// Last handshake failed or the network was left
    Disconnected,
}

/// Central client for network communication
///
/// TIMER_HZ: Frequency of the timer used for response windows and delays
pub struct Adapter<S: SerialChannel, D: DiagnosticSink, T: Timer<TIMER_HZ>, const TIMER_HZ: u32> {
    /// Transaction engine, owns the serial channel
    pub(crate) engine: Engine<S, D, T, TIMER_HZ>,

    /// Current WIFI state, changed only by join() and disconnect()
    state: ConnectionState,

    /// Passphrase rotation
    credentials: Credentials,
}

impl<S: SerialChannel, D: DiagnosticSink, T: Timer<TIMER_HZ>, const TIMER_HZ: u32> Adapter<S, D, T, TIMER_HZ> {
    /// Creates a new adapter using the default passphrase seed
    pub fn new(channel: S, diagnostics: D, timer: T) -> Self {
        Self::with_credentials(channel, diagnostics, timer, Credentials::default())
    }

    pub fn with_credentials(channel: S, diagnostics: D, timer: T, credentials: Credentials) -> Self {
        Self {
            engine: Engine::new(channel, diagnostics, timer),
            state: ConnectionState::Uninitialized,
            credentials,
        }
    }

    /// Configures the channel and runs the join handshake
    ///
    /// The session is connected only if ESP-AT reports an assigned IP within the response window.
    /// There is no retry, a failed join leaves the session disconnected.
    pub fn join(&mut self, config: SerialConfig, ssid: &str) {
        self.state = ConnectionState::Disconnected;

        if let Err(error) = self.engine.configure(config) {
            warn!("Configuring serial channel failed: {:?}", error);
            return;
        }

        let passphrase = self.credentials.next_passphrase();
        let Some(join_command) = AccessPointConnectCommand::new(ssid, &passphrase) else {
            warn!("SSID or passphrase exceeds max. length, join aborted");
            return;
        };

        self.state = ConnectionState::JoinInProgress;

        // Results of the preparing commands are informational only
        self.engine.transaction(&TestCommand);
        self.engine.transaction(&FirmwareVersionCommand);
        self.engine.transaction(&WifiModeCommand::station_mode());

        self.state = match self.engine.transaction(&join_command) {
            TransactionOutcome::MatchedPrimary => ConnectionState::Connected,
            _ => ConnectionState::Disconnected,
        };

        info!("Joining {} finished: {:?}", ssid, self.state);
    }

    /// Leaves the WIFI network. Does nothing if not connected.
    pub fn disconnect(&mut self) {
        if !self.is_connected() {
            return;
        }

        self.engine.transaction(&AccessPointDisconnectCommand);
        self.state = ConnectionState::Disconnected;
    }

    /// Returns true if the last join was successful and the network was not left since
    pub fn is_connected(&self) -> bool {
        self.state == ConnectionState::Connected
    }

    /// Returns the current session state
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Updates a ThingSpeak channel. Missing (NaN or infinite) fields are omitted.
    pub fn send_to_metrics_channel(&mut self, api_key: &str, fields: Fields) {
        self.send(&ChannelUpdate::new(api_key, fields));
    }

    /// Publishes a new value to an AdafruitIO feed
    pub fn send_to_data_feed(&mut self, username: &str, key: &str, feed: &str, value: &str) {
        self.send(&FeedValue::new(username, key, feed, value));
    }

    /// Triggers an IFTTT webhook event
    pub fn send_to_webhook(&mut self, event: &str, key: &str, values: [Option<&str>; WEBHOOK_VALUE_COUNT]) {
        self.send(&WebhookTrigger::new(event, key, values));
    }

    /// Transmits the payload to its target using a fresh TCP connection
    ///
    /// Does nothing if not connected. The TCP connection of a previous call is closed first.
    /// Connecting and sending is attempted up to [SEND_ATTEMPTS] times.
    pub fn send<P: Payload>(&mut self, payload: &P) {
        if !self.is_connected() {
            debug!("Not connected, dropping payload for {:?}", payload.target());
            return;
        }

        let target = payload.target();
        let policy = target.policy();

        // Close the previous TCP connection, fails if there is none
        self.engine.transaction(&CloseSocketCommand);

        let Some(connect) = ConnectCommand::tcp(target.host(), target.port(), policy.keep_alive) else {
            warn!("Host name {} exceeds max. command length", target.host());
            return;
        };

        let data = payload.encode();
        let Some(prepare) = TransmissionPrepareCommand::new(data.len() + TERMINATOR_LENGTH) else {
            return;
        };

        for attempt in 1..=SEND_ATTEMPTS {
            debug!("Sending to {:?}, attempt {}", target, attempt);

            if policy.close_after_send {
                self.engine.log("Establish TCP", "");
            }

            if self.engine.transaction(&connect) == TransactionOutcome::MatchedTertiary {
                continue;
            }

            self.engine.log("Send data", &data);
            if let Err(error) = self.engine.send(&prepare) {
                warn!("Preparing transmission failed: {:?}", error);
            }

            if let Err(error) = self.engine.pause(SETTLE_DELAY_MS) {
                warn!("Waiting for data input mode failed: {:?}", error);
            }

            let outcome = self.engine.transaction(&TransmissionCommand::new(data.as_bytes()));

            if policy.close_after_send {
                if outcome == TransactionOutcome::MatchedTertiary {
                    continue;
                }

                self.engine.log("Close TCP", "");
                self.engine.transaction(&CloseSocketCommand);
            }

            if outcome == TransactionOutcome::MatchedPrimary {
                return;
            }
        }

        warn!("Sending to {:?} failed", target);
    }
}
