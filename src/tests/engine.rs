use crate::commands::{TestCommand, TransmissionCommand};
use crate::engine::Engine;
use crate::responses::{Targets, TransactionOutcome};
use crate::serial::{BaudRate, Error, Logging, SerialConfig};
use crate::tests::mock::{ChannelEvent, MockSerial, MockTimer, RecordingSink};
use core::sync::atomic::Ordering;

type EngineType = Engine<MockSerial, RecordingSink, MockTimer, 1_000_000>;

/// Response exceeding the receive buffer size, token at the very end
const LONG_RESPONSE: &[u8] = b"+IPD,0,200:0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef\r\nSEND OK\r\n";

fn logging_config() -> SerialConfig {
    SerialConfig::new(17, 16, BaudRate::BaudRate115200, Logging::On)
}

#[test]
fn test_execute_appends_terminator() {
    let clock = MockTimer::clock();
    let mut engine: EngineType = Engine::new(MockSerial::new(), RecordingSink::default(), MockTimer::simulated(&clock));

    engine.execute(b"AT+GMR").unwrap();

    let commands = engine.channel.get_commands_as_strings();
    assert_eq!(1, commands.len());
    assert_eq!("AT+GMR\r\n", commands[0]);
}

#[test]
fn test_transaction_matched_primary() {
    let clock = MockTimer::clock();
    let mut serial = MockSerial::new();
    serial.add_ok_response();

    let mut engine: EngineType = Engine::new(serial, RecordingSink::default(), MockTimer::simulated(&clock));

    assert_eq!(TransactionOutcome::MatchedPrimary, engine.transaction(&TestCommand));
    assert_eq!(vec!["AT\r\n"], engine.channel.get_commands_as_strings());
}

#[test]
fn test_transaction_matched_secondary() {
    let clock = MockTimer::clock();
    let mut serial = MockSerial::new();
    serial.add_error_response();

    let mut engine: EngineType = Engine::new(serial, RecordingSink::default(), MockTimer::simulated(&clock));
    assert_eq!(TransactionOutcome::MatchedSecondary, engine.transaction(&TestCommand));
}

#[test]
fn test_transaction_primary_wins_over_other_tokens() {
    let clock = MockTimer::clock();
    let mut serial = MockSerial::new();
    serial.add_response(b"ERROR\r\nSEND FAIL\r\nSEND OK\r\n");

    let mut engine: EngineType = Engine::new(serial, RecordingSink::default(), MockTimer::simulated(&clock));
    let outcome = engine.transaction(&TransmissionCommand::new(b"data"));

    assert_eq!(TransactionOutcome::MatchedPrimary, outcome);
}

#[test]
fn test_timeout_consumes_full_window() {
    let clock = MockTimer::clock();
    let mut engine: EngineType = Engine::new(MockSerial::new(), RecordingSink::default(), MockTimer::simulated(&clock));

    for timeout_ms in [1, 250, 2_000] {
        let start = clock.load(Ordering::SeqCst);
        let outcome = engine.await_response(&Targets::generic(), timeout_ms);

        assert_eq!(TransactionOutcome::Timeout, outcome);
        assert!(clock.load(Ordering::SeqCst) - start >= timeout_ms * 1_000);
    }
}

#[test]
fn test_match_does_not_end_window_early() {
    let clock = MockTimer::clock();
    let mut serial = MockSerial::new();
    serial.add_ok_response();

    let mut engine: EngineType = Engine::new(serial, RecordingSink::default(), MockTimer::simulated(&clock));
    let start = clock.load(Ordering::SeqCst);

    assert_eq!(TransactionOutcome::MatchedPrimary, engine.transaction(&TestCommand));
    assert!(clock.load(Ordering::SeqCst) - start >= 1_000_000);
}

#[test]
fn test_response_accumulated_across_reads() {
    let clock = MockTimer::clock();
    let mut serial = MockSerial::new();
    serial.read_chunk(7);
    serial.add_response(LONG_RESPONSE);

    let mut engine: EngineType = Engine::new(serial, RecordingSink::default(), MockTimer::simulated(&clock));
    engine.configure(logging_config()).unwrap();

    let outcome = engine.transaction(&TransmissionCommand::new(b"data"));
    assert_eq!(TransactionOutcome::MatchedPrimary, outcome);

    // Message boundaries are preserved
    let expected = alloc::format!("Response1 {}", core::str::from_utf8(LONG_RESPONSE).unwrap());
    assert_eq!(vec![expected], engine.diagnostics.lines);
}

#[test]
fn test_continuous_data_does_not_extend_window() {
    let clock = MockTimer::clock();
    let mut serial = MockSerial::new();
    serial.stream(&clock, 1_000_000);

    let mut engine: EngineType = Engine::new(serial, RecordingSink::default(), MockTimer::simulated(&clock));
    let start = clock.load(Ordering::SeqCst);

    assert_eq!(TransactionOutcome::Timeout, engine.await_response(&Targets::generic(), 10));

    let elapsed = clock.load(Ordering::SeqCst) - start;
    assert!(elapsed >= 10_000);
    assert!(elapsed < 100_000, "window took {} ticks", elapsed);
}

#[test]
fn test_empty_response_is_timeout() {
    let clock = MockTimer::clock();
    let mut serial = MockSerial::new();
    serial.add_no_response();

    let mut engine: EngineType = Engine::new(serial, RecordingSink::default(), MockTimer::simulated(&clock));
    assert_eq!(TransactionOutcome::Timeout, engine.transaction(&TestCommand));
}

#[test]
fn test_read_error_absorbed() {
    let clock = MockTimer::clock();
    let mut serial = MockSerial::new();
    serial.fail_reads();
    serial.add_ok_response();

    let mut engine: EngineType = Engine::new(serial, RecordingSink::default(), MockTimer::simulated(&clock));
    let start = clock.load(Ordering::SeqCst);

    assert_eq!(TransactionOutcome::Timeout, engine.transaction(&TestCommand));
    assert!(clock.load(Ordering::SeqCst) - start >= 1_000_000);
    assert_eq!(1, engine.channel.get_read_ready_count());
}

#[test]
fn test_configure_sets_buffer_sizes() {
    let clock = MockTimer::clock();
    let mut engine: EngineType = Engine::new(MockSerial::new(), RecordingSink::default(), MockTimer::simulated(&clock));

    engine.configure(SerialConfig::default()).unwrap();

    assert_eq!(Some((128, 128)), engine.channel.get_buffer_sizes());
    assert_eq!(&[ChannelEvent::Configure(SerialConfig::default())], engine.channel.get_events());
}

#[test]
fn test_logging_disabled() {
    let clock = MockTimer::clock();
    let mut serial = MockSerial::new();
    serial.add_ok_response();

    let mut engine: EngineType = Engine::new(serial, RecordingSink::default(), MockTimer::simulated(&clock));
    engine.configure(SerialConfig::default()).unwrap();
    engine.transaction(&TestCommand);
    engine.log("Close TCP", "");

    assert!(engine.diagnostics.lines.is_empty());
    assert_eq!(1, engine.channel.get_events().len());
}

#[test]
fn test_logging_outcome_and_response() {
    let clock = MockTimer::clock();
    let mut serial = MockSerial::new();
    serial.add_ok_response();
    serial.add_no_response();

    let mut engine: EngineType = Engine::new(serial, RecordingSink::default(), MockTimer::simulated(&clock));
    engine.configure(logging_config()).unwrap();
    engine.transaction(&TestCommand);
    engine.transaction(&TestCommand);

    assert_eq!(vec!["Response1 \r\nOK\r\n", "Response0 "], engine.diagnostics.lines);
}

#[test]
fn test_logging_separate_transport_keeps_configuration() {
    let clock = MockTimer::clock();
    let mut engine: EngineType = Engine::new(MockSerial::new(), RecordingSink::default(), MockTimer::simulated(&clock));
    engine.configure(logging_config()).unwrap();

    engine.log("Establish TCP", "");

    assert_eq!(vec!["Establish TCP "], engine.diagnostics.lines);
    assert_eq!(
        &[ChannelEvent::Configure(logging_config()), ChannelEvent::Redirect],
        engine.channel.get_events()
    );
}

#[test]
fn test_logging_shared_transport_restores_configuration() {
    let clock = MockTimer::clock();
    let mut serial = MockSerial::new();
    serial.share_transport();

    let config = SerialConfig::new(1, 2, BaudRate::BaudRate9600, Logging::On);
    let mut engine: EngineType = Engine::new(serial, RecordingSink::default(), MockTimer::simulated(&clock));
    engine.configure(config).unwrap();

    engine.log("Send data", "GET /update");

    assert_eq!(vec!["Send data GET /update"], engine.diagnostics.lines);
    assert_eq!(
        &[
            ChannelEvent::Configure(config),
            ChannelEvent::Redirect,
            ChannelEvent::Configure(config),
        ],
        engine.channel.get_events()
    );
}

#[test]
fn test_pause_waits_for_timer() {
    let clock = MockTimer::clock();
    let mut timer = MockTimer::simulated(&clock);
    timer
        .expect_start()
        .withf(|duration| *duration == MockTimer::duration_ms(500))
        .times(1)
        .returning(|_| Ok(()));

    let mut polls = 0;
    timer.expect_wait().times(3).returning(move || {
        polls += 1;
        if polls < 3 {
            return Err(nb::Error::WouldBlock);
        }
        Ok(())
    });

    let mut engine: EngineType = Engine::new(MockSerial::new(), RecordingSink::default(), timer);
    engine.pause(500).unwrap();

    assert!(engine.channel.get_commands_as_strings().is_empty());
}

#[test]
fn test_pause_timer_error() {
    let clock = MockTimer::clock();
    let mut timer = MockTimer::simulated(&clock);
    timer.expect_start().times(1).returning(|_| Err(1));

    let mut engine: EngineType = Engine::new(MockSerial::new(), RecordingSink::default(), timer);
    assert_eq!(Err(Error::TimerError), engine.pause(500));
}
