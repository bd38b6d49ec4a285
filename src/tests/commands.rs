use crate::commands::{
    AccessPointConnectCommand, AtCommand, ConnectCommand, ExpectsResponse, TransmissionCommand,
    TransmissionPrepareCommand, WifiModeCommand,
};
use crate::responses::Targets;
use alloc::string::String;

#[test]
fn test_station_mode() {
    assert_eq!(b"AT+CWMODE=1", WifiModeCommand::station_mode().as_bytes());
}

#[test]
fn test_access_point_connect() {
    let command = AccessPointConnectCommand::new("home", "u3k7hn21").unwrap();
    assert_eq!(b"AT+CWJAP=\"home\",\"u3k7hn21\"", command.as_bytes());
    assert_eq!(Targets::join(), AccessPointConnectCommand::TARGETS);
    assert_eq!(5_000, AccessPointConnectCommand::TIMEOUT_MS);
}

#[test]
fn test_access_point_connect_max_length() {
    let ssid = String::from("s").repeat(32);
    let passphrase = String::from("p").repeat(63);
    assert!(AccessPointConnectCommand::new(&ssid, &passphrase).is_some());
}

#[test]
fn test_access_point_connect_ssid_too_long() {
    let ssid = String::from("s").repeat(33);
    assert!(AccessPointConnectCommand::new(&ssid, "secret").is_none());
}

#[test]
fn test_access_point_connect_passphrase_too_long() {
    let passphrase = String::from("p").repeat(64);
    assert!(AccessPointConnectCommand::new("home", &passphrase).is_none());
}

#[test]
fn test_connect_tcp() {
    let command = ConnectCommand::tcp("api.thingspeak.com", 80, false).unwrap();
    assert_eq!(b"AT+CIPSTART=\"TCP\",\"api.thingspeak.com\",80", command.as_bytes());
}

#[test]
fn test_connect_tcp_keep_alive() {
    let command = ConnectCommand::tcp("io.adafruit.com", 80, true).unwrap();
    assert_eq!(b"AT+CIPSTART=\"TCP\",\"io.adafruit.com\",80,1", command.as_bytes());
}

#[test]
fn test_connect_host_too_long() {
    let host = String::from("h").repeat(128);
    assert!(ConnectCommand::tcp(&host, 80, false).is_none());
}

#[test]
fn test_transmission_prepare() {
    assert_eq!(b"AT+CIPSEND=35", TransmissionPrepareCommand::new(35).unwrap().as_bytes());
}

#[test]
fn test_transmission_raw_data() {
    let command = TransmissionCommand::new(b"GET /update");
    assert_eq!(b"GET /update", command.as_bytes());
    assert_eq!(Targets::transmission(), TransmissionCommand::TARGETS);
}
