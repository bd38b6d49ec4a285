//! Mocks for doc examples
use crate::serial::{SerialChannel, SerialConfig};
use alloc::collections::VecDeque;
use alloc::vec::Vec;
use core::convert::Infallible;
use embedded_io::{ErrorType, Read, ReadReady, Write};
use fugit::{TimerDurationU32, TimerInstantU32};
use fugit_timer::Timer;

/// Serial channel mock, answering like an ESP-AT modem with a reachable access point and remote
#[derive(Default)]
pub struct ExampleSerial {
    /// Currently written, not yet terminated line
    line: Vec<u8>,

    /// Pending response data
    rx: VecDeque<u8>,
}

impl ExampleSerial {
    fn respond(&mut self) {
        let response: &'static [u8] = match self.line.as_slice() {
            line if line.starts_with(b"AT+CWJAP=") => b"WIFI CONNECTED\r\nWIFI GOT IP\r\n\r\nOK\r\n",
            line if line.starts_with(b"AT+CIPSTART=") => b"CONNECT\r\n\r\nOK\r\n",
            line if line.starts_with(b"AT+CIPSEND=") => b"\r\nOK\r\n> ",
            b"AT+CIPCLOSE" => b"CLOSED\r\n\r\nOK\r\n",
            line if line.starts_with(b"AT") => b"\r\nOK\r\n",
            _ => b"\r\nRecv bytes\r\n\r\nSEND OK\r\n",
        };

        self.rx.extend(response);
        self.line.clear();
    }
}

impl ErrorType for ExampleSerial {
    type Error = Infallible;
}

impl Read for ExampleSerial {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let mut length = 0;

        while length < buf.len() {
            match self.rx.pop_front() {
                Some(byte) => buf[length] = byte,
                None => break,
            }
            length += 1;
        }

        Ok(length)
    }
}

impl ReadReady for ExampleSerial {
    fn read_ready(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.rx.is_empty())
    }
}

impl Write for ExampleSerial {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        // Data may contain CRLF itself, so just the separately written terminator completes a command
        if buf == b"\r\n" {
            self.respond();
        } else {
            self.line.extend_from_slice(buf);
        }

        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl SerialChannel for ExampleSerial {
    fn configure(&mut self, _config: &SerialConfig) -> Result<(), Self::Error> {
        Ok(())
    }

    fn set_buffer_sizes(&mut self, _tx_size: usize, _rx_size: usize) {}
}

/// Timer mock, advancing one millisecond on every query
#[derive(Default)]
pub struct ExampleTimer {
    ticks: u32,
}

impl Timer<1_000> for ExampleTimer {
    type Error = u32;

    fn now(&mut self) -> TimerInstantU32<1_000> {
        self.ticks = self.ticks.wrapping_add(1);
        TimerInstantU32::from_ticks(self.ticks)
    }

    fn start(&mut self, _duration: TimerDurationU32<1_000>) -> Result<(), Self::Error> {
        Ok(())
    }

    fn cancel(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn wait(&mut self) -> nb::Result<(), Self::Error> {
        Ok(())
    }
}
