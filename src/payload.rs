//! # Payloads for the supported cloud services
//!
//! Each payload knows its [Target] and encodes itself into the data transmitted after `AT+CIPSEND`.
//! Requests are assembled by [Request], which joins the request line, headers and body with CRLF.
use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

/// Line terminator of HTTP requests
const NEWLINE: &str = "\r\n";

/// Number of fields of a metrics channel
pub const FIELD_COUNT: usize = 8;

/// Number of values of a webhook trigger
pub const WEBHOOK_VALUE_COUNT: usize = 3;

/// Remote service receiving the payload
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Target {
    /// ThingSpeak channel update
    MetricsChannel,
    /// AdafruitIO feed
    DataFeed,
    /// IFTTT webhook trigger
    Webhook,
}

/// Per target behaviour of the send workflow
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SendPolicy {
    /// TCP connection is opened with keep-alive enabled
    pub keep_alive: bool,

    /// Connection is closed right after transmission. Otherwise it's closed at the beginning of the next send.
    /// Transmission errors skip the close and continue with the next attempt.
    pub close_after_send: bool,
}

impl Target {
    pub fn host(&self) -> &'static str {
        match self {
            Target::MetricsChannel => "api.thingspeak.com",
            Target::DataFeed => "io.adafruit.com",
            Target::Webhook => "maker.ifttt.com",
        }
    }

    pub fn port(&self) -> u16 {
        80
    }

    pub fn policy(&self) -> SendPolicy {
        match self {
            Target::DataFeed => SendPolicy {
                keep_alive: true,
                close_after_send: true,
            },
            Target::MetricsChannel | Target::Webhook => SendPolicy {
                keep_alive: false,
                close_after_send: false,
            },
        }
    }
}

/// Data sent to one of the [Target] services
pub trait Payload {
    /// Service receiving the payload
    fn target(&self) -> Target;

    /// Encodes the data to transmit, without the final terminator
    fn encode(&self) -> String;
}

/// HTTP method
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

/// Builder for request payloads
///
/// Without [Request::http_1_1] just the bare request line is encoded, as accepted by ThingSpeak.
#[derive(Clone, Debug)]
pub struct Request {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    http_1_1: bool,
    headers: Vec<(&'static str, String)>,
    body: Option<String>,
}

impl Request {
    pub fn new(method: Method, path: String) -> Self {
        Self {
            method,
            path,
            query: Vec::new(),
            http_1_1: false,
            headers: Vec::new(),
            body: None,
        }
    }

    /// Appends a query parameter. Values are not escaped.
    pub fn query(mut self, key: &str, value: &str) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    /// Adds the protocol version to the request line and enables headers
    pub fn http_1_1(mut self) -> Self {
        self.http_1_1 = true;
        self
    }

    /// Appends a header, order is preserved
    pub fn header(mut self, name: &'static str, value: &str) -> Self {
        self.headers.push((name, value.to_string()));
        self
    }

    /// Sets the body, separated from the headers by an empty line
    pub fn body(mut self, body: String) -> Self {
        self.body = Some(body);
        self
    }

    pub fn encode(&self) -> String {
        let mut request = format!("{} {}", self.method.as_str(), self.path);

        for (index, (key, value)) in self.query.iter().enumerate() {
            request.push(if index == 0 { '?' } else { '&' });
            request.push_str(key);
            request.push('=');
            request.push_str(value);
        }

        if !self.http_1_1 {
            return request;
        }

        request.push_str(" HTTP/1.1");
        request.push_str(NEWLINE);

        for (name, value) in &self.headers {
            request.push_str(name);
            request.push_str(": ");
            request.push_str(value);
            request.push_str(NEWLINE);
        }

        if let Some(body) = &self.body {
            request.push_str(NEWLINE);
            request.push_str(body);
        }

        request
    }
}

/// Up to eight numeric channel fields. NaN marks a missing value, infinite values are dropped as well.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Fields {
    values: [Option<f64>; FIELD_COUNT],
}

impl Fields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fields in order, starting with field1. Additional values are ignored.
    pub fn from_values(values: &[f64]) -> Self {
        let mut fields = Self::new();

        for (index, value) in values.iter().take(FIELD_COUNT).enumerate() {
            fields = fields.with(index + 1, *value);
        }

        fields
    }

    /// Sets the field with the given number (1 to 8). NaN or infinity clears the field, invalid numbers are ignored.
    pub fn with(mut self, number: usize, value: f64) -> Self {
        if (1..=FIELD_COUNT).contains(&number) {
            self.values[number - 1] = if value.is_finite() { Some(value) } else { None };
        }

        self
    }

    /// Returns the value of the field with the given number (1 to 8)
    pub fn get(&self, number: usize) -> Option<f64> {
        self.values.get(number.checked_sub(1)?).copied().flatten()
    }

    /// Iterates over (number, value) of all present fields
    pub fn present(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.values
            .iter()
            .enumerate()
            .filter_map(|(index, value)| value.map(|value| (index + 1, value)))
    }
}

/// ThingSpeak channel update
#[derive(Clone, Debug)]
pub struct ChannelUpdate<'a> {
    /// Write API key of the channel
    pub api_key: &'a str,

    pub fields: Fields,
}

impl<'a> ChannelUpdate<'a> {
    pub fn new(api_key: &'a str, fields: Fields) -> Self {
        Self { api_key, fields }
    }
}

impl Payload for ChannelUpdate<'_> {
    fn target(&self) -> Target {
        Target::MetricsChannel
    }

    fn encode(&self) -> String {
        let mut request = Request::new(Method::Get, "/update".to_string()).query("api_key", self.api_key);

        for (number, value) in self.fields.present() {
            request = request.query(&format!("field{}", number), &value.to_string());
        }

        request.encode()
    }
}

/// New value of an AdafruitIO feed
#[derive(Clone, Debug)]
pub struct FeedValue<'a> {
    pub username: &'a str,

    /// AdafruitIO key
    pub key: &'a str,

    pub feed: &'a str,
    pub value: &'a str,
}

impl<'a> FeedValue<'a> {
    pub fn new(username: &'a str, key: &'a str, feed: &'a str, value: &'a str) -> Self {
        Self {
            username,
            key,
            feed,
            value,
        }
    }
}

impl Payload for FeedValue<'_> {
    fn target(&self) -> Target {
        Target::DataFeed
    }

    fn encode(&self) -> String {
        let body = format!("value={}", self.value);
        let path = format!("/api/v2/{}/feeds/{}/data", self.username, self.feed);

        Request::new(Method::Post, path)
            .http_1_1()
            .header("Host", self.target().host())
            .header("User-Agent", "curl/7.83.1")
            .header("X-AIO-Key", self.key)
            .header("Content-Length", &body.len().to_string())
            .header("Content-Type", "application/x-www-form-urlencoded")
            .header("Accept", "*/*")
            .body(body)
            .encode()
    }
}

/// IFTTT webhook event
#[derive(Clone, Debug)]
pub struct WebhookTrigger<'a> {
    pub event: &'a str,

    /// Webhook key
    pub key: &'a str,

    /// value1 to value3, missing values are omitted from the query
    pub values: [Option<&'a str>; WEBHOOK_VALUE_COUNT],
}

impl<'a> WebhookTrigger<'a> {
    pub fn new(event: &'a str, key: &'a str, values: [Option<&'a str>; WEBHOOK_VALUE_COUNT]) -> Self {
        Self { event, key, values }
    }
}

impl Payload for WebhookTrigger<'_> {
    fn target(&self) -> Target {
        Target::Webhook
    }

    fn encode(&self) -> String {
        let path = format!("/trigger/{}/with/key/{}", self.event, self.key);
        let mut request = Request::new(Method::Get, path);

        for (index, value) in self.values.iter().enumerate() {
            if let Some(value) = value {
                request = request.query(&format!("value{}", index + 1), value);
            }
        }

        request
            .http_1_1()
            .header("User-Agent", "curl/7.58.0")
            .header("Host", self.target().host())
            .header("Accept", "*/*")
            .encode()
    }
}
