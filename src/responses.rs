/// Result of a single transaction, classified by the first matching token in priority order
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TransactionOutcome {
    /// Response contained the primary token
    MatchedPrimary,
    /// Response contained the secondary token, but not the primary one
    MatchedSecondary,
    /// Response contained only the tertiary token
    MatchedTertiary,
    /// None of the tokens was received within the time window
    Timeout,
}

impl TransactionOutcome {
    /// Label used for diagnostic output
    pub fn label(&self) -> &'static str {
        match self {
            TransactionOutcome::MatchedPrimary => "Response1",
            TransactionOutcome::MatchedSecondary => "Response2",
            TransactionOutcome::MatchedTertiary => "Response3",
            TransactionOutcome::Timeout => "Response0",
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for TransactionOutcome {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "{}", self.label())
    }
}

/// Classification tokens of a transaction, ordered by priority
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Targets {
    pub primary: &'static str,
    pub secondary: &'static str,
    pub tertiary: &'static str,
}

impl Targets {
    pub const fn new(primary: &'static str, secondary: &'static str, tertiary: &'static str) -> Self {
        Self {
            primary,
            secondary,
            tertiary,
        }
    }

    /// Plain command acknowledgement
    pub const fn generic() -> Self {
        Self::new("OK", "ERROR", "None")
    }

    /// Joining an access point, success is signaled once an IP was assigned
    pub const fn join() -> Self {
        Self::new("WIFI GOT IP", "ERROR", "None")
    }

    /// Opening a TCP connection
    pub const fn connect() -> Self {
        Self::new("OK", "ALREADY CONNECTED", "ERROR")
    }

    /// Transmission of socket data
    pub const fn transmission() -> Self {
        Self::new("SEND OK", "SEND FAIL", "ERROR")
    }

    /// Classifies the accumulated response. An empty or unreadable response results in [TransactionOutcome::Timeout].
    pub fn classify(&self, response: &[u8]) -> TransactionOutcome {
        if contains(response, self.primary) {
            return TransactionOutcome::MatchedPrimary;
        }

        if contains(response, self.secondary) {
            return TransactionOutcome::MatchedSecondary;
        }

        if contains(response, self.tertiary) {
            return TransactionOutcome::MatchedTertiary;
        }

        TransactionOutcome::Timeout
    }
}

/// Returns true if the token occurs anywhere in the response
fn contains(response: &[u8], token: &str) -> bool {
    let token = token.as_bytes();

    if token.is_empty() || token.len() > response.len() {
        return false;
    }

    response.windows(token.len()).any(|window| window == token)
}
