//! # Passphrase derivation
//!
//! Rotating character shift of a fixed seed. This is an obfuscation of the WIFI passphrase in the
//! firmware image, not a security mechanism.
use alloc::string::String;

/// Seed used by [Credentials::default]
pub const DEFAULT_SEED: &str = "r0h4ek/.";

/// First shift value of the rotation
pub const MIN_SHIFT: u32 = 3;

/// Last shift value before the rotation wraps around
pub const MAX_SHIFT: u32 = 10;

/// Seed and current rotation state
#[derive(Clone, Debug)]
pub struct Credentials {
    seed: &'static str,

    /// Shift applied by the next call to [Credentials::next_passphrase]
    shift: u32,
}

impl Credentials {
    pub fn new(seed: &'static str) -> Self {
        Self {
            seed,
            shift: MIN_SHIFT,
        }
    }

    /// Returns the shift applied by the next call to [Credentials::next_passphrase]
    pub fn shift(&self) -> u32 {
        self.shift
    }

    /// Derives a passphrase and advances the rotation, cycling through shift values 3 to 10
    pub fn next_passphrase(&mut self) -> String {
        let passphrase = Self::derive(self.seed, self.shift);

        self.shift += 1;
        if self.shift > MAX_SHIFT {
            self.shift = MIN_SHIFT;
        }

        passphrase
    }

    /// Shifts every code point of the seed. Code points without valid shifted value are kept.
    pub fn derive(seed: &str, shift: u32) -> String {
        seed.chars()
            .map(|c| char::from_u32(c as u32 + shift).unwrap_or(c))
            .collect()
    }
}

impl Default for Credentials {
    fn default() -> Self {
        Self::new(DEFAULT_SEED)
    }
}
