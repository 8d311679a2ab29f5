//! Call Options Module
//!
//! Per-call configuration bag: the raw-mode flag plus expiration aliases
//! from different calling conventions, normalized into one TTL.

use std::time::Duration;

// == TTL Alias Table ==
/// Recognized expiration alias names, in priority order.
///
/// Each convention spells "expire this key N seconds from now" differently;
/// all normalize to the same [`Duration`]. When several aliases appear in
/// one call, the first table entry present wins. Names are case-sensitive.
pub const TTL_ALIASES: [&str; 3] = ["expire_after", "expires_in", "expire_in"];

// == Call Options ==
/// Immutable per-call options for store operations.
///
/// Constructed fresh per call and discarded; carries no state across calls.
/// Unrecognized entry names are kept but ignored, so callers may pass
/// convention-specific keys this crate does not know about without error.
///
/// # Example
/// ```
/// use std::time::Duration;
/// use marshaled_kv::CallOptions;
///
/// let opts = CallOptions::new().raw(true).expires_in(Duration::from_secs(60));
/// assert!(opts.is_raw());
/// assert_eq!(opts.ttl(), Some(Duration::from_secs(60)));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallOptions {
    /// Bypass the codec on both read and write
    raw: bool,
    /// Named entries in insertion order (alias or convention-specific)
    entries: Vec<(String, Duration)>,
}

impl CallOptions {
    // == Constructor ==
    /// Creates empty options: marshalling on, no expiration.
    pub fn new() -> Self {
        Self::default()
    }

    // == Raw Flag ==
    /// Sets the raw flag, bypassing the codec on read and write.
    pub fn raw(mut self, raw: bool) -> Self {
        self.raw = raw;
        self
    }

    /// Returns true when the codec is bypassed.
    pub fn is_raw(&self) -> bool {
        self.raw
    }

    // == Entries ==
    /// Adds a named entry carrying a duration.
    ///
    /// Names outside [`TTL_ALIASES`] are accepted and ignored by
    /// normalization.
    pub fn entry(mut self, name: impl Into<String>, ttl: Duration) -> Self {
        self.entries.push((name.into(), ttl));
        self
    }

    /// Sets the expiration using the `expire_after` convention.
    ///
    /// The duration is kept at full precision; sub-second TTLs are not
    /// rounded away.
    pub fn expire_after(self, ttl: Duration) -> Self {
        self.entry(TTL_ALIASES[0], ttl)
    }

    /// Sets the expiration using the `expires_in` convention.
    ///
    /// The duration is kept at full precision; sub-second TTLs are not
    /// rounded away.
    pub fn expires_in(self, ttl: Duration) -> Self {
        self.entry(TTL_ALIASES[1], ttl)
    }

    /// Sets the expiration using the `expire_in` convention.
    ///
    /// The duration is kept at full precision; sub-second TTLs are not
    /// rounded away.
    pub fn expire_in(self, ttl: Duration) -> Self {
        self.entry(TTL_ALIASES[2], ttl)
    }

    // == Normalization ==
    /// Normalizes the expiration aliases into one TTL.
    ///
    /// Scans [`TTL_ALIASES`] in table order and returns the first alias
    /// present; `None` means the write is permanent. The duration counts
    /// from the moment the backend call is made.
    pub fn ttl(&self) -> Option<Duration> {
        TTL_ALIASES.iter().find_map(|alias| {
            self.entries
                .iter()
                .find(|(name, _)| name == alias)
                .map(|(_, ttl)| *ttl)
        })
    }
}
