use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

/// Timestamp layout shared by lease keys and the reaper's scan bound. The
/// two must match character for character or the expiry range scan breaks.
/// 14 zero-padded UTC digits sort lexicographically in chronological order.
pub(crate) const TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

pub(crate) fn timestamp(at: DateTime<Utc>) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

fn digest(value: &[u8]) -> String {
    hex::encode(Sha256::digest(value))
}

/// Lease identity: `<expiry timestamp>:<content digest>`.
///
/// The embedded timestamp is the lease deadline, so a range scan with upper
/// bound "now" yields exactly the expired leases in expiry order. Neither
/// the digit alphabet of the timestamp nor the hex alphabet of the digest
/// can collide with the `:` separator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaseKey(String);

impl LeaseKey {
    #[must_use]
    pub fn new(expires_at: DateTime<Utc>, value: &[u8]) -> Self {
        Self(format!("{}:{}", timestamp(expires_at), digest(value)))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Display for LeaseKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }

    #[test]
    fn timestamp_is_fourteen_utc_digits() {
        assert_eq!(timestamp(at(2006, 1, 2, 3, 4, 5)), "20060102030405");
        // 24-hour clock: afternoon sorts after morning
        assert_eq!(timestamp(at(2006, 1, 2, 15, 4, 5)), "20060102150405");
    }

    #[test]
    fn key_is_timestamp_colon_hex_digest() {
        let key = LeaseKey::new(at(2006, 1, 2, 3, 4, 5), b"");
        // sha-256 of the empty string
        assert_eq!(
            key.as_str(),
            "20060102030405:e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn digest_is_content_addressed() {
        let when = at(2024, 6, 1, 12, 0, 0);
        assert_eq!(LeaseKey::new(when, b"alpha"), LeaseKey::new(when, b"alpha"));
        assert_ne!(LeaseKey::new(when, b"alpha"), LeaseKey::new(when, b"beta"));

        let (ts, digest) = LeaseKey::new(when, b"alpha")
            .into_string()
            .split_once(':')
            .map(|(a, b)| (a.to_string(), b.to_string()))
            .unwrap();
        assert_eq!(ts.len(), 14);
        assert_eq!(digest.len(), 64);
        assert!(digest
            .bytes()
            .all(|b| b.is_ascii_hexdigit() && !b.is_ascii_uppercase()));
    }

    #[test]
    fn later_deadlines_sort_after_earlier_ones() {
        let earlier = LeaseKey::new(at(2024, 6, 1, 12, 0, 0), b"task");
        let later = LeaseKey::new(at(2024, 6, 1, 12, 0, 1), b"task");
        assert!(earlier.as_str() < later.as_str());

        let next_day = LeaseKey::new(at(2024, 6, 2, 0, 0, 0), b"task");
        assert!(later.as_str() < next_day.as_str());
    }
}
