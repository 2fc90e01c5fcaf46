//! Coarse snapshot fingerprint used for AI opinion reuse.
//!
//! The fingerprint deliberately ignores small moves: rates and CPI YoY are kept
//! to one decimal, VIX to a whole number, and the S&P 500 to the nearest 100
//! points. Two snapshots with the same fingerprint are treated as "materially
//! unchanged". This is not a content hash and must not be used as one.

use crate::domain::{AiOpinions, DataSnapshot};

/// JavaScript `Math.round` (ties toward positive infinity).
fn js_round(x: f64) -> i64 {
    (x + 0.5).floor() as i64
}

/// The rounded fields joined with `|`, in a fixed order.
pub fn fingerprint_key(snapshot: &DataSnapshot) -> String {
    let parts = [
        js_round(snapshot.treasury2y * 10.0),
        js_round(snapshot.treasury10y * 10.0),
        js_round(snapshot.fed_funds_rate * 10.0),
        js_round(snapshot.cpi_yoy * 10.0),
        js_round(snapshot.vix),
        js_round(snapshot.sp500 / 100.0),
    ];
    parts.iter().map(i64::to_string).collect::<Vec<_>>().join("|")
}

/// 32-bit rolling hash (`h = h * 31 + unit`) over UTF-16 code units.
pub fn string_hash(input: &str) -> i32 {
    input
        .encode_utf16()
        .fold(0i32, |h, unit| h.wrapping_mul(31).wrapping_add(i32::from(unit)))
}

/// Base-36 rendering of a signed integer, lowercase, `-` prefixed when negative.
pub fn to_base36(value: i32) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

    let mut n = i64::from(value).unsigned_abs();
    if n == 0 {
        return "0".to_string();
    }
    let mut buf = Vec::new();
    while n > 0 {
        buf.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    if value < 0 {
        buf.push(b'-');
    }
    buf.reverse();
    String::from_utf8_lossy(&buf).into_owned()
}

/// Short deterministic fingerprint of a snapshot.
pub fn generate_data_hash(snapshot: &DataSnapshot) -> String {
    to_base36(string_hash(&fingerprint_key(snapshot)))
}

/// Whether stored opinions still describe the current data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpinionFreshness {
    /// Stored opinions were generated from a materially identical snapshot.
    Fresh,
    /// Stored opinions exist but the data moved since.
    Stale,
    /// Nothing stored.
    Missing,
}

impl OpinionFreshness {
    pub fn is_reusable(self) -> bool {
        self == OpinionFreshness::Fresh
    }
}

pub fn opinion_freshness(existing: Option<&AiOpinions>, snapshot: &DataSnapshot) -> OpinionFreshness {
    match existing {
        None => OpinionFreshness::Missing,
        Some(opinions) if opinions.data_hash == generate_data_hash(snapshot) => OpinionFreshness::Fresh,
        Some(_) => OpinionFreshness::Stale,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::create_data_snapshot;
    use crate::snapshot::tests::{fixed_now, sample_data};

    #[test]
    fn string_hash_matches_java_style_hash() {
        assert_eq!(string_hash(""), 0);
        assert_eq!(string_hash("a"), 97);
        // "hello".hashCode() in Java / the equivalent JS loop.
        assert_eq!(string_hash("hello"), 99_162_322);
        // Long inputs wrap around to negative values.
        assert_eq!(string_hash("the quick brown fox jumps over the lazy dog"), -2_082_818_701);
    }

    #[test]
    fn base36_rendering() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "z");
        assert_eq!(to_base36(36), "10");
        assert_eq!(to_base36(-71), "-1z");
        assert_eq!(to_base36(i32::MIN), "-zik0zk");
    }

    #[test]
    fn key_rounds_each_field() {
        let mut snapshot = create_data_snapshot(&sample_data(), fixed_now());
        snapshot.treasury2y = 4.74;
        snapshot.treasury10y = 4.25;
        snapshot.fed_funds_rate = 5.33;
        snapshot.cpi_yoy = 3.26;
        snapshot.vix = 12.5;
        snapshot.sp500 = 5449.0;
        assert_eq!(fingerprint_key(&snapshot), "47|43|53|33|13|54");
    }

    #[test]
    fn hash_is_deterministic_and_coarse() {
        let a = create_data_snapshot(&sample_data(), fixed_now());
        let mut b = a.clone();
        b.timestamp = chrono::Utc::now();
        assert_eq!(generate_data_hash(&a), generate_data_hash(&b));

        let mut low = a.clone();
        let mut high = a.clone();
        low.vix = 20.01;
        high.vix = 20.04;
        assert_eq!(generate_data_hash(&low), generate_data_hash(&high));

        high.vix = 21.0;
        assert_ne!(generate_data_hash(&low), generate_data_hash(&high));
    }

    #[test]
    fn freshness_follows_hash() {
        use crate::domain::{Opinion, OpinionSet, Stance};

        let snapshot = create_data_snapshot(&sample_data(), fixed_now());
        let opinion = |stance| Opinion {
            id: "x".into(),
            stance,
            title: String::new(),
            summary: String::new(),
            reasoning: String::new(),
            key_indicators: Vec::new(),
        };
        let mut stored = AiOpinions {
            generated_at: fixed_now(),
            data_hash: generate_data_hash(&snapshot),
            opinions: OpinionSet {
                bullish: opinion(Stance::Bullish),
                neutral: opinion(Stance::Neutral),
                bearish: opinion(Stance::Bearish),
            },
        };

        assert_eq!(opinion_freshness(None, &snapshot), OpinionFreshness::Missing);
        assert!(opinion_freshness(Some(&stored), &snapshot).is_reusable());
        stored.data_hash = "other".into();
        assert_eq!(opinion_freshness(Some(&stored), &snapshot), OpinionFreshness::Stale);
    }
}
