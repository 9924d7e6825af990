//! Wall-clock helpers.

use chrono::Utc;

/// Current Unix epoch time in milliseconds.
#[must_use]
pub fn epoch_millis() -> i64 {
    Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_epoch_millis_is_monotone_enough() {
        let first = epoch_millis();
        let second = epoch_millis();
        assert!(first > 1_600_000_000_000);
        assert!(second >= first);
    }
}
