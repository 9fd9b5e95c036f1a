use chrono::{DateTime, Local, Timelike};

/// Minute-label format used to name per-minute store shards.
/// Interop surface — changing it orphans every already-persisted task.
pub const MINUTE_LABEL_FORMAT: &str = "%Y-%m-%d-%H:%M";

/// Format `t` as a minute-granularity label, e.g. `2026-08-30-14:07`.
///
/// Uses local time: every node of a fleet must share a timezone or
/// they will read and write different shards for the same instant.
pub fn minute_label(t: DateTime<Local>) -> String {
    t.format(MINUTE_LABEL_FORMAT).to_string()
}

/// Zero the sub-second part of `t`.
pub fn truncate_to_second(t: DateTime<Local>) -> DateTime<Local> {
    t.with_nanosecond(0).unwrap_or(t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn minute_label_drops_seconds() {
        let t = Local.with_ymd_and_hms(2026, 8, 30, 14, 7, 59).unwrap();
        assert_eq!(minute_label(t), "2026-08-30-14:07");
    }

    #[test]
    fn minute_label_zero_pads() {
        let t = Local.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(minute_label(t), "2026-01-02-03:04");
    }

    #[test]
    fn same_minute_same_label() {
        let a = Local.with_ymd_and_hms(2026, 8, 30, 14, 7, 0).unwrap();
        let b = Local.with_ymd_and_hms(2026, 8, 30, 14, 7, 59).unwrap();
        assert_eq!(minute_label(a), minute_label(b));
    }

    #[test]
    fn truncate_to_second_zeroes_nanos() {
        let t = Local
            .with_ymd_and_hms(2026, 8, 30, 14, 7, 3)
            .unwrap()
            .with_nanosecond(123_456_789)
            .unwrap();
        let truncated = truncate_to_second(t);
        assert_eq!(truncated.timestamp(), t.timestamp());
        assert_eq!(truncated.timestamp_subsec_nanos(), 0);
    }
}
