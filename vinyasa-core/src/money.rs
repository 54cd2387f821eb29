//! Cent-amount display formatting.

/// Formats an integer cent amount as a dollar display string (`$29.99`).
///
/// Negative amounts keep the sign in front of the dollar symbol; the demo
/// shop never produces them, but formatting should not mangle them either.
#[must_use]
pub fn format_cents(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{sign}${}.{:02}", abs / 100, abs % 100)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_whole_dollars() {
        assert_eq!(format_cents(100), "$1.00");
        assert_eq!(format_cents(2999), "$29.99");
    }

    #[test]
    fn test_format_sub_dollar() {
        assert_eq!(format_cents(5), "$0.05");
        assert_eq!(format_cents(0), "$0.00");
    }

    #[test]
    fn test_format_negative() {
        assert_eq!(format_cents(-1299), "-$12.99");
    }
}
