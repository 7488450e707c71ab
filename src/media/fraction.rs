//! Tolerant parsing of `N` / `N/M` style track and disc numbers.

/// Parse a track or disc tag into `(number, total)`.
///
/// Blank input gives `(0, 0)`. A lone number fills only the first slot.
/// With a slash, the part before it is parsed first; if that fails nothing
/// else is attempted. A malformed total after a good number keeps the
/// number, so `"5/abc"` yields `(5, 0)`.
pub fn parse(raw: &str) -> (i32, i32) {
    let data = raw.trim();
    if data.is_empty() {
        return (0, 0);
    }

    let Some(index) = data.find('/') else {
        return (data.parse().unwrap_or(0), 0);
    };

    let Ok(number) = data[..index].parse::<i32>() else {
        return (0, 0);
    };
    let total = data[index + 1..].parse::<i32>().unwrap_or(0);
    (number, total)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_input() {
        assert_eq!(parse(""), (0, 0));
        assert_eq!(parse("   "), (0, 0));
    }

    #[test]
    fn test_single_number() {
        assert_eq!(parse("7"), (7, 0));
        assert_eq!(parse(" 12 "), (12, 0));
    }

    #[test]
    fn test_number_and_total() {
        assert_eq!(parse("5/10"), (5, 10));
        assert_eq!(parse("1/16"), (1, 16));
        assert_eq!(parse("2/2"), (2, 2));
    }

    #[test]
    fn test_malformed_single_token() {
        assert_eq!(parse("abc"), (0, 0));
        assert_eq!(parse("3a"), (0, 0));
    }

    #[test]
    fn test_malformed_total_keeps_number() {
        assert_eq!(parse("5/abc"), (5, 0));
        assert_eq!(parse("5/"), (5, 0));
    }

    #[test]
    fn test_malformed_number_drops_total() {
        assert_eq!(parse("abc/10"), (0, 0));
        assert_eq!(parse("/10"), (0, 0));
    }

    #[test]
    fn test_only_first_slash_splits() {
        // "2/3" after the first slash is not an integer
        assert_eq!(parse("1/2/3"), (1, 0));
    }
}
