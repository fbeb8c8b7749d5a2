use config::SEARCH_WINDOW_SLACK;

use crate::error::HybridError;

/// Locates `sub` inside `full` and returns 1-based inclusive `(start, end)`.
///
/// With an `expected` 1-based offset the search is confined to
/// `[expected - 1, expected + len(sub) + SEARCH_WINDOW_SLACK)`, which keeps
/// repeats elsewhere in the transcript from being picked up. Without it (or
/// with zero) the window opens at the first base. First occurrence wins.
pub fn resolve(full: &str, sub: &str, expected: Option<usize>) -> Result<(usize, usize), HybridError> {
    if sub.is_empty() {
        return Err(HybridError::malformed("empty sub-sequence"));
    }

    let expected = expected.unwrap_or(0);
    let lower = expected.saturating_sub(1);
    let upper = full.len().min(expected + sub.len() + SEARCH_WINDOW_SLACK);

    let not_found = || HybridError::NotFound {
        sub: sub.to_string(),
        lower,
        upper,
        len: full.len(),
    };

    let window = full.get(lower..upper).ok_or_else(not_found)?;
    let offset = window.find(sub).ok_or_else(not_found)?;

    let start = lower + offset + 1;
    Ok((start, start + sub.len() - 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_without_offset() {
        let (start, end) = resolve("GGGAUCCGAUCC", "AUCC", None).unwrap();
        assert_eq!((start, end), (4, 7));
        assert_eq!(&"GGGAUCCGAUCC"[start - 1..end], "AUCC");
    }

    #[test]
    fn test_resolve_offset_skips_earlier_repeat() {
        assert_eq!(resolve("GGGAUCCGAUCC", "AUCC", Some(6)).unwrap(), (9, 12));
        assert_eq!(resolve("GGGAUCCGAUCC", "AUCC", Some(0)).unwrap(), (4, 7));
    }

    #[test]
    fn test_resolve_window_bounds() {
        let full = format!("{}ACGUACGU", "G".repeat(80));
        // window [0, 1 + 8 + 50) stops short of position 81
        assert!(matches!(
            resolve(&full, "ACGUACGU", Some(1)),
            Err(HybridError::NotFound { upper: 59, .. })
        ));
        assert_eq!(resolve(&full, "ACGUACGU", Some(30)).unwrap(), (81, 88));
    }

    #[test]
    fn test_resolve_invariants() {
        let full = "AUGCGGAUACCGUAUGCGG";
        for (sub, expected) in [("CGGAUA", Some(3)), ("UAUG", None), ("GG", Some(15))] {
            let (start, end) = resolve(full, sub, expected).unwrap();
            assert!(1 <= start && start <= end && end <= full.len());
            assert_eq!(&full[start - 1..end], sub);
        }
    }

    #[test]
    fn test_resolve_errors() {
        assert!(resolve("ACGU", "", None).unwrap_err().is_malformed());
        assert!(matches!(
            resolve("ACGU", "CCCC", None),
            Err(HybridError::NotFound { .. })
        ));
        assert!(matches!(
            resolve("ACGU", "A", Some(40)),
            Err(HybridError::NotFound { .. })
        ));
    }
}
