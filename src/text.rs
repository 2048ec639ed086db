//! Display text helpers
//!
//! Lengths are counted in UTF-16 code units, matching what clients render.

/// Ellipsis appended by [`truncate_ellipsized`]
pub const TRUNCATE_ELLIPSIS: &str = " …";

/// Truncates to `length` UTF-16 units including the ellipsis
pub fn truncate_ellipsized(text: &str, length: usize) -> String {
    truncate(text, length, TRUNCATE_ELLIPSIS)
}

/// Truncates `text` so that it plus `ending` fits in `length` UTF-16 units.
///
/// Cuts at the last word boundary when there is one. CJK characters count
/// as word boundaries of their own.
pub fn truncate(text: &str, length: usize, ending: &str) -> String {
    let length = length.saturating_sub(utf16_len(ending));
    if utf16_len(text) <= length {
        return text.to_string();
    }

    let units: Vec<u16> = text.encode_utf16().collect();
    let mut last_word_end = 0;
    let mut last_non_space = 0;

    for (i, &unit) in units.iter().enumerate() {
        let ch = char::from_u32(u32::from(unit));
        match ch {
            Some(c) if c.is_whitespace() => last_word_end = last_non_space,
            Some(c) if is_cjk(c) => last_word_end = i,
            _ => last_non_space = i + 1,
        }
        if i + 1 > length {
            let mut end = if last_word_end == 0 { i } else { last_word_end };
            // never split a surrogate pair
            if end > 0 && is_high_surrogate(units[end - 1]) {
                end -= 1;
            }
            return String::from_utf16_lossy(&units[..end]) + ending;
        }
    }
    text.to_string()
}

/// Number of UTF-16 code units in `s`
pub fn utf16_len(s: &str) -> usize {
    s.chars().map(char::len_utf16).sum()
}

fn is_high_surrogate(unit: u16) -> bool {
    (0xD800..0xDC00).contains(&unit)
}

fn is_cjk(c: char) -> bool {
    matches!(c as u32,
        0x1100..=0x11FF      // Hangul Jamo
        | 0x3040..=0x309F    // Hiragana
        | 0x30A0..=0x30FF    // Katakana
        | 0x3400..=0x4DBF    // CJK Extension A
        | 0x4E00..=0x9FFF    // CJK Unified
        | 0xAC00..=0xD7AF    // Hangul Syllables
        | 0xF900..=0xFAFF)   // CJK Compatibility
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_unchanged() {
        assert_eq!(truncate_ellipsized("Status", 20), "Status");
    }

    #[test]
    fn test_cuts_at_word_boundary() {
        assert_eq!(truncate_ellipsized("In progress today", 13), "In progress …");
    }

    #[test]
    fn test_cuts_inside_long_word() {
        assert_eq!(truncate("abcdefghij", 6, "…"), "abcde…");
    }

    #[test]
    fn test_counts_utf16_units() {
        assert_eq!(utf16_len("a😀"), 3);
        assert_eq!(utf16_len("é"), 1);
    }

    #[test]
    fn test_keeps_surrogate_pairs_whole() {
        assert_eq!(truncate_ellipsized("ab😀cd", 5), "ab …");
        assert_eq!(truncate_ellipsized("ab😀cd", 6), "ab😀 …");
    }

    #[test]
    fn test_cjk_breaks_anywhere() {
        let out = truncate("漢字漢字漢字", 4, "…");
        assert_eq!(out, "漢字漢…");
    }
}
