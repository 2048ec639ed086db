//! String collation for text sort keys

use std::cmp::Ordering;

use deunicode::deunicode_char;

/// Reusable buffers a collator may fold strings into.
///
/// Owned by exactly one evaluation at a time (see [`super::ScratchPool`]).
#[derive(Debug, Default)]
pub struct CollationBuffer {
    pub left: String,
    pub right: String,
}

impl CollationBuffer {
    pub fn clear(&mut self) {
        self.left.clear();
        self.right.clear();
    }

    pub fn is_clear(&self) -> bool {
        self.left.is_empty() && self.right.is_empty()
    }
}

/// Locale collation seam
pub trait Collator: Send + Sync {
    fn compare(&self, left: &str, right: &str, scratch: &mut CollationBuffer) -> Ordering;
}

/// Compares transliterated, case-folded text.
///
/// The primary key folds accents away (`é` sorts with `e`), the secondary
/// key is the lowercased original and the final tie break is byte order.
#[derive(Debug, Clone, Copy, Default)]
pub struct CaseFoldCollator;

impl Collator for CaseFoldCollator {
    fn compare(&self, left: &str, right: &str, scratch: &mut CollationBuffer) -> Ordering {
        scratch.clear();
        fold_into(&mut scratch.left, left);
        fold_into(&mut scratch.right, right);
        scratch
            .left
            .cmp(&scratch.right)
            .then_with(|| {
                left.chars()
                    .flat_map(char::to_lowercase)
                    .cmp(right.chars().flat_map(char::to_lowercase))
            })
            .then_with(|| left.cmp(right))
    }
}

/// Appends the lowercased ASCII transliteration of `text` to `out`
fn fold_into(out: &mut String, text: &str) {
    for c in text.chars() {
        match deunicode_char(c) {
            Some(ascii) => out.extend(ascii.chars().map(|a| a.to_ascii_lowercase())),
            None => out.extend(c.to_lowercase()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_fold_ordering() {
        let mut scratch = CollationBuffer::default();
        let c = CaseFoldCollator;

        assert_eq!(c.compare("apple", "Banana", &mut scratch), Ordering::Less);
        assert_eq!(c.compare("Zebra", "apple", &mut scratch), Ordering::Greater);
        assert_eq!(c.compare("Éclair", "éclair", &mut scratch), Ordering::Less);
        assert_eq!(c.compare("same", "same", &mut scratch), Ordering::Equal);
    }

    #[test]
    fn test_accents_sort_with_base_letters() {
        let mut scratch = CollationBuffer::default();
        let c = CaseFoldCollator;

        assert_eq!(c.compare("éclair", "fig", &mut scratch), Ordering::Less);
        assert_eq!(c.compare("Ångström", "zebra", &mut scratch), Ordering::Less);
        assert_eq!(c.compare("eclair", "éclair", &mut scratch), Ordering::Less);
        assert_eq!(c.compare("Straße", "strasse", &mut scratch), Ordering::Greater);
    }
}
