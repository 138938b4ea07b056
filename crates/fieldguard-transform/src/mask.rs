//! Masking strategies
//!
//! Masks hide characters in place, so the output keeps the input's length
//! (counted in characters):
//! - Regex: mask every match (or its `mask` capture group)
//! - Partial: keep a prefix and suffix, mask the interior
//! - CharClass: mask characters of selected classes

use crate::transform::{StrategyDescriptor, Transform};
use fieldguard_core::{Error, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Capture group name that narrows a regex mask to part of each match
pub const MASK_GROUP: &str = "mask";

/// Default mask character
pub const DEFAULT_MASK_CHAR: char = '*';

/// Configured masking strategy
#[derive(Debug, Clone)]
pub enum MaskStrategy {
    Regex(RegexMask),
    Partial(PartialMask),
    CharClass(CharClassMask),
}

impl MaskStrategy {
    /// Regex mask; fails if the pattern does not compile
    pub fn regex(pattern: &str, mask_char: char) -> Result<Self> {
        RegexMask::new(pattern, mask_char).map(Self::Regex)
    }

    /// Keep `prefix` leading and `suffix` trailing characters
    pub fn partial(prefix: usize, suffix: usize, mask_char: char) -> Self {
        Self::Partial(PartialMask::new(prefix, suffix, mask_char))
    }

    /// Mask every character belonging to one of `classes`
    pub fn char_class(classes: impl IntoIterator<Item = CharClass>, mask_char: char) -> Self {
        Self::CharClass(CharClassMask::new(classes, mask_char))
    }

    /// Apply the mask
    pub fn mask(&self, input: &str) -> String {
        match self {
            Self::Regex(m) => m.mask(input),
            Self::Partial(m) => m.mask(input),
            Self::CharClass(m) => m.mask(input),
        }
    }
}

impl Transform for MaskStrategy {
    fn transform(&self, value: &str) -> Result<String> {
        Ok(self.mask(value))
    }

    fn descriptor(&self) -> StrategyDescriptor {
        match self {
            Self::Regex(m) => StrategyDescriptor::Regex {
                pattern: m.pattern.as_str().to_string(),
                mask_char: m.mask_char,
            },
            Self::Partial(m) => StrategyDescriptor::Partial {
                prefix: m.prefix,
                suffix: m.suffix,
                mask_char: m.mask_char,
            },
            Self::CharClass(m) => StrategyDescriptor::CharClass {
                classes: m.classes.iter().copied().collect(),
                mask_char: m.mask_char,
            },
        }
    }
}

/// Replaces each non-overlapping match, leftmost first
#[derive(Debug, Clone)]
pub struct RegexMask {
    pattern: Regex,
    mask_char: char,
    has_mask_group: bool,
}

impl RegexMask {
    /// Compile a new regex mask
    pub fn new(pattern: &str, mask_char: char) -> Result<Self> {
        let pattern = Regex::new(pattern)
            .map_err(|e| Error::validation(format!("invalid mask pattern '{}': {}", pattern, e)))?;
        let has_mask_group = pattern
            .capture_names()
            .any(|name| name == Some(MASK_GROUP));

        Ok(Self {
            pattern,
            mask_char,
            has_mask_group,
        })
    }

    /// Apply the mask
    pub fn mask(&self, input: &str) -> String {
        if self.has_mask_group {
            let spans = self.pattern.captures_iter(input).filter_map(|caps| {
                caps.name(MASK_GROUP)
                    .or_else(|| caps.get(0))
                    .map(|m| (m.start(), m.end()))
            });
            mask_spans(input, spans, self.mask_char)
        } else {
            let spans = self.pattern.find_iter(input).map(|m| (m.start(), m.end()));
            mask_spans(input, spans, self.mask_char)
        }
    }
}

/// Keeps the first `prefix` and last `suffix` characters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartialMask {
    prefix: usize,
    suffix: usize,
    mask_char: char,
}

impl PartialMask {
    /// Create a new partial mask
    pub fn new(prefix: usize, suffix: usize, mask_char: char) -> Self {
        Self {
            prefix,
            suffix,
            mask_char,
        }
    }

    /// Apply the mask
    pub fn mask(&self, input: &str) -> String {
        let chars: Vec<char> = input.chars().collect();
        let len = chars.len();

        // Too short to keep anything: hide it all
        if len <= self.prefix.saturating_add(self.suffix) {
            return repeat_char(self.mask_char, len);
        }

        let mut out = String::with_capacity(input.len());
        out.extend(&chars[..self.prefix]);
        out.push_str(&repeat_char(self.mask_char, len - self.prefix - self.suffix));
        out.extend(&chars[len - self.suffix..]);
        out
    }
}

/// Character classes recognized by [`CharClassMask`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CharClass {
    Letter,
    Digit,
    Hangul,
    Space,
    Other,
}

impl CharClass {
    /// Classify a character. Hangul syllables are checked before letters so
    /// the script-specific class can be selected on its own.
    pub fn of(ch: char) -> Self {
        if ('\u{AC00}'..='\u{D7AF}').contains(&ch) {
            Self::Hangul
        } else if ch.is_alphabetic() {
            Self::Letter
        } else if ch.is_numeric() {
            Self::Digit
        } else if ch.is_whitespace() {
            Self::Space
        } else {
            Self::Other
        }
    }
}

impl std::str::FromStr for CharClass {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "letter" => Ok(Self::Letter),
            "digit" => Ok(Self::Digit),
            "hangul" => Ok(Self::Hangul),
            "space" => Ok(Self::Space),
            "other" => Ok(Self::Other),
            other => Err(Error::validation(format!("unknown character class '{}'", other))),
        }
    }
}

/// Masks characters whose class is in the configured set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharClassMask {
    classes: BTreeSet<CharClass>,
    mask_char: char,
}

impl CharClassMask {
    /// Create a new character-class mask
    pub fn new(classes: impl IntoIterator<Item = CharClass>, mask_char: char) -> Self {
        Self {
            classes: classes.into_iter().collect(),
            mask_char,
        }
    }

    /// Apply the mask
    pub fn mask(&self, input: &str) -> String {
        input
            .chars()
            .map(|ch| {
                if self.classes.contains(&CharClass::of(ch)) {
                    self.mask_char
                } else {
                    ch
                }
            })
            .collect()
    }
}

fn repeat_char(ch: char, count: usize) -> String {
    std::iter::repeat(ch).take(count).collect()
}

/// Replace each byte span with mask characters, one per masked character.
/// Spans must be ordered and non-overlapping, as regex iterators yield them.
fn mask_spans(input: &str, spans: impl Iterator<Item = (usize, usize)>, mask_char: char) -> String {
    let mut out = String::with_capacity(input.len());
    let mut last = 0;

    for (start, end) in spans {
        out.push_str(&input[last..start]);
        out.push_str(&repeat_char(mask_char, input[start..end].chars().count()));
        last = end;
    }

    out.push_str(&input[last..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_regex_mask_local_part() {
        let mask = MaskStrategy::regex(r"^.(?P<mask>[^@]*).@", '*').unwrap();
        assert_eq!(mask.mask("user@example.com"), "u**r@example.com");
    }

    #[test]
    fn test_regex_mask_whole_matches() {
        let mask = MaskStrategy::regex(r"\d{3}", '#').unwrap();
        assert_eq!(mask.mask("call 555-123-4567 now"), "call ###-###-###7 now");
    }

    #[test]
    fn test_regex_mask_no_match_passes_through() {
        let mask = MaskStrategy::regex(r"\d+", '*').unwrap();
        assert_eq!(mask.mask("no digits here"), "no digits here");
    }

    #[test]
    fn test_regex_mask_counts_characters() {
        let mask = MaskStrategy::regex("홍길", '*').unwrap();
        assert_eq!(mask.mask("홍길동"), "**동");
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        let err = MaskStrategy::regex("(unclosed", '*').unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn test_partial_mask() {
        let mask = MaskStrategy::partial(2, 2, '*');
        assert_eq!(mask.mask("maskingUser"), "ma*******er");
    }

    #[test]
    fn test_partial_mask_short_input() {
        let mask = MaskStrategy::partial(2, 2, '*');
        assert_eq!(mask.mask("abcd"), "****");
        assert_eq!(mask.mask("ab"), "**");
        assert_eq!(mask.mask(""), "");
    }

    #[test]
    fn test_char_class_mask() {
        let mask = MaskStrategy::char_class([CharClass::Digit], '*');
        assert_eq!(mask.mask("a1-b2 c3"), "a*-b* c*");

        let mask = MaskStrategy::char_class([CharClass::Letter, CharClass::Space], 'x');
        assert_eq!(mask.mask("ab 12"), "xxx12");
    }

    #[test]
    fn test_char_class_hangul() {
        let mask = MaskStrategy::char_class([CharClass::Hangul], '*');
        assert_eq!(mask.mask("홍길동 Kim"), "*** Kim");
    }

    #[test]
    fn test_char_class_from_str() {
        assert_eq!("Digit".parse::<CharClass>().unwrap(), CharClass::Digit);
        assert!("emoji".parse::<CharClass>().is_err());
    }

    #[test]
    fn test_null_passes_through() {
        let mask = MaskStrategy::partial(1, 1, '*');
        assert_eq!(mask.transform_nullable(None).unwrap(), None);
    }

    proptest! {
        #[test]
        fn prop_partial_mask(s in "\\PC{0,40}", p in 0usize..6, q in 0usize..6) {
            let masked = PartialMask::new(p, q, '*').mask(&s);
            let chars: Vec<char> = s.chars().collect();
            let len = chars.len();

            if len <= p + q {
                prop_assert_eq!(masked, "*".repeat(len));
            } else {
                let expected: String = chars[..p].iter().collect::<String>()
                    + &"*".repeat(len - p - q)
                    + &chars[len - q..].iter().collect::<String>();
                prop_assert_eq!(masked, expected);
            }
        }

        #[test]
        fn prop_masks_preserve_length(s in "\\PC{0,40}") {
            let mask = MaskStrategy::char_class([CharClass::Letter, CharClass::Digit], '*');
            prop_assert_eq!(mask.mask(&s).chars().count(), s.chars().count());
        }
    }
}
