//! Collation services and text key strategies.
//!
//! A [`CollationService`] is the optional capability that turns a text value
//! into a byte-comparable sort key for a named locale. The engine never
//! compares collated strings directly; it compares the keys.
//!
//! - [`NoCollation`] models an environment with no collation support. Every
//!   named locale is rejected by the resolver when it is installed.
//! - [`LatinCollation`] is a built-in multi-level collation for Latin-script
//!   languages with tailoring for German, Swedish/Finnish, Spanish and
//!   Turkish.
//!
//! A [`TextKeyStrategy`] decides how a character column is turned into key
//! bytes. The resolved locale is one strategy; [`NaturalText`] is an opt-in
//! per-column alternative that orders digit runs numerically.

use std::fmt;

use tracing::info;

use crate::locale::LocaleId;

/// A capability producing byte-comparable sort keys for a locale.
///
/// Keys must be consistent: comparing two keys byte-wise gives the
/// collation order of the two values they were built from.
pub trait CollationService: Send + Sync + fmt::Debug {
    /// Name of the service, used in diagnostics.
    fn name(&self) -> &str;

    /// Whether this service can collate text for `locale`.
    fn supports(&self, locale: &LocaleId) -> bool;

    /// Appends the sort key of `text` under `locale` to `out`.
    fn sort_key(&self, text: &str, locale: &LocaleId, out: &mut Vec<u8>);
}

/// The absent collation capability.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoCollation;

impl CollationService for NoCollation {
    fn name(&self) -> &str {
        "none"
    }

    fn supports(&self, _locale: &LocaleId) -> bool {
        false
    }

    fn sort_key(&self, text: &str, _locale: &LocaleId, out: &mut Vec<u8>) {
        out.extend_from_slice(text.as_bytes());
    }
}

// Primary weights are spaced four apart so tailored letters can be slotted
// between neighbours without colliding with any real code point.
const WEIGHT_SPACING: u32 = 4;
const LEVEL_SEPARATOR: u32 = 0;

const TERTIARY_LOWER: u32 = 1;
const TERTIARY_UPPER: u32 = 2;
const SECONDARY_PLAIN: u32 = 1;

/// Languages written in Latin script, the only ones [`LatinCollation`]
/// accepts.
const LATIN_LANGUAGES: &[&str] = &[
    "af", "az", "ca", "cs", "cy", "da", "de", "en", "es", "et", "eu", "fi", "fr", "ga", "gl",
    "hr", "hu", "id", "is", "it", "lt", "lv", "ms", "mt", "nb", "nl", "nn", "no", "pl", "pt",
    "ro", "sk", "sl", "sq", "sv", "sw", "tr", "vi",
];

#[inline]
fn base_weight(ch: char) -> u32 {
    u32::from(ch) * WEIGHT_SPACING + WEIGHT_SPACING
}

/// Built-in Latin-script collation.
///
/// Keys carry four levels separated by a zero weight:
///
/// 1. primary: base letter, case and accent folded (with language tailoring),
/// 2. secondary: accents,
/// 3. tertiary: case, lowercase first,
/// 4. identical: code points, so distinct strings never share a key.
///
/// Under this collation `["a", "A", "B", "b"]` orders as `["a", "A", "b", "B"]`.
#[derive(Debug, Clone, Default)]
pub struct LatinCollation {
    _private: (),
}

impl LatinCollation {
    pub fn new() -> Self {
        info!(service = "latin", "collation service created");
        Self { _private: () }
    }

    fn primary_weights(ch: char, language: &str, out: &mut Vec<u32>) {
        let lower = ch.to_lowercase().next().unwrap_or(ch);
        match (language, lower) {
            ("de", '\u{00E4}') => out.extend([base_weight('a'), base_weight('e')]),
            ("de", '\u{00F6}') => out.extend([base_weight('o'), base_weight('e')]),
            ("de", '\u{00FC}') => out.extend([base_weight('u'), base_weight('e')]),
            ("de", '\u{00DF}') => out.extend([base_weight('s'), base_weight('s')]),
            ("sv" | "fi", '\u{00E5}') => out.push(base_weight('z') + 1),
            ("sv" | "fi", '\u{00E4}') => out.push(base_weight('z') + 2),
            ("sv" | "fi", '\u{00F6}') => out.push(base_weight('z') + 3),
            ("es", '\u{00F1}') => out.push(base_weight('n') + 1),
            // Dotless i (and its capital, plain I) sits between h and i.
            ("tr" | "az", '\u{0131}') => out.push(base_weight('i') - 2),
            ("tr" | "az", 'i') if ch == 'I' => out.push(base_weight('i') - 2),
            ("tr" | "az", 'i') => out.push(base_weight('i')),
            _ => out.push(base_weight(strip_diacritic(lower))),
        }
    }

    fn secondary_weight(ch: char, language: &str) -> u32 {
        let lower = ch.to_lowercase().next().unwrap_or(ch);
        // German umlauts keep an accent weight so "ue" sorts before "ü".
        let tailored = matches!(
            (language, lower),
            ("sv" | "fi", '\u{00E5}' | '\u{00E4}' | '\u{00F6}')
                | ("es", '\u{00F1}')
                | ("tr" | "az", '\u{0131}' | 'i')
        );
        if tailored {
            return SECONDARY_PLAIN;
        }
        let base = strip_diacritic(lower);
        if base == lower {
            SECONDARY_PLAIN
        } else {
            u32::from(lower) + 2
        }
    }

    fn tertiary_weight(ch: char) -> u32 {
        if ch.is_uppercase() {
            TERTIARY_UPPER
        } else {
            TERTIARY_LOWER
        }
    }
}

impl CollationService for LatinCollation {
    fn name(&self) -> &str {
        "latin"
    }

    fn supports(&self, locale: &LocaleId) -> bool {
        locale
            .language()
            .is_some_and(|language| LATIN_LANGUAGES.iter().any(|&l| l == language))
    }

    fn sort_key(&self, text: &str, locale: &LocaleId, out: &mut Vec<u8>) {
        let language = locale.language().unwrap_or("");
        let mut weights: Vec<u32> = Vec::with_capacity(text.len() * 4 + 3);

        text.chars()
            .for_each(|ch| Self::primary_weights(ch, language, &mut weights));
        weights.push(LEVEL_SEPARATOR);
        weights.extend(text.chars().map(|ch| Self::secondary_weight(ch, language)));
        weights.push(LEVEL_SEPARATOR);
        weights.extend(text.chars().map(Self::tertiary_weight));
        weights.push(LEVEL_SEPARATOR);
        weights.extend(text.chars().map(|ch| u32::from(ch) + 1));

        out.reserve(weights.len() * 4);
        for w in weights {
            out.extend_from_slice(&w.to_be_bytes());
        }
    }
}

/// Strips common Latin diacritics from a lowercase character.
fn strip_diacritic(ch: char) -> char {
    match ch {
        '\u{00E0}'..='\u{00E6}' => 'a',
        '\u{00E7}' => 'c',
        '\u{00E8}'..='\u{00EB}' => 'e',
        '\u{00EC}'..='\u{00EF}' => 'i',
        '\u{00F1}' => 'n',
        '\u{00F2}'..='\u{00F6}' | '\u{00F8}' => 'o',
        '\u{00F9}'..='\u{00FC}' => 'u',
        '\u{00FD}' | '\u{00FF}' => 'y',
        _ => ch,
    }
}

/// How a character value becomes key bytes before escaping.
///
/// The bytes written by a strategy are escaped and terminated by the
/// encoder, so strategies may write any byte sequence.
pub trait TextKeyStrategy: Send + Sync + fmt::Debug {
    fn append_key(&self, text: &str, out: &mut Vec<u8>);
}

/// Raw UTF-8 byte order, identical to the "C" locale.
#[derive(Debug, Default, Clone, Copy)]
pub struct ByteOrderText;

impl TextKeyStrategy for ByteOrderText {
    #[inline]
    fn append_key(&self, text: &str, out: &mut Vec<u8>) {
        out.extend_from_slice(text.as_bytes());
    }
}

const NATURAL_TIE_BREAK: u8 = 0x00;
const NATURAL_DIGITS: u8 = 0x01;
const NATURAL_BYTE: u8 = 0x02;

/// Natural ("version") ordering: runs of ASCII digits compare by numeric
/// value, everything else byte-wise. `"file2"` sorts before `"file10"`.
///
/// At the same position a number sorts before a non-digit byte. Leading zeros
/// only break ties once the rest of the key is equal, fewer zeros first:
/// `["07", "7b", "7a"]` orders as `"07", "7a", "7b"` while `"7"`, `"07"` and
/// `"007"` stay distinct and ordered.
#[derive(Debug, Default, Clone, Copy)]
pub struct NaturalText;

impl TextKeyStrategy for NaturalText {
    fn append_key(&self, text: &str, out: &mut Vec<u8>) {
        let bytes = text.as_bytes();
        let mut zero_counts: Vec<u16> = Vec::new();
        let mut i = 0;
        while i < bytes.len() {
            if bytes[i].is_ascii_digit() {
                let start = i;
                while i < bytes.len() && bytes[i].is_ascii_digit() {
                    i += 1;
                }
                let run = &bytes[start..i];
                let significant = match run.iter().position(|&b| b != b'0') {
                    Some(p) => &run[p..],
                    None => &run[run.len() - 1..],
                };
                let width = u16::try_from(significant.len()).unwrap_or(u16::MAX);
                let zeros = u16::try_from(run.len() - significant.len()).unwrap_or(u16::MAX);
                out.push(NATURAL_DIGITS);
                out.extend_from_slice(&width.to_be_bytes());
                out.extend_from_slice(significant);
                zero_counts.push(zeros);
            } else {
                out.push(NATURAL_BYTE);
                out.push(bytes[i]);
                i += 1;
            }
        }
        out.push(NATURAL_TIE_BREAK);
        for zeros in zero_counts {
            out.extend_from_slice(&zeros.to_be_bytes());
        }
    }
}
