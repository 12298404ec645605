//! Cosmetic normalization between stored region text and what is displayed.
//!
//! Stored text marks line breaks (and zero-width merge joins) with
//! [`LINE_BREAK_MARKER`]; displayed text uses `\n`.

use std::sync::LazyLock;

use regex::Regex;

/// Zero-width line separator used in stored text.
pub const LINE_BREAK_MARKER: char = '\u{200B}';

struct PunctuationRules {
    collapse: Vec<(Regex, &'static str)>,
    ellipsis_run: Regex,
    punctuation_only: Regex,
    trailing_after_glyph: Regex,
    leading_before_glyph: Regex,
}

static RULES: LazyLock<PunctuationRules> = LazyLock::new(|| {
    let rule = |pattern: &str, replacement: &'static str| {
        (Regex::new(pattern).expect("valid punctuation pattern"), replacement)
    };

    PunctuationRules {
        collapse: vec![
            rule(r"!!+", "‼"),
            rule(r"\?\?+", "⁇"),
            rule(r"\.\.+", "…"),
            rule(r"(?:!\?)+", "⁉"),
            rule(r"(?:\?!)+", "⁈"),
            rule(r"\x{2026}+", "…"),
            rule(r"\x{30FB}\x{30FB}+", "…"),
            rule(r"\x{FF65}\x{FF65}+", "…"),
            rule(r"-+", "ー"),
            rule(r"\x{2013}+", "―"),
            rule(r":+", "…"),
        ],
        ellipsis_run: Regex::new(r"\x{2026}{2,}").expect("valid ellipsis pattern"),
        punctuation_only: Regex::new(r"^[!?:]+$").expect("valid punctuation-only pattern"),
        trailing_after_glyph: Regex::new(r"([⁉⁈‼⁇])[!?:]+").expect("valid glyph pattern"),
        leading_before_glyph: Regex::new(r"[!?:]+([⁉⁈‼⁇])").expect("valid glyph pattern"),
    }
});

pub trait Preprocessor {
    /// Display form of stored text: punctuation runs collapsed into
    /// typographic glyphs, spaces removed, punctuation-only lines dropped.
    fn process(&self, text: &str) -> String {
        if text.is_empty() {
            return String::new();
        }

        let rules = &*RULES;
        // Spaces carry no meaning in the source typography.
        let mut t = text.replace(LINE_BREAK_MARKER, "\n").replace(' ', "");

        for (pattern, replacement) in &rules.collapse {
            t = pattern.replace_all(&t, *replacement).into_owned();
        }
        t = rules.ellipsis_run.replace_all(&t, "…").into_owned();

        t.split('\n')
            .filter(|line| !rules.punctuation_only.is_match(line))
            .map(|line| {
                let line = rules.trailing_after_glyph.replace_all(line, "${1}");
                rules
                    .leading_before_glyph
                    .replace_all(&line, "${1}")
                    .into_owned()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

pub struct DisplayPreprocessor;
impl Preprocessor for DisplayPreprocessor {}

/// Stored text to what the region shows.
pub fn to_display(stored: &str) -> String {
    DisplayPreprocessor.process(stored)
}

/// Raw text in edit mode: line breaks made visible, nothing else touched.
pub fn to_editable(stored: &str) -> String {
    stored.replace(LINE_BREAK_MARKER, "\n")
}

/// Edited text back to the storage encoding.
pub fn to_storage(edited: &str) -> String {
    edited
        .replace("\r\n", "\n")
        .replace('\n', &LINE_BREAK_MARKER.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_punctuation_runs() {
        assert_eq!(to_display("なに!!"), "なに‼");
        assert_eq!(to_display("え??"), "え⁇");
        assert_eq!(to_display("それは..."), "それは…");
        assert_eq!(to_display("本当!?"), "本当⁉");
        assert_eq!(to_display("嘘?!"), "嘘⁈");
        assert_eq!(to_display("待って・・・"), "待って…");
        assert_eq!(to_display("あ--"), "あー");
        assert_eq!(to_display("ええ::"), "ええ…");
    }

    #[test]
    fn strips_spaces_and_punctuation_only_lines() {
        assert_eq!(to_display("こん にちは"), "こんにちは");
        assert_eq!(to_display("はい\u{200B}!\u{200B}いいえ"), "はい\nいいえ");
        assert_eq!(to_display("?"), "");
    }

    #[test]
    fn absorbs_stray_marks_around_glyphs() {
        assert_eq!(to_display("何!!!?"), "何‼");
        assert_eq!(to_display("何??!"), "何⁇");
    }

    #[test]
    fn display_is_idempotent() {
        for raw in ["あ…:い", "な -- に!! ?", "a\u{200B}. .\u{200B}b", "：・・・!?"] {
            let once = to_display(raw);
            assert_eq!(to_display(&once), once, "not stable for {raw:?}");
        }
    }

    #[test]
    fn edit_round_trip_preserves_line_breaks() {
        let raw = "一行目!!\u{200B}二行目\u{200B}三行目...";
        let shown = to_display(raw);
        let stored = to_storage(&shown);
        assert!(stored.contains(LINE_BREAK_MARKER));
        assert!(!stored.contains('\n'));
        let again = to_display(&stored);
        assert_eq!(
            again.split('\n').count(),
            shown.split('\n').count()
        );
        assert_eq!(again, shown);
    }

    #[test]
    fn editable_form_only_swaps_markers() {
        assert_eq!(to_editable("a b\u{200B}c!!"), "a b\nc!!");
    }
}
