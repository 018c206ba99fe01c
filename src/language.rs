//! Script-based language hints and the closed set of language codes.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Supported language codes. `Auto` means "no forced language".
///
/// Deserialization never fails on an unknown string: it coerces to `Auto`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LanguageCode {
    #[default]
    Auto,
    En,
    Ko,
    Ja,
    Zh,
    Fr,
    Es,
    De,
    Ru,
}

impl LanguageCode {
    /// Selectable languages, in menu order.
    pub const ALL: [LanguageCode; 8] = [
        Self::En,
        Self::Zh,
        Self::Ja,
        Self::Ko,
        Self::Fr,
        Self::Es,
        Self::De,
        Self::Ru,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::En => "en",
            Self::Ko => "ko",
            Self::Ja => "ja",
            Self::Zh => "zh",
            Self::Fr => "fr",
            Self::Es => "es",
            Self::De => "de",
            Self::Ru => "ru",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Auto => "Auto",
            Self::En => "English",
            Self::Ko => "Korean",
            Self::Ja => "Japanese",
            Self::Zh => "Chinese",
            Self::Fr => "French",
            Self::Es => "Spanish",
            Self::De => "German",
            Self::Ru => "Russian",
        }
    }

    /// Coerce any free-form value into the closed set.
    pub fn normalize(raw: Option<&str>) -> Self {
        let normalized = raw.unwrap_or("").trim().to_lowercase();
        match normalized.as_str() {
            "en" => Self::En,
            "ko" => Self::Ko,
            "ja" => Self::Ja,
            "zh" => Self::Zh,
            "fr" => Self::Fr,
            "es" => Self::Es,
            "de" => Self::De,
            "ru" => Self::Ru,
            _ => Self::Auto,
        }
    }

    pub fn is_auto(&self) -> bool {
        *self == Self::Auto
    }
}

impl fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl From<&str> for LanguageCode {
    fn from(raw: &str) -> Self {
        Self::normalize(Some(raw))
    }
}

impl Serialize for LanguageCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code())
    }
}

impl<'de> Deserialize<'de> for LanguageCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(Self::normalize(raw.as_deref()))
    }
}

/// Detected language plus the signal that decided it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LanguageHint {
    pub code: LanguageCode,
    pub reason: &'static str,
}

impl LanguageHint {
    fn new(code: LanguageCode, reason: &'static str) -> Self {
        Self { code, reason }
    }
}

type ScriptCheck = (fn(char) -> bool, LanguageCode, &'static str);

// First match wins; mixed-script text reports the earliest script in this list.
const SCRIPT_CHECKS: [ScriptCheck; 5] = [
    (is_hangul, LanguageCode::Ko, "contains_hangul"),
    (is_kana, LanguageCode::Ja, "contains_kana"),
    (is_cjk, LanguageCode::Zh, "contains_cjk"),
    (is_cyrillic, LanguageCode::Ru, "contains_cyrillic"),
    (is_latin, LanguageCode::En, "contains_latin"),
];

fn is_hangul(c: char) -> bool {
    matches!(c, '\u{3131}'..='\u{314E}' | '\u{314F}'..='\u{3163}' | '\u{AC00}'..='\u{D7A3}')
}

fn is_kana(c: char) -> bool {
    matches!(c, '\u{3041}'..='\u{309F}' | '\u{30A0}'..='\u{30FF}')
}

fn is_cjk(c: char) -> bool {
    matches!(c, '\u{4E00}'..='\u{9FFF}')
}

fn is_cyrillic(c: char) -> bool {
    matches!(c, '\u{0410}'..='\u{044F}' | '\u{0401}' | '\u{0451}')
}

fn is_latin(c: char) -> bool {
    c.is_ascii_alphabetic()
}

/// Classify text by the first script signal found, in priority order.
pub fn detect_language(text: &str) -> LanguageHint {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return LanguageHint::new(LanguageCode::Auto, "empty");
    }

    SCRIPT_CHECKS
        .iter()
        .find(|(check, _, _)| trimmed.chars().any(*check))
        .map(|&(_, code, reason)| LanguageHint::new(code, reason))
        .unwrap_or_else(|| LanguageHint::new(LanguageCode::Auto, "no_script_signal"))
}

/// Detect over a leading sample: at most `max_sentences` sentences, joined
/// with spaces and cut to `max_chars` characters.
pub fn detect_from_sentences<S: AsRef<str>>(
    sentences: &[S],
    max_sentences: usize,
    max_chars: usize,
) -> LanguageHint {
    if sentences.is_empty() {
        return LanguageHint::new(LanguageCode::Auto, "no_sentences");
    }

    let joined = sentences
        .iter()
        .take(max_sentences)
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(" ");
    let sample: String = joined.chars().take(max_chars).collect();

    detect_language(&sample)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_closure() {
        assert_eq!(LanguageCode::normalize(Some("KO")), LanguageCode::Ko);
        assert_eq!(LanguageCode::normalize(Some("  en ")), LanguageCode::En);
        assert_eq!(LanguageCode::normalize(Some("XX")), LanguageCode::Auto);
        assert_eq!(LanguageCode::normalize(Some("")), LanguageCode::Auto);
        assert_eq!(LanguageCode::normalize(None), LanguageCode::Auto);
        assert_eq!(LanguageCode::normalize(Some("Auto")), LanguageCode::Auto);
    }

    #[test]
    fn test_deserialize_coerces_unknown() {
        let codes: Vec<LanguageCode> =
            serde_json::from_str(r#"["ja", "Klingon", null, "RU"]"#).unwrap();
        assert_eq!(
            codes,
            vec![LanguageCode::Ja, LanguageCode::Auto, LanguageCode::Auto, LanguageCode::Ru]
        );
        assert_eq!(serde_json::to_string(&LanguageCode::Zh).unwrap(), "\"zh\"");
    }

    #[test]
    fn test_labels() {
        assert_eq!(LanguageCode::Ko.label(), "Korean");
        assert_eq!(LanguageCode::Auto.label(), "Auto");
        assert!(!LanguageCode::ALL.contains(&LanguageCode::Auto));
    }

    #[test]
    fn test_hangul_beats_latin() {
        let hint = detect_language("Hello 안녕하세요 world");
        assert_eq!(hint, LanguageHint::new(LanguageCode::Ko, "contains_hangul"));
    }

    #[test]
    fn test_script_order() {
        assert_eq!(detect_language("カタカナと漢字").code, LanguageCode::Ja);
        assert_eq!(detect_language("汉字").reason, "contains_cjk");
        assert_eq!(detect_language("Привет, мир").code, LanguageCode::Ru);
        assert_eq!(detect_language("Bonjour").code, LanguageCode::En);
        assert_eq!(detect_language("12345 !?").reason, "no_script_signal");
        assert_eq!(detect_language("   ").reason, "empty");
    }

    #[test]
    fn test_detect_from_sentences_sampling() {
        let empty: Vec<String> = Vec::new();
        assert_eq!(detect_from_sentences(&empty, 120, 5000).reason, "no_sentences");

        // Hangul sits past the sentence sample, so only Latin is seen.
        let sentences = ["One.", "Two.", "셋."];
        assert_eq!(detect_from_sentences(&sentences, 2, 5000).code, LanguageCode::En);
        assert_eq!(detect_from_sentences(&sentences, 3, 5000).code, LanguageCode::Ko);
        // Character cap cuts it off too.
        assert_eq!(detect_from_sentences(&sentences, 3, 8).code, LanguageCode::En);
    }
}
