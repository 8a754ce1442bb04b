use serde::{Deserialize, Serialize};

/// How names pulled from exports are re-cased.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapitalizeStyle {
    /// "JOHN smith" → "John Smith"
    #[default]
    TitleCase,
    /// "JOHN smith" → "John smith"
    FirstLetter,
}

/// Format a phone number as `(111) 222-3333`.
///
/// Ten digits, or eleven with a leading `1`, are formatted. Anything else is
/// returned exactly as given so odd values stay visible.
pub fn format_phone_number(raw: &str) -> String {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    let ten = match digits.len() {
        10 => &digits[..],
        11 if digits.starts_with('1') => &digits[1..],
        _ => return raw.to_string(),
    };
    format!("({}) {}-{}", &ten[..3], &ten[3..6], &ten[6..])
}

pub fn capitalize_name(raw: &str, style: CapitalizeStyle) -> String {
    if raw.is_empty() {
        return String::new();
    }
    match style {
        CapitalizeStyle::TitleCase => title_case(raw),
        CapitalizeStyle::FirstLetter => {
            let mut chars = raw.chars();
            let mut out = String::with_capacity(raw.len());
            if let Some(first) = chars.next() {
                out.extend(first.to_uppercase());
            }
            out.extend(chars.flat_map(char::to_lowercase));
            out
        }
    }
}

// A word starts after any character that is not alphanumeric or '_'.
fn title_case(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut at_word_start = true;
    for ch in raw.chars() {
        if ch.is_alphanumeric() || ch == '_' {
            if at_word_start {
                out.extend(ch.to_uppercase());
            } else {
                out.extend(ch.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(ch);
            at_word_start = true;
        }
    }
    out
}

/// First whitespace-separated token of a full name.
pub fn first_name(full_name: &str) -> &str {
    full_name.split_whitespace().next().unwrap_or(full_name)
}
