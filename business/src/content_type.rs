//! Classification of decoded QR text into content categories.
//!
//! Checks run in a fixed order and the first match wins, so a `mailto:` link
//! is an email even though it also looks like a URL, and a Google Maps link is
//! a location rather than a plain URL.

use std::fmt;

use serde::Serialize;

/// Semantic category of a QR payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContentType {
    Url,
    Email,
    Phone,
    Sms,
    Wifi,
    Contact,
    Location,
    Json,
    Markdown,
    Code,
    #[default]
    PlainText,
}

impl ContentType {
    /// User-facing label.
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Url => "URL",
            Self::Email => "Email",
            Self::Phone => "Teléfono",
            Self::Sms => "SMS",
            Self::Wifi => "WiFi",
            Self::Contact => "Contacto",
            Self::Location => "Ubicación",
            Self::Json => "JSON",
            Self::Markdown => "Markdown",
            Self::Code => "Código",
            Self::PlainText => "Texto",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Keywords that mark a string as source code when they appear as whole words.
const CODE_KEYWORDS: &[&str] = &[
    "function", "class", "import", "export", "var", "let", "const", "def", "print", "return",
    "if", "else", "for", "while",
];

/// Classify `content`. Never fails; unrecognized text is [`ContentType::PlainText`].
pub fn detect_content_type(content: &str) -> ContentType {
    let text = content.trim_start();

    if starts_with_ignore_case(text, "BEGIN:VCARD") {
        ContentType::Contact
    } else if starts_with_ignore_case(text, "WIFI:") {
        ContentType::Wifi
    } else if starts_with_ignore_case(text, "mailto:") {
        ContentType::Email
    } else if starts_with_ignore_case(text, "tel:") || starts_with_ignore_case(text, "phone:") {
        ContentType::Phone
    } else if starts_with_ignore_case(text, "sms:") || starts_with_ignore_case(text, "smsto:") {
        ContentType::Sms
    } else if starts_with_ignore_case(text, "geo:") || text.contains("maps.google.com") {
        ContentType::Location
    } else if is_valid_url(text) {
        ContentType::Url
    } else if is_valid_json(text) {
        ContentType::Json
    } else if is_markdown(text) {
        ContentType::Markdown
    } else if is_code(text) {
        ContentType::Code
    } else {
        ContentType::PlainText
    }
}

/// Case-insensitive ASCII prefix test.
pub(crate) fn starts_with_ignore_case(text: &str, prefix: &str) -> bool {
    text.get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}

/// Strip an ASCII prefix regardless of case.
pub(crate) fn strip_prefix_ignore_case<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    if starts_with_ignore_case(text, prefix) {
        text.get(prefix.len()..)
    } else {
        None
    }
}

/// Scheme-prefixed links and `www.` hosts, or bare `host/path` strings without spaces.
pub fn is_valid_url(text: &str) -> bool {
    let text = text.trim();
    if starts_with_ignore_case(text, "http://")
        || starts_with_ignore_case(text, "https://")
        || starts_with_ignore_case(text, "www.")
    {
        return true;
    }
    text.contains('.') && text.contains('/') && !text.chars().any(char::is_whitespace)
}

/// A JSON object or array. Bare scalars such as `42` or `true` are not treated as JSON.
pub fn is_valid_json(text: &str) -> bool {
    serde_json::from_str::<serde_json::Value>(text.trim())
        .is_ok_and(|value| value.is_object() || value.is_array())
}

pub fn is_markdown(text: &str) -> bool {
    if text.contains("**") || text.contains("```") || text.contains("__") {
        return true;
    }
    if text.contains('[') && text.contains("](") {
        return true;
    }
    if text.matches('`').count() >= 2 || text.matches('*').count() >= 2 {
        return true;
    }
    text.lines().map(str::trim_start).any(|line| {
        is_heading(line)
            || line.starts_with("- ")
            || line.starts_with("* ")
            || line.starts_with("+ ")
            || is_ordered_list_item(line)
    })
}

fn is_heading(line: &str) -> bool {
    let hashes = line.chars().take_while(|c| *c == '#').count();
    (1..=6).contains(&hashes) && line[hashes..].starts_with(' ')
}

fn is_ordered_list_item(line: &str) -> bool {
    let digits = line.chars().take_while(char::is_ascii_digit).count();
    digits > 0 && line[digits..].starts_with(". ")
}

pub fn is_code(text: &str) -> bool {
    if text.contains('{') || text.contains('}') || text.contains(';') {
        return true;
    }
    text.split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .any(|word| CODE_KEYWORDS.contains(&word))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scheme_prefixes_are_recognized() {
        assert_eq!(
            detect_content_type("BEGIN:VCARD\nFN:Ana\nEND:VCARD"),
            ContentType::Contact
        );
        assert_eq!(
            detect_content_type("WIFI:T:WPA;S:Net;P:pass;;"),
            ContentType::Wifi
        );
        assert_eq!(
            detect_content_type("mailto:ana@example.com"),
            ContentType::Email
        );
        assert_eq!(detect_content_type("tel:555"), ContentType::Phone);
        assert_eq!(detect_content_type("phone:+5215512345678"), ContentType::Phone);
        assert_eq!(detect_content_type("sms:555?body=hi"), ContentType::Sms);
        assert_eq!(detect_content_type("SMSTO:555:hi"), ContentType::Sms);
        assert_eq!(detect_content_type("geo:19.43,-99.13"), ContentType::Location);
    }

    #[test]
    fn earlier_rules_win() {
        assert_eq!(
            detect_content_type("https://maps.google.com/?q=19.43,-99.13"),
            ContentType::Location
        );
        assert_eq!(
            detect_content_type("mailto:ana@example.com?subject=a/b"),
            ContentType::Email
        );
    }

    #[test]
    fn urls() {
        assert_eq!(detect_content_type("https://example.com"), ContentType::Url);
        assert_eq!(detect_content_type("www.example.com"), ContentType::Url);
        assert_eq!(detect_content_type("example.com/path"), ContentType::Url);
        assert!(!is_valid_url("example.com has/spaces"));
        assert!(!is_valid_url(""));
    }

    #[test]
    fn scheme_prefix_is_enough_for_a_url() {
        assert_eq!(
            detect_content_type("https://example.com and more"),
            ContentType::Url
        );
        assert_eq!(detect_content_type("www.lumi.mx/menu hoy"), ContentType::Url);
    }

    #[test]
    fn json_requires_a_container() {
        assert_eq!(detect_content_type(r#"{"a": 1}"#), ContentType::Json);
        assert_eq!(detect_content_type("[1, 2, 3]"), ContentType::Json);
        assert_eq!(detect_content_type("42"), ContentType::PlainText);
    }

    #[test]
    fn markdown_markers() {
        assert_eq!(detect_content_type("# Title\nbody"), ContentType::Markdown);
        assert_eq!(detect_content_type("some **bold** text"), ContentType::Markdown);
        assert_eq!(detect_content_type("- one\n- two"), ContentType::Markdown);
        assert_eq!(detect_content_type("1. first"), ContentType::Markdown);
        assert_eq!(detect_content_type("see [docs](http)"), ContentType::Markdown);
        assert!(!is_markdown("#hashtag"));
    }

    #[test]
    fn code_markers() {
        assert_eq!(detect_content_type("let x = 5"), ContentType::Code);
        assert_eq!(detect_content_type("print('hola')"), ContentType::Code);
        assert_eq!(detect_content_type("import os"), ContentType::Code);
        assert_eq!(detect_content_type("int main() { return 0; }"), ContentType::Code);
        assert_eq!(
            detect_content_type("information about everyone"),
            ContentType::PlainText
        );
    }

    #[test]
    fn a_single_whole_word_keyword_is_code() {
        assert_eq!(detect_content_type("return home"), ContentType::Code);
        assert_eq!(detect_content_type("if you can, call me"), ContentType::Code);
        assert_eq!(detect_content_type("printer classes"), ContentType::PlainText);
    }

    #[test]
    fn everything_else_is_plain_text() {
        assert_eq!(detect_content_type("hola mundo"), ContentType::PlainText);
        assert_eq!(detect_content_type(""), ContentType::PlainText);
        assert_eq!(detect_content_type("   "), ContentType::PlainText);
    }

    #[test]
    fn display_names_are_user_facing() {
        assert_eq!(ContentType::Phone.display_name(), "Teléfono");
        assert_eq!(ContentType::Location.to_string(), "Ubicación");
        assert_eq!(ContentType::PlainText.to_string(), "Texto");
    }
}
