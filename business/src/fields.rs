//! Extraction of labeled fields from structured QR payloads.
//!
//! Every parser is total: malformed input produces a partial or empty list,
//! never an error.

use serde::Serialize;

use crate::content_type::{ContentType, starts_with_ignore_case, strip_prefix_ignore_case};

/// One labeled value shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Field {
    pub label: String,
    pub value: String,
}

impl Field {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// Fields to display for `content` of the given type.
///
/// Falls back to a single `Contenido` field when the type-specific parser
/// finds nothing.
pub fn describe(content: &str, content_type: ContentType) -> Vec<Field> {
    let fields = match content_type {
        ContentType::Contact => parse_vcard(content),
        ContentType::Wifi => parse_wifi(content),
        ContentType::Email => parse_email(content),
        ContentType::Sms => parse_sms(content),
        ContentType::Location => parse_location(content),
        ContentType::Phone => vec![Field::new("Teléfono", format_phone_number(content))],
        ContentType::Url => vec![Field::new("URL", content.trim())],
        ContentType::Json => vec![Field::new("JSON", pretty_json(content))],
        ContentType::Markdown | ContentType::Code | ContentType::PlainText => Vec::new(),
    };

    if fields.is_empty() {
        vec![Field::new("Contenido", content)]
    } else {
        fields
    }
}

// ============================================================================
// vCard
// ============================================================================

pub fn parse_vcard(content: &str) -> Vec<Field> {
    let mut fields = Vec::new();
    let mut structured_name = None;

    for line in content.lines().map(str::trim) {
        if line.is_empty()
            || starts_with_ignore_case(line, "BEGIN:")
            || starts_with_ignore_case(line, "END:")
        {
            continue;
        }
        let Some((key, raw_value)) = line.split_once(':') else {
            continue;
        };
        // `item1.TEL;TYPE=CELL` -> `TEL`
        let property = key.split(';').next().unwrap_or(key);
        let property = property.rsplit('.').next().unwrap_or(property);

        let label = match property.to_ascii_uppercase().as_str() {
            "FN" => "Nombre",
            "ORG" => "Organización",
            "TITLE" => "Puesto",
            "TEL" => "Teléfono",
            "EMAIL" => "Email",
            "URL" => "URL",
            "ADR" => "Dirección",
            "N" => {
                structured_name = Some(name_from_components(raw_value));
                continue;
            }
            _ => continue,
        };

        let value = match label {
            "Organización" | "Dirección" => join_components(raw_value),
            _ => unescape(raw_value),
        };
        if !value.is_empty() {
            fields.push(Field::new(label, value));
        }
    }

    if let Some(name) = structured_name
        && !name.is_empty()
        && !fields.iter().any(|field| field.label == "Nombre")
    {
        fields.insert(0, Field::new("Nombre", name));
    }
    fields
}

/// `N:Solis;Ana;;;` -> `Ana Solis`.
fn name_from_components(raw: &str) -> String {
    let parts = split_unescaped(raw, ';');
    let family = parts.first().map(String::as_str).unwrap_or_default();
    let given = parts.get(1).map(String::as_str).unwrap_or_default();
    format!("{given} {family}").trim().to_owned()
}

fn join_components(raw: &str) -> String {
    split_unescaped(raw, ';')
        .iter()
        .map(|part| part.trim())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn unescape(raw: &str) -> String {
    split_unescaped(raw, '\0').concat().trim().to_owned()
}

/// Split on `separator` while honoring backslash escapes, which are removed.
///
/// `\n` and `\N` turn into line breaks, any other escaped character is kept literally.
fn split_unescaped(raw: &str, separator: char) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut chars = raw.chars();

    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some('n' | 'N') => current.push('\n'),
                Some(escaped) => current.push(escaped),
                None => current.push('\\'),
            },
            c if c == separator => parts.push(std::mem::take(&mut current)),
            c => current.push(c),
        }
    }
    parts.push(current);
    parts
}

// ============================================================================
// WiFi
// ============================================================================

/// `WIFI:T:WPA;S:Net;P:pass;H:true;;`
pub fn parse_wifi(content: &str) -> Vec<Field> {
    let Some(body) = strip_prefix_ignore_case(content.trim(), "WIFI:") else {
        return Vec::new();
    };

    let mut fields = Vec::new();
    for part in split_wifi_fields(body) {
        let Some((key, value)) = part.split_once(':') else {
            continue;
        };
        if value.is_empty() {
            continue;
        }
        let field = match key.to_ascii_uppercase().as_str() {
            "T" => Field::new("Tipo", value),
            "S" => Field::new("Nombre de red", value),
            "P" => Field::new("Contraseña", value),
            "H" => Field::new(
                "Red oculta",
                if value.eq_ignore_ascii_case("true") { "Sí" } else { "No" },
            ),
            _ => continue,
        };
        fields.push(field);
    }
    fields
}

/// Split a WiFi body on unescaped `;`, dropping the escapes.
///
/// Unlike [`split_unescaped`], `\n` is not a line break here.
fn split_wifi_fields(body: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut chars = body.chars();

    while let Some(c) = chars.next() {
        match c {
            '\\' => current.push(chars.next().unwrap_or('\\')),
            ';' => parts.push(std::mem::take(&mut current)),
            c => current.push(c),
        }
    }
    parts.push(current);
    parts
}

// ============================================================================
// Email
// ============================================================================

/// `mailto:to@example.com?subject=Hi&body=Hello&cc=..&bcc=..`
pub fn parse_email(content: &str) -> Vec<Field> {
    let Some(rest) = strip_prefix_ignore_case(content.trim(), "mailto:") else {
        return Vec::new();
    };
    let (recipient, query) = rest.split_once('?').unwrap_or((rest, ""));

    let mut fields = Vec::new();
    let recipient = percent_decode(recipient);
    if !recipient.is_empty() {
        fields.push(Field::new("Para", recipient));
    }

    for (key, value) in query_pairs(query) {
        let label = match key.to_ascii_lowercase().as_str() {
            "subject" => "Asunto",
            "body" => "Mensaje",
            "cc" => "CC",
            "bcc" => "BCC",
            _ => continue,
        };
        if !value.is_empty() {
            fields.push(Field::new(label, value));
        }
    }
    fields
}

/// `key=value` pairs of a query string; values are percent-decoded, pairs without `=` are skipped.
fn query_pairs(query: &str) -> impl Iterator<Item = (&str, String)> {
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .map(|(key, value)| (key, percent_decode(value)))
}

fn percent_decode(value: &str) -> String {
    urlencoding::decode(value)
        .map(|decoded| decoded.into_owned())
        .unwrap_or_else(|_| value.to_owned())
}

// ============================================================================
// SMS
// ============================================================================

/// `sms:555?body=Hi` or `SMSTO:555:Hi`
///
/// In the `SMSTO:` form everything after the first `:` is the message, so it
/// may itself contain `?` or `:`.
pub fn parse_sms(content: &str) -> Vec<Field> {
    let content = content.trim();
    let (number, message) = if let Some(rest) = strip_prefix_ignore_case(content, "smsto:") {
        match rest.split_once(':') {
            Some((number, message)) if !number.contains('?') => {
                (number, Some(message.to_owned()))
            }
            _ => number_and_body(rest),
        }
    } else if let Some(rest) = strip_prefix_ignore_case(content, "sms:") {
        if rest.contains('?') {
            number_and_body(rest)
        } else {
            match rest.split_once(':') {
                Some((number, message)) => (number, Some(message.to_owned())),
                None => (rest, None),
            }
        }
    } else {
        return Vec::new();
    };

    let mut fields = Vec::new();
    let number = percent_decode(number.trim());
    if !number.is_empty() {
        fields.push(Field::new("Número", number));
    }
    if let Some(message) = message.filter(|m| !m.is_empty()) {
        fields.push(Field::new("Mensaje", message));
    }
    fields
}

/// `555?body=Hi` -> number and decoded `body` parameter.
fn number_and_body(rest: &str) -> (&str, Option<String>) {
    match rest.split_once('?') {
        Some((number, query)) => {
            let body = query_pairs(query)
                .find(|(key, _)| key.eq_ignore_ascii_case("body"))
                .map(|(_, value)| value);
            (number, body)
        }
        None => (rest, None),
    }
}

// ============================================================================
// Location
// ============================================================================

/// `geo:lat,lon[,alt][;params][?q=..]` or a `maps.google.com` link.
pub fn parse_location(content: &str) -> Vec<Field> {
    let content = content.trim();
    if let Some(rest) = strip_prefix_ignore_case(content, "geo:") {
        let coordinates = rest.split(['?', ';']).next().unwrap_or_default();
        let parts: Vec<&str> = coordinates.split(',').map(str::trim).collect();
        return match parts.as_slice() {
            [latitude, longitude, ..] if !latitude.is_empty() && !longitude.is_empty() => vec![
                Field::new("Latitud", *latitude),
                Field::new("Longitud", *longitude),
            ],
            _ => Vec::new(),
        };
    }
    if content.contains("maps.google.com") {
        return vec![Field::new("URL", content)];
    }
    Vec::new()
}

// ============================================================================
// Phone / JSON formatting
// ============================================================================

/// Group a Mexican phone number for display.
///
/// `+52` followed by ten digits becomes `+52 XXX XXX XXXX`, ten bare digits
/// become `XXX XXX XXXX`; anything else is returned with only digits and `+` kept.
pub fn format_phone_number(phone: &str) -> String {
    let phone = phone.trim();
    let phone = strip_prefix_ignore_case(phone, "tel:")
        .or_else(|| strip_prefix_ignore_case(phone, "phone:"))
        .unwrap_or(phone);

    let cleaned: String = phone
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '+')
        .collect();

    match cleaned.strip_prefix("+52") {
        Some(national) if national.len() == 10 && national.chars().all(|c| c.is_ascii_digit()) => {
            format!(
                "+52 {} {} {}",
                &national[..3],
                &national[3..6],
                &national[6..]
            )
        }
        _ if cleaned.len() == 10 && cleaned.chars().all(|c| c.is_ascii_digit()) => {
            format!("{} {} {}", &cleaned[..3], &cleaned[3..6], &cleaned[6..])
        }
        _ => cleaned,
    }
}

/// Pretty-print JSON, or return the input unchanged when it does not parse.
pub fn pretty_json(content: &str) -> String {
    serde_json::from_str::<serde_json::Value>(content)
        .ok()
        .and_then(|value| serde_json::to_string_pretty(&value).ok())
        .unwrap_or_else(|| content.to_owned())
}
