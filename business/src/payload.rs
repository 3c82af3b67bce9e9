//! Serialization of a [`QrContent`] into the string encoded in the QR symbol.
//!
//! Serialization is total. Missing fields read as empty strings, kinds that
//! expect an object but receive a string use the string verbatim, and unknown
//! kinds fall back to raw text.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::{Map, Value};

use crate::qr_spec::{PayloadKind, QrContent};

pub fn encode_payload(content: &QrContent) -> String {
    let data = &content.data;
    let object = match (&content.kind, data) {
        (PayloadKind::PlainText | PayloadKind::Unknown(_), _) => return raw_text(data),
        (PayloadKind::Json, Value::String(text)) => return text.clone(),
        (PayloadKind::Json, _) => return data.to_string(),
        (PayloadKind::Markdown, _) => return raw_text(data),
        (_, Value::Object(object)) => object,
        (_, Value::String(text)) => return text.clone(),
        (_, other) => return raw_text(other),
    };

    match content.kind {
        PayloadKind::VCard => vcard(object),
        PayloadKind::Wifi => wifi(object),
        PayloadKind::Geo => format!(
            "geo:{},{}",
            field(object, "latitud"),
            field(object, "longitud")
        ),
        PayloadKind::CalendarEvent => calendar_event(object),
        PayloadKind::Email => email(object),
        PayloadKind::Sms => format!(
            "smsto:{}:{}",
            field(object, "numero"),
            field(object, "mensaje")
        ),
        PayloadKind::Code => {
            let source = field(object, "codigo_fuente");
            if is_blank(&source) {
                data.to_string()
            } else {
                source
            }
        }
        PayloadKind::PlainText
        | PayloadKind::Json
        | PayloadKind::Markdown
        | PayloadKind::Unknown(_) => raw_text(data),
    }
}

/// Text form of arbitrary data: strings verbatim, objects through a `texto` key or as JSON.
fn raw_text(data: &Value) -> String {
    match data {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        Value::Object(object) => ["texto", "contenido", "text"]
            .iter()
            .find_map(|key| object.get(*key).and_then(Value::as_str))
            .map_or_else(|| data.to_string(), str::to_owned),
        other => other.to_string(),
    }
}

/// Field as text, emitted exactly as given; numbers and booleans use their JSON form,
/// missing or null is empty.
fn field(object: &Map<String, Value>, key: &str) -> String {
    match object.get(key) {
        Some(Value::String(text)) => text.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

/// Whitespace-only values count as absent for optional properties.
fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

fn first_field(object: &Map<String, Value>, keys: &[&str]) -> String {
    keys.iter()
        .map(|key| field(object, key))
        .find(|value| !is_blank(value))
        .unwrap_or_default()
}

// ============================================================================
// vCard
// ============================================================================

fn vcard(object: &Map<String, Value>) -> String {
    let given = escape_vcard(&field(object, "nombre"));
    let family = escape_vcard(&field(object, "apellido"));

    let mut out = String::from("BEGIN:VCARD\nVERSION:3.0\n");
    out.push_str(&format!("N:{family};{given}\n"));
    out.push_str(&format!("FN:{}\n", format!("{given} {family}").trim()));

    let optional = [
        ("TEL;TYPE=CELL", field(object, "telefono")),
        ("EMAIL", field(object, "email")),
        ("ORG", escape_vcard(&field(object, "organizacion"))),
        ("TITLE", escape_vcard(&field(object, "puesto"))),
        ("URL", first_field(object, &["web", "url"])),
    ];
    for (property, value) in optional {
        if !is_blank(&value) {
            out.push_str(&format!("{property}:{value}\n"));
        }
    }

    out.push_str("END:VCARD");
    out
}

fn escape_vcard(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' | ';' | ',' => {
                out.push('\\');
                out.push(c);
            }
            '\n' => out.push_str("\\n"),
            c => out.push(c),
        }
    }
    out
}

// ============================================================================
// WiFi
// ============================================================================

fn wifi(object: &Map<String, Value>) -> String {
    let security = match field(object, "tipo_seguridad") {
        security if is_blank(&security) => "WPA".to_owned(),
        security => security,
    };
    format!(
        "WIFI:T:{security};S:{};P:{};;",
        escape_wifi(&field(object, "ssid")),
        escape_wifi(&field(object, "password"))
    )
}

/// Backslash-escape the characters reserved by the `WIFI:` format.
fn escape_wifi(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | ';' | ',' | ':' | '"') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

// ============================================================================
// Calendar event
// ============================================================================

fn calendar_event(object: &Map<String, Value>) -> String {
    let mut out = format!("BEGIN:VEVENT\nSUMMARY:{}\n", field(object, "titulo"));

    let optional = [
        ("LOCATION", field(object, "ubicacion")),
        ("DESCRIPTION", field(object, "descripcion")),
        ("DTSTART", ical_datetime(&first_field(object, &["inicio", "fecha_inicio"]))),
        ("DTEND", ical_datetime(&first_field(object, &["fin", "fecha_fin"]))),
    ];
    for (property, value) in optional {
        if !is_blank(&value) {
            out.push_str(&format!("{property}:{value}\n"));
        }
    }

    out.push_str("END:VEVENT");
    out
}

/// Convert ISO-8601 style timestamps to iCalendar form; anything unrecognized passes through.
fn ical_datetime(value: &str) -> String {
    let value = value.trim();
    if value.is_empty() {
        return String::new();
    }
    if let Ok(instant) = DateTime::parse_from_rfc3339(value) {
        return instant
            .with_timezone(&Utc)
            .format("%Y%m%dT%H%M%SZ")
            .to_string();
    }
    for pattern in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(local) = NaiveDateTime::parse_from_str(value, pattern) {
            return local.format("%Y%m%dT%H%M%S").to_string();
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return date.format("%Y%m%d").to_string();
    }
    value.to_owned()
}

// ============================================================================
// Email
// ============================================================================

fn email(object: &Map<String, Value>) -> String {
    let params: Vec<String> = [("subject", "asunto"), ("body", "cuerpo")]
        .into_iter()
        .filter_map(|(name, key)| {
            let value = field(object, key);
            (!is_blank(&value)).then(|| format!("{name}={}", urlencoding::encode(&value)))
        })
        .collect();

    let recipient = field(object, "destinatario");
    if params.is_empty() {
        format!("mailto:{recipient}")
    } else {
        format!("mailto:{recipient}?{}", params.join("&"))
    }
}
