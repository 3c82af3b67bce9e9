//! Structured description of a QR code as produced by the generative model.
//!
//! Wire keys are Spanish because they are the contract with the prompt:
//!
//! ```json
//! {
//!   "contenido": { "tipo": "wifi", "data": { "ssid": "Net", "password": "pass" } },
//!   "nivel_de_correccion": "Q",
//!   "colores": { "fondo": "#FFFFFF", "principal": { "tipo": "solido", "valores": ["#000000"] } },
//!   "estilo": "cuadrados"
//! }
//! ```
//!
//! Every field except `contenido` is optional. Unknown enum values fall back to
//! their defaults instead of failing the whole response.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const DEFAULT_BACKGROUND: &str = "#FFFFFF";
pub const DEFAULT_FILL: &str = "#000000";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QrContentSpec {
    #[serde(rename = "contenido")]
    pub content: QrContent,
    #[serde(rename = "nivel_de_correccion", default)]
    pub error_correction: ErrorCorrection,
    #[serde(rename = "colores", default)]
    pub colors: Colors,
    #[serde(rename = "estilo", default)]
    pub style: ModuleStyle,
}

impl QrContentSpec {
    /// Plain text content with default styling.
    pub fn plain_text(text: impl Into<String>) -> Self {
        Self::with_defaults(QrContent {
            kind: PayloadKind::PlainText,
            data: Value::String(text.into()),
        })
    }

    pub fn with_defaults(content: QrContent) -> Self {
        Self {
            content,
            error_correction: ErrorCorrection::default(),
            colors: Colors::default(),
            style: ModuleStyle::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QrContent {
    #[serde(rename = "tipo")]
    pub kind: PayloadKind,
    #[serde(default)]
    pub data: Value,
}

/// What the payload encodes.
///
/// Tags outside the known set are kept verbatim in [`PayloadKind::Unknown`]
/// and serialized as raw text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PayloadKind {
    PlainText,
    VCard,
    Wifi,
    Geo,
    CalendarEvent,
    Json,
    Markdown,
    Code,
    Email,
    Sms,
    Unknown(String),
}

impl PayloadKind {
    pub fn tag(&self) -> &str {
        match self {
            Self::PlainText => "texto_plano",
            Self::VCard => "vcard",
            Self::Wifi => "wifi",
            Self::Geo => "geolocalizacion",
            Self::CalendarEvent => "evento_calendario",
            Self::Json => "json",
            Self::Markdown => "markdown",
            Self::Code => "codigo",
            Self::Email => "email",
            Self::Sms => "sms",
            Self::Unknown(tag) => tag,
        }
    }
}

impl From<String> for PayloadKind {
    fn from(tag: String) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "texto_plano" => Self::PlainText,
            "vcard" => Self::VCard,
            "wifi" => Self::Wifi,
            "geolocalizacion" => Self::Geo,
            "evento_calendario" => Self::CalendarEvent,
            "json" => Self::Json,
            "markdown" => Self::Markdown,
            "codigo" => Self::Code,
            "email" => Self::Email,
            "sms" => Self::Sms,
            _ => Self::Unknown(tag),
        }
    }
}

impl From<PayloadKind> for String {
    fn from(kind: PayloadKind) -> Self {
        match kind {
            PayloadKind::Unknown(tag) => tag,
            known => known.tag().to_owned(),
        }
    }
}

impl fmt::Display for PayloadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// QR error-correction level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ErrorCorrection {
    L,
    M,
    #[default]
    Q,
    H,
}

impl From<String> for ErrorCorrection {
    fn from(level: String) -> Self {
        match level.trim().to_ascii_uppercase().as_str() {
            "L" | "LOW" | "BAJO" => Self::L,
            "M" | "MEDIUM" | "MEDIO" => Self::M,
            "Q" | "QUARTILE" => Self::Q,
            "H" | "HIGH" | "ALTO" => Self::H,
            other => {
                log::warn!("Unknown error correction level {other:?}, using Q");
                Self::Q
            }
        }
    }
}

impl From<ErrorCorrection> for String {
    fn from(level: ErrorCorrection) -> Self {
        level.to_string()
    }
}

impl fmt::Display for ErrorCorrection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::L => "L",
            Self::M => "M",
            Self::Q => "Q",
            Self::H => "H",
        })
    }
}

impl From<ErrorCorrection> for qrcode::EcLevel {
    fn from(level: ErrorCorrection) -> Self {
        match level {
            ErrorCorrection::L => Self::L,
            ErrorCorrection::M => Self::M,
            ErrorCorrection::Q => Self::Q,
            ErrorCorrection::H => Self::H,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Colors {
    #[serde(rename = "fondo", default = "default_background")]
    pub background: String,
    #[serde(rename = "principal", default)]
    pub fill: Fill,
}

impl Default for Colors {
    fn default() -> Self {
        Self {
            background: default_background(),
            fill: Fill::default(),
        }
    }
}

fn default_background() -> String {
    DEFAULT_BACKGROUND.to_owned()
}

/// Foreground paint of the dark modules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fill {
    #[serde(rename = "tipo", default)]
    pub kind: FillKind,
    #[serde(rename = "valores", default = "default_fill_values")]
    pub values: Vec<String>,
}

impl Default for Fill {
    fn default() -> Self {
        Self {
            kind: FillKind::default(),
            values: default_fill_values(),
        }
    }
}

impl Fill {
    /// First listed color, or black when the list is empty.
    pub fn primary(&self) -> &str {
        self.values.first().map_or(DEFAULT_FILL, String::as_str)
    }
}

fn default_fill_values() -> Vec<String> {
    vec![DEFAULT_FILL.to_owned()]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FillKind {
    #[default]
    Solid,
    Gradient,
}

impl From<String> for FillKind {
    fn from(kind: String) -> Self {
        match kind.trim().to_ascii_lowercase().as_str() {
            "gradiente" | "gradient" => Self::Gradient,
            _ => Self::Solid,
        }
    }
}

impl From<FillKind> for String {
    fn from(kind: FillKind) -> Self {
        match kind {
            FillKind::Solid => "solido",
            FillKind::Gradient => "gradiente",
        }
        .to_owned()
    }
}

/// Shape of each dark module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ModuleStyle {
    #[default]
    Square,
    Rounded,
    Dots,
}

impl From<String> for ModuleStyle {
    fn from(style: String) -> Self {
        match style.trim().to_ascii_lowercase().as_str() {
            "redondeado" | "redondeados" | "rounded" => Self::Rounded,
            "puntos" | "punto" | "dots" => Self::Dots,
            _ => Self::Square,
        }
    }
}

impl From<ModuleStyle> for String {
    fn from(style: ModuleStyle) -> Self {
        style.to_string()
    }
}

impl fmt::Display for ModuleStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Square => "cuadrados",
            Self::Rounded => "redondeado",
            Self::Dots => "puntos",
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn minimal_response_takes_defaults() {
        let spec: QrContentSpec =
            serde_json::from_value(json!({"contenido": {"tipo": "texto_plano", "data": "hola"}}))
                .unwrap();

        assert_eq!(spec.content.kind, PayloadKind::PlainText);
        assert_eq!(spec.error_correction, ErrorCorrection::Q);
        assert_eq!(spec.colors.background, "#FFFFFF");
        assert_eq!(spec.colors.fill.kind, FillKind::Solid);
        assert_eq!(spec.colors.fill.values, vec!["#000000"]);
        assert_eq!(spec.style, ModuleStyle::Square);
    }

    #[test]
    fn full_response_is_read() {
        let spec: QrContentSpec = serde_json::from_value(json!({
            "contenido": {"tipo": "wifi", "data": {"ssid": "Net"}},
            "nivel_de_correccion": "H",
            "colores": {
                "fondo": "#101010",
                "principal": {"tipo": "gradiente", "valores": ["#FF0000", "#0000FF"]}
            },
            "estilo": "puntos"
        }))
        .unwrap();

        assert_eq!(spec.content.kind, PayloadKind::Wifi);
        assert_eq!(spec.error_correction, ErrorCorrection::H);
        assert_eq!(spec.colors.fill.kind, FillKind::Gradient);
        assert_eq!(spec.colors.fill.primary(), "#FF0000");
        assert_eq!(spec.style, ModuleStyle::Dots);
    }

    #[test]
    fn unknown_values_degrade() {
        let spec: QrContentSpec = serde_json::from_value(json!({
            "contenido": {"tipo": "holograma", "data": "x"},
            "nivel_de_correccion": "maximo",
            "estilo": "estrellas"
        }))
        .unwrap();

        assert_eq!(spec.content.kind, PayloadKind::Unknown("holograma".to_owned()));
        assert_eq!(spec.error_correction, ErrorCorrection::Q);
        assert_eq!(spec.style, ModuleStyle::Square);
    }

    #[test]
    fn serializes_with_wire_names() {
        let value = serde_json::to_value(QrContentSpec::plain_text("hola")).unwrap();
        assert_eq!(value["contenido"]["tipo"], "texto_plano");
        assert_eq!(value["nivel_de_correccion"], "Q");
        assert_eq!(value["colores"]["principal"]["tipo"], "solido");
        assert_eq!(value["estilo"], "cuadrados");
    }

    #[test]
    fn empty_fill_list_reads_as_black() {
        let fill = Fill {
            kind: FillKind::Solid,
            values: Vec::new(),
        };
        assert_eq!(fill.primary(), "#000000");
    }
}
