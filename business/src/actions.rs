//! Contextual actions offered for scanned content.

use serde::Serialize;

use crate::content_type::{ContentType, starts_with_ignore_case, strip_prefix_ignore_case};
use crate::fields::{format_phone_number, parse_location};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Copy,
    Open,
    SendEmail,
    Call,
    SendSms,
    ViewMap,
}

impl ActionKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Copy => "Copiar",
            Self::Open => "Abrir",
            Self::SendEmail | Self::SendSms => "Enviar",
            Self::Call => "Llamar",
            Self::ViewMap => "Ver mapa",
        }
    }
}

/// An action together with what it acts on.
///
/// For [`ActionKind::Copy`] the target is the text to copy, for every other
/// kind it is a URI a desktop opener can handle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContentAction {
    pub kind: ActionKind,
    pub target: String,
}

impl ContentAction {
    fn new(kind: ActionKind, target: impl Into<String>) -> Self {
        Self {
            kind,
            target: target.into(),
        }
    }

    pub fn label(&self) -> &'static str {
        self.kind.label()
    }
}

/// Actions for `content`: the type-specific one first, then copy.
pub fn actions_for(content: &str, content_type: ContentType) -> Vec<ContentAction> {
    let content = content.trim();
    let primary = match content_type {
        ContentType::Url => Some(ContentAction::new(ActionKind::Open, url_target(content))),
        ContentType::Email => Some(ContentAction::new(ActionKind::SendEmail, content)),
        ContentType::Phone => Some(ContentAction::new(
            ActionKind::Call,
            format!("tel:{}", format_phone_number(content).replace(' ', "")),
        )),
        ContentType::Sms => Some(ContentAction::new(ActionKind::SendSms, sms_target(content))),
        ContentType::Location => Some(ContentAction::new(ActionKind::ViewMap, map_target(content))),
        ContentType::Wifi
        | ContentType::Contact
        | ContentType::Json
        | ContentType::Markdown
        | ContentType::Code
        | ContentType::PlainText => None,
    };

    primary
        .into_iter()
        .chain(std::iter::once(ContentAction::new(ActionKind::Copy, content)))
        .collect()
}

fn url_target(content: &str) -> String {
    if starts_with_ignore_case(content, "http://") || starts_with_ignore_case(content, "https://") {
        content.to_owned()
    } else {
        format!("https://{content}")
    }
}

/// `SMSTO:number:message` is rewritten to the `sms:number?body=message` form openers understand.
fn sms_target(content: &str) -> String {
    let Some(rest) = strip_prefix_ignore_case(content, "smsto:") else {
        return content.to_owned();
    };
    match rest.split_once(':') {
        Some((number, message)) if !message.is_empty() => {
            format!("sms:{number}?body={}", urlencoding::encode(message))
        }
        Some((number, _)) => format!("sms:{number}"),
        None => format!("sms:{rest}"),
    }
}

/// `geo:` coordinates open in a web map; map links open as-is.
fn map_target(content: &str) -> String {
    let fields = parse_location(content);
    match (fields.first(), fields.get(1)) {
        (Some(latitude), Some(longitude)) if latitude.label == "Latitud" => format!(
            "https://www.google.com/maps/search/?api=1&query={},{}",
            latitude.value, longitude.value
        ),
        _ => url_target(content),
    }
}
