//! Gemini `generateContent` adapter: prompt in, [`QrContentSpec`] out.

use serde::{Deserialize, Serialize};

use crate::config::BusinessConfig;
use crate::error::GenerateError;
use crate::http::Client;
use crate::qr_spec::QrContentSpec;

const TEMPERATURE: f32 = 0.2;

const INSTRUCTIONS: &str = r##"Eres un asistente que convierte la descripción de un código QR en una especificación JSON.
Responde únicamente con un objeto JSON, sin texto adicional, con esta forma:

{
  "contenido": { "tipo": "<tipo>", "data": <objeto o texto> },
  "nivel_de_correccion": "L" | "M" | "Q" | "H",
  "colores": {
    "fondo": "#RRGGBB",
    "principal": { "tipo": "solido" | "gradiente", "valores": ["#RRGGBB", ...] }
  },
  "estilo": "cuadrados" | "redondeado" | "puntos"
}

Valores de "tipo" y campos de "data":
- texto_plano: "data" es el texto.
- vcard: nombre, apellido, telefono, email, organizacion, puesto, web.
- wifi: ssid, password, tipo_seguridad (WPA, WEP o nopass).
- geolocalizacion: latitud, longitud (números).
- evento_calendario: titulo, ubicacion, descripcion, inicio, fin (ISO 8601).
- json: "data" es el objeto a codificar.
- markdown: "data" es el texto en Markdown.
- codigo: lenguaje, codigo_fuente.
- email: destinatario, asunto, cuerpo.
- sms: numero, mensaje.

Si el usuario no indica algo, usa: nivel_de_correccion "Q", fondo "#FFFFFF",
principal { "tipo": "solido", "valores": ["#000000"] }, estilo "cuadrados".
Para un gradiente incluye al menos dos colores. Mantén buen contraste entre el
fondo y el color principal.

Ejemplo. Solicitud: "QR para mi wifi Casa con clave hola123, en azul con puntos".
Respuesta:
{"contenido":{"tipo":"wifi","data":{"ssid":"Casa","password":"hola123","tipo_seguridad":"WPA"}},"nivel_de_correccion":"Q","colores":{"fondo":"#FFFFFF","principal":{"tipo":"solido","valores":["#1E3A8A"]}},"estilo":"puntos"}

Ejemplo. Solicitud: "tarjeta de contacto de Ana Solis, 5551234567, degradado morado a rosa".
Respuesta:
{"contenido":{"tipo":"vcard","data":{"nombre":"Ana","apellido":"Solis","telefono":"5551234567"}},"nivel_de_correccion":"M","colores":{"fondo":"#FFFFFF","principal":{"tipo":"gradiente","valores":["#7C3AED","#DB2777"]}},"estilo":"redondeado"}
"##;

/// The full prompt sent to the model for `user_request`.
pub fn build_prompt(user_request: &str) -> String {
    format!("{INSTRUCTIONS}\nSolicitud del usuario:\n{}\n", user_request.trim())
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: [RequestContent<'a>; 1],
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    parts: [RequestPart<'a>; 1],
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
    temperature: f32,
}

#[derive(Debug, Default, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Default, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Default, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Default, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    #[serde(default)]
    message: String,
}

/// Ask the model for a specification matching `user_request`.
pub async fn request_qr_spec(
    config: &BusinessConfig,
    user_request: &str,
) -> Result<QrContentSpec, GenerateError> {
    let key = config.api_key().ok_or(GenerateError::MissingApiKey)?;
    let prompt = build_prompt(user_request);
    let body = GenerateRequest {
        contents: [RequestContent {
            parts: [RequestPart { text: &prompt }],
        }],
        generation_config: GenerationConfig {
            response_mime_type: "application/json",
            temperature: TEMPERATURE,
        },
    };

    let response = Client::post(config.generate_url())
        .header("x-goog-api-key", key)
        .json(&body)
        .map_err(GenerateError::Request)?
        .send()
        .await?;

    if !response.is_success() {
        let message = response
            .json::<ApiErrorBody>()
            .map(|body| body.error.message)
            .ok()
            .filter(|message| !message.is_empty())
            .unwrap_or_else(|| response.text());
        log::warn!("Gemini request failed with {}: {message}", response.status);
        return Err(GenerateError::Api {
            status: response.status,
            message,
        });
    }

    let parsed: GenerateResponse = response.json().unwrap_or_else(|err| {
        log::warn!("Unreadable Gemini response body: {err}");
        GenerateResponse::default()
    });
    parse_spec(&response_text(parsed))
}

/// Concatenated text parts of the first candidate.
fn response_text(response: GenerateResponse) -> String {
    response
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect::<String>()
        })
        .unwrap_or_default()
}

/// Turn raw model text into a specification.
pub fn parse_spec(text: &str) -> Result<QrContentSpec, GenerateError> {
    if text.trim().is_empty() {
        return Err(GenerateError::EmptyResponse);
    }
    let json = extract_json(text).ok_or(GenerateError::NoJsonObject)?;
    log::debug!("Model JSON: {json}");
    serde_json::from_str(json).map_err(GenerateError::InvalidSpec)
}

/// The substring from the first `{` to the last `}`, inclusive.
pub fn extract_json(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}
