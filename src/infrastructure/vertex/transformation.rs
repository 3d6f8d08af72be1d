//! Conversion of chat messages into cached-content request bodies

use serde::Serialize;

use crate::domain::context_cache::{CacheScope, CachedContentRequest, ProviderKind};
use crate::domain::llm::{ContentPart, Message, MessageContent, MessageRole};
use crate::domain::DomainError;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateCachedContentBody {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<SystemInstruction>,
    model: String,
    display_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    ttl: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    role: &'static str,
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize)]
struct SystemInstruction {
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
enum GeminiPart {
    InlineData(InlineData),
    FileData(FileData),
    #[serde(untagged)]
    Text { text: String },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FileData {
    #[serde(skip_serializing_if = "Option::is_none")]
    mime_type: Option<String>,
    file_uri: String,
}

/// Fully qualified model resource for the scope
pub fn model_resource(model: &str, scope: &CacheScope) -> String {
    match (scope.provider, scope.namespace()) {
        (ProviderKind::Gemini, _) | (_, None) => format!("models/{}", model),
        (_, Some((project, location))) => format!(
            "projects/{}/locations/{}/publishers/google/models/{}",
            project, location, model
        ),
    }
}

/// Builds the JSON body for a create call.
///
/// System messages are folded into `systemInstruction`; the remaining
/// messages become `contents`, with consecutive same-role turns merged.
pub fn build_create_body(
    request: &CachedContentRequest,
    scope: &CacheScope,
) -> Result<serde_json::Value, DomainError> {
    let mut system_parts = Vec::new();
    let mut contents: Vec<GeminiContent> = Vec::new();

    for message in &request.contents {
        let parts = convert_parts(message);
        if parts.is_empty() {
            continue;
        }

        let role = match message.role {
            MessageRole::System => {
                system_parts.extend(parts);
                continue;
            }
            MessageRole::User | MessageRole::Tool => "user",
            MessageRole::Assistant => "model",
        };

        match contents.last_mut() {
            Some(last) if last.role == role => last.parts.extend(parts),
            _ => contents.push(GeminiContent { role, parts }),
        }
    }

    if contents.is_empty() && system_parts.is_empty() {
        return Err(DomainError::validation(
            "Cached content must contain at least one non-empty message",
        ));
    }

    let body = CreateCachedContentBody {
        contents,
        system_instruction: (!system_parts.is_empty()).then(|| SystemInstruction {
            parts: system_parts,
        }),
        model: model_resource(&request.model, scope),
        display_name: request.display_name.clone(),
        ttl: request.ttl.clone(),
        tools: request.tools.clone(),
    };

    serde_json::to_value(&body).map_err(|e| {
        DomainError::serialization(format!("Failed to serialize cached content request: {}", e))
    })
}

fn convert_parts(message: &Message) -> Vec<GeminiPart> {
    match &message.content {
        MessageContent::Text(text) if text.is_empty() => vec![],
        MessageContent::Text(text) => vec![GeminiPart::Text { text: text.clone() }],
        MessageContent::Parts(parts) => parts.iter().filter_map(convert_part).collect(),
        MessageContent::Empty => vec![],
    }
}

fn convert_part(part: &ContentPart) -> Option<GeminiPart> {
    let converted = match part {
        ContentPart::Text { text, .. } => GeminiPart::Text { text: text.clone() },
        ContentPart::ImageUrl { image_url, .. } => match parse_data_url(&image_url.url) {
            Some((mime_type, data)) => GeminiPart::InlineData(InlineData {
                mime_type: mime_type.to_string(),
                data: data.to_string(),
            }),
            None => GeminiPart::FileData(FileData {
                mime_type: guess_media_type(&image_url.url).map(str::to_string),
                file_uri: image_url.url.clone(),
            }),
        },
        ContentPart::Other(raw) => match raw.get("text").and_then(|t| t.as_str()) {
            Some(text) => GeminiPart::Text {
                text: text.to_string(),
            },
            None => {
                tracing::debug!(
                    part_type = raw.get("type").and_then(|t| t.as_str()).unwrap_or("unknown"),
                    "Skipping content part with no cached-content equivalent"
                );
                return None;
            }
        },
    };

    Some(converted)
}

/// Splits `data:<mime>;base64,<payload>`
fn parse_data_url(url: &str) -> Option<(&str, &str)> {
    let rest = url.strip_prefix("data:")?;
    let (meta, data) = rest.split_once(',')?;
    let mime_type = meta.strip_suffix(";base64")?;
    Some((mime_type, data))
}

/// Media type guessed from the URL's file extension, limited to media Gemini accepts
fn guess_media_type(url: &str) -> Option<&'static str> {
    let path = url.split(['?', '#']).next().unwrap_or(url);

    mime_guess::from_path(path).first_raw().filter(|mime| {
        ["image/", "audio/", "video/", "text/"]
            .iter()
            .any(|prefix| mime.starts_with(prefix))
            || *mime == "application/pdf"
    })
}
