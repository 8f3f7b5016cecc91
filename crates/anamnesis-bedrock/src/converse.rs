//! [`ModelGateway`] backed by the Bedrock Converse API.
//!
//! Converse has no JSON response mode, so the single-object requirement is
//! added to the system prompt and the reply text is decoded here. Converse
//! also requires user and assistant turns to alternate; adjacent messages with
//! the same role are merged into one turn before sending.

use aws_sdk_bedrockruntime::Client;
use aws_sdk_bedrockruntime::types::{
    ContentBlock, ConversationRole, ImageBlock, ImageFormat, ImageSource, InferenceConfiguration,
    Message as ConverseMessage, SystemContentBlock,
};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use tracing::{debug, info};

use anamnesis_core::models::image::ImageEncoding;
use anamnesis_core::models::message::{ContentPart, Message, MessageContent, Role};

use crate::error::GatewayError;
use crate::gateway::{BoxFuture, ModelGateway, ModelRequest};

const JSON_DIRECTIVE: &str = "\
Respond with exactly one JSON object and nothing else: no prose before or after it \
and no Markdown code fences.";

/// A conversation turn after system messages are split off and adjacent
/// same-role messages are merged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub role: Role,
    pub parts: Vec<ContentPart>,
}

pub struct BedrockGateway {
    client: Client,
    model_id: String,
    max_tokens: Option<i32>,
}

impl BedrockGateway {
    pub fn new(client: Client, model_id: impl Into<String>) -> Self {
        Self {
            client,
            model_id: model_id.into(),
            max_tokens: None,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: i32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    async fn converse_json(&self, request: ModelRequest) -> Result<serde_json::Value, GatewayError> {
        let system = system_blocks(&request.messages, request.json_output);
        let turns = merge_turns(&request.messages);
        let messages = turns
            .iter()
            .map(to_converse_message)
            .collect::<Result<Vec<_>, _>>()?;

        info!(
            model_id = %self.model_id,
            turns = messages.len(),
            json_output = request.json_output,
            "invoking model"
        );

        let mut call = self
            .client
            .converse()
            .model_id(&self.model_id)
            .set_system(Some(system))
            .set_messages(Some(messages));

        if let Some(max_tokens) = self.max_tokens {
            call = call.inference_config(InferenceConfiguration::builder().max_tokens(max_tokens).build());
        }

        let response = call.send().await.map_err(|e| {
            let status = e.raw_response().map(|r| r.status().as_u16());
            GatewayError::Provider {
                status,
                message: e.into_service_error().to_string(),
            }
        })?;

        if let Some(usage) = response.usage() {
            info!(
                model_id = %self.model_id,
                input_tokens = usage.input_tokens,
                output_tokens = usage.output_tokens,
                "model call complete"
            );
        }

        let output_message = response
            .output()
            .and_then(|o| o.as_message().ok())
            .ok_or(GatewayError::EmptyContent)?;

        let response_text = output_message
            .content()
            .iter()
            .filter_map(|block| {
                if let ContentBlock::Text(text) = block {
                    Some(text.as_str())
                } else {
                    None
                }
            })
            .collect::<Vec<_>>()
            .join("");

        decode_json_text(&response_text)
    }
}

impl ModelGateway for BedrockGateway {
    fn complete(
        &self,
        request: ModelRequest,
    ) -> BoxFuture<'_, Result<serde_json::Value, GatewayError>> {
        Box::pin(self.converse_json(request))
    }
}

/// Decode reply text into a JSON value.
///
/// Blank text is [`GatewayError::EmptyContent`]. A single surrounding
/// Markdown code fence is tolerated; anything else that fails to parse is a
/// [`GatewayError::Decode`] carrying the raw text.
pub fn decode_json_text(text: &str) -> Result<serde_json::Value, GatewayError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(GatewayError::EmptyContent);
    }
    serde_json::from_str(strip_code_fence(trimmed)).map_err(|e| {
        debug!(error = %e, "model output failed to decode");
        GatewayError::Decode {
            message: e.to_string(),
            raw: text.to_string(),
        }
    })
}

/// Strip one surrounding ```` ``` ```` / ```` ```json ```` fence, if present.
pub fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let Some(body) = rest.strip_suffix("```") else {
        return text;
    };
    // Drop the info string ("json") on the opening line.
    match body.split_once('\n') {
        Some((info, inner)) if !info.contains('{') => inner.trim(),
        _ => body.trim(),
    }
}

/// Split non-system messages into alternating turns.
pub fn merge_turns(messages: &[Message]) -> Vec<Turn> {
    let mut turns: Vec<Turn> = Vec::new();
    for message in messages.iter().filter(|m| !m.is_system()) {
        let parts = match &message.content {
            MessageContent::Text(text) => vec![ContentPart::Text { text: text.clone() }],
            MessageContent::Parts(parts) => parts.clone(),
        };
        match turns.last_mut() {
            Some(last) if last.role == message.role => last.parts.extend(parts),
            _ => turns.push(Turn {
                role: message.role,
                parts,
            }),
        }
    }
    turns
}

fn system_blocks(messages: &[Message], json_output: bool) -> Vec<SystemContentBlock> {
    let mut blocks: Vec<SystemContentBlock> = messages
        .iter()
        .filter(|m| m.is_system())
        .map(|m| SystemContentBlock::Text(m.text()))
        .collect();
    if json_output {
        blocks.push(SystemContentBlock::Text(JSON_DIRECTIVE.to_string()));
    }
    blocks
}

fn to_converse_message(turn: &Turn) -> Result<ConverseMessage, GatewayError> {
    let role = match turn.role {
        Role::Assistant => ConversationRole::Assistant,
        // System messages never reach this point.
        Role::User | Role::System => ConversationRole::User,
    };

    let mut builder = ConverseMessage::builder().role(role);
    for part in &turn.parts {
        builder = builder.content(to_content_block(part)?);
    }
    builder
        .build()
        .map_err(|e| GatewayError::provider(e.to_string()))
}

fn to_content_block(part: &ContentPart) -> Result<ContentBlock, GatewayError> {
    match part {
        ContentPart::Text { text } => Ok(ContentBlock::Text(text.clone())),
        ContentPart::Image { image, encoding } => {
            let bytes = STANDARD
                .decode(image)
                .map_err(|e| GatewayError::provider(format!("invalid image payload: {e}")))?;
            let block = ImageBlock::builder()
                .format(image_format(*encoding))
                .source(ImageSource::Bytes(aws_smithy_types::Blob::new(bytes)))
                .build()
                .map_err(|e| GatewayError::provider(e.to_string()))?;
            Ok(ContentBlock::Image(block))
        }
    }
}

fn image_format(encoding: ImageEncoding) -> ImageFormat {
    match encoding {
        ImageEncoding::Png => ImageFormat::Png,
        ImageEncoding::Jpeg => ImageFormat::Jpeg,
        ImageEncoding::Gif => ImageFormat::Gif,
        ImageEncoding::Webp => ImageFormat::Webp,
    }
}
