use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{Error, Result};

#[derive(Debug, Deserialize)]
struct CompletionResponse {
	choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
	message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
	content: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
	System,
	User,
	Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
	pub role: Role,
	pub content: String,
}
impl ChatMessage {
	pub fn system(content: impl Into<String>) -> Self {
		Self { role: Role::System, content: content.into() }
	}

	pub fn user(content: impl Into<String>) -> Self {
		Self { role: Role::User, content: content.into() }
	}
}

pub async fn complete(
	cfg: &scout_config::LlmProviderConfig,
	messages: &[ChatMessage],
) -> Result<String> {
	let client = crate::http_client(cfg.timeout_ms)?;
	let url = crate::endpoint_url(&cfg.api_base, &cfg.path);
	let body = serde_json::json!({
		"model": cfg.model,
		"temperature": cfg.temperature,
		"messages": messages,
	});
	let res = client
		.post(url)
		.headers(crate::auth_headers(&cfg.api_key, &cfg.default_headers)?)
		.json(&body)
		.send()
		.await?;
	let response: CompletionResponse = res.error_for_status()?.json().await?;

	first_choice_content(response)
}

/// Pulls a JSON object out of model output, tolerating code fences and prose
/// around the object.
pub fn json_from_content(content: &str) -> Result<Value> {
	let trimmed = content.trim();

	if let Ok(value) = serde_json::from_str::<Value>(trimmed)
		&& value.is_object()
	{
		return Ok(value);
	}

	let (Some(start), Some(end)) = (trimmed.find('{'), trimmed.rfind('}')) else {
		return Err(Error::InvalidResponse {
			message: "Completion content does not contain a JSON object.".to_string(),
		});
	};

	if end < start {
		return Err(Error::InvalidResponse {
			message: "Completion content does not contain a JSON object.".to_string(),
		});
	}

	let value: Value = serde_json::from_str(&trimmed[start..=end]).map_err(|_| {
		Error::InvalidResponse { message: "Completion content is not valid JSON.".to_string() }
	})?;

	Ok(value)
}

fn first_choice_content(response: CompletionResponse) -> Result<String> {
	response
		.choices
		.into_iter()
		.next()
		.and_then(|choice| choice.message.content)
		.ok_or_else(|| Error::InvalidResponse {
			message: "Completion response is missing message content.".to_string(),
		})
}
