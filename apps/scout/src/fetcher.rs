use std::time::Duration;

use serde_json::Value;

use scout_domain::Endpoint;
use scout_service::{BoxFuture, EndpointFetcher, Error, FetchedPage, Result};

/// Fetches endpoint pages over HTTP.
pub struct HttpFetcher {
	client: reqwest::Client,
}
impl HttpFetcher {
	pub fn new(timeout: Duration) -> Result<Self> {
		let client = reqwest::Client::builder()
			.timeout(timeout)
			.build()
			.map_err(|err| Error::Fetch { message: err.to_string() })?;

		Ok(Self { client })
	}

	async fn get(&self, endpoint: &Endpoint) -> reqwest::Result<String> {
		self.client.get(endpoint.url().clone()).send().await?.error_for_status()?.text().await
	}
}

impl EndpointFetcher for HttpFetcher {
	fn fetch<'a>(&'a self, endpoint: &'a Endpoint) -> BoxFuture<'a, Result<FetchedPage>> {
		Box::pin(async move {
			let content = self
				.get(endpoint)
				.await
				.map_err(|err| Error::Fetch { message: format!("{endpoint}: {err}") })?;
			let title = page_title(endpoint, &content);

			tracing::debug!(%endpoint, title = %title, bytes = content.len(), "Fetched endpoint.");

			Ok(FetchedPage { title, content })
		})
	}
}

/// OpenAPI `info.title`, then HTML `<title>`, then the endpoint label.
pub fn page_title(endpoint: &Endpoint, content: &str) -> String {
	if let Ok(value) = serde_json::from_str::<Value>(content)
		&& let Some(title) = value.pointer("/info/title").and_then(Value::as_str)
		&& !title.trim().is_empty()
	{
		return title.trim().to_string();
	}
	if let Some(title) = html_title(content) {
		return title;
	}

	endpoint.label().to_string()
}

fn html_title(content: &str) -> Option<String> {
	let lowered = content.to_ascii_lowercase();
	let open = lowered.find("<title")?;
	let start = open + lowered[open..].find('>')? + 1;
	let end = start + lowered[start..].find("</title>")?;
	let title = content[start..end].split_whitespace().collect::<Vec<_>>().join(" ");

	(!title.is_empty()).then_some(title)
}
