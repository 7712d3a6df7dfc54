use std::{
	collections::{HashMap, VecDeque},
	sync::{
		Mutex,
		atomic::{AtomicUsize, Ordering},
	},
	time::Duration,
};

use scout_config::{EmbeddingProviderConfig, LlmProviderConfig};
use scout_domain::Endpoint;
use scout_providers::ChatMessage;
use scout_service::{
	BoxFuture, CompletionProvider, EmbeddingProvider, EndpointFetcher, Error, FetchedPage, Result,
};

/// Maps text to vectors by case-insensitive substring rules. The first
/// matching rule wins; unmatched text gets the fallback vector.
pub struct TableEmbedding {
	rules: Vec<(String, Vec<f32>)>,
	fallback: Vec<f32>,
	fail_on: Vec<String>,
	delay: Option<Duration>,
	calls: AtomicUsize,
	in_flight: AtomicUsize,
	peak: AtomicUsize,
}
impl TableEmbedding {
	pub fn new(dimensions: usize) -> Self {
		Self {
			rules: Vec::new(),
			fallback: vec![0.0; dimensions],
			fail_on: Vec::new(),
			delay: None,
			calls: AtomicUsize::new(0),
			in_flight: AtomicUsize::new(0),
			peak: AtomicUsize::new(0),
		}
	}

	pub fn with_rule(mut self, needle: &str, vector: Vec<f32>) -> Self {
		self.rules.push((needle.to_lowercase(), vector));

		self
	}

	pub fn with_fallback(mut self, vector: Vec<f32>) -> Self {
		self.fallback = vector;

		self
	}

	/// Any request containing `needle` fails.
	pub fn fail_on(mut self, needle: &str) -> Self {
		self.fail_on.push(needle.to_lowercase());

		self
	}

	pub fn with_delay(mut self, delay: Duration) -> Self {
		self.delay = Some(delay);

		self
	}

	pub fn calls(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}

	/// Highest number of requests observed in flight at once.
	pub fn peak_in_flight(&self) -> usize {
		self.peak.load(Ordering::SeqCst)
	}

	pub fn vector_for(&self, text: &str) -> Vec<f32> {
		let text = text.to_lowercase();

		self.rules
			.iter()
			.find(|(needle, _)| text.contains(needle.as_str()))
			.map(|(_, vector)| vector.clone())
			.unwrap_or_else(|| self.fallback.clone())
	}

	fn respond(&self, texts: &[String]) -> scout_providers::Result<Vec<Vec<f32>>> {
		for text in texts {
			let lowered = text.to_lowercase();

			if let Some(needle) = self.fail_on.iter().find(|needle| lowered.contains(needle.as_str()))
			{
				return Err(scout_providers::Error::InvalidResponse {
					message: format!("Stub embedding refused text containing {needle:?}."),
				});
			}
		}

		Ok(texts.iter().map(|text| self.vector_for(text)).collect())
	}
}

impl EmbeddingProvider for TableEmbedding {
	fn embed<'a>(
		&'a self,
		_cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, scout_providers::Result<Vec<Vec<f32>>>> {
		self.calls.fetch_add(1, Ordering::SeqCst);

		Box::pin(async move {
			let _guard = InFlight::enter(&self.in_flight, &self.peak);

			if let Some(delay) = self.delay {
				tokio::time::sleep(delay).await;
			}

			self.respond(texts)
		})
	}
}

/// Embedding provider that always fails.
#[derive(Default)]
pub struct FailingEmbedding {
	calls: AtomicUsize,
}
impl FailingEmbedding {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn calls(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}
}

impl EmbeddingProvider for FailingEmbedding {
	fn embed<'a>(
		&'a self,
		_cfg: &'a EmbeddingProviderConfig,
		_texts: &'a [String],
	) -> BoxFuture<'a, scout_providers::Result<Vec<Vec<f32>>>> {
		self.calls.fetch_add(1, Ordering::SeqCst);

		Box::pin(async move {
			Err(scout_providers::Error::InvalidResponse {
				message: "Stub embedding provider is unavailable.".to_string(),
			})
		})
	}
}

#[derive(Clone, Debug)]
enum Reply {
	Text(String),
	Fail(String),
}

/// Completion provider that answers from rules and a queue.
///
/// Rules match case-insensitively against the last message and take
/// precedence. Otherwise queued replies are served in order, then the
/// fallback. With nothing left the call fails.
#[derive(Default)]
pub struct ScriptedCompletion {
	rules: Vec<(String, Reply)>,
	queue: Mutex<VecDeque<Reply>>,
	fallback: Option<Reply>,
	delay: Option<Duration>,
	calls: AtomicUsize,
	transcripts: Mutex<Vec<Vec<ChatMessage>>>,
}
impl ScriptedCompletion {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn reply(self, text: &str) -> Self {
		self.push(Reply::Text(text.to_string()))
	}

	pub fn fail(self, message: &str) -> Self {
		self.push(Reply::Fail(message.to_string()))
	}

	pub fn rule(mut self, needle: &str, text: &str) -> Self {
		self.rules.push((needle.to_lowercase(), Reply::Text(text.to_string())));

		self
	}

	pub fn rule_fail(mut self, needle: &str, message: &str) -> Self {
		self.rules.push((needle.to_lowercase(), Reply::Fail(message.to_string())));

		self
	}

	pub fn fallback(mut self, text: &str) -> Self {
		self.fallback = Some(Reply::Text(text.to_string()));

		self
	}

	pub fn with_delay(mut self, delay: Duration) -> Self {
		self.delay = Some(delay);

		self
	}

	pub fn calls(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}

	/// Every request received so far, in arrival order.
	pub fn transcripts(&self) -> Vec<Vec<ChatMessage>> {
		self.transcripts.lock().unwrap_or_else(|err| err.into_inner()).clone()
	}

	fn push(self, reply: Reply) -> Self {
		self.queue.lock().unwrap_or_else(|err| err.into_inner()).push_back(reply);

		self
	}

	fn next_reply(&self, messages: &[ChatMessage]) -> Option<Reply> {
		let last = messages.last().map(|msg| msg.content.to_lowercase()).unwrap_or_default();

		if let Some((_, reply)) = self.rules.iter().find(|(needle, _)| last.contains(needle.as_str()))
		{
			return Some(reply.clone());
		}

		self.queue
			.lock()
			.unwrap_or_else(|err| err.into_inner())
			.pop_front()
			.or_else(|| self.fallback.clone())
	}
}

impl CompletionProvider for ScriptedCompletion {
	fn complete<'a>(
		&'a self,
		_cfg: &'a LlmProviderConfig,
		messages: &'a [ChatMessage],
	) -> BoxFuture<'a, scout_providers::Result<String>> {
		self.calls.fetch_add(1, Ordering::SeqCst);
		self.transcripts.lock().unwrap_or_else(|err| err.into_inner()).push(messages.to_vec());

		let reply = self.next_reply(messages);

		Box::pin(async move {
			if let Some(delay) = self.delay {
				tokio::time::sleep(delay).await;
			}

			match reply {
				Some(Reply::Text(text)) => Ok(text),
				Some(Reply::Fail(message)) => {
					Err(scout_providers::Error::InvalidResponse { message })
				},
				None => Err(scout_providers::Error::InvalidResponse {
					message: "Completion script is exhausted.".to_string(),
				}),
			}
		})
	}
}

/// Serves fixed pages; unknown endpoints fail to fetch.
#[derive(Default)]
pub struct StaticFetcher {
	pages: HashMap<Endpoint, FetchedPage>,
}
impl StaticFetcher {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_page(mut self, endpoint: Endpoint, title: &str, content: &str) -> Self {
		self.pages
			.insert(endpoint, FetchedPage { title: title.to_string(), content: content.to_string() });

		self
	}
}

impl EndpointFetcher for StaticFetcher {
	fn fetch<'a>(&'a self, endpoint: &'a Endpoint) -> BoxFuture<'a, Result<FetchedPage>> {
		let page = self.pages.get(endpoint).cloned().ok_or_else(|| Error::Fetch {
			message: format!("No page is registered for {endpoint}."),
		});

		Box::pin(async move { page })
	}
}

struct InFlight<'a> {
	counter: &'a AtomicUsize,
}
impl<'a> InFlight<'a> {
	fn enter(counter: &'a AtomicUsize, peak: &AtomicUsize) -> Self {
		let now = counter.fetch_add(1, Ordering::SeqCst) + 1;

		peak.fetch_max(now, Ordering::SeqCst);

		Self { counter }
	}
}

impl Drop for InFlight<'_> {
	fn drop(&mut self) {
		self.counter.fetch_sub(1, Ordering::SeqCst);
	}
}
