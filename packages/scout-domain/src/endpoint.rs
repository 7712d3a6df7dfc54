use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use url::Url;

#[derive(Debug, thiserror::Error)]
pub enum EndpointError {
	#[error("Endpoint {input:?} is not a valid URL: {source}")]
	InvalidUrl { input: String, source: url::ParseError },
	#[error("Endpoint {input:?} must use http or https.")]
	UnsupportedScheme { input: String },
	#[error("Endpoint {input:?} has no host.")]
	MissingHost { input: String },
}

/// A fetchable resource, compared and hashed by its canonical URL.
///
/// Canonicalization lowercases scheme and host (done by [`Url`]), drops the
/// fragment, and sorts query pairs so that `?b=2&a=1` and `?a=1&b=2` name the
/// same endpoint.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Endpoint(Url);
impl Endpoint {
	pub fn parse(input: &str) -> Result<Self, EndpointError> {
		let trimmed = input.trim();
		let mut url = Url::parse(trimmed)
			.map_err(|source| EndpointError::InvalidUrl { input: trimmed.to_string(), source })?;

		if !matches!(url.scheme(), "http" | "https") {
			return Err(EndpointError::UnsupportedScheme { input: trimmed.to_string() });
		}
		if url.host_str().map(str::is_empty).unwrap_or(true) {
			return Err(EndpointError::MissingHost { input: trimmed.to_string() });
		}

		url.set_fragment(None);

		let mut pairs: Vec<(String, String)> =
			url.query_pairs().map(|(key, value)| (key.into_owned(), value.into_owned())).collect();

		if pairs.is_empty() {
			url.set_query(None);
		} else {
			pairs.sort();
			url.query_pairs_mut().clear().extend_pairs(pairs);
		}

		Ok(Self(url))
	}

	pub fn scheme(&self) -> &str {
		self.0.scheme()
	}

	pub fn host(&self) -> &str {
		self.0.host_str().unwrap_or_default()
	}

	pub fn port(&self) -> Option<u16> {
		self.0.port()
	}

	pub fn path(&self) -> &str {
		self.0.path()
	}

	pub fn query_pairs(&self) -> Vec<(String, String)> {
		self.0.query_pairs().map(|(key, value)| (key.into_owned(), value.into_owned())).collect()
	}

	pub fn as_str(&self) -> &str {
		self.0.as_str()
	}

	pub fn url(&self) -> &Url {
		&self.0
	}

	/// The last non-empty path segment, or the host for root paths.
	pub fn label(&self) -> &str {
		self.0
			.path_segments()
			.and_then(|segments| segments.filter(|segment| !segment.is_empty()).next_back())
			.unwrap_or_else(|| self.host())
	}
}

impl fmt::Display for Endpoint {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl fmt::Debug for Endpoint {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "Endpoint({})", self.as_str())
	}
}

impl std::str::FromStr for Endpoint {
	type Err = EndpointError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::parse(s)
	}
}

impl Serialize for Endpoint {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		serializer.serialize_str(self.as_str())
	}
}

impl<'de> Deserialize<'de> for Endpoint {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		let raw = String::deserialize(deserializer)?;

		Self::parse(&raw).map_err(serde::de::Error::custom)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn canonical_form_ignores_query_order_and_fragment() {
		let lhs = Endpoint::parse("HTTPS://Api.Example.com/v1/users?b=2&a=1#top")
			.expect("Failed to parse endpoint.");
		let rhs =
			Endpoint::parse("https://api.example.com/v1/users?a=1&b=2").expect("Failed to parse endpoint.");

		assert_eq!(lhs, rhs);
		assert_eq!(lhs.as_str(), "https://api.example.com/v1/users?a=1&b=2");
	}

	#[test]
	fn rejects_non_http_schemes() {
		let err = Endpoint::parse("ftp://example.com/spec.json").expect_err("Expected rejection.");

		assert!(matches!(err, EndpointError::UnsupportedScheme { .. }));
	}

	#[test]
	fn label_prefers_last_path_segment() {
		let endpoint =
			Endpoint::parse("http://localhost:8080/docs/openapi.json").expect("Failed to parse.");

		assert_eq!(endpoint.label(), "openapi.json");
		assert_eq!(endpoint.port(), Some(8080));

		let root = Endpoint::parse("http://localhost/").expect("Failed to parse.");

		assert_eq!(root.label(), "localhost");
	}
}
