//! Bounded concurrency shared by indexing, verification and the browser.

use std::{
	future::Future,
	sync::{
		Arc,
		atomic::{AtomicUsize, Ordering},
	},
};

use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio_util::sync::CancellationToken;

use crate::{Error, Result};

/// Caps the number of operations in flight at once.
///
/// Callers past the bound wait for a slot instead of failing. Waiting and
/// running both observe a [`CancellationToken`].
#[derive(Clone, Debug)]
pub struct Limiter {
	inner: Arc<LimiterInner>,
}

#[derive(Debug)]
struct LimiterInner {
	semaphore: Arc<Semaphore>,
	capacity: usize,
	in_flight: AtomicUsize,
	peak: AtomicUsize,
}

impl Limiter {
	/// A zero bound is treated as one.
	pub fn new(max_in_flight: usize) -> Self {
		let capacity = max_in_flight.max(1);

		Self {
			inner: Arc::new(LimiterInner {
				semaphore: Arc::new(Semaphore::new(capacity)),
				capacity,
				in_flight: AtomicUsize::new(0),
				peak: AtomicUsize::new(0),
			}),
		}
	}

	pub fn capacity(&self) -> usize {
		self.inner.capacity
	}

	pub fn in_flight(&self) -> usize {
		self.inner.in_flight.load(Ordering::SeqCst)
	}

	/// Highest number of permits held at once since construction.
	pub fn peak(&self) -> usize {
		self.inner.peak.load(Ordering::SeqCst)
	}

	pub async fn acquire(&self, cancel: &CancellationToken) -> Result<LimiterPermit> {
		if cancel.is_cancelled() {
			return Err(Error::Cancelled);
		}

		let permit = tokio::select! {
			biased;
			_ = cancel.cancelled() => return Err(Error::Cancelled),
			permit = self.inner.semaphore.clone().acquire_owned() => {
				permit.map_err(|_| Error::Cancelled)?
			},
		};
		let now = self.inner.in_flight.fetch_add(1, Ordering::SeqCst) + 1;

		self.inner.peak.fetch_max(now, Ordering::SeqCst);

		Ok(LimiterPermit { _permit: permit, inner: self.inner.clone() })
	}

	/// Runs `fut` while holding a slot. Cancellation while queued or while
	/// running returns [`Error::Cancelled`] and drops the future.
	pub async fn run<F, T>(&self, cancel: &CancellationToken, fut: F) -> Result<T>
	where
		F: Future<Output = Result<T>>,
	{
		let _permit = self.acquire(cancel).await?;

		tokio::select! {
			biased;
			_ = cancel.cancelled() => Err(Error::Cancelled),
			out = fut => out,
		}
	}
}

/// A held slot. Dropping it frees the slot.
#[derive(Debug)]
pub struct LimiterPermit {
	_permit: OwnedSemaphorePermit,
	inner: Arc<LimiterInner>,
}

impl Drop for LimiterPermit {
	fn drop(&mut self) {
		self.inner.in_flight.fetch_sub(1, Ordering::SeqCst);
	}
}
