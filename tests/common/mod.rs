//! Test doubles shared by the integration tests.
#![allow(dead_code)]

use dyncrab::error::Error;
use dyncrab::provider::{Capability, Provider, REQUIRED_CAPABILITIES};
use dyncrab::record::Record;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// What [`MockProvider::set_records`] answers with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetBehavior {
    /// Every record was written.
    Echo,
    /// Nothing had to change.
    Empty,
    /// The backend failed.
    Fail,
}

/// An instrumented provider recording how many calls overlap.
pub struct MockProvider {
    name: String,
    /// `None` makes zone listing fail.
    zones: Option<Vec<String>>,
    set_behavior: SetBehavior,
    delay: Duration,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
    set_calls: Mutex<Vec<(String, Vec<Record>)>>,
}

impl MockProvider {
    pub fn new(name: &str, zones: &[&str]) -> Self {
        MockProvider {
            name: name.to_string(),
            zones: Some(zones.iter().map(ToString::to_string).collect()),
            set_behavior: SetBehavior::Echo,
            delay: Duration::ZERO,
            in_flight: Arc::new(AtomicUsize::new(0)),
            max_in_flight: Arc::new(AtomicUsize::new(0)),
            set_calls: Mutex::new(vec![]),
        }
    }

    /// A provider whose zone listing fails.
    pub fn unlisted(name: &str) -> Self {
        MockProvider {
            zones: None,
            ..Self::new(name, &[])
        }
    }

    pub fn with_set_behavior(mut self, set_behavior: SetBehavior) -> Self {
        self.set_behavior = set_behavior;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Count overlapping calls together with `other`, e.g. to bound calls across providers.
    pub fn sharing_counters_with(mut self, other: &MockProvider) -> Self {
        self.in_flight = other.in_flight.clone();
        self.max_in_flight = other.max_in_flight.clone();
        self
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Every `set_records` call as (zone, records), in arrival order.
    pub fn set_calls(&self) -> Vec<(String, Vec<Record>)> {
        self.set_calls.lock().unwrap().clone()
    }

    async fn enter(&self) {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }

    fn leave(&self) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }

    fn failure(&self, message: &str) -> Error {
        Error::Provider {
            provider: self.name.clone(),
            message: message.to_string(),
        }
    }
}

#[async_trait::async_trait]
impl Provider for MockProvider {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn capabilities(&self) -> Vec<Capability> {
        REQUIRED_CAPABILITIES.to_vec()
    }

    async fn list_zones(&self) -> Result<Vec<String>, Error> {
        self.enter().await;
        self.leave();
        self.zones
            .clone()
            .ok_or_else(|| self.failure("zone listing unavailable"))
    }

    async fn get_records(&self, _zone: &str) -> Result<Vec<Record>, Error> {
        Ok(vec![])
    }

    async fn append_records(&self, _zone: &str, records: &[Record]) -> Result<Vec<Record>, Error> {
        Ok(records.to_vec())
    }

    async fn set_records(&self, zone: &str, records: &[Record]) -> Result<Vec<Record>, Error> {
        self.enter().await;
        self.set_calls
            .lock()
            .unwrap()
            .push((zone.to_string(), records.to_vec()));
        self.leave();
        match self.set_behavior {
            SetBehavior::Echo => Ok(records.to_vec()),
            SetBehavior::Empty => Ok(vec![]),
            SetBehavior::Fail => Err(self.failure("backend unavailable")),
        }
    }

    async fn delete_records(&self, _zone: &str, records: &[Record]) -> Result<Vec<Record>, Error> {
        Ok(records.to_vec())
    }
}

/// Share a mock with the registry while keeping a handle for assertions.
pub fn shared(provider: MockProvider) -> Arc<MockProvider> {
    Arc::new(provider)
}

pub fn hosts(list: &[&str]) -> Vec<String> {
    list.iter().map(ToString::to_string).collect()
}
