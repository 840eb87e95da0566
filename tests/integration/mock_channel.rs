//! Recording alert channel for integration testing.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use beatscan::notify::{AlertChannel, AlertPayload, NotifyError};

/// Keeps every payload it is handed. Titles containing a rejected
/// ticker are answered with HTTP 429 instead of 204.
#[derive(Clone, Default)]
pub struct RecordingChannel {
    received: Arc<Mutex<Vec<AlertPayload>>>,
    rejected: Arc<Mutex<HashSet<String>>>,
}

impl RecordingChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reject(&self, ticker: &str) {
        self.rejected.lock().unwrap().insert(format!("${ticker}"));
    }

    pub fn received(&self) -> Vec<AlertPayload> {
        self.received.lock().unwrap().clone()
    }

    pub fn titles(&self) -> Vec<String> {
        self.received().into_iter().map(|a| a.title).collect()
    }
}

#[async_trait]
impl AlertChannel for RecordingChannel {
    async fn send(&self, alert: &AlertPayload) -> Result<(), NotifyError> {
        self.received.lock().unwrap().push(alert.clone());

        let rejected = self.rejected.lock().unwrap();
        if rejected.iter().any(|t| alert.title.ends_with(t.as_str())) {
            return Err(NotifyError::Rejected {
                status: 429,
                body: r#"{"message": "You are being rate limited."}"#.into(),
            });
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "recording"
    }
}
