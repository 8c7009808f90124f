//! Mock Slack provider - communication capability over scenario fixtures.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use std::sync::Mutex;

use runbook_application::ports::integrations::CommunicationProvider;
use runbook_domain::integration::records::{Channel, ChatMessage};
use runbook_domain::{short_id, RunbookError};

use crate::config::Settings;

use super::{parse_fixture, MockCore};

pub struct MockSlack {
    core: MockCore,
    sent_messages: Mutex<Vec<ChatMessage>>,
}

impl MockSlack {
    pub fn new(settings: &Settings) -> Self {
        Self {
            core: MockCore::new(settings, "slack"),
            sent_messages: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl CommunicationProvider for MockSlack {
    async fn send_message(&self, channel: &str, message: &str) -> Result<(), RunbookError> {
        self.core.simulate_delay().await;
        self.sent_messages.lock().unwrap().push(ChatMessage {
            id: format!("msg-{}", short_id()),
            channel: channel.to_string(),
            text: message.to_string(),
            author: "runbook-bot".to_string(),
            timestamp: Some(Utc::now()),
        });
        Ok(())
    }

    async fn create_channel(&self, name: &str, purpose: &str) -> Result<Channel, RunbookError> {
        self.core.simulate_delay().await;
        Ok(Channel {
            id: format!("C{}", short_id().to_uppercase()),
            name: name.to_string(),
            purpose: purpose.to_string(),
            created_at: Some(Utc::now()),
        })
    }

    /// Fixture messages merged with anything sent during this session.
    async fn get_recent_messages(
        &self,
        channel: &str,
        limit: usize,
    ) -> Result<Vec<ChatMessage>, RunbookError> {
        self.core.simulate_delay().await;
        let fixture: Vec<ChatMessage> =
            parse_fixture("slack", Value::Array(self.core.list("recent_messages")))?;

        let sent = self.sent_messages.lock().unwrap();
        let mut combined: Vec<ChatMessage> = fixture
            .into_iter()
            .filter(|m| m.channel == channel)
            .chain(sent.iter().filter(|m| m.channel == channel).cloned())
            .collect();

        let start = combined.len().saturating_sub(limit);
        Ok(combined.split_off(start))
    }
}
