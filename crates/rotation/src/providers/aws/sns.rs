//! SNS notifier

use async_trait::async_trait;
use aws_sdk_sns::Client;
use aws_sdk_sns::error::DisplayErrorContext;

use crate::capability::{Notifier, NotifyError};

/// SNS rejects longer subjects
const MAX_SUBJECT_CHARS: usize = 100;

/// Publishes to a single SNS topic
#[derive(Debug, Clone)]
pub struct SnsNotifier {
    client: Client,
    topic_arn: String,
}

impl SnsNotifier {
    /// Wrap an SNS client bound to `topic_arn`
    pub fn new(client: Client, topic_arn: impl Into<String>) -> Self {
        Self {
            client,
            topic_arn: topic_arn.into(),
        }
    }
}

fn clamp_subject(subject: &str) -> &str {
    match subject.char_indices().nth(MAX_SUBJECT_CHARS) {
        Some((end, _)) => &subject[..end],
        None => subject,
    }
}

#[async_trait]
impl Notifier for SnsNotifier {
    #[tracing::instrument(skip(self, body), fields(provider = "SNS", topic = %self.topic_arn))]
    async fn publish(&self, subject: &str, body: &str) -> Result<(), NotifyError> {
        let output = self
            .client
            .publish()
            .topic_arn(&self.topic_arn)
            .subject(clamp_subject(subject))
            .message(body)
            .send()
            .await
            .map_err(|err| NotifyError::Service {
                message: DisplayErrorContext(&err).to_string(),
            })?;

        tracing::debug!(message_id = ?output.message_id(), "Published notification");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_subject_is_untouched() {
        let subject = "AWS Access Key Rotation: New key is available for svc-app";
        assert_eq!(clamp_subject(subject), subject);
    }

    #[test]
    fn long_subject_is_clamped_on_char_boundary() {
        let subject = format!("é{}", "x".repeat(200));
        let clamped = clamp_subject(&subject);
        assert_eq!(clamped.chars().count(), MAX_SUBJECT_CHARS);
        assert!(clamped.starts_with('é'));
    }
}
