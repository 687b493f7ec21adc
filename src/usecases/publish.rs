//! Post digest messages to their channels.

use crate::domain::{ChannelMessage, DomainError};
use crate::ports::ChatGateway;
use tracing::{error, info};

/// Send every message in order. Stops at the first failed post.
pub async fn publish(
    chat: &dyn ChatGateway,
    messages: &[ChannelMessage],
) -> Result<(), DomainError> {
    for message in messages {
        if let Err(e) = chat
            .send_channel_message(&message.channel, &message.topic, &message.content)
            .await
        {
            error!(channel = %message.channel, topic = %message.topic, error = %e, "post failed");
            return Err(e);
        }
        info!(channel = %message.channel, topic = %message.topic, "posted");
    }
    Ok(())
}
