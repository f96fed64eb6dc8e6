//! Conversation-related types.

use memprobe_model::{ModelMessage, ModelRequest};

/// Represents a conversation.
///
/// A conversation is append-only and lives exactly as long as one query:
/// the estimator builds it up message by message and drops it when the
/// final answer has been returned.
#[derive(Clone, Default, Debug)]
pub struct Conversation {
    messages: Vec<ModelMessage>,
}

impl Conversation {
    /// Appends a user message.
    #[inline]
    pub fn push_user<S: Into<String>>(&mut self, content: S) {
        self.messages.push(ModelMessage::User(content.into()));
    }

    /// Appends an assistant message.
    #[inline]
    pub fn push_assistant<S: Into<String>>(&mut self, content: S) {
        self.messages.push(ModelMessage::Assistant(content.into()));
    }

    /// Builds a model request from the current history.
    #[inline]
    pub fn to_request(&self) -> ModelRequest {
        ModelRequest {
            messages: self.messages.clone(),
        }
    }

    /// Returns the number of messages in this conversation.
    #[inline]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Returns `true` if the conversation holds no messages.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_order() {
        let mut conversation = Conversation::default();
        conversation.push_user("estimate this");
        conversation.push_assistant("here is the script");
        conversation.push_assistant("here are the sizes");

        let request = conversation.to_request();
        assert_eq!(
            request.messages,
            vec![
                ModelMessage::User("estimate this".to_owned()),
                ModelMessage::Assistant("here is the script".to_owned()),
                ModelMessage::Assistant("here are the sizes".to_owned()),
            ]
        );
    }
}
