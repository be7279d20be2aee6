//! Maps row view models to what a row shows. Pure functions; rows keep no
//! state between calls.

use crate::api::models::Conversation;
use crate::viewmodel::{MessageContent, ProfileViewModel, ProfileViewModelType};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlignment {
    Leading,
    Center,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatRowPresentation {
    pub title: String,
    pub subtitle: String,
    pub timestamp: String,
    /// Unread latest message: render the row in bold.
    pub emphasized: bool,
}

impl From<&Conversation> for ChatRowPresentation {
    fn from(conversation: &Conversation) -> Self {
        Self {
            title: conversation.name.clone(),
            subtitle: conversation.latest_message.text.clone(),
            timestamp: conversation.latest_message.date.clone(),
            emphasized: !conversation.latest_message.is_read,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileRowPresentation {
    pub title: String,
    pub alignment: TextAlignment,
    pub destructive: bool,
    pub selectable: bool,
}

impl From<&ProfileViewModel> for ProfileRowPresentation {
    fn from(view_model: &ProfileViewModel) -> Self {
        match view_model.kind {
            ProfileViewModelType::Info => Self {
                title: view_model.title.clone(),
                alignment: TextAlignment::Leading,
                destructive: false,
                selectable: false,
            },
            ProfileViewModelType::Logout => Self {
                title: view_model.title.clone(),
                alignment: TextAlignment::Center,
                destructive: true,
                selectable: true,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageRowPresentation {
    pub sender: String,
    pub preview: String,
    pub badge: Option<String>,
    pub has_image: bool,
}

impl From<&MessageContent> for MessageRowPresentation {
    fn from(message: &MessageContent) -> Self {
        Self {
            sender: message.sender_name.clone(),
            preview: message.content.clone(),
            badge: (message.unread_messages_count > 0)
                .then(|| message.unread_messages_count.to_string()),
            has_image: message.image.is_some(),
        }
    }
}
