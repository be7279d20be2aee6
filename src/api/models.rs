use serde::{Deserialize, Serialize};

use crate::utils::safe_email;

pub type ConversationId = String;

/// A chat thread between the signed-in user and one other identity, as
/// stored under `{user_key}/conversations` in the realtime database.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Conversation {
    pub id: ConversationId,
    pub name: String,
    /// Normalized (see [`safe_email`]) address of the other participant.
    pub other_user_email: String,
    pub latest_message: LatestMessage,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct LatestMessage {
    pub date: String,
    #[serde(rename = "message")]
    pub text: String,
    pub is_read: bool,
}

/// Identity returned by the auth backend after sign-in or sign-up.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct UserIdentity {
    pub uid: String,
    pub email: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct AppUser {
    pub first_name: String,
    pub last_name: String,
    pub email_address: String,
}

impl AppUser {
    pub fn safe_email(&self) -> String {
        safe_email(&self.email_address)
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn profile_picture_file_name(&self) -> String {
        profile_picture_file_name(&self.safe_email())
    }
}

pub fn profile_picture_file_name(user_key: &str) -> String {
    format!("{}_profile_picture.png", user_key)
}

/// Storage path of a user's avatar, keyed by their normalized email.
pub fn profile_picture_path(user_key: &str) -> String {
    format!("images/{}", profile_picture_file_name(user_key))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversation_uses_backend_field_names() {
        let json = serde_json::json!({
            "id": "conversation_1",
            "name": "Grace Hopper",
            "other_user_email": "grace-navy-mil",
            "latest_message": {"date": "2025-01-23", "message": "hi", "is_read": false}
        });
        let conversation: Conversation = serde_json::from_value(json).unwrap();
        assert_eq!(conversation.other_user_email, "grace-navy-mil");
        assert_eq!(conversation.latest_message.text, "hi");
        assert!(!conversation.latest_message.is_read);
    }

    #[test]
    fn app_user_derives_picture_name_from_normalized_email() {
        let user = AppUser {
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            email_address: "Ada.L@Example.com".into(),
        };
        assert_eq!(user.full_name(), "Ada Lovelace");
        assert_eq!(
            user.profile_picture_file_name(),
            "ada-l-example-com_profile_picture.png"
        );
        assert_eq!(
            profile_picture_path(&user.safe_email()),
            "images/ada-l-example-com_profile_picture.png"
        );
    }
}
