//! Row view models: plain data records driving one table row each.

use std::fmt;
use std::sync::Arc;
use std::time::SystemTime;

/// Zero-argument action attached to an interactive row.
pub type RowHandler = Arc<dyn Fn() + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileViewModelType {
    Info,
    Logout,
}

#[derive(Clone)]
pub struct ProfileViewModel {
    pub kind: ProfileViewModelType,
    pub title: String,
    pub handler: Option<RowHandler>,
}

impl ProfileViewModel {
    pub fn info(title: impl Into<String>) -> Self {
        Self {
            kind: ProfileViewModelType::Info,
            title: title.into(),
            handler: None,
        }
    }

    pub fn logout(title: impl Into<String>, handler: RowHandler) -> Self {
        Self {
            kind: ProfileViewModelType::Logout,
            title: title.into(),
            handler: Some(handler),
        }
    }

    pub fn is_interactive(&self) -> bool {
        self.handler.is_some()
    }
}

impl fmt::Debug for ProfileViewModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProfileViewModel")
            .field("kind", &self.kind)
            .field("title", &self.title)
            .field("interactive", &self.is_interactive())
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MessageContent {
    pub sender_name: String,
    pub content: String,
    pub time: SystemTime,
    pub unread_messages_count: u32,
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactModel {
    pub display_name: String,
    pub initials: String,
    pub phone_numbers: Vec<String>,
    pub emails: Vec<String>,
}

impl ContactModel {
    pub fn new(display_name: impl Into<String>, phone_numbers: Vec<String>, emails: Vec<String>) -> Self {
        let display_name = display_name.into();
        let initials = initials(&display_name);
        Self {
            display_name,
            initials,
            phone_numbers,
            emails,
        }
    }
}

/// First letters of the first two words, or the first two characters when
/// the name is a single word. Always uppercased; a blank name yields "".
pub fn initials(display_name: &str) -> String {
    let words: Vec<&str> = display_name.split_whitespace().collect();
    if words.is_empty() {
        String::new()
    } else if words.len() >= 2 {
        words
            .iter()
            .take(2)
            .filter_map(|word| word.chars().next())
            .collect::<String>()
            .to_uppercase()
    } else {
        display_name.chars().take(2).collect::<String>().to_uppercase()
    }
}
