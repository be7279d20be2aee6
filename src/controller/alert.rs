#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub title: Option<String>,
    pub message: Option<String>,
    pub button_title: String,
}

impl Alert {
    pub fn new() -> Self {
        Self {
            title: None,
            message: None,
            button_title: "OK".to_string(),
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn button_title(mut self, button_title: impl Into<String>) -> Self {
        self.button_title = button_title.into();
        self
    }
}

impl Default for Alert {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionStyle {
    Default,
    Destructive,
    Cancel,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetAction {
    pub title: String,
    pub style: ActionStyle,
}

/// A set of choices; the host reports the pick back to the controller that
/// asked for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionSheet {
    pub title: Option<String>,
    pub message: Option<String>,
    pub actions: Vec<SheetAction>,
}

pub trait AlertPresenter: Send + Sync {
    fn show_alert(&self, alert: Alert);

    fn show_action_sheet(&self, sheet: ActionSheet);
}
