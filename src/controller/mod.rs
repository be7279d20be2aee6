//! Screen controllers: own their row view models, issue backend calls, and
//! route user interaction to local state changes or navigation.
//!
//! Every backend interaction is split in two. A `*_request` method returns a
//! [`BackendCall`] that only talks to collaborators and can run on any
//! executor; the matching `apply_*` method takes the result and updates
//! controller state on the host's UI context. Applying results in the order
//! calls complete gives "last completion wins" for overlapping requests.

use std::future::Future;
use std::pin::Pin;

use thiserror::Error;

pub mod alert;
pub mod conversations;
pub mod navigation;
pub mod profile;
pub mod sign_in;
pub mod sign_up;
pub mod tabs;

pub use alert::{ActionSheet, ActionStyle, Alert, AlertPresenter, SheetAction};
pub use conversations::{ConversationListController, Visibility};
pub use navigation::{ChatRoute, NavigationStack, Navigator, Route};
pub use profile::{LogoutOutcome, ProfileController};
pub use sign_in::SignInController;
pub use sign_up::{SignUpController, SignUpForm, SignUpOutcome};
pub use tabs::{Tab, TabCoordinator};

/// A backend request detached from its controller.
pub type BackendCall<T> = Pin<Box<dyn Future<Output = T> + Send + 'static>>;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum RowError {
    #[error("row {index} is out of bounds for {len} rows")]
    OutOfBounds { index: usize, len: usize },
}

pub(crate) fn check_row(index: usize, len: usize) -> Result<(), RowError> {
    if index < len {
        Ok(())
    } else {
        Err(RowError::OutOfBounds { index, len })
    }
}

pub(crate) const MISSING_FIELDS_TITLE: &str = "Oops...";
pub(crate) const MISSING_FIELDS_MESSAGE: &str = "Please fill in all required fields";
