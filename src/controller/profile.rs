use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use url::Url;

use super::alert::{ActionSheet, ActionStyle, Alert, AlertPresenter, SheetAction};
use super::navigation::{Navigator, Route};
use super::{BackendCall, RowError, check_row};
use crate::api::models::profile_picture_path;
use crate::api::{AuthError, AuthService, SessionEvent, SessionEvents, StorageError, StorageService};
use crate::app::Services;
use crate::storage::{EMAIL_KEY, NAME_KEY, PROFILE_PICTURE_URL_KEY, SessionStore, remove_or_warn};
use crate::utils::safe_email;
use crate::viewmodel::{ProfileViewModel, RowHandler};

pub const LOGOUT_TITLE: &str = "Log Out";
pub const CANCEL_TITLE: &str = "Cancel";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogoutOutcome {
    SignedOut,
    Failed(AuthError),
    /// Confirmation arrived without a pending logout request.
    NotRequested,
}

pub fn logout_sheet() -> ActionSheet {
    ActionSheet {
        title: None,
        message: None,
        actions: vec![
            SheetAction {
                title: LOGOUT_TITLE.to_string(),
                style: ActionStyle::Destructive,
            },
            SheetAction {
                title: CANCEL_TITLE.to_string(),
                style: ActionStyle::Cancel,
            },
        ],
    }
}

/// Backs the settings tab: fixed info rows plus a logout row that only acts
/// after the user confirms.
pub struct ProfileController {
    auth: Arc<dyn AuthService>,
    storage: Arc<dyn StorageService>,
    session: Arc<dyn SessionStore>,
    events: SessionEvents,
    navigator: Arc<dyn Navigator>,
    presenter: Arc<dyn AlertPresenter>,
    rows: Vec<ProfileViewModel>,
    logout_pending: Arc<AtomicBool>,
    header_picture: Option<Url>,
}

impl ProfileController {
    pub fn load(
        services: &Services,
        navigator: Arc<dyn Navigator>,
        presenter: Arc<dyn AlertPresenter>,
    ) -> Self {
        let session = services.session.clone();
        let name = session.get(NAME_KEY).unwrap_or_else(|| "No Name".to_string());
        let email = session.get(EMAIL_KEY).unwrap_or_else(|| "No Email".to_string());

        let logout_pending = Arc::new(AtomicBool::new(false));
        let request_logout: RowHandler = {
            let pending = logout_pending.clone();
            let presenter = presenter.clone();
            Arc::new(move || {
                pending.store(true, Ordering::SeqCst);
                presenter.show_action_sheet(logout_sheet());
            })
        };

        let rows = vec![
            ProfileViewModel::info(format!("Name: {}", name)),
            ProfileViewModel::info(format!("Email: {}", email)),
            ProfileViewModel::logout(LOGOUT_TITLE, request_logout),
        ];

        Self {
            auth: services.auth.clone(),
            storage: services.storage.clone(),
            session,
            events: services.events.clone(),
            navigator,
            presenter,
            rows,
            logout_pending,
            header_picture: None,
        }
    }

    pub fn rows(&self) -> &[ProfileViewModel] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn row(&self, index: usize) -> Result<&ProfileViewModel, RowError> {
        check_row(index, self.rows.len())?;
        Ok(&self.rows[index])
    }

    /// Runs the row's action, if it has one. Info rows do nothing.
    pub fn select_row(&self, index: usize) -> Result<(), RowError> {
        if let Some(handler) = &self.row(index)?.handler {
            handler();
        }
        Ok(())
    }

    pub fn logout_pending(&self) -> bool {
        self.logout_pending.load(Ordering::SeqCst)
    }

    pub fn cancel_logout(&self) {
        if self.logout_pending.swap(false, Ordering::SeqCst) {
            log::debug!("Logout cancelled");
        }
    }

    /// The sign-out call for a confirmed logout, or `None` when no logout
    /// was requested.
    pub fn logout_request(&self) -> Option<BackendCall<Result<(), AuthError>>> {
        if !self.logout_pending.swap(false, Ordering::SeqCst) {
            return None;
        }
        let auth = self.auth.clone();
        Some(Box::pin(async move { auth.sign_out().await }))
    }

    /// Finishes a logout once the backend has answered. Local identity is
    /// only cleared after a successful sign-out.
    pub fn apply_logout(&self, result: Result<(), AuthError>) -> LogoutOutcome {
        match result {
            Ok(()) => {
                for key in [EMAIL_KEY, NAME_KEY, PROFILE_PICTURE_URL_KEY] {
                    remove_or_warn(self.session.as_ref(), key);
                }
                log::info!("Signed out");
                self.events.publish(SessionEvent::SignedOut);
                self.navigator.navigate(Route::SignIn);
                LogoutOutcome::SignedOut
            }
            Err(e) => {
                log::warn!("Failed to log out: {}", e);
                self.presenter.show_alert(
                    Alert::new()
                        .title("Failed to log out")
                        .message(e.to_string()),
                );
                LogoutOutcome::Failed(e)
            }
        }
    }

    pub async fn confirm_logout(&self) -> LogoutOutcome {
        match self.logout_request() {
            Some(request) => {
                let result = request.await;
                self.apply_logout(result)
            }
            None => LogoutOutcome::NotRequested,
        }
    }

    pub fn profile_picture_path(&self) -> Option<String> {
        let email = self.session.get(EMAIL_KEY)?;
        Some(profile_picture_path(&safe_email(&email)))
    }

    pub fn header_picture_request(&self) -> Option<BackendCall<Result<Url, StorageError>>> {
        let path = self.profile_picture_path()?;
        let storage = self.storage.clone();
        Some(Box::pin(async move { storage.download_url(&path).await }))
    }

    pub fn apply_header_picture(&mut self, result: Result<Url, StorageError>) -> Option<&Url> {
        match result {
            Ok(url) => self.header_picture = Some(url),
            Err(e) => {
                log::warn!("No profile picture: {}", e);
                self.header_picture = None;
            }
        }
        self.header_picture.as_ref()
    }

    pub async fn load_header_picture(&mut self) -> Option<&Url> {
        let request = self.header_picture_request()?;
        let result = request.await;
        self.apply_header_picture(result)
    }

    pub fn header_picture(&self) -> Option<&Url> {
        self.header_picture.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::testing::{Harness, identity};
    use crate::storage::MemorySessionStore;
    use crate::viewmodel::ProfileViewModelType;

    fn signed_in_harness() -> Harness {
        let harness = Harness::with_session(MemorySessionStore::with_values([
            (EMAIL_KEY, "Ada@Example.com"),
            (NAME_KEY, "Ada Lovelace"),
        ]));
        *harness.auth.user.lock().unwrap() = Some(identity("ada@example.com"));
        harness
    }

    fn controller(harness: &Harness) -> ProfileController {
        ProfileController::load(
            &harness.services,
            harness.navigator.clone(),
            harness.presenter.clone(),
        )
    }

    #[test]
    fn rows_reflect_session_identity() {
        let harness = signed_in_harness();
        let profile = controller(&harness);
        let titles: Vec<&str> = profile.rows().iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["Name: Ada Lovelace", "Email: Ada@Example.com", "Log Out"]);
        assert_eq!(profile.row(2).unwrap().kind, ProfileViewModelType::Logout);
    }

    #[test]
    fn rows_fall_back_when_session_is_empty() {
        let harness = Harness::new();
        let profile = controller(&harness);
        assert_eq!(profile.row(0).unwrap().title, "Name: No Name");
        assert_eq!(profile.row(1).unwrap().title, "Email: No Email");
    }

    #[test]
    fn selecting_info_rows_does_nothing() {
        let harness = signed_in_harness();
        let profile = controller(&harness);
        profile.select_row(0).unwrap();
        profile.select_row(1).unwrap();
        assert!(harness.presenter.sheets().is_empty());
        assert!(!profile.logout_pending());
    }

    #[test]
    fn selecting_out_of_bounds_fails() {
        let harness = signed_in_harness();
        let profile = controller(&harness);
        assert_eq!(
            profile.select_row(3),
            Err(RowError::OutOfBounds { index: 3, len: 3 })
        );
    }

    #[test]
    fn logout_row_asks_for_confirmation_first() {
        let harness = signed_in_harness();
        let profile = controller(&harness);

        profile.select_row(2).unwrap();

        assert_eq!(harness.presenter.sheets(), vec![logout_sheet()]);
        assert!(profile.logout_pending());
        assert!(harness.auth.calls().is_empty());
        assert_eq!(harness.session.get(EMAIL_KEY).as_deref(), Some("Ada@Example.com"));
        assert!(harness.navigator.routes().is_empty());
    }

    #[tokio::test]
    async fn cancel_leaves_everything_untouched() {
        let harness = signed_in_harness();
        let profile = controller(&harness);

        profile.select_row(2).unwrap();
        profile.cancel_logout();

        assert!(!profile.logout_pending());
        assert_eq!(profile.confirm_logout().await, LogoutOutcome::NotRequested);
        assert!(harness.auth.calls().is_empty());
        assert_eq!(harness.session.get(EMAIL_KEY).as_deref(), Some("Ada@Example.com"));
        assert_eq!(harness.session.get(NAME_KEY).as_deref(), Some("Ada Lovelace"));
        assert!(harness.navigator.routes().is_empty());
    }

    #[tokio::test]
    async fn confirmed_logout_clears_identity_and_shows_sign_in() {
        let harness = signed_in_harness();
        let mut events = harness.services.events.subscribe();
        let profile = controller(&harness);

        profile.select_row(2).unwrap();
        assert_eq!(profile.confirm_logout().await, LogoutOutcome::SignedOut);

        assert_eq!(harness.auth.calls(), vec!["sign_out".to_string()]);
        assert_eq!(harness.session.get(EMAIL_KEY), None);
        assert_eq!(harness.session.get(NAME_KEY), None);
        assert_eq!(harness.navigator.routes(), vec![Route::SignIn]);
        assert_eq!(events.recv().await.unwrap(), SessionEvent::SignedOut);
    }

    #[tokio::test]
    async fn failed_sign_out_reports_and_stays_on_profile() {
        let harness = signed_in_harness();
        *harness.auth.sign_out_result.lock().unwrap() =
            Some(Err(AuthError::Network("offline".into())));
        let profile = controller(&harness);

        profile.select_row(2).unwrap();
        let outcome = profile.confirm_logout().await;

        assert_eq!(outcome, LogoutOutcome::Failed(AuthError::Network("offline".into())));
        assert_eq!(harness.presenter.alerts().len(), 1);
        assert_eq!(
            harness.presenter.alerts()[0].title.as_deref(),
            Some("Failed to log out")
        );
        assert_eq!(harness.session.get(EMAIL_KEY).as_deref(), Some("Ada@Example.com"));
        assert!(harness.navigator.routes().is_empty());
        assert!(!profile.logout_pending());
    }

    #[tokio::test]
    async fn confirm_without_request_is_ignored() {
        let harness = signed_in_harness();
        let profile = controller(&harness);
        assert_eq!(profile.confirm_logout().await, LogoutOutcome::NotRequested);
        assert!(harness.auth.calls().is_empty());
    }

    #[tokio::test]
    async fn header_picture_comes_from_normalized_path() {
        let harness = signed_in_harness();
        let url = Url::parse("https://cdn.example.com/ada.png").unwrap();
        *harness.storage.download_result.lock().unwrap() = Ok(url.clone());
        let mut profile = controller(&harness);

        assert_eq!(
            profile.profile_picture_path().as_deref(),
            Some("images/ada-example-com_profile_picture.png")
        );
        assert_eq!(profile.load_header_picture().await, Some(&url));
        assert_eq!(
            *harness.storage.downloads.lock().unwrap(),
            vec!["images/ada-example-com_profile_picture.png".to_string()]
        );
    }

    #[tokio::test]
    async fn missing_header_picture_is_tolerated() {
        let harness = signed_in_harness();
        let mut profile = controller(&harness);
        assert_eq!(profile.load_header_picture().await, None);
        assert_eq!(profile.header_picture(), None);

        let signed_out = Harness::new();
        let mut profile = controller(&signed_out);
        assert!(profile.header_picture_request().is_none());
        assert_eq!(profile.load_header_picture().await, None);
    }
}
