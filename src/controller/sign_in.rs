use std::sync::Arc;

use super::alert::{Alert, AlertPresenter};
use super::navigation::{Navigator, Route};
use super::{BackendCall, MISSING_FIELDS_MESSAGE, MISSING_FIELDS_TITLE};
use crate::api::{AuthError, AuthService, SessionEvent, SessionEvents, UserIdentity};
use crate::app::Services;
use crate::storage::{EMAIL_KEY, SessionStore, store_or_warn};

pub struct SignInController {
    auth: Arc<dyn AuthService>,
    session: Arc<dyn SessionStore>,
    events: SessionEvents,
    navigator: Arc<dyn Navigator>,
    presenter: Arc<dyn AlertPresenter>,
}

impl SignInController {
    pub fn new(
        services: &Services,
        navigator: Arc<dyn Navigator>,
        presenter: Arc<dyn AlertPresenter>,
    ) -> Self {
        Self {
            auth: services.auth.clone(),
            session: services.session.clone(),
            events: services.events.clone(),
            navigator,
            presenter,
        }
    }

    /// Validates the form and returns the sign-in call. Missing fields raise
    /// an alert and no call is made.
    pub fn sign_in_request(
        &self,
        email: &str,
        password: &str,
    ) -> Option<BackendCall<Result<UserIdentity, AuthError>>> {
        let email = email.trim().to_string();
        if email.is_empty() || password.is_empty() {
            self.presenter.show_alert(
                Alert::new()
                    .title(MISSING_FIELDS_TITLE)
                    .message(MISSING_FIELDS_MESSAGE),
            );
            return None;
        }
        let auth = self.auth.clone();
        let password = password.to_string();
        Some(Box::pin(async move { auth.sign_in(&email, &password).await }))
    }

    pub fn apply_sign_in(&self, email: &str, result: Result<UserIdentity, AuthError>) -> bool {
        match result {
            Ok(identity) => {
                let email = email.trim();
                log::info!("Signed in as {}", identity.email);
                store_or_warn(self.session.as_ref(), EMAIL_KEY, email);
                self.events.publish(SessionEvent::SignedIn {
                    email: email.to_string(),
                });
                self.navigator.navigate(Route::Chats);
                true
            }
            Err(e) => {
                log::warn!("Failed to log in: {}", e);
                self.presenter
                    .show_alert(Alert::new().title(MISSING_FIELDS_TITLE).message(e.to_string()));
                false
            }
        }
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> bool {
        let Some(request) = self.sign_in_request(email, password) else {
            return false;
        };
        let result = request.await;
        self.apply_sign_in(email, result)
    }

    pub fn open_sign_up(&self) {
        self.navigator.navigate(Route::SignUp);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::testing::Harness;

    fn controller(harness: &Harness) -> SignInController {
        SignInController::new(
            &harness.services,
            harness.navigator.clone(),
            harness.presenter.clone(),
        )
    }

    #[tokio::test]
    async fn missing_fields_alert_without_backend_call() {
        let harness = Harness::new();
        let sign_in = controller(&harness);

        assert!(!sign_in.sign_in("  ", "secret").await);
        assert!(!sign_in.sign_in("ada@example.com", "").await);

        assert!(harness.auth.calls().is_empty());
        let alerts = harness.presenter.alerts();
        assert_eq!(alerts.len(), 2);
        assert_eq!(alerts[0].message.as_deref(), Some(MISSING_FIELDS_MESSAGE));
    }

    #[tokio::test]
    async fn success_stores_email_and_opens_chats() {
        let harness = Harness::new();
        let mut events = harness.services.events.subscribe();
        let sign_in = controller(&harness);

        assert!(sign_in.sign_in(" ada@example.com ", "secret").await);

        assert_eq!(harness.auth.calls(), vec!["sign_in:ada@example.com".to_string()]);
        assert_eq!(harness.session.get(EMAIL_KEY).as_deref(), Some("ada@example.com"));
        assert_eq!(harness.navigator.routes(), vec![Route::Chats]);
        assert_eq!(
            events.recv().await.unwrap(),
            SessionEvent::SignedIn {
                email: "ada@example.com".into()
            }
        );
    }

    #[tokio::test]
    async fn failure_alerts_and_stays() {
        let harness = Harness::new();
        *harness.auth.sign_in_result.lock().unwrap() = Some(Err(AuthError::InvalidCredential));
        let sign_in = controller(&harness);

        assert!(!sign_in.sign_in("ada@example.com", "wrong").await);

        assert_eq!(harness.session.get(EMAIL_KEY), None);
        assert!(harness.navigator.routes().is_empty());
        assert_eq!(
            harness.presenter.alerts()[0].message.as_deref(),
            Some("invalid email or password")
        );
    }

    #[test]
    fn create_account_opens_sign_up() {
        let harness = Harness::new();
        controller(&harness).open_sign_up();
        assert_eq!(harness.navigator.routes(), vec![Route::SignUp]);
    }
}
