use std::sync::Arc;

use url::Url;

use super::alert::{Alert, AlertPresenter};
use super::navigation::{Navigator, Route};
use super::{BackendCall, MISSING_FIELDS_MESSAGE, MISSING_FIELDS_TITLE};
use crate::api::{
    AppUser, AuthError, AuthService, DatabaseService, SessionEvent, SessionEvents, StorageService,
    UserIdentity,
};
use crate::app::Services;
use crate::storage::{EMAIL_KEY, NAME_KEY, PROFILE_PICTURE_URL_KEY, SessionStore, store_or_warn};

pub const ACCOUNT_EXISTS_MESSAGE: &str = "An account with this email already exists";

#[derive(Debug, Clone, Default)]
pub struct SignUpForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    /// PNG bytes of the chosen profile picture.
    pub picture: Option<Vec<u8>>,
}

impl SignUpForm {
    fn trimmed(mut self) -> Self {
        self.first_name = self.first_name.trim().to_string();
        self.last_name = self.last_name.trim().to_string();
        self.email = self.email.trim().to_string();
        self
    }

    pub fn is_complete(&self) -> bool {
        !self.first_name.trim().is_empty()
            && !self.last_name.trim().is_empty()
            && !self.email.trim().is_empty()
            && !self.password.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignUpOutcome {
    Registered {
        identity: UserIdentity,
        user: AppUser,
        picture_url: Option<Url>,
    },
    AccountExists,
    Failed(AuthError),
}

pub struct SignUpController {
    auth: Arc<dyn AuthService>,
    database: Arc<dyn DatabaseService>,
    storage: Arc<dyn StorageService>,
    session: Arc<dyn SessionStore>,
    events: SessionEvents,
    navigator: Arc<dyn Navigator>,
    presenter: Arc<dyn AlertPresenter>,
}

impl SignUpController {
    pub fn new(
        services: &Services,
        navigator: Arc<dyn Navigator>,
        presenter: Arc<dyn AlertPresenter>,
    ) -> Self {
        Self {
            auth: services.auth.clone(),
            database: services.database.clone(),
            storage: services.storage.clone(),
            session: services.session.clone(),
            events: services.events.clone(),
            navigator,
            presenter,
        }
    }

    /// Validates the form and returns the whole registration chain: existence
    /// check, account creation, user record, and picture upload. Insert and
    /// upload failures are logged; they don't undo the account. The session
    /// is left alone until [`Self::apply_sign_up`].
    pub fn sign_up_request(&self, form: SignUpForm) -> Option<BackendCall<SignUpOutcome>> {
        if !form.is_complete() {
            self.presenter.show_alert(
                Alert::new()
                    .title(MISSING_FIELDS_TITLE)
                    .message(MISSING_FIELDS_MESSAGE),
            );
            return None;
        }
        let form = form.trimmed();
        let auth = self.auth.clone();
        let database = self.database.clone();
        let storage = self.storage.clone();

        Some(Box::pin(async move {
            if database.user_exists(&form.email).await {
                return SignUpOutcome::AccountExists;
            }

            let identity = match auth.sign_up(&form.email, &form.password).await {
                Ok(identity) => identity,
                Err(AuthError::AccountExists) => return SignUpOutcome::AccountExists,
                Err(e) => return SignUpOutcome::Failed(e),
            };

            let user = AppUser {
                first_name: form.first_name,
                last_name: form.last_name,
                email_address: form.email,
            };

            let mut picture_url = None;
            if !database.insert_user(&user).await {
                log::warn!("User record for {} was not written", user.safe_email());
            } else if let Some(data) = form.picture {
                match storage
                    .upload_profile_picture(data, &user.profile_picture_file_name())
                    .await
                {
                    Ok(url) => picture_url = Some(url),
                    Err(e) => log::warn!("Profile picture upload failed: {}", e),
                }
            }

            SignUpOutcome::Registered {
                identity,
                user,
                picture_url,
            }
        }))
    }

    pub fn apply_sign_up(&self, outcome: &SignUpOutcome) -> bool {
        match outcome {
            SignUpOutcome::Registered {
                identity,
                user,
                picture_url,
            } => {
                log::info!("Registered {}", identity.email);
                store_or_warn(self.session.as_ref(), EMAIL_KEY, &user.email_address);
                store_or_warn(self.session.as_ref(), NAME_KEY, &user.full_name());
                if let Some(url) = picture_url {
                    store_or_warn(self.session.as_ref(), PROFILE_PICTURE_URL_KEY, url.as_str());
                }
                self.events.publish(SessionEvent::SignedIn {
                    email: identity.email.clone(),
                });
                self.navigator.navigate(Route::Chats);
                true
            }
            SignUpOutcome::AccountExists => {
                self.presenter.show_alert(
                    Alert::new()
                        .title(MISSING_FIELDS_TITLE)
                        .message(ACCOUNT_EXISTS_MESSAGE),
                );
                false
            }
            SignUpOutcome::Failed(e) => {
                log::warn!("Sign-up failed: {}", e);
                self.presenter
                    .show_alert(Alert::new().title(MISSING_FIELDS_TITLE).message(e.to_string()));
                false
            }
        }
    }

    pub async fn sign_up(&self, form: SignUpForm) -> Option<SignUpOutcome> {
        let request = self.sign_up_request(form)?;
        let outcome = request.await;
        self.apply_sign_up(&outcome);
        Some(outcome)
    }
}
