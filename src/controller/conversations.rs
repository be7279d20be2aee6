use std::sync::Arc;

use super::navigation::{ChatRoute, Navigator, Route};
use super::{BackendCall, RowError, check_row};
use crate::api::{AuthService, Conversation, DatabaseService, DbError, SessionEvent};
use crate::app::Services;
use crate::storage::{EMAIL_KEY, SessionStore};
use crate::utils::safe_email;

/// Which of the two mutually exclusive list states is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Content,
    Empty,
}

impl Visibility {
    pub fn content_visible(self) -> bool {
        self == Visibility::Content
    }

    pub fn empty_visible(self) -> bool {
        self == Visibility::Empty
    }
}

/// Backs the chats tab: the signed-in user's conversations in backend order.
pub struct ConversationListController {
    database: Arc<dyn DatabaseService>,
    auth: Arc<dyn AuthService>,
    session: Arc<dyn SessionStore>,
    navigator: Arc<dyn Navigator>,
    conversations: Vec<Conversation>,
    visibility: Visibility,
}

impl ConversationListController {
    pub fn new(services: &Services, navigator: Arc<dyn Navigator>) -> Self {
        Self {
            database: services.database.clone(),
            auth: services.auth.clone(),
            session: services.session.clone(),
            navigator,
            conversations: Vec::new(),
            visibility: Visibility::Empty,
        }
    }

    pub fn conversations(&self) -> &[Conversation] {
        &self.conversations
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn row_count(&self) -> usize {
        self.conversations.len()
    }

    pub fn row(&self, index: usize) -> Result<&Conversation, RowError> {
        check_row(index, self.conversations.len())?;
        Ok(&self.conversations[index])
    }

    /// Sends the user to sign-in when nobody is signed in. Returns whether a
    /// user is present.
    pub fn validate_auth(&self) -> bool {
        if self.auth.current_user().is_some() {
            true
        } else {
            self.navigator.navigate(Route::SignIn);
            false
        }
    }

    pub fn refresh_request(
        &self,
        user_key: &str,
    ) -> BackendCall<Result<Vec<Conversation>, DbError>> {
        let database = self.database.clone();
        let user_key = user_key.to_string();
        Box::pin(async move { database.get_all_conversations(&user_key).await })
    }

    /// Installs a fetch result. A non-empty list replaces the current one;
    /// an empty list or an error leaves the list empty. A rejected session
    /// also sends the user to sign-in.
    pub fn apply_refresh(&mut self, result: Result<Vec<Conversation>, DbError>) -> Visibility {
        match result {
            Ok(conversations) if !conversations.is_empty() => {
                log::info!("Loaded {} conversations", conversations.len());
                self.conversations = conversations;
                self.visibility = Visibility::Content;
            }
            Ok(_) => {
                log::info!("No conversations yet");
                self.clear();
            }
            Err(DbError::Unauthorized) => {
                log::info!("Session expired while loading conversations");
                self.clear();
                self.navigator.navigate(Route::SignIn);
            }
            Err(e) => {
                log::warn!("Failed to load conversations: {}", e);
                self.clear();
            }
        }
        self.visibility
    }

    pub async fn refresh(&mut self, user_key: &str) -> Visibility {
        let result = self.refresh_request(user_key).await;
        self.apply_refresh(result)
    }

    /// Normalized key of the email stored in the session, if any.
    pub fn session_user_key(&self) -> Option<String> {
        self.session.get(EMAIL_KEY).map(|email| safe_email(&email))
    }

    pub fn refresh_for_session_request(
        &self,
    ) -> Option<BackendCall<Result<Vec<Conversation>, DbError>>> {
        let user_key = self.session_user_key()?;
        Some(self.refresh_request(&user_key))
    }

    pub async fn refresh_for_session(&mut self) -> Option<Visibility> {
        let request = self.refresh_for_session_request()?;
        let result = request.await;
        Some(self.apply_refresh(result))
    }

    /// Reacts to a session change: sign-in asks for a refresh (returned for
    /// the caller to run), sign-out empties the list.
    pub fn handle_session_event(
        &mut self,
        event: &SessionEvent,
    ) -> Option<BackendCall<Result<Vec<Conversation>, DbError>>> {
        match event {
            SessionEvent::SignedIn { .. } => self.refresh_for_session_request(),
            SessionEvent::SignedOut => {
                self.clear();
                None
            }
        }
    }

    pub fn clear(&mut self) {
        self.conversations.clear();
        self.visibility = Visibility::Empty;
    }

    pub fn select_row(&self, index: usize) -> Result<(), RowError> {
        let conversation = self.row(index)?;
        self.navigator
            .navigate(Route::Chat(Self::open_route(conversation)));
        Ok(())
    }

    pub fn open_route(conversation: &Conversation) -> ChatRoute {
        ChatRoute {
            other_user_email: conversation.other_user_email.clone(),
            id: Some(conversation.id.clone()),
            title: conversation.name.clone(),
            is_new_conversation: false,
        }
    }

    /// Removes the row right away and returns the remote deletion for the
    /// caller to run. A failed remote deletion is logged; the row stays gone.
    pub fn delete_row(&mut self, index: usize) -> Result<BackendCall<bool>, RowError> {
        check_row(index, self.conversations.len())?;
        let id = self.conversations.remove(index).id;
        if self.conversations.is_empty() {
            self.visibility = Visibility::Empty;
        }
        let database = self.database.clone();
        Ok(Box::pin(async move {
            let deleted = database.delete_conversation(&id).await;
            if !deleted {
                log::warn!("Remote deletion of conversation {} failed", id);
            }
            deleted
        }))
    }

    /// Resolves where "new chat with `target_email`" should lead. An entry
    /// already in the list wins; otherwise the backend is asked for an
    /// existing conversation, and failing that a new one is started.
    pub fn compose_request(&self, target_email: &str, target_name: &str) -> BackendCall<ChatRoute> {
        let target_key = safe_email(target_email);
        if let Some(existing) = self
            .conversations
            .iter()
            .find(|c| c.other_user_email == target_key)
        {
            return Box::pin(std::future::ready(Self::open_route(existing)));
        }

        let database = self.database.clone();
        let title = target_name.to_string();
        Box::pin(async move {
            match database.conversation_exists(&target_key).await {
                Ok(id) => ChatRoute {
                    other_user_email: target_key,
                    id: Some(id),
                    title,
                    is_new_conversation: false,
                },
                Err(e) => {
                    log::debug!("No conversation with {}: {}", target_key, e);
                    ChatRoute {
                        other_user_email: target_key,
                        id: None,
                        title,
                        is_new_conversation: true,
                    }
                }
            }
        })
    }

    pub fn apply_compose(&self, route: ChatRoute) {
        self.navigator.navigate(Route::Chat(route));
    }

    pub async fn compose_new_conversation(&self, target_email: &str, target_name: &str) {
        let route = self.compose_request(target_email, target_name).await;
        self.apply_compose(route);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::SessionEvent;
    use crate::controller::testing::{Harness, conversation, identity};
    use crate::storage::MemorySessionStore;

    fn controller(harness: &Harness) -> ConversationListController {
        ConversationListController::new(&harness.services, harness.navigator.clone())
    }

    fn three() -> Vec<Conversation> {
        vec![
            conversation("c1", "Bob", "bob-example-com"),
            conversation("c2", "Carol", "carol-example-com"),
            conversation("c3", "Dave", "dave-example-com"),
        ]
    }

    #[tokio::test]
    async fn refresh_installs_rows_in_order() {
        let harness = Harness::new();
        harness.database.push_conversations(Ok(three()));
        let mut list = controller(&harness);

        let visibility = list.refresh("ada-example-com").await;

        assert_eq!(visibility, Visibility::Content);
        assert!(visibility.content_visible() && !visibility.empty_visible());
        assert_eq!(list.row_count(), 3);
        for (i, expected) in three().iter().enumerate() {
            assert_eq!(list.row(i).unwrap(), expected);
        }
        assert_eq!(
            *harness.database.fetched_keys.lock().unwrap(),
            vec!["ada-example-com".to_string()]
        );
    }

    #[tokio::test]
    async fn empty_result_or_failure_shows_empty_state() {
        let harness = Harness::new();
        harness.database.push_conversations(Ok(three()));
        harness.database.push_conversations(Ok(Vec::new()));
        harness.database.push_conversations(Ok(three()));
        harness
            .database
            .push_conversations(Err(DbError::Network("offline".into())));
        let mut list = controller(&harness);

        assert_eq!(list.refresh("k").await, Visibility::Content);
        assert_eq!(list.refresh("k").await, Visibility::Empty);
        assert_eq!(list.row_count(), 0);

        assert_eq!(list.refresh("k").await, Visibility::Content);
        assert_eq!(list.refresh("k").await, Visibility::Empty);
        assert_eq!(list.row_count(), 0);
    }

    #[tokio::test]
    async fn expired_session_empties_list_and_shows_sign_in() {
        let harness = Harness::new();
        harness.database.push_conversations(Ok(three()));
        harness.database.push_conversations(Err(DbError::Unauthorized));
        let mut list = controller(&harness);

        list.refresh("k").await;
        assert!(harness.navigator.routes().is_empty());

        assert_eq!(list.refresh("k").await, Visibility::Empty);
        assert_eq!(list.row_count(), 0);
        assert_eq!(harness.navigator.routes(), vec![Route::SignIn]);
    }

    #[tokio::test]
    async fn repeated_refresh_replaces_instead_of_appending() {
        let harness = Harness::new();
        harness.database.push_conversations(Ok(three()));
        harness
            .database
            .push_conversations(Ok(vec![conversation("c9", "Eve", "eve-example-com")]));
        let mut list = controller(&harness);

        list.refresh("k").await;
        list.refresh("k").await;

        assert_eq!(list.row_count(), 1);
        assert_eq!(list.row(0).unwrap().id, "c9");
    }

    #[tokio::test]
    async fn overlapping_refreshes_apply_in_completion_order() {
        let harness = Harness::new();
        harness.database.push_conversations(Ok(three()));
        harness
            .database
            .push_conversations(Ok(vec![conversation("c9", "Eve", "eve-example-com")]));
        let mut list = controller(&harness);

        let first = list.refresh_request("k");
        let second = list.refresh_request("k");
        let first_result = first.await;
        let second_result = second.await;

        // The first-issued call completes last.
        list.apply_refresh(second_result);
        list.apply_refresh(first_result);
        assert_eq!(list.row_count(), 3);
    }

    #[test]
    fn out_of_bounds_access_is_an_error() {
        let harness = Harness::new();
        let mut list = controller(&harness);
        assert_eq!(
            list.row(0).unwrap_err(),
            RowError::OutOfBounds { index: 0, len: 0 }
        );
        assert!(list.select_row(0).is_err());
        assert!(list.delete_row(0).is_err());
        assert!(harness.navigator.routes().is_empty());
    }

    #[tokio::test]
    async fn delete_removes_exactly_one_row_and_shifts_the_rest() {
        let harness = Harness::new();
        harness.database.push_conversations(Ok(three()));
        let mut list = controller(&harness);
        list.refresh("k").await;

        let remote = list.delete_row(1).unwrap();

        assert_eq!(list.row_count(), 2);
        assert_eq!(list.row(0).unwrap().id, "c1");
        assert_eq!(list.row(1).unwrap().id, "c3");
        assert!(harness.database.deleted.lock().unwrap().is_empty());

        assert!(remote.await);
        assert_eq!(*harness.database.deleted.lock().unwrap(), vec!["c2".to_string()]);
    }

    #[tokio::test]
    async fn failed_remote_delete_is_not_rolled_back() {
        let harness = Harness::new();
        harness.database.push_conversations(Ok(three()));
        *harness.database.delete_result.lock().unwrap() = false;
        let mut list = controller(&harness);
        list.refresh("k").await;

        let remote = list.delete_row(0).unwrap();
        assert!(!remote.await);
        assert_eq!(list.row_count(), 2);
        assert_eq!(list.row(0).unwrap().id, "c2");
    }

    #[tokio::test]
    async fn load_two_then_delete_first() {
        let harness = Harness::new();
        harness.database.push_conversations(Ok(vec![
            conversation("c1", "Bob", "bob-example-com"),
            conversation("c2", "Carol", "carol-example-com"),
        ]));
        let mut list = controller(&harness);
        list.refresh("k").await;
        let previous_second = list.row(1).unwrap().clone();

        list.delete_row(0).unwrap().await;

        assert_eq!(list.row_count(), 1);
        assert_eq!(list.row(0).unwrap(), &previous_second);
    }

    #[tokio::test]
    async fn deleting_the_last_row_shows_empty_state() {
        let harness = Harness::new();
        harness
            .database
            .push_conversations(Ok(vec![conversation("c1", "Bob", "bob-example-com")]));
        let mut list = controller(&harness);
        list.refresh("k").await;
        list.delete_row(0).unwrap().await;
        assert_eq!(list.visibility(), Visibility::Empty);
    }

    #[tokio::test]
    async fn selecting_a_row_opens_its_chat() {
        let harness = Harness::new();
        harness.database.push_conversations(Ok(three()));
        let mut list = controller(&harness);
        list.refresh("k").await;

        list.select_row(2).unwrap();

        assert_eq!(
            harness.navigator.routes(),
            vec![Route::Chat(ChatRoute {
                other_user_email: "dave-example-com".into(),
                id: Some("c3".into()),
                title: "Dave".into(),
                is_new_conversation: false,
            })]
        );
    }

    #[tokio::test]
    async fn compose_reuses_listed_conversation() {
        let harness = Harness::new();
        harness.database.push_conversations(Ok(three()));
        *harness.database.exists_result.lock().unwrap() = Ok("other".into());
        let mut list = controller(&harness);
        list.refresh("k").await;

        list.compose_new_conversation("Carol@Example.com", "Carol C.")
            .await;

        let routes = harness.navigator.routes();
        assert_eq!(
            routes,
            vec![Route::Chat(ChatRoute {
                other_user_email: "carol-example-com".into(),
                id: Some("c2".into()),
                title: "Carol".into(),
                is_new_conversation: false,
            })]
        );
        assert!(harness.database.exists_queries.lock().unwrap().is_empty());
        assert_eq!(list.row_count(), 3);
    }

    #[tokio::test]
    async fn compose_uses_backend_conversation_when_found() {
        let harness = Harness::new();
        *harness.database.exists_result.lock().unwrap() = Ok("c42".into());
        let list = controller(&harness);

        list.compose_new_conversation("erin@example.com", "Erin").await;

        assert_eq!(
            *harness.database.exists_queries.lock().unwrap(),
            vec!["erin-example-com".to_string()]
        );
        assert_eq!(
            harness.navigator.routes(),
            vec![Route::Chat(ChatRoute {
                other_user_email: "erin-example-com".into(),
                id: Some("c42".into()),
                title: "Erin".into(),
                is_new_conversation: false,
            })]
        );
    }

    #[tokio::test]
    async fn compose_starts_new_conversation_otherwise() {
        let harness = Harness::new();
        let list = controller(&harness);

        list.compose_new_conversation("frank@example.com", "Frank").await;

        assert_eq!(
            harness.navigator.routes(),
            vec![Route::Chat(ChatRoute {
                other_user_email: "frank-example-com".into(),
                id: None,
                title: "Frank".into(),
                is_new_conversation: true,
            })]
        );
        assert_eq!(list.row_count(), 0);
    }

    #[tokio::test]
    async fn session_refresh_uses_normalized_stored_email() {
        let harness =
            Harness::with_session(MemorySessionStore::with_values([(EMAIL_KEY, "Ada@Example.com")]));
        harness.database.push_conversations(Ok(three()));
        let mut list = controller(&harness);

        assert_eq!(list.refresh_for_session().await, Some(Visibility::Content));
        assert_eq!(
            *harness.database.fetched_keys.lock().unwrap(),
            vec!["ada-example-com".to_string()]
        );
    }

    #[tokio::test]
    async fn no_stored_email_means_no_fetch() {
        let harness = Harness::new();
        let mut list = controller(&harness);
        assert_eq!(list.refresh_for_session().await, None);
        assert!(harness.database.fetched_keys.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn session_events_refresh_and_clear() {
        let harness =
            Harness::with_session(MemorySessionStore::with_values([(EMAIL_KEY, "ada@example.com")]));
        harness.database.push_conversations(Ok(three()));
        let mut list = controller(&harness);

        let request = list
            .handle_session_event(&SessionEvent::SignedIn {
                email: "ada@example.com".into(),
            })
            .expect("refresh requested");
        let result = request.await;
        list.apply_refresh(result);
        assert_eq!(list.row_count(), 3);

        assert!(list.handle_session_event(&SessionEvent::SignedOut).is_none());
        assert_eq!(list.row_count(), 0);
        assert_eq!(list.visibility(), Visibility::Empty);
    }

    #[test]
    fn validate_auth_redirects_signed_out_users() {
        let harness = Harness::new();
        let list = controller(&harness);
        assert!(!list.validate_auth());
        assert_eq!(harness.navigator.routes(), vec![Route::SignIn]);

        *harness.auth.user.lock().unwrap() = Some(identity("ada@example.com"));
        assert!(list.validate_auth());
        assert_eq!(harness.navigator.routes().len(), 1);
    }
}
