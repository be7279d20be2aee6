use crate::api::models::ConversationId;

/// Parameters of a chat screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatRoute {
    pub other_user_email: String,
    /// `None` for a conversation that will be created with its first message.
    pub id: Option<ConversationId>,
    pub title: String,
    pub is_new_conversation: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    SignIn,
    SignUp,
    Chats,
    Profile,
    Chat(ChatRoute),
}

/// Opens screens on behalf of controllers. Implementations hand the route to
/// whatever owns the windows; controllers never touch widgets.
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: Route);
}

/// One tab's stack of pushed screens; the root is never popped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationStack {
    routes: Vec<Route>,
}

impl NavigationStack {
    pub fn new(root: Route) -> Self {
        Self { routes: vec![root] }
    }

    pub fn root(&self) -> &Route {
        &self.routes[0]
    }

    pub fn top(&self) -> &Route {
        &self.routes[self.routes.len() - 1]
    }

    pub fn depth(&self) -> usize {
        self.routes.len()
    }

    pub fn push(&mut self, route: Route) {
        self.routes.push(route);
    }

    pub fn pop(&mut self) -> Option<Route> {
        if self.routes.len() > 1 {
            self.routes.pop()
        } else {
            None
        }
    }

    pub fn pop_to_root(&mut self) {
        self.routes.truncate(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stack_keeps_its_root() {
        let mut stack = NavigationStack::new(Route::Chats);
        assert_eq!(stack.pop(), None);
        stack.push(Route::Profile);
        stack.push(Route::SignIn);
        assert_eq!(stack.top(), &Route::SignIn);
        assert_eq!(stack.pop(), Some(Route::SignIn));
        stack.pop_to_root();
        assert_eq!(stack.depth(), 1);
        assert_eq!(stack.root(), &Route::Chats);
    }
}
