use super::navigation::{NavigationStack, Route};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Chats,
    Profile,
}

impl Tab {
    pub const ALL: [Tab; 2] = [Tab::Chats, Tab::Profile];

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn index(self) -> usize {
        match self {
            Tab::Chats => 0,
            Tab::Profile => 1,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Tab::Chats => "Chats",
            Tab::Profile => "Settings",
        }
    }

    pub fn root(self) -> Route {
        match self {
            Tab::Chats => Route::Chats,
            Tab::Profile => Route::Profile,
        }
    }
}

type FlowCallback = Box<dyn FnMut(&mut NavigationStack)>;

/// Owns one navigation stack per tab and tells the owning flow when its
/// tab is selected.
pub struct TabCoordinator {
    chats: NavigationStack,
    profile: NavigationStack,
    selected: Tab,
    on_chats_flow_select: Option<FlowCallback>,
    on_profile_flow_select: Option<FlowCallback>,
}

impl Default for TabCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl TabCoordinator {
    pub fn new() -> Self {
        Self {
            chats: NavigationStack::new(Tab::Chats.root()),
            profile: NavigationStack::new(Tab::Profile.root()),
            selected: Tab::Chats,
            on_chats_flow_select: None,
            on_profile_flow_select: None,
        }
    }

    pub fn on_chats_flow_select(&mut self, callback: impl FnMut(&mut NavigationStack) + 'static) {
        self.on_chats_flow_select = Some(Box::new(callback));
    }

    pub fn on_profile_flow_select(
        &mut self,
        callback: impl FnMut(&mut NavigationStack) + 'static,
    ) {
        self.on_profile_flow_select = Some(Box::new(callback));
    }

    /// Starts on the chats tab.
    pub fn load(&mut self) {
        self.selected = Tab::Chats;
        self.notify(Tab::Chats);
    }

    /// Unknown indices are ignored.
    pub fn select_tab(&mut self, index: usize) -> Option<Tab> {
        let tab = Tab::from_index(index)?;
        self.selected = tab;
        self.notify(tab);
        Some(tab)
    }

    fn notify(&mut self, tab: Tab) {
        let (callback, stack) = match tab {
            Tab::Chats => (&mut self.on_chats_flow_select, &mut self.chats),
            Tab::Profile => (&mut self.on_profile_flow_select, &mut self.profile),
        };
        match callback {
            Some(callback) => callback(stack),
            None => log::debug!("No owner for the {} tab", tab.title()),
        }
    }

    pub fn selected(&self) -> Tab {
        self.selected
    }

    pub fn stack(&self, tab: Tab) -> &NavigationStack {
        match tab {
            Tab::Chats => &self.chats,
            Tab::Profile => &self.profile,
        }
    }

    pub fn stack_mut(&mut self, tab: Tab) -> &mut NavigationStack {
        match tab {
            Tab::Chats => &mut self.chats,
            Tab::Profile => &mut self.profile,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    fn recording() -> (TabCoordinator, Rc<RefCell<Vec<(Tab, Route)>>>) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut tabs = TabCoordinator::new();
        let chats = seen.clone();
        tabs.on_chats_flow_select(move |stack| {
            chats.borrow_mut().push((Tab::Chats, stack.root().clone()))
        });
        let profile = seen.clone();
        tabs.on_profile_flow_select(move |stack| {
            profile
                .borrow_mut()
                .push((Tab::Profile, stack.root().clone()))
        });
        (tabs, seen)
    }

    #[test]
    fn tabs_have_titles_and_roots() {
        assert_eq!(Tab::Chats.title(), "Chats");
        assert_eq!(Tab::Profile.title(), "Settings");
        let tabs = TabCoordinator::new();
        assert_eq!(tabs.stack(Tab::Chats).root(), &Route::Chats);
        assert_eq!(tabs.stack(Tab::Profile).root(), &Route::Profile);
    }

    #[test]
    fn load_notifies_chats_owner_once() {
        let (mut tabs, seen) = recording();
        tabs.load();
        assert_eq!(*seen.borrow(), vec![(Tab::Chats, Route::Chats)]);
        assert_eq!(tabs.selected(), Tab::Chats);
    }

    #[test]
    fn select_tab_dispatches_to_matching_owner() {
        let (mut tabs, seen) = recording();
        assert_eq!(tabs.select_tab(1), Some(Tab::Profile));
        assert_eq!(tabs.select_tab(0), Some(Tab::Chats));
        assert_eq!(
            *seen.borrow(),
            vec![(Tab::Profile, Route::Profile), (Tab::Chats, Route::Chats)]
        );
    }

    #[test]
    fn unknown_index_is_ignored() {
        let (mut tabs, seen) = recording();
        tabs.select_tab(1);
        assert_eq!(tabs.select_tab(2), None);
        assert_eq!(seen.borrow().len(), 1);
        assert_eq!(tabs.selected(), Tab::Profile);
    }

    #[test]
    fn missing_owner_is_tolerated() {
        let mut tabs = TabCoordinator::new();
        tabs.load();
        assert_eq!(tabs.select_tab(1), Some(Tab::Profile));
    }

    #[test]
    fn owner_can_push_onto_its_stack() {
        let mut tabs = TabCoordinator::new();
        tabs.on_profile_flow_select(|stack| stack.push(Route::SignIn));
        tabs.select_tab(1);
        assert_eq!(tabs.stack(Tab::Profile).depth(), 2);
        tabs.stack_mut(Tab::Profile).pop_to_root();
        assert_eq!(tabs.stack(Tab::Profile).top(), &Route::Profile);
    }
}
