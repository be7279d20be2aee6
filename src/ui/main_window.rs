use std::cell::{Cell, RefCell};
use std::path::PathBuf;
use std::rc::{Rc, Weak};
use std::sync::Arc;

use adw::Application;
use adw::prelude::*;
use directories::ProjectDirs;
use gtk4 as gtk;
use url::Url;

use super::chat_view::ChatView;
use super::profile::ProfileView;
use super::sidebar::Sidebar;
use super::{
    ChannelNavigator, ChannelPresenter, Prompt, forward_session_events, present_action_sheet,
    present_alert, run_async_to_main,
};
use talksy::api::{Conversation, DbError, SessionEvent};
use talksy::app::Services;
use talksy::controller::{
    ActionStyle, BackendCall, ConversationListController, ProfileController, Route, Tab,
    TabCoordinator,
};
use talksy::presenter::{ChatRowPresentation, ProfileRowPresentation};
use talksy::storage::NAME_KEY;
use talksy::utils::spawn_async;

fn page_name(tab: Tab) -> &'static str {
    match tab {
        Tab::Chats => "chats",
        Tab::Profile => "settings",
    }
}

/// Fetches a profile picture into the cache directory, keyed by its
/// storage path.
async fn download_picture(url: Url, storage_path: String) -> Result<PathBuf, String> {
    let dirs = ProjectDirs::from("com", "example", "Talksy").ok_or("no cache directory")?;
    let path = dirs.cache_dir().join(storage_path);
    let bytes = reqwest::get(url)
        .await
        .and_then(|resp| resp.error_for_status())
        .map_err(|e| e.to_string())?
        .bytes()
        .await
        .map_err(|e| e.to_string())?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| e.to_string())?;
    }
    std::fs::write(&path, &bytes).map_err(|e| e.to_string())?;
    Ok(path)
}

struct MainWindow {
    app: Application,
    window: adw::ApplicationWindow,
    overlay: adw::ToastOverlay,
    services: Services,
    navigator: Arc<ChannelNavigator>,
    presenter: Arc<ChannelPresenter>,
    conversations: RefCell<ConversationListController>,
    profile: RefCell<ProfileController>,
    tabs: RefCell<TabCoordinator>,
    view_stack: adw::ViewStack,
    sidebar: Sidebar,
    chat: ChatView,
    profile_view: ProfileView,
    closed: Cell<bool>,
}

impl MainWindow {
    fn render_chats(&self) {
        let controller = self.conversations.borrow();
        let rows: Vec<ChatRowPresentation> = controller
            .conversations()
            .iter()
            .map(ChatRowPresentation::from)
            .collect();
        self.sidebar.render(&rows, controller.visibility());
    }

    fn refresh_chats(self: &Rc<Self>) {
        let Some(request) = self.conversations.borrow().refresh_for_session_request() else {
            log::debug!("No stored email; nothing to refresh");
            self.render_chats();
            return;
        };
        self.run_refresh(request);
    }

    fn run_refresh(self: &Rc<Self>, request: BackendCall<Result<Vec<Conversation>, DbError>>) {
        let this = self.clone();
        run_async_to_main(request).attach(None, move |result| {
            this.conversations.borrow_mut().apply_refresh(result);
            this.render_chats();
            glib::ControlFlow::Break
        });
    }

    fn select_chat(&self, index: usize) {
        if let Err(e) = self.conversations.borrow().select_row(index) {
            log::warn!("Ignoring selection: {}", e);
        }
    }

    fn delete_chat(&self, index: usize) {
        let removal = self.conversations.borrow_mut().delete_row(index);
        match removal {
            Ok(call) => spawn_async(async move {
                call.await;
            }),
            Err(e) => log::warn!("Ignoring delete: {}", e),
        }
        self.render_chats();
    }

    fn compose(self: &Rc<Self>, email: &str, name: &str) {
        let request = self.conversations.borrow().compose_request(email, name);
        let this = self.clone();
        run_async_to_main(request).attach(None, move |route| {
            this.conversations.borrow().apply_compose(route);
            glib::ControlFlow::Break
        });
    }

    fn render_profile(&self) {
        let rows: Vec<ProfileRowPresentation> = self
            .profile
            .borrow()
            .rows()
            .iter()
            .map(ProfileRowPresentation::from)
            .collect();
        let name = self.services.session.get(NAME_KEY);
        self.profile_view.render(name.as_deref(), &rows);
    }

    /// Rebuilds the settings rows from the session and fetches the header
    /// picture.
    fn reload_profile(self: &Rc<Self>) {
        *self.profile.borrow_mut() = ProfileController::load(
            &self.services,
            self.navigator.clone(),
            self.presenter.clone(),
        );
        self.render_profile();

        let profile = self.profile.borrow();
        let (Some(request), Some(storage_path)) =
            (profile.header_picture_request(), profile.profile_picture_path())
        else {
            return;
        };
        let this = self.clone();
        run_async_to_main(request).attach(None, move |result| {
            let url = this.profile.borrow_mut().apply_header_picture(result).cloned();
            if let Some(url) = url {
                let view = this.clone();
                run_async_to_main(download_picture(url, storage_path.clone())).attach(
                    None,
                    move |downloaded| {
                        match downloaded {
                            Ok(path) => view.profile_view.set_picture(&path),
                            Err(e) => log::warn!("Profile picture download failed: {}", e),
                        }
                        glib::ControlFlow::Break
                    },
                );
            }
            glib::ControlFlow::Break
        });
    }

    fn select_profile_row(&self, index: usize) {
        if let Err(e) = self.profile.borrow().select_row(index) {
            log::warn!("Ignoring selection: {}", e);
        }
    }

    fn answer_logout(self: &Rc<Self>, style: ActionStyle) {
        if style != ActionStyle::Destructive {
            self.profile.borrow().cancel_logout();
            return;
        }
        let Some(request) = self.profile.borrow().logout_request() else {
            return;
        };
        let this = self.clone();
        run_async_to_main(request).attach(None, move |result| {
            this.profile.borrow().apply_logout(result);
            glib::ControlFlow::Break
        });
    }

    fn handle_route(self: &Rc<Self>, route: Route) -> glib::ControlFlow {
        if self.closed.get() {
            return glib::ControlFlow::Break;
        }
        match route {
            Route::SignIn => {
                self.closed.set(true);
                crate::ui::login::show_login_window(&self.app, &self.services);
                self.window.close();
                return glib::ControlFlow::Break;
            }
            Route::SignUp => log::debug!("Sign-up is only reachable from the login window"),
            Route::Chats => self.view_stack.set_visible_child_name(page_name(Tab::Chats)),
            Route::Profile => self
                .view_stack
                .set_visible_child_name(page_name(Tab::Profile)),
            Route::Chat(chat) => {
                self.view_stack.set_visible_child_name(page_name(Tab::Chats));
                let mut tabs = self.tabs.borrow_mut();
                let stack = tabs.stack_mut(Tab::Chats);
                stack.pop_to_root();
                stack.push(Route::Chat(chat.clone()));
                self.chat.open(&chat);
            }
        }
        glib::ControlFlow::Continue
    }

    fn handle_session_event(self: &Rc<Self>, event: SessionEvent) -> glib::ControlFlow {
        if self.closed.get() {
            return glib::ControlFlow::Break;
        }
        let request = self.conversations.borrow_mut().handle_session_event(&event);
        match request {
            Some(request) => self.run_refresh(request),
            None => {
                self.chat.reset();
                self.render_chats();
            }
        }
        glib::ControlFlow::Continue
    }

    fn tab_selected(&self, name: Option<&str>) {
        let index = match name {
            Some(name) if name == page_name(Tab::Chats) => Tab::Chats.index(),
            Some(name) if name == page_name(Tab::Profile) => Tab::Profile.index(),
            _ => return,
        };
        self.tabs.borrow_mut().select_tab(index);
    }

    fn show_new_chat_dialog(self: &Rc<Self>) {
        let dialog = gtk::Dialog::builder()
            .title("New Chat")
            .transient_for(&self.window)
            .modal(true)
            .build();
        let content = dialog.content_area();
        content.set_spacing(12);
        content.set_margin_top(12);
        content.set_margin_bottom(12);
        content.set_margin_start(12);
        content.set_margin_end(12);

        let info = gtk::Label::new(Some("Who do you want to talk to?"));
        info.set_halign(gtk::Align::Start);
        content.append(&info);
        let email_entry = gtk::Entry::new();
        email_entry.set_placeholder_text(Some("Email address"));
        email_entry.set_hexpand(true);
        content.append(&email_entry);
        let name_entry = gtk::Entry::new();
        name_entry.set_placeholder_text(Some("Name"));
        name_entry.set_hexpand(true);
        content.append(&name_entry);

        let _ = dialog.add_button("Cancel", gtk::ResponseType::Cancel);
        let start_btn = dialog.add_button("Start", gtk::ResponseType::Ok);
        start_btn.add_css_class("suggested-action");
        dialog.set_default_response(gtk::ResponseType::Ok);

        let this = self.clone();
        dialog.connect_response(move |dlg, resp| {
            if resp == gtk::ResponseType::Ok {
                let email = email_entry.text().trim().to_string();
                if email.is_empty() {
                    this.overlay
                        .add_toast(adw::Toast::new("Please enter an email address."));
                    return;
                }
                let name = name_entry.text().trim().to_string();
                let name = if name.is_empty() { email.clone() } else { name };
                this.compose(&email, &name);
            }
            dlg.close();
        });
        dialog.present();
    }
}

pub fn show_main_window(app: &Application, services: &Services) {
    let window = adw::ApplicationWindow::builder()
        .application(app)
        .title("Talksy")
        .default_width(960)
        .default_height(640)
        .build();
    let overlay = adw::ToastOverlay::new();
    let view_stack = adw::ViewStack::new();

    let (navigator, routes) = ChannelNavigator::new();
    let (presenter, prompts) = ChannelPresenter::new();

    let this = Rc::new_cyclic(|weak: &Weak<MainWindow>| {
        let on_select = {
            let weak = weak.clone();
            Rc::new(move |index| {
                if let Some(this) = weak.upgrade() {
                    this.select_chat(index);
                }
            })
        };
        let on_delete = {
            let weak = weak.clone();
            Rc::new(move |index| {
                if let Some(this) = weak.upgrade() {
                    this.delete_chat(index);
                }
            })
        };
        let on_profile_select = {
            let weak = weak.clone();
            Rc::new(move |index| {
                if let Some(this) = weak.upgrade() {
                    this.select_profile_row(index);
                }
            })
        };

        let mut tabs = TabCoordinator::new();
        {
            let weak = weak.clone();
            tabs.on_chats_flow_select(move |_| {
                let Some(this) = weak.upgrade() else {
                    return;
                };
                if this.conversations.borrow().validate_auth() {
                    this.refresh_chats();
                }
            });
        }
        {
            let weak = weak.clone();
            tabs.on_profile_flow_select(move |stack| {
                stack.pop_to_root();
                if let Some(this) = weak.upgrade() {
                    this.reload_profile();
                }
            });
        }

        MainWindow {
            app: app.clone(),
            window: window.clone(),
            overlay: overlay.clone(),
            services: services.clone(),
            conversations: RefCell::new(ConversationListController::new(
                services,
                navigator.clone(),
            )),
            profile: RefCell::new(ProfileController::load(
                services,
                navigator.clone(),
                presenter.clone(),
            )),
            navigator: navigator.clone(),
            presenter: presenter.clone(),
            tabs: RefCell::new(tabs),
            view_stack: view_stack.clone(),
            sidebar: Sidebar::new(on_select, on_delete),
            chat: ChatView::new(),
            profile_view: ProfileView::new(on_profile_select),
            closed: Cell::new(false),
        }
    });

    let split = adw::Flap::builder()
        .reveal_flap(true)
        .locked(true)
        .modal(false)
        .build();
    split.set_flap(Some(&this.sidebar.widget()));
    split.set_content(Some(&this.chat.widget()));

    let chats_page = view_stack.add_titled(&split, Some(page_name(Tab::Chats)), Tab::Chats.title());
    chats_page.set_icon_name(Some("user-available-symbolic"));
    let settings_page = view_stack.add_titled(
        &this.profile_view.widget(),
        Some(page_name(Tab::Profile)),
        Tab::Profile.title(),
    );
    settings_page.set_icon_name(Some("emblem-system-symbolic"));
    overlay.set_child(Some(&view_stack));

    let container = gtk::Box::new(gtk::Orientation::Vertical, 0);
    let header = adw::HeaderBar::new();
    let switcher = adw::ViewSwitcher::builder()
        .stack(&view_stack)
        .policy(adw::ViewSwitcherPolicy::Wide)
        .build();
    header.set_title_widget(Some(&switcher));
    let new_chat_btn = gtk::Button::with_label("New Chat");
    new_chat_btn.add_css_class("suggested-action");
    header.pack_end(&new_chat_btn);
    container.append(&header);
    container.append(&overlay);
    window.set_content(Some(&container));

    {
        let weak = Rc::downgrade(&this);
        view_stack.connect_visible_child_name_notify(move |stack| {
            if let Some(this) = weak.upgrade() {
                this.tab_selected(stack.visible_child_name().as_deref());
            }
        });
    }
    {
        let weak = Rc::downgrade(&this);
        new_chat_btn.connect_clicked(move |_| {
            if let Some(this) = weak.upgrade() {
                this.show_new_chat_dialog();
            }
        });
    }
    {
        let this = this.clone();
        routes.attach(None, move |route| this.handle_route(route));
    }
    {
        let this = this.clone();
        prompts.attach(None, move |prompt| {
            if this.closed.get() {
                return glib::ControlFlow::Break;
            }
            match prompt {
                Prompt::Alert(alert) => present_alert(&this.window, &alert),
                Prompt::Sheet(sheet) => {
                    let weak = Rc::downgrade(&this);
                    present_action_sheet(&this.window, &sheet, move |style| {
                        if let Some(this) = weak.upgrade() {
                            this.answer_logout(style);
                        }
                    });
                }
            }
            glib::ControlFlow::Continue
        });
    }
    {
        let this = this.clone();
        forward_session_events(&services.events)
            .attach(None, move |event| this.handle_session_event(event));
    }
    {
        let this = this.clone();
        window.connect_close_request(move |_| {
            this.closed.set(true);
            gtk::glib::Propagation::Proceed
        });
    }

    window.present();
    this.render_chats();
    this.tabs.borrow_mut().load();
}
