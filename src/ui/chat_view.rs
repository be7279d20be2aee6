use gtk4 as gtk;
use gtk4::prelude::*;

use talksy::controller::ChatRoute;
use talksy::utils::short_type_name;

/// Right-hand pane of the chats tab. Shows which conversation is open;
/// message exchange happens elsewhere.
pub struct ChatView {
    root: gtk::Box,
    title: gtk::Label,
    status: gtk::Label,
}

impl ChatView {
    pub fn new() -> Self {
        let root = gtk::Box::new(gtk::Orientation::Vertical, 6);
        root.set_widget_name(short_type_name::<Self>());
        root.set_margin_top(8);
        root.set_margin_bottom(8);
        root.set_margin_start(8);
        root.set_margin_end(8);
        root.set_hexpand(true);

        let title = gtk::Label::new(Some("No conversation selected"));
        title.add_css_class("title-2");
        title.set_halign(gtk::Align::Start);
        root.append(&title);

        let status = gtk::Label::new(Some("Pick a chat on the left or start a new one."));
        status.add_css_class("dim-label");
        status.set_halign(gtk::Align::Start);
        root.append(&status);

        let scroller = gtk::ScrolledWindow::builder()
            .vexpand(true)
            .hexpand(true)
            .build();
        let placeholder = gtk::Label::new(Some("Messages will appear here."));
        placeholder.add_css_class("dim-label");
        scroller.set_child(Some(&placeholder));
        root.append(&scroller);

        Self {
            root,
            title,
            status,
        }
    }

    pub fn widget(&self) -> gtk::Widget {
        self.root.clone().upcast()
    }

    pub fn open(&self, route: &ChatRoute) {
        log::debug!("Opening chat with {}", route.other_user_email);
        self.title.set_label(&route.title);
        let status = match (&route.id, route.is_new_conversation) {
            (Some(id), false) => format!("{} · conversation {}", route.other_user_email, id),
            _ => format!("{} · new conversation", route.other_user_email),
        };
        self.status.set_label(&status);
    }

    pub fn reset(&self) {
        self.title.set_label("No conversation selected");
        self.status
            .set_label("Pick a chat on the left or start a new one.");
    }
}
