use std::path::Path;
use std::rc::Rc;

use gtk4 as gtk;
use gtk4::prelude::*;

use talksy::presenter::{ProfileRowPresentation, TextAlignment};
use talksy::utils::short_type_name;

/// Settings tab: avatar header over the profile rows.
pub struct ProfileView {
    root: gtk::Box,
    avatar: adw::Avatar,
    list: gtk::ListBox,
}

impl ProfileView {
    pub fn new(on_select: Rc<dyn Fn(usize)>) -> Self {
        let root = gtk::Box::new(gtk::Orientation::Vertical, 12);
        root.set_widget_name(short_type_name::<Self>());
        root.set_margin_top(24);
        root.set_margin_bottom(24);
        root.set_margin_start(24);
        root.set_margin_end(24);

        let avatar = adw::Avatar::new(96, None, true);
        avatar.set_halign(gtk::Align::Center);
        root.append(&avatar);

        let list = gtk::ListBox::new();
        list.add_css_class("boxed-list");
        list.set_selection_mode(gtk::SelectionMode::None);
        list.connect_row_activated(move |_, row| {
            if let Ok(index) = usize::try_from(row.index()) {
                on_select(index);
            }
        });
        root.append(&list);

        Self { root, avatar, list }
    }

    pub fn widget(&self) -> gtk::Widget {
        self.root.clone().upcast()
    }

    pub fn render(&self, display_name: Option<&str>, rows: &[ProfileRowPresentation]) {
        self.avatar.set_text(display_name);
        self.avatar.set_custom_image(None::<&gtk::gdk::Paintable>);

        while let Some(child) = self.list.first_child() {
            self.list.remove(&child);
        }
        for presentation in rows {
            let row = gtk::ListBoxRow::new();
            row.set_activatable(presentation.selectable);
            let label = gtk::Label::new(Some(&presentation.title));
            label.set_margin_top(12);
            label.set_margin_bottom(12);
            label.set_margin_start(12);
            label.set_margin_end(12);
            label.set_halign(match presentation.alignment {
                TextAlignment::Leading => gtk::Align::Start,
                TextAlignment::Center => gtk::Align::Center,
            });
            if presentation.destructive {
                label.add_css_class("error");
            }
            row.set_child(Some(&label));
            self.list.append(&row);
        }
    }

    /// Shows the downloaded picture at `path`; keeps the initials on failure.
    pub fn set_picture(&self, path: &Path) {
        let file = gtk::gio::File::for_path(path);
        match gtk::gdk::Texture::from_file(&file) {
            Ok(texture) => self.avatar.set_custom_image(Some(&texture)),
            Err(e) => log::warn!("Unreadable profile picture {}: {}", path.display(), e),
        }
    }
}
