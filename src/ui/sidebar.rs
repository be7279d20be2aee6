use std::rc::Rc;

use gtk4 as gtk;
use gtk4::prelude::*;

use talksy::controller::Visibility;
use talksy::presenter::ChatRowPresentation;
use talksy::utils::short_type_name;

pub type RowAction = Rc<dyn Fn(usize)>;

/// Conversation list with its empty-state label. Rows are rebuilt from
/// presentations on every render.
pub struct Sidebar {
    root: gtk::Box,
    list: gtk::ListBox,
    scroller: gtk::ScrolledWindow,
    empty: gtk::Label,
    on_delete: RowAction,
}

impl Sidebar {
    pub fn new(on_select: RowAction, on_delete: RowAction) -> Self {
        let root = gtk::Box::new(gtk::Orientation::Vertical, 6);
        root.set_widget_name(short_type_name::<Self>());
        root.set_margin_top(8);
        root.set_margin_bottom(8);
        root.set_margin_start(8);
        root.set_margin_end(8);
        root.set_width_request(280);

        let title = gtk::Label::new(Some("Conversations"));
        title.add_css_class("heading");
        title.set_halign(gtk::Align::Start);
        root.append(&title);

        let list = gtk::ListBox::new();
        list.add_css_class("navigation-sidebar");
        list.connect_row_activated(move |_, row| {
            if let Ok(index) = usize::try_from(row.index()) {
                on_select(index);
            }
        });
        let scroller = gtk::ScrolledWindow::builder()
            .vexpand(true)
            .child(&list)
            .build();
        root.append(&scroller);

        let empty = gtk::Label::new(Some("No Conversations!"));
        empty.add_css_class("dim-label");
        empty.set_vexpand(true);
        empty.set_visible(false);
        root.append(&empty);

        Self {
            root,
            list,
            scroller,
            empty,
            on_delete,
        }
    }

    pub fn widget(&self) -> gtk::Widget {
        self.root.clone().upcast()
    }

    pub fn render(&self, rows: &[ChatRowPresentation], visibility: Visibility) {
        while let Some(child) = self.list.first_child() {
            self.list.remove(&child);
        }
        for (index, presentation) in rows.iter().enumerate() {
            self.list.append(&self.row(index, presentation));
        }
        self.scroller.set_visible(visibility.content_visible());
        self.empty.set_visible(visibility.empty_visible());
    }

    fn row(&self, index: usize, presentation: &ChatRowPresentation) -> gtk::ListBoxRow {
        let row = gtk::ListBoxRow::new();

        let line = gtk::Box::new(gtk::Orientation::Horizontal, 8);
        line.set_margin_top(6);
        line.set_margin_bottom(6);
        line.set_margin_start(6);
        line.set_margin_end(6);

        let avatar = adw::Avatar::new(36, Some(&presentation.title), true);
        line.append(&avatar);

        let text = gtk::Box::new(gtk::Orientation::Vertical, 2);
        text.set_hexpand(true);
        let header = gtk::Box::new(gtk::Orientation::Horizontal, 6);
        let name = gtk::Label::new(Some(&presentation.title));
        name.set_halign(gtk::Align::Start);
        name.set_hexpand(true);
        if presentation.emphasized {
            name.add_css_class("heading");
        }
        let date = gtk::Label::new(Some(&presentation.timestamp));
        date.add_css_class("caption");
        date.add_css_class("dim-label");
        header.append(&name);
        header.append(&date);
        text.append(&header);

        let preview = gtk::Label::new(Some(&presentation.subtitle));
        preview.set_halign(gtk::Align::Start);
        preview.set_ellipsize(gtk::pango::EllipsizeMode::End);
        if !presentation.emphasized {
            preview.add_css_class("dim-label");
        }
        text.append(&preview);
        line.append(&text);

        let delete = gtk::Button::from_icon_name("user-trash-symbolic");
        delete.add_css_class("flat");
        delete.set_tooltip_text(Some("Delete"));
        delete.set_valign(gtk::Align::Center);
        let on_delete = self.on_delete.clone();
        delete.connect_clicked(move |_| on_delete(index));
        line.append(&delete);

        row.set_child(Some(&line));
        row
    }
}
