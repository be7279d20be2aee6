pub mod chat_view;
pub mod login;
pub mod main_window;
pub mod profile;
pub mod sidebar;

use std::cell::Cell;
use std::sync::{Arc, Mutex};

use adw::Application;
use glib::MainContext;
use gtk4 as gtk;
use gtk4::prelude::*;
use tokio::sync::broadcast::error::RecvError;

use talksy::api::{SessionEvent, SessionEvents};
use talksy::app::Services;
use talksy::controller::{ActionSheet, ActionStyle, Alert, AlertPresenter, Navigator, Route};
use talksy::utils::spawn_async;

pub fn glib_channel<T: Send + 'static>() -> (glib::Sender<T>, glib::Receiver<T>) {
    MainContext::channel(glib::Priority::default())
}

/// Runs `fut` on the shared tokio runtime and hands its output to the GTK
/// main loop.
pub fn run_async_to_main<T, Fut>(fut: Fut) -> glib::Receiver<T>
where
    T: Send + 'static,
    Fut: std::future::Future<Output = T> + Send + 'static,
{
    let (tx, rx) = glib_channel::<T>();
    spawn_async(async move {
        let res = fut.await;
        let _ = tx.send(res);
    });
    rx
}

/// Opens the login window, or the main window when a session survived the
/// last run.
pub fn start(app: &Application, services: &Services) {
    match services.auth.current_user() {
        Some(user) => {
            log::info!("Resuming session for {}", user.email);
            main_window::show_main_window(app, services);
        }
        None => login::show_login_window(app, services),
    }
}

/// Forwards routes from controllers (any thread) to the main loop.
pub struct ChannelNavigator {
    tx: Mutex<glib::Sender<Route>>,
}

impl ChannelNavigator {
    pub fn new() -> (Arc<Self>, glib::Receiver<Route>) {
        let (tx, rx) = glib_channel();
        (Arc::new(Self { tx: Mutex::new(tx) }), rx)
    }
}

impl Navigator for ChannelNavigator {
    fn navigate(&self, route: Route) {
        let Ok(tx) = self.tx.lock() else {
            return;
        };
        if tx.send(route).is_err() {
            log::debug!("Route dropped; window is gone");
        }
    }
}

pub enum Prompt {
    Alert(Alert),
    Sheet(ActionSheet),
}

pub struct ChannelPresenter {
    tx: Mutex<glib::Sender<Prompt>>,
}

impl ChannelPresenter {
    pub fn new() -> (Arc<Self>, glib::Receiver<Prompt>) {
        let (tx, rx) = glib_channel();
        (Arc::new(Self { tx: Mutex::new(tx) }), rx)
    }

    fn send(&self, prompt: Prompt) {
        let Ok(tx) = self.tx.lock() else {
            return;
        };
        if tx.send(prompt).is_err() {
            log::debug!("Prompt dropped; window is gone");
        }
    }
}

impl AlertPresenter for ChannelPresenter {
    fn show_alert(&self, alert: Alert) {
        self.send(Prompt::Alert(alert));
    }

    fn show_action_sheet(&self, sheet: ActionSheet) {
        self.send(Prompt::Sheet(sheet));
    }
}

fn dialog_body(dialog: &gtk::Dialog, message: Option<&str>) {
    let content = dialog.content_area();
    content.set_spacing(12);
    content.set_margin_top(12);
    content.set_margin_bottom(12);
    content.set_margin_start(12);
    content.set_margin_end(12);
    if let Some(message) = message {
        let label = gtk::Label::new(Some(message));
        label.set_wrap(true);
        label.set_halign(gtk::Align::Start);
        content.append(&label);
    }
}

pub fn present_alert(parent: &impl IsA<gtk::Window>, alert: &Alert) {
    let dialog = gtk::Dialog::builder()
        .title(alert.title.as_deref().unwrap_or_default())
        .transient_for(parent)
        .modal(true)
        .build();
    dialog_body(&dialog, alert.message.as_deref());
    let _ = dialog.add_button(&alert.button_title, gtk::ResponseType::Ok);
    dialog.set_default_response(gtk::ResponseType::Ok);
    dialog.connect_response(|dlg, _| dlg.close());
    dialog.present();
}

/// Shows `sheet` as a modal dialog. `on_choice` gets the style of the picked
/// action; closing the dialog counts as cancel.
pub fn present_action_sheet(
    parent: &impl IsA<gtk::Window>,
    sheet: &ActionSheet,
    on_choice: impl Fn(ActionStyle) + 'static,
) {
    let dialog = gtk::Dialog::builder()
        .title(sheet.title.as_deref().unwrap_or_default())
        .transient_for(parent)
        .modal(true)
        .build();
    dialog_body(&dialog, sheet.message.as_deref());

    let styles: Vec<ActionStyle> = sheet.actions.iter().map(|a| a.style).collect();
    for (index, action) in sheet.actions.iter().enumerate() {
        let response = match action.style {
            ActionStyle::Cancel => gtk::ResponseType::Cancel,
            _ => gtk::ResponseType::Other(index as u16),
        };
        let button = dialog.add_button(&action.title, response);
        if action.style == ActionStyle::Destructive {
            button.add_css_class("destructive-action");
        }
    }

    // Closing the dialog emits a second response; only the first counts.
    let answered = Cell::new(false);
    dialog.connect_response(move |dlg, resp| {
        if answered.replace(true) {
            return;
        }
        let style = match resp {
            gtk::ResponseType::Other(index) => styles
                .get(usize::from(index))
                .copied()
                .unwrap_or(ActionStyle::Cancel),
            _ => ActionStyle::Cancel,
        };
        on_choice(style);
        dlg.close();
    });
    dialog.present();
}

/// Relays session events from the broadcast channel to the main loop.
pub fn forward_session_events(events: &SessionEvents) -> glib::Receiver<SessionEvent> {
    let mut rx = events.subscribe();
    let (tx, out) = glib_channel();
    spawn_async(async move {
        loop {
            match rx.recv().await {
                Ok(event) => {
                    if tx.send(event).is_err() {
                        break;
                    }
                }
                Err(RecvError::Lagged(missed)) => {
                    log::warn!("Missed {} session events", missed)
                }
                Err(RecvError::Closed) => break,
            }
        }
    });
    out
}
