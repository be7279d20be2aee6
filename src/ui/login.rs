use std::rc::Rc;

use adw::Application;
use adw::prelude::*;
use gtk4 as gtk;

use super::{ChannelNavigator, ChannelPresenter, Prompt, present_alert, run_async_to_main};
use talksy::app::Services;
use talksy::controller::{Route, SignInController, SignUpController, SignUpForm};

const SIGN_IN_PAGE: &str = "sign-in";
const SIGN_UP_PAGE: &str = "sign-up";

fn form_box() -> gtk::Box {
    let root = gtk::Box::new(gtk::Orientation::Vertical, 12);
    root.set_margin_top(24);
    root.set_margin_bottom(24);
    root.set_margin_start(24);
    root.set_margin_end(24);
    root
}

fn heading(text: &str) -> gtk::Label {
    let title = gtk::Label::new(Some(text));
    title.add_css_class("title-2");
    title.set_halign(gtk::Align::Start);
    title
}

fn entry(placeholder: &str) -> gtk::Entry {
    let entry = gtk::Entry::new();
    entry.set_placeholder_text(Some(placeholder));
    entry.set_hexpand(true);
    entry
}

fn password_entry() -> gtk::PasswordEntry {
    let entry = gtk::PasswordEntry::new();
    entry.set_placeholder_text(Some("Password"));
    entry.set_show_peek_icon(true);
    entry.set_hexpand(true);
    entry
}

/// Reads the picked profile picture. An unreadable file just means no
/// picture.
fn read_picture(path: &str) -> Option<Vec<u8>> {
    let path = path.trim();
    if path.is_empty() {
        return None;
    }
    match std::fs::read(path) {
        Ok(data) => Some(data),
        Err(e) => {
            log::warn!("Ignoring profile picture {}: {}", path, e);
            None
        }
    }
}

pub fn show_login_window(app: &Application, services: &Services) {
    let window = adw::ApplicationWindow::builder()
        .application(app)
        .title("Talksy")
        .default_width(420)
        .default_height(420)
        .resizable(false)
        .build();

    let (navigator, routes) = ChannelNavigator::new();
    let (presenter, prompts) = ChannelPresenter::new();
    let sign_in = Rc::new(SignInController::new(
        services,
        navigator.clone(),
        presenter.clone(),
    ));
    let sign_up = Rc::new(SignUpController::new(services, navigator, presenter));

    let stack = gtk::Stack::new();
    stack.set_transition_type(gtk::StackTransitionType::SlideLeftRight);

    // Sign in
    let sign_in_page = form_box();
    sign_in_page.append(&heading("Log In"));
    let email_entry = entry("Email Address...");
    let pass_entry = password_entry();
    sign_in_page.append(&email_entry);
    sign_in_page.append(&pass_entry);
    let status = gtk::Label::new(None);
    status.add_css_class("dim-label");
    status.set_halign(gtk::Align::Start);
    sign_in_page.append(&status);
    let buttons = gtk::Box::new(gtk::Orientation::Horizontal, 6);
    buttons.set_halign(gtk::Align::End);
    let register_btn = gtk::Button::with_label("Create Account");
    register_btn.add_css_class("flat");
    let login_btn = gtk::Button::with_label("Log In");
    login_btn.add_css_class("suggested-action");
    buttons.append(&register_btn);
    buttons.append(&login_btn);
    sign_in_page.append(&buttons);
    stack.add_named(&sign_in_page, Some(SIGN_IN_PAGE));

    // Sign up
    let sign_up_page = form_box();
    sign_up_page.append(&heading("Create Account"));
    let first_entry = entry("First Name...");
    let last_entry = entry("Last Name...");
    let new_email_entry = entry("Email Address...");
    let new_pass_entry = password_entry();
    let picture_entry = entry("Profile picture file (optional)");
    for field in [&first_entry, &last_entry, &new_email_entry] {
        sign_up_page.append(field);
    }
    sign_up_page.append(&new_pass_entry);
    sign_up_page.append(&picture_entry);
    let sign_up_buttons = gtk::Box::new(gtk::Orientation::Horizontal, 6);
    sign_up_buttons.set_halign(gtk::Align::End);
    let back_btn = gtk::Button::with_label("Back");
    back_btn.add_css_class("flat");
    let create_btn = gtk::Button::with_label("Register");
    create_btn.add_css_class("suggested-action");
    sign_up_buttons.append(&back_btn);
    sign_up_buttons.append(&create_btn);
    sign_up_page.append(&sign_up_buttons);
    stack.add_named(&sign_up_page, Some(SIGN_UP_PAGE));
    stack.set_visible_child_name(SIGN_IN_PAGE);

    let container = gtk::Box::new(gtk::Orientation::Vertical, 0);
    let header = adw::HeaderBar::new();
    header.set_title_widget(Some(&gtk::Label::new(Some("Talksy"))));
    container.append(&header);
    container.append(&stack);
    window.set_content(Some(&container));

    {
        let app = app.clone();
        let window = window.clone();
        let stack = stack.clone();
        let services = services.clone();
        routes.attach(None, move |route| {
            match route {
                Route::SignIn => stack.set_visible_child_name(SIGN_IN_PAGE),
                Route::SignUp => stack.set_visible_child_name(SIGN_UP_PAGE),
                Route::Chats | Route::Profile => {
                    crate::ui::main_window::show_main_window(&app, &services);
                    window.close();
                    return glib::ControlFlow::Break;
                }
                Route::Chat(_) => log::debug!("Ignoring chat route before sign-in"),
            }
            glib::ControlFlow::Continue
        });
    }
    {
        let window = window.clone();
        prompts.attach(None, move |prompt| {
            match prompt {
                Prompt::Alert(alert) => present_alert(&window, &alert),
                Prompt::Sheet(_) => log::debug!("No action sheets on the login window"),
            }
            glib::ControlFlow::Continue
        });
    }

    let on_sign_in: Rc<dyn Fn()> = {
        let sign_in = sign_in.clone();
        let email_entry = email_entry.clone();
        let pass_entry = pass_entry.clone();
        let login_btn = login_btn.clone();
        Rc::new(move || {
            let email = email_entry.text().to_string();
            let Some(request) = sign_in.sign_in_request(&email, &pass_entry.text()) else {
                return;
            };
            status.set_label("Signing in…");
            login_btn.set_sensitive(false);

            let sign_in = sign_in.clone();
            let status = status.clone();
            let login_btn = login_btn.clone();
            let rx = run_async_to_main(request);
            rx.attach(None, move |result| {
                status.set_label("");
                login_btn.set_sensitive(true);
                sign_in.apply_sign_in(&email, result);
                glib::ControlFlow::Break
            });
        })
    };
    {
        let on_sign_in = on_sign_in.clone();
        login_btn.connect_clicked(move |_| (on_sign_in)());
    }
    {
        let on_sign_in = on_sign_in.clone();
        email_entry.connect_activate(move |_| (on_sign_in)());
    }
    pass_entry.connect_activate(move |_| (on_sign_in)());

    {
        let sign_in = sign_in.clone();
        register_btn.connect_clicked(move |_| sign_in.open_sign_up());
    }
    {
        let stack = stack.clone();
        back_btn.connect_clicked(move |_| stack.set_visible_child_name(SIGN_IN_PAGE));
    }

    create_btn.clone().connect_clicked(move |_| {
        let form = SignUpForm {
            first_name: first_entry.text().to_string(),
            last_name: last_entry.text().to_string(),
            email: new_email_entry.text().to_string(),
            password: new_pass_entry.text().to_string(),
            picture: read_picture(&picture_entry.text()),
        };
        let Some(request) = sign_up.sign_up_request(form) else {
            return;
        };
        create_btn.set_sensitive(false);

        let sign_up = sign_up.clone();
        let create_btn = create_btn.clone();
        let rx = run_async_to_main(request);
        rx.attach(None, move |outcome| {
            create_btn.set_sensitive(true);
            sign_up.apply_sign_up(&outcome);
            glib::ControlFlow::Break
        });
    });

    window.present();
}
