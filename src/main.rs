mod ui;

use adw::Application;
use adw::prelude::*;
use gtk4::glib::ExitCode;

use talksy::app::{AppConfig, Services};

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("talksy=info"))
        .init();

    let config = AppConfig::load();
    if !config.is_configured() {
        log::warn!("Backend is not configured; add talksy.toml or firebase.json to the config directory");
    }
    let services = Services::connect(config);

    let app = Application::builder()
        .application_id("com.example.Talksy")
        .build();
    app.connect_activate(move |app| ui::start(app, &services));
    app.run()
}
