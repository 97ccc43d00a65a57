#![warn(clippy::all, rust_2018_idioms)]
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")] // hide console window on Windows in release

use drawing_app::{AppConfig, PaintApp};

fn main() -> eframe::Result {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = AppConfig::from_env().unwrap_or_else(|err| {
        log::error!("{}; falling back to the default config", err);
        AppConfig::default()
    });

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Drawing App")
            .with_inner_size([480.0, 800.0])
            .with_min_inner_size([320.0, 400.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Drawing App",
        native_options,
        Box::new(move |cc| {
            let app = PaintApp::new(cc, config)?;
            Ok(Box::new(app))
        }),
    )
}
