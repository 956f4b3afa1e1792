#![allow(dead_code)] // API surface kept for upcoming formats and view modes

mod app;
mod cli;
mod gpu;
mod io;
mod layout;
pub mod logger;
mod swizzle;
mod texture;
mod zoom;

use clap::Parser;
use eframe::egui;

use app::ViewerApp;

fn main() -> Result<(), eframe::Error> {
    let args = cli::CliArgs::parse();

    // -- Headless mode -----------------------------------------------------
    if args.info {
        std::process::exit(cli::run_info(&args));
    }

    // -- GUI mode ----------------------------------------------------------

    // Initialize session log (overwrites previous session log)
    logger::init();

    let options = eframe::NativeOptions {
        renderer: eframe::Renderer::Glow,
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 720.0])
            .with_title("Texture Viewer"),
        ..Default::default()
    };

    let path = args.path;
    eframe::run_native(
        "mipview",
        options,
        Box::new(move |cc| Box::new(ViewerApp::new(cc, path))),
    )
}
