// player-ui/src/main.rs
//
// Entry point: initializes the codec library once, sets mimalloc as the
// global allocator (the teacher's UI binary does both), and hands the app
// to eframe.

mod app;
mod presenter;
mod theme;

use app::PlayerApp;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

fn main() -> eframe::Result {
    ffmpeg_the_third::init().expect("FFmpeg init failed");

    let native_options = eframe::NativeOptions {
        centered: true,
        viewport: egui::ViewportBuilder::default()
            .with_title("player")
            .with_inner_size([1100.0, 680.0])
            .with_min_inner_size([480.0, 320.0]),
        ..Default::default()
    };

    eframe::run_native(
        "player",
        native_options,
        Box::new(|cc| {
            egui_extras::install_image_loaders(&cc.egui_ctx);
            Ok(Box::new(PlayerApp::new(&cc.egui_ctx)))
        }),
    )
}
