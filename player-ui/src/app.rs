// player-ui/src/app.rs
//
// The eframe::App implementation: playlist panel (rfd file picker), video
// canvas (the EguiPresenter's texture), and a transport bar. Keyboard
// shortcuts are polled once per frame and pushed into the shared event queue
// that `EguiPresenter::poll_events` drains inside `Player::tick()`.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use eframe::egui;
use player_core::config::LoopMode;
use player_core::{MediaSource, PlayerConfig};
use player_media::presenter::PresenterEvent;
use player_media::{Player, TickOutcome};

use crate::presenter::{EguiPresenter, EventQueue};
use crate::theme;

pub struct PlayerApp {
    player: Player<EguiPresenter>,
    events: EventQueue,
    loop_mode: LoopMode,
    status: String,
}

impl PlayerApp {
    pub fn new(ctx: &egui::Context) -> Self {
        theme::configure_style(ctx);
        let events: EventQueue = Rc::new(RefCell::new(VecDeque::new()));
        let presenter = EguiPresenter::new(ctx.clone(), Rc::clone(&events));
        let mut player = Player::new(presenter);
        player.init(PlayerConfig::default());
        Self {
            player,
            events,
            loop_mode: LoopMode::NoLoop,
            status: String::from("no media loaded"),
        }
    }

    fn apply_loop_mode(&mut self) {
        let (list_loop, single_loop) = match self.loop_mode {
            LoopMode::NoLoop => (false, false),
            LoopMode::LoopList => (true, false),
            LoopMode::LoopSingle => (false, true),
            LoopMode::LoopBoth => (true, true),
        };
        let playlist = self.player.playlist_mut();
        playlist.set_list_loop(list_loop);
        playlist.set_single_loop(single_loop);
    }

    fn add_files(&mut self) {
        if let Some(paths) = rfd::FileDialog::new()
            .add_filter("media", &["mp4", "mkv", "mov", "avi", "webm", "mp3", "flac", "wav", "ogg"])
            .pick_files()
        {
            for path in paths {
                self.player.playlist_mut().add(MediaSource::file(path.to_string_lossy().into_owned()));
            }
        }
    }

    fn play_current(&mut self) {
        let Some(source) = self.player.playlist_mut().current().cloned() else {
            self.status = "playlist is empty".into();
            return;
        };
        if self.player.open(&source) {
            self.player.play();
            self.status = format!("playing {}", source.url);
        } else {
            self.status = format!("failed to open {}", source.url);
        }
    }

    fn poll_keyboard(&self, ctx: &egui::Context) {
        let mut q = self.events.borrow_mut();
        ctx.input(|i| {
            if i.key_pressed(egui::Key::Escape) {
                q.push_back(PresenterEvent::QuitOrEsc);
            }
            if i.key_pressed(egui::Key::Space) {
                q.push_back(PresenterEvent::TogglePause);
            }
            if i.key_pressed(egui::Key::ArrowLeft) {
                q.push_back(PresenterEvent::SeekBack);
            }
            if i.key_pressed(egui::Key::ArrowRight) {
                q.push_back(PresenterEvent::SeekForward);
            }
            if i.key_pressed(egui::Key::Num4) {
                q.push_back(PresenterEvent::PlayPrev);
            }
            if i.key_pressed(egui::Key::Num6) {
                q.push_back(PresenterEvent::PlayNext);
            }
            if i.key_pressed(egui::Key::ArrowUp) {
                q.push_back(PresenterEvent::VolumeUp);
            }
            if i.key_pressed(egui::Key::ArrowDown) {
                q.push_back(PresenterEvent::VolumeDown);
            }
            if i.key_pressed(egui::Key::M) {
                q.push_back(PresenterEvent::ToggleMute);
            }
        });
    }

    fn transport_bar(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            if ui.button("Open…").clicked() {
                self.add_files();
                if self.player.state() == player_core::PlayerState::None
                    || self.player.state() == player_core::PlayerState::Ready
                {
                    self.play_current();
                }
            }
            let playing = self.player.state() == player_core::PlayerState::Playing;
            if ui.button(if playing { "Pause" } else { "Play" }).clicked() {
                if playing {
                    self.player.pause();
                } else if self.player.state() == player_core::PlayerState::Paused {
                    self.player.replay();
                } else {
                    self.play_current();
                }
            }
            if ui.button("⏮").clicked() {
                self.player.play_prev();
            }
            if ui.button("⏭").clicked() {
                self.player.play_next();
            }
            if ui.button("Stop").clicked() {
                self.player.close();
                self.status = "stopped".into();
            }

            ui.separator();
            let mut volume = self.player.volume();
            if ui.add(egui::Slider::new(&mut volume, 0.0..=2.0).text("vol")).changed() {
                self.player.set_volume(volume);
            }
            let mut muted = self.player.is_muted();
            if ui.checkbox(&mut muted, "mute").changed() {
                self.player.set_muted(muted);
            }

            ui.separator();
            let prev_mode = self.loop_mode;
            egui::ComboBox::from_label("loop")
                .selected_text(format!("{:?}", self.loop_mode))
                .show_ui(ui, |ui| {
                    ui.selectable_value(&mut self.loop_mode, LoopMode::NoLoop, "off");
                    ui.selectable_value(&mut self.loop_mode, LoopMode::LoopList, "list");
                    ui.selectable_value(&mut self.loop_mode, LoopMode::LoopSingle, "single");
                    ui.selectable_value(&mut self.loop_mode, LoopMode::LoopBoth, "both");
                });
            if prev_mode != self.loop_mode {
                self.apply_loop_mode();
            }
        });

        ui.horizontal(|ui| {
            let total = self.player.get_total_time().max(0.0);
            let mut pos = self.player.get_current_time().clamp(0.0, total.max(0.001));
            ui.label(format!(
                "{} / {}",
                player_core::helpers::time::format_duration(pos),
                player_core::helpers::time::format_duration(total),
            ));
            if ui
                .add(egui::Slider::new(&mut pos, 0.0..=total.max(0.001)).show_value(false))
                .changed()
            {
                self.player.seek(pos);
            }
        });
    }

    fn playlist_panel(&mut self, ui: &mut egui::Ui) {
        let current = self.player.playlist_mut().current_index();
        let size = self.player.playlist_mut().size();
        let mut jump_to: Option<usize> = None;
        egui::ScrollArea::vertical().max_height(140.0).show(ui, |ui| {
            for idx in 0..size {
                let label = self.playlist_entry_label(idx);
                let selected = current == Some(idx);
                if ui.selectable_label(selected, label).double_clicked() {
                    jump_to = Some(idx);
                }
            }
        });
        if let Some(idx) = jump_to {
            if self.player.playlist_mut().skip_to_index(idx) {
                self.play_current();
            }
        }
    }

    fn playlist_entry_label(&self, idx: usize) -> String {
        match self.player.playlist().source_at(idx) {
            Some(source) => {
                let name = std::path::Path::new(&source.url)
                    .file_name()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_else(|| source.url.clone());
                format!("{}. {name}", idx + 1)
            }
            None => format!("{}", idx + 1),
        }
    }

    fn handle_outcome(&mut self, outcome: TickOutcome) {
        match outcome {
            TickOutcome::PlaylistAdvance => {
                let direction = self.player.pending_playlist_direction();
                self.player.advance_playlist(direction);
            }
            TickOutcome::Finished => {
                self.status = "finished".into();
                if !self.player.auto_read_next_media() {
                    return;
                }
                self.player.close();
                if matches!(self.loop_mode, LoopMode::LoopSingle) {
                    self.play_current();
                } else {
                    self.player.playlist_mut().next();
                    self.play_current();
                }
            }
            TickOutcome::Presented | TickOutcome::Idle => {}
        }
    }
}

impl eframe::App for PlayerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_keyboard(ctx);
        let outcome = self.player.tick();
        self.handle_outcome(outcome);

        egui::TopBottomPanel::top("transport").show(ctx, |ui| {
            self.transport_bar(ui);
        });
        egui::SidePanel::left("playlist").resizable(true).default_width(160.0).show(ctx, |ui| {
            ui.label("Playlist");
            self.playlist_panel(ui);
        });
        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            ui.label(&self.status);
        });
        egui::CentralPanel::default().show(ctx, |ui| {
            let (outer_rect, _) =
                ui.allocate_exact_size(ui.available_size(), egui::Sense::hover());
            let painter = ui.painter();
            painter.rect_filled(outer_rect, 0.0, theme::BG);

            if let Some(texture) = self.presenter_texture() {
                let size = texture.size_vec2();
                let ratio = (size.x / size.y).max(0.001);
                let (w, h) = if outer_rect.width() / ratio <= outer_rect.height() {
                    (outer_rect.width(), outer_rect.width() / ratio)
                } else {
                    (outer_rect.height() * ratio, outer_rect.height())
                };
                let canvas =
                    egui::Rect::from_center_size(outer_rect.center(), egui::vec2(w, h));
                painter.image(
                    texture.id(),
                    canvas,
                    egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                    egui::Color32::WHITE,
                );
            } else {
                painter.text(
                    outer_rect.center(),
                    egui::Align2::CENTER_CENTER,
                    "no video",
                    egui::FontId::proportional(16.0),
                    theme::MUTED_TEXT,
                );
            }
        });

        ctx.request_repaint();
    }
}

impl PlayerApp {
    fn presenter_texture(&self) -> Option<egui::TextureHandle> {
        self.player.presenter().texture().cloned()
    }
}
