// player-ui/src/theme.rs
//
// Palette and egui::Style setup, adapted from the teacher's editor theme to a
// single-surface media player: one dark background, one accent for the
// transport controls, no panel-separator palette since there's only ever one
// panel.

use egui::{Color32, Context, Rounding, Stroke, Visuals};

pub const BG: Color32 = Color32::from_rgb(18, 18, 20);
pub const PANEL: Color32 = Color32::from_rgb(28, 28, 32);
pub const ACCENT: Color32 = Color32::from_rgb(90, 140, 255);
pub const TEXT: Color32 = Color32::from_rgb(225, 225, 230);
pub const MUTED_TEXT: Color32 = Color32::from_rgb(140, 140, 148);

pub fn configure_style(ctx: &Context) {
    let mut visuals = Visuals::dark();
    visuals.override_text_color = Some(TEXT);
    visuals.window_fill = BG;
    visuals.panel_fill = PANEL;
    visuals.widgets.noninteractive.bg_fill = PANEL;
    visuals.widgets.inactive.bg_fill = PANEL;
    visuals.widgets.hovered.bg_fill = ACCENT.gamma_multiply(0.35);
    visuals.widgets.active.bg_fill = ACCENT.gamma_multiply(0.55);
    visuals.selection.bg_fill = ACCENT.gamma_multiply(0.6);
    visuals.selection.stroke = Stroke::new(1.0, ACCENT);
    visuals.window_rounding = Rounding::same(6.0);
    visuals.widgets.noninteractive.rounding = Rounding::same(4.0);
    visuals.widgets.inactive.rounding = Rounding::same(4.0);
    visuals.widgets.hovered.rounding = Rounding::same(4.0);
    visuals.widgets.active.rounding = Rounding::same(4.0);

    let mut style = (*ctx.style()).clone();
    style.visuals = visuals;
    style.spacing.item_spacing = egui::vec2(8.0, 6.0);
    style.spacing.button_padding = egui::vec2(10.0, 6.0);
    ctx.set_style(style);
}
