use lightbox_input::Action;
use lightbox_render::RenderInfo;
use lightbox_tools::FrameStats;

const FOV_RANGE: std::ops::RangeInclusive<f32> = 20.0..=110.0;

/// Edits made in the parameter panel during one UI pass.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PanelChanges {
    pub fov_degrees: Option<f32>,
    pub show_helpers: Option<bool>,
    pub refresh_shadows: bool,
}

impl PanelChanges {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// What the panel shows but does not edit.
pub struct PanelView<'a> {
    pub stats: &'a FrameStats,
    pub info: RenderInfo,
    pub shadow_resolution: Option<u32>,
}

/// Stats overlay and parameter panel state.
pub struct DebugUi {
    pub show_stats: bool,
    pub show_panel: bool,
    fov_degrees: f32,
    show_helpers: bool,
    pending: PanelChanges,
}

impl DebugUi {
    pub fn new(fov_degrees: f32, show_helpers: bool) -> Self {
        Self {
            show_stats: true,
            show_panel: true,
            fov_degrees,
            show_helpers,
            pending: PanelChanges::default(),
        }
    }

    /// Handle a non-camera action. Returns `false` if it isn't a UI action.
    pub fn handle_action(&mut self, action: &Action) -> bool {
        match action {
            Action::ToggleStats => self.show_stats = !self.show_stats,
            Action::TogglePanel => self.show_panel = !self.show_panel,
            Action::RefreshShadows => self.pending.refresh_shadows = true,
            _ => return false,
        }
        true
    }

    pub fn take_changes(&mut self) -> PanelChanges {
        std::mem::take(&mut self.pending)
    }

    pub fn draw(&mut self, ctx: &egui::Context, view: &PanelView<'_>) {
        if self.show_stats {
            draw_stats(ctx, view.stats);
        }
        if self.show_panel {
            self.draw_panel(ctx, view);
        }
    }

    fn draw_panel(&mut self, ctx: &egui::Context, view: &PanelView<'_>) {
        egui::Window::new("Parameters")
            .default_pos([12.0, 110.0])
            .resizable(false)
            .show(ctx, |ui| {
                ui.heading("Camera");
                let fov = ui.add(
                    egui::Slider::new(&mut self.fov_degrees, FOV_RANGE)
                        .text("FOV")
                        .suffix("°"),
                );
                if fov.changed() {
                    self.pending.fov_degrees = Some(self.fov_degrees);
                }

                ui.separator();
                ui.heading("Shadows");
                match view.shadow_resolution {
                    Some(res) => ui.label(format!("Map: {res}x{res}")),
                    None => ui.label("Map: off"),
                };
                if ui
                    .checkbox(&mut self.show_helpers, "Show shadow camera")
                    .changed()
                {
                    self.pending.show_helpers = Some(self.show_helpers);
                }
                if ui.button("Refresh shadows").clicked() {
                    self.pending.refresh_shadows = true;
                }

                ui.separator();
                ui.heading("Render info");
                ui.label(format!("Draw calls: {}", view.info.draw_calls));
                ui.label(format!("Triangles: {}", view.info.triangles));

                ui.separator();
                ui.small("F1: Panel | F2: Stats | R: Refresh shadows");
                ui.small("LMB: Orbit | RMB: Pan | Wheel: Zoom");
            });
    }
}

fn draw_stats(ctx: &egui::Context, stats: &FrameStats) {
    egui::Area::new(egui::Id::new("stats"))
        .anchor(egui::Align2::LEFT_TOP, [8.0, 8.0])
        .interactable(false)
        .show(ctx, |ui| {
            egui::Frame::popup(ui.style()).show(ui, |ui| {
                ui.monospace(format!("{:>5.1} FPS", stats.fps()));
                if let Some((lo, hi)) = stats.fps_range() {
                    ui.small(format!("({lo:.0}-{hi:.0})"));
                }
                ui.monospace(format!("{:>5.1} ms", stats.frame_ms()));
                sparkline(ui, stats);
            });
        });
}

/// Frame-time history as a polyline, scaled to its own peak.
fn sparkline(ui: &mut egui::Ui, stats: &FrameStats) {
    let (rect, _) = ui.allocate_exact_size(egui::vec2(90.0, 30.0), egui::Sense::hover());
    let history: Vec<f32> = stats.history().collect();
    if history.len() < 2 {
        return;
    }
    let peak = history.iter().copied().fold(1.0_f32, f32::max);
    let step = rect.width() / (history.len() - 1) as f32;
    let points = history
        .iter()
        .enumerate()
        .map(|(i, ms)| egui::pos2(rect.left() + i as f32 * step, rect.bottom() - rect.height() * ms / peak))
        .collect();
    ui.painter().add(egui::Shape::line(
        points,
        egui::Stroke::new(1.0, egui::Color32::LIGHT_GREEN),
    ));
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn ui_actions_toggle_and_queue() {
        let mut ui = DebugUi::new(55.0, true);
        assert!(ui.handle_action(&Action::ToggleStats));
        assert!(!ui.show_stats);
        assert!(ui.handle_action(&Action::TogglePanel));
        assert!(!ui.show_panel);
        assert!(ui.handle_action(&Action::RefreshShadows));
        assert!(!ui.handle_action(&Action::Zoom(1.0)));

        let changes = ui.take_changes();
        assert!(changes.refresh_shadows);
        assert!(ui.take_changes().is_empty());
    }

    #[test]
    fn draws_headless_without_edits() {
        let mut stats = FrameStats::new();
        for _ in 0..70 {
            stats.record(Duration::from_millis(16));
        }
        let mut ui = DebugUi::new(55.0, true);
        let ctx = egui::Context::default();
        let view = PanelView {
            stats: &stats,
            info: RenderInfo {
                draw_calls: 3,
                triangles: 14,
            },
            shadow_resolution: Some(1024),
        };
        let _ = ctx.run(egui::RawInput::default(), |ctx| ui.draw(ctx, &view));
        assert!(ui.take_changes().is_empty());
    }
}
