use glam::Vec3;
use tideview_common::Color;
use tideview_scene::{WaterParam, WaterSettings};

/// Read-only numbers shown at the bottom of the panel.
#[derive(Debug, Clone, Copy, Default)]
pub struct PanelStats {
    pub fps: f32,
    pub frame_ms: f32,
    pub camera_position: Vec3,
    pub camera_distance: f32,
    pub skybox_loaded: bool,
}

/// Debug panel bound to the water uniforms.
///
/// Two folders mirror the uniforms: "Wave Controls" with the swell and noise
/// sliders, "Color Controls" with the two color pickers and the blend sliders.
#[derive(Debug, Clone)]
pub struct TweakPanel {
    pub visible: bool,
    pub width: f32,
}

impl Default for TweakPanel {
    fn default() -> Self {
        Self {
            visible: true,
            width: 340.0,
        }
    }
}

impl TweakPanel {
    pub fn new(width: f32, visible: bool) -> Self {
        Self { visible, width }
    }

    pub fn toggle(&mut self) {
        self.visible = !self.visible;
        tracing::debug!(visible = self.visible, "debug panel toggled");
    }

    /// Draw the panel and write any edits straight into `settings`.
    /// Returns whether any value changed this frame.
    ///
    /// Every value is clamped into its slider range before returning.
    pub fn show(
        &mut self,
        ctx: &egui::Context,
        settings: &mut WaterSettings,
        stats: &PanelStats,
    ) -> bool {
        if !self.visible {
            return false;
        }
        let before = *settings;

        egui::Window::new("Debug")
            .default_width(self.width)
            .default_pos([8.0, 8.0])
            .resizable(true)
            .show(ctx, |ui| {
                egui::CollapsingHeader::new("Wave Controls")
                    .default_open(true)
                    .show(ui, |ui| sliders(ui, settings, &WaterParam::WAVE_CONTROLS));

                egui::CollapsingHeader::new("Color Controls")
                    .default_open(true)
                    .show(ui, |ui| {
                        color_picker(ui, "depthColor", &mut settings.depth_color);
                        color_picker(ui, "surfaceColor", &mut settings.surface_color);
                        sliders(ui, settings, &WaterParam::COLOR_CONTROLS);
                    });

                ui.separator();
                if ui.button("Reset defaults").clicked() {
                    reset_defaults(settings);
                }

                ui.separator();
                ui.label(format!("{:.0} fps ({:.2} ms)", stats.fps, stats.frame_ms));
                ui.label(format!(
                    "Camera: ({:.2}, {:.2}, {:.2})  dist {:.2}",
                    stats.camera_position.x,
                    stats.camera_position.y,
                    stats.camera_position.z,
                    stats.camera_distance
                ));
                if !stats.skybox_loaded {
                    ui.label("Skybox: not loaded");
                }
                ui.small("H: toggle panel | R: reset camera | LMB orbit, RMB pan, wheel zoom");
            });

        settings.clamp_to_ranges();
        *settings != before
    }
}

fn reset_defaults(settings: &mut WaterSettings) {
    *settings = WaterSettings::default();
    tracing::info!("water settings reset to defaults");
}

fn sliders(ui: &mut egui::Ui, settings: &mut WaterSettings, params: &[WaterParam]) {
    for &param in params {
        let slider = egui::Slider::new(param.value_mut(settings), param.range())
            .step_by(param.step() as f64)
            .text(param.label());
        ui.add(slider);
    }
}

/// Only writes back on an edit, so an untouched color keeps full precision.
fn color_picker(ui: &mut egui::Ui, label: &str, color: &mut Color) {
    let mut rgb = color.to_rgb8();
    let changed = ui
        .horizontal(|ui| {
            let changed = ui.color_edit_button_srgb(&mut rgb).changed();
            ui.label(label);
            ui.weak(color.to_hex());
            changed
        })
        .inner;
    if changed {
        *color = Color::from_rgb8(rgb);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::{Event, Modifiers, PointerButton, Pos2, Rect, Shape, Vec2};

    /// A panel driven frame by frame through one egui context.
    struct Ui {
        ctx: egui::Context,
        panel: TweakPanel,
        settings: WaterSettings,
    }

    impl Ui {
        fn new(settings: WaterSettings) -> Self {
            Self {
                ctx: egui::Context::default(),
                panel: TweakPanel::default(),
                settings,
            }
        }

        fn frame(&mut self, events: Vec<Event>) -> (egui::FullOutput, bool) {
            let input = egui::RawInput {
                events,
                screen_rect: Some(Rect::from_min_size(Pos2::ZERO, Vec2::new(1280.0, 1024.0))),
                ..Default::default()
            };
            let mut changed = false;
            let output = self.ctx.run(input, |ctx| {
                changed = self.panel.show(ctx, &mut self.settings, &PanelStats::default());
            });
            (output, changed)
        }

        /// Run a few idle frames so the window is laid out and visible.
        fn settle(&mut self) -> egui::FullOutput {
            let mut output = self.frame(Vec::new()).0;
            for _ in 0..3 {
                output = self.frame(Vec::new()).0;
            }
            output
        }

        /// Press and release the primary button at `pos`.
        fn click(&mut self, pos: Pos2) -> bool {
            let button = |pressed| Event::PointerButton {
                pos,
                button: PointerButton::Primary,
                pressed,
                modifiers: Modifiers::NONE,
            };
            let (_, moved) = self.frame(vec![Event::PointerMoved(pos)]);
            let (_, pressed) = self.frame(vec![button(true)]);
            let (_, released) = self.frame(vec![button(false)]);
            moved || pressed || released
        }
    }

    fn find_text(shape: &Shape, text: &str) -> Option<Rect> {
        match shape {
            Shape::Text(t) if t.galley.text() == text => {
                Some(t.galley.rect.translate(t.pos.to_vec2()))
            }
            Shape::Vec(shapes) => shapes.iter().find_map(|s| find_text(s, text)),
            _ => None,
        }
    }

    /// Screen rect of the drawn text `text`.
    fn text_rect(output: &egui::FullOutput, text: &str) -> Rect {
        output
            .shapes
            .iter()
            .find_map(|clipped| find_text(&clipped.shape, text))
            .unwrap_or_else(|| panic!("{text:?} was not drawn"))
    }

    #[test]
    fn default_panel_matches_scene() {
        let panel = TweakPanel::default();
        assert!(panel.visible);
        assert_eq!(panel.width, 340.0);
    }

    #[test]
    fn idle_frames_change_nothing() {
        let mut ui = Ui::new(WaterSettings::default());
        for _ in 0..3 {
            let (_, changed) = ui.frame(Vec::new());
            assert!(!changed);
        }
        assert_eq!(ui.settings, WaterSettings::default());
    }

    #[test]
    fn hidden_panel_draws_nothing() {
        let mut ui = Ui::new(WaterSettings::default());
        ui.panel.toggle();
        assert!(!ui.panel.visible);
        let (output, changed) = ui.frame(Vec::new());
        assert!(output.shapes.is_empty());
        assert!(!changed);
    }

    #[test]
    fn folders_and_sliders_are_drawn() {
        let mut ui = Ui::new(WaterSettings::default());
        let output = ui.settle();
        for text in ["Debug", "Wave Controls", "Color Controls", "Reset defaults"] {
            text_rect(&output, text);
        }
        for param in WaterParam::ALL {
            text_rect(&output, param.label());
        }
    }

    #[test]
    fn clicking_reset_restores_defaults() {
        let mut ui = Ui::new(WaterSettings {
            color_multiplier: 9.0,
            small_iterations: 1.0,
            big_waves_elevation: 0.9,
            ..WaterSettings::default()
        });
        let output = ui.settle();
        let button = text_rect(&output, "Reset defaults");

        assert!(ui.click(button.center()));
        assert_eq!(ui.settings, WaterSettings::default());
    }

    #[test]
    fn dragging_the_iterations_slider_edits_settings() {
        let mut ui = Ui::new(WaterSettings::default());
        let output = ui.settle();
        // The rail sits left of the value box, which sits left of the label.
        let label = text_rect(&output, WaterParam::SmallIterations.label());
        let near_rail_start = Pos2::new(label.left() - 146.0, label.center().y);

        assert!(ui.click(near_rail_start));
        let iterations = ui.settings.small_iterations;
        assert!(iterations < 4.0, "iterations = {iterations}");
        assert_eq!(iterations.fract(), 0.0);
        assert!(ui.settings.validate().is_ok());
    }

    #[test]
    fn values_outside_slider_ranges_are_pulled_in() {
        let mut ui = Ui::new(WaterSettings {
            small_iterations: 20_000_000.0,
            color_offset: -3.0,
            ..WaterSettings::default()
        });
        let (_, changed) = ui.frame(Vec::new());
        assert!(changed);
        assert_eq!(ui.settings.small_iterations, 6.0);
        assert_eq!(ui.settings.color_offset, 0.0);
        assert!(ui.settings.validate().is_ok());
    }
}
