use crate::perlin::cnoise;
use crate::settings::WaterSettings;
use glam::Vec3;
use tideview_common::Color;

/// CPU evaluation of the water shader.
///
/// Mirrors the vertex displacement and fragment coloring of
/// `WATER_SHADER` so the surface can be sampled without a GPU.
#[derive(Debug, Clone, Copy)]
pub struct WaveField {
    settings: WaterSettings,
}

impl WaveField {
    pub fn new(settings: &WaterSettings) -> Self {
        Self {
            settings: *settings,
        }
    }

    pub fn settings(&self) -> &WaterSettings {
        &self.settings
    }

    /// Height of the big sine swell alone.
    pub fn big_wave(&self, x: f32, z: f32, time: f32) -> f32 {
        let s = &self.settings;
        (x * s.big_waves_frequency.x + time * s.big_waves_speed_x).sin()
            * (z * s.big_waves_frequency.y + time * s.big_waves_speed_z).sin()
            * s.big_waves_elevation
    }

    /// Surface height at world `(x, z)` after `time` seconds.
    ///
    /// Each small-wave octave only ever lowers the surface. At most
    /// [`WaterSettings::MAX_SMALL_ITERATIONS`] octaves are summed.
    pub fn elevation(&self, x: f32, z: f32, time: f32) -> f32 {
        let s = &self.settings;
        let mut elevation = self.big_wave(x, z, time);
        for octave in 1..=s.octaves() {
            let i = octave as f32;
            let p = Vec3::new(
                x * s.small_waves_frequency * i,
                z * s.small_waves_frequency * i,
                time * s.small_waves_speed,
            );
            elevation -= (cnoise(p) * s.small_waves_elevation / i).abs();
        }
        elevation
    }

    /// Blend factor between depth and surface color for a given height.
    pub fn mix_strength(&self, elevation: f32) -> f32 {
        (elevation + self.settings.color_offset) * self.settings.color_multiplier
    }

    /// Fragment color for a given height, in sRGB, before the output clamp.
    pub fn color(&self, elevation: f32) -> Color {
        self.settings
            .depth_color
            .mix(self.settings.surface_color, self.mix_strength(elevation))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    fn calm() -> WaterSettings {
        WaterSettings {
            small_waves_elevation: 0.0,
            small_iterations: 0.0,
            ..WaterSettings::default()
        }
    }

    #[test]
    fn flat_at_origin_at_time_zero() {
        let field = WaveField::new(&calm());
        assert_eq!(field.elevation(0.0, 0.0, 0.0), 0.0);
    }

    #[test]
    fn big_wave_peaks_at_amplitude() {
        let settings = WaterSettings {
            big_waves_frequency: Vec2::ONE,
            ..calm()
        };
        let field = WaveField::new(&settings);
        let half_pi = std::f32::consts::FRAC_PI_2;
        let h = field.elevation(half_pi, half_pi, 0.0);
        assert!((h - settings.big_waves_elevation).abs() < 1e-6);
    }

    #[test]
    fn big_wave_bounded_by_elevation() {
        let field = WaveField::new(&calm());
        for i in 0..500 {
            let x = i as f32 * 0.05 - 12.5;
            let h = field.elevation(x, -x * 0.7, i as f32 * 0.016);
            assert!(h.abs() <= 0.2 + 1e-6);
        }
    }

    #[test]
    fn small_waves_only_lower_the_surface() {
        let settings = WaterSettings::default();
        let field = WaveField::new(&settings);
        for i in 0..200 {
            let x = i as f32 * 0.11 - 11.0;
            let z = (i as f32 * 0.37).sin() * 20.0;
            let t = i as f32 * 0.05;
            assert!(field.elevation(x, z, t) <= field.big_wave(x, z, t) + 1e-6);
        }
    }

    #[test]
    fn waves_move_with_time() {
        let field = WaveField::new(&WaterSettings::default());
        let a = field.elevation(0.3, 0.4, 0.0);
        let b = field.elevation(0.3, 0.4, 1.0);
        assert_ne!(a, b);
    }

    #[test]
    fn color_endpoints() {
        let settings = WaterSettings::default();
        let field = WaveField::new(&settings);
        // strength 0 -> depth color
        let deep = field.color(-settings.color_offset);
        assert_eq!(deep.to_hex(), settings.depth_color.to_hex());
        // strength 1 -> surface color
        let crest = field.color(1.0 / settings.color_multiplier - settings.color_offset);
        assert_eq!(crest.to_hex(), settings.surface_color.to_hex());
    }

    #[test]
    fn huge_iteration_count_sums_six_octaves() {
        let capped = WaterSettings {
            small_iterations: 6.0,
            ..WaterSettings::default()
        };
        let huge = WaterSettings {
            small_iterations: 20_000_000.0,
            ..WaterSettings::default()
        };
        let a = WaveField::new(&capped).elevation(0.3, 0.4, 1.0);
        let b = WaveField::new(&huge).elevation(0.3, 0.4, 1.0);
        assert_eq!(a, b);
    }
}
