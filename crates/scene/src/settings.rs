use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use tideview_common::Color;

/// Errors from validating water settings.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SettingsError {
    #[error("{0} is not a finite number")]
    NotFinite(&'static str),
    #[error("small wave iterations must be a non-negative whole number, got {0}")]
    Iterations(f32),
    #[error("{name} = {value} is outside {min}..={max}")]
    OutOfRange {
        name: &'static str,
        value: f32,
        min: f32,
        max: f32,
    },
}

/// Values fed to the water shader's uniforms.
///
/// `uTime` is not part of the settings; it comes from the scene clock.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaterSettings {
    pub big_waves_elevation: f32,
    /// x drives the wave along world X, y along world Z.
    pub big_waves_frequency: Vec2,
    pub big_waves_speed_x: f32,
    pub big_waves_speed_z: f32,
    pub small_waves_elevation: f32,
    pub small_waves_frequency: f32,
    pub small_waves_speed: f32,
    /// Number of noise octaves. Stored as a float to match the uniform.
    pub small_iterations: f32,
    pub depth_color: Color,
    pub surface_color: Color,
    pub color_offset: f32,
    pub color_multiplier: f32,
}

impl Default for WaterSettings {
    fn default() -> Self {
        Self {
            big_waves_elevation: 0.2,
            big_waves_frequency: Vec2::new(4.0, 1.5),
            big_waves_speed_x: 0.75,
            big_waves_speed_z: 0.75,
            small_waves_elevation: 0.15,
            small_waves_frequency: 3.0,
            small_waves_speed: 0.2,
            small_iterations: 4.0,
            depth_color: Color::new(0.0, 69.0 / 255.0, 110.0 / 255.0),
            surface_color: Color::new(124.0 / 255.0, 124.0 / 255.0, 190.0 / 255.0),
            color_offset: 0.08,
            color_multiplier: 5.0,
        }
    }
}

impl WaterSettings {
    /// Largest octave count the wave loops will run.
    pub const MAX_SMALL_ITERATIONS: u32 = 6;

    /// Check that every value can be handed to the shader and lies in the
    /// range the panel offers for it.
    pub fn validate(&self) -> Result<(), SettingsError> {
        for param in WaterParam::ALL {
            let value = param.value(self);
            if !value.is_finite() {
                return Err(SettingsError::NotFinite(param.label()));
            }
        }
        let iterations = self.small_iterations;
        if iterations < 0.0 || iterations.fract() != 0.0 {
            return Err(SettingsError::Iterations(iterations));
        }
        for param in WaterParam::ALL {
            let value = param.value(self);
            let range = param.range();
            if !range.contains(&value) {
                return Err(SettingsError::OutOfRange {
                    name: param.label(),
                    value,
                    min: *range.start(),
                    max: *range.end(),
                });
            }
        }
        Ok(())
    }

    /// Number of noise octaves the wave loops run, whatever the stored value.
    pub fn octaves(&self) -> u32 {
        let iterations = self.small_iterations;
        if iterations.is_nan() || iterations < 1.0 {
            0
        } else {
            (iterations.floor() as u32).min(Self::MAX_SMALL_ITERATIONS)
        }
    }

    /// Clamp every scalar into its panel range and snap stepped values.
    pub fn clamp_to_ranges(&mut self) {
        for param in WaterParam::ALL {
            let range = param.range();
            let value = param.value_mut(self);
            let clamped = if value.is_finite() {
                value.clamp(*range.start(), *range.end())
            } else {
                param.default_value()
            };
            *value = if param.step() >= 1.0 {
                clamped.round()
            } else {
                clamped
            };
        }
    }
}

/// One scalar knob of [`WaterSettings`], with the range and step the
/// debug panel exposes for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WaterParam {
    BigWavesElevation,
    BigWavesFrequencyX,
    BigWavesFrequencyZ,
    BigWavesSpeedX,
    BigWavesSpeedZ,
    SmallWavesElevation,
    SmallWavesSpeed,
    SmallWavesFrequency,
    SmallIterations,
    ColorOffset,
    ColorMultiplier,
}

impl WaterParam {
    /// Sliders of the "Wave Controls" folder, in display order.
    pub const WAVE_CONTROLS: [WaterParam; 9] = [
        WaterParam::BigWavesElevation,
        WaterParam::BigWavesFrequencyX,
        WaterParam::BigWavesFrequencyZ,
        WaterParam::BigWavesSpeedX,
        WaterParam::BigWavesSpeedZ,
        WaterParam::SmallWavesElevation,
        WaterParam::SmallWavesSpeed,
        WaterParam::SmallWavesFrequency,
        WaterParam::SmallIterations,
    ];

    /// Sliders of the "Color Controls" folder, shown after the color pickers.
    pub const COLOR_CONTROLS: [WaterParam; 2] =
        [WaterParam::ColorOffset, WaterParam::ColorMultiplier];

    pub const ALL: [WaterParam; 11] = [
        WaterParam::BigWavesElevation,
        WaterParam::BigWavesFrequencyX,
        WaterParam::BigWavesFrequencyZ,
        WaterParam::BigWavesSpeedX,
        WaterParam::BigWavesSpeedZ,
        WaterParam::SmallWavesElevation,
        WaterParam::SmallWavesSpeed,
        WaterParam::SmallWavesFrequency,
        WaterParam::SmallIterations,
        WaterParam::ColorOffset,
        WaterParam::ColorMultiplier,
    ];

    pub fn label(self) -> &'static str {
        match self {
            WaterParam::BigWavesElevation => "BigWavesElevation",
            WaterParam::BigWavesFrequencyX => "BigWavesFrequencyX",
            WaterParam::BigWavesFrequencyZ => "BigWavesFrequencyZ",
            WaterParam::BigWavesSpeedX => "uBigWavesSpeedX",
            WaterParam::BigWavesSpeedZ => "uBigWavesSpeedZ",
            WaterParam::SmallWavesElevation => "uSmallWavesElevation",
            WaterParam::SmallWavesSpeed => "uSmallWavesSpeed",
            WaterParam::SmallWavesFrequency => "uSmallWavesFrequency",
            WaterParam::SmallIterations => "uSmallIterations",
            WaterParam::ColorOffset => "uColorOffset",
            WaterParam::ColorMultiplier => "uColorMultiplier",
        }
    }

    pub fn range(self) -> RangeInclusive<f32> {
        match self {
            WaterParam::BigWavesElevation => 0.0..=1.0,
            WaterParam::BigWavesFrequencyX | WaterParam::BigWavesFrequencyZ => 0.0..=10.0,
            WaterParam::BigWavesSpeedX | WaterParam::BigWavesSpeedZ => 0.0..=4.0,
            WaterParam::SmallWavesElevation | WaterParam::SmallWavesSpeed => 0.0..=2.0,
            WaterParam::SmallWavesFrequency => 0.0..=6.0,
            WaterParam::SmallIterations => 0.0..=WaterSettings::MAX_SMALL_ITERATIONS as f32,
            WaterParam::ColorOffset => 0.0..=1.0,
            WaterParam::ColorMultiplier => 0.0..=10.0,
        }
    }

    pub fn step(self) -> f32 {
        match self {
            WaterParam::SmallIterations => 1.0,
            _ => 0.001,
        }
    }

    pub fn value(self, settings: &WaterSettings) -> f32 {
        let mut copy = *settings;
        *self.value_mut(&mut copy)
    }

    pub fn value_mut(self, settings: &mut WaterSettings) -> &mut f32 {
        match self {
            WaterParam::BigWavesElevation => &mut settings.big_waves_elevation,
            WaterParam::BigWavesFrequencyX => &mut settings.big_waves_frequency.x,
            WaterParam::BigWavesFrequencyZ => &mut settings.big_waves_frequency.y,
            WaterParam::BigWavesSpeedX => &mut settings.big_waves_speed_x,
            WaterParam::BigWavesSpeedZ => &mut settings.big_waves_speed_z,
            WaterParam::SmallWavesElevation => &mut settings.small_waves_elevation,
            WaterParam::SmallWavesSpeed => &mut settings.small_waves_speed,
            WaterParam::SmallWavesFrequency => &mut settings.small_waves_frequency,
            WaterParam::SmallIterations => &mut settings.small_iterations,
            WaterParam::ColorOffset => &mut settings.color_offset,
            WaterParam::ColorMultiplier => &mut settings.color_multiplier,
        }
    }

    pub fn default_value(self) -> f32 {
        self.value(&WaterSettings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_scene() {
        let s = WaterSettings::default();
        assert_eq!(s.big_waves_frequency, Vec2::new(4.0, 1.5));
        assert_eq!(s.small_iterations, 4.0);
        assert_eq!(s.depth_color.to_hex(), "#00456e");
        assert_eq!(s.surface_color.to_hex(), "#7c7cbe");
        assert!(s.validate().is_ok());
    }

    #[test]
    fn defaults_lie_within_panel_ranges() {
        let s = WaterSettings::default();
        for param in WaterParam::ALL {
            assert!(
                param.range().contains(&param.value(&s)),
                "{} out of range",
                param.label()
            );
        }
    }

    #[test]
    fn folders_cover_every_param_once() {
        let mut seen: Vec<WaterParam> = WaterParam::WAVE_CONTROLS.to_vec();
        seen.extend(WaterParam::COLOR_CONTROLS);
        assert_eq!(seen.len(), WaterParam::ALL.len());
        for param in WaterParam::ALL {
            assert_eq!(seen.iter().filter(|p| **p == param).count(), 1);
        }
    }

    #[test]
    fn value_mut_writes_the_right_field() {
        let mut s = WaterSettings::default();
        *WaterParam::BigWavesFrequencyZ.value_mut(&mut s) = 7.0;
        assert_eq!(s.big_waves_frequency.y, 7.0);
        assert_eq!(s.big_waves_frequency.x, 4.0);
    }

    #[test]
    fn validate_rejects_fractional_iterations() {
        let s = WaterSettings {
            small_iterations: 2.5,
            ..WaterSettings::default()
        };
        assert_eq!(s.validate(), Err(SettingsError::Iterations(2.5)));
    }

    #[test]
    fn validate_rejects_nan() {
        let s = WaterSettings {
            color_offset: f32::NAN,
            ..WaterSettings::default()
        };
        assert_eq!(
            s.validate(),
            Err(SettingsError::NotFinite("uColorOffset"))
        );
    }

    #[test]
    fn validate_rejects_values_beyond_the_sliders() {
        let s = WaterSettings {
            small_iterations: 20_000_000.0,
            ..WaterSettings::default()
        };
        assert_eq!(
            s.validate(),
            Err(SettingsError::OutOfRange {
                name: "uSmallIterations",
                value: 20_000_000.0,
                min: 0.0,
                max: 6.0,
            })
        );

        let s = WaterSettings {
            big_waves_speed_z: -1.0,
            ..WaterSettings::default()
        };
        assert!(matches!(
            s.validate(),
            Err(SettingsError::OutOfRange {
                name: "uBigWavesSpeedZ",
                ..
            })
        ));
    }

    #[test]
    fn octaves_are_capped() {
        let mut s = WaterSettings::default();
        assert_eq!(s.octaves(), 4);
        s.small_iterations = 20_000_000.0;
        assert_eq!(s.octaves(), WaterSettings::MAX_SMALL_ITERATIONS);
        s.small_iterations = f32::INFINITY;
        assert_eq!(s.octaves(), WaterSettings::MAX_SMALL_ITERATIONS);
        s.small_iterations = -3.0;
        assert_eq!(s.octaves(), 0);
        s.small_iterations = f32::NAN;
        assert_eq!(s.octaves(), 0);
    }

    #[test]
    fn clamp_snaps_and_bounds() {
        let mut s = WaterSettings {
            big_waves_elevation: 3.0,
            small_iterations: 4.6,
            color_multiplier: f32::INFINITY,
            ..WaterSettings::default()
        };
        s.clamp_to_ranges();
        assert_eq!(s.big_waves_elevation, 1.0);
        assert_eq!(s.small_iterations, 5.0);
        assert_eq!(s.color_multiplier, 5.0);
        assert!(s.validate().is_ok());
    }
}
