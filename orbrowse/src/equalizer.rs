//! Equalizer settings
//!
//! Levels are in millibels, frequencies in milliHertz. The state is
//! persisted as a JSON document.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// A named set of band levels
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EqualizerPreset {
    pub name: String,
    pub band_levels: Vec<i32>,
}

/// Equalizer configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EqualizerState {
    pub enabled: bool,
    pub num_bands: usize,
    /// Inclusive (min, max) level in millibels
    pub band_level_range: (i32, i32),
    pub center_frequencies: Vec<u32>,
    pub band_levels: Vec<i32>,
    #[serde(default)]
    pub presets: Vec<EqualizerPreset>,
    #[serde(default)]
    pub current_preset: Option<usize>,
}

impl EqualizerState {
    /// All bands at 0 dB (clamped into the range), disabled
    pub fn flat(band_level_range: (i32, i32), center_frequencies: Vec<u32>) -> Self {
        let num_bands = center_frequencies.len();
        let (min, max) = band_level_range;
        let zero = 0i32.max(min).min(max);
        Self {
            enabled: false,
            num_bands,
            band_level_range,
            center_frequencies,
            band_levels: vec![zero; num_bands],
            presets: Vec::new(),
            current_preset: None,
        }
    }

    /// Add a preset, its levels are clamped into the range
    pub fn with_preset(mut self, name: impl Into<String>, band_levels: Vec<i32>) -> Result<Self> {
        if band_levels.len() != self.num_bands {
            return Err(Error::invalid_equalizer(format!(
                "preset has {} levels for {} bands",
                band_levels.len(),
                self.num_bands
            )));
        }
        let band_levels = band_levels.into_iter().map(|l| self.clamp(l)).collect();
        self.presets.push(EqualizerPreset {
            name: name.into(),
            band_levels,
        });
        Ok(self)
    }

    fn clamp(&self, level: i32) -> i32 {
        let (min, max) = self.band_level_range;
        level.max(min).min(max)
    }

    /// Set one band, clamping the level; returns the applied level
    ///
    /// A manual change leaves the current preset.
    pub fn set_band_level(&mut self, band: usize, level: i32) -> Result<i32> {
        if band >= self.num_bands {
            return Err(Error::invalid_equalizer(format!(
                "band {band} out of range (0..{})",
                self.num_bands
            )));
        }
        let level = self.clamp(level);
        self.band_levels[band] = level;
        self.current_preset = None;
        Ok(level)
    }

    /// Apply preset `index`
    pub fn use_preset(&mut self, index: usize) -> Result<()> {
        let preset = self.presets.get(index).ok_or_else(|| {
            Error::invalid_equalizer(format!(
                "preset {index} out of range (0..{})",
                self.presets.len()
            ))
        })?;
        self.band_levels = preset.band_levels.clone();
        self.current_preset = Some(index);
        Ok(())
    }

    /// Check the vectors are consistent with `num_bands` and the range
    pub fn validate(&self) -> Result<()> {
        let (min, max) = self.band_level_range;
        if min > max {
            return Err(Error::invalid_equalizer(format!(
                "empty level range ({min}, {max})"
            )));
        }
        if self.center_frequencies.len() != self.num_bands {
            return Err(Error::invalid_equalizer(format!(
                "{} center frequencies for {} bands",
                self.center_frequencies.len(),
                self.num_bands
            )));
        }
        if self.band_levels.len() != self.num_bands {
            return Err(Error::invalid_equalizer(format!(
                "{} band levels for {} bands",
                self.band_levels.len(),
                self.num_bands
            )));
        }
        if let Some(level) = self.band_levels.iter().find(|l| **l < min || **l > max) {
            return Err(Error::invalid_equalizer(format!(
                "level {level} outside ({min}, {max})"
            )));
        }
        if let Some(preset) = self.presets.iter().find(|p| p.band_levels.len() != self.num_bands) {
            return Err(Error::invalid_equalizer(format!(
                "preset '{}' has {} levels",
                preset.name,
                preset.band_levels.len()
            )));
        }
        if let Some(index) = self.current_preset {
            if index >= self.presets.len() {
                return Err(Error::invalid_equalizer(format!(
                    "current preset {index} does not exist"
                )));
            }
        }
        Ok(())
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse and validate a stored state
    pub fn from_json(json: &str) -> Result<Self> {
        let state: EqualizerState = serde_json::from_str(json)?;
        state.validate()?;
        Ok(state)
    }
}

#[cfg(feature = "orconfig")]
pub use config_ext::EqualizerConfigExt;

#[cfg(feature = "orconfig")]
mod config_ext {
    use super::EqualizerState;
    use anyhow::Result;
    use orconfig::Config;
    use serde_yaml::Value;

    /// Persistance de l'égaliseur sous `playback.equalizer`
    pub trait EqualizerConfigExt {
        /// État enregistré, `None` s'il est absent ou illisible
        fn get_equalizer_state(&self) -> Result<Option<EqualizerState>>;

        fn set_equalizer_state(&self, state: &EqualizerState) -> Result<()>;

        fn clear_equalizer_state(&self) -> Result<()>;
    }

    impl EqualizerConfigExt for Config {
        fn get_equalizer_state(&self) -> Result<Option<EqualizerState>> {
            match self.get_value(&["playback", "equalizer"]) {
                Ok(Value::String(json)) => match EqualizerState::from_json(&json) {
                    Ok(state) => Ok(Some(state)),
                    Err(e) => {
                        tracing::warn!(error = %e, "Ignoring stored equalizer settings");
                        Ok(None)
                    }
                },
                _ => Ok(None),
            }
        }

        fn set_equalizer_state(&self, state: &EqualizerState) -> Result<()> {
            state.validate()?;
            self.set_value(&["playback", "equalizer"], Value::String(state.to_json()?))
        }

        fn clear_equalizer_state(&self) -> Result<()> {
            self.set_value(&["playback", "equalizer"], Value::Null)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn five_bands() -> EqualizerState {
        EqualizerState::flat(
            (-1500, 1500),
            vec![60_000, 230_000, 910_000, 3_600_000, 14_000_000],
        )
        .with_preset("Rock", vec![500, 300, -100, 300, 500])
        .unwrap()
        .with_preset("Loud", vec![3000, 3000, 3000, 3000, 3000])
        .unwrap()
    }

    #[test]
    fn test_flat_state_is_valid() {
        let state = five_bands();
        assert!(state.validate().is_ok());
        assert_eq!(state.band_levels, vec![0; 5]);
        assert_eq!(state.presets[1].band_levels, vec![1500; 5]);
    }

    #[test]
    fn test_set_band_level_clamps() {
        let mut state = five_bands();
        state.use_preset(0).unwrap();
        assert_eq!(state.set_band_level(2, -4000).unwrap(), -1500);
        assert_eq!(state.band_levels[2], -1500);
        assert_eq!(state.current_preset, None);
        assert!(state.set_band_level(5, 0).is_err());
    }

    #[test]
    fn test_use_preset() {
        let mut state = five_bands();
        state.use_preset(0).unwrap();
        assert_eq!(state.band_levels, vec![500, 300, -100, 300, 500]);
        assert_eq!(state.current_preset, Some(0));
        assert!(matches!(state.use_preset(7), Err(Error::InvalidEqualizer(_))));
    }

    #[test]
    fn test_json_roundtrip_validates() {
        let mut state = five_bands();
        state.enabled = true;
        let restored = EqualizerState::from_json(&state.to_json().unwrap()).unwrap();
        assert_eq!(restored, state);

        state.band_levels.pop();
        assert!(EqualizerState::from_json(&state.to_json().unwrap()).is_err());
    }

    #[cfg(feature = "orconfig")]
    #[test]
    fn test_config_persistence() {
        let dir = tempfile::tempdir().unwrap();
        let config = orconfig::Config::load_config(dir.path().to_str().unwrap()).unwrap();
        assert!(config.get_equalizer_state().unwrap().is_none());

        let state = five_bands();
        config.set_equalizer_state(&state).unwrap();
        assert_eq!(config.get_equalizer_state().unwrap(), Some(state));

        config.clear_equalizer_state().unwrap();
        assert!(config.get_equalizer_state().unwrap().is_none());
    }
}
