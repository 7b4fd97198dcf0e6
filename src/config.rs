use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self { title: "Proscenium".to_string(), width: 1280, height: 720 }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TimerConfig {
    #[serde(default = "TimerConfig::default_inactivity_secs")]
    pub inactivity_secs: f32,
    #[serde(default = "TimerConfig::default_auto_hide_secs")]
    pub auto_hide_secs: f32,
}

impl TimerConfig {
    const fn default_inactivity_secs() -> f32 {
        15.0
    }

    const fn default_auto_hide_secs() -> f32 {
        6.0
    }
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            inactivity_secs: Self::default_inactivity_secs(),
            auto_hide_secs: Self::default_auto_hide_secs(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ShotConfig {
    #[serde(default = "ShotConfig::default_travel_secs")]
    pub travel_secs: f32,
    #[serde(default = "ShotConfig::default_fade_secs")]
    pub fade_secs: f32,
}

impl ShotConfig {
    const fn default_travel_secs() -> f32 {
        8.0
    }

    const fn default_fade_secs() -> f32 {
        0.5
    }
}

impl Default for ShotConfig {
    fn default() -> Self {
        Self { travel_secs: Self::default_travel_secs(), fade_secs: Self::default_fade_secs() }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ParticleConfig {
    #[serde(default = "ParticleConfig::default_count")]
    pub count: u32,
    #[serde(default = "ParticleConfig::default_bound")]
    pub bound: f32,
    #[serde(default = "ParticleConfig::default_max_speed")]
    pub max_speed: f32,
}

impl ParticleConfig {
    const fn default_count() -> u32 {
        120
    }

    const fn default_bound() -> f32 {
        100.0
    }

    fn default_max_speed() -> f32 {
        0.05
    }
}

impl Default for ParticleConfig {
    fn default() -> Self {
        Self {
            count: Self::default_count(),
            bound: Self::default_bound(),
            max_speed: Self::default_max_speed(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PoseConfig {
    #[serde(default = "PoseConfig::default_transition_secs")]
    pub transition_secs: f32,
    #[serde(default = "PoseConfig::default_hold_secs")]
    pub hold_secs: f32,
}

impl PoseConfig {
    const fn default_transition_secs() -> f32 {
        1.0
    }

    const fn default_hold_secs() -> f32 {
        2.0
    }
}

impl Default for PoseConfig {
    fn default() -> Self {
        Self {
            transition_secs: Self::default_transition_secs(),
            hold_secs: Self::default_hold_secs(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ThemeConfig {
    #[serde(default = "ThemeConfig::default_transition_secs")]
    pub transition_secs: f32,
}

impl ThemeConfig {
    fn default_transition_secs() -> f32 {
        1.5
    }
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self { transition_secs: Self::default_transition_secs() }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CityConfig {
    #[serde(default = "CityConfig::default_building_count")]
    pub building_count: u32,
}

impl CityConfig {
    const fn default_building_count() -> u32 {
        150
    }
}

impl Default for CityConfig {
    fn default() -> Self {
        Self { building_count: Self::default_building_count() }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct PresentationConfig {
    #[serde(default)]
    pub window: WindowConfig,
    #[serde(default)]
    pub timers: TimerConfig,
    #[serde(default)]
    pub shots: ShotConfig,
    #[serde(default)]
    pub particles: ParticleConfig,
    #[serde(default)]
    pub pose: PoseConfig,
    #[serde(default)]
    pub theme: ThemeConfig,
    #[serde(default)]
    pub city: CityConfig,
}

#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub particle_count: Option<u32>,
}

impl PresentationConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes =
            fs::read(path).with_context(|| format!("Failed to read config file {}", path.display()))?;
        let cfg = serde_json::from_slice(&bytes)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(cfg)
    }

    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(path) {
            Ok(cfg) => cfg,
            Err(err) => {
                eprintln!("[config] {err:?}. Falling back to defaults.");
                Self::default()
            }
        }
    }

    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(width) = overrides.width {
            self.window.width = width;
        }
        if let Some(height) = overrides.height {
            self.window.height = height;
        }
        if let Some(count) = overrides.particle_count {
            self.particles.count = count;
        }
    }
}

impl ConfigOverrides {
    pub fn is_empty(&self) -> bool {
        self.width.is_none() && self.height.is_none() && self.particle_count.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_reference_timings() {
        let cfg = PresentationConfig::default();
        assert_eq!(cfg.timers.inactivity_secs, 15.0);
        assert_eq!(cfg.timers.auto_hide_secs, 6.0);
        assert_eq!(cfg.shots.travel_secs, 8.0);
        assert_eq!(cfg.shots.fade_secs, 0.5);
        assert_eq!(cfg.pose.transition_secs, 1.0);
        assert_eq!(cfg.pose.hold_secs, 2.0);
        assert_eq!(cfg.theme.transition_secs, 1.5);
        assert_eq!(cfg.particles.bound, 100.0);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, r#"{{ "timers": {{ "inactivity_secs": 5.0 }} }}"#).expect("write");
        let cfg = PresentationConfig::load(file.path()).expect("load");
        assert_eq!(cfg.timers.inactivity_secs, 5.0);
        assert_eq!(cfg.timers.auto_hide_secs, 6.0);
        assert_eq!(cfg.window.width, 1280);
    }

    #[test]
    fn overrides_take_precedence() {
        let mut cfg = PresentationConfig::default();
        let overrides =
            ConfigOverrides { width: Some(640), height: None, particle_count: Some(32) };
        cfg.apply_overrides(&overrides);
        assert_eq!(cfg.window.width, 640);
        assert_eq!(cfg.window.height, 720);
        assert_eq!(cfg.particles.count, 32);
    }
}
