use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const MOTION_MIN: u8 = 1;
pub const MOTION_MAX: u8 = 10;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("unsupported frame rate: {0} (expected 24, 30 or 60)")]
    FrameRate(u32),
    #[error("motion intensity {0} outside 1..=10")]
    MotionIntensity(i64),
    #[error("creativity {0} outside 0.0..=1.0")]
    Creativity(f64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Resolution {
    #[serde(rename = "720p")]
    Hd720,
    #[serde(rename = "1080p")]
    Hd1080,
}

impl Resolution {
    pub fn as_str(&self) -> &'static str {
        match self {
            Resolution::Hd720 => "720p",
            Resolution::Hd1080 => "1080p",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AspectRatio {
    #[serde(rename = "16:9")]
    Landscape,
    #[serde(rename = "9:16")]
    Portrait,
}

impl AspectRatio {
    pub fn as_str(&self) -> &'static str {
        match self {
            AspectRatio::Landscape => "16:9",
            AspectRatio::Portrait => "9:16",
        }
    }
}

/// Output frame rate. Only the three rates the video backend renders are representable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum FrameRate {
    Fps24,
    Fps30,
    Fps60,
}

impl FrameRate {
    pub fn as_u32(&self) -> u32 {
        match self {
            FrameRate::Fps24 => 24,
            FrameRate::Fps30 => 30,
            FrameRate::Fps60 => 60,
        }
    }
}

impl TryFrom<u32> for FrameRate {
    type Error = ConfigError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            24 => Ok(FrameRate::Fps24),
            30 => Ok(FrameRate::Fps30),
            60 => Ok(FrameRate::Fps60),
            other => Err(ConfigError::FrameRate(other)),
        }
    }
}

impl From<FrameRate> for u32 {
    fn from(rate: FrameRate) -> Self {
        rate.as_u32()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct MotionIntensity(u8);

impl MotionIntensity {
    pub fn get(&self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for MotionIntensity {
    type Error = ConfigError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        if (MOTION_MIN as i64..=MOTION_MAX as i64).contains(&value) {
            Ok(MotionIntensity(value as u8))
        } else {
            Err(ConfigError::MotionIntensity(value))
        }
    }
}

impl From<MotionIntensity> for i64 {
    fn from(motion: MotionIntensity) -> Self {
        motion.0 as i64
    }
}

/// Creativity/adherence knob. 0.0 follows the prompt literally, 1.0 lets the director improvise.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Creativity(f64);

impl Creativity {
    pub fn get(&self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for Creativity {
    type Error = ConfigError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        // NaN fails the range check as well
        if (0.0..=1.0).contains(&value) {
            Ok(Creativity(value))
        } else {
            Err(ConfigError::Creativity(value))
        }
    }
}

impl From<Creativity> for f64 {
    fn from(creativity: Creativity) -> Self {
        creativity.0
    }
}

/// Per-request generation parameters. Every field is range-checked on construction,
/// so a value of this type is always valid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub resolution: Resolution,
    pub aspect_ratio: AspectRatio,
    #[serde(rename = "fps", alias = "framesPerSecond")]
    pub frame_rate: FrameRate,
    #[serde(rename = "motionBucket", alias = "motionIntensity")]
    pub motion_intensity: MotionIntensity,
    pub creativity: Creativity,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        GenerationConfig {
            resolution: Resolution::Hd720,
            aspect_ratio: AspectRatio::Landscape,
            frame_rate: FrameRate::Fps24,
            motion_intensity: MotionIntensity(5),
            creativity: Creativity(0.5),
        }
    }
}

/// A single edit made in the config panel between requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ConfigEdit {
    SetResolution { resolution: Resolution },
    SetAspectRatio { aspect_ratio: AspectRatio },
    SetFrameRate { fps: u32 },
    SetMotionIntensity { value: i64 },
    NudgeMotionIntensity { delta: i64 },
    SetCreativity { value: f64 },
}

impl GenerationConfig {
    /// Applies an edit. A rejected edit leaves the config untouched.
    pub fn apply_edit(&mut self, edit: ConfigEdit) -> Result<(), ConfigError> {
        match edit {
            ConfigEdit::SetResolution { resolution } => self.resolution = resolution,
            ConfigEdit::SetAspectRatio { aspect_ratio } => self.aspect_ratio = aspect_ratio,
            ConfigEdit::SetFrameRate { fps } => self.frame_rate = FrameRate::try_from(fps)?,
            ConfigEdit::SetMotionIntensity { value } => {
                self.motion_intensity = MotionIntensity::try_from(value)?
            }
            ConfigEdit::NudgeMotionIntensity { delta } => {
                // slider nudges saturate at the ends instead of failing
                let value = (self.motion_intensity.get() as i64)
                    .saturating_add(delta)
                    .clamp(MOTION_MIN as i64, MOTION_MAX as i64);
                self.motion_intensity = MotionIntensity::try_from(value)?;
            }
            ConfigEdit::SetCreativity { value } => self.creativity = Creativity::try_from(value)?,
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_in_domain(config: &GenerationConfig) {
        assert!([24, 30, 60].contains(&config.frame_rate.as_u32()));
        assert!((1..=10).contains(&config.motion_intensity.get()));
        assert!((0.0..=1.0).contains(&config.creativity.get()));
    }

    #[test]
    fn test_default_config_is_in_domain() {
        let config = GenerationConfig::default();
        assert_in_domain(&config);
        assert_eq!(config.resolution.as_str(), "720p");
        assert_eq!(config.aspect_ratio.as_str(), "16:9");
    }

    #[test]
    fn test_panel_json_deserializes() {
        let config: GenerationConfig = serde_json::from_value(serde_json::json!({
            "resolution": "1080p",
            "aspectRatio": "16:9",
            "fps": 24,
            "motionBucket": 5,
            "creativity": 0.5
        }))
        .unwrap();

        assert_eq!(config.resolution, Resolution::Hd1080);
        assert_eq!(config.frame_rate, FrameRate::Fps24);
        assert_eq!(config.motion_intensity.get(), 5);

        let json = serde_json::to_value(config).unwrap();
        assert_eq!(json["fps"], 24);
        assert_eq!(json["motionBucket"], 5);
    }

    #[test]
    fn test_out_of_range_json_is_rejected() {
        let base = serde_json::json!({
            "resolution": "720p",
            "aspectRatio": "9:16",
            "fps": 30,
            "motionBucket": 3,
            "creativity": 0.2
        });
        assert!(serde_json::from_value::<GenerationConfig>(base.clone()).is_ok());

        for (field, bad) in [
            ("fps", serde_json::json!(25)),
            ("motionBucket", serde_json::json!(0)),
            ("motionBucket", serde_json::json!(11)),
            ("creativity", serde_json::json!(1.5)),
            ("creativity", serde_json::json!(-0.1)),
            ("resolution", serde_json::json!("4k")),
            ("aspectRatio", serde_json::json!("1:1")),
        ] {
            let mut json = base.clone();
            json[field] = bad;
            assert!(
                serde_json::from_value::<GenerationConfig>(json).is_err(),
                "{} should be rejected",
                field
            );
        }
    }

    #[test]
    fn test_rejected_edit_leaves_config_unchanged() {
        let mut config = GenerationConfig::default();
        let before = config;

        assert_eq!(
            config.apply_edit(ConfigEdit::SetFrameRate { fps: 48 }),
            Err(ConfigError::FrameRate(48))
        );
        assert!(config
            .apply_edit(ConfigEdit::SetCreativity { value: f64::NAN })
            .is_err());
        assert_eq!(config, before);
    }

    #[test]
    fn test_any_edit_sequence_stays_in_domain() {
        let mut config = GenerationConfig::default();
        let edits = [
            ConfigEdit::SetFrameRate { fps: 60 },
            ConfigEdit::SetFrameRate { fps: 0 },
            ConfigEdit::NudgeMotionIntensity { delta: 100 },
            ConfigEdit::NudgeMotionIntensity { delta: i64::MIN },
            ConfigEdit::SetMotionIntensity { value: 7 },
            ConfigEdit::SetMotionIntensity { value: -3 },
            ConfigEdit::SetCreativity { value: 1.0 },
            ConfigEdit::SetCreativity { value: 2.0 },
            ConfigEdit::SetResolution { resolution: Resolution::Hd1080 },
            ConfigEdit::SetAspectRatio { aspect_ratio: AspectRatio::Portrait },
            ConfigEdit::NudgeMotionIntensity { delta: -4 },
        ];

        for round in 0..50 {
            for (i, edit) in edits.iter().enumerate() {
                if (round + i) % 3 == 0 {
                    continue;
                }
                let _ = config.apply_edit(edit.clone());
                assert_in_domain(&config);
            }
        }
    }

    #[test]
    fn test_nudge_saturates() {
        let mut config = GenerationConfig::default();
        config
            .apply_edit(ConfigEdit::NudgeMotionIntensity { delta: 42 })
            .unwrap();
        assert_eq!(config.motion_intensity.get(), MOTION_MAX);
        config
            .apply_edit(ConfigEdit::NudgeMotionIntensity { delta: -42 })
            .unwrap();
        assert_eq!(config.motion_intensity.get(), MOTION_MIN);
    }
}
