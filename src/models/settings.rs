//! Настройки сессии для планировщика камеры.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid setting `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Пресет динамики пружинной камеры.
///
/// Из JSON разбирается через `FromStr`, поэтому регистр не важен,
/// а неизвестное имя даёт `Quick`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum MotionPreset {
    Slow,
    Mellow,
    #[default]
    Quick,
    Rapid,
}

impl MotionPreset {
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "slow" => MotionPreset::Slow,
            "mellow" => MotionPreset::Mellow,
            "rapid" => MotionPreset::Rapid,
            _ => MotionPreset::Quick,
        }
    }
}

impl FromStr for MotionPreset {
    type Err = std::convert::Infallible;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_name(value))
    }
}

impl From<String> for MotionPreset {
    fn from(value: String) -> Self {
        Self::from_name(&value)
    }
}

/// Параметры пружины: жёсткость, трение, масса.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpringSettings {
    pub tension: f64,
    pub friction: f64,
    pub mass: f64,
}

impl SpringSettings {
    pub fn for_preset(preset: MotionPreset) -> Self {
        let (tension, friction) = match preset {
            MotionPreset::Slow => (85.0, 28.0),
            MotionPreset::Mellow => (120.0, 30.0),
            MotionPreset::Quick => (175.0, 34.0),
            MotionPreset::Rapid => (230.0, 38.0),
        };
        Self {
            tension,
            friction,
            mass: 1.0,
        }
    }
}

impl From<MotionPreset> for SpringSettings {
    fn from(preset: MotionPreset) -> Self {
        Self::for_preset(preset)
    }
}

/// Параметры захваченного видео, нужные планировщику.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VideoSettings {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
}

impl Default for VideoSettings {
    fn default() -> Self {
        VideoSettings {
            width: 2_560,
            height: 1_440,
            fps: 30,
        }
    }
}

/// Настройки автозума и следования камеры.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CameraFollowSettings {
    /// Доля стороны вьюпорта, задающая область интереса вокруг цели.
    pub focus_area_ratio: f64,
    pub pre_roll_seconds: f64,
    pub hold_seconds: f64,
    pub min_scale: f64,
    pub max_scale: f64,
    pub preset: MotionPreset,
}

impl Default for CameraFollowSettings {
    fn default() -> Self {
        CameraFollowSettings {
            focus_area_ratio: 0.35,
            pre_roll_seconds: 0.15,
            hold_seconds: 0.6,
            min_scale: 1.0,
            max_scale: 3.2,
            preset: MotionPreset::Quick,
        }
    }
}

/// Настройки полировки курсора.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CursorPolishSettings {
    pub smooth_enabled: bool,
    pub remove_shakes: bool,
    pub shake_threshold_pixels: f64,
    pub hide_idle: bool,
    pub idle_seconds: f64,
    pub one_euro_min_cutoff: f64,
    pub one_euro_beta: f64,
    pub one_euro_derivative_cutoff: f64,
}

impl Default for CursorPolishSettings {
    fn default() -> Self {
        CursorPolishSettings {
            smooth_enabled: true,
            remove_shakes: true,
            shake_threshold_pixels: 1.5,
            hide_idle: true,
            idle_seconds: 1.3,
            one_euro_min_cutoff: 1.2,
            one_euro_beta: 0.09,
            one_euro_derivative_cutoff: 1.0,
        }
    }
}

/// Полный набор настроек, с которым вызывается планировщик.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionSettings {
    pub video: VideoSettings,
    pub camera: CameraFollowSettings,
    pub cursor: CursorPolishSettings,
}

impl SessionSettings {
    /// Разбирает JSON (допускаются частичные документы) и проверяет значения.
    pub fn from_json_str(raw: &str) -> Result<Self, SettingsError> {
        let settings: SessionSettings = serde_json::from_str(raw)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Проверка для вызывающих, которым нужен явный отказ.
    /// Сам планировщик некорректные значения не отвергает, а зажимает.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.video.width <= 1 || self.video.height <= 1 {
            return Err(invalid(
                "video",
                format!(
                    "viewport must be larger than 1x1, got {}x{}",
                    self.video.width, self.video.height
                ),
            ));
        }
        if self.video.fps == 0 {
            return Err(invalid("video.fps", "must be positive".to_string()));
        }

        let camera = &self.camera;
        require_finite("camera.focusAreaRatio", camera.focus_area_ratio)?;
        require_finite("camera.preRollSeconds", camera.pre_roll_seconds)?;
        require_finite("camera.holdSeconds", camera.hold_seconds)?;
        require_finite("camera.minScale", camera.min_scale)?;
        require_finite("camera.maxScale", camera.max_scale)?;
        if camera.focus_area_ratio <= 0.0 {
            return Err(invalid(
                "camera.focusAreaRatio",
                format!("must be positive, got {}", camera.focus_area_ratio),
            ));
        }
        if camera.min_scale > camera.max_scale {
            return Err(invalid(
                "camera.minScale",
                format!(
                    "must not exceed maxScale ({} > {})",
                    camera.min_scale, camera.max_scale
                ),
            ));
        }

        let cursor = &self.cursor;
        require_finite("cursor.shakeThresholdPixels", cursor.shake_threshold_pixels)?;
        require_finite("cursor.idleSeconds", cursor.idle_seconds)?;
        require_finite("cursor.oneEuroMinCutoff", cursor.one_euro_min_cutoff)?;
        require_finite("cursor.oneEuroBeta", cursor.one_euro_beta)?;
        require_finite(
            "cursor.oneEuroDerivativeCutoff",
            cursor.one_euro_derivative_cutoff,
        )?;

        Ok(())
    }
}

fn require_finite(field: &'static str, value: f64) -> Result<(), SettingsError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(invalid(field, format!("must be finite, got {value}")))
    }
}

fn invalid(field: &'static str, reason: String) -> SettingsError {
    SettingsError::Invalid { field, reason }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preset_map_matches_motion_table() {
        assert_eq!(
            SpringSettings::for_preset(MotionPreset::Slow),
            SpringSettings {
                tension: 85.0,
                friction: 28.0,
                mass: 1.0
            }
        );
        assert_eq!(SpringSettings::from(MotionPreset::Mellow).tension, 120.0);
        assert_eq!(SpringSettings::from(MotionPreset::Quick).friction, 34.0);
        assert_eq!(SpringSettings::from(MotionPreset::Rapid).tension, 230.0);
    }

    #[test]
    fn unknown_preset_name_falls_back_to_quick() {
        assert_eq!("Rapid".parse::<MotionPreset>(), Ok(MotionPreset::Rapid));
        assert_eq!(" slow ".parse::<MotionPreset>(), Ok(MotionPreset::Slow));
        assert_eq!("turbo".parse::<MotionPreset>(), Ok(MotionPreset::Quick));
        assert_eq!(MotionPreset::default(), MotionPreset::Quick);

        let from_json: MotionPreset = serde_json::from_str("\"turbo\"").expect("unknown preset");
        assert_eq!(from_json, MotionPreset::Quick);
    }

    #[test]
    fn json_preset_names_ignore_case() {
        let rapid: MotionPreset = serde_json::from_str("\"Rapid\"").expect("capitalised preset");
        assert_eq!(rapid, MotionPreset::Rapid);

        let settings = SessionSettings::from_json_str(r#"{"camera":{"preset":"SLOW"}}"#)
            .expect("parse upper-case preset");
        assert_eq!(settings.camera.preset, MotionPreset::Slow);

        let json = serde_json::to_string(&MotionPreset::Mellow).expect("serialize preset");
        assert_eq!(json, "\"mellow\"");
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let settings = SessionSettings::from_json_str(
            r#"{"camera":{"holdSeconds":0.5,"preset":"mellow"},"video":{"fps":60}}"#,
        )
        .expect("parse partial settings");

        assert_eq!(settings.camera.hold_seconds, 0.5);
        assert_eq!(settings.camera.preset, MotionPreset::Mellow);
        assert_eq!(settings.camera.focus_area_ratio, 0.35);
        assert_eq!(settings.video.fps, 60);
        assert_eq!(settings.video.width, 2_560);
        assert_eq!(settings.cursor, CursorPolishSettings::default());
    }

    #[test]
    fn serializes_camel_case_fields() {
        let json = serde_json::to_string(&SessionSettings::default()).expect("serialize");
        assert!(json.contains("\"focusAreaRatio\""));
        assert!(json.contains("\"oneEuroDerivativeCutoff\""));
        assert!(json.contains("\"preset\":\"quick\""));
    }

    #[test]
    fn rejects_inverted_scale_bounds() {
        let settings = SessionSettings {
            camera: CameraFollowSettings {
                min_scale: 3.0,
                max_scale: 2.0,
                ..CameraFollowSettings::default()
            },
            ..SessionSettings::default()
        };

        match settings.validate() {
            Err(SettingsError::Invalid { field, .. }) => assert_eq!(field, "camera.minScale"),
            other => panic!("expected invalid minScale, got {other:?}"),
        }
    }

    #[test]
    fn rejects_zero_fps_and_malformed_json() {
        let err = SessionSettings::from_json_str(r#"{"video":{"fps":0}}"#)
            .expect_err("zero fps must be rejected");
        assert!(err.to_string().contains("video.fps"));

        let err = SessionSettings::from_json_str("{not json").expect_err("malformed json");
        assert!(matches!(err, SettingsError::Parse(_)));
    }

    #[test]
    fn zero_focus_ratio_is_rejected_by_validation() {
        let settings = SessionSettings {
            camera: CameraFollowSettings {
                focus_area_ratio: 0.0,
                ..CameraFollowSettings::default()
            },
            ..SessionSettings::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn one_pixel_viewport_is_rejected() {
        let settings = SessionSettings {
            video: VideoSettings {
                width: 1,
                height: 1_080,
                fps: 30,
            },
            ..SessionSettings::default()
        };
        match settings.validate() {
            Err(SettingsError::Invalid { field, .. }) => assert_eq!(field, "video"),
            other => panic!("expected invalid viewport, got {other:?}"),
        }

        let two_by_two = SessionSettings {
            video: VideoSettings {
                width: 2,
                height: 2,
                fps: 30,
            },
            ..SessionSettings::default()
        };
        assert!(two_by_two.validate().is_ok());
    }
}
