use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::error::{EngineError, EngineResult};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DisplayConfig {
    pub width: u32,
    pub height: u32,
    /// Hex color the frame is cleared to before compositing.
    pub background: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            width: 240,
            height: 160,
            background: "#000000".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SchedulerConfig {
    /// Initial priority bound. `nan` runs everything, `-inf` runs nothing.
    pub priority_bound: f64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            priority_bound: f64::NAN,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct EngineConfig {
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
}

impl EngineConfig {
    pub fn from_toml_str(contents: &str) -> EngineResult<Self> {
        let config: EngineConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load_from_file(path: &std::path::Path) -> EngineResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn save_to_file(&self, path: &std::path::Path) -> EngineResult<()> {
        let contents = self.to_toml_string()?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    pub fn to_toml_string(&self) -> EngineResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// The parsed `display.background` color.
    pub fn background_color(&self) -> EngineResult<Color> {
        Color::from_hex(&self.display.background)
            .map_err(|e| EngineError::invalid_parameter(format!("display.background: {e}")))
    }

    pub fn validate(&self) -> EngineResult<()> {
        if self.display.width == 0 || self.display.height == 0 {
            return Err(EngineError::invalid_parameter(format!(
                "display size must be non-zero, got {}x{}",
                self.display.width, self.display.height
            )));
        }
        self.background_color()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.display.width, 240);
        assert_eq!(config.display.height, 160);
        assert!(config.scheduler.priority_bound.is_nan());
        assert_eq!(config.background_color().unwrap(), Color::BLACK);
    }

    #[test]
    fn test_partial_file_uses_section_defaults() {
        let config = EngineConfig::from_toml_str(
            r##"
            [display]
            width = 256
            height = 224
            background = "#102030"
            "##,
        )
        .unwrap();
        assert_eq!(config.display.width, 256);
        assert!(config.scheduler.priority_bound.is_nan());
    }

    #[test]
    fn test_special_float_bounds() {
        let config = EngineConfig::from_toml_str("[scheduler]\npriority_bound = -inf\n").unwrap();
        assert_eq!(config.scheduler.priority_bound, f64::NEG_INFINITY);
        let config = EngineConfig::from_toml_str("[scheduler]\npriority_bound = nan\n").unwrap();
        assert!(config.scheduler.priority_bound.is_nan());
    }

    #[test]
    fn test_invalid_values_rejected() {
        let zero = "[display]\nwidth = 0\nheight = 10\nbackground = \"#000000\"\n";
        assert!(matches!(
            EngineConfig::from_toml_str(zero),
            Err(EngineError::InvalidParameter(_))
        ));
        let bad_color = "[display]\nwidth = 10\nheight = 10\nbackground = \"teal\"\n";
        assert!(EngineConfig::from_toml_str(bad_color).is_err());
        assert!(matches!(
            EngineConfig::from_toml_str("[display]\nwidth = \"wide\"\n"),
            Err(EngineError::Config(_))
        ));
    }

    #[test]
    fn test_toml_round_trip() {
        let mut config = EngineConfig::default();
        config.scheduler.priority_bound = 2.5;
        let text = config.to_toml_string().unwrap();
        let back = EngineConfig::from_toml_str(&text).unwrap();
        assert_eq!(back.scheduler.priority_bound, 2.5);
        assert_eq!(back.display.background, "#000000");
    }
}
