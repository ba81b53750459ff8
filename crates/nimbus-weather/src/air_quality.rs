//! Air-quality index (1..=5) and its fixed label/color table.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AirQualityLevel {
    Good,
    Fair,
    Moderate,
    Poor,
    VeryPoor,
}

impl AirQualityLevel {
    /// Map the provider's index. Anything outside 1..=5 is shown as Fair.
    pub fn from_index(index: i64) -> Self {
        match index {
            1 => Self::Good,
            2 => Self::Fair,
            3 => Self::Moderate,
            4 => Self::Poor,
            5 => Self::VeryPoor,
            _ => Self::Fair,
        }
    }

    pub fn index(self) -> u8 {
        match self {
            Self::Good => 1,
            Self::Fair => 2,
            Self::Moderate => 3,
            Self::Poor => 4,
            Self::VeryPoor => 5,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Good => "Good",
            Self::Fair => "Fair",
            Self::Moderate => "Moderate",
            Self::Poor => "Poor",
            Self::VeryPoor => "Very Poor",
        }
    }

    /// Foreground color as a hex string
    pub fn color(self) -> &'static str {
        match self {
            Self::Good => "#00e400",
            Self::Fair => "#ffff00",
            Self::Moderate => "#ff7e00",
            Self::Poor => "#ff0000",
            Self::VeryPoor => "#8f3f97",
        }
    }

    /// Translucent badge background
    pub fn background(self) -> &'static str {
        match self {
            Self::Good => "rgba(0, 228, 0, 0.2)",
            Self::Fair => "rgba(255, 255, 0, 0.2)",
            Self::Moderate => "rgba(255, 126, 0, 0.2)",
            Self::Poor => "rgba(255, 0, 0, 0.2)",
            Self::VeryPoor => "rgba(143, 63, 151, 0.2)",
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct AirPollutionResponse {
    #[serde(default)]
    pub list: Vec<AirPollutionSample>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AirPollutionSample {
    pub main: AirPollutionMain,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AirPollutionMain {
    pub aqi: i64,
}

impl AirPollutionResponse {
    /// Level of the first sample, if the provider returned any.
    pub fn level(&self) -> Option<AirQualityLevel> {
        self.list
            .first()
            .map(|sample| AirQualityLevel::from_index(sample.main.aqi))
    }
}
