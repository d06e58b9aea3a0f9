use serde::{Deserialize, Serialize};

/// Icon bucket for a WMO weather interpretation code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IconCategory {
    ClearDay,
    ClearNight,
    PartlyCloudyDay,
    PartlyCloudyNight,
    Fog,
    Rain,
    Snow,
    Thunderstorm,
    Unknown,
}

impl IconCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            IconCategory::ClearDay => "clear-day",
            IconCategory::ClearNight => "clear-night",
            IconCategory::PartlyCloudyDay => "partly-cloudy-day",
            IconCategory::PartlyCloudyNight => "partly-cloudy-night",
            IconCategory::Fog => "fog",
            IconCategory::Rain => "rain",
            IconCategory::Snow => "snow",
            IconCategory::Thunderstorm => "thunderstorm",
            IconCategory::Unknown => "unknown",
        }
    }

    pub const fn all() -> &'static [IconCategory] {
        &[
            IconCategory::ClearDay,
            IconCategory::ClearNight,
            IconCategory::PartlyCloudyDay,
            IconCategory::PartlyCloudyNight,
            IconCategory::Fog,
            IconCategory::Rain,
            IconCategory::Snow,
            IconCategory::Thunderstorm,
            IconCategory::Unknown,
        ]
    }
}

impl std::fmt::Display for IconCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Map a WMO weather code to an icon category.
///
/// Only clear and partly-cloudy skies have separate night variants.
/// Codes outside the table map to [`IconCategory::Unknown`].
/// See: https://open-meteo.com/en/docs#weathervariables
pub fn classify(code: i32, is_day: bool) -> IconCategory {
    match code {
        0 if is_day => IconCategory::ClearDay,
        0 => IconCategory::ClearNight,
        1..=3 if is_day => IconCategory::PartlyCloudyDay,
        1..=3 => IconCategory::PartlyCloudyNight,
        45 | 48 => IconCategory::Fog,
        // drizzle, freezing drizzle, rain, freezing rain, showers
        51 | 53 | 55 | 56 | 57 | 61 | 63 | 65 | 66 | 67 | 80 | 81 | 82 => IconCategory::Rain,
        71 | 73 | 75 | 77 | 85 | 86 => IconCategory::Snow,
        95 | 96 | 99 => IconCategory::Thunderstorm,
        _ => IconCategory::Unknown,
    }
}
