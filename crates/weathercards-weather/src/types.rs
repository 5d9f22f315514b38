use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Convert Celsius to Fahrenheit (`c * 9/5 + 32`)
pub fn celsius_to_fahrenheit(celsius: f64) -> f64 {
    celsius * 9.0 / 5.0 + 32.0
}

/// City identifier, shared by a city and its weather reading
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CityId(String);

impl CityId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CityId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Geographic coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

/// Long-term climate summary for a city
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Climate {
    #[serde(rename = "type")]
    pub kind: String,
    pub rainy_season: String,
    pub average_temp: String,
    pub description: String,
}

/// Static reference data for a place
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct City {
    pub name: String,
    #[serde(default)]
    pub country: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
    #[serde(default)]
    pub climate: Climate,
}

/// Current weather observation for a city
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherReading {
    pub temp_c: f64,
    pub temp_f: f64,
    #[serde(default)]
    pub description: String,
    /// Relative humidity in percent, 0 to 100
    #[serde(default)]
    pub humidity: f64,
    #[serde(default)]
    pub wind_speed: f64,
    #[serde(default)]
    pub icon: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
}

impl WeatherReading {
    /// Set the Celsius temperature and keep Fahrenheit in step
    pub fn set_temp_c(&mut self, temp_c: f64) {
        self.temp_c = temp_c;
        self.temp_f = celsius_to_fahrenheit(temp_c);
    }
}

/// City joined with its weather reading; what search and rendering work on
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MergedCityWeather {
    pub id: CityId,
    pub name: String,
    pub country: String,
    pub coordinates: Option<Coordinates>,
    pub climate: Climate,
    /// `None` when the remote has no reading for this city
    pub weather: Option<WeatherReading>,
}

impl MergedCityWeather {
    pub fn new(id: CityId, city: City, weather: Option<WeatherReading>) -> Self {
        Self {
            id,
            name: city.name,
            country: city.country,
            coordinates: city.coordinates,
            climate: city.climate,
            weather,
        }
    }

    /// Suggestion label, e.g. "Nairobi, KE"
    pub fn label(&self) -> String {
        if self.country.is_empty() {
            self.name.clone()
        } else {
            format!("{}, {}", self.name, self.country)
        }
    }
}

/// Full dataset as served by the remote store
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub cities: IndexMap<CityId, City>,
    #[serde(default)]
    pub weather: IndexMap<CityId, WeatherReading>,
}

impl Dataset {
    /// Join cities with their readings, preserving city order
    pub fn merge(mut self) -> Vec<MergedCityWeather> {
        let merged: Vec<MergedCityWeather> = self
            .cities
            .into_iter()
            .map(|(id, city)| {
                let weather = self.weather.shift_remove(&id);
                if weather.is_none() {
                    tracing::debug!("City {} has no weather reading", id);
                }
                MergedCityWeather::new(id, city, weather)
            })
            .collect();

        for id in self.weather.keys() {
            tracing::debug!("Ignoring weather reading without a city: {}", id);
        }

        merged
    }
}

/// Partial update of a weather reading
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temp_c: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub humidity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wind_speed: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

impl WeatherPatch {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Check value ranges before the patch touches any state
    pub fn validate(&self) -> Result<(), StoreError> {
        if let Some(t) = self.temp_c {
            if !t.is_finite() {
                return Err(StoreError::InvalidPatch(format!(
                    "temperature must be a number, got {}",
                    t
                )));
            }
        }
        if let Some(h) = self.humidity {
            if !(0.0..=100.0).contains(&h) {
                return Err(StoreError::InvalidPatch(format!(
                    "humidity must be 0-100, got {}",
                    h
                )));
            }
        }
        if let Some(w) = self.wind_speed {
            if !w.is_finite() || w < 0.0 {
                return Err(StoreError::InvalidPatch(format!(
                    "wind speed must be >= 0, got {}",
                    w
                )));
            }
        }
        Ok(())
    }

    /// Merge into a reading. Fahrenheit is recomputed when Celsius changes.
    pub fn apply_to(&self, reading: &mut WeatherReading) {
        if let Some(t) = self.temp_c {
            if t != reading.temp_c {
                reading.set_temp_c(t);
            }
        }
        if let Some(d) = &self.description {
            reading.description = d.clone();
        }
        if let Some(h) = self.humidity {
            reading.humidity = h;
        }
        if let Some(w) = self.wind_speed {
            reading.wind_speed = w;
        }
        if let Some(i) = &self.icon {
            reading.icon = i.clone();
        }
    }
}

/// Where the in-memory dataset came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    Remote,
    /// Built-in dataset; the remote could not be used
    Fallback { reason: String },
}

impl DataSource {
    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback { .. })
    }
}

/// Data store and remote sync errors
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Remote returned status {status}: {message}")]
    Status { status: u16, message: String },
    #[error("Unexpected content type: {0}")]
    ContentType(String),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    #[error("City not found: {0}")]
    NotFound(CityId),
    #[error("No weather reading for city: {0}")]
    MissingWeather(CityId),
    #[error("Invalid update: {0}")]
    InvalidPatch(String),
}

impl StoreError {
    /// User-friendly error message for notices.
    pub fn user_message(&self) -> String {
        match self {
            Self::Network(_) => "Network error. Check your connection.".to_string(),
            Self::Status { status, .. } => format!("The server rejected the request ({})", status),
            Self::ContentType(_) | Self::Parse(_) => {
                "Received an unexpected response from the server.".to_string()
            }
            Self::InvalidUrl(_) => "The server address is invalid. Check settings.".to_string(),
            Self::NotFound(_) => "City not found".to_string(),
            Self::MissingWeather(_) => "No weather data for this city.".to_string(),
            Self::InvalidPatch(msg) => format!("Invalid value: {}", msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(temp_c: f64) -> WeatherReading {
        WeatherReading {
            temp_c,
            temp_f: celsius_to_fahrenheit(temp_c),
            description: "Sunny".to_string(),
            humidity: 50.0,
            wind_speed: 3.0,
            icon: String::new(),
            last_updated: None,
        }
    }

    #[test]
    fn test_celsius_to_fahrenheit() {
        assert_eq!(celsius_to_fahrenheit(0.0), 32.0);
        assert_eq!(celsius_to_fahrenheit(100.0), 212.0);
        assert_eq!(celsius_to_fahrenheit(30.0), 86.0);
        assert!((celsius_to_fahrenheit(28.0) - 82.4).abs() < 1e-9);
    }

    #[test]
    fn test_dataset_deserialization_keeps_order() {
        let json = r#"{
            "cities": {
                "3": {"name": "Kisumu", "country": "KE"},
                "1": {"name": "Nairobi", "country": "KE",
                      "coordinates": {"lat": -1.29, "lon": 36.82},
                      "climate": {"type": "Subtropical highland", "rainy_season": "Mar-May",
                                  "average_temp": "19°C", "description": "Mild"}}
            },
            "weather": {
                "1": {"tempC": 22, "tempF": 71.6, "description": "Cloudy", "humidity": 60.5,
                      "windSpeed": 4.1, "icon": "http://x/1.png",
                      "lastUpdated": "2026-01-30T12:00:00Z"}
            }
        }"#;
        let dataset: Dataset = serde_json::from_str(json).unwrap();
        let merged = dataset.merge();

        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].name, "Kisumu");
        assert!(merged[0].weather.is_none());
        assert_eq!(merged[1].id, CityId::new("1"));
        assert_eq!(merged[1].climate.kind, "Subtropical highland");
        let weather = merged[1].weather.as_ref().unwrap();
        assert_eq!(weather.temp_c, 22.0);
        assert_eq!(weather.wind_speed, 4.1);
        assert_eq!(weather.humidity, 60.5);
        assert!(weather.last_updated.is_some());
    }

    #[test]
    fn test_merge_ignores_orphan_readings() {
        let mut dataset = Dataset::default();
        dataset.weather.insert(CityId::new("9"), reading(10.0));
        assert!(dataset.merge().is_empty());
    }

    #[test]
    fn test_reading_serializes_camel_case() {
        let json = serde_json::to_value(reading(20.0)).unwrap();
        assert_eq!(json["tempC"], 20.0);
        assert_eq!(json["tempF"], 68.0);
        assert_eq!(json["windSpeed"], 3.0);
        assert!(json.get("lastUpdated").is_none());
    }

    #[test]
    fn test_patch_recomputes_fahrenheit() {
        let mut r = reading(22.0);
        WeatherPatch {
            temp_c: Some(30.0),
            ..Default::default()
        }
        .apply_to(&mut r);
        assert_eq!(r.temp_c, 30.0);
        assert_eq!(r.temp_f, 86.0);
    }

    #[test]
    fn test_patch_without_temperature_keeps_fahrenheit() {
        let mut r = reading(22.0);
        let before = r.temp_f;
        WeatherPatch {
            description: Some("Rain".to_string()),
            ..Default::default()
        }
        .apply_to(&mut r);
        assert_eq!(r.description, "Rain");
        assert_eq!(r.temp_f, before);
    }

    #[test]
    fn test_patch_validation() {
        assert!(WeatherPatch::default().validate().is_ok());
        assert!(WeatherPatch {
            humidity: Some(100.5),
            ..Default::default()
        }
        .validate()
        .is_err());
        assert!(WeatherPatch {
            humidity: Some(f64::NAN),
            ..Default::default()
        }
        .validate()
        .is_err());
        assert!(WeatherPatch {
            humidity: Some(65.5),
            ..Default::default()
        }
        .validate()
        .is_ok());
        assert!(WeatherPatch {
            wind_speed: Some(-1.0),
            ..Default::default()
        }
        .validate()
        .is_err());
        assert!(WeatherPatch {
            temp_c: Some(f64::NAN),
            ..Default::default()
        }
        .validate()
        .is_err());
    }

    #[test]
    fn test_label() {
        let city = City {
            name: "Nairobi".to_string(),
            country: "KE".to_string(),
            coordinates: None,
            climate: Climate::default(),
        };
        let merged = MergedCityWeather::new(CityId::new("1"), city, None);
        assert_eq!(merged.label(), "Nairobi, KE");
    }

    #[test]
    fn test_store_error_user_message() {
        assert_eq!(
            StoreError::NotFound(CityId::new("1")).user_message(),
            "City not found"
        );
        assert!(StoreError::Status {
            status: 500,
            message: String::new()
        }
        .user_message()
        .contains("500"));
    }
}
