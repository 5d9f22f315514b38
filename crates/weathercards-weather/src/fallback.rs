//! Built-in dataset used when the remote store is unreachable.

use crate::types::{
    celsius_to_fahrenheit, City, CityId, Climate, Coordinates, Dataset, WeatherReading,
};

const ICON_BASE: &str = "https://openweathermap.org/img/wn";

struct Entry {
    id: &'static str,
    name: &'static str,
    lat: f64,
    lon: f64,
    climate: (&'static str, &'static str, &'static str, &'static str),
    temp_c: f64,
    description: &'static str,
    humidity: f64,
    wind_speed: f64,
    icon: &'static str,
}

const ENTRIES: [Entry; 3] = [
    Entry {
        id: "1",
        name: "Nairobi",
        lat: -1.2921,
        lon: 36.8219,
        climate: (
            "Subtropical highland",
            "March-May, October-December",
            "17-19°C",
            "Mild temperatures year-round thanks to the high altitude.",
        ),
        temp_c: 22.0,
        description: "Partly cloudy",
        humidity: 65.0,
        wind_speed: 3.6,
        icon: "02d",
    },
    Entry {
        id: "2",
        name: "Mombasa",
        lat: -4.0435,
        lon: 39.6682,
        climate: (
            "Tropical savanna",
            "April-June, October-November",
            "26-28°C",
            "Hot and humid coastal climate moderated by sea breezes.",
        ),
        temp_c: 28.0,
        description: "Sunny",
        humidity: 78.0,
        wind_speed: 5.1,
        icon: "01d",
    },
    Entry {
        id: "3",
        name: "Kisumu",
        lat: -0.0917,
        lon: 34.768,
        climate: (
            "Tropical rainforest",
            "March-May, September-November",
            "23-25°C",
            "Warm lakeside climate with afternoon thunderstorms.",
        ),
        temp_c: 25.0,
        description: "Light rain",
        humidity: 72.0,
        wind_speed: 2.8,
        icon: "10d",
    },
];

/// The fixed three-city dataset (Nairobi, Mombasa, Kisumu).
pub fn fallback_dataset() -> Dataset {
    let mut dataset = Dataset::default();

    for entry in &ENTRIES {
        let id = CityId::new(entry.id);
        let (kind, rainy_season, average_temp, description) = entry.climate;

        dataset.cities.insert(
            id.clone(),
            City {
                name: entry.name.to_string(),
                country: "KE".to_string(),
                coordinates: Some(Coordinates {
                    lat: entry.lat,
                    lon: entry.lon,
                }),
                climate: Climate {
                    kind: kind.to_string(),
                    rainy_season: rainy_season.to_string(),
                    average_temp: average_temp.to_string(),
                    description: description.to_string(),
                },
            },
        );
        dataset.weather.insert(
            id,
            WeatherReading {
                temp_c: entry.temp_c,
                temp_f: celsius_to_fahrenheit(entry.temp_c),
                description: entry.description.to_string(),
                humidity: entry.humidity,
                wind_speed: entry.wind_speed,
                icon: format!("{}/{}@2x.png", ICON_BASE, entry.icon),
                last_updated: None,
            },
        );
    }

    dataset
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_has_three_kenyan_cities() {
        let merged = fallback_dataset().merge();
        let names: Vec<&str> = merged.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Nairobi", "Mombasa", "Kisumu"]);
        assert!(merged.iter().all(|c| c.country == "KE" && c.weather.is_some()));
    }

    #[test]
    fn test_fallback_fahrenheit_is_derived() {
        for city in fallback_dataset().merge() {
            let w = city.weather.unwrap();
            assert!((w.temp_f - celsius_to_fahrenheit(w.temp_c)).abs() < 1e-9);
        }
    }
}
