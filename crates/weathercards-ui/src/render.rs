//! Text rendering of weather cards, suggestion lists and notices.

use weathercards_weather::{MergedCityWeather, Theme};

use crate::session::{Notice, NoticeLevel, View};

/// ANSI colours for one theme
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub heading: &'static str,
    pub muted: &'static str,
    pub alert: &'static str,
    pub reset: &'static str,
}

impl Palette {
    /// No escape codes at all
    pub const PLAIN: Palette = Palette {
        heading: "",
        muted: "",
        alert: "",
        reset: "",
    };

    pub fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Light => Palette {
                heading: "\x1b[1;34m",
                muted: "\x1b[90m",
                alert: "\x1b[1;31m",
                reset: "\x1b[0m",
            },
            Theme::Dark => Palette {
                heading: "\x1b[1;93m",
                muted: "\x1b[37m",
                alert: "\x1b[1;91m",
                reset: "\x1b[0m",
            },
        }
    }
}

/// Format with at most one decimal, dropping a trailing ".0"
pub fn format_number(value: f64) -> String {
    let s = format!("{:.1}", value);
    match s.strip_suffix(".0") {
        Some(whole) if whole != "-0" => whole.to_string(),
        Some(_) => "0".to_string(),
        None => s,
    }
}

pub fn weather_card(record: &MergedCityWeather, palette: &Palette) -> String {
    let mut lines = vec![format!(
        "{}Weather in {}{}",
        palette.heading, record.name, palette.reset
    )];

    match &record.weather {
        Some(w) => {
            if !w.icon.is_empty() {
                lines.push(format!("{}Icon: {}{}", palette.muted, w.icon, palette.reset));
            }
            lines.push(format!(
                "Temperature: {}°C ({}°F)",
                format_number(w.temp_c),
                format_number(w.temp_f)
            ));
            lines.push(format!("Description: {}", w.description));
            lines.push(format!("Humidity: {}%", format_number(w.humidity)));
            lines.push(format!("Wind Speed: {} m/s", format_number(w.wind_speed)));
            if let Some(updated) = w.last_updated {
                lines.push(format!(
                    "{}Last Updated: {}{}",
                    palette.muted,
                    updated.format("%Y-%m-%d %H:%M UTC"),
                    palette.reset
                ));
            }
        }
        None => lines.push(format!(
            "{}Weather data unavailable{}",
            palette.muted, palette.reset
        )),
    }

    let climate = &record.climate;
    lines.push(format!("Climate Type: {}", climate.kind));
    lines.push(format!("Rainy Seasons: {}", climate.rainy_season));
    lines.push(format!("Average Temperature: {}", climate.average_temp));
    if !climate.description.is_empty() {
        lines.push(format!(
            "{}{}{}",
            palette.muted, climate.description, palette.reset
        ));
    }

    lines.join("\n")
}

pub fn suggestion_list(labels: &[String]) -> String {
    labels
        .iter()
        .enumerate()
        .map(|(i, label)| format!("  {}. {}", i + 1, label))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn notice(notice: &Notice, palette: &Palette) -> String {
    match notice.level {
        NoticeLevel::Info => notice.text.clone(),
        NoticeLevel::Warning => format!("{}! {}{}", palette.muted, notice.text, palette.reset),
        NoticeLevel::Alert => format!("{}!! {}{}", palette.alert, notice.text, palette.reset),
    }
}

/// Text for one view, or `None` when there is nothing to print
pub fn view(view: &View, palette: &Palette) -> Option<String> {
    match view {
        View::Suggestions(labels) => Some(format!("Suggestions:\n{}", suggestion_list(labels))),
        View::HideSuggestions | View::ClearCard => None,
        View::Card(record) => Some(weather_card(record, palette)),
        View::Notice(n) => Some(notice(n, palette)),
        View::ThemeChanged(theme) => Some(format!("Theme: {}", theme.as_str())),
        View::Text(text) => Some(text.clone()),
    }
}
