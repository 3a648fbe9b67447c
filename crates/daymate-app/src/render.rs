//! Plain-text rendering of the screens.
//!
//! Rendering is a pure function of the model. Sections backed by optional
//! data are omitted entirely when the data is absent.

use std::fmt::{self, Write};

use chrono::{DateTime, Local, Utc};
use daymate_api::{NewsSnapshot, Plan, PlanHistoryEntry, WeatherSnapshot};
use daymate_core::Screen;
use serde_json::Value;

use crate::models::{AppModel, Location, Notice, PlanHistory};

/// Headlines shown in the news panel.
pub const MAX_HEADLINES: usize = 5;

/// Render whatever screen the model is on.
pub fn render(model: &AppModel) -> String {
    let mut out = String::new();
    let _ = match model.screen() {
        Screen::Home => render_home(&mut out),
        Screen::Dashboard => render_dashboard(model, &mut out),
        Screen::Login => render_login(&mut out),
        Screen::Register => render_register(&mut out),
        Screen::History => render_history(model.history(), &mut out),
        Screen::Blank => Ok(()),
    };
    out
}

/// One line per notice, errors prefixed with `!`.
pub fn render_notices(notices: &[Notice]) -> String {
    notices
        .iter()
        .map(|n| match n {
            Notice::Info(text) => format!("* {}\n", text),
            Notice::Error(text) => format!("! {}\n", text),
        })
        .collect()
}

fn render_home(out: &mut String) -> fmt::Result {
    writeln!(out, "Welcome to DayMate")?;
    writeln!(out, "Plan your day smarter with AI, weather updates, and news.")?;
    writeln!(out)?;
    writeln!(out, "  guest   Continue as Guest")?;
    writeln!(out, "  login   Login / Register")
}

fn render_login(out: &mut String) -> fmt::Result {
    writeln!(out, "Login")?;
    writeln!(out, "  login <email> <password>")?;
    writeln!(out, "  register   create an account")?;
    writeln!(out, "  home       back")
}

fn render_register(out: &mut String) -> fmt::Result {
    writeln!(out, "Register")?;
    writeln!(out, "  register <full name> <email> <password>")?;
    writeln!(out, "  login      already have an account")?;
    writeln!(out, "  home       back")
}

fn render_dashboard(model: &AppModel, out: &mut String) -> fmt::Result {
    render_navbar(model.is_authenticated(), out)?;
    writeln!(out)?;
    render_tabs(&model.tabs(), model.active_location().map(|l| l.id.as_str()), out)?;
    writeln!(out)?;
    render_hero(model.active_location(), model.plan_loading(), out)?;

    // Only show data that belongs to the active location
    let active_id = model.active_location().map(|l| l.id.as_str());
    if active_id.is_some() && model.data_location() == active_id {
        if let Some(weather) = model.weather() {
            writeln!(out)?;
            render_weather(weather, out)?;
        }
        if let Some(news) = model.news().filter(|n| n.has_articles()) {
            writeln!(out)?;
            render_news(news, out)?;
        }
    } else if model.data_loading() {
        writeln!(out)?;
        writeln!(out, "Loading weather and news...")?;
    }

    if let Some(envelope) = model.active_plan() {
        render_plan(&envelope.plan, out)?;
    }
    Ok(())
}

fn render_navbar(authenticated: bool, out: &mut String) -> fmt::Result {
    if authenticated {
        writeln!(out, "DayMate  [home] [history] [logout]")
    } else {
        writeln!(out, "DayMate  [home] [login]")
    }
}

fn render_tabs(tabs: &[&Location], active_id: Option<&str>, out: &mut String) -> fmt::Result {
    writeln!(out, "Locations:")?;
    if tabs.is_empty() {
        writeln!(out, "  (none)")?;
    }
    for loc in tabs {
        let marker = if Some(loc.id.as_str()) == active_id { '>' } else { ' ' };
        writeln!(
            out,
            "{} {} [{}] ({:.4}, {:.4})  id={}",
            marker,
            loc.label,
            loc.source.label(),
            loc.lat,
            loc.lon,
            loc.id
        )?;
    }
    Ok(())
}

fn render_hero(active: Option<&Location>, plan_loading: bool, out: &mut String) -> fmt::Result {
    writeln!(out, "DayMate - Your AI Daily Planner")?;
    match active {
        Some(loc) => writeln!(out, "Viewing: {}", loc.label)?,
        None => writeln!(out, "Select or add a location to get started.")?,
    }
    let button = if plan_loading { "Generating…" } else { "Generate Plan" };
    writeln!(out, "[{}]", button)
}

fn str_at<'a>(value: &'a Value, path: &[&str]) -> Option<&'a str> {
    path.iter()
        .try_fold(value, |v, key| v.get(key))
        .and_then(Value::as_str)
}

fn f64_at(value: &Value, path: &[&str]) -> Option<f64> {
    path.iter()
        .try_fold(value, |v, key| v.get(key))
        .and_then(Value::as_f64)
}

/// Local time at the reporting station, from OpenWeather's `dt` and
/// `timezone` (offset in seconds).
fn station_time(weather: &Value) -> Option<String> {
    let dt = weather.get("dt")?.as_i64()?;
    let offset = weather.get("timezone").and_then(Value::as_i64).unwrap_or(0);
    let local = DateTime::<Utc>::from_timestamp(dt + offset, 0)?;
    Some(local.format("%a, %b %-d, %H:%M").to_string())
}

fn render_weather(weather: &WeatherSnapshot, out: &mut String) -> fmt::Result {
    let w = &weather.0;
    writeln!(out, "Weather")?;

    let Some(temp) = f64_at(w, &["main", "temp"]) else {
        let raw = serde_json::to_string_pretty(w).unwrap_or_else(|_| w.to_string());
        return writeln!(out, "{}", raw);
    };

    match (str_at(w, &["name"]), str_at(w, &["sys", "country"])) {
        (Some(name), Some(country)) => writeln!(out, "  {}, {}", name, country)?,
        (Some(name), None) => writeln!(out, "  {}", name)?,
        _ => {}
    }
    if let Some(time) = station_time(w) {
        writeln!(out, "  {} local time", time)?;
    }

    let description = w
        .get("weather")
        .and_then(|list| list.get(0))
        .and_then(|first| first.get("description"))
        .and_then(Value::as_str);
    match description {
        Some(description) => writeln!(out, "  {}°C  {}", temp.round(), description)?,
        None => writeln!(out, "  {}°C", temp.round())?,
    }

    let mut details = Vec::new();
    if let Some(feels) = f64_at(w, &["main", "feels_like"]) {
        details.push(format!("Feels {}°C", feels.round()));
    }
    if let Some(humidity) = f64_at(w, &["main", "humidity"]) {
        details.push(format!("Humidity {}%", humidity));
    }
    if let Some(speed) = f64_at(w, &["wind", "speed"]) {
        details.push(format!("Wind {} m/s", speed));
    }
    if !details.is_empty() {
        writeln!(out, "  {}", details.join(" | "))?;
    }
    Ok(())
}

fn render_news(news: &NewsSnapshot, out: &mut String) -> fmt::Result {
    writeln!(out, "Top News")?;
    for headline in news.headlines().into_iter().take(MAX_HEADLINES) {
        match headline.url {
            Some(url) => writeln!(out, "  - {} <{}>", headline.title, url)?,
            None => writeln!(out, "  - {}", headline.title)?,
        }
    }
    Ok(())
}

fn render_list(title: &str, items: Option<&Vec<String>>, out: &mut String) -> fmt::Result {
    let Some(items) = items.filter(|items| !items.is_empty()) else {
        return Ok(());
    };
    writeln!(out)?;
    writeln!(out, "{}", title)?;
    for item in items {
        writeln!(out, "  - {}", item)?;
    }
    Ok(())
}

/// Plan sections in display order. Absent fields produce no section.
pub fn render_plan(plan: &Plan, out: &mut String) -> fmt::Result {
    if let Some(summary) = &plan.summary {
        writeln!(out)?;
        writeln!(out, "Summary")?;
        writeln!(out, "{}", summary)?;
    }
    render_list("Priority Actions", plan.priority_actions.as_ref(), out)?;
    render_list("Suggestions", plan.suggestions.as_ref(), out)?;
    render_list("Quick Tips", plan.quick_tips.as_ref(), out)?;
    if let Some(rationale) = &plan.rationale {
        writeln!(out)?;
        writeln!(out, "Rationale")?;
        writeln!(out, "{}", rationale)?;
    }
    Ok(())
}

fn history_timestamp(entry: &PlanHistoryEntry) -> String {
    entry
        .created_at_utc()
        .map(|t| t.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| entry.created_at.clone())
}

fn render_history(history: &PlanHistory, out: &mut String) -> fmt::Result {
    if history.is_loading() {
        return writeln!(out, "Loading history…");
    }
    if history.entries().is_empty() {
        return writeln!(out, "No saved plans yet.");
    }

    writeln!(out, "Your Daily Plan History")?;
    for entry in history.entries() {
        let expanded = history.is_expanded(&entry.id);
        writeln!(out)?;
        writeln!(
            out,
            "{}  {}  [{}]  id={}",
            history_timestamp(entry),
            entry.location_name,
            if expanded { "Hide Details" } else { "View Details" },
            entry.id
        )?;
        if expanded {
            render_plan(&entry.plan, out)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn plan_text(plan: &Plan) -> String {
        let mut out = String::new();
        render_plan(plan, &mut out).unwrap();
        out
    }

    #[test]
    fn summary_only_plan_has_one_section() {
        let plan = Plan {
            summary: Some("Rainy day ahead".into()),
            ..Plan::default()
        };
        let text = plan_text(&plan);
        assert!(text.contains("Summary\nRainy day ahead\n"));
        assert!(!text.contains("Priority Actions"));
        assert!(!text.contains("Rationale"));
    }

    #[test]
    fn empty_lists_are_omitted() {
        let plan = Plan {
            priority_actions: Some(vec![]),
            quick_tips: Some(vec!["Carry water".into()]),
            ..Plan::default()
        };
        let text = plan_text(&plan);
        assert!(!text.contains("Priority Actions"));
        assert!(text.contains("Quick Tips\n  - Carry water"));
    }

    #[test]
    fn weather_uses_openweather_fields() {
        let weather = WeatherSnapshot(json!({
            "name": "Dhaka",
            "sys": { "country": "BD" },
            "main": { "temp": 30.6, "feels_like": 35.2, "humidity": 70 },
            "weather": [{ "description": "light rain" }],
            "wind": { "speed": 3.1 },
            "dt": 1_700_000_000,
            "timezone": 21600
        }));
        let mut out = String::new();
        render_weather(&weather, &mut out).unwrap();
        assert!(out.contains("Dhaka, BD"));
        assert!(out.contains("31°C  light rain"));
        assert!(out.contains("Humidity 70%"));
        assert!(out.contains("Wind 3.1 m/s"));
        assert!(out.contains("local time"));
    }

    #[test]
    fn unknown_weather_shape_falls_back_to_json() {
        let weather = WeatherSnapshot(json!({ "forecast": "sunny" }));
        let mut out = String::new();
        render_weather(&weather, &mut out).unwrap();
        assert!(out.contains("\"forecast\""));
    }

    #[test]
    fn news_is_capped() {
        let articles: Vec<_> = (0..8)
            .map(|i| json!({ "title": format!("Story {}", i), "url": "https://example.com" }))
            .collect();
        let news = NewsSnapshot(json!({ "articles": articles }));
        let mut out = String::new();
        render_news(&news, &mut out).unwrap();
        assert_eq!(out.matches("  - ").count(), MAX_HEADLINES);
        assert!(!out.contains("Story 5"));
    }

    #[test]
    fn hero_shows_generating_while_loading() {
        let mut out = String::new();
        render_hero(None, true, &mut out).unwrap();
        assert!(out.contains("Select or add a location to get started."));
        assert!(out.contains("[Generating…]"));
    }

    #[test]
    fn empty_history_message() {
        let mut out = String::new();
        render_history(&PlanHistory::default(), &mut out).unwrap();
        assert_eq!(out, "No saved plans yet.\n");
    }

    #[test]
    fn notices_are_prefixed() {
        let text = render_notices(&[
            Notice::Info("Registration successful. Please login.".into()),
            Notice::Error("Error generating plan".into()),
        ]);
        assert_eq!(
            text,
            "* Registration successful. Please login.\n! Error generating plan\n"
        );
    }
}
