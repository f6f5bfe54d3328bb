//! HTML fragments for the sidebar list and marker popups.
//!
//! Everything here reads data fields only, so restored and freshly created
//! workouts render the same way.

use crate::types::{Workout, WorkoutKind};
use quick_xml::escape::escape;
use std::fmt::Write;

/// CSS class attached to a workout's popup, e.g. `running-popup`.
pub fn popup_class(w: &Workout) -> String {
    format!("{}-popup", w.activity())
}

pub fn popup_content(w: &Workout) -> String {
    format!("{} {}", w.activity().icon(), escape(w.description.as_str()))
}

fn detail(html: &mut String, icon: &str, value: &str, unit: &str) {
    let _ = write!(
        html,
        r#"
  <div class="workout__details">
    <span class="workout__icon">{icon}</span>
    <span class="workout__value">{value}</span>
    <span class="workout__unit">{unit}</span>
  </div>"#
    );
}

/// One `<li>` entry of the workout list.
pub fn list_item(w: &Workout) -> String {
    let kind = w.activity();
    let mut html = format!(
        r#"<li class="workout workout--{kind}" data-id="{id}">
  <h2 class="workout__title">{title}</h2>"#,
        id = escape(w.id.as_str()),
        title = escape(w.description.as_str()),
    );

    detail(&mut html, kind.icon(), &w.distance.to_string(), "km");
    detail(&mut html, "⏱", &w.duration.to_string(), "min");

    match w.kind {
        WorkoutKind::Running { cadence, pace } => {
            detail(&mut html, "⚡️", &format!("{pace:.1}"), "min/km");
            detail(&mut html, "🦶🏼", &cadence.to_string(), "spm");
        }
        WorkoutKind::Cycling {
            elevation_gain,
            speed,
        } => {
            detail(&mut html, "⚡️", &format!("{speed:.1}"), "km/h");
            detail(&mut html, "⛰", &elevation_gain.to_string(), "m");
        }
    }

    html.push_str("\n</li>");
    html
}

/// Plain one-line summary used by the terminal listing.
pub fn summary_line(w: &Workout) -> String {
    let (metric, unit, extra) = match w.kind {
        WorkoutKind::Running { cadence, pace } => (pace, "min/km", format!("{cadence} spm")),
        WorkoutKind::Cycling {
            elevation_gain,
            speed,
        } => (speed, "km/h", format!("{elevation_gain} m")),
    };
    format!(
        "{}\t{}\t{} km\t{} min\t{metric:.1} {unit}\t{extra}\t{}",
        w.id, w.description, w.distance, w.duration, w.coords
    )
}

/// The rendered workout list. New entries go to the top, right under the
/// form, so the list reads newest first.
#[derive(Debug, Clone, Default)]
pub struct Sidebar {
    items: Vec<String>,
}

impl Sidebar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, w: &Workout) {
        self.items.insert(0, list_item(w));
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn to_html(&self) -> String {
        self.items.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Coords;
    use chrono::{TimeZone, Utc};

    fn at() -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 9, 3, 12, 0, 0).unwrap()
    }

    #[test]
    fn running_item_shows_pace_and_cadence() {
        let w = Workout::running_at(at(), Coords(1.0, 2.0), 5.0, 30.0, 150.0);
        let html = list_item(&w);
        assert!(html.starts_with(r#"<li class="workout workout--running""#));
        assert!(html.contains(&format!(r#"data-id="{}""#, w.id)));
        assert!(html.contains(r#"<h2 class="workout__title">Running on September 3</h2>"#));
        assert!(html.contains(r#"<span class="workout__value">6.0</span>"#));
        assert!(html.contains(r#"<span class="workout__value">150</span>"#));
        assert!(html.contains("spm"));
        assert!(!html.contains("km/h"));
        assert!(html.ends_with("</li>"));
    }

    #[test]
    fn cycling_item_shows_speed_and_elevation() {
        let w = Workout::cycling_at(at(), Coords(1.0, 2.0), 10.0, 20.0, -40.5);
        let html = list_item(&w);
        assert!(html.contains("workout--cycling"));
        assert!(html.contains(r#"<span class="workout__value">30.0</span>"#));
        assert!(html.contains(r#"<span class="workout__value">-40.5</span>"#));
        assert!(html.contains("km/h"));
    }

    #[test]
    fn popup_uses_kind_icon_and_class() {
        let w = Workout::cycling_at(at(), Coords(1.0, 2.0), 10.0, 20.0, 0.0);
        assert_eq!(popup_class(&w), "cycling-popup");
        assert_eq!(popup_content(&w), "🚴‍♀️ Cycling on September 3");
    }

    #[test]
    fn restored_description_is_escaped() {
        let mut w = Workout::running_at(at(), Coords(1.0, 2.0), 5.0, 30.0, 150.0);
        w.description = "<b>x</b>".into();
        assert!(list_item(&w).contains("&lt;b&gt;x&lt;/b&gt;"));
        assert!(popup_content(&w).ends_with("&lt;b&gt;x&lt;/b&gt;"));
    }

    #[test]
    fn sidebar_lists_newest_first() {
        let older = Workout::running_at(at(), Coords(1.0, 2.0), 5.0, 30.0, 150.0);
        let newer = Workout::cycling_at(
            at() + chrono::Duration::minutes(5),
            Coords(1.0, 2.0),
            10.0,
            20.0,
            0.0,
        );
        let mut sidebar = Sidebar::new();
        assert!(sidebar.is_empty());
        sidebar.push(&older);
        sidebar.push(&newer);
        assert_eq!(sidebar.len(), 2);
        assert!(sidebar.items()[0].contains("workout--cycling"));
        assert!(sidebar.to_html().find("workout--cycling") < sidebar.to_html().find("workout--running"));
    }
}
