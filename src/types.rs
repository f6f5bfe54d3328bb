use chrono::{DateTime, Datelike, Local, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

const MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// A `[lat, lng]` pair, serialized as a two-element array.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coords(pub f64, pub f64);

impl Coords {
    pub const fn lat(self) -> f64 {
        self.0
    }

    pub const fn lng(self) -> f64 {
        self.1
    }
}

impl fmt::Display for Coords {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.0, self.1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Activity {
    Running,
    Cycling,
}

impl Activity {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Cycling => "cycling",
        }
    }

    pub const fn icon(self) -> &'static str {
        match self {
            Self::Running => "🏃‍♂️",
            Self::Cycling => "🚴‍♀️",
        }
    }
}

impl fmt::Display for Activity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind-specific data. The `type` tag and the derived metric travel with it,
/// so a reloaded record is the same value as a freshly built one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum WorkoutKind {
    Running {
        cadence: f64,
        /// min/km
        #[serde(default)]
        pace: f64,
    },
    Cycling {
        #[serde(rename = "elevationGain")]
        elevation_gain: f64,
        /// km/h
        #[serde(default)]
        speed: f64,
    },
}

impl WorkoutKind {
    pub const fn activity(&self) -> Activity {
        match self {
            Self::Running { .. } => Activity::Running,
            Self::Cycling { .. } => Activity::Cycling,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workout {
    pub id: String,
    pub date: DateTime<Utc>,
    pub coords: Coords,
    /// km
    pub distance: f64,
    /// min
    pub duration: f64,
    pub description: String,
    #[serde(flatten)]
    pub kind: WorkoutKind,
}

impl Workout {
    pub fn running(coords: Coords, distance: f64, duration: f64, cadence: f64) -> Self {
        Self::running_at(Utc::now(), coords, distance, duration, cadence)
    }

    pub fn cycling(coords: Coords, distance: f64, duration: f64, elevation_gain: f64) -> Self {
        Self::cycling_at(Utc::now(), coords, distance, duration, elevation_gain)
    }

    pub fn running_at(
        date: DateTime<Utc>,
        coords: Coords,
        distance: f64,
        duration: f64,
        cadence: f64,
    ) -> Self {
        Self::build(
            date,
            coords,
            distance,
            duration,
            WorkoutKind::Running {
                cadence,
                pace: pace(distance, duration),
            },
        )
    }

    pub fn cycling_at(
        date: DateTime<Utc>,
        coords: Coords,
        distance: f64,
        duration: f64,
        elevation_gain: f64,
    ) -> Self {
        Self::build(
            date,
            coords,
            distance,
            duration,
            WorkoutKind::Cycling {
                elevation_gain,
                speed: speed(distance, duration),
            },
        )
    }

    fn build(
        date: DateTime<Utc>,
        coords: Coords,
        distance: f64,
        duration: f64,
        kind: WorkoutKind,
    ) -> Self {
        Self {
            id: id_from_instant(date),
            description: describe(kind.activity(), date),
            date,
            coords,
            distance,
            duration,
            kind,
        }
    }

    pub const fn activity(&self) -> Activity {
        self.kind.activity()
    }

    /// The kind-specific derived value: pace for running, speed for cycling.
    pub const fn metric(&self) -> f64 {
        match self.kind {
            WorkoutKind::Running { pace, .. } => pace,
            WorkoutKind::Cycling { speed, .. } => speed,
        }
    }

    pub const fn pace(&self) -> Option<f64> {
        match self.kind {
            WorkoutKind::Running { pace, .. } => Some(pace),
            WorkoutKind::Cycling { .. } => None,
        }
    }

    pub const fn speed(&self) -> Option<f64> {
        match self.kind {
            WorkoutKind::Cycling { speed, .. } => Some(speed),
            WorkoutKind::Running { .. } => None,
        }
    }

    /// Recompute the derived metric from `distance` and `duration`.
    ///
    /// Used after deserializing, where the stored value may be absent.
    pub fn refresh_metric(&mut self) {
        let (distance, duration) = (self.distance, self.duration);
        match &mut self.kind {
            WorkoutKind::Running { pace: p, .. } => *p = pace(distance, duration),
            WorkoutKind::Cycling { speed: s, .. } => *s = speed(distance, duration),
        }
    }
}

pub fn pace(distance: f64, duration: f64) -> f64 {
    duration / distance
}

pub fn speed(distance: f64, duration: f64) -> f64 {
    distance / (duration / 60.0)
}

/// Last 10 digits of the epoch-millisecond timestamp.
pub fn id_from_instant(date: DateTime<Utc>) -> String {
    let ms = date.timestamp_millis().to_string();
    let start = ms.len().saturating_sub(10);
    ms[start..].to_string()
}

/// `Running on April 14`, with the month and day as seen on the local clock.
pub fn describe(activity: Activity, date: DateTime<Utc>) -> String {
    describe_in(activity, date, &Local)
}

pub fn describe_in<Tz: TimeZone>(activity: Activity, date: DateTime<Utc>, tz: &Tz) -> String {
    let date = date.with_timezone(tz);
    let name = activity.as_str();
    let mut chars = name.chars();
    let capitalized: String = chars
        .next()
        .map(|c| c.to_uppercase().chain(chars).collect())
        .unwrap_or_default();
    let month = MONTHS
        .get(usize::try_from(date.month0()).unwrap_or_default())
        .copied()
        .unwrap_or_default();
    format!("{capitalized} on {month} {}", date.day())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 4, 14, 12, 0, 0).unwrap()
    }

    #[test]
    fn running_derives_pace_and_description() {
        let w = Workout::running_at(noon(), Coords(48.85, 2.35), 5.0, 30.0, 150.0);
        assert_eq!(w.pace(), Some(6.0));
        assert_eq!(w.speed(), None);
        assert_eq!(w.description, "Running on April 14");
        assert_eq!(w.activity(), Activity::Running);
    }

    #[test]
    fn cycling_derives_speed_with_negative_elevation() {
        let w = Workout::cycling_at(noon(), Coords(0.0, 0.0), 27.0, 95.0, -523.0);
        assert_eq!(w.speed(), Some(27.0 / (95.0 / 60.0)));
        assert_eq!(w.description, "Cycling on April 14");
    }

    #[test]
    fn pace_is_exact_for_arbitrary_inputs() {
        for (d, t) in [(0.3, 7.1), (42.195, 181.0), (1e-3, 1e3)] {
            let w = Workout::running_at(noon(), Coords(1.0, 1.0), d, t, 170.0);
            assert_eq!(w.metric(), t / d);
        }
    }

    #[test]
    fn description_follows_the_clock_it_is_read_on() {
        // 02:00 UTC on the 15th is still the evening of the 14th in New York.
        let late = Utc.with_ymd_and_hms(2024, 4, 15, 2, 0, 0).unwrap();
        let new_york = FixedOffset::west_opt(4 * 3600).unwrap();
        let tokyo = FixedOffset::east_opt(9 * 3600).unwrap();
        assert_eq!(describe_in(Activity::Running, late, &new_york), "Running on April 14");
        assert_eq!(describe_in(Activity::Running, late, &tokyo), "Running on April 15");
        assert_eq!(describe_in(Activity::Cycling, late, &Utc), "Cycling on April 15");
    }

    #[test]
    fn constructed_description_uses_local_date() {
        let late = Utc.with_ymd_and_hms(2024, 4, 15, 2, 0, 0).unwrap();
        let w = Workout::running_at(late, Coords(0.0, 0.0), 5.0, 30.0, 150.0);
        let local = late.with_timezone(&Local);
        let month = MONTHS[usize::try_from(local.month0()).unwrap()];
        assert_eq!(w.description, format!("Running on {month} {}", local.day()));
    }

    #[test]
    fn id_is_last_ten_digits_of_millis() {
        let date = noon();
        let ms = date.timestamp_millis().to_string();
        let id = id_from_instant(date);
        assert_eq!(id.len(), 10);
        assert!(ms.ends_with(&id));
    }

    #[test]
    fn serializes_with_type_tag_and_camel_case() {
        let w = Workout::cycling_at(noon(), Coords(12.0, 0.1), 10.0, 20.0, 523.0);
        let v = serde_json::to_value(&w).unwrap();
        assert_eq!(v["type"], "cycling");
        assert_eq!(v["elevationGain"], 523.0);
        assert_eq!(v["speed"], 30.0);
        assert_eq!(v["coords"], serde_json::json!([12.0, 0.1]));
    }

    #[test]
    fn refresh_fills_missing_metric() {
        let raw = r#"{"type":"running","id":"1","date":"2024-04-14T12:00:00Z",
            "coords":[1.0,2.0],"distance":4.0,"duration":22.0,
            "description":"Running on April 14","cadence":160}"#;
        let mut w: Workout = serde_json::from_str(raw).unwrap();
        assert_eq!(w.pace(), Some(0.0));
        w.refresh_metric();
        assert_eq!(w.pace(), Some(5.5));
    }
}
