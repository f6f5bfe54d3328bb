use crate::types::Activity;
use chrono::{DateTime, Duration, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Type,
    Distance,
    Duration,
    Cadence,
    Elevation,
}

/// The raw text a submit reads from the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormInput {
    pub activity: Activity,
    pub distance: String,
    pub duration: String,
    pub cadence: String,
    pub elevation: String,
}

/// State of the workout entry form.
///
/// Exactly one of the cadence and elevation rows is hidden; which one
/// follows the type selector. Hiding the form suppresses its layout for a
/// short delay so the slide-out transition doesn't flash.
#[derive(Debug, Clone)]
pub struct WorkoutForm {
    hidden: bool,
    activity: Activity,
    distance: String,
    duration: String,
    cadence: String,
    elevation: String,
    cadence_row_hidden: bool,
    elevation_row_hidden: bool,
    focus: Option<Field>,
    suppressed_until: Option<DateTime<Utc>>,
    reveal_delay: Duration,
}

impl WorkoutForm {
    pub fn new(reveal_delay: Duration) -> Self {
        Self {
            hidden: true,
            activity: Activity::Running,
            distance: String::new(),
            duration: String::new(),
            cadence: String::new(),
            elevation: String::new(),
            cadence_row_hidden: false,
            elevation_row_hidden: true,
            focus: None,
            suppressed_until: None,
            reveal_delay,
        }
    }

    pub const fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub const fn activity(&self) -> Activity {
        self.activity
    }

    pub const fn focus(&self) -> Option<Field> {
        self.focus
    }

    pub fn show(&mut self) {
        self.hidden = false;
        self.focus = Some(Field::Distance);
    }

    /// Clear every input and hide the form.
    pub fn hide(&mut self, now: DateTime<Utc>) {
        self.distance.clear();
        self.duration.clear();
        self.cadence.clear();
        self.elevation.clear();
        self.hidden = true;
        self.focus = None;
        self.suppressed_until = Some(now + self.reveal_delay);
    }

    /// Whether the form takes part in layout at `now`.
    pub fn is_laid_out(&self, now: DateTime<Utc>) -> bool {
        self.suppressed_until.is_none_or(|until| now >= until)
    }

    /// Flip which metric row is visible.
    pub fn toggle_metric_rows(&mut self) {
        self.cadence_row_hidden = !self.cadence_row_hidden;
        self.elevation_row_hidden = !self.elevation_row_hidden;
    }

    /// Change the type selector. The metric rows follow it.
    pub fn select(&mut self, activity: Activity) {
        if self.activity != activity {
            self.activity = activity;
            self.toggle_metric_rows();
        }
    }

    pub const fn is_row_hidden(&self, field: Field) -> bool {
        match field {
            Field::Cadence => self.cadence_row_hidden,
            Field::Elevation => self.elevation_row_hidden,
            Field::Type | Field::Distance | Field::Duration => false,
        }
    }

    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        let value = value.into();
        match field {
            Field::Type => match value.as_str() {
                "running" => self.select(Activity::Running),
                "cycling" => self.select(Activity::Cycling),
                other => tracing::warn!(value = other, "ignoring unknown workout type"),
            },
            Field::Distance => self.distance = value,
            Field::Duration => self.duration = value,
            Field::Cadence => self.cadence = value,
            Field::Elevation => self.elevation = value,
        }
    }

    pub fn value(&self, field: Field) -> &str {
        match field {
            Field::Type => self.activity.as_str(),
            Field::Distance => &self.distance,
            Field::Duration => &self.duration,
            Field::Cadence => &self.cadence,
            Field::Elevation => &self.elevation,
        }
    }

    pub fn read(&self) -> FormInput {
        FormInput {
            activity: self.activity,
            distance: self.distance.clone(),
            duration: self.duration.clone(),
            cadence: self.cadence.clone(),
            elevation: self.elevation.clone(),
        }
    }
}
