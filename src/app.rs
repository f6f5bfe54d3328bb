use crate::config::AppConfig;
use crate::dlog;
use crate::form::{Field, FormInput, WorkoutForm};
use crate::geo::Geolocator;
use crate::map::{Map, MapWidget};
use crate::render::{self, Sidebar};
use crate::storage::{KeyValueStore, StoreError, WorkoutStore};
use crate::types::{Activity, Coords, Workout};
use crate::validate::{InvalidInput, coerce_number, validate_cycling, validate_running};
use chrono::{DateTime, Duration, Utc};
use std::sync::mpsc::{Receiver, Sender, channel};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    AwaitingLocation,
    /// No position or the widget failed; the list still works.
    MapUnavailable,
    MapReady,
    FormOpen,
}

/// Events delivered to the controller from widget callbacks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Event {
    MapClicked(Coords),
}

#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error("form is not open")]
    FormClosed,

    #[error(transparent)]
    Invalid(#[from] InvalidInput),

    /// The workout was recorded and rendered but could not be saved.
    #[error("workout {id} recorded but not saved: {source}")]
    NotSaved { id: String, source: StoreError },
}

/// Owns every piece of UI state and wires form, map, list and storage.
pub struct App<S, W, G> {
    state: State,
    workouts: Vec<Workout>,
    store: WorkoutStore<S>,
    map: Map<W>,
    geo: G,
    form: WorkoutForm,
    sidebar: Sidebar,
    alerts: Vec<String>,
    clicked_at: Option<Coords>,
    zoom: u8,
    events_tx: Sender<Event>,
    events_rx: Receiver<Event>,
}

impl<S, W, G> App<S, W, G>
where
    S: KeyValueStore,
    W: MapWidget,
    G: Geolocator,
{
    /// Build the controller and render any previously saved workouts.
    pub fn new(config: &AppConfig, store: S, widget: W, geo: G) -> Self {
        let (events_tx, events_rx) = channel();
        let mut app = Self {
            state: State::AwaitingLocation,
            workouts: Vec::new(),
            store: WorkoutStore::new(store),
            map: Map::new(widget, config.tiles.clone()),
            geo,
            form: WorkoutForm::new(config.reveal_delay),
            sidebar: Sidebar::new(),
            alerts: Vec::new(),
            clicked_at: None,
            zoom: config.zoom,
            events_tx,
            events_rx,
        };
        app.restore();
        app
    }

    fn restore(&mut self) {
        let Some(workouts) = self.store.load() else {
            return;
        };
        for w in &workouts {
            self.sidebar.push(w);
        }
        self.workouts = workouts;
    }

    /// Ask for the current position and bring up the map around it.
    pub fn start(&mut self) {
        if self.state != State::AwaitingLocation {
            dlog!("start ignored state={:?}", self.state);
            return;
        }
        match self.geo.current_position() {
            Ok(center) => self.load_map(center),
            Err(e) => {
                self.alert(e.to_string());
                self.state = State::MapUnavailable;
            }
        }
    }

    fn load_map(&mut self, center: Coords) {
        if let Err(e) = self.map.initialize(center, self.zoom) {
            tracing::warn!(err = %e, "map unavailable");
            self.state = State::MapUnavailable;
            return;
        }

        let tx = self.events_tx.clone();
        self.map.on_click(move |coords| {
            let _ = tx.send(Event::MapClicked(coords));
        });

        for w in &self.workouts {
            self.map
                .place_marker(w.coords, &render::popup_content(w), &render::popup_class(w));
        }
        self.state = State::MapReady;
        tracing::info!(%center, markers = self.workouts.len(), "map ready");
    }

    /// Report a click on the map, then handle whatever it triggered.
    pub fn click_map(&mut self, coords: Coords) {
        self.map.click(coords);
        self.pump();
    }

    /// Drain pending widget events.
    pub fn pump(&mut self) {
        while let Ok(event) = self.events_rx.try_recv() {
            self.handle(event);
        }
    }

    fn handle(&mut self, event: Event) {
        match event {
            Event::MapClicked(coords) => match self.state {
                State::MapReady | State::FormOpen => {
                    self.clicked_at = Some(coords);
                    self.form.show();
                    self.state = State::FormOpen;
                    dlog!("form open at={coords}");
                }
                State::AwaitingLocation | State::MapUnavailable => {
                    dlog!("click ignored state={:?}", self.state);
                }
            },
        }
    }

    /// Change the form's type selector.
    pub fn select_type(&mut self, activity: Activity) {
        self.form.select(activity);
    }

    pub fn fill(&mut self, field: Field, value: impl Into<String>) {
        self.form.set(field, value);
    }

    /// Validate the form and record a workout from it.
    ///
    /// On invalid input the user is alerted and the form stays open with
    /// nothing changed.
    pub fn submit_form(&mut self) -> Result<&Workout, SubmitError> {
        if self.state != State::FormOpen {
            dlog!("submit ignored state={:?}", self.state);
            return Err(SubmitError::FormClosed);
        }
        let Some(coords) = self.clicked_at else {
            return Err(SubmitError::FormClosed);
        };

        let workout = match self.build_workout(&self.form.read(), coords) {
            Ok(w) => w,
            Err(e) => {
                self.alert(e.to_string());
                return Err(e.into());
            }
        };
        tracing::info!(
            id = %workout.id,
            kind = %workout.activity(),
            distance = workout.distance,
            duration = workout.duration,
            "workout recorded"
        );

        self.map.place_marker(
            workout.coords,
            &render::popup_content(&workout),
            &render::popup_class(&workout),
        );
        self.sidebar.push(&workout);
        self.workouts.push(workout);

        self.form.hide(Utc::now());
        self.clicked_at = None;
        self.state = State::MapReady;

        let saved = self.store.save(&self.workouts);
        let last = self.workouts.len() - 1;
        match saved {
            Ok(()) => Ok(&self.workouts[last]),
            Err(source) => {
                tracing::error!(err = %source, "saving workouts failed");
                Err(SubmitError::NotSaved {
                    id: self.workouts[last].id.clone(),
                    source,
                })
            }
        }
    }

    fn build_workout(&self, input: &FormInput, coords: Coords) -> Result<Workout, InvalidInput> {
        let distance = coerce_number(&input.distance);
        let duration = coerce_number(&input.duration);
        let date = creation_instant(Utc::now(), self.workouts.last().map(|w| w.date));

        match input.activity {
            Activity::Running => {
                let cadence = coerce_number(&input.cadence);
                validate_running(distance, duration, cadence)?;
                Ok(Workout::running_at(date, coords, distance, duration, cadence))
            }
            Activity::Cycling => {
                let elevation = coerce_number(&input.elevation);
                validate_cycling(distance, duration, elevation)?;
                Ok(Workout::cycling_at(date, coords, distance, duration, elevation))
            }
        }
    }

    fn alert(&mut self, message: String) {
        tracing::warn!(alert = %message, "alerting user");
        self.alerts.push(message);
    }

    /// Alerts raised since the last call.
    pub fn take_alerts(&mut self) -> Vec<String> {
        std::mem::take(&mut self.alerts)
    }

    pub const fn state(&self) -> State {
        self.state
    }

    pub fn workouts(&self) -> &[Workout] {
        &self.workouts
    }

    pub const fn sidebar(&self) -> &Sidebar {
        &self.sidebar
    }

    pub const fn form(&self) -> &WorkoutForm {
        &self.form
    }

    pub const fn map(&self) -> &Map<W> {
        &self.map
    }

    pub const fn store(&self) -> &WorkoutStore<S> {
        &self.store
    }
}

/// `now`, or 1 ms past `last` when `now` falls in the same or an earlier
/// millisecond. Ids are built from the millisecond, so this keeps them unique
/// and in creation order.
fn creation_instant(now: DateTime<Utc>, last: Option<DateTime<Utc>>) -> DateTime<Utc> {
    match last {
        Some(last) if now.timestamp_millis() <= last.timestamp_millis() => last
            .checked_add_signed(Duration::milliseconds(1))
            .unwrap_or(now),
        _ => now,
    }
}
