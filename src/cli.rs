use crate::types::{Activity, Coords};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

const DEFAULT_STORE: &str = "mapty.json";

#[derive(Parser, Debug)]
#[command(
    name = "mapty",
    about = "Log running and cycling workouts on a map"
)]
pub struct Cli {
    /// Key-value store file holding the saved workouts.
    #[arg(long, env = "MAPTY_STORE", default_value = DEFAULT_STORE, global = true)]
    pub store: PathBuf,

    /// Current position as LAT,LNG. Without it the map stays unavailable.
    #[arg(long, env = "MAPTY_POSITION", value_name = "LAT,LNG", global = true)]
    pub position: Option<Coords>,

    /// Initial map zoom level.
    #[arg(long, default_value_t = 13, global = true)]
    pub zoom: u8,

    /// Tile URL template for the map.
    #[arg(long, env = "MAPTY_TILES", global = true)]
    pub tiles: Option<String>,

    /// Attribution HTML shown with the tiles.
    #[arg(long, env = "MAPTY_ATTRIBUTION", global = true)]
    pub attribution: Option<String>,

    /// Increase log verbosity (-v, -vv). Defaults to INFO.
    #[arg(short = 'v', long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Decrease log verbosity (-q, -qq). Defaults to INFO.
    #[arg(short = 'q', long, action = ArgAction::Count, global = true)]
    pub quiet: u8,

    #[command(subcommand)]
    pub cmd: Cmd,
}

#[derive(Subcommand, Debug)]
pub enum Cmd {
    /// Record a workout by clicking the map and submitting the form.
    Add {
        #[arg(value_enum)]
        kind: Kind,

        /// Where to click the map. Defaults to the current position.
        #[arg(long, value_name = "LAT,LNG")]
        at: Option<Coords>,

        /// Distance in km, as typed into the form.
        #[arg(long, default_value = "", allow_hyphen_values = true)]
        distance: String,

        /// Duration in minutes, as typed into the form.
        #[arg(long, default_value = "", allow_hyphen_values = true)]
        duration: String,

        /// Steps per minute (running).
        #[arg(long, default_value = "", allow_hyphen_values = true)]
        cadence: String,

        /// Elevation gain in meters (cycling).
        #[arg(long, default_value = "", allow_hyphen_values = true)]
        elevation: String,
    },

    /// Print the workout list, newest first.
    List {
        /// Print the sidebar HTML instead of one line per workout.
        #[arg(long)]
        html: bool,
    },

    /// Write the map with every workout marker as a standalone HTML page.
    Map {
        #[arg(long, short = 'o', default_value = "mapty.html")]
        out: PathBuf,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Running,
    Cycling,
}

impl From<Kind> for Activity {
    fn from(k: Kind) -> Self {
        match k {
            Kind::Running => Self::Running,
            Kind::Cycling => Self::Cycling,
        }
    }
}
