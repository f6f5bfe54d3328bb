use crate::cli::Cli;
use crate::map::TileLayer;
use crate::types::Coords;
use chrono::Duration;
use std::path::PathBuf;

/// How long the form stays out of layout after being hidden.
pub const FORM_REVEAL_DELAY_MS: i64 = 1000;
pub const DEFAULT_ZOOM: u8 = 13;

/// Application configuration, resolved from the command line and environment.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub store: PathBuf,
    pub position: Option<Coords>,
    pub zoom: u8,
    pub tiles: TileLayer,
    pub reveal_delay: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            store: PathBuf::from("mapty.json"),
            position: None,
            zoom: DEFAULT_ZOOM,
            tiles: TileLayer::default(),
            reveal_delay: Duration::milliseconds(FORM_REVEAL_DELAY_MS),
        }
    }
}

impl From<&Cli> for AppConfig {
    fn from(cli: &Cli) -> Self {
        let defaults = TileLayer::default();
        Self {
            store: cli.store.clone(),
            position: cli.position,
            zoom: cli.zoom,
            tiles: TileLayer {
                url_template: cli.tiles.clone().unwrap_or(defaults.url_template),
                attribution: cli.attribution.clone().unwrap_or(defaults.attribution),
            },
            ..Self::default()
        }
    }
}
