use crate::dlog;
use crate::types::Coords;
use quick_xml::escape::escape;
use std::fmt::Write;

pub const OSM_TILES: &str = "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png";
pub const OSM_ATTRIBUTION: &str =
    r#"&copy; <a href="https://www.openstreetmap.org/copyright">OpenStreetMap</a> contributors"#;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileLayer {
    pub url_template: String,
    pub attribution: String,
}

impl Default for TileLayer {
    fn default() -> Self {
        Self {
            url_template: OSM_TILES.to_string(),
            attribution: OSM_ATTRIBUTION.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopupOptions {
    pub max_width: u32,
    pub min_width: u32,
    pub auto_close: bool,
    pub close_on_click: bool,
    pub class_name: String,
}

impl PopupOptions {
    /// A popup that stays open while others open and the map is clicked.
    pub fn sticky(class_name: impl Into<String>) -> Self {
        Self {
            max_width: 250,
            min_width: 100,
            auto_close: false,
            close_on_click: false,
            class_name: class_name.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub coords: Coords,
    pub popup: PopupOptions,
    pub content: String,
    pub open: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("map widget failed to initialize: {0}")]
    Init(String),
    #[error("map is not initialized")]
    NotReady,
}

/// The external interactive map.
pub trait MapWidget {
    fn set_view(&mut self, center: Coords, zoom: u8) -> Result<(), MapError>;
    fn add_tile_layer(&mut self, layer: &TileLayer) -> Result<(), MapError>;
    fn add_marker(&mut self, marker: Marker) -> Result<(), MapError>;
}

type ClickHandler = Box<dyn FnMut(Coords)>;

/// Adapter around a [`MapWidget`]: initialization, click dispatch, markers.
///
/// If initialization fails the map stays degraded: markers are dropped with
/// a warning and nothing is retried.
pub struct Map<W> {
    widget: W,
    tiles: TileLayer,
    ready: bool,
    handlers: Vec<ClickHandler>,
}

impl<W: MapWidget> Map<W> {
    pub fn new(widget: W, tiles: TileLayer) -> Self {
        Self {
            widget,
            tiles,
            ready: false,
            handlers: Vec::new(),
        }
    }

    pub const fn widget(&self) -> &W {
        &self.widget
    }

    pub const fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn initialize(&mut self, center: Coords, zoom: u8) -> Result<(), MapError> {
        self.widget.set_view(center, zoom)?;
        self.widget.add_tile_layer(&self.tiles)?;
        self.ready = true;
        dlog!("map initialized center={center} zoom={zoom}");
        Ok(())
    }

    pub fn on_click(&mut self, handler: impl FnMut(Coords) + 'static) {
        self.handlers.push(Box::new(handler));
    }

    /// Report a click on the map at `coords`.
    pub fn click(&mut self, coords: Coords) {
        if !self.ready {
            dlog!("click ignored; map not ready coords={coords}");
            return;
        }
        for h in &mut self.handlers {
            h(coords);
        }
    }

    pub fn place_marker(&mut self, coords: Coords, content: &str, class_name: &str) {
        if !self.ready {
            tracing::warn!(%coords, "map unavailable; marker not placed");
            return;
        }
        let marker = Marker {
            coords,
            popup: PopupOptions::sticky(class_name),
            content: content.to_string(),
            open: true,
        };
        if let Err(e) = self.widget.add_marker(marker) {
            tracing::warn!(err = %e, %coords, "marker not placed");
        }
    }
}

/// A Leaflet map rendered as a standalone HTML page.
#[derive(Debug, Clone, Default)]
pub struct LeafletPage {
    view: Option<(Coords, u8)>,
    tiles: Option<TileLayer>,
    markers: Vec<Marker>,
}

impl LeafletPage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub const fn view(&self) -> Option<(Coords, u8)> {
        self.view
    }

    pub fn to_html(&self, sidebar: &str) -> Result<String, MapError> {
        let (center, zoom) = self.view.ok_or(MapError::NotReady)?;
        let tiles = self.tiles.clone().unwrap_or_default();

        let mut script = format!(
            "const map = L.map('map').setView([{}, {}], {zoom});\n\
             L.tileLayer({}, {{ attribution: {} }}).addTo(map);\n",
            center.lat(),
            center.lng(),
            js_string(&tiles.url_template),
            js_string(&tiles.attribution),
        );
        for m in &self.markers {
            let p = &m.popup;
            let _ = writeln!(
                script,
                "L.marker([{}, {}]).addTo(map).bindPopup(L.popup({{ maxWidth: {}, minWidth: {}, \
                 autoClose: {}, closeOnClick: {}, className: {} }})).setPopupContent({}){};",
                m.coords.lat(),
                m.coords.lng(),
                p.max_width,
                p.min_width,
                p.auto_close,
                p.close_on_click,
                js_string(&p.class_name),
                js_string(&m.content),
                if m.open { ".openPopup()" } else { "" },
            );
        }

        Ok(format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8" />
<title>mapty</title>
<link rel="stylesheet" href="https://unpkg.com/leaflet@1.9.4/dist/leaflet.css" />
<script src="https://unpkg.com/leaflet@1.9.4/dist/leaflet.js"></script>
<style>
body {{ display: flex; margin: 0; height: 100vh; font-family: sans-serif; }}
.sidebar {{ flex-basis: 30rem; overflow-y: auto; padding: 1rem; }}
.workouts {{ list-style: none; padding: 0; }}
.workout {{ margin-bottom: 1rem; padding: 0.5rem 1rem; border-left: 5px solid; }}
.workout--running {{ border-color: #00c46a; }}
.workout--cycling {{ border-color: #ffb545; }}
.running-popup .leaflet-popup-content-wrapper {{ border-left: 5px solid #00c46a; }}
.cycling-popup .leaflet-popup-content-wrapper {{ border-left: 5px solid #ffb545; }}
#map {{ flex: 1; }}
</style>
</head>
<body>
<div class="sidebar">
<ul class="workouts">
{sidebar}
</ul>
</div>
<div id="map"></div>
<script>
{script}</script>
</body>
</html>
"#
        ))
    }
}

impl MapWidget for LeafletPage {
    fn set_view(&mut self, center: Coords, zoom: u8) -> Result<(), MapError> {
        if !(center.lat().is_finite() && center.lng().is_finite()) {
            return Err(MapError::Init(format!("invalid center {center}")));
        }
        self.view = Some((center, zoom));
        Ok(())
    }

    fn add_tile_layer(&mut self, layer: &TileLayer) -> Result<(), MapError> {
        self.tiles = Some(layer.clone());
        Ok(())
    }

    fn add_marker(&mut self, marker: Marker) -> Result<(), MapError> {
        if self.view.is_none() {
            return Err(MapError::NotReady);
        }
        self.markers.push(marker);
        Ok(())
    }
}

/// A JS string literal. JSON strings are valid JS, and `</` is broken up so
/// the content can't close the surrounding `<script>`.
fn js_string(s: &str) -> String {
    serde_json::to_string(s)
        .unwrap_or_else(|_| format!("\"{}\"", escape(s)))
        .replace("</", "<\\/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn clicks_reach_handlers_only_when_ready() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut map = Map::new(LeafletPage::new(), TileLayer::default());
        let sink = Rc::clone(&seen);
        map.on_click(move |c| sink.borrow_mut().push(c));

        map.click(Coords(1.0, 1.0));
        assert!(seen.borrow().is_empty());

        map.initialize(Coords(48.0, 2.0), 13).unwrap();
        map.click(Coords(48.1, 2.1));
        assert_eq!(*seen.borrow(), vec![Coords(48.1, 2.1)]);
    }

    #[test]
    fn markers_get_sticky_popups() {
        let mut map = Map::new(LeafletPage::new(), TileLayer::default());
        map.initialize(Coords(48.0, 2.0), 13).unwrap();
        map.place_marker(Coords(48.1, 2.1), "🏃‍♂️ Running on May 1", "running-popup");

        let m = &map.widget().markers()[0];
        assert_eq!(m.popup, PopupOptions::sticky("running-popup"));
        assert!(!m.popup.auto_close && !m.popup.close_on_click);
        assert_eq!((m.popup.max_width, m.popup.min_width), (250, 100));
        assert!(m.open);
    }

    #[test]
    fn failed_init_leaves_map_degraded() {
        let mut map = Map::new(LeafletPage::new(), TileLayer::default());
        assert!(map.initialize(Coords(f64::NAN, 0.0), 13).is_err());
        assert!(!map.is_ready());
        map.place_marker(Coords(1.0, 1.0), "x", "running-popup");
        assert!(map.widget().markers().is_empty());
    }

    #[test]
    fn page_embeds_view_tiles_and_markers() {
        let mut map = Map::new(LeafletPage::new(), TileLayer::default());
        map.initialize(Coords(48.5, 2.25), 13).unwrap();
        map.place_marker(Coords(48.6, 2.3), "a </script> b", "cycling-popup");

        let html = map.widget().to_html("<li>x</li>").unwrap();
        assert!(html.contains("setView([48.5, 2.25], 13)"));
        assert!(html.contains("tile.openstreetmap.org"));
        assert!(html.contains(r#"className: "cycling-popup""#));
        assert!(html.contains(r#""a <\/script> b""#));
        assert!(html.contains("<li>x</li>"));
    }

    #[test]
    fn page_without_view_is_an_error() {
        assert!(LeafletPage::new().to_html("").is_err());
    }
}
