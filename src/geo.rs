use crate::types::Coords;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LocationError {
    #[error("Position not found")]
    Unavailable,
}

/// Source of the user's current position. Asked once at startup.
pub trait Geolocator {
    fn current_position(&mut self) -> Result<Coords, LocationError>;
}

/// A position fixed up front, e.g. from the command line.
#[derive(Debug, Clone, Copy)]
pub struct FixedPosition(pub Option<Coords>);

impl Geolocator for FixedPosition {
    fn current_position(&mut self) -> Result<Coords, LocationError> {
        self.0.ok_or(LocationError::Unavailable)
    }
}

impl FromStr for Coords {
    type Err = String;

    /// `LAT,LNG` in decimal degrees.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (lat, lng) = s
            .split_once(',')
            .ok_or_else(|| format!("expected LAT,LNG, got {s:?}"))?;
        let lat: f64 = lat
            .trim()
            .parse()
            .map_err(|e| format!("bad latitude {lat:?}: {e}"))?;
        let lng: f64 = lng
            .trim()
            .parse()
            .map_err(|e| format!("bad longitude {lng:?}: {e}"))?;
        if !(-90.0..=90.0).contains(&lat) {
            return Err(format!("latitude out of range: {lat}"));
        }
        if !(-180.0..=180.0).contains(&lng) {
            return Err(format!("longitude out of range: {lng}"));
        }
        Ok(Self(lat, lng))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_lat_lng() {
        assert_eq!("48.85, 2.35".parse::<Coords>(), Ok(Coords(48.85, 2.35)));
        assert_eq!("-33.9,18.4".parse::<Coords>(), Ok(Coords(-33.9, 18.4)));
        assert!("48.85".parse::<Coords>().is_err());
        assert!("91,0".parse::<Coords>().is_err());
        assert!("0,181".parse::<Coords>().is_err());
        assert!("NaN,0".parse::<Coords>().is_err());
    }

    #[test]
    fn fixed_position_without_fix_fails() {
        assert_eq!(
            FixedPosition(None).current_position(),
            Err(LocationError::Unavailable)
        );
        assert_eq!(
            FixedPosition(Some(Coords(1.0, 2.0))).current_position(),
            Ok(Coords(1.0, 2.0))
        );
    }
}
