//! Mapbox Static Images API: style table, credential pool and request URL.

use rand::Rng;
use rand::seq::IndexedRandom;
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

pub const ZOOM_LEVEL: u8 = 5;
pub const MAP_SIZE: &str = "800x640";

/// Application theme accepted in the `CanvasMode` query parameter.
///
/// Each variant carries its provider style, so every accepted mode has one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ToSchema)]
pub enum CanvasMode {
    CanvasLight,
    RoadDark,
}

impl CanvasMode {
    pub const ALL: [CanvasMode; 2] = [CanvasMode::CanvasLight, CanvasMode::RoadDark];

    pub fn as_str(self) -> &'static str {
        match self {
            CanvasMode::CanvasLight => "CanvasLight",
            CanvasMode::RoadDark => "RoadDark",
        }
    }

    pub fn style(self) -> &'static str {
        match self {
            CanvasMode::CanvasLight => "mapbox/light-v10",
            CanvasMode::RoadDark => "mapbox/dark-v10",
        }
    }
}

impl fmt::Display for CanvasMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCanvasMode;

impl FromStr for CanvasMode {
    type Err = UnknownCanvasMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CanvasMode::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or(UnknownCanvasMode)
    }
}

/// Interchangeable access tokens, one drawn per request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialPool {
    keys: Vec<String>,
}

impl CredentialPool {
    /// Parses a comma-separated list. Blank entries are discarded, so an
    /// unset variable yields an empty pool instead of a single empty token.
    pub fn parse(raw: &str) -> Self {
        Self { keys: crate::config::split_list(raw) }
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&str> {
        self.keys.choose(rng).map(String::as_str)
    }
}

/// Builds the static image URL. Coordinates are inserted as the validated
/// strings so the caller's formatting (`40.0`) is preserved.
pub fn static_map_url(base: &str, mode: CanvasMode, longitude: &str, latitude: &str, token: &str) -> String {
    format!(
        "{}/styles/v1/{}/static/{},{},{}/{}?access_token={}",
        base.trim_end_matches('/'),
        mode.style(),
        longitude,
        latitude,
        ZOOM_LEVEL,
        MAP_SIZE,
        token
    )
}
