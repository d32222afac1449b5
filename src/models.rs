use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// One raw entry of a Nominatim `/search` response.
#[derive(Deserialize, Debug, Clone)]
pub struct RawPlace {
    pub display_name: String,
    #[serde(deserialize_with = "coordinate")]
    pub lat: f64,
    #[serde(deserialize_with = "coordinate")]
    pub lon: f64,
}

/// Nominatim sends coordinates as strings; other geocoders send numbers.
fn coordinate<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StrOrNum {
        Str(String),
        Num(f64),
    }

    let value = match StrOrNum::deserialize(deserializer)? {
        StrOrNum::Num(n) => n,
        StrOrNum::Str(s) => s.trim().parse::<f64>().map_err(serde::de::Error::custom)?,
    };
    if !value.is_finite() {
        return Err(serde::de::Error::custom(format!("coordinate {} is not finite", value)));
    }
    Ok(value)
}

/// A candidate location returned by the geocoder.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct GeocodeResult {
    pub display_name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl From<RawPlace> for GeocodeResult {
    fn from(raw: RawPlace) -> Self {
        Self {
            display_name: raw.display_name,
            latitude: raw.lat,
            longitude: raw.lon,
        }
    }
}

/// An autocomplete list entry, shaped the way jQuery UI's autocomplete consumes it.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Suggestion {
    pub label: String,
    pub value: String,
    pub lat: f64,
    pub lon: f64,
}

impl From<GeocodeResult> for Suggestion {
    fn from(result: GeocodeResult) -> Self {
        Self {
            value: result.display_name.clone(),
            label: result.display_name,
            lat: result.latitude,
            lon: result.longitude,
        }
    }
}

/// The user picked a suggestion in one of the search fields.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct SelectionEvent {
    /// Identifier of the input that raised the selection.
    pub field: String,
    pub lat: f64,
    pub lon: f64,
}

impl SelectionEvent {
    pub fn from_suggestion(field: impl Into<String>, suggestion: &Suggestion) -> Self {
        Self {
            field: field.into(),
            lat: suggestion.lat,
            lon: suggestion.lon,
        }
    }

    /// Latitude within [-90, 90] and longitude within [-180, 180].
    pub fn in_range(&self) -> bool {
        (-90.0..=90.0).contains(&self.lat) && (-180.0..=180.0).contains(&self.lon)
    }
}

/// Rectangle results are bounded to, in geographic degrees.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq)]
pub struct Viewbox {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl Default for Viewbox {
    // Prague
    fn default() -> Self {
        Self {
            left: 14.3081641,
            top: 50.2,
            right: 14.5718359,
            bottom: 49.9355541,
        }
    }
}

impl fmt::Display for Viewbox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{},{}", self.left, self.top, self.right, self.bottom)
    }
}
