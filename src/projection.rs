use serde::{Deserialize, Serialize};

pub const EARTH_RADIUS: f64 = 6378137.0;
pub const MERCATOR_MAX_LAT_DEG: f64 = 85.05112878;

/// Coordinate reference systems the map can work in.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Projection {
    /// Geographic longitude/latitude in degrees.
    #[serde(rename = "EPSG:4326")]
    Geographic,
    /// Spherical (web) mercator in meters. Also known as EPSG:900913.
    #[serde(rename = "EPSG:3857", alias = "EPSG:900913")]
    WebMercator,
}

impl Projection {
    pub fn code(&self) -> &'static str {
        match self {
            Projection::Geographic => "EPSG:4326",
            Projection::WebMercator => "EPSG:3857",
        }
    }
}

/// A point in some projection: `x` is easting (or longitude), `y` northing (or latitude).
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn from_lon_lat(lon: f64, lat: f64) -> Self {
        Self { x: lon, y: lat }
    }
}

/// Reproject `point` from `from` into `to`.
pub fn transform(point: Point, from: Projection, to: Projection) -> Point {
    match (from, to) {
        (Projection::Geographic, Projection::WebMercator) => {
            let (x, y) = lon_lat_to_web_merc(point.x, point.y);
            Point::new(x, y)
        }
        (Projection::WebMercator, Projection::Geographic) => {
            let (lon, lat) = web_merc_to_lon_lat(point.x, point.y);
            Point::new(lon, lat)
        }
        _ => point,
    }
}

/// Latitudes beyond the mercator limit are clamped.
pub fn lon_lat_to_web_merc(lon: f64, lat: f64) -> (f64, f64) {
    let lat = lat.clamp(-MERCATOR_MAX_LAT_DEG, MERCATOR_MAX_LAT_DEG);
    let x = EARTH_RADIUS * lon.to_radians();
    let y = EARTH_RADIUS * (std::f64::consts::FRAC_PI_4 + lat.to_radians() / 2.0).tan().ln();
    (x, y)
}

pub fn web_merc_to_lon_lat(x: f64, y: f64) -> (f64, f64) {
    let lon = (x / EARTH_RADIUS).to_degrees();
    let lat = (2.0 * (y / EARTH_RADIUS).exp().atan() - std::f64::consts::FRAC_PI_2).to_degrees();
    (lon, lat)
}
