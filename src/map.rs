//! Map-side collaborators the search binding drives, plus the in-memory
//! versions the service keeps per planner.

use serde::{Deserialize, Serialize};

use crate::projection::{Point, Projection};

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MarkerKind {
    Start,
    End,
}

/// Point geometry of a marker, in the map's working projection.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Geometry {
    x: f64,
    y: f64,
}

impl Geometry {
    pub fn new(at: Point) -> Self {
        Self { x: at.x, y: at.y }
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Relative move; the geometry keeps its identity.
    pub fn move_by(&mut self, dx: f64, dy: f64) {
        self.x += dx;
        self.y += dy;
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Marker {
    pub kind: MarkerKind,
    pub geometry: Geometry,
    /// Name of the layer the marker is drawn on, once attached.
    pub layer: Option<String>,
}

impl Marker {
    pub fn new(kind: MarkerKind, at: Point) -> Self {
        Self {
            kind,
            geometry: Geometry::new(at),
            layer: None,
        }
    }
}

pub trait MapView {
    fn projection(&self) -> Projection;
    fn set_center(&mut self, center: Point, zoom: u8);
}

pub trait MarkerLayer {
    fn marker(&self, kind: MarkerKind) -> &Marker;
    fn marker_mut(&mut self, kind: MarkerKind) -> &mut Marker;
    fn add_features(&mut self, kinds: &[MarkerKind]);
    fn redraw(&mut self);
}

/// Routing component hook, told about every accepted waypoint.
pub trait WaypointSink {
    fn set_waypoint(&mut self, marker: &Marker);
}

pub trait FieldFocus {
    fn focus(&mut self, field: &str);
}

#[derive(Serialize, Debug, Clone)]
pub struct View {
    pub projection: Projection,
    pub center: Option<Point>,
    pub zoom: Option<u8>,
}

impl View {
    pub fn new(projection: Projection) -> Self {
        Self {
            projection,
            center: None,
            zoom: None,
        }
    }
}

impl MapView for View {
    fn projection(&self) -> Projection {
        self.projection
    }

    fn set_center(&mut self, center: Point, zoom: u8) {
        self.center = Some(center);
        self.zoom = Some(zoom);
    }
}

/// Vector layer holding the start and end markers.
#[derive(Serialize, Debug, Clone)]
pub struct VectorLayer {
    pub name: String,
    start: Marker,
    end: Marker,
    pub features: Vec<MarkerKind>,
    pub redraws: u64,
}

impl VectorLayer {
    pub fn new(name: impl Into<String>, start: Point, end: Point) -> Self {
        Self {
            name: name.into(),
            start: Marker::new(MarkerKind::Start, start),
            end: Marker::new(MarkerKind::End, end),
            features: Vec::new(),
            redraws: 0,
        }
    }
}

impl MarkerLayer for VectorLayer {
    fn marker(&self, kind: MarkerKind) -> &Marker {
        match kind {
            MarkerKind::Start => &self.start,
            MarkerKind::End => &self.end,
        }
    }

    fn marker_mut(&mut self, kind: MarkerKind) -> &mut Marker {
        match kind {
            MarkerKind::Start => &mut self.start,
            MarkerKind::End => &mut self.end,
        }
    }

    fn add_features(&mut self, kinds: &[MarkerKind]) {
        for &kind in kinds {
            if self.features.contains(&kind) {
                continue;
            }
            let name = self.name.clone();
            self.marker_mut(kind).layer = Some(name);
            self.features.push(kind);
        }
    }

    fn redraw(&mut self) {
        self.redraws += 1;
    }
}

/// Waypoints last handed to the router.
#[derive(Serialize, Debug, Clone, Default)]
pub struct Route {
    pub start: Option<Point>,
    pub end: Option<Point>,
    pub updates: u64,
}

impl WaypointSink for Route {
    fn set_waypoint(&mut self, marker: &Marker) {
        let at = Some(marker.geometry.position());
        match marker.kind {
            MarkerKind::Start => self.start = at,
            MarkerKind::End => self.end = at,
        }
        self.updates += 1;
    }
}

#[derive(Serialize, Debug, Clone, Default)]
pub struct Focus {
    pub field: Option<String>,
}

impl FieldFocus for Focus {
    fn focus(&mut self, field: &str) {
        self.field = Some(field.to_string());
    }
}
