use serde::Serialize;
use std::collections::BTreeSet;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::debounce::Debouncer;
use crate::geocoder::Geocoder;
use crate::map::{FieldFocus, MapView, MarkerKind, MarkerLayer, WaypointSink};
use crate::models::{SelectionEvent, Suggestion};
use crate::projection::{transform, Point, Projection};

/// Collaborators a selection acts on.
pub struct SelectionContext<'a> {
    pub map: &'a mut dyn MapView,
    pub layer: &'a mut dyn MarkerLayer,
    pub router: &'a mut dyn WaypointSink,
    pub focus: &'a mut dyn FieldFocus,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarkerChoice<'a> {
    pub kind: MarkerKind,
    /// Field to move the cursor to after the selection.
    pub focus: Option<&'a str>,
}

/// The start field drives the start marker and hands focus to the finish
/// field; every other field drives the end marker.
pub fn choose_marker<'a>(field: &str, start_field: &str, finish_field: &'a str) -> MarkerChoice<'a> {
    if field == start_field {
        MarkerChoice {
            kind: MarkerKind::Start,
            focus: Some(finish_field),
        }
    } else {
        MarkerChoice {
            kind: MarkerKind::End,
            focus: None,
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct SelectionOutcome {
    pub marker: MarkerKind,
    pub position: Point,
    pub displacement: Point,
    pub focused: Option<String>,
    pub zoom: u8,
}

pub struct LocationSearchBinding {
    geocoder: Box<dyn Geocoder>,
    debouncer: Debouncer,
    zoom: u8,
    start_field: String,
    finish_field: String,
}

impl LocationSearchBinding {
    pub fn new(geocoder: Box<dyn Geocoder>, config: &Config) -> Self {
        Self {
            geocoder,
            debouncer: Debouncer::new(config.delay(), config.min_length),
            zoom: config.zoom,
            start_field: config.start_field.clone(),
            finish_field: config.finish_field.clone(),
        }
    }

    /// Debounced entry point for keystrokes in `field`.
    pub async fn suggest(&self, field: &str, text: String) -> Vec<Suggestion> {
        match self.debouncer.settle(field, text).await {
            Some(text) => self.fetch_suggestions(text).await,
            None => Vec::new(),
        }
    }

    /// One geocoder query. Failures come back as an empty list.
    pub async fn fetch_suggestions(&self, text: String) -> Vec<Suggestion> {
        if !self.debouncer.long_enough(&text) {
            debug!("query {:?} below minimum length, skipping", text);
            return Vec::new();
        }
        match self.geocoder.search(text.clone()).await {
            Ok(results) => results.into_iter().map(Suggestion::from).collect(),
            Err(e) => {
                warn!("geocoding {:?} failed: {}", text, e);
                Vec::new()
            }
        }
    }

    /// Leaves every collaborator untouched when the target does not project
    /// to a finite point.
    pub fn on_select(
        &self,
        event: &SelectionEvent,
        ctx: SelectionContext<'_>,
    ) -> anyhow::Result<SelectionOutcome> {
        let target = transform(
            Point::from_lon_lat(event.lon, event.lat),
            Projection::Geographic,
            ctx.map.projection(),
        );
        if !target.x.is_finite() || !target.y.is_finite() {
            return Err(anyhow::anyhow!(
                "selection {},{} does not project into {}",
                event.lon,
                event.lat,
                ctx.map.projection().code()
            ));
        }

        let choice = choose_marker(&event.field, &self.start_field, &self.finish_field);
        if let Some(field) = choice.focus {
            ctx.focus.focus(field);
        }

        ctx.map.set_center(target, self.zoom);

        let marker = ctx.layer.marker_mut(choice.kind);
        let current = marker.geometry.position();
        let (dx, dy) = (target.x - current.x, target.y - current.y);
        marker.geometry.move_by(dx, dy);

        if ctx.layer.marker(MarkerKind::Start).layer.is_none() {
            ctx.layer.add_features(&[MarkerKind::Start, MarkerKind::End]);
        }
        ctx.layer.redraw();

        let marker = ctx.layer.marker(choice.kind);
        ctx.router.set_waypoint(marker);

        info!(
            "{:?} marker moved to {:.1},{:.1} from field {}",
            choice.kind, target.x, target.y, event.field
        );

        Ok(SelectionOutcome {
            marker: choice.kind,
            position: marker.geometry.position(),
            displacement: Point::new(dx, dy),
            focused: choice.focus.map(str::to_string),
            zoom: self.zoom,
        })
    }
}

/// CSS classes of the suggestion dropdown.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Dropdown {
    pub classes: BTreeSet<String>,
}

impl Dropdown {
    pub fn new() -> Self {
        let mut classes = BTreeSet::new();
        classes.insert("ui-corner-all".to_string());
        Self { classes }
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.contains(class)
    }

    fn swap(&mut self, remove: &str, add: &str) {
        self.classes.remove(remove);
        self.classes.insert(add.to_string());
    }
}

impl Default for Dropdown {
    fn default() -> Self {
        Self::new()
    }
}

/// The open menu hangs off the input, so only its top corners stay rounded.
pub fn on_open(dropdown: &mut Dropdown) {
    dropdown.swap("ui-corner-all", "ui-corner-top");
}

pub fn on_close(dropdown: &mut Dropdown) {
    dropdown.swap("ui-corner-top", "ui-corner-all");
}
