use serde::Serialize;

use crate::binding::SelectionContext;
use crate::map::{Focus, Route, VectorLayer, View};
use crate::projection::{Point, Projection};

/// Map state of a journey planner page: view, marker layer, routed
/// waypoints and the focused search field.
#[derive(Serialize, Debug, Clone)]
pub struct Planner {
    pub view: View,
    pub layer: VectorLayer,
    pub route: Route,
    pub focus: Focus,
}

impl Planner {
    pub fn new(projection: Projection, start: Point, end: Point) -> Self {
        Self {
            view: View::new(projection),
            layer: VectorLayer::new("markers", start, end),
            route: Route::default(),
            focus: Focus::default(),
        }
    }

    pub fn context(&mut self) -> SelectionContext<'_> {
        SelectionContext {
            map: &mut self.view,
            layer: &mut self.layer,
            router: &mut self.route,
            focus: &mut self.focus,
        }
    }
}
