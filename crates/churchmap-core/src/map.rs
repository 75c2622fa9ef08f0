use crate::model::{Bounds, Feature, FeatureId, LatLng};
use crate::profile::FitOptions;
use serde::Serialize;
use std::collections::HashSet;

/// Zoom used when navigating to a single selected church.
pub const SELECT_ZOOM: u8 = 15;

/// What the session needs from the mapping library.
pub trait MapView: Send {
    fn viewport(&self) -> Option<Bounds>;
    fn clear_markers(&mut self);
    fn add_markers(&mut self, features: &[&Feature]);
    fn has_marker(&self, id: FeatureId) -> bool;
    /// Bounds covering the markers currently drawn.
    fn marker_bounds(&self) -> Option<Bounds>;
    fn fit_bounds(&mut self, bounds: Bounds, opts: FitOptions);
    fn fly_to(&mut self, to: LatLng, zoom: u8);
    fn open_popup(&mut self, id: FeatureId);
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum MapCommand {
    ReplaceMarkers { ids: Vec<FeatureId> },
    FitBounds { bounds: Bounds, padding: u32, max_zoom: u8 },
    FlyTo { to: LatLng, zoom: u8 },
    OpenPopup { id: FeatureId },
}

/// A map that mirrors the browser's Leaflet instance.
///
/// The client reports its viewport; everything the session asks the map to
/// do is queued as a [`MapCommand`] for the client to drain and replay.
#[derive(Debug, Default)]
pub struct RecordingMap {
    viewport: Option<Bounds>,
    markers: Vec<FeatureId>,
    marker_set: HashSet<FeatureId>,
    marker_bounds: Option<Bounds>,
    pending: Vec<MapCommand>,
}

impl RecordingMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_viewport(viewport: Bounds) -> Self {
        Self {
            viewport: Some(viewport),
            ..Default::default()
        }
    }

    pub fn set_viewport(&mut self, viewport: Bounds) {
        self.viewport = Some(viewport);
    }

    pub fn markers(&self) -> &[FeatureId] {
        &self.markers
    }

    pub fn pending(&self) -> &[MapCommand] {
        &self.pending
    }

    pub fn drain(&mut self) -> Vec<MapCommand> {
        std::mem::take(&mut self.pending)
    }

    // only the latest marker set matters to the client
    fn queue_marker_sync(&mut self) {
        self.pending
            .retain(|c| !matches!(c, MapCommand::ReplaceMarkers { .. }));
        self.pending.push(MapCommand::ReplaceMarkers {
            ids: self.markers.clone(),
        });
    }
}

impl MapView for RecordingMap {
    fn viewport(&self) -> Option<Bounds> {
        self.viewport
    }

    fn clear_markers(&mut self) {
        self.markers.clear();
        self.marker_set.clear();
        self.marker_bounds = None;
        self.queue_marker_sync();
    }

    fn add_markers(&mut self, features: &[&Feature]) {
        for f in features {
            if let Some(id) = f.id() {
                if self.marker_set.insert(id) {
                    self.markers.push(id);
                }
            }
        }
        let added = Bounds::from_points(features.iter().map(|f| f.lat_lng()));
        self.marker_bounds = match (self.marker_bounds, added) {
            (Some(a), Some(b)) => Bounds::from_points([
                LatLng::new(a.south, a.west),
                LatLng::new(a.north, a.east),
                LatLng::new(b.south, b.west),
                LatLng::new(b.north, b.east),
            ]),
            (a, b) => a.or(b),
        };
        self.queue_marker_sync();
    }

    fn has_marker(&self, id: FeatureId) -> bool {
        self.marker_set.contains(&id)
    }

    fn marker_bounds(&self) -> Option<Bounds> {
        self.marker_bounds
    }

    // The viewport stays as last reported; the client sends its real bounds
    // once the fit animation ends.
    fn fit_bounds(&mut self, bounds: Bounds, opts: FitOptions) {
        self.pending.push(MapCommand::FitBounds {
            bounds,
            padding: opts.padding,
            max_zoom: opts.max_zoom,
        });
    }

    fn fly_to(&mut self, to: LatLng, zoom: u8) {
        self.pending.push(MapCommand::FlyTo { to, zoom });
    }

    fn open_popup(&mut self, id: FeatureId) {
        self.pending.push(MapCommand::OpenPopup { id });
    }
}
