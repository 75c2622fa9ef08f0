//! Per-client filter session.
//!
//! A [`FilterSession`] holds everything one map page mutates while the user
//! filters: the six predicates, the list panel, the indicator flags and the
//! status line. The feature collection itself is shared and borrowed per call.

use crate::errors::{MapError, Result};
use crate::filter::{self, FilterField, FilterMode, FilterState};
use crate::list::{ListRow, ListView};
use crate::map::{MapView, SELECT_ZOOM};
use crate::model::{Bounds, Feature, FeatureId};
use crate::profile::Profile;
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Duration;

pub const STATUS_FILTERING: &str = "Filtering churches...";
pub const STATUS_NO_DATA: &str = "Error: No church data loaded.";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Indicators {
    pub filter_active: bool,
    pub zoom_to_filter: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ApplySummary {
    pub mode: FilterMode,
    pub visible: usize,
    pub total: usize,
    pub zoomed: bool,
}

/// A popup to open once the map has finished flying to a selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub struct PendingPopup {
    pub id: FeatureId,
    pub delay: Duration,
}

impl PendingPopup {
    /// Opens the popup if the marker is still drawn. Returns whether it did.
    pub fn fire(&self, map: &mut dyn MapView) -> bool {
        if map.has_marker(self.id) {
            map.open_popup(self.id);
            true
        } else {
            tracing::debug!(id = %self.id, "marker gone before popup delay elapsed");
            false
        }
    }
}

/// Serializable snapshot of what the page should show.
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub profile: Profile,
    pub status: String,
    pub indicators: Indicators,
    pub inputs: BTreeMap<&'static str, String>,
    pub list_search: String,
    pub visible: usize,
    pub rows: Vec<ListRow>,
    pub note: Option<String>,
    pub empty_state: Option<&'static str>,
    pub highlighted: Option<FeatureId>,
}

#[derive(Debug, Default)]
pub struct FilterSession {
    profile: Profile,
    state: FilterState,
    list: ListView,
    visible: Vec<FeatureId>,
    filtered_bounds: Option<Bounds>,
    status: String,
    indicators: Indicators,
    applied: bool,
}

impl FilterSession {
    pub fn new(profile: Profile) -> Self {
        Self {
            profile,
            ..Default::default()
        }
    }

    pub fn profile(&self) -> Profile {
        self.profile
    }

    pub fn state(&self) -> &FilterState {
        &self.state
    }

    pub fn list(&self) -> &ListView {
        &self.list
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn indicators(&self) -> Indicators {
        self.indicators
    }

    pub fn visible_ids(&self) -> &[FeatureId] {
        &self.visible
    }

    /// Whether a manual filter change has been applied since the last reset.
    pub fn has_applied_filters(&self) -> bool {
        self.applied
    }

    pub fn is_filter_active(&self) -> bool {
        self.state.is_active()
    }

    /// Records raw input text for a field without filtering.
    pub fn set_input(&mut self, field: FilterField, text: &str) {
        self.state.set(field, text);
    }

    pub fn set_list_search(&mut self, query: &str) {
        self.list.set_search(query);
    }

    /// Shows the filtering status; returns the status it replaced.
    pub fn begin_filtering(&mut self) -> String {
        std::mem::replace(&mut self.status, STATUS_FILTERING.to_string())
    }

    /// Puts back a status when a pass turned out to be a no-op.
    pub fn restore_status(&mut self, previous: String) {
        self.status = previous;
    }

    /// Shows a status that no pass produced, such as load progress.
    pub fn set_status(&mut self, text: impl Into<String>) {
        self.status = text.into();
    }

    /// Runs the engine and re-renders markers, list, status and indicators.
    pub fn apply(
        &mut self,
        features: &[Feature],
        map: &mut dyn MapView,
        manually_changed: bool,
    ) -> ApplySummary {
        let active = self.state.is_active();
        self.indicators = Indicators {
            filter_active: active,
            zoom_to_filter: active,
        };
        if manually_changed {
            self.applied = true;
        }

        if features.is_empty() {
            tracing::warn!("filter requested with no features loaded");
            map.clear_markers();
            self.list.render(std::iter::empty::<&Feature>());
            self.visible.clear();
            self.filtered_bounds = None;
            self.status = STATUS_NO_DATA.to_string();
            return ApplySummary {
                mode: if active {
                    FilterMode::Filtered
                } else {
                    FilterMode::Viewport
                },
                visible: 0,
                total: 0,
                zoomed: false,
            };
        }

        let viewport = map.viewport();
        let outcome = filter::apply(features, &self.state, viewport.as_ref());

        map.clear_markers();
        let mut display: &[&Feature] = &outcome.features;
        if !active {
            if let Some(cap) = self.profile.unfiltered_marker_cap() {
                if display.len() > cap {
                    display = &display[..cap];
                }
            }
        }
        if !display.is_empty() {
            map.add_markers(display);
        }

        self.filtered_bounds = Bounds::from_points(outcome.features.iter().map(|f| f.lat_lng()));

        let mut zoomed = false;
        if manually_changed && active && !display.is_empty() {
            let in_view = match (viewport, map.marker_bounds()) {
                (Some(v), Some(m)) => v.contains_bounds(&m),
                _ => false,
            };
            if !in_view {
                zoomed = self.zoom_to_filtered(map);
            }
        }

        let visible = outcome.features.len();
        let total = features.len();
        self.status = if self.profile.is_mobile() {
            format!("{} of {} churches", visible, total)
        } else {
            format!(
                "Showing {} of {} filtered churches ({} total)",
                visible, visible, total
            )
        };

        self.list.render(outcome.features.iter().copied());
        self.visible = outcome.features.iter().filter_map(|f| f.id()).collect();

        tracing::info!(
            mode = outcome.mode.as_str(),
            visible,
            total,
            zoomed,
            "filters applied"
        );
        ApplySummary {
            mode: outcome.mode,
            visible,
            total,
            zoomed,
        }
    }

    /// Map moved. Only re-filters while no predicate is active.
    pub fn on_viewport_changed(
        &mut self,
        features: &[Feature],
        map: &mut dyn MapView,
    ) -> Option<ApplySummary> {
        if self.state.is_active() {
            return None;
        }
        Some(self.apply(features, map, false))
    }

    pub fn select_suggestion(
        &mut self,
        field: FilterField,
        value: &str,
        features: &[Feature],
        map: &mut dyn MapView,
    ) -> ApplySummary {
        self.set_input(field, value);
        self.apply(features, map, true)
    }

    /// Fits the map to the last filtered subset. No-op when it was empty.
    pub fn zoom_to_filtered(&self, map: &mut dyn MapView) -> bool {
        match self.filtered_bounds {
            Some(b) => {
                map.fit_bounds(b, self.profile.fit());
                true
            }
            None => false,
        }
    }

    pub fn reset(&mut self, features: &[Feature], map: &mut dyn MapView) -> ApplySummary {
        self.clear_filters();
        self.apply(features, map, false)
    }

    /// The state half of [`reset`](Self::reset): inputs, list search and
    /// indicators go back to their defaults without re-rendering.
    pub fn clear_filters(&mut self) {
        self.state.clear();
        self.list.clear_search();
        self.applied = false;
        self.indicators = Indicators::default();
    }

    /// Flies to a feature and highlights its row. The returned popup should
    /// be fired after its delay.
    pub fn select(
        &mut self,
        features: &[Feature],
        id: FeatureId,
        map: &mut dyn MapView,
    ) -> Result<PendingPopup> {
        let f = find_feature(features, id).ok_or(MapError::NotFound)?;
        map.fly_to(f.lat_lng(), SELECT_ZOOM);
        if self.list.select(id).is_none() {
            tracing::debug!(%id, "selected feature is not in the rendered list");
        }
        Ok(PendingPopup {
            id,
            delay: self.profile.timings().popup,
        })
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            profile: self.profile,
            status: self.status.clone(),
            indicators: self.indicators,
            inputs: FilterField::ALL
                .iter()
                .map(|f| (f.as_str(), self.state.raw(*f).to_string()))
                .collect(),
            list_search: self.list.search().to_string(),
            visible: self.visible.len(),
            rows: self.list.rows().to_vec(),
            note: self.list.note().map(str::to_string),
            empty_state: self.list.empty_state(),
            highlighted: self.list.highlighted(),
        }
    }
}

/// Ids are assigned in load order, so the position is tried first.
pub fn find_feature(features: &[Feature], id: FeatureId) -> Option<&Feature> {
    let guess = usize::try_from(id.0)
        .ok()
        .and_then(|i| features.get(i))
        .filter(|f| f.id() == Some(id));
    guess.or_else(|| features.iter().find(|f| f.id() == Some(id)))
}
