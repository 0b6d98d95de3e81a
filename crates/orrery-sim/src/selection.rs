//! Click resolution and the selection state machine.
//!
//! A click is resolved against the planets first and only falls through to the
//! asteroid sweep when no planet is hit. The outcome is then applied to
//! [`SelectionState`], which reports exactly what changed.

use orrery_catalog::BodyCatalog;

use crate::picking::{PickHit, pick_nearest};
use crate::planets::{PLANETS, nearest_planet_hit};
use crate::ray::Ray;

/// What a click landed on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PickOutcome {
    /// Index into [`PLANETS`].
    Planet(usize),
    /// Nearest asteroid within the threshold.
    Body(PickHit),
    Miss,
}

/// Which layer a selection came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectedKind {
    Asteroid { index: usize },
    Planet { index: usize },
}

/// Snapshot of a selected body, computed once at selection time.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedObject {
    pub kind: SelectedKind,
    pub id: String,
    pub name: String,
    pub class: String,
    pub diameter_km: f64,
    /// Orbital period in days.
    pub period_days: f64,
    /// Heliocentric distance in AU at selection time.
    pub distance_au: f64,
}

impl SelectedObject {
    /// Snapshot of asteroid `hit` from `catalog`.
    pub fn from_hit(catalog: &BodyCatalog, hit: &PickHit) -> Option<Self> {
        let record = catalog.record(hit.index)?;
        let elements = record.elements();
        Some(Self {
            kind: SelectedKind::Asteroid { index: hit.index },
            id: catalog.id(hit.index).into_owned(),
            name: catalog.name(hit.index).into_owned(),
            class: catalog.class_name(hit.index).to_string(),
            diameter_km: record.diameter_km as f64,
            period_days: elements.display_period_days(),
            distance_au: hit.world_position.length() / orrery_orbit::AU_TO_SCENE,
        })
    }

    /// Snapshot of planet `index`. Period and distance come from the table.
    pub fn from_planet(index: usize) -> Option<Self> {
        let planet = PLANETS.get(index)?;
        Some(Self {
            kind: SelectedKind::Planet { index },
            id: planet.horizons_id.to_string(),
            name: planet.name.to_string(),
            class: "Planet".to_string(),
            diameter_km: planet.diameter_km,
            period_days: planet.period_days,
            distance_au: planet.distance_au,
        })
    }
}

/// Resolves a click ray to a [`PickOutcome`].
#[derive(Debug, Clone, Copy)]
pub struct ClickResolver {
    /// Asteroid hit threshold in scene units.
    pub threshold: f64,
}

impl Default for ClickResolver {
    fn default() -> Self {
        Self { threshold: 4.0 }
    }
}

impl ClickResolver {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    /// Planets first; on a planet hit the asteroid sweep is skipped. Only the
    /// first `drawn` catalog records are candidates.
    pub fn resolve(
        &self,
        catalog: Option<&BodyCatalog>,
        drawn: usize,
        ray: &Ray,
        t: f64,
    ) -> PickOutcome {
        if let Some((index, _)) = nearest_planet_hit(ray, t) {
            return PickOutcome::Planet(index);
        }
        let Some(catalog) = catalog else {
            return PickOutcome::Miss;
        };
        let records = &catalog.records()[..drawn.min(catalog.len())];
        match pick_nearest(records, ray, t, self.threshold) {
            Some(hit) => PickOutcome::Body(hit),
            None => PickOutcome::Miss,
        }
    }
}

/// Input to [`SelectionState::apply`].
#[derive(Debug, Clone, PartialEq)]
pub enum SelectionEvent {
    Picked(SelectedObject),
    /// A click that hit nothing.
    Missed,
    /// Explicit clear from the user (Escape, close button).
    UserCleared,
}

/// What [`SelectionState::apply`] changed.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectionChange {
    Selected(SelectedObject),
    ClearedByMiss,
    ClearedByUser,
    /// Nothing was selected and nothing is now.
    Unchanged,
}

impl SelectionChange {
    /// Argument for the `on_select` callback, or `None` if it should not fire.
    pub fn notification(&self) -> Option<Option<&SelectedObject>> {
        match self {
            SelectionChange::Selected(obj) => Some(Some(obj)),
            SelectionChange::ClearedByMiss | SelectionChange::ClearedByUser => Some(None),
            SelectionChange::Unchanged => None,
        }
    }
}

/// The current selection, if any.
#[derive(Debug, Clone, Default)]
pub struct SelectionState {
    current: Option<SelectedObject>,
}

impl SelectionState {
    pub fn current(&self) -> Option<&SelectedObject> {
        self.current.as_ref()
    }

    pub fn apply(&mut self, event: SelectionEvent) -> SelectionChange {
        match event {
            SelectionEvent::Picked(obj) => {
                self.current = Some(obj.clone());
                SelectionChange::Selected(obj)
            }
            SelectionEvent::Missed => match self.current.take() {
                Some(_) => SelectionChange::ClearedByMiss,
                None => SelectionChange::Unchanged,
            },
            SelectionEvent::UserCleared => match self.current.take() {
                Some(_) => SelectionChange::ClearedByUser,
                None => SelectionChange::Unchanged,
            },
        }
    }
}
