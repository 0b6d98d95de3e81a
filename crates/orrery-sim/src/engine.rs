//! Engine root: owns the catalog, the clock and the selection, and exposes the
//! control surface the UI drives.

use orrery_catalog::{BodyCatalog, CatalogError};
use orrery_config::{Config, Quality};
use tracing::{debug, error, info, warn};

use crate::clock::{ClockError, SimulationClock};
use crate::ray::Ray;
use crate::selection::{
    ClickResolver, PickOutcome, SelectedObject, SelectionChange, SelectionEvent, SelectionState,
};

/// Callback fired when the selection changes. `None` means cleared.
pub type SelectCallback = Box<dyn FnMut(Option<&SelectedObject>)>;

/// Result of the one-shot catalog load.
#[derive(Debug)]
pub enum CatalogState {
    Loaded(BodyCatalog),
    /// The asteroid layer is absent for this session; planets still work.
    Failed { reason: String, integrity: bool },
}

pub struct Engine {
    catalog: CatalogState,
    clock: SimulationClock,
    selection: SelectionState,
    resolver: ClickResolver,
    quality: Quality,
    low_quality_cap: usize,
    speed_presets: Vec<f64>,
    on_select: Option<SelectCallback>,
}

impl Engine {
    /// Take ownership of the load result and set up the clock from `config`.
    pub fn new(load: Result<BodyCatalog, CatalogError>, config: &Config) -> Self {
        let catalog = match load {
            Ok(catalog) => {
                info!(bodies = catalog.len(), "Catalog ready");
                CatalogState::Loaded(catalog)
            }
            Err(err) => {
                error!(error = %err, "Catalog load failed, asteroid layer disabled");
                CatalogState::Failed {
                    integrity: err.is_integrity(),
                    reason: err.to_string(),
                }
            }
        };

        let mut clock = SimulationClock::new(config.simulation.days_per_second);
        if let Err(err) = clock.set_speed(config.simulation.initial_speed) {
            warn!(error = %err, "Ignoring configured initial speed");
        }
        if config.simulation.start_paused {
            clock.pause();
        }

        Self {
            catalog,
            clock,
            selection: SelectionState::default(),
            resolver: ClickResolver::new(config.picking.threshold_scene_units as f64),
            quality: config.render.quality,
            low_quality_cap: config.render.low_quality_instance_cap as usize,
            speed_presets: config.simulation.speed_presets.clone(),
            on_select: None,
        }
    }

    pub fn catalog_state(&self) -> &CatalogState {
        &self.catalog
    }

    pub fn catalog(&self) -> Option<&BodyCatalog> {
        match &self.catalog {
            CatalogState::Loaded(catalog) => Some(catalog),
            CatalogState::Failed { .. } => None,
        }
    }

    /// Register the selection callback, replacing any previous one.
    pub fn set_on_select(&mut self, callback: impl FnMut(Option<&SelectedObject>) + 'static) {
        self.on_select = Some(Box::new(callback));
    }

    pub fn clock(&self) -> &SimulationClock {
        &self.clock
    }

    /// Current simulation time in days.
    pub fn time(&self) -> f64 {
        self.clock.time()
    }

    /// Advance the clock by one frame of wall time.
    pub fn frame(&mut self, dt_seconds: f64) -> f64 {
        self.clock.advance(dt_seconds)
    }

    pub fn set_speed(&mut self, speed: f64) -> Result<(), ClockError> {
        self.clock.set_speed(speed)
    }

    /// Apply preset `slot` (0-based). Returns the new speed.
    pub fn apply_speed_preset(&mut self, slot: usize) -> Option<f64> {
        let speed = *self.speed_presets.get(slot)?;
        match self.clock.set_speed(speed) {
            Ok(()) => {
                info!(speed, "Speed preset");
                Some(speed)
            }
            Err(err) => {
                warn!(error = %err, slot, "Bad speed preset");
                None
            }
        }
    }

    pub fn pause(&mut self) {
        self.clock.pause();
    }

    pub fn resume(&mut self) {
        self.clock.resume();
    }

    pub fn toggle_pause(&mut self) {
        self.clock.toggle_pause();
    }

    pub fn quality(&self) -> Quality {
        self.quality
    }

    pub fn set_quality(&mut self, quality: Quality) {
        if quality != self.quality {
            self.quality = quality;
            info!(?quality, drawn = self.drawn_count(), "Quality changed");
        }
    }

    /// Bodies drawn, and pickable, at the current quality: a prefix of the
    /// catalog.
    pub fn drawn_count(&self) -> usize {
        let total = self.catalog().map_or(0, BodyCatalog::len);
        match self.quality {
            Quality::High => total,
            Quality::Low => total.min(self.low_quality_cap),
        }
    }

    pub fn selected(&self) -> Option<&SelectedObject> {
        self.selection.current()
    }

    /// Resolve a click ray at the current time and update the selection.
    pub fn click(&mut self, ray: &Ray) -> SelectionChange {
        let t = self.clock.time();
        let outcome = self
            .resolver
            .resolve(self.catalog(), self.drawn_count(), ray, t);
        let event = match outcome {
            PickOutcome::Planet(index) => SelectedObject::from_planet(index),
            PickOutcome::Body(hit) => self
                .catalog()
                .and_then(|catalog| SelectedObject::from_hit(catalog, &hit)),
            PickOutcome::Miss => None,
        }
        .map_or(SelectionEvent::Missed, SelectionEvent::Picked);

        if let SelectionEvent::Picked(obj) = &event {
            info!(id = %obj.id, name = %obj.name, class = %obj.class, "Selected");
        } else {
            debug!(t, "Click hit nothing");
        }
        self.apply(event)
    }

    /// User-initiated clear.
    pub fn clear_selection(&mut self) -> SelectionChange {
        self.apply(SelectionEvent::UserCleared)
    }

    fn apply(&mut self, event: SelectionEvent) -> SelectionChange {
        let change = self.selection.apply(event);
        if let Some(arg) = change.notification()
            && let Some(callback) = self.on_select.as_mut()
        {
            callback(arg);
        }
        change
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planets::nearest_planet_hit;
    use glam::DVec3;
    use orrery_catalog::synthetic::SyntheticCatalog;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn engine_with(count: usize, config: &Config) -> Engine {
        Engine::new(Ok(SyntheticCatalog::new(5, count).generate()), config)
    }

    fn ray_onto(target: DVec3) -> Ray {
        Ray::new(target + DVec3::new(0.0, 0.0, 300.0), DVec3::NEG_Z).unwrap()
    }

    #[test]
    fn test_click_on_body_fires_callback_with_snapshot() {
        let mut engine = engine_with(500, &Config::default());
        engine.frame(2.0);
        let t = engine.time();
        let catalog = engine.catalog().unwrap();
        // First body whose vertical ray stays clear of every planet.
        let ray = (0..catalog.len())
            .map(|i| ray_onto(catalog.elements(i).unwrap().scene_position_at(t)))
            .find(|ray| nearest_planet_hit(ray, t).is_none())
            .unwrap();

        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        engine.set_on_select(move |obj| sink.borrow_mut().push(obj.map(|o| o.name.clone())));

        let change = engine.click(&ray);
        assert!(matches!(change, SelectionChange::Selected(_)));
        assert!(engine.selected().is_some());
        assert_eq!(seen.borrow().len(), 1);
        assert!(seen.borrow()[0].is_some());
    }

    #[test]
    fn test_miss_clears_and_notifies_once() {
        let mut engine = engine_with(10, &Config::default());
        let count = Rc::new(RefCell::new(0));
        let sink = count.clone();
        engine.set_on_select(move |_| *sink.borrow_mut() += 1);

        let empty_sky = Ray::new(DVec3::new(1000.0, 1000.0, 1000.0), DVec3::X).unwrap();
        assert_eq!(engine.click(&empty_sky), SelectionChange::Unchanged);
        assert_eq!(*count.borrow(), 0);

        let earth = Ray::new(DVec3::new(10.0, 50.0, 0.0), DVec3::NEG_Y).unwrap();
        assert!(matches!(engine.click(&earth), SelectionChange::Selected(_)));
        assert_eq!(engine.click(&empty_sky), SelectionChange::ClearedByMiss);
        assert_eq!(*count.borrow(), 2);
    }

    #[test]
    fn test_failed_load_keeps_planets() {
        let err = CatalogError::Integrity { floats: 10 };
        let mut engine = Engine::new(Err(err), &Config::default());
        assert!(matches!(
            engine.catalog_state(),
            CatalogState::Failed { integrity: true, .. }
        ));
        assert_eq!(engine.drawn_count(), 0);

        let earth = Ray::new(DVec3::new(10.0, 50.0, 0.0), DVec3::NEG_Y).unwrap();
        let SelectionChange::Selected(obj) = engine.click(&earth) else {
            panic!("expected planet selection");
        };
        assert_eq!(obj.name, "Earth");
    }

    #[test]
    fn test_low_quality_caps_drawn_prefix() {
        let mut config = Config::default();
        config.render.low_quality_instance_cap = 100;
        let mut engine = engine_with(300, &config);
        assert_eq!(engine.drawn_count(), 300);
        engine.set_quality(Quality::Low);
        assert_eq!(engine.drawn_count(), 100);
        engine.set_quality(Quality::High);
        assert_eq!(engine.drawn_count(), 300);
    }

    #[test]
    fn test_config_controls_clock() {
        let mut config = Config::default();
        config.simulation.initial_speed = 10.0;
        config.simulation.start_paused = true;
        let mut engine = engine_with(1, &config);
        assert_eq!(engine.frame(1.0), 0.0);
        engine.resume();
        assert_eq!(engine.frame(1.0), 500.0);
    }

    #[test]
    fn test_invalid_initial_speed_falls_back_to_one() {
        let mut config = Config::default();
        config.simulation.initial_speed = -5.0;
        let engine = engine_with(1, &config);
        assert_eq!(engine.clock().speed(), 1.0);
    }

    #[test]
    fn test_speed_presets() {
        let mut engine = engine_with(1, &Config::default());
        assert_eq!(engine.apply_speed_preset(2), Some(50.0));
        assert_eq!(engine.clock().speed(), 50.0);
        assert_eq!(engine.apply_speed_preset(9), None);
        assert_eq!(engine.clock().speed(), 50.0);
    }

    #[test]
    fn test_user_clear_notifies_none() {
        let mut engine = engine_with(1, &Config::default());
        let last = Rc::new(RefCell::new(Some(String::new())));
        let sink = last.clone();
        engine.set_on_select(move |obj| *sink.borrow_mut() = obj.map(|o| o.id.clone()));

        let earth = Ray::new(DVec3::new(10.0, 50.0, 0.0), DVec3::NEG_Y).unwrap();
        engine.click(&earth);
        assert_eq!(last.borrow().as_deref(), Some("399"));
        assert_eq!(engine.clear_selection(), SelectionChange::ClearedByUser);
        assert!(last.borrow().is_none());
    }
}
