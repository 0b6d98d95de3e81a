//! Simulation side of the orrery: the clock, host-side picking, the planet
//! layer, and the engine root that ties them to the catalog.
//!
//! Nothing here touches the GPU. The renderer reads [`Engine::time`] and
//! [`Engine::drawn_count`] each frame; clicks come in as [`Ray`]s.

pub mod clock;
pub mod engine;
pub mod picking;
pub mod planets;
pub mod ray;
pub mod selection;

pub use clock::{ClockError, ClockState, SimulationClock};
pub use engine::{CatalogState, Engine};
pub use picking::{PickHit, pick_nearest};
pub use planets::{PLANETS, Planet};
pub use ray::Ray;
pub use selection::{
    ClickResolver, PickOutcome, SelectedKind, SelectedObject, SelectionChange, SelectionEvent,
    SelectionState,
};
