//! snowslide — gravitational redistribution of snow depth over a raster DEM.
//!
//! Implements the SnowSlide parameterization (Bernhardt & Schmidt, 2010):
//! snow in excess of a slope-dependent holding capacity is routed downslope
//! through a terrain-derived flow network until the depth field reaches
//! equilibrium. The caller supplies plain in-memory grids (elevation, cell
//! resolution, initial snow depth) and gets the settled depth field back;
//! raster I/O and georeferencing live outside this crate.

pub mod diagnostics;
pub mod engine;
pub mod error;
pub mod params;
pub mod preprocessing;
pub mod retention;
pub mod routing;
pub mod terrain;

pub use engine::{run, simulate, Simulation};
pub use error::{SnowslideError, SnowslideResult};
pub use params::{RetentionParams, RoutingMethod, RoutingParams, SimulationParams};
