//! Small runnable demo: uniform snowfall on an idealized mountainside.

use ndarray::Array2;
use snowslide_core::diagnostics;
use snowslide_core::params::SimulationParams;
use snowslide_core::{engine, terrain};

fn main() {
    // 40x60 ramp dropping eastward into a flat valley floor.
    let dem = Array2::from_shape_fn((40, 60), |(_, c)| {
        if c < 30 {
            900.0 - 30.0 * c as f64
        } else {
            0.0
        }
    });
    let resolution = (20.0, 20.0);
    let snd0 = Array2::from_elem(dem.dim(), 1.0);

    let params = SimulationParams::default();
    let sim = engine::run(&dem, &snd0, resolution, &params).expect("valid inputs");

    println!(
        "converged: {} after {} iterations (residual excess {:.2e})",
        sim.converged, sim.iterations, sim.residual_excess
    );
    println!(
        "mass: initial {:.1}, final {:.1}, exported {:.1}",
        diagnostics::total_mass(&snd0),
        diagnostics::total_mass(&sim.depth),
        sim.exported_mass
    );

    // Where did the snow end up, by slope class?
    let slp = terrain::slope(&dem, resolution.0, resolution.1);
    let mut steep = 0.0;
    let mut flat = 0.0;
    for ((r, c), &s) in slp.indexed_iter() {
        if s >= 40.0 {
            steep += sim.depth[[r, c]];
        } else {
            flat += sim.depth[[r, c]];
        }
    }
    println!("snow on slopes >= 40 deg: {steep:.1}");
    println!("snow on slopes <  40 deg: {flat:.1}");
}
