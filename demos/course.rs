// demos/course.rs

use free_flight_navigation::{
    Attitude, AttitudeSource, ControlOutput, GateTable, MicrosClock, NavigationConfig, Navigator,
    VisionLink, DEFAULT_GATES,
};
use std::cell::Cell;
use std::f32::consts::PI;

/// Attitude reported by an ideal inner loop: whatever was last commanded.
struct IdealInnerLoop(Cell<Attitude>);

impl IdealInnerLoop {
    fn track(&self, output: &ControlOutput) {
        let decidegrees = |angle: f32| (angle * 1800.0 / PI).round() as i16;
        self.0.set(Attitude {
            roll: decidegrees(output.phi_cmd),
            pitch: decidegrees(-output.theta_cmd),
            yaw: decidegrees(output.psi_cmd),
        });
    }
}

impl AttitudeSource for IdealInnerLoop {
    fn attitude(&self) -> Attitude {
        self.0.get()
    }
}

/// Simulated microsecond timer.
struct Timer(Cell<u32>);

impl MicrosClock for Timer {
    fn micros(&self) -> u32 {
        self.0.get()
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut config = NavigationConfig::new();

    // Slightly slower approach than the defaults.
    config.control.max_speed = 2.0;

    // Apply every drift fit to the estimate.
    config.ransac.apply_correction = true;

    let mut navigator: Navigator = Navigator::new(GateTable::new(&DEFAULT_GATES)?, config);
    let mut link: VisionLink = VisionLink::new();
    let (mut writer, mut reader) = link.split();

    let inner_loop = IdealInnerLoop(Cell::new(Attitude::default()));
    let timer = Timer(Cell::new(0));
    let cycle_us = 2_000; // 500 Hz control loop
    let vision_every = 25; // 20 Hz vision

    // The estimate starts out offset from the true position.
    let drift = (0.3, -0.2);
    let mut applied = (0.0, 0.0);

    println!("     t,  gate,        x,        y,      phi,    theta,      psi");
    let mut last_gate = usize::MAX;
    for cycle in 0..20_000u32 {
        let output = navigator.step(&inner_loop, &timer);
        inner_loop.track(&output);

        if cycle % vision_every == 0 {
            let state = navigator.state();
            let plan = navigator.plan();
            let true_x = state.x + applied.0 - drift.0;
            let true_y = state.y + applied.1 - drift.1;
            writer.report(plan.gate_x - true_x, plan.gate_y - true_y, 0.0)?;

            if let Some(fit) = navigator.ingest_latest(&mut reader) {
                let (dx, dy) = fit.correction();
                applied.0 += dx;
                applied.1 += dy;
                if dx.abs() > 0.01 || dy.abs() > 0.01 {
                    println!(
                        "    drift fit: ({:.3}, {:.3}), {} / {} inliers",
                        dx, dy, fit.inliers_x, fit.inliers_y
                    );
                }
            }
        }

        let state = navigator.state();
        let gate = navigator.plan().gate_index;
        if gate != last_gate || cycle % 1000 == 0 {
            println!(
                "{:6.2}, {:5}, {:-8.3}, {:-8.3}, {:-8.3}, {:-8.3}, {:-8.3}",
                state.time, gate, state.x, state.y, output.phi_cmd, output.theta_cmd, output.psi_cmd
            );
            last_gate = gate;
        }

        timer.0.set(timer.0.get().wrapping_add(cycle_us));
    }

    Ok(())
}
