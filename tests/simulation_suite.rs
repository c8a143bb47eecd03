use nivis_tui::sim::{Simulation, SimulationHandle};

fn solid_cells(sim: &Simulation) -> usize {
    let mut n = 0;
    for y in 0..sim.height() {
        for x in 0..sim.width() {
            if sim.phi_at(x, y) > 0.5 {
                n += 1;
            }
        }
    }
    n
}

fn run(sim: &mut Simulation, steps: usize) {
    for _ in 0..steps {
        sim.step().unwrap();
    }
}

#[test]
fn a_seeded_melt_stays_bounded_over_many_ticks() {
    let mut sim = Simulation::new(100, 100);
    sim.add_seed(50.0, 50.0);
    run(&mut sim, 300);

    assert_eq!(sim.tick(), 300);
    for y in 0..100 {
        for x in 0..100 {
            let p = sim.phi_at(x, y);
            let t = sim.temperature_at(x, y);
            assert!(p.is_finite() && t.is_finite());
            assert!((-0.5..=1.5).contains(&p), "phi {p} out of bounds");
            assert!((-0.5..=1.5).contains(&t), "temperature {t} out of bounds");
        }
    }
}

#[test]
fn the_crystal_grows_from_the_seed() {
    let mut sim = Simulation::new(80, 80);
    sim.add_seed(40.0, 40.0);
    let before = solid_cells(&sim);
    assert!(before > 0);

    run(&mut sim, 500);
    let after = solid_cells(&sim);
    assert!(
        after > before,
        "expected growth, had {before} solid cells then {after}"
    );
}

#[test]
fn growth_releases_latent_heat() {
    let mut sim = Simulation::new(80, 80);
    sim.add_seed(40.0, 40.0);
    run(&mut sim, 200);

    let mut max_t = f32::MIN;
    for y in 0..80 {
        for x in 0..80 {
            max_t = max_t.max(sim.temperature_at(x, y));
        }
    }
    // The melt starts at zero; solidification must have warmed it.
    assert!(max_t > 0.1, "max temperature {max_t}");
}

#[test]
fn stronger_coupling_warms_the_interface_more() {
    let mut cool = Simulation::new(60, 60);
    let mut hot = Simulation::new(60, 60);
    cool.set_kappa(0.8);
    hot.set_kappa(2.0);
    for sim in [&mut cool, &mut hot] {
        sim.add_seed(30.0, 30.0);
        run(sim, 150);
    }

    let total = |s: &Simulation| -> f32 {
        let mut sum = 0.0;
        for y in 0..60 {
            for x in 0..60 {
                sum += s.temperature_at(x, y);
            }
        }
        sum
    };
    assert!(total(&hot) > total(&cool));
}

#[test]
fn anisotropy_settings_keep_the_solution_finite() {
    for delta in [0.0, 0.02, 0.05] {
        let mut sim = Simulation::new(60, 60);
        sim.set_delta(delta);
        sim.add_seed(30.0, 30.0);
        run(&mut sim, 200);
        assert_eq!(sim.tick(), 200);
    }
}

#[test]
fn multiple_seeds_coexist() {
    let mut sim = Simulation::new(100, 60);
    sim.add_seed(25.0, 30.0);
    sim.add_seed(75.0, 30.0);
    run(&mut sim, 100);

    assert!(sim.phi_at(25, 30) > 0.5);
    assert!(sim.phi_at(75, 30) > 0.5);
}

#[test]
fn rgba_readbacks_match_the_grid_every_tick() {
    let mut sim = Simulation::new(48, 32);
    sim.add_seed(24.0, 16.0);
    let expected = 48 * 32 * 4;
    for _ in 0..10 {
        sim.step().unwrap();
        assert_eq!(sim.phi_rgba().len(), expected);
        assert_eq!(sim.temperature_rgba().len(), expected);
    }
}

#[test]
fn reset_then_reseed_reproduces_a_fresh_melt() {
    let mut sim = Simulation::new(60, 60);
    sim.add_seed(30.0, 30.0);
    run(&mut sim, 100);
    assert!(solid_cells(&sim) > 0);

    sim.reset();
    assert_eq!(sim.tick(), 0);
    assert_eq!(solid_cells(&sim), 0);
    for y in 0..60 {
        for x in 0..60 {
            assert_eq!(sim.temperature_at(x, y), 0.0);
        }
    }

    sim.add_seed(30.0, 30.0);
    assert!(solid_cells(&sim) > 0);
}

#[test]
fn the_engine_is_usable_behind_the_handle_trait() {
    let mut boxed: Box<dyn SimulationHandle> = Box::new(Simulation::new(40, 40));
    boxed.set_kappa(1.6);
    boxed.set_delta(0.02);
    boxed.add_seed(20.0, 20.0);
    for _ in 0..20 {
        boxed.step().unwrap();
    }
    assert_eq!(boxed.phi_rgba().len(), 40 * 40 * 4);
}
