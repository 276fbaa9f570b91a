use super::*;
use crate::classify::Label;
use crate::config::{ReinjectionKind, ReinjectionRegion, UlamCfg};
use crate::error::UlamError;
use crate::poly_table::PolyTable;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Uniform starts in `[lo, hi]²`, each moved by a uniform step of at most `step`.
fn random_steps(n: usize, lo: f64, hi: f64, step: f64, seed: u64) -> Trajectories {
    let mut rng = StdRng::seed_from_u64(seed);
    let (mut x0, mut y0, mut xt, mut yt) = (vec![], vec![], vec![], vec![]);
    for _ in 0..n {
        let (x, y) = (rng.gen_range(lo..hi), rng.gen_range(lo..hi));
        x0.push(x);
        y0.push(y);
        xt.push(x + rng.gen_range(-step..step));
        yt.push(y + rng.gen_range(-step..step));
    }
    Trajectories::new(&x0, &y0, &xt, &yt).unwrap()
}

fn assert_row_stochastic(p: &DMatrix<f64>) {
    for row in p.row_iter() {
        assert!((row.sum() - 1.0).abs() < 1e-12);
        assert!(row.iter().all(|&v| v >= 0.0));
    }
}

#[test]
fn quadrant_scenario() {
    let cfg = UlamCfg::default().with_poly_number(4);
    let domain = Domain::rectangle(0.0, 1.0, 0.0, 1.0, cfg).unwrap();
    let pts = [[0.25, 0.25], [0.75, 0.25], [0.25, 0.75], [0.75, 0.75]];
    let xs: Vec<f64> = pts.iter().map(|p| p[0]).collect();
    let ys: Vec<f64> = pts.iter().map(|p| p[1]).collect();
    let traj = Trajectories::new(&xs, &ys, &xs, &ys).unwrap();

    let covering = build_covering(&traj, &domain).unwrap();
    assert_eq!(covering.len(), 4);
    let index = CoveringIndex::new(&covering, &domain);
    let starts = classify(traj.start(), &index);
    let ends = classify(traj.end(), &index);
    let counts = TransitionCounts::from_labels(&starts.labels, &ends.labels, 4);
    let dense = counts.to_dense();
    assert_eq!(dense.nrows(), 5);
    assert_eq!(dense, DMatrix::from_diagonal(&DVector::from_vec(vec![1.0, 1.0, 1.0, 1.0, 0.0])));

    // Four closed loops with no path between them. All four pass the
    // empty-row check, but the chain must end up as one strongly connected
    // component, and that rule wins: the largest component is kept (ties go to
    // the lowest index), so cell 0 stays and the other three are disconnected.
    let res = run_ulam_method(&traj, &domain).unwrap();
    assert_eq!(res.polys.len(), 1);
    assert_eq!(res.polys_dis.len(), 3);
    assert_eq!(res.counts_dis, vec![1, 1, 1]);
    assert!(!res.has_nirvana());
    assert_eq!(res.p_closed, DMatrix::from_element(1, 1, 1.0));
    assert_eq!(res.info.n_removed_empty, 0);
}

#[test]
fn crossing_the_boundary_touches_nirvana() {
    let cfg = UlamCfg::default().with_poly_number(4);
    let domain = Domain::rectangle(0.0, 1.0, 0.0, 1.0, cfg).unwrap();
    let traj = Trajectories::new(&[2.0, 0.25], &[2.0, 0.25], &[0.75, 3.0], &[0.75, 3.0]).unwrap();
    let covering = build_covering(&traj, &domain).unwrap();
    let index = CoveringIndex::new(&covering, &domain);
    let starts = classify(traj.start(), &index);
    let ends = classify(traj.end(), &index);
    assert_eq!(starts.labels, vec![Label::Nirvana, Label::Inside(0)]);
    assert_eq!(ends.labels, vec![Label::Inside(3), Label::Nirvana]);
    let counts = TransitionCounts::from_labels(&starts.labels, &ends.labels, 4);
    assert_eq!(counts.get(4, 3), 1);
    assert_eq!(counts.get(0, 4), 1);
}

#[test]
fn random_box_with_data_reinjection() {
    let traj = random_steps(10_000, 0.0, 10.0, 0.5, 17);
    let cfg = UlamCfg::default().with_poly_number(40);
    let domain = Domain::rectangle(3.0, 5.0, 4.0, 8.0, cfg).unwrap();
    let res = run_ulam_method(&traj, &domain).unwrap();
    assert!(res.has_nirvana());
    assert_eq!(res.polys.len(), 32);
    assert_eq!(res.p_closed.nrows(), 33);
    assert_row_stochastic(&res.p_closed);
    assert!((res.pi_closed.sum() - 1.0).abs() < 1e-9);
    assert!((res.pi_open().sum() - 1.0).abs() < 1e-9);
    let open = res.p_open();
    assert_eq!(open.nrows(), 32);
    assert!(open.row_iter().all(|r| r.sum() <= 1.0 + 1e-12));
    assert!(open.row_iter().any(|r| r.sum() < 1.0));
    assert_eq!(res.info.n_traj, 10_000);
    assert_eq!(res.info.n_polys, 32);
    assert_eq!(res.counts.len(), 32);
    // Stationarity of the closed chain.
    let moved = res.pi_closed.transpose() * &res.p_closed;
    assert!((moved.transpose() - &res.pi_closed).norm() < 1e-8);
}

#[test]
fn source_region_equal_to_one_cell_gives_a_one_hot_nirvana_row() {
    let traj = random_steps(20_000, -0.5, 1.5, 0.3, 5);
    let cfg = UlamCfg::default().with_poly_number(4);
    let probe = Domain::rectangle(0.0, 1.0, 0.0, 1.0, cfg.clone()).unwrap();
    let target = build_covering(&traj, &probe).unwrap().polygons[3].clone();

    let cfg = cfg.with_source_region(ReinjectionRegion::Polygon(target.clone()));
    let domain = Domain::rectangle(0.0, 1.0, 0.0, 1.0, cfg).unwrap();
    let res = run_ulam_method(&traj, &domain).unwrap();
    assert_eq!(res.polys.len(), 4);
    assert_eq!(res.polys[3], target);
    let nirvana_row: Vec<f64> = res.p_closed.row(4).iter().copied().collect();
    assert_eq!(nirvana_row, vec![0.0, 0.0, 0.0, 1.0, 0.0]);
    assert_row_stochastic(&res.p_closed);
    assert_eq!(res.info.stoc_type, "source");
}

#[test]
fn source_everywhere_is_uniform() {
    let traj = random_steps(20_000, -0.5, 1.5, 0.3, 6);
    let cfg = UlamCfg::default()
        .with_poly_number(4)
        .with_reinjection(ReinjectionKind::Source(None));
    let domain = Domain::rectangle(0.0, 1.0, 0.0, 1.0, cfg).unwrap();
    let res = run_ulam_method(&traj, &domain).unwrap();
    for j in 0..4 {
        assert!((res.p_closed[(4, j)] - 0.25).abs() < 1e-15);
    }
}

#[test]
fn voronoi_runs_are_reproducible() {
    let traj = random_steps(5_000, 0.0, 4.0, 0.4, 8);
    let cfg = UlamCfg::new(crate::config::CoveringKind::Voronoi)
        .with_poly_number(20)
        .with_rseed(99);
    let domain = Domain::rectangle(1.0, 3.0, 1.0, 3.0, cfg).unwrap();
    let a = run_ulam_method(&traj, &domain).unwrap();
    let b = run_ulam_method(&traj, &domain).unwrap();
    assert_eq!(a.p_closed, b.p_closed);
    assert_eq!(a.polys, b.polys);
    assert_eq!(a.info.rseed, 99);
    assert_row_stochastic(&a.p_closed);
}

#[test]
fn reinjection_outside_the_domain_fails_before_counting() {
    let traj = random_steps(100, 0.0, 1.0, 0.1, 1);
    let cfg = UlamCfg::default()
        .with_poly_number(4)
        .with_source_region(ReinjectionRegion::Points(vec![[5.0, 5.0]]));
    let domain = Domain::rectangle(0.0, 1.0, 0.0, 1.0, cfg).unwrap();
    let err = run_ulam_method(&traj, &domain).unwrap_err();
    assert!(matches!(err, UlamError::EmptyReinjectionTarget));
}

#[test]
fn result_polygons_survive_the_table_round_trip() {
    let traj = random_steps(3_000, 0.0, 2.0, 0.2, 4);
    let cfg = UlamCfg::new(crate::config::CoveringKind::Hexagon).with_poly_number(12);
    let domain = Domain::rectangle(0.0, 2.0, 0.0, 2.0, cfg).unwrap();
    let res = run_ulam_method(&traj, &domain).unwrap();
    let table = PolyTable::from_polygons(&res.polys);
    assert_eq!(table.to_polygons().unwrap(), res.polys);
}
