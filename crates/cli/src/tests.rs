use super::*;
use serde_json::Value;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

/// A small deterministic table: a lattice of starts inside [0, 2]², each
/// nudged a little; a few walk out of the domain, a few walk back in.
fn write_csv(path: &Path, header: &str) {
    let mut body = format!("{header}\n");
    for i in 0..40 {
        for j in 0..40 {
            let (x, y) = (0.05 * i as f64, 0.05 * j as f64);
            let (dx, dy) = (0.03 * ((i + j) % 3) as f64 - 0.03, 0.02);
            writeln!(body, "{x},{y},{},{}", x + dx, y + dy).unwrap();
        }
    }
    writeln!(body, "-0.5,1.0,0.5,1.0").unwrap();
    writeln!(body, "2.5,0.5,1.5,0.5").unwrap();
    fs::write(path, body).unwrap();
}

fn parse(args: &[&str]) -> RunArgs {
    let mut argv = vec!["ulam", "run"];
    argv.extend_from_slice(args);
    match Cmd::try_parse_from(argv).unwrap().action {
        Action::Run(args) => args,
        Action::Report => panic!("expected run"),
    }
}

#[test]
fn run_writes_bundle_and_sidecar() {
    let dir = tempdir().unwrap();
    let traj = dir.path().join("traj.csv");
    write_csv(&traj, "x0,y0,xT,yT");
    let out = dir.path().join("out").join("bundle.json");
    let args = parse(&[
        "--traj",
        traj.to_str().unwrap(),
        "--rect",
        "0,2,0,2",
        "--out",
        out.to_str().unwrap(),
        "--poly-number",
        "16",
    ]);
    run(&args).unwrap();

    let bundle: Value = serde_json::from_slice(&fs::read(&out).unwrap()).unwrap();
    let n = bundle["info"]["n_polys"].as_u64().unwrap() as usize;
    assert!(n > 0);
    let closed = bundle["P_closed"].as_array().unwrap();
    assert_eq!(closed.len(), n + 1);
    for row in closed {
        let s: f64 = row.as_array().unwrap().iter().map(|v| v.as_f64().unwrap()).sum();
        assert!((s - 1.0).abs() < 1e-9);
    }
    assert_eq!(bundle["P_open"].as_array().unwrap().len(), n);
    assert_eq!(bundle["pi_open"].as_array().unwrap().len(), n);
    assert_eq!(bundle["counts"].as_array().unwrap().len(), n);
    assert_eq!(bundle["info"]["poly_type"], "sqr");
    assert_eq!(bundle["info"]["stoc_type"], "data");
    assert_eq!(bundle["info"]["n_traj"], 1602);
    assert!(bundle["polys"]["nodes"].as_array().unwrap().len() >= 3 * n);

    let prov: Value =
        serde_json::from_slice(&fs::read(out.with_file_name("bundle.provenance.json")).unwrap())
            .unwrap();
    assert_eq!(prov["params"]["cfg"]["covering"], "sqr");
    assert_eq!(prov["inputs"][0], traj.to_string_lossy().as_ref());
}

#[test]
fn aliases_and_no_p_closed() {
    let dir = tempdir().unwrap();
    let traj = dir.path().join("traj.csv");
    write_csv(&traj, "lon0,lat0,lon1,lat1");
    let out = dir.path().join("bundle.json");
    let args = parse(&[
        "--traj",
        traj.to_str().unwrap(),
        "--rect=0,2,0,2",
        "--out",
        out.to_str().unwrap(),
        "--poly-type",
        "hex",
        "--poly-number",
        "12",
        "--stoc-type",
        "source",
        "--x0-alias",
        "lon0",
        "--y0-alias",
        "lat0",
        "--xt-alias",
        "lon1",
        "--yt-alias",
        "lat1",
        "--no-p-closed",
    ]);
    run(&args).unwrap();
    let bundle: Value = serde_json::from_slice(&fs::read(&out).unwrap()).unwrap();
    assert!(bundle.get("P_closed").is_none());
    assert_eq!(bundle["info"]["poly_type"], "hex");
    assert_eq!(bundle["info"]["stoc_type"], "source");
}

#[test]
fn polygon_domain_and_point_region() {
    let dir = tempdir().unwrap();
    let traj = dir.path().join("traj.csv");
    write_csv(&traj, "x0,y0,xT,yT");
    let domain = dir.path().join("domain.json");
    fs::write(
        &domain,
        r#"{"nodes": [[0, 0], [2, 0], [2, 1], [1, 1], [1, 2], [0, 2]]}"#,
    )
    .unwrap();
    let points = dir.path().join("points.json");
    fs::write(&points, r#"{"nodes": [[0.3, 0.3]]}"#).unwrap();
    let out = dir.path().join("l.json");
    let args = parse(&[
        "--traj",
        traj.to_str().unwrap(),
        "--domain",
        domain.to_str().unwrap(),
        "--stoc-points",
        points.to_str().unwrap(),
        "--out",
        out.to_str().unwrap(),
        "--poly-number",
        "20",
    ]);
    assert!(matches!(
        args.cfg().unwrap().reinjection,
        ReinjectionKind::Source(Some(ReinjectionRegion::Points(_)))
    ));
    run(&args).unwrap();
    let bundle: Value = serde_json::from_slice(&fs::read(&out).unwrap()).unwrap();
    // Exactly one polygon receives reinjected mass.
    let nirvana = bundle["P_closed"].as_array().unwrap().last().unwrap().clone();
    let hits = nirvana
        .as_array()
        .unwrap()
        .iter()
        .filter(|v| v.as_f64().unwrap() > 0.0)
        .count();
    assert_eq!(hits, 1);
}

#[test]
fn missing_column_is_reported() {
    let dir = tempdir().unwrap();
    let traj = dir.path().join("traj.csv");
    write_csv(&traj, "a,b,c,d");
    let args = parse(&[
        "--traj",
        traj.to_str().unwrap(),
        "--rect",
        "0,2,0,2",
        "--out",
        dir.path().join("x.json").to_str().unwrap(),
    ]);
    assert!(run(&args).is_err());
}

#[test]
fn domain_flags_are_exclusive_and_required() {
    assert!(Cmd::try_parse_from(["ulam", "run", "--traj", "t.csv", "--out", "o.json"]).is_err());
    assert!(Cmd::try_parse_from([
        "ulam", "run", "--traj", "t.csv", "--out", "o.json", "--rect", "0,1,0,1", "--domain",
        "d.json",
    ])
    .is_err());
    let args = parse(&["--traj", "t.csv", "--out", "o.json", "--rect", "-1,1,-2,2"]);
    assert_eq!(args.rect, Some(vec![-1.0, 1.0, -2.0, 2.0]));
    assert!(matches!(args.poly_type, CoveringKind::Square));
    assert_eq!(args.rseed, DEFAULT_RSEED);
}
