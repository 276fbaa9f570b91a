//! File formats of the binary: trajectory tables in, JSON result bundle out.
//!
//! - Trajectories: CSV (or Parquet) with four numeric columns, by default
//!   `x0, y0, xT, yT`. Missing values become NaN and classify as nirvana.
//! - Domain and reinjection regions: JSON `{"nodes": [[x, y], ...]}`.
//! - Result: one JSON document; `P_closed` can be left out to save space.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use ulam::api::{DMatrix, PolyTable, Polygon, Trajectories, UlamInfo, UlamResult};

/// Column names of the four trajectory coordinates.
#[derive(Clone, Debug, Serialize)]
pub struct Columns {
    pub x0: String,
    pub y0: String,
    pub xt: String,
    pub yt: String,
}

impl Default for Columns {
    fn default() -> Self {
        Self {
            x0: "x0".into(),
            y0: "y0".into(),
            xt: "xT".into(),
            yt: "yT".into(),
        }
    }
}

pub fn read_trajectories(path: &Path, cols: &Columns) -> Result<Trajectories> {
    let lf = match path.extension().and_then(|e| e.to_str()) {
        Some("parquet") => LazyFrame::scan_parquet(path, ScanArgsParquet::default())
            .with_context(|| format!("scanning {}", path.display()))?,
        _ => LazyCsvReader::new(path)
            .with_infer_schema_length(Some(100))
            .finish()
            .with_context(|| format!("scanning {}", path.display()))?,
    };
    let names = [&cols.x0, &cols.y0, &cols.xt, &cols.yt];
    let df = lf
        .select(names.iter().map(|n| col(n.as_str())).collect::<Vec<_>>())
        .collect()
        .with_context(|| format!("reading columns {names:?} from {}", path.display()))?;
    let column = |name: &str| -> Result<Vec<f64>> {
        let s = df
            .column(name)
            .with_context(|| format!("missing column {name}"))?
            .cast(&DataType::Float64)?;
        Ok(s.f64()?.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect())
    };
    let traj = Trajectories::new(
        &column(&cols.x0)?,
        &column(&cols.y0)?,
        &column(&cols.xt)?,
        &column(&cols.yt)?,
    )?;
    tracing::info!(rows = traj.len(), path = %path.display(), "trajectories loaded");
    Ok(traj)
}

/// `{"nodes": [[x, y], ...]}`
#[derive(Debug, Deserialize, Serialize)]
pub struct NodesFile {
    pub nodes: Vec<[f64; 2]>,
}

pub fn read_nodes(path: &Path) -> Result<Vec<[f64; 2]>> {
    let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let file: NodesFile = serde_json::from_slice(&bytes)
        .with_context(|| format!("parsing {} as {{\"nodes\": [[x, y], ...]}}", path.display()))?;
    Ok(file.nodes)
}

pub fn read_polygon(path: &Path) -> Result<Polygon> {
    let nodes = read_nodes(path)?;
    Polygon::from_xy(&nodes).with_context(|| format!("polygon in {}", path.display()))
}

/// The serialized result bundle.
#[derive(Debug, Serialize)]
pub struct Bundle<'a> {
    #[serde(rename = "P_closed", skip_serializing_if = "Option::is_none")]
    pub p_closed: Option<Vec<Vec<f64>>>,
    pub pi_closed: Vec<f64>,
    #[serde(rename = "P_open")]
    pub p_open: Vec<Vec<f64>>,
    pub pi_open: Vec<f64>,
    pub polys: PolyTable,
    pub polys_dis: PolyTable,
    pub counts: &'a [u64],
    pub counts_dis: &'a [u64],
    pub info: &'a UlamInfo,
}

impl<'a> Bundle<'a> {
    pub fn new(res: &'a UlamResult, with_p_closed: bool) -> Self {
        let rows = |m: &DMatrix<f64>| -> Vec<Vec<f64>> {
            m.row_iter().map(|r| r.iter().copied().collect()).collect()
        };
        Self {
            p_closed: with_p_closed.then(|| rows(&res.p_closed)),
            pi_closed: res.pi_closed.iter().copied().collect(),
            p_open: rows(&res.p_open()),
            pi_open: res.pi_open().iter().copied().collect(),
            polys: PolyTable::from_polygons(&res.polys),
            polys_dis: PolyTable::from_polygons(&res.polys_dis),
            counts: &res.counts,
            counts_dis: &res.counts_dis,
            info: &res.info,
        }
    }
}

pub fn write_bundle(path: &Path, bundle: &Bundle<'_>) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating output dir {}", parent.display()))?;
        }
    }
    fs::write(path, serde_json::to_vec(bundle)?)
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}
