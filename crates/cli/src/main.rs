use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde_json::json;
use tracing_subscriber::fmt::SubscriberBuilder;
use ulam::api::{
    run_ulam_method, CoveringKind, Domain, ReinjectionKind, ReinjectionRegion, UlamCfg,
    DEFAULT_RSEED,
};

mod io;
mod provenance;

use io::{Bundle, Columns};

#[derive(Parser)]
#[command(name = "ulam")]
#[command(about = "Ulam's method: transition matrices from 2D trajectory data")]
struct Cmd {
    #[command(subcommand)]
    action: Action,
}

#[derive(Subcommand)]
enum Action {
    /// Build the Markov chain for a trajectory table and write the result bundle
    Run(RunArgs),
    /// Print a small provenance JSON block
    Report,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum StocType {
    Data,
    Source,
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Trajectory table (.csv or .parquet)
    #[arg(long)]
    traj: PathBuf,
    /// Domain boundary as JSON {"nodes": [[x, y], ...]}
    #[arg(long, conflicts_with = "rect", required_unless_present = "rect")]
    domain: Option<PathBuf>,
    /// Rectangular domain xmin,xmax,ymin,ymax
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    rect: Option<Vec<f64>>,
    /// Output JSON; the provenance sidecar lands next to it
    #[arg(long)]
    out: PathBuf,
    #[arg(long, default_value_t = CoveringKind::Square)]
    poly_type: CoveringKind,
    /// Defaults to 500 for sqr/hex and 100 for vor
    #[arg(long)]
    poly_number: Option<usize>,
    #[arg(long, value_enum, default_value_t = StocType::Data)]
    stoc_type: StocType,
    /// Source reinjection into the polygons overlapping this polygon (JSON nodes)
    #[arg(long, conflicts_with = "stoc_points")]
    stoc_polygon: Option<PathBuf>,
    /// Source reinjection into the polygons containing these points (JSON nodes)
    #[arg(long)]
    stoc_points: Option<PathBuf>,
    #[arg(long, default_value_t = DEFAULT_RSEED)]
    rseed: u64,
    #[arg(long, default_value = "x0")]
    x0_alias: String,
    #[arg(long, default_value = "y0")]
    y0_alias: String,
    #[arg(long, default_value = "xT")]
    xt_alias: String,
    #[arg(long, default_value = "yT")]
    yt_alias: String,
    /// Leave the closed matrix out of the bundle
    #[arg(long)]
    no_p_closed: bool,
}

impl RunArgs {
    fn columns(&self) -> Columns {
        Columns {
            x0: self.x0_alias.clone(),
            y0: self.y0_alias.clone(),
            xt: self.xt_alias.clone(),
            yt: self.yt_alias.clone(),
        }
    }

    fn reinjection(&self) -> Result<ReinjectionKind> {
        // A region implies the source policy.
        if let Some(path) = &self.stoc_polygon {
            return Ok(ReinjectionKind::Source(Some(ReinjectionRegion::Polygon(
                io::read_polygon(path)?,
            ))));
        }
        if let Some(path) = &self.stoc_points {
            return Ok(ReinjectionKind::Source(Some(ReinjectionRegion::Points(
                io::read_nodes(path)?,
            ))));
        }
        Ok(match self.stoc_type {
            StocType::Data => ReinjectionKind::Data,
            StocType::Source => ReinjectionKind::Source(None),
        })
    }

    fn cfg(&self) -> Result<UlamCfg> {
        let mut cfg = UlamCfg::new(self.poly_type)
            .with_rseed(self.rseed)
            .with_reinjection(self.reinjection()?);
        if let Some(n) = self.poly_number {
            cfg = cfg.with_poly_number(n);
        }
        Ok(cfg)
    }

    fn domain(&self, cfg: UlamCfg) -> Result<Domain> {
        match (&self.domain, &self.rect) {
            (Some(path), _) => Ok(Domain::new(io::read_polygon(path)?, cfg)?),
            (None, Some(r)) => {
                let [xmin, xmax, ymin, ymax] = r[..] else {
                    bail!("--rect takes four values, got {}", r.len());
                };
                Ok(Domain::rectangle(xmin, xmax, ymin, ymax, cfg)?)
            }
            (None, None) => bail!("one of --domain or --rect is required"),
        }
    }
}

fn main() -> Result<()> {
    SubscriberBuilder::default().with_target(false).init();
    let cmd = Cmd::parse();
    match cmd.action {
        Action::Run(args) => run(&args),
        Action::Report => report(),
    }
}

fn run(args: &RunArgs) -> Result<()> {
    tracing::info!(traj = %args.traj.display(), out = %args.out.display(), "run");
    let cfg = args.cfg()?;
    let domain = args.domain(cfg.clone())?;
    let cols = args.columns();
    let trajectories = io::read_trajectories(&args.traj, &cols)?;

    let res = run_ulam_method(&trajectories, &domain).context("running Ulam's method")?;
    io::write_bundle(&args.out, &Bundle::new(&res, !args.no_p_closed))?;
    let prov = provenance::write_sidecar(
        &args.out,
        provenance::Payload::new(json!({
            "cfg": cfg,
            "columns": cols,
            "no_p_closed": args.no_p_closed,
        }))
        .with_inputs(
            std::iter::once(&args.traj)
                .chain(&args.domain)
                .chain(&args.stoc_polygon)
                .chain(&args.stoc_points),
        ),
    )?;
    tracing::info!(
        n_polys = res.info.n_polys,
        provenance = %prov.display(),
        "bundle written"
    );
    Ok(())
}

fn report() -> Result<()> {
    let obj = json!({
        "code_rev": provenance::current_git_rev(),
        "ulam_version": ulam::VERSION,
        "defaults": UlamCfg::default(),
        "inputs": [],
        "outputs": []
    });
    println!("{}", serde_json::to_string_pretty(&obj)?);
    Ok(())
}

#[cfg(test)]
mod tests;
