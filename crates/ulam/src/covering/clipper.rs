//! Restricts a raw covering to the domain polygon.
//!
//! Per cell: keep it untouched if the domain covers it, otherwise intersect with
//! the domain, keep the largest piece, and drop the cell if
//! nothing of positive area remains. Surviving cells are compacted in generator
//! order; `origin` records where each came from.

use rayon::prelude::*;
use tracing::{info, warn};

use super::Covering;
use crate::domain::Domain;
use crate::error::{Result, UlamError};
use crate::geom2::{covers, intersect, largest_piece, Location, Polygon};

pub fn clip_to_domain(raw: Vec<Polygon>, domain: &Domain) -> Result<Covering> {
    let n_generated = raw.len();
    let eps_rel = domain.cfg().geom.eps_area_rel;
    let clipped: Vec<Option<Polygon>> = raw
        .par_iter()
        .map(|cell| clip_cell(cell, domain, eps_rel))
        .collect();

    let mut polygons = Vec::with_capacity(n_generated);
    let mut origin = Vec::with_capacity(n_generated);
    let mut n_split = 0usize;
    for (i, piece) in clipped.into_iter().enumerate() {
        if let Some(p) = piece {
            if p.area() < raw[i].area() * (1.0 - 1e-9) {
                n_split += 1;
            }
            polygons.push(p);
            origin.push(i);
        }
    }
    let n_dropped = n_generated - polygons.len();
    if polygons.is_empty() {
        return Err(UlamError::EmptyCovering);
    }
    if n_dropped > 0 {
        warn!(n_dropped, "covering cells outside the domain or degenerate after clipping");
    }
    info!(
        n_generated,
        n_kept = polygons.len(),
        n_trimmed = n_split,
        "covering clipped to domain"
    );
    Ok(Covering {
        polygons,
        origin,
        n_generated,
        n_dropped,
    })
}

fn clip_cell(cell: &Polygon, domain: &Domain, eps_rel: f64) -> Option<Polygon> {
    let geom = &domain.cfg().geom;
    // Cells inside the domain are kept as generated.
    let inside = if domain.is_convex() {
        cell.vertices()
            .iter()
            .all(|v| domain.boundary().locate(*v, geom.eps_edge) != Location::Outside)
    } else {
        covers(domain.boundary(), cell, geom)
    };
    if inside {
        return Some(cell.clone());
    }
    let piece = largest_piece(intersect(cell, domain.boundary()))?;
    (!piece.is_degenerate(eps_rel * cell.area())).then_some(piece)
}
