//! The user domain: a boundary polygon plus the problem configuration.
//!
//! Invariants
//! - The boundary encloses positive area and its bounding rectangle is finite.
//! - `cfg.validate()` has passed, so count and region checks are done before any
//!   trajectory is touched.

use nalgebra::Vector2;

use crate::config::UlamCfg;
use crate::error::{Result, UlamError};
use crate::geom2::{BBox2, Polygon};

#[derive(Clone, Debug)]
pub struct Domain {
    boundary: Polygon,
    bbox: BBox2,
    convex: bool,
    cfg: UlamCfg,
}

impl Domain {
    pub fn new(boundary: Polygon, cfg: UlamCfg) -> Result<Self> {
        cfg.validate()?;
        let bbox = *boundary.bbox();
        let area = boundary.area();
        if !bbox.is_finite() || !(area > 0.0) || bbox.width() <= 0.0 || bbox.height() <= 0.0 {
            return Err(UlamError::DegenerateDomain { area });
        }
        if boundary.is_degenerate(cfg.geom.eps_area_rel * bbox.area()) {
            return Err(UlamError::DegenerateDomain { area });
        }
        let convex = boundary.is_convex();
        Ok(Self {
            boundary,
            bbox,
            convex,
            cfg,
        })
    }

    /// Rectangular domain `[xmin, xmax] × [ymin, ymax]`.
    pub fn rectangle(xmin: f64, xmax: f64, ymin: f64, ymax: f64, cfg: UlamCfg) -> Result<Self> {
        let boundary = Polygon::rectangle(xmin, xmax, ymin, ymax).map_err(|_| {
            UlamError::DegenerateDomain {
                area: ((xmax - xmin) * (ymax - ymin)).max(0.0),
            }
        })?;
        Self::new(boundary, cfg)
    }

    #[inline]
    pub fn boundary(&self) -> &Polygon {
        &self.boundary
    }

    #[inline]
    pub fn bbox(&self) -> &BBox2 {
        &self.bbox
    }

    #[inline]
    pub fn is_convex(&self) -> bool {
        self.convex
    }

    #[inline]
    pub fn cfg(&self) -> &UlamCfg {
        &self.cfg
    }

    /// Boundary-inclusive membership.
    #[inline]
    pub fn contains(&self, p: Vector2<f64>) -> bool {
        self.boundary.contains_closed(p, self.cfg.geom.eps_edge)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::vector;

    #[test]
    fn rectangle_domain_has_matching_bbox() {
        let d = Domain::rectangle(3.0, 5.0, 4.0, 8.0, UlamCfg::default()).unwrap();
        assert_eq!(*d.bbox(), BBox2::new(3.0, 5.0, 4.0, 8.0));
        assert!(d.contains(vector![3.0, 4.0]));
        assert!(d.contains(vector![4.0, 6.0]));
        assert!(!d.contains(vector![2.9, 6.0]));
        assert!(d.is_convex());
    }

    #[test]
    fn degenerate_domains_are_rejected() {
        let flat = Polygon::from_xy(&[[0.0, 0.0], [1.0, 1.0], [2.0, 2.0]]).unwrap();
        assert!(matches!(
            Domain::new(flat, UlamCfg::default()),
            Err(UlamError::DegenerateDomain { .. })
        ));
        assert!(matches!(
            Domain::rectangle(0.0, 0.0, 0.0, 1.0, UlamCfg::default()),
            Err(UlamError::DegenerateDomain { .. })
        ));
    }

    #[test]
    fn configuration_is_checked_first() {
        let cfg = UlamCfg::default().with_poly_number(0);
        assert!(matches!(
            Domain::rectangle(0.0, 1.0, 0.0, 1.0, cfg),
            Err(UlamError::InvalidCoveringCount { .. })
        ));
    }
}
