//! Area-of-interest geometry and its derived extent.

use geo::algorithm::bounding_rect::BoundingRect;
use geo::{Polygon, Rect};
use serde::{Deserialize, Serialize};

use crate::error::{ClipshipError, Result};

/// Axis-aligned bounding box of the area of interest, in the working
/// spatial units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub xmin: f64,
    pub ymin: f64,
    pub xmax: f64,
    pub ymax: f64,
}

impl BoundingBox {
    pub fn width(&self) -> f64 {
        self.xmax - self.xmin
    }

    pub fn height(&self) -> f64 {
        self.ymax - self.ymin
    }

    /// Planar area = width × height. A degenerate extent yields zero.
    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    /// Space-delimited `"xmin ymin xmax ymax"` form used in engine
    /// invocations and log entries.
    pub fn to_extent_string(&self) -> String {
        format!("{} {} {} {}", self.xmin, self.ymin, self.xmax, self.ymax)
    }
}

impl From<Rect<f64>> for BoundingBox {
    fn from(rect: Rect<f64>) -> Self {
        Self {
            xmin: rect.min().x,
            ymin: rect.min().y,
            xmax: rect.max().x,
            ymax: rect.max().y,
        }
    }
}

/// Clipping boundary polygon with its derived bounding box and planar area.
///
/// Computed once per job and immutable afterward. The raster branch clips
/// by the bounding box; the feature branch clips by the true geometry.
#[derive(Debug, Clone)]
pub struct AreaOfInterest {
    polygon: Polygon<f64>,
    bbox: BoundingBox,
    area: f64,
}

impl AreaOfInterest {
    /// Derive the extent and area from the polygon. An empty polygon has no
    /// extent and fails the whole job: this is the one fatal precondition.
    pub fn from_polygon(polygon: Polygon<f64>) -> Result<Self> {
        let rect = polygon.bounding_rect().ok_or_else(|| ClipshipError::AoiUndescribable {
            reason: "polygon has no extent".to_string(),
        })?;
        let bbox = BoundingBox::from(rect);
        let area = bbox.area();
        Ok(Self { polygon, bbox, area })
    }

    pub fn polygon(&self) -> &Polygon<f64> {
        &self.polygon
    }

    pub fn bounding_box(&self) -> BoundingBox {
        self.bbox
    }

    pub fn area(&self) -> f64 {
        self.area
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{polygon, LineString};
    use proptest::prelude::*;

    #[test]
    fn test_bounding_box_from_polygon() {
        let poly = polygon![
            (x: 10.0, y: 20.0),
            (x: 30.0, y: 20.0),
            (x: 30.0, y: 25.0),
            (x: 10.0, y: 25.0),
            (x: 10.0, y: 20.0),
        ];
        let aoi = AreaOfInterest::from_polygon(poly).unwrap();
        let bbox = aoi.bounding_box();
        assert_eq!(bbox.xmin, 10.0);
        assert_eq!(bbox.ymax, 25.0);
        assert_eq!(aoi.area(), 20.0 * 5.0);
        assert_eq!(bbox.to_extent_string(), "10 20 30 25");
    }

    #[test]
    fn test_degenerate_aoi_has_zero_area() {
        // all vertices identical: zero width and height
        let poly = polygon![
            (x: 5.0, y: 5.0),
            (x: 5.0, y: 5.0),
            (x: 5.0, y: 5.0),
        ];
        let aoi = AreaOfInterest::from_polygon(poly).unwrap();
        assert_eq!(aoi.area(), 0.0);
    }

    #[test]
    fn test_empty_polygon_is_undescribable() {
        let poly = Polygon::new(LineString::new(vec![]), vec![]);
        assert!(matches!(
            AreaOfInterest::from_polygon(poly),
            Err(ClipshipError::AoiUndescribable { .. })
        ));
    }

    proptest! {
        #[test]
        fn prop_area_is_width_times_height(
            xmin in -1.0e6f64..1.0e6,
            ymin in -1.0e6f64..1.0e6,
            w in 0.0f64..1.0e6,
            h in 0.0f64..1.0e6,
        ) {
            let bbox = BoundingBox { xmin, ymin, xmax: xmin + w, ymax: ymin + h };
            prop_assert!((bbox.area() - w * h).abs() <= 1e-6 * (1.0 + w * h));
        }
    }
}
