//! Emprise rectangulaire d'un fichier

use geo::{LineString, Polygon};
use serde::Serialize;

/// Rectangle aligné sur les axes, `minx <= maxx` et `miny <= maxy`
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoundingBox {
    pub minx: f64,
    pub miny: f64,
    pub maxx: f64,
    pub maxy: f64,
}

impl BoundingBox {
    /// Construit l'emprise depuis les extents déclarés.
    ///
    /// Des bornes inversées (en-tête corrompu) sont remises dans l'ordre.
    /// Une largeur ou hauteur nulle est acceptée.
    pub fn build(minx: f64, miny: f64, maxx: f64, maxy: f64) -> Self {
        Self {
            minx: minx.min(maxx),
            miny: miny.min(maxy),
            maxx: minx.max(maxx),
            maxy: miny.max(maxy),
        }
    }

    pub fn is_degenerate(&self) -> bool {
        self.minx == self.maxx || self.miny == self.maxy
    }

    /// Anneau fermé de 5 sommets, sens anti-horaire
    pub fn ring(&self) -> [(f64, f64); 5] {
        [
            (self.maxx, self.miny),
            (self.maxx, self.maxy),
            (self.minx, self.maxy),
            (self.minx, self.miny),
            (self.maxx, self.miny),
        ]
    }

    pub fn to_polygon(&self) -> Polygon<f64> {
        Polygon::new(LineString::from(self.ring().to_vec()), vec![])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::Area;

    #[test]
    fn test_ring_is_closed_and_ccw() {
        let cases = [
            (0.0, 0.0, 10.0, 10.0),
            (5.0, 5.0, 15.0, 15.0),
            (-2.0, -2.0, 0.0, 0.0),
            (500_000.25, 4_649_776.5, 501_000.75, 4_650_776.0),
        ];
        for (minx, miny, maxx, maxy) in cases {
            let polygon = BoundingBox::build(minx, miny, maxx, maxy).to_polygon();
            let coords: Vec<_> = polygon.exterior().coords().map(|c| (c.x, c.y)).collect();

            assert_eq!(coords.len(), 5);
            assert_eq!(coords[0], coords[4]);
            assert_eq!(
                coords[..4],
                [(maxx, miny), (maxx, maxy), (minx, maxy), (minx, miny)]
            );
            // Aire signée positive = anti-horaire
            assert!(polygon.signed_area() > 0.0);
            assert!((polygon.unsigned_area() - (maxx - minx) * (maxy - miny)).abs() < 1e-6);
        }
    }

    #[test]
    fn test_degenerate_boxes() {
        let point = BoundingBox::build(3.0, 4.0, 3.0, 4.0);
        assert!(point.is_degenerate());
        let polygon = point.to_polygon();
        assert_eq!(polygon.exterior().0.len(), 5);
        assert_eq!(polygon.unsigned_area(), 0.0);

        let line = BoundingBox::build(0.0, 1.0, 10.0, 1.0);
        assert!(line.is_degenerate());
        let coords = line.ring();
        assert_eq!(coords[0], coords[4]);
        assert_eq!(line.to_polygon().unsigned_area(), 0.0);
    }

    #[test]
    fn test_inverted_extents_are_normalised() {
        let bbox = BoundingBox::build(10.0, 10.0, 0.0, 0.0);
        assert_eq!(bbox, BoundingBox::build(0.0, 0.0, 10.0, 10.0));
        assert!(!bbox.is_degenerate());
    }
}
