use crate::brush::Brush;

/// Computes the enclosed volume of a brush.
///
/// Applies the divergence theorem to the face windings: every face adds
/// `dist * area / 3`, where `dist` is its plane distance from the origin.
/// A degenerate brush has volume zero.
pub struct Volume<'a> {
    brush: &'a Brush,
}

impl<'a> Volume<'a> {
    /// Creates a new `Volume` query.
    #[must_use]
    pub fn new(brush: &'a Brush) -> Self {
        Self { brush }
    }

    /// Executes the query.
    #[must_use]
    pub fn execute(&self) -> f64 {
        let brep = self.brush.brep();
        if brep.is_degenerate() {
            return 0.0;
        }
        brep.contributing_face_indices()
            .map(|i| {
                let plane = self.brush.faces()[i].plane();
                plane.dist * brep.windings[i].area(&plane) / 3.0
            })
            .sum()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::brush::FacePayload;
    use crate::config::KernelConfig;
    use crate::math::{Plane, Point3, Vector3};
    use crate::operations::creation::MakeBox;
    use approx::assert_abs_diff_eq;

    fn unit_box(min: Point3) -> Brush {
        MakeBox::new(min, min + Vector3::new(1.0, 1.0, 1.0))
            .execute(&KernelConfig::default())
            .unwrap()
    }

    #[test]
    fn unit_cube_volume_anywhere() {
        for min in [Point3::origin(), Point3::new(-7.5, 3.0, 100.0)] {
            assert_abs_diff_eq!(Volume::new(&unit_box(min)).execute(), 1.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn halved_cube_by_diagonal() {
        let mut brush = unit_box(Point3::origin());
        brush
            .add_plane(
                Plane::from_point_normal(&Point3::new(1.0, 0.0, 0.0), &Vector3::new(1.0, 1.0, 0.0)),
                FacePayload::default(),
            )
            .unwrap();
        assert_abs_diff_eq!(Volume::new(&brush).execute(), 0.5, epsilon = 1e-9);
    }

    #[test]
    fn corner_tetrahedron() {
        let mut brush = unit_box(Point3::origin());
        brush
            .add_plane(
                Plane::from_point_normal(&Point3::new(1.0, 0.0, 0.0), &Vector3::new(1.0, 1.0, 1.0)),
                FacePayload::default(),
            )
            .unwrap();
        assert_abs_diff_eq!(Volume::new(&brush).execute(), 1.0 / 6.0, epsilon = 1e-9);
    }

    #[test]
    fn degenerate_brush_has_no_volume() {
        let brush = Brush::new(&KernelConfig::default());
        assert_abs_diff_eq!(Volume::new(&brush).execute(), 0.0);
    }
}
