use crate::math::{Plane, PlaneSide};

use super::{Winding, WindingVertex};

impl Winding {
    /// A square of half-size `extent` lying on `plane`, standing in for the
    /// whole (infinite) plane.
    ///
    /// None of its edges has an adjacent face yet.
    #[must_use]
    pub fn infinite(plane: &Plane, extent: f64) -> Self {
        if !plane.is_valid() {
            return Self::new();
        }
        let (u, v) = plane.basis();
        let origin = plane.origin();
        let u = u * extent;
        let v = v * extent;
        Self::from_vertices(vec![
            WindingVertex::new(origin - u - v, None),
            WindingVertex::new(origin + u - v, None),
            WindingVertex::new(origin + u + v, None),
            WindingVertex::new(origin - u + v, None),
        ])
    }

    /// Keeps the part of the winding in front of (or on) `clip_plane`.
    ///
    /// Edges created by the cut are tagged with `adjacent`, the index of the
    /// face owning `clip_plane`. A winding already entirely in front comes
    /// back unchanged.
    #[must_use]
    pub fn clip(&self, clip_plane: &Plane, adjacent: usize, epsilon: f64) -> Self {
        let n = self.len();
        let mut clipped = Self::with_capacity(n + 1);
        if n == 0 {
            return clipped;
        }

        let sides: Vec<PlaneSide> = self
            .points()
            .map(|p| clip_plane.classify(p, epsilon))
            .collect();

        for i in 0..n {
            let next = self.next(i);
            let (side, next_side) = (sides[i], sides[next]);
            let vertex = self.vertices[i];

            match side {
                PlaneSide::On => {
                    if next_side == PlaneSide::Back {
                        // The edge leaving this vertex now runs along the clip plane.
                        clipped.push(WindingVertex::new(vertex.point, Some(adjacent)));
                    } else {
                        clipped.push(vertex);
                    }
                }
                PlaneSide::Front | PlaneSide::Back => {
                    if side == PlaneSide::Front {
                        clipped.push(vertex);
                    }
                    let crosses = next_side != PlaneSide::On
                        && next_side != side
                        && !(side == PlaneSide::Front && n == 2);
                    let mid = if crosses {
                        clip_plane.intersect_segment(&vertex.point, &self.vertices[next].point)
                    } else {
                        None
                    };
                    if let Some(mid) = mid {
                        if side == PlaneSide::Front {
                            clipped.push(WindingVertex::new(mid, Some(adjacent)));
                        } else {
                            clipped.push(WindingVertex::new(mid, vertex.adjacent));
                        }
                    }
                }
            }
        }
        clipped
    }
}
