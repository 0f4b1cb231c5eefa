use tracing::{debug, trace};

use crate::brush::{Brush, Face};
use crate::config::KernelConfig;
use crate::error::{CsgError, GeometryError, Result};
use crate::math::{Axis, Plane, Point3};
use crate::topology::BRep;

/// Which way the walls grow from the original faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HollowDirection {
    /// Walls occupy the inside of the brush; the outer surface is kept.
    #[default]
    Inward,
    /// Walls are built around the brush; the brush becomes the cavity.
    Outward,
}

/// How each face's wall is closed off against its neighbours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HollowStrategy {
    /// Every wall is bounded by the outer neighbouring planes. Walls
    /// overlap along edges and corners.
    #[default]
    Pull,
    /// Walls take the outer plane of later faces and the inner plane of
    /// earlier ones, so they tile the shell without overlap.
    Wrap,
    /// Each wall is the face's own winding extruded through the thickness.
    Extrude,
    /// Walls are mitred along every edge, from the original winding to the
    /// matching edge of the offset brush.
    Diagonal,
}

/// Faces that get no wall and keep their plane in the offset brush.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FaceExclusion {
    #[default]
    None,
    /// Face indices picked by the caller.
    Faces(Vec<usize>),
    /// Faces lying flat on the minimum (or, with `positive`, maximum)
    /// bound along `axis`.
    AxisExtremity { axis: Axis, positive: bool },
}

/// Turns a brush into a set of wall brushes of a fixed thickness.
///
/// Every contributing face that is not excluded yields one wall between
/// the face plane and the same plane moved by `thickness`. Excluded faces
/// leave an opening.
pub struct Hollow<'a> {
    brush: &'a Brush,
    thickness: f64,
    direction: HollowDirection,
    strategy: HollowStrategy,
    exclusion: FaceExclusion,
}

impl<'a> Hollow<'a> {
    /// Creates a new `Hollow` operation with inward pulled walls.
    #[must_use]
    pub fn new(brush: &'a Brush, thickness: f64) -> Self {
        Self {
            brush,
            thickness,
            direction: HollowDirection::default(),
            strategy: HollowStrategy::default(),
            exclusion: FaceExclusion::default(),
        }
    }

    #[must_use]
    pub fn with_direction(mut self, direction: HollowDirection) -> Self {
        self.direction = direction;
        self
    }

    #[must_use]
    pub fn with_strategy(mut self, strategy: HollowStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    #[must_use]
    pub fn with_exclusion(mut self, exclusion: FaceExclusion) -> Self {
        self.exclusion = exclusion;
        self
    }

    /// Executes the operation, returning one brush per wall.
    ///
    /// Walls that end up without volume are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::InvalidInput`] for a thickness that is not
    /// positive, [`CsgError::DegenerateInput`] if the brush encloses no
    /// volume, [`CsgError::NoContributingFaces`] if no wall survives, or a
    /// capacity error if a wall would need too many faces.
    pub fn execute(&self, config: &KernelConfig) -> Result<Vec<Brush>> {
        if !(self.thickness.is_finite() && self.thickness > 0.0) {
            return Err(GeometryError::InvalidInput(format!(
                "hollow thickness must be positive, got {}",
                self.thickness
            ))
            .into());
        }
        let brush = self.brush.share_faces(config);
        if brush.is_degenerate() {
            return Err(CsgError::DegenerateInput.into());
        }
        let brep = brush.brep();
        let excluded = self.excluded_faces(&brush, &brep, config);
        let shift = match self.direction {
            HollowDirection::Inward => -self.thickness,
            HollowDirection::Outward => self.thickness,
        };

        let faces = brush.faces();
        let twin_faces: Vec<Face> = faces
            .iter()
            .zip(&excluded)
            .map(|(face, &skip)| {
                if skip {
                    (**face).clone()
                } else {
                    face.offset_by(shift)
                }
            })
            .collect();
        let (outer_side, inner_side): (Vec<Face>, Vec<Face>) = if shift > 0.0 {
            (twin_faces.clone(), faces.iter().map(|f| (**f).clone()).collect())
        } else {
            (faces.iter().map(|f| (**f).clone()).collect(), twin_faces.clone())
        };
        let twin_brep = match self.strategy {
            HollowStrategy::Diagonal => Brush::from_faces(twin_faces, config)?.brep(),
            _ => Default::default(),
        };

        let mut walls = Vec::new();
        for i in brep.contributing_face_indices() {
            if excluded[i] {
                continue;
            }
            let slab = [outer_side[i].clone(), inner_side[i].flipped()];
            let wall_faces: Vec<Face> = match self.strategy {
                HollowStrategy::Pull => lateral_faces(i, &outer_side, &outer_side)
                    .into_iter()
                    .chain(slab)
                    .collect(),
                HollowStrategy::Wrap => lateral_faces(i, &inner_side, &outer_side)
                    .into_iter()
                    .chain(slab)
                    .collect(),
                HollowStrategy::Extrude => {
                    let sides = extrude_planes(&brep, i, &faces[i].plane(), shift);
                    slab.into_iter()
                        .chain(side_faces(&faces[i], sides, config))
                        .collect()
                }
                HollowStrategy::Diagonal => {
                    let sides = mitre_planes(&brep, &twin_brep, i);
                    slab.into_iter()
                        .chain(side_faces(&faces[i], sides, config))
                        .collect()
                }
            };

            let mut wall = Brush::from_faces(wall_faces, config)?;
            wall.remove_empty_faces();
            if wall.is_degenerate() {
                trace!(face = i, "dropped empty wall");
                continue;
            }
            walls.push(wall);
        }

        if walls.is_empty() {
            return Err(CsgError::NoContributingFaces.into());
        }
        debug!(
            walls = walls.len(),
            strategy = ?self.strategy,
            direction = ?self.direction,
            "hollowed brush"
        );
        Ok(walls)
    }

    /// One flag per face, `true` if the face gets no wall.
    fn excluded_faces(&self, brush: &Brush, brep: &BRep, config: &KernelConfig) -> Vec<bool> {
        let count = brush.face_count();
        match &self.exclusion {
            FaceExclusion::None => vec![false; count],
            FaceExclusion::Faces(indices) => (0..count).map(|i| indices.contains(&i)).collect(),
            FaceExclusion::AxisExtremity { axis, positive } => {
                let Some(bounds) = brep.bounds else {
                    return vec![false; count];
                };
                let k = axis.index();
                let extreme = if *positive {
                    bounds.max[k]
                } else {
                    bounds.min[k]
                };
                brep.windings
                    .iter()
                    .map(|winding| {
                        winding.contributes()
                            && winding
                                .points()
                                .all(|p| (p[k] - extreme).abs() <= config.clip_epsilon)
                    })
                    .collect()
            }
        }
    }
}

/// Every face but `skip`: earlier faces from `before`, later ones from
/// `after`.
fn lateral_faces(skip: usize, before: &[Face], after: &[Face]) -> Vec<Face> {
    (0..after.len())
        .filter(|&j| j != skip)
        .map(|j| {
            if j < skip {
                before[j].clone()
            } else {
                after[j].clone()
            }
        })
        .collect()
}

/// Faces for `planes`, carrying the payload of `origin`.
fn side_faces<'f>(
    origin: &'f Face,
    planes: Vec<Plane>,
    config: &'f KernelConfig,
) -> impl Iterator<Item = Face> + 'f {
    planes
        .into_iter()
        .map(move |plane| Face::from_plane(plane, origin.payload().clone(), config.format))
}

/// Side planes perpendicular to face `i`, one through each winding edge.
fn extrude_planes(brep: &BRep, i: usize, plane: &Plane, shift: f64) -> Vec<Plane> {
    let winding = &brep.windings[i];
    let lift = plane.normal * shift;
    (0..winding.len())
        .filter_map(|k| {
            let a = winding[k].point;
            let b = winding[winding.next(k)].point;
            facing_away(Plane::for_points(&a, &b, &(a + lift)), brep, i)
        })
        .collect()
}

/// Mitre planes joining each winding edge of face `i` to the matching edge
/// in the offset brush.
///
/// Edges are matched by the face on their other side. When the offset
/// winding has lost that edge, the offset vertex closest to the edge start
/// is used instead.
fn mitre_planes(brep: &BRep, twin: &BRep, i: usize) -> Vec<Plane> {
    let winding = &brep.windings[i];
    let twin_winding = twin.windings.get(i);
    (0..winding.len())
        .filter_map(|k| {
            let a = winding[k].point;
            let b = winding[winding.next(k)].point;
            let matched = winding[k].adjacent.and_then(|adjacent| {
                let twin_winding = twin_winding?;
                let at = twin_winding.find_adjacent(adjacent)?;
                Some(twin_winding[at].point)
            });
            let q = matched.or_else(|| nearest(&twin.vertices, &a))?;
            facing_away(Plane::for_points(&a, &b, &q), brep, i)
        })
        .collect()
}

fn nearest(points: &[Point3], target: &Point3) -> Option<Point3> {
    points
        .iter()
        .min_by(|p, q| (*p - target).norm().total_cmp(&(*q - target).norm()))
        .copied()
}

/// `plane` oriented so face `i`'s centroid lies behind it; `None` if the
/// plane is invalid.
fn facing_away(plane: Plane, brep: &BRep, i: usize) -> Option<Plane> {
    if !plane.is_valid() {
        return None;
    }
    let centroid = brep.centroids.get(i).copied().flatten()?;
    if plane.distance_to(&centroid) > 0.0 {
        Some(plane.flipped())
    } else {
        Some(plane)
    }
}
