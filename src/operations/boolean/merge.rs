use tracing::debug;

use crate::brush::Brush;
use crate::config::KernelConfig;
use crate::error::{CsgError, Result};
use crate::math::polygon_3d::vertex_average;
use crate::math::Point3;
use crate::topology::BRep;

/// Joins brushes that together form a convex solid into one brush.
///
/// The result is built from the outward faces of the inputs: faces pressed
/// against another input are internal and dropped, and coincident faces are
/// kept once, from the first input that has them.
pub struct Merge<'a> {
    brushes: Vec<&'a Brush>,
    strict_shaders: bool,
}

impl<'a> Merge<'a> {
    /// Creates a new `Merge` operation.
    #[must_use]
    pub fn new(brushes: impl IntoIterator<Item = &'a Brush>) -> Self {
        Self {
            brushes: brushes.into_iter().collect(),
            strict_shaders: false,
        }
    }

    /// Refuses to merge coincident faces whose shaders differ.
    #[must_use]
    pub fn with_strict_shaders(mut self, strict: bool) -> Self {
        self.strict_shaders = strict;
        self
    }

    /// Executes the merge.
    ///
    /// # Errors
    ///
    /// - [`CsgError::TooFewBrushes`] for fewer than two inputs.
    /// - [`CsgError::DegenerateInput`] if an input encloses no volume.
    /// - [`CsgError::ShaderMismatch`] if strict shaders are on and two
    ///   coincident faces disagree.
    /// - [`CsgError::NotConvex`] if the inputs do not form a convex solid.
    /// - [`CsgError::NoContributingFaces`] if the merged brush is empty.
    /// - A capacity error if the merged brush needs too many faces.
    pub fn execute(&self, config: &KernelConfig) -> Result<Brush> {
        if self.brushes.len() < 2 {
            return Err(CsgError::TooFewBrushes {
                needed: 2,
                got: self.brushes.len(),
            }
            .into());
        }
        let inputs: Vec<Brush> = self.brushes.iter().map(|b| b.share_faces(config)).collect();
        if inputs.iter().any(Brush::is_degenerate) {
            return Err(CsgError::DegenerateInput.into());
        }
        let breps: Vec<_> = inputs.iter().map(Brush::brep).collect();

        // (brush, face) pairs that make up the outside.
        let mut candidates: Vec<(usize, usize)> = Vec::new();
        for (b, brush) in inputs.iter().enumerate() {
            for i in breps[b].contributing_face_indices() {
                let face = &brush.faces()[i];
                let plane = face.plane();
                let internal = inputs
                    .iter()
                    .enumerate()
                    .filter(|&(other, _)| other != b)
                    .any(|(_, other)| {
                        other
                            .faces()
                            .iter()
                            .any(|g| config.planes_opposing(&plane, &g.plane()))
                    });
                if internal {
                    continue;
                }

                let mut duplicate = false;
                for &(kb, ki) in &candidates {
                    let kept = &inputs[kb].faces()[ki];
                    if config.planes_equal(&kept.plane(), &plane) {
                        if self.strict_shaders && kept.payload().shader != face.payload().shader {
                            return Err(CsgError::ShaderMismatch.into());
                        }
                        duplicate = true;
                        break;
                    }
                }
                if !duplicate {
                    candidates.push((b, i));
                }
            }
        }

        for &(ab, ai) in &candidates {
            let plane = inputs[ab].faces()[ai].plane();
            for &(bb, bi) in &candidates {
                if (ab, ai) == (bb, bi) {
                    continue;
                }
                if !breps[bb].windings[bi].test_plane(&plane, false, config.clip_epsilon) {
                    debug!(face = ai, brush = ab, "merge candidate cuts another face");
                    return Err(CsgError::NotConvex.into());
                }
            }
        }

        let mut merged = Brush::from_faces(
            candidates
                .iter()
                .map(|&(b, i)| (*inputs[b].faces()[i]).clone()),
            config,
        )?;
        merged.remove_empty_faces();
        if !merged.has_contributing_faces() {
            return Err(CsgError::NoContributingFaces.into());
        }

        // Coplanar candidates alone cannot tell an L-shape from its convex
        // hull; the merged brush must not cover space outside the inputs.
        let brep = merged.brep();
        let probes = brep
            .vertices
            .iter()
            .copied()
            .chain(vertex_average(&brep.vertices));
        for probe in probes {
            let covered = inputs
                .iter()
                .zip(&breps)
                .any(|(input, input_brep)| encloses(input, input_brep, &probe, config.clip_epsilon));
            if !covered {
                debug!(?probe, "merged brush reaches outside its inputs");
                return Err(CsgError::NotConvex.into());
            }
        }

        debug!(
            inputs = inputs.len(),
            faces = merged.face_count(),
            "merged brushes"
        );
        Ok(merged)
    }
}

fn encloses(brush: &Brush, brep: &BRep, point: &Point3, epsilon: f64) -> bool {
    brep.contributing_face_indices()
        .all(|i| brush.faces()[i].plane().distance_to(point) <= epsilon)
}
