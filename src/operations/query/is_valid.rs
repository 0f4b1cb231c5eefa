use crate::brush::Brush;

/// Checks that a brush encloses a volume and its connectivity graph is
/// consistent.
pub struct IsValid<'a> {
    brush: &'a Brush,
}

impl<'a> IsValid<'a> {
    /// Creates a new `IsValid` query.
    #[must_use]
    pub fn new(brush: &'a Brush) -> Self {
        Self { brush }
    }

    /// Executes the validation, returning `true` if the brush is valid.
    #[must_use]
    pub fn execute(&self) -> bool {
        let brep = self.brush.brep();
        !brep.is_degenerate() && brep.topology.is_consistent() && brep.euler_characteristic() == 2
    }
}
