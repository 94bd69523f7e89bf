use crate::grid::PointHandle;

/// A stored point as seen from a cell: its handle and its position.
pub type CellObject<P> = (PointHandle, P);

/// A single cell of the grid, can be empty.
#[derive(Clone)]
pub struct GridCell<P> {
    pub objs: Vec<CellObject<P>>,
}

// Manual impl to avoid a `P: Default` bound.
impl<P> Default for GridCell<P> {
    fn default() -> Self {
        Self { objs: Vec::new() }
    }
}
