use crate::cell::{CellObject, GridCell};
use crate::point::SpatialPoint;
use slotmap::{new_key_type, SlotMap};

new_key_type! {
    /// This handle is used to retrieve the stored point or its associated object.
    /// It is returned by the _insert_ method of a GridIndex.
    pub struct PointHandle;
}

/// The actual object stored in the store
#[derive(Clone, Copy)]
struct StoreObject<P: SpatialPoint, O: Copy> {
    /// User-defined object to be associated with a point
    obj: O,
    pos: P,
}

/// Square window of grid cells, in cell coordinates. Bounds are inclusive and
/// deliberately unclamped: the ring scan clamps, the termination check needs
/// the raw values.
#[derive(Clone, Copy)]
struct Window {
    minx: i32,
    miny: i32,
    maxx: i32,
    maxy: i32,
}

impl Window {
    fn around(x: i32, y: i32) -> Self {
        Self {
            minx: x,
            miny: y,
            maxx: x,
            maxy: y,
        }
    }

    fn grown(self) -> Self {
        Self {
            minx: self.minx - 1,
            miny: self.miny - 1,
            maxx: self.maxx + 1,
            maxy: self.maxy + 1,
        }
    }
}

/// Running minimum over scanned candidates. Replaces the usual
/// nearest/distance/found out-parameter triple with one value.
struct Nearest<P> {
    best: Option<(PointHandle, P)>,
    dist: f32,
}

impl<P: SpatialPoint> Nearest<P> {
    fn new() -> Self {
        Self {
            best: None,
            dist: f32::MAX,
        }
    }

    fn found(&self) -> bool {
        self.best.is_some()
    }

    /// Strictly-smaller wins, so on ties the first candidate seen is kept.
    fn consider(&mut self, handle: PointHandle, pos: P, reference: &P) {
        let d = pos.distance(reference);
        if d < self.dist || self.best.is_none() {
            self.best = Some((handle, pos));
            self.dist = d;
        }
    }
}

/// GridIndex is a nearest-neighbor index over 2D points that uses a flat Vec of
/// cells which acts as a bounded grid instead of a tree.
///
/// ## Bucketing
/// The grid covers the coordinate universe `[0, bound]` on both axes, cut into
/// square cells of width `cell_size`. A point lands in the cell addressed by the
/// truncating division of its coordinates by `cell_size`; coordinates outside
/// the universe are clamped into the boundary cells rather than rejected, so
/// insertion always succeeds.
///
/// The index is append-only: points are never removed or relocated, which is
/// what lets cells be plain grow-only Vecs and handles stay valid forever.
///
/// ## Queries
/// In theory, GridIndex should be faster than a quadtree/r-tree because it has
/// no log costs (calculating the cells around a point is trivial). However, it
/// only works if the cell size is adapted to the density of the points, much
/// like how a tree has to be balanced to be efficient.
///
/// A nearest-neighbor query scans square rings of cells outward from the
/// query's home cell. A cell only bounds coordinate differences, not Euclidean
/// distance, so the search cannot stop at the first non-empty ring: a point in
/// ring k can be nearer than a point in ring k-1 if it sits just across a cell
/// boundary. After the first hit the search therefore scans exactly one more
/// ring before returning the minimum.
///
/// A SlotMap is used for objects managing, adding a level of indirection
/// between points and objects. Its handles have constant time access and are
/// stable, so they can be kept around to read or update the associated object.
///
/// ## Example
/// ```rust
/// use ring_grid::GridIndex;
///
/// // Universe [0, 1000] with cells of width 10, an i32 associated to each point
/// let mut g: GridIndex<[f32; 2], i32> = GridIndex::new(10, 1000);
/// let a = g.insert([5.0, 5.0], 0);
/// let b = g.insert([995.0, 995.0], 1);
///
/// assert_eq!(g.nearest_neighbor(&[0.0, 0.0]), Some((a, [5.0, 5.0])));
/// assert_eq!(g.nearest_neighbor(&[1000.0, 1000.0]), Some((b, [995.0, 995.0])));
///
/// assert_eq!(g.get(a).unwrap().1, &0);
/// *g.get_mut(b).unwrap().1 = 56;
/// assert_eq!(g.get(b).unwrap().1, &56);
/// ```
#[derive(Clone)]
pub struct GridIndex<P: SpatialPoint, O: Copy = ()> {
    cell_size: i32,
    bound: i32,
    /// Cells per axis: `bound / cell_size + 1`
    side: i32,
    cells: Vec<GridCell<P>>,
    objects: SlotMap<PointHandle, StoreObject<P, O>>,
}

impl<P: SpatialPoint, O: Copy> GridIndex<P, O> {
    /// Creates an empty index covering `[0, bound]` on both axes.
    /// The cell size should be about the same magnitude as the typical
    /// distance between a query and its nearest neighbor.
    pub fn new(cell_size: i32, bound: i32) -> Self {
        assert!(
            cell_size > 0,
            "Cell size ({}) cannot be less than or equal to zero",
            cell_size
        );
        assert!(bound >= 0, "Bound ({}) cannot be negative", bound);
        let side = bound / cell_size + 1;
        Self {
            cell_size,
            bound,
            side,
            cells: (0..side * side).map(|_| GridCell::default()).collect(),
            objects: SlotMap::with_key(),
        }
    }

    /// Maps a single coordinate to a cell coordinate by truncating division.
    /// No clamping: the result can be negative or past the last cell, callers
    /// clamp with [`Self::max_cell`].
    pub fn cell_coord(&self, coord: f32) -> i32 {
        coord as i32 / self.cell_size
    }

    /// The largest valid cell coordinate on each axis.
    pub fn max_cell(&self) -> i32 {
        self.bound / self.cell_size
    }

    /// Inserts a new point with an associated object.
    /// Returns the unique and stable handle to be used with get.
    ///
    /// Coordinates outside `[0, bound]` are clamped into the boundary cells.
    /// Duplicate points are permitted.
    ///
    /// # Example
    /// ```rust
    /// use ring_grid::GridIndex;
    /// let mut g: GridIndex<[f32; 2]> = GridIndex::new(10, 1000);
    /// let h = g.insert([5.0, 3.0], ());
    /// ```
    pub fn insert(&mut self, point: P, obj: O) -> PointHandle {
        let cell_id = self.cell_id_clamped(point);
        let handle = self.objects.insert(StoreObject { obj, pos: point });
        self.cells[cell_id].objs.push((handle, point));
        handle
    }

    /// Returns the nearest stored point to `reference` (which does not have to
    /// be stored itself), or `None` if the index is empty.
    ///
    /// Ties are broken by scan order: the first candidate encountered wins.
    ///
    /// # Example
    /// ```rust
    /// use ring_grid::GridIndex;
    /// let mut g: GridIndex<[f32; 2]> = GridIndex::new(10, 1000);
    /// assert_eq!(g.nearest_neighbor(&[3.0, 4.0]), None);
    ///
    /// let h = g.insert([5.0, 3.0], ());
    /// assert_eq!(g.nearest_neighbor(&[3.0, 4.0]), Some((h, [5.0, 3.0])));
    /// ```
    pub fn nearest_neighbor(&self, reference: &P) -> Option<(PointHandle, P)> {
        debug_assert!(reference.get(0).is_finite());
        debug_assert!(reference.get(1).is_finite());

        let x = self.cell_coord(reference.get(0));
        let y = self.cell_coord(reference.get(1));
        let m = self.max_cell();

        let mut win = Window::around(x, y);
        let mut acc = Nearest::new();

        loop {
            // The whole grid has been scanned once the window is out of range
            // on all four sides.
            if win.maxx > m && win.maxy > m && win.minx < 0 && win.miny < 0 {
                return None;
            }

            self.scan_ring(win, reference, &mut acc);
            win = win.grown();

            if acc.found() {
                // One extra ring: a point just across a cell boundary can be
                // nearer than the candidate found in the previous ring.
                self.scan_ring(win, reference, &mut acc);
                return acc.best;
            }
        }
    }

    /// Scans the perimeter cells of `win` (clamped to the grid): the top and
    /// bottom rows, and the left and right columns between them.
    ///
    /// Clamping is one-sided so a window lying entirely past a grid edge
    /// degenerates to an empty scan instead of collapsing onto the boundary
    /// row or column, which would end the search at the first boundary cell
    /// reached while nearer boundary cells are still unscanned.
    fn scan_ring(&self, win: Window, reference: &P, acc: &mut Nearest<P>) {
        let m = self.max_cell();
        let minx = win.minx.max(0);
        let miny = win.miny.max(0);
        let maxx = win.maxx.min(m);
        let maxy = win.maxy.min(m);

        if minx > maxx || miny > maxy {
            return;
        }

        for gx in minx..=maxx {
            self.scan_cell(gx, maxy, reference, acc);
            if miny != maxy {
                self.scan_cell(gx, miny, reference, acc);
            }
        }
        for gy in miny + 1..maxy {
            self.scan_cell(maxx, gy, reference, acc);
            if minx != maxx {
                self.scan_cell(minx, gy, reference, acc);
            }
        }
    }

    fn scan_cell(&self, gx: i32, gy: i32, reference: &P, acc: &mut Nearest<P>) {
        let cell = &self.cells[(gy * self.side + gx) as usize];
        for &(handle, pos) in &cell.objs {
            acc.consider(handle, pos, reference);
        }
    }

    fn cell_id_clamped(&self, pos: P) -> usize {
        debug_assert!(pos.get(0).is_finite());
        debug_assert!(pos.get(1).is_finite());

        let m = self.max_cell();
        let gx = self.cell_coord(pos.get(0)).clamp(0, m);
        let gy = self.cell_coord(pos.get(1)).clamp(0, m);
        (gy * self.side + gx) as usize
    }

    /// Allows to look directly at what's in the cell covering a specific
    /// position (with the same clamping as insertion).
    ///
    /// # Example
    /// ```rust
    /// use ring_grid::GridIndex;
    ///
    /// let mut g: GridIndex<[f32; 2]> = GridIndex::new(10, 1000);
    /// let a = g.insert([2.0, 2.0], ());
    ///
    /// let around: Vec<_> = g.get_cell([1.0, 1.0]).copied().collect();
    /// assert_eq!(around, vec![(a, [2.0, 2.0])]);
    /// ```
    pub fn get_cell(&self, pos: P) -> impl Iterator<Item = &CellObject<P>> + '_ {
        self.cells[self.cell_id_clamped(pos)].objs.iter()
    }

    /// Returns a reference to the stored point and its associated object,
    /// using the handle.
    pub fn get(&self, id: PointHandle) -> Option<(P, &O)> {
        self.objects.get(id).map(|x| (x.pos, &x.obj))
    }

    /// Returns a mutable reference to the associated object and the stored
    /// point, using the handle.
    pub fn get_mut(&mut self, id: PointHandle) -> Option<(P, &mut O)> {
        self.objects.get_mut(id).map(|x| (x.pos, &mut x.obj))
    }

    /// Iterate over all handles
    pub fn handles(&self) -> impl Iterator<Item = PointHandle> + '_ {
        self.objects.keys()
    }

    /// Iterate over all associated objects
    pub fn objects(&self) -> impl Iterator<Item = &O> + '_ {
        self.objects.values().map(|x| &x.obj)
    }

    /// Read access to the cells
    pub fn cells(&self) -> &Vec<GridCell<P>> {
        &self.cells
    }

    /// The cell width this index was built with
    pub fn cell_size(&self) -> i32 {
        self.cell_size
    }

    /// The inclusive upper bound of the coordinate universe
    pub fn bound(&self) -> i32 {
        self.bound
    }

    /// Returns the number of points stored
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Checks if the index contains points or not
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}
