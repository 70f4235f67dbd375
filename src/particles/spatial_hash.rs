use crate::math::Vec2;

const EMPTY: i32 = -1;

/// A uniform grid of linked lists over particle indices.
///
/// `heads[cell]` is the last particle inserted into a cell and `next[i]`
/// links to the particle inserted before `i`. With a cell size of at least
/// the interaction radius, every neighbor of a particle is in the 3x3 block
/// of cells around it.
#[derive(Debug, Default)]
pub(super) struct SpatialHash {
    cell_size: f32,
    columns: usize,
    rows: usize,
    heads: Vec<i32>,
    next: Vec<i32>,
}

impl SpatialHash {
    /// Rebuild the grid over `positions` for a world of size `world`.
    pub fn rebuild(&mut self, positions: &[Vec2], world: Vec2, cell_size: f32) {
        debug_assert!(cell_size > 0.0, "cell size must be positive");

        self.cell_size = cell_size;
        self.columns = ((world.x / cell_size).ceil() as usize).max(1);
        self.rows = ((world.y / cell_size).ceil() as usize).max(1);

        self.heads.clear();
        self.heads.resize(self.columns * self.rows, EMPTY);
        self.next.clear();
        self.next.resize(positions.len(), EMPTY);

        for (i, position) in positions.iter().enumerate() {
            let (cx, cy) = self.cell_of(position);
            let cell = cy * self.columns + cx;
            self.next[i] = self.heads[cell];
            self.heads[cell] = i as i32;
        }
    }

    /// Call `f` with the index of every particle in the 3x3 block of cells
    /// around `position`, including the particle at `position` itself.
    pub fn for_each_candidate<F>(&self, position: &Vec2, mut f: F)
    where
        F: FnMut(usize),
    {
        if self.heads.is_empty() {
            return;
        }
        let (cx, cy) = self.cell_of(position);
        let x_range = cx.saturating_sub(1)..=(cx + 1).min(self.columns - 1);
        for y in cy.saturating_sub(1)..=(cy + 1).min(self.rows - 1) {
            for x in x_range.clone() {
                let mut j = self.heads[y * self.columns + x];
                while j != EMPTY {
                    f(j as usize);
                    j = self.next[j as usize];
                }
            }
        }
    }

    fn cell_of(&self, position: &Vec2) -> (usize, usize) {
        // float to int casts saturate, so NaN and negatives land in cell 0
        let cx = ((position.x / self.cell_size) as usize).min(self.columns - 1);
        let cy = ((position.y / self.cell_size) as usize).min(self.rows - 1);
        (cx, cy)
    }
}
