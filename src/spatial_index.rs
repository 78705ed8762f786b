use crate::position::GridPos;

const DEFAULT_BUCKET_SIZE: u32 = 8;

/// A bucketed point index over a bounded grid supporting nearest-neighbour
/// queries.
///
/// Points are stored in square buckets of `bucket_size` tiles. A query scans
/// rings of buckets outward from the query position and stops once no
/// unvisited bucket can hold anything closer than the best hit so far.
/// Ties between equally distant points resolve to the lowest `(y, x)` position.
#[derive(Debug, Clone)]
pub struct SpatialIndex<T> {
    bucket_size: u32,
    cols: u32,
    rows: u32,
    buckets: Vec<Vec<(GridPos, T)>>,
    len: usize,
}

impl<T> SpatialIndex<T> {
    pub fn new(width: u32, height: u32) -> Self {
        Self::with_bucket_size(width, height, DEFAULT_BUCKET_SIZE)
    }

    pub fn with_bucket_size(width: u32, height: u32, bucket_size: u32) -> Self {
        let bucket_size = bucket_size.max(1);
        let cols = width.div_ceil(bucket_size).max(1);
        let rows = height.div_ceil(bucket_size).max(1);
        let mut buckets = Vec::with_capacity((cols * rows) as usize);
        buckets.resize_with((cols * rows) as usize, Vec::new);
        Self { bucket_size, cols, rows, buckets, len: 0 }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Insert a point. `pos` must lie inside the indexed area.
    pub fn insert(&mut self, pos: GridPos, value: T) {
        debug_assert!(
            pos.x / self.bucket_size < self.cols && pos.y / self.bucket_size < self.rows,
            "{pos} is outside the spatial index"
        );
        let (col, row) = self.bucket_of(pos);
        let idx = self.bucket_index(col, row);
        self.buckets[idx].push((pos, value));
        self.len += 1;
    }

    /// The nearest stored point to `pos` with its Euclidean distance.
    pub fn nearest(&self, pos: GridPos) -> Option<(GridPos, &T, f32)> {
        if self.is_empty() {
            return None;
        }

        let (col, row) = self.bucket_of(pos);
        let max_ring = col.max(self.cols - 1 - col).max(row).max(self.rows - 1 - row);
        let mut best: Option<(u64, GridPos, &T)> = None;

        for ring in 0..=max_ring {
            for (c, r) in ring_buckets(col, row, ring, self.cols, self.rows) {
                for (candidate, value) in &self.buckets[self.bucket_index(c, r)] {
                    let dist_sq = pos.distance_squared(*candidate);
                    let closer = match best {
                        None => true,
                        Some((best_sq, best_pos, _)) => {
                            dist_sq < best_sq
                                || (dist_sq == best_sq && (candidate.y, candidate.x) < (best_pos.y, best_pos.x))
                        }
                    };
                    if closer {
                        best = Some((dist_sq, *candidate, value));
                    }
                }
            }

            if let Some((best_sq, _, _)) = best {
                match self.unvisited_lower_bound(pos, col, row, ring) {
                    Some(bound) if bound * bound <= best_sq => continue,
                    _ => break,
                }
            }
        }

        best.map(|(dist_sq, found, value)| (found, value, (dist_sq as f32).sqrt()))
    }

    /// Smallest possible distance from `pos` to any point outside the square of
    /// buckets visited after `ring`, or `None` when that square covers
    /// everything.
    fn unvisited_lower_bound(&self, pos: GridPos, col: u32, row: u32, ring: u32) -> Option<u64> {
        let size = self.bucket_size as u64;
        let mut bound: Option<u64> = None;
        let mut consider = |gap: u64| {
            bound = Some(bound.map_or(gap, |b| b.min(gap)));
        };

        if col >= ring + 1 {
            // first tile column left of the visited square
            let edge = (col - ring) as u64 * size - 1;
            consider((pos.x as u64).saturating_sub(edge));
        }
        if col + ring + 1 < self.cols {
            let edge = (col + ring + 1) as u64 * size;
            consider(edge.saturating_sub(pos.x as u64));
        }
        if row >= ring + 1 {
            let edge = (row - ring) as u64 * size - 1;
            consider((pos.y as u64).saturating_sub(edge));
        }
        if row + ring + 1 < self.rows {
            let edge = (row + ring + 1) as u64 * size;
            consider(edge.saturating_sub(pos.y as u64));
        }

        bound
    }

    #[inline]
    fn bucket_of(&self, pos: GridPos) -> (u32, u32) {
        (
            (pos.x / self.bucket_size).min(self.cols - 1),
            (pos.y / self.bucket_size).min(self.rows - 1),
        )
    }

    #[inline]
    fn bucket_index(&self, col: u32, row: u32) -> usize {
        (row * self.cols + col) as usize
    }
}

/// Buckets at Chebyshev distance exactly `ring` from `(col, row)`, clipped to
/// the bucket grid.
fn ring_buckets(col: u32, row: u32, ring: u32, cols: u32, rows: u32) -> impl Iterator<Item = (u32, u32)> {
    let min_c = col.saturating_sub(ring);
    let max_c = (col + ring).min(cols - 1);
    let min_r = row.saturating_sub(ring);
    let max_r = (row + ring).min(rows - 1);

    (min_r..=max_r).flat_map(move |r| {
        (min_c..=max_c).filter(move |&c| c.abs_diff(col).max(r.abs_diff(row)) == ring).map(move |c| (c, r))
    })
}
