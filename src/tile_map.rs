// Original under MIT license from: https://github.com/einargs/rust-screeps-code/blob/main/src/rooms/tile_slice.rs

use std::ops::{Index, IndexMut};

use crate::position::GridPos;

/// Dense row-major storage of one value per tile of a `width` x `height` grid.
#[derive(Debug, Clone, PartialEq)]
pub struct TileMap<T> {
    width: u32,
    height: u32,
    values: Vec<T>,
}

impl<T> TileMap<T> where T: Clone {
    #[inline]
    pub fn new(width: u32, height: u32, default: T) -> TileMap<T> {
        TileMap {
            width,
            height,
            values: vec![default; width as usize * height as usize],
        }
    }
}

impl<T> TileMap<T> {
    /// Build from values already laid out in row-major order.
    ///
    /// Panics when `values.len() != width * height`.
    pub fn from_vec(width: u32, height: u32, values: Vec<T>) -> TileMap<T> {
        assert_eq!(
            values.len(),
            width as usize * height as usize,
            "tile map of {width}x{height} needs exactly {} values",
            width as usize * height as usize,
        );
        TileMap { width, height, values }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[inline]
    pub fn in_bounds(&self, xy: GridPos) -> bool {
        xy.x < self.width && xy.y < self.height
    }

    #[inline]
    fn xy_to_linear_index(&self, xy: GridPos) -> usize {
        xy.y as usize * self.width as usize + xy.x as usize
    }

    #[inline]
    pub fn get(&self, xy: GridPos) -> Option<&T> {
        if self.in_bounds(xy) {
            Some(&self.values[self.xy_to_linear_index(xy)])
        } else {
            None
        }
    }

    /// Every position of the grid in scan (row-major) order.
    pub fn positions(&self) -> impl Iterator<Item = GridPos> {
        let width = self.width;
        (0..self.height).flat_map(move |y| (0..width).map(move |x| GridPos::new(x, y)))
    }

    /// Positions and values in scan order.
    pub fn iter(&self) -> impl Iterator<Item = (GridPos, &T)> + '_ {
        self.positions().zip(self.values.iter())
    }
}

impl<T> Index<GridPos> for TileMap<T> {
    type Output = T;
    fn index(&self, index: GridPos) -> &T {
        debug_assert!(self.in_bounds(index), "{index} outside {}x{} tile map", self.width, self.height);
        &self.values[self.xy_to_linear_index(index)]
    }
}

impl<T> IndexMut<GridPos> for TileMap<T> {
    fn index_mut(&mut self, index: GridPos) -> &mut T {
        debug_assert!(self.in_bounds(index), "{index} outside {}x{} tile map", self.width, self.height);
        let idx = self.xy_to_linear_index(index);
        &mut self.values[idx]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positions_follow_storage_order() {
        let map = TileMap::from_vec(4, 3, (0..12u8).collect());
        let positions: Vec<_> = map.positions().collect();
        assert_eq!(positions.len(), 12);
        for (idx, xy) in positions.into_iter().enumerate() {
            assert_eq!(map.xy_to_linear_index(xy), idx);
            assert_eq!(map[xy], idx as u8);
        }
        assert_eq!(map.iter().nth(5), Some((GridPos::new(1, 1), &5)));
    }

    #[test]
    fn get_is_bounds_checked() {
        let mut map = TileMap::new(2, 2, 0u8);
        map[GridPos::new(1, 1)] = 7;
        assert_eq!(map.get(GridPos::new(1, 1)), Some(&7));
        assert_eq!(map.get(GridPos::new(2, 0)), None);
        assert_eq!(map.iter().last(), Some((GridPos::new(1, 1), &7)));
    }
}
