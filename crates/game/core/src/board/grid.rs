use std::collections::BTreeSet;

use super::Tile;

/// Minimum run length that counts as a match.
const MATCH_LEN: usize = 3;

/// Board cell coordinate; `y = 0` is the top row.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Coord {
    pub x: usize,
    pub y: usize,
}

impl Coord {
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    pub fn manhattan(self, other: Coord) -> usize {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }
}

/// Dense row-major cell storage.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<Option<Tile>>,
}

impl Grid {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![None; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn contains(&self, coord: Coord) -> bool {
        coord.x < self.width && coord.y < self.height
    }

    fn index(&self, coord: Coord) -> Option<usize> {
        self.contains(coord)
            .then_some(coord.y * self.width + coord.x)
    }

    pub fn get(&self, coord: Coord) -> Option<&Tile> {
        self.index(coord).and_then(|i| self.cells[i].as_ref())
    }

    pub fn set(&mut self, coord: Coord, tile: Option<Tile>) {
        if let Some(i) = self.index(coord) {
            self.cells[i] = tile;
        }
    }

    pub fn take(&mut self, coord: Coord) -> Option<Tile> {
        self.index(coord).and_then(|i| self.cells[i].take())
    }

    pub fn swap(&mut self, a: Coord, b: Coord) {
        if let (Some(i), Some(j)) = (self.index(a), self.index(b)) {
            self.cells.swap(i, j);
        }
    }

    pub fn coords(&self) -> impl Iterator<Item = Coord> + use<> {
        let (width, height) = (self.width, self.height);
        (0..height).flat_map(move |y| (0..width).map(move |x| Coord::new(x, y)))
    }

    pub fn tiles(&self) -> impl Iterator<Item = (Coord, &Tile)> {
        self.coords()
            .filter_map(|coord| self.get(coord).map(|tile| (coord, tile)))
    }

    pub fn is_full(&self) -> bool {
        self.cells.iter().all(Option::is_some)
    }

    /// Coordinates of every run of three or more same-owner, same-action
    /// tiles along a row or column. Overlapping runs merge.
    pub fn find_matches(&self) -> BTreeSet<Coord> {
        let mut found = BTreeSet::new();

        for y in 0..self.height {
            let line: Vec<_> = (0..self.width).map(|x| Coord::new(x, y)).collect();
            self.collect_runs(&line, &mut found);
        }
        for x in 0..self.width {
            let line: Vec<_> = (0..self.height).map(|y| Coord::new(x, y)).collect();
            self.collect_runs(&line, &mut found);
        }

        found
    }

    fn collect_runs(&self, line: &[Coord], found: &mut BTreeSet<Coord>) {
        for window in line.windows(MATCH_LEN) {
            let Some(first) = self.get(window[0]) else {
                continue;
            };
            let all_match = window[1..]
                .iter()
                .all(|&c| self.get(c).is_some_and(|t| t.matches(first)));
            if all_match {
                found.extend(window.iter().copied());
            }
        }
    }

    /// Drops tiles to the bottom of each column, preserving order.
    ///
    /// Moved tiles record how far they fell. Returns the number of empty cells
    /// left at the top of each column.
    pub fn collapse(&mut self) -> Vec<usize> {
        let mut empties = Vec::with_capacity(self.width);

        for x in 0..self.width {
            let mut gap = 0usize;
            for y in (0..self.height).rev() {
                let coord = Coord::new(x, y);
                match self.take(coord) {
                    None => gap += 1,
                    Some(mut tile) => {
                        tile.drop_distance = gap.min(u8::MAX as usize) as u8;
                        self.set(Coord::new(x, y + gap), Some(tile));
                    }
                }
            }
            empties.push(gap);
        }

        empties
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::TileId;
    use crate::state::Element;
    use crate::template::ActionId;

    fn tile(id: u64, owner: u8, action: u8) -> Tile {
        Tile {
            id: TileId(id),
            action: ActionId(action),
            owner,
            element: Element::Fire,
            drop_distance: 0,
        }
    }

    /// Fills a 5x5 grid with a checkerboard that contains no matches.
    fn quiet_grid() -> Grid {
        let mut grid = Grid::new(5, 5);
        let mut id = 0;
        for coord in grid.coords().collect::<Vec<_>>() {
            id += 1;
            let action = if (coord.x + coord.y) % 2 == 0 { 1 } else { 2 };
            grid.set(coord, Some(tile(id, 0, action)));
        }
        grid
    }

    #[test]
    fn horizontal_run_is_matched() {
        let mut grid = quiet_grid();
        assert!(grid.find_matches().is_empty());

        for x in 0..3 {
            grid.set(Coord::new(x, 2), Some(tile(100 + x as u64, 1, 3)));
        }
        let matches = grid.find_matches();
        assert_eq!(matches.len(), 3);
        assert!(matches.contains(&Coord::new(0, 2)));
        assert!(matches.contains(&Coord::new(2, 2)));
    }

    #[test]
    fn different_owners_never_match() {
        let mut grid = quiet_grid();
        grid.set(Coord::new(0, 0), Some(tile(100, 0, 3)));
        grid.set(Coord::new(1, 0), Some(tile(101, 1, 3)));
        grid.set(Coord::new(2, 0), Some(tile(102, 0, 3)));
        assert!(grid.find_matches().is_empty());
    }

    #[test]
    fn overlapping_runs_merge() {
        let mut grid = quiet_grid();
        for x in 0..4 {
            grid.set(Coord::new(x, 4), Some(tile(100 + x as u64, 0, 3)));
        }
        for y in 2..4 {
            grid.set(Coord::new(0, y), Some(tile(200 + y as u64, 0, 3)));
        }
        let matches = grid.find_matches();
        assert_eq!(matches.len(), 6);
    }

    #[test]
    fn collapse_drops_tiles_and_reports_gaps() {
        let mut grid = quiet_grid();
        let above = *grid.get(Coord::new(1, 1)).unwrap();
        grid.take(Coord::new(1, 2));
        grid.take(Coord::new(1, 3));

        let empties = grid.collapse();
        assert_eq!(empties, vec![0, 2, 0, 0, 0]);
        assert!(grid.get(Coord::new(1, 0)).is_none());
        assert!(grid.get(Coord::new(1, 1)).is_none());

        let landed = grid.get(Coord::new(1, 3)).unwrap();
        assert_eq!(landed.id, above.id);
        assert_eq!(landed.drop_distance, 2);
    }

    #[test]
    fn coords_outside_are_rejected() {
        let grid = Grid::new(10, 10);
        assert!(grid.contains(Coord::new(9, 9)));
        assert!(!grid.contains(Coord::new(10, 0)));
        assert!(grid.get(Coord::new(0, 12)).is_none());
    }
}
