//! Match-3 board engine.
//!
//! The board owns the grid, draws tiles from the deck pool, and turns tap
//! gestures into [`Elimination`]s. It knows nothing about entities beyond the
//! player slot that currently owns the turn; callers pass that in.
mod grid;
mod tile;

pub use grid::{Coord, Grid};
pub use tile::{DeckEntry, DeckPool, Tile, TileId};

use crate::config::BattleConfig;
use crate::rng::{PcgRng, RngOracle, compute_seed};
use crate::template::ActionId;

/// Full refills attempted before giving up on handing the actor a tile.
const MAX_REFILL_ATTEMPTS: usize = 16;

/// Tiles removed in one elimination and the action they trigger.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Elimination {
    pub coords: Vec<Coord>,
    pub owner: u8,
    pub action: ActionId,
    pub via_swap: bool,
    pub multiplier: f64,
}

impl Elimination {
    /// Base 1, doubled for a swap match, plus 0.5 per tile beyond three.
    pub fn multiplier_for(count: usize, via_swap: bool) -> f64 {
        let base = if via_swap { 2.0 } else { 1.0 };
        let extra = count.saturating_sub(3) as f64 * 0.5;
        base + extra
    }
}

/// Why a tap changed nothing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum IgnoreReason {
    Locked,
    NotPlayerTurn,
    Paused,
    OutOfBounds,
    EmptyCell,
    NotOwned,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TapOutcome {
    Ignored(IgnoreReason),
    Selected(Coord),
    SelectionCleared,
    /// The swap produced no match for the acting slot and was undone.
    SwapReverted { from: Coord, to: Coord },
    Eliminated(Elimination),
}

/// Render projection of one occupied cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TileView {
    pub coord: Coord,
    pub tile: Tile,
    /// Not selectable by the acting entity this turn.
    pub dimmed: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
struct GestureState {
    selected: Option<Coord>,
    last_tap: Option<(TileId, u64)>,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Board {
    grid: Grid,
    pool: DeckPool,
    seed: u64,
    draws: u64,
    next_tile: u64,
    locked: bool,
    gesture: GestureState,
    double_tap_window_ms: u64,
}

impl Board {
    /// Creates a board and performs the initial full fill.
    pub fn new(pool: DeckPool, seed: u64, config: &BattleConfig) -> Self {
        let mut board = Self {
            grid: Grid::new(BattleConfig::GRID_WIDTH, BattleConfig::GRID_HEIGHT),
            pool,
            seed,
            draws: 0,
            next_tile: 0,
            locked: false,
            gesture: GestureState::default(),
            double_tap_window_ms: config.double_tap_window_ms,
        };
        board.fill(true);
        board
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn pool(&self) -> &DeckPool {
        &self.pool
    }

    pub fn selected(&self) -> Option<Coord> {
        self.gesture.selected
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn lock(&mut self) {
        self.locked = true;
        self.gesture = GestureState::default();
    }

    pub fn unlock(&mut self) {
        self.locked = false;
    }

    /// Draws one tile uniformly from the pool, or `None` when it is empty.
    pub fn random_tile(&mut self) -> Option<Tile> {
        if self.pool.is_empty() {
            return None;
        }

        let seed = compute_seed(self.seed, self.draws, 0, 0);
        self.draws += 1;
        let entry = *self.pool.get(PcgRng.pick(seed, self.pool.len()))?;

        self.next_tile += 1;
        Some(Tile {
            id: TileId(self.next_tile),
            action: entry.action,
            owner: entry.owner,
            element: entry.element,
            drop_distance: 0,
        })
    }

    /// Refills the grid. Returns whether every cell is occupied afterwards.
    ///
    /// `full` regenerates every cell; otherwise tiles fall to close gaps and
    /// new tiles are drawn into the cells left open at the top.
    pub fn fill(&mut self, full: bool) -> bool {
        if full {
            for coord in self.grid.coords() {
                let tile = self.random_tile();
                self.grid.set(coord, tile);
            }
            return self.grid.is_full();
        }

        let empties = self.grid.collapse();
        for (x, &empty) in empties.iter().enumerate() {
            for y in 0..empty {
                let tile = self.random_tile().map(|mut tile| {
                    tile.drop_distance = empty.min(u8::MAX as usize) as u8;
                    tile
                });
                self.grid.set(Coord::new(x, y), tile);
            }
        }
        self.grid.is_full()
    }

    pub fn owns_any(&self, owner: u8) -> bool {
        self.grid.tiles().any(|(_, tile)| tile.owner == owner)
    }

    /// Guarantees the acting slot owns at least one tile, refilling fully if
    /// needed. Returns whether a refill happened.
    pub fn prepare_for(&mut self, owner: u8) -> bool {
        if self.owns_any(owner) {
            return false;
        }
        if !self.pool.has_owner(owner) {
            self.fill(true);
            return true;
        }
        for _ in 0..MAX_REFILL_ATTEMPTS {
            self.fill(true);
            if self.owns_any(owner) {
                break;
            }
        }
        true
    }

    pub fn find_matches(&self) -> std::collections::BTreeSet<Coord> {
        self.grid.find_matches()
    }

    pub fn views(&self, active: Option<u8>) -> Vec<TileView> {
        self.grid
            .tiles()
            .map(|(coord, tile)| TileView {
                coord,
                tile: *tile,
                dimmed: active.is_some_and(|slot| slot != tile.owner),
            })
            .collect()
    }

    /// Handles one tap at `now_ms`. `active` is the acting player slot, or
    /// `None` when the acting entity is not player-controlled.
    pub fn tap(&mut self, coord: Coord, now_ms: u64, active: Option<u8>) -> TapOutcome {
        if self.locked {
            return TapOutcome::Ignored(IgnoreReason::Locked);
        }
        let Some(owner) = active else {
            return TapOutcome::Ignored(IgnoreReason::NotPlayerTurn);
        };
        if !self.grid.contains(coord) {
            return TapOutcome::Ignored(IgnoreReason::OutOfBounds);
        }
        let Some(tile) = self.grid.get(coord).copied() else {
            return TapOutcome::Ignored(IgnoreReason::EmptyCell);
        };
        let owned = tile.owner == owner;

        if owned
            && let Some((last_id, at)) = self.gesture.last_tap
            && last_id == tile.id
            && now_ms.saturating_sub(at) < self.double_tap_window_ms
        {
            self.gesture = GestureState::default();
            return TapOutcome::Eliminated(self.eliminate(vec![coord], owner, tile.action, false));
        }
        self.gesture.last_tap = owned.then_some((tile.id, now_ms));

        match self.gesture.selected {
            None if owned => {
                self.gesture.selected = Some(coord);
                TapOutcome::Selected(coord)
            }
            None => TapOutcome::Ignored(IgnoreReason::NotOwned),
            Some(selected) => match selected.manhattan(coord) {
                0 => {
                    self.gesture.selected = None;
                    TapOutcome::SelectionCleared
                }
                1 => {
                    self.gesture.selected = None;
                    self.swap_and_check(selected, coord, owner)
                }
                _ if owned => {
                    self.gesture.selected = Some(coord);
                    TapOutcome::Selected(coord)
                }
                _ => {
                    self.gesture.selected = None;
                    TapOutcome::SelectionCleared
                }
            },
        }
    }

    /// Swaps two cells and keeps the swap only if it creates a match that
    /// includes a tile owned by `owner`. Every match on the board is then
    /// eliminated together.
    pub fn swap_and_check(&mut self, from: Coord, to: Coord, owner: u8) -> TapOutcome {
        self.grid.swap(from, to);
        let matches = self.grid.find_matches();

        let trigger = matches
            .iter()
            .filter_map(|&c| self.grid.get(c))
            .find(|tile| tile.owner == owner)
            .map(|tile| tile.action);

        match trigger {
            Some(action) => {
                let coords = matches.into_iter().collect();
                TapOutcome::Eliminated(self.eliminate(coords, owner, action, true))
            }
            None => {
                self.grid.swap(from, to);
                TapOutcome::SwapReverted { from, to }
            }
        }
    }

    /// Clears `coords`, runs a gravity refill, and describes the result.
    pub fn eliminate(
        &mut self,
        coords: Vec<Coord>,
        owner: u8,
        action: ActionId,
        via_swap: bool,
    ) -> Elimination {
        for &coord in &coords {
            self.grid.take(coord);
        }
        self.fill(false);

        Elimination {
            multiplier: Elimination::multiplier_for(coords.len(), via_swap),
            coords,
            owner,
            action,
            via_swap,
        }
    }

    /// First adjacent swap that would give `owner` a match, without applying it.
    pub fn find_swap(&self, owner: u8) -> Option<(Coord, Coord)> {
        let mut scratch = self.grid.clone();
        for (from, _) in self.grid.tiles().filter(|(_, t)| t.owner == owner) {
            let neighbours = [
                Coord::new(from.x + 1, from.y),
                Coord::new(from.x, from.y + 1),
                Coord::new(from.x.wrapping_sub(1), from.y),
                Coord::new(from.x, from.y.wrapping_sub(1)),
            ];
            for to in neighbours.into_iter().filter(|&c| self.grid.contains(c)) {
                scratch.swap(from, to);
                let hit = scratch
                    .find_matches()
                    .iter()
                    .any(|&c| scratch.get(c).is_some_and(|t| t.owner == owner));
                scratch.swap(from, to);
                if hit {
                    return Some((from, to));
                }
            }
        }
        None
    }

    #[cfg(test)]
    pub(crate) fn grid_mut(&mut self) -> &mut Grid {
        &mut self.grid
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Element;

    fn pool(entries: &[(u8, u8)]) -> DeckPool {
        DeckPool::new(
            entries
                .iter()
                .map(|&(owner, action)| DeckEntry {
                    owner,
                    action: ActionId(action),
                    element: Element::Fire,
                })
                .collect(),
        )
    }

    fn tile(id: u64, owner: u8, action: u8) -> Tile {
        Tile {
            id: TileId(id),
            action: ActionId(action),
            owner,
            element: Element::Water,
            drop_distance: 0,
        }
    }

    /// Board whose grid is a match-free stripe pattern of slot-1 tiles.
    fn striped_board() -> Board {
        let mut board = Board::new(pool(&[(0, 1), (1, 2)]), 7, &BattleConfig::default());
        let coords: Vec<_> = board.grid().coords().collect();
        for (i, coord) in coords.into_iter().enumerate() {
            let action = 10 + ((coord.x + 2 * coord.y) % 4) as u8;
            board.grid_mut().set(coord, Some(tile(1000 + i as u64, 1, action)));
        }
        assert!(board.find_matches().is_empty());
        board
    }

    #[test]
    fn empty_pool_cannot_fill() {
        let mut board = Board::new(DeckPool::default(), 1, &BattleConfig::default());
        assert!(board.random_tile().is_none());
        assert!(!board.fill(true));
        assert!(board.grid().tiles().next().is_none());
    }

    #[test]
    fn full_fill_is_deterministic_per_seed() {
        let config = BattleConfig::default();
        let a = Board::new(pool(&[(0, 1), (1, 2), (2, 3)]), 99, &config);
        let b = Board::new(pool(&[(0, 1), (1, 2), (2, 3)]), 99, &config);
        assert_eq!(a.grid(), b.grid());
        assert!(a.grid().is_full());
    }

    #[test]
    fn double_tap_eliminates_single_tile() {
        let mut board = striped_board();
        let spot = Coord::new(4, 4);
        board.grid_mut().set(spot, Some(tile(1, 0, 1)));

        assert_eq!(board.tap(spot, 1_000, Some(0)), TapOutcome::Selected(spot));
        let TapOutcome::Eliminated(elim) = board.tap(spot, 1_200, Some(0)) else {
            panic!("expected elimination");
        };
        assert_eq!(elim.coords, vec![spot]);
        assert_eq!(elim.action, ActionId(1));
        assert!(!elim.via_swap);
        assert_eq!(elim.multiplier, 1.0);
        assert!(board.grid().is_full());
    }

    #[test]
    fn slow_second_tap_only_clears_selection() {
        let mut board = striped_board();
        let spot = Coord::new(4, 4);
        board.grid_mut().set(spot, Some(tile(1, 0, 1)));

        board.tap(spot, 1_000, Some(0));
        assert_eq!(board.tap(spot, 1_400, Some(0)), TapOutcome::SelectionCleared);
    }

    #[test]
    fn gestures_are_gated() {
        let mut board = striped_board();
        let spot = Coord::new(0, 0);
        assert_eq!(
            board.tap(spot, 0, None),
            TapOutcome::Ignored(IgnoreReason::NotPlayerTurn)
        );
        assert_eq!(
            board.tap(Coord::new(10, 3), 0, Some(1)),
            TapOutcome::Ignored(IgnoreReason::OutOfBounds)
        );
        assert_eq!(
            board.tap(spot, 0, Some(0)),
            TapOutcome::Ignored(IgnoreReason::NotOwned)
        );

        board.lock();
        assert_eq!(
            board.tap(spot, 0, Some(1)),
            TapOutcome::Ignored(IgnoreReason::Locked)
        );
        board.unlock();

        board.grid_mut().take(spot);
        assert_eq!(
            board.tap(spot, 0, Some(1)),
            TapOutcome::Ignored(IgnoreReason::EmptyCell)
        );
    }

    #[test]
    fn swap_creating_owned_match_eliminates() {
        let mut board = striped_board();
        // Row 0: A A _ ; A sits below the gap at (2,1).
        board.grid_mut().set(Coord::new(0, 0), Some(tile(1, 0, 1)));
        board.grid_mut().set(Coord::new(1, 0), Some(tile(2, 0, 1)));
        board.grid_mut().set(Coord::new(2, 1), Some(tile(3, 0, 1)));
        assert!(board.find_matches().is_empty());

        assert_eq!(
            board.tap(Coord::new(2, 1), 0, Some(0)),
            TapOutcome::Selected(Coord::new(2, 1))
        );
        let TapOutcome::Eliminated(elim) = board.tap(Coord::new(2, 0), 1_000, Some(0)) else {
            panic!("expected elimination");
        };
        assert!(elim.via_swap);
        assert_eq!(elim.coords.len(), 3);
        assert_eq!(elim.multiplier, 2.0);
        assert_eq!(elim.action, ActionId(1));
    }

    #[test]
    fn owned_swap_clears_every_match_on_the_board() {
        let mut board = striped_board();
        // Row 0 gains a slot-0 run; the displaced slot-1 tile completes
        // a column run below it.
        board.grid_mut().set(Coord::new(0, 0), Some(tile(1, 0, 1)));
        board.grid_mut().set(Coord::new(1, 0), Some(tile(2, 0, 1)));
        board.grid_mut().set(Coord::new(2, 1), Some(tile(3, 0, 1)));
        board.grid_mut().set(Coord::new(2, 0), Some(tile(4, 1, 9)));
        board.grid_mut().set(Coord::new(2, 2), Some(tile(5, 1, 9)));
        board.grid_mut().set(Coord::new(2, 3), Some(tile(6, 1, 9)));
        assert!(board.find_matches().is_empty());

        board.tap(Coord::new(2, 1), 0, Some(0));
        let TapOutcome::Eliminated(elim) = board.tap(Coord::new(2, 0), 1_000, Some(0)) else {
            panic!("expected elimination");
        };

        let mut coords = elim.coords.clone();
        coords.sort();
        let mut expected = vec![
            Coord::new(0, 0),
            Coord::new(1, 0),
            Coord::new(2, 0),
            Coord::new(2, 1),
            Coord::new(2, 2),
            Coord::new(2, 3),
        ];
        expected.sort();
        assert_eq!(coords, expected);
        assert_eq!(elim.owner, 0);
        assert_eq!(elim.action, ActionId(1));
        assert_eq!(elim.multiplier, 3.5);
        assert!(board.grid().is_full());
        assert!(board.grid().tiles().all(|(_, t)| !(1..=6).contains(&t.id.0)));
    }

    #[test]
    fn four_tile_swap_earns_bonus() {
        let mut board = striped_board();
        for (id, x) in [(1, 0), (2, 1), (3, 3)] {
            board.grid_mut().set(Coord::new(x, 0), Some(tile(id, 0, 1)));
        }
        board.grid_mut().set(Coord::new(2, 1), Some(tile(4, 0, 1)));
        assert!(board.find_matches().is_empty());

        board.tap(Coord::new(2, 1), 0, Some(0));
        let TapOutcome::Eliminated(elim) = board.tap(Coord::new(2, 0), 1_000, Some(0)) else {
            panic!("expected elimination");
        };
        assert_eq!(elim.coords.len(), 4);
        assert_eq!(elim.multiplier, 2.5);
    }

    #[test]
    fn swap_matching_only_other_owner_is_reverted() {
        let mut board = striped_board();
        // Slot-1 run prepared by the swap; actor is slot 0.
        board.grid_mut().set(Coord::new(0, 0), Some(tile(1, 1, 9)));
        board.grid_mut().set(Coord::new(1, 0), Some(tile(2, 1, 9)));
        board.grid_mut().set(Coord::new(2, 1), Some(tile(3, 1, 9)));
        board.grid_mut().set(Coord::new(2, 0), Some(tile(4, 0, 1)));
        let before = board.grid().clone();

        board.tap(Coord::new(2, 0), 0, Some(0));
        assert_eq!(
            board.tap(Coord::new(2, 1), 1_000, Some(0)),
            TapOutcome::SwapReverted {
                from: Coord::new(2, 0),
                to: Coord::new(2, 1)
            }
        );
        assert_eq!(board.grid(), &before);
    }

    #[test]
    fn far_tap_moves_selection() {
        let mut board = striped_board();
        board.grid_mut().set(Coord::new(0, 0), Some(tile(1, 0, 1)));
        board.grid_mut().set(Coord::new(5, 5), Some(tile(2, 0, 1)));

        board.tap(Coord::new(0, 0), 0, Some(0));
        assert_eq!(
            board.tap(Coord::new(5, 5), 1_000, Some(0)),
            TapOutcome::Selected(Coord::new(5, 5))
        );
        assert_eq!(
            board.tap(Coord::new(9, 9), 2_000, Some(0)),
            TapOutcome::SelectionCleared
        );
    }

    #[test]
    fn multiplier_scales_with_count() {
        assert_eq!(Elimination::multiplier_for(1, false), 1.0);
        assert_eq!(Elimination::multiplier_for(3, true), 2.0);
        assert_eq!(Elimination::multiplier_for(5, true), 3.0);
    }

    #[test]
    fn prepare_refills_when_actor_has_no_tiles() {
        let mut board = striped_board();
        assert!(!board.owns_any(0));
        assert!(board.prepare_for(0));
        assert!(board.owns_any(0));
        assert!(!board.prepare_for(0));
    }

    #[test]
    fn find_swap_spots_owned_match() {
        let mut board = striped_board();
        assert_eq!(board.find_swap(0), None);
        board.grid_mut().set(Coord::new(0, 0), Some(tile(1, 0, 1)));
        board.grid_mut().set(Coord::new(1, 0), Some(tile(2, 0, 1)));
        board.grid_mut().set(Coord::new(2, 1), Some(tile(3, 0, 1)));
        let (from, to) = board.find_swap(0).expect("swap exists");
        assert_eq!(from.manhattan(to), 1);
    }

    #[test]
    fn views_dim_foreign_tiles() {
        let mut board = striped_board();
        board.grid_mut().set(Coord::new(0, 0), Some(tile(1, 0, 1)));
        let views = board.views(Some(0));
        assert_eq!(views.iter().filter(|v| !v.dimmed).count(), 1);

        assert!(board.views(None).iter().all(|v| !v.dimmed));
    }
}
