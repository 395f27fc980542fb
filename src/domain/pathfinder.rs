//! Enemy pathfinding: weighted shortest path on the tile grid.
//!
//! Dijkstra with a bounded min-heap. Walkable cells cost 1; solid cells cost
//! `WALL_COST` when `allow_walls` is set (ghost mode) and are not expanded
//! otherwise. Only the first step matters to callers, so instead of parent
//! links the search carries `first_dir`: the direction taken out of `from`
//! on the best path found so far to each cell.
//!
//! All scratch storage is owned by the `Pathfinder` and reused between
//! calls; a search never allocates.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use super::consts::{MAP_HEIGHT, MAP_WIDTH, ROW_BORDER, ROW_SKY_START};
use super::entity::Direction;
use super::map::Map;

pub const HEAP_CAPACITY: usize = 256;
pub const WALL_COST: u32 = 10;

/// Heap entry: (cost, insertion order, x, y). The insertion counter makes
/// equal-cost pops FIFO, which keeps tie-breaking in neighbor order.
type Entry = Reverse<(u32, u32, u8, u8)>;

pub struct Pathfinder {
    cost: [[u32; MAP_WIDTH]; MAP_HEIGHT],
    first_dir: [[Direction; MAP_WIDTH]; MAP_HEIGHT],
    heap: BinaryHeap<Entry>,
    seq: u32,
}

impl Default for Pathfinder {
    fn default() -> Self {
        Self::new()
    }
}

impl Pathfinder {
    pub fn new() -> Self {
        Pathfinder {
            cost: [[u32::MAX; MAP_WIDTH]; MAP_HEIGHT],
            first_dir: [[Direction::None; MAP_WIDTH]; MAP_HEIGHT],
            heap: BinaryHeap::with_capacity(HEAP_CAPACITY),
            seq: 0,
        }
    }

    /// First step of a shortest path from `from` to `to`, or None when `to`
    /// is unreachable (or equal to `from`).
    pub fn shortest_direction(
        &mut self,
        map: &Map,
        from: (i32, i32),
        to: (i32, i32),
        allow_walls: bool,
    ) -> Option<Direction> {
        if from == to || !expandable(map, from.0, from.1) || !map.is_valid(to.0, to.1) {
            return None;
        }

        for row in self.cost.iter_mut() {
            row.fill(u32::MAX);
        }
        for row in self.first_dir.iter_mut() {
            row.fill(Direction::None);
        }
        self.heap.clear();
        self.seq = 0;

        self.cost[from.1 as usize][from.0 as usize] = 0;
        self.push(0, from.0, from.1);

        while let Some(Reverse((c, _, x, y))) = self.heap.pop() {
            let (x, y) = (x as i32, y as i32);
            if c > self.cost[y as usize][x as usize] {
                continue; // stale entry
            }
            if (x, y) == to {
                let d = self.first_dir[y as usize][x as usize];
                return if d == Direction::None { None } else { Some(d) };
            }

            for dir in Direction::ALL {
                let (nx, ny) = dir.step(x, y);
                if !expandable(map, nx, ny) {
                    continue;
                }
                let tile = map.tile(nx, ny);
                let weight = if tile.is_walkable() {
                    1
                } else if tile.is_solid() && allow_walls {
                    WALL_COST
                } else {
                    continue;
                };

                let nc = c + weight;
                let (ux, uy) = (nx as usize, ny as usize);
                // a dropped push leaves the cell open for a later, cheaper visit
                if nc < self.cost[uy][ux] && self.push(nc, nx, ny) {
                    self.cost[uy][ux] = nc;
                    self.first_dir[uy][ux] = if (x, y) == from {
                        dir
                    } else {
                        self.first_dir[y as usize][x as usize]
                    };
                }
            }
        }

        None
    }

    /// Overflowing pushes are dropped (false); the caller already tolerates None.
    fn push(&mut self, cost: u32, x: i32, y: i32) -> bool {
        if self.heap.len() >= HEAP_CAPACITY {
            return false;
        }
        self.heap.push(Reverse((cost, self.seq, x as u8, y as u8)));
        self.seq = self.seq.wrapping_add(1);
        true
    }
}

/// Cells the search may visit: on the grid, below the top status row and
/// above the border row.
fn expandable(map: &Map, x: i32, y: i32) -> bool {
    map.is_valid(x, y) && y >= ROW_SKY_START as i32 && y < ROW_BORDER as i32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::tile::TileKind;
    use std::collections::VecDeque;

    /// Diagrams start at this row so the sky band never offers a shortcut.
    const TOP: i32 = 5;

    fn at(x: i32, row: i32) -> (i32, i32) {
        (x, TOP + row)
    }

    /// Legend: '#'=Dirt  '='=Wall  ' '=Empty. Everything else in the earth is Dirt.
    fn map_from(rows: &[&str]) -> Map {
        let mut m = Map::new();
        m.init(0);
        for y in 3..ROW_BORDER as i32 {
            for x in 0..MAP_WIDTH as i32 {
                m.set_tile(x, y, TileKind::Dirt);
            }
        }
        for (dy, row) in rows.iter().enumerate() {
            for (x, ch) in row.chars().enumerate() {
                let t = match ch {
                    '=' => TileKind::Wall,
                    ' ' => TileKind::Empty,
                    _ => TileKind::Dirt,
                };
                m.set_tile(x as i32, TOP + dy as i32, t);
            }
        }
        m
    }

    /// Plain BFS distance over walkable cells.
    fn bfs(map: &Map, from: (i32, i32), to: (i32, i32)) -> Option<u32> {
        let mut dist = vec![vec![u32::MAX; MAP_WIDTH]; MAP_HEIGHT];
        let mut q = VecDeque::new();
        dist[from.1 as usize][from.0 as usize] = 0;
        q.push_back(from);
        while let Some((x, y)) = q.pop_front() {
            if (x, y) == to {
                return Some(dist[y as usize][x as usize]);
            }
            for d in Direction::ALL {
                let (nx, ny) = d.step(x, y);
                if !expandable(map, nx, ny) || !map.is_walkable(nx, ny) {
                    continue;
                }
                if dist[ny as usize][nx as usize] == u32::MAX {
                    dist[ny as usize][nx as usize] = dist[y as usize][x as usize] + 1;
                    q.push_back((nx, ny));
                }
            }
        }
        None
    }

    #[test]
    fn straight_corridor() {
        let m = map_from(&["#          #"]);
        let mut pf = Pathfinder::new();
        assert_eq!(pf.shortest_direction(&m, at(2, 0), at(8, 0), false), Some(Direction::Right));
        assert_eq!(pf.shortest_direction(&m, at(8, 0), at(2, 0), false), Some(Direction::Left));
    }

    #[test]
    fn dirt_blocks_unless_walls_allowed() {
        let m = map_from(&["#   #   #"]);
        let mut pf = Pathfinder::new();
        assert_eq!(pf.shortest_direction(&m, at(2, 0), at(6, 0), false), None);
        assert_eq!(pf.shortest_direction(&m, at(2, 0), at(6, 0), true), Some(Direction::Right));
    }

    #[test]
    fn same_cell_is_none() {
        let m = map_from(&["#   #"]);
        let mut pf = Pathfinder::new();
        assert_eq!(pf.shortest_direction(&m, at(2, 0), at(2, 0), false), None);
    }

    #[test]
    fn first_step_lies_on_a_shortest_path() {
        let m = map_from(&[
            "##########",
            "#    #   #",
            "# ## # # #",
            "#  #   # #",
            "## ##### #",
            "#        #",
            "##########",
        ]);
        let mut pf = Pathfinder::new();
        let to = at(8, 5);
        for from in [at(1, 1), at(4, 1), at(2, 3), at(6, 3), at(1, 5)] {
            let total = bfs(&m, from, to).expect("reachable");
            let d = pf.shortest_direction(&m, from, to, false).expect("direction");
            let next = d.step(from.0, from.1);
            assert!(m.is_walkable(next.0, next.1));
            assert_eq!(bfs(&m, next, to), Some(total - 1), "from {from:?} via {d:?}");
        }
    }

    #[test]
    fn ties_follow_up_down_left_right() {
        let m = map_from(&[
            "#####",
            "#   #",
            "#   #",
            "#   #",
            "#####",
        ]);
        let mut pf = Pathfinder::new();
        // Up and Right are both shortest: Up wins.
        assert_eq!(pf.shortest_direction(&m, at(1, 3), at(3, 1), false), Some(Direction::Up));
        // Down and Right are both shortest: Down wins.
        assert_eq!(pf.shortest_direction(&m, at(1, 1), at(3, 3), false), Some(Direction::Down));
        // Up and Left are both shortest: Up wins.
        assert_eq!(pf.shortest_direction(&m, at(3, 3), at(1, 1), false), Some(Direction::Up));
    }

    #[test]
    fn ghost_weighs_dirt_against_detours() {
        let m = map_from(&[
            "#         #",
            "# ####### #",
            "# #     # #",
        ]);
        let mut pf = Pathfinder::new();
        // Two dirt cells straight ahead (26) cost more than the tunnel loop (12).
        assert_eq!(pf.shortest_direction(&m, at(1, 2), at(9, 2), true), Some(Direction::Up));
        // One dirt cell (11) beats the loop through the tunnel (15).
        assert_eq!(pf.shortest_direction(&m, at(1, 2), at(3, 2), true), Some(Direction::Right));
    }

    #[test]
    fn push_is_refused_at_capacity() {
        let mut pf = Pathfinder::new();
        for i in 0..HEAP_CAPACITY {
            assert!(pf.push(i as u32, 1, TOP));
        }
        assert!(!pf.push(0, 2, TOP));
        assert_eq!(pf.heap.len(), HEAP_CAPACITY);
    }

    #[test]
    fn saturated_search_still_terminates() {
        // checkerboard of dirt and tunnel: mixed weights keep many entries queued
        let mut m = Map::new();
        m.init(0);
        for y in ROW_SKY_START as i32..ROW_BORDER as i32 {
            for x in 0..MAP_WIDTH as i32 {
                let t = if (x + y) % 2 == 0 { TileKind::Empty } else { TileKind::Dirt };
                m.set_tile(x, y, t);
            }
        }
        let mut pf = Pathfinder::new();
        let from = (0, ROW_SKY_START as i32);
        let to = (MAP_WIDTH as i32 - 1, ROW_BORDER as i32 - 1);
        if let Some(d) = pf.shortest_direction(&m, from, to, true) {
            let (nx, ny) = d.step(from.0, from.1);
            assert!(expandable(&m, nx, ny), "stepped off the field via {d:?}");
        }

        // scratch state is reset for the next caller
        let small = map_from(&["#          #"]);
        assert_eq!(pf.shortest_direction(&small, at(2, 0), at(8, 0), false), Some(Direction::Right));
    }

    #[test]
    fn border_row_is_never_expanded() {
        let mut m = map_from(&["#   #"]);
        for y in 3..ROW_BORDER as i32 {
            m.set_tile(2, y, TileKind::Empty);
        }
        let mut pf = Pathfinder::new();
        let border = ROW_BORDER as i32;
        assert_eq!(pf.shortest_direction(&m, (2, 10), (2, border), true), None);
        assert_eq!(pf.shortest_direction(&m, (2, 10), (2, border - 1), false), Some(Direction::Down));
    }
}
