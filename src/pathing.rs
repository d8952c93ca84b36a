use std::fmt;

use error_chain::bail;
use log::error;
use smallvec::SmallVec;

use crate::cells::{Cell, ALL_DIRECTIONS};
use crate::errors::*;
use crate::floorplan::Floorplan;
use crate::units::{Height, Width};

/// Distance value of a cell no passage leads to.
pub const INFINITE_DISTANCE: u32 = u32::MAX;

/// Steps from the exit to every cell, following open passages.
#[derive(Debug, Clone)]
pub struct Distance {
    width: Width,
    height: Height,
    exit: Cell,
    distances: Vec<u32>,
    max_distance: u32,
}

impl Distance {
    /// Breadth first flood fill from the exit cell. Any cell the fill cannot reach is an error,
    /// a carved maze must be fully connected.
    pub fn new(floorplan: &Floorplan, exit: Cell) -> Result<Distance> {
        let distance = Distance::flood(floorplan, exit);
        let unreachable = distance.distances.iter().filter(|d| **d == INFINITE_DISTANCE).count();
        if unreachable > 0 {
            error!("{} cells cannot be reached from the exit {}", unreachable, exit);
            bail!(ErrorKind::UnreachableCells(unreachable));
        }
        Ok(distance)
    }

    /// Flood fill without the reachability check, unreached cells keep `INFINITE_DISTANCE`.
    pub fn flood(floorplan: &Floorplan, exit: Cell) -> Distance {
        let (width, height) = (floorplan.width(), floorplan.height());
        let mut distances = vec![INFINITE_DISTANCE; floorplan.size()];
        let mut max = 0;

        if let Some(exit_index) = floorplan.index(exit) {
            distances[exit_index] = 0;

            // Every step costs one, so the first time a cell is reached is the shortest way there
            // and the distances vec doubles as the visited set.
            let mut frontier = vec![exit];
            while !frontier.is_empty() {
                let mut new_frontier = vec![];
                for cell in &frontier {
                    let distance_to_cell = distances[cell.row_major_index(width)];
                    max = max.max(distance_to_cell);

                    for open in floorplan.open_neighbours(*cell).iter() {
                        let index = open.row_major_index(width);
                        if distances[index] == INFINITE_DISTANCE {
                            distances[index] = distance_to_cell + 1;
                            new_frontier.push(*open);
                        }
                    }
                }
                frontier = new_frontier;
            }
        }

        Distance {
            width,
            height,
            exit,
            distances,
            max_distance: max,
        }
    }

    #[inline]
    pub fn exit(&self) -> Cell {
        self.exit
    }

    /// `INFINITE_DISTANCE` for cells off the grid.
    #[inline]
    pub fn get(&self, x: u32, y: u32) -> u32 {
        let cell = Cell::new(x, y);
        if cell.is_within(self.width, self.height) {
            self.distances[cell.row_major_index(self.width)]
        } else {
            INFINITE_DISTANCE
        }
    }

    #[inline]
    pub fn max_distance(&self) -> u32 {
        self.max_distance
    }

    /// Cells at the maximum distance, row major order.
    pub fn furthest_cells(&self) -> SmallVec<[Cell; 8]> {
        let width = self.width;
        self.distances
            .iter()
            .enumerate()
            .filter(|&(_, d)| *d == self.max_distance)
            .map(|(i, _)| Cell::from_row_major_index(i, width))
            .collect()
    }

    /// The furthest cell from the exit, the lowest row major index wins a tie.
    pub fn start(&self) -> Cell {
        self.furthest_cells().first().cloned().unwrap_or(self.exit)
    }

    /// An open neighbour one step closer to the exit, checked North, East, South, West. None at
    /// the exit itself or for a cell the exit cannot be reached from.
    pub fn neighbour_closer_to_exit(&self, floorplan: &Floorplan, x: u32, y: u32) -> Option<Cell> {
        let here = self.get(x, y);
        if here == 0 || here == INFINITE_DISTANCE {
            return None;
        }
        let cell = Cell::new(x, y);
        ALL_DIRECTIONS.iter()
            .filter(|dir| floorplan.has_no_wall(x, y, **dir))
            .filter_map(|dir| floorplan.neighbour(cell, *dir))
            .find(|n| self.get(n.x, n.y) == here - 1)
    }

    /// Cells visited walking downhill from `from` to the exit, both ends included.
    pub fn path_to_exit(&self, floorplan: &Floorplan, from: Cell) -> Option<Vec<Cell>> {
        if self.get(from.x, from.y) == INFINITE_DISTANCE {
            return None;
        }
        let mut path = Vec::with_capacity(self.get(from.x, from.y) as usize + 1);
        let mut current = from;
        path.push(current);
        while let Some(next) = self.neighbour_closer_to_exit(floorplan, current.x, current.y) {
            path.push(next);
            current = next;
        }
        Some(path)
    }
}

/// Rows of space separated distances, `-` for unreachable cells.
impl fmt::Display for Distance {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let widest = self.max_distance.to_string().len();
        for y in 0..self.height.0 as u32 {
            let row = (0..self.width.0 as u32)
                .map(|x| match self.get(x, y) {
                    INFINITE_DISTANCE => format!("{:>w$}", "-", w = widest),
                    d => format!("{:>w$}", d, w = widest),
                })
                .collect::<Vec<_>>();
            writeln!(f, "{}", row.join(" "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cells::{CompassPrimary, Wallboard};

    fn open(fp: &mut Floorplan, x: u32, y: u32, dir: CompassPrimary) {
        fp.delete_wall(Wallboard::new(x, y, dir));
    }

    // 3x2, a snake: (0,0)->(1,0)->(2,0)->(2,1)->(1,1)->(0,1)
    fn snake() -> Floorplan {
        let mut fp = Floorplan::new(Width(3), Height(2));
        open(&mut fp, 0, 0, CompassPrimary::East);
        open(&mut fp, 1, 0, CompassPrimary::East);
        open(&mut fp, 2, 0, CompassPrimary::South);
        open(&mut fp, 2, 1, CompassPrimary::West);
        open(&mut fp, 1, 1, CompassPrimary::West);
        fp
    }

    #[test]
    fn distances_along_a_corridor() {
        let fp = snake();
        let d = Distance::new(&fp, Cell::new(0, 0)).unwrap();
        assert_eq!(d.get(0, 0), 0);
        assert_eq!(d.get(2, 0), 2);
        assert_eq!(d.get(2, 1), 3);
        assert_eq!(d.get(0, 1), 5);
        assert_eq!(d.max_distance(), 5);
        assert_eq!(d.start(), Cell::new(0, 1));
        assert_eq!(d.get(9, 9), INFINITE_DISTANCE);
    }

    #[test]
    fn ties_go_to_the_lowest_row_major_index() {
        // Open 3x3 grid with the exit in the middle: the four corners tie at distance 2.
        let mut fp = Floorplan::new(Width(3), Height(3));
        for y in 0..3 {
            for x in 0..3 {
                if x < 2 {
                    open(&mut fp, x, y, CompassPrimary::East);
                }
                if y < 2 {
                    open(&mut fp, x, y, CompassPrimary::South);
                }
            }
        }
        let d = Distance::new(&fp, Cell::new(1, 1)).unwrap();
        assert_eq!(d.max_distance(), 2);
        assert_eq!(d.furthest_cells().to_vec(),
                   vec![Cell::new(0, 0), Cell::new(2, 0), Cell::new(0, 2), Cell::new(2, 2)]);
        assert_eq!(d.start(), Cell::new(0, 0));
    }

    #[test]
    fn walled_off_cells_are_an_error() {
        let mut fp = Floorplan::new(Width(2), Height(2));
        open(&mut fp, 0, 0, CompassPrimary::East);
        let err = Distance::new(&fp, Cell::new(0, 0)).unwrap_err();
        assert!(err.is_internal_consistency());
        match *err.kind() {
            ErrorKind::UnreachableCells(n) => assert_eq!(n, 2),
            ref other => panic!("unexpected error {:?}", other),
        }

        let partial = Distance::flood(&fp, Cell::new(0, 0));
        assert_eq!(partial.get(1, 0), 1);
        assert_eq!(partial.get(0, 1), INFINITE_DISTANCE);
    }

    #[test]
    fn walking_downhill_reaches_the_exit() {
        let fp = snake();
        let d = Distance::new(&fp, Cell::new(0, 0)).unwrap();
        assert_eq!(d.neighbour_closer_to_exit(&fp, 0, 0), None);
        assert_eq!(d.neighbour_closer_to_exit(&fp, 2, 1), Some(Cell::new(2, 0)));

        let path = d.path_to_exit(&fp, d.start()).unwrap();
        assert_eq!(path,
                   vec![Cell::new(0, 1),
                        Cell::new(1, 1),
                        Cell::new(2, 1),
                        Cell::new(2, 0),
                        Cell::new(1, 0),
                        Cell::new(0, 0)]);
    }

    #[test]
    fn display_is_one_line_per_row() {
        let fp = snake();
        let d = Distance::new(&fp, Cell::new(0, 0)).unwrap();
        assert_eq!(d.to_string(), "0 1 2\n5 4 3\n");
    }
}
