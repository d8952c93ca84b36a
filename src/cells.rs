use std::cmp::Ordering;
use std::fmt;

use rand::Rng;
use smallvec::SmallVec;

use crate::units::{ColumnIndex, Height, RowIndex, Width};

/// A grid position. Cells compare and hash by value, so two cells with the same `x` and `y`
/// are always the same cell. Ordering is row major, the same order as `row_major_index`.
#[derive(Hash, Eq, PartialEq, Copy, Clone, Debug)]
pub struct Cell {
    pub x: u32,
    pub y: u32,
}

impl Ord for Cell {
    fn cmp(&self, other: &Cell) -> Ordering {
        (self.y, self.x).cmp(&(other.y, other.x))
    }
}

impl PartialOrd for Cell {
    fn partial_cmp(&self, other: &Cell) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

pub type CellSmallVec = SmallVec<[Cell; 4]>;

#[derive(Hash, Eq, PartialEq, Copy, Clone, Debug, Ord, PartialOrd)]
pub enum CompassPrimary {
    North,
    East,
    South,
    West,
}

pub const ALL_DIRECTIONS: [CompassPrimary; 4] = [CompassPrimary::North,
                                                 CompassPrimary::East,
                                                 CompassPrimary::South,
                                                 CompassPrimary::West];

impl CompassPrimary {
    pub fn opposite(self) -> CompassPrimary {
        match self {
            CompassPrimary::North => CompassPrimary::South,
            CompassPrimary::East => CompassPrimary::West,
            CompassPrimary::South => CompassPrimary::North,
            CompassPrimary::West => CompassPrimary::East,
        }
    }

    /// Index into a per-cell `[T; 4]` table of wall attributes.
    #[inline]
    pub fn slot(self) -> usize {
        match self {
            CompassPrimary::North => 0,
            CompassPrimary::East => 1,
            CompassPrimary::South => 2,
            CompassPrimary::West => 3,
        }
    }

    pub fn rand_direction<R: Rng>(rng: &mut R) -> CompassPrimary {
        ALL_DIRECTIONS[rng.gen_range(0..ALL_DIRECTIONS.len())]
    }
}

impl fmt::Display for CompassPrimary {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match *self {
            CompassPrimary::North => "North",
            CompassPrimary::East => "East",
            CompassPrimary::South => "South",
            CompassPrimary::West => "West",
        };
        write!(f, "{}", name)
    }
}

impl Cell {
    pub fn new(x: u32, y: u32) -> Cell {
        Cell { x, y }
    }

    #[inline]
    pub fn from_row_major_index(index: usize, width: Width) -> Cell {
        let x = index % width.0;
        let y = index / width.0;
        Cell::new(x as u32, y as u32)
    }

    #[inline]
    pub fn from_row_column_indices(col_index: ColumnIndex, row_index: RowIndex) -> Cell {
        let (ColumnIndex(col), RowIndex(row)) = (col_index, row_index);
        Cell::new(col as u32, row as u32)
    }

    /// Flat `y * width + x` index used by every array backed per-cell table.
    #[inline]
    pub fn row_major_index(self, width: Width) -> usize {
        self.y as usize * width.0 + self.x as usize
    }

    #[inline]
    pub fn is_within(self, width: Width, height: Height) -> bool {
        (self.x as usize) < width.0 && (self.y as usize) < height.0
    }

    /// Creates a new `Cell` offset 1 cell away in the given direction.
    /// Returns None if the cell would be west of column 0 or north of row 0; the caller is
    /// responsible for the far east and south edges.
    pub fn offset(self, dir: CompassPrimary) -> Option<Cell> {
        let (x, y) = (self.x, self.y);
        match dir {
            CompassPrimary::North => {
                if y > 0 {
                    Some(Cell { x, y: y - 1 })
                } else {
                    None
                }
            }
            CompassPrimary::South => Some(Cell { x, y: y + 1 }),
            CompassPrimary::East => Some(Cell { x: x + 1, y }),
            CompassPrimary::West => {
                if x > 0 {
                    Some(Cell { x: x - 1, y })
                } else {
                    None
                }
            }
        }
    }
}

impl From<(u32, u32)> for Cell {
    fn from(x_y_pair: (u32, u32)) -> Cell {
        Cell::new(x_y_pair.0, x_y_pair.1)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// One wall segment, addressed from a cell looking in a direction. The same physical wall
/// between two cells can be addressed from either side, see `mirrored`.
#[derive(Hash, Eq, PartialEq, Copy, Clone, Debug)]
pub struct Wallboard {
    pub cell: Cell,
    pub direction: CompassPrimary,
}

impl Wallboard {
    pub fn new(x: u32, y: u32, direction: CompassPrimary) -> Wallboard {
        Wallboard {
            cell: Cell::new(x, y),
            direction,
        }
    }

    /// The cell on the other side of the wall, unless the wall faces off the north or west edge.
    #[inline]
    pub fn neighbour(&self) -> Option<Cell> {
        self.cell.offset(self.direction)
    }

    /// The same wall seen from the neighbouring cell.
    pub fn mirrored(&self) -> Option<Wallboard> {
        self.neighbour().map(|cell| Wallboard {
            cell,
            direction: self.direction.opposite(),
        })
    }
}

impl fmt::Display for Wallboard {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {} {}", self.cell.x, self.cell.y, self.direction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::fnv_hashset;

    #[test]
    fn cells_compare_by_value() {
        let mut seen = fnv_hashset(4);
        seen.insert(Cell::new(2, 3));
        assert!(seen.contains(&Cell::new(2, 3)));
        assert!(!seen.contains(&Cell::new(3, 2)));
        assert_eq!(Cell::from((2, 3)), Cell::new(2, 3));
    }

    #[test]
    fn row_major_index_round_trips_through_width() {
        let w = Width(5);
        let c = Cell::new(3, 2);
        assert_eq!(c.row_major_index(w), 13);
        assert_eq!(Cell::from_row_major_index(13, w), c);
        assert_eq!(Cell::from_row_column_indices(ColumnIndex(3), RowIndex(2)), c);
    }

    #[test]
    fn cells_sort_in_row_major_order() {
        let w = Width(4);
        let mut cells = vec![Cell::new(3, 2), Cell::new(2, 1), Cell::new(2, 2), Cell::new(3, 1),
                             Cell::new(0, 3)];
        cells.sort();
        assert_eq!(cells,
                   vec![Cell::new(2, 1), Cell::new(3, 1), Cell::new(2, 2), Cell::new(3, 2),
                        Cell::new(0, 3)]);
        assert!(cells.windows(2).all(|p| p[0].row_major_index(w) < p[1].row_major_index(w)));
    }

    #[test]
    fn offsets_stop_at_the_north_west_edges() {
        let gc = |x, y| Cell::new(x, y);
        assert_eq!(gc(0, 0).offset(CompassPrimary::North), None);
        assert_eq!(gc(0, 0).offset(CompassPrimary::West), None);
        assert_eq!(gc(0, 0).offset(CompassPrimary::South), Some(gc(0, 1)));
        assert_eq!(gc(0, 0).offset(CompassPrimary::East), Some(gc(1, 0)));
        assert_eq!(gc(1, 1).offset(CompassPrimary::North), Some(gc(1, 0)));
        assert_eq!(gc(1, 1).offset(CompassPrimary::West), Some(gc(0, 1)));
    }

    #[test]
    fn opposite_directions() {
        for dir in ALL_DIRECTIONS.iter() {
            assert_ne!(*dir, dir.opposite());
            assert_eq!(*dir, dir.opposite().opposite());
        }
    }

    #[test]
    fn mirrored_wallboard_points_back() {
        let wb = Wallboard::new(1, 1, CompassPrimary::East);
        let mirror = wb.mirrored().unwrap();
        assert_eq!(mirror, Wallboard::new(2, 1, CompassPrimary::West));
        assert_eq!(mirror.mirrored(), Some(wb));
        assert_eq!(Wallboard::new(0, 0, CompassPrimary::North).mirrored(), None);
    }
}
