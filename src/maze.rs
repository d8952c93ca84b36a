use crate::cells::{Cell, CompassPrimary, Wallboard};
use crate::floorplan::Floorplan;
use crate::pathing::Distance;
use crate::units::{Height, Width};

/// A finished maze. Nothing in this crate changes a maze once it has been built.
#[derive(Debug, Clone)]
pub struct Maze {
    floorplan: Floorplan,
    distance: Distance,
    start: Cell,
    exit: Wallboard,
}

impl Maze {
    pub(crate) fn new(floorplan: Floorplan, distance: Distance, start: Cell, exit: Wallboard) -> Maze {
        Maze {
            floorplan,
            distance,
            start,
            exit,
        }
    }

    #[inline]
    pub fn width(&self) -> Width {
        self.floorplan.width()
    }

    #[inline]
    pub fn height(&self) -> Height {
        self.floorplan.height()
    }

    #[inline]
    pub fn has_wall(&self, x: u32, y: u32, direction: CompassPrimary) -> bool {
        self.floorplan.has_wall(x, y, direction)
    }

    #[inline]
    pub fn is_in_room(&self, x: u32, y: u32) -> bool {
        self.floorplan.is_in_room(x, y)
    }

    pub fn is_exit_position(&self, x: u32, y: u32) -> bool {
        self.exit.cell == Cell::new(x, y)
    }

    /// Steps from (x, y) to the exit cell.
    #[inline]
    pub fn distance(&self, x: u32, y: u32) -> u32 {
        self.distance.get(x, y)
    }

    pub fn start_position(&self) -> Cell {
        self.start
    }

    pub fn exit_position(&self) -> Cell {
        self.exit.cell
    }

    /// The open wall leading out of the maze from the exit cell.
    pub fn exit_wallboard(&self) -> Wallboard {
        self.exit
    }

    pub fn neighbour_closer_to_exit(&self, x: u32, y: u32) -> Option<Cell> {
        self.distance.neighbour_closer_to_exit(&self.floorplan, x, y)
    }

    pub fn floorplan(&self) -> &Floorplan {
        &self.floorplan
    }

    pub fn distances(&self) -> &Distance {
        &self.distance
    }
}
