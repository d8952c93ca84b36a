use bit_set::BitSet;
use petgraph::{Graph, Undirected};

use crate::cells::{Cell, CellSmallVec, CompassPrimary, Wallboard, ALL_DIRECTIONS};
use crate::units::{Height, Width};

#[derive(Eq, PartialEq, Copy, Clone, Debug)]
struct WallState {
    present: bool,
    border: bool,
    load_bearing: bool,
}

impl Default for WallState {
    fn default() -> WallState {
        WallState {
            present: true,
            border: false,
            load_bearing: false,
        }
    }
}

/// An axis aligned rectangle of cells with no internal walls and a single way in.
#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub struct Room {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    /// The one perimeter wallboard that stays removable. Always on the room's southern side.
    pub door: Wallboard,
}

impl Room {
    /// A room whose door sits below column `door_x` of the bottom row.
    pub fn new(x: u32, y: u32, width: u32, height: u32, door_x: u32) -> Room {
        debug_assert!(width > 0 && height > 0);
        debug_assert!(door_x >= x && door_x < x + width);
        Room {
            x,
            y,
            width,
            height,
            door: Wallboard::new(door_x, y + height - 1, CompassPrimary::South),
        }
    }

    #[inline]
    pub fn contains(&self, cell: Cell) -> bool {
        cell.x >= self.x && cell.x < self.x + self.width && cell.y >= self.y &&
        cell.y < self.y + self.height
    }

    /// Rooms are kept off the outermost rows and columns so the border stays a plain corridor
    /// and the cell under the door always exists.
    pub fn fits_inside_border(&self, width: Width, height: Height) -> bool {
        self.x >= 1 && self.y >= 1 && (self.x + self.width) as usize <= width.0.saturating_sub(1) &&
        (self.y + self.height) as usize <= height.0.saturating_sub(1)
    }

    /// True if the rooms overlap or touch, diagonals included. Rooms that pass this check always
    /// have a corridor at least one cell wide between them.
    pub fn crowds(&self, other: &Room) -> bool {
        let (ax0, ay0) = (self.x as i64 - 1, self.y as i64 - 1);
        let (ax1, ay1) = ((self.x + self.width) as i64, (self.y + self.height) as i64);
        let (bx0, by0) = (other.x as i64, other.y as i64);
        let (bx1, by1) = ((other.x + other.width - 1) as i64, (other.y + other.height - 1) as i64);
        ax0 <= bx1 && bx0 <= ax1 && ay0 <= by1 && by0 <= ay1
    }

    pub fn cells(&self) -> impl Iterator<Item = Cell> {
        let (x0, y0, w, h) = (self.x, self.y, self.width, self.height);
        (y0..y0 + h).flat_map(move |y| (x0..x0 + w).map(move |x| Cell::new(x, y)))
    }
}

/// The authoritative wall state of a maze: four wallboards per cell, the outer border, the exit
/// and the room map.
#[derive(Clone, Debug)]
pub struct Floorplan {
    width: Width,
    height: Height,
    walls: Vec<[WallState; 4]>,
    room_cells: BitSet,
    rooms: Vec<Room>,
    exit: Option<Wallboard>,
    wall_log: Vec<Wallboard>,
}

impl Floorplan {
    /// Every wall standing, nothing flagged as border or load-bearing yet.
    pub fn new(width: Width, height: Height) -> Floorplan {
        let cells_count = width.0 * height.0;
        Floorplan {
            width,
            height,
            walls: vec![[WallState::default(); 4]; cells_count],
            room_cells: BitSet::with_capacity(cells_count),
            rooms: vec![],
            exit: None,
            wall_log: vec![],
        }
    }

    #[inline]
    pub fn width(&self) -> Width {
        self.width
    }

    #[inline]
    pub fn height(&self) -> Height {
        self.height
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.width.0 * self.height.0
    }

    #[inline]
    pub fn is_valid_cell(&self, cell: Cell) -> bool {
        cell.is_within(self.width, self.height)
    }

    #[inline]
    pub fn index(&self, cell: Cell) -> Option<usize> {
        if self.is_valid_cell(cell) {
            Some(cell.row_major_index(self.width))
        } else {
            None
        }
    }

    /// The adjacent cell in the given direction, if it is on the grid.
    pub fn neighbour(&self, cell: Cell, direction: CompassPrimary) -> Option<Cell> {
        cell.offset(direction).filter(|c| self.is_valid_cell(*c))
    }

    /// Cells to the North, East, South or West of `cell`, not necessarily reachable from it.
    pub fn neighbours(&self, cell: Cell) -> CellSmallVec {
        ALL_DIRECTIONS.iter()
            .filter_map(|dir| self.neighbour(cell, *dir))
            .collect()
    }

    /// Cells reachable from `cell` in one step, in North, East, South, West order.
    pub fn open_neighbours(&self, cell: Cell) -> CellSmallVec {
        ALL_DIRECTIONS.iter()
            .filter(|dir| !self.has_wall(cell.x, cell.y, **dir))
            .filter_map(|dir| self.neighbour(cell, *dir))
            .collect()
    }

    /// All cells in row major order.
    pub fn iter(&self) -> impl Iterator<Item = Cell> {
        let width = self.width;
        (0..self.size()).map(move |i| Cell::from_row_major_index(i, width))
    }

    /// Is there a wall on side `direction` of cell (x, y)? Cells off the grid are solid.
    pub fn has_wall(&self, x: u32, y: u32, direction: CompassPrimary) -> bool {
        self.state(Wallboard::new(x, y, direction)).map_or(true, |s| s.present)
    }

    #[inline]
    pub fn has_no_wall(&self, x: u32, y: u32, direction: CompassPrimary) -> bool {
        !self.has_wall(x, y, direction)
    }

    pub fn is_border(&self, wallboard: Wallboard) -> bool {
        self.state(wallboard).map_or(false, |s| s.border)
    }

    pub fn is_load_bearing(&self, wallboard: Wallboard) -> bool {
        self.state(wallboard).map_or(false, |s| s.load_bearing)
    }

    /// Does the wallboard face off the edge of the grid?
    pub fn is_outward(&self, wallboard: Wallboard) -> bool {
        self.is_valid_cell(wallboard.cell) &&
        self.neighbour(wallboard.cell, wallboard.direction).is_none()
    }

    /// A wallboard may be removed unless it is part of the border or of a room perimeter.
    pub fn can_tear_down(&self, wallboard: Wallboard) -> bool {
        self.state(wallboard).map_or(false, |s| !s.border && !s.load_bearing)
    }

    /// Remove a wall, from both of the cells it separates.
    ///
    /// Removing an absent wall does nothing. Panics if the wall is protected: callers check
    /// `can_tear_down` before every removal.
    pub fn delete_wall(&mut self, wallboard: Wallboard) {
        if self.has_no_wall(wallboard.cell.x, wallboard.cell.y, wallboard.direction) {
            return;
        }
        assert!(self.can_tear_down(wallboard),
                "wallboard {} is protected and cannot be torn down",
                wallboard);
        self.clear_wall(wallboard);
    }

    #[inline]
    pub fn is_in_room(&self, x: u32, y: u32) -> bool {
        self.index(Cell::new(x, y)).map_or(false, |i| self.room_cells.contains(i))
    }

    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    /// The room containing `cell`, if any.
    pub fn room_at(&self, cell: Cell) -> Option<&Room> {
        if self.is_in_room(cell.x, cell.y) {
            self.rooms.iter().find(|room| room.contains(cell))
        } else {
            None
        }
    }

    /// Flag every outward facing wallboard as border.
    pub fn mark_borders(&mut self) {
        let outward = self.iter()
            .flat_map(|cell| ALL_DIRECTIONS.iter().map(move |dir| Wallboard { cell, direction: *dir }))
            .filter(|wb| self.is_outward(*wb))
            .collect::<Vec<_>>();
        for wb in outward {
            if let Some(state) = self.state_mut(wb) {
                state.border = true;
            }
        }
    }

    /// Leave one outward wallboard removable; it becomes the maze exit once torn down.
    pub fn designate_exit(&mut self, wallboard: Wallboard) {
        assert!(self.is_outward(wallboard),
                "exit wallboard {} does not face off the grid",
                wallboard);
        if let Some(state) = self.state_mut(wallboard) {
            state.border = false;
        }
        self.exit = Some(wallboard);
    }

    pub fn exit_wallboard(&self) -> Option<Wallboard> {
        self.exit
    }

    /// Open up a room: internal walls go, the perimeter becomes load-bearing except for the door.
    pub fn mark_room(&mut self, room: Room) {
        assert!(room.fits_inside_border(self.width, self.height),
                "room {:?} touches the outer border",
                room);
        assert!(self.rooms.iter().all(|other| !room.crowds(other)),
                "room {:?} crowds an existing room",
                room);

        for cell in room.cells() {
            let index = cell.row_major_index(self.width);
            self.room_cells.insert(index);
        }

        for cell in room.cells() {
            for dir in ALL_DIRECTIONS.iter() {
                let wb = Wallboard { cell, direction: *dir };
                let neighbour = self.neighbour(cell, *dir).expect("rooms are kept off the border");
                if room.contains(neighbour) {
                    // East and South cover every interior wall exactly once.
                    if *dir == CompassPrimary::East || *dir == CompassPrimary::South {
                        self.clear_wall(wb);
                    }
                } else if wb != room.door {
                    self.set_load_bearing(wb);
                }
            }
        }
        self.rooms.push(room);
    }

    /// Every wall removal so far, in the order they happened.
    pub fn wall_log(&self) -> &[Wallboard] {
        &self.wall_log
    }

    /// Number of removed walls between two cells of the grid (the exit is not counted).
    pub fn passages_count(&self) -> usize {
        self.iter()
            .map(|cell| {
                [CompassPrimary::East, CompassPrimary::South]
                    .iter()
                    .filter(|dir| {
                        self.neighbour(cell, **dir).is_some() &&
                        self.has_no_wall(cell.x, cell.y, **dir)
                    })
                    .count()
            })
            .sum()
    }

    /// An undirected graph with a node per cell, in row major order, and an edge per open
    /// passage between two cells.
    pub fn passage_graph(&self) -> Graph<Cell, (), Undirected> {
        let mut graph = Graph::with_capacity(self.size(), self.passages_count());
        for cell in self.iter() {
            let _ = graph.add_node(cell);
        }
        for cell in self.iter() {
            for dir in [CompassPrimary::East, CompassPrimary::South].iter() {
                if let Some(neighbour) = self.neighbour(cell, *dir) {
                    if self.has_no_wall(cell.x, cell.y, *dir) {
                        let a = petgraph::graph::NodeIndex::new(cell.row_major_index(self.width));
                        let b = petgraph::graph::NodeIndex::new(neighbour.row_major_index(self.width));
                        let _ = graph.add_edge(a, b, ());
                    }
                }
            }
        }
        graph
    }

    fn clear_wall(&mut self, wallboard: Wallboard) {
        if let Some(state) = self.state_mut(wallboard) {
            state.present = false;
        }
        if let Some(mirror) = wallboard.mirrored() {
            if let Some(state) = self.state_mut(mirror) {
                state.present = false;
            }
        }
        self.wall_log.push(wallboard);
    }

    fn set_load_bearing(&mut self, wallboard: Wallboard) {
        if let Some(state) = self.state_mut(wallboard) {
            state.load_bearing = true;
        }
        if let Some(mirror) = wallboard.mirrored() {
            if let Some(state) = self.state_mut(mirror) {
                state.load_bearing = true;
            }
        }
    }

    #[inline]
    fn state(&self, wallboard: Wallboard) -> Option<&WallState> {
        self.index(wallboard.cell).map(|i| &self.walls[i][wallboard.direction.slot()])
    }

    #[inline]
    fn state_mut(&mut self, wallboard: Wallboard) -> Option<&mut WallState> {
        let slot = wallboard.direction.slot();
        match self.index(wallboard.cell) {
            Some(i) => Some(&mut self.walls[i][slot]),
            None => None,
        }
    }
}
