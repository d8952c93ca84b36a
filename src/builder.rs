//! Builds a complete maze: the walled skeleton with its border, exit and rooms, then the carved
//! passages, then the distances that fix the start position.

use error_chain::bail;
use log::debug;
use rand::{Rng, SeedableRng};
use rand_xorshift::XorShiftRng;

use crate::cells::{CompassPrimary, Wallboard};
use crate::errors::*;
use crate::factory::{BuildControl, Order};
use crate::floorplan::{Floorplan, Room};
use crate::generators::{carver_for, Algorithm};
use crate::maze::Maze;
use crate::pathing::Distance;
use crate::skill;
use crate::units::{Height, Percent, SkillLevel, Width};

const MIN_ROOM_SIDE: usize = 2;
const MAX_ROOM_SIDE: usize = 20;
const ROOM_ATTEMPTS_PER_ROOM: usize = 20;

#[derive(Debug, Clone)]
pub struct MazeBuilder {
    width: Width,
    height: Height,
    algorithm: Algorithm,
    seed: u64,
    perfect: bool,
    max_rooms: usize,
}

impl MazeBuilder {
    /// A perfect maze (no rooms) carved with Eller's algorithm from seed 0.
    pub fn new(width: Width, height: Height) -> MazeBuilder {
        MazeBuilder {
            width,
            height,
            algorithm: Algorithm::Eller,
            seed: 0,
            perfect: true,
            max_rooms: 0,
        }
    }

    /// Size, room budget, seed and algorithm as an order asks for them.
    pub fn from_order(order: &dyn Order) -> Result<MazeBuilder> {
        let dimensions = skill::dimensions(SkillLevel(order.skill_level()))?;
        let builder = MazeBuilder::new(dimensions.width, dimensions.height)
            .algorithm(order.algorithm())
            .seed(order.seed())
            .perfect(order.is_perfect())
            .max_rooms(dimensions.max_rooms);
        builder.validate()?;
        Ok(builder)
    }

    pub fn algorithm(mut self, algorithm: Algorithm) -> MazeBuilder {
        self.algorithm = algorithm;
        self
    }

    pub fn seed(mut self, seed: u64) -> MazeBuilder {
        self.seed = seed;
        self
    }

    /// A perfect maze has no rooms, so exactly one path joins any two cells.
    pub fn perfect(mut self, perfect: bool) -> MazeBuilder {
        self.perfect = perfect;
        self
    }

    pub fn max_rooms(mut self, max_rooms: usize) -> MazeBuilder {
        self.max_rooms = max_rooms;
        self
    }

    pub fn width(&self) -> Width {
        self.width
    }

    pub fn height(&self) -> Height {
        self.height
    }

    /// Checks everything that can be wrong with the request before any work is done.
    pub fn validate(&self) -> Result<()> {
        if self.width.0 == 0 || self.height.0 == 0 {
            bail!(ErrorKind::InvalidDimensions(self.width.0, self.height.0));
        }
        if !self.algorithm.is_supported() {
            bail!(ErrorKind::UnsupportedAlgorithm(self.algorithm));
        }
        Ok(())
    }

    pub fn build(&self, control: &BuildControl) -> Result<Maze> {
        self.validate()?;
        let mut carver = carver_for(self.algorithm)?;

        // Exit, rooms and carving all draw from this one generator, in that order.
        let mut rng = XorShiftRng::seed_from_u64(self.seed);

        let mut floorplan = Floorplan::new(self.width, self.height);
        floorplan.mark_borders();
        let exit = choose_exit(&floorplan, &mut rng);
        floorplan.designate_exit(exit);
        debug!("{}x{} maze from seed {}, exit at {}",
               self.width.0,
               self.height.0,
               self.seed,
               exit);

        if !self.perfect {
            let placed = place_rooms(&mut floorplan, &mut rng, self.max_rooms);
            debug!("placed {} of at most {} rooms", placed, self.max_rooms);
        }

        control.check_cancelled()?;
        carver.carve(&mut floorplan, &mut rng, control)?;
        debug!("carved {} passages", floorplan.passages_count());

        floorplan.delete_wall(exit);
        let distance = Distance::new(&floorplan, exit.cell)?;
        let start = distance.start();
        debug!("start at {}, {} steps from the exit", start, distance.max_distance());

        control.check_cancelled()?;
        control.report_progress(Percent(100));
        Ok(Maze::new(floorplan, distance, start, exit))
    }
}

/// A random outward facing wallboard: pick a side, then a cell along it.
fn choose_exit(floorplan: &Floorplan, rng: &mut XorShiftRng) -> Wallboard {
    let (width, height) = (floorplan.width().0 as u32, floorplan.height().0 as u32);
    let direction = CompassPrimary::rand_direction(rng);
    match direction {
        CompassPrimary::North => Wallboard::new(rng.gen_range(0..width), 0, direction),
        CompassPrimary::South => Wallboard::new(rng.gen_range(0..width), height - 1, direction),
        CompassPrimary::West => Wallboard::new(0, rng.gen_range(0..height), direction),
        CompassPrimary::East => Wallboard::new(width - 1, rng.gen_range(0..height), direction),
    }
}

/// Try to place up to `budget` rooms, giving up after a fixed number of attempts per room.
/// Rooms stay off the outer border and keep a corridor between each other.
fn place_rooms(floorplan: &mut Floorplan, rng: &mut XorShiftRng, budget: usize) -> usize {
    let (width, height) = (floorplan.width().0, floorplan.height().0);
    let max_w = (width / 4).min(MAX_ROOM_SIDE).max(MIN_ROOM_SIDE);
    let max_h = (height / 4).min(MAX_ROOM_SIDE).max(MIN_ROOM_SIDE);

    let mut placed = 0;
    for _ in 0..budget * ROOM_ATTEMPTS_PER_ROOM {
        if placed == budget {
            break;
        }
        let room_w = rng.gen_range(MIN_ROOM_SIDE..=max_w);
        let room_h = rng.gen_range(MIN_ROOM_SIDE..=max_h);
        // One column and row of border corridor either side.
        if room_w + 2 > width || room_h + 2 > height {
            continue;
        }
        let x = rng.gen_range(1..=width - 1 - room_w) as u32;
        let y = rng.gen_range(1..=height - 1 - room_h) as u32;
        let door_x = rng.gen_range(x..x + room_w as u32);
        let room = Room::new(x, y, room_w as u32, room_h as u32, door_x);

        if room.fits_inside_border(floorplan.width(), floorplan.height()) &&
           floorplan.rooms().iter().all(|other| !room.crowds(other)) {
            floorplan.mark_room(room);
            placed += 1;
        }
    }
    placed
}

#[cfg(test)]
mod tests {
    use super::*;
    use petgraph::algo::connected_components;
    use quickcheck::quickcheck;

    use crate::cells::{Cell, ALL_DIRECTIONS};
    use crate::pathing::INFINITE_DISTANCE;

    fn build(w: usize, h: usize, seed: u64, perfect: bool, rooms: usize) -> Maze {
        MazeBuilder::new(Width(w), Height(h))
            .seed(seed)
            .perfect(perfect)
            .max_rooms(rooms)
            .build(&BuildControl::detached())
            .unwrap()
    }

    fn outward_walls(maze: &Maze) -> Vec<Wallboard> {
        let fp = maze.floorplan();
        fp.iter()
            .flat_map(|cell| ALL_DIRECTIONS.iter().map(move |d| Wallboard { cell, direction: *d }))
            .filter(|wb| fp.is_outward(*wb))
            .collect()
    }

    #[test]
    fn only_the_exit_breaks_the_border() {
        let maze = build(12, 9, 4, false, 3);
        let open = outward_walls(&maze)
            .into_iter()
            .filter(|wb| !maze.has_wall(wb.cell.x, wb.cell.y, wb.direction))
            .collect::<Vec<_>>();
        assert_eq!(open, vec![maze.exit_wallboard()]);
        assert!(maze.is_exit_position(maze.exit_position().x, maze.exit_position().y));
    }

    #[test]
    fn every_cell_is_reachable() {
        let maze = build(20, 15, 11, false, 4);
        for cell in maze.floorplan().iter() {
            assert_ne!(maze.distance(cell.x, cell.y), INFINITE_DISTANCE);
            // No cell is boxed in on all four sides.
            assert!(ALL_DIRECTIONS.iter().any(|d| !maze.has_wall(cell.x, cell.y, *d)));
        }
        assert_eq!(connected_components(&maze.floorplan().passage_graph()), 1);
    }

    #[test]
    fn start_is_furthest_from_the_exit() {
        let maze = build(10, 10, 17, true, 0);
        let start = maze.start_position();
        let d = maze.distance(start.x, start.y);
        assert_eq!(maze.distance(maze.exit_position().x, maze.exit_position().y), 0);
        for cell in maze.floorplan().iter() {
            let dc = maze.distance(cell.x, cell.y);
            assert!(dc <= d);
            if dc == d {
                assert!(cell.row_major_index(maze.width()) >= start.row_major_index(maze.width()));
            }
        }
    }

    #[test]
    fn following_closer_neighbours_leads_out() {
        let maze = build(10, 8, 5, false, 2);
        let mut current = maze.start_position();
        let mut steps = 0;
        while let Some(next) = maze.neighbour_closer_to_exit(current.x, current.y) {
            assert_eq!(maze.distance(next.x, next.y) + 1, maze.distance(current.x, current.y));
            current = next;
            steps += 1;
        }
        assert_eq!(current, maze.exit_position());
        assert_eq!(steps, maze.distances().max_distance());
    }

    #[test]
    fn same_seed_same_maze() {
        let walls = |maze: &Maze| {
            maze.floorplan()
                .iter()
                .flat_map(|c| ALL_DIRECTIONS.iter().map(move |d| (c, *d)))
                .map(|(c, d)| maze.has_wall(c.x, c.y, d))
                .collect::<Vec<_>>()
        };
        let a = build(15, 15, 2024, false, 2);
        let b = build(15, 15, 2024, false, 2);
        assert_eq!(walls(&a), walls(&b));
        assert_eq!(a.exit_wallboard(), b.exit_wallboard());
        assert_eq!(a.start_position(), b.start_position());
        assert_eq!(a.floorplan().rooms(), b.floorplan().rooms());
    }

    #[test]
    fn perfect_mazes_have_no_rooms() {
        let maze = build(25, 20, 9, true, 5);
        assert!(maze.floorplan().rooms().is_empty());
        assert_eq!(maze.floorplan().passages_count(), 25 * 20 - 1);
    }

    #[test]
    fn rooms_are_placed_when_allowed() {
        let maze = build(40, 35, 1, false, 10);
        assert!(!maze.floorplan().rooms().is_empty());
        assert!(maze.floorplan().rooms().len() <= 10);
    }

    #[test]
    fn from_order_uses_the_skill_table() {
        use crate::factory::StubOrder;
        let order = StubOrder::new(0, Algorithm::Eller, true, 13);
        let builder = MazeBuilder::from_order(&order).unwrap();
        assert_eq!(builder.width(), Width(4));
        assert_eq!(builder.height(), Height(4));

        let bad_skill = StubOrder::new(-1, Algorithm::Eller, true, 13);
        assert!(MazeBuilder::from_order(&bad_skill).unwrap_err().is_invalid_request());
        let bad_algorithm = StubOrder::new(1, Algorithm::Dfs, true, 13);
        assert!(MazeBuilder::from_order(&bad_algorithm).unwrap_err().is_invalid_request());
    }

    #[test]
    fn degenerate_sizes_are_rejected() {
        let err = MazeBuilder::new(Width(0), Height(4)).build(&BuildControl::detached()).unwrap_err();
        assert!(err.is_invalid_request());
        let single = MazeBuilder::new(Width(1), Height(1)).build(&BuildControl::detached()).unwrap();
        assert_eq!(single.start_position(), Cell::new(0, 0));
        assert_eq!(single.exit_position(), Cell::new(0, 0));
    }

    fn has_single_door(maze: &Maze, room: &Room) -> bool {
        let fp = maze.floorplan();
        let openings = room.cells()
            .flat_map(|cell| ALL_DIRECTIONS.iter().map(move |d| Wallboard { cell, direction: *d }))
            .filter(|wb| fp.neighbour(wb.cell, wb.direction).map_or(true, |n| !room.contains(n)))
            .filter(|wb| !fp.has_wall(wb.cell.x, wb.cell.y, wb.direction))
            .collect::<Vec<_>>();
        openings == vec![room.door]
    }

    quickcheck! {
        fn rooms_always_have_exactly_one_door(seed: u64) -> bool {
            let maze = build(30, 25, seed, false, 6);
            maze.floorplan().rooms().iter().all(|room| has_single_door(&maze, room)) &&
                maze.floorplan().iter().all(|c| maze.distance(c.x, c.y) != INFINITE_DISTANCE)
        }
    }
}
