//! **mazegen** builds rectangular mazes for a maze solving game.
//!
//! A maze is carved row by row with Eller's algorithm into a floorplan whose outer border,
//! exit and optional rooms are fixed up front. A breadth first flood fill from the exit then
//! places the start as far from it as possible. `MazeFactory` runs builds off the caller's
//! thread on behalf of an `Order`.

pub mod builder;
pub mod cells;
pub mod errors;
pub mod factory;
pub mod floorplan;
pub mod generators;
pub mod maze;
pub mod pathing;
pub mod sets;
pub mod skill;
pub mod units;
mod utils;

pub use crate::builder::MazeBuilder;
pub use crate::factory::{BuildControl, CancelHandle, Completion, MazeFactory, Order, StubOrder};
pub use crate::generators::Algorithm;
pub use crate::maze::Maze;
