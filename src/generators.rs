use error_chain::bail;
use log::{error, trace};
use rand::Rng;
use rand_xorshift::XorShiftRng;

use crate::cells::{Cell, CompassPrimary, Wallboard};
use crate::errors::*;
use crate::factory::BuildControl;
use crate::floorplan::Floorplan;
use crate::sets::{CellSets, SetId};
use crate::units::{Percent, RowIndex};
use crate::utils::{fnv_hashmap, FnvHashMap};

/// Maze generation algorithms an order can ask for. Only `Eller` has a carver.
#[derive(Hash, Eq, PartialEq, Copy, Clone, Debug)]
pub enum Algorithm {
    Dfs,
    Prim,
    Eller,
}

impl Algorithm {
    pub fn is_supported(self) -> bool {
        self == Algorithm::Eller
    }
}

/// Carves passages into a floorplan whose borders, exit and rooms are already in place.
///
/// A carver must never tear down a wall that `Floorplan::can_tear_down` protects, must leave
/// every cell reachable from every other, and must draw all of its randomness from `rng` so the
/// same seed always carves the same maze.
pub trait Carver {
    fn carve(&mut self,
             floorplan: &mut Floorplan,
             rng: &mut XorShiftRng,
             control: &BuildControl)
             -> Result<()>;
}

/// The carver for an algorithm, or `UnsupportedAlgorithm`.
pub fn carver_for(algorithm: Algorithm) -> Result<Box<dyn Carver + Send>> {
    match algorithm {
        Algorithm::Eller => Ok(Box::new(EllerGenerator::new())),
        other => bail!(ErrorKind::UnsupportedAlgorithm(other)),
    }
}

pub const DEFAULT_MERGE_PROBABILITY: f64 = 0.5;
pub const DEFAULT_DESCEND_PROBABILITY: f64 = 0.5;

/// Eller's algorithm: one row at a time, keeping track of which cells of the current row are
/// already connected (share a set) so that every set is carried down into the next row and the
/// last row ties all the remaining sets together.
///
/// Rooms take part as single pre-connected sets; their perimeter walls are never carved except
/// for the room door.
#[derive(Debug, Clone)]
pub struct EllerGenerator {
    merge_probability: f64,
    descend_probability: f64,
    sets: Option<CellSets>,
}

impl Default for EllerGenerator {
    fn default() -> EllerGenerator {
        EllerGenerator::new()
    }
}

impl EllerGenerator {
    pub fn new() -> EllerGenerator {
        EllerGenerator::with_probabilities(DEFAULT_MERGE_PROBABILITY, DEFAULT_DESCEND_PROBABILITY)
    }

    /// `merge` is the chance of joining two horizontally adjacent sets, `descend` the chance of
    /// carving down from a cell. Both must lie in 0.0..=1.0.
    pub fn with_probabilities(merge: f64, descend: f64) -> EllerGenerator {
        assert!((0.0..=1.0).contains(&merge), "merge probability {} out of range", merge);
        assert!((0.0..=1.0).contains(&descend), "descend probability {} out of range", descend);
        EllerGenerator {
            merge_probability: merge,
            descend_probability: descend,
            sets: None,
        }
    }

    /// The cell sets left by the last successful carve.
    pub fn sets(&self) -> Option<&CellSets> {
        self.sets.as_ref()
    }

    fn merge_across(&self, floorplan: &mut Floorplan, sets: &mut CellSets, rng: &mut XorShiftRng, y: u32) {
        let width = floorplan.width().0 as u32;
        for x in 0..width.saturating_sub(1) {
            let (a, b) = (Cell::new(x, y), Cell::new(x + 1, y));
            if sets.same_set(a, b) {
                continue;
            }
            let wb = Wallboard { cell: a, direction: CompassPrimary::East };
            let merge = if share_room(floorplan, a, b) || floorplan.has_no_wall(x, y, CompassPrimary::East) {
                true
            } else {
                floorplan.can_tear_down(wb) && rng.gen_bool(self.merge_probability)
            };
            if merge {
                join_through(floorplan, sets, wb, b);
            }
        }
    }

    fn descend(&self,
               floorplan: &mut Floorplan,
               sets: &mut CellSets,
               rng: &mut XorShiftRng,
               y: u32)
               -> Result<()> {
        let width = floorplan.width().0 as u32;

        let mut last_in_row: FnvHashMap<SetId, u32> = fnv_hashmap(width as usize);
        for x in 0..width {
            let _ = last_in_row.insert(row_set(sets, x, y), x);
        }
        let mut linked: FnvHashMap<SetId, bool> = fnv_hashmap(last_in_row.len());

        for x in 0..width {
            let upper = Cell::new(x, y);
            let below = Cell::new(x, y + 1);
            let wb = Wallboard { cell: upper, direction: CompassPrimary::South };

            let carve = if share_room(floorplan, upper, below) || floorplan.has_no_wall(x, y, CompassPrimary::South) {
                true
            } else {
                floorplan.can_tear_down(wb) && rng.gen_bool(self.descend_probability)
            };
            if carve {
                link_down(floorplan, sets, upper, &mut last_in_row, &mut linked);
            }

            let id = row_set(sets, x, y);
            let is_last = last_in_row.get(&id) == Some(&x);
            if is_last && !linked.get(&id).cloned().unwrap_or(false) {
                let forced = (0..=x)
                    .rev()
                    .map(|cx| Cell::new(cx, y))
                    .find(|c| {
                        sets.set_of(*c) == Some(id) &&
                        floorplan.can_tear_down(Wallboard { cell: *c, direction: CompassPrimary::South })
                    });
                match forced {
                    Some(cell) => {
                        trace!("forcing a passage down from {}", cell);
                        link_down(floorplan, sets, cell, &mut last_in_row, &mut linked);
                    }
                    None => {
                        error!("set {} in row {} has no way down", id, y);
                        bail!(ErrorKind::DisconnectedSets(sets.set_count()));
                    }
                }
            }
        }
        Ok(())
    }

    /// Sets whose row `y` cells all stand on protected south walls can only continue sideways.
    fn rescue_stranded(&self, floorplan: &mut Floorplan, sets: &mut CellSets, y: u32) -> Result<()> {
        let width = floorplan.width().0 as u32;
        while let Some(stranded) = stranded_set(floorplan, sets, y) {
            let bridge = (0..width).map(|x| Cell::new(x, y))
                .filter(|cell| sets.set_of(*cell) == Some(stranded))
                .flat_map(|cell| {
                    [CompassPrimary::East, CompassPrimary::West]
                        .iter()
                        .map(move |dir| Wallboard { cell, direction: *dir })
                        .collect::<Vec<_>>()
                })
                .filter_map(|wb| floorplan.neighbour(wb.cell, wb.direction).map(|n| (wb, n)))
                .find(|&(wb, n)| !sets.same_set(wb.cell, n) && floorplan.can_tear_down(wb));

            match bridge {
                Some((wb, neighbour)) => {
                    trace!("set {} in row {} is stranded, opening {}", stranded, y, wb);
                    join_through(floorplan, sets, wb, neighbour);
                }
                None => {
                    error!("set {} in row {} is walled in", stranded, y);
                    bail!(ErrorKind::DisconnectedSets(sets.set_count()));
                }
            }
        }
        Ok(())
    }

    fn close_last_row(&self, floorplan: &mut Floorplan, sets: &mut CellSets, y: u32) {
        let width = floorplan.width().0 as u32;
        for x in 0..width.saturating_sub(1) {
            let (a, b) = (Cell::new(x, y), Cell::new(x + 1, y));
            let wb = Wallboard { cell: a, direction: CompassPrimary::East };
            if !sets.same_set(a, b) &&
               (floorplan.has_no_wall(x, y, CompassPrimary::East) || floorplan.can_tear_down(wb)) {
                join_through(floorplan, sets, wb, b);
            }
        }
    }
}

impl Carver for EllerGenerator {
    fn carve(&mut self,
             floorplan: &mut Floorplan,
             rng: &mut XorShiftRng,
             control: &BuildControl)
             -> Result<()> {
        let (width, height) = (floorplan.width(), floorplan.height());
        if floorplan.size() == 0 {
            bail!(ErrorKind::InvalidDimensions(width.0, height.0));
        }
        self.sets = None;

        let mut sets = CellSets::new(width, height);
        for room in floorplan.rooms() {
            let _ = sets.new_group(room.cells());
        }
        seed_row(&mut sets, width.0 as u32, 0);

        let last_row = height.0 as u32 - 1;
        for y in 0..last_row {
            control.check_cancelled()?;
            self.merge_across(floorplan, &mut sets, rng, y);
            self.rescue_stranded(floorplan, &mut sets, y)?;
            self.descend(floorplan, &mut sets, rng, y)?;
            seed_row(&mut sets, width.0 as u32, y + 1);
            trace!("row {} carved, {} sets live", y, sets.set_count());
            control.report_progress(Percent::of_rows(RowIndex(y as usize + 1), height));
        }
        control.check_cancelled()?;
        self.close_last_row(floorplan, &mut sets, last_row);

        if sets.assigned_count() != floorplan.size() || sets.set_count() != 1 {
            error!("carving left {} sets over {} of {} cells",
                   sets.set_count(),
                   sets.assigned_count(),
                   floorplan.size());
            bail!(ErrorKind::DisconnectedSets(sets.set_count()));
        }
        self.sets = Some(sets);
        Ok(())
    }
}

fn seed_row(sets: &mut CellSets, width: u32, y: u32) {
    for x in 0..width {
        let cell = Cell::new(x, y);
        if !sets.is_assigned(cell) {
            let _ = sets.new_set(cell);
        }
    }
}

#[inline]
fn row_set(sets: &CellSets, x: u32, y: u32) -> SetId {
    sets.set_of(Cell::new(x, y)).expect("every cell of the current row is assigned")
}

fn share_room(floorplan: &Floorplan, a: Cell, b: Cell) -> bool {
    floorplan.room_at(a).map_or(false, |room| room.contains(b))
}

/// Open `wb` (if it is still standing) and merge the sets either side of it.
fn join_through(floorplan: &mut Floorplan, sets: &mut CellSets, wb: Wallboard, neighbour: Cell) {
    floorplan.delete_wall(wb);
    let _ = sets.merge(wb.cell, neighbour);
}

/// Connect `upper` with the cell below it, which either joins `upper`'s set or, if it already
/// belongs to a set, merges with it. The row bookkeeping follows the surviving set id.
fn link_down(floorplan: &mut Floorplan,
             sets: &mut CellSets,
             upper: Cell,
             last_in_row: &mut FnvHashMap<SetId, u32>,
             linked: &mut FnvHashMap<SetId, bool>) {
    let below = Cell::new(upper.x, upper.y + 1);
    floorplan.delete_wall(Wallboard { cell: upper, direction: CompassPrimary::South });

    let before = row_set(sets, upper.x, upper.y);
    let after = match sets.set_of(below) {
        None => {
            sets.join(below, before);
            before
        }
        Some(_) => sets.merge(upper, below),
    };
    if after != before {
        if let Some(last) = last_in_row.remove(&before) {
            let entry = last_in_row.entry(after).or_insert(last);
            *entry = (*entry).max(last);
        }
        let _ = linked.remove(&before);
    }
    let _ = linked.insert(after, true);
}

fn stranded_set(floorplan: &Floorplan, sets: &CellSets, y: u32) -> Option<SetId> {
    let width = floorplan.width().0 as u32;
    let mut can_descend: FnvHashMap<SetId, bool> = fnv_hashmap(width as usize);
    let mut order = vec![];
    for x in 0..width {
        let id = row_set(sets, x, y);
        let wb = Wallboard::new(x, y, CompassPrimary::South);
        let open = floorplan.has_no_wall(x, y, CompassPrimary::South) || floorplan.can_tear_down(wb);
        let entry = can_descend.entry(id).or_insert_with(|| {
            order.push(id);
            false
        });
        *entry = *entry || open;
    }
    order.into_iter().find(|id| !can_descend[id])
}
