//! The cell set bookkeeping used while carving: a cell to set-id table plus the reverse set-id to
//! member cells table. A union-find without path compression, since carving needs to list the
//! members of a set.

use crate::cells::Cell;
use crate::units::{Height, Width};
use crate::utils::{fnv_hashmap, fnv_hashset, FnvHashMap, FnvHashSet};

pub type SetId = u32;

#[derive(Clone, Debug)]
pub struct CellSets {
    width: Width,
    height: Height,
    cell_to_set: Vec<Option<SetId>>,
    id_to_set: FnvHashMap<SetId, FnvHashSet<usize>>,
    next_id: SetId,
}

impl CellSets {
    pub fn new(width: Width, height: Height) -> CellSets {
        let cells_count = width.0 * height.0;
        CellSets {
            width,
            height,
            cell_to_set: vec![None; cells_count],
            id_to_set: fnv_hashmap(width.0),
            next_id: 1,
        }
    }

    /// Put an unassigned cell into a new set of its own.
    ///
    /// Panics if the cell already belongs to a set.
    pub fn new_set(&mut self, cell: Cell) -> SetId {
        self.new_group(Some(cell))
    }

    /// Put a group of unassigned cells together into one new set.
    pub fn new_group<I: IntoIterator<Item = Cell>>(&mut self, cells: I) -> SetId {
        let id = self.next_id;
        self.next_id += 1;

        let mut members = fnv_hashset(1);
        for cell in cells {
            let index = self.index(cell);
            assert!(self.cell_to_set[index].is_none(), "cell {} already has a set", cell);
            self.cell_to_set[index] = Some(id);
            let _ = members.insert(index);
        }
        let _ = self.id_to_set.insert(id, members);
        id
    }

    #[inline]
    pub fn set_of(&self, cell: Cell) -> Option<SetId> {
        self.cell_to_set[self.index(cell)]
    }

    #[inline]
    pub fn is_assigned(&self, cell: Cell) -> bool {
        self.set_of(cell).is_some()
    }

    /// Are both cells assigned to the same set?
    pub fn same_set(&self, a: Cell, b: Cell) -> bool {
        match (self.set_of(a), self.set_of(b)) {
            (Some(set_a), Some(set_b)) => set_a == set_b,
            _ => false,
        }
    }

    /// Add an unassigned cell to an existing set.
    pub fn join(&mut self, cell: Cell, id: SetId) {
        let index = self.index(cell);
        assert!(self.cell_to_set[index].is_none(), "cell {} already has a set", cell);
        let members = self.id_to_set.get_mut(&id).expect("joining a set that does not exist");
        let _ = members.insert(index);
        self.cell_to_set[index] = Some(id);
    }

    /// Merge the sets holding `a` and `b`, returning the id that survives. The smaller set is
    /// folded into the larger one and its id is dropped, so the surviving label follows set
    /// size rather than the lower id. Which label survives never changes the carved maze.
    ///
    /// Panics if either cell is unassigned.
    pub fn merge(&mut self, a: Cell, b: Cell) -> SetId {
        let id_a = self.set_of(a).expect("merging an unassigned cell");
        let id_b = self.set_of(b).expect("merging an unassigned cell");
        if id_a == id_b {
            return id_a;
        }

        let (keep, absorb) = if self.set_len(id_a) >= self.set_len(id_b) {
            (id_a, id_b)
        } else {
            (id_b, id_a)
        };

        let absorbed = self.id_to_set.remove(&absorb).expect("set id has no members");
        for index in &absorbed {
            self.cell_to_set[*index] = Some(keep);
        }
        self.id_to_set
            .get_mut(&keep)
            .expect("set id has no members")
            .extend(absorbed);
        keep
    }

    /// The cells of a set, in no particular order.
    pub fn members(&self, id: SetId) -> impl Iterator<Item = Cell> + '_ {
        let width = self.width;
        self.id_to_set
            .get(&id)
            .into_iter()
            .flat_map(|members| members.iter())
            .map(move |index| Cell::from_row_major_index(*index, width))
    }

    pub fn set_len(&self, id: SetId) -> usize {
        self.id_to_set.get(&id).map_or(0, |members| members.len())
    }

    /// Number of cells that belong to some set.
    pub fn assigned_count(&self) -> usize {
        self.cell_to_set.iter().filter(|id| id.is_some()).count()
    }

    /// Number of distinct sets.
    pub fn set_count(&self) -> usize {
        self.id_to_set.len()
    }

    /// Do the two tables agree with each other?
    pub fn is_consistent(&self) -> bool {
        let forward = self.cell_to_set
            .iter()
            .enumerate()
            .filter_map(|(index, id)| id.map(|id| (index, id)))
            .all(|(index, id)| self.id_to_set.get(&id).map_or(false, |m| m.contains(&index)));
        let backward = self.id_to_set
            .iter()
            .all(|(id, members)| {
                !members.is_empty() && members.iter().all(|index| self.cell_to_set[*index] == Some(*id))
            });
        forward && backward
    }

    #[inline]
    fn index(&self, cell: Cell) -> usize {
        assert!(cell.is_within(self.width, self.height), "cell {} is off the grid", cell);
        cell.row_major_index(self.width)
    }
}
