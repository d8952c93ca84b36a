// Other modules in this crate `use crate::errors::*;` to get the Error, ErrorKind, ResultExt and
// Result types `error_chain!` creates.
#![allow(deprecated)]

use error_chain::*;

use crate::generators::Algorithm;
use crate::skill;

error_chain! {

    errors {
        InvalidSkillLevel(level: i32) {
            description("invalid skill level")
            display("skill level {} is outside the supported range 0..={}", level, skill::MAX_SKILL_LEVEL)
        }
        UnsupportedAlgorithm(algorithm: Algorithm) {
            description("unsupported maze generation algorithm")
            display("maze generation algorithm {:?} is not supported", algorithm)
        }
        InvalidDimensions(width: usize, height: usize) {
            description("invalid maze dimensions")
            display("a {}x{} maze has no cells", width, height)
        }
        DisconnectedSets(sets: usize) {
            description("carving finished with more than one cell set")
            display("carving finished with {} cell sets instead of 1", sets)
        }
        UnreachableCells(count: usize) {
            description("cells are unreachable from the exit")
            display("{} cells are unreachable from the exit", count)
        }
        WorkerPanicked {
            description("the maze build worker panicked")
            display("the maze build worker panicked")
        }
        Cancelled {
            description("the maze build was cancelled")
            display("the maze build was cancelled")
        }
    }
}

impl Error {
    /// A malformed request, rejected before any work was started.
    pub fn is_invalid_request(&self) -> bool {
        matches!(*self.kind(),
                 ErrorKind::InvalidSkillLevel(_) |
                 ErrorKind::UnsupportedAlgorithm(_) |
                 ErrorKind::InvalidDimensions(_, _))
    }

    /// A broken generation invariant. Retrying with the same seed reproduces it.
    pub fn is_internal_consistency(&self) -> bool {
        matches!(*self.kind(),
                 ErrorKind::DisconnectedSets(_) |
                 ErrorKind::UnreachableCells(_) |
                 ErrorKind::WorkerPanicked)
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(*self.kind(), ErrorKind::Cancelled)
    }
}
