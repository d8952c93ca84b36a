//! Fixed tables mapping a skill level to the size of the maze built for it.

use error_chain::bail;

use crate::errors::*;
use crate::units::{Height, SkillLevel, Width};

pub const MAX_SKILL_LEVEL: i32 = 15;

const SKILL_WIDTH: [usize; 16] = [4, 12, 15, 20, 25, 25, 35, 35, 40, 60, 70, 80, 90, 110, 150, 300];
const SKILL_HEIGHT: [usize; 16] = [4, 12, 15, 15, 20, 25, 25, 35, 35, 40, 60, 70, 75, 75, 90, 120];
const SKILL_ROOMS: [usize; 16] = [0, 2, 2, 3, 4, 5, 10, 10, 20, 25, 45, 45, 50, 50, 60, 80];

#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub struct SkillDimensions {
    pub width: Width,
    pub height: Height,
    /// Upper bound on the rooms placed when the maze is not perfect.
    pub max_rooms: usize,
}

pub fn dimensions(level: SkillLevel) -> Result<SkillDimensions> {
    let SkillLevel(raw) = level;
    if raw < 0 || raw > MAX_SKILL_LEVEL {
        bail!(ErrorKind::InvalidSkillLevel(raw));
    }
    let i = raw as usize;
    Ok(SkillDimensions {
        width: Width(SKILL_WIDTH[i]),
        height: Height(SKILL_HEIGHT[i]),
        max_rooms: SKILL_ROOMS[i],
    })
}
