#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub struct Width(pub usize);
#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub struct Height(pub usize);

#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub struct RowIndex(pub usize);
#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub struct ColumnIndex(pub usize);

#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub struct SkillLevel(pub i32);

/// Percentage of a build completed, 0 to 100 inclusive.
#[derive(Eq, PartialEq, Ord, PartialOrd, Copy, Clone, Debug)]
pub struct Percent(pub u8);

impl Percent {
    pub fn of_rows(done: RowIndex, total: Height) -> Percent {
        if total.0 == 0 {
            return Percent(100);
        }
        let scaled = (done.0.min(total.0) * 100) / total.0;
        Percent(scaled as u8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_of_rows() {
        assert_eq!(Percent::of_rows(RowIndex(0), Height(4)), Percent(0));
        assert_eq!(Percent::of_rows(RowIndex(1), Height(4)), Percent(25));
        assert_eq!(Percent::of_rows(RowIndex(4), Height(4)), Percent(100));
        assert_eq!(Percent::of_rows(RowIndex(9), Height(4)), Percent(100));
        assert_eq!(Percent::of_rows(RowIndex(0), Height(0)), Percent(100));
    }
}
