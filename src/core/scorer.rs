use crate::domain::model::{ClassificationEntry, MarkerStatus};

/// 健康分數的計數明細
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScoreTally {
    pub within: usize,
    /// Entries with a found value, `unknown` ones included.
    pub total: usize,
}

impl ScoreTally {
    pub fn from_entries(entries: &[ClassificationEntry]) -> Self {
        entries.iter().fold(Self::default(), |mut tally, entry| {
            if entry.value.is_some() {
                tally.total += 1;
            }
            if entry.status == MarkerStatus::Normal {
                tally.within += 1;
            }
            tally
        })
    }

    /// 整數除法，無條件捨去
    pub fn score(&self) -> u32 {
        if self.total == 0 {
            return 0;
        }
        (self.within * 100 / self.total) as u32
    }
}

pub fn score(entries: &[ClassificationEntry]) -> (u32, usize) {
    let tally = ScoreTally::from_entries(entries);
    (tally.score(), tally.total)
}
