// Scores, tiers, and the per-row score sheet.

use serde::{Deserialize, Serialize};

/// Lowest score the fine control accepts.
pub const MIN_SCORE: u8 = 0;
/// Highest score the fine control accepts.
pub const MAX_SCORE: u8 = 15;

// ---------------------------------------------------------------------------
// Tier
// ---------------------------------------------------------------------------

/// Coarse score band. Choosing a tier seeds the fine control with the
/// band's default score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tier {
    Poor,
    BelowAverage,
    Average,
    AboveAverage,
    Excellent,
}

impl Tier {
    /// All tiers, lowest first.
    pub const ALL: [Tier; 5] = [
        Tier::Poor,
        Tier::BelowAverage,
        Tier::Average,
        Tier::AboveAverage,
        Tier::Excellent,
    ];

    pub fn default_score(self) -> u8 {
        match self {
            Tier::Poor => 2,
            Tier::BelowAverage => 5,
            Tier::Average => 8,
            Tier::AboveAverage => 11,
            Tier::Excellent => 14,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Tier::Poor => "Poor",
            Tier::BelowAverage => "Below average",
            Tier::Average => "Average",
            Tier::AboveAverage => "Above average",
            Tier::Excellent => "Excellent",
        }
    }

    /// Look up a tier by its 1-based position (1 = Poor .. 5 = Excellent).
    pub fn from_number(n: u8) -> Option<Tier> {
        let idx = usize::from(n).checked_sub(1)?;
        Tier::ALL.get(idx).copied()
    }
}

// ---------------------------------------------------------------------------
// Score
// ---------------------------------------------------------------------------

/// A row's score: either not yet graded, or a value in
/// `MIN_SCORE..=MAX_SCORE`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Score {
    #[default]
    Unscored,
    Graded(u8),
}

impl Score {
    /// Construct a graded score, clamping into the valid range.
    pub fn graded(value: u8) -> Score {
        Score::Graded(value.clamp(MIN_SCORE, MAX_SCORE))
    }

    pub fn value(self) -> Option<u8> {
        match self {
            Score::Unscored => None,
            Score::Graded(v) => Some(v),
        }
    }

    pub fn is_graded(self) -> bool {
        matches!(self, Score::Graded(_))
    }
}

// ---------------------------------------------------------------------------
// ScoreEntry / ScoreSheet
// ---------------------------------------------------------------------------

/// What the grader has entered for one row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub score: Score,
    /// The tier most recently selected for this row, if any.
    pub tier: Option<Tier>,
}

impl ScoreEntry {
    /// The value the fine control shows for this row: the stored score,
    /// else the selected tier's default, else the lowest tier's default.
    pub fn fine_value(&self) -> u8 {
        match self.score {
            Score::Graded(v) => v,
            Score::Unscored => self.tier.unwrap_or(Tier::Poor).default_score(),
        }
    }
}

/// One entry per table row. Its length always matches the loaded table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreSheet {
    entries: Vec<ScoreEntry>,
}

impl ScoreSheet {
    /// A sheet of `len` unscored rows.
    pub fn unscored(len: usize) -> Self {
        ScoreSheet {
            entries: vec![ScoreEntry::default(); len],
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ScoreEntry> {
        self.entries.get(index)
    }

    pub fn entries(&self) -> &[ScoreEntry] {
        &self.entries
    }

    /// Number of rows holding a graded score.
    pub fn graded_count(&self) -> usize {
        self.entries.iter().filter(|e| e.score.is_graded()).count()
    }

    /// Record a tier selection. The fine control takes the tier's default,
    /// which becomes the row's score. Returns the new score.
    pub fn select_tier(&mut self, index: usize, tier: Tier) -> Option<u8> {
        let entry = self.entries.get_mut(index)?;
        let value = tier.default_score();
        entry.tier = Some(tier);
        entry.score = Score::graded(value);
        Some(value)
    }

    /// Set the fine value directly (clamped). Returns the stored value.
    pub fn set(&mut self, index: usize, value: u8) -> Option<u8> {
        let entry = self.entries.get_mut(index)?;
        entry.score = Score::graded(value);
        entry.score.value()
    }

    /// Step the fine value by `delta` from what the control currently shows,
    /// saturating at the ends of the range. Returns the stored value.
    pub fn adjust(&mut self, index: usize, delta: i16) -> Option<u8> {
        let entry = self.entries.get_mut(index)?;
        let next = (i16::from(entry.fine_value()) + delta)
            .clamp(i16::from(MIN_SCORE), i16::from(MAX_SCORE));
        // In range after the clamp above.
        entry.score = Score::Graded(next as u8);
        entry.score.value()
    }

    /// Return a row to unscored. The tier selection is kept so the fine
    /// control still shows its default. Returns whether the row existed.
    pub fn clear(&mut self, index: usize) -> bool {
        match self.entries.get_mut(index) {
            Some(entry) => {
                entry.score = Score::Unscored;
                true
            }
            None => false,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
