//! Selector rows and the forward cascade that keeps them ascending.
//!
//! A [`SelectionSet`] holds N rows over a field of a given length. Each row
//! offers `{none} ∪ {floor..=length}` as candidates, where the floor is one
//! past the nearest earlier selected row (or 1). Changing a row re-floors
//! every later row and clears any choice that fell out of range, so for any
//! two selected rows `i < j` the chosen index of `i` is below that of `j`.
//!
//! Rows whose number is at least the field length can never hold a choice:
//! there are not enough characters for them to be distinct.
//!
//! [`SelectionSet::with_choice`] is a pure function; callers commit the
//! returned set only once everything derived from it has succeeded.

use crate::error::RevealError;

/// Index value meaning "no character selected".
pub const NONE: usize = 0;

/// One selector row: its position, current floor and chosen index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectorRow {
    row: usize,
    floor: usize,
    chosen: usize,
}

impl SelectorRow {
    fn new(row: usize) -> Self {
        Self {
            row,
            floor: 1,
            chosen: NONE,
        }
    }

    /// Position of the row in the set.
    pub fn row(&self) -> usize {
        self.row
    }

    /// Lowest selectable character position.
    pub fn floor(&self) -> usize {
        self.floor
    }

    /// The chosen position, or [`NONE`].
    pub fn chosen(&self) -> usize {
        self.chosen
    }

    /// Whether a character is selected.
    pub fn is_selected(&self) -> bool {
        self.chosen != NONE
    }
}

/// Ordered selector rows over a field of `length` characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionSet {
    length: usize,
    rows: Vec<SelectorRow>,
}

impl SelectionSet {
    /// Create `rows` rows, all set to none, over a field of `length`.
    pub fn new(rows: usize, length: usize) -> Self {
        Self {
            length,
            rows: (0..rows).map(SelectorRow::new).collect(),
        }
    }

    /// Number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Length of the field the rows select from.
    pub fn field_length(&self) -> usize {
        self.length
    }

    /// All rows, in order.
    pub fn rows(&self) -> &[SelectorRow] {
        &self.rows
    }

    /// The given row, if it exists.
    pub fn row(&self, row: usize) -> Option<&SelectorRow> {
        self.rows.get(row)
    }

    /// Rows holding a choice, in row order.
    pub fn selected(&self) -> impl Iterator<Item = &SelectorRow> + '_ {
        self.rows.iter().filter(|r| r.is_selected())
    }

    /// Whether any row holds a choice.
    pub fn has_selection(&self) -> bool {
        self.rows.iter().any(SelectorRow::is_selected)
    }

    /// Whether the row offers anything beyond none.
    pub fn is_enabled(&self, row: usize) -> bool {
        self.rows
            .get(row)
            .is_some_and(|r| self.accepts_positions(r) && r.floor <= self.length)
    }

    /// Whether `index` is currently selectable on `row`.
    pub fn is_candidate(&self, row: usize, index: usize) -> bool {
        match self.rows.get(row) {
            None => false,
            Some(_) if index == NONE => true,
            Some(r) => self.accepts_positions(r) && r.floor <= index && index <= self.length,
        }
    }

    /// The row's candidate list, starting with [`NONE`].
    pub fn candidates(&self, row: usize) -> Result<Vec<usize>, RevealError> {
        let r = self.rows.get(row).ok_or(RevealError::UnknownRow {
            row,
            rows: self.rows.len(),
        })?;

        let mut candidates = vec![NONE];
        if self.accepts_positions(r) {
            candidates.extend(r.floor..=self.length);
        }
        Ok(candidates)
    }

    /// Return the set that results from choosing `index` on `row`.
    ///
    /// Later rows are re-floored to one past the nearest selected row above
    /// them; a later choice below its new floor is reset to none and the
    /// cascade continues from there. Earlier rows are never touched.
    ///
    /// # Errors
    ///
    /// `UnknownRow` if the row does not exist, `InvalidSelection` if
    /// `index` is not one of its current candidates. `self` is unchanged
    /// either way.
    pub fn with_choice(&self, row: usize, index: usize) -> Result<SelectionSet, RevealError> {
        if row >= self.rows.len() {
            return Err(RevealError::UnknownRow {
                row,
                rows: self.rows.len(),
            });
        }
        if !self.is_candidate(row, index) {
            return Err(RevealError::InvalidSelection { row, index });
        }

        let mut next = self.clone();
        let changed = &mut next.rows[row];
        changed.chosen = index;

        // Clearing a row passes its own floor down rather than resetting to 1
        let mut floor = if index == NONE {
            changed.floor
        } else {
            index + 1
        };

        let length = next.length;
        for later in next.rows[row + 1..].iter_mut() {
            later.floor = floor;
            let still_valid = later.row < length && later.chosen >= floor && later.chosen <= length;
            if later.is_selected() && !still_valid {
                later.chosen = NONE;
            }
            if later.is_selected() {
                floor = later.chosen + 1;
            }
        }

        Ok(next)
    }

    fn accepts_positions(&self, row: &SelectorRow) -> bool {
        row.row < self.length
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn choose(set: &SelectionSet, choices: &[(usize, usize)]) -> SelectionSet {
        choices.iter().fold(set.clone(), |acc, &(row, index)| {
            acc.with_choice(row, index).expect("choice should be valid")
        })
    }

    fn chosen(set: &SelectionSet) -> Vec<usize> {
        set.rows().iter().map(SelectorRow::chosen).collect()
    }

    fn assert_ascending(set: &SelectionSet) {
        let picked: Vec<usize> = set.selected().map(SelectorRow::chosen).collect();
        assert!(
            picked.windows(2).all(|w| w[0] < w[1]),
            "selections not ascending: {:?}",
            picked
        );
        assert!(picked.iter().all(|&p| p >= 1 && p <= set.field_length()));
        assert!(picked.len() <= set.field_length());
    }

    #[test]
    fn new_set_offers_full_range() {
        let set = SelectionSet::new(4, 11);
        assert_eq!(set.row_count(), 4);
        assert!(!set.has_selection());
        let expected: Vec<usize> = (0..=11).collect();
        for row in 0..4 {
            assert_eq!(set.candidates(row).unwrap(), expected);
            assert!(set.is_enabled(row));
        }
    }

    #[test]
    fn choosing_refloors_later_rows() {
        let set = choose(&SelectionSet::new(4, 11), &[(0, 2)]);
        assert_eq!(set.candidates(1).unwrap()[1], 3);
        assert_eq!(set.candidates(3).unwrap()[1], 3);
        assert_eq!(set.row(0).unwrap().floor(), 1);

        let set = choose(&set, &[(1, 4)]);
        assert_eq!(chosen(&set), vec![2, 4, 0, 0]);
        assert_eq!(set.candidates(2).unwrap()[1], 5);
        assert_eq!(set.candidates(0).unwrap()[1], 1);
    }

    #[test]
    fn maximum_index_disables_later_rows() {
        let set = choose(&SelectionSet::new(4, 3), &[(0, 3)]);
        for row in 1..4 {
            assert_eq!(set.candidates(row).unwrap(), vec![NONE]);
            assert!(!set.is_enabled(row));
        }
    }

    #[test]
    fn rows_beyond_length_are_permanently_disabled() {
        let set = SelectionSet::new(4, 2);
        assert!(set.is_enabled(0));
        assert!(set.is_enabled(1));
        assert!(!set.is_enabled(2));
        assert_eq!(set.candidates(3).unwrap(), vec![NONE]);
        assert!(matches!(
            set.with_choice(2, 1),
            Err(RevealError::InvalidSelection { row: 2, index: 1 })
        ));
    }

    #[test]
    fn empty_field_offers_only_none() {
        let set = SelectionSet::new(4, 0);
        for row in 0..4 {
            assert_eq!(set.candidates(row).unwrap(), vec![NONE]);
        }
        assert_eq!(set.with_choice(0, NONE).unwrap(), set);
    }

    #[test]
    fn clearing_row_zero_with_nothing_selected_is_a_noop() {
        let set = SelectionSet::new(4, 11);
        assert_eq!(set.with_choice(0, NONE).unwrap(), set);
    }

    #[test]
    fn invalid_choice_leaves_set_unchanged() {
        let set = SelectionSet::new(4, 3);
        let before = set.clone();
        assert!(matches!(
            set.with_choice(0, 5),
            Err(RevealError::InvalidSelection { row: 0, index: 5 })
        ));
        assert_eq!(set, before);
    }

    #[test]
    fn index_below_floor_is_invalid() {
        let set = choose(&SelectionSet::new(4, 11), &[(0, 5)]);
        assert!(set.with_choice(1, 5).is_err());
        assert!(set.with_choice(1, 3).is_err());
        assert!(set.with_choice(1, 6).is_ok());
    }

    #[test]
    fn unknown_row_is_reported() {
        let set = SelectionSet::new(4, 11);
        assert!(matches!(
            set.with_choice(4, 1),
            Err(RevealError::UnknownRow { row: 4, rows: 4 })
        ));
        assert!(set.candidates(7).is_err());
        assert!(!set.is_candidate(7, NONE));
    }

    #[test]
    fn raising_a_row_clears_only_overtaken_later_rows() {
        let set = choose(&SelectionSet::new(4, 11), &[(0, 2), (1, 4), (2, 7), (3, 9)]);
        let set = choose(&set, &[(0, 5)]);
        assert_eq!(chosen(&set), vec![5, 0, 7, 9]);
        assert_eq!(set.row(1).unwrap().floor(), 6);
        assert_eq!(set.row(2).unwrap().floor(), 6);
        assert_eq!(set.row(3).unwrap().floor(), 8);
    }

    #[test]
    fn overtaken_row_cascades_to_following_rows() {
        let set = choose(&SelectionSet::new(4, 11), &[(0, 2), (1, 4), (2, 5)]);
        let set = choose(&set, &[(0, 10)]);
        assert_eq!(chosen(&set), vec![10, 0, 0, 0]);
        assert_eq!(set.candidates(3).unwrap(), vec![NONE, 11]);
    }

    #[test]
    fn earlier_rows_are_never_touched() {
        let set = choose(&SelectionSet::new(4, 11), &[(0, 2), (1, 4)]);
        let after = choose(&set, &[(2, 9), (2, NONE), (3, 11)]);
        assert_eq!(after.rows()[..2], set.rows()[..2]);
    }

    #[test]
    fn clearing_a_row_inherits_its_floor() {
        // Clearing row 1 frees later rows down to one past row 0's choice,
        // not down to position 1.
        let set = choose(&SelectionSet::new(4, 11), &[(0, 3), (1, 6)]);
        let set = choose(&set, &[(1, NONE)]);
        assert_eq!(set.row(2).unwrap().floor(), 4);
        assert_eq!(set.candidates(2).unwrap()[1], 4);

        // With nothing selected above, the inherited floor is 1.
        let set = choose(&set, &[(0, NONE)]);
        assert_eq!(set.row(3).unwrap().floor(), 1);
    }

    // Floors derived only from the choices currently held, ignoring history.
    fn recomputed_floors(set: &SelectionSet) -> Vec<usize> {
        let mut floor = 1;
        set.rows()
            .iter()
            .map(|r| {
                let this = floor;
                if r.is_selected() {
                    floor = r.chosen() + 1;
                }
                this
            })
            .collect()
    }

    #[test]
    fn random_walks_keep_selections_ascending() {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        for _ in 0..300 {
            let length = rng.random_range(0..14);
            let rows = rng.random_range(1..7);
            let mut set = SelectionSet::new(rows, length);

            for _ in 0..40 {
                let row = rng.random_range(0..rows);
                let candidates = set.candidates(row).unwrap();
                let index = candidates[rng.random_range(0..candidates.len())];
                set = set.with_choice(row, index).unwrap();

                assert_ascending(&set);
                let floors: Vec<usize> = set.rows().iter().map(SelectorRow::floor).collect();
                assert_eq!(floors, recomputed_floors(&set));
            }
        }
    }
}
