//! Column sorting for listings.

use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    #[must_use]
    pub const fn reversed(self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }
}

/// Rows that can be compared on any of the columns `C`.
pub trait SortBy<C> {
    fn compare(&self, other: &Self, column: C) -> Ordering;
}

/// The active sort column and direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortState<C> {
    column: C,
    direction: SortDirection,
}

impl<C: Copy + PartialEq> SortState<C> {
    /// Ascending on `column`.
    #[must_use]
    pub const fn new(column: C) -> Self {
        Self {
            column,
            direction: SortDirection::Ascending,
        }
    }

    #[must_use]
    pub const fn column(&self) -> C {
        self.column
    }

    #[must_use]
    pub const fn direction(&self) -> SortDirection {
        self.direction
    }

    /// Selecting the current column flips the direction; selecting another
    /// column sorts it ascending.
    pub fn toggle(&mut self, column: C) {
        if self.column == column {
            self.direction = self.direction.reversed();
        } else {
            self.column = column;
            self.direction = SortDirection::Ascending;
        }
    }

    /// Stable sort of `rows` by the active column and direction.
    pub fn apply<T: SortBy<C>>(&self, rows: &mut [T]) {
        rows.sort_by(|a, b| {
            let ordering = a.compare(b, self.column);
            match self.direction {
                SortDirection::Ascending => ordering,
                SortDirection::Descending => ordering.reverse(),
            }
        });
    }
}
