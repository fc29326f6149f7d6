//! Grid walker that assigns every record a cell on the label stock.
//!
//! The engine only knows how many columns and rows fit on a page. It is
//! driven once per record and reports which structural break (if any) the
//! renderer has to emit before drawing the label.

use crate::error::{LabelError, Result};

/// Structural break needed before a label is placed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
    /// Next cell on the current row (also used for the very first label).
    NewCell,
    NewRow,
    NewPage,
}

/// Columns × rows per page. Both are at least one and their product fits
/// in a `u32`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Grid {
    columns: u32,
    rows: u32,
}

impl Grid {
    pub fn new(columns: u32, rows: u32) -> Result<Self> {
        if columns == 0 || rows == 0 {
            return Err(LabelError::InvalidTemplate {
                name: format!("{columns}x{rows}"),
                reason: "grid needs at least one column and one row".into(),
            });
        }
        if columns.checked_mul(rows).is_none() {
            return Err(LabelError::InvalidTemplate {
                name: format!("{columns}x{rows}"),
                reason: "too many cells per page".into(),
            });
        }
        Ok(Grid { columns, rows })
    }

    pub fn columns(&self) -> u32 {
        self.columns
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    /// Labels per page.
    pub fn cells(&self) -> u32 {
        self.columns * self.rows
    }
}

/// Running position. All zero until the first label has been placed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LayoutCursor {
    pub count: u64,
    pub column: u32,
    pub row: u32,
    pub page: u32,
}

/// Where one record lands and what has to happen before it is drawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Placement {
    /// 1-based index of the label within the run.
    pub index: u64,
    pub column: u32,
    pub row: u32,
    pub page: u32,
    pub transition: Transition,
}

#[derive(Debug)]
pub struct LayoutEngine {
    grid: Grid,
    cursor: LayoutCursor,
}

impl LayoutEngine {
    pub fn new(grid: Grid) -> Self {
        LayoutEngine {
            grid,
            cursor: LayoutCursor::default(),
        }
    }

    pub fn grid(&self) -> Grid {
        self.grid
    }

    pub fn cursor(&self) -> LayoutCursor {
        self.cursor
    }

    /// Step to the next cell. Call exactly once per record, in order.
    ///
    /// The wrap check looks at the column *before* it moves, so the last
    /// cell of a row (or page) is used before the break fires on the
    /// following record.
    pub fn advance(&mut self) -> Placement {
        let c = &mut self.cursor;
        c.count += 1;
        let transition = if c.column % self.grid.columns == 0 {
            if c.row % self.grid.rows == 0 {
                c.column = 1;
                c.row = 1;
                c.page += 1;
                if c.count == 1 {
                    Transition::NewCell
                } else {
                    Transition::NewPage
                }
            } else {
                c.column = 1;
                c.row += 1;
                Transition::NewRow
            }
        } else {
            c.column += 1;
            Transition::NewCell
        };
        Placement {
            index: c.count,
            column: c.column,
            row: c.row,
            page: c.page,
            transition,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use Transition::*;

    fn run(columns: u32, rows: u32, n: usize) -> Vec<Placement> {
        let mut engine = LayoutEngine::new(Grid::new(columns, rows).unwrap());
        (0..n).map(|_| engine.advance()).collect()
    }

    fn transitions(columns: u32, rows: u32, n: usize) -> Vec<Transition> {
        run(columns, rows, n).into_iter().map(|p| p.transition).collect()
    }

    #[test]
    fn triple_strip_wraps_rows_then_pages() {
        // 2015TB: one column, three rows
        assert_eq!(
            transitions(1, 3, 7),
            vec![NewCell, NewRow, NewRow, NewPage, NewRow, NewRow, NewPage]
        );
    }

    #[test]
    fn single_cell_pages_every_record_but_the_first() {
        // 8050A
        assert_eq!(transitions(1, 1, 4), vec![NewCell, NewPage, NewPage, NewPage]);
    }

    #[test]
    fn two_by_two_fills_row_before_wrapping() {
        let placed = run(2, 2, 5);
        let cells: Vec<_> = placed
            .iter()
            .map(|p| (p.column, p.row, p.page, p.transition))
            .collect();
        assert_eq!(
            cells,
            vec![
                (1, 1, 1, NewCell),
                (2, 1, 1, NewCell),
                (1, 2, 1, NewRow),
                (2, 2, 1, NewCell),
                (1, 1, 2, NewPage),
            ]
        );
    }

    #[test]
    fn cursor_starts_unplaced() {
        let engine = LayoutEngine::new(Grid::new(3, 2).unwrap());
        assert_eq!(engine.cursor(), LayoutCursor::default());
    }

    #[test]
    fn zero_sized_grid_is_rejected() {
        assert!(Grid::new(0, 3).is_err());
        assert!(Grid::new(2, 0).is_err());
    }

    #[test]
    fn oversized_grid_is_rejected() {
        assert!(matches!(
            Grid::new(70_000, 70_000),
            Err(LabelError::InvalidTemplate { .. })
        ));
        assert_eq!(Grid::new(1, 3).unwrap().cells(), 3);
    }

    proptest! {
        #[test]
        fn indices_stay_in_bounds(columns in 1u32..6, rows in 1u32..6, n in 1usize..200) {
            for p in run(columns, rows, n) {
                prop_assert!((1..=columns).contains(&p.column));
                prop_assert!((1..=rows).contains(&p.row));
            }
        }

        #[test]
        fn breaks_land_on_grid_multiples(columns in 1u32..6, rows in 1u32..6, n in 1usize..200) {
            let per_page = (columns * rows) as u64;
            for p in run(columns, rows, n) {
                let k = p.index - 1;
                let expected = if k == 0 {
                    NewCell
                } else if k % per_page == 0 {
                    NewPage
                } else if k % columns as u64 == 0 {
                    NewRow
                } else {
                    NewCell
                };
                prop_assert_eq!(p.transition, expected, "record {}", p.index);
                prop_assert_eq!(p.page as u64, k / per_page + 1);
                prop_assert_eq!(p.column as u64, k % columns as u64 + 1);
            }
        }

        #[test]
        fn transition_depends_only_on_prior_cursor(columns in 1u32..5, rows in 1u32..5, n in 1usize..60) {
            let mut engine = LayoutEngine::new(Grid::new(columns, rows).unwrap());
            for _ in 0..n {
                let before = engine.cursor();
                let mut replay = LayoutEngine { grid: engine.grid(), cursor: before };
                prop_assert_eq!(replay.advance(), engine.advance());
            }
        }
    }
}
