//! Live search over rendered table rows.
//!
//! A [`FilterIndex`] folds the case of every cell once, when a table is
//! loaded. Each keystroke then costs a single pass over the rows (or over
//! the previous hits, when the query only grew) and never touches the
//! engine. Results are [`FilteredView`]s: ordered row indices into the
//! unchanged source table.

use memchr::memmem;
use std::ops::Range;
use tracing::trace;

use crate::core::{Module, PointerWidth, SymbolSet};
use crate::view::{module_row, symbol_row, Row};

/// Search text plus the column range it targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterQuery {
    pub text: String,
    pub columns: Range<usize>,
}

impl FilterQuery {
    pub fn new(text: impl Into<String>, columns: Range<usize>) -> Self {
        Self {
            text: text.into(),
            columns,
        }
    }

    /// Search every column from `start` onwards
    pub fn from_column(text: impl Into<String>, start: usize) -> Self {
        Self::new(text, start..usize::MAX)
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Ordered row indices into a source table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilteredView {
    rows: Vec<usize>,
}

impl FilteredView {
    /// All `len` rows in source order
    pub fn identity(len: usize) -> Self {
        Self {
            rows: (0..len).collect(),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Source index of the `position`-th visible row
    pub fn get(&self, position: usize) -> Option<usize> {
        self.rows.get(position).copied()
    }

    pub fn rows(&self) -> &[usize] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Clone the visible rows out of `source`
    pub fn project(&self, source: &[Row]) -> Vec<Row> {
        self.rows
            .iter()
            .filter_map(|&i| source.get(i).cloned())
            .collect()
    }
}

// Per-char folding keeps folded(q1) a prefix of folded(q2) whenever q1 is a
// prefix of q2, which str::to_lowercase does not guarantee (final sigma).
fn fold_case(s: &str) -> String {
    s.chars().flat_map(char::to_lowercase).collect()
}

#[derive(Debug, Clone)]
struct LastApplied {
    needle: String,
    columns: Range<usize>,
    view: FilteredView,
}

/// Case-folded search columns of one table snapshot.
#[derive(Debug, Clone, Default)]
pub struct FilterIndex {
    /// `columns[c][r]` is the folded text of row `r`, column `c`
    columns: Vec<Vec<String>>,
    row_count: usize,
    incremental: bool,
    last: Option<LastApplied>,
}

impl FilterIndex {
    /// Index already-rendered rows
    pub fn from_rows(rows: &[Row], incremental: bool) -> Self {
        let column_count = rows.iter().map(Vec::len).max().unwrap_or(0);
        let mut columns = vec![Vec::with_capacity(rows.len()); column_count];
        for row in rows {
            for (c, column) in columns.iter_mut().enumerate() {
                column.push(row.get(c).map(|cell| fold_case(cell)).unwrap_or_default());
            }
        }
        Self {
            columns,
            row_count: rows.len(),
            incremental,
            last: None,
        }
    }

    /// Index a symbol set using the symbol table schema
    pub fn for_symbols(set: &SymbolSet, width: PointerWidth, incremental: bool) -> Self {
        let rows: Vec<Row> = set.iter().map(|s| symbol_row(s, width)).collect();
        Self::from_rows(&rows, incremental)
    }

    /// Index a module list using the module table schema
    pub fn for_modules(modules: &[Module], width: PointerWidth, incremental: bool) -> Self {
        let rows: Vec<Row> = modules.iter().map(|m| module_row(m, width)).collect();
        Self::from_rows(&rows, incremental)
    }

    pub fn len(&self) -> usize {
        self.row_count
    }

    pub fn is_empty(&self) -> bool {
        self.row_count == 0
    }

    /// Filter the snapshot.
    ///
    /// An empty query yields the identity view. Otherwise rows whose folded
    /// text contains the folded query in any targeted column are kept, in
    /// source order.
    pub fn apply(&mut self, query: &FilterQuery) -> FilteredView {
        if query.is_empty() {
            self.last = None;
            return FilteredView::identity(self.row_count);
        }

        let needle = fold_case(&query.text);
        let end = query.columns.end.min(self.columns.len());
        let columns = query.columns.start.min(end)..end;

        let view = match self.narrowable(&needle, &columns) {
            Some(previous) => {
                trace!(query = %query.text, candidates = previous.len(), "narrowing filter");
                self.scan(&needle, &columns, previous.rows.iter().copied())
            }
            None => {
                trace!(query = %query.text, rows = self.row_count, "full filter");
                self.scan(&needle, &columns, 0..self.row_count)
            }
        };

        if self.incremental {
            self.last = Some(LastApplied {
                needle,
                columns,
                view: view.clone(),
            });
        }
        view
    }

    fn narrowable(&self, needle: &str, columns: &Range<usize>) -> Option<&FilteredView> {
        let last = self.last.as_ref()?;
        (self.incremental && last.columns == *columns && needle.starts_with(&last.needle))
            .then_some(&last.view)
    }

    fn scan(
        &self,
        needle: &str,
        columns: &Range<usize>,
        candidates: impl Iterator<Item = usize>,
    ) -> FilteredView {
        let finder = memmem::Finder::new(needle.as_bytes());
        let targeted = &self.columns[columns.clone()];
        let rows = candidates
            .filter(|&r| {
                targeted
                    .iter()
                    .any(|column| finder.find(column[r].as_bytes()).is_some())
            })
            .collect();
        FilteredView { rows }
    }
}
