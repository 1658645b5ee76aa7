//! Table rows as scraped, the continuation-row merge and CSV output.

/// One row of cell texts.
pub type Row = Vec<String>;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub header: Row,
    pub rows: Vec<Row>,
}

impl Table {
    pub fn new(header: Row, rows: Vec<Row>) -> Self {
        Self { header, rows }
    }

    /// Folds every continuation row into the row above it.
    pub fn merged(self) -> Self {
        Self {
            header: self.header,
            rows: merge_continuation_rows(self.rows),
        }
    }

    /// Header first, then the rows. Fields are quoted only when needed.
    pub fn write_csv<W: std::io::Write>(&self, wtr: W) -> crate::Result<()> {
        let mut csv_wtr = csv::WriterBuilder::new()
            .flexible(true)
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(wtr);
        csv_wtr.write_record(&self.header)?;
        for row in &self.rows {
            csv_wtr.write_record(row)?;
        }
        csv_wtr.flush()?;
        Ok(())
    }
}

/// A row with exactly one cell continues the row above it: its text is appended
/// to that row's last cell, separated by a space, and the row itself is dropped.
/// A continuation with nothing above it is kept as an ordinary row.
pub fn merge_continuation_rows(rows: Vec<Row>) -> Vec<Row> {
    let mut merged: Vec<Row> = Vec::with_capacity(rows.len());
    for row in rows {
        if row.len() == 1 {
            if let Some(last_cell) = merged.last_mut().and_then(|prev| prev.last_mut()) {
                let text = &row[0];
                if !last_cell.is_empty() && !text.is_empty() {
                    last_cell.push(' ');
                }
                last_cell.push_str(text);
                continue;
            }
        }
        merged.push(row);
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Row {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn continuation_joins_previous_last_cell() {
        let rows = vec![
            row(&["pilot", "June 24"]),
            row(&["Elliot meets fsociety."]),
            row(&["ones-and-zer0es", "July 1"]),
        ];
        let merged = merge_continuation_rows(rows);
        assert_eq!(
            merged,
            vec![
                row(&["pilot", "June 24 Elliot meets fsociety."]),
                row(&["ones-and-zer0es", "July 1"]),
            ]
        );
    }

    #[test]
    fn consecutive_continuations_all_attach_to_same_row() {
        let rows = vec![row(&["a", "b"]), row(&["c"]), row(&["d"]), row(&["e", "f"])];
        let merged = merge_continuation_rows(rows);
        assert_eq!(merged, vec![row(&["a", "b c d"]), row(&["e", "f"])]);
    }

    #[test]
    fn leading_continuation_is_kept() {
        let rows = vec![row(&["orphan"]), row(&["a", "b"])];
        assert_eq!(merge_continuation_rows(rows.clone()), rows);
    }

    #[test]
    fn no_continuations_is_identity() {
        let rows = vec![row(&["1", "2"]), row(&["3", "4"]), row(&[])];
        assert_eq!(merge_continuation_rows(rows.clone()), rows);
    }

    #[test]
    fn csv_has_header_plus_one_line_per_row() {
        let table = Table::new(
            row(&["Title", "Air date"]),
            vec![row(&["eps1.0", "June 24"]), row(&["eps1.1, part 2", "say \"hi\""])],
        );
        let mut out = Vec::new();
        table.write_csv(&mut out).unwrap();
        let out = String::from_utf8(out).unwrap();
        assert_eq!(
            out,
            "Title,Air date\neps1.0,June 24\n\"eps1.1, part 2\",\"say \"\"hi\"\"\"\n"
        );
    }
}
