use prettytable::format::{FormatBuilder, LinePosition, LineSeparator, TableFormat};
use prettytable::{Cell, Row, Table};

use crate::ReportTable;

/// Bordered grid: `-` between rows, `=` under the header, `|` between cells.
/// Missing grades render as empty cells.
pub fn render_grid(report: &ReportTable) -> String {
    let mut table = Table::new();
    table.set_format(grid_format());

    let mut header = vec![Cell::new(ReportTable::INDEX_HEADER)];
    header.extend(report.column_labels().iter().map(|label| Cell::new(label)));
    table.set_titles(Row::new(header));

    for (row_idx, student) in report.row_labels().iter().enumerate() {
        let mut cells = vec![Cell::new(student)];
        cells.extend(
            (0..report.column_labels().len())
                .map(|col_idx| Cell::new(report.cell_at(row_idx, col_idx).unwrap_or(""))),
        );
        table.add_row(Row::new(cells));
    }

    table.to_string()
}

fn grid_format() -> TableFormat {
    let rule = LineSeparator::new('-', '+', '+', '+');
    FormatBuilder::new()
        .column_separator('|')
        .borders('|')
        .separators(&[LinePosition::Top, LinePosition::Intern, LinePosition::Bottom], rule)
        .separator(LinePosition::Title, LineSeparator::new('=', '+', '+', '+'))
        .padding(1, 1)
        .build()
}
