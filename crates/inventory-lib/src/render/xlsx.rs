use rust_xlsxwriter::{Format, Workbook};

use super::RenderError;

/// Value of one spreadsheet cell
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
    Bool(bool),
    Empty,
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<&String> for Cell {
    fn from(value: &String) -> Self {
        Self::Text(value.clone())
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i64> for Cell {
    fn from(value: i64) -> Self {
        Self::Number(value as f64)
    }
}

impl From<bool> for Cell {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/// A record exported as one spreadsheet row
pub trait SheetRow {
    /// Cells in the column order of the sheet's headers
    fn cells(&self) -> Vec<Cell>;
}

/// Fixed shape of one report sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SheetLayout {
    pub name: &'static str,
    /// Optional banner written in the first cell
    pub title: Option<&'static str>,
    /// Blank entries leave the column without a header
    pub headers: &'static [&'static str],
    pub header_row: u32,
    pub first_data_row: u32,
}

/// Renders `rows` into a single-sheet workbook and returns the file bytes
pub fn build_workbook<R: SheetRow>(layout: &SheetLayout, rows: &[R]) -> Result<Vec<u8>, RenderError> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(layout.name)?;

    let bold = Format::new().set_bold();
    if let Some(title) = layout.title {
        sheet.write_string_with_format(0, 0, title, &bold)?;
    }
    for (col, header) in (0u16..).zip(layout.headers) {
        if !header.is_empty() {
            sheet.write_string_with_format(layout.header_row, col, *header, &bold)?;
        }
    }

    for (row, record) in (layout.first_data_row..).zip(rows) {
        for (col, cell) in (0u16..).zip(record.cells()) {
            match cell {
                Cell::Text(text) => {
                    sheet.write_string(row, col, text)?;
                }
                Cell::Number(number) => {
                    sheet.write_number(row, col, number)?;
                }
                Cell::Bool(flag) => {
                    sheet.write_boolean(row, col, flag)?;
                }
                Cell::Empty => {}
            }
        }
    }

    Ok(workbook.save_to_buffer()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::{open_workbook_from_rs, Data, Reader, Xlsx};
    use std::io::Cursor;

    struct Pair(&'static str, f64, bool);

    impl SheetRow for Pair {
        fn cells(&self) -> Vec<Cell> {
            vec![self.0.into(), self.1.into(), Cell::Empty, self.2.into()]
        }
    }

    const LAYOUT: SheetLayout = SheetLayout {
        name: "Pairs",
        title: None,
        headers: &["Name", "Value", "", "Flag"],
        header_row: 0,
        first_data_row: 1,
    };

    #[test]
    fn test_cells_keep_their_types() {
        let bytes = build_workbook(&LAYOUT, &[Pair("a", 1.5, true), Pair("b", 2.0, false)]).unwrap();
        let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes)).unwrap();
        let range = workbook.worksheet_range("Pairs").unwrap();

        assert_eq!(range.get_value((0, 0)), Some(&Data::String("Name".into())));
        assert_eq!(range.get_value((1, 1)), Some(&Data::Float(1.5)));
        assert_eq!(range.get_value((1, 3)), Some(&Data::Bool(true)));
        assert_eq!(range.get_value((2, 0)), Some(&Data::String("b".into())));
    }

    #[test]
    fn test_invalid_sheet_name_is_an_error() {
        let layout = SheetLayout {
            name: "a/b",
            ..LAYOUT
        };
        assert!(build_workbook::<Pair>(&layout, &[]).is_err());
    }
}
