use crate::domain::sheet::{Sheet, Table, Workbook};
use crate::error::{LedgerError, Result};
use std::collections::BTreeMap;
use std::io::{Read, Write};

/// Reads a workbook from its single-file CSV form.
///
/// Every line starts with the sheet name. The first line of a sheet is its
/// header, the rest are data rows in order. Lines may have different lengths
/// across sheets, so the reader runs in flexible mode.
pub struct WorkbookReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> WorkbookReader<R> {
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    pub fn read(mut self) -> Result<Workbook> {
        let mut tables: BTreeMap<Sheet, Table> = BTreeMap::new();

        for result in self.reader.records() {
            let record = result?;
            let mut fields = record.iter();
            let Some(tag) = fields.next() else {
                continue;
            };
            let sheet: Sheet = tag.parse()?;
            let cells: Vec<String> = fields.map(str::to_string).collect();

            match tables.get_mut(&sheet) {
                None => {
                    tables.insert(
                        sheet,
                        Table {
                            headers: cells,
                            rows: Vec::new(),
                        },
                    );
                }
                Some(table) => {
                    let width = table.headers.len();
                    let mut cells = cells;
                    if cells.len() > width {
                        return Err(LedgerError::CorruptRow {
                            sheet: sheet.name().to_string(),
                            row: table.rows.len() + 1,
                            reason: format!("{} cells for {} columns", cells.len(), width),
                        });
                    }
                    cells.resize(width, String::new());
                    table.rows.push(cells);
                }
            }
        }

        Workbook::from_tables(tables)
    }
}

/// Writes a workbook in the form [`WorkbookReader`] reads.
pub struct WorkbookWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> WorkbookWriter<W> {
    pub fn new(sink: W) -> Self {
        let writer = csv::WriterBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_writer(sink);
        Self { writer }
    }

    pub fn write(mut self, workbook: &Workbook) -> Result<W> {
        for (sheet, table) in workbook.tables() {
            self.write_line(sheet, &table.headers)?;
            for row in &table.rows {
                self.write_line(sheet, row)?;
            }
        }
        self.writer
            .into_inner()
            .map_err(|e| LedgerError::IoError(e.into_error()))
    }

    fn write_line(&mut self, sheet: Sheet, cells: &[String]) -> Result<()> {
        self.writer.write_record(
            std::iter::once(sheet.name()).chain(cells.iter().map(String::as_str)),
        )?;
        Ok(())
    }
}
