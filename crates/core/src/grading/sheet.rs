//! Spreadsheet and CSV decoding into a uniform row model.

use std::io::Cursor;
use std::path::Path;

use calamine::{Data, Reader, open_workbook_auto_from_rs};

use super::error::SheetError;

const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
const OLE_MAGIC: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];
const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Container format of an upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetFormat {
    /// Comma-separated text.
    Csv,
    /// Excel or OpenDocument workbook.
    Workbook,
}

impl SheetFormat {
    /// Picks the format from the file extension, then from magic bytes.
    #[must_use]
    pub fn detect(filename: &str, bytes: &[u8]) -> Self {
        let extension = Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        match extension.as_deref() {
            Some("csv" | "txt") => Self::Csv,
            Some("xlsx" | "xlsm" | "xlsb" | "xls" | "ods") => Self::Workbook,
            _ if bytes.starts_with(ZIP_MAGIC) || bytes.starts_with(OLE_MAGIC) => Self::Workbook,
            _ => Self::Csv,
        }
    }
}

/// One data row with its spreadsheet row number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetRow {
    /// 1-based row number as shown by a spreadsheet program.
    pub number: u32,
    /// Cell text, left to right.
    pub cells: Vec<String>,
}

impl SheetRow {
    /// Cell text at `index`, or `""` past the end of a short row.
    #[must_use]
    pub fn cell(&self, index: usize) -> &str {
        self.cells.get(index).map_or("", String::as_str)
    }

    /// Returns true when every cell is blank.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(|c| c.trim().is_empty())
    }
}

/// A header row followed by data rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sheet {
    /// Header cells as written.
    pub headers: Vec<String>,
    /// Data rows in file order.
    pub rows: Vec<SheetRow>,
}

impl Sheet {
    /// Builds a sheet from in-memory rows; the first row is the header.
    ///
    /// Row numbers start at 1 for the header.
    #[must_use]
    pub fn from_rows<I, R, C>(rows: I) -> Option<Self>
    where
        I: IntoIterator<Item = R>,
        R: IntoIterator<Item = C>,
        C: Into<String>,
    {
        let mut numbered = rows
            .into_iter()
            .zip(1u32..)
            .map(|(cells, number)| SheetRow {
                number,
                cells: cells.into_iter().map(Into::into).collect(),
            });
        let header = numbered.next()?;
        Some(Self {
            headers: header.cells,
            rows: numbered.collect(),
        })
    }

    /// Decodes an uploaded file.
    ///
    /// # Errors
    ///
    /// Returns `SheetError::Unreadable` when the bytes cannot be decoded and
    /// `SheetError::Empty` when there is no header row.
    pub fn parse(filename: &str, bytes: &[u8]) -> Result<Self, SheetError> {
        if bytes.is_empty() {
            return Err(SheetError::Empty);
        }

        let mut rows = match SheetFormat::detect(filename, bytes) {
            SheetFormat::Csv => read_csv(bytes)?,
            SheetFormat::Workbook => read_workbook(bytes)?,
        }
        .into_iter()
        .skip_while(SheetRow::is_blank);

        let header = rows.next().ok_or(SheetError::Empty)?;
        Ok(Self {
            headers: header.cells,
            rows: rows.collect(),
        })
    }
}

fn read_csv(bytes: &[u8]) -> Result<Vec<SheetRow>, SheetError> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);

    // Quoted cells may span lines; a spreadsheet still shows each record as one row.
    let mut embedded_newlines: u64 = 0;
    let mut rows = Vec::new();
    for record in reader.byte_records() {
        let record = record.map_err(|e| SheetError::Unreadable(e.to_string()))?;
        let line = record.position().map_or(0, csv::Position::line);
        let number = u32::try_from(line.saturating_sub(embedded_newlines)).unwrap_or(u32::MAX);
        embedded_newlines += record
            .iter()
            .map(|field| field.iter().filter(|&&b| b == b'\n').count() as u64)
            .sum::<u64>();
        rows.push(SheetRow {
            number,
            cells: record
                .iter()
                .map(|field| String::from_utf8_lossy(field).into_owned())
                .collect(),
        });
    }
    Ok(rows)
}

fn read_workbook(bytes: &[u8]) -> Result<Vec<SheetRow>, SheetError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
        .map_err(|e| SheetError::Unreadable(e.to_string()))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or(SheetError::Empty)?
        .map_err(|e| SheetError::Unreadable(e.to_string()))?;

    // Ranges skip leading empty rows; keep row numbers aligned with the file.
    let first_row = range.start().map_or(0, |(row, _)| row);
    let first_col = range.start().map_or(0, |(_, col)| col) as usize;

    Ok(range
        .rows()
        .zip(first_row..)
        .map(|(cells, row)| {
            let mut text: Vec<String> = vec![String::new(); first_col];
            text.extend(cells.iter().map(cell_text));
            SheetRow {
                number: row + 1,
                cells: text,
            }
        })
        .collect())
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => f.to_string(),
        Data::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("grades.csv", b"", SheetFormat::Csv)]
    #[case("GRADES.XLSX", b"", SheetFormat::Workbook)]
    #[case("grades.ods", b"", SheetFormat::Workbook)]
    #[case("upload", b"PK\x03\x04rest", SheetFormat::Workbook)]
    #[case("upload", b"\xD0\xCF\x11\xE0\xA1\xB1\x1A\xE1", SheetFormat::Workbook)]
    #[case("upload", b"Student ID,Grade\n", SheetFormat::Csv)]
    fn test_detect_format(
        #[case] filename: &str,
        #[case] bytes: &[u8],
        #[case] expected: SheetFormat,
    ) {
        assert_eq!(SheetFormat::detect(filename, bytes), expected);
    }

    #[test]
    fn test_parse_csv_numbers_rows_from_header() {
        let sheet = Sheet::parse("g.csv", b"Student ID,Grade\nSTU001,A\nSTU002,B+\n").unwrap();

        assert_eq!(sheet.headers, vec!["Student ID", "Grade"]);
        assert_eq!(sheet.rows.len(), 2);
        assert_eq!(sheet.rows[0].number, 2);
        assert_eq!(sheet.rows[1].number, 3);
        assert_eq!(sheet.rows[1].cell(1), "B+");
    }

    #[test]
    fn test_parse_csv_multiline_cell_keeps_row_numbers() {
        let sheet = Sheet::parse(
            "g.csv",
            b"Student ID,Grade,Note\nSTU001,A,\"two\nlines\"\nSTU999,B,x\n",
        )
        .unwrap();

        let numbers: Vec<u32> = sheet.rows.iter().map(|r| r.number).collect();
        assert_eq!(numbers, vec![2, 3]);
        assert_eq!(sheet.rows[0].cell(2), "two\nlines");
    }

    #[test]
    fn test_parse_csv_blank_lines_still_count_as_rows() {
        let sheet = Sheet::parse(
            "g.csv",
            b"Student ID,Grade,Note\nSTU001,A,\"a\r\nb\nc\"\n\nSTU002,B,x\n",
        )
        .unwrap();

        let numbers: Vec<u32> = sheet.rows.iter().map(|r| r.number).collect();
        assert_eq!(numbers, vec![2, 4]);
    }

    #[test]
    fn test_parse_csv_strips_bom_and_tolerates_short_rows() {
        let sheet = Sheet::parse("g.csv", b"\xEF\xBB\xBFStudent ID,Grade,Percentage\nSTU001,A\n")
            .unwrap();

        assert_eq!(sheet.headers[0], "Student ID");
        assert_eq!(sheet.rows[0].cell(2), "");
    }

    #[test]
    fn test_parse_empty_file() {
        assert_eq!(Sheet::parse("g.csv", b""), Err(SheetError::Empty));
        assert_eq!(Sheet::parse("g.csv", b"\n\n"), Err(SheetError::Empty));
    }

    #[test]
    fn test_parse_garbage_workbook_is_unreadable() {
        let result = Sheet::parse("g.xlsx", b"definitely not a zip archive");
        assert!(matches!(result, Err(SheetError::Unreadable(_))));
    }

    const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
<Default Extension="xml" ContentType="application/xml"/>
<Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>
<Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>
</Types>"#;

    const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>
</Relationships>"#;

    const WORKBOOK: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
<sheets><sheet name="Grades" sheetId="1" r:id="rId1"/></sheets>
</workbook>"#;

    const WORKBOOK_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/>
</Relationships>"#;

    /// Header on row 3 after two empty rows; a numeric ID and a missing percentage.
    const GRADES_SHEET: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
<sheetData>
<row r="3"><c r="A3" t="inlineStr"><is><t>Student ID</t></is></c><c r="B3" t="inlineStr"><is><t>Grade</t></is></c><c r="C3" t="inlineStr"><is><t>Percentage</t></is></c></row>
<row r="4"><c r="A4"><v>1001</v></c><c r="B4" t="inlineStr"><is><t>A-</t></is></c><c r="C4"><v>87.5</v></c></row>
<row r="5"><c r="A5" t="inlineStr"><is><t>STU002</t></is></c><c r="B5" t="inlineStr"><is><t>b</t></is></c></row>
</sheetData>
</worksheet>"#;

    fn xlsx(sheet_xml: &str) -> Vec<u8> {
        use std::io::Write;
        use zip::write::FileOptions;
        use zip::{CompressionMethod, ZipWriter};

        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let opts = FileOptions::default().compression_method(CompressionMethod::Stored);
        for (name, body) in [
            ("[Content_Types].xml", CONTENT_TYPES),
            ("_rels/.rels", ROOT_RELS),
            ("xl/workbook.xml", WORKBOOK),
            ("xl/_rels/workbook.xml.rels", WORKBOOK_RELS),
            ("xl/worksheets/sheet1.xml", sheet_xml),
        ] {
            zip.start_file(name, opts).unwrap();
            zip.write_all(body.as_bytes()).unwrap();
        }
        zip.finish().unwrap().into_inner()
    }

    #[test]
    fn test_parse_xlsx_reads_cells_and_row_numbers() {
        let sheet = Sheet::parse("grades.xlsx", &xlsx(GRADES_SHEET)).unwrap();

        assert_eq!(sheet.headers, vec!["Student ID", "Grade", "Percentage"]);
        assert_eq!(sheet.rows.len(), 2);

        assert_eq!(sheet.rows[0].number, 4);
        assert_eq!(sheet.rows[0].cell(0), "1001");
        assert_eq!(sheet.rows[0].cell(1), "A-");
        assert_eq!(sheet.rows[0].cell(2), "87.5");

        assert_eq!(sheet.rows[1].number, 5);
        assert_eq!(sheet.rows[1].cell(0), "STU002");
        assert_eq!(sheet.rows[1].cell(2), "");
    }

    #[test]
    fn test_parse_sniffs_workbook_without_extension() {
        let sheet = Sheet::parse("upload", &xlsx(GRADES_SHEET)).unwrap();
        assert_eq!(sheet.headers[0], "Student ID");
    }

    #[test]
    fn test_from_rows_numbers_like_a_spreadsheet() {
        let sheet = Sheet::from_rows([vec!["Student ID", "Grade"], vec!["STU001", "A"]]).unwrap();
        assert_eq!(sheet.rows[0].number, 2);
        assert!(Sheet::from_rows(Vec::<Vec<&str>>::new()).is_none());
    }

    #[test]
    fn test_blank_row_detection() {
        let row = SheetRow {
            number: 4,
            cells: vec![" ".to_string(), String::new()],
        };
        assert!(row.is_blank());
    }
}
