#[cfg(feature = "web")]
use std::error::Error;

use crate::workbook::CellValue;
#[cfg(feature = "web")]
use crate::workbook::HeaderStyle;

/// Convert table rows to CSV format
///
/// Rows are written as they are stored, the header row included. Values
/// containing commas, quotes or line breaks are quoted, with inner quotes
/// doubled.
///
/// # Arguments
/// * `rows` - Table rows, header first
///
/// # Returns
/// * `String` - CSV content
///
/// # Examples
/// ```
/// use formsheet::downloader::to_csv;
/// use formsheet::workbook::CellValue;
///
/// let rows = vec![vec![CellValue::text("Name"), CellValue::text("Doe, John")]];
/// assert_eq!(to_csv(&rows), "Name,\"Doe, John\"\n");
/// ```
pub fn to_csv(rows: &[Vec<CellValue>]) -> String {
    let mut csv_content = String::new();

    for row in rows {
        for (c, cell) in row.iter().enumerate() {
            if c > 0 {
                csv_content.push(',');
            }

            let value = cell.to_string();
            if value.contains(',') || value.contains('"') || value.contains('\n') || value.contains('\r') {
                let escaped = value.replace('"', "\"\"");
                csv_content.push_str(&format!("\"{}\"", escaped));
            } else {
                csv_content.push_str(&value);
            }
        }
        csv_content.push('\n');
    }

    csv_content
}

/// Convert table rows to XLSX format
///
/// The first row is written with `header_style` when one is given, and
/// columns are auto-fitted when the style asks for it. Timestamps below the
/// header become Excel date cells (UTC) so they sort and filter as dates.
///
/// # Arguments
/// * `sheet_name` - Worksheet name
/// * `rows` - Table rows, header first
/// * `header_style` - Styling for the first row
///
/// # Returns
/// * `Result<Vec<u8>, Box<dyn Error>>` - XLSX file content as bytes or an error
#[cfg(feature = "web")]
pub fn to_xlsx(
    sheet_name: &str,
    rows: &[Vec<CellValue>],
    header_style: Option<&HeaderStyle>,
) -> Result<Vec<u8>, Box<dyn Error>> {
    use rust_xlsxwriter::{Color, Format, Workbook, Worksheet};

    let mut workbook = Workbook::new();
    let mut worksheet = Worksheet::new();
    worksheet.set_name(sheet_name)?;

    let header_format = header_style.map(|style| {
        let mut format = Format::new()
            .set_background_color(Color::RGB(style.background))
            .set_font_color(Color::RGB(style.font_color));
        if style.bold {
            format = format.set_bold();
        }
        format
    });

    let date_format = Format::new().set_num_format("yyyy-mm-dd hh:mm:ss");

    for (r, row) in rows.iter().enumerate() {
        for (c, cell) in row.iter().enumerate() {
            let (r, c) = (r as u32, c as u16);
            match (&header_format, r, cell) {
                (Some(format), 0, _) => {
                    worksheet.write_string_with_format(r, c, cell.to_string(), format)?;
                }
                (_, _, CellValue::Timestamp(ts)) => {
                    worksheet.write_datetime_with_format(r, c, &ts.naive_utc(), &date_format)?;
                }
                (_, _, CellValue::Text(text)) => {
                    worksheet.write_string(r, c, text)?;
                }
            }
        }
    }

    if header_style.is_some_and(|style| style.auto_resize) {
        worksheet.autofit();
    }

    workbook.push_worksheet(worksheet);

    let buffer = workbook.save_to_buffer()?;

    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_escapes_special_characters() {
        let rows = vec![
            vec![CellValue::text("Subject"), CellValue::text("Message")],
            vec![CellValue::text("Hi"), CellValue::text("say \"hello\"")],
        ];
        assert_eq!(to_csv(&rows), "Subject,Message\nHi,\"say \"\"hello\"\"\"\n");
    }

    #[test]
    fn csv_keeps_padding_rows() {
        let rows = vec![vec![CellValue::text("a")], vec![], vec![CellValue::text("c")]];
        assert_eq!(to_csv(&rows), "a\n\nc\n");
    }

    #[cfg(feature = "web")]
    #[test]
    fn xlsx_is_a_zip_archive() {
        let rows = vec![vec![CellValue::text("Timestamp")], vec![CellValue::text("x")]];
        let bytes = to_xlsx("Sheet1", &rows, Some(&HeaderStyle::default())).unwrap();
        assert_eq!(&bytes[..2], b"PK");
    }

    #[cfg(feature = "web")]
    #[test]
    fn xlsx_accepts_timestamp_cells() {
        use chrono::{TimeZone, Utc};

        let submitted = Utc.with_ymd_and_hms(2025, 5, 11, 9, 30, 0).unwrap();
        let rows = vec![
            vec![CellValue::text("Timestamp"), CellValue::text("Email")],
            vec![CellValue::Timestamp(submitted), CellValue::text("a@b.co")],
        ];
        let bytes = to_xlsx("Sheet1", &rows, None).unwrap();
        assert_eq!(&bytes[..2], b"PK");
    }
}
