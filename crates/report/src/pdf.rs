//! PDF rendering of report cells with `lopdf`.
//!
//! Cells flow top to bottom on an A4 page, each occupying the full printable
//! width. Text uses the standard Type 1 Helvetica faces, so no font is
//! embedded. Content streams stay uncompressed.

use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary};

use crate::{Align, Cell, ReportError, Weight};

/// Points per millimetre.
const PT_PER_MM: f64 = 72.0 / 25.4;

const PAGE_WIDTH_MM: f64 = 210.0;
const PAGE_HEIGHT_MM: f64 = 297.0;
const MARGIN_MM: f64 = 10.0;
/// Inner padding between a cell border and its text.
const CELL_PADDING_MM: f64 = 1.0;

/// Average Helvetica glyph advance, as a fraction of the font size.
const AVERAGE_GLYPH_EM: f64 = 0.55;

const REGULAR_FONT: &[u8] = b"F1";
const BOLD_FONT: &[u8] = b"F2";

/// A cell resolved to page coordinates, in points from the bottom-left corner.
#[derive(Debug, Clone, PartialEq)]
struct PlacedText<'a> {
    text: &'a str,
    font: &'static [u8],
    size_pt: u16,
    x: i64,
    y: i64,
}

/// Assigns page coordinates to each cell.
fn place(cells: &[Cell]) -> Vec<PlacedText<'_>> {
    let printable_width = PAGE_WIDTH_MM - 2.0 * MARGIN_MM;
    let mut cursor_mm = MARGIN_MM;

    cells
        .iter()
        .map(|cell| {
            cursor_mm += cell.space_before_mm;
            let size_mm = f64::from(cell.size_pt) / PT_PER_MM;

            let x_mm = match cell.align {
                Align::Left => MARGIN_MM + CELL_PADDING_MM,
                Align::Center => {
                    let text_width = cell.text.chars().count() as f64 * size_mm * AVERAGE_GLYPH_EM;
                    MARGIN_MM + (printable_width - text_width).max(0.0) / 2.0
                }
            };
            // Baseline sits a little below the vertical centre of the cell.
            let baseline_mm = cursor_mm + 0.5 * cell.height_mm + 0.3 * size_mm;
            cursor_mm += cell.height_mm;

            PlacedText {
                text: &cell.text,
                font: match cell.weight {
                    Weight::Regular => REGULAR_FONT,
                    Weight::Bold => BOLD_FONT,
                },
                size_pt: cell.size_pt,
                x: to_points(x_mm),
                y: to_points(PAGE_HEIGHT_MM - baseline_mm),
            }
        })
        .collect()
}

fn to_points(mm: f64) -> i64 {
    (mm * PT_PER_MM).round() as i64
}

fn text_operations(placed: &PlacedText<'_>) -> [Operation; 5] {
    [
        Operation::new("BT", vec![]),
        Operation::new(
            "Tf",
            vec![
                Object::Name(placed.font.to_vec()),
                Object::Integer(i64::from(placed.size_pt)),
            ],
        ),
        Operation::new("Td", vec![Object::Integer(placed.x), Object::Integer(placed.y)]),
        Operation::new("Tj", vec![Object::string_literal(placed.text)]),
        Operation::new("ET", vec![]),
    ]
}

/// Renders the cells onto one page and returns the serialized document.
pub(crate) fn render(cells: &[Cell]) -> Result<Vec<u8>, ReportError> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let regular_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let bold_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica-Bold",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => regular_id,
            "F2" => bold_id,
        },
    });

    let operations: Vec<Operation> = place(cells).iter().flat_map(text_operations).collect();
    let content = Content { operations };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
    });
    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => vec![Object::Reference(page_id)],
        "Count" => 1,
        "Resources" => resources_id,
        "MediaBox" => vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Integer(to_points(PAGE_WIDTH_MM)),
            Object::Integer(to_points(PAGE_HEIGHT_MM)),
        ],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)?;
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use vehicle_features::FeatureVector;

    use super::*;
    use crate::ReportLayout;

    #[test]
    fn test_cells_flow_downwards() {
        let layout = ReportLayout::new(&FeatureVector::default(), 1.0);
        let placed = place(layout.cells());

        assert_eq!(placed.len(), 6);
        assert!(placed.windows(2).all(|pair| pair[0].y > pair[1].y));
        assert!(placed.iter().all(|p| p.y > 0 && p.y < to_points(PAGE_HEIGHT_MM)));
    }

    #[test]
    fn test_title_is_centered_and_body_is_left_aligned() {
        let layout = ReportLayout::new(&FeatureVector::default(), 1.0);
        let placed = place(layout.cells());

        let left = to_points(MARGIN_MM + CELL_PADDING_MM);
        assert!(placed[0].x > left);
        assert!(placed[1..].iter().all(|p| p.x == left));
        assert_eq!(placed[0].font, BOLD_FONT);
        assert_eq!(placed[1].font, REGULAR_FONT);
        assert_eq!(placed[5].font, BOLD_FONT);
    }
}
