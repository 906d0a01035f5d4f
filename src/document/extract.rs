/*!
 * Content unit extraction.
 *
 * Paragraphs are extracted whole, never per run, so the translator sees the
 * full sentence. Run boundaries are recorded as spans for the writer.
 */

use log::debug;

use crate::errors::DocumentError;

use super::model::{Paragraph, Presentation};
use super::{ContentUnit, RunSpan, StyleRef, UnitAddress};

/// Extract every non-empty paragraph and table cell in traversal order
pub fn extract_units(presentation: &Presentation) -> Result<Vec<ContentUnit>, DocumentError> {
    presentation.validate()?;

    let mut units = Vec::new();

    for (slide_index, slide) in presentation.slides.iter().enumerate() {
        for (shape_index, shape) in slide.shapes.iter().enumerate() {
            if let Some(frame) = &shape.text_frame {
                for (paragraph_index, paragraph) in frame.paragraphs.iter().enumerate() {
                    let text = paragraph.text();
                    if text.trim().is_empty() {
                        continue;
                    }
                    let address = UnitAddress::Paragraph {
                        slide: slide_index,
                        shape: shape_index,
                        paragraph: paragraph_index,
                    };
                    units.push(ContentUnit::new(address, text, paragraph_spans(0, paragraph)));
                }
            } else if let Some(table) = &shape.table {
                for (row_index, row) in table.rows.iter().enumerate() {
                    for (column_index, cell) in row.cells.iter().enumerate() {
                        let text = cell.text();
                        if text.trim().is_empty() {
                            continue;
                        }
                        let address = UnitAddress::TableCell {
                            slide: slide_index,
                            shape: shape_index,
                            row: row_index,
                            column: column_index,
                        };
                        let spans = cell
                            .paragraphs
                            .iter()
                            .enumerate()
                            .flat_map(|(index, paragraph)| paragraph_spans(index, paragraph))
                            .collect();
                        units.push(ContentUnit::new(address, text, spans));
                    }
                }
            }
        }
    }

    debug!(
        "Extracted {} content unit(s) from {} slide(s)",
        units.len(),
        presentation.slides.len()
    );
    Ok(units)
}

fn paragraph_spans(paragraph_index: usize, paragraph: &Paragraph) -> Vec<RunSpan> {
    paragraph
        .runs
        .iter()
        .enumerate()
        .map(|(run_index, run)| RunSpan {
            len: run.text.chars().count(),
            style: StyleRef {
                paragraph: paragraph_index,
                run: run_index,
            },
        })
        .collect()
}
