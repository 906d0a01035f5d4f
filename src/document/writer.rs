/*!
 * Writing unit text back into the slide tree.
 *
 * Multi-run paragraphs get the final text redistributed over their original
 * runs in proportion to the original run lengths. This keeps every run's
 * style but cannot know where a translated phrase "belongs", so the result
 * is an approximation when the translation reorders or resizes the text.
 */

use log::warn;

use crate::errors::DocumentError;

use super::model::{Paragraph, Presentation, Run};
use super::{ContentUnit, RunSpan, UnitAddress};

/// Outcome of applying a batch of units
#[derive(Debug, Default)]
pub struct WriteSummary {
    /// Units written successfully
    pub applied: usize,
    /// Units whose address could not be written
    pub failures: Vec<(UnitAddress, DocumentError)>,
}

impl WriteSummary {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Apply every terminal unit; a failing unit does not stop the others
pub fn apply_units(presentation: &mut Presentation, units: &[ContentUnit]) -> WriteSummary {
    let mut summary = WriteSummary::default();

    for unit in units.iter().filter(|u| u.status.is_terminal()) {
        match apply_unit(presentation, unit) {
            Ok(()) => summary.applied += 1,
            Err(e) => {
                warn!("Could not write {}: {}", unit.address, e);
                summary.failures.push((unit.address, e));
            }
        }
    }

    summary
}

/// Replace the text of the node a unit was extracted from
pub fn apply_unit(presentation: &mut Presentation, unit: &ContentUnit) -> Result<(), DocumentError> {
    let text = unit.final_text();

    match unit.address {
        UnitAddress::Paragraph { .. } => {
            let paragraph = presentation
                .paragraph_mut(&unit.address)
                .ok_or(DocumentError::AddressNotFound(unit.address))?;
            write_runs(paragraph, &unit.run_spans, text, unit.address)
        }
        UnitAddress::TableCell { .. } => {
            let cell = presentation
                .cell_mut(&unit.address)
                .ok_or(DocumentError::AddressNotFound(unit.address))?;

            let lines: Vec<&str> = text.split('\n').collect();
            if cell.paragraphs.len() > 1 && lines.len() == cell.paragraphs.len() {
                for (index, (paragraph, line)) in cell.paragraphs.iter_mut().zip(lines).enumerate() {
                    let spans: Vec<RunSpan> = unit
                        .run_spans
                        .iter()
                        .filter(|span| span.style.paragraph == index)
                        .copied()
                        .collect();
                    write_runs(paragraph, &spans, line, unit.address)?;
                }
                return Ok(());
            }

            // Collapse into the first paragraph that carried runs
            let target = unit.run_spans.first().map(|span| span.style.paragraph).unwrap_or(0);
            if target >= cell.paragraphs.len() {
                if !(unit.run_spans.is_empty() && cell.paragraphs.is_empty()) {
                    return Err(DocumentError::AddressNotFound(unit.address));
                }
                cell.paragraphs.push(Paragraph::default());
            }
            let spans: Vec<RunSpan> = unit
                .run_spans
                .iter()
                .filter(|span| span.style.paragraph == target)
                .map(|span| RunSpan {
                    style: super::StyleRef { paragraph: 0, ..span.style },
                    ..*span
                })
                .collect();
            let mut paragraph = cell.paragraphs.swap_remove(target);
            write_runs(&mut paragraph, &spans, text, unit.address)?;
            cell.paragraphs = vec![paragraph];
            Ok(())
        }
    }
}

fn write_runs(
    paragraph: &mut Paragraph,
    spans: &[RunSpan],
    text: &str,
    address: UnitAddress,
) -> Result<(), DocumentError> {
    if spans.is_empty() {
        match paragraph.runs.first_mut() {
            Some(run) => run.text = text.to_string(),
            None => paragraph.runs.push(Run::new(text)),
        }
        return Ok(());
    }

    if spans.iter().any(|span| span.style.run >= paragraph.runs.len()) {
        return Err(DocumentError::AddressNotFound(address));
    }

    let lengths: Vec<usize> = spans.iter().map(|span| span.len).collect();
    for (span, piece) in spans.iter().zip(split_proportionally(text, &lengths)) {
        paragraph.runs[span.style.run].text = piece;
    }
    Ok(())
}

/// Split `text` into `lengths.len()` pieces sized in proportion to `lengths`.
///
/// Zero-length entries receive an empty piece. When every length is zero
/// the first piece receives the whole text.
pub fn split_proportionally(text: &str, lengths: &[usize]) -> Vec<String> {
    if lengths.is_empty() {
        return Vec::new();
    }

    let chars: Vec<char> = text.chars().collect();
    let char_count = chars.len();
    let total: usize = lengths.iter().sum();

    let Some(last_nonzero) = lengths.iter().rposition(|&len| len > 0) else {
        let mut pieces = vec![String::new(); lengths.len()];
        pieces[0] = text.to_string();
        return pieces;
    };

    let mut pieces = Vec::with_capacity(lengths.len());
    let mut cumulative = 0;
    let mut start = 0;

    for (index, &len) in lengths.iter().enumerate() {
        if len == 0 {
            pieces.push(String::new());
            continue;
        }
        cumulative += len;
        let end = if index == last_nonzero {
            char_count
        } else {
            ((cumulative * char_count + total / 2) / total).clamp(start, char_count)
        };
        pieces.push(chars[start..end].iter().collect());
        start = end;
    }

    pieces
}
