/*!
 * Slide document tree.
 *
 * The tree mirrors the presentation formatting model: slides hold shapes,
 * shapes hold either a text frame or a table, and every paragraph is a list
 * of styled runs. Fields this crate does not interpret are kept in `extra`
 * maps so that they survive a load/save cycle untouched.
 */

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::DocumentError;

use super::UnitAddress;

/// A complete presentation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Presentation {
    /// Slides in display order
    #[serde(default)]
    pub slides: Vec<Slide>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A single slide
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Slide {
    /// Shapes in z-order
    #[serde(default)]
    pub shapes: Vec<Shape>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A shape on a slide.
///
/// Shapes without a text frame or table (pictures, connectors) carry only
/// their metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_frame: Option<TextFrame>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<Table>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Text container of a shape or table cell
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextFrame {
    #[serde(default)]
    pub paragraphs: Vec<Paragraph>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A table shape
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    #[serde(default)]
    pub rows: Vec<TableRow>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableRow {
    #[serde(default)]
    pub cells: Vec<TableCell>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableCell {
    #[serde(default)]
    pub paragraphs: Vec<Paragraph>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A paragraph made of styled runs
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Paragraph {
    #[serde(default)]
    pub runs: Vec<Run>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A contiguous span of text sharing one style
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Run {
    #[serde(default)]
    pub text: String,

    #[serde(default)]
    pub style: RunStyle,
}

/// Character formatting of a run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunStyle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bold: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub italic: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub underline: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_pt: Option<f32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Run {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: RunStyle::default(),
        }
    }

    pub fn styled(text: impl Into<String>, style: RunStyle) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }
}

impl Paragraph {
    /// Create a paragraph from runs
    pub fn from_runs(runs: Vec<Run>) -> Self {
        Self {
            runs,
            extra: Map::new(),
        }
    }

    /// Full paragraph text, all runs concatenated
    pub fn text(&self) -> String {
        self.runs.iter().map(|run| run.text.as_str()).collect()
    }
}

impl TableCell {
    pub fn from_paragraphs(paragraphs: Vec<Paragraph>) -> Self {
        Self {
            paragraphs,
            extra: Map::new(),
        }
    }

    /// Cell text, paragraphs joined by line breaks
    pub fn text(&self) -> String {
        self.paragraphs
            .iter()
            .map(Paragraph::text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Shape {
    pub fn with_paragraphs(paragraphs: Vec<Paragraph>) -> Self {
        Self {
            text_frame: Some(TextFrame {
                paragraphs,
                extra: Map::new(),
            }),
            ..Default::default()
        }
    }

    pub fn with_table(rows: Vec<Vec<TableCell>>) -> Self {
        Self {
            table: Some(Table {
                rows: rows
                    .into_iter()
                    .map(|cells| TableRow {
                        cells,
                        extra: Map::new(),
                    })
                    .collect(),
                extra: Map::new(),
            }),
            ..Default::default()
        }
    }
}

impl Presentation {
    /// Check the tree for inconsistencies that make addressing unreliable
    pub fn validate(&self) -> Result<(), DocumentError> {
        for (slide_index, slide) in self.slides.iter().enumerate() {
            for (shape_index, shape) in slide.shapes.iter().enumerate() {
                let Some(table) = &shape.table else {
                    continue;
                };
                let Some(first_row) = table.rows.first() else {
                    continue;
                };
                let width = first_row.cells.len();
                if let Some((row_index, row)) = table
                    .rows
                    .iter()
                    .enumerate()
                    .find(|(_, row)| row.cells.len() != width)
                {
                    return Err(DocumentError::InvalidStructure(format!(
                        "table on slide {} shape {} has {} cells in row {} but {} in row 0",
                        slide_index,
                        shape_index,
                        row.cells.len(),
                        row_index,
                        width
                    )));
                }
            }
        }
        Ok(())
    }

    /// Current text of the node at `address`
    pub fn node_text(&self, address: &UnitAddress) -> Option<String> {
        match *address {
            UnitAddress::Paragraph { .. } => self.paragraph(address).map(Paragraph::text),
            UnitAddress::TableCell { .. } => self.cell(address).map(TableCell::text),
        }
    }

    pub fn paragraph(&self, address: &UnitAddress) -> Option<&Paragraph> {
        match *address {
            UnitAddress::Paragraph { slide, shape, paragraph } => self
                .slides
                .get(slide)?
                .shapes
                .get(shape)?
                .text_frame
                .as_ref()?
                .paragraphs
                .get(paragraph),
            UnitAddress::TableCell { .. } => None,
        }
    }

    pub fn paragraph_mut(&mut self, address: &UnitAddress) -> Option<&mut Paragraph> {
        match *address {
            UnitAddress::Paragraph { slide, shape, paragraph } => self
                .slides
                .get_mut(slide)?
                .shapes
                .get_mut(shape)?
                .text_frame
                .as_mut()?
                .paragraphs
                .get_mut(paragraph),
            UnitAddress::TableCell { .. } => None,
        }
    }

    pub fn cell(&self, address: &UnitAddress) -> Option<&TableCell> {
        match *address {
            UnitAddress::TableCell { slide, shape, row, column } => self
                .slides
                .get(slide)?
                .shapes
                .get(shape)?
                .table
                .as_ref()?
                .rows
                .get(row)?
                .cells
                .get(column),
            UnitAddress::Paragraph { .. } => None,
        }
    }

    pub fn cell_mut(&mut self, address: &UnitAddress) -> Option<&mut TableCell> {
        match *address {
            UnitAddress::TableCell { slide, shape, row, column } => self
                .slides
                .get_mut(slide)?
                .shapes
                .get_mut(shape)?
                .table
                .as_mut()?
                .rows
                .get_mut(row)?
                .cells
                .get_mut(column),
            UnitAddress::Paragraph { .. } => None,
        }
    }
}
