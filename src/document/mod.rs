/*!
 * Slide document model and the units extracted from it.
 *
 * - `model`: the slide/shape/paragraph/table tree
 * - `package`: loading and saving a document package
 * - `extract`: walking the tree into translatable content units
 * - `writer`: writing final unit text back into the tree
 */

use std::fmt;

use serde::{Deserialize, Serialize};

pub mod extract;
pub mod model;
pub mod package;
pub mod writer;

pub use self::extract::extract_units;
pub use self::model::{Paragraph, Presentation, Run, RunStyle, Shape, Slide, TableCell};
pub use self::writer::{apply_units, split_proportionally, WriteSummary};

/// Stable locator of a translatable node.
///
/// Addresses are plain indices, so they stay valid after the tree is
/// cloned or reloaded from the same package.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum UnitAddress {
    Paragraph {
        slide: usize,
        shape: usize,
        paragraph: usize,
    },
    TableCell {
        slide: usize,
        shape: usize,
        row: usize,
        column: usize,
    },
}

impl fmt::Display for UnitAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Paragraph { slide, shape, paragraph } => write!(
                f,
                "slide {} shape {} paragraph {}",
                slide + 1,
                shape + 1,
                paragraph + 1
            ),
            Self::TableCell { slide, shape, row, column } => write!(
                f,
                "slide {} shape {} cell ({}, {})",
                slide + 1,
                shape + 1,
                row + 1,
                column + 1
            ),
        }
    }
}

/// Position of a run inside the addressed node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StyleRef {
    /// Paragraph index within the node (always 0 for paragraph units)
    pub paragraph: usize,
    /// Run index within that paragraph
    pub run: usize,
}

/// Original length of one styled run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSpan {
    /// Length in characters
    pub len: usize,
    pub style: StyleRef,
}

/// Processing state of a content unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnitStatus {
    Pending,
    Cached,
    Translated,
    Failed,
}

impl UnitStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl fmt::Display for UnitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Pending => "pending",
            Self::Cached => "cached",
            Self::Translated => "translated",
            Self::Failed => "failed",
        };
        f.write_str(label)
    }
}

/// One translatable piece of text and where it came from
#[derive(Debug, Clone, PartialEq)]
pub struct ContentUnit {
    pub address: UnitAddress,
    pub source_text: String,
    pub run_spans: Vec<RunSpan>,
    pub status: UnitStatus,
    pub translated_text: Option<String>,
}

impl ContentUnit {
    pub fn new(address: UnitAddress, source_text: String, run_spans: Vec<RunSpan>) -> Self {
        Self {
            address,
            source_text,
            run_spans,
            status: UnitStatus::Pending,
            translated_text: None,
        }
    }

    /// Text the writer should apply.
    ///
    /// Anything other than a cached or translated unit yields the source text.
    pub fn final_text(&self) -> &str {
        match (self.status, &self.translated_text) {
            (UnitStatus::Cached | UnitStatus::Translated, Some(text)) => text,
            _ => &self.source_text,
        }
    }
}
