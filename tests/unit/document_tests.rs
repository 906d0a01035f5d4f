/*!
 * Tests for unit extraction and write-back over a full deck
 */

use slidelingo::document::writer::apply_unit;
use slidelingo::document::{apply_units, extract_units, Presentation, RunStyle};
use slidelingo::errors::DocumentError;
use slidelingo::{UnitAddress, UnitStatus};

use crate::common::{self, SAMPLE_TEXTS};

#[test]
fn test_extract_units_withSampleDeck_shouldFollowDocumentOrder() {
    let units = extract_units(&common::sample_deck()).unwrap();

    let texts: Vec<&str> = units.iter().map(|u| u.source_text.as_str()).collect();
    assert_eq!(texts, SAMPLE_TEXTS.to_vec());
    assert!(units.iter().all(|u| u.status == UnitStatus::Pending));
}

#[test]
fn test_extract_units_withBlankParagraph_shouldKeepOriginalIndex() {
    let units = extract_units(&common::sample_deck()).unwrap();

    assert_eq!(
        units[9].address,
        UnitAddress::Paragraph { slide: 2, shape: 0, paragraph: 2 }
    );
}

#[test]
fn test_extract_units_withTable_shouldAddressCells() {
    let units = extract_units(&common::sample_deck()).unwrap();

    assert_eq!(
        units[7].address,
        UnitAddress::TableCell { slide: 1, shape: 0, row: 1, column: 1 }
    );
    assert_eq!(units[7].source_text, "12%");
}

#[test]
fn test_extract_units_withInconsistentTable_shouldFail() {
    let mut deck = common::sample_deck();
    deck.slides[1].shapes[0].table.as_mut().unwrap().rows[1].cells.pop();

    assert!(matches!(
        extract_units(&deck),
        Err(DocumentError::InvalidStructure(_))
    ));
}

#[test]
fn test_apply_units_withTranslations_shouldKeepBoldRun() {
    let mut deck = common::sample_deck();
    let mut units = extract_units(&deck).unwrap();
    for unit in units.iter_mut() {
        unit.translated_text = Some(unit.source_text.to_uppercase());
        unit.status = UnitStatus::Translated;
    }

    let summary = apply_units(&mut deck, &units);
    assert_eq!(summary.applied, SAMPLE_TEXTS.len());
    assert!(summary.is_clean());

    let paragraph = deck.paragraph(&units[3].address).unwrap();
    assert_eq!(paragraph.text(), "MARGIN IMPROVED BY 4 POINTS");
    assert_eq!(paragraph.runs.len(), 2);
    assert_eq!(paragraph.runs[0].style.bold, Some(true));
    assert_eq!(paragraph.runs[1].style, RunStyle::default());
}

#[test]
fn test_apply_units_withMixedStatuses_shouldOnlyReplaceSucceeded() {
    let mut deck = common::sample_deck();
    let mut units = extract_units(&deck).unwrap();
    units[0].translated_text = Some("Revue trimestrielle".to_string());
    units[0].status = UnitStatus::Cached;
    units[1].translated_text = Some("ignored".to_string());
    units[1].status = UnitStatus::Failed;

    let summary = apply_units(&mut deck, &units);

    // Pending units are not written at all
    assert_eq!(summary.applied, 2);
    assert_eq!(deck.node_text(&units[0].address).unwrap(), "Revue trimestrielle");
    assert_eq!(deck.node_text(&units[1].address).unwrap(), SAMPLE_TEXTS[1]);
    assert_eq!(deck.node_text(&units[2].address).unwrap(), SAMPLE_TEXTS[2]);
}

#[test]
fn test_apply_unit_withMissingSlide_shouldReportAddress() {
    let mut deck = Presentation::default();
    let mut units = extract_units(&common::sample_deck()).unwrap();
    units[0].status = UnitStatus::Translated;
    units[0].translated_text = Some("x".to_string());

    let error = apply_unit(&mut deck, &units[0]).unwrap_err();
    assert!(matches!(error, DocumentError::AddressNotFound(address) if address == units[0].address));
}

#[test]
fn test_presentation_save_withUnknownFields_shouldPreserveThem() {
    let dir = common::create_temp_dir().unwrap();
    let path = dir.path().join("deck.json");
    std::fs::write(
        &path,
        r#"{
            "slides": [{"layout": "title", "shapes": [{"name": "Title 1", "geometry": {"x": 10},
                "text_frame": {"paragraphs": [{"runs": [{"text": "Hello", "style": {"bold": true, "kerning": 2}}]}]}}]}],
            "theme": "corporate"
        }"#,
    )
    .unwrap();

    let deck = Presentation::open(&path).unwrap();
    let out = dir.path().join("out.json");
    deck.save(&out).unwrap();

    let saved: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(saved["theme"], "corporate");
    assert_eq!(saved["slides"][0]["layout"], "title");
    assert_eq!(saved["slides"][0]["shapes"][0]["geometry"]["x"], 10);
    assert_eq!(saved["slides"][0]["shapes"][0]["text_frame"]["paragraphs"][0]["runs"][0]["style"]["kerning"], 2);
}

#[test]
fn test_write_deck_withSampleDeck_shouldReopenIdentically() {
    let dir = common::create_temp_dir().unwrap();
    let deck = common::sample_deck();
    let path = common::write_deck(dir.path(), "sample.json", &deck).unwrap();

    assert_eq!(Presentation::open(&path).unwrap(), deck);
}
