/*!
 * Tests for srv3 word extraction
 */

use anyhow::Result;
use ytautosub::errors::ExtractionError;
use ytautosub::timedtext::{self, TimedTextDocument};
use crate::common;

/// Test that words come out in order with absolute start times
#[test]
fn test_extract_word_timings_withSampleDocument_shouldFlattenWords() -> Result<()> {
    let words = timedtext::extract_word_timings(common::SAMPLE_SRV3)?;

    let summary: Vec<(usize, &str, u64)> = words
        .iter()
        .map(|w| (w.id, w.word.as_str(), w.start_ms))
        .collect();
    assert_eq!(
        summary,
        vec![
            (0, "hello", 1000),
            (1, "world", 1240),
            (2, "this", 3000),
            (3, "is", 3300),
            (4, "a", 3500),
            (5, "small", 3620),
            (6, "test", 6000),
        ]
    );

    Ok(())
}

/// Test that extracting the same document twice gives identical results
#[test]
fn test_extract_word_timings_calledTwice_shouldBeDeterministic() -> Result<()> {
    let document = common::generated_srv3(123);
    let first = timedtext::extract_word_timings(&document)?;
    let second = timedtext::extract_word_timings(&document)?;

    assert_eq!(first, second);
    assert_eq!(first.len(), 123);
    assert!(first.iter().enumerate().all(|(i, w)| w.id == i));
    assert!(first.windows(2).all(|pair| pair[0].start_ms <= pair[1].start_ms));

    Ok(())
}

/// Test that a document without words is an extraction error
#[test]
fn test_extract_word_timings_withNoWords_shouldReturnEmpty() {
    let result = timedtext::extract_word_timings(common::EMPTY_SRV3);
    assert!(matches!(result, Err(ExtractionError::Empty)));
}

/// Test that a missing body is treated as an empty document
#[test]
fn test_parse_withoutBody_shouldYieldNoParagraphs() -> Result<()> {
    let document = TimedTextDocument::parse(r#"<timedtext format="3"><head/></timedtext>"#)?;
    assert!(document.paragraphs.is_empty());
    Ok(())
}

/// Test that malformed offsets fall back to zero instead of failing
#[test]
fn test_extract_word_timings_withMalformedOffsets_shouldUseZero() -> Result<()> {
    let document = r#"<timedtext><body>
<p t="abc"><s t="-5">one</s><s t="200">two</s></p>
<p><s>three</s></p>
</body></timedtext>"#;
    let words = timedtext::extract_word_timings(document)?;

    let starts: Vec<u64> = words.iter().map(|w| w.start_ms).collect();
    assert_eq!(starts, vec![0, 200, 0]);

    Ok(())
}

/// Test that an editor annotation line before the XML is ignored
#[test]
fn test_extract_word_timings_withFilepathAnnotation_shouldParse() -> Result<()> {
    let annotated = format!("// filepath: /tmp/captions.srv3\n{}", common::SAMPLE_SRV3);
    let words = timedtext::extract_word_timings(&annotated)?;
    assert_eq!(words.len(), 7);
    Ok(())
}

/// Test that an annotation line after the XML declaration is ignored
#[test]
fn test_extract_word_timings_withAnnotationAfterDeclaration_shouldParse() -> Result<()> {
    let annotated = common::SAMPLE_SRV3.replacen(
        "?><timedtext",
        "?>\n// filepath: /tmp/captions.srv3\n<timedtext",
        1,
    );
    assert!(annotated.contains("// filepath:"));

    let words = timedtext::extract_word_timings(&annotated)?;
    assert_eq!(words.len(), 7);
    assert_eq!(words[6].start_ms, 6000);
    Ok(())
}

/// Test that a foreign root element is rejected
#[test]
fn test_parse_withWrongRoot_shouldReturnUnexpectedRoot() {
    let result = TimedTextDocument::parse("<tt><body/></tt>");
    match result {
        Err(ExtractionError::UnexpectedRoot(name)) => assert_eq!(name, "tt"),
        other => panic!("Expected UnexpectedRoot, got {:?}", other),
    }
}

/// Test that broken XML is reported as an XML error
#[test]
fn test_parse_withBrokenXml_shouldReturnXmlError() {
    let result = TimedTextDocument::parse("<timedtext><body><p t=\"1\"><s>oops</p></body>");
    assert!(matches!(result, Err(ExtractionError::Xml(_))));
}

/// Test loading from disk, including the missing-file case
#[test]
fn test_load_word_timings_fromFile_shouldReadDocument() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(temp_dir.path(), "talk.srv3", common::SAMPLE_SRV3)?;

    assert_eq!(timedtext::load_word_timings(&path)?.len(), 7);

    let missing = timedtext::load_word_timings(temp_dir.path().join("missing.srv3"));
    assert!(matches!(missing, Err(ExtractionError::Io(_))));

    Ok(())
}
