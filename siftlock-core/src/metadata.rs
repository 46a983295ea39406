// siftlock-core/src/metadata.rs
//! LLM-safe structural summaries: counts and averages only, no recoverable
//! text. These are the only derivatives of a document allowed to cross the
//! egress boundary without review.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::HashMap;

use crate::entity::RedactionMap;
use crate::extract::RawExtract;
use crate::store::DocumentRecord;

static PARAGRAPH_SPLIT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n\s*\n").unwrap());
static SENTENCE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^.!?]+[.!?]").unwrap());

/// Aggregate shape of a text.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StructureInfo {
    pub paragraph_count: usize,
    pub sentence_count: usize,
    pub word_count: usize,
    pub avg_word_length: f64,
    pub avg_sentence_length: f64,
}

/// Entity tallies by type and source, values never included.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EntitySummary {
    pub entity_counts: HashMap<String, usize>,
    pub total_entities: usize,
    pub sources: HashMap<String, usize>,
}

/// Everything safe to report about one document.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentMetadata {
    pub document_id: String,
    pub filename: String,
    pub file_type: String,
    pub file_size: usize,
    pub sha256: String,
    pub structure: StructureInfo,
    pub entities: EntitySummary,
    pub extract: crate::extract::ExtractMetadata,
    pub extracted_at: DateTime<Utc>,
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Counts paragraphs, sentences and words without retaining content.
pub fn analyze_structure(text: &str) -> StructureInfo {
    if text.is_empty() {
        return StructureInfo::default();
    }
    let paragraph_count = PARAGRAPH_SPLIT_RE
        .split(text)
        .filter(|p| !p.trim().is_empty())
        .count();
    let sentence_count = SENTENCE_RE.find_iter(text).count();
    let words: Vec<&str> = text.split_whitespace().collect();
    let word_count = words.len();
    let avg_word_length = if word_count > 0 {
        words.iter().map(|w| w.chars().count()).sum::<usize>() as f64 / word_count as f64
    } else {
        0.0
    };
    let avg_sentence_length = if sentence_count > 0 {
        word_count as f64 / sentence_count as f64
    } else {
        0.0
    };
    StructureInfo {
        paragraph_count,
        sentence_count,
        word_count,
        avg_word_length: round2(avg_word_length),
        avg_sentence_length: round2(avg_sentence_length),
    }
}

/// Tallies entities by type and source.
pub fn summarize_entities(map: Option<&RedactionMap>) -> EntitySummary {
    let Some(map) = map else {
        return EntitySummary::default();
    };
    let mut summary = EntitySummary {
        total_entities: map.entities.len(),
        ..Default::default()
    };
    for entity in &map.entities {
        *summary
            .entity_counts
            .entry(entity.entity_type.clone())
            .or_insert(0) += 1;
        *summary.sources.entry(entity.source.to_string()).or_insert(0) += 1;
    }
    summary
}

/// Builds the full metadata view from the record, raw extract and the
/// redaction map when one exists.
pub fn extract_metadata(
    record: &DocumentRecord,
    extract: &RawExtract,
    map: Option<&RedactionMap>,
) -> DocumentMetadata {
    DocumentMetadata {
        document_id: record.id.clone(),
        filename: record.filename.clone(),
        file_type: record.file_type.to_string(),
        file_size: record.size,
        sha256: record.sha256.clone(),
        structure: analyze_structure(&extract.text),
        entities: summarize_entities(map),
        extract: extract.metadata.clone(),
        extracted_at: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{DetectedEntity, EntitySource};

    #[test]
    fn test_structure_counts() {
        let text = "One two three. Four five!\n\nSix seven eight nine?";
        let info = analyze_structure(text);
        assert_eq!(info.paragraph_count, 2);
        assert_eq!(info.sentence_count, 3);
        assert_eq!(info.word_count, 9);
        assert_eq!(info.avg_sentence_length, 3.0);
    }

    #[test]
    fn test_empty_text_structure() {
        assert_eq!(analyze_structure(""), StructureInfo::default());
    }

    #[test]
    fn test_entity_summary_counts_by_type_and_source() {
        let entity = |etype: &str, source| DetectedEntity {
            entity_type: etype.to_string(),
            source,
            start: 0,
            end: 1,
            confidence: 0.9,
            original_text: "x".to_string(),
            placeholder: String::new(),
        };
        let map = RedactionMap {
            original_text: "x".to_string(),
            redacted_text: "x".to_string(),
            entities: vec![
                entity("EMAIL_ADDRESS", EntitySource::Pii),
                entity("EMAIL_ADDRESS", EntitySource::Pii),
                entity("AWS_ACCESS_KEY", EntitySource::Secret),
            ],
            created_at: Utc::now(),
        };
        let summary = summarize_entities(Some(&map));
        assert_eq!(summary.total_entities, 3);
        assert_eq!(summary.entity_counts["EMAIL_ADDRESS"], 2);
        assert_eq!(summary.sources["pii"], 2);
        assert_eq!(summary.sources["secret"], 1);
    }

    #[test]
    fn test_no_map_yields_empty_summary() {
        assert_eq!(summarize_entities(None), EntitySummary::default());
    }
}
