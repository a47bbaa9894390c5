//! Combines per-chunk results into one document-level result.

use std::collections::HashSet;
use std::time::Instant;

use scholia_core::types::{ChunkResult, ChunkedProcessingResult, DocumentChunk, QuizQuestion};

use crate::TRACING_TARGET_MERGER;

/// Maximum number of quiz questions kept after deduplication.
pub const MAX_QUIZ_QUESTIONS: usize = 15;

const SUMMARY_HEADING: &str = "## Document Summary";
const EXPLANATION_HEADING: &str = "## Detailed Explanation";
const SEPARATOR: &str = "\n\n";

/// Merges chunk results, in chunk order, into a [`ChunkedProcessingResult`].
///
/// `results` is expected to be index-aligned with `chunks`. The merged
/// `extracted_text` rejoins chunk contents, overlaps included, so failed chunks
/// still contribute their raw text.
#[tracing::instrument(
    skip_all,
    fields(chunk_count = chunks.len(), result_count = results.len()),
    target = TRACING_TARGET_MERGER
)]
pub fn merge_chunk_results(
    chunks: Vec<DocumentChunk>,
    results: &[ChunkResult],
) -> ChunkedProcessingResult {
    let started = Instant::now();

    let extracted_text = chunks
        .iter()
        .map(|c| c.content.as_str())
        .collect::<Vec<_>>()
        .join(SEPARATOR);

    let summary = with_heading(
        SUMMARY_HEADING,
        results.iter().filter_map(|r| r.result.summary.as_deref()),
    );
    let explanation = with_heading(
        EXPLANATION_HEADING,
        results.iter().filter_map(|r| r.result.explanation.as_deref()),
    );
    let quiz = dedup_quiz(
        results
            .iter()
            .filter_map(|r| r.result.quiz.as_deref())
            .flatten(),
    );

    let failed_chunks: Vec<String> = results
        .iter()
        .filter(|r| !r.success)
        .map(|r| {
            chunks
                .get(r.chunk_index)
                .map(|c| c.id.clone())
                .unwrap_or_else(|| scholia_core::types::chunk_id(r.chunk_index))
        })
        .collect();

    let total_characters = extracted_text.chars().count();
    let processing_time_ms = started.elapsed().as_millis() as u64;

    tracing::debug!(
        target: TRACING_TARGET_MERGER,
        total_characters,
        quiz_questions = quiz.len(),
        failed = failed_chunks.len(),
        "merged chunk results"
    );

    ChunkedProcessingResult {
        total_chunks: chunks.len(),
        chunks,
        total_characters,
        processing_time_ms,
        summary,
        explanation,
        quiz,
        extracted_text,
        failed_chunks,
    }
}

/// Joins non-empty fragments under `heading`, or returns `None` if there are none.
fn with_heading<'a>(heading: &str, fragments: impl Iterator<Item = &'a str>) -> Option<String> {
    let fragments: Vec<&str> = fragments.filter(|f| !f.is_empty()).collect();
    if fragments.is_empty() {
        return None;
    }
    Some(format!("{heading}{SEPARATOR}{}", fragments.join(SEPARATOR)))
}

/// Keeps the first question for each distinct text, up to [`MAX_QUIZ_QUESTIONS`].
fn dedup_quiz<'a>(questions: impl Iterator<Item = &'a QuizQuestion>) -> Vec<QuizQuestion> {
    let mut seen = HashSet::new();
    questions
        .filter(|q| seen.insert(q.question.as_str()))
        .take(MAX_QUIZ_QUESTIONS)
        .cloned()
        .collect()
}
