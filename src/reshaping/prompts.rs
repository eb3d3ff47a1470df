/*!
 * Prompt construction for one reshaping batch.
 *
 * The prompt lists the rules the model must follow, then the batch's words as
 * pretty-printed JSON with their global ids.
 */

use super::planner::Batch;
use crate::timedtext::WordTiming;

const DATA_MARKER: &str = "TRANSCRIPT DATA:";

/// Instruction template. `{languages}` and `{continuation}` are substituted.
pub const SUBTITLE_RESHAPER: &str = r#"Convert these word-level transcript timings into subtitle blocks.
Language: {languages}
Format: JSON array where each element has:
st_id (index of the first word in subtitle), st_ms (start time in milliseconds),
lw_ms (last word start time in milliseconds), and text (subtitle text).

REQUIREMENTS:
1. General formatting:
   - Combine fragments into complete, grammatical sentences
   - DO Fix spelling, spacing, punctuation and capitalization
   - DO NOT add/remove any words
   - DO NOT translate the content
   - Natural length of sentences are 10-20 words
   - Avoid long sentences with more than 30 words

2. Subtitle structure:
   - Each subtitle should form a complete, natural thought or sentence
   - Each subtitle should end at a natural pause or break point
   - Keep related phrases together in the same subtitle
   - Each subtitle's st_ms must match the first word's start_ms exactly
   - Each subtitle's lw_ms must match the last word's start_ms exactly
   - Continue from the previous batch if this is a continuation

3. Special handling:
   - Look for natural sentence boundaries - DO NOT split mid-sentence
   - Paired readings (e.g. minimum and maximum temperature) must stay together in their own block
   - Enumerated lists (provinces, names, items) must NOT be split across blocks
{continuation}
RETURN FORMAT:
Return ONLY a clean JSON array with exactly this format:
[{"st_id": 0,"st_ms": 123,"lw_ms": 456,"text": "Subtitle text here"},...]

TRANSCRIPT DATA:
"#;

const CONTINUATION_NOTE: &str = r#"
IMPORTANT: This is a continuation from a previous batch.
The first words may be from an incomplete sentence.
Use the "id" field of each word as the absolute index in the transcript.
The st_id values in your response should reference these absolute "id" values.
If the first words continue a sentence from the previous batch, start with those words.
DO NOT repeat sentence beginnings from previous batches, but continue them properly.
"#;

/// Builds the prompt text for a batch
#[derive(Debug, Clone)]
pub struct BatchPromptBuilder {
    /// Human-readable language line, e.g. "Thai, English (few words)"
    language_line: String,
}

impl BatchPromptBuilder {
    pub fn new(language_line: impl Into<String>) -> Self {
        Self {
            language_line: language_line.into(),
        }
    }

    pub fn language_line(&self) -> &str {
        &self.language_line
    }

    /// Render the prompt for `batch`, whose words are `words`
    pub fn build(&self, batch: &Batch, words: &[WordTiming]) -> Result<String, serde_json::Error> {
        let continuation = if batch.is_continuation() { CONTINUATION_NOTE } else { "" };

        let mut prompt = SUBTITLE_RESHAPER
            .replace("{languages}", &self.language_line)
            .replace("{continuation}", continuation);

        if batch.is_continuation() {
            let index_note = format!(
                "{}\nIMPORTANT: These words start at global index {} in the full transcript.\n",
                DATA_MARKER, batch.start_index
            );
            prompt = prompt.replacen(DATA_MARKER, &index_note, 1);
        }

        prompt.push_str(&serde_json::to_string_pretty(words)?);

        Ok(prompt)
    }
}
