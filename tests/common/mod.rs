/*!
 * Common test utilities for the ytautosub test suite
 */

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use ytautosub::errors::ServiceError;
use ytautosub::providers::mock::MockProvider;
use ytautosub::reshaping::CandidateSubtitle;
use ytautosub::timedtext::WordTiming;

/// Initialize logging once for tests that want to see log output
pub fn init_test_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &Path, filename: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// A small srv3 document with seven words in three paragraphs.
///
/// Words and absolute starts: hello 1000, world 1240, this 3000, is 3300,
/// a 3500, small 3620, test 6000. The second `<p>` has no words and the
/// third holds an empty fragment.
pub const SAMPLE_SRV3: &str = r#"<?xml version="1.0" encoding="utf-8" ?><timedtext format="3">
<head>
<wp id="0" ap="7" ah="0" av="0" rc="14" cc="40"/>
</head>
<body>
<w t="0" id="1" wp="0" ws="0"/>
<p t="1000" d="2500" w="1"><s ac="0">hello</s><s t="240" ac="0"> world</s></p>
<p t="2990" d="10" w="1" a="1">
</p>
<p t="3000" d="2800" w="1"><s ac="0">this</s><s t="300" ac="0"> is</s><s t="500"> a</s><s t="620">  small</s><s t="700">   </s></p>
<p t="6000" d="1200" w="1"><s>test</s></p>
</body>
</timedtext>
"#;

/// A well-formed srv3 document whose body holds no words
pub const EMPTY_SRV3: &str = r#"<?xml version="1.0" encoding="utf-8" ?><timedtext format="3">
<body>
<p t="0" d="1000" w="1" a="1">
</p>
</body>
</timedtext>
"#;

/// Build an srv3 document with `count` words, five per paragraph, 300ms apart
pub fn generated_srv3(count: usize) -> String {
    let mut body = String::new();
    for (paragraph, chunk) in (0..count).collect::<Vec<_>>().chunks(5).enumerate() {
        let paragraph_start = paragraph * 1500;
        body.push_str(&format!("<p t=\"{}\" d=\"1500\" w=\"1\">", paragraph_start));
        for (i, word) in chunk.iter().enumerate() {
            body.push_str(&format!("<s t=\"{}\"> w{}</s>", i * 300, word));
        }
        body.push_str("</p>\n");
    }
    format!(
        "<?xml version=\"1.0\" encoding=\"utf-8\" ?><timedtext format=\"3\">\n<body>\n{}</body>\n</timedtext>\n",
        body
    )
}

/// `count` word timings with ids 0.., 300ms apart
pub fn generated_words(count: usize) -> Vec<WordTiming> {
    (0..count)
        .map(|id| WordTiming {
            id,
            word: format!("w{}", id),
            start_ms: id as u64 * 300,
        })
        .collect()
}

/// Words embedded in a reshaping prompt
pub fn words_in_prompt(prompt: &str) -> Vec<WordTiming> {
    let data = prompt
        .split_once("TRANSCRIPT DATA:")
        .map(|(_, data)| data)
        .unwrap_or_default();
    let array_start = data.find('[').unwrap_or(data.len());
    serde_json::from_str(&data[array_start..]).unwrap_or_default()
}

/// Group `words` into candidates of `chunk` words each
pub fn chunk_candidates(words: &[WordTiming], chunk: usize) -> Vec<CandidateSubtitle> {
    words
        .chunks(chunk)
        .map(|group| CandidateSubtitle {
            start_word_id: group[0].id,
            start_ms: group[0].start_ms,
            last_word_ms: group[group.len() - 1].start_ms,
            text: group
                .iter()
                .map(|w| w.word.as_str())
                .collect::<Vec<_>>()
                .join(" "),
            incomplete: false,
        })
        .collect()
}

/// Mock provider that answers every batch by grouping its words `chunk` at a time
pub fn chunking_provider(chunk: usize) -> MockProvider {
    MockProvider::from_fn(move |prompt| {
        let words = words_in_prompt(prompt);
        if words.is_empty() {
            return Err(ServiceError::RequestFailed("no words in prompt".to_string()));
        }
        Ok(MockProvider::candidates_reply(&chunk_candidates(&words, chunk)))
    })
}
