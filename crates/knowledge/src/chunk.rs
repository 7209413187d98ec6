//! Word-window chunking of source documents.

/// Collapse whitespace runs (including newlines) into single spaces.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Split a text into overlapping word windows.
///
/// Each chunk holds up to `chunk_size` words; consecutive chunks share
/// `chunk_overlap` words. The step is clamped to at least one word so a
/// degenerate overlap cannot loop forever.
pub fn chunk_words(text: &str, chunk_size: usize, chunk_overlap: usize) -> Vec<String> {
    if chunk_size == 0 {
        return Vec::new();
    }
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.is_empty() {
        return Vec::new();
    }

    let step = chunk_size.saturating_sub(chunk_overlap).max(1);
    let mut chunks = Vec::new();
    let mut start = 0;
    while start < words.len() {
        let end = (start + chunk_size).min(words.len());
        chunks.push(words[start..end].join(" "));
        if end == words.len() {
            break;
        }
        start += step;
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_collapses_runs() {
        assert_eq!(
            normalize_whitespace("a  b\n\n c\t\td "),
            "a b c d"
        );
    }

    #[test]
    fn short_text_is_one_chunk() {
        let chunks = chunk_words("hold the power button", 50, 10);
        assert_eq!(chunks, vec!["hold the power button"]);
    }

    #[test]
    fn empty_text_produces_no_chunks() {
        assert!(chunk_words("   ", 50, 10).is_empty());
        assert!(chunk_words("words here", 0, 0).is_empty());
    }

    #[test]
    fn windows_overlap_by_configured_amount() {
        // 10 words, size 4, overlap 2 → starts at 0, 2, 4, 6, 8
        let text = "w0 w1 w2 w3 w4 w5 w6 w7 w8 w9";
        let chunks = chunk_words(text, 4, 2);
        assert_eq!(chunks.len(), 5);
        assert_eq!(chunks[0], "w0 w1 w2 w3");
        assert_eq!(chunks[1], "w2 w3 w4 w5");
        assert_eq!(chunks[4], "w8 w9");
    }

    #[test]
    fn degenerate_overlap_still_terminates() {
        let text = "a b c d e f";
        let chunks = chunk_words(text, 3, 3);
        // step clamps to 1 word
        assert_eq!(chunks[0], "a b c");
        assert_eq!(chunks[1], "b c d");
        assert_eq!(chunks.last().unwrap(), "d e f");
    }

    #[test]
    fn every_word_lands_in_some_chunk() {
        let text = "one two three four five six seven eight nine";
        let chunks = chunk_words(text, 4, 1);
        let joined = chunks.join(" ");
        for word in text.split_whitespace() {
            assert!(joined.contains(word));
        }
    }
}
