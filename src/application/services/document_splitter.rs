use unicode_segmentation::UnicodeSegmentation;

use crate::domain::Chunk;

const PARAGRAPH_SEPARATOR: &str = "\n\n";

/// Splits a document into chunks of at most `max_chunk_chars` characters.
///
/// Documents that fit return a single chunk. Oversized documents are split
/// on paragraph boundaries first, greedily packing paragraphs; a paragraph
/// that alone exceeds the limit is split on sentence boundaries and packed
/// the same way. A single sentence longer than the limit forms its own
/// chunk rather than being cut mid-sentence.
///
/// Pure and deterministic: the same `(text, max_chunk_chars)` always yields
/// the same chunk sequence, and concatenating the chunk texts in order
/// reproduces the document modulo boundary whitespace.
pub fn split_document(text: &str, max_chunk_chars: usize) -> Vec<Chunk> {
    if text.chars().count() <= max_chunk_chars {
        return vec![Chunk::new(0, text.to_string())];
    }

    let mut packer = ChunkPacker::new(max_chunk_chars);

    for paragraph in text
        .split(PARAGRAPH_SEPARATOR)
        .filter(|p| !p.trim().is_empty())
    {
        if paragraph.chars().count() <= max_chunk_chars {
            packer.push(paragraph, PARAGRAPH_SEPARATOR);
        } else {
            for sentence in split_into_sentences(paragraph) {
                packer.push(&sentence, " ");
            }
        }
    }

    packer.finish()
}

/// Greedy packer: appends pieces to the current chunk until the next piece
/// would exceed the limit, then starts a new chunk.
struct ChunkPacker {
    max_chunk_chars: usize,
    chunks: Vec<Chunk>,
    current: String,
    current_chars: usize,
}

impl ChunkPacker {
    fn new(max_chunk_chars: usize) -> Self {
        Self {
            max_chunk_chars,
            chunks: Vec::new(),
            current: String::new(),
            current_chars: 0,
        }
    }

    fn push(&mut self, piece: &str, joiner: &str) {
        let piece_chars = piece.chars().count();

        if piece_chars > self.max_chunk_chars {
            self.flush();
            let index = self.chunks.len();
            self.chunks.push(Chunk::new(index, piece.to_string()));
            return;
        }

        let joiner_chars = if self.current.is_empty() {
            0
        } else {
            joiner.chars().count()
        };

        if !self.current.is_empty()
            && self.current_chars + joiner_chars + piece_chars > self.max_chunk_chars
        {
            self.flush();
        }

        if !self.current.is_empty() {
            self.current.push_str(joiner);
            self.current_chars += joiner.chars().count();
        }
        self.current.push_str(piece);
        self.current_chars += piece_chars;
    }

    fn flush(&mut self) {
        if !self.current.is_empty() {
            let index = self.chunks.len();
            self.chunks
                .push(Chunk::new(index, std::mem::take(&mut self.current)));
            self.current_chars = 0;
        }
    }

    fn finish(mut self) -> Vec<Chunk> {
        self.flush();
        if self.chunks.is_empty() {
            // Whitespace-only document: keep the single-chunk contract.
            self.chunks.push(Chunk::new(0, String::new()));
        }
        self.chunks
    }
}

fn split_into_sentences(text: &str) -> Vec<String> {
    let graphemes: Vec<&str> = text.graphemes(true).collect();
    let mut sentences = Vec::new();
    let mut current = String::new();

    for (i, grapheme) in graphemes.iter().enumerate() {
        current.push_str(grapheme);

        if matches!(*grapheme, "." | "!" | "?") {
            let at_end = i + 1 == graphemes.len();
            let followed_by_space = graphemes
                .get(i + 1)
                .is_some_and(|next| next.trim().is_empty());

            if at_end || followed_by_space {
                let sentence = current.trim().to_string();
                if !sentence.is_empty() {
                    sentences.push(sentence);
                }
                current.clear();
            }
        }
    }

    let tail = current.trim().to_string();
    if !tail.is_empty() {
        sentences.push(tail);
    }

    sentences
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalized(text: &str) -> String {
        text.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    #[test]
    fn fitting_document_returns_single_chunk() {
        let chunks = split_document("short report", 100);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].index, 0);
        assert_eq!(chunks[0].text, "short report");
    }

    #[test]
    fn empty_document_returns_single_empty_chunk() {
        let chunks = split_document("", 100);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "");
    }

    #[test]
    fn paragraphs_are_packed_greedily() {
        let text = "aaaa\n\nbbbb\n\ncccc\n\ndddd";
        let chunks = split_document(text, 10);

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].text, "aaaa\n\nbbbb");
        assert_eq!(chunks[1].text, "cccc\n\ndddd");
    }

    #[test]
    fn chunk_indices_are_sequential() {
        let text = "aaaa\n\nbbbb\n\ncccc\n\ndddd\n\neeee";
        let chunks = split_document(text, 6);

        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.index, i);
        }
    }

    #[test]
    fn oversized_paragraph_splits_on_sentences() {
        let text = format!("{}\n\nOne. Two. Three. Four.", "x".repeat(30));
        let chunks = split_document(&text, 12);

        assert!(chunks.len() > 2);
        assert!(chunks.iter().skip(1).all(|c| c.text.chars().count() <= 12));
    }

    #[test]
    fn oversized_sentence_forms_its_own_chunk() {
        let long_sentence = format!("{} end.", "word ".repeat(20));
        let text = format!("Short one. {} Short two.\n\n{}", long_sentence, "y".repeat(40));
        let chunks = split_document(&text, 30);

        assert!(
            chunks
                .iter()
                .any(|c| c.text.chars().count() > 30 && c.text.contains("word")),
            "the atomic oversized sentence must survive as one chunk"
        );
    }

    #[test]
    fn no_content_is_dropped() {
        let text = "First paragraph with words. More words here.\n\nSecond paragraph. \
                    It has two sentences.\n\nThird paragraph closes the document.";
        let chunks = split_document(text, 40);

        let reassembled = chunks
            .iter()
            .map(|c| c.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        assert_eq!(normalized(&reassembled), normalized(text));
    }

    #[test]
    fn split_is_deterministic() {
        let text = "Alpha beta gamma. Delta epsilon.\n\nZeta eta theta iota kappa.".repeat(8);
        let first = split_document(&text, 50);
        let second = split_document(&text, 50);
        assert_eq!(first, second);
    }

    #[test]
    fn even_packing_produces_three_chunks() {
        // Six equal paragraphs, two per chunk.
        let paragraph = "p".repeat(400);
        let text = vec![paragraph.clone(); 6].join("\n\n");
        let chunks = split_document(&text, 900);

        assert_eq!(chunks.len(), 3);
        for chunk in &chunks {
            assert!(chunk.text.chars().count() <= 900);
        }
    }
}
