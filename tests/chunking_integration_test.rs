//! Integration tests for chunking and recombination

use delilah::chunking::{combine_chunks, Chunk, Chunker};
use delilah::config::ChunkingConfig;
use test_case::test_case;

fn narrative(lines: usize) -> String {
    (0..lines)
        .map(|i| match i % 4 {
            0 => format!("Session {i}: client reported moderate pain after walking."),
            1 => "Transfers were completed independently.".to_string(),
            2 => String::new(),
            _ => format!("Café visit {i} tolerated for twenty minutes, fatigue noted."),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Rebuild the source text by dropping each chunk's shared prefix
fn reassemble(chunks: &[Chunk]) -> String {
    let mut text = String::new();
    for chunk in chunks {
        if chunk.index == 0 {
            text.push_str(&chunk.text);
            continue;
        }
        let skip = if chunk.overlap_chars == 0 {
            0
        } else {
            chunk.overlap_chars + 1
        };
        text.push('\n');
        text.extend(chunk.text.chars().skip(skip));
    }
    text
}

#[test_case(120, 30 ; "small chunks")]
#[test_case(300, 100 ; "medium chunks")]
#[test_case(500, 0 ; "no overlap")]
fn test_chunks_respect_bounds_and_preserve_text(max: usize, overlap: usize) {
    let text = narrative(40);
    let chunker = Chunker::new(max, overlap).unwrap();
    let chunks = chunker.split(&text);

    assert!(chunks.len() > 1);
    for (i, chunk) in chunks.iter().enumerate() {
        assert_eq!(chunk.index, i);
        assert!(chunk.char_len() <= max, "chunk {i} is {} chars", chunk.char_len());
        assert!(chunk.overlap_chars <= overlap);
    }
    assert_eq!(reassemble(&chunks), text);
}

#[test]
fn test_overlap_is_tail_of_previous_chunk() {
    let text = narrative(30);
    let chunks = Chunker::new(200, 80).unwrap().split(&text);

    for pair in chunks.windows(2) {
        let (prev, next) = (&pair[0], &pair[1]);
        let tail: String = prev
            .text
            .chars()
            .skip(prev.char_len() - next.overlap_chars)
            .collect();
        let head: String = next.text.chars().take(next.overlap_chars).collect();
        assert_eq!(head, tail);
    }
    assert!(chunks.iter().skip(1).any(|c| c.overlap_chars > 0));
}

#[test]
fn test_chunker_from_default_config() {
    let chunker = Chunker::from_config(&ChunkingConfig::default()).unwrap();
    assert_eq!(chunker.max_chunk_size(), 2000);
    assert_eq!(chunker.chunk_overlap(), 250);

    let short = narrative(8);
    assert!(!chunker.needs_split(&short));
    assert_eq!(chunker.split_text(&short), vec![short]);
}

#[test]
fn test_chunker_rejects_invalid_config() {
    let config = ChunkingConfig {
        max_chunk_size: 100,
        chunk_overlap: 100,
        ..Default::default()
    };
    assert!(Chunker::from_config(&config).is_err());
}

#[test]
fn test_combine_collapses_extra_blank_lines() {
    let enhanced = vec![
        "First part.\n".to_string(),
        "\nSecond part.".to_string(),
        "Third part.".to_string(),
    ];
    assert_eq!(
        combine_chunks(&enhanced),
        "First part.\n\nSecond part.\n\nThird part."
    );
}

#[test]
fn test_split_then_combine_keeps_every_line() {
    let text = narrative(24);
    let chunker = Chunker::new(250, 0).unwrap();
    let combined = combine_chunks(&chunker.split_text(&text));

    for line in text.lines().filter(|l| !l.is_empty()) {
        assert!(combined.contains(line));
    }
}
