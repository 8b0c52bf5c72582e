use serde::{Deserialize, Serialize};

use super::section::{FilingSection, SectionType};

/// Offsets and section linkage for one chunk. Offsets are byte
/// positions into the text that was chunked; `total_length` is that
/// text's byte length.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkMetadata {
    pub start_pos: usize,
    pub end_pos: usize,
    pub total_length: usize,
    pub section_type: Option<SectionType>,
    pub is_complete_section: bool,
    pub total_section_chunks: Option<usize>,
    pub section_word_count: Option<usize>,
    pub section_char_count: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentChunk {
    pub content: String,
    pub section_name: String,
    pub chunk_index: usize,
    pub word_count: usize,
    pub char_count: usize,
    pub metadata: ChunkMetadata,
}

fn ceil_char_boundary(text: &str, mut index: usize) -> usize {
    if index >= text.len() {
        return text.len();
    }
    while !text.is_char_boundary(index) {
        index += 1;
    }
    index
}

/// Splits text into chunks of at most ~`chunk_size` bytes, snapping the
/// cut to a paragraph break or sentence end when one lies past the
/// chunk's midpoint (snapping earlier would produce degenerate short
/// chunks). Consecutive chunks overlap by `overlap_size` so a phrase
/// spanning a cut is fully visible in at least one chunk. Start always
/// advances by at least one byte, so the loop terminates for any
/// `overlap_size < chunk_size`.
pub fn chunk_content(
    content: &str,
    chunk_size: usize,
    overlap_size: usize,
    section_name: &str,
) -> Vec<DocumentChunk> {
    let mut chunks = Vec::new();
    if content.is_empty() || chunk_size == 0 {
        return chunks;
    }

    let total = content.len();
    let mut start = 0usize;
    let mut chunk_index = 0usize;

    while start < total {
        let mut end = ceil_char_boundary(content, (start + chunk_size).min(total));

        if end < total {
            let window = &content[start..end];
            let midpoint = start + chunk_size / 2;
            let paragraph_cut = window
                .rfind("\n\n")
                .map(|p| start + p)
                .filter(|&p| p > midpoint);
            if let Some(cut) = paragraph_cut {
                end = cut + 2;
            } else if let Some(cut) = window
                .rfind(". ")
                .map(|p| start + p)
                .filter(|&p| p > midpoint)
            {
                end = cut + 2;
            }
        }

        let piece = content[start..end].trim();
        if !piece.is_empty() {
            chunks.push(DocumentChunk {
                content: piece.to_string(),
                section_name: section_name.to_string(),
                chunk_index,
                word_count: piece.split_whitespace().count(),
                char_count: piece.chars().count(),
                metadata: ChunkMetadata {
                    start_pos: start,
                    end_pos: end,
                    total_length: total,
                    section_type: None,
                    is_complete_section: false,
                    total_section_chunks: None,
                    section_word_count: None,
                    section_char_count: None,
                },
            });
            chunk_index += 1;
        }

        if end >= total {
            break;
        }
        start = ceil_char_boundary(content, end.saturating_sub(overlap_size).max(start + 1));
    }

    chunks
}

/// Section-aware chunking: a section that fits `chunk_size` becomes one
/// complete chunk; larger sections are split with `chunk_content`, each
/// piece tagged with the owning section's identity and sibling count.
pub fn chunk_by_sections(
    sections: &[FilingSection],
    chunk_size: usize,
    overlap_size: usize,
) -> Vec<DocumentChunk> {
    let mut all_chunks = Vec::new();

    for section in sections {
        if section.content.is_empty() {
            continue;
        }

        if section.char_count <= chunk_size {
            all_chunks.push(DocumentChunk {
                content: section.content.clone(),
                section_name: section.name.clone(),
                chunk_index: 0,
                word_count: section.word_count,
                char_count: section.char_count,
                metadata: ChunkMetadata {
                    start_pos: 0,
                    end_pos: section.content.len(),
                    total_length: section.content.len(),
                    section_type: Some(section.section_type),
                    is_complete_section: true,
                    total_section_chunks: Some(1),
                    section_word_count: Some(section.word_count),
                    section_char_count: Some(section.char_count),
                },
            });
            continue;
        }

        let mut section_chunks =
            chunk_content(&section.content, chunk_size, overlap_size, &section.name);
        let sibling_total = section_chunks.len();
        for chunk in &mut section_chunks {
            chunk.metadata.section_type = Some(section.section_type);
            chunk.metadata.total_section_chunks = Some(sibling_total);
            chunk.metadata.section_word_count = Some(section.word_count);
            chunk.metadata.section_char_count = Some(section.char_count);
        }
        all_chunks.extend(section_chunks);
    }

    all_chunks
}
