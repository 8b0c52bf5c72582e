pub mod chunk;
pub mod events;
pub mod section;
pub mod text;

pub use chunk::{chunk_by_sections, chunk_content, ChunkMetadata, DocumentChunk};
pub use events::{detect_8k_items, EightKItem};
pub use section::{extract_sections, filing_summary, FilingSection, FilingSummary, SectionType};
pub use text::normalize_content;
