use thiserror::Error;

/// Closed set of failure kinds for filing decomposition and fact
/// extraction. Every kind is locally recoverable: the core returns
/// empty or unresolved results instead of propagating, and the boundary
/// layer decides what (if anything) to report.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The submission contains no `<DOCUMENT>` blocks. The demultiplexer
    /// recovers by returning an empty list; only a boundary layer that
    /// must report something raises this.
    #[error("submission contains no <DOCUMENT> blocks")]
    StructuralParseFailure,

    /// The requested concept has no tag anywhere in the filing. Core
    /// lookups signal this with `None`; the boundary converts.
    #[error("concept {0} not present in filing")]
    ConceptNotFound(String),

    /// A fact's contextRef points at a context id that was never
    /// declared. The extractor recovers by keeping the fact with an
    /// unresolved period.
    #[error("fact references undefined context {0}")]
    MalformedContext(String),

    /// The rendered result exceeds the transport ceiling. Enforced only
    /// at the boundary, after the core returns.
    #[error("content is {size} bytes, over the {limit} byte transport ceiling; retrieve by section or chunk instead")]
    OversizedContent { size: usize, limit: usize },
}

/// Transport-ceiling check for boundary layers. The core itself never
/// truncates.
pub fn enforce_ceiling(content: &str, limit: usize) -> Result<(), ExtractError> {
    if content.len() > limit {
        return Err(ExtractError::OversizedContent {
            size: content.len(),
            limit,
        });
    }
    Ok(())
}
