pub mod codec;
pub mod collection;
pub mod ingest;
pub mod search;
pub mod store;
pub mod types;

/// Convert an f32 embedding slice to raw bytes for sqlite-vec.
pub fn embedding_to_bytes(embedding: &[f32]) -> &[u8] {
    unsafe {
        std::slice::from_raw_parts(
            embedding.as_ptr() as *const u8,
            embedding.len() * std::mem::size_of::<f32>(),
        )
    }
}

/// Deterministic document ID: `{source_id}_{section_number}_{ordinal}`.
///
/// This is the sole dedup key. Two different IDs holding identical content are
/// distinct documents on purpose — identity is provenance, not content.
pub fn document_id(source_id: &str, section: types::Section, ordinal: usize) -> String {
    format!("{source_id}_{}_{ordinal}", section.number())
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::Section;

    #[test]
    fn document_ids_are_deterministic() {
        assert_eq!(document_id("vid1", Section::Dialogue, 0), "vid1_2_0");
        assert_eq!(document_id("vid1", Section::PhraseMatch, 7), "vid1_3_7");
    }

    #[test]
    fn embedding_bytes_round_trip() {
        let v = vec![1.0f32, -2.5, 0.0];
        let bytes = embedding_to_bytes(&v);
        assert_eq!(bytes.len(), 12);
        let back: Vec<f32> = bytes
            .chunks_exact(4)
            .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect();
        assert_eq!(back, v);
    }
}
