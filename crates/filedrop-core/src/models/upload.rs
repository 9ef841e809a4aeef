use bytes::Bytes;

/// A file extracted from an upload request, not yet validated or stored.
#[derive(Debug, Clone)]
pub struct CandidateFile {
    pub file_name: String,
    pub content_type: String,
    pub data: Bytes,
}

impl CandidateFile {
    pub fn new(file_name: impl Into<String>, content_type: impl Into<String>, data: Bytes) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            data,
        }
    }

    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }
}
