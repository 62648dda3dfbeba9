//! Fresh node ids for nodes the editor creates itself, such as pasted copies.
//!
//! Ids look like `<seed>-<n>`. The seed is a CRC32 of the document id, so
//! copies made in different documents do not collide when content moves
//! between them.

use crate::node::NodeId;

#[derive(Debug, Clone)]
pub struct IdGenerator {
    seed: String,
    issued: u32,
}

impl IdGenerator {
    /// Generator whose ids are prefixed by a hash of `document_id`
    pub fn for_document(document_id: &str) -> Self {
        Self::from_seed(format!("{:08x}", crc32fast::hash(document_id.as_bytes())))
    }

    pub fn from_seed(seed: impl Into<String>) -> Self {
        Self {
            seed: seed.into(),
            issued: 0,
        }
    }

    pub fn seed(&self) -> &str {
        &self.seed
    }

    fn next_id(&mut self) -> NodeId {
        self.issued += 1;
        format!("{}-{}", self.seed, self.issued)
    }

    /// Next id not already in use. `taken` is asked about every candidate,
    /// so ids kept by an earlier paste or loaded from disk are skipped.
    pub fn fresh_id(&mut self, taken: impl Fn(&str) -> bool) -> NodeId {
        loop {
            let id = self.next_id();
            if !taken(&id) {
                return id;
            }
        }
    }
}
