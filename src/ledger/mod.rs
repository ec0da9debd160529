//! Append-only, hash-chained log of petition submissions.
//!
//! Every submission becomes an immutable [`Block`] whose digest covers the
//! block's own content plus the digest of its predecessor, so any edit to a
//! recorded block is detectable by re-walking the chain with
//! [`Ledger::verify`]. The chain lives in memory for the process lifetime;
//! exports are plain serialized block sequences handled by the caller.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// `previous_digest` of the first block in a chain.
pub const GENESIS_SENTINEL: [u8; 32] = [0u8; 32];

#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },
    #[error("payload serialization failed: {0}")]
    PayloadSerialization(#[from] serde_json::Error),
}

/// One immutable entry in the submission log.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Block {
    /// Position in the chain, 0-based, assigned at append time.
    pub sequence_index: u64,
    /// Identifier of the petition this block attests to.
    pub reference_id: String,
    /// Submission time in Unix milliseconds.
    pub created_at: u64,
    /// Canonical serialized snapshot of the attested record.
    pub payload: Vec<u8>,
    /// Digest of the preceding block, or [`GENESIS_SENTINEL`] for the first.
    pub previous_digest: [u8; 32],
    /// SHA-256 over this block's content and its predecessor link.
    pub digest: [u8; 32],
}

impl Block {
    /// Render the block digest as lowercase hex.
    pub fn digest_hex(&self) -> String {
        hex::encode(self.digest)
    }
}

/// Digest of a block's canonical content.
///
/// Fields are hashed in a strict order behind a domain tag; variable-length
/// fields carry a length prefix so the encoding is unambiguous.
pub fn block_digest(
    reference_id: &str,
    created_at: u64,
    previous_digest: &[u8; 32],
    payload: &[u8],
) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(b"justichain-block-v1");
    hasher.update((reference_id.len() as u64).to_le_bytes());
    hasher.update(reference_id.as_bytes());
    hasher.update(created_at.to_le_bytes());
    hasher.update(previous_digest);
    hasher.update((payload.len() as u64).to_le_bytes());
    hasher.update(payload);
    hasher.finalize().into()
}

/// Outcome of a full chain walk.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct ChainAudit {
    pub valid: bool,
    /// First index whose digest, link, or position failed, if any.
    pub broken_at: Option<u64>,
}

/// Ordered block sequence with append as the only mutation.
///
/// One writer at a time: [`Ledger::append`] takes `&mut self`, so sharing the
/// ledger across writer contexts requires an external lock.
#[derive(Debug, Default)]
pub struct Ledger {
    blocks: Vec<Block>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adopt an externally held sequence, e.g. a chain export.
    ///
    /// The adopted blocks are not trusted; run [`Ledger::verify`] before
    /// relying on them.
    pub fn from_blocks(blocks: Vec<Block>) -> Self {
        Self { blocks }
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Digest of the newest block, or [`GENESIS_SENTINEL`] when empty.
    pub fn tip_digest(&self) -> [u8; 32] {
        self.blocks
            .last()
            .map(|block| block.digest)
            .unwrap_or(GENESIS_SENTINEL)
    }

    /// Blocks in ascending `sequence_index` order. Each call returns an
    /// independent iterator over the current sequence.
    pub fn entries(&self) -> impl Iterator<Item = &Block> {
        self.blocks.iter()
    }

    /// Record a submission as a new block at the tail of the chain.
    ///
    /// The payload is serialized to canonical JSON (struct field order is
    /// fixed at compile time) and bound into the digest together with the
    /// predecessor link, so identical submissions against identical chains
    /// produce identical blocks. Nothing is appended on error.
    pub fn append<P: Serialize>(
        &mut self,
        reference_id: &str,
        created_at: u64,
        payload: &P,
    ) -> Result<Block, LedgerError> {
        if reference_id.is_empty() {
            return Err(LedgerError::InvalidInput {
                reason: "reference id must not be empty".into(),
            });
        }
        let payload = serde_json::to_vec(payload)?;
        let previous_digest = self.tip_digest();
        let digest = block_digest(reference_id, created_at, &previous_digest, &payload);
        let block = Block {
            sequence_index: self.blocks.len() as u64,
            reference_id: reference_id.to_string(),
            created_at,
            payload,
            previous_digest,
            digest,
        };
        self.blocks.push(block.clone());
        Ok(block)
    }

    /// Re-audit the whole chain.
    ///
    /// Walks from index 0, recomputing each stored digest from the block's
    /// own fields and checking the predecessor link and position, and stops
    /// at the first block that fails any check. Read-only.
    pub fn verify(&self) -> ChainAudit {
        let mut expected_previous = GENESIS_SENTINEL;
        for (index, block) in self.blocks.iter().enumerate() {
            let recomputed = block_digest(
                &block.reference_id,
                block.created_at,
                &block.previous_digest,
                &block.payload,
            );
            if block.sequence_index != index as u64
                || block.previous_digest != expected_previous
                || block.digest != recomputed
            {
                return ChainAudit {
                    valid: false,
                    broken_at: Some(index as u64),
                };
            }
            expected_previous = block.digest;
        }
        ChainAudit {
            valid: true,
            broken_at: None,
        }
    }
}
