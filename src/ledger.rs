//! The hash-linked chain: append with full revalidation, lookups, and the
//! validation scan.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::clock::{Clock, SystemClock};
use crate::model::Block;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AppendError {
    /// Validation after the tentative append found faulty blocks. The
    /// candidate was rolled back; the listed heights stay corrupt.
    #[error("chain corruption detected at heights {faulty:?}")]
    ChainCorruption { faulty: Vec<u64> },
}

/// Ordered sequence of blocks where index equals height.
pub struct Ledger {
    blocks: Vec<Block>,
    clock: Arc<dyn Clock>,
}

impl Ledger {
    /// Ledger on the wall clock, already holding its genesis block.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        let mut ledger = Self {
            blocks: Vec::new(),
            clock,
        };
        ledger.initialize();
        ledger
    }

    /// Appends the genesis block if the chain is empty. No-op otherwise.
    pub fn initialize(&mut self) {
        if self.blocks.is_empty() {
            // An empty chain has nothing to revalidate.
            let genesis = self.link(Block::genesis());
            self.blocks.push(genesis);
        }
    }

    /// Assigns chain metadata for the next slot and seals the block.
    fn link(&self, mut candidate: Block) -> Block {
        candidate.previous_fingerprint = self.blocks.last().map(|b| b.fingerprint.clone());
        candidate.height = self.blocks.len() as u64;
        candidate.timestamp = self.clock.now_unix();
        candidate.seal();
        candidate
    }

    /// Links, stamps and seals `candidate`, then revalidates the whole chain.
    /// On any fault the candidate is popped and the ledger is unchanged.
    pub fn append(&mut self, candidate: Block) -> Result<Block, AppendError> {
        let candidate = self.link(candidate);
        self.blocks.push(candidate);

        let faulty = self.validate();
        if !faulty.is_empty() {
            self.blocks.pop();
            return Err(AppendError::ChainCorruption {
                faulty: faulty.iter().map(|b| b.height).collect(),
            });
        }

        // Just pushed above.
        Ok(self.blocks[self.blocks.len() - 1].clone())
    }

    /// Blocks that fail self-verification or whose link to the previous
    /// block is broken, in ascending height order.
    pub fn validate(&self) -> Vec<Block> {
        let mut faulty = Vec::new();
        for (i, block) in self.blocks.iter().enumerate() {
            let broken_link = i > 0
                && block.previous_fingerprint.as_deref()
                    != Some(self.blocks[i - 1].fingerprint.as_str());
            if !block.self_verify() || broken_link {
                faulty.push(block.clone());
            }
        }
        faulty
    }

    pub fn get_by_fingerprint(&self, fingerprint: &str) -> Option<&Block> {
        self.blocks.iter().find(|b| b.fingerprint == fingerprint)
    }

    pub fn get_by_height(&self, height: u64) -> Option<&Block> {
        usize::try_from(height)
            .ok()
            .and_then(|i| self.blocks.get(i))
    }

    /// Height of the last block. Genesis always exists, so this is total.
    pub fn current_height(&self) -> u64 {
        self.blocks.len().saturating_sub(1) as u64
    }

    pub fn tip(&self) -> Option<&Block> {
        self.blocks.last()
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    #[cfg(test)]
    pub(crate) fn block_mut(&mut self, height: usize) -> &mut Block {
        &mut self.blocks[height]
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Ledger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ledger")
            .field("blocks", &self.blocks)
            .finish_non_exhaustive()
    }
}
