//! Cached basic blocks of translated micro-ops.
//!
//! A block is built once by the translator (reset, then append up to
//! [`MAX_UOPS_PER_BB`] micro-ops), sealed by handing it to the translation
//! cache, and from then on shared read-only by the cache and any in-flight
//! speculative fetch paths. Only the reference count and the profiling
//! counters change after sealing, and those are atomic so racing holders need
//! no lock. Growing or shrinking a sealed block is never done in place; it
//! requires an explicit [`BasicBlock::try_clone`] into a freshly sized copy.
//!
//! Lifetime is managed by the translation cache through the refcount
//! protocol: holders `acquire`/`drop_ref`, and whichever holder observes the
//! count reach zero under the cache's discipline calls
//! [`BasicBlock::release`]. A speculative reference may be dropped at any
//! time (branch mispredict); dropping a reference never deallocates directly.

use crate::uop::TransOp;
use std::collections::TryReserveError;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use thiserror::Error;

/// Hard cap on micro-ops per block; the translator must split beyond this.
pub const MAX_UOPS_PER_BB: usize = 64;

/// Allocation failure while cloning a block.
///
/// Fatal to the calling translation attempt: the caller must abandon the
/// partial result and re-translate rather than run with a truncated block.
#[derive(Debug, Error)]
#[error("basic block allocation failed: {0}")]
pub struct BlockAllocError(#[from] TryReserveError);

/// A straight-line run of translated micro-ops plus per-block metadata.
///
/// Deliberately not `Clone`: copying a block is an allocation-aware operation
/// with its own semantics (see [`BasicBlock::try_clone`]), never an implicit
/// member-wise copy.
#[derive(Debug)]
pub struct BasicBlock {
    /// Address this block was translated at.
    pub rip: u64,
    /// Successor when the terminating branch is taken.
    pub rip_taken: u64,
    /// Successor when the terminating branch falls through.
    pub rip_not_taken: u64,
    /// Block ends in a rep-prefixed string op (re-dispatches to itself).
    pub repblock: bool,
    /// Bitmask of architectural registers read before written in this block.
    pub usedregs: u64,
    /// Destination-tag count across the block's macro-ops.
    pub tagcount: u32,
    /// Loads + stores across the block's macro-ops.
    pub memcount: u32,
    /// Stores across the block's macro-ops.
    pub storecount: u32,
    /// Number of x86 instructions this block translates.
    pub user_insn_count: u32,
    refcount: AtomicU32,
    hitcount: AtomicU64,
    predcount: AtomicU64,
    synth: Option<Box<[u8]>>,
    uops: Vec<TransOp>,
}

impl BasicBlock {
    /// Fresh empty block rooted at `rip`; both successors default to `rip`
    /// until the translator fills them in.
    pub fn new(rip: u64) -> Box<BasicBlock> {
        let mut bb = Box::new(BasicBlock {
            rip: 0,
            rip_taken: 0,
            rip_not_taken: 0,
            repblock: false,
            usedregs: 0,
            tagcount: 0,
            memcount: 0,
            storecount: 0,
            user_insn_count: 0,
            refcount: AtomicU32::new(0),
            hitcount: AtomicU64::new(0),
            predcount: AtomicU64::new(0),
            synth: None,
            uops: Vec::new(),
        });
        bb.reset(rip);
        bb
    }

    /// Reinitialize in place to an empty, unshared block at a new address.
    ///
    /// Clears all counts and profiling counters and drops any attached
    /// synthesized-code buffer. Must only be called on a block with no
    /// outstanding references.
    pub fn reset(&mut self, rip: u64) {
        debug_assert_eq!(
            self.refcount.load(Ordering::Relaxed),
            0,
            "reset of a block with live references"
        );
        self.rip = rip;
        self.rip_taken = rip;
        self.rip_not_taken = rip;
        self.repblock = false;
        self.usedregs = 0;
        self.tagcount = 0;
        self.memcount = 0;
        self.storecount = 0;
        self.user_insn_count = 0;
        self.refcount.store(0, Ordering::Relaxed);
        self.hitcount.store(0, Ordering::Relaxed);
        self.predcount.store(0, Ordering::Relaxed);
        self.synth = None;
        self.uops.clear();
    }

    /// Append a micro-op during translation.
    ///
    /// # Panics
    /// Past [`MAX_UOPS_PER_BB`]; the translator must have split the block.
    pub fn push(&mut self, uop: TransOp) {
        assert!(
            self.uops.len() < MAX_UOPS_PER_BB,
            "basic block at {:#x} exceeds {} uops",
            self.rip,
            MAX_UOPS_PER_BB
        );
        self.uops.push(uop);
    }

    pub fn count(&self) -> usize {
        self.uops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.uops.is_empty()
    }

    pub fn uops(&self) -> &[TransOp] {
        &self.uops
    }

    /// Copy into a freshly sized allocation.
    ///
    /// The copy carries the same header and micro-op payload but never the
    /// synthesized-code buffer: synthesized code is only valid for the exact
    /// block identity it was generated against.
    pub fn try_clone(&self) -> Result<Box<BasicBlock>, BlockAllocError> {
        let mut uops = Vec::new();
        uops.try_reserve_exact(self.uops.len())?;
        uops.extend_from_slice(&self.uops);
        Ok(Box::new(BasicBlock {
            rip: self.rip,
            rip_taken: self.rip_taken,
            rip_not_taken: self.rip_not_taken,
            repblock: self.repblock,
            usedregs: self.usedregs,
            tagcount: self.tagcount,
            memcount: self.memcount,
            storecount: self.storecount,
            user_insn_count: self.user_insn_count,
            refcount: AtomicU32::new(self.refcount.load(Ordering::Relaxed)),
            hitcount: AtomicU64::new(0),
            predcount: AtomicU64::new(0),
            synth: None,
            uops,
        }))
    }

    /// Tear the block down: the synthesized-code buffer first, then the block
    /// itself. The single reclamation path; the cache calls this once the
    /// refcount has been observed at zero.
    pub fn release(mut self: Box<Self>) {
        self.synth = None;
        drop(self);
    }

    // ---- refcount protocol -------------------------------------------------

    /// Register a holder; returns the new count.
    pub fn acquire(&self) -> u32 {
        self.refcount.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// Drop a holder; returns the new count. A zero return makes the block
    /// eligible for [`BasicBlock::release`], but only the cache decides.
    pub fn drop_ref(&self) -> u32 {
        let prev = self.refcount.fetch_sub(1, Ordering::AcqRel);
        assert!(prev > 0, "refcount underflow on block at {:#x}", self.rip);
        prev - 1
    }

    pub fn refcount(&self) -> u32 {
        self.refcount.load(Ordering::Acquire)
    }

    // ---- profiling counters ------------------------------------------------

    /// Record a translation-cache hit on this block.
    pub fn record_hit(&self) -> u64 {
        self.hitcount.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Record a correct branch prediction through this block.
    pub fn record_pred(&self) -> u64 {
        self.predcount.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn hitcount(&self) -> u64 {
        self.hitcount.load(Ordering::Relaxed)
    }

    pub fn predcount(&self) -> u64 {
        self.predcount.load(Ordering::Relaxed)
    }

    // ---- synthesized code --------------------------------------------------

    /// Attach a synthesized-code buffer, replacing any previous one.
    pub fn attach_synth(&mut self, synth: Box<[u8]>) {
        self.synth = Some(synth);
    }

    /// Detach and return the synthesized-code buffer, if any.
    pub fn take_synth(&mut self) -> Option<Box<[u8]>> {
        self.synth.take()
    }

    pub fn has_synth(&self) -> bool {
        self.synth.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uarch_isa::{ArchReg, Opcode};

    fn nop() -> TransOp {
        TransOp::new(
            Opcode::Nop,
            ArchReg::ZERO,
            ArchReg::ZERO,
            ArchReg::ZERO,
            ArchReg::ZERO,
            0,
            0,
        )
    }

    #[test]
    fn new_block_points_both_successors_at_itself() {
        let bb = BasicBlock::new(0x401000);
        assert_eq!(bb.rip, 0x401000);
        assert_eq!(bb.rip_taken, 0x401000);
        assert_eq!(bb.rip_not_taken, 0x401000);
        assert_eq!(bb.count(), 0);
        assert_eq!(bb.refcount(), 0);
    }

    #[test]
    fn reset_reinitializes_in_place() {
        let mut bb = BasicBlock::new(0x1000);
        bb.push(nop());
        bb.rip_taken = 0x2000;
        bb.usedregs = 0xff;
        bb.attach_synth(vec![0x90].into_boxed_slice());
        bb.record_hit();

        bb.reset(0x3000);
        assert_eq!(bb.rip, 0x3000);
        assert_eq!(bb.rip_taken, 0x3000);
        assert_eq!(bb.rip_not_taken, 0x3000);
        assert!(bb.is_empty());
        assert_eq!(bb.usedregs, 0);
        assert_eq!(bb.hitcount(), 0);
        assert!(!bb.has_synth());
    }

    #[test]
    fn clone_copies_payload_but_not_synth() {
        let mut bb = BasicBlock::new(0x1000);
        for _ in 0..3 {
            bb.push(nop());
        }
        bb.attach_synth(vec![1, 2, 3].into_boxed_slice());

        let clone = bb.try_clone().unwrap();
        assert_eq!(clone.count(), 3);
        assert_eq!(clone.uops(), bb.uops());
        assert_eq!(clone.rip, bb.rip);
        assert!(!clone.has_synth());
        assert!(bb.has_synth());
    }

    #[test]
    fn refcount_protocol_counts_holders() {
        let bb = BasicBlock::new(0x1000);
        assert_eq!(bb.acquire(), 1);
        assert_eq!(bb.acquire(), 2);
        assert_eq!(bb.drop_ref(), 1);
        assert_eq!(bb.drop_ref(), 0);
    }

    #[test]
    #[should_panic(expected = "refcount underflow")]
    fn drop_ref_without_holder_is_a_bug() {
        let bb = BasicBlock::new(0x1000);
        let _ = bb.drop_ref();
    }

    #[test]
    #[should_panic(expected = "exceeds")]
    fn push_past_cap_is_a_translator_bug() {
        let mut bb = BasicBlock::new(0x1000);
        for _ in 0..=MAX_UOPS_PER_BB {
            bb.push(nop());
        }
    }

    #[test]
    fn release_consumes_the_block() {
        let mut bb = BasicBlock::new(0x1000);
        bb.attach_synth(vec![0u8; 16].into_boxed_slice());
        bb.release();
    }
}
