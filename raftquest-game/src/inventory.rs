//! Raft piece inventory and the three-into-one fusion.
use serde::{Deserialize, Serialize};

use crate::constants::PIECES_PER_FUSION;
use crate::id_set::IdSet;
use crate::ids::RaftPieceId;
use crate::numbers::percentage;

/// Persisted inventory record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    /// Atomic pieces not yet fused.
    #[serde(default)]
    pub collected_pieces: IdSet<RaftPieceId>,
    /// Composite pieces in creation order.
    #[serde(default)]
    pub fused_pieces: Vec<RaftPieceId>,
    #[serde(default)]
    pub fused_count: u32,
}

impl Inventory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an atomic piece. Repeated rewards for the same step are ignored.
    pub fn add_piece(&mut self, piece: RaftPieceId) -> bool {
        self.collected_pieces.insert(piece)
    }

    #[must_use]
    pub fn has_piece(&self, piece: &str) -> bool {
        self.collected_pieces.contains(piece)
    }

    /// Whether `pieces` could be fused right now.
    #[must_use]
    pub fn can_fuse(&self, pieces: &[RaftPieceId; PIECES_PER_FUSION], max_fused: u32) -> bool {
        if self.fused_count >= max_fused {
            return false;
        }
        let distinct: IdSet<&RaftPieceId> = pieces.iter().collect();
        distinct.len() == PIECES_PER_FUSION
            && pieces.iter().all(|p| self.collected_pieces.contains(p))
    }

    /// Consume three distinct collected pieces into one composite piece.
    ///
    /// All-or-nothing: on failure the inventory is unchanged. Returns the newly
    /// minted `fused-<n>` id on success.
    pub fn consume_pieces_for_fusion(
        &mut self,
        pieces: &[RaftPieceId; PIECES_PER_FUSION],
        max_fused: u32,
    ) -> Option<RaftPieceId> {
        if !self.can_fuse(pieces, max_fused) {
            log::debug!("fusion rejected for {pieces:?}");
            return None;
        }
        let mut next = self.clone();
        for piece in pieces {
            next.collected_pieces.remove(piece);
        }
        next.fused_count += 1;
        let fused = RaftPieceId::fused(next.fused_count);
        next.fused_pieces.push(fused.clone());
        *self = next;
        Some(fused)
    }

    /// Whether `fused_count` matches `fused_pieces` and the composites are
    /// `fused-1..=n` in order. Uncommitted pieces never carry the fused prefix.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        usize::try_from(self.fused_count).is_ok_and(|n| n == self.fused_pieces.len())
            && self
                .fused_pieces
                .iter()
                .zip(1..)
                .all(|(piece, k)| *piece == RaftPieceId::fused(k))
            && !self.collected_pieces.iter().any(RaftPieceId::is_fused)
    }

    /// Atomic-piece equivalents held, counting each composite as the pieces it consumed.
    #[must_use]
    pub fn piece_equivalents(&self) -> usize {
        self.collected_pieces.len() + self.fused_pieces.len() * PIECES_PER_FUSION
    }

    /// Raft completion percentage against `total_pieces`.
    #[must_use]
    pub fn get_progress(&self, total_pieces: u32) -> f64 {
        percentage(self.piece_equivalents(), total_pieces as usize)
    }

    #[must_use]
    pub fn is_raft_complete(&self, total_pieces: u32) -> bool {
        total_pieces > 0 && self.piece_equivalents() >= total_pieces as usize
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Three staging slots for a fusion, owned by the screen showing them.
/// Never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FusionSlots {
    slots: [Option<RaftPieceId>; PIECES_PER_FUSION],
}

impl FusionSlots {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Put a piece in a slot. Fails on an out-of-range or occupied slot, or
    /// when the piece is already staged elsewhere.
    pub fn place(&mut self, slot: usize, piece: RaftPieceId) -> bool {
        if self.contains(piece.as_str()) {
            return false;
        }
        let Some(cell) = self.slots.get_mut(slot) else {
            return false;
        };
        if cell.is_some() {
            return false;
        }
        *cell = Some(piece);
        true
    }

    /// Empty a slot, returning what it held.
    pub fn clear(&mut self, slot: usize) -> Option<RaftPieceId> {
        self.slots.get_mut(slot).and_then(Option::take)
    }

    pub fn clear_all(&mut self) {
        self.slots = Default::default();
    }

    #[must_use]
    pub fn get(&self, slot: usize) -> Option<&RaftPieceId> {
        self.slots.get(slot).and_then(Option::as_ref)
    }

    #[must_use]
    pub fn contains(&self, piece: &str) -> bool {
        self.slots
            .iter()
            .flatten()
            .any(|staged| staged.as_str() == piece)
    }

    #[must_use]
    pub fn first_empty(&self) -> Option<usize> {
        self.slots.iter().position(Option::is_none)
    }

    #[must_use]
    pub fn is_full(&self) -> bool {
        self.slots.iter().all(Option::is_some)
    }

    /// The staged pieces once every slot is filled.
    #[must_use]
    pub fn pieces(&self) -> Option<[RaftPieceId; PIECES_PER_FUSION]> {
        let [Some(a), Some(b), Some(c)] = &self.slots else {
            return None;
        };
        Some([a.clone(), b.clone(), c.clone()])
    }

    /// Commit the staged fusion. Slots empty only when the fusion succeeds so
    /// the player can fix the selection and retry.
    pub fn commit(&mut self, inventory: &mut Inventory, max_fused: u32) -> Option<RaftPieceId> {
        let pieces = self.pieces()?;
        let fused = inventory.consume_pieces_for_fusion(&pieces, max_fused)?;
        self.clear_all();
        Some(fused)
    }
}
