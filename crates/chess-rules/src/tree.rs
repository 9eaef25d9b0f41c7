//! Branching move history.
//!
//! A [`MoveTree`] stores every branch point and every variation in flat
//! arenas addressed by [`BranchId`] and [`VariationId`]. Each branch holds an
//! ordered list of variations: slot 0 is the main line and may be vacant,
//! later slots are side lines and are always occupied. Every variation owns
//! one move and the branch that continues after it.
//!
//! Removed nodes leave tombstones; their ids stay invalid forever.

use crate::Move;
use thiserror::Error;
use tracing::debug;

/// Handle to a branch point in a [`MoveTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BranchId(usize);

/// Handle to a variation in a [`MoveTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VariationId(usize);

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TreeError {
    #[error("unknown or removed branch {0:?}")]
    UnknownBranch(BranchId),

    #[error("unknown or removed variation {0:?}")]
    UnknownVariation(VariationId),

    #[error("destination index {index} is out of range for a branch of {len} slots")]
    DestinationOutOfRange { index: usize, len: usize },
}

/// One candidate move at a branch point, together with its continuation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variation {
    mv: Move,
    parent: BranchId,
    variation_index: usize,
    continuation: BranchId,
}

impl Variation {
    pub fn mv(&self) -> &Move {
        &self.mv
    }

    /// The branch this variation is listed in.
    pub fn parent(&self) -> BranchId {
        self.parent
    }

    /// Position within the parent's list; 0 is the main line.
    pub fn variation_index(&self) -> usize {
        self.variation_index
    }

    pub fn is_main_line(&self) -> bool {
        self.variation_index == 0
    }

    /// The branch point after this variation's move.
    pub fn continuation(&self) -> BranchId {
        self.continuation
    }
}

#[derive(Debug, Clone)]
struct Branch {
    /// Never empty. Only slot 0 may be `None`.
    slots: Vec<Option<VariationId>>,
    /// The variation this branch continues; `None` for the root.
    parent: Option<VariationId>,
}

impl Branch {
    fn new(parent: Option<VariationId>) -> Self {
        Branch {
            slots: vec![None],
            parent,
        }
    }
}

/// Tree of move sequences rooted at a single position.
#[derive(Debug, Clone)]
pub struct MoveTree {
    branches: Vec<Option<Branch>>,
    variations: Vec<Option<Variation>>,
}

impl Default for MoveTree {
    fn default() -> Self {
        Self::new()
    }
}

impl MoveTree {
    /// Creates a tree with an empty root branch.
    pub fn new() -> Self {
        MoveTree {
            branches: vec![Some(Branch::new(None))],
            variations: Vec::new(),
        }
    }

    /// The branch point of the starting position.
    pub fn root(&self) -> BranchId {
        BranchId(0)
    }

    fn branch(&self, id: BranchId) -> Result<&Branch, TreeError> {
        self.branches
            .get(id.0)
            .and_then(Option::as_ref)
            .ok_or(TreeError::UnknownBranch(id))
    }

    fn branch_mut(&mut self, id: BranchId) -> Result<&mut Branch, TreeError> {
        self.branches
            .get_mut(id.0)
            .and_then(Option::as_mut)
            .ok_or(TreeError::UnknownBranch(id))
    }

    pub fn variation(&self, id: VariationId) -> Result<&Variation, TreeError> {
        self.variations
            .get(id.0)
            .and_then(Option::as_ref)
            .ok_or(TreeError::UnknownVariation(id))
    }

    /// The slots of a branch in order; slot 0 is `None` when the main line is vacant.
    pub fn variations(&self, branch: BranchId) -> Result<&[Option<VariationId>], TreeError> {
        Ok(&self.branch(branch)?.slots)
    }

    pub fn main_line(&self, branch: BranchId) -> Result<Option<VariationId>, TreeError> {
        Ok(self.branch(branch)?.slots[0])
    }

    /// Number of variations at a branch point, not counting a vacant main line.
    pub fn len(&self, branch: BranchId) -> Result<usize, TreeError> {
        Ok(self.branch(branch)?.slots.iter().flatten().count())
    }

    pub fn is_empty(&self, branch: BranchId) -> Result<bool, TreeError> {
        Ok(self.len(branch)? == 0)
    }

    /// The variation a branch continues, or `None` for the root.
    pub fn parent_variation(&self, branch: BranchId) -> Result<Option<VariationId>, TreeError> {
        Ok(self.branch(branch)?.parent)
    }

    /// Returns the variation for `mv` at `branch`, adding it if needed.
    ///
    /// A new variation takes the main line slot when it is vacant and is
    /// appended as a side line otherwise.
    pub fn get_or_add_variation(&mut self, branch: BranchId, mv: Move) -> Result<VariationId, TreeError> {
        let existing = self
            .branch(branch)?
            .slots
            .iter()
            .flatten()
            .copied()
            .find(|id| {
                self.variation(*id)
                    .is_ok_and(|variation| variation.mv.same_move(&mv))
            });
        if let Some(id) = existing {
            return Ok(id);
        }

        let id = VariationId(self.variations.len());
        let continuation = BranchId(self.branches.len());
        self.branches.push(Some(Branch::new(Some(id))));

        let slots = &mut self.branch_mut(branch)?.slots;
        let variation_index = if slots[0].is_none() {
            slots[0] = Some(id);
            0
        } else {
            slots.push(Some(id));
            slots.len() - 1
        };
        self.variations.push(Some(Variation {
            mv,
            parent: branch,
            variation_index,
            continuation,
        }));
        debug!(?branch, ?id, variation_index, mv = %mv, "variation added");
        Ok(id)
    }

    /// Adds each move as the continuation of the previous one, starting at
    /// `branch`, and returns the variations along the path.
    pub fn add_line(
        &mut self,
        branch: BranchId,
        moves: impl IntoIterator<Item = Move>,
    ) -> Result<Vec<VariationId>, TreeError> {
        let mut path = Vec::new();
        let mut at = branch;
        for mv in moves {
            let id = self.get_or_add_variation(at, mv)?;
            at = self.variation(id)?.continuation;
            path.push(id);
        }
        Ok(path)
    }

    /// Removes a variation and everything after it.
    ///
    /// Later siblings move up one slot. A branch left without variations gets
    /// a vacant main line slot back.
    ///
    /// The arena slots of removed nodes are not reused, so ids held elsewhere
    /// report [`TreeError::UnknownVariation`] instead of naming a new node. A
    /// tree grows with every addition for as long as it lives; rebuild it with
    /// [`add_line`](Self::add_line) to compact it.
    pub fn remove_variation(&mut self, id: VariationId) -> Result<(), TreeError> {
        let (parent, index) = {
            let variation = self.variation(id)?;
            (variation.parent, variation.variation_index)
        };
        let slots = &mut self.branch_mut(parent)?.slots;
        slots.remove(index);
        if slots.is_empty() {
            slots.push(None);
        }
        self.free(id);
        self.reindex(parent);
        debug!(?parent, ?id, index, "variation removed");
        Ok(())
    }

    fn free(&mut self, id: VariationId) {
        let Some(variation) = self.variations.get_mut(id.0).and_then(Option::take) else {
            return;
        };
        if let Some(branch) = self.branches.get_mut(variation.continuation.0).and_then(Option::take) {
            for child in branch.slots.into_iter().flatten() {
                self.free(child);
            }
        }
    }

    /// Moves a variation to just before the slot currently at `destination`.
    pub fn reposition_before(&mut self, id: VariationId, destination: usize) -> Result<(), TreeError> {
        self.reposition(id, destination, |old, d| if d <= old { d } else { d - 1 })
    }

    /// Moves a variation to just after the slot currently at `destination`.
    pub fn reposition_after(&mut self, id: VariationId, destination: usize) -> Result<(), TreeError> {
        self.reposition(id, destination, |old, d| if d < old { d + 1 } else { d })
    }

    /// `insert_at` maps the old index and destination to the insertion index
    /// in the list with the variation already taken out.
    fn reposition(
        &mut self,
        id: VariationId,
        destination: usize,
        insert_at: impl Fn(usize, usize) -> usize,
    ) -> Result<(), TreeError> {
        let (parent, old) = {
            let variation = self.variation(id)?;
            (variation.parent, variation.variation_index)
        };
        let slots = &mut self.branch_mut(parent)?.slots;
        if destination >= slots.len() {
            return Err(TreeError::DestinationOutOfRange {
                index: destination,
                len: slots.len(),
            });
        }

        slots.remove(old);
        let at = insert_at(old, destination);
        slots.insert(at, Some(id));
        // A vacant main line slot that got pushed down is filled by whatever now leads.
        if let Some(vacant) = slots.iter().skip(1).position(Option::is_none) {
            slots.remove(vacant + 1);
        }
        self.reindex(parent);
        debug!(?parent, ?id, from = old, to = at, "variation repositioned");
        Ok(())
    }

    /// Turns the main line at `branch` into the first side line, leaving the
    /// main line slot vacant.
    pub fn demote_main_line(&mut self, branch: BranchId) -> Result<(), TreeError> {
        let slots = &mut self.branch_mut(branch)?.slots;
        if slots[0].is_some() {
            slots.insert(0, None);
            self.reindex(branch);
            debug!(?branch, "main line demoted");
        }
        Ok(())
    }

    fn reindex(&mut self, branch: BranchId) {
        let Some(Some(b)) = self.branches.get(branch.0) else {
            return;
        };
        let indexed: Vec<(usize, VariationId)> = b
            .slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.map(|id| (i, id)))
            .collect();
        for (i, id) in indexed {
            if let Some(Some(variation)) = self.variations.get_mut(id.0) {
                variation.variation_index = i;
            }
        }
    }

    /// Moves along successive main lines, starting at `branch`.
    pub fn main_line_moves(&self, branch: BranchId) -> MainLine<'_> {
        MainLine {
            tree: self,
            next: self.main_line(branch).ok().flatten(),
        }
    }

    /// The moves from the root up to and including `id`.
    pub fn moves_to(&self, id: VariationId) -> Result<Vec<Move>, TreeError> {
        let mut moves = Vec::new();
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            let variation = self.variation(current)?;
            moves.push(variation.mv);
            cursor = self.branch(variation.parent)?.parent;
        }
        moves.reverse();
        Ok(moves)
    }

    /// Checks that every live variation knows its own slot and that only
    /// main line slots are vacant.
    pub fn indices_consistent(&self) -> bool {
        self.branches.iter().flatten().all(|branch| {
            !branch.slots.is_empty()
                && branch.slots.iter().skip(1).all(Option::is_some)
                && branch.slots.iter().enumerate().all(|(i, slot)| match slot {
                    Some(id) => self.variation(*id).is_ok_and(|v| v.variation_index == i),
                    None => i == 0,
                })
        })
    }
}

/// Iterator returned by [`MoveTree::main_line_moves`].
pub struct MainLine<'a> {
    tree: &'a MoveTree,
    next: Option<VariationId>,
}

impl<'a> Iterator for MainLine<'a> {
    type Item = &'a Move;

    fn next(&mut self) -> Option<Self::Item> {
        let variation = self.tree.variation(self.next?).ok()?;
        self.next = self.tree.main_line(variation.continuation).ok().flatten();
        Some(&variation.mv)
    }
}
