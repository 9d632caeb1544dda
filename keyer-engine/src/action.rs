//! Composable key actions.
//!
//! Every chord slot points at a chain of small action nodes.  Starting a chain
//! walks it head to tail, stopping walks it tail to head, so whatever was
//! pressed last is released first.  Executing is a start immediately followed
//! by a stop, which is how tapped chords fire.
//!
//! The nodes live in an [`Actions`] arena and are addressed by [`ActionId`].
//! The arena is built once at setup and never mutated afterwards, which lets
//! many chord slots share one chain (the synthesized shift row points into the
//! chains of the unshifted slots).  A hold modifier needs a second half that
//! runs when its anchor button is finally released; that half is a sibling
//! node created next to it, referenced by index rather than a back-pointer.
//!
//! The nodes only describe behavior.  Carrying it out touches engine state
//! (the stop-debt table, the outstanding temporary modifiers), so the actual
//! start/stop walk lives on `InputEngine`.

use alloc::vec::Vec;

use usbd_human_interface_device::page::Keyboard;

use crate::Button;

/// Handle to a node in an [`Actions`] arena.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct ActionId(u16);

/// What one node does on start and stop.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) enum Kind {
    /// Start presses the key; stop releases it and then flushes any
    /// outstanding temporary modifiers.
    Key(Keyboard),

    /// A modifier held until the next ordinary key's stop.  Starting it a
    /// second time while still outstanding releases it instead.
    TempMod(Keyboard),

    /// Start presses the modifier and parks `release` in the stop-debt slot
    /// of `anchor`, so releasing that button later releases the modifier.  If
    /// the slot is already taken the press is kept as-is.
    HoldMod {
        anchor: Button,
        modifier: Keyboard,
        release: ActionId,
    },

    /// The deferred half of a hold modifier: stop releases the modifier.
    ReleaseHold(Keyboard),
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct Node {
    pub kind: Kind,
    pub next: Option<ActionId>,
}

/// Arena of action nodes, immutable once the layout is built.
#[derive(Default)]
pub struct Actions {
    nodes: Vec<Node>,
}

impl Actions {
    pub fn new() -> Actions {
        Actions { nodes: Vec::new() }
    }

    fn push(&mut self, kind: Kind, next: Option<ActionId>) -> ActionId {
        let id = u16::try_from(self.nodes.len()).expect("action arena overflow");
        self.nodes.push(Node { kind, next });
        ActionId(id)
    }

    /// A plain keypress, optionally chaining into `next`.
    pub fn key(&mut self, key: Keyboard, next: Option<ActionId>) -> ActionId {
        self.push(Kind::Key(key), next)
    }

    /// A temporary modifier, released along with the next key.
    pub fn temp_mod(&mut self, modifier: Keyboard, next: Option<ActionId>) -> ActionId {
        self.push(Kind::TempMod(modifier), next)
    }

    /// A modifier held for as long as `anchor` stays down.
    pub fn hold_mod(
        &mut self,
        anchor: Button,
        modifier: Keyboard,
        next: Option<ActionId>,
    ) -> ActionId {
        let release = self.push(Kind::ReleaseHold(modifier), None);
        self.push(Kind::HoldMod { anchor, modifier, release }, next)
    }

    pub(crate) fn node(&self, id: ActionId) -> Node {
        self.nodes[id.0 as usize]
    }
}
