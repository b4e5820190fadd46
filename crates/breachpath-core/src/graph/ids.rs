//! Arena indices for graph entities.
//!
//! Every entity lives in a flat vector owned by the [`Graph`](super::Graph);
//! the ids below are plain indices into those vectors. They are only
//! meaningful for the graph (or builder) that produced them.

use serde::Serialize;
use std::fmt;

macro_rules! arena_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
        #[serde(transparent)]
        pub struct $name(pub(crate) u32);

        impl $name {
            /// Position of this entity in its arena.
            #[must_use]
            pub fn index(self) -> usize {
                self.0 as usize
            }

            pub(crate) fn from_index(index: usize) -> Self {
                Self(u32::try_from(index).expect("arena exceeds u32::MAX entries"))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "#{}"), self.0)
            }
        }
    };
}

arena_id!(
    /// Index of an [`Asset`](super::Asset).
    AssetId,
    "asset"
);
arena_id!(
    /// Index of an [`AttackStep`](super::AttackStep).
    StepId,
    "step"
);
arena_id!(
    /// Index of an [`Edge`](super::Edge).
    EdgeId,
    "edge"
);
arena_id!(
    /// Index of a [`Defense`](super::Defense).
    DefenseId,
    "defense"
);
