//! Describes which servers are suitable for a given operation.

use crate::{handshake::TagSet, sdam::server::ServerDescription};

/// The five standard read-preference modes, each carrying the tag sets and max staleness that
/// narrow it further. Struct variants (rather than a `Mode` enum plus a shared `max_staleness`
/// field) keep "primary accepts neither tags nor staleness" structurally enforced instead of left
/// to callers to respect by convention.
#[derive(Clone, Debug, Default, PartialEq)]
#[non_exhaustive]
pub enum ReadPreference {
    /// Only the replica-set primary is suitable.
    #[default]
    Primary,

    /// Only secondaries are suitable.
    Secondary {
        /// Candidate tag sets, tried in order; see `SPEC_FULL.md` §4.6.
        tag_sets: Option<Vec<TagSet>>,
        /// Accepted for API compatibility; not evaluated by this core (`SPEC_FULL.md` §4.6).
        max_staleness_ms: Option<u64>,
    },

    /// The primary if available, else any matching secondary.
    PrimaryPreferred {
        /// Candidate tag sets, tried in order.
        tag_sets: Option<Vec<TagSet>>,
        /// Accepted but not evaluated.
        max_staleness_ms: Option<u64>,
    },

    /// A matching secondary if one exists, else the primary.
    SecondaryPreferred {
        /// Candidate tag sets, tried in order.
        tag_sets: Option<Vec<TagSet>>,
        /// Accepted but not evaluated.
        max_staleness_ms: Option<u64>,
    },

    /// The primary or any matching secondary, chosen by latency alone.
    Nearest {
        /// Candidate tag sets, tried in order.
        tag_sets: Option<Vec<TagSet>>,
        /// Accepted but not evaluated.
        max_staleness_ms: Option<u64>,
    },
}

impl ReadPreference {
    /// Builds a [`ReadPreference::Secondary`] with no tag sets or staleness bound.
    pub fn secondary() -> Self {
        ReadPreference::Secondary {
            tag_sets: None,
            max_staleness_ms: None,
        }
    }

    /// Builds a [`ReadPreference::PrimaryPreferred`] with no tag sets or staleness bound.
    pub fn primary_preferred() -> Self {
        ReadPreference::PrimaryPreferred {
            tag_sets: None,
            max_staleness_ms: None,
        }
    }

    /// Builds a [`ReadPreference::SecondaryPreferred`] with no tag sets or staleness bound.
    pub fn secondary_preferred() -> Self {
        ReadPreference::SecondaryPreferred {
            tag_sets: None,
            max_staleness_ms: None,
        }
    }

    /// Builds a [`ReadPreference::Nearest`] with no tag sets or staleness bound.
    pub fn nearest() -> Self {
        ReadPreference::Nearest {
            tag_sets: None,
            max_staleness_ms: None,
        }
    }

    /// Returns a copy of this preference with `tag_sets` attached. Has no effect on `Primary`.
    pub fn with_tags(mut self, tag_sets: Vec<TagSet>) -> Self {
        match &mut self {
            ReadPreference::Primary => {}
            ReadPreference::Secondary { tag_sets: t, .. }
            | ReadPreference::PrimaryPreferred { tag_sets: t, .. }
            | ReadPreference::SecondaryPreferred { tag_sets: t, .. }
            | ReadPreference::Nearest { tag_sets: t, .. } => *t = Some(tag_sets),
        }
        self
    }

    /// Returns a copy of this preference with `max_staleness_ms` attached. Has no effect on
    /// `Primary`. Accepted for API compatibility; the selection engine never evaluates it.
    pub fn with_max_staleness_ms(mut self, max_staleness_ms: u64) -> Self {
        match &mut self {
            ReadPreference::Primary => {}
            ReadPreference::Secondary { max_staleness_ms: m, .. }
            | ReadPreference::PrimaryPreferred { max_staleness_ms: m, .. }
            | ReadPreference::SecondaryPreferred { max_staleness_ms: m, .. }
            | ReadPreference::Nearest { max_staleness_ms: m, .. } => *m = Some(max_staleness_ms),
        }
        self
    }

    pub(crate) fn tag_sets(&self) -> Option<&[TagSet]> {
        match self {
            ReadPreference::Primary => None,
            ReadPreference::Secondary { tag_sets, .. }
            | ReadPreference::PrimaryPreferred { tag_sets, .. }
            | ReadPreference::SecondaryPreferred { tag_sets, .. }
            | ReadPreference::Nearest { tag_sets, .. } => tag_sets.as_deref(),
        }
    }
}

/// Filters `servers` down to those matching the first tag set in `tag_sets` that any server
/// satisfies; if no tag set matches anything, clears `servers` entirely. A `tag_sets` of `None` or
/// `[]` is a no-op. Grounded in the teacher's `filter_servers_by_tag_sets` (first-match-wins, not
/// union-of-all-matches).
pub(crate) fn filter_servers_by_tag_sets<'a>(
    servers: &mut Vec<&'a ServerDescription>,
    tag_sets: Option<&[TagSet]>,
) {
    let tag_sets = match tag_sets {
        Some(tag_sets) if !tag_sets.is_empty() => tag_sets,
        _ => return,
    };

    for tag_set in tag_sets {
        let matches = |server: &&ServerDescription| server.matches_tag_set(tag_set);
        if servers.iter().any(matches) {
            servers.retain(matches);
            return;
        }
    }

    servers.clear();
}
