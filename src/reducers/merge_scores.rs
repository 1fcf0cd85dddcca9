use super::Reducer;
use crate::{node::NodeResult, scoring::ItemScore, state::GlobalState};

/// Latest-by-timestamp reducer for score candidates.
///
/// Each rubric item holds one candidate per producer. An incoming candidate
/// replaces a same-producer entry only when it is newer; equal timestamps
/// keep the greater candidate by `(raw, rationale)` so the outcome does not
/// depend on arrival order. Candidate lists are kept sorted by producer id,
/// which is the documented cross-producer tie-break.
#[derive(Debug, PartialEq, Clone, Hash, Eq)]
pub struct MergeScores;

fn prefer_incoming(existing: &ItemScore, incoming: &ItemScore) -> bool {
    match incoming.recorded_at.cmp(&existing.recorded_at) {
        std::cmp::Ordering::Greater => true,
        std::cmp::Ordering::Less => false,
        std::cmp::Ordering::Equal => match incoming.raw.total_cmp(&existing.raw) {
            std::cmp::Ordering::Greater => true,
            std::cmp::Ordering::Less => false,
            std::cmp::Ordering::Equal => incoming.rationale > existing.rationale,
        },
    }
}

impl Reducer for MergeScores {
    fn apply(&self, state: &mut GlobalState, update: &NodeResult) {
        let Some(scores) = &update.scores else {
            return;
        };
        for (item, candidates) in scores.iter() {
            let slot = state.scores.entry(item.clone()).or_default();
            for candidate in candidates {
                match slot.iter_mut().find(|s| s.producer == candidate.producer) {
                    Some(existing) => {
                        if prefer_incoming(existing, candidate) {
                            *existing = candidate.clone();
                        }
                    }
                    None => slot.push(candidate.clone()),
                }
            }
            slot.sort_by(|a, b| a.producer.cmp(&b.producer));
        }
    }
}
