use rand::seq::SliceRandom;

use crate::models::Therapist;

/// Picks the therapist a booking is assigned to.
pub trait AssignmentPolicy: Send + Sync {
    /// `None` only when `candidates` is empty.
    fn choose<'a>(&self, candidates: &'a [Therapist]) -> Option<&'a Therapist>;
}

/// Uniform random choice among the qualifying therapists.
///
/// There is no load balancing, recency weighting or priority, and results
/// are not reproducible between runs.
#[derive(Debug, Default, Clone, Copy)]
pub struct UniformRandomPolicy;

impl AssignmentPolicy for UniformRandomPolicy {
    fn choose<'a>(&self, candidates: &'a [Therapist]) -> Option<&'a Therapist> {
        candidates.choose(&mut rand::thread_rng())
    }
}
