use std::collections::BTreeSet;

use crate::domain::{AnalysisWindow, Post, Profile};

const PROFILE_WEIGHT: f64 = 0.4;
const COVERAGE_WEIGHT: f64 = 0.6;

/// Score in `[0, 1]` blending profile completeness with how many months of
/// the window have at least one post.
pub fn assess_data_quality(profile: &Profile, posts: &[Post], window: &AnalysisWindow) -> f64 {
    let months = window.month_count();
    let coverage = if months == 0 {
        0.0
    } else {
        let active: BTreeSet<String> = posts
            .iter()
            .filter(|post| window.contains(post.published_at))
            .map(Post::month_key)
            .collect();
        (active.len() as f64 / months as f64).min(1.0)
    };

    let score = PROFILE_WEIGHT * profile.completeness() + COVERAGE_WEIGHT * coverage;
    score.clamp(0.0, 1.0)
}
