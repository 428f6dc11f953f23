//! Scoring and ordering of search results. Pure functions; the pipeline in
//! the parent module supplies the inputs.

use std::{cmp::Ordering, collections::HashSet};

use crate::search::SearchHit;

pub const EXACT_LOCATION_BONUS: f32 = 0.1;
pub const ANCESTOR_LOCATION_BONUS: f32 = 0.05;

#[derive(Clone, Copy, Debug)]
pub struct RankerWeights {
	pub alpha: f32,
	pub beta: f32,
	pub gamma: f32,
}
impl Default for RankerWeights {
	fn default() -> Self {
		Self { alpha: 0.7, beta: 0.2, gamma: 0.1 }
	}
}
impl From<&shelf_config::Ranking> for RankerWeights {
	fn from(cfg: &shelf_config::Ranking) -> Self {
		Self { alpha: cfg.alpha, beta: cfg.beta, gamma: cfg.gamma }
	}
}

/// Re-scores every hit as `alpha * vector + beta * tag overlap + gamma *
/// location bonus` and sorts descending. The sort is stable: hits with equal
/// combined scores keep their input order.
pub fn rank(
	weights: RankerWeights,
	mut hits: Vec<SearchHit>,
	query_tags: &[String],
	query_location_path: Option<&str>,
) -> Vec<SearchHit> {
	let query_tag_set: HashSet<&str> = query_tags.iter().map(String::as_str).collect();

	for hit in &mut hits {
		let tag_set: HashSet<&str> = hit.tags.iter().map(String::as_str).collect();
		let overlap = jaccard(&tag_set, &query_tag_set);
		let bonus = location_bonus(hit.location_path.as_deref(), query_location_path);

		hit.score = weights.alpha * hit.vector_score + weights.beta * overlap + weights.gamma * bonus;
	}

	hits.sort_by(|left, right| cmp_score_desc(left.score, right.score));

	hits
}

/// Intersection over union. Zero when either set is empty: two untagged sides
/// carry no signal, not a perfect match.
pub fn jaccard(left: &HashSet<&str>, right: &HashSet<&str>) -> f32 {
	if left.is_empty() || right.is_empty() {
		return 0.0;
	}

	let intersection = left.intersection(right).count();
	let union = left.union(right).count();

	intersection as f32 / union as f32
}

/// Bonus for a hit matching the query's location filter. The prefix test is
/// one-directional: the query path acting as an ancestor of the result.
pub fn location_bonus(result_path: Option<&str>, query_path: Option<&str>) -> f32 {
	let (Some(result_path), Some(query_path)) = (result_path, query_path) else {
		return 0.0;
	};

	if result_path == query_path {
		return EXACT_LOCATION_BONUS;
	}
	if result_path.starts_with(query_path) {
		return ANCESTOR_LOCATION_BONUS;
	}

	0.0
}

pub fn cmp_score_desc(left: f32, right: f32) -> Ordering {
	match (left.is_nan(), right.is_nan()) {
		(true, true) => Ordering::Equal,
		(true, false) => Ordering::Greater,
		(false, true) => Ordering::Less,
		(false, false) => right.partial_cmp(&left).unwrap_or(Ordering::Equal),
	}
}
