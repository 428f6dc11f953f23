use serde::{Deserialize, Serialize};

pub const MAX_TAGS: usize = 30;

/// Structured metadata extracted from a thing's name and description.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ThingMetadata {
	pub category: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub subtype: Option<String>,
	#[serde(default)]
	pub tags: Vec<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub material: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub room_hint: Option<String>,
	#[serde(default)]
	pub usage_context: Vec<String>,
}

/// Lowercases, trims, and deduplicates tags, keeping at most [`MAX_TAGS`] in
/// first-seen order.
pub fn normalize_tags<I, S>(tags: I) -> Vec<String>
where
	I: IntoIterator<Item = S>,
	S: AsRef<str>,
{
	let mut seen = std::collections::HashSet::new();
	let mut out = Vec::new();

	for tag in tags {
		let cleaned = tag.as_ref().trim().to_lowercase();

		if cleaned.is_empty() {
			continue;
		}
		if seen.insert(cleaned.clone()) {
			out.push(cleaned);
		}
		if out.len() == MAX_TAGS {
			break;
		}
	}

	out
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn normalizes_and_deduplicates() {
		let tags = normalize_tags(["Phone", " phone ", "CHARGER", "", "cable"]);

		assert_eq!(tags, vec!["phone", "charger", "cable"]);
	}

	#[test]
	fn caps_tag_count() {
		let raw: Vec<String> = (0..40).map(|i| format!("tag{i}")).collect();
		let tags = normalize_tags(&raw);

		assert_eq!(tags.len(), MAX_TAGS);
		assert_eq!(tags[0], "tag0");
		assert_eq!(tags[MAX_TAGS - 1], "tag29");
	}
}
