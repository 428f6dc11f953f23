//! Deterministic keyword-based metadata extraction. Fully offline; the same
//! name and description always produce the same metadata.

use crate::metadata::{ThingMetadata, normalize_tags};

const CATEGORY_KEYWORDS: &[(&str, &[&str])] = &[
	("electronics", &[
		"phone", "laptop", "charger", "cable", "headphone", "speaker", "tablet", "mouse",
		"keyboard", "monitor", "camera", "battery", "adapter", "usb", "remote", "controller",
		"console", "router", "hub",
	]),
	("kitchenware", &[
		"pan", "pot", "spoon", "fork", "knife", "plate", "bowl", "cup", "mug", "glass", "blender",
		"toaster", "kettle", "spatula", "whisk", "grater", "peeler", "tray", "colander",
	]),
	("clothing", &[
		"shirt", "pants", "jacket", "coat", "shoe", "sock", "hat", "scarf", "glove", "dress",
		"skirt", "sweater", "hoodie", "belt", "tie", "boot",
	]),
	("tools", &[
		"hammer", "screwdriver", "wrench", "plier", "drill", "saw", "tape", "level", "clamp",
		"sandpaper", "nail", "screw", "bolt",
	]),
	("furniture", &[
		"chair", "table", "desk", "shelf", "cabinet", "drawer", "bed", "couch", "sofa", "lamp",
		"mirror", "rug", "curtain", "stool",
	]),
	("stationery", &[
		"pen", "pencil", "notebook", "paper", "stapler", "eraser", "ruler", "marker",
		"highlighter", "binder", "clip", "envelope", "stamp",
	]),
	("toiletries", &[
		"soap", "shampoo", "toothbrush", "toothpaste", "towel", "razor", "comb", "brush", "lotion",
		"deodorant", "tissue",
	]),
	("toys", &["toy", "game", "puzzle", "doll", "lego", "block", "ball", "figure"]),
];

const MATERIAL_KEYWORDS: &[(&str, &[&str])] = &[
	("metal", &["steel", "iron", "aluminum", "copper", "brass", "metal", "tin"]),
	("plastic", &["plastic", "polymer", "acrylic", "nylon", "pvc", "silicone"]),
	("wood", &["wood", "wooden", "bamboo", "oak", "pine", "walnut", "plywood"]),
	("glass", &["glass", "crystal"]),
	("ceramic", &["ceramic", "porcelain", "clay"]),
	("fabric", &["cotton", "polyester", "linen", "silk", "wool", "leather", "fabric"]),
	("paper", &["paper", "cardboard", "cardstock"]),
];

const ROOM_KEYWORDS: &[(&str, &[&str])] = &[
	("kitchen", &["kitchen", "cook", "bake", "food", "dish"]),
	("bedroom", &["bed", "sleep", "pillow", "mattress", "nightstand"]),
	("bathroom", &["bath", "shower", "toilet", "sink"]),
	("living room", &["couch", "sofa", "tv", "television", "remote"]),
	("garage", &["car", "tool", "drill", "saw", "wrench"]),
	("office", &["desk", "computer", "monitor", "keyboard", "pen", "paper"]),
	("laundry", &["wash", "iron", "dryer", "detergent"]),
];

const STOP_WORDS: &[&str] = &[
	"a", "an", "the", "in", "on", "at", "to", "for", "of", "and", "or", "is", "it", "my", "with",
	"from", "this", "that",
];

const GENERAL_CATEGORY: &str = "general";
const MIN_TAG_CHARS: usize = 3;

pub fn enrich(name: &str, description: Option<&str>) -> ThingMetadata {
	let combined = format!("{name} {}", description.unwrap_or_default()).to_lowercase();
	let tokens: std::collections::HashSet<&str> = combined.split_whitespace().collect();

	let category = detect_category(&tokens);
	let material = detect_material(&tokens);
	let room_hint = detect_room(&tokens);
	let tags = extract_tags(&combined);
	let usage_context = infer_usage(&category, room_hint.as_deref());

	ThingMetadata { category, subtype: None, tags, material, room_hint, usage_context }
}

fn detect_category(tokens: &std::collections::HashSet<&str>) -> String {
	let mut best = GENERAL_CATEGORY;
	let mut best_score = 0;

	for (category, keywords) in CATEGORY_KEYWORDS {
		let score = keywords.iter().filter(|kw| tokens.contains(*kw)).count();

		if score > best_score {
			best_score = score;
			best = category;
		}
	}

	best.to_string()
}

fn detect_material(tokens: &std::collections::HashSet<&str>) -> Option<String> {
	MATERIAL_KEYWORDS
		.iter()
		.find(|(_, keywords)| keywords.iter().any(|kw| tokens.contains(kw)))
		.map(|(material, _)| material.to_string())
}

fn detect_room(tokens: &std::collections::HashSet<&str>) -> Option<String> {
	let mut best = None;
	let mut best_score = 0;

	for (room, keywords) in ROOM_KEYWORDS {
		let score = keywords.iter().filter(|kw| tokens.contains(*kw)).count();

		if score > best_score {
			best_score = score;
			best = Some(room.to_string());
		}
	}

	best
}

fn extract_tags(combined: &str) -> Vec<String> {
	let words = combined
		.split_whitespace()
		.map(|word| word.trim_matches(|ch: char| ch.is_ascii_punctuation()));
	let candidates = words
		.filter(|word| word.chars().count() >= MIN_TAG_CHARS)
		.filter(|word| !STOP_WORDS.contains(word));

	// normalize_tags also enforces the tag cap.
	normalize_tags(candidates)
}

fn infer_usage(category: &str, room_hint: Option<&str>) -> Vec<String> {
	let mut contexts = Vec::new();

	if category != GENERAL_CATEGORY {
		contexts.push(category.to_string());
	}
	if let Some(room) = room_hint {
		contexts.push(room.to_string());
	}

	contexts
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn detects_category_material_and_room() {
		let metadata = enrich("Wooden spoon", Some("a spoon for the kitchen drawer"));

		assert_eq!(metadata.category, "kitchenware");
		assert_eq!(metadata.material.as_deref(), Some("wood"));
		assert_eq!(metadata.room_hint.as_deref(), Some("kitchen"));
		assert_eq!(metadata.usage_context, vec!["kitchenware", "kitchen"]);
	}

	#[test]
	fn unknown_items_fall_back_to_general() {
		let metadata = enrich("Mysterious widget", None);

		assert_eq!(metadata.category, "general");
		assert_eq!(metadata.material, None);
		assert!(metadata.usage_context.is_empty());
	}

	#[test]
	fn tags_skip_stop_words_and_short_words() {
		let metadata = enrich("The USB cable", Some("a cable for my laptop"));

		assert!(metadata.tags.contains(&"usb".to_string()));
		assert!(metadata.tags.contains(&"cable".to_string()));
		assert!(metadata.tags.contains(&"laptop".to_string()));
		assert!(!metadata.tags.contains(&"the".to_string()));
		assert!(!metadata.tags.contains(&"my".to_string()));
		assert!(!metadata.tags.contains(&"a".to_string()));
	}

	#[test]
	fn enrichment_is_deterministic() {
		let first = enrich("Steel hammer", Some("garage tool"));
		let second = enrich("Steel hammer", Some("garage tool"));

		assert_eq!(first, second);
	}
}
