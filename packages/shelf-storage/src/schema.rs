pub fn render_schema() -> String {
	let init = include_str!("../../../sql/init.sql");

	expand_includes(init)
}

fn expand_includes(sql: &str) -> String {
	let mut out = String::new();

	for line in sql.lines() {
		let trimmed = line.trim();

		if let Some(path) = trimmed.strip_prefix("\\ir ") {
			match path.trim() {
				"tables/001_locations.sql" =>
					out.push_str(include_str!("../../../sql/tables/001_locations.sql")),
				"tables/002_things.sql" =>
					out.push_str(include_str!("../../../sql/tables/002_things.sql")),
				"tables/003_placements.sql" =>
					out.push_str(include_str!("../../../sql/tables/003_placements.sql")),
				_ => out.push_str(line),
			}
		} else {
			out.push_str(line);
		}

		out.push('\n');
	}

	out
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn rendered_schema_has_no_unexpanded_includes() {
		let schema = render_schema();

		assert!(!schema.contains("\\ir "));
		assert!(schema.contains("CREATE TABLE IF NOT EXISTS locations"));
		assert!(schema.contains("CREATE TABLE IF NOT EXISTS things"));
		assert!(schema.contains("CREATE TABLE IF NOT EXISTS placements"));
		assert!(schema.contains("placements_one_active_idx"));
	}
}
