use std::sync::LazyLock;

use regex::Regex;

use crate::query::{self, QueryError};

static LEVEL_FIELD: LazyLock<Result<Regex, regex::Error>> =
	LazyLock::new(|| Regex::new(r"(?:^|\s+)\+?Level:\s*"));

/// Rewrites user-facing shorthand into the search engine's native syntax.
///
/// `Level:N` becomes two required range clauses: the listing's maximum level is at least `N` and
/// its minimum level is at most `N`. Text without a `Level:` field is returned unchanged.
pub fn translate(raw: &str) -> Result<String, QueryError> {
	let fields: Vec<_> = query::field_pattern(&LEVEL_FIELD, "Level")?.find_iter(raw).collect();
	let field = match fields.as_slice() {
		[] => return Ok(raw.to_string()),
		[field] => field,
		_ => return Err(QueryError::MultipleLevelFields),
	};
	let before = raw[..field.start()].trim_end();
	let after = &raw[field.end()..];
	let mut tokens = after.split_whitespace();
	let value = tokens.next().unwrap_or("");
	let level: i64 = value
		.parse()
		.map_err(|_| QueryError::InvalidLevelValue { value: value.to_string() })?;

	if level < 1 {
		return Err(QueryError::NonPositiveLevel { value: level });
	}

	let max_clause = format!("+MaximumLevel:[{level} TO *]");
	let min_clause = format!("+MinimumLevel:[* TO {level}]");
	let mut parts = Vec::new();

	if !before.is_empty() {
		parts.push(before);
	}

	parts.push(&max_clause);
	parts.push(&min_clause);
	parts.extend(tokens);

	Ok(parts.join(" "))
}
