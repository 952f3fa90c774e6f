//! Validation of a raw lookout request before it is stored.

use std::sync::LazyLock;

use regex::Regex;
use time::Duration;

use crate::{duration, translate};

static SERVER_FIELD: LazyLock<Result<Regex, regex::Error>> =
	LazyLock::new(|| Regex::new(r"\+?Server:\s*(\w+)"));
static DURATION_FIELD: LazyLock<Result<Regex, regex::Error>> =
	LazyLock::new(|| Regex::new(r"\+?Duration:\s*(\S+)"));

/// Field name the evaluator uses to restrict searches; users may not set it.
pub const RESERVED_FIELD: &str = "Fresh:";
/// Character that would open a regular-expression clause in the search syntax.
pub const FORBIDDEN_CHARACTER: char = '/';

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
	#[error("Please keep queries below {max} characters.")]
	TooLong { max: usize },
	#[error("Query cannot contain the field \"Fresh\".")]
	ReservedField,
	#[error("Query cannot contain the character {ch:?}.")]
	ForbiddenCharacter { ch: char },
	#[error("Multiple fields found specifying level.")]
	MultipleLevelFields,
	#[error("Problem parsing integer for level field from {value:?}.")]
	InvalidLevelValue { value: String },
	#[error("Non-positive integer {value} parsed from level field.")]
	NonPositiveLevel { value: i64 },
	#[error("Missing a server field.")]
	MissingServer,
	#[error("Only one server field may be given.")]
	MultipleServerFields,
	#[error("The server {name:?} does not seem to exist.")]
	UnknownServer { name: String },
	#[error("Unable to locate a duration field.")]
	MissingDuration,
	#[error("Only one duration field may be given.")]
	MultipleDurationFields,
	#[error("Unable to parse the duration {value:?}.")]
	InvalidDuration { value: String },
	#[error("The duration must be greater than zero and at most twenty-four hours.")]
	DurationOutOfRange,
	#[error("The {field} pattern failed to compile.")]
	PatternUnavailable { field: &'static str },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedQuery {
	/// Native search text with the duration removed.
	pub text: String,
	pub server: String,
	pub ttl: Duration,
}

/// Checks a raw request and turns it into storable search text plus its lifetime.
///
/// `server_exists` is consulted with the title-cased server name.
pub fn prepare(
	raw: &str,
	max_chars: usize,
	server_exists: impl Fn(&str) -> bool,
) -> Result<PreparedQuery, QueryError> {
	if raw.chars().count() > max_chars {
		return Err(QueryError::TooLong { max: max_chars });
	}
	if raw.contains(RESERVED_FIELD) {
		return Err(QueryError::ReservedField);
	}
	if raw.contains(FORBIDDEN_CHARACTER) {
		return Err(QueryError::ForbiddenCharacter { ch: FORBIDDEN_CHARACTER });
	}

	let translated = translate::translate(raw)?;
	let (with_server, server) = replace_server(&translated, server_exists)?;
	let (text, ttl) = strip_duration(&with_server)?;

	Ok(PreparedQuery { text: normalize_whitespace(&text), server, ttl })
}

pub(crate) fn field_pattern(
	pattern: &'static LazyLock<Result<Regex, regex::Error>>,
	field: &'static str,
) -> Result<&'static Regex, QueryError> {
	LazyLock::force(pattern).as_ref().map_err(|_| QueryError::PatternUnavailable { field })
}

pub fn title_case(word: &str) -> String {
	let lower = word.to_lowercase();
	let mut chars = lower.chars();

	match chars.next() {
		Some(first) => first.to_uppercase().chain(chars).collect(),
		None => String::new(),
	}
}

fn replace_server(
	text: &str,
	server_exists: impl Fn(&str) -> bool,
) -> Result<(String, String), QueryError> {
	let captures: Vec<_> = field_pattern(&SERVER_FIELD, "Server")?.captures_iter(text).collect();
	let capture = match captures.as_slice() {
		[] => return Err(QueryError::MissingServer),
		[capture] => capture,
		_ => return Err(QueryError::MultipleServerFields),
	};
	let server = title_case(&capture[1]);

	if !server_exists(&server) {
		return Err(QueryError::UnknownServer { name: server });
	}

	let Some(field) = capture.get(0) else {
		return Err(QueryError::MissingServer);
	};
	let replaced =
		format!("{}+Server:{}{}", &text[..field.start()], server, &text[field.end()..]);

	Ok((replaced, server))
}

fn strip_duration(text: &str) -> Result<(String, Duration), QueryError> {
	let captures: Vec<_> =
		field_pattern(&DURATION_FIELD, "Duration")?.captures_iter(text).collect();
	let capture = match captures.as_slice() {
		[] => return Err(QueryError::MissingDuration),
		[capture] => capture,
		_ => return Err(QueryError::MultipleDurationFields),
	};
	let value = &capture[1];
	let ttl = duration::parse(value)
		.map_err(|_| QueryError::InvalidDuration { value: value.to_string() })?;

	if ttl <= Duration::ZERO || ttl > duration::MAX_TTL {
		return Err(QueryError::DurationOutOfRange);
	}

	let Some(field) = capture.get(0) else {
		return Err(QueryError::MissingDuration);
	};
	let stripped = format!("{}{}", &text[..field.start()], &text[field.end()..]);

	Ok((stripped, ttl))
}

fn normalize_whitespace(text: &str) -> String {
	text.split_whitespace().collect::<Vec<_>>().join(" ")
}
