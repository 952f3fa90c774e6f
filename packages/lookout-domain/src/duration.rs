//! Durations written the way users type them: `5h`, `1h30m`, `90s`, `1.5h`.

use time::Duration;

pub const MAX_TTL: Duration = Duration::hours(24);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unable to parse {text:?} as a duration.")]
pub struct ParseDurationError {
	pub text: String,
}

pub fn parse(text: &str) -> Result<Duration, ParseDurationError> {
	let err = || ParseDurationError { text: text.to_string() };
	let mut rest = text.trim();

	if rest.is_empty() {
		return Err(err());
	}

	let mut total_nanos = 0_f64;

	while !rest.is_empty() {
		let number_len =
			rest.find(|ch: char| !(ch.is_ascii_digit() || ch == '.')).unwrap_or(rest.len());
		let (number, tail) = rest.split_at(number_len);

		if number.is_empty() || number == "." {
			return Err(err());
		}

		let value: f64 = number.parse().map_err(|_| err())?;
		let unit_len = tail.find(|ch: char| ch.is_ascii_digit() || ch == '.').unwrap_or(tail.len());
		let (unit, tail) = tail.split_at(unit_len);
		let scale = match unit {
			"ns" => 1.0,
			"us" | "µs" => 1e3,
			"ms" => 1e6,
			"s" => 1e9,
			"m" => 60.0 * 1e9,
			"h" => 3_600.0 * 1e9,
			_ => return Err(err()),
		};

		total_nanos += value * scale;
		rest = tail;
	}

	if !total_nanos.is_finite() || total_nanos > i64::MAX as f64 {
		return Err(err());
	}

	Ok(Duration::nanoseconds(total_nanos as i64))
}

/// Renders whole hours, minutes and seconds, e.g. `5h 0m 12s`; omits leading zero units.
pub fn format(duration: Duration) -> String {
	let total = duration.whole_seconds().max(0);
	let hours = total / 3_600;
	let minutes = total % 3_600 / 60;
	let seconds = total % 60;

	if hours > 0 {
		format!("{hours}h {minutes}m {seconds}s")
	} else if minutes > 0 {
		format!("{minutes}m {seconds}s")
	} else {
		format!("{seconds}s")
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_compound_durations() {
		assert_eq!(parse("5h"), Ok(Duration::hours(5)));
		assert_eq!(parse("1h30m"), Ok(Duration::minutes(90)));
		assert_eq!(parse("0h1m"), Ok(Duration::minutes(1)));
		assert_eq!(parse("90s"), Ok(Duration::seconds(90)));
		assert_eq!(parse("1.5h"), Ok(Duration::minutes(90)));
		assert_eq!(parse("24h0m"), Ok(MAX_TTL));
		assert_eq!(parse("250ms"), Ok(Duration::milliseconds(250)));
	}

	#[test]
	fn rejects_malformed_durations() {
		for text in ["", "5", "h", "5x", "-5h", "1h-", ".h", "5 h"] {
			assert!(parse(text).is_err(), "{text:?} should not parse");
		}
	}

	#[test]
	fn formats_durations() {
		assert_eq!(format(Duration::hours(5)), "5h 0m 0s");
		assert_eq!(format(Duration::seconds(125)), "2m 5s");
		assert_eq!(format(Duration::seconds(9)), "9s");
		assert_eq!(format(Duration::seconds(-3)), "0s");
	}
}
