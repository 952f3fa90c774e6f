//! Compact query identifiers.
//!
//! An id packs the owner's slot and the evaluation cycle in which the query was stored, so the
//! evaluator can tell both apart from the key alone: `id = slot * CYCLE_PERIOD + cycle`.

/// Seconds between two evaluator ticks.
pub const TICK_SECONDS: u32 = 30;
/// Ticks in 24 hours; cycles wrap at this value.
pub const CYCLE_PERIOD: u32 = 86_400 / TICK_SECONDS;
/// Concurrent queries per author.
pub const MAX_SLOTS: u8 = 10;
/// One past the largest valid id.
pub const ID_LIMIT: u32 = MAX_SLOTS as u32 * CYCLE_PERIOD;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdError {
	#[error("Slot {slot} is outside 0-{max}.", max = MAX_SLOTS - 1)]
	SlotOutOfRange { slot: u8 },
	#[error("Cycle {cycle} is outside 0-{max}.", max = CYCLE_PERIOD - 1)]
	CycleOutOfRange { cycle: u32 },
	#[error("Id {id:X} is outside the valid range.")]
	IdOutOfRange { id: u32 },
	#[error("Id {text:?} is not a hexadecimal query id.")]
	Malformed { text: String },
}

pub fn encode(slot: u8, cycle: u32) -> Result<u32, IdError> {
	if slot >= MAX_SLOTS {
		return Err(IdError::SlotOutOfRange { slot });
	}
	if cycle >= CYCLE_PERIOD {
		return Err(IdError::CycleOutOfRange { cycle });
	}

	Ok(u32::from(slot) * CYCLE_PERIOD + cycle)
}

pub fn decode(id: u32) -> Result<(u8, u32), IdError> {
	if id >= ID_LIMIT {
		return Err(IdError::IdOutOfRange { id });
	}

	let slot = id / CYCLE_PERIOD;
	let cycle = id - slot * CYCLE_PERIOD;

	// `id < ID_LIMIT` bounds the slot below MAX_SLOTS.
	Ok((slot as u8, cycle))
}

pub fn next_cycle(cycle: u32) -> u32 {
	(cycle + 1) % CYCLE_PERIOD
}

/// Fixed-width form used inside storage keys so keys sort by id.
pub fn to_key_suffix(id: u32) -> String {
	format!("{id:04X}")
}

/// Parses a user- or key-supplied hexadecimal id and checks its range.
pub fn parse(text: &str) -> Result<u32, IdError> {
	let trimmed = text.trim();
	let digits = trimmed
		.strip_prefix("0x")
		.or_else(|| trimmed.strip_prefix("0X"))
		.unwrap_or(trimmed);

	if digits.is_empty() || !digits.chars().all(|ch| ch.is_ascii_hexdigit()) {
		return Err(IdError::Malformed { text: text.to_string() });
	}

	let id = u32::from_str_radix(digits, 16)
		.map_err(|_| IdError::Malformed { text: text.to_string() })?;

	decode(id)?;

	Ok(id)
}
