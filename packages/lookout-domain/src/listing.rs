//! Group-finder listings as served by the listing provider.
//!
//! Only the fields that matter for searching and display are kept; unknown fields in the
//! provider's JSON are ignored.

use serde::{Deserialize, Serialize};

/// One fetch worth of listings, grouped by server.
pub type RawSnapshot = Vec<Server>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Server {
	pub name: String,
	#[serde(default, deserialize_with = "null_as_default")]
	pub groups: Vec<Listing>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Listing {
	pub id: u64,
	#[serde(default, deserialize_with = "null_as_default")]
	pub comment: String,
	#[serde(default)]
	pub quest: Option<Quest>,
	#[serde(default, deserialize_with = "null_as_default")]
	pub difficulty: String,
	#[serde(rename = "MinimumLevel", default)]
	pub min_level: i32,
	#[serde(rename = "MaximumLevel", default)]
	pub max_level: i32,
	/// Minutes since the group entered its adventure; zero when not inside one.
	#[serde(default)]
	pub adventure_active: u32,
	#[serde(default)]
	pub leader: Option<Member>,
	#[serde(default, deserialize_with = "null_as_default")]
	pub members: Vec<Member>,
}
impl Listing {
	pub fn quest_name(&self) -> &str {
		self.quest.as_ref().map(|quest| quest.name.as_str()).unwrap_or("")
	}

	/// The leader counts as a member.
	pub fn member_count(&self) -> u32 {
		u32::try_from(self.members.len()).unwrap_or(u32::MAX).saturating_add(1)
	}

	pub fn locations(&self) -> impl Iterator<Item = &Location> {
		self.leader.iter().chain(self.members.iter()).filter_map(|member| member.location.as_ref())
	}
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Quest {
	#[serde(default, deserialize_with = "null_as_default")]
	pub name: String,
	#[serde(rename = "RequiredAdventurePack", default, deserialize_with = "null_as_default")]
	pub adventure_pack: String,
	#[serde(default, deserialize_with = "null_as_default")]
	pub adventure_area: String,
	#[serde(default, deserialize_with = "null_as_default")]
	pub quest_journal_group: String,
	#[serde(default, deserialize_with = "null_as_default")]
	pub group_size: String,
	#[serde(default, deserialize_with = "null_as_default")]
	pub patron: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Member {
	#[serde(default)]
	pub location: Option<Location>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Location {
	#[serde(default, deserialize_with = "null_as_default")]
	pub name: String,
	#[serde(default, deserialize_with = "null_as_default")]
	pub region: String,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
	D: serde::Deserializer<'de>,
	T: Default + Deserialize<'de>,
{
	Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
