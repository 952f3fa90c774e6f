//! Full-text search over one snapshot.
//!
//! The index is rebuilt from scratch for every tick and dropped after the query scan.

use tantivy::{
	Document, Index, IndexReader, ReloadPolicy, Term,
	collector::DocSetCollector,
	query::{BooleanQuery, Occur, Query, QueryParser, TermQuery},
	schema::{
		FAST, Field, INDEXED, IndexRecordOption, STORED, STRING, Schema, TEXT, TextFieldIndexing,
		TextOptions,
	},
	tokenizer::TokenizerManager,
};

use lookout_domain::snapshot::{IndexedListing, IndexedSnapshot};

const WRITER_MEMORY_BYTES: usize = 15_000_000;

#[derive(Debug, thiserror::Error)]
pub enum SearchError {
	#[error(transparent)]
	Index(#[from] tantivy::TantivyError),
	#[error(transparent)]
	Parse(#[from] tantivy::query::QueryParserError),
	#[error("Indexed listing is missing its {field} field.")]
	MissingField { field: &'static str },
}

/// A listing hit, addressed the way the snapshot is keyed.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct SearchMatch {
	pub server: String,
	pub listing_id: String,
}

pub trait SearchEngine
where
	Self: Send + Sync,
{
	fn build(&self, snapshot: &IndexedSnapshot) -> Result<Box<dyn SearchIndex>, SearchError>;

	/// Rejects query text the engine would fail to parse at search time.
	fn validate(&self, query: &str) -> Result<(), SearchError>;
}

pub trait SearchIndex
where
	Self: Send + Sync,
{
	/// Every listing matching `query`; with `restrict_to_fresh`, only fresh listings.
	fn search(&self, query: &str, restrict_to_fresh: bool)
	-> Result<Vec<SearchMatch>, SearchError>;
}

#[derive(Debug, Clone, Copy)]
struct Fields {
	id: Field,
	server: Field,
	difficulty: Field,
	group_size: Field,
	comment: Field,
	quest_name: Field,
	patron: Field,
	adventure_pack: Field,
	adventure_area: Field,
	quest_journal_group: Field,
	locations: Field,
	minimum_level: Field,
	maximum_level: Field,
	adventure_active: Field,
	members: Field,
	fresh: Field,
}
impl Fields {
	fn default_search_fields(&self) -> Vec<Field> {
		vec![
			self.difficulty,
			self.group_size,
			self.comment,
			self.quest_name,
			self.patron,
			self.adventure_pack,
			self.adventure_area,
			self.quest_journal_group,
			self.locations,
		]
	}
}

pub struct TantivyEngine {
	schema: Schema,
	fields: Fields,
}
impl TantivyEngine {
	pub fn new() -> Self {
		let mut builder = Schema::builder();
		let stemmed = TextOptions::default().set_indexing_options(
			TextFieldIndexing::default()
				.set_tokenizer("en_stem")
				.set_index_option(IndexRecordOption::WithFreqsAndPositions),
		);
		let fields = Fields {
			id: builder.add_text_field("Id", STRING | STORED),
			server: builder.add_text_field("Server", STRING | STORED),
			difficulty: builder.add_text_field("Difficulty", TEXT),
			group_size: builder.add_text_field("GroupSize", TEXT),
			comment: builder.add_text_field("Comment", stemmed.clone()),
			quest_name: builder.add_text_field("QuestName", stemmed.clone()),
			patron: builder.add_text_field("Patron", stemmed.clone()),
			adventure_pack: builder.add_text_field("AdventurePack", stemmed.clone()),
			adventure_area: builder.add_text_field("AdventureArea", stemmed.clone()),
			quest_journal_group: builder.add_text_field("QuestJournalGroup", stemmed.clone()),
			locations: builder.add_text_field("Locations", stemmed),
			minimum_level: builder.add_i64_field("MinimumLevel", INDEXED | STORED | FAST),
			maximum_level: builder.add_i64_field("MaximumLevel", INDEXED | STORED | FAST),
			adventure_active: builder.add_i64_field("AdventureActive", INDEXED | STORED | FAST),
			members: builder.add_i64_field("Members", INDEXED | STORED | FAST),
			fresh: builder.add_bool_field("Fresh", INDEXED),
		};

		Self { schema: builder.build(), fields }
	}

	fn document(&self, entry: &IndexedListing) -> Document {
		let fields = &self.fields;
		let listing = &entry.listing;
		let mut doc = Document::default();

		doc.add_text(fields.id, listing.id.to_string());
		doc.add_text(fields.server, &entry.server);
		doc.add_text(fields.difficulty, &listing.difficulty);
		doc.add_text(fields.comment, &listing.comment);

		if let Some(quest) = &listing.quest {
			doc.add_text(fields.quest_name, &quest.name);
			doc.add_text(fields.patron, &quest.patron);
			doc.add_text(fields.adventure_pack, &quest.adventure_pack);
			doc.add_text(fields.adventure_area, &quest.adventure_area);
			doc.add_text(fields.quest_journal_group, &quest.quest_journal_group);
			doc.add_text(fields.group_size, &quest.group_size);
		}

		for location in listing.locations() {
			doc.add_text(fields.locations, format!("{} {}", location.name, location.region));
		}

		doc.add_i64(fields.minimum_level, i64::from(listing.min_level));
		doc.add_i64(fields.maximum_level, i64::from(listing.max_level));
		doc.add_i64(fields.adventure_active, i64::from(listing.adventure_active));
		doc.add_i64(fields.members, i64::from(entry.member_count));
		doc.add_bool(fields.fresh, entry.fresh);

		doc
	}
}
impl Default for TantivyEngine {
	fn default() -> Self {
		Self::new()
	}
}
impl SearchEngine for TantivyEngine {
	fn build(&self, snapshot: &IndexedSnapshot) -> Result<Box<dyn SearchIndex>, SearchError> {
		let index = Index::create_in_ram(self.schema.clone());
		let mut writer = index.writer_with_num_threads(1, WRITER_MEMORY_BYTES)?;

		for entry in snapshot.listings() {
			writer.add_document(self.document(entry))?;
		}

		writer.commit()?;

		let reader = index.reader_builder().reload_policy(ReloadPolicy::Manual).try_into()?;
		let parser = QueryParser::for_index(&index, self.fields.default_search_fields());

		Ok(Box::new(TantivyIndex { reader, parser, fields: self.fields }))
	}

	fn validate(&self, query: &str) -> Result<(), SearchError> {
		let parser = QueryParser::new(
			self.schema.clone(),
			self.fields.default_search_fields(),
			TokenizerManager::default(),
		);

		parser.parse_query(query)?;

		Ok(())
	}
}

struct TantivyIndex {
	reader: IndexReader,
	parser: QueryParser,
	fields: Fields,
}
impl SearchIndex for TantivyIndex {
	fn search(
		&self,
		query: &str,
		restrict_to_fresh: bool,
	) -> Result<Vec<SearchMatch>, SearchError> {
		let parsed = self.parser.parse_query(query)?;
		let query: Box<dyn Query> = if restrict_to_fresh {
			let fresh: Box<dyn Query> = Box::new(TermQuery::new(
				Term::from_field_bool(self.fields.fresh, true),
				IndexRecordOption::Basic,
			));

			Box::new(BooleanQuery::new(vec![(Occur::Must, parsed), (Occur::Must, fresh)]))
		} else {
			parsed
		};
		let searcher = self.reader.searcher();
		let addresses = searcher.search(query.as_ref(), &DocSetCollector)?;
		let mut matches = Vec::with_capacity(addresses.len());

		for address in addresses {
			let doc: Document = searcher.doc(address)?;
			let text = |field| doc.get_first(field).and_then(|value| value.as_text());
			let server =
				text(self.fields.server).ok_or(SearchError::MissingField { field: "Server" })?;
			let listing_id = text(self.fields.id).ok_or(SearchError::MissingField { field: "Id" })?;

			matches.push(SearchMatch {
				server: server.to_string(),
				listing_id: listing_id.to_string(),
			});
		}

		matches.sort();

		Ok(matches)
	}
}
