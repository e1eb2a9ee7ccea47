use serde::Deserialize;

/// One source catalog record, as read from the import JSON file.
#[derive(Debug, Clone, Deserialize)]
pub struct BookRecord {
	pub book_id: String,
	pub title: String,
	#[serde(default)]
	pub author: String,
	#[serde(default)]
	pub description: String,
	#[serde(default)]
	pub tags: Vec<String>,
	#[serde(default)]
	pub language: String,
	#[serde(default)]
	pub cover_url: String,
}
impl BookRecord {
	/// The synthesized text embedded into the tag collection. Records
	/// without tags fall back to the title so every book still gets a
	/// tag-space vector.
	pub fn tags_text(&self) -> String {
		if self.tags.is_empty() {
			format!("Title: {}", self.title)
		} else {
			format!("Tags: {}", self.tags.join(", "))
		}
	}
}
