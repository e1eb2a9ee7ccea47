use uuid::Uuid;

/// Which of the two per-book vector-store entries an identifier addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointRole {
	Tags,
	Desc,
}
impl PointRole {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Tags => "tags",
			Self::Desc => "desc",
		}
	}
}

/// Derives the vector-store primary key for one book/role pair.
///
/// Name-based UUID (v3, MD5) over `"{book_id}_{role}"`, so re-ingesting the
/// same catalog overwrites points instead of duplicating them.
pub fn point_id(book_id: &str, role: PointRole) -> Uuid {
	let name = format!("{book_id}_{}", role.as_str());

	Uuid::new_v3(&Uuid::NAMESPACE_OID, name.as_bytes())
}
