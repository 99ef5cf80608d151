use std::cmp::Ordering;

use sqlx::postgres::PgArguments;
use sqlx::{FromRow, Postgres};

use super::models::Note;

/// Sort keys accepted by GET /api/notes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NoteSort {
    #[default]
    Newest,
    Oldest,
    TitleAsc,
    TitleDesc,
}

impl NoteSort {
    /// Unknown keys fall back to newest-first.
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("oldest") => NoteSort::Oldest,
            Some("title_asc") => NoteSort::TitleAsc,
            Some("title_desc") => NoteSort::TitleDesc,
            _ => NoteSort::Newest,
        }
    }

    fn order_clause(&self) -> &'static str {
        match self {
            NoteSort::Newest => "ORDER BY \"created_at\" DESC, \"id\" DESC",
            NoteSort::Oldest => "ORDER BY \"created_at\" ASC, \"id\" ASC",
            NoteSort::TitleAsc => "ORDER BY LOWER(\"title\") ASC, \"title\" ASC, \"id\" ASC",
            NoteSort::TitleDesc => "ORDER BY LOWER(\"title\") DESC, \"title\" DESC, \"id\" DESC",
        }
    }

    /// Same ordering as `order_clause`, for stores that sort in memory
    pub fn compare(&self, a: &Note, b: &Note) -> Ordering {
        match self {
            NoteSort::Newest => b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)),
            NoteSort::Oldest => a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)),
            NoteSort::TitleAsc => title_key(a).cmp(&title_key(b)).then(a.id.cmp(&b.id)),
            NoteSort::TitleDesc => title_key(b).cmp(&title_key(a)).then(b.id.cmp(&a.id)),
        }
    }
}

/// Case-folded title first, exact title second; mirrors `LOWER("title"), "title"`
fn title_key(note: &Note) -> (String, &str) {
    (note.title.to_lowercase(), note.title.as_str())
}

/// Which notes a listing draws from, relative to the viewer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NoteScope {
    /// Own notes, public notes and notes shared with the viewer
    #[default]
    Visible,
    Mine,
    Shared,
}

impl NoteScope {
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("mine") => NoteScope::Mine,
            Some("shared") => NoteScope::Shared,
            _ => NoteScope::Visible,
        }
    }
}

/// Bound parameter of a generated query
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    Int(i64),
    Text(String),
}

#[derive(Debug, Clone)]
pub struct SqlResult {
    pub query: String,
    pub params: Vec<SqlParam>,
}

/// A page request over the notes table
#[derive(Debug, Clone)]
pub struct NoteListQuery {
    pub viewer: i64,
    pub scope: NoteScope,
    pub search: Option<String>,
    pub sort: NoteSort,
    pub page: i64,
    pub limit: i64,
}

impl NoteListQuery {
    /// Rows skipped before this page; saturates for pages far past the end
    pub fn offset(&self) -> i64 {
        (self.page - 1).max(0).saturating_mul(self.limit)
    }

    /// Page query: `SELECT * ... WHERE ... ORDER BY ... LIMIT ... OFFSET ...`
    pub fn to_sql(&self) -> SqlResult {
        let (where_clause, params) = self.where_clause();
        let query = [
            "SELECT * FROM \"notes\"".to_string(),
            format!("WHERE {}", where_clause),
            self.sort.order_clause().to_string(),
            format!("LIMIT {} OFFSET {}", self.limit, self.offset()),
        ]
        .join(" ");
        SqlResult { query, params }
    }

    /// Count query sharing the page query's WHERE clause
    pub fn to_count_sql(&self) -> SqlResult {
        let (where_clause, params) = self.where_clause();
        SqlResult {
            query: format!("SELECT COUNT(*) AS count FROM \"notes\" WHERE {}", where_clause),
            params,
        }
    }

    fn where_clause(&self) -> (String, Vec<SqlParam>) {
        let mut params = vec![SqlParam::Int(self.viewer)];
        let shared = "EXISTS (SELECT 1 FROM \"note_shares\" s WHERE s.\"note_id\" = \"notes\".\"id\" AND s.\"user_id\" = $1)";

        let mut conditions = vec![match self.scope {
            NoteScope::Visible => format!("(\"user_id\" = $1 OR \"is_public\" = TRUE OR {})", shared),
            NoteScope::Mine => "\"user_id\" = $1".to_string(),
            NoteScope::Shared => shared.to_string(),
        }];

        if let Some(pattern) = self.search_pattern() {
            params.push(SqlParam::Text(pattern));
            let p = format!("${}", params.len());
            conditions.push(format!("(\"title\" ILIKE {} OR \"content\" ILIKE {})", p, p));
        }

        (conditions.join(" AND "), params)
    }

    fn search_pattern(&self) -> Option<String> {
        let term = self.search.as_deref().map(str::trim).filter(|s| !s.is_empty())?;
        let mut escaped = String::with_capacity(term.len() + 2);
        escaped.push('%');
        for c in term.chars() {
            if matches!(c, '%' | '_' | '\\') {
                escaped.push('\\');
            }
            escaped.push(c);
        }
        escaped.push('%');
        Some(escaped)
    }

    /// In-memory equivalent of the WHERE clause
    pub fn matches(&self, note: &Note, shared_with_viewer: bool) -> bool {
        let in_scope = match self.scope {
            NoteScope::Visible => note.user_id == self.viewer || note.is_public || shared_with_viewer,
            NoteScope::Mine => note.user_id == self.viewer,
            NoteScope::Shared => shared_with_viewer,
        };
        if !in_scope {
            return false;
        }
        match self.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(term) => {
                let term = term.to_lowercase();
                note.title.to_lowercase().contains(&term) || note.content.to_lowercase().contains(&term)
            }
            None => true,
        }
    }
}

pub(crate) fn bind_query<'q>(
    q: sqlx::query::Query<'q, Postgres, PgArguments>,
    params: &'q [SqlParam],
) -> sqlx::query::Query<'q, Postgres, PgArguments> {
    params.iter().fold(q, |q, p| match p {
        SqlParam::Int(i) => q.bind(*i),
        SqlParam::Text(s) => q.bind(s.as_str()),
    })
}

pub(crate) fn bind_query_as<'q, O>(
    q: sqlx::query::QueryAs<'q, Postgres, O, PgArguments>,
    params: &'q [SqlParam],
) -> sqlx::query::QueryAs<'q, Postgres, O, PgArguments>
where
    O: for<'r> FromRow<'r, sqlx::postgres::PgRow>,
{
    params.iter().fold(q, |q, p| match p {
        SqlParam::Int(i) => q.bind(*i),
        SqlParam::Text(s) => q.bind(s.as_str()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn query(scope: NoteScope, search: Option<&str>, sort: NoteSort) -> NoteListQuery {
        NoteListQuery {
            viewer: 42,
            scope,
            search: search.map(str::to_string),
            sort,
            page: 2,
            limit: 5,
        }
    }

    fn note(id: i64, title: &str, user_id: i64, is_public: bool, minute: u32) -> Note {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 12, minute, 0).unwrap();
        Note {
            id,
            title: title.to_string(),
            content: "Some body text here".to_string(),
            author_name: "Unknown".to_string(),
            is_public,
            user_id,
            created_at: at,
            updated_at: at,
        }
    }

    #[test]
    fn parses_sort_keys() {
        assert_eq!(NoteSort::parse(None), NoteSort::Newest);
        assert_eq!(NoteSort::parse(Some("oldest")), NoteSort::Oldest);
        assert_eq!(NoteSort::parse(Some("title_asc")), NoteSort::TitleAsc);
        assert_eq!(NoteSort::parse(Some("title_desc")), NoteSort::TitleDesc);
        assert_eq!(NoteSort::parse(Some("bogus")), NoteSort::Newest);
    }

    #[test]
    fn builds_page_query() {
        let sql = query(NoteScope::Mine, None, NoteSort::Oldest).to_sql();
        assert_eq!(
            sql.query,
            "SELECT * FROM \"notes\" WHERE \"user_id\" = $1 ORDER BY \"created_at\" ASC, \"id\" ASC LIMIT 5 OFFSET 5"
        );
        assert_eq!(sql.params, vec![SqlParam::Int(42)]);
    }

    #[test]
    fn offset_saturates_for_huge_pages() {
        let mut q = query(NoteScope::Visible, None, NoteSort::Newest);
        q.page = i64::MAX;
        assert_eq!(q.offset(), i64::MAX);
        assert!(q.to_sql().query.ends_with(&format!("LIMIT 5 OFFSET {}", i64::MAX)));

        q.page = 1;
        assert_eq!(q.offset(), 0);
    }

    #[test]
    fn title_sort_ignores_case() {
        let mut notes = vec![
            note(1, "banana", 1, true, 0),
            note(2, "Cherry", 1, true, 0),
            note(3, "apple", 1, true, 0),
            note(4, "Apple", 1, true, 0),
        ];

        notes.sort_by(|x, y| NoteSort::TitleAsc.compare(x, y));
        assert_eq!(notes.iter().map(|n| n.id).collect::<Vec<_>>(), vec![4, 3, 1, 2]);

        notes.sort_by(|x, y| NoteSort::TitleDesc.compare(x, y));
        assert_eq!(notes.iter().map(|n| n.id).collect::<Vec<_>>(), vec![2, 1, 3, 4]);

        let sql = query(NoteScope::Mine, None, NoteSort::TitleAsc).to_sql();
        assert!(sql.query.contains("ORDER BY LOWER(\"title\") ASC, \"title\" ASC, \"id\" ASC"));
    }

    #[test]
    fn search_adds_escaped_pattern() {
        let sql = query(NoteScope::Visible, Some(" 50%_off "), NoteSort::Newest).to_count_sql();
        assert!(sql.query.starts_with("SELECT COUNT(*) AS count FROM \"notes\" WHERE (\"user_id\" = $1 OR"));
        assert!(sql.query.ends_with("(\"title\" ILIKE $2 OR \"content\" ILIKE $2)"));
        assert_eq!(sql.params[1], SqlParam::Text("%50\\%\\_off%".to_string()));
    }

    #[test]
    fn blank_search_is_ignored() {
        let sql = query(NoteScope::Shared, Some("   "), NoteSort::Newest).to_sql();
        assert_eq!(sql.params.len(), 1);
        assert!(!sql.query.contains("ILIKE"));
    }

    #[test]
    fn matches_visibility_and_search() {
        let q = query(NoteScope::Visible, Some("SHOP"), NoteSort::Newest);
        assert!(q.matches(&note(1, "Shopping list", 42, false, 0), false));
        assert!(q.matches(&note(2, "Shop hours", 7, true, 0), false));
        assert!(!q.matches(&note(3, "Shop secrets", 7, false, 0), false));
        assert!(q.matches(&note(3, "Shop secrets", 7, false, 0), true));
        assert!(!q.matches(&note(4, "Unrelated", 42, true, 0), false));

        let shared = query(NoteScope::Shared, None, NoteSort::Newest);
        assert!(!shared.matches(&note(1, "Mine", 42, true, 0), false));
    }

    #[test]
    fn compare_breaks_ties_by_id() {
        let a = note(1, "Alpha", 1, true, 5);
        let b = note(2, "Alpha", 1, true, 5);
        let c = note(3, "Beta", 1, true, 1);

        let mut notes = vec![a.clone(), b.clone(), c.clone()];
        notes.sort_by(|x, y| NoteSort::Newest.compare(x, y));
        assert_eq!(notes.iter().map(|n| n.id).collect::<Vec<_>>(), vec![2, 1, 3]);

        notes.sort_by(|x, y| NoteSort::TitleAsc.compare(x, y));
        assert_eq!(notes.iter().map(|n| n.id).collect::<Vec<_>>(), vec![1, 2, 3]);

        notes.sort_by(|x, y| NoteSort::TitleDesc.compare(x, y));
        assert_eq!(notes.iter().map(|n| n.id).collect::<Vec<_>>(), vec![3, 2, 1]);
    }
}
