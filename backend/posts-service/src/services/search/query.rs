//! Select request construction
//!
//! Turns a [`SearchQuery`] into the `q`, `fq`, `sort`, `rows` and `start`
//! parameters Solr expects. Empty parts are omitted so the backend applies
//! its own defaults.

/// Free-text term that matches every document.
pub const MATCH_ALL: &str = "*";

/// Newest-first ordering used by the latest listing.
pub const LATEST_SORT: &str = "post_pub_date_sorter desc";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQuery {
    pub text: String,
    /// Raw Solr filter expression.
    pub filter: String,
    pub sort: String,
    /// 0 means "use the configured page size".
    pub rows: usize,
    pub start: u64,
}

impl SearchQuery {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn match_all() -> Self {
        Self::new(MATCH_ALL)
    }

    pub fn latest(start: u64, rows: usize) -> Self {
        Self::match_all()
            .with_sort(LATEST_SORT)
            .with_start(start)
            .with_rows(rows)
    }

    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = filter.into();
        self
    }

    pub fn with_sort(mut self, sort: impl Into<String>) -> Self {
        self.sort = sort.into();
        self
    }

    pub fn with_rows(mut self, rows: usize) -> Self {
        self.rows = rows;
        self
    }

    pub fn with_start(mut self, start: u64) -> Self {
        self.start = start;
        self
    }

    /// Query-string parameters for a select request.
    pub fn to_params(&self, default_rows: usize) -> Vec<(&'static str, String)> {
        let text = self.text.trim();
        let mut params = vec![(
            "q",
            if text.is_empty() { MATCH_ALL } else { text }.to_string(),
        )];

        if !self.filter.trim().is_empty() {
            params.push(("fq", self.filter.clone()));
        }
        if !self.sort.trim().is_empty() {
            params.push(("sort", self.sort.clone()));
        }

        let rows = if self.rows == 0 { default_rows } else { self.rows };
        params.push(("rows", rows.to_string()));
        params.push(("start", self.start.to_string()));
        params
    }
}

/// Filter restricting results to the given document ids.
///
/// Returns `None` for an empty id list; an empty membership clause would
/// match nothing, which is never what the caller wants.
pub fn id_membership_filter(ids: &[String]) -> Option<String> {
    if ids.is_empty() {
        return None;
    }
    let terms: Vec<String> = ids.iter().map(|id| quote_term(id)).collect();
    Some(format!("id:({})", terms.join(" ")))
}

fn quote_term(term: &str) -> String {
    let mut quoted = String::with_capacity(term.len() + 2);
    quoted.push('"');
    for c in term.chars() {
        if c == '"' || c == '\\' {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}

/// A validated sort expression such as `post_pub_date_sorter desc, id asc`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortExpr(String);

impl SortExpr {
    /// Parse caller-supplied sort input; `None` when blank or malformed.
    pub fn parse(raw: &str) -> Option<Self> {
        if raw.trim().is_empty() {
            return None;
        }

        let mut clauses = Vec::new();
        for clause in raw.split(',') {
            let mut parts = clause.split_whitespace();
            let (Some(field), Some(direction), None) = (parts.next(), parts.next(), parts.next())
            else {
                return None;
            };

            let field_ok = field
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.');
            if !field_ok {
                return None;
            }

            let direction = direction.to_ascii_lowercase();
            if direction != "asc" && direction != "desc" {
                return None;
            }
            clauses.push(format!("{} {}", field, direction));
        }

        Some(Self(clauses.join(", ")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
