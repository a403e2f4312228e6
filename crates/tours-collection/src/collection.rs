use std::cmp::Ordering;
use std::collections::HashSet;

use bson::{Bson, Document};
use serde::{Deserialize, Serialize};
use tours_query::{Projection, Queryable, REVISION_FIELD, RefinedQuery, Sort, SortDirection, merge_criteria};

use crate::error::CollectionError;
use crate::eval;
use crate::parse_filter::parse_filter;
use crate::projection::Projector;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionConfig {
    pub name: String,
    #[serde(default = "default_revision_field")]
    pub revision_field: String,
    /// Never returned, whatever the projection asks for.
    #[serde(default)]
    pub hidden_fields: Vec<String>,
    /// Criteria ANDed into every query.
    #[serde(default)]
    pub scope: Option<Document>,
}

fn default_revision_field() -> String {
    REVISION_FIELD.to_string()
}

impl CollectionConfig {
    pub fn new(name: impl Into<String>) -> Self {
        CollectionConfig {
            name: name.into(),
            revision_field: default_revision_field(),
            hidden_fields: Vec::new(),
            scope: None,
        }
    }

    pub fn with_hidden_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.hidden_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_scope(mut self, scope: Document) -> Self {
        self.scope = Some(scope);
        self
    }
}

/// Documents held in memory, queried with MongoDB-like semantics.
#[derive(Debug, Clone)]
pub struct MemoryCollection {
    config: CollectionConfig,
    docs: Vec<Document>,
    ids: HashSet<String>,
    next_id: u64,
}

impl MemoryCollection {
    pub fn new(config: CollectionConfig) -> Self {
        MemoryCollection {
            config,
            docs: Vec::new(),
            ids: HashSet::new(),
            next_id: 1,
        }
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn config(&self) -> &CollectionConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    /// Store documents, assigning an `_id` and a zero revision where missing.
    /// Returns the number inserted.
    pub fn insert_many(&mut self, docs: impl IntoIterator<Item = Document>) -> usize {
        let before = self.docs.len();
        for mut doc in docs {
            if !doc.contains_key("_id") {
                let id = self.next_free_id();
                doc.insert("_id", id);
            }
            if let Some(id) = id_key(doc.get("_id")) {
                self.ids.insert(id);
            }
            if !doc.contains_key(&self.config.revision_field) {
                doc.insert(self.config.revision_field.clone(), 0_i32);
            }
            self.docs.push(doc);
        }
        let inserted = self.docs.len() - before;
        tracing::debug!(collection = %self.config.name, inserted, "inserted documents");
        inserted
    }

    fn next_free_id(&mut self) -> String {
        loop {
            let id = format!("{:024x}", self.next_id);
            self.next_id += 1;
            if !self.ids.contains(&id) {
                return id;
            }
        }
    }

    /// Start a lazy query; refine it through [`Queryable`] and run it with
    /// [`Cursor::exec`].
    pub fn find(&self) -> Cursor<'_> {
        Cursor {
            collection: self,
            query: RefinedQuery::new(),
        }
    }

    /// Single document by `_id` (string or ObjectId hex), with the default
    /// projection applied.
    pub fn find_by_id(&self, id: &str) -> Result<Option<Document>, CollectionError> {
        let query = RefinedQuery::new()
            .project(Projection::excluding([self.config.revision_field.clone()]))
            .limit(1);
        let filter = self.scoped_filter(&query.filter);
        let expr = parse_filter(&filter)?;
        let projector = Projector::new(query.projection.as_ref(), &self.config.hidden_fields);

        for doc in &self.docs {
            if id_matches(doc.get("_id"), id) && eval::matches(doc, &expr)? {
                return Ok(Some(projector.apply(doc)));
            }
        }
        Ok(None)
    }

    /// Number of documents matching `filter` (plus the collection scope).
    pub fn count(&self, filter: &Document) -> Result<u64, CollectionError> {
        self.reject_hidden(filter, &[])?;
        let expr = parse_filter(&self.scoped_filter(filter))?;
        let mut total = 0;
        for doc in &self.docs {
            if eval::matches(doc, &expr)? {
                total += 1;
            }
        }
        Ok(total)
    }

    /// Run a query: filter → sort → skip/limit → projection.
    ///
    /// A negative skip is rejected, as is a filter or sort on a hidden
    /// field. A limit of zero means no limit and a
    /// negative limit counts by its absolute value.
    pub fn execute(&self, query: &RefinedQuery) -> Result<Vec<Document>, CollectionError> {
        let skip = match query.skip {
            Some(n) if n < 0 => {
                return Err(CollectionError::InvalidQuery(format!(
                    "skip must be non-negative, got {n}"
                )));
            }
            Some(n) => usize::try_from(n).unwrap_or(usize::MAX),
            None => 0,
        };
        let take = match query.limit {
            None | Some(0) => usize::MAX,
            Some(n) => usize::try_from(n.unsigned_abs()).unwrap_or(usize::MAX),
        };

        self.reject_hidden(&query.filter, &query.sort)?;
        let expr = parse_filter(&self.scoped_filter(&query.filter))?;
        let mut matched = Vec::new();
        for doc in &self.docs {
            if eval::matches(doc, &expr)? {
                matched.push(doc);
            }
        }
        let total = matched.len();

        sort_documents(&mut matched, &query.sort);

        let projector = Projector::new(query.projection.as_ref(), &self.config.hidden_fields);
        let page: Vec<Document> = matched
            .into_iter()
            .skip(skip)
            .take(take)
            .map(|doc| projector.apply(doc))
            .collect();

        tracing::debug!(
            collection = %self.config.name,
            matched = total,
            returned = page.len(),
            "executed query"
        );
        Ok(page)
    }

    /// Hidden fields cannot be used to select or order documents, otherwise
    /// their values could be recovered one comparison at a time. The scope
    /// is exempt; it is applied after this check.
    fn reject_hidden(&self, filter: &Document, sort: &[Sort]) -> Result<(), CollectionError> {
        let mut fields = Vec::new();
        filter_fields(filter, &mut fields);
        fields.extend(sort.iter().map(|s| s.field.as_str()));

        for field in fields {
            if let Some(hidden) = self
                .config
                .hidden_fields
                .iter()
                .find(|hidden| overlaps(hidden, field))
            {
                return Err(CollectionError::InvalidQuery(format!(
                    "cannot filter or sort on {hidden}"
                )));
            }
        }
        Ok(())
    }

    fn scoped_filter(&self, filter: &Document) -> Document {
        match &self.config.scope {
            Some(scope) => merge_criteria(scope.clone(), filter.clone()),
            None => filter.clone(),
        }
    }
}

fn id_key(value: Option<&Bson>) -> Option<String> {
    match value? {
        Bson::String(s) => Some(s.clone()),
        Bson::ObjectId(oid) => Some(oid.to_hex()),
        _ => None,
    }
}

fn id_matches(value: Option<&Bson>, id: &str) -> bool {
    id_key(value).is_some_and(|key| key == id)
}

/// Field paths named by a filter, looking inside `$and` / `$or`.
fn filter_fields<'a>(filter: &'a Document, out: &mut Vec<&'a str>) {
    for (key, value) in filter {
        if !key.starts_with('$') {
            out.push(key);
            continue;
        }
        if let Bson::Array(items) = value {
            for item in items {
                if let Bson::Document(sub) = item {
                    filter_fields(sub, out);
                }
            }
        }
    }
}

/// True when one dotted path is the other or lies beneath it.
fn overlaps(a: &str, b: &str) -> bool {
    let beneath = |inner: &str, outer: &str| {
        inner
            .strip_prefix(outer)
            .is_some_and(|rest| rest.starts_with('.'))
    };
    a == b || beneath(a, b) || beneath(b, a)
}

/// Stable multi-key sort; earlier keys take priority.
fn sort_documents(docs: &mut [&Document], sorts: &[Sort]) {
    if sorts.is_empty() {
        return;
    }
    docs.sort_by(|a, b| {
        for sort in sorts {
            let ord = eval::compare_for_sort(
                eval::get_path(a, &sort.field),
                eval::get_path(b, &sort.field),
            );
            let ord = match sort.direction {
                SortDirection::Asc => ord,
                SortDirection::Desc => ord.reverse(),
            };
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    });
}

/// A query bound to a collection, built up through [`Queryable`].
#[derive(Debug, Clone)]
pub struct Cursor<'c> {
    collection: &'c MemoryCollection,
    query: RefinedQuery,
}

impl<'c> Cursor<'c> {
    pub fn query(&self) -> &RefinedQuery {
        &self.query
    }

    pub fn exec(&self) -> Result<Vec<Document>, CollectionError> {
        self.collection.execute(&self.query)
    }
}

impl Queryable for Cursor<'_> {
    fn match_criteria(self, criteria: Document) -> Self {
        Cursor {
            query: self.query.match_criteria(criteria),
            ..self
        }
    }

    fn order_by(self, sort: Vec<Sort>) -> Self {
        Cursor {
            query: self.query.order_by(sort),
            ..self
        }
    }

    fn project(self, projection: Projection) -> Self {
        Cursor {
            query: self.query.project(projection),
            ..self
        }
    }

    fn skip(self, n: i64) -> Self {
        Cursor {
            query: self.query.skip(n),
            ..self
        }
    }

    fn limit(self, n: i64) -> Self {
        Cursor {
            query: self.query.limit(n),
            ..self
        }
    }
}
