use crate::config::RefineConfig;
use crate::filter::FilterSpec;
use crate::pagination::Pagination;
use crate::params::RawParams;
use crate::projection::projection_spec;
use crate::query::Queryable;
use crate::sort::sort_spec;

/// Applies client query parameters to a [`Queryable`] handle.
///
/// Stages can run in any order, though the usual one is
/// `filter → sort → limit_fields → paginate` (see [`QueryRefiner::refine`]).
/// Each stage consumes the refiner and returns a new one; nothing here can
/// fail. Bad input falls back to the defaults in [`RefineConfig`] and any
/// real error shows up only when the store executes the query.
///
/// ```
/// use tours_query::{QueryRefiner, RawParams, RefinedQuery};
///
/// let params = RawParams::from_pairs([("duration[gte]", "5"), ("sort", "price")]);
/// let query = QueryRefiner::new(RefinedQuery::new(), &params)
///     .refine()
///     .into_query();
///
/// assert_eq!(query.skip, Some(0));
/// assert_eq!(query.limit, Some(10));
/// ```
#[derive(Debug, Clone)]
pub struct QueryRefiner<'p, Q> {
    query: Q,
    params: &'p RawParams,
    config: RefineConfig,
}

impl<'p, Q: Queryable> QueryRefiner<'p, Q> {
    pub fn new(query: Q, params: &'p RawParams) -> Self {
        Self::with_config(query, params, RefineConfig::default())
    }

    pub fn with_config(query: Q, params: &'p RawParams, config: RefineConfig) -> Self {
        QueryRefiner {
            query,
            params,
            config,
        }
    }

    pub fn filter(self) -> Self {
        let spec = FilterSpec::from_params(self.params);
        tracing::trace!(criteria = ?spec.as_document(), "filter stage");
        self.map(|q| q.match_criteria(spec.into_document()))
    }

    pub fn sort(self) -> Self {
        let sort = sort_spec(self.params, &self.config);
        tracing::trace!(?sort, "sort stage");
        self.map(|q| q.order_by(sort))
    }

    pub fn limit_fields(self) -> Self {
        let projection = projection_spec(self.params, &self.config);
        tracing::trace!(%projection, "projection stage");
        self.map(|q| q.project(projection))
    }

    pub fn paginate(self) -> Self {
        let page = Pagination::from_params(self.params, &self.config);
        tracing::trace!(page = page.page, limit = page.limit, "pagination stage");
        self.map(|q| q.skip(page.skip()).limit(page.limit))
    }

    /// All four stages in the conventional order.
    pub fn refine(self) -> Self {
        self.filter().sort().limit_fields().paginate()
    }

    pub fn query(&self) -> &Q {
        &self.query
    }

    pub fn into_query(self) -> Q {
        self.query
    }

    fn map(self, stage: impl FnOnce(Q) -> Q) -> Self {
        QueryRefiner {
            query: stage(self.query),
            params: self.params,
            config: self.config,
        }
    }
}

#[cfg(test)]
mod tests {
    use bson::doc;

    use super::*;
    use crate::projection::Projection;
    use crate::query::RefinedQuery;
    use crate::sort::Sort;

    fn refined(pairs: &[(&str, &str)]) -> RefinedQuery {
        let params = RawParams::from_pairs(pairs.iter().copied());
        QueryRefiner::new(RefinedQuery::new(), &params)
            .refine()
            .into_query()
    }

    #[test]
    fn empty_request_gets_every_default() {
        let q = refined(&[]);
        assert!(q.filter.is_empty());
        assert_eq!(q.sort, vec![Sort::desc("createdAt")]);
        assert_eq!(q.projection, Some(Projection::excluding(["__v"])));
        assert_eq!(q.skip, Some(0));
        assert_eq!(q.limit, Some(10));
    }

    #[test]
    fn full_request() {
        let q = refined(&[
            ("difficulty", "easy"),
            ("price[lt]", "1500"),
            ("sort", "price,-ratingsAverage"),
            ("fields", "name,price"),
            ("page", "2"),
            ("limit", "3"),
        ]);
        assert_eq!(
            q.filter,
            doc! { "difficulty": "easy", "price": { "$lt": "1500" } }
        );
        assert_eq!(q.sort, vec![Sort::asc("price"), Sort::desc("ratingsAverage")]);
        assert_eq!(q.projection, Some(Projection::including(["name", "price"])));
        assert_eq!(q.skip, Some(3));
        assert_eq!(q.limit, Some(3));
    }

    #[test]
    fn stages_run_independently() {
        let params = RawParams::from_pairs([("sort", "name"), ("difficulty", "easy")]);
        let q = QueryRefiner::new(RefinedQuery::new(), &params)
            .sort()
            .into_query();
        assert!(q.filter.is_empty());
        assert_eq!(q.sort, vec![Sort::asc("name")]);
        assert_eq!(q.projection, None);
        assert_eq!(q.skip, None);
    }

    #[test]
    fn stage_order_does_not_matter() {
        let params = RawParams::from_pairs([("price[gte]", "100"), ("page", "2")]);
        let forward = QueryRefiner::new(RefinedQuery::new(), &params).refine();
        let backward = QueryRefiner::new(RefinedQuery::new(), &params)
            .paginate()
            .limit_fields()
            .sort()
            .filter();
        assert_eq!(forward.query(), backward.query());
    }

    #[test]
    fn intermediate_states_are_reusable() {
        let params = RawParams::from_pairs([("difficulty", "easy"), ("page", "3")]);
        let filtered = QueryRefiner::new(RefinedQuery::new(), &params).filter();
        let paged = filtered.clone().paginate();

        assert_eq!(filtered.query().skip, None);
        assert_eq!(paged.query().skip, Some(20));
        assert_eq!(filtered.query().filter, paged.query().filter);
    }

    #[test]
    fn scope_survives_client_filter() {
        let params = RawParams::from_pairs([("tour", "other")]);
        let q = QueryRefiner::new(RefinedQuery::scoped(doc! { "tour": "t1" }), &params)
            .filter()
            .into_query();
        assert_eq!(q.filter, doc! { "$and": [{ "tour": "t1" }, { "tour": "other" }] });
    }

    #[test]
    fn custom_config() {
        let params = RawParams::new();
        let config = RefineConfig::default()
            .with_default_sort(vec![Sort::asc("name")])
            .with_page_size(20)
            .with_revision_field("_rev");
        let q = QueryRefiner::with_config(RefinedQuery::new(), &params, config)
            .refine()
            .into_query();
        assert_eq!(q.sort, vec![Sort::asc("name")]);
        assert_eq!(q.projection, Some(Projection::excluding(["_rev"])));
        assert_eq!(q.limit, Some(20));
    }
}
