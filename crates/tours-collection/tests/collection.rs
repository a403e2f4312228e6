mod common;
use common::*;

use bson::doc;
use tours_collection::{CollectionConfig, CollectionError, MemoryCollection};
use tours_query::{Projection, QueryRefiner, Queryable, RawParams, RefinedQuery, Sort};

fn refine_and_run(tours: &MemoryCollection, pairs: &[(&str, &str)]) -> Vec<bson::Document> {
    let params = RawParams::from_pairs(pairs.iter().copied());
    QueryRefiner::new(tours.find(), &params)
        .refine()
        .into_query()
        .exec()
        .unwrap()
}

// ── refined queries end to end ──────────────────────────────────

#[test]
fn default_request_newest_first_without_revision() {
    let tours = seed_tours();
    let docs = refine_and_run(&tours, &[]);
    assert_eq!(
        names(&docs),
        vec![
            "The Park Camper",
            "The City Wanderer",
            "The Snow Adventurer",
            "The Sea Explorer",
            "The Forest Hiker",
        ]
    );
    assert!(docs.iter().all(|d| !d.contains_key("__v")));
}

#[test]
fn range_filter_casts_query_strings() {
    let tours = seed_tours();
    let docs = refine_and_run(
        &tours,
        &[("duration[gte]", "5"), ("price[lt]", "1200"), ("sort", "price")],
    );
    assert_eq!(names(&docs), vec!["The Forest Hiker", "The Sea Explorer", "The City Wanderer"]);
}

#[test]
fn equality_filter_and_projection() {
    let tours = seed_tours();
    let docs = refine_and_run(
        &tours,
        &[("difficulty", "easy"), ("fields", "name,price"), ("sort", "-price")],
    );
    assert_eq!(
        docs,
        vec![
            doc! { "_id": "tour-4", "name": "The City Wanderer", "price": 1197 },
            doc! { "_id": "tour-1", "name": "The Forest Hiker", "price": 397 },
        ]
    );
}

#[test]
fn multi_key_sort() {
    let tours = seed_tours();
    let docs = refine_and_run(&tours, &[("sort", "difficulty,-ratingsAverage"), ("fields", "name")]);
    assert_eq!(
        names(&docs),
        vec![
            "The Snow Adventurer",
            "The Forest Hiker",
            "The City Wanderer",
            "The Park Camper",
            "The Sea Explorer",
        ]
    );
}

#[test]
fn pages_partition_the_result() {
    let tours = seed_tours();
    let first = refine_and_run(&tours, &[("sort", "price"), ("limit", "2"), ("page", "1")]);
    let second = refine_and_run(&tours, &[("sort", "price"), ("limit", "2"), ("page", "2")]);
    let third = refine_and_run(&tours, &[("sort", "price"), ("limit", "2"), ("page", "3")]);
    let fourth = refine_and_run(&tours, &[("sort", "price"), ("limit", "2"), ("page", "4")]);

    assert_eq!(names(&first), vec!["The Forest Hiker", "The Sea Explorer"]);
    assert_eq!(names(&second), vec!["The Snow Adventurer", "The City Wanderer"]);
    assert_eq!(names(&third), vec!["The Park Camper"]);
    assert!(fourth.is_empty());
}

#[test]
fn page_zero_fails_at_execution() {
    let tours = seed_tours();
    let params = RawParams::from_pairs([("page", "0")]);
    let err = QueryRefiner::new(tours.find(), &params)
        .refine()
        .into_query()
        .exec()
        .unwrap_err();
    assert!(matches!(err, CollectionError::InvalidQuery(_)), "{err}");
}

#[test]
fn uncastable_filter_is_a_cast_error() {
    let tours = seed_tours();
    let params = RawParams::from_pairs([("price[lt]", "cheap")]);
    let err = QueryRefiner::new(tours.find(), &params)
        .filter()
        .into_query()
        .exec()
        .unwrap_err();
    assert_eq!(err.to_string(), "invalid price: cheap");
}

#[test]
fn nested_field_filter() {
    let tours = seed_tours();
    let docs = refine_and_run(&tours, &[("startLocation.address", "Miami, USA")]);
    assert_eq!(names(&docs), vec!["The Sea Explorer"]);
}

#[test]
fn whitelisted_repeats_match_any() {
    let tours = seed_tours();
    let params = RawParams::from_pairs([("difficulty", "easy"), ("difficulty", "difficult")])
        .without_pollution(&["difficulty"]);
    let docs = QueryRefiner::new(tours.find(), &params)
        .refine()
        .into_query()
        .exec()
        .unwrap();
    assert_eq!(
        names(&docs),
        vec!["The City Wanderer", "The Snow Adventurer", "The Forest Hiker"]
    );
}

// ── bare descriptors and direct cursor use ─────────────────────

#[test]
fn execute_refined_descriptor() {
    let tours = seed_tours();
    let params = RawParams::from_pairs([("secretTour", "true")]);
    let query = QueryRefiner::new(RefinedQuery::new(), &params)
        .refine()
        .into_query();
    let docs = tours.execute(&query).unwrap();
    assert_eq!(names(&docs), vec!["The Park Camper"]);
}

#[test]
fn cursor_exposes_its_query() {
    let tours = seed_tours();
    let cursor = tours
        .find()
        .match_criteria(doc! { "difficulty": "medium" })
        .order_by(vec![Sort::asc("price")])
        .project(Projection::including(["name"]));
    assert_eq!(cursor.query().filter, doc! { "difficulty": "medium" });
    assert_eq!(
        cursor.exec().unwrap(),
        vec![
            doc! { "_id": "tour-2", "name": "The Sea Explorer" },
            doc! { "_id": "tour-5", "name": "The Park Camper" },
        ]
    );
}

#[test]
fn count_with_and_without_filter() {
    let tours = seed_tours();
    assert_eq!(tours.len(), 5);
    assert_eq!(tours.count(&doc! {}).unwrap(), 5);
    assert_eq!(tours.count(&doc! { "price": { "$gte": "1000" } }).unwrap(), 2);
}

// ── scope and hidden fields ─────────────────────────────────────

fn users() -> MemoryCollection {
    let mut users = MemoryCollection::new(
        CollectionConfig::new("users")
            .with_hidden_fields(["password", "active"])
            .with_scope(doc! { "active": { "$ne": false } }),
    );
    users.insert_many([
        doc! { "_id": "u1", "name": "Leo", "role": "user", "password": "h1", "active": true },
        doc! { "_id": "u2", "name": "Kate", "role": "guide", "password": "h2", "active": false },
        doc! { "_id": "u3", "name": "Max", "role": "guide", "password": "h3" },
    ]);
    users
}

#[test]
fn inactive_users_are_never_listed() {
    let users = users();
    let params = RawParams::from_pairs([("sort", "name")]);
    let docs = QueryRefiner::new(users.find(), &params)
        .refine()
        .into_query()
        .exec()
        .unwrap();
    assert_eq!(names(&docs), vec!["Leo", "Max"]);
}

#[test]
fn client_cannot_override_scope() {
    let users = users();
    // The scoped field is hidden too, so naming it is refused outright.
    let params = RawParams::from_pairs([("active", "false")]);
    let err = QueryRefiner::new(users.find(), &params)
        .refine()
        .into_query()
        .exec()
        .unwrap_err();
    assert!(matches!(err, CollectionError::InvalidQuery(_)), "{err}");
}

#[test]
fn hidden_fields_cannot_filter_or_sort() {
    let users = users();
    for pairs in [
        vec![("password[gte]", "h2")],
        vec![("sort", "-password")],
    ] {
        let params = RawParams::from_pairs(pairs);
        let err = QueryRefiner::new(users.find(), &params)
            .refine()
            .into_query()
            .exec()
            .unwrap_err();
        assert_eq!(err.to_string(), "invalid query: cannot filter or sort on password");
    }
}

#[test]
fn hidden_fields_survive_explicit_selection() {
    let users = users();
    let params = RawParams::from_pairs([("fields", "name,password"), ("role", "guide")]);
    let docs = QueryRefiner::new(users.find(), &params)
        .refine()
        .into_query()
        .exec()
        .unwrap();
    assert_eq!(docs, vec![doc! { "_id": "u3", "name": "Max" }]);

    let one = users.find_by_id("u1").unwrap().unwrap();
    assert_eq!(one, doc! { "_id": "u1", "name": "Leo", "role": "user" });
}
