use std::collections::HashMap;

use bson::{Bson, Document};
use tours_query::Projection;

/// A pre-built tree of dot-notation field paths.
///
/// Given `["startLocation.address", "name"]`, builds:
/// ```text
/// { "startLocation": Branch({ "address": Leaf }), "name": Leaf }
/// ```
/// Built once per query, reused across all documents.
#[derive(Debug, Clone, PartialEq)]
enum FieldTree {
    Leaf,
    Branch(HashMap<String, FieldTree>),
}

fn build_tree(paths: &[String]) -> HashMap<String, FieldTree> {
    let mut root = HashMap::new();
    for path in paths {
        insert_path(&mut root, path);
    }
    root
}

fn insert_path(map: &mut HashMap<String, FieldTree>, remaining: &str) {
    match remaining.split_once('.') {
        // If both "a" and "a.b" are requested, "a" wins.
        None => {
            map.insert(remaining.to_string(), FieldTree::Leaf);
        }
        Some((top, rest)) => {
            let entry = map
                .entry(top.to_string())
                .or_insert_with(|| FieldTree::Branch(HashMap::new()));
            if let FieldTree::Branch(children) = entry {
                insert_path(children, rest);
            }
        }
    }
}

/// Applies a [`Projection`] plus the collection's hidden fields.
#[derive(Debug, Clone)]
pub(crate) struct Projector {
    include: Option<HashMap<String, FieldTree>>,
    exclude: Vec<String>,
}

impl Projector {
    pub(crate) fn new(projection: Option<&Projection>, hidden: &[String]) -> Self {
        let include = projection
            .filter(|p| p.is_inclusive())
            .map(|p| build_tree(&p.include));
        let exclude = projection
            .map(|p| p.exclude.iter())
            .into_iter()
            .flatten()
            .chain(hidden)
            .cloned()
            .collect();
        Projector { include, exclude }
    }

    pub(crate) fn apply(&self, doc: &Document) -> Document {
        let mut out = match &self.include {
            Some(tree) => project_document(doc, tree, true),
            None => doc.clone(),
        };
        for path in &self.exclude {
            remove_path(&mut out, path);
        }
        out
    }
}

fn project_document(src: &Document, tree: &HashMap<String, FieldTree>, keep_id: bool) -> Document {
    let mut dest = Document::new();
    for (key, value) in src {
        if keep_id && key == "_id" {
            dest.insert(key.clone(), value.clone());
            continue;
        }
        match tree.get(key) {
            None => {}
            Some(FieldTree::Leaf) => {
                dest.insert(key.clone(), value.clone());
            }
            Some(FieldTree::Branch(children)) => match value {
                Bson::Document(sub) => {
                    dest.insert(key.clone(), project_document(sub, children, false));
                }
                Bson::Array(items) => {
                    let projected: Vec<Bson> = items
                        .iter()
                        .filter_map(|item| match item {
                            Bson::Document(sub) => {
                                Some(Bson::Document(project_document(sub, children, false)))
                            }
                            _ => None,
                        })
                        .collect();
                    dest.insert(key.clone(), projected);
                }
                _ => {}
            },
        }
    }
    dest
}

fn remove_path(doc: &mut Document, path: &str) {
    match path.split_once('.') {
        None => {
            doc.remove(path);
        }
        Some((top, rest)) => match doc.get_mut(top) {
            Some(Bson::Document(sub)) => remove_path(sub, rest),
            Some(Bson::Array(items)) => {
                for item in items {
                    if let Bson::Document(sub) = item {
                        remove_path(sub, rest);
                    }
                }
            }
            _ => {}
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    fn user() -> Document {
        doc! {
            "_id": "u1",
            "name": "Ada",
            "email": "ada@example.com",
            "password": "hash",
            "__v": 0,
            "address": { "city": "London", "zip": "N1" },
            "locations": [{ "day": 1, "address": "A" }, { "day": 2, "address": "B" }],
        }
    }

    #[test]
    fn no_projection_returns_everything_but_hidden() {
        let out = Projector::new(None, &["password".into()]).apply(&user());
        assert!(!out.contains_key("password"));
        assert!(out.contains_key("__v"));
        assert_eq!(out.len(), user().len() - 1);
    }

    #[test]
    fn exclusion() {
        let projection = Projection::excluding(["__v", "address.zip"]);
        let out = Projector::new(Some(&projection), &[]).apply(&user());
        assert!(!out.contains_key("__v"));
        assert_eq!(out.get_document("address").unwrap(), &doc! { "city": "London" });
    }

    #[test]
    fn inclusion_keeps_id_and_source_order() {
        let projection = Projection::including(["email", "name"]);
        let out = Projector::new(Some(&projection), &[]).apply(&user());
        assert_eq!(out, doc! { "_id": "u1", "name": "Ada", "email": "ada@example.com" });
    }

    #[test]
    fn inclusion_can_drop_id() {
        let projection = Projection::parse("name,-_id");
        let out = Projector::new(Some(&projection), &[]).apply(&user());
        assert_eq!(out, doc! { "name": "Ada" });
    }

    #[test]
    fn dotted_inclusion_into_documents_and_arrays() {
        let projection = Projection::including(["address.city", "locations.day"]);
        let out = Projector::new(Some(&projection), &[]).apply(&user());
        assert_eq!(
            out,
            doc! {
                "_id": "u1",
                "address": { "city": "London" },
                "locations": [{ "day": 1 }, { "day": 2 }],
            }
        );
    }

    #[test]
    fn hidden_fields_win_over_inclusion() {
        let projection = Projection::including(["name", "password"]);
        let out = Projector::new(Some(&projection), &["password".into()]).apply(&user());
        assert_eq!(out, doc! { "_id": "u1", "name": "Ada" });
    }
}
