use bson::Bson;
use regex::Regex;

/// Predicate tree compiled from a filter document.
#[derive(Debug, Clone)]
pub enum Expression {
    /// Empty `And` matches every document.
    And(Vec<Expression>),
    Or(Vec<Expression>),
    Eq(String, Bson),
    Ne(String, Bson),
    Gt(String, Bson),
    Gte(String, Bson),
    Lt(String, Bson),
    Lte(String, Bson),
    In(String, Vec<Bson>),
    Regex(String, Regex),
    Exists(String, bool),
}

impl Expression {
    pub fn match_all() -> Self {
        Expression::And(Vec::new())
    }
}
