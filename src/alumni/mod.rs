mod categories;
mod profile;
mod showcase;

use axum::{routing::get, Router};
use sqlx::{QueryBuilder, Sqlite};

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/alumni", get(profile::alumni).post(profile::create_alumnus).patch(profile::update_alumnus))
        .route("/alumni/showcase", get(showcase::showcase))
        .route("/consultants", get(showcase::consultants))
        .route("/categories", get(categories::categories))
        .route("/departments", get(categories::departments))
}

/// `%text%` for a case-insensitive `LIKE ... ESCAPE '\'` substring match.
fn like_pattern(text: &str) -> String {
    let mut pattern = String::with_capacity(text.len() + 2);
    pattern.push('%');
    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

fn push_has_expertise(qb: &mut QueryBuilder<'_, Sqlite>, tag: String) {
    qb.push(" AND EXISTS (SELECT 1 FROM json_each(alumni.areas_of_expertise) WHERE value = ")
        .push_bind(tag)
        .push(")");
}

/// Treats missing, empty and `all` as "no filter".
fn filter_value(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty() && v != "all")
}
