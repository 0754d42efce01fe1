use std::collections::BTreeSet;

use axum::{debug_handler, extract::State, Json};
use serde::Serialize;
use serde_json::{json, Value};
use sqlx::{types::Json as SqlJson, SqlitePool};

use crate::AppResult;

/// Distinct values the alumni directory can be filtered by.
#[derive(Debug, Default)]
pub(crate) struct Facets {
    pub(crate) domains: BTreeSet<String>,
    pub(crate) companies: BTreeSet<String>,
    pub(crate) roles: BTreeSet<String>,
    pub(crate) years: BTreeSet<i64>,
}

impl Facets {
    pub(crate) async fn load(db_pool: &SqlitePool) -> AppResult<Facets> {
        let rows: Vec<(Option<String>, Option<String>, SqlJson<Vec<String>>, Option<i64>)> =
            sqlx::query_as("SELECT company,job_title,areas_of_expertise,graduation_year FROM alumni")
                .fetch_all(db_pool)
                .await?;

        let mut facets = Facets::default();
        for (company, job_title, SqlJson(areas), year) in rows {
            facets.domains.extend(areas.into_iter().filter(|a| !a.is_empty()));
            facets.companies.extend(company.filter(|c| !c.is_empty()));
            facets.roles.extend(job_title.filter(|r| !r.is_empty()));
            facets.years.extend(year);
        }
        Ok(facets)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Categories {
    domains: Vec<String>,
    companies: Vec<String>,
    roles: Vec<String>,
    graduation_years: Vec<i64>,
}

#[debug_handler]
pub(crate) async fn categories(State(db_pool): State<SqlitePool>) -> AppResult<Json<Categories>> {
    let Facets { domains, companies, roles, years } = Facets::load(&db_pool).await?;

    Ok(Json(Categories {
        domains: domains.into_iter().collect(),
        companies: companies.into_iter().collect(),
        roles: roles.into_iter().collect(),
        graduation_years: years.into_iter().rev().collect(),
    }))
}

#[debug_handler]
pub(crate) async fn departments(State(db_pool): State<SqlitePool>) -> AppResult<Json<Value>> {
    let Facets { domains, roles, .. } = Facets::load(&db_pool).await?;
    Ok(Json(json!({ "domains": domains, "roles": roles })))
}
