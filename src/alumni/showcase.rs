use axum::{debug_handler, extract::{Query, State}, Json};
use serde::{Deserialize, Serialize};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use crate::{db::Alumnus, AppResult};

use super::{categories::Facets, filter_value, like_pattern, push_has_expertise};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum SortBy {
    Name,
    GraduationYear,
    Company,
}

impl SortBy {
    /// Anything unrecognised sorts by name.
    fn parse(value: Option<&str>) -> SortBy {
        match value {
            Some("graduation_year") => SortBy::GraduationYear,
            Some("company") => SortBy::Company,
            _ => SortBy::Name,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    /// Missing or empty means ascending; any other value than `asc` is descending.
    fn parse(value: Option<&str>) -> SortOrder {
        match value.map(str::trim) {
            None | Some("") => SortOrder::Asc,
            Some(order) if order.eq_ignore_ascii_case("asc") => SortOrder::Asc,
            Some(_) => SortOrder::Desc,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ShowcaseQuery {
    search: Option<String>,
    role: Option<String>,
    domain: Option<String>,
    company: Option<String>,
    sort_by: Option<String>,
    sort_order: Option<String>,
}

#[derive(Serialize)]
pub(crate) struct ShowcaseFilters {
    roles: Vec<String>,
    domains: Vec<String>,
    companies: Vec<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AppliedFilters {
    search: Option<String>,
    role: Option<String>,
    domain: Option<String>,
    company: Option<String>,
    sort_by: SortBy,
    sort_order: SortOrder,
}

#[derive(Serialize)]
pub(crate) struct Showcase {
    alumni: Vec<Alumnus>,
    filters: ShowcaseFilters,
    total: usize,
    applied_filters: AppliedFilters,
}

#[debug_handler]
pub(crate) async fn showcase(
    State(db_pool): State<SqlitePool>,
    Query(query): Query<ShowcaseQuery>,
) -> AppResult<Json<Showcase>> {
    let applied_filters = AppliedFilters {
        search: query.search.filter(|s| !s.is_empty()),
        role: filter_value(query.role),
        domain: filter_value(query.domain),
        company: filter_value(query.company),
        sort_by: SortBy::parse(query.sort_by.as_deref()),
        sort_order: SortOrder::parse(query.sort_order.as_deref()),
    };

    let mut qb = QueryBuilder::<Sqlite>::new("SELECT * FROM alumni WHERE 1=1");
    if let Some(role) = &applied_filters.role {
        qb.push(" AND job_title = ").push_bind(role.clone());
    }
    if let Some(domain) = &applied_filters.domain {
        push_has_expertise(&mut qb, domain.clone());
    }
    if let Some(company) = &applied_filters.company {
        qb.push(" AND company = ").push_bind(company.clone());
    }
    if let Some(search) = &applied_filters.search {
        let pattern = like_pattern(search);
        qb.push(r" AND (name LIKE ").push_bind(pattern.clone())
            .push(r" ESCAPE '\' OR company LIKE ").push_bind(pattern)
            .push(r" ESCAPE '\')");
    }

    let direction = match applied_filters.sort_order {
        SortOrder::Asc => "ASC",
        SortOrder::Desc => "DESC",
    };
    match applied_filters.sort_by {
        SortBy::Name => qb.push(format!(" ORDER BY name {direction}")),
        SortBy::GraduationYear => qb.push(format!(" ORDER BY graduation_year IS NULL, graduation_year {direction}")),
        SortBy::Company => qb.push(format!(" ORDER BY company IS NULL, company {direction}")),
    };

    let alumni: Vec<Alumnus> = qb.build_query_as().fetch_all(&db_pool).await?;

    let Facets { roles, domains, companies, .. } = Facets::load(&db_pool).await?;

    Ok(Json(Showcase {
        total: alumni.len(),
        alumni,
        filters: ShowcaseFilters {
            roles: roles.into_iter().collect(),
            domains: domains.into_iter().collect(),
            companies: companies.into_iter().collect(),
        },
        applied_filters,
    }))
}

#[derive(Deserialize)]
pub(crate) struct ConsultantsQuery {
    expertise: Option<String>,
    company: Option<String>,
}

#[debug_handler]
pub(crate) async fn consultants(
    State(db_pool): State<SqlitePool>,
    Query(ConsultantsQuery { expertise, company }): Query<ConsultantsQuery>,
) -> AppResult<Json<Vec<Alumnus>>> {
    let mut qb = QueryBuilder::<Sqlite>::new("SELECT * FROM alumni WHERE 1=1");
    if let Some(expertise) = filter_value(expertise) {
        push_has_expertise(&mut qb, expertise);
    }
    if let Some(company) = filter_value(company) {
        qb.push(r" AND company LIKE ").push_bind(like_pattern(&company)).push(r" ESCAPE '\'");
    }
    qb.push(" ORDER BY name");

    let alumni: Vec<Alumnus> = qb.build_query_as().fetch_all(&db_pool).await?;
    Ok(Json(alumni))
}
