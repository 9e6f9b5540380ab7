use std::cmp::Ordering;

use axum::{debug_handler, extract::{Path, Query, State}, Json};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::{auth::CurrentUser, users::{self, UserSummary}, AppError, AppResult, AppState};

use super::{gig, load_gig, Gig};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    pub query: Option<String>,
    pub location: Option<String>,
    pub skills: Option<String>,
    pub min_budget: Option<f64>,
    pub max_budget: Option<f64>,
    pub sort: Option<String>,
}

pub async fn search(pool: &SqlitePool, q: &SearchQuery) -> AppResult<Vec<Gig>> {
    let mut gigs: Vec<Gig> = gig::fetch_all(pool)
        .await?
        .into_iter()
        .filter(|g| matches(g, q))
        .collect();
    sort_gigs(&mut gigs, q.sort.as_deref())?;
    Ok(gigs)
}

/// All provided filters AND together; absent filters match everything.
fn matches(target: &Gig, q: &SearchQuery) -> bool {
    if let Some(query) = &q.query {
        let query = query.to_lowercase();
        if !target.title.to_lowercase().contains(&query)
            && !target.description.to_lowercase().contains(&query)
        {
            return false;
        }
    }
    if let Some(location) = &q.location {
        if !target.location.to_lowercase().contains(&location.to_lowercase()) {
            return false;
        }
    }
    if let Some(min) = q.min_budget {
        if target.budget < min {
            return false;
        }
    }
    if let Some(max) = q.max_budget {
        if target.budget > max {
            return false;
        }
    }
    if let Some(skills) = &q.skills {
        let wanted: Vec<String> = skills
            .split(',')
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect();
        if !wanted.is_empty()
            && !target
                .skills_required
                .iter()
                .any(|s| wanted.contains(&s.to_lowercase()))
        {
            return false;
        }
    }
    true
}

/// Gigs come out of the store newest first already; a sort key reorders.
fn sort_gigs(gigs: &mut [Gig], sort: Option<&str>) -> AppResult<()> {
    match sort {
        None | Some("newest") => {}
        Some("budget_asc") => {
            gigs.sort_by(|a, b| a.budget.partial_cmp(&b.budget).unwrap_or(Ordering::Equal));
        }
        Some("budget_desc") => {
            gigs.sort_by(|a, b| b.budget.partial_cmp(&a.budget).unwrap_or(Ordering::Equal));
        }
        Some(other) => {
            return Err(AppError::bad_request(format!("unknown sort key: {other}")));
        }
    }
    Ok(())
}

#[debug_handler(state = AppState)]
pub(crate) async fn search_gigs(
    Query(q): Query<SearchQuery>,
    State(db_pool): State<SqlitePool>,
) -> AppResult<Json<Vec<Gig>>> {
    Ok(Json(search(&db_pool, &q).await?))
}

#[debug_handler(state = AppState)]
pub(crate) async fn list_gigs(State(db_pool): State<SqlitePool>) -> AppResult<Json<Vec<Gig>>> {
    Ok(Json(gig::fetch_all(&db_pool).await?))
}

#[derive(Serialize)]
pub(crate) struct GigDetail {
    pub gig: Gig,
    pub client: Option<UserSummary>,
    pub freelancer: Option<UserSummary>,
}

#[debug_handler(state = AppState)]
pub(crate) async fn gig_by_id(
    Path(id): Path<Uuid>,
    State(db_pool): State<SqlitePool>,
) -> AppResult<Json<GigDetail>> {
    let target = load_gig(&db_pool, id).await?;
    let client = users::fetch_summary(&db_pool, target.client).await?;
    let freelancer = match target.freelancer {
        Some(f) => users::fetch_summary(&db_pool, f).await?,
        None => None,
    };
    Ok(Json(GigDetail { gig: target, client, freelancer }))
}

/// Gigs the caller is assigned to or has applied to.
#[debug_handler(state = AppState)]
pub(crate) async fn freelancer_dashboard(
    State(db_pool): State<SqlitePool>,
    user: CurrentUser,
) -> AppResult<Json<Vec<Gig>>> {
    let gigs = gig::fetch_all(&db_pool)
        .await?
        .into_iter()
        .filter(|g| g.freelancer == Some(user.id) || g.applicants.contains(&user.id))
        .collect();
    Ok(Json(gigs))
}

#[debug_handler(state = AppState)]
pub(crate) async fn applicant(
    Path(id): Path<Uuid>,
    State(db_pool): State<SqlitePool>,
) -> AppResult<Json<Value>> {
    let Some(applicant) = users::fetch_summary(&db_pool, id).await? else {
        return Err(AppError::not_found("applicant not found"));
    };
    Ok(Json(json!({ "success": true, "applicant": applicant })))
}
