use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::{db, AppError, AppResult};

/// A job posting and its lifecycle state. Every state-changing operation
/// goes through the methods below; route handlers only load, call, save.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Gig {
    pub id: Uuid,
    pub client: Uuid,
    pub title: String,
    pub description: String,
    pub location: String,
    pub budget: f64,
    pub skills_required: Vec<String>,
    pub applicants: Vec<Uuid>,
    pub freelancer: Option<Uuid>,
    pub is_completed: bool,
    pub is_paid: bool,
    pub review: Option<String>,
    pub date_posted: i64,
    /// Bumped on every stored write; `save` only lands against the
    /// version this copy was loaded at.
    pub version: i64,
}

/// Skills arrive either as a JSON list or as one comma-delimited string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SkillsInput {
    List(Vec<String>),
    Csv(String),
}

impl SkillsInput {
    /// Trimmed, order-preserving, empty entries dropped.
    pub fn normalize(self) -> Vec<String> {
        let raw = match self {
            SkillsInput::List(list) => list,
            SkillsInput::Csv(csv) => csv.split(',').map(str::to_owned).collect(),
        };
        raw.into_iter()
            .map(|s| s.trim().to_owned())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

impl Gig {
    pub fn create(
        client: Uuid,
        title: String,
        description: String,
        location: String,
        budget: f64,
        skills: Option<SkillsInput>,
    ) -> AppResult<Gig> {
        if !budget.is_finite() || budget < 0.0 {
            return Err(AppError::bad_request("budget must be a non-negative number"));
        }
        Ok(Gig {
            id: Uuid::now_v7(),
            client,
            title,
            description,
            location,
            budget,
            skills_required: skills.map(SkillsInput::normalize).unwrap_or_default(),
            applicants: Vec::new(),
            freelancer: None,
            is_completed: false,
            is_paid: false,
            review: None,
            date_posted: db::now_ts(),
            version: 0,
        })
    }

    /// Records an application. With `auto_assign` on, the first applicant
    /// to an unassigned gig is assigned on the spot.
    pub fn apply(&mut self, applicant: Uuid, auto_assign: bool) -> AppResult<()> {
        if applicant == self.client {
            return Err(AppError::forbidden("you cannot apply to your own gig"));
        }
        if self.applicants.contains(&applicant) {
            return Err(AppError::conflict("you already applied to this gig"));
        }
        self.applicants.push(applicant);
        if auto_assign && self.freelancer.is_none() {
            self.freelancer = Some(applicant);
        }
        Ok(())
    }

    /// Client-only. The freelancer must have applied first.
    pub fn assign(&mut self, freelancer: Uuid, caller: Uuid) -> AppResult<()> {
        if caller != self.client {
            return Err(AppError::forbidden("not authorized to assign a freelancer"));
        }
        if freelancer == self.client {
            return Err(AppError::bad_request("cannot assign the gig to its own client"));
        }
        if !self.applicants.contains(&freelancer) {
            return Err(AppError::conflict("freelancer has not applied to this gig"));
        }
        self.freelancer = Some(freelancer);
        Ok(())
    }

    /// Client or assigned freelancer. Completing twice succeeds silently.
    pub fn complete(&mut self, caller: Uuid) -> AppResult<()> {
        if caller != self.client && self.freelancer != Some(caller) {
            return Err(AppError::forbidden("not authorized to complete this gig"));
        }
        self.is_completed = true;
        Ok(())
    }

    /// Trusted payment-gateway trigger; not reachable over HTTP.
    pub fn record_payment(&mut self) {
        self.is_paid = true;
    }

    /// Sets the denormalized review text. Overwriting is allowed.
    pub fn submit_review(&mut self, caller: Uuid, text: String) -> AppResult<()> {
        if caller != self.client {
            return Err(AppError::forbidden("only the client can leave a review"));
        }
        if !self.is_completed {
            return Err(AppError::forbidden("cannot review a gig that is not completed"));
        }
        self.review = Some(text);
        Ok(())
    }

    /// Client-only edit of the posting fields. Lifecycle fields are untouched.
    pub fn update_details(
        &mut self,
        caller: Uuid,
        title: String,
        description: String,
        location: String,
        budget: f64,
        skills: Option<SkillsInput>,
    ) -> AppResult<()> {
        self.authorize_owner(caller)?;
        if !budget.is_finite() || budget < 0.0 {
            return Err(AppError::bad_request("budget must be a non-negative number"));
        }
        self.title = title;
        self.description = description;
        self.location = location;
        self.budget = budget;
        if let Some(skills) = skills {
            self.skills_required = skills.normalize();
        }
        Ok(())
    }

    pub fn authorize_owner(&self, caller: Uuid) -> AppResult<()> {
        if caller != self.client {
            return Err(AppError::forbidden("user not authorized"));
        }
        Ok(())
    }

    /// Chat access gate: the client and the assigned freelancer only.
    pub fn is_chat_participant(&self, user: Uuid) -> bool {
        user == self.client || self.freelancer == Some(user)
    }
}

type GigRow = (
    String,
    String,
    String,
    String,
    String,
    f64,
    String,
    String,
    Option<String>,
    bool,
    bool,
    Option<String>,
    i64,
    i64,
);

fn from_row(row: GigRow) -> AppResult<Gig> {
    let (
        id,
        client,
        title,
        description,
        location,
        budget,
        skills_required,
        applicants,
        freelancer,
        is_completed,
        is_paid,
        review,
        date_posted,
        version,
    ) = row;

    let applicants: Vec<String> = serde_json::from_str(&applicants)?;
    Ok(Gig {
        id: Uuid::parse_str(&id)?,
        client: Uuid::parse_str(&client)?,
        title,
        description,
        location,
        budget,
        skills_required: serde_json::from_str(&skills_required)?,
        applicants: applicants
            .iter()
            .map(|a| Uuid::parse_str(a))
            .collect::<Result<_, _>>()?,
        freelancer: freelancer.as_deref().map(Uuid::parse_str).transpose()?,
        is_completed,
        is_paid,
        review,
        date_posted,
        version,
    })
}

const GIG_COLUMNS: &str = "id,client,title,description,location,budget,skills_required,\
                           applicants,freelancer,is_completed,is_paid,review,date_posted,version";

fn applicants_json(gig: &Gig) -> AppResult<String> {
    let ids: Vec<String> = gig.applicants.iter().map(Uuid::to_string).collect();
    Ok(serde_json::to_string(&ids)?)
}

pub async fn insert(pool: &SqlitePool, gig: &Gig) -> AppResult<()> {
    sqlx::query(
        "INSERT INTO gigs (id,client,title,description,location,budget,skills_required,\
         applicants,freelancer,is_completed,is_paid,review,date_posted,version) \
         VALUES (?,?,?,?,?,?,?,?,?,?,?,?,?,?)",
    )
    .bind(gig.id.to_string())
    .bind(gig.client.to_string())
    .bind(&gig.title)
    .bind(&gig.description)
    .bind(&gig.location)
    .bind(gig.budget)
    .bind(serde_json::to_string(&gig.skills_required)?)
    .bind(applicants_json(gig)?)
    .bind(gig.freelancer.map(|f| f.to_string()))
    .bind(gig.is_completed)
    .bind(gig.is_paid)
    .bind(&gig.review)
    .bind(gig.date_posted)
    .bind(gig.version)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn fetch(pool: &SqlitePool, id: Uuid) -> AppResult<Option<Gig>> {
    let row: Option<GigRow> = sqlx::query_as(&format!("SELECT {GIG_COLUMNS} FROM gigs WHERE id=?"))
        .bind(id.to_string())
        .fetch_optional(pool)
        .await?;
    row.map(from_row).transpose()
}

/// Writes back every mutable field in one statement; the id, client and
/// date_posted columns never change after insert. The write is
/// optimistic: it only lands against the version this copy was loaded
/// at, and bumps it. Returns `false` when another writer got there
/// first, in which case the row is untouched and the caller must reload
/// and redo the change (see [`super::modify`]).
pub async fn save(pool: &SqlitePool, gig: &mut Gig) -> AppResult<bool> {
    let result = sqlx::query(
        "UPDATE gigs SET title=?, description=?, location=?, budget=?, skills_required=?, \
         applicants=?, freelancer=?, is_completed=?, is_paid=?, review=?, version=version+1 \
         WHERE id=? AND version=?",
    )
    .bind(&gig.title)
    .bind(&gig.description)
    .bind(&gig.location)
    .bind(gig.budget)
    .bind(serde_json::to_string(&gig.skills_required)?)
    .bind(applicants_json(gig)?)
    .bind(gig.freelancer.map(|f| f.to_string()))
    .bind(gig.is_completed)
    .bind(gig.is_paid)
    .bind(&gig.review)
    .bind(gig.id.to_string())
    .bind(gig.version)
    .execute(pool)
    .await?;

    let stored = result.rows_affected() == 1;
    if stored {
        gig.version += 1;
    }
    Ok(stored)
}

pub async fn delete(pool: &SqlitePool, id: Uuid) -> AppResult<()> {
    sqlx::query("DELETE FROM gigs WHERE id=?")
        .bind(id.to_string())
        .execute(pool)
        .await?;
    Ok(())
}

/// All gigs, newest first.
pub async fn fetch_all(pool: &SqlitePool) -> AppResult<Vec<Gig>> {
    let rows: Vec<GigRow> = sqlx::query_as(&format!(
        "SELECT {GIG_COLUMNS} FROM gigs ORDER BY date_posted DESC, rowid DESC"
    ))
    .fetch_all(pool)
    .await?;
    rows.into_iter().map(from_row).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gig(client: Uuid) -> Gig {
        Gig::create(
            client,
            "Fix the fence".to_owned(),
            "Two broken posts".to_owned(),
            "Leeds".to_owned(),
            100.0,
            Some(SkillsInput::Csv("x".to_owned())),
        )
        .unwrap()
    }

    #[test]
    fn budget_must_be_finite_and_non_negative() {
        let client = Uuid::now_v7();
        for bad in [-1.0, f64::NAN, f64::INFINITY] {
            let err = Gig::create(
                client,
                "t".into(),
                "d".into(),
                "l".into(),
                bad,
                None,
            )
            .unwrap_err();
            assert!(matches!(err, AppError::BadRequest(_)));
        }
        assert!(Gig::create(client, "t".into(), "d".into(), "l".into(), 0.0, None).is_ok());
    }

    #[test]
    fn skills_are_trimmed_and_order_preserving() {
        let skills = SkillsInput::Csv(" carpentry, , painting ,tiling".to_owned()).normalize();
        assert_eq!(skills, vec!["carpentry", "painting", "tiling"]);

        let skills =
            SkillsInput::List(vec!["  b ".to_owned(), "a".to_owned(), "".to_owned()]).normalize();
        assert_eq!(skills, vec!["b", "a"]);
    }

    #[test]
    fn first_applicant_is_auto_assigned_and_later_ones_are_not() {
        let client = Uuid::now_v7();
        let (f1, f2) = (Uuid::now_v7(), Uuid::now_v7());
        let mut g = gig(client);

        g.apply(f1, true).unwrap();
        assert_eq!(g.freelancer, Some(f1));

        g.apply(f2, true).unwrap();
        assert_eq!(g.applicants, vec![f1, f2]);
        assert_eq!(g.freelancer, Some(f1), "second applicant must not steal the assignment");
    }

    #[test]
    fn auto_assign_can_be_disabled() {
        let mut g = gig(Uuid::now_v7());
        g.apply(Uuid::now_v7(), false).unwrap();
        assert_eq!(g.freelancer, None);
    }

    #[test]
    fn duplicate_application_is_a_conflict_and_leaves_state_unchanged() {
        let mut g = gig(Uuid::now_v7());
        let f = Uuid::now_v7();
        g.apply(f, true).unwrap();

        let before = g.clone();
        let err = g.apply(f, true).unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        assert_eq!(g.applicants, before.applicants);
        assert_eq!(g.freelancer, before.freelancer);
    }

    #[test]
    fn client_cannot_apply_to_own_gig() {
        let client = Uuid::now_v7();
        let mut g = gig(client);
        let err = g.apply(client, true).unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
        assert!(g.applicants.is_empty());
    }

    #[test]
    fn only_the_client_can_assign() {
        let client = Uuid::now_v7();
        let f = Uuid::now_v7();
        let mut g = gig(client);
        g.apply(f, false).unwrap();

        let err = g.assign(f, Uuid::now_v7()).unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
        assert_eq!(g.freelancer, None);

        g.assign(f, client).unwrap();
        assert_eq!(g.freelancer, Some(f));
    }

    #[test]
    fn assign_requires_a_prior_application() {
        let client = Uuid::now_v7();
        let mut g = gig(client);
        let err = g.assign(Uuid::now_v7(), client).unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[test]
    fn assign_rejects_the_client_itself() {
        let client = Uuid::now_v7();
        let mut g = gig(client);
        let err = g.assign(client, client).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn complete_is_allowed_for_client_and_assigned_freelancer_only() {
        let client = Uuid::now_v7();
        let f = Uuid::now_v7();
        let mut g = gig(client);
        g.apply(f, true).unwrap();

        let err = g.complete(Uuid::now_v7()).unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
        assert!(!g.is_completed);

        g.complete(f).unwrap();
        assert!(g.is_completed);

        // idempotent for the client too
        g.complete(client).unwrap();
        assert!(g.is_completed);
    }

    #[test]
    fn inline_review_requires_completion_and_allows_overwrite() {
        let client = Uuid::now_v7();
        let f = Uuid::now_v7();
        let mut g = gig(client);
        g.apply(f, true).unwrap();

        let err = g.submit_review(client, "too early".into()).unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));

        g.complete(client).unwrap();
        let err = g.submit_review(f, "not mine to give".into()).unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));

        g.submit_review(client, "great".into()).unwrap();
        assert_eq!(g.review.as_deref(), Some("great"));

        // a second submission is accepted and overwrites the first
        g.submit_review(client, "even better".into()).unwrap();
        assert_eq!(g.review.as_deref(), Some("even better"));
    }

    #[test]
    fn payment_flag_is_set_by_the_trusted_trigger() {
        let mut g = gig(Uuid::now_v7());
        assert!(!g.is_paid);
        g.record_payment();
        assert!(g.is_paid);
    }

    #[test]
    fn chat_gate_admits_client_and_assigned_freelancer_only() {
        let client = Uuid::now_v7();
        let f = Uuid::now_v7();
        let mut g = gig(client);
        g.apply(f, true).unwrap();

        assert!(g.is_chat_participant(client));
        assert!(g.is_chat_participant(f));
        assert!(!g.is_chat_participant(Uuid::now_v7()));
    }
}
