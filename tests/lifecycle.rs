mod common;

use common::{pool, seed_gig, seed_user};
use gigboard::{
    gigs::{self, SearchQuery},
    users::Role,
    AppError,
};

/// The full happy path: post, apply (auto-assign), second applicant,
/// complete, inline review with permissive overwrite.
#[tokio::test]
async fn gig_lifecycle_end_to_end() {
    let pool = pool().await;
    let client = seed_user(&pool, "carol", Role::Client).await;
    let f1 = seed_user(&pool, "frank", Role::Freelancer).await;
    let f2 = seed_user(&pool, "fiona", Role::Freelancer).await;

    let posted = seed_gig(&pool, client.id, "Fix fence", 100.0, "x").await;

    // first applicant is auto-assigned
    let mut gig = gigs::fetch(&pool, posted.id).await.unwrap().unwrap();
    gig.apply(f1.id, true).unwrap();
    gigs::save(&pool, &mut gig).await.unwrap();

    let gig = gigs::fetch(&pool, posted.id).await.unwrap().unwrap();
    assert_eq!(gig.freelancer, Some(f1.id));

    // second applicant joins the list without stealing the assignment
    let mut gig = gig;
    gig.apply(f2.id, true).unwrap();
    gigs::save(&pool, &mut gig).await.unwrap();

    let gig = gigs::fetch(&pool, posted.id).await.unwrap().unwrap();
    assert_eq!(gig.applicants, vec![f1.id, f2.id]);
    assert_eq!(gig.freelancer, Some(f1.id));

    // complete, then the client reviews; the second call overwrites
    let mut gig = gig;
    gig.complete(client.id).unwrap();
    gig.submit_review(client.id, "great".to_owned()).unwrap();
    gigs::save(&pool, &mut gig).await.unwrap();

    let gig = gigs::fetch(&pool, posted.id).await.unwrap().unwrap();
    assert!(gig.is_completed);
    assert_eq!(gig.review.as_deref(), Some("great"));

    let mut gig = gig;
    gig.submit_review(client.id, "superb".to_owned()).unwrap();
    gigs::save(&pool, &mut gig).await.unwrap();
    let gig = gigs::fetch(&pool, posted.id).await.unwrap().unwrap();
    assert_eq!(gig.review.as_deref(), Some("superb"));
}

#[tokio::test]
async fn duplicate_application_does_not_change_the_stored_gig() {
    let pool = pool().await;
    let client = seed_user(&pool, "carol", Role::Client).await;
    let f = seed_user(&pool, "frank", Role::Freelancer).await;
    let posted = seed_gig(&pool, client.id, "Paint shed", 40.0, "painting").await;

    let mut gig = gigs::fetch(&pool, posted.id).await.unwrap().unwrap();
    gig.apply(f.id, true).unwrap();
    gigs::save(&pool, &mut gig).await.unwrap();

    let mut gig = gigs::fetch(&pool, posted.id).await.unwrap().unwrap();
    let err = gig.apply(f.id, true).unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    let stored = gigs::fetch(&pool, posted.id).await.unwrap().unwrap();
    assert_eq!(stored.applicants, vec![f.id]);
}

#[tokio::test]
async fn explicit_assignment_with_auto_assign_disabled() {
    let pool = pool().await;
    let client = seed_user(&pool, "carol", Role::Client).await;
    let f = seed_user(&pool, "frank", Role::Freelancer).await;
    let outsider = seed_user(&pool, "oscar", Role::Client).await;
    let posted = seed_gig(&pool, client.id, "Tile roof", 300.0, "tiling").await;

    let mut gig = gigs::fetch(&pool, posted.id).await.unwrap().unwrap();
    gig.apply(f.id, false).unwrap();
    gigs::save(&pool, &mut gig).await.unwrap();

    let stored = gigs::fetch(&pool, posted.id).await.unwrap().unwrap();
    assert_eq!(stored.freelancer, None);

    // a non-owner cannot assign, and nothing is persisted
    let mut gig = stored.clone();
    let err = gig.assign(f.id, outsider.id).unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));
    assert_eq!(
        gigs::fetch(&pool, posted.id).await.unwrap().unwrap().freelancer,
        None
    );

    let mut gig = stored;
    gig.assign(f.id, client.id).unwrap();
    gigs::save(&pool, &mut gig).await.unwrap();
    assert_eq!(
        gigs::fetch(&pool, posted.id).await.unwrap().unwrap().freelancer,
        Some(f.id)
    );
}

/// Two requests read the same snapshot before either writes. The stale
/// write must be rejected rather than erase the first applicant, and the
/// losing request must land cleanly once redone through the retrying
/// path.
#[tokio::test]
async fn overlapping_applications_never_lose_an_applicant() {
    let pool = pool().await;
    let client = seed_user(&pool, "carol", Role::Client).await;
    let f1 = seed_user(&pool, "frank", Role::Freelancer).await;
    let f2 = seed_user(&pool, "fiona", Role::Freelancer).await;
    let posted = seed_gig(&pool, client.id, "Fix fence", 100.0, "x").await;

    let mut first = gigs::fetch(&pool, posted.id).await.unwrap().unwrap();
    let mut second = gigs::fetch(&pool, posted.id).await.unwrap().unwrap();

    first.apply(f1.id, true).unwrap();
    assert!(gigs::save(&pool, &mut first).await.unwrap());

    second.apply(f2.id, true).unwrap();
    assert!(
        !gigs::save(&pool, &mut second).await.unwrap(),
        "a write against a stale version must not land"
    );

    // the first application survived intact
    let stored = gigs::fetch(&pool, posted.id).await.unwrap().unwrap();
    assert_eq!(stored.applicants, vec![f1.id]);
    assert_eq!(stored.freelancer, Some(f1.id));

    // the losing request goes back through load-mutate-save and both
    // applications end up recorded, with the assignment unmoved
    let after = gigs::modify(&pool, posted.id, |g| g.apply(f2.id, true)).await.unwrap();
    assert_eq!(after.applicants, vec![f1.id, f2.id]);
    assert_eq!(after.freelancer, Some(f1.id));
}

#[tokio::test]
async fn delete_removes_the_gig() {
    let pool = pool().await;
    let client = seed_user(&pool, "carol", Role::Client).await;
    let posted = seed_gig(&pool, client.id, "Short gig", 10.0, "x").await;

    let gig = gigs::fetch(&pool, posted.id).await.unwrap().unwrap();
    gig.authorize_owner(client.id).unwrap();
    gigs::delete(&pool, posted.id).await.unwrap();

    assert!(gigs::fetch(&pool, posted.id).await.unwrap().is_none());
}

#[tokio::test]
async fn search_filters_combine_over_the_store() {
    let pool = pool().await;
    let client = seed_user(&pool, "carol", Role::Client).await;
    seed_gig(&pool, client.id, "Cheap paint job", 30.0, "painting").await;
    seed_gig(&pool, client.id, "Mid fence repair", 100.0, "carpentry,x").await;
    seed_gig(&pool, client.id, "Posh landscaping", 500.0, "landscaping,y").await;

    let in_range = gigs::search(
        &pool,
        &SearchQuery {
            min_budget: Some(50.0),
            max_budget: Some(150.0),
            ..SearchQuery::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(in_range.len(), 1);
    assert_eq!(in_range[0].title, "Mid fence repair");

    let with_skills = gigs::search(
        &pool,
        &SearchQuery {
            min_budget: Some(50.0),
            skills: Some("x,y".to_owned()),
            ..SearchQuery::default()
        },
    )
    .await
    .unwrap();
    let titles: Vec<&str> = with_skills.iter().map(|g| g.title.as_str()).collect();
    assert_eq!(titles, vec!["Posh landscaping", "Mid fence repair"]);

    let by_budget = gigs::search(
        &pool,
        &SearchQuery {
            sort: Some("budget_asc".to_owned()),
            ..SearchQuery::default()
        },
    )
    .await
    .unwrap();
    let budgets: Vec<f64> = by_budget.iter().map(|g| g.budget).collect();
    assert_eq!(budgets, vec![30.0, 100.0, 500.0]);

    let text = gigs::search(
        &pool,
        &SearchQuery {
            query: Some("FENCE".to_owned()),
            ..SearchQuery::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(text.len(), 1);
}
