mod support;

use axum::http::StatusCode;
use ontoform::{
    ontology::{vocab::rdf, Iri, Literal, ObjectValue, Triple},
    store::TriplePattern,
};
use rstest::rstest;
use support::{
    body_text, context, data, ex, flash_cookie, get, get_json, location, post_form, router,
    shows_flash, uris, Backend,
};

fn iri(local: &str) -> Iri {
    Iri::new(ex(local)).expect("valid iri")
}

fn minted(local: &str) -> Iri {
    Iri::new(data(local)).expect("valid iri")
}

#[rstest]
#[case::memory(Backend::Memory)]
#[case::sqlite(Backend::Sqlite)]
#[tokio::test]
async fn instance_submission_creates_subject_and_triple(#[case] backend: Backend) {
    let ctx = context(backend).await;
    let before = ctx.store.len().await.expect("len");
    let router = router(ctx.clone());

    let person = ex("Person");
    let works_at = ex("worksAt");
    let acme = ex("Acme");
    let response = post_form(
        &router,
        "/add_triple",
        &[
            ("subjectName", "Bob"),
            ("subjectClass", person.as_str()),
            ("property", works_at.as_str()),
            ("objectKind", "instance"),
            ("objectValueInstance", acme.as_str()),
        ],
    )
    .await;

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), "/");
    let cookie = flash_cookie(&response);

    let triple = Triple::new(minted("Bob"), iri("worksAt"), iri("Acme"));
    assert!(ctx.store.contains(&triple).await.expect("lookup"));
    // rdf:type, rdfs:label and the asserted statement
    assert_eq!(ctx.store.len().await.expect("len"), before + 3);

    let page = body_text(get(&router, "/", Some(&cookie)).await).await;
    assert!(shows_flash(&page, "success"));
    assert!(page.contains("Statement added: Bob worksAt"));
}

#[tokio::test]
async fn literal_value_is_committed_verbatim() {
    let ctx = context(Backend::Memory).await;
    let router = router(ctx.clone());

    let person = ex("Person");
    let has_name = ex("hasName");
    let response = post_form(
        &router,
        "/add_triple",
        &[
            ("subjectName", "Alice"),
            ("subjectClass", person.as_str()),
            ("property", has_name.as_str()),
            ("objectKind", "literal"),
            ("objectValueLiteral", "Acme Corp"),
            ("objectValueInstance", ""),
        ],
    )
    .await;
    assert_eq!(response.status(), StatusCode::FOUND);

    let stored = ctx
        .store
        .matching(
            &TriplePattern::any()
                .with_subject(minted("Alice"))
                .with_predicate(iri("hasName")),
        )
        .await
        .expect("lookup");
    assert_eq!(stored.len(), 1);
    assert_eq!(
        stored[0].object,
        ObjectValue::Literal(Literal::plain("Acme Corp"))
    );
}

#[rstest]
#[case::both(Some("Acme Corp"), Some("https://example.org/kg/Acme"))]
#[case::neither(None, None)]
#[case::blank_literal(Some("   "), None)]
#[tokio::test]
async fn object_values_must_be_exclusive(
    #[case] literal: Option<&str>,
    #[case] instance: Option<&str>,
) {
    let ctx = context(Backend::Memory).await;
    let before = ctx.store.len().await.expect("len");
    let router = router(ctx.clone());

    let person = ex("Person");
    let has_name = ex("hasName");
    let mut fields = vec![
        ("subjectName", "Carol"),
        ("subjectClass", person.as_str()),
        ("property", has_name.as_str()),
        ("objectKind", "literal"),
    ];
    if let Some(literal) = literal {
        fields.push(("objectValueLiteral", literal));
    }
    if let Some(instance) = instance {
        fields.push(("objectValueInstance", instance));
    }
    let response = post_form(&router, "/add_triple", &fields).await;

    assert_eq!(response.status(), StatusCode::FOUND);
    let back = location(&response);
    assert!(back.starts_with("/?class_uri="), "{back}");
    assert_eq!(ctx.store.len().await.expect("len"), before);

    let cookie = flash_cookie(&response);
    let page = body_text(get(&router, &back, Some(&cookie)).await).await;
    assert!(shows_flash(&page, "error"));
    // the previous selection is restored
    assert!(page.contains("\" selected>Person</option>"));
}

#[rstest]
#[case::missing_name(&[("subjectName", ""), ("objectValueLiteral", "x")])]
#[case::kind_mismatch(&[("objectKind", "instance"), ("objectValueLiteral", "x")])]
#[case::undeclared_property(&[("property", "https://example.org/kg/salary"), ("objectValueLiteral", "1")])]
#[case::bad_integer(&[("property", "https://example.org/kg/age"), ("objectValueLiteral", "forty")])]
#[tokio::test]
async fn invalid_submissions_are_rejected(#[case] overrides: &[(&str, &str)]) {
    let ctx = context(Backend::Memory).await;
    let before = ctx.store.len().await.expect("len");
    let router = router(ctx.clone());

    let person = ex("Person");
    let has_name = ex("hasName");
    let mut fields: Vec<(&str, &str)> = vec![
        ("subjectName", "Dave"),
        ("subjectClass", person.as_str()),
        ("property", has_name.as_str()),
        ("objectKind", "literal"),
    ];
    for &(name, value) in overrides {
        fields.retain(|(field, _)| *field != name);
        fields.push((name, value));
    }

    let response = post_form(&router, "/add_triple", &fields).await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_ne!(location(&response), "/");
    assert_eq!(ctx.store.len().await.expect("len"), before);

    let page = body_text(get(&router, "/", Some(&flash_cookie(&response))).await).await;
    assert!(shows_flash(&page, "error"));
}

#[tokio::test]
async fn repeated_submission_warns() {
    let ctx = context(Backend::Memory).await;
    let router = router(ctx.clone());

    let person = ex("Person");
    let age = ex("age");
    let fields = [
        ("subjectName", "Alice"),
        ("subjectClass", person.as_str()),
        ("property", age.as_str()),
        ("objectKind", "literal"),
        ("objectValueLiteral", "42"),
    ];
    post_form(&router, "/add_triple", &fields).await;
    let count = ctx.store.len().await.expect("len");

    let response = post_form(&router, "/add_triple", &fields).await;
    assert_eq!(ctx.store.len().await.expect("len"), count);

    let page = body_text(get(&router, "/", Some(&flash_cookie(&response))).await).await;
    assert!(shows_flash(&page, "warning"));
    assert!(page.contains("already present"));
}

#[tokio::test]
async fn flash_messages_are_shown_once() {
    let router = router(context(Backend::Memory).await);
    let person = ex("Person");
    let response = post_form(
        &router,
        "/add_triple",
        &[("subjectClass", person.as_str())],
    )
    .await;
    let cookie = flash_cookie(&response);

    let first = get(&router, "/", Some(&cookie)).await;
    let removal = first
        .headers()
        .get_all(axum::http::header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .any(|value| value.starts_with("_flash=") && value.contains("Max-Age=0"));
    assert!(removal, "flash cookie is cleared after display");
    assert!(shows_flash(&body_text(first).await, "error"));

    let second = body_text(get(&router, "/", None).await).await;
    assert!(!shows_flash(&second, "error"));
}

#[tokio::test]
async fn tampered_flash_cookie_is_ignored() {
    let router = router(context(Backend::Memory).await);
    let page = body_text(
        get(
            &router,
            "/",
            Some(r#"_flash=[{"level":"error","message":"forged"}]"#),
        )
        .await,
    )
    .await;
    assert!(!page.contains("forged"));
}

#[tokio::test]
async fn subjects_named_after_classes_stay_out_of_the_schema() {
    let ctx = context(Backend::Memory).await;
    let router = router(ctx.clone());

    let person = ex("Person");
    let has_name = ex("hasName");
    let response = post_form(
        &router,
        "/add_triple",
        &[
            ("subjectName", "Person"),
            ("subjectClass", person.as_str()),
            ("property", has_name.as_str()),
            ("objectKind", "literal"),
            ("objectValueLiteral", "x"),
        ],
    )
    .await;
    assert_eq!(location(&response), "/");

    let class_typed_as_itself = Triple::new(iri("Person"), rdf::TYPE.into(), iri("Person"));
    assert!(!ctx.store.contains(&class_typed_as_itself).await.expect("lookup"));

    let query = serde_urlencoded::to_string([("class_uri", person.as_str())]).expect("query");
    let instances = get_json(&router, &format!("/api/instances?{query}")).await;
    let instances = uris(&instances);
    assert!(instances.contains(&data("Person")));
    assert!(!instances.contains(&person));

    let classes = uris(&get_json(&router, "/api/classes").await);
    assert!(classes.contains(&person));
}
