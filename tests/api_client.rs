mod support;

use learn2ux::api::{ApiError, CategoryPayload, IconType, QuestionPayload};
use learn2ux::lang::Lang;
use learn2ux::transfer::{export_to, import_from, read_records, QuestionRecord, QUESTIONS_FILE};
use secrecy::{ExposeSecret, SecretString};
use serde_json::json;

use support::{FakeService, ADMIN_EMAIL, ADMIN_PASSWORD, TOKEN};

fn token() -> SecretString {
    SecretString::from(TOKEN.to_owned())
}

fn payload(title_en: &str) -> CategoryPayload {
    CategoryPayload {
        title_en: title_en.into(),
        title_ar: "أدوات".into(),
        description_en: "Design tools".into(),
        description_ar: "أدوات التصميم".into(),
        text_color: "#5E0535".into(),
        border_color: "#D22985".into(),
        icon: "https://cdn.learn2ux.test/icon.svg".into(),
        icon_type: IconType::Svg,
    }
}

#[tokio::test]
async fn login_returns_token() {
    let service = FakeService::start().await;
    let client = service.client();
    let issued = client
        .admin_login(ADMIN_EMAIL, &SecretString::from(ADMIN_PASSWORD.to_owned()))
        .await
        .unwrap();
    assert_eq!(issued.expose_secret(), TOKEN);

    let err = client
        .admin_login(ADMIN_EMAIL, &SecretString::from("nope".to_owned()))
        .await
        .unwrap_err();
    assert!(err.is_auth());
    assert_eq!(err.user_message("Login failed"), "Invalid credentials");
}

#[tokio::test]
async fn category_payload_uses_wire_names() {
    let service = FakeService::start().await;
    let client = service.client();
    let ack = client.create_category(&token(), &payload("Tools")).await.unwrap();
    assert_eq!(ack.message_or("fallback"), "Category created");
    let created = ack.data.unwrap();
    assert_eq!(created.title_en, "Tools");

    let body = service.last_body().unwrap();
    assert_eq!(body["titleEn"], "Tools");
    assert_eq!(body["textColor"], "#5E0535");
    assert_eq!(body["iconType"], "svg");

    let fetched = client.get_category(&created.id).await.unwrap().unwrap();
    assert_eq!(fetched.title_ar, "أدوات");
    assert_eq!(client.get_category("missing").await.unwrap(), None);
}

#[tokio::test]
async fn questions_are_filtered_by_category() {
    let service = FakeService::start().await;
    let tools = service.seed_category("Tools", "أدوات");
    let research = service.seed_category("Research", "بحث");
    service.seed_question(&tools, "Which tool?", "<p>Figma</p>");
    service.seed_question(&research, "How many interviews?", "<p>Five</p>");

    let client = service.client();
    let questions = client.questions_by_category(&tools, None).await.unwrap();
    assert_eq!(questions.len(), 1);
    assert_eq!(questions[0].question_en, "Which tool?");
    assert_eq!(
        questions[0].category.as_ref().and_then(|c| c.title(Lang::Ar)),
        Some("أدوات")
    );

    let categories = client.list_categories().await.unwrap();
    assert_eq!(categories[0].question_number, 1);
}

#[tokio::test]
async fn empty_links_are_left_out() {
    let service = FakeService::start().await;
    let tools = service.seed_category("Tools", "أدوات");
    let client = service.client();
    let question = QuestionPayload {
        category_id: tools.clone(),
        question_en: "Which tool?".into(),
        question_ar: "أي أداة؟".into(),
        answer_en: "<p>Figma</p>".into(),
        answer_ar: "<p>فيجما</p>".into(),
        links: Vec::new(),
    };
    client.create_question(&token(), &question).await.unwrap();
    let body = service.last_body().unwrap();
    assert!(body.get("links").is_none());
    assert_eq!(body["categoryId"], json!(tools));
}

#[tokio::test]
async fn orphaned_question_has_no_category() {
    let service = FakeService::start().await;
    let tools = service.seed_category("Tools", "أدوات");
    service.seed_question(&tools, "Which tool?", "<p>Figma</p>");
    let client = service.client();
    client.delete_category(&token(), &tools).await.unwrap();

    let questions = client.list_questions(Some(&token())).await.unwrap();
    assert_eq!(questions.len(), 1);
    assert_eq!(questions[0].category_id(), None);
}

#[tokio::test]
async fn mutations_without_valid_token_fail() {
    let service = FakeService::start().await;
    let client = service.client();
    let stale = SecretString::from("stale".to_owned());
    let err = client.create_category(&stale, &payload("Tools")).await.unwrap_err();
    assert!(matches!(err, ApiError::Remote { .. }));
    assert!(err.is_auth());
    assert!(service.categories().is_empty());
}

#[tokio::test]
async fn read_failures_surface_as_errors() {
    let service = FakeService::start().await;
    service.fail_reads(true);
    let client = service.client();
    assert!(client.list_categories().await.is_err());
    assert!(client.list_categories_or_empty().await.is_empty());
    assert_eq!(client.get_category_or_none("cat1").await, None);
}

#[tokio::test]
async fn export_then_import_into_another_service() {
    let source = FakeService::start().await;
    let tools = source.seed_category("Tools", "أدوات");
    let research = source.seed_category("Research", "بحث");
    source.seed_question_with_links(
        &tools,
        "Which tool?",
        "<p>Figma</p>",
        &["https://figma.com", "https://penpot.app"],
    );
    source.seed_question(&research, "How many interviews?", "<p>Five</p>");

    let dir = tempfile::tempdir().unwrap();
    let exported = export_to(&source.client(), dir.path()).await.unwrap();
    assert_eq!(exported.categories, 2);
    assert_eq!(exported.questions, 2);
    let records: Vec<QuestionRecord> = read_records(&dir.path().join(QUESTIONS_FILE)).unwrap();
    assert_eq!(records[0].links, "https://figma.com https://penpot.app");

    let target = FakeService::start().await;
    // ids on the target differ from the export
    target.seed_category("Existing", "موجود");
    target.echo_created(false);
    let imported = import_from(&target.client(), &token(), dir.path())
        .await
        .unwrap();
    assert_eq!(imported.categories, 2);
    assert_eq!(imported.questions, 2);
    assert_eq!(imported.skipped, 0);

    let categories = target.categories();
    let new_tools = categories
        .iter()
        .find(|c| c["titleEn"] == "Tools")
        .unwrap()["_id"]
        .clone();
    assert_ne!(new_tools, json!(tools));
    let questions = target.questions();
    let moved = questions
        .iter()
        .find(|q| q["questionEn"] == "Which tool?")
        .unwrap();
    assert_eq!(moved["categoryId"], new_tools);
    assert_eq!(moved["links"], json!(["https://figma.com", "https://penpot.app"]));
}
