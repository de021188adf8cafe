use axum::extract::{Path, State};
use axum::routing::post;
use axum::{Form, Router};
use axum_typed_multipart::{TryFromMultipart, TypedMultipart};
use serde::Deserialize;

use crate::api::ContentClient;
use crate::forms::{self, DeleteConfirm, QuestionFields, QuestionForm};
use crate::richtext::{AnswerField, FormatAction, Selection, Toolbar};
use crate::server::app::AppState;
use crate::server::deserializers::empty_string_as_none;
use crate::session::AdminSession;

use super::admin::{Dashboard, DashboardPage, Tab};

#[derive(TryFromMultipart)]
struct QuestionInput {
    #[form_data(default)]
    category_id: String,
    #[form_data(default)]
    question_en: String,
    #[form_data(default)]
    question_ar: String,
    #[form_data(default)]
    answer_en: String,
    #[form_data(default)]
    answer_ar: String,
    links: Vec<String>,
    /// Which button was pressed: `save`, `cancel`, `add_link`,
    /// `remove_link:<index>` or a toolbar action.
    #[form_data(default)]
    action: String,
    /// Answer field the toolbar acts on.
    #[form_data(default)]
    focused: String,
    #[form_data(default)]
    selection: String,
    #[form_data(default)]
    link_url: String,
}

enum QuestionAction {
    Save,
    Cancel,
    AddLink,
    RemoveLink(usize),
    Format(FormatAction),
}

impl QuestionAction {
    fn parse(action: &str, link_url: &str) -> Option<Self> {
        match action {
            "" | "save" => Some(QuestionAction::Save),
            "cancel" => Some(QuestionAction::Cancel),
            "add_link" => Some(QuestionAction::AddLink),
            other => match other.strip_prefix("remove_link:") {
                Some(index) => index.parse().ok().map(QuestionAction::RemoveLink),
                None => {
                    let url = Some(link_url.trim().to_owned()).filter(|url| !url.is_empty());
                    FormatAction::parse(other, url).map(QuestionAction::Format)
                }
            },
        }
    }
}

#[derive(Deserialize)]
struct DeleteInput {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    armed: Option<String>,
}

/// Runs the pressed button against the form. Returns `false` when the
/// editor was closed.
async fn handle(
    form: &mut QuestionForm,
    submitted: &Submitted,
    client: &ContentClient,
    session: &AdminSession,
) -> bool {
    match QuestionAction::parse(&submitted.action, &submitted.link_url) {
        Some(QuestionAction::Save) => {
            form.submit(client, Some(&session.token)).await;
        }
        Some(QuestionAction::Cancel) => {
            form.cancel();
            return false;
        }
        Some(QuestionAction::AddLink) => form.add_link(),
        Some(QuestionAction::RemoveLink(index)) => form.remove_link(index),
        Some(QuestionAction::Format(action)) => {
            if let Some(selection) = Selection::parse(&submitted.selection) {
                submitted.toolbar.apply(&action, &selection, form);
            }
        }
        None => tracing::debug!(
            action = submitted.action.as_str(),
            "ignoring unknown question form action"
        ),
    }
    true
}

impl QuestionInput {
    fn split(self, target: Option<String>) -> (QuestionForm, Submitted) {
        let fields = QuestionFields {
            category_id: self.category_id,
            question_en: self.question_en,
            question_ar: self.question_ar,
            answer_en: self.answer_en,
            answer_ar: self.answer_ar,
            links: self.links,
        };
        let submitted = Submitted {
            toolbar: Toolbar::focused_on(AnswerField::parse(&self.focused)),
            action: self.action,
            selection: self.selection,
            link_url: self.link_url,
        };
        (QuestionForm::with_fields(fields, target), submitted)
    }
}

struct Submitted {
    action: String,
    toolbar: Toolbar,
    selection: String,
    link_url: String,
}

async fn create_question(
    session: AdminSession,
    State(client): State<ContentClient>,
    TypedMultipart(input): TypedMultipart<QuestionInput>,
) -> DashboardPage {
    let (mut form, submitted) = input.split(None);
    let keep = handle(&mut form, &submitted, &client, &session).await;
    Dashboard {
        question_form: keep.then_some(form),
        ..Dashboard::new(Tab::AddQuestion)
    }
    .render(&client, &session)
    .await
}

async fn update_question(
    session: AdminSession,
    State(client): State<ContentClient>,
    Path((_, id)): Path<(String, String)>,
    TypedMultipart(input): TypedMultipart<QuestionInput>,
) -> DashboardPage {
    let (mut form, submitted) = input.split(Some(id));
    let mut dashboard = Dashboard::new(Tab::ManageQuestions);
    if handle(&mut form, &submitted, &client, &session).await {
        if form.is_editing() {
            dashboard.question_form = Some(form);
        } else {
            // a saved editor closes, its message moves to the banner
            dashboard.status = form.status;
        }
    }
    dashboard.render(&client, &session).await
}

async fn delete_question(
    session: AdminSession,
    State(client): State<ContentClient>,
    Path((_, id)): Path<(String, String)>,
    Form(input): Form<DeleteInput>,
) -> DashboardPage {
    let mut dashboard = Dashboard::new(Tab::ManageQuestions);
    let mut confirm = input.armed.map(DeleteConfirm::armed).unwrap_or_default();
    if confirm.click(&id) {
        forms::delete_question(&client, Some(&session.token), &id, &mut dashboard.status).await;
    }
    dashboard.confirm = confirm;
    dashboard.render(&client, &session).await
}

pub fn questions_router(state: AppState) -> Router {
    Router::new()
        .route("/{lang}/admin/questions", post(create_question))
        .route("/{lang}/admin/questions/{id}", post(update_question))
        .route("/{lang}/admin/questions/{id}/delete", post(delete_question))
        .with_state(state)
}
