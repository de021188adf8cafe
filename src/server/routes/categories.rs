use axum::body::Bytes;
use axum::extract::{DefaultBodyLimit, Path, State};
use axum::routing::post;
use axum::{Form, Router};
use axum_typed_multipart::{
    async_trait, FieldMetadata, TryFromChunks, TryFromMultipart, TypedMultipart,
    TypedMultipartError,
};
use futures_util::stream::{Stream, StreamExt};
use serde::Deserialize;

use crate::api::{ContentClient, IconType};
use crate::forms::{
    self, accept_icon, upload_type, CategoryFields, CategoryForm, DeleteConfirm, Icon,
    IconRejection, MAX_ICON_BYTES,
};
use crate::server::app::AppState;
use crate::server::deserializers::empty_string_as_none;
use crate::session::AdminSession;

use super::admin::{Dashboard, DashboardPage, Tab};

#[derive(TryFromMultipart)]
struct CategoryInput {
    #[form_data(default)]
    title_en: String,
    #[form_data(default)]
    title_ar: String,
    #[form_data(default)]
    description_en: String,
    #[form_data(default)]
    description_ar: String,
    #[form_data(default)]
    text_color: String,
    #[form_data(default)]
    border_color: String,
    /// Icon carried over from the stored category or an earlier upload.
    #[form_data(default, limit = "4MiB")]
    icon: String,
    #[form_data(default)]
    icon_type: String,
    #[form_data(limit = "unlimited")]
    icon_file: Option<IconUpload>,
    #[form_data(default)]
    action: String,
}

impl CategoryInput {
    fn into_form(self, target: Option<String>) -> CategoryForm {
        let icon = IconType::parse(&self.icon_type)
            .filter(|_| !self.icon.trim().is_empty())
            .map(|icon_type| Icon::new(self.icon, icon_type));
        let fields = CategoryFields {
            title_en: self.title_en,
            title_ar: self.title_ar,
            description_en: self.description_en,
            description_ar: self.description_ar,
            text_color: self.text_color,
            border_color: self.border_color,
            icon,
        };
        let mut form = CategoryForm::with_fields(fields, target);
        // browsers send an empty part when no file was picked
        if let Some(upload) = self.icon_file.filter(|file| file.size > 0) {
            form.attach_icon(upload.accept());
        }
        form
    }
}

/// Uploaded icon file. At most `MAX_ICON_BYTES` are buffered; the rest of
/// the part is drained and only counted.
struct IconUpload {
    content_type: String,
    contents: Vec<u8>,
    size: usize,
}

impl IconUpload {
    fn accept(&self) -> Result<Icon, IconRejection> {
        if self.size > self.contents.len() {
            upload_type(&self.content_type)?;
            return Err(IconRejection::TooLarge(self.size));
        }
        accept_icon(&self.content_type, &self.contents)
    }
}

#[async_trait]
impl TryFromChunks for IconUpload {
    async fn try_from_chunks(
        mut chunks: impl Stream<Item = Result<Bytes, TypedMultipartError>> + Send + Sync + Unpin,
        metadata: FieldMetadata,
    ) -> Result<Self, TypedMultipartError> {
        let mut contents = Vec::new();
        let mut size = 0;
        while let Some(chunk) = chunks.next().await {
            let chunk = chunk?;
            size += chunk.len();
            if size <= MAX_ICON_BYTES {
                contents.extend_from_slice(&chunk);
            } else if !contents.is_empty() {
                contents = Vec::new();
            }
        }
        Ok(Self {
            content_type: metadata.content_type.unwrap_or_default(),
            contents,
            size,
        })
    }
}

#[derive(Deserialize)]
struct DeleteInput {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    armed: Option<String>,
}

/// A rejected upload blocks the submit. The other fields are still checked
/// so every error shows at once.
async fn submit_unless_rejected(
    form: &mut CategoryForm,
    client: &ContentClient,
    session: &AdminSession,
) {
    match form.errors.icon.take() {
        None => {
            form.submit(client, Some(&session.token)).await;
        }
        Some(rejected) => {
            form.validate();
            form.errors.icon = Some(rejected);
        }
    }
}

async fn create_category(
    session: AdminSession,
    State(client): State<ContentClient>,
    TypedMultipart(input): TypedMultipart<CategoryInput>,
) -> DashboardPage {
    let mut form = input.into_form(None);
    submit_unless_rejected(&mut form, &client, &session).await;
    Dashboard {
        category_form: Some(form),
        ..Dashboard::new(Tab::AddCategory)
    }
    .render(&client, &session)
    .await
}

async fn update_category(
    session: AdminSession,
    State(client): State<ContentClient>,
    Path((_, id)): Path<(String, String)>,
    TypedMultipart(input): TypedMultipart<CategoryInput>,
) -> DashboardPage {
    let cancelled = input.action == "cancel";
    let mut form = input.into_form(Some(id));
    let mut dashboard = Dashboard::new(Tab::ManageCategories);
    if cancelled {
        form.cancel();
    } else {
        submit_unless_rejected(&mut form, &client, &session).await;
    }
    if form.is_editing() {
        dashboard.category_form = Some(form);
    } else {
        // a closed editor leaves its message for the banner
        dashboard.status = form.status;
    }
    dashboard.render(&client, &session).await
}

/// First post arms the confirmation, a second one carrying `armed` deletes.
async fn delete_category(
    session: AdminSession,
    State(client): State<ContentClient>,
    Path((_, id)): Path<(String, String)>,
    Form(input): Form<DeleteInput>,
) -> DashboardPage {
    let mut dashboard = Dashboard::new(Tab::ManageCategories);
    let mut confirm = input.armed.map(DeleteConfirm::armed).unwrap_or_default();
    if confirm.click(&id) {
        forms::delete_category(&client, Some(&session.token), &id, &mut dashboard.status).await;
    }
    dashboard.confirm = confirm;
    dashboard.render(&client, &session).await
}

pub fn category_router(state: AppState) -> Router {
    Router::new()
        .route("/{lang}/admin/categories", post(create_category))
        .route("/{lang}/admin/categories/{id}", post(update_category))
        .route("/{lang}/admin/categories/{id}/delete", post(delete_category))
        // uploads are capped per field, oversized icons get a form error
        .layer(DefaultBodyLimit::disable())
        .with_state(state)
}
