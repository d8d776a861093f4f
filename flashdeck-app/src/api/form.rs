use axum::{
    async_trait,
    extract::{FromRequest, Multipart, Request},
    http::header,
    Form,
};

use flashdeck_core::{Meta, FILE_FIELDS};

use crate::api::error::AppError;

const OCTET_STREAM: &str = "application/octet-stream";

/// A file chosen for one of the `file-*` inputs.
pub struct Upload {
    pub field: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// A submitted HTML form, urlencoded or multipart.
///
/// Repeated keys keep their first value. Uploads only come from multipart
/// bodies; `file-front`/`file-back` never land in `fields`.
pub struct Submission {
    pub fields: Meta,
    pub uploads: Vec<Upload>,
}

#[async_trait]
impl<S> FromRequest<S> for Submission
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if is_multipart(&req) {
            let multipart = Multipart::from_request(req, state)
                .await
                .map_err(|r| AppError::new(r.status(), anyhow::anyhow!(r.body_text())))?;
            read_multipart(multipart).await
        } else {
            let Form(pairs) = Form::<Vec<(String, String)>>::from_request(req, state)
                .await
                .map_err(|r| AppError::new(r.status(), anyhow::anyhow!(r.body_text())))?;
            Ok(Self {
                fields: first_wins(pairs),
                uploads: Vec::new(),
            })
        }
    }
}

fn is_multipart(req: &Request) -> bool {
    req.headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.trim_start().starts_with("multipart/form-data"))
}

fn first_wins(pairs: Vec<(String, String)>) -> Meta {
    let mut meta = Meta::new();
    for (k, v) in pairs {
        if FILE_FIELDS.contains(&k.as_str()) {
            continue;
        }
        meta.entry(k).or_insert(v);
    }
    meta
}

async fn read_multipart(mut multipart: Multipart) -> Result<Submission, AppError> {
    let mut fields = Meta::new();
    let mut uploads: Vec<Upload> = Vec::new();
    while let Some(part) = multipart.next_field().await? {
        let name = part.name().unwrap_or_default().to_string();
        if FILE_FIELDS.contains(&name.as_str()) {
            // these keys only ever hold upload urls; an unused file input arrives with filename=""
            let has_file = part.file_name().is_some_and(|f| !f.is_empty());
            if has_file && !uploads.iter().any(|u| u.field == name) {
                let content_type = part.content_type().unwrap_or(OCTET_STREAM).to_string();
                let bytes = part.bytes().await?.to_vec();
                uploads.push(Upload {
                    field: name,
                    content_type,
                    bytes,
                });
            }
            continue;
        }
        if part.file_name().is_some() {
            continue;
        }
        let text = part.text().await?;
        fields.entry(name).or_insert(text);
    }
    Ok(Submission { fields, uploads })
}
