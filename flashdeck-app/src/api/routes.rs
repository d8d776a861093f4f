use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap},
    response::{IntoResponse, Redirect, Response},
    Json,
};
use std::sync::Arc;

use flashdeck_core::{is_token, new_token, BlobStore, CoreError, RecordStore};

use crate::api::dto::{CardOut, DeckOut, DeckQuery};
use crate::api::error::AppError;
use crate::api::form::Submission;

const OCTET_STREAM: &str = "application/octet-stream";

#[derive(Clone)]
pub struct AppState {
    pub records: Arc<dyn RecordStore>,
    pub blobs: Arc<dyn BlobStore>,
}

pub async fn list_decks(State(st): State<Arc<AppState>>) -> Result<Json<Vec<DeckOut>>, AppError> {
    let decks = st.records.list_decks().await?;
    let out = decks
        .into_iter()
        .map(DeckOut::try_from)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Json(out))
}

pub async fn create_deck(
    State(st): State<Arc<AppState>>,
    form: Submission,
) -> Result<Redirect, AppError> {
    let deck = st.records.create_deck(form.fields).await?;
    tracing::info!(deck = %deck.id, "deck created");
    Ok(Redirect::to(&deck_page(&deck.id)))
}

pub async fn list_cards(
    State(st): State<Arc<AppState>>,
    Query(q): Query<DeckQuery>,
) -> Result<Json<Vec<CardOut>>, AppError> {
    let Some(deck_id) = q.id else {
        return Ok(Json(Vec::new()));
    };
    let cards = st.records.list_cards(&deck_id).await?;
    let out = cards
        .into_iter()
        .map(CardOut::try_from)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Json(out))
}

pub async fn create_card(
    State(st): State<Arc<AppState>>,
    Query(q): Query<DeckQuery>,
    headers: HeaderMap,
    form: Submission,
) -> Result<Redirect, AppError> {
    let deck_id = q
        .id
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::bad_request("missing deck id"))?;

    // The whole form is read before touching the blob backend.
    let Submission {
        fields: mut meta,
        uploads,
    } = form;
    for up in uploads {
        let key = new_token();
        let size = up.bytes.len();
        st.blobs.put(&key, up.bytes, &up.content_type).await?;
        tracing::debug!(field = %up.field, key = %key, size, "attachment stored");
        meta.insert(up.field, st.blobs.url_for(&key));
    }

    let card = st.records.create_card(&deck_id, meta).await?;
    tracing::info!(card = %card.id, deck = %deck_id, "card created");

    let back = headers
        .get(header::REFERER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .unwrap_or_else(|| {
            if is_token(&deck_id) {
                deck_page(&deck_id)
            } else {
                "/".to_string()
            }
        });
    Ok(Redirect::to(&back))
}

pub async fn fetch_upload(
    State(st): State<Arc<AppState>>,
    Path(filename): Path<String>,
) -> Result<Response, AppError> {
    if !is_token(&filename) {
        return Err(CoreError::NotFound("blob").into());
    }
    let blob = st.blobs.fetch(&filename).await?;
    let content_type = blob.content_type.unwrap_or_else(|| OCTET_STREAM.to_string());
    Ok(([(header::CONTENT_TYPE, content_type)], blob.bytes).into_response())
}

fn deck_page(deck_id: &str) -> String {
    format!("/deck?id={deck_id}")
}
