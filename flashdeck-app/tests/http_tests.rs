use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use flashdeck_app::api::{routes::AppState, server::router};
use flashdeck_core::MemoryStore;
use flashdeck_storage::LocalDisk;
use serde_json::Value;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt; // for oneshot

const BOUNDARY: &str = "flashdeck-test-boundary";

struct Harness {
    app: Router,
    _dir: TempDir,
}

fn harness() -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let public = dir.path().join("public");
    std::fs::create_dir_all(&public).unwrap();
    std::fs::write(public.join("index.html"), "<h1>decks</h1>").unwrap();
    std::fs::write(public.join("deck.html"), "<h1>deck</h1>").unwrap();
    std::fs::write(public.join("style.css"), "body{}").unwrap();

    let state = AppState {
        records: Arc::new(MemoryStore::new()),
        blobs: Arc::new(LocalDisk::open(dir.path().join("uploads")).unwrap()),
    };
    Harness {
        app: router(state, &public, 8 * 1024 * 1024),
        _dir: dir,
    }
}

async fn send(app: &Router, req: Request<Body>) -> Response {
    app.clone().oneshot(req).await.unwrap()
}

async fn get(app: &Router, uri: &str) -> Response {
    send(app, Request::get(uri).body(Body::empty()).unwrap()).await
}

async fn body_bytes(res: Response) -> Vec<u8> {
    to_bytes(res.into_body(), usize::MAX).await.unwrap().to_vec()
}

async fn json(res: Response) -> Value {
    serde_json::from_slice(&body_bytes(res).await).unwrap()
}

fn location(res: &Response) -> String {
    res.headers()[header::LOCATION].to_str().unwrap().to_string()
}

async fn create_deck(app: &Router, form: &str) -> String {
    let req = Request::post("/create")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(form.to_string()))
        .unwrap();
    let res = send(app, req).await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    let loc = location(&res);
    loc.strip_prefix("/deck?id=").unwrap().to_string()
}

enum Part<'a> {
    Text(&'a str, &'a str),
    File(&'a str, &'a str, &'a str, &'a [u8]),
}

fn multipart(parts: &[Part]) -> Vec<u8> {
    let mut body = Vec::new();
    for p in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match p {
            Part::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n")
                        .as_bytes(),
                );
            }
            Part::File(name, filename, content_type, bytes) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(bytes);
                body.extend_from_slice(b"\r\n");
            }
        }
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

async fn post_card(app: &Router, deck_id: &str, referer: Option<&str>, parts: &[Part<'_>]) -> Response {
    let mut req = Request::post(format!("/deck?id={deck_id}")).header(
        header::CONTENT_TYPE,
        format!("multipart/form-data; boundary={BOUNDARY}"),
    );
    if let Some(r) = referer {
        req = req.header(header::REFERER, r);
    }
    send(app, req.body(Body::from(multipart(parts))).unwrap()).await
}

async fn cards(app: &Router, deck_id: &str) -> Vec<Value> {
    let res = get(app, &format!("/deck/endpoint?id={deck_id}")).await;
    assert_eq!(res.status(), StatusCode::OK);
    json(res).await.as_array().unwrap().clone()
}

fn meta_of(row: &Value) -> Value {
    serde_json::from_str(row["meta"].as_str().unwrap()).unwrap()
}

#[tokio::test]
async fn created_deck_shows_up_in_listing() {
    let h = harness();
    let id = create_deck(&h.app, "title=Spanish+Verbs").await;

    let res = get(&h.app, "/endpoint").await;
    assert_eq!(res.status(), StatusCode::OK);
    let decks = json(res).await;
    let decks = decks.as_array().unwrap();
    assert_eq!(decks.len(), 1);
    assert_eq!(decks[0]["id"], id.as_str());
    assert_eq!(meta_of(&decks[0]), serde_json::json!({ "title": "Spanish Verbs" }));
}

#[tokio::test]
async fn every_form_field_round_trips() {
    let h = harness();
    create_deck(&h.app, "title=Kanji&level=N5&note=a%26b%3Dc").await;
    let decks = json(get(&h.app, "/endpoint").await).await;
    assert_eq!(
        meta_of(&decks[0]),
        serde_json::json!({ "title": "Kanji", "level": "N5", "note": "a&b=c" })
    );
}

#[tokio::test]
async fn card_with_front_image() {
    let h = harness();
    let deck = create_deck(&h.app, "title=Spanish").await;
    let image: Vec<u8> = vec![0x89, b'P', b'N', b'G', 0, 1, 2, 3, 255, 254];

    let referer = format!("http://localhost/deck?id={deck}");
    let res = post_card(
        &h.app,
        &deck,
        Some(referer.as_str()),
        &[
            Part::Text("front", "hola"),
            Part::Text("back", "hello"),
            Part::File("file-front", "hola.png", "image/png", &image),
        ],
    )
    .await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), referer);

    let rows = cards(&h.app, &deck).await;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["deckId"], deck.as_str());
    let meta = meta_of(&rows[0]);
    assert_eq!(meta["front"], "hola");
    assert_eq!(meta["back"], "hello");
    assert!(meta.get("file-back").is_none());

    let url = meta["file-front"].as_str().unwrap();
    assert!(url.starts_with("/uploads/"));
    let res = get(&h.app, url).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(body_bytes(res).await, image);
}

#[tokio::test]
async fn both_sides_get_distinct_urls() {
    let h = harness();
    let deck = create_deck(&h.app, "title=Birds").await;
    let front = b"front-bytes".to_vec();
    let back = b"back-bytes, different".to_vec();

    post_card(
        &h.app,
        &deck,
        None,
        &[
            Part::File("file-front", "a.jpg", "image/jpeg", &front),
            Part::File("file-back", "b.mp3", "audio/mpeg", &back),
        ],
    )
    .await;

    let meta = meta_of(&cards(&h.app, &deck).await[0]);
    let f = meta["file-front"].as_str().unwrap().to_string();
    let b = meta["file-back"].as_str().unwrap().to_string();
    assert_ne!(f, b);
    assert_eq!(body_bytes(get(&h.app, &f).await).await, front);
    assert_eq!(body_bytes(get(&h.app, &b).await).await, back);
}

#[tokio::test]
async fn empty_file_inputs_leave_no_placeholders() {
    let h = harness();
    let deck = create_deck(&h.app, "title=Plain").await;

    let res = post_card(
        &h.app,
        &deck,
        None,
        &[
            Part::Text("front", "cat"),
            Part::File("file-front", "", "application/octet-stream", b""),
            Part::File("file-back", "", "application/octet-stream", b""),
        ],
    )
    .await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), format!("/deck?id={deck}"));

    let meta = meta_of(&cards(&h.app, &deck).await[0]);
    assert_eq!(meta, serde_json::json!({ "front": "cat" }));
}

#[tokio::test]
async fn cards_keep_creation_order_across_decks() {
    let h = harness();
    let a = create_deck(&h.app, "title=A").await;
    let b = create_deck(&h.app, "title=B").await;

    for word in ["one", "two", "three"] {
        post_card(&h.app, &a, None, &[Part::Text("front", word)]).await;
        post_card(&h.app, &b, None, &[Part::Text("front", "noise")]).await;
    }

    let fronts: Vec<String> = cards(&h.app, &a)
        .await
        .iter()
        .map(|r| meta_of(r)["front"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(fronts, vec!["one", "two", "three"]);
}

#[tokio::test]
async fn empty_and_unknown_decks_list_nothing() {
    let h = harness();
    let deck = create_deck(&h.app, "title=Empty").await;
    assert!(cards(&h.app, &deck).await.is_empty());
    assert!(cards(&h.app, "doesNotExist").await.is_empty());

    let res = get(&h.app, "/deck/endpoint").await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(json(res).await, serde_json::json!([]));
}

#[tokio::test]
async fn card_without_deck_id_is_rejected() {
    let h = harness();
    let req = Request::post("/deck")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart(&[Part::Text("front", "x")])))
        .unwrap();
    let res = send(&h.app, req).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn missing_uploads_are_not_found() {
    let h = harness();
    assert_eq!(get(&h.app, "/uploads/AAAAAAAAAAAAAAAAAAAAAA").await.status(), StatusCode::NOT_FOUND);
    assert_eq!(get(&h.app, "/uploads/..").await.status(), StatusCode::NOT_FOUND);
    assert_eq!(get(&h.app, "/uploads/photo.png").await.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn static_pages_and_assets() {
    let h = harness();
    let res = get(&h.app, "/").await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(body_bytes(res).await, b"<h1>decks</h1>");

    let res = get(&h.app, "/deck?id=whatever").await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(body_bytes(res).await, b"<h1>deck</h1>");

    assert_eq!(get(&h.app, "/style.css").await.status(), StatusCode::OK);
    assert_eq!(get(&h.app, "/nope.js").await.status(), StatusCode::NOT_FOUND);
    // create.html was never written
    assert_eq!(get(&h.app, "/create").await.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn sqlite_backed_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let schema = flashdeck_core::load_schema(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/../schema/sqlite.sql"
    ))
    .unwrap();
    let records = flashdeck_sqlite::SqliteStore::open_file(dir.path().join("t.sqlite3"), &schema)
        .await
        .unwrap();
    let state = AppState {
        records: Arc::new(records),
        blobs: Arc::new(LocalDisk::open(dir.path().join("uploads")).unwrap()),
    };
    let app = router(state, dir.path(), 1024 * 1024);

    let deck = create_deck(&app, "title=Spanish+Verbs").await;
    post_card(&app, &deck, None, &[Part::Text("front", "hablar"), Part::Text("back", "to speak")]).await;
    post_card(&app, &deck, None, &[Part::Text("front", "comer"), Part::Text("back", "to eat")]).await;

    let rows = cards(&app, &deck).await;
    let fronts: Vec<_> = rows.iter().map(|r| meta_of(r)["front"].clone()).collect();
    assert_eq!(fronts, vec!["hablar", "comer"]);
}

#[tokio::test]
async fn repeated_form_keys_keep_the_first_value() {
    let h = harness();
    let deck = create_deck(&h.app, "title=first&title=second").await;
    let decks = json(get(&h.app, "/endpoint").await).await;
    assert_eq!(meta_of(&decks[0]), serde_json::json!({ "title": "first" }));

    post_card(
        &h.app,
        &deck,
        None,
        &[Part::Text("front", "uno"), Part::Text("front", "dos")],
    )
    .await;
    let meta = meta_of(&cards(&h.app, &deck).await[0]);
    assert_eq!(meta, serde_json::json!({ "front": "uno" }));
}

#[tokio::test]
async fn deck_from_multipart_form() {
    let h = harness();
    let req = Request::post("/create")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart(&[
            Part::Text("title", "Spanish Verbs"),
            Part::File("file-front", "cover.png", "image/png", b"png"),
        ])))
        .unwrap();
    let res = send(&h.app, req).await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    let id = location(&res).strip_prefix("/deck?id=").unwrap().to_string();

    let decks = json(get(&h.app, "/endpoint").await).await;
    assert_eq!(decks[0]["id"], id.as_str());
    assert_eq!(meta_of(&decks[0]), serde_json::json!({ "title": "Spanish Verbs" }));
}

#[tokio::test]
async fn card_from_urlencoded_form() {
    let h = harness();
    let deck = create_deck(&h.app, "title=Spanish").await;
    let req = Request::post(format!("/deck?id={deck}"))
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from("front=hola&back=hello"))
        .unwrap();
    let res = send(&h.app, req).await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), format!("/deck?id={deck}"));

    let rows = cards(&h.app, &deck).await;
    assert_eq!(rows.len(), 1);
    assert_eq!(meta_of(&rows[0]), serde_json::json!({ "front": "hola", "back": "hello" }));
}

#[tokio::test]
async fn unsupported_body_is_rejected() {
    let h = harness();
    let req = Request::post("/create")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"title":"x"}"#))
        .unwrap();
    let res = send(&h.app, req).await;
    assert_eq!(res.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert_eq!(json(get(&h.app, "/endpoint").await).await, serde_json::json!([]));
}
