//! HTML routes: `/`, `/admin` and the cookie login form.

use axum::extract::{Query, State};
use axum::http::{header, HeaderMap, StatusCode, Uri};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Form;
use serde::Deserialize;

use super::{bearer_token, cookie, AppState, SESSION_COOKIE};
use crate::auth::{AuthProvider, Credentials, Session};
use crate::site::{render, GalleryFilter, View};

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    category: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    email: String,
    password: String,
}

fn page_token(headers: &HeaderMap) -> Option<&str> {
    cookie(headers, SESSION_COOKIE).or_else(|| bearer_token(headers))
}

fn render_page(state: &AppState, path: &str, headers: &HeaderMap, filter: GalleryFilter) -> Response {
    let session = state.session_for(page_token(headers));
    let (view, html) = state.site.render(path, &session, filter);
    let status = match view {
        View::Home | View::Admin => StatusCode::OK,
        View::AccessDenied => StatusCode::FORBIDDEN,
        View::NotFound => StatusCode::NOT_FOUND,
    };
    (status, Html(html)).into_response()
}

pub async fn home(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
    headers: HeaderMap,
) -> Response {
    let filter = GalleryFilter::parse(query.category.as_deref().unwrap_or_default());
    render_page(&state, "/", &headers, filter)
}

pub async fn admin(State(state): State<AppState>, headers: HeaderMap) -> Response {
    render_page(&state, "/admin", &headers, GalleryFilter::All)
}

pub async fn not_found(State(state): State<AppState>, uri: Uri, headers: HeaderMap) -> Response {
    render_page(&state, uri.path(), &headers, GalleryFilter::All)
}

/// Signs in from the page form and stores the token in a cookie.
pub async fn login(State(state): State<AppState>, Form(form): Form<LoginForm>) -> Response {
    let credentials = Credentials::new(form.email, form.password);
    match state.auth.sign_in(&credentials).await {
        Ok(session) => {
            let cookie = format!(
                "{}={}; Path=/; HttpOnly; SameSite=Lax",
                SESSION_COOKIE, session.token
            );
            ([(header::SET_COOKIE, cookie)], Redirect::to("/admin")).into_response()
        }
        Err(e) => {
            tracing::info!("Page sign-in failed: {}", e);
            (
                StatusCode::UNAUTHORIZED,
                Html(render::render_access_denied()),
            )
                .into_response()
        }
    }
}

pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Some(token) = cookie(&headers, SESSION_COOKIE) {
        if let Some(email) = state.auth.authenticate(token) {
            let session = Session {
                email,
                token: token.to_string(),
            };
            if let Err(e) = state.auth.sign_out(&session).await {
                tracing::warn!("Sign-out failed: {}", e);
            }
        }
    }

    let cleared = format!("{}=; Path=/; HttpOnly; Max-Age=0", SESSION_COOKIE);
    ([(header::SET_COOKIE, cleared)], Redirect::to("/")).into_response()
}

#[cfg(test)]
mod tests {
    use crate::auth::{AdminDirectory, LocalAuth};
    use crate::fields;
    use crate::server::{router, AppState};
    use crate::store::{DocumentStore, MemoryStore};
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use tower::ServiceExt;

    async fn state(store: MemoryStore) -> AppState {
        let mut directory = AdminDirectory::default();
        directory.add("admin@example.com", "secret").unwrap();
        let state = AppState::new(store, LocalAuth::new(directory, 60))
            .await
            .unwrap();
        state.site.ready().await;
        state
    }

    async fn body_text(response: axum::response::Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_home_renders_defaults() {
        let app = router(state(MemoryStore::new()).await);
        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains("Возвращаем душу вашей мебели"));
    }

    #[tokio::test]
    async fn test_home_filters_gallery() {
        let store = MemoryStore::new();
        store
            .add("gallery", fields! { "title" => "Комод", "category" => "restoration", "order" => 0 })
            .await
            .unwrap();
        store
            .add("gallery", fields! { "title" => "Ваза", "category" => "art", "order" => 1 })
            .await
            .unwrap();
        let app = router(state(store).await);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/?category=art")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let html = body_text(response).await;
        assert!(html.contains("Ваза"));
        assert!(!html.contains("Комод"));
    }

    #[tokio::test]
    async fn test_admin_requires_session() {
        let app = router(state(MemoryStore::new()).await);
        let response = app
            .oneshot(Request::builder().uri("/admin").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert!(body_text(response).await.contains("Доступ запрещен"));
    }

    #[tokio::test]
    async fn test_login_sets_cookie_for_admin_page() {
        let state = state(MemoryStore::new()).await;

        let response = router(state.clone())
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/login")
                    .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(Body::from("email=admin%40example.com&password=secret"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .unwrap()
            .to_str()
            .unwrap()
            .split(';')
            .next()
            .unwrap()
            .to_string();

        let response = router(state)
            .oneshot(
                Request::builder()
                    .uri("/admin")
                    .header(header::COOKIE, cookie)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains("admin@example.com"));
    }

    #[tokio::test]
    async fn test_unknown_path_is_404() {
        let app = router(state(MemoryStore::new()).await);
        let response = app
            .oneshot(Request::builder().uri("/shop").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
