//! Client and server together over real sockets.

use std::time::Duration;

use atelier::admin::{submit_contact, GalleryEditor, ImageInput, NewContact, NewGalleryItem};
use atelier::auth::{AdminDirectory, AuthGate, LocalAuth, RemoteAuth};
use atelier::content::{ContentRegistry, EditError};
use atelier::server::{router, AppState};
use atelier::site::slots;
use atelier::store::{DocumentStore, MemoryStore, RemoteStore, StoreEvent};
use atelier::Notifier;

async fn spawn_server() -> (String, MemoryStore) {
    let store = MemoryStore::new();
    let mut directory = AdminDirectory::default();
    directory.add("admin@example.com", "secret").unwrap();
    let state = AppState::new(store.clone(), LocalAuth::new(directory, 60))
        .await
        .unwrap();

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router(state)).await.unwrap();
    });

    (format!("http://{}", addr), store)
}

/// Polls `check` until it holds or two seconds pass.
async fn eventually(mut check: impl FnMut() -> bool) -> bool {
    for _ in 0..100 {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    check()
}

#[tokio::test]
async fn test_admin_edits_hero_title() {
    let (url, _) = spawn_server().await;

    let gate = AuthGate::new(RemoteAuth::new(&url), Notifier::silent());
    let session = gate.context();
    let store = RemoteStore::new(&url).with_session(session.clone());
    let registry = ContentRegistry::connect(store, Notifier::silent()).await;
    registry.ready().await;

    let mut field = slots::HERO_TITLE.field();
    assert_eq!(field.value(&registry), slots::HERO_TITLE.default);
    assert_eq!(
        field.begin_edit(&registry, &session),
        Err(EditError::NotAdmin)
    );

    gate.sign_in("admin@example.com", "secret").await.unwrap();
    assert!(session.is_admin());

    field.begin_edit(&registry, &session).unwrap();
    field.set_draft("Мебель с историей").unwrap();
    let report = field.save(&registry, &session).await.unwrap();
    assert!(report.is_clean());
    assert_eq!(field.value(&registry), "Мебель с историей");

    gate.sign_out().await.unwrap();
    assert!(!session.is_admin());
    assert_eq!(field.value(&registry), "Мебель с историей");

    // A fresh anonymous visitor sees the saved title
    let visitor = ContentRegistry::connect(RemoteStore::new(&url), Notifier::silent()).await;
    visitor.ready().await;
    assert!(eventually(|| visitor.get(slots::HERO_TITLE.id, "") == "Мебель с историей").await);

    let html = reqwest::get(format!("{}/", url))
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(html.contains("Мебель с историей"));
}

#[tokio::test]
async fn test_wrong_password_keeps_visitor_anonymous() {
    let (url, _) = spawn_server().await;

    let gate = AuthGate::new(RemoteAuth::new(&url), Notifier::silent());
    assert!(gate.sign_in("admin@example.com", "wrong").await.is_err());
    assert!(!gate.is_admin());
}

#[tokio::test]
async fn test_gallery_subscription_sees_new_work() {
    let (url, _) = spawn_server().await;

    let mut subscription = RemoteStore::new(&url).subscribe("gallery").await.unwrap();
    match subscription.next().await {
        Some(StoreEvent::Snapshot(documents)) => assert!(documents.is_empty()),
        other => panic!("expected a snapshot, got {:?}", other),
    }

    let gate = AuthGate::new(RemoteAuth::new(&url), Notifier::silent());
    gate.sign_in("admin@example.com", "secret").await.unwrap();
    let editor = GalleryEditor::open(
        RemoteStore::new(&url).with_session(gate.context()),
        gate.context(),
        Notifier::silent(),
    )
    .await
    .unwrap();
    editor.ready().await;

    editor
        .create(
            NewGalleryItem {
                title: "Комод".to_string(),
                description: "Дуб, конец XIX века".to_string(),
                category: "restoration".to_string(),
                image: ImageInput::url("https://img.example.com/komod.jpg"),
            },
            None,
        )
        .await
        .unwrap();

    let documents = loop {
        match tokio::time::timeout(Duration::from_secs(2), subscription.next())
            .await
            .unwrap()
        {
            Some(StoreEvent::Snapshot(documents)) if !documents.is_empty() => break documents,
            Some(StoreEvent::Snapshot(_)) => continue,
            other => panic!("unexpected event {:?}", other),
        }
    };
    assert_eq!(documents[0].fields["title"], "Комод");
    assert_eq!(documents[0].fields["order"], 0);
}

#[tokio::test]
async fn test_visitor_contact_reaches_inbox() {
    let (url, server_store) = spawn_server().await;
    let anonymous = RemoteStore::new(&url);

    let request = NewContact {
        name: "Анна".to_string(),
        email: "anna@example.com".to_string(),
        phone: String::new(),
        service: "Реставрация".to_string(),
        message: "Нужно отреставрировать стул".to_string(),
    };
    let id = submit_contact(&anonymous, &request, &Notifier::silent())
        .await
        .unwrap();

    let doc = server_store.get("contacts", &id).unwrap();
    assert_eq!(doc.fields["status"], "new");
    assert_eq!(doc.fields["name"], "Анна");

    // The inbox itself stays private
    assert!(anonymous.subscribe("contacts").await.is_err());
    assert!(anonymous.list("contacts").await.is_err());
}
