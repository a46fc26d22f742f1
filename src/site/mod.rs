//! Page composition for `/` and `/admin`.
//!
//! [`Site`] owns one content registry and one live list per collection and
//! turns them into HTML on demand. It holds no state of its own beyond those
//! caches.

pub mod gallery;
pub mod render;
pub mod slots;

pub use gallery::{group_by_category, GalleryFilter, GalleryGroup};
pub use render::{escape, AdminPage, HomePage};
pub use slots::Slot;

use crate::auth::SessionContext;
use crate::content::{ContentRegistry, Sections};
use crate::models::{section_ids, Category, ContactSubmission, GalleryItem, Service, SocialLink};
use crate::notify::Notifier;
use crate::store::{DocumentStore, StoreError};
use crate::sync::CollectionSync;

/// Which page a request lands on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Home,
    Admin,
    AccessDenied,
    NotFound,
}

impl View {
    /// Resolves a request path. `/admin` needs an admin session.
    pub fn resolve(path: &str, session: &SessionContext) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let path = path.trim_end_matches('/');
        match path {
            "" => View::Home,
            "/admin" if session.is_admin() => View::Admin,
            "/admin" => View::AccessDenied,
            _ => View::NotFound,
        }
    }
}

/// Live page state for one store.
#[derive(Debug)]
pub struct Site<S> {
    registry: ContentRegistry<S>,
    sections: Sections<S>,
    categories: CollectionSync<Category>,
    services: CollectionSync<Service>,
    gallery: CollectionSync<GalleryItem>,
    social_links: CollectionSync<SocialLink>,
    contacts: CollectionSync<ContactSubmission>,
}

impl<S: DocumentStore> Site<S> {
    /// Subscribes to every collection the pages read.
    pub async fn open(store: S, notifier: Notifier) -> Result<Self, StoreError> {
        let sections = Sections::open(store.clone(), notifier.clone()).await?;
        let categories = CollectionSync::start(&store, notifier.clone()).await?;
        let services = CollectionSync::start(&store, notifier.clone()).await?;
        let gallery = CollectionSync::start(&store, notifier.clone()).await?;
        let social_links = CollectionSync::start(&store, notifier.clone()).await?;
        let contacts = CollectionSync::start(&store, notifier.clone()).await?;
        let registry = ContentRegistry::connect(store, notifier).await;

        Ok(Self {
            registry,
            sections,
            categories,
            services,
            gallery,
            social_links,
            contacts,
        })
    }

    /// Waits for the first snapshot of every collection.
    pub async fn ready(&self) {
        self.registry.ready().await;
        self.sections.ready().await;
        self.categories.ready().await;
        self.services.ready().await;
        self.gallery.ready().await;
        self.social_links.ready().await;
        self.contacts.ready().await;
    }

    pub fn registry(&self) -> &ContentRegistry<S> {
        &self.registry
    }

    pub fn sections(&self) -> &Sections<S> {
        &self.sections
    }

    pub fn home(&self, session: &SessionContext, filter: GalleryFilter) -> HomePage {
        let slots = slots::all()
            .into_iter()
            .map(|slot| (slot.id, slot.field().view(&self.registry, session)))
            .collect();

        HomePage {
            slots,
            nav_title: self.sections.field(section_ids::NAV, "navTitle", ""),
            footer_description: self.sections.field(
                section_ids::FOOTER,
                "description",
                "Профессиональная реставрация мебели и создание уникальных арт-объектов.",
            ),
            copyright: self.sections.field(section_ids::FOOTER, "copyright", ""),
            services: self.services.items(),
            gallery: self.gallery.items(),
            categories: self.categories.items(),
            social_links: self.social_links.items(),
            filter,
            admin: session.email(),
        }
    }

    /// Dashboard data, or `None` for anonymous viewers.
    pub fn admin(&self, session: &SessionContext) -> Option<AdminPage> {
        let email = session.email()?;
        Some(AdminPage {
            email,
            status: self.registry.status(),
            categories: self.categories.items(),
            services: self.services.items(),
            gallery: self.gallery.items(),
            social_links: self.social_links.items(),
            contacts: self.contacts.items(),
        })
    }

    /// Renders `path` for `session`. Returns the resolved view with the HTML.
    pub fn render(&self, path: &str, session: &SessionContext, filter: GalleryFilter) -> (View, String) {
        let view = View::resolve(path, session);
        let html = match view {
            View::Home => render::render_home(&self.home(session, filter)),
            View::Admin => match self.admin(session) {
                Some(page) => render::render_admin(&page),
                None => render::render_access_denied(),
            },
            View::AccessDenied => render::render_access_denied(),
            View::NotFound => render::render_not_found(),
        };
        (view, html)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Session;
    use crate::fields;
    use crate::store::MemoryStore;
    use std::time::Duration;

    fn admin() -> SessionContext {
        SessionContext::fixed(Some(Session {
            email: "admin@example.com".to_string(),
            token: "t".to_string(),
        }))
    }

    #[test]
    fn test_resolve_routes() {
        let visitor = SessionContext::anonymous();
        assert_eq!(View::resolve("/", &visitor), View::Home);
        assert_eq!(View::resolve("/?category=art", &visitor), View::Home);
        assert_eq!(View::resolve("/admin", &visitor), View::AccessDenied);
        assert_eq!(View::resolve("/admin/", &admin()), View::Admin);
        assert_eq!(View::resolve("/shop", &admin()), View::NotFound);
    }

    #[tokio::test]
    async fn test_home_reflects_store() {
        let store = MemoryStore::new();
        store
            .set(
                "content",
                "hero-title",
                fields! { "content" => "Мебель с историей", "type" => "text" },
            )
            .await
            .unwrap();
        store
            .add("gallery", fields! { "title" => "Комод", "category" => "gone", "order" => 0 })
            .await
            .unwrap();

        let site = Site::open(store, Notifier::silent()).await.unwrap();
        site.ready().await;

        let (view, html) = site.render("/", &SessionContext::anonymous(), GalleryFilter::All);
        assert_eq!(view, View::Home);
        assert!(html.contains("Мебель с историей"));
        assert!(html.contains("Комод"));
        assert!(html.contains(gallery::UNGROUPED_TITLE));
    }

    #[tokio::test]
    async fn test_admin_sees_placeholder_for_empty_slot() {
        let store = MemoryStore::new();
        store
            .set("content", "hero-subtitle", fields! { "content" => "", "type" => "text" })
            .await
            .unwrap();
        let site = Site::open(store, Notifier::silent()).await.unwrap();
        site.ready().await;

        let page = site.home(&admin(), GalleryFilter::All);
        assert_eq!(
            page.slots.get("hero-subtitle"),
            Some(&crate::content::FieldView::Placeholder)
        );

        let visitor = site.home(&SessionContext::anonymous(), GalleryFilter::All);
        assert!(matches!(
            visitor.slots.get("hero-subtitle"),
            Some(crate::content::FieldView::Static { affordance: false, .. })
        ));
    }

    #[tokio::test]
    async fn test_admin_page_lists_contacts() {
        let store = MemoryStore::new();
        let site = Site::open(store.clone(), Notifier::silent()).await.unwrap();
        site.ready().await;
        store
            .add(
                "contacts",
                fields! { "name" => "Anna", "email" => "a@b.ru", "message" => "Hi", "status" => "new" },
            )
            .await
            .unwrap();

        let mut page = site.admin(&admin()).unwrap();
        for _ in 0..200 {
            if !page.contacts.is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
            page = site.admin(&admin()).unwrap();
        }
        assert_eq!(page.contacts[0].name, "Anna");
        assert!(site.admin(&SessionContext::anonymous()).is_none());

        let (view, html) = site.render("/admin", &SessionContext::anonymous(), GalleryFilter::All);
        assert_eq!(view, View::AccessDenied);
        assert!(html.contains("Доступ запрещен"));
    }
}
