//! Server-side HTML for the two page routes.
//!
//! Pages are plain `format!` templates. Every value that came from the store
//! passes through [`escape`] before it is written out.

use std::collections::HashMap;
use std::fmt::Write;

use super::gallery::{self, GalleryFilter};
use super::slots::{self, Slot};
use crate::content::{ConnectionStatus, FieldView, EMPTY_PLACEHOLDER};
use crate::icons::SocialIcon;
use crate::models::{Category, ContactSubmission, ContentKind, GalleryItem, Service, SocialLink};

/// Escapes text for element content and double- or single-quoted attributes.
pub fn escape(input: &str) -> String {
    let mut output = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => output.push_str("&amp;"),
            '<' => output.push_str("&lt;"),
            '>' => output.push_str("&gt;"),
            '"' => output.push_str("&quot;"),
            '\'' => output.push_str("&#x27;"),
            _ => output.push(ch),
        }
    }
    output
}

/// Everything the home page shows.
#[derive(Debug, Clone, Default)]
pub struct HomePage {
    pub slots: HashMap<&'static str, FieldView>,
    pub nav_title: String,
    pub footer_description: String,
    pub copyright: String,
    pub services: Vec<Service>,
    pub gallery: Vec<GalleryItem>,
    pub categories: Vec<Category>,
    pub social_links: Vec<SocialLink>,
    pub filter: GalleryFilter,
    /// Signed-in admin, if any.
    pub admin: Option<String>,
}

impl HomePage {
    fn slot(&self, slot: &Slot) -> String {
        let view = self.slots.get(slot.id).cloned().unwrap_or(FieldView::Static {
            text: slot.default.to_string(),
            affordance: false,
        });
        render_field(slot.id, slot.kind, &view)
    }
}

/// Renders one slot in its current view state.
pub fn render_field(id: &str, kind: ContentKind, view: &FieldView) -> String {
    let id = escape(id);
    match view {
        FieldView::Placeholder => format!(
            r#"<span class="editable empty" data-slot="{}" data-editable="true">{}</span>"#,
            id, EMPTY_PLACEHOLDER
        ),
        FieldView::Editor { draft } => format!(
            r#"<textarea class="editable editing" data-slot="{}">{}</textarea>"#,
            id,
            escape(draft)
        ),
        FieldView::Static { text, affordance } => {
            let editable = if *affordance {
                r#" data-editable="true""#
            } else {
                ""
            };
            match kind {
                ContentKind::Image if text.trim().is_empty() => String::new(),
                ContentKind::Image => format!(
                    r#"<img class="editable" data-slot="{}"{} src="{}" alt="">"#,
                    id,
                    editable,
                    escape(text)
                ),
                ContentKind::Link => format!(
                    r#"<a class="editable" data-slot="{}"{} href="{}">{}</a>"#,
                    id,
                    editable,
                    escape(text),
                    escape(text)
                ),
                ContentKind::Text => format!(
                    r#"<span class="editable" data-slot="{}"{}>{}</span>"#,
                    id,
                    editable,
                    escape(text)
                ),
            }
        }
    }
}

fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="ru">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
</head>
<body>
{body}
</body>
</html>"#,
        title = escape(title),
        body = body,
    )
}

pub fn render_home(page: &HomePage) -> String {
    let mut body = String::new();

    let session = match &page.admin {
        Some(email) => format!(
            r#"<a href="/admin" data-testid="admin-panel-link">Админ панель</a> <span class="admin-email">{}</span>"#,
            escape(email)
        ),
        None => String::new(),
    };
    let _ = write!(
        body,
        r##"<nav data-testid="navigation">
<div class="logo">{logo}</div>
<div class="nav-title">{nav_title}</div>
<a href="#hero">{home}</a> <a href="#services">{services}</a> <a href="#gallery">{gallery}</a> <a href="#about">{about}</a> <a href="#contact">{contact}</a>
{session}
</nav>
"##,
        logo = page.slot(&slots::NAV_LOGO),
        nav_title = escape(&page.nav_title),
        home = page.slot(&slots::NAV_HOME),
        services = page.slot(&slots::NAV_SERVICES),
        gallery = page.slot(&slots::NAV_GALLERY),
        about = page.slot(&slots::NAV_ABOUT),
        contact = page.slot(&slots::NAV_CONTACT),
        session = session,
    );

    let _ = write!(
        body,
        r##"<section id="hero" data-testid="hero-section">
{image}
<h1>{title}</h1>
<p>{subtitle}</p>
<a href="#contact" class="cta">{cta1}</a> <a href="#gallery" class="cta">{cta2}</a>
</section>
"##,
        image = page.slot(&slots::HERO_IMAGE),
        title = page.slot(&slots::HERO_TITLE),
        subtitle = page.slot(&slots::HERO_SUBTITLE),
        cta1 = page.slot(&slots::HERO_CTA_1),
        cta2 = page.slot(&slots::HERO_CTA_2),
    );

    body.push_str(&render_services(page));
    body.push_str(&render_gallery(page));

    let stats: String = slots::STATS
        .iter()
        .map(|(number, label)| {
            format!(
                "<div class=\"stat\"><strong>{}</strong> {}</div>\n",
                page.slot(number),
                page.slot(label)
            )
        })
        .collect();
    let _ = write!(
        body,
        r#"<section id="about" data-testid="about-section">
<h2>{title}</h2>
<p>{desc1}</p>
<p>{desc2}</p>
{stats}{image}
</section>
"#,
        title = page.slot(&slots::ABOUT_TITLE),
        desc1 = page.slot(&slots::ABOUT_DESC_1),
        desc2 = page.slot(&slots::ABOUT_DESC_2),
        stats = stats,
        image = page.slot(&slots::ABOUT_IMAGE),
    );

    body.push_str(&render_contact(page));

    let _ = write!(
        body,
        r#"<footer data-testid="footer">
<div>{company}</div>
<p>{description}</p>
<p>{copyright}</p>
</footer>"#,
        company = page.slot(&slots::FOOTER_COMPANY),
        description = escape(&page.footer_description),
        copyright = escape(&page.copyright),
    );

    layout(slots::NAV_LOGO.default, &body)
}

fn render_services(page: &HomePage) -> String {
    let mut cards = String::new();
    for service in &page.services {
        let _ = writeln!(
            cards,
            r#"<div class="service" data-testid="service-{id}"><span class="icon" title="{icon}">{symbol}</span><h3>{title}</h3><p>{description}</p></div>"#,
            id = escape(&service.id),
            icon = service.icon().name(),
            symbol = service.icon().symbol(),
            title = escape(&service.title),
            description = escape(&service.description),
        );
    }

    format!(
        r#"<section id="services" data-testid="services-section">
<h2>{}</h2>
<p>{}</p>
{}</section>
"#,
        page.slot(&slots::SERVICES_TITLE),
        page.slot(&slots::SERVICES_SUBTITLE),
        cards
    )
}

fn render_gallery_item(item: &GalleryItem) -> String {
    format!(
        r#"<figure data-testid="gallery-item-{id}"><img src="{src}" alt="{alt}"><figcaption><h3>{title}</h3><p>{description}</p></figcaption></figure>
"#,
        id = escape(&item.id),
        src = escape(&item.image_url),
        alt = escape(&item.title),
        title = escape(&item.title),
        description = escape(&item.description),
    )
}

fn render_gallery(page: &HomePage) -> String {
    let mut tabs = String::new();
    for (key, label) in gallery::tabs(&page.categories) {
        let active = if key == page.filter.key() {
            " active"
        } else {
            ""
        };
        let _ = write!(
            tabs,
            r#"<a class="filter{}" href="/?category={}" data-testid="filter-{}">{}</a> "#,
            active,
            urlencoding::encode(&key),
            escape(&key),
            escape(&label)
        );
    }

    let mut grid = String::new();
    match &page.filter {
        GalleryFilter::All => {
            for group in gallery::group_by_category(&page.gallery, &page.categories) {
                let _ = writeln!(grid, "<h3 class=\"group\">{}</h3>", escape(group.title));
                for item in group.items {
                    grid.push_str(&render_gallery_item(item));
                }
            }
        }
        filter => {
            for item in gallery::filter(&page.gallery, filter) {
                grid.push_str(&render_gallery_item(item));
            }
        }
    }
    if grid.is_empty() {
        grid.push_str("<p class=\"empty\">Нет работ в данной категории</p>\n");
    }

    format!(
        r#"<section id="gallery" data-testid="gallery-section">
<h2>{}</h2>
<p>{}</p>
<div class="filters">{}</div>
<div class="grid" data-testid="gallery-grid">
{}</div>
</section>
"#,
        page.slot(&slots::GALLERY_TITLE),
        page.slot(&slots::GALLERY_SUBTITLE),
        tabs,
        grid
    )
}

fn render_social_link(link: &SocialLink) -> String {
    let icon = match link.icon() {
        SocialIcon::Class(class) => format!(r#"<i class="{}"></i>"#, escape(class)),
        SocialIcon::Image(src) => format!(r#"<img src="{}" alt="">"#, escape(src)),
        SocialIcon::None => String::new(),
    };
    format!(
        r#"<a class="social" href="{}" title="{}">{}{}</a>"#,
        escape(&link.url),
        escape(&link.platform),
        icon,
        escape(&link.platform)
    )
}

fn render_contact(page: &HomePage) -> String {
    let social: Vec<String> = page.social_links.iter().map(render_social_link).collect();
    let service_options: String = page
        .services
        .iter()
        .map(|s| format!("<option>{}</option>", escape(&s.title)))
        .collect();

    format!(
        r#"<section id="contact" data-testid="contact-section">
<h2>{title}</h2>
<p>{subtitle}</p>
<ul>
<li>{address}</li>
<li>{phone}</li>
<li>{email}</li>
<li>{hours}</li>
</ul>
<h3>{social_title}</h3>
<div class="social-links">{social}</div>
<form method="post" action="/api/collections/contacts" data-testid="contact-form">
<input name="name" required>
<input name="email" type="email" required>
<input name="phone">
<select name="service"><option value=""></option>{options}</select>
<textarea name="message" required></textarea>
<button type="submit">Отправить</button>
</form>
</section>
"#,
        title = page.slot(&slots::CONTACT_TITLE),
        subtitle = page.slot(&slots::CONTACT_SUBTITLE),
        address = page.slot(&slots::CONTACT_ADDRESS),
        phone = page.slot(&slots::CONTACT_PHONE),
        email = page.slot(&slots::CONTACT_EMAIL),
        hours = page.slot(&slots::CONTACT_HOURS),
        social_title = page.slot(&slots::SOCIAL_TITLE),
        social = social.join(" "),
        options = service_options,
    )
}

/// The admin dashboard.
#[derive(Debug, Clone)]
pub struct AdminPage {
    pub email: String,
    pub status: ConnectionStatus,
    pub categories: Vec<Category>,
    pub services: Vec<Service>,
    pub gallery: Vec<GalleryItem>,
    pub social_links: Vec<SocialLink>,
    pub contacts: Vec<ContactSubmission>,
}

fn admin_table(title: &str, rows: impl Iterator<Item = String>) -> String {
    let rows: String = rows.collect();
    let rows = if rows.is_empty() {
        "<tr><td>Пусто</td></tr>\n".to_string()
    } else {
        rows
    };
    format!(
        "<section class=\"admin-list\">\n<h2>{}</h2>\n<table>\n{}</table>\n</section>\n",
        escape(title),
        rows
    )
}

pub fn render_admin(page: &AdminPage) -> String {
    let mut body = format!(
        r#"<header><a href="/">На главную</a><h1>Админ панель</h1><span class="admin-email">{}</span> <span class="status" data-testid="store-status">{}</span></header>
"#,
        escape(&page.email),
        page.status
    );

    body.push_str(&admin_table(
        "Категории",
        page.categories.iter().map(|c| {
            format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td></tr>\n",
                c.order,
                escape(&c.name),
                escape(&c.slug)
            )
        }),
    ));
    body.push_str(&admin_table(
        "Услуги",
        page.services.iter().map(|s| {
            format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td></tr>\n",
                s.order,
                escape(&s.title),
                s.icon().name()
            )
        }),
    ));
    body.push_str(&admin_table(
        "Галерея",
        page.gallery.iter().map(|g| {
            format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td></tr>\n",
                g.order,
                escape(&g.title),
                escape(&g.category)
            )
        }),
    ));
    body.push_str(&admin_table(
        "Социальные сети",
        page.social_links.iter().map(|l| {
            format!(
                "<tr><td>{}</td><td>{}</td></tr>\n",
                escape(&l.platform),
                escape(&l.url)
            )
        }),
    ));
    body.push_str(&admin_table(
        "Заявки",
        page.contacts.iter().map(|c| {
            format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
                c.status,
                escape(&c.name),
                escape(&c.email),
                escape(&c.message)
            )
        }),
    ));

    layout("Админ панель", &body)
}

pub fn render_access_denied() -> String {
    layout(
        "Доступ запрещен",
        r#"<div class="denied">
<h1>Доступ запрещен</h1>
<p>У вас нет прав для доступа к админ панели</p>
<a href="/">На главную</a>
</div>"#,
    )
}

pub fn render_not_found() -> String {
    layout(
        "Страница не найдена",
        r#"<div class="not-found">
<h1>404</h1>
<p>Страница не найдена</p>
<a href="/">На главную</a>
</div>"#,
    )
}
