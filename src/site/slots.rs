//! Content slots on the home page and their default texts.

use crate::content::EditableField;
use crate::models::ContentKind;

/// A named slot in the `content` collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    pub id: &'static str,
    pub default: &'static str,
    pub kind: ContentKind,
}

impl Slot {
    pub const fn text(id: &'static str, default: &'static str) -> Self {
        Self {
            id,
            default,
            kind: ContentKind::Text,
        }
    }

    pub const fn image(id: &'static str, default: &'static str) -> Self {
        Self {
            id,
            default,
            kind: ContentKind::Image,
        }
    }

    /// A fresh field bound to this slot.
    pub fn field(&self) -> EditableField {
        EditableField::new(self.id, self.default).with_kind(self.kind)
    }
}

pub const NAV_LOGO: Slot = Slot::text("nav-logo", "Мастерская Искусства");
pub const NAV_HOME: Slot = Slot::text("nav-home", "Главная");
pub const NAV_SERVICES: Slot = Slot::text("nav-services", "Услуги");
pub const NAV_GALLERY: Slot = Slot::text("nav-gallery", "Галерея");
pub const NAV_ABOUT: Slot = Slot::text("nav-about", "О нас");
pub const NAV_CONTACT: Slot = Slot::text("nav-contact", "Контакты");

pub const HERO_TITLE: Slot = Slot::text("hero-title", "Возвращаем душу вашей мебели");
pub const HERO_SUBTITLE: Slot = Slot::text(
    "hero-subtitle",
    "Профессиональная реставрация антикварной мебели и создание уникальных арт-объектов с любовью к деталям",
);
pub const HERO_CTA_1: Slot = Slot::text("hero-cta-1", "Заказать консультацию");
pub const HERO_CTA_2: Slot = Slot::text("hero-cta-2", "Посмотреть работы");
pub const HERO_IMAGE: Slot = Slot::image("hero-image", "");

pub const SERVICES_TITLE: Slot = Slot::text("services-title", "Наши услуги");
pub const SERVICES_SUBTITLE: Slot = Slot::text(
    "services-subtitle",
    "Комплексный подход к реставрации и созданию уникальных предметов искусства",
);

pub const GALLERY_TITLE: Slot = Slot::text("gallery-title", "Наши работы");
pub const GALLERY_SUBTITLE: Slot = Slot::text(
    "gallery-subtitle",
    "Примеры успешных проектов реставрации и создания уникальных предметов",
);

pub const ABOUT_TITLE: Slot = Slot::text("about-title", "О нашей мастерской");
pub const ABOUT_DESC_1: Slot = Slot::text(
    "about-desc-1",
    "Более 15 лет мы занимаемся профессиональной реставрацией мебели и созданием уникальных арт-объектов.",
);
pub const ABOUT_DESC_2: Slot = Slot::text(
    "about-desc-2",
    "Команда опытных мастеров использует традиционные техники реставрации в сочетании с современными материалами.",
);
pub const ABOUT_IMAGE: Slot = Slot::image("about-image", "");

pub const STATS: [(Slot, Slot); 3] = [
    (
        Slot::text("stat-1-number", "500+"),
        Slot::text("stat-1-label", "Восстановленных предметов"),
    ),
    (
        Slot::text("stat-2-number", "15"),
        Slot::text("stat-2-label", "Лет опыта"),
    ),
    (
        Slot::text("stat-3-number", "200+"),
        Slot::text("stat-3-label", "Довольных клиентов"),
    ),
];

pub const CONTACT_TITLE: Slot = Slot::text("contact-title", "Свяжитесь с нами");
pub const CONTACT_SUBTITLE: Slot = Slot::text(
    "contact-subtitle",
    "Готовы обсудить ваш проект? Свяжитесь с нами для бесплатной консультации",
);
pub const CONTACT_ADDRESS: Slot = Slot::text("contact-address", "г. Москва, ул. Мастеров, д. 15");
pub const CONTACT_PHONE: Slot = Slot::text("contact-phone-display", "+7 (495) 123-45-67");
pub const CONTACT_EMAIL: Slot = Slot::text("contact-email-display", "info@masterpiece-studio.ru");
pub const CONTACT_HOURS: Slot =
    Slot::text("contact-hours", "Пн-Пт: 9:00-18:00, Сб: 10:00-16:00");
pub const SOCIAL_TITLE: Slot = Slot::text("social-title", "Мы в социальных сетях");

pub const FOOTER_COMPANY: Slot = Slot::text("footer-company", "Мастерская Искусства");

/// Looks up a home page slot by id.
pub fn find(id: &str) -> Option<Slot> {
    all().into_iter().find(|slot| slot.id == id)
}

/// Every home page slot.
pub fn all() -> Vec<Slot> {
    let mut slots = vec![
        NAV_LOGO,
        NAV_HOME,
        NAV_SERVICES,
        NAV_GALLERY,
        NAV_ABOUT,
        NAV_CONTACT,
        HERO_TITLE,
        HERO_SUBTITLE,
        HERO_CTA_1,
        HERO_CTA_2,
        HERO_IMAGE,
        SERVICES_TITLE,
        SERVICES_SUBTITLE,
        GALLERY_TITLE,
        GALLERY_SUBTITLE,
        ABOUT_TITLE,
        ABOUT_DESC_1,
        ABOUT_DESC_2,
        ABOUT_IMAGE,
    ];
    for (number, label) in STATS {
        slots.push(number);
        slots.push(label);
    }
    slots.extend([
        CONTACT_TITLE,
        CONTACT_SUBTITLE,
        CONTACT_ADDRESS,
        CONTACT_PHONE,
        CONTACT_EMAIL,
        CONTACT_HOURS,
        SOCIAL_TITLE,
        FOOTER_COMPANY,
    ]);
    slots
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_slot_ids_are_unique() {
        let slots = all();
        let ids: HashSet<_> = slots.iter().map(|s| s.id).collect();
        assert_eq!(ids.len(), slots.len());
    }

    #[test]
    fn test_find() {
        assert_eq!(find("hero-title"), Some(HERO_TITLE));
        assert_eq!(find("about-image").map(|s| s.kind), Some(ContentKind::Image));
        assert!(find("nope").is_none());
    }
}
