//! Gallery filtering and grouping.
//!
//! Items reference categories by slug only. Removing a category leaves its
//! items in place; they show up in the trailing ungrouped section.

use crate::models::{Category, GalleryItem};

/// Title of the group holding items whose category is unknown.
pub const UNGROUPED_TITLE: &str = "Другие работы";

/// Label of the "everything" filter tab.
pub const ALL_LABEL: &str = "Все работы";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum GalleryFilter {
    #[default]
    All,
    Category(String),
}

impl GalleryFilter {
    /// Parses a filter query value. Blank and `all` select everything.
    pub fn parse(value: &str) -> Self {
        match value.trim() {
            "" | "all" => GalleryFilter::All,
            slug => GalleryFilter::Category(slug.to_string()),
        }
    }

    pub fn key(&self) -> &str {
        match self {
            GalleryFilter::All => "all",
            GalleryFilter::Category(slug) => slug,
        }
    }

    pub fn matches(&self, item: &GalleryItem) -> bool {
        match self {
            GalleryFilter::All => true,
            GalleryFilter::Category(slug) => item.category == *slug,
        }
    }
}

pub fn filter<'a>(items: &'a [GalleryItem], filter: &GalleryFilter) -> Vec<&'a GalleryItem> {
    items.iter().filter(|item| filter.matches(item)).collect()
}

/// Filter tabs: `(key, label)`, starting with the "all" tab.
pub fn tabs(categories: &[Category]) -> Vec<(String, String)> {
    std::iter::once(("all".to_string(), ALL_LABEL.to_string()))
        .chain(categories.iter().map(|c| (c.slug.clone(), c.name.clone())))
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct GalleryGroup<'a> {
    /// `None` for the ungrouped section.
    pub slug: Option<&'a str>,
    pub title: &'a str,
    pub items: Vec<&'a GalleryItem>,
}

/// Groups items by category, in category order. Empty categories are left
/// out; items without a matching category go into a final ungrouped group.
pub fn group_by_category<'a>(
    items: &'a [GalleryItem],
    categories: &'a [Category],
) -> Vec<GalleryGroup<'a>> {
    let mut groups: Vec<GalleryGroup<'a>> = categories
        .iter()
        .map(|category| GalleryGroup {
            slug: Some(category.slug.as_str()),
            title: category.name.as_str(),
            items: items.iter().filter(|i| i.category == category.slug).collect(),
        })
        .filter(|group| !group.items.is_empty())
        .collect();

    let orphans: Vec<&GalleryItem> = items
        .iter()
        .filter(|item| !categories.iter().any(|c| c.slug == item.category))
        .collect();
    if !orphans.is_empty() {
        groups.push(GalleryGroup {
            slug: None,
            title: UNGROUPED_TITLE,
            items: orphans,
        });
    }

    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, category: &str) -> GalleryItem {
        GalleryItem {
            id: id.to_string(),
            title: id.to_uppercase(),
            description: String::new(),
            image_url: format!("https://i.ibb.co/{}.jpg", id),
            category: category.to_string(),
            order: 0,
            created_at: None,
        }
    }

    fn category(slug: &str, name: &str) -> Category {
        Category {
            id: slug.to_string(),
            name: name.to_string(),
            slug: slug.to_string(),
            order: 0,
            created_at: None,
        }
    }

    #[test]
    fn test_filter_parse() {
        assert_eq!(GalleryFilter::parse(""), GalleryFilter::All);
        assert_eq!(GalleryFilter::parse("all"), GalleryFilter::All);
        assert_eq!(
            GalleryFilter::parse("art"),
            GalleryFilter::Category("art".to_string())
        );
    }

    #[test]
    fn test_filter_by_category() {
        let items = vec![item("a", "art"), item("b", "restoration"), item("c", "art")];
        let art = filter(&items, &GalleryFilter::Category("art".to_string()));
        assert_eq!(art.iter().map(|i| i.id.as_str()).collect::<Vec<_>>(), ["a", "c"]);
        assert_eq!(filter(&items, &GalleryFilter::All).len(), 3);
    }

    #[test]
    fn test_deleted_category_leaves_orphans_ungrouped() {
        let items = vec![item("a", "art"), item("b", "restoration")];
        let categories = vec![category("art", "Арт-объекты")];

        let groups = group_by_category(&items, &categories);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].slug, Some("art"));
        assert_eq!(groups[1].slug, None);
        assert_eq!(groups[1].title, UNGROUPED_TITLE);
        assert_eq!(groups[1].items[0].id, "b");
    }

    #[test]
    fn test_empty_categories_skipped() {
        let items = vec![item("a", "art")];
        let categories = vec![category("custom", "На заказ"), category("art", "Арт")];

        let groups = group_by_category(&items, &categories);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].title, "Арт");
    }

    #[test]
    fn test_tabs_start_with_all() {
        let tabs = tabs(&[category("art", "Арт")]);
        assert_eq!(tabs[0].0, "all");
        assert_eq!(tabs[1], ("art".to_string(), "Арт".to_string()));
    }
}
