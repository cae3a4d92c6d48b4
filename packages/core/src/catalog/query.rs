use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use vitrine_types::utils::fold_search_text;

use super::{Favorites, Product};

pub const DEFAULT_PER_PAGE: usize = 12;
pub const MAX_PER_PAGE: usize = 100;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductSort {
    #[default]
    NameAsc,
    NameDesc,
    PriceAsc,
    PriceDesc,
    Newest,
    Featured,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductQuery {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub category_id: Option<String>,
    #[serde(default)]
    pub min_price: Option<f64>,
    #[serde(default)]
    pub max_price: Option<f64>,
    #[serde(default)]
    pub include_inactive: bool,
    #[serde(default)]
    pub favorites_only: bool,
    #[serde(default)]
    pub sort: ProductSort,
    /// 1-based
    #[serde(default)]
    pub page: Option<usize>,
    #[serde(default)]
    pub per_page: Option<usize>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub page: usize,
    pub per_page: usize,
    pub total_pages: usize,
}

impl<T> Page<T> {
    /// Slices one page out of an already filtered and sorted list.
    /// Pages past the end are empty.
    pub fn paginate(items: Vec<T>, page: Option<usize>, per_page: Option<usize>) -> Self {
        let per_page = per_page
            .unwrap_or(DEFAULT_PER_PAGE)
            .clamp(1, MAX_PER_PAGE);
        let page = page.unwrap_or(1).max(1);
        let total = items.len();
        let total_pages = total.div_ceil(per_page);

        let items = items
            .into_iter()
            .skip((page - 1).saturating_mul(per_page))
            .take(per_page)
            .collect();

        Page {
            items,
            total,
            page,
            per_page,
            total_pages,
        }
    }
}

struct Matcher {
    needle: Option<String>,
}

impl Matcher {
    fn new(search: Option<&str>) -> Self {
        let needle = search
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(fold_search_text);
        Self { needle }
    }

    fn matches(&self, product: &Product) -> bool {
        let Some(needle) = &self.needle else {
            return true;
        };

        fold_search_text(&product.name).contains(needle)
            || fold_search_text(&product.description).contains(needle)
            || product
                .code
                .as_deref()
                .map(|code| fold_search_text(code).contains(needle))
                .unwrap_or(false)
    }
}

/// Filters, sorts and paginates the catalog.
///
/// `favorites_only` with no favorites yields an empty page.
pub fn query_products(
    products: Vec<Product>,
    query: &ProductQuery,
    favorites: Option<&Favorites>,
) -> Page<Product> {
    let matcher = Matcher::new(query.search.as_deref());

    let mut filtered: Vec<Product> = products
        .into_iter()
        .filter(|p| query.include_inactive || p.active)
        .filter(|p| match &query.category_id {
            Some(category) if !category.is_empty() => p.category_id.as_deref() == Some(category),
            _ => true,
        })
        .filter(|p| query.min_price.is_none_or(|min| p.price >= min))
        .filter(|p| query.max_price.is_none_or(|max| p.price <= max))
        .filter(|p| {
            !query.favorites_only
                || favorites
                    .zip(p.id.as_deref())
                    .map(|(favorites, id)| favorites.contains(id))
                    .unwrap_or(false)
        })
        .filter(|p| matcher.matches(p))
        .collect();

    sort_products(&mut filtered, query.sort);
    Page::paginate(filtered, query.page, query.per_page)
}

fn by_name(a: &Product, b: &Product) -> Ordering {
    fold_search_text(&a.name).cmp(&fold_search_text(&b.name))
}

fn sort_products(products: &mut [Product], sort: ProductSort) {
    match sort {
        ProductSort::NameAsc => products.sort_by(by_name),
        ProductSort::NameDesc => products.sort_by(|a, b| by_name(b, a)),
        ProductSort::PriceAsc => products.sort_by(|a, b| a.price.total_cmp(&b.price)),
        ProductSort::PriceDesc => products.sort_by(|a, b| b.price.total_cmp(&a.price)),
        // undated products go last
        ProductSort::Newest => products.sort_by(|a, b| match (&a.created_at, &b.created_at) {
            (Some(a), Some(b)) => b.cmp(a),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }),
        ProductSort::Featured => {
            products.sort_by(|a, b| b.featured.cmp(&a.featured).then_with(|| by_name(a, b)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn product(id: &str, name: &str, price: f64, category: Option<&str>) -> Product {
        Product {
            id: Some(id.to_string()),
            name: name.to_string(),
            description: String::new(),
            code: None,
            price,
            category_id: category.map(str::to_string),
            image_urls: Vec::new(),
            featured: false,
            active: true,
            created_at: None,
        }
    }

    fn catalog() -> Vec<Product> {
        let mut coffee = product("1", "Café Torrado", 18.9, Some("bebidas"));
        coffee.code = Some("CAF-500".to_string());
        coffee.created_at = Some(Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap());
        let mut juice = product("2", "Suco de Laranja", 7.5, Some("bebidas"));
        juice.featured = true;
        juice.created_at = Some(Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap());
        let mut cheese = product("3", "Queijo Minas", 32.0, Some("frios"));
        cheese.description = "Queijo fresco, ótimo com café".to_string();
        let mut hidden = product("4", "Açúcar Mascavo", 9.0, None);
        hidden.active = false;
        vec![coffee, juice, cheese, hidden]
    }

    fn names(page: &Page<Product>) -> Vec<&str> {
        page.items.iter().map(|p| p.name.as_str()).collect()
    }

    #[test]
    fn default_query_hides_inactive_and_sorts_by_name() {
        let page = query_products(catalog(), &ProductQuery::default(), None);
        assert_eq!(names(&page), vec!["Café Torrado", "Queijo Minas", "Suco de Laranja"]);
        assert_eq!(page.total, 3);
        assert_eq!(page.total_pages, 1);
    }

    #[test]
    fn search_ignores_case_and_accents_across_fields() {
        let query = ProductQuery {
            search: Some("CAFE".to_string()),
            ..Default::default()
        };
        let page = query_products(catalog(), &query, None);
        assert_eq!(names(&page), vec!["Café Torrado", "Queijo Minas"]);

        let query = ProductQuery {
            search: Some("caf-5".to_string()),
            ..Default::default()
        };
        assert_eq!(names(&query_products(catalog(), &query, None)), vec!["Café Torrado"]);
    }

    #[test]
    fn inactive_products_are_searchable_when_requested() {
        let query = ProductQuery {
            search: Some("acucar".to_string()),
            include_inactive: true,
            ..Default::default()
        };
        assert_eq!(names(&query_products(catalog(), &query, None)), vec!["Açúcar Mascavo"]);
    }

    #[test]
    fn filters_by_category_and_price_range() {
        let query = ProductQuery {
            category_id: Some("bebidas".to_string()),
            min_price: Some(8.0),
            ..Default::default()
        };
        assert_eq!(names(&query_products(catalog(), &query, None)), vec!["Café Torrado"]);

        let query = ProductQuery {
            max_price: Some(20.0),
            sort: ProductSort::PriceDesc,
            ..Default::default()
        };
        assert_eq!(
            names(&query_products(catalog(), &query, None)),
            vec!["Café Torrado", "Suco de Laranja"]
        );
    }

    #[test]
    fn favorites_only_uses_the_given_set() {
        let mut favorites = Favorites::for_user("u1");
        favorites.toggle("3");
        let query = ProductQuery {
            favorites_only: true,
            ..Default::default()
        };
        assert_eq!(
            names(&query_products(catalog(), &query, Some(&favorites))),
            vec!["Queijo Minas"]
        );
        assert!(query_products(catalog(), &query, None).items.is_empty());
    }

    #[test]
    fn newest_and_featured_orderings() {
        let query = ProductQuery {
            sort: ProductSort::Newest,
            ..Default::default()
        };
        assert_eq!(
            names(&query_products(catalog(), &query, None)),
            vec!["Suco de Laranja", "Café Torrado", "Queijo Minas"]
        );

        let query = ProductQuery {
            sort: ProductSort::Featured,
            ..Default::default()
        };
        assert_eq!(names(&query_products(catalog(), &query, None))[0], "Suco de Laranja");
    }

    #[test]
    fn pagination_clamps_and_handles_out_of_range_pages() {
        let items: Vec<u32> = (1..=25).collect();

        let page = Page::paginate(items.clone(), Some(3), Some(10));
        assert_eq!(page.items, vec![21, 22, 23, 24, 25]);
        assert_eq!(page.total_pages, 3);

        let page = Page::paginate(items.clone(), Some(0), Some(0));
        assert_eq!(page.page, 1);
        assert_eq!(page.per_page, 1);
        assert_eq!(page.items, vec![1]);

        let page = Page::paginate(items.clone(), Some(9), Some(500));
        assert_eq!(page.per_page, MAX_PER_PAGE);
        assert!(page.items.is_empty());
        assert_eq!(page.total, 25);

        let page: Page<u32> = Page::paginate(Vec::new(), None, None);
        assert_eq!(page.total_pages, 0);
        assert_eq!(page.per_page, DEFAULT_PER_PAGE);
    }
}
