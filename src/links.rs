//! Outbound product-link synthesis.
//!
//! Each parsed recommendation item becomes one Amazon search URL carrying
//! the affiliate tag. A fixed table augments the query per category; unknown
//! categories fall back to appending the category label itself. Link
//! synthesis is total: it cannot fail, and identical input always yields
//! byte-identical URLs.

use crate::types::LinkEntry;

/// Base search endpoint every link points at.
pub const SEARCH_BASE_URL: &str = "https://www.amazon.com/s?k=";

/// Affiliate tag appended to every synthesized URL.
pub const AFFILIATE_TAG: &str = "&tag=musictostyle-20";

/// Query suffix for a known category key, or `None` for the fallback path.
///
/// Keys are the lower-cased category labels the prompt steers the model
/// toward. "art" maps to "wall art" because bare "art" searches return
/// supplies rather than decor.
fn category_suffix(key: &str) -> Option<&'static str> {
    match key {
        "clothing" => Some("clothing"),
        "shoes" => Some("shoes"),
        "accessories" => Some("accessories"),
        "furniture" => Some("furniture"),
        "home decor" => Some("home decor"),
        "art" => Some("wall art"),
        _ => None,
    }
}

/// Build one outbound search link per item, preserving item order.
///
/// The category lookup is case-insensitive over the trimmed label. Unknown
/// categories use the raw label as the query suffix instead of a table
/// entry, so every category produces usable links.
///
/// # Examples
///
/// ```rust
/// use music_to_style::links::generate_product_links;
///
/// let links = generate_product_links("clothing", &["leather jacket".to_string()]);
/// assert_eq!(links[0].search_term, "leather jacket clothing");
/// assert!(links[0].url.starts_with("https://www.amazon.com/s?k="));
/// assert!(links[0].url.ends_with("&tag=musictostyle-20"));
/// ```
#[must_use]
pub fn generate_product_links(category: &str, items: &[String]) -> Vec<LinkEntry> {
    // Trim before the case-folded lookup so a stray trailing space cannot
    // push a known category onto the fallback path.
    let key = category.trim().to_lowercase();
    let suffix = category_suffix(&key);

    items
        .iter()
        .map(|item| {
            let search_term = match suffix {
                Some(suffix) => format!("{item} {suffix}"),
                None => format!("{item} {category}"),
            };
            let url = format!(
                "{SEARCH_BASE_URL}{}{AFFILIATE_TAG}",
                urlencoding::encode(&search_term)
            );
            LinkEntry {
                item: item.clone(),
                url,
                search_term,
            }
        })
        .collect()
}
