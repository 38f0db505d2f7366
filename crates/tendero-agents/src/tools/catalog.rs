//! Shared product fixture data used by the product and commerce tools.

/// One sellable product.
pub struct CatalogItem {
    pub sku: &'static str,
    pub name: &'static str,
    pub category: &'static str,
    /// Unit price in COP cents.
    pub price_cents: u64,
    pub stock: u32,
    pub description: &'static str,
}

pub const CATALOG: &[CatalogItem] = &[
    CatalogItem {
        sku: "CAFE-250",
        name: "Café de origen 250g",
        category: "cafe",
        price_cents: 3_200_000,
        stock: 48,
        description: "Tostión media, notas de panela y cítricos. Huila.",
    },
    CatalogItem {
        sku: "CAFE-500",
        name: "Café de origen 500g",
        category: "cafe",
        price_cents: 5_900_000,
        stock: 22,
        description: "Tostión media, notas de panela y cítricos. Huila.",
    },
    CatalogItem {
        sku: "CHOC-80",
        name: "Chocolate 80% cacao",
        category: "chocolate",
        price_cents: 1_800_000,
        stock: 64,
        description: "Barra de 90g, cacao de Tumaco.",
    },
    CatalogItem {
        sku: "MIEL-300",
        name: "Miel de abejas 300g",
        category: "despensa",
        price_cents: 2_400_000,
        stock: 0,
        description: "Miel cruda multifloral de los Llanos.",
    },
    CatalogItem {
        sku: "AREQ-200",
        name: "Arequipe artesanal 200g",
        category: "despensa",
        price_cents: 1_500_000,
        stock: 31,
        description: "Receta tradicional, sin conservantes.",
    },
];

pub fn by_sku(sku: &str) -> Option<&'static CatalogItem> {
    CATALOG.iter().find(|item| item.sku.eq_ignore_ascii_case(sku))
}

/// Case-insensitive match against sku, name, category and description.
pub fn search(query: &str) -> Vec<&'static CatalogItem> {
    let needle = query.to_lowercase();
    CATALOG
        .iter()
        .filter(|item| {
            item.sku.to_lowercase().contains(&needle)
                || item.name.to_lowercase().contains(&needle)
                || item.category.to_lowercase().contains(&needle)
                || item.description.to_lowercase().contains(&needle)
        })
        .collect()
}

/// Format cents as a user-facing COP amount.
pub fn format_price(cents: u64) -> String {
    format!("${} COP", cents / 100)
}
