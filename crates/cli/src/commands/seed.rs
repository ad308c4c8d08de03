//! Seed the database with a small sample catalog, a shipping policy, and a
//! starter gallery: enough for a fresh environment to be browsable.

use rust_decimal::Decimal;
use secrecy::SecretString;

use aurelle_admin::db::gallery::{GalleryKind, GalleryRepository};
use aurelle_admin::db::products::{ProductInput, ProductRepository};
use aurelle_admin::db::settings;
use aurelle_core::{ShippingPolicy, VariationGroup, VariationOption};

fn metal_group() -> VariationGroup {
    VariationGroup {
        title: "Metal".to_owned(),
        options: vec![
            VariationOption {
                value: "Sterling Silver".to_owned(),
                price_delta: Decimal::ZERO,
            },
            VariationOption {
                value: "18k Gold".to_owned(),
                price_delta: Decimal::new(15000, 2),
            },
        ],
    }
}

fn size_group() -> VariationGroup {
    VariationGroup {
        title: "Ring Size".to_owned(),
        options: (5..=9)
            .map(|size| VariationOption {
                value: format!("Size {size}"),
                price_delta: Decimal::ZERO,
            })
            .collect(),
    }
}

fn sample_products() -> Vec<ProductInput> {
    vec![
        ProductInput {
            name: "Aurora Ring".to_owned(),
            description: "A twisted band set with a single brilliant stone.".to_owned(),
            category: "rings".to_owned(),
            base_price: Decimal::new(12000, 2),
            images: vec!["https://cdn.example/seed/aurora-ring.jpg".to_owned()],
            variations: vec![metal_group(), size_group()],
        },
        ProductInput {
            name: "Luna Necklace".to_owned(),
            description: "Crescent pendant on a fine cable chain.".to_owned(),
            category: "necklaces".to_owned(),
            base_price: Decimal::new(8500, 2),
            images: vec!["https://cdn.example/seed/luna-necklace.jpg".to_owned()],
            variations: vec![metal_group()],
        },
        ProductInput {
            name: "Sol Studs".to_owned(),
            description: "Hand-finished sunburst studs.".to_owned(),
            category: "earrings".to_owned(),
            base_price: Decimal::new(6400, 2),
            images: vec!["https://cdn.example/seed/sol-studs.jpg".to_owned()],
            variations: Vec::new(),
        },
    ]
}

/// Seed sample data. Safe to re-run; products are keyed by fresh ids, so a
/// second run simply adds another copy. Intended for dev databases only.
///
/// # Errors
///
/// Returns an error if the database is unreachable or any insert fails.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("ADMIN_DATABASE_URL")
        .map(SecretString::from)
        .map_err(|_| "ADMIN_DATABASE_URL not set")?;
    let pool = aurelle_admin::db::create_pool(&database_url).await?;

    let products = ProductRepository::new(&pool);
    for input in sample_products() {
        let product = products.create(&input).await?;
        tracing::info!(id = %product.id, name = %product.name, "seeded product");
    }

    let policy = ShippingPolicy {
        standard_shipping_fee: Decimal::new(1500, 2),
        free_shipping_threshold: Decimal::new(50000, 2),
    };
    settings::set_shipping_policy(&pool, &policy).await?;
    tracing::info!("seeded shipping policy (15.00 fee, free over 500.00)");

    let gallery = GalleryRepository::new(&pool);
    gallery
        .create(
            "Atelier bench",
            "https://cdn.example/seed/bench.mp4",
            GalleryKind::Video,
        )
        .await?;
    gallery
        .create(
            "Aurora on hand",
            "https://cdn.example/seed/aurora-hand.jpg",
            GalleryKind::Image,
        )
        .await?;
    tracing::info!("seeded gallery");

    Ok(())
}
