use tracing::info;

use crate::models::Product;
use crate::AppState;

// Demo products so a fresh server can take orders right away. Tests insert
// their own.
pub async fn seed_demo_products(state: &AppState) {
    let now = state.clock.now();

    let demo = [
        ("prod-tea-001", "Green Tea 250g", 6.50, 40, "seller-demo-1"),
        ("prod-scarf-001", "Cotton Scarf", 12.00, 25, "seller-demo-1"),
        ("prod-honey-001", "Wild Honey 500g", 11.25, 18, "seller-demo-2"),
        ("prod-basket-001", "Handwoven Cane Basket", 14.00, 12, "seller-demo-2"),
    ];

    for (id, name, price, stock, seller_id) in demo {
        let _ = state
            .products
            .put(Product {
                id: id.to_string(),
                name: name.to_string(),
                price,
                stock,
                seller_id: seller_id.to_string(),
                active: true,
                updated_at: now,
                version: 0,
            })
            .await;
    }

    info!("seeded {} demo products", demo.len());
}
