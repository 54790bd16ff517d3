//! The built-in product catalog.

use rust_decimal::Decimal;

use crate::catalog::{Product, ProductType, StaticCatalog};
use crate::ids::ProductId;

struct SeedProduct {
    id: &'static str,
    name: &'static str,
    description: &'static str,
    price_minor: i64,
    image: &'static str,
    category: &'static str,
    occasion: &'static str,
    product_type: ProductType,
    available: bool,
}

macro_rules! seed {
    ($id:literal, $name:literal, $desc:literal, $price:literal, $image:literal, $cat:literal, $occ:literal, $ty:ident, $avail:literal) => {
        SeedProduct {
            id: $id,
            name: $name,
            description: $desc,
            price_minor: $price,
            image: $image,
            category: $cat,
            occasion: $occ,
            product_type: ProductType::$ty,
            available: $avail,
        }
    };
}

const SEED_PRODUCTS: &[SeedProduct] = &[
    seed!("cake-1", "Chocolate Delight Cake", "Rich chocolate cake with chocolate ganache", 4599, "/cakes/chocolate-cake.jpg", "chocolate", "birthday", Cake, true),
    seed!("cake-2", "Vanilla Dream Cake", "Classic vanilla sponge with buttercream frosting", 3999, "/cakes/vanilla-cake.jpg", "vanilla", "celebration", Cake, true),
    seed!("cake-3", "Red Velvet Supreme", "Red velvet cake with cream cheese frosting", 4999, "/cakes/red-velvet.jpg", "specialty", "anniversary", Cake, true),
    seed!("cake-4", "Lemon Bliss Cake", "Light lemon cake with lemon curd filling", 4299, "/cakes/lemon-cake.jpg", "fruit", "celebration", Cake, false),
    seed!("cake-5", "Strawberry Shortcake", "Fluffy vanilla cake with fresh strawberries and whipped cream", 4499, "/cakes/strawberry-cake.jpg", "fruit", "birthday", Cake, true),
    seed!("cake-6", "Carrot Cake", "Moist carrot cake with cream cheese frosting and walnuts", 4399, "/cakes/carrot-cake.jpg", "specialty", "celebration", Cake, true),
    seed!("cake-7", "Wedding Elegance Cake", "Three-tier vanilla cake with white fondant and delicate floral details", 18999, "/cakes/wedding-cake(stock).jpg", "vanilla", "wedding", Cake, true),
    seed!("cake-8", "Anniversary Rose Cake", "Champagne-infused cake with raspberry filling and rose buttercream", 6599, "/cakes/anniversary-cake(stock).jpg", "specialty", "anniversary", Cake, true),
    seed!("cake-9", "Black Forest Cake", "German chocolate cake with cherries, whipped cream, and chocolate shavings", 5299, "/cakes/black-forest-cake.jpg", "chocolate", "celebration", Cake, true),
    seed!("cake-10", "Tiramisu Cake", "Coffee-infused Italian cake with mascarpone layers and cocoa dusting", 5499, "/cakes/tiramisu-cake.jpg", "specialty", "celebration", Cake, true),
    seed!("cupcake-1", "Classic Chocolate Cupcakes", "Rich chocolate cupcakes with chocolate buttercream (6 pack)", 1899, "/cupcakes/chocolate-cupcakes(stock).jpg", "chocolate", "birthday", Cupcake, true),
    seed!("cupcake-2", "Vanilla Bean Cupcakes", "Light vanilla cupcakes with vanilla bean frosting (6 pack)", 1699, "/cupcakes/vanilla-cupcakes(stock).jpg", "vanilla", "celebration", Cupcake, true),
    seed!("cupcake-3", "Red Velvet Cupcakes", "Mini red velvet cupcakes with cream cheese frosting (6 pack)", 1999, "/cupcakes/red-velvet-cupcakes(stock).jpg", "specialty", "anniversary", Cupcake, true),
    seed!("cupcake-4", "Lemon Zest Cupcakes", "Tangy lemon cupcakes with lemon curd filling (6 pack)", 1799, "/cupcakes/lemon-cupcakes(stock).jpg", "fruit", "celebration", Cupcake, true),
    seed!("cupcake-5", "Birthday Sprinkle Cupcakes", "Funfetti cupcakes with rainbow sprinkles (12 pack)", 2499, "/cupcakes/birthday-cupcakes(stock).jpg", "vanilla", "birthday", Cupcake, true),
    seed!("cupcake-6", "Wedding Elegant Cupcakes", "White cupcakes with pearl decorations (24 pack)", 5499, "/cupcakes/wedding-cupcakes(stock).jpg", "vanilla", "wedding", Cupcake, true),
    seed!("cupcake-7", "Salted Caramel Cupcakes", "Vanilla cupcakes with salted caramel filling and frosting (6 pack)", 2099, "/cupcakes/caramel-cupcakes.jpg", "specialty", "celebration", Cupcake, true),
    seed!("cupcake-8", "Cookies & Cream Cupcakes", "Chocolate cupcakes with crushed Oreos and cream cheese frosting (6 pack)", 1999, "/cupcakes/cookies-cream-cupcakes.jpg", "chocolate", "birthday", Cupcake, true),
    seed!("slice-1", "Chocolate Fudge Slice", "Rich chocolate cake slice with layers of chocolate fudge frosting", 699, "https://images.unsplash.com/photo-1578985545062-69928b1d9587?w=400", "chocolate", "celebration", Slice, true),
    seed!("digital-1", "The Ultimate Cake Baking Guide", "A comprehensive e-book with 50+ cake recipes, decorating tips, and professional techniques. Perfect for beginners and experienced bakers alike.", 1499, "/digital/cake-cookbook(stock).jpg", "cookbook", "learning", Digital, true),
    seed!("digital-2", "Cupcake Creations Cookbook", "Master the art of cupcakes with 40 unique recipes, frosting techniques, and stunning decoration ideas. Includes video tutorial links.", 1299, "/digital/cupcake-cookbook(stock).jpg", "cookbook", "learning", Digital, true),
    seed!("digital-3", "Advanced Cake Decorating Masterclass", "Professional video course covering fondant work, sugar flowers, piping techniques, and multi-tier construction. 8 hours of content.", 2999, "/digital/decorating-course.jpg", "cookbook", "learning", Digital, true),
    seed!("digital-4", "Gluten-Free Baking Bible", "Complete guide to gluten-free cake and cupcake recipes with substitution charts and troubleshooting tips. 35+ recipes included.", 1699, "/digital/gluten-free-guide.jpg", "cookbook", "learning", Digital, true),
    seed!("digital-5", "Wedding Cake Planning Kit", "Downloadable PDF package with tier sizing guides, flavor pairing charts, design templates, and timeline checklists for wedding cakes.", 999, "/digital/wedding-planning-kit.jpg", "cookbook", "learning", Digital, true),
];

/// Products shipped with the storefront.
#[must_use]
pub fn seed_products() -> Vec<Product> {
    SEED_PRODUCTS
        .iter()
        .filter_map(|seed| {
            Some(Product {
                id: ProductId::new(seed.id).ok()?,
                name: seed.name.to_string(),
                description: seed.description.to_string(),
                price: Decimal::new(seed.price_minor, 2),
                image: seed.image.to_string(),
                category: seed.category.to_string(),
                occasion: seed.occasion.to_string(),
                product_type: seed.product_type,
                available: seed.available,
            })
        })
        .collect()
}

/// A catalog holding the seed products.
#[must_use]
pub fn seed_catalog() -> StaticCatalog {
    StaticCatalog::new(seed_products())
}
