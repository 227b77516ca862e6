//! Product Validation
//!
//! Every rule runs and every failure is reported, so a form can show all
//! problems at once.

use kernel::error::field::{FieldError, FieldErrors};
use rust_decimal::Decimal;

use crate::domain::entity::product::{ProductAttributes, ProductDraft};

/// Largest value a `NUMERIC(10,2)` column holds
const MAX_AMOUNT: Decimal = Decimal::from_parts(0x540B_E3FF, 0x2, 0, false, 2);

/// 0.01
const MIN_PRICE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Validate a create request and turn it into attributes
pub fn build_attributes(draft: ProductDraft) -> Result<ProductAttributes, Vec<FieldError>> {
    let mut errors = FieldErrors::new();

    let name = required_text(&mut errors, "name", draft.name, "Product name is required");
    let description = required_text(
        &mut errors,
        "description",
        draft.description,
        "Product description is required",
    );
    let brand = required_text(&mut errors, "brand", draft.brand, "Brand is required");
    let model = required_text(&mut errors, "model", draft.model, "Model is required");

    if draft.price.is_none() {
        errors.push("price", "Price is required");
    }
    if draft.category_id.is_none() {
        errors.push("categoryId", "Category is required");
    }

    let images = draft.images.unwrap_or_default();
    let stock = draft.stock.unwrap_or(0);
    check_numbers(
        &mut errors,
        draft.price,
        stock,
        draft.warranty,
        [draft.weight, draft.width, draft.height, draft.depth],
    );
    check_images(&mut errors, &images);

    match (name, description, brand, model, draft.price, draft.category_id) {
        (Some(name), Some(description), Some(brand), Some(model), Some(price), Some(category_id))
            if errors.is_empty() =>
        {
            Ok(ProductAttributes {
                name,
                description,
                price,
                stock,
                category_id,
                brand,
                model,
                warranty: draft.warranty,
                is_new: draft.is_new.unwrap_or(true),
                weight: draft.weight,
                width: draft.width,
                height: draft.height,
                depth: draft.depth,
                images,
                features: draft.features.unwrap_or_default(),
            })
        }
        _ => Err(errors.into_vec()),
    }
}

/// Re-check attributes after a partial update
pub fn validate_attributes(attrs: &ProductAttributes) -> Result<(), Vec<FieldError>> {
    let mut errors = FieldErrors::new();

    errors.check(attrs.name.trim().is_empty(), "name", "Product name is required");
    errors.check(
        attrs.description.trim().is_empty(),
        "description",
        "Product description is required",
    );
    errors.check(attrs.brand.trim().is_empty(), "brand", "Brand is required");
    errors.check(attrs.model.trim().is_empty(), "model", "Model is required");
    check_numbers(
        &mut errors,
        Some(attrs.price),
        attrs.stock,
        attrs.warranty,
        [attrs.weight, attrs.width, attrs.height, attrs.depth],
    );
    check_images(&mut errors, &attrs.images);

    errors.finish()
}

fn required_text(
    errors: &mut FieldErrors,
    field: &str,
    value: Option<String>,
    message: &str,
) -> Option<String> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Some(v.to_string()),
        _ => {
            errors.push(field, message);
            None
        }
    }
}

fn check_numbers(
    errors: &mut FieldErrors,
    price: Option<Decimal>,
    stock: i32,
    warranty: Option<i32>,
    dimensions: [Option<Decimal>; 4],
) {
    if let Some(price) = price {
        errors.check(price < MIN_PRICE, "price", "Price must be at least 0.01");
        errors.check(price > MAX_AMOUNT, "price", "Price is too large");
    }
    errors.check(stock < 0, "stock", "Stock cannot be negative");
    errors.check(
        warranty.is_some_and(|w| w < 0),
        "warranty",
        "Warranty cannot be negative",
    );

    let labels = [
        ("weight", "Weight cannot be negative"),
        ("width", "Width cannot be negative"),
        ("height", "Height cannot be negative"),
        ("depth", "Depth cannot be negative"),
    ];
    for (value, (field, message)) in dimensions.into_iter().zip(labels) {
        errors.check(value.is_some_and(|v| v < Decimal::ZERO), field, message);
    }
}

fn check_images(errors: &mut FieldErrors, images: &[String]) {
    if images.is_empty() {
        errors.push("images", "The product needs at least one image");
    } else if images.iter().any(|i| i.trim().is_empty()) {
        errors.push("images", "Image references cannot be blank");
    }
}
