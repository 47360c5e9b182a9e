//! Store products.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::sanitize::{
    FieldViolation, bounded_text, clean_list, clean_number, clean_text, non_negative,
    required_text, tag_list,
};
use super::UserId;

const TITLE_MIN: usize = 3;
const TITLE_MAX: usize = 255;
/// Maximum number of images per product.
pub const MAX_IMAGES: usize = 10;
/// Maximum number of tags per product.
pub const MAX_TAGS: usize = 20;

/// Whether a product ships physically.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductKind {
    Physical,
    Virtual,
}

impl ProductKind {
    /// Wire representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Physical => "physical",
            Self::Virtual => "virtual",
        }
    }
}

impl fmt::Display for ProductKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProductKind {
    type Err = FieldViolation;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "physical" => Ok(Self::Physical),
            "virtual" => Ok(Self::Virtual),
            _ => Err(FieldViolation::new("type", "Your product type is invalid")),
        }
    }
}

/// Physical characteristics. Dimensions default to zero.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductFeatures {
    pub colors: Vec<String>,
    pub width: f64,
    pub height: f64,
    pub length: f64,
    pub weight: f64,
}

/// A stored product.
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub id: Uuid,
    pub title: String,
    pub short_text: String,
    pub text: String,
    /// Paths relative to the upload root.
    pub images: Vec<String>,
    pub tags: Vec<String>,
    pub category: Uuid,
    pub price: i64,
    pub discount: i64,
    pub count: i64,
    pub kind: ProductKind,
    pub supplier: UserId,
    pub features: ProductFeatures,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Case-insensitive match over title, short text and text.
    pub fn matches_search(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        [&self.title, &self.short_text, &self.text]
            .into_iter()
            .any(|field| field.to_lowercase().contains(&needle))
    }
}

/// Raw numeric and feature inputs shared by drafts and changes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureInput {
    pub colors: Option<Vec<String>>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub length: Option<f64>,
    pub weight: Option<f64>,
}

impl FeatureInput {
    fn cleaned(self) -> Result<Self, FieldViolation> {
        let checked = |field: &'static str, value: Option<f64>| -> Result<Option<f64>, FieldViolation> {
            match clean_number(value) {
                Some(v) if !v.is_finite() || v < 0.0 => {
                    Err(FieldViolation::new(field, format!("Your {field} is invalid")))
                }
                other => Ok(other),
            }
        };
        Ok(Self {
            colors: clean_list(self.colors),
            width: checked("width", self.width)?,
            height: checked("height", self.height)?,
            length: checked("length", self.length)?,
            weight: checked("weight", self.weight)?,
        })
    }

    fn merge_into(self, features: &mut ProductFeatures) {
        if let Some(colors) = self.colors {
            features.colors = colors;
        }
        if let Some(width) = self.width {
            features.width = width;
        }
        if let Some(height) = self.height {
            features.height = height;
        }
        if let Some(length) = self.length {
            features.length = length;
        }
        if let Some(weight) = self.weight {
            features.weight = weight;
        }
    }
}

/// Validated input for a new product.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductDraft {
    pub title: String,
    pub short_text: String,
    pub text: String,
    pub tags: Vec<String>,
    pub category: Uuid,
    pub price: i64,
    pub discount: i64,
    pub count: i64,
    pub kind: ProductKind,
    pub features: ProductFeatures,
}

/// Raw fields of a new product.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductDraftInput {
    pub title: String,
    pub short_text: String,
    pub text: String,
    pub tags: Vec<String>,
    pub category: Uuid,
    pub price: i64,
    pub discount: i64,
    pub count: i64,
    pub kind: String,
    pub features: FeatureInput,
}

impl ProductDraft {
    /// Validate `input`.
    pub fn try_from_input(input: ProductDraftInput) -> Result<Self, FieldViolation> {
        let mut features = ProductFeatures::default();
        input.features.cleaned()?.merge_into(&mut features);
        Ok(Self {
            title: bounded_text("title", "title", &input.title, TITLE_MIN, TITLE_MAX)?,
            short_text: required_text("shortText", "short text", &input.short_text)?,
            text: required_text("text", "text", &input.text)?,
            tags: tag_list(input.tags, MAX_TAGS)?,
            category: input.category,
            price: non_negative("price", "price", input.price)?,
            discount: non_negative("discount", "discount", input.discount)?,
            count: non_negative("count", "count", input.count)?,
            kind: input.kind.parse()?,
            features,
        })
    }

    /// Materialise the product.
    pub fn into_product(self, supplier: UserId, images: Vec<String>, now: DateTime<Utc>) -> Product {
        Product {
            id: Uuid::new_v4(),
            title: self.title,
            short_text: self.short_text,
            text: self.text,
            images,
            tags: self.tags,
            category: self.category,
            price: self.price,
            discount: self.discount,
            count: self.count,
            kind: self.kind,
            supplier,
            features: self.features,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Raw sparse update of a product.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductChangesInput {
    pub title: Option<String>,
    pub short_text: Option<String>,
    pub text: Option<String>,
    pub tags: Option<Vec<String>>,
    pub category: Option<Uuid>,
    pub price: Option<i64>,
    pub discount: Option<i64>,
    pub count: Option<i64>,
    pub kind: Option<String>,
    pub features: FeatureInput,
}

/// Validated sparse update. The supplier cannot be changed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductChanges {
    title: Option<String>,
    short_text: Option<String>,
    text: Option<String>,
    tags: Option<Vec<String>>,
    category: Option<Uuid>,
    price: Option<i64>,
    discount: Option<i64>,
    count: Option<i64>,
    kind: Option<ProductKind>,
    features: FeatureInput,
}

impl ProductChanges {
    /// Validate present fields; nullish values are dropped.
    pub fn try_from_input(input: ProductChangesInput) -> Result<Self, FieldViolation> {
        Ok(Self {
            title: clean_text(input.title)
                .map(|v| bounded_text("title", "title", &v, TITLE_MIN, TITLE_MAX))
                .transpose()?,
            short_text: clean_text(input.short_text),
            text: clean_text(input.text),
            tags: clean_list(input.tags)
                .map(|t| tag_list(t, MAX_TAGS))
                .transpose()?,
            category: input.category.filter(|id| !id.is_nil()),
            price: clean_number(input.price)
                .map(|v| non_negative("price", "price", v))
                .transpose()?,
            discount: clean_number(input.discount)
                .map(|v| non_negative("discount", "discount", v))
                .transpose()?,
            count: clean_number(input.count)
                .map(|v| non_negative("count", "count", v))
                .transpose()?,
            kind: clean_text(input.kind).map(|k| k.parse()).transpose()?,
            features: input.features.cleaned()?,
        })
    }

    /// Category the update moves to, if any.
    pub fn category(&self) -> Option<Uuid> {
        self.category
    }

    /// Apply onto `product`, merging features into the existing set.
    pub fn apply(self, product: &mut Product, now: DateTime<Utc>) {
        if let Some(title) = self.title {
            product.title = title;
        }
        if let Some(short_text) = self.short_text {
            product.short_text = short_text;
        }
        if let Some(text) = self.text {
            product.text = text;
        }
        if let Some(tags) = self.tags {
            product.tags = tags;
        }
        if let Some(category) = self.category {
            product.category = category;
        }
        if let Some(price) = self.price {
            product.price = price;
        }
        if let Some(discount) = self.discount {
            product.discount = discount;
        }
        if let Some(count) = self.count {
            product.count = count;
        }
        if let Some(kind) = self.kind {
            product.kind = kind;
        }
        self.features.merge_into(&mut product.features);
        product.updated_at = now;
    }
}

/// Reject image sets above [`MAX_IMAGES`].
pub fn check_image_count(count: usize) -> Result<(), FieldViolation> {
    if count > MAX_IMAGES {
        return Err(FieldViolation::new(
            "images",
            format!("At most {MAX_IMAGES} images are allowed"),
        ));
    }
    Ok(())
}
