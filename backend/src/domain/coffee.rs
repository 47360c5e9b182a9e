//! Coffee menu items sold by the café counter.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::sanitize::{
    FieldViolation, bounded_text, clean_number, clean_text, non_negative, required_text,
};

const NAME_MIN: usize = 3;
const NAME_MAX: usize = 255;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Coffee {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub price: i64,
    /// Cups per serving; at least one.
    pub quantity: i64,
    /// Path relative to the upload root.
    pub image: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn name(value: &str) -> Result<String, FieldViolation> {
    bounded_text("name", "coffee name", value, NAME_MIN, NAME_MAX)
}

fn quantity(value: i64) -> Result<i64, FieldViolation> {
    if value < 1 {
        return Err(FieldViolation::new("quantity", "Your quantity is invalid"));
    }
    Ok(value)
}

/// Validated input for a new menu item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoffeeDraft {
    pub name: String,
    pub description: String,
    pub price: i64,
    pub quantity: i64,
}

impl CoffeeDraft {
    /// A missing quantity means one cup.
    pub fn try_from_parts(
        name_raw: &str,
        description: &str,
        price: i64,
        quantity_raw: Option<i64>,
    ) -> Result<Self, FieldViolation> {
        Ok(Self {
            name: name(name_raw)?,
            description: required_text("description", "description", description)?,
            price: non_negative("price", "price", price)?,
            quantity: quantity(quantity_raw.unwrap_or(1))?,
        })
    }

    pub fn into_coffee(self, image: String, now: DateTime<Utc>) -> Coffee {
        Coffee {
            id: Uuid::new_v4(),
            name: self.name,
            description: self.description,
            price: self.price,
            quantity: self.quantity,
            image,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Sparse update of a menu item; zero numbers mean "unchanged".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoffeeChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<i64>,
    pub quantity: Option<i64>,
}

impl CoffeeChanges {
    pub fn try_from_parts(
        name_raw: Option<String>,
        description: Option<String>,
        price: Option<i64>,
        quantity_raw: Option<i64>,
    ) -> Result<Self, FieldViolation> {
        Ok(Self {
            name: clean_text(name_raw).map(|v| name(&v)).transpose()?,
            description: clean_text(description),
            price: clean_number(price)
                .map(|v| non_negative("price", "price", v))
                .transpose()?,
            quantity: clean_number(quantity_raw).map(quantity).transpose()?,
        })
    }

    pub fn apply(self, coffee: &mut Coffee, now: DateTime<Utc>) {
        if let Some(name) = self.name {
            coffee.name = name;
        }
        if let Some(description) = self.description {
            coffee.description = description;
        }
        if let Some(price) = self.price {
            coffee.price = price;
        }
        if let Some(quantity) = self.quantity {
            coffee.quantity = quantity;
        }
        coffee.updated_at = now;
    }
}
