//! Domain types decoded from MealDB responses.
//!
//! # Design
//! Both types deserialize straight from a single MealDB `meals` entry. The
//! wire field names (`idMeal`, `strMeal`, ...) stay inside the private raw
//! structs; the public types carry domain names. `DessertResult` enforces a
//! non-blank name at construction, so a malformed list entry fails to
//! deserialize and the list operation can drop it on its own.

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

/// Number of numbered ingredient/measure slots in a MealDB detail record.
pub const INGREDIENT_SLOTS: usize = 20;

/// Rejected summary: the name was empty or only whitespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("dessert name is blank")]
pub struct BlankName;

/// A dessert as it appears in the list, enough to display it and to fetch
/// its details.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawDessertResult")]
pub struct DessertResult {
    id: String,
    name: String,
    thumbnail_url: String,
}

impl DessertResult {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        thumbnail_url: impl Into<String>,
    ) -> Result<Self, BlankName> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(BlankName);
        }
        Ok(Self {
            id: id.into(),
            name,
            thumbnail_url: thumbnail_url.into(),
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn thumbnail_url(&self) -> &str {
        &self.thumbnail_url
    }
}

#[derive(Deserialize)]
struct RawDessertResult {
    #[serde(rename = "idMeal")]
    id: String,
    #[serde(rename = "strMeal")]
    name: String,
    #[serde(rename = "strMealThumb")]
    thumbnail_url: String,
}

impl TryFrom<RawDessertResult> for DessertResult {
    type Error = BlankName;

    fn try_from(raw: RawDessertResult) -> Result<Self, Self::Error> {
        Self::new(raw.id, raw.name, raw.thumbnail_url)
    }
}

/// Sort by name, case-sensitive, byte-wise.
pub fn sort_by_name(desserts: &mut [DessertResult]) {
    desserts.sort_by(|a, b| a.name.cmp(&b.name));
}

/// Full recipe for one dessert.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "RawDessertDetail")]
pub struct DessertDetail {
    pub id: String,
    pub name: String,
    pub thumbnail_url: String,
    /// In the order the recipe lists them.
    pub ingredients: Vec<Ingredient>,
    pub steps: Vec<String>,
}

/// One ingredient and how much of it, e.g. "Milk" / "200ml".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ingredient {
    pub name: String,
    pub amount: String,
}

impl Ingredient {
    pub fn new(name: impl Into<String>, amount: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            amount: amount.into(),
        }
    }

    /// Stable identity for list rendering.
    pub fn id(&self) -> String {
        format!("{}{}", self.name, self.amount)
    }
}

#[derive(Deserialize)]
struct RawDessertDetail {
    #[serde(rename = "idMeal")]
    id: String,
    #[serde(rename = "strMeal")]
    name: String,
    #[serde(rename = "strMealThumb")]
    thumbnail_url: String,
    #[serde(rename = "strInstructions")]
    instructions: String,
    #[serde(flatten)]
    slots: HashMap<String, Value>,
}

impl From<RawDessertDetail> for DessertDetail {
    fn from(raw: RawDessertDetail) -> Self {
        Self {
            ingredients: ingredients(&raw.slots),
            steps: split_steps(&raw.instructions),
            id: raw.id,
            name: raw.name,
            thumbnail_url: raw.thumbnail_url,
        }
    }
}

/// Split free-text instructions into steps at every run of line breaks.
pub fn split_steps(instructions: &str) -> Vec<String> {
    instructions
        .split(['\r', '\n'])
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .collect()
}

// A slot counts only when both halves are non-blank strings.
fn ingredients(slots: &HashMap<String, Value>) -> Vec<Ingredient> {
    (1..=INGREDIENT_SLOTS)
        .filter_map(|slot| {
            let name = slot_value(slots, &format!("strIngredient{slot}"))?;
            let amount = slot_value(slots, &format!("strMeasure{slot}"))?;
            Some(Ingredient::new(name, amount))
        })
        .collect()
}

fn slot_value<'a>(slots: &'a HashMap<String, Value>, key: &str) -> Option<&'a str> {
    slots
        .get(key)
        .and_then(Value::as_str)
        .filter(|value| !value.trim().is_empty())
}
