use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tokio::net::TcpListener;

pub const API_PREFIX: &str = "/api/json/v1/1";

/// One recipe as the service stores it.
#[derive(Clone, Debug)]
pub struct Meal {
    pub id: String,
    pub name: String,
    pub category: String,
    pub thumbnail: String,
    pub instructions: String,
    /// (ingredient, measure) pairs, at most 20.
    pub ingredients: Vec<(String, String)>,
}

impl Meal {
    fn summary_json(&self) -> Value {
        json!({
            "strMeal": self.name,
            "strMealThumb": self.thumbnail,
            "idMeal": self.id,
        })
    }

    // Unused slots are sent as empty strings, like the real service.
    fn detail_json(&self) -> Value {
        let mut fields = Map::new();
        fields.insert("idMeal".into(), json!(self.id));
        fields.insert("strMeal".into(), json!(self.name));
        fields.insert("strCategory".into(), json!(self.category));
        fields.insert("strInstructions".into(), json!(self.instructions));
        fields.insert("strMealThumb".into(), json!(self.thumbnail));
        for slot in 1..=20 {
            let (ingredient, measure) = self
                .ingredients
                .get(slot - 1)
                .map(|(i, m)| (i.as_str(), m.as_str()))
                .unwrap_or(("", ""));
            fields.insert(format!("strIngredient{slot}"), json!(ingredient));
            fields.insert(format!("strMeasure{slot}"), json!(measure));
        }
        Value::Object(fields)
    }
}

#[derive(Deserialize)]
pub struct FilterParams {
    pub c: Option<String>,
}

#[derive(Deserialize)]
pub struct LookupParams {
    pub i: Option<String>,
}

/// Read-only meal table keyed by id, built once per router.
pub type Db = Arc<HashMap<String, Meal>>;

pub fn app() -> Router {
    app_with(seed_meals())
}

pub fn app_with(meals: Vec<Meal>) -> Router {
    let db: Db = Arc::new(meals.into_iter().map(|meal| (meal.id.clone(), meal)).collect());
    Router::new()
        .route(&format!("{API_PREFIX}/filter.php"), get(filter_meals))
        .route(&format!("{API_PREFIX}/lookup.php"), get(lookup_meal))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn filter_meals(State(db): State<Db>, Query(params): Query<FilterParams>) -> Json<Value> {
    let category = params.c.unwrap_or_default();
    let entries: Vec<Value> = db
        .values()
        .filter(|meal| meal.category == category)
        .map(Meal::summary_json)
        .collect();
    tracing::debug!(%category, count = entries.len(), "filter");
    Json(envelope(entries))
}

async fn lookup_meal(State(db): State<Db>, Query(params): Query<LookupParams>) -> Json<Value> {
    let entries: Vec<Value> = params
        .i
        .as_deref()
        .and_then(|id| db.get(id))
        .map(Meal::detail_json)
        .into_iter()
        .collect();
    tracing::debug!(id = ?params.i, found = !entries.is_empty(), "lookup");
    Json(envelope(entries))
}

/// No matches are reported as `"meals": null`, not an empty array.
fn envelope(entries: Vec<Value>) -> Value {
    if entries.is_empty() {
        json!({ "meals": null })
    } else {
        json!({ "meals": entries })
    }
}

fn meal(
    id: &str,
    name: &str,
    category: &str,
    thumbnail: &str,
    instructions: &str,
    ingredients: &[(&str, &str)],
) -> Meal {
    Meal {
        id: id.to_string(),
        name: name.to_string(),
        category: category.to_string(),
        thumbnail: format!("https://www.themealdb.com/images/media/meals/{thumbnail}.jpg"),
        instructions: instructions.to_string(),
        ingredients: ingredients
            .iter()
            .map(|(i, m)| (i.to_string(), m.to_string()))
            .collect(),
    }
}

/// A small catalogue: four desserts and one main course.
pub fn seed_meals() -> Vec<Meal> {
    vec![
        meal(
            "53049",
            "Apam balik",
            "Dessert",
            "adxcbq1619787919",
            "Mix milk, oil and egg together. Sift flour, baking powder and salt into the mixture.\r\n\r\nHeat a flat pan and spread the batter thinly.\r\nAdd the filling, fold and serve.",
            &[("Milk", "200ml"), ("Oil", "60ml"), ("Eggs", "2"), ("Flour", "1600g"), ("Sugar", "45g")],
        ),
        meal(
            "52767",
            "Bakewell tart",
            "Dessert",
            "wyrqqq1468233628",
            "To make the pastry, measure the flour into a bowl and rub in the butter.\r\nAdd the water and mix to a firm dough.\r\n\r\nBake for 35 minutes.",
            &[("plain flour", "175g/6oz"), ("chilled butter", "75g/2½oz"), ("cold water", "2-3 tbsp"), ("raspberry jam", "1 tbsp")],
        ),
        meal(
            "52855",
            "Banana Pancakes",
            "Dessert",
            "sywswr1511383814",
            "In a bowl, mash the banana with a fork until it resembles a thick puree.\nStir in the eggs, baking powder and vanilla.\nFry in butter until golden.",
            &[("Banana", "1 large"), ("Eggs", "2 medium"), ("Baking Powder", "pinch"), ("Vanilla Extract", "spinkling")],
        ),
        meal(
            "52776",
            "Chocolate Gateau",
            "Dessert",
            "tqtywx1468317395",
            "Preheat the oven to 180°C.\r\nMelt the chocolate and butter together.\r\nFold in the eggs and sugar, then bake for 25 minutes.",
            &[("plain chocolate", "250g"), ("butter", "175g"), ("milk", "2 tablespoons"), ("eggs", "5"), ("castor sugar", "175g")],
        ),
        meal(
            "52803",
            "Beef Wellington",
            "Beef",
            "vvpprx1487325699",
            "Sear the beef on all sides.\r\nWrap in mushroom duxelles and pastry, then bake.",
            &[("beef fillet", "750g"), ("puff pastry", "500g")],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_uses_wire_names() {
        let meal = &seed_meals()[0];
        let json = meal.summary_json();
        assert_eq!(json["idMeal"], "53049");
        assert_eq!(json["strMeal"], "Apam balik");
        assert!(json["strMealThumb"].as_str().unwrap().ends_with(".jpg"));
        assert!(json.get("strInstructions").is_none());
    }

    #[test]
    fn detail_fills_all_twenty_slots() {
        let meal = &seed_meals()[0];
        let json = meal.detail_json();
        assert_eq!(json["strIngredient1"], "Milk");
        assert_eq!(json["strMeasure1"], "200ml");
        assert_eq!(json["strIngredient6"], "");
        assert_eq!(json["strMeasure20"], "");
        assert!(json.get("strIngredient21").is_none());
    }

    #[test]
    fn empty_envelope_is_null() {
        assert_eq!(envelope(Vec::new()), json!({ "meals": null }));
        assert_eq!(envelope(vec![json!(1)]), json!({ "meals": [1] }));
    }

    #[test]
    fn seed_has_one_non_dessert() {
        let meals = seed_meals();
        assert_eq!(meals.iter().filter(|m| m.category == "Dessert").count(), 4);
        assert_eq!(meals.len(), 5);
    }
}
