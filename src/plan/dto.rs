use serde::{Deserialize, Deserializer, Serialize};

/// Body of `POST /api/diet-plan`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DietPlanRequest {
    /// Calorie limit exactly as typed into the form. JSON numbers are
    /// accepted too and kept in their textual form.
    #[serde(deserialize_with = "string_or_number")]
    pub calory_limit: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diet_type: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    Text(String),
    Number(serde_json::Number),
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match StringOrNumber::deserialize(deserializer)? {
        StringOrNumber::Text(s) => s,
        StringOrNumber::Number(n) => n.to_string(),
    })
}

/// Answer of `POST /api/diet-plan`.
///
/// A body carrying `error` is a failure even when `days` is present too.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DietPlanResponse {
    Failure { error: String },
    Plan { days: Vec<DayPlan> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayPlan {
    /// UNIX timestamp in seconds.
    pub day: i64,
    #[serde(default)]
    pub meals: Vec<Meal>,
    #[serde(default)]
    pub snacks: Vec<Meal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub macros: Option<Macros>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Shared by meals and snacks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meal {
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Macros {
    pub protein: f64,
    pub carbs: f64,
    pub fats: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calories: Option<f64>,
}
