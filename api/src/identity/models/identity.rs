use diesel::prelude::*;
use serde_json::Value as JsonValue;

#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = crate::schema::identities)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Identity {
    pub id: i32,
    pub traits: JsonValue,
}

impl Identity {
    pub fn get_traits(&self) -> Traits {
        Traits::from(self.traits.clone())
    }
}

#[derive(serde::Serialize, serde::Deserialize, Clone, Debug, Default)]
pub struct Traits {
    pub name: Option<String>,
}

#[cfg(test)]
impl From<&Traits> for JsonValue {
    fn from(t: &Traits) -> Self {
        serde_json::to_value(t).unwrap_or_default()
    }
}

// Traits are stored as free form json, anything unexpected reads as empty
impl From<JsonValue> for Traits {
    fn from(value: JsonValue) -> Self {
        serde_json::from_value(value).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Could not read identity traits");
            Traits::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn traits_round_trip_through_json() {
        let traits = Traits {
            name: Some("Ada".into()),
        };
        let value = JsonValue::from(&traits);
        assert_eq!(Traits::from(value).name.as_deref(), Some("Ada"));
    }

    #[test]
    fn malformed_traits_read_as_empty() {
        let traits = Traits::from(serde_json::json!(["not", "an", "object"]));
        assert!(traits.name.is_none());
    }
}
