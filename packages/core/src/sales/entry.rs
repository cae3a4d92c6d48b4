use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;
use vitrine_storage::EntityKind;
use vitrine_types::utils::fold_search_text;

use crate::entity::{Entity, deserialize_opt_id};

/// Sales channel a salesperson belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Channel {
    Consumo,
    Revenda,
    Varejo,
}

impl Channel {
    pub const ALL: [Channel; 3] = [Channel::Consumo, Channel::Revenda, Channel::Varejo];

    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Consumo => "Consumo",
            Channel::Revenda => "Revenda",
            Channel::Varejo => "Varejo",
        }
    }
}

impl Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Channel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match fold_search_text(s.trim()).as_str() {
            "consumo" => Ok(Channel::Consumo),
            "revenda" => Ok(Channel::Revenda),
            "varejo" => Ok(Channel::Varejo),
            _ => Err(format!("Unknown channel: {s}")),
        }
    }
}

/// Monthly goal row for one salesperson in one channel.
///
/// Amounts are taken as entered; negative values are accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserEntry {
    #[serde(
        default,
        deserialize_with = "deserialize_opt_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub code: String,
    pub sector: Channel,
    #[serde(alias = "monthlyGoal")]
    pub monthly_goal: f64,
    #[serde(default, alias = "realizedAmount")]
    pub realized_amount: f64,
    #[serde(default, alias = "openOrdersAmount")]
    pub open_orders_amount: f64,
}

impl Entity for UserEntry {
    const KIND: EntityKind = EntityKind::SalesGoals;

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn channel_parsing_is_lenient_serialization_is_exact() {
        assert_eq!("REVENDA".parse::<Channel>(), Ok(Channel::Revenda));
        assert_eq!(" consumo ".parse::<Channel>(), Ok(Channel::Consumo));
        assert!("atacado".parse::<Channel>().is_err());
        assert_eq!(serde_json::to_value(Channel::Varejo).unwrap(), json!("Varejo"));
    }

    #[test]
    fn accepts_camel_case_rows() {
        let entry: UserEntry = serde_json::from_value(json!({
            "id": 3,
            "name": "Ana",
            "code": "V01",
            "sector": "Consumo",
            "monthlyGoal": 1000.0,
            "realizedAmount": 250.0,
            "openOrdersAmount": 50.0
        }))
        .unwrap();
        assert_eq!(entry.id.as_deref(), Some("3"));
        assert_eq!(entry.monthly_goal, 1000.0);
        assert_eq!(entry.open_orders_amount, 50.0);
    }
}
