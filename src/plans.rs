use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum PlanId {
    Free,
    Weekly,
    Monthly,
    Annual,
}

impl PlanId {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanId::Free => "free",
            PlanId::Weekly => "weekly",
            PlanId::Monthly => "monthly",
            PlanId::Annual => "annual",
        }
    }

    pub fn plan(&self) -> &'static Plan {
        match self {
            PlanId::Free => &PLANS[0],
            PlanId::Weekly => &PLANS[1],
            PlanId::Monthly => &PLANS[2],
            PlanId::Annual => &PLANS[3],
        }
    }

    pub fn is_premium(&self) -> bool {
        *self != PlanId::Free
    }
}

impl fmt::Display for PlanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for PlanId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "free" => Ok(PlanId::Free),
            "weekly" => Ok(PlanId::Weekly),
            "monthly" => Ok(PlanId::Monthly),
            "annual" => Ok(PlanId::Annual),
            other => Err(format!("unknown plan '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Plan {
    pub id: PlanId,
    pub name: &'static str,
    pub display_name: &'static str,
    /// EUR.
    pub price: f32,
    pub price_display: &'static str,
    pub period: &'static str,
    pub badge: Option<&'static str>,
    pub discount: Option<&'static str>,
    pub features: &'static [&'static str],
    pub popular: bool,
}

const PREMIUM_FEATURES: &[&str] = &[
    "Recettes illimitees",
    "Sauve tes favoris",
    "Affiner resultat",
    "Regime perso",
    "Cuisine du monde",
    "Garde manger",
];

pub static PLANS: [Plan; 4] = [
    Plan {
        id: PlanId::Free,
        name: "Free",
        display_name: "Gratuit",
        price: 0.0,
        price_display: "0",
        period: "toujours",
        badge: None,
        discount: None,
        features: &["3 recettes par jour", "Recettes de base", "Garde-manger limite"],
        popular: false,
    },
    Plan {
        id: PlanId::Weekly,
        name: "Weekly",
        display_name: "Hebdo",
        price: 3.99,
        price_display: "3,99",
        period: "/ semaine",
        badge: None,
        discount: None,
        features: PREMIUM_FEATURES,
        popular: false,
    },
    Plan {
        id: PlanId::Monthly,
        name: "Monthly",
        display_name: "Mensuel",
        price: 6.99,
        price_display: "6,99",
        period: "/ mois",
        badge: None,
        discount: None,
        features: PREMIUM_FEATURES,
        popular: false,
    },
    Plan {
        id: PlanId::Annual,
        name: "Annual",
        display_name: "Annuel",
        price: 39.99,
        price_display: "39,99",
        period: "/ an",
        badge: Some("Meilleur"),
        discount: Some("-80%"),
        features: &[
            "Recettes illimitees",
            "Sauve tes favoris",
            "Affiner resultat",
            "Regime perso",
            "Cuisine du monde",
            "Garde manger",
            "Support prioritaire",
        ],
        popular: true,
    },
];

/// Paywall order.
pub const PREMIUM_PLANS: [PlanId; 3] = [PlanId::Weekly, PlanId::Annual, PlanId::Monthly];
