//! Role-based landing views

use domain::Role;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dashboard {
    Admin,
    Manager,
    Worker,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tab {
    Users,
    Materials,
    Sections,
    Analytics,
    Orders,
    Inventory,
    Schedule,
}

impl Dashboard {
    pub fn for_role(role: Role) -> Self {
        match role {
            Role::Admin => Dashboard::Admin,
            Role::Manager => Dashboard::Manager,
            Role::Worker => Dashboard::Worker,
        }
    }

    pub fn tabs(&self) -> &'static [Tab] {
        match self {
            Dashboard::Admin => &[Tab::Users, Tab::Materials, Tab::Sections, Tab::Analytics],
            Dashboard::Manager => &[Tab::Orders, Tab::Inventory, Tab::Schedule],
            Dashboard::Worker => &[Tab::Orders, Tab::Inventory, Tab::Schedule],
        }
    }

    /// Whether the dashboard polls the order list
    pub fn watches_orders(&self) -> bool {
        self.tabs().contains(&Tab::Orders)
    }
}
