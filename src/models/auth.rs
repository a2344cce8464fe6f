//! Roles y actores autenticados
//!
//! Los roles se almacenan como texto en la base de datos y se convierten
//! a este enum cerrado en los bordes del sistema. Un valor desconocido se
//! rechaza en el borde, nunca llega a la lógica de negocio.

use serde::{Deserialize, Serialize};

/// Roles del sistema
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserRole {
    Customer,
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Customer => "customer",
            UserRole::Admin => "admin",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "customer" => Some(UserRole::Customer),
            "admin" => Some(UserRole::Admin),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip() {
        assert_eq!(UserRole::from_str("customer"), Some(UserRole::Customer));
        assert_eq!(UserRole::from_str("admin"), Some(UserRole::Admin));
        assert_eq!(UserRole::Customer.as_str(), "customer");
        assert_eq!(UserRole::Admin.as_str(), "admin");
    }

    #[test]
    fn test_unknown_role_is_rejected() {
        assert_eq!(UserRole::from_str("super_admin"), None);
        assert_eq!(UserRole::from_str("ADMIN"), None);
        assert_eq!(UserRole::from_str(""), None);
    }
}
