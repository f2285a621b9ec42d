use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Buyer,
    Seller,
    Admin,
}

impl Role {
    pub fn parse(s: &str) -> Option<Role> {
        match s {
            "buyer" => Some(Role::Buyer),
            "seller" => Some(Role::Seller),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Buyer => "buyer",
            Role::Seller => "seller",
            Role::Admin => "admin",
        }
    }
}

// Resolved identity of the caller, built once by the auth middleware and
// handed to every service call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthContext {
    pub uid: String,
    pub role: Role,
    pub verification_status: String,
}

impl AuthContext {
    pub fn is_verified_seller(&self) -> bool {
        self.role == Role::Seller && self.verification_status == "verified"
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}
