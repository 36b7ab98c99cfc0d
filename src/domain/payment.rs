use super::money::Amount;
use serde::{Deserialize, Serialize};

/// A payment from a user to a merchant.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: String,
    pub username: String,
    pub merchant_id: String,
    pub amount: Amount,
}
