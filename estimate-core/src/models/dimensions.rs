use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Project measurements in centimetres. Informational only; never priced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub length: Option<Decimal>,
    pub width: Option<Decimal>,
    pub height: Option<Decimal>,
}
