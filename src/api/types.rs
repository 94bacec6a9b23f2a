use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{AppError, AppResult};

/// Review state of a product request. Unknown labels from the backend read as pending.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ProductStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl ProductStatus {
    pub fn as_wire(self) -> &'static str {
        match self {
            ProductStatus::Pending => "pendiente",
            ProductStatus::Approved => "aprobado",
            ProductStatus::Rejected => "rechazado",
        }
    }

    pub fn from_wire(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "aprobado" => ProductStatus::Approved,
            "rechazado" => ProductStatus::Rejected,
            _ => ProductStatus::Pending,
        }
    }
}

impl Serialize for ProductStatus {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> { s.serialize_str(self.as_wire()) }
}

impl<'de> Deserialize<'de> for ProductStatus {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(d)?;
        Ok(raw.as_deref().map(ProductStatus::from_wire).unwrap_or_default())
    }
}

/// Money amounts arrive either as JSON numbers or as numeric strings (e.g. `"199.90"`).
fn de_amount<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Amount {
        Num(f64),
        Text(String),
    }
    match Amount::deserialize(d)? {
        Amount::Num(n) => Ok(n),
        Amount::Text(s) => s.trim().parse::<f64>().map_err(serde::de::Error::custom),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    #[serde(rename = "usuario_id", default)]
    pub owner_id: Option<i64>,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "descripcion", default)]
    pub description: Option<String>,
    #[serde(rename = "tipo", default)]
    pub kind: String,
    #[serde(rename = "disponibilidad", default)]
    pub available: Option<bool>,
    #[serde(rename = "precio", deserialize_with = "de_amount")]
    pub price: f64,
    #[serde(rename = "estado", default)]
    pub status: ProductStatus,
}

/// Submit form contents.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductDraft {
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "descripcion")]
    pub description: String,
    #[serde(rename = "tipo")]
    pub kind: String,
    #[serde(rename = "disponibilidad")]
    pub available: bool,
    #[serde(rename = "precio")]
    pub price: f64,
}

impl Default for ProductDraft {
    fn default() -> Self {
        Self { name: String::new(), description: String::new(), kind: String::new(), available: true, price: 0.0 }
    }
}

impl ProductDraft {
    /// Same checks a browser form would apply: every text field required,
    /// price a finite non-negative number.
    pub fn validate(&self) -> AppResult<()> {
        for (field, value) in [("name", &self.name), ("description", &self.description), ("type", &self.kind)] {
            if value.trim().is_empty() {
                return Err(AppError::user("missing_field".to_string(), format!("{} is required", field)));
            }
        }
        if !self.price.is_finite() || self.price < 0.0 {
            return Err(AppError::user("invalid_price", "price must be a number greater than or equal to 0"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    #[serde(rename = "rol")]
    pub role: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct StatusUpdate {
    #[serde(rename = "estado")]
    pub status: ProductStatus,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Conversion {
    #[serde(rename = "precio_convertido", deserialize_with = "de_amount")]
    pub amount: f64,
    #[serde(rename = "moneda_destino")]
    pub currency: String,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn product_accepts_string_prices_and_unknown_status() {
        let p: Product = serde_json::from_value(json!({
            "id": 7, "usuario_id": 3, "nombre": "Mouse", "descripcion": null,
            "tipo": "hardware", "disponibilidad": true, "precio": "199.90", "estado": "en_revision"
        }))
        .unwrap();
        assert_eq!(p.price, 199.90);
        assert_eq!(p.status, ProductStatus::Pending);
        assert_eq!(p.owner_id, Some(3));
        assert!(p.description.is_none());
    }

    #[test]
    fn product_numeric_price_and_known_status() {
        let p: Product = serde_json::from_value(json!({
            "id": 1, "nombre": "Desk", "tipo": "office", "precio": 1500, "estado": "aprobado"
        }))
        .unwrap();
        assert_eq!(p.price, 1500.0);
        assert_eq!(p.status, ProductStatus::Approved);
        assert_eq!(p.owner_id, None);
    }

    #[test]
    fn draft_serializes_with_wire_names() {
        let d = ProductDraft { name: "Chair".into(), description: "ergonomic".into(), kind: "office".into(), available: false, price: 12.5 };
        let v = serde_json::to_value(&d).unwrap();
        assert_eq!(v, json!({"nombre": "Chair", "descripcion": "ergonomic", "tipo": "office", "disponibilidad": false, "precio": 12.5}));
    }

    #[test]
    fn draft_validation() {
        let mut d = ProductDraft { name: "Chair".into(), description: "x".into(), kind: "office".into(), available: true, price: 1.0 };
        assert!(d.validate().is_ok());
        d.kind = "  ".into();
        assert_eq!(d.validate().unwrap_err().code_str(), "missing_field");
        d.kind = "office".into();
        d.price = -1.0;
        assert_eq!(d.validate().unwrap_err().code_str(), "invalid_price");
        d.price = f64::NAN;
        assert!(d.validate().is_err());
    }

    #[test]
    fn status_update_wire_shape() {
        let v = serde_json::to_value(StatusUpdate { status: ProductStatus::Rejected }).unwrap();
        assert_eq!(v, json!({"estado": "rechazado"}));
    }
}
