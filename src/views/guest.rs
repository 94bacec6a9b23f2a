use tracing::debug;

use super::{format_amount, status_badge};
use crate::api::{Product, ProductApi};
use crate::cli::table::render_table;
use crate::error::{AppError, AppResult};
use crate::session::Session;

/// Currency prices are stored in.
pub const BASE_CURRENCY: &str = "MXN";
/// Currency offered by the one-step toggle.
pub const ALT_CURRENCY: &str = "COP";

/// A product plus the price currently shown for it. Conversions only change the
/// display fields, never the product record.
#[derive(Debug, Clone, PartialEq)]
pub struct GuestRow {
    pub product: Product,
    pub shown_price: f64,
    pub shown_currency: String,
}

impl GuestRow {
    fn new(product: Product) -> Self {
        let shown_price = product.price;
        Self { product, shown_price, shown_currency: BASE_CURRENCY.to_string() }
    }

    /// Where the toggle goes next: away from the base currency, or back to it.
    pub fn toggle_target(&self) -> &'static str {
        if self.shown_currency == BASE_CURRENCY { ALT_CURRENCY } else { BASE_CURRENCY }
    }
}

#[derive(Debug, Default)]
pub struct GuestDashboard {
    rows: Vec<GuestRow>,
    error: Option<String>,
}

impl GuestDashboard {
    pub fn rows(&self) -> &[GuestRow] { &self.rows }

    pub fn error(&self) -> Option<&str> { self.error.as_deref() }

    /// Fetch the caller's own requests. Every row starts in the base currency.
    pub async fn load<A: ProductApi>(&mut self, api: &A, session: &Session) {
        match api.list_products(session.credential()).await {
            Ok(products) => {
                debug!(target: "productdesk", count = products.len(), "guest dashboard loaded");
                self.rows = products.into_iter().map(GuestRow::new).collect();
                self.error = None;
            }
            Err(e) => {
                self.rows.clear();
                self.error = Some(e.message().to_string());
            }
        }
    }

    /// Ask the backend to price product `id` in `target` (or the toggle target when
    /// `None`). A failed conversion leaves the row as it was.
    pub async fn convert<A: ProductApi>(&mut self, api: &A, session: &Session, id: i64, target: Option<&str>) -> AppResult<()> {
        let idx = self
            .rows
            .iter()
            .position(|r| r.product.id == id)
            .ok_or_else(|| AppError::not_found("no_product".to_string(), format!("no request with id {}", id)))?;
        let target = match target {
            Some(code) => normalize_currency(code)?,
            None => self.rows[idx].toggle_target().to_string(),
        };
        let conv = api.convert(session.credential(), id, &target).await?;
        let row = &mut self.rows[idx];
        row.shown_price = conv.amount;
        row.shown_currency = conv.currency;
        Ok(())
    }

    pub fn render(&self) -> String {
        let mut out = vec!["My product requests".to_string()];
        if let Some(e) = &self.error {
            out.push(format!("\x1b[31m{}\x1b[0m", e));
            return out.join("\n");
        }
        if self.rows.is_empty() {
            out.push("You have not submitted any request yet. Go Home (go /) to submit one.".to_string());
            return out.join("\n");
        }
        let rows: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|r| {
                vec![
                    r.product.id.to_string(),
                    r.product.name.clone(),
                    r.product.kind.clone(),
                    status_badge(r.product.status),
                    format!("${} {}", format_amount(r.shown_price), r.shown_currency),
                    if r.shown_currency == BASE_CURRENCY {
                        format!("convert {} (show in {})", r.product.id, ALT_CURRENCY)
                    } else {
                        format!("convert {} (back to {})", r.product.id, BASE_CURRENCY)
                    },
                ]
            })
            .collect();
        out.push(render_table(&["ID", "Name", "Type", "Status", "Price", "Action"], &rows));
        out.join("\n")
    }
}

fn normalize_currency(code: &str) -> AppResult<String> {
    let c = code.trim().to_ascii_uppercase();
    if c.len() == 3 && c.chars().all(|ch| ch.is_ascii_alphabetic()) {
        Ok(c)
    } else {
        Err(AppError::user("invalid_currency".to_string(), format!("'{}' is not a currency code", code.trim())))
    }
}
