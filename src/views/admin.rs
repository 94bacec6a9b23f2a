use tracing::info;

use super::{format_amount, status_badge};
use crate::api::{Product, ProductApi, ProductStatus};
use crate::cli::table::render_table;
use crate::error::{AppError, AppResult};
use crate::session::Session;

/// Every product request, with review actions. Mutations patch the local rows
/// instead of refetching.
#[derive(Debug, Default)]
pub struct AdminDashboard {
    products: Vec<Product>,
    error: Option<String>,
}

impl AdminDashboard {
    pub fn products(&self) -> &[Product] { &self.products }

    pub fn error(&self) -> Option<&str> { self.error.as_deref() }

    pub async fn load<A: ProductApi>(&mut self, api: &A, session: &Session) {
        match api.list_products(session.credential()).await {
            Ok(products) => {
                self.products = products;
                self.error = None;
            }
            Err(e) => {
                self.products.clear();
                self.error = Some(e.message().to_string());
            }
        }
    }

    fn position(&self, id: i64) -> AppResult<usize> {
        self.products
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| AppError::not_found("no_product".to_string(), format!("no request with id {}", id)))
    }

    /// Approve or reject a request. Only offered when the request is not already in
    /// that state.
    pub async fn set_status<A: ProductApi>(&mut self, api: &A, session: &Session, id: i64, status: ProductStatus) -> AppResult<()> {
        let idx = self.position(id)?;
        if self.products[idx].status == status {
            return Err(AppError::conflict(
                "unchanged_status".to_string(),
                format!("request {} is already {}", id, status.as_wire()),
            ));
        }
        api.set_status(session.credential(), id, status).await?;
        info!(target: "productdesk", id, status = status.as_wire(), "product status updated");
        self.products[idx].status = status;
        Ok(())
    }

    pub async fn delete<A: ProductApi>(&mut self, api: &A, session: &Session, id: i64) -> AppResult<()> {
        self.position(id)?;
        api.delete_product(session.credential(), id).await?;
        info!(target: "productdesk", id, "product request deleted");
        self.products.retain(|p| p.id != id);
        Ok(())
    }

    pub fn render(&self) -> String {
        let mut out = vec!["Admin dashboard: all product requests".to_string()];
        if let Some(e) = &self.error {
            out.push(format!("\x1b[31m{}\x1b[0m", e));
            return out.join("\n");
        }
        if self.products.is_empty() {
            out.push("There are no requests to review.".to_string());
            return out.join("\n");
        }
        let rows: Vec<Vec<String>> = self
            .products
            .iter()
            .map(|p| {
                vec![
                    p.id.to_string(),
                    p.owner_id.map(|u| format!("User #{}", u)).unwrap_or_else(|| "-".to_string()),
                    p.name.clone(),
                    p.kind.clone(),
                    format!("${}", format_amount(p.price)),
                    status_badge(p.status),
                    available_actions(p).join(" · "),
                ]
            })
            .collect();
        out.push(render_table(&["ID", "User", "Name", "Type", "Price (MXN)", "Status", "Actions"], &rows));
        out.join("\n")
    }
}

/// Commands the admin can run against `p`.
pub fn available_actions(p: &Product) -> Vec<String> {
    let mut actions = Vec::new();
    if p.status != ProductStatus::Approved { actions.push(format!("approve {}", p.id)); }
    if p.status != ProductStatus::Rejected { actions.push(format!("reject {}", p.id)); }
    actions.push(format!("delete {}", p.id));
    actions
}
