use tracing::info;

use super::Flash;
use crate::api::{ProductApi, ProductDraft};
use crate::session::Session;

const WELCOME: &str = "Welcome to the product request desk.\n\
Submit requests for new products with the form below. Once submitted, an administrator \
reviews each request and approves or rejects it.";

/// Landing page with the submit form.
#[derive(Debug, Default)]
pub struct HomeView {
    flash: Option<Flash>,
}

impl HomeView {
    pub fn flash(&self) -> Option<&Flash> { self.flash.as_ref() }

    /// Validate and post a draft. The outcome is shown as a flash message.
    /// Returns true when the backend accepted the request.
    pub async fn submit<A: ProductApi>(&mut self, api: &A, session: &Session, draft: &ProductDraft) -> bool {
        self.flash = None;
        let Some(credential) = session.credential() else {
            self.flash = Some(Flash::error("sign in to submit a request"));
            return false;
        };
        if let Err(e) = draft.validate() {
            self.flash = Some(Flash::error(e.message()));
            return false;
        }
        match api.create_product(Some(credential), draft).await {
            Ok(()) => {
                info!(target: "productdesk", name = %draft.name, "product request submitted");
                self.flash = Some(Flash::success("request created, you can follow it from your dashboard"));
                true
            }
            Err(e) => {
                self.flash = Some(Flash::error(e.message()));
                false
            }
        }
    }

    pub fn render(&self, session: &Session) -> String {
        let mut out = vec![WELCOME.to_string(), String::new()];
        if !session.is_authenticated() {
            out.push("You must sign in (go /login) before you can submit a request.".to_string());
            return out.join("\n");
        }
        if let Some(f) = &self.flash { out.push(f.render()); }
        out.push("New request:".to_string());
        out.push("  submit name=<text> type=<text> price=<number> available=<yes|no> description=<text>".to_string());
        out.push("  submit            (prompts for each field)".to_string());
        out.join("\n")
    }
}
