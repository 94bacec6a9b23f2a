//! Application state: the injected session store, the route table, the current view
//! and per-view state. Every user action first navigates (through the guard) to the
//! view that owns it, so a signed-out or wrong-role session never reaches a protected
//! action.

use std::sync::Arc;

use tracing::debug;

use crate::api::{ProductApi, ProductDraft, ProductStatus, RegisterRequest};
use crate::error::AppResult;
use crate::routing::{decide, Decision, Navigation, RouteTable, View};
use crate::session::{Session, SessionStore};
use crate::views::{AdminDashboard, GuestDashboard, HomeView, NavMenu, RegisterView, SignInView};

/// Whether an action ran, or its view was refused by the guard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Performed,
    Redirected(Navigation),
}

pub struct App<A: ProductApi> {
    api: A,
    session: Arc<SessionStore>,
    routes: RouteTable,
    current: View,
    last_redirect: Option<Navigation>,
    notice: Option<String>,
    home: HomeView,
    sign_in: SignInView,
    register: RegisterView,
    guest: GuestDashboard,
    admin: AdminDashboard,
}

impl<A: ProductApi> App<A> {
    pub fn new(api: A, session: Arc<SessionStore>) -> Self {
        Self {
            api,
            session,
            routes: RouteTable::standard(),
            current: View::Home,
            last_redirect: None,
            notice: None,
            home: HomeView::default(),
            sign_in: SignInView::default(),
            register: RegisterView::default(),
            guest: GuestDashboard::default(),
            admin: AdminDashboard::default(),
        }
    }

    pub fn current_view(&self) -> View { self.current }

    pub fn session(&self) -> Session { self.session.current() }

    pub fn routes(&self) -> &RouteTable { &self.routes }

    pub fn api(&self) -> &A { &self.api }

    /// Warning attached to the current view, e.g. a sign-out that did not reach disk.
    pub fn notice(&self) -> Option<&str> { self.notice.as_deref() }

    pub fn home(&self) -> &HomeView { &self.home }
    pub fn sign_in_view(&self) -> &SignInView { &self.sign_in }
    pub fn register_view(&self) -> &RegisterView { &self.register }
    pub fn guest(&self) -> &GuestDashboard { &self.guest }
    pub fn admin(&self) -> &AdminDashboard { &self.admin }

    /// Navigate to `path`. The guard runs against the session as it is now; on a
    /// redirect the requested view is not opened and its data is not fetched.
    pub async fn navigate(&mut self, path: &str) -> AppResult<Navigation> {
        let session = self.session.current();
        let nav = self.routes.resolve(path, &session)?;
        self.last_redirect = if nav.redirected() { Some(nav.clone()) } else { None };
        self.notice = None;
        self.open(nav.view, &session).await;
        Ok(nav)
    }

    /// Re-open the current view, refetching its data.
    pub async fn refresh(&mut self) -> AppResult<Navigation> {
        let path = self.current.path();
        self.navigate(path).await
    }

    // Opening a view starts it from a clean state, the way a page mounts.
    async fn open(&mut self, view: View, session: &Session) {
        debug!(target: "productdesk", view = view.path(), "open view");
        self.current = view;
        match view {
            View::Home => self.home = HomeView::default(),
            View::SignIn => self.sign_in = SignInView::default(),
            View::Register => self.register = RegisterView::default(),
            View::GuestDashboard => {
                self.guest = GuestDashboard::default();
                self.guest.load(&self.api, session).await;
            }
            View::AdminDashboard => {
                self.admin = AdminDashboard::default();
                self.admin.load(&self.api, session).await;
            }
        }
    }

    /// Make `view` current. Staying on the current view keeps its state (an action is
    /// not a navigation) but the guard is still consulted.
    async fn ensure_view(&mut self, view: View) -> AppResult<Outcome> {
        if self.current == view {
            let session = self.session.current();
            let allowed = self
                .routes
                .route(view.path())
                .map(|r| decide(&session, &r.policy) == Decision::Allow)
                .unwrap_or(false);
            if allowed {
                self.last_redirect = None;
                return Ok(Outcome::Performed);
            }
        }
        let nav = self.navigate(view.path()).await?;
        if nav.redirected() { Ok(Outcome::Redirected(nav)) } else { Ok(Outcome::Performed) }
    }

    /// Sign in from the sign-in view and move to the dashboard matching the role.
    pub async fn sign_in(&mut self, email: &str, password: &str) -> AppResult<Outcome> {
        if let Outcome::Redirected(nav) = self.ensure_view(View::SignIn).await? {
            return Ok(Outcome::Redirected(nav));
        }
        if let Some(next) = self.sign_in.submit(&self.api, &self.session, email, password).await {
            self.navigate(next.path()).await?;
        }
        Ok(Outcome::Performed)
    }

    /// Create an account; on success the sign-in view opens with a confirmation.
    pub async fn register(&mut self, req: &RegisterRequest) -> AppResult<Outcome> {
        if let Outcome::Redirected(nav) = self.ensure_view(View::Register).await? {
            return Ok(Outcome::Redirected(nav));
        }
        if self.register.submit(&self.api, req).await {
            self.navigate(View::SignIn.path()).await?;
            self.sign_in = SignInView::with_notice("account created, sign in to continue");
        }
        Ok(Outcome::Performed)
    }

    pub async fn submit(&mut self, draft: &ProductDraft) -> AppResult<Outcome> {
        if let Outcome::Redirected(nav) = self.ensure_view(View::Home).await? {
            return Ok(Outcome::Redirected(nav));
        }
        let session = self.session.current();
        self.home.submit(&self.api, &session, draft).await;
        Ok(Outcome::Performed)
    }

    pub async fn convert(&mut self, id: i64, currency: Option<&str>) -> AppResult<Outcome> {
        if let Outcome::Redirected(nav) = self.ensure_view(View::GuestDashboard).await? {
            return Ok(Outcome::Redirected(nav));
        }
        let session = self.session.current();
        self.guest.convert(&self.api, &session, id, currency).await?;
        Ok(Outcome::Performed)
    }

    pub async fn set_status(&mut self, id: i64, status: ProductStatus) -> AppResult<Outcome> {
        if let Outcome::Redirected(nav) = self.ensure_view(View::AdminDashboard).await? {
            return Ok(Outcome::Redirected(nav));
        }
        let session = self.session.current();
        self.admin.set_status(&self.api, &session, id, status).await?;
        Ok(Outcome::Performed)
    }

    pub async fn delete(&mut self, id: i64) -> AppResult<Outcome> {
        if let Outcome::Redirected(nav) = self.ensure_view(View::AdminDashboard).await? {
            return Ok(Outcome::Redirected(nav));
        }
        let session = self.session.current();
        self.admin.delete(&self.api, &session, id).await?;
        Ok(Outcome::Performed)
    }

    /// Clear the session and return to the default view.
    pub async fn sign_out(&mut self) -> AppResult<Navigation> {
        let cleared = self.session.logout();
        let nav = self.navigate(View::Home.path()).await?;
        if !cleared {
            self.notice = Some("signed out here, but the saved session could not be removed; it will be restored on the next start".to_string());
        }
        Ok(nav)
    }

    /// Menu, redirect notice (if the last navigation was refused) and the current view.
    pub fn render(&self) -> String {
        let session = self.session.current();
        let mut out = vec![NavMenu::for_session(&session).render(), String::new()];
        if let Some(nav) = &self.last_redirect {
            let why = match nav.decision {
                Decision::RedirectToSignIn => "sign in required",
                _ => "not available for your role",
            };
            out.push(format!("\x1b[33m{}: {}, showing {}\x1b[0m", nav.requested, why, nav.view.path()));
        }
        if let Some(n) = &self.notice {
            out.push(format!("\x1b[33m{}\x1b[0m", n));
        }
        out.push(format!("== {} ==", self.current.title()));
        let body = match self.current {
            View::Home => self.home.render(&session),
            View::SignIn => self.sign_in.render(),
            View::Register => self.register.render(),
            View::GuestDashboard => self.guest.render(),
            View::AdminDashboard => self.admin.render(),
        };
        out.push(body);
        out.join("\n")
    }
}
