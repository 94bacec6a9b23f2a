//! End-to-end flows through `App` and the shell commands, against an in-process
//! backend double.

use std::sync::Arc;

use anyhow::Result;
use parking_lot::Mutex;
use tempfile::tempdir;

use productdesk::api::{Conversion, LoginResponse, Product, ProductApi, ProductDraft, ProductStatus, RegisterRequest};
use productdesk::app::{App, Outcome};
use productdesk::cli::commands::{execute, parse_command, Step};
use productdesk::error::{AppError, AppResult};
use productdesk::routing::{Decision, View};
use productdesk::session::{Credential, DurableStorage, FileStorage, MemoryStorage, Session, SessionStore, StorageError};
use productdesk::views::home::HomeView;

const COP_RATE: f64 = 220.0;

struct Account {
    id: i64,
    email: String,
    password: String,
    role: String,
}

/// Backend double: accounts, products scoped by owner, and a call log.
#[derive(Default)]
struct FakeApi {
    accounts: Mutex<Vec<Account>>,
    products: Mutex<Vec<Product>>,
    calls: Mutex<Vec<String>>,
}

impl FakeApi {
    fn seeded() -> Self {
        let api = FakeApi::default();
        api.accounts.lock().push(Account { id: 1, email: "admin@example.com".into(), password: "root".into(), role: "admin".into() });
        api.accounts.lock().push(Account { id: 2, email: "ana@example.com".into(), password: "pw".into(), role: "guest".into() });
        api.accounts.lock().push(Account { id: 3, email: "luis@example.com".into(), password: "pw".into(), role: "guest".into() });
        for (id, owner, name, price) in [(10, 2, "Desk", 1000.0), (11, 3, "Chair", 500.0), (12, 2, "Lamp", 80.0)] {
            api.products.lock().push(Product {
                id,
                owner_id: Some(owner),
                name: name.into(),
                description: Some(format!("{} for the office", name)),
                kind: "office".into(),
                available: Some(true),
                price,
                status: ProductStatus::Pending,
            });
        }
        api
    }

    fn log(&self, call: &str) { self.calls.lock().push(call.to_string()); }

    fn count(&self, call: &str) -> usize { self.calls.lock().iter().filter(|c| c.as_str() == call).count() }

    fn caller(&self, auth: Option<&Credential>) -> AppResult<(i64, String)> {
        let token = auth.ok_or_else(|| AppError::from_status(401, "Token requerido"))?;
        let accounts = self.accounts.lock();
        accounts
            .iter()
            .find(|a| format!("tok-{}", a.id) == token.expose())
            .map(|a| (a.id, a.role.clone()))
            .ok_or_else(|| AppError::from_status(401, "Token inválido"))
    }

    fn require_admin(&self, auth: Option<&Credential>) -> AppResult<()> {
        let (_, role) = self.caller(auth)?;
        if role != "admin" { return Err(AppError::from_status(403, "Acceso denegado")); }
        Ok(())
    }
}

impl ProductApi for FakeApi {
    async fn sign_in(&self, email: &str, password: &str) -> AppResult<LoginResponse> {
        self.log("sign_in");
        let accounts = self.accounts.lock();
        let a = accounts
            .iter()
            .find(|a| a.email == email && a.password == password)
            .ok_or_else(|| AppError::from_status(401, "Credenciales inválidas"))?;
        Ok(LoginResponse { token: format!("tok-{}", a.id), role: a.role.clone() })
    }

    async fn register(&self, req: &RegisterRequest) -> AppResult<()> {
        self.log("register");
        let mut accounts = self.accounts.lock();
        if accounts.iter().any(|a| a.email == req.email) {
            return Err(AppError::from_status(400, "El email ya está registrado"));
        }
        let id = accounts.len() as i64 + 1;
        accounts.push(Account { id, email: req.email.clone(), password: req.password.clone(), role: "guest".into() });
        Ok(())
    }

    async fn list_products(&self, auth: Option<&Credential>) -> AppResult<Vec<Product>> {
        self.log("list");
        let (id, role) = self.caller(auth)?;
        let products = self.products.lock();
        Ok(products.iter().filter(|p| role == "admin" || p.owner_id == Some(id)).cloned().collect())
    }

    async fn create_product(&self, auth: Option<&Credential>, draft: &ProductDraft) -> AppResult<()> {
        self.log("create");
        let (owner, _) = self.caller(auth)?;
        let mut products = self.products.lock();
        let id = products.iter().map(|p| p.id).max().unwrap_or(0) + 1;
        products.push(Product {
            id,
            owner_id: Some(owner),
            name: draft.name.clone(),
            description: Some(draft.description.clone()),
            kind: draft.kind.clone(),
            available: Some(draft.available),
            price: draft.price,
            status: ProductStatus::Pending,
        });
        Ok(())
    }

    async fn set_status(&self, auth: Option<&Credential>, id: i64, status: ProductStatus) -> AppResult<()> {
        self.log("set_status");
        self.require_admin(auth)?;
        let mut products = self.products.lock();
        let p = products.iter_mut().find(|p| p.id == id).ok_or_else(|| AppError::from_status(404, "Producto no encontrado"))?;
        p.status = status;
        Ok(())
    }

    async fn delete_product(&self, auth: Option<&Credential>, id: i64) -> AppResult<()> {
        self.log("delete");
        self.require_admin(auth)?;
        self.products.lock().retain(|p| p.id != id);
        Ok(())
    }

    async fn convert(&self, auth: Option<&Credential>, id: i64, currency: &str) -> AppResult<Conversion> {
        self.log("convert");
        self.caller(auth)?;
        let products = self.products.lock();
        let p = products.iter().find(|p| p.id == id).ok_or_else(|| AppError::from_status(404, "Producto no encontrado"))?;
        let amount = match currency {
            "MXN" => p.price,
            "COP" => p.price * COP_RATE,
            _ => return Err(AppError::from_status(400, "Moneda no soportada")),
        };
        Ok(Conversion { amount, currency: currency.to_string() })
    }
}

fn app() -> App<FakeApi> {
    App::new(FakeApi::seeded(), Arc::new(SessionStore::initialize(MemoryStorage::new())))
}

fn draft(name: &str) -> ProductDraft {
    ProductDraft { name: name.into(), description: "needed".into(), kind: "office".into(), available: true, price: 250.0 }
}

#[tokio::test]
async fn anonymous_is_redirected_without_fetching() -> Result<()> {
    let mut app = app();
    for path in ["/guest", "/admin"] {
        let nav = app.navigate(path).await?;
        assert_eq!(nav.decision, Decision::RedirectToSignIn);
        assert_eq!(app.current_view(), View::SignIn);
    }
    assert_eq!(app.api_calls_for_test(), 0);
    assert!(app.render().contains("sign in required"));
    Ok(())
}

#[tokio::test]
async fn guest_sign_in_opens_own_requests_and_admin_is_refused() -> Result<()> {
    let mut app = app();
    assert_eq!(app.sign_in("ana@example.com", "pw").await?, Outcome::Performed);
    assert_eq!(app.current_view(), View::GuestDashboard);
    let ids: Vec<i64> = app.guest().rows().iter().map(|r| r.product.id).collect();
    assert_eq!(ids, vec![10, 12]);

    let nav = app.navigate("/admin").await?;
    assert_eq!(nav.decision, Decision::RedirectToDefault);
    assert_eq!(app.current_view(), View::Home);
    Ok(())
}

#[tokio::test]
async fn admin_sign_in_opens_admin_dashboard_with_everything() -> Result<()> {
    let mut app = app();
    app.sign_in("admin@example.com", "root").await?;
    assert_eq!(app.current_view(), View::AdminDashboard);
    assert_eq!(app.admin().products().len(), 3);
    Ok(())
}

#[tokio::test]
async fn wrong_password_stays_on_sign_in() -> Result<()> {
    let mut app = app();
    app.sign_in("ana@example.com", "nope").await?;
    assert_eq!(app.current_view(), View::SignIn);
    assert_eq!(app.sign_in_view().error(), Some("Credenciales inválidas"));
    assert_eq!(app.session(), Session::Anonymous);
    Ok(())
}

#[tokio::test]
async fn malformed_email_never_reaches_the_backend() -> Result<()> {
    let mut app = app();
    app.sign_in("not-an-email", "pw").await?;
    assert!(app.sign_in_view().error().is_some());
    assert_eq!(app.api_calls_for_test(), 0);
    Ok(())
}

#[tokio::test]
async fn register_leads_to_sign_in_with_notice() -> Result<()> {
    let mut app = app();
    let req = RegisterRequest { username: "marta".into(), email: "marta@example.com".into(), password: "pw".into() };
    app.register(&req).await?;
    assert_eq!(app.current_view(), View::SignIn);
    assert!(app.render().contains("account created"));

    app.sign_in("marta@example.com", "pw").await?;
    assert_eq!(app.current_view(), View::GuestDashboard);
    assert!(app.guest().rows().is_empty());
    Ok(())
}

#[tokio::test]
async fn duplicate_registration_shows_backend_message() -> Result<()> {
    let mut app = app();
    let req = RegisterRequest { username: "ana".into(), email: "ana@example.com".into(), password: "pw".into() };
    app.register(&req).await?;
    assert_eq!(app.current_view(), View::Register);
    assert_eq!(app.register_view().error(), Some("El email ya está registrado"));
    Ok(())
}

#[tokio::test]
async fn submit_from_home_creates_a_request() -> Result<()> {
    let mut app = app();
    app.sign_in("ana@example.com", "pw").await?;
    app.submit(&draft("Monitor")).await?;
    assert_eq!(app.current_view(), View::Home);
    let flash = app.home().flash().cloned();
    assert!(matches!(flash, Some(f) if f.text.contains("request created")));

    app.navigate("/guest").await?;
    assert!(app.guest().rows().iter().any(|r| r.product.name == "Monitor"));
    Ok(())
}

#[tokio::test]
async fn invalid_draft_is_rejected_locally() -> Result<()> {
    let mut app = app();
    app.sign_in("ana@example.com", "pw").await?;
    let mut d = draft("Monitor");
    d.price = -1.0;
    app.submit(&d).await?;
    assert_eq!(app.api_calls_for("create"), 0);
    assert!(app.home().flash().is_some());
    Ok(())
}

#[tokio::test]
async fn anonymous_submit_is_refused_by_the_view() -> Result<()> {
    let store = Arc::new(SessionStore::initialize(MemoryStorage::new()));
    let api = FakeApi::seeded();
    let mut home = HomeView::default();
    assert!(!home.submit(&api, &store.current(), &draft("Monitor")).await);
    assert_eq!(api.count("create"), 0);
    Ok(())
}

#[tokio::test]
async fn conversion_toggles_between_currencies() -> Result<()> {
    let mut app = app();
    app.sign_in("ana@example.com", "pw").await?;
    app.convert(10, None).await?;
    let row = app.guest().rows().iter().find(|r| r.product.id == 10).cloned().unwrap();
    assert_eq!(row.shown_currency, "COP");
    assert_eq!(row.shown_price, 1000.0 * COP_RATE);
    assert_eq!(row.product.price, 1000.0);

    app.convert(10, None).await?;
    let row = app.guest().rows().iter().find(|r| r.product.id == 10).cloned().unwrap();
    assert_eq!(row.shown_currency, "MXN");
    assert_eq!(row.shown_price, 1000.0);
    Ok(())
}

#[tokio::test]
async fn failed_conversion_leaves_row_unchanged() -> Result<()> {
    let mut app = app();
    app.sign_in("ana@example.com", "pw").await?;
    let err = app.convert(10, Some("usd")).await.unwrap_err();
    assert!(matches!(err, AppError::UserInput { .. }));
    let row = app.guest().rows().iter().find(|r| r.product.id == 10).cloned().unwrap();
    assert_eq!(row.shown_currency, "MXN");
    // products of other users are not on this dashboard
    assert!(matches!(app.convert(11, None).await, Err(AppError::NotFound { .. })));
    Ok(())
}

#[tokio::test]
async fn admin_reviews_and_deletes() -> Result<()> {
    let mut app = app();
    app.sign_in("admin@example.com", "root").await?;
    app.set_status(11, ProductStatus::Approved).await?;
    assert_eq!(app.admin().products().iter().find(|p| p.id == 11).map(|p| p.status), Some(ProductStatus::Approved));

    let again = app.set_status(11, ProductStatus::Approved).await.unwrap_err();
    assert!(matches!(again, AppError::Conflict { .. }));

    app.delete(12).await?;
    assert!(app.admin().products().iter().all(|p| p.id != 12));
    assert_eq!(app.api_calls_for("delete"), 1);
    Ok(())
}

#[tokio::test]
async fn guest_cannot_run_admin_actions() -> Result<()> {
    let mut app = app();
    app.sign_in("ana@example.com", "pw").await?;
    match app.set_status(10, ProductStatus::Approved).await? {
        Outcome::Redirected(nav) => assert_eq!(nav.decision, Decision::RedirectToDefault),
        other => panic!("expected redirect, got {:?}", other),
    }
    assert_eq!(app.current_view(), View::Home);
    assert_eq!(app.api_calls_for("set_status"), 0);
    Ok(())
}

#[tokio::test]
async fn sign_out_returns_home_and_guards_again() -> Result<()> {
    let mut app = app();
    app.sign_in("admin@example.com", "root").await?;
    let nav = app.sign_out().await?;
    assert_eq!(nav.view, View::Home);
    assert_eq!(app.session(), Session::Anonymous);
    let nav = app.navigate("/admin").await?;
    assert_eq!(nav.decision, Decision::RedirectToSignIn);
    Ok(())
}

/// Session storage that keeps entries but refuses to delete them.
#[derive(Default)]
struct StuckStorage(MemoryStorage);

impl DurableStorage for StuckStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> { self.0.get(key) }
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> { self.0.set(key, value) }
    fn remove(&self, _key: &str) -> Result<(), StorageError> {
        Err(StorageError::Unavailable {
            path: "session.json".into(),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
        })
    }
}

#[tokio::test]
async fn sign_out_that_cannot_clear_storage_is_reported() -> Result<()> {
    let mut app = App::new(FakeApi::seeded(), Arc::new(SessionStore::initialize(StuckStorage::default())));
    app.sign_in("ana@example.com", "pw").await?;
    app.sign_out().await?;
    assert_eq!(app.session(), Session::Anonymous);
    assert_eq!(app.current_view(), View::Home);
    assert!(app.notice().is_some_and(|n| n.contains("could not be removed")));
    assert!(app.render().contains("restored on the next start"));

    // the notice belongs to that one view; moving on clears it
    app.navigate("/login").await?;
    assert!(app.notice().is_none());
    Ok(())
}

#[tokio::test]
async fn clean_sign_out_has_no_notice() -> Result<()> {
    let mut app = app();
    app.sign_in("ana@example.com", "pw").await?;
    app.sign_out().await?;
    assert!(app.notice().is_none());
    Ok(())
}

#[tokio::test]
async fn session_from_a_previous_run_opens_protected_views() -> Result<()> {
    let tmp = tempdir()?;
    let path = tmp.path().join("session.json");
    {
        let mut first = App::new(FakeApi::seeded(), Arc::new(SessionStore::initialize(FileStorage::new(&path))));
        first.sign_in("ana@example.com", "pw").await?;
    }
    let mut second = App::new(FakeApi::seeded(), Arc::new(SessionStore::initialize(FileStorage::new(&path))));
    let nav = second.navigate("/guest").await?;
    assert_eq!(nav.decision, Decision::Allow);
    assert_eq!(second.guest().rows().len(), 2);
    Ok(())
}

#[tokio::test]
async fn shell_commands_drive_the_app() -> Result<()> {
    let mut app = app();
    let run = |line: &str| parse_command(line).unwrap().unwrap();

    let Step::Output(out) = execute(&mut app, run("go /admin")).await? else { panic!("expected output") };
    assert!(out.contains("sign in required"));

    execute(&mut app, run("login admin@example.com root")).await?;
    assert_eq!(app.current_view(), View::AdminDashboard);

    let Step::Output(out) = execute(&mut app, run("status")).await? else { panic!("expected output") };
    assert!(out.contains("signed in as admin"));

    execute(&mut app, run("reject 10")).await?;
    assert_eq!(app.admin().products().iter().find(|p| p.id == 10).map(|p| p.status), Some(ProductStatus::Rejected));

    execute(&mut app, run("logout")).await?;
    assert_eq!(app.current_view(), View::Home);
    assert_eq!(execute(&mut app, run("quit")).await?, Step::Quit);
    Ok(())
}

// Call counting lives on the fake; these helpers keep the assertions short.
trait CallCount {
    fn api_calls_for_test(&self) -> usize;
    fn api_calls_for(&self, call: &str) -> usize;
}

impl CallCount for App<FakeApi> {
    fn api_calls_for_test(&self) -> usize { self.api().calls.lock().len() }
    fn api_calls_for(&self, call: &str) -> usize { self.api().count(call) }
}
