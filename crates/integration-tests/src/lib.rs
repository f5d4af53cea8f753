//! End-to-end flow tests for Velvet Lane.
//!
//! [`FakeBackend`] implements all three provider seams in memory with an
//! ordered call log and scripted failures, so the tests in `tests/` can
//! drive a fully wired [`velvet_lane_admin::AdminApp`] without a network.
//! Time comes from a [`ManualClock`] plus tokio's paused test time.

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::unwrap_used)]

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use velvet_lane_admin::clock::{Clock, ManualClock};
use velvet_lane_admin::providers::{
    Identity, IdentityProvider, ListOrder, ObjectStore, ProductStore, ProviderError,
    ProviderSession,
};
use velvet_lane_core::{Email, Product, ProductId, ProductRecord};

/// One recorded backend call, in invocation order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    SignIn,
    CurrentSession,
    SignOut,
    List(ListOrder),
    Insert,
    Update(String),
    Delete(String),
    Upload(String),
}

/// In-memory stand-in for the hosted backend.
///
/// One account, one live session, a product table with backend-assigned
/// ids, and per-service failure switches.
#[derive(Default)]
pub struct FakeBackend {
    clock: Option<ManualClock>,
    account: Option<(String, String)>,
    session: Mutex<Option<ProviderSession>>,
    products: Mutex<Vec<Product>>,
    next_id: AtomicU64,
    calls: Mutex<Vec<Call>>,
    sign_in_delay: Mutex<Option<Duration>>,
    fail_list: AtomicBool,
    fail_delete: AtomicBool,
    fail_upload: AtomicBool,
    fail_sign_out: AtomicBool,
}

impl FakeBackend {
    /// A backend with one account that can sign in.
    #[must_use]
    pub fn with_account(clock: ManualClock, email: &str, password: &str) -> Self {
        Self {
            clock: Some(clock),
            account: Some((email.to_owned(), password.to_owned())),
            next_id: AtomicU64::new(1),
            ..Self::default()
        }
    }

    fn now(&self) -> chrono::DateTime<Utc> {
        self.clock.as_ref().map_or_else(Utc::now, |c| c.now())
    }

    /// Seed a product row directly, bypassing the call log.
    pub fn seed_product(&self, title: &str, price: Decimal, stock: i32, featured: bool) -> ProductId {
        let id = ProductId::new(self.next_id.fetch_add(1, Ordering::SeqCst).to_string());
        self.products.lock().unwrap().push(Product {
            id: id.clone(),
            title: title.to_owned(),
            description: String::new(),
            price,
            stock,
            category: "misc".to_owned(),
            featured,
            active: true,
            image: None,
            created_at: self.now(),
        });
        id
    }

    /// Snapshot of the recorded calls.
    #[must_use]
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Drop the recorded calls (typically after arranging state).
    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    /// How many times `call` was recorded.
    #[must_use]
    pub fn count(&self, call: &Call) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| *c == call).count()
    }

    /// Make credential checks take `delay` of (test) time to resolve.
    pub fn delay_sign_in(&self, delay: Duration) {
        *self.sign_in_delay.lock().unwrap() = Some(delay);
    }

    pub fn fail_list(&self, fail: bool) {
        self.fail_list.store(fail, Ordering::SeqCst);
    }

    pub fn fail_delete(&self, fail: bool) {
        self.fail_delete.store(fail, Ordering::SeqCst);
    }

    pub fn fail_upload(&self, fail: bool) {
        self.fail_upload.store(fail, Ordering::SeqCst);
    }

    pub fn fail_sign_out(&self, fail: bool) {
        self.fail_sign_out.store(fail, Ordering::SeqCst);
    }

    /// Whether the backend still holds a live session.
    #[must_use]
    pub fn has_session(&self) -> bool {
        self.session.lock().unwrap().is_some()
    }

    /// Rewrite the live session's creation time (to fake an aged session).
    pub fn backdate_session(&self, age: chrono::Duration) {
        if let Some(session) = self.session.lock().unwrap().as_mut() {
            session.created_at -= age;
        }
    }

    #[must_use]
    pub fn products(&self) -> Vec<Product> {
        self.products.lock().unwrap().clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn server_error() -> ProviderError {
        ProviderError::Api {
            status: 500,
            message: "scripted failure".to_owned(),
        }
    }
}

#[async_trait]
impl IdentityProvider for FakeBackend {
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<ProviderSession, ProviderError> {
        self.record(Call::SignIn);
        let delay = *self.sign_in_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        match &self.account {
            Some((e, p)) if e == email && p == password => {
                let session = ProviderSession {
                    identity: Identity {
                        id: Uuid::new_v4(),
                        email: Email::parse(email).unwrap(),
                        created_at: self.now(),
                    },
                    created_at: self.now(),
                };
                *self.session.lock().unwrap() = Some(session.clone());
                Ok(session)
            }
            _ => Err(ProviderError::InvalidCredentials),
        }
    }

    async fn current_session(&self) -> Result<Option<ProviderSession>, ProviderError> {
        self.record(Call::CurrentSession);
        Ok(self.session.lock().unwrap().clone())
    }

    async fn sign_out(&self) -> Result<(), ProviderError> {
        self.record(Call::SignOut);
        *self.session.lock().unwrap() = None;
        if self.fail_sign_out.load(Ordering::SeqCst) {
            return Err(Self::server_error());
        }
        Ok(())
    }
}

#[async_trait]
impl ProductStore for FakeBackend {
    async fn list(&self, order: ListOrder) -> Result<Vec<Product>, ProviderError> {
        self.record(Call::List(order));
        if self.fail_list.load(Ordering::SeqCst) {
            return Err(Self::server_error());
        }
        let mut products = self.products.lock().unwrap().clone();
        if order == ListOrder::NewestFirst {
            products.reverse();
        }
        Ok(products)
    }

    async fn insert(&self, record: &ProductRecord) -> Result<Product, ProviderError> {
        self.record(Call::Insert);
        let product = Product {
            id: ProductId::new(self.next_id.fetch_add(1, Ordering::SeqCst).to_string()),
            title: record.title.clone(),
            description: record.description.clone(),
            price: record.price,
            stock: record.stock,
            category: record.category.clone(),
            featured: record.featured,
            active: record.active,
            image: record.image.clone(),
            created_at: self.now(),
        };
        self.products.lock().unwrap().push(product.clone());
        Ok(product)
    }

    async fn update(
        &self,
        id: &ProductId,
        record: &ProductRecord,
    ) -> Result<Product, ProviderError> {
        self.record(Call::Update(id.to_string()));
        let mut products = self.products.lock().unwrap();
        let row = products
            .iter_mut()
            .find(|p| &p.id == id)
            .ok_or_else(|| ProviderError::Api {
                status: 404,
                message: "row not found".to_owned(),
            })?;
        row.title = record.title.clone();
        row.description = record.description.clone();
        row.price = record.price;
        row.stock = record.stock;
        row.category = record.category.clone();
        row.featured = record.featured;
        row.active = record.active;
        row.image = record.image.clone();
        Ok(row.clone())
    }

    async fn delete(&self, id: &ProductId) -> Result<(), ProviderError> {
        self.record(Call::Delete(id.to_string()));
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(Self::server_error());
        }
        self.products.lock().unwrap().retain(|p| &p.id != id);
        Ok(())
    }
}

#[async_trait]
impl ObjectStore for FakeBackend {
    async fn upload(
        &self,
        name: &str,
        _bytes: Vec<u8>,
        _content_type: &str,
    ) -> Result<String, ProviderError> {
        self.record(Call::Upload(name.to_owned()));
        if self.fail_upload.load(Ordering::SeqCst) {
            return Err(Self::server_error());
        }
        Ok(format!("https://cdn.test/products/{name}"))
    }
}
