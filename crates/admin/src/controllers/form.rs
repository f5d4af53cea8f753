//! The create/edit product form.
//!
//! Submission sequencing: validate, upload a newly attached image (if any),
//! insert or update the record, notify, then refresh the listing and the
//! stat cards. Validation runs before any network call, and a failed upload
//! aborts the flow before any record write.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use velvet_lane_core::{Price, Product, ProductId, ProductRecord};

use crate::clock::Clock;
use crate::error::AdminError;
use crate::guard::{ActionGuard, ActionKey};
use crate::providers::{ObjectStore, ProductStore};
use crate::ui::{LoadingOverlay, NotificationCenter, Severity};

use super::{DashboardController, ProductListController};

const REQUIRED_FIELDS_MESSAGE: &str =
    "Please fill in all required fields: Title, Price, and Category.";
const IMAGE_REQUIRED_MESSAGE: &str = "Please select an image for the new product.";

/// A newly attached image file.
#[derive(Debug, Clone)]
pub struct ImageFile {
    /// Original filename, kept in the stored object name.
    pub name: String,
    pub bytes: Vec<u8>,
    pub content_type: String,
}

/// Raw form input. Numeric fields arrive as the strings the user typed.
#[derive(Debug, Clone, Default)]
pub struct ProductDraft {
    /// `Some` for an edit, `None` for a create.
    pub id: Option<ProductId>,
    pub title: String,
    pub description: String,
    pub price: String,
    pub stock: String,
    pub category: String,
    pub featured: bool,
    pub active: bool,
    /// The already-stored image URL, kept when no new file is attached.
    pub image_url: Option<String>,
    pub image_file: Option<ImageFile>,
}

impl ProductDraft {
    /// A draft pre-filled from an existing product, for the edit form.
    ///
    /// No file is attached, so submitting an untouched prefill performs one
    /// update that keeps the stored image URL.
    #[must_use]
    pub fn prefill(product: &Product) -> Self {
        let record = product.to_record();
        Self {
            id: Some(product.id.clone()),
            title: record.title,
            description: record.description,
            price: record.price.to_string(),
            stock: record.stock.to_string(),
            category: record.category,
            featured: record.featured,
            active: record.active,
            image_url: record.image,
            image_file: None,
        }
    }
}

/// The stored name for an uploaded image.
///
/// Prefixing the upload time in milliseconds keeps repeated uploads of the
/// same filename from colliding in the bucket.
#[must_use]
pub fn object_name(now: DateTime<Utc>, filename: &str) -> String {
    format!("{}_{filename}", now.timestamp_millis())
}

/// Handles product form submission.
#[derive(Clone)]
pub struct ProductFormController {
    store: Arc<dyn ProductStore>,
    objects: Arc<dyn ObjectStore>,
    clock: Arc<dyn Clock>,
    overlay: LoadingOverlay,
    notifications: NotificationCenter,
    guard: ActionGuard,
    list: ProductListController,
    dashboard: DashboardController,
}

impl ProductFormController {
    #[allow(clippy::too_many_arguments)]
    #[must_use]
    pub fn new(
        store: Arc<dyn ProductStore>,
        objects: Arc<dyn ObjectStore>,
        clock: Arc<dyn Clock>,
        overlay: LoadingOverlay,
        notifications: NotificationCenter,
        guard: ActionGuard,
        list: ProductListController,
        dashboard: DashboardController,
    ) -> Self {
        Self {
            store,
            objects,
            clock,
            overlay,
            notifications,
            guard,
            list,
            dashboard,
        }
    }

    /// Submit the form.
    ///
    /// A double submit while one is in flight is dropped silently and
    /// returns `None`. Every failure produces exactly one notification
    /// before the error is returned.
    ///
    /// # Errors
    ///
    /// - [`AdminError::Validation`] for missing required fields, an
    ///   unparsable price or stock, or a create with no image
    /// - [`AdminError::Upload`] when the image upload fails; no record is
    ///   written
    /// - [`AdminError::Persistence`] when the insert or update fails
    pub async fn submit(&self, draft: ProductDraft) -> Result<Option<Product>, AdminError> {
        let Some(_in_flight) = self.guard.try_begin(ActionKey::SubmitProduct) else {
            tracing::debug!("product submit already in flight");
            return Ok(None);
        };

        let record = match self.validate(&draft) {
            Ok(record) => record,
            Err(e) => {
                self.notifications.notify(e.user_message(), Severity::Error);
                return Err(e);
            }
        };

        self.overlay.show_busy("Saving product...");
        let result = self.save(&draft, record).await;
        self.overlay.clear_busy();

        let product = result?;
        self.notifications.notify(
            if draft.id.is_some() {
                "Product updated successfully"
            } else {
                "Product added successfully"
            },
            Severity::Success,
        );
        self.list.load().await;
        self.dashboard.load_stats().await;

        Ok(Some(product))
    }

    /// Field validation; builds the record minus the image URL.
    fn validate(&self, draft: &ProductDraft) -> Result<ProductRecord, AdminError> {
        let title = draft.title.trim();
        let category = draft.category.trim();
        if title.is_empty() || draft.price.trim().is_empty() || category.is_empty() {
            return Err(AdminError::Validation(REQUIRED_FIELDS_MESSAGE.to_owned()));
        }

        let price = Price::parse(&draft.price)
            .map_err(|_| AdminError::Validation("Please enter a valid price.".to_owned()))?;

        let stock = draft.stock.trim();
        let stock: i32 = if stock.is_empty() {
            0
        } else {
            stock.parse().map_err(|_| {
                AdminError::Validation("Please enter a valid stock quantity.".to_owned())
            })?
        };

        if draft.id.is_none() && draft.image_file.is_none() {
            return Err(AdminError::Validation(IMAGE_REQUIRED_MESSAGE.to_owned()));
        }

        Ok(ProductRecord {
            title: title.to_owned(),
            description: draft.description.trim().to_owned(),
            price: price.amount(),
            stock,
            category: category.to_owned(),
            featured: draft.featured,
            active: draft.active,
            image: None,
        })
    }

    /// Upload (when a new file is attached) and write the record.
    async fn save(
        &self,
        draft: &ProductDraft,
        mut record: ProductRecord,
    ) -> Result<Product, AdminError> {
        record.image = match &draft.image_file {
            Some(file) => {
                let name = object_name(self.clock.now(), &file.name);
                let url = self
                    .objects
                    .upload(&name, file.bytes.clone(), &file.content_type)
                    .await
                    .map_err(|e| {
                        tracing::error!(error = %e, "image upload failed");
                        self.notifications
                            .notify("Image upload failed.", Severity::Error);
                        AdminError::Upload(e)
                    })?;
                Some(url)
            }
            None => draft.image_url.clone(),
        };

        let result = match &draft.id {
            Some(id) => self.store.update(id, &record).await,
            None => self.store.insert(&record).await,
        };
        result.map_err(|e| {
            tracing::error!(error = %e, "product save failed");
            self.notifications
                .notify("Failed to save product.", Severity::Error);
            AdminError::Persistence(e)
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use rust_decimal::Decimal;

    use crate::clock::ManualClock;
    use crate::providers::{ListOrder, ProviderError};

    use super::*;

    /// Store/object-store pair that counts calls and echoes writes back.
    #[derive(Default)]
    struct CountingBackend {
        inserts: AtomicUsize,
        updates: AtomicUsize,
        uploads: AtomicUsize,
        lists: AtomicUsize,
    }

    #[async_trait]
    impl ProductStore for CountingBackend {
        async fn list(&self, _order: ListOrder) -> Result<Vec<Product>, ProviderError> {
            self.lists.fetch_add(1, Ordering::SeqCst);
            Ok(Vec::new())
        }

        async fn insert(&self, record: &ProductRecord) -> Result<Product, ProviderError> {
            self.inserts.fetch_add(1, Ordering::SeqCst);
            Ok(stored(ProductId::new("new"), record))
        }

        async fn update(
            &self,
            id: &ProductId,
            record: &ProductRecord,
        ) -> Result<Product, ProviderError> {
            self.updates.fetch_add(1, Ordering::SeqCst);
            Ok(stored(id.clone(), record))
        }

        async fn delete(&self, _id: &ProductId) -> Result<(), ProviderError> {
            Ok(())
        }
    }

    #[async_trait]
    impl ObjectStore for CountingBackend {
        async fn upload(
            &self,
            name: &str,
            _bytes: Vec<u8>,
            _content_type: &str,
        ) -> Result<String, ProviderError> {
            self.uploads.fetch_add(1, Ordering::SeqCst);
            Ok(format!("https://cdn.test/{name}"))
        }
    }

    fn stored(id: ProductId, record: &ProductRecord) -> Product {
        Product {
            id,
            title: record.title.clone(),
            description: record.description.clone(),
            price: record.price,
            stock: record.stock,
            category: record.category.clone(),
            featured: record.featured,
            active: record.active,
            image: record.image.clone(),
            created_at: Utc::now(),
        }
    }

    fn controller(backend: Arc<CountingBackend>) -> ProductFormController {
        let overlay = LoadingOverlay::new();
        let notifications = NotificationCenter::new();
        let guard = ActionGuard::new();
        let dashboard = DashboardController::new(
            Arc::clone(&backend) as _,
            overlay.clone(),
            notifications.clone(),
        );
        let list = ProductListController::new(
            Arc::clone(&backend) as _,
            overlay.clone(),
            notifications.clone(),
            guard.clone(),
            dashboard.clone(),
        );
        ProductFormController::new(
            Arc::clone(&backend) as _,
            backend as _,
            Arc::new(ManualClock::new(Utc::now())),
            overlay,
            notifications,
            guard,
            list,
            dashboard,
        )
    }

    fn valid_create() -> ProductDraft {
        ProductDraft {
            title: "Velvet Tote".to_owned(),
            price: "39.99".to_owned(),
            category: "bags".to_owned(),
            active: true,
            image_file: Some(ImageFile {
                name: "tote.png".to_owned(),
                bytes: vec![1, 2, 3],
                content_type: "image/png".to_owned(),
            }),
            ..ProductDraft::default()
        }
    }

    #[test]
    fn test_object_name_is_timestamped() {
        let now = DateTime::parse_from_rfc3339("2025-08-27T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(object_name(now, "tote.png"), "1756252800000_tote.png");
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_required_fields_short_circuits() {
        let backend = Arc::new(CountingBackend::default());
        let controller = controller(Arc::clone(&backend));

        let draft = ProductDraft {
            title: "  ".to_owned(),
            price: "9.99".to_owned(),
            category: "bags".to_owned(),
            ..ProductDraft::default()
        };
        let err = controller.submit(draft).await.unwrap_err();
        assert!(matches!(err, AdminError::Validation(ref m) if m == REQUIRED_FIELDS_MESSAGE));
        assert_eq!(backend.inserts.load(Ordering::SeqCst), 0);
        assert_eq!(backend.lists.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_create_without_image_rejected_before_network() {
        let backend = Arc::new(CountingBackend::default());
        let controller = controller(Arc::clone(&backend));

        let draft = ProductDraft {
            image_file: None,
            ..valid_create()
        };
        let err = controller.submit(draft).await.unwrap_err();
        assert!(matches!(err, AdminError::Validation(ref m) if m == IMAGE_REQUIRED_MESSAGE));
        assert_eq!(backend.inserts.load(Ordering::SeqCst), 0);
        assert_eq!(backend.uploads.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_create_uploads_then_inserts_then_reloads() {
        let backend = Arc::new(CountingBackend::default());
        let controller = controller(Arc::clone(&backend));

        let product = controller.submit(valid_create()).await.unwrap().unwrap();
        assert_eq!(product.title, "Velvet Tote");
        assert!(product.image.unwrap().starts_with("https://cdn.test/"));
        assert_eq!(backend.inserts.load(Ordering::SeqCst), 1);
        // listing refresh plus stats refresh
        assert_eq!(backend.lists.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_edit_without_new_file_keeps_url_and_skips_upload() {
        let backend = Arc::new(CountingBackend::default());
        let controller = controller(Arc::clone(&backend));

        let draft = ProductDraft {
            id: Some(ProductId::new("42")),
            image_file: None,
            image_url: Some("https://cdn.test/existing.png".to_owned()),
            ..valid_create()
        };
        let product = controller.submit(draft).await.unwrap().unwrap();
        assert_eq!(product.image.as_deref(), Some("https://cdn.test/existing.png"));
        assert_eq!(backend.updates.load(Ordering::SeqCst), 1);
        assert_eq!(backend.inserts.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_prefill_submit_is_a_plain_update() {
        let backend = Arc::new(CountingBackend::default());
        let controller = controller(Arc::clone(&backend));

        let existing = stored(
            ProductId::new("42"),
            &ProductRecord {
                title: "Velvet Scarf".to_owned(),
                description: "Silk blend".to_owned(),
                price: Decimal::new(1999, 2),
                stock: 5,
                category: "accessories".to_owned(),
                featured: true,
                active: true,
                image: Some("https://cdn.test/existing.png".to_owned()),
            },
        );

        let product = controller
            .submit(ProductDraft::prefill(&existing))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(product.image.as_deref(), Some("https://cdn.test/existing.png"));
        assert_eq!(product.price, Decimal::new(1999, 2));
        assert_eq!(product.stock, 5);
        assert!(product.featured);
        assert_eq!(backend.updates.load(Ordering::SeqCst), 1);
        assert_eq!(backend.uploads.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_price_rejected() {
        let backend = Arc::new(CountingBackend::default());
        let controller = controller(Arc::clone(&backend));

        let draft = ProductDraft {
            price: "abc".to_owned(),
            ..valid_create()
        };
        let err = controller.submit(draft).await.unwrap_err();
        assert!(matches!(err, AdminError::Validation(_)));
        assert_eq!(backend.inserts.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_stock_defaults_to_zero() {
        let backend = Arc::new(CountingBackend::default());
        let controller = controller(Arc::clone(&backend));

        let product = controller.submit(valid_create()).await.unwrap().unwrap();
        assert_eq!(product.stock, 0);
        assert_eq!(product.price, Decimal::new(3999, 2));
    }
}
