//! 产品业务服务

use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use super::model::{Product, ProductPatch};
use crate::config::WriteMissStatus;
use crate::core::{
    clock::{current_date, Clock},
    error::CoreError,
};
use crate::infrastructure::store::KeyValueStore;

#[derive(Clone)]
pub struct ProductService {
    store: Arc<dyn KeyValueStore<Product>>,
    clock: Arc<dyn Clock>,
    write_miss_status: WriteMissStatus,
}

impl ProductService {
    pub fn new(store: Arc<dyn KeyValueStore<Product>>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            write_miss_status: WriteMissStatus::default(),
        }
    }

    pub fn with_write_miss_status(mut self, status: WriteMissStatus) -> Self {
        self.write_miss_status = status;
        self
    }

    pub fn create_product(&self, patch: ProductPatch) -> Result<Product, CoreError> {
        let product = Product::new(Uuid::new_v4().to_string(), current_date(&*self.clock), patch);
        self.store.insert(&product.id, product.clone())?;

        info!(product_id = %product.id, "产品已创建");
        Ok(product)
    }

    pub fn list_products(&self) -> Result<Vec<Product>, CoreError> {
        let products = self.store.values()?;
        debug!(count = products.len(), "列出全部产品");
        Ok(products)
    }

    pub fn get_product(&self, id: &str) -> Result<Product, CoreError> {
        self.store.get(id)?.ok_or_else(|| {
            CoreError::NotFound(format!("Produk dengan ID={} tidak ditemukan", id))
        })
    }

    /// 更新产品
    ///
    /// 查询与写入是两个独立操作，并发更新同一产品时后写入者生效。
    pub fn update_product(&self, id: &str, patch: ProductPatch) -> Result<Product, CoreError> {
        let product = self.find_for_update(id)?;
        self.apply_update(product, patch)
    }

    /// 取出待更新的产品，不存在时返回写入失败的错误
    pub fn find_for_update(&self, id: &str) -> Result<Product, CoreError> {
        self.store.get(id)?.ok_or_else(|| {
            self.write_miss(format!(
                "Tidak dapat memperbarui produk dengan ID={}. Produk tidak ditemukan.",
                id
            ))
        })
    }

    pub fn apply_update(
        &self,
        mut product: Product,
        patch: ProductPatch,
    ) -> Result<Product, CoreError> {
        product.merge(patch);
        product.updated_at = Some(current_date(&*self.clock));
        self.store.insert(&product.id, product.clone())?;

        info!(product_id = %product.id, "产品已更新");
        Ok(product)
    }

    pub fn delete_product(&self, id: &str) -> Result<Product, CoreError> {
        let Some(product) = self.store.remove(id)? else {
            return Err(self.write_miss(format!(
                "Tidak dapat menghapus produk dengan ID={}. Produk tidak ditemukan.",
                id
            )));
        };

        info!(product_id = %id, "产品已删除");
        Ok(product)
    }

    pub fn count(&self) -> Result<usize, CoreError> {
        Ok(self.store.len()?)
    }

    fn write_miss(&self, message: String) -> CoreError {
        match self.write_miss_status {
            WriteMissStatus::BadRequest => CoreError::BadRequest(message),
            WriteMissStatus::NotFound => CoreError::NotFound(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::clock::testing::ManualClock;
    use crate::infrastructure::store::StableMap;
    use chrono::{Duration, TimeZone, Utc};

    fn service() -> (ProductService, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap(),
        ));
        let store = Arc::new(StableMap::<Product>::in_memory());
        (ProductService::new(store, clock.clone()), clock)
    }

    fn patch(name: &str) -> ProductPatch {
        ProductPatch {
            name: Some(Some(name.to_string())),
            ..Default::default()
        }
    }

    #[test]
    fn create_stamps_id_and_created_at() {
        let (service, clock) = service();
        let product = service.create_product(patch("Bayam")).unwrap();

        assert!(Uuid::parse_str(&product.id).is_ok());
        assert_eq!(product.created_at, clock.now());
        assert_eq!(product.updated_at, None);
        assert_eq!(service.get_product(&product.id).unwrap(), product);
    }

    #[test]
    fn create_generates_distinct_ids() {
        let (service, _) = service();
        let a = service.create_product(ProductPatch::default()).unwrap();
        let b = service.create_product(ProductPatch::default()).unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(service.count().unwrap(), 2);
    }

    #[test]
    fn update_merges_and_refreshes_updated_at() {
        let (service, clock) = service();
        let created = service.create_product(patch("Bayam")).unwrap();

        clock.advance(Duration::minutes(5));
        let updated = service
            .update_product(
                &created.id,
                ProductPatch {
                    stock: Some(Some(7)),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(updated.name.as_deref(), Some("Bayam"));
        assert_eq!(updated.stock, Some(7));
        assert_eq!(updated.created_at, created.created_at);
        assert_eq!(updated.updated_at, Some(clock.now()));
        assert_eq!(service.get_product(&created.id).unwrap(), updated);
    }

    #[test]
    fn misses_use_expected_errors() {
        let (service, _) = service();

        match service.get_product("ghost") {
            Err(CoreError::NotFound(msg)) => {
                assert_eq!(msg, "Produk dengan ID=ghost tidak ditemukan")
            }
            other => panic!("unexpected: {:?}", other),
        }
        match service.update_product("ghost", ProductPatch::default()) {
            Err(CoreError::BadRequest(msg)) => assert_eq!(
                msg,
                "Tidak dapat memperbarui produk dengan ID=ghost. Produk tidak ditemukan."
            ),
            other => panic!("unexpected: {:?}", other),
        }
        match service.delete_product("ghost") {
            Err(CoreError::BadRequest(msg)) => assert_eq!(
                msg,
                "Tidak dapat menghapus produk dengan ID=ghost. Produk tidak ditemukan."
            ),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn unified_status_turns_write_misses_into_not_found() {
        let (service, _) = service();
        let service = service.with_write_miss_status(WriteMissStatus::NotFound);

        assert!(matches!(
            service.update_product("ghost", ProductPatch::default()),
            Err(CoreError::NotFound(_))
        ));
        assert!(matches!(
            service.delete_product("ghost"),
            Err(CoreError::NotFound(_))
        ));
    }

    #[test]
    fn delete_returns_removed_record_once() {
        let (service, _) = service();
        let created = service.create_product(patch("Kangkung")).unwrap();

        assert_eq!(service.delete_product(&created.id).unwrap(), created);
        assert!(service.delete_product(&created.id).is_err());
        assert!(service.list_products().unwrap().is_empty());
    }
}
