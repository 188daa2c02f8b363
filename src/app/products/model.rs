//! 产品数据模型

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::core::{clock::millis, error::CoreError};

/// 有机产品
///
/// 客户端从未提供过的字段不会出现在 JSON 中。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_per_unit: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seller: Option<String>,
    #[serde(with = "millis")]
    pub created_at: DateTime<Utc>,
    #[serde(default, with = "millis::option")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// 客户端可写字段
///
/// 外层 `None` 表示请求体中没有该字段；`Some(None)` 表示显式传入了 `null`。
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ProductPatch {
    #[serde(default, deserialize_with = "present")]
    pub name: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub price_per_unit: Option<Option<f64>>,
    #[serde(default, deserialize_with = "present")]
    pub image_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub stock: Option<Option<i64>>,
    #[serde(default, deserialize_with = "present")]
    pub seller: Option<Option<String>>,
}

/// 字段出现在请求体中（包括 `null`）时包一层 `Some`
fn present<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// 由服务端生成、客户端不可提交的字段
const SERVER_MANAGED_FIELDS: [&str; 2] = ["id", "createdAt"];

/// 客户端可以提交但总会被服务端覆盖的字段
const SERVER_STAMPED_FIELD: &str = "updatedAt";

impl Product {
    pub fn new(id: String, created_at: DateTime<Utc>, patch: ProductPatch) -> Self {
        let mut product = Self {
            id,
            name: None,
            description: None,
            price_per_unit: None,
            image_url: None,
            stock: None,
            seller: None,
            created_at,
            updated_at: None,
        };
        product.merge(patch);
        product
    }

    /// 浅合并：补丁中出现的字段覆盖原值，`null` 清空该字段
    pub fn merge(&mut self, patch: ProductPatch) {
        let ProductPatch {
            name,
            description,
            price_per_unit,
            image_url,
            stock,
            seller,
        } = patch;

        if let Some(name) = name {
            self.name = name;
        }
        if let Some(description) = description {
            self.description = description;
        }
        if let Some(price_per_unit) = price_per_unit {
            self.price_per_unit = price_per_unit;
        }
        if let Some(image_url) = image_url {
            self.image_url = image_url;
        }
        if let Some(stock) = stock {
            self.stock = stock;
        }
        if let Some(seller) = seller {
            self.seller = seller;
        }
    }
}

impl ProductPatch {
    /// 解析请求体
    ///
    /// 空请求体视为 `{}`；`id`、`createdAt` 以及未知字段都会被拒绝，
    /// `updatedAt` 会被忽略。
    pub fn from_slice(body: &[u8]) -> Result<Self, CoreError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }

        let value: Value = serde_json::from_slice(body).map_err(|e| {
            CoreError::BadRequest(format!("Body permintaan bukan JSON yang valid: {}", e))
        })?;

        let Value::Object(mut fields) = value else {
            return Err(CoreError::BadRequest(
                "Body permintaan harus berupa objek JSON".to_string(),
            ));
        };

        if let Some(field) = SERVER_MANAGED_FIELDS
            .iter()
            .find(|field| fields.contains_key(**field))
        {
            return Err(CoreError::BadRequest(format!(
                "Field {} diatur oleh server dan tidak dapat diubah",
                field
            )));
        }
        fields.remove(SERVER_STAMPED_FIELD);

        serde_json::from_value(Value::Object(fields))
            .map_err(|e| CoreError::BadRequest(format!("Body permintaan tidak valid: {}", e)))
    }
}
