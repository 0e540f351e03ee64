//! Wire and view models for the booking API.
//!
//! Everything here is fetched read-only from the platform; nothing is
//! mutated locally. Field names follow the API's camelCase JSON.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A grouping label for services, optionally scoped to a salon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_id: Option<String>,
}

/// A bookable service.
///
/// Self-referential: a service may embed its `parent_service` (one level
/// deep, the API does not nest further). A service without a parent id is
/// a root service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub category_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_service_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<u32>,
    #[serde(default)]
    pub is_popular: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_service: Option<Box<Service>>,
}

impl Service {
    /// True when this service has no parent reference at all.
    pub fn is_root(&self) -> bool {
        self.parent_service_id.is_none() && self.parent_service.is_none()
    }
}

/// A vendor offering services.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Saloon {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub short_intro: String,
    #[serde(default)]
    pub rating: f32,
    #[serde(default)]
    pub address: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<String>,
}

/// Availability and pricing of one service at one salon, as embedded in
/// `GET /services/{id}`. Price and duration live on the join record, not
/// on the salon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaloonService {
    pub saloon_id: String,
    pub service_id: String,
    pub price: f64,
    pub duration_minutes: u32,
    pub is_available: bool,
    pub saloon: Saloon,
}

/// `GET /services/{id}` response: the service with its salon joins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceWithSaloons {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub category_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_service_id: Option<String>,
    #[serde(default)]
    pub is_popular: bool,
    #[serde(default)]
    pub saloon_services: Vec<SaloonService>,
}

/// One join row of `GET /saloons/{id}?serviceId=…` (salon side, so no
/// embedded salon).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalonOffer {
    pub service_id: String,
    pub price: f64,
    pub duration_minutes: u32,
    pub is_available: bool,
}

/// `GET /saloons/{id}?serviceId=…` response: one salon with the join rows
/// matching the requested service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalonDetail {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub short_intro: String,
    #[serde(default)]
    pub rating: f32,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub saloon_services: Vec<SalonOffer>,
}

/// Flattened salon view model shown on the Saloons screen. Price and
/// duration are projected from the join record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaloonData {
    pub id: String,
    pub name: String,
    pub short_intro: String,
    pub price: f64,
    pub duration_minutes: u32,
    pub is_available: bool,
    pub rating: f32,
    pub address: String,
}

/// Identifies one service at one salon for checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaloonServiceRef {
    pub saloon_id: String,
    pub service_id: String,
}

impl SaloonServiceRef {
    pub fn new(saloon_id: impl Into<String>, service_id: impl Into<String>) -> Self {
        Self {
            saloon_id: saloon_id.into(),
            service_id: service_id.into(),
        }
    }

    /// Composite id in the `{saloonId}:{serviceId}` form the checkout
    /// endpoint expects.
    pub fn composite_id(&self) -> String {
        format!("{}:{}", self.saloon_id, self.service_id)
    }
}

/// Customer details submitted with a booking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub booking_time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// `POST /checkout` request body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub saloon_service_ids: Vec<String>,
    pub customer_info: CustomerInfo,
}

/// `POST /checkout` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    pub success: bool,
    pub message: String,
    #[serde(default)]
    pub booking_ids: Vec<String>,
    #[serde(default)]
    pub amount: f64,
    #[serde(default)]
    pub payment_method: String,
    #[serde(default)]
    pub status: String,
}
