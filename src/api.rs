//! Booking API client.
//!
//! One typed async method per resource, all rooted at the base URL
//! resolved in [`crate::config`]. Fetchers never retry; a failed request
//! surfaces as an [`ApiError`] and retrying is the caller's decision.

use crate::models::{
    Category, CheckoutRequest, CheckoutResponse, CustomerInfo, SalonDetail, SaloonData,
    SaloonServiceRef, Service, ServiceWithSaloons,
};
use reqwest::{Client, RequestBuilder, Response};
use thiserror::Error;
use tracing::{debug, error, info};

/// Typed fetch failure. Carries the HTTP status when the server answered
/// at all; transport covers connection and body-decoding failures.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

impl ApiError {
    /// HTTP status code, when the server produced one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Transport(err) => err.status().map(|s| s.as_u16()),
        }
    }
}

/// HTTP client for the booking platform API.
pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    /// Create a client rooted at the given base URL (no trailing slash).
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn get(&self, path: &str) -> RequestBuilder {
        self.http
            .get(format!("{}{path}", self.base_url))
            .header("User-Agent", "cosmix")
            .header("Accept", "application/json")
    }

    /// Public category list, server order preserved.
    pub async fn categories(&self) -> Result<Vec<Category>, ApiError> {
        info!("GET /public/categories");
        let response = self.get("/public/categories").send().await?;
        let categories: Vec<Category> = check_status(response).await?.json().await?;
        debug!(count = categories.len(), "fetched categories");
        Ok(categories)
    }

    /// Services filtered by category name.
    pub async fn services_by_category(
        &self,
        category_name: &str,
    ) -> Result<Vec<Service>, ApiError> {
        info!(category_name, "GET /public/services");
        let response = self
            .get("/public/services")
            .query(&[("category", category_name)])
            .send()
            .await?;
        let services: Vec<Service> = check_status(response).await?.json().await?;
        debug!(count = services.len(), "fetched services by category");
        Ok(services)
    }

    /// Services offered by one salon, with parent-service links embedded
    /// for grouping.
    pub async fn services_by_salon(&self, salon_id: &str) -> Result<Vec<Service>, ApiError> {
        info!(salon_id, "GET /saloons-by-salon/{{id}}");
        let response = self
            .get(&format!("/saloons-by-salon/{salon_id}"))
            .send()
            .await?;
        let services: Vec<Service> = check_status(response).await?.json().await?;
        debug!(count = services.len(), "fetched services by salon");
        Ok(services)
    }

    /// All salons offering a service, projected to [`SaloonData`].
    pub async fn saloons_by_service(&self, service_id: &str) -> Result<Vec<SaloonData>, ApiError> {
        info!(service_id, "GET /services/{{id}}");
        let response = self.get(&format!("/services/{service_id}")).send().await?;
        let service: ServiceWithSaloons = check_status(response).await?.json().await?;
        let saloons = available_saloons(&service);
        debug!(
            total = service.saloon_services.len(),
            available = saloons.len(),
            "projected salons for service"
        );
        Ok(saloons)
    }

    /// One salon filtered to a specific service, as a single-element (or
    /// empty) sequence for uniform consumption by the Saloons screen.
    pub async fn salon_by_id(
        &self,
        salon_id: &str,
        service_id: &str,
    ) -> Result<Vec<SaloonData>, ApiError> {
        info!(salon_id, service_id, "GET /saloons/{{id}}");
        let response = self
            .get(&format!("/saloons/{salon_id}"))
            .query(&[("serviceId", service_id)])
            .send()
            .await?;
        let detail: SalonDetail = check_status(response).await?.json().await?;
        Ok(project_salon_detail(&detail, service_id))
    }

    /// Submit a booking. Attaches a bearer credential when a token is
    /// present (guest checkout otherwise).
    pub async fn checkout(
        &self,
        refs: &[SaloonServiceRef],
        customer_info: CustomerInfo,
        auth_token: Option<&str>,
    ) -> Result<CheckoutResponse, ApiError> {
        let body = CheckoutRequest {
            saloon_service_ids: refs.iter().map(SaloonServiceRef::composite_id).collect(),
            customer_info,
        };
        info!(
            services = body.saloon_service_ids.len(),
            authenticated = auth_token.is_some(),
            "POST /checkout"
        );

        let mut request = self
            .http
            .post(format!("{}/checkout", self.base_url))
            .header("User-Agent", "cosmix")
            .header("Accept", "application/json")
            .json(&body);
        if let Some(token) = auth_token {
            request = request.header("Authorization", format!("Bearer {token}"));
        }

        let response = request.send().await?;
        let checkout: CheckoutResponse = check_status(response).await?.json().await?;
        debug!(
            bookings = checkout.booking_ids.len(),
            status = checkout.status,
            "checkout accepted"
        );
        Ok(checkout)
    }
}

/// Convert non-2xx responses into [`ApiError::Status`] carrying the body
/// text as the message.
async fn check_status(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    error!(status = status.as_u16(), message, "API request failed");
    Err(ApiError::Status {
        status: status.as_u16(),
        message,
    })
}

/// Project the salon joins of a service into the flattened view model,
/// keeping only available entries. Price and duration come from the join
/// record, not from the salon.
pub fn available_saloons(service: &ServiceWithSaloons) -> Vec<SaloonData> {
    service
        .saloon_services
        .iter()
        .filter(|join| join.is_available)
        .map(|join| SaloonData {
            id: join.saloon.id.clone(),
            name: join.saloon.name.clone(),
            short_intro: join.saloon.short_intro.clone(),
            price: join.price,
            duration_minutes: join.duration_minutes,
            is_available: join.is_available,
            rating: join.saloon.rating,
            address: join.saloon.address.clone(),
        })
        .collect()
}

/// Project a salon detail record to the view model for one service. At
/// most one entry comes back: the first available offer for that service.
pub fn project_salon_detail(detail: &SalonDetail, service_id: &str) -> Vec<SaloonData> {
    detail
        .saloon_services
        .iter()
        .find(|offer| offer.service_id == service_id && offer.is_available)
        .map(|offer| SaloonData {
            id: detail.id.clone(),
            name: detail.name.clone(),
            short_intro: detail.short_intro.clone(),
            price: offer.price,
            duration_minutes: offer.duration_minutes,
            is_available: offer.is_available,
            rating: detail.rating,
            address: detail.address.clone(),
        })
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{SalonOffer, Saloon, SaloonService};

    fn saloon(id: &str, name: &str) -> Saloon {
        Saloon {
            id: id.to_string(),
            name: name.to_string(),
            short_intro: format!("{name} intro"),
            rating: 4.0,
            address: "Mannerheimintie 1".to_string(),
            images: Vec::new(),
        }
    }

    fn join(saloon_id: &str, available: bool, price: f64) -> SaloonService {
        SaloonService {
            saloon_id: saloon_id.to_string(),
            service_id: "svc-1".to_string(),
            price,
            duration_minutes: 45,
            is_available: available,
            saloon: saloon(saloon_id, "Salon"),
        }
    }

    fn service_with_saloons(joins: Vec<SaloonService>) -> ServiceWithSaloons {
        ServiceWithSaloons {
            id: "svc-1".to_string(),
            name: "Gel nails".to_string(),
            description: None,
            category_id: "cat-1".to_string(),
            parent_service_id: None,
            is_popular: false,
            saloon_services: joins,
        }
    }

    #[test]
    fn test_unavailable_joins_are_dropped() {
        let service =
            service_with_saloons(vec![join("a", true, 39.0), join("b", false, 29.0)]);
        let saloons = available_saloons(&service);
        assert_eq!(saloons.len(), 1);
        assert_eq!(saloons[0].id, "a");
        assert_eq!(saloons[0].price, 39.0);
    }

    #[test]
    fn test_projection_takes_price_and_duration_from_join() {
        let mut entry = join("a", true, 55.0);
        entry.duration_minutes = 90;
        let service = service_with_saloons(vec![entry]);
        let saloons = available_saloons(&service);
        assert_eq!(saloons[0].price, 55.0);
        assert_eq!(saloons[0].duration_minutes, 90);
        assert_eq!(saloons[0].rating, 4.0);
    }

    #[test]
    fn test_salon_detail_projects_single_matching_offer() {
        let detail = SalonDetail {
            id: "salon-1".to_string(),
            name: "Studio Kielo".to_string(),
            short_intro: "Lashes and nails".to_string(),
            rating: 4.5,
            address: "Aleksanterinkatu 10".to_string(),
            saloon_services: vec![
                SalonOffer {
                    service_id: "other".to_string(),
                    price: 10.0,
                    duration_minutes: 15,
                    is_available: true,
                },
                SalonOffer {
                    service_id: "svc-1".to_string(),
                    price: 60.0,
                    duration_minutes: 75,
                    is_available: true,
                },
            ],
        };
        let saloons = project_salon_detail(&detail, "svc-1");
        assert_eq!(saloons.len(), 1);
        assert_eq!(saloons[0].id, "salon-1");
        assert_eq!(saloons[0].price, 60.0);
        assert_eq!(saloons[0].duration_minutes, 75);
    }

    #[test]
    fn test_salon_detail_without_matching_offer_is_empty() {
        let detail = SalonDetail {
            id: "salon-1".to_string(),
            name: "Studio Kielo".to_string(),
            short_intro: String::new(),
            rating: 0.0,
            address: String::new(),
            saloon_services: vec![SalonOffer {
                service_id: "svc-1".to_string(),
                price: 60.0,
                duration_minutes: 75,
                is_available: false,
            }],
        };
        assert!(project_salon_detail(&detail, "svc-1").is_empty());
    }

    #[test]
    fn test_error_status_accessor() {
        let err = ApiError::Status {
            status: 404,
            message: "not found".to_string(),
        };
        assert_eq!(err.status(), Some(404));
        assert_eq!(err.to_string(), "HTTP 404: not found");
    }
}
