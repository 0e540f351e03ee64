//! Fetch pipeline between screens and the API client.
//!
//! Screens describe what they need as a [`FetchRequest`]; the app runs it
//! on the tokio runtime and feeds the [`FetchReply`] back through the
//! event loop. Every issued request gets a generation number from a
//! [`RequestGuard`], and a reply is applied only when it still matches
//! the latest generation — a stale response can never overwrite a newer
//! one.

use crate::api::{ApiClient, ApiError};
use crate::models::{
    Category, CheckoutResponse, CustomerInfo, SaloonData, SaloonServiceRef, Service,
};

/// A screen's data requirement, kept by the screen for manual retry: the
/// retry key re-issues exactly this value.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchRequest {
    Categories,
    ServicesByCategory {
        category_name: String,
    },
    ServicesBySalon {
        salon_id: String,
    },
    SaloonsByService {
        service_id: String,
    },
    SalonById {
        salon_id: String,
        service_id: String,
    },
    Checkout {
        refs: Vec<SaloonServiceRef>,
        customer_info: CustomerInfo,
        auth_token: Option<String>,
    },
}

/// Successful fetch payloads, one variant per request family.
#[derive(Debug, Clone)]
pub enum FetchOutcome {
    Categories(Vec<Category>),
    Services(Vec<Service>),
    Saloons(Vec<SaloonData>),
    Checkout(CheckoutResponse),
}

/// What comes back over the reply channel.
#[derive(Debug)]
pub struct FetchReply {
    pub generation: u64,
    pub result: Result<FetchOutcome, ApiError>,
}

/// Monotonic request-generation counter.
///
/// Issue a generation per dispatched request; accept a reply only when
/// its generation is still the latest. Superseded requests are simply
/// ignored when they resolve.
#[derive(Debug, Default)]
pub struct RequestGuard {
    latest: u64,
}

impl RequestGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stamp a new request; all earlier generations become stale.
    pub fn issue(&mut self) -> u64 {
        self.latest += 1;
        self.latest
    }

    /// True when a reply with this generation may update state.
    pub fn accepts(&self, generation: u64) -> bool {
        generation == self.latest
    }
}

/// Per-screen load state.
#[derive(Debug, Clone)]
pub enum LoadState<T> {
    Loading,
    Failed(String),
    Ready(T),
}

impl<T> LoadState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::Loading)
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            LoadState::Ready(data) => Some(data),
            _ => None,
        }
    }
}

/// Run one request against the API client.
pub async fn execute(api: &ApiClient, request: FetchRequest) -> Result<FetchOutcome, ApiError> {
    match request {
        FetchRequest::Categories => api.categories().await.map(FetchOutcome::Categories),
        FetchRequest::ServicesByCategory { category_name } => api
            .services_by_category(&category_name)
            .await
            .map(FetchOutcome::Services),
        FetchRequest::ServicesBySalon { salon_id } => api
            .services_by_salon(&salon_id)
            .await
            .map(FetchOutcome::Services),
        FetchRequest::SaloonsByService { service_id } => api
            .saloons_by_service(&service_id)
            .await
            .map(FetchOutcome::Saloons),
        FetchRequest::SalonById {
            salon_id,
            service_id,
        } => api
            .salon_by_id(&salon_id, &service_id)
            .await
            .map(FetchOutcome::Saloons),
        FetchRequest::Checkout {
            refs,
            customer_info,
            auth_token,
        } => api
            .checkout(&refs, customer_info, auth_token.as_deref())
            .await
            .map(FetchOutcome::Checkout),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generations_are_monotonic() {
        let mut guard = RequestGuard::new();
        let first = guard.issue();
        let second = guard.issue();
        assert!(second > first);
    }

    #[test]
    fn test_only_latest_generation_is_accepted() {
        let mut guard = RequestGuard::new();
        let stale = guard.issue();
        let latest = guard.issue();
        assert!(!guard.accepts(stale));
        assert!(guard.accepts(latest));
    }

    #[test]
    fn test_reply_ordering_does_not_matter() {
        // A fast parameter change issues a second request while the first
        // is in flight; whichever order replies land in, only the second
        // may touch state.
        let mut guard = RequestGuard::new();
        let first = guard.issue();
        let second = guard.issue();
        for generation in [second, first] {
            if guard.accepts(generation) {
                assert_eq!(generation, second);
            }
        }
        assert!(!guard.accepts(first));
    }

    #[test]
    fn test_load_state_accessors() {
        let loading: LoadState<Vec<Category>> = LoadState::Loading;
        assert!(loading.is_loading());
        assert!(loading.data().is_none());
        let ready = LoadState::Ready(vec![1, 2, 3]);
        assert_eq!(ready.data().map(Vec::len), Some(3));
    }
}
