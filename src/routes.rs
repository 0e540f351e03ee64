//! Typed navigation parameters.
//!
//! Each screen transition carries a tagged payload instead of a bag of
//! optional strings, so "required parameter missing" is caught when the
//! route is built, before any fetch is issued. Payloads are created on
//! selection, consumed by the destination screen, and dropped on
//! back-navigation.

use crate::grouping::ServiceOrigin;
use crate::models::{SaloonData, SaloonServiceRef, Service};
use thiserror::Error;

/// Route construction failures. These map 1:1 to the inline error states
/// the screens render; no network call happens once construction fails.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    #[error("No category selected")]
    NoCategorySelected,
    #[error("No service selected")]
    NoServiceSelected,
}

/// Entry into the Services screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServicesRoute {
    /// From Home: browse one category's catalog.
    ByCategory { category_name: String },
    /// From the map: browse one salon's offering.
    BySalon {
        salon_id: String,
        salon_name: Option<String>,
    },
}

impl ServicesRoute {
    /// Build from loosely-typed parameters. A salon id wins over a
    /// category name, mirroring the screen's data-source priority.
    pub fn from_params(
        category_name: Option<String>,
        salon_id: Option<String>,
        salon_name: Option<String>,
    ) -> Result<Self, RouteError> {
        if let Some(salon_id) = salon_id.filter(|id| !id.is_empty()) {
            return Ok(Self::BySalon {
                salon_id,
                salon_name,
            });
        }
        match category_name.filter(|name| !name.is_empty()) {
            Some(category_name) => Ok(Self::ByCategory { category_name }),
            None => Err(RouteError::NoCategorySelected),
        }
    }

    /// Which grouping strategy this entry point implies.
    pub fn origin(&self) -> ServiceOrigin {
        match self {
            Self::ByCategory { .. } => ServiceOrigin::Category,
            Self::BySalon { .. } => ServiceOrigin::Salon,
        }
    }

    pub fn salon_id(&self) -> Option<&str> {
        match self {
            Self::ByCategory { .. } => None,
            Self::BySalon { salon_id, .. } => Some(salon_id),
        }
    }

    /// Route for the Saloons screen after a service was selected.
    ///
    /// Always forwards the selected service's own id and name, never its
    /// parent's; the display label is the computed one for salon entries
    /// and the category name otherwise.
    pub fn to_saloons(&self, selected: &Service, display_label: &str) -> SaloonsRoute {
        SaloonsRoute {
            service_id: selected.id.clone(),
            service_name: selected.name.clone(),
            category_label: display_label.to_string(),
            salon_id: self.salon_id().map(str::to_string),
        }
    }
}

/// Entry into the Saloons screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaloonsRoute {
    pub service_id: String,
    pub service_name: String,
    pub category_label: String,
    /// Present when the user came through a specific salon; restricts the
    /// screen to that salon.
    pub salon_id: Option<String>,
}

impl SaloonsRoute {
    pub fn from_params(
        service_id: Option<String>,
        service_name: Option<String>,
        category_label: Option<String>,
        salon_id: Option<String>,
    ) -> Result<Self, RouteError> {
        let service_id = service_id
            .filter(|id| !id.is_empty())
            .ok_or(RouteError::NoServiceSelected)?;
        Ok(Self {
            service_id,
            service_name: service_name.unwrap_or_default(),
            category_label: category_label.unwrap_or_default(),
            salon_id: salon_id.filter(|id| !id.is_empty()),
        })
    }

    /// Route for the Checkout screen after a salon card was selected.
    /// Price and duration travel from the salon's join record.
    pub fn to_checkout(&self, saloon: &SaloonData) -> CheckoutRoute {
        CheckoutRoute {
            saloon_id: saloon.id.clone(),
            saloon_name: saloon.name.clone(),
            service_id: self.service_id.clone(),
            service_name: self.service_name.clone(),
            category_label: self.category_label.clone(),
            price: saloon.price,
            duration_minutes: saloon.duration_minutes,
        }
    }
}

/// Entry into the Checkout screen.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutRoute {
    pub saloon_id: String,
    pub saloon_name: String,
    pub service_id: String,
    pub service_name: String,
    pub category_label: String,
    pub price: f64,
    pub duration_minutes: u32,
}

impl CheckoutRoute {
    /// The single booked service as a checkout reference.
    pub fn service_ref(&self) -> SaloonServiceRef {
        SaloonServiceRef::new(self.saloon_id.clone(), self.service_id.clone())
    }
}

/// The navigation stack alphabet.
#[derive(Debug, Clone, PartialEq)]
pub enum Route {
    Home,
    Services(ServicesRoute),
    Saloons(SaloonsRoute),
    Checkout(CheckoutRoute),
}

impl Route {
    /// Short name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Route::Home => "home",
            Route::Services(_) => "services",
            Route::Saloons(_) => "saloons",
            Route::Checkout(_) => "checkout",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sub_service(id: &str, name: &str, parent_id: &str) -> Service {
        Service {
            id: id.to_string(),
            name: name.to_string(),
            description: None,
            category_id: "cat-1".to_string(),
            parent_service_id: Some(parent_id.to_string()),
            price: None,
            duration_minutes: None,
            is_popular: false,
            category: None,
            parent_service: None,
        }
    }

    #[test]
    fn test_services_route_requires_category_without_salon() {
        let result = ServicesRoute::from_params(None, None, None);
        assert_eq!(result, Err(RouteError::NoCategorySelected));
        assert_eq!(
            RouteError::NoCategorySelected.to_string(),
            "No category selected"
        );
    }

    #[test]
    fn test_services_route_salon_id_wins() {
        let route = ServicesRoute::from_params(
            Some("Kynsihoidot".to_string()),
            Some("salon-1".to_string()),
            None,
        )
        .unwrap();
        assert_eq!(route.salon_id(), Some("salon-1"));
        assert_eq!(route.origin(), ServiceOrigin::Salon);
    }

    #[test]
    fn test_services_route_by_category_origin() {
        let route =
            ServicesRoute::from_params(Some("Kynsihoidot".to_string()), None, None).unwrap();
        assert_eq!(route.origin(), ServiceOrigin::Category);
        assert_eq!(route.salon_id(), None);
    }

    #[test]
    fn test_empty_strings_count_as_missing() {
        let result = ServicesRoute::from_params(Some(String::new()), Some(String::new()), None);
        assert_eq!(result, Err(RouteError::NoCategorySelected));
    }

    #[test]
    fn test_saloons_route_requires_service_id() {
        let result = SaloonsRoute::from_params(None, Some("Volume".to_string()), None, None);
        assert_eq!(result, Err(RouteError::NoServiceSelected));
    }

    #[test]
    fn test_selection_forwards_sub_service_identity() {
        let route =
            ServicesRoute::from_params(Some("Ripsienpidennykset".to_string()), None, None)
                .unwrap();
        let selected = sub_service("sub-7", "Volume lashes", "root-1");
        let saloons = route.to_saloons(&selected, "Ripsienpidennykset");
        assert_eq!(saloons.service_id, "sub-7");
        assert_eq!(saloons.service_name, "Volume lashes");
        assert_eq!(saloons.salon_id, None);
    }

    #[test]
    fn test_salon_id_is_carried_through_selection() {
        let route = ServicesRoute::from_params(None, Some("salon-3".to_string()), None).unwrap();
        let selected = sub_service("sub-1", "Classic", "root-1");
        let saloons = route.to_saloons(&selected, "Ripset, Kynnet");
        assert_eq!(saloons.salon_id.as_deref(), Some("salon-3"));
        assert_eq!(saloons.category_label, "Ripset, Kynnet");
    }

    #[test]
    fn test_checkout_route_carries_join_pricing() {
        let saloons = SaloonsRoute {
            service_id: "svc-1".to_string(),
            service_name: "Classic".to_string(),
            category_label: "Ripset".to_string(),
            salon_id: None,
        };
        let saloon = SaloonData {
            id: "salon-9".to_string(),
            name: "Studio Kielo".to_string(),
            short_intro: String::new(),
            price: 79.0,
            duration_minutes: 120,
            is_available: true,
            rating: 5.0,
            address: String::new(),
        };
        let checkout = saloons.to_checkout(&saloon);
        assert_eq!(checkout.saloon_id, "salon-9");
        assert_eq!(checkout.price, 79.0);
        assert_eq!(checkout.duration_minutes, 120);
        assert_eq!(checkout.service_ref().composite_id(), "salon-9:svc-1");
    }
}
