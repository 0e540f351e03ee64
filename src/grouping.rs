//! Service grouping for the Services screen.
//!
//! A flat service list from the API is folded into parent groups with
//! their sub-services. Which strategy applies depends on where the user
//! navigated from: a category (catalog order, parent ids only) or a
//! specific salon (embedded parent records, first-seen order).

use crate::models::Service;
use std::collections::{HashMap, HashSet};

/// Label shown when no category name can be derived from the data.
pub const DEFAULT_CATEGORY_LABEL: &str = "Palvelut";

/// Where the service list was navigated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceOrigin {
    /// Entered from a category: the list is the category's catalog.
    Category,
    /// Entered from one salon: the list is that salon's offering.
    Salon,
}

/// One display group: a root service and the sub-services booked under
/// it. With no sub-services the root itself is the selectable row;
/// otherwise the root is only a header and each sub-service is a row.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceGroup {
    pub root: Service,
    pub sub_services: Vec<Service>,
}

impl ServiceGroup {
    fn singleton(root: Service) -> Self {
        Self {
            root,
            sub_services: Vec::new(),
        }
    }

    /// Services the user can actually select in this group.
    pub fn selectable(&self) -> impl Iterator<Item = &Service> {
        if self.sub_services.is_empty() {
            std::slice::from_ref(&self.root).iter()
        } else {
            self.sub_services.iter()
        }
    }
}

/// Group a flat service list for display.
///
/// Deterministic in input order for both strategies.
pub fn group_services(services: &[Service], origin: ServiceOrigin) -> Vec<ServiceGroup> {
    match origin {
        ServiceOrigin::Category => group_by_parent_id(services),
        ServiceOrigin::Salon => group_by_embedded_parent(services),
    }
}

/// Category-origin strategy: roots are services without a parent id, and
/// each root collects the children pointing at it. Children whose parent
/// is not in the input are dropped, not promoted to roots.
fn group_by_parent_id(services: &[Service]) -> Vec<ServiceGroup> {
    let mut children: HashMap<&str, Vec<Service>> = HashMap::new();
    for service in services {
        if let Some(parent_id) = service.parent_service_id.as_deref() {
            children.entry(parent_id).or_default().push(service.clone());
        }
    }

    services
        .iter()
        .filter(|service| service.parent_service_id.is_none())
        .map(|root| ServiceGroup {
            root: root.clone(),
            sub_services: children.remove(root.id.as_str()).unwrap_or_default(),
        })
        .collect()
}

/// Salon-origin strategy: group by the embedded parent record, in
/// first-seen order. A service without a parent record becomes a
/// singleton group keyed (and de-duplicated) by its own id, so a salon
/// offering a standalone service still gets a header and a bookable row.
fn group_by_embedded_parent(services: &[Service]) -> Vec<ServiceGroup> {
    let mut groups: Vec<ServiceGroup> = Vec::new();
    let mut index_by_id: HashMap<String, usize> = HashMap::new();

    for service in services {
        match &service.parent_service {
            Some(parent) => {
                let slot = *index_by_id.entry(parent.id.clone()).or_insert_with(|| {
                    groups.push(ServiceGroup::singleton((**parent).clone()));
                    groups.len() - 1
                });
                groups[slot].sub_services.push(service.clone());
            }
            None => {
                index_by_id.entry(service.id.clone()).or_insert_with(|| {
                    groups.push(ServiceGroup::singleton(service.clone()));
                    groups.len() - 1
                });
            }
        }
    }

    groups
}

/// Derive the Services screen label from salon-scoped data: the
/// de-duplicated, comma-joined category names found on the services and
/// on their embedded parents, in first-seen order.
pub fn category_label(services: &[Service], fallback: &str) -> String {
    let mut seen = HashSet::new();
    let mut names = Vec::new();
    for service in services {
        let mut push = |name: &str| {
            if seen.insert(name.to_string()) {
                names.push(name.to_string());
            }
        };
        if let Some(category) = &service.category {
            push(&category.name);
        }
        if let Some(category) = service
            .parent_service
            .as_ref()
            .and_then(|parent| parent.category.as_ref())
        {
            push(&category.name);
        }
    }

    if names.is_empty() {
        fallback.to_string()
    } else {
        names.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Category;

    fn service(id: &str, name: &str) -> Service {
        Service {
            id: id.to_string(),
            name: name.to_string(),
            description: None,
            category_id: "cat-1".to_string(),
            parent_service_id: None,
            price: None,
            duration_minutes: None,
            is_popular: false,
            category: None,
            parent_service: None,
        }
    }

    fn child_of(id: &str, name: &str, parent_id: &str) -> Service {
        Service {
            parent_service_id: Some(parent_id.to_string()),
            ..service(id, name)
        }
    }

    fn child_with_embedded(id: &str, name: &str, parent: &Service) -> Service {
        Service {
            parent_service_id: Some(parent.id.clone()),
            parent_service: Some(Box::new(parent.clone())),
            ..service(id, name)
        }
    }

    fn with_category(mut s: Service, category_name: &str) -> Service {
        s.category = Some(Category {
            id: format!("cat-{category_name}"),
            name: category_name.to_string(),
            store_id: None,
        });
        s
    }

    #[test]
    fn test_category_origin_groups_children_under_roots() {
        let input = vec![
            service("root-1", "Lashes"),
            child_of("sub-1", "Classic", "root-1"),
            child_of("sub-2", "Volume", "root-1"),
            service("root-2", "Massage"),
        ];
        let groups = group_services(&input, ServiceOrigin::Category);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].root.id, "root-1");
        assert_eq!(
            groups[0]
                .sub_services
                .iter()
                .map(|s| s.id.as_str())
                .collect::<Vec<_>>(),
            vec!["sub-1", "sub-2"]
        );
        assert!(groups[1].sub_services.is_empty());
    }

    #[test]
    fn test_category_origin_drops_orphans() {
        let input = vec![
            service("root-1", "Lashes"),
            child_of("orphan", "Lost", "missing-parent"),
        ];
        let groups = group_services(&input, ServiceOrigin::Category);
        assert_eq!(groups.len(), 1);
        assert!(groups[0].sub_services.is_empty());
        let all_ids: Vec<_> = groups
            .iter()
            .flat_map(|g| g.sub_services.iter().map(|s| s.id.as_str()))
            .collect();
        assert!(!all_ids.contains(&"orphan"));
    }

    #[test]
    fn test_grouping_is_total_over_non_orphans() {
        let input = vec![
            service("r1", "A"),
            child_of("c1", "A1", "r1"),
            service("r2", "B"),
            child_of("c2", "B1", "r2"),
            child_of("c3", "B2", "r2"),
        ];
        let groups = group_services(&input, ServiceOrigin::Category);
        let mut covered: Vec<&str> = Vec::new();
        for group in &groups {
            assert!(!group.root.id.is_empty());
            assert!(!group.root.name.is_empty());
            if group.sub_services.is_empty() {
                covered.push(group.root.id.as_str());
            } else {
                covered.extend(group.sub_services.iter().map(|s| s.id.as_str()));
                covered.push(group.root.id.as_str());
            }
        }
        covered.sort_unstable();
        let mut expected: Vec<&str> = input.iter().map(|s| s.id.as_str()).collect();
        expected.sort_unstable();
        assert_eq!(covered, expected);
        // No service appears in two groups.
        let deduped: HashSet<_> = covered.iter().collect();
        assert_eq!(deduped.len(), covered.len());
    }

    #[test]
    fn test_grouping_is_deterministic() {
        let parent = service("p1", "Hieronnat");
        let input = vec![
            child_with_embedded("c1", "Klassinen", &parent),
            service("solo", "Gua Sha"),
            child_with_embedded("c2", "Urheilu", &parent),
        ];
        let first = group_services(&input, ServiceOrigin::Salon);
        let second = group_services(&input, ServiceOrigin::Salon);
        assert_eq!(first, second);
    }

    #[test]
    fn test_salon_origin_seeds_group_from_embedded_parent() {
        let parent = service("p1", "Hieronnat");
        let input = vec![
            child_with_embedded("c1", "Klassinen", &parent),
            child_with_embedded("c2", "Urheilu", &parent),
        ];
        let groups = group_services(&input, ServiceOrigin::Salon);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].root.id, "p1");
        assert_eq!(groups[0].root.name, "Hieronnat");
        assert_eq!(groups[0].sub_services.len(), 2);
    }

    #[test]
    fn test_salon_origin_standalone_service_is_singleton_group() {
        let input = vec![service("solo", "Gua Sha")];
        let groups = group_services(&input, ServiceOrigin::Salon);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].root.id, "solo");
        assert!(groups[0].sub_services.is_empty());
    }

    #[test]
    fn test_salon_origin_duplicate_standalone_dedups_by_id() {
        let input = vec![service("solo", "Gua Sha"), service("solo", "Gua Sha")];
        let groups = group_services(&input, ServiceOrigin::Salon);
        assert_eq!(groups.len(), 1);
        assert!(groups[0].sub_services.is_empty());
    }

    #[test]
    fn test_salon_origin_output_follows_first_seen_order() {
        let lashes = service("p-lashes", "Ripset");
        let nails = service("p-nails", "Kynnet");
        let input = vec![
            child_with_embedded("c1", "Classic", &lashes),
            service("solo", "Gua Sha"),
            child_with_embedded("c2", "Gel", &nails),
            child_with_embedded("c3", "Volume", &lashes),
        ];
        let groups = group_services(&input, ServiceOrigin::Salon);
        let order: Vec<_> = groups.iter().map(|g| g.root.id.as_str()).collect();
        assert_eq!(order, vec!["p-lashes", "solo", "p-nails"]);
        assert_eq!(groups[0].sub_services.len(), 2);
    }

    #[test]
    fn test_empty_input_yields_no_groups() {
        assert!(group_services(&[], ServiceOrigin::Category).is_empty());
        assert!(group_services(&[], ServiceOrigin::Salon).is_empty());
    }

    #[test]
    fn test_selectable_rows_follow_group_shape() {
        let parent = service("p1", "Hieronnat");
        let input = vec![
            child_with_embedded("c1", "Klassinen", &parent),
            service("solo", "Gua Sha"),
        ];
        let groups = group_services(&input, ServiceOrigin::Salon);
        let selectable: Vec<_> = groups
            .iter()
            .flat_map(ServiceGroup::selectable)
            .map(|s| s.id.as_str())
            .collect();
        // The parent with children is a header only; its child and the
        // standalone root are the bookable rows.
        assert_eq!(selectable, vec!["c1", "solo"]);
    }

    #[test]
    fn test_category_label_dedups_in_order() {
        let parent = with_category(service("p1", "Hieronnat"), "Hieronnat");
        let input = vec![
            with_category(child_with_embedded("c1", "Klassinen", &parent), "Hieronnat"),
            with_category(service("solo", "Gua Sha"), "Gua Sha hoidot"),
        ];
        assert_eq!(
            category_label(&input, DEFAULT_CATEGORY_LABEL),
            "Hieronnat, Gua Sha hoidot"
        );
    }

    #[test]
    fn test_category_label_reads_parent_category() {
        let parent = with_category(service("p1", "Ripset"), "Ripsienpidennykset");
        let input = vec![child_with_embedded("c1", "Classic", &parent)];
        assert_eq!(
            category_label(&input, DEFAULT_CATEGORY_LABEL),
            "Ripsienpidennykset"
        );
    }

    #[test]
    fn test_category_label_falls_back_when_no_names() {
        let input = vec![service("s1", "Nameless")];
        assert_eq!(
            category_label(&input, DEFAULT_CATEGORY_LABEL),
            DEFAULT_CATEGORY_LABEL
        );
    }
}
