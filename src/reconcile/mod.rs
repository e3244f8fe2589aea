use std::collections::{HashMap, VecDeque};

use tracing::debug;

use crate::model::{CostComponent, Resource, ResourceSchema};

/// Outcome of reshaping one resource, including what could not be placed.
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciliation {
    pub resource: Resource,
    /// Names listed in the schema that had no matching component.
    pub missing: Vec<String>,
    /// Components that the schema does not mention, in pool order. Components
    /// without a string `name` always end up here.
    pub discarded: Vec<CostComponent>,
}

/// Reshapes `resource` so its components follow the golden layout.
///
/// Without a schema, or with an empty one, the resource is returned as is.
pub fn reconcile(resource: &Resource, schema: Option<&ResourceSchema>) -> Resource {
    reconcile_detailed(resource, schema).resource
}

/// Same as [`reconcile`] but also reports unmatched names and dropped
/// components.
pub fn reconcile_detailed(resource: &Resource, schema: Option<&ResourceSchema>) -> Reconciliation {
    let Some(schema) = schema.filter(|schema| !schema.is_empty()) else {
        return Reconciliation {
            resource: resource.clone(),
            missing: Vec::new(),
            discarded: Vec::new(),
        };
    };

    let mut pool = ComponentPool::harvest(resource);
    let mut missing = Vec::new();

    let cost_components = pool.take_all(&schema.cost_components, &mut missing);

    let sub_resources: Vec<Resource> = schema
        .sub_resources
        .iter()
        .filter_map(|expected| {
            let components = pool.take_all(&expected.cost_components, &mut missing);
            if components.is_empty() {
                return None;
            }
            Some(Resource {
                name: expected.name.clone(),
                cost_components: components,
                sub_resources: Vec::new(),
            })
        })
        .collect();

    let discarded = pool.into_remaining();
    if !missing.is_empty() || !discarded.is_empty() {
        debug!(
            resource = %resource.name,
            missing = missing.len(),
            discarded = discarded.len(),
            "components not placed by golden structure"
        );
    }

    Reconciliation {
        resource: Resource {
            name: resource.name.clone(),
            cost_components,
            sub_resources,
        },
        missing,
        discarded,
    }
}

/// Multiset of harvested components keyed by name. Each queue keeps the
/// components in flatten order so the first occurrence is always taken first.
struct ComponentPool {
    by_name: HashMap<String, VecDeque<(usize, CostComponent)>>,
    unnamed: Vec<(usize, CostComponent)>,
}

impl ComponentPool {
    /// Collects top-level components followed by the direct components of
    /// each sub-resource. Deeper levels are not reachable.
    fn harvest(resource: &Resource) -> Self {
        let flattened = resource.cost_components.iter().chain(
            resource
                .sub_resources
                .iter()
                .flat_map(|sub_resource| sub_resource.cost_components.iter()),
        );

        let mut by_name: HashMap<String, VecDeque<(usize, CostComponent)>> = HashMap::new();
        let mut unnamed = Vec::new();
        for (position, component) in flattened.enumerate() {
            match component.name() {
                Some(name) => by_name
                    .entry(name.to_string())
                    .or_default()
                    .push_back((position, component.clone())),
                None => unnamed.push((position, component.clone())),
            }
        }
        Self { by_name, unnamed }
    }

    fn take(&mut self, name: &str) -> Option<CostComponent> {
        self.by_name
            .get_mut(name)
            .and_then(VecDeque::pop_front)
            .map(|(_, component)| component)
    }

    fn take_all(&mut self, names: &[String], missing: &mut Vec<String>) -> Vec<CostComponent> {
        let mut taken = Vec::with_capacity(names.len());
        for name in names {
            match self.take(name) {
                Some(component) => taken.push(component),
                None => missing.push(name.clone()),
            }
        }
        taken
    }

    fn into_remaining(self) -> Vec<CostComponent> {
        let mut remaining: Vec<(usize, CostComponent)> =
            self.by_name.into_values().flatten().collect();
        remaining.extend(self.unnamed);
        remaining.sort_by_key(|(position, _)| *position);
        remaining
            .into_iter()
            .map(|(_, component)| component)
            .collect()
    }
}
