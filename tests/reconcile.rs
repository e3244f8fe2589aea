use golden_tools::model::{CostComponent, Resource, ResourceSchema, SubResourceSchema};
use golden_tools::reconcile::{reconcile, reconcile_detailed};
use golden_tools::report::parse_report;
use serde_json::json;

fn resource(value: serde_json::Value) -> Resource {
    serde_json::from_value(value).expect("resource deserialised")
}

fn component_names(components: &[CostComponent]) -> Vec<&str> {
    components
        .iter()
        .map(|component| component.name().unwrap_or(""))
        .collect()
}

fn storage_schema() -> ResourceSchema {
    ResourceSchema {
        cost_components: vec!["Instance hours".to_string()],
        sub_resources: vec![SubResourceSchema {
            name: "Storage".to_string(),
            cost_components: vec!["Data storage".to_string(), "Operations".to_string()],
        }],
    }
}

#[test]
fn example_record_follows_golden_layout() {
    let report = parse_report(concat!(
        " azurerm_example\n",
        " ├─ Instance hours                100  hours   $10\n",
        " └─ Storage\n",
        "    ├─ Data storage                50  GB      $5\n",
        "    └─ Operations            1,000  10k operations  $1\n",
    ));
    let record = resource(json!({
        "name": "azurerm_example",
        "costComponents": [{"name": "Operations"}, {"name": "Instance hours"}],
        "subResources": [
            {"name": "Storage", "costComponents": [{"name": "Data storage"}]}
        ]
    }));

    let reshaped = reconcile(&record, report.schemas.get("azurerm_example"));

    let expected = resource(json!({
        "name": "azurerm_example",
        "costComponents": [{"name": "Instance hours"}],
        "subResources": [
            {
                "name": "Storage",
                "costComponents": [{"name": "Data storage"}, {"name": "Operations"}],
                "subResources": []
            }
        ]
    }));
    assert_eq!(reshaped, expected);
}

#[test]
fn reconciling_twice_changes_nothing() {
    let record = resource(json!({
        "name": "azurerm_example",
        "costComponents": [{"name": "Data storage"}, {"name": "Operations"}],
        "subResources": [
            {"name": "Misc", "costComponents": [{"name": "Instance hours"}]}
        ]
    }));
    let schema = storage_schema();

    let once = reconcile(&record, Some(&schema));
    let twice = reconcile(&once, Some(&schema));

    assert_eq!(once, twice);
}

#[test]
fn output_order_follows_schema_not_input() {
    let schema = ResourceSchema {
        cost_components: vec!["C".to_string(), "A".to_string()],
        sub_resources: vec![
            SubResourceSchema {
                name: "Second".to_string(),
                cost_components: vec!["E".to_string(), "D".to_string()],
            },
            SubResourceSchema {
                name: "First".to_string(),
                cost_components: vec!["B".to_string()],
            },
        ],
    };
    let record = resource(json!({
        "name": "azurerm_ordered",
        "costComponents": [{"name": "D"}, {"name": "A"}],
        "subResources": [
            {"name": "First", "costComponents": [{"name": "E"}, {"name": "C"}]},
            {"name": "Other", "costComponents": [{"name": "B"}]}
        ]
    }));

    let reshaped = reconcile(&record, Some(&schema));

    assert_eq!(component_names(&reshaped.cost_components), vec!["C", "A"]);
    let groups: Vec<(&str, Vec<&str>)> = reshaped
        .sub_resources
        .iter()
        .map(|group| (group.name.as_str(), component_names(&group.cost_components)))
        .collect();
    assert_eq!(
        groups,
        vec![("Second", vec!["E", "D"]), ("First", vec!["B"])]
    );
    assert!(
        reshaped
            .sub_resources
            .iter()
            .all(|group| group.sub_resources.is_empty())
    );
}

#[test]
fn components_unknown_to_schema_are_dropped() {
    let record = resource(json!({
        "name": "azurerm_example",
        "costComponents": [
            {"name": "Instance hours"},
            {"name": "Legacy charge"},
            {"name": "Data storage"}
        ],
        "subResources": [
            {"name": "Storage", "costComponents": [{"name": "Retired"}]}
        ]
    }));

    let outcome = reconcile_detailed(&record, Some(&storage_schema()));

    let all_names: Vec<&str> = outcome
        .resource
        .cost_components
        .iter()
        .chain(
            outcome
                .resource
                .sub_resources
                .iter()
                .flat_map(|group| group.cost_components.iter()),
        )
        .map(|component| component.name().unwrap_or(""))
        .collect();
    assert_eq!(all_names, vec!["Instance hours", "Data storage"]);
    assert_eq!(
        component_names(&outcome.discarded),
        vec!["Legacy charge", "Retired"]
    );
}

#[test]
fn schema_names_absent_from_record_are_skipped() {
    let record = resource(json!({
        "name": "azurerm_example",
        "costComponents": [{"name": "Operations"}]
    }));

    let outcome = reconcile_detailed(&record, Some(&storage_schema()));

    assert!(outcome.resource.cost_components.is_empty());
    assert_eq!(outcome.resource.sub_resources.len(), 1);
    assert_eq!(
        component_names(&outcome.resource.sub_resources[0].cost_components),
        vec!["Operations"]
    );
    assert_eq!(outcome.missing, vec!["Instance hours", "Data storage"]);
    assert!(outcome.discarded.is_empty());
}

#[test]
fn sub_resources_without_matches_are_pruned() {
    let schema = ResourceSchema {
        cost_components: vec!["Instance hours".to_string()],
        sub_resources: vec![
            SubResourceSchema {
                name: "Backups".to_string(),
                cost_components: vec!["Snapshot storage".to_string()],
            },
            SubResourceSchema {
                name: "Storage".to_string(),
                cost_components: vec!["Data storage".to_string()],
            },
        ],
    };
    let record = resource(json!({
        "name": "azurerm_example",
        "costComponents": [{"name": "Data storage"}, {"name": "Instance hours"}]
    }));

    let reshaped = reconcile(&record, Some(&schema));

    let group_names: Vec<&str> = reshaped
        .sub_resources
        .iter()
        .map(|group| group.name.as_str())
        .collect();
    assert_eq!(group_names, vec!["Storage"]);
}

#[test]
fn missing_or_empty_schema_returns_record_unchanged() {
    let record = resource(json!({
        "name": "azurerm_untouched",
        "costComponents": [{"name": "B"}, {"name": "A"}],
        "subResources": [
            {
                "name": "Outer",
                "costComponents": [],
                "subResources": [{"name": "Inner", "costComponents": [{"name": "C"}]}]
            }
        ]
    }));

    assert_eq!(reconcile(&record, None), record);
    assert_eq!(reconcile(&record, Some(&ResourceSchema::default())), record);
}

#[test]
fn duplicate_names_are_consumed_in_pool_order() {
    let schema = ResourceSchema {
        cost_components: vec!["Requests".to_string()],
        sub_resources: vec![SubResourceSchema {
            name: "Premium".to_string(),
            cost_components: vec!["Requests".to_string()],
        }],
    };
    let mut premium = Resource::new("Premium");
    premium
        .cost_components
        .push(CostComponent::new("Requests").with("tier", "second"));
    let mut record = Resource::new("azurerm_function_app.app");
    record
        .cost_components
        .push(CostComponent::new("Requests").with("tier", "first"));
    record.sub_resources.push(premium);

    let reshaped = reconcile(&record, Some(&schema));

    assert_eq!(
        reshaped.cost_components[0].get("tier"),
        Some(&json!("first"))
    );
    assert_eq!(
        reshaped.sub_resources[0].cost_components[0].get("tier"),
        Some(&json!("second"))
    );
}

#[test]
fn component_payload_is_preserved() {
    let mut record = Resource::new("azurerm_example");
    record.cost_components.push(
        CostComponent::new("Instance hours")
            .with("unit", "hours")
            .with("monthlyQuantity", "730")
            .with("price", "0.0104")
            .with("priceHash", "abc-123"),
    );

    let reshaped = reconcile(&record, Some(&storage_schema()));

    assert_eq!(reshaped.cost_components, record.cost_components);
}

#[test]
fn components_without_string_name_are_discarded() {
    let record = resource(json!({
        "name": "azurerm_example",
        "costComponents": [
            {"unit": "hours"},
            {"name": "Instance hours"},
            {"name": 42}
        ]
    }));

    let outcome = reconcile_detailed(&record, Some(&storage_schema()));

    assert_eq!(
        component_names(&outcome.resource.cost_components),
        vec!["Instance hours"]
    );
    assert_eq!(
        serde_json::to_value(&outcome.discarded).expect("components serialised"),
        json!([{"unit": "hours"}, {"name": 42}])
    );
}

#[test]
fn components_nested_below_first_level_are_not_harvested() {
    let schema = ResourceSchema {
        cost_components: vec!["Deep".to_string(), "Shallow".to_string()],
        sub_resources: Vec::new(),
    };
    let record = resource(json!({
        "name": "azurerm_nested",
        "subResources": [
            {
                "name": "Outer",
                "costComponents": [{"name": "Shallow"}],
                "subResources": [{"name": "Inner", "costComponents": [{"name": "Deep"}]}]
            }
        ]
    }));

    let outcome = reconcile_detailed(&record, Some(&schema));

    assert_eq!(
        component_names(&outcome.resource.cost_components),
        vec!["Shallow"]
    );
    assert_eq!(outcome.missing, vec!["Deep"]);
    assert!(outcome.resource.sub_resources.is_empty());
}
