//! ModelMapper behavior tests
//!
//! Plan inference, TypeMap caching, validation and null handling through
//! the public facade.

#![allow(non_snake_case)]

use modelmap_core::{
    mappable, Configuration, Error, MatchingStrategy, PropertyPath, Result, ValidationIssue,
};
use modelmap_engine::{ModelMapper, PropertyMap};
use std::sync::Arc;

mappable! {
    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct Address {
        pub street: String,
        pub city: String,
    }
}

mappable! {
    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct Customer {
        pub name: String,
        pub address: Address,
    }
}

mappable! {
    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct Order {
        pub id: i64,
        pub customer: Customer,
    }
}

mappable! {
    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct OrderDto {
        pub id: String,
        pub customer_name: String,
        pub customer_address_city: String,
        pub total: f64,
    }
}

mappable! {
    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct Invoice {
        pub number: i64,
        pub customer: Option<Customer>,
    }
}

mappable! {
    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct InvoiceDto {
        pub number: i64,
        pub customer_name: String,
        pub customer_address_city: String,
    }
}

/// Route engine logs to the test output; run with `--nocapture` to see them
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_test_writer()
        .try_init();
}

fn sample_order() -> Order {
    Order {
        id: 42,
        customer: Customer {
            name: "Ada".into(),
            address: Address {
                street: "1 Loop Rd".into(),
                city: "London".into(),
            },
        },
    }
}

// ============================================================================
// Plan inference
// ============================================================================

#[test]
fn test_flattening_by_name() {
    init_tracing();
    let mapper = ModelMapper::new();
    let dto: OrderDto = mapper.map(&sample_order()).unwrap();
    assert_eq!(
        dto,
        OrderDto {
            id: "42".into(),
            customer_name: "Ada".into(),
            customer_address_city: "London".into(),
            total: 0.0,
        }
    );
}

#[test]
fn test_standard_build_is_deterministic() {
    let paths = |mapper: &ModelMapper| -> Vec<(PropertyPath, PropertyPath)> {
        let tm = mapper.create_type_map::<Order, OrderDto>().unwrap();
        tm.mappings()
            .iter()
            .map(|m| (m.source_path(), m.destination_path()))
            .collect()
    };

    let first = paths(&ModelMapper::new());
    let second = paths(&ModelMapper::new());
    assert_eq!(first, second);
    assert_eq!(
        first,
        vec![
            (PropertyPath::parse("customer.address.city"), PropertyPath::parse("customer_address_city")),
            (PropertyPath::parse("customer.name"), PropertyPath::parse("customer_name")),
            (PropertyPath::parse("id"), PropertyPath::parse("id")),
        ]
    );
}

#[test]
fn test_map_reuses_type_map() {
    let mapper = ModelMapper::new();
    let order = sample_order();

    let a: OrderDto = mapper.map(&order).unwrap();
    let tm = mapper.get_type_map::<Order, OrderDto>().unwrap();
    let b: OrderDto = mapper.map(&order).unwrap();

    assert_eq!(a, b);
    assert!(Arc::ptr_eq(&tm, &mapper.get_type_map::<Order, OrderDto>().unwrap()));
    assert_eq!(mapper.type_maps().len(), 1);
}

#[test]
fn test_mappers_do_not_share_caches() {
    let a = ModelMapper::new();
    let b = ModelMapper::new();
    a.create_type_map::<Order, OrderDto>().unwrap();
    assert!(b.get_type_map::<Order, OrderDto>().is_none());
    b.create_type_map::<Order, OrderDto>().unwrap();
}

// ============================================================================
// Explicit creation
// ============================================================================

#[test]
fn test_duplicate_create_fails() {
    let mapper = ModelMapper::new();
    mapper.create_type_map::<Order, OrderDto>().unwrap();
    let err = mapper.create_type_map::<Order, OrderDto>().unwrap_err();
    assert!(matches!(err, Error::DuplicateTypeMap { .. }));
    assert!(err.is_configuration());
}

#[test]
fn test_create_after_implicit_map_fails() {
    let mapper = ModelMapper::new();
    let _: OrderDto = mapper.map(&sample_order()).unwrap();
    assert!(mapper.create_type_map::<Order, OrderDto>().is_err());
}

#[test]
fn test_named_type_maps_are_distinct() {
    let mapper = ModelMapper::new();
    let unnamed = mapper.create_type_map::<Order, OrderDto>().unwrap();
    let named = mapper.create_named_type_map::<Order, OrderDto>("summary").unwrap();
    assert!(!Arc::ptr_eq(&unnamed, &named));
    assert_eq!(named.name(), Some("summary"));
    assert!(mapper.get_named_type_map::<Order, OrderDto>("summary").is_some());
    assert!(mapper.get_named_type_map::<Order, OrderDto>("other").is_none());

    let err = mapper
        .create_named_type_map::<Order, OrderDto>("summary")
        .unwrap_err();
    assert!(err.to_string().contains("named 'summary'"));
}

#[test]
fn test_map_named_uses_named_plan() {
    let mapper = ModelMapper::new();
    let overrides = PropertyMap::<Order, OrderDto>::named("street")
        .map("customer.address.street", "customer_address_city");
    mapper.add_mappings(overrides).unwrap();

    let dto: OrderDto = mapper.map_named(&sample_order(), "street").unwrap();
    assert_eq!(dto.customer_address_city, "1 Loop Rd");
    let dto: OrderDto = mapper.map(&sample_order()).unwrap();
    assert_eq!(dto.customer_address_city, "London");
}

#[test]
fn test_type_map_with_own_configuration() {
    let mapper = ModelMapper::new();
    let config = Configuration::new()
        .with_matching_strategy(MatchingStrategy::Exact)
        .with_converter::<i64, String, _>(|n: i64| -> Result<String> { Ok(format!("#{}", n)) })
        .unwrap();
    let tm = mapper.create_type_map_with::<Order, OrderDto>(config).unwrap();
    assert_eq!(tm.configuration().matching_strategy(), MatchingStrategy::Exact);
    assert!(tm.mapping_for(&PropertyPath::parse("id")).is_some());
    assert_eq!(mapper.configuration().matching_strategy(), MatchingStrategy::Standard);

    // execution follows the TypeMap's configuration, not the mapper's
    let dto: OrderDto = mapper.map(&sample_order()).unwrap();
    assert_eq!(dto.id, "#42");
}

#[test]
fn test_type_maps_are_ordered() {
    let mapper = ModelMapper::new();
    mapper.create_type_map::<Order, OrderDto>().unwrap();
    mapper.create_type_map::<Invoice, InvoiceDto>().unwrap();
    mapper.create_type_map::<Customer, Address>().unwrap();
    let sources: Vec<String> = mapper
        .type_maps()
        .iter()
        .map(|tm| tm.source_type().to_string())
        .collect();
    assert_eq!(sources, vec!["Customer", "Invoice", "Order"]);
}

// ============================================================================
// Validation
// ============================================================================

#[test]
fn test_unmapped_leaf_reported_once() {
    let mapper = ModelMapper::new();
    mapper.create_type_map::<Order, OrderDto>().unwrap();

    let err = mapper.validate().unwrap_err();
    let issues = err.issues();
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].path(), "total");
    assert!(matches!(issues[0], ValidationIssue::Unmapped { .. }));
    assert!(err.to_string().contains("Unmapped destination property total"));
}

#[test]
fn test_global_converter_clears_issues() {
    let mapper = ModelMapper::new();
    mapper.create_type_map::<Order, OrderDto>().unwrap();
    assert!(mapper.validate().is_err());

    mapper
        .add_converter::<Order, OrderDto, _>(|o: Order| -> Result<OrderDto> {
            Ok(OrderDto {
                id: format!("ORD-{}", o.id),
                customer_name: o.customer.name,
                customer_address_city: o.customer.address.city,
                total: 9.5,
            })
        })
        .unwrap();

    assert!(mapper.validate().is_ok());
    let dto: OrderDto = mapper.map(&sample_order()).unwrap();
    assert_eq!(dto.id, "ORD-42");
    assert_eq!(dto.total, 9.5);
}

#[test]
fn test_second_global_converter_rejected() {
    let mapper = ModelMapper::new();
    let convert = |a: Address| -> Result<Customer> {
        Ok(Customer {
            name: a.city,
            address: Address::default(),
        })
    };
    mapper.add_converter::<Address, Customer, _>(convert).unwrap();
    let err = mapper.add_converter::<Address, Customer, _>(convert).unwrap_err();
    assert!(err.is_configuration());
}

#[test]
fn test_validation_passes_for_complete_plan() {
    let mapper = ModelMapper::new();
    mapper.create_type_map::<Invoice, InvoiceDto>().unwrap();
    assert!(mapper.validate().is_ok());
}

mappable! {
    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct Person {
        pub firstName: String,
        pub first_Name: String,
    }
}

mappable! {
    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct PersonDto {
        pub firstName: String,
    }
}

#[test]
fn test_equal_scores_are_ambiguous() {
    init_tracing();
    let mapper = ModelMapper::new();
    let tm = mapper.create_type_map::<Person, PersonDto>().unwrap();
    assert!(tm.mappings().is_empty());
    assert_eq!(tm.ambiguities().len(), 1);

    let err = mapper.validate().unwrap_err();
    match &err.issues()[0] {
        ValidationIssue::Ambiguous { path, candidates, .. } => {
            assert_eq!(path, "firstName");
            assert_eq!(candidates, &vec!["firstName".to_string(), "first_Name".to_string()]);
        }
        other => panic!("unexpected issue {:?}", other),
    }

    // gaps leave the destination untouched
    let person = Person {
        firstName: "a".into(),
        first_Name: "b".into(),
    };
    let dto: PersonDto = mapper.map(&person).unwrap();
    assert_eq!(dto, PersonDto::default());
}

#[test]
fn test_override_resolves_ambiguity() {
    let mapper = ModelMapper::new();
    mapper
        .add_mappings(PropertyMap::<Person, PersonDto>::new().map("first_Name", "firstName"))
        .unwrap();
    assert!(mapper.validate().is_ok());
    let dto: PersonDto = mapper
        .map(&Person {
            firstName: "a".into(),
            first_Name: "b".into(),
        })
        .unwrap();
    assert_eq!(dto.firstName, "b");
}

#[test]
fn test_override_with_unknown_path_fails() {
    let mapper = ModelMapper::new();
    let err = mapper
        .add_mappings(PropertyMap::<Person, PersonDto>::new().map("lastName", "firstName"))
        .unwrap_err();
    assert!(matches!(err, Error::InvalidPath { .. }));
    assert!(mapper.type_maps().is_empty());
}

// ============================================================================
// Nested field access
// ============================================================================

mod fields {
    use super::*;

    mappable! {
        #[derive(Debug, Clone, Default)]
        pub struct Address {
            street: String,
            city: String,
        }
    }

    mappable! {
        #[derive(Debug, Clone, Default)]
        pub struct Customer {
            address: Address,
        }
    }

    mappable! {
        #[derive(Debug, Clone, Default)]
        pub struct Order {
            customer: Customer,
        }
    }

    mappable! {
        #[derive(Debug, Clone, Default, PartialEq)]
        pub struct OrderDTO {
            customerAddressStreet: String,
            customerAddressCity: String,
        }
    }

    fn order() -> Order {
        Order {
            customer: Customer {
                address: Address {
                    street: "1 Main St".into(),
                    city: "SF".into(),
                },
            },
        }
    }

    #[test]
    fn test_three_levels_loose_with_field_access() {
        let mapper = ModelMapper::with_configuration(
            Configuration::new()
                .with_matching_strategy(MatchingStrategy::Loose)
                .with_field_access(true),
        );
        let dto: OrderDTO = mapper.map(&order()).unwrap();
        assert_eq!(
            dto,
            OrderDTO {
                customerAddressStreet: "1 Main St".into(),
                customerAddressCity: "SF".into(),
            }
        );
        assert!(mapper.validate().is_ok());
    }

    #[test]
    fn test_fields_hidden_without_field_access() {
        let mapper = ModelMapper::new();
        let dto: OrderDTO = mapper.map(&order()).unwrap();
        assert_eq!(dto, OrderDTO::default());
        let tm = mapper.get_type_map::<Order, OrderDTO>().unwrap();
        assert!(tm.mappings().is_empty());
    }
}

// ============================================================================
// Null propagation
// ============================================================================

#[test]
fn test_null_branch_is_skipped() {
    init_tracing();
    let mapper = ModelMapper::new();
    let invoice = Invoice {
        number: 7,
        customer: None,
    };
    let dto: InvoiceDto = mapper.map(&invoice).unwrap();
    assert_eq!(
        dto,
        InvoiceDto {
            number: 7,
            ..InvoiceDto::default()
        }
    );
}

#[test]
fn test_null_branch_keeps_existing_values() {
    let mapper = ModelMapper::new();
    let mut dto = InvoiceDto {
        number: 1,
        customer_name: "kept".into(),
        customer_address_city: "also kept".into(),
    };
    mapper
        .map_into(
            &Invoice {
                number: 2,
                customer: None,
            },
            &mut dto,
        )
        .unwrap();
    assert_eq!(dto.number, 2);
    assert_eq!(dto.customer_name, "kept");
    assert_eq!(dto.customer_address_city, "also kept");
}

#[test]
fn test_present_branch_is_mapped() {
    let mapper = ModelMapper::new();
    let invoice = Invoice {
        number: 3,
        customer: Some(sample_order().customer),
    };
    let dto: InvoiceDto = mapper.map(&invoice).unwrap();
    assert_eq!(dto.customer_name, "Ada");
    assert_eq!(dto.customer_address_city, "London");
}
