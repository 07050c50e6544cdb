//! modelmap - convention-based object graph mapping
//!
//! modelmap copies data between structurally different types by matching
//! member names. Mapping plans (TypeMaps) are inferred once per source and
//! destination type, cached, and reused for every later call.
//!
//! # Quick Start
//!
//! ```
//! use modelmap::{mappable, ModelMapper};
//!
//! mappable! {
//!     #[derive(Debug, Clone, Default)]
//!     pub struct Customer {
//!         pub name: String,
//!     }
//! }
//!
//! mappable! {
//!     #[derive(Debug, Clone, Default)]
//!     pub struct Order {
//!         pub id: i64,
//!         pub customer: Customer,
//!     }
//! }
//!
//! mappable! {
//!     #[derive(Debug, Clone, Default, PartialEq)]
//!     pub struct OrderSummary {
//!         pub id: String,
//!         pub customer_name: String,
//!     }
//! }
//!
//! let mapper = ModelMapper::new();
//! let order = Order { id: 7, customer: Customer { name: "Ada".into() } };
//! let summary: OrderSummary = mapper.map(&order).unwrap();
//! assert_eq!(summary, OrderSummary { id: "7".into(), customer_name: "Ada".into() });
//! mapper.validate().unwrap();
//! ```
//!
//! # Architecture
//!
//! - `modelmap-core`: values, type descriptions, configuration, errors
//! - `modelmap-matching`: name tokenization and candidate scoring
//! - `modelmap-engine`: descriptor cache, TypeMap store, builder, executor
//!
//! Everything a caller needs is re-exported here.

pub use modelmap_core::*;
pub use modelmap_engine::*;

/// Name tokenization and scoring
pub use modelmap_matching as matching;
