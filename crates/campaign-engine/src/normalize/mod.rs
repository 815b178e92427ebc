//! # Contact Normalization
//!
//! Applies a user-confirmed [`ColumnMapping`](crate::mapping::ColumnMapping)
//! to uploaded rows and produces [`Contact`](crate::types::Contact) values:
//! trimmed names, digits-only phones (optionally with the country code) and
//! up to three extra fields.
//!
//! Bad cells never fail the batch. A row whose phone has no digits still
//! yields a contact, with `phone: None`.
//!
//! ## Example
//!
//! ```
//! use campaign_engine::mapping::{ColumnMapping, LogicalField};
//! use campaign_engine::normalize::ContactNormalizer;
//!
//! let headers = vec!["Nome".to_string(), "Fone".to_string()];
//! let rows = vec![vec!["Ana".to_string(), "11999998888".to_string()]];
//! let mapping = ColumnMapping::default()
//!     .with(LogicalField::Name, 0)
//!     .with(LogicalField::Phone, 1);
//!
//! let contacts = ContactNormalizer::default().normalize(&rows, &mapping, true, &headers);
//! assert_eq!(contacts[0].phone.as_deref(), Some("5511999998888"));
//! ```

pub mod contacts;
pub mod phone;

pub use contacts::{rows_to_objects, ContactNormalizer};
pub use phone::normalize_phone;
