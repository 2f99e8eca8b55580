//! The five site-record resources.
//!
//! Each module owns its record type, create/update validation and axum
//! routes. The resources are independent: no record references another.

pub mod material_in;
pub mod material_out;
pub mod quotation;
pub mod site_entry;
pub mod tax_invoice;
