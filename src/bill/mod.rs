//! Invoice document model.
//!
//! An [`Invoice`] is a [`Document`](crate::registry::Document): the registry
//! normalizes it, applies the scenarios of the [`SCHEMA_INVOICE`] schema,
//! calculates the line sums and tax totals, then validates the result.
//! Build invoices with [`InvoiceBuilder`].

mod builder;
mod invoice;

pub use builder::{InvoiceBuilder, LineBuilder, PartyBuilder};
pub use invoice::{
    Invoice, InvoiceTax, InvoiceType, Item, Line, Party, SCHEMA_INVOICE, Totals,
};
