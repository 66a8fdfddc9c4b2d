use chrono::NaiveDate;

use super::invoice::*;
use crate::core::{Code, FiskalError, Key, Note};
use crate::num::Amount;
use crate::registry::Registry;
use crate::tax::{Combo, ExtValue, Extensions, Identity};

/// Builder for invoices that are normalized, calculated and validated
/// against a registry.
///
/// ```
/// use chrono::NaiveDate;
/// use fiskal::bill::{InvoiceBuilder, LineBuilder, PartyBuilder};
/// use fiskal::core::Key;
/// use fiskal::registry::Registry;
/// use fiskal::tax::{CATEGORY_VAT, Combo};
///
/// let registry = Registry::bundled();
/// let invoice = InvoiceBuilder::new("ES", "F-2024-001", NaiveDate::from_ymd_opt(2024, 3, 1).unwrap())
///     .supplier(PartyBuilder::new("Provide One S.L.").tax_id("ES", "B98602642").build())
///     .customer(PartyBuilder::new("Sample Consumer").build())
///     .add_line(
///         LineBuilder::new("Development services", "20".parse().unwrap(), "90.00".parse().unwrap())
///             .tax(Combo::new(CATEGORY_VAT).with_rate(Key::from("general")))
///             .build(),
///     )
///     .build(&registry)
///     .unwrap();
///
/// let totals = invoice.totals.unwrap();
/// assert_eq!(totals.sum.to_string(), "1800.00");
/// assert_eq!(totals.payable.to_string(), "2178.00");
/// ```
pub struct InvoiceBuilder {
    regime: Code,
    addons: Vec<Key>,
    kind: InvoiceType,
    tags: Vec<Key>,
    code: String,
    issue_date: NaiveDate,
    currency: Code,
    supplier: Option<Party>,
    customer: Option<Party>,
    lines: Vec<Line>,
    prices_include: Option<Code>,
    ext: Extensions,
    notes: Vec<Note>,
}

impl InvoiceBuilder {
    pub fn new(regime: impl Into<Code>, code: impl Into<String>, issue_date: NaiveDate) -> Self {
        Self {
            regime: regime.into(),
            addons: Vec::new(),
            kind: InvoiceType::Standard,
            tags: Vec::new(),
            code: code.into(),
            issue_date,
            currency: Code::EMPTY,
            supplier: None,
            customer: None,
            lines: Vec::new(),
            prices_include: None,
            ext: Extensions::new(),
            notes: Vec::new(),
        }
    }

    pub fn addon(mut self, key: impl Into<Key>) -> Self {
        self.addons.push(key.into());
        self
    }

    pub fn kind(mut self, kind: InvoiceType) -> Self {
        self.kind = kind;
        self
    }

    pub fn tag(mut self, tag: impl Into<Key>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn currency(mut self, code: impl Into<Code>) -> Self {
        self.currency = code.into();
        self
    }

    pub fn supplier(mut self, party: Party) -> Self {
        self.supplier = Some(party);
        self
    }

    pub fn customer(mut self, party: Party) -> Self {
        self.customer = Some(party);
        self
    }

    pub fn add_line(mut self, line: Line) -> Self {
        self.lines.push(line);
        self
    }

    /// Line prices already include this tax category.
    pub fn prices_include(mut self, category: impl Into<Code>) -> Self {
        self.prices_include = Some(category.into());
        self
    }

    pub fn ext(mut self, key: impl Into<Key>, value: impl Into<ExtValue>) -> Self {
        self.ext.set(key.into(), value);
        self
    }

    pub fn note(mut self, note: Note) -> Self {
        self.notes.push(note);
        self
    }

    /// Build the invoice and run it through the registry: normalization,
    /// scenarios, calculation and validation. All validation errors are
    /// returned together.
    pub fn build(self, registry: &Registry) -> Result<Invoice, FiskalError> {
        let mut invoice = self.build_unchecked()?;
        registry.process(&mut invoice)?;
        Ok(invoice)
    }

    /// Build the invoice without calculating it. Only the builder's own
    /// requirements are checked.
    pub fn build_unchecked(self) -> Result<Invoice, FiskalError> {
        let supplier = self
            .supplier
            .ok_or_else(|| FiskalError::Builder("supplier is required".into()))?;

        if self.lines.is_empty() {
            return Err(FiskalError::Builder(
                "at least one line item is required".into(),
            ));
        }

        // Input limits to prevent abuse
        if self.lines.len() > 10_000 {
            return Err(FiskalError::Builder(
                "invoice cannot have more than 10,000 line items".into(),
            ));
        }
        if self.code.len() > 200 {
            return Err(FiskalError::Builder(
                "invoice code cannot exceed 200 characters".into(),
            ));
        }

        let tax = (self.prices_include.is_some() || !self.ext.is_empty()).then(|| InvoiceTax {
            prices_include: self.prices_include,
            ext: self.ext,
        });

        Ok(Invoice {
            regime: self.regime,
            addons: self.addons,
            kind: self.kind,
            tags: self.tags,
            code: self.code,
            issue_date: self.issue_date,
            currency: self.currency,
            supplier,
            customer: self.customer,
            lines: self.lines,
            tax,
            notes: self.notes,
            totals: None,
        })
    }
}

/// Builder for parties.
pub struct PartyBuilder {
    name: String,
    tax_id: Option<Identity>,
}

impl PartyBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tax_id: None,
        }
    }

    pub fn tax_id(mut self, country: impl Into<Code>, code: impl Into<Code>) -> Self {
        self.tax_id = Some(Identity::new(country.into(), code.into()));
        self
    }

    pub fn build(self) -> Party {
        Party {
            name: self.name,
            tax_id: self.tax_id,
        }
    }
}

/// Builder for invoice lines.
pub struct LineBuilder {
    quantity: Amount,
    item: Item,
    taxes: Vec<Combo>,
}

impl LineBuilder {
    pub fn new(name: impl Into<String>, quantity: Amount, price: Amount) -> Self {
        Self {
            quantity,
            item: Item {
                name: name.into(),
                price,
                unit: None,
            },
            taxes: Vec::new(),
        }
    }

    pub fn unit(mut self, unit: impl Into<String>) -> Self {
        self.item.unit = Some(unit.into());
        self
    }

    pub fn tax(mut self, combo: Combo) -> Self {
        self.taxes.push(combo);
        self
    }

    pub fn build(self) -> Line {
        Line {
            index: 0,
            quantity: self.quantity,
            item: self.item,
            taxes: self.taxes,
            sum: Amount::default(),
        }
    }
}
