use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::core::{Code, FiskalError, Key, Note, ValidationError, ValidationErrors, currencies};
use crate::num::Amount;
use crate::registry::{Context, Document, Node};
use crate::tax::{
    Combo, Extensions, Identity, ScenarioSummary, TaxableLine, Total, TotalCalculator,
};

/// Schema identifier matched by scenario and correction sets.
pub const SCHEMA_INVOICE: &str = "bill/invoice";

const OUT_OF_RANGE: &str = "amount out of range";

fn out_of_range(field: &str) -> FiskalError {
    FiskalError::Validation(ValidationErrors::from(vec![ValidationError::new(field, OUT_OF_RANGE)]))
}

/// Kind of invoice, matched by scenarios.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InvoiceType {
    #[default]
    Standard,
    CreditNote,
    Corrective,
    Proforma,
}

impl InvoiceType {
    pub fn key(&self) -> Key {
        Key::from_static(match self {
            InvoiceType::Standard => "standard",
            InvoiceType::CreditNote => "credit-note",
            InvoiceType::Corrective => "corrective",
            InvoiceType::Proforma => "proforma",
        })
    }
}

/// An invoice in the regime's terms: the lines carry tax combos, the
/// totals are calculated from them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    /// Country code of the tax regime.
    pub regime: Code,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub addons: Vec<Key>,
    #[serde(rename = "type", default)]
    pub kind: InvoiceType,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<Key>,
    pub code: String,
    pub issue_date: NaiveDate,
    /// Defaults to the regime currency.
    #[serde(default, skip_serializing_if = "Code::is_empty")]
    pub currency: Code,
    pub supplier: Party,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer: Option<Party>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub lines: Vec<Line>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax: Option<InvoiceTax>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<Note>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub totals: Option<Totals>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Party {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax_id: Option<Identity>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub name: String,
    pub price: Amount,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Line {
    /// Position from 1, set on calculation.
    #[serde(rename = "i", default)]
    pub index: usize,
    pub quantity: Amount,
    pub item: Item,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub taxes: Vec<Combo>,
    /// Price times quantity, set on calculation.
    #[serde(default)]
    pub sum: Amount,
}

/// Document level tax options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceTax {
    /// Category already included in line prices.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prices_include: Option<Code>,
    #[serde(default, skip_serializing_if = "Extensions::is_empty")]
    pub ext: Extensions,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    /// Sum of the line sums.
    pub sum: Amount,
    /// Tax included in the line sums, when prices include a category.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax_included: Option<Amount>,
    /// Sum without any tax.
    pub total: Amount,
    pub taxes: Total,
    /// Taxes added to the total.
    pub tax: Amount,
    pub total_with_tax: Amount,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retained: Option<Amount>,
    /// What the customer pays: the total with tax minus retained taxes.
    pub payable: Amount,
}

impl Invoice {
    /// Currency decimal places, from the invoice currency or the regime.
    fn currency_exp(&self, ctx: &Context<'_>) -> u32 {
        currencies::minor_units(self.currency.as_str()).unwrap_or_else(|| ctx.regime.currency_exp())
    }

    fn prices_include(&self) -> Option<&Code> {
        self.tax.as_ref().and_then(|t| t.prices_include.as_ref())
    }

    fn calculate_lines(&mut self, ctx: &Context<'_>) -> ValidationErrors {
        let exp = self.currency_exp(ctx);
        let rule = ctx.regime.rounding;
        let date = self.issue_date;
        let mut errs = ValidationErrors::new();
        for (i, line) in self.lines.iter_mut().enumerate() {
            line.index = i + 1;
            let q = line.quantity;
            let price = line.item.price;
            let sum = price
                .checked_rescale(price.exp() + q.exp())
                .and_then(|p| p.checked_multiply(q))
                .and_then(|s| s.checked_round(exp, rule));
            line.sum = match sum {
                Some(sum) => sum,
                None => {
                    errs.push(ValidationError::new(format!("lines[{i}].sum"), OUT_OF_RANGE));
                    Amount::zero(exp)
                }
            };
            for (j, combo) in line.taxes.iter_mut().enumerate() {
                if let Err(e) = combo.calculate(ctx, date) {
                    errs.push(Combo::field_error(&e).prefixed(&format!("lines[{i}].taxes[{j}]")));
                }
            }
        }
        errs
    }

    fn calculate_totals(&self, ctx: &Context<'_>) -> Result<Totals, FiskalError> {
        let exp = self.currency_exp(ctx);
        let mut calc = TotalCalculator::new(exp, ctx.regime.rounding);
        if let Some(code) = self.prices_include() {
            calc = calc.with_includes(code.clone());
        }
        let taxes = calc.calculate(&self.lines)?;

        let zero = Amount::zero(exp);
        let sum = self
            .lines
            .iter()
            .try_fold(zero, |acc, l| acc.checked_add(l.sum))
            .ok_or_else(|| out_of_range("totals.sum"))?;
        let tax_included = self
            .prices_include()
            .and_then(|code| taxes.category(code))
            .map(|ct| ct.amount);
        let total = match tax_included {
            Some(inc) => sum
                .checked_subtract(inc)
                .ok_or_else(|| out_of_range("totals.total"))?,
            None => sum,
        };
        let tax = taxes
            .categories
            .iter()
            .filter(|ct| !ct.retained && !ct.informative)
            .try_fold(zero, |acc, ct| acc.checked_add(ct.checked_total()?))
            .ok_or_else(|| out_of_range("totals.tax"))?;
        let retained = taxes
            .retained()
            .ok_or_else(|| out_of_range("totals.retained"))?;
        let total_with_tax = total
            .checked_add(tax)
            .ok_or_else(|| out_of_range("totals.total_with_tax"))?;
        let payable = total_with_tax
            .checked_subtract(retained)
            .ok_or_else(|| out_of_range("totals.payable"))?;
        Ok(Totals {
            sum,
            tax_included,
            total,
            taxes,
            tax,
            total_with_tax,
            retained: (!retained.is_zero()).then_some(retained),
            payable,
        })
    }
}

impl TaxableLine for Line {
    fn taxes(&self) -> &[Combo] {
        &self.taxes
    }

    fn total(&self) -> Amount {
        self.sum
    }
}

impl Node for Invoice {
    fn normalize(&mut self, ctx: &Context<'_>) {
        self.code = self.code.trim().to_string();
        if self.currency.is_empty() {
            self.currency = ctx.regime.currency.clone();
        }
        if let Some(tax) = &mut self.tax {
            tax.ext.clean();
        }
    }

    fn validate(&self, _ctx: &Context<'_>) -> Vec<ValidationError> {
        let mut errs = Vec::new();
        if self.regime.is_empty() {
            errs.push(ValidationError::new("regime", "cannot be blank"));
        }
        if !currencies::is_known_currency(self.currency.as_str()) {
            errs.push(ValidationError::new("currency", "must be a valid value"));
        }
        if self.lines.is_empty() {
            errs.push(ValidationError::new("lines", "cannot be empty"));
        }
        errs
    }

    fn for_each_child(&self, f: &mut dyn FnMut(&str, &dyn Node)) {
        f("supplier", &self.supplier);
        if let Some(c) = &self.customer {
            f("customer", c);
        }
        for (i, line) in self.lines.iter().enumerate() {
            f(&format!("lines[{i}]"), line);
        }
        if let Some(tax) = &self.tax {
            f("tax", tax);
        }
    }

    fn for_each_child_mut(&mut self, f: &mut dyn FnMut(&str, &mut dyn Node)) {
        f("supplier", &mut self.supplier);
        if let Some(c) = &mut self.customer {
            f("customer", c);
        }
        for (i, line) in self.lines.iter_mut().enumerate() {
            f(&format!("lines[{i}]"), line);
        }
        if let Some(tax) = &mut self.tax {
            f("tax", tax);
        }
    }
}

impl Document for Invoice {
    fn regime(&self) -> &Code {
        &self.regime
    }

    fn addons(&self) -> &[Key] {
        &self.addons
    }

    fn set_addons(&mut self, addons: Vec<Key>) {
        self.addons = addons;
    }

    fn schema(&self) -> &str {
        SCHEMA_INVOICE
    }

    fn scenario_type(&self) -> Key {
        self.kind.key()
    }

    fn tags(&self) -> &[Key] {
        &self.tags
    }

    fn apply_scenarios(&mut self, summary: ScenarioSummary) {
        for note in summary.notes {
            match self.notes.iter_mut().find(|n| n.same_as(&note)) {
                Some(existing) => *existing = note,
                None => self.notes.push(note),
            }
        }
        if !summary.ext.is_empty() {
            self.tax.get_or_insert_with(InvoiceTax::default).ext.merge(&summary.ext);
        }
    }

    fn calculate(&mut self, ctx: &Context<'_>) -> Result<(), FiskalError> {
        let errs = self.calculate_lines(ctx);
        if !errs.is_empty() {
            self.totals = None;
            return Err(FiskalError::Validation(errs));
        }
        match self.calculate_totals(ctx) {
            Ok(totals) => {
                self.totals = Some(totals);
                Ok(())
            }
            Err(e) => {
                self.totals = None;
                Err(e)
            }
        }
    }
}

impl Node for Party {
    fn validate(&self, _ctx: &Context<'_>) -> Vec<ValidationError> {
        if self.name.trim().is_empty() {
            return vec![ValidationError::new("name", "cannot be blank")];
        }
        Vec::new()
    }

    fn for_each_child(&self, f: &mut dyn FnMut(&str, &dyn Node)) {
        if let Some(id) = &self.tax_id {
            f("tax_id", id);
        }
    }

    fn for_each_child_mut(&mut self, f: &mut dyn FnMut(&str, &mut dyn Node)) {
        if let Some(id) = &mut self.tax_id {
            f("tax_id", id);
        }
    }
}

impl Node for Line {
    fn validate(&self, _ctx: &Context<'_>) -> Vec<ValidationError> {
        let mut errs = Vec::new();
        if self.quantity.is_zero() {
            errs.push(ValidationError::new("quantity", "cannot be zero"));
        }
        if self.item.name.trim().is_empty() {
            errs.push(ValidationError::new("item.name", "cannot be blank"));
        }
        errs
    }

    fn for_each_child(&self, f: &mut dyn FnMut(&str, &dyn Node)) {
        for (j, c) in self.taxes.iter().enumerate() {
            f(&format!("taxes[{j}]"), c);
        }
    }

    fn for_each_child_mut(&mut self, f: &mut dyn FnMut(&str, &mut dyn Node)) {
        for (j, c) in self.taxes.iter_mut().enumerate() {
            f(&format!("taxes[{j}]"), c);
        }
    }
}

impl Node for InvoiceTax {
    fn extensions(&self) -> Option<&Extensions> {
        Some(&self.ext)
    }
}
