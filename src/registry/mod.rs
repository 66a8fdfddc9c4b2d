//! Regime and addon registration and the document processing pipeline.
//!
//! Definitions are collected in a [`RegistryBuilder`] and frozen into a
//! [`Registry`]. The registry never changes after it is built, so it can be
//! shared across threads by reference or in an `Arc`.
//!
//! Processing a [`Document`] runs, in order:
//!
//! 1. normalization: each node's built-in [`Node::normalize`], then the
//!    regime's and each addon's [`Normalizer`] hooks for the node type,
//! 2. scenarios of the document schema,
//! 3. [`Document::calculate`],
//! 4. validation: built-in checks, [`Validator`] hooks and extension checks.
//!
//! Addons run in the order the document lists them, each preceded by the
//! addons it requires.

mod check;
mod hooks;
mod node;

use std::collections::{BTreeMap, HashMap};

use tracing::{debug, trace};

pub use hooks::{Normalizer, Validator};
pub use node::{AsAny, Context, Document, Node};

use crate::core::{
    Code, FiskalError, Key, ValidationError, ValidationErrors, append_unique_keys, join_path,
};
use crate::tax::{AddonDef, CorrectionDefinition, Extensions, RegimeDef, ScenarioSummary};

/// Collects definitions before the registry is built.
///
/// Registration panics on a duplicate or inconsistent definition: these are
/// programming errors in the definition tables, not runtime input.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    regimes: BTreeMap<Code, RegimeDef>,
    addons: BTreeMap<Key, AddonDef>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// # Panics
    ///
    /// If a regime with the same country (or alternative code) is already
    /// registered, or the definition fails its consistency checks.
    pub fn register_regime_def(mut self, def: RegimeDef) -> Self {
        if let Err(e) = check::check_regime(&def) {
            panic!("invalid regime definition '{}': {e}", def.country);
        }
        let taken = self.regimes.values().find(|r| {
            r.answers_to(&def.country) || def.alt_country_codes.iter().any(|c| r.answers_to(c))
        });
        if let Some(r) = taken {
            panic!("regime '{}' already registered as '{}'", def.country, r.country);
        }
        debug!(
            country = %def.country,
            categories = def.categories.len(),
            extensions = def.extensions.len(),
            "registered regime"
        );
        self.regimes.insert(def.country.clone(), def);
        self
    }

    /// # Panics
    ///
    /// If an addon with the same key is already registered, or the
    /// definition fails its consistency checks.
    pub fn register_addon_def(mut self, def: AddonDef) -> Self {
        if let Err(e) = check::check_addon(&def) {
            panic!("invalid addon definition '{}': {e}", def.key);
        }
        if self.addons.contains_key(&def.key) {
            panic!("addon '{}' already registered", def.key);
        }
        debug!(
            key = %def.key,
            requires = def.requires.len(),
            extensions = def.extensions.len(),
            "registered addon"
        );
        self.addons.insert(def.key.clone(), def);
        self
    }

    /// Register the regimes and addons bundled with the crate.
    #[cfg(feature = "regimes")]
    pub fn with_bundled(self) -> Self {
        let builder = self
            .register_regime_def(crate::regimes::de::new())
            .register_regime_def(crate::regimes::es::new());
        #[cfg(feature = "addons")]
        let builder = builder.register_addon_def(crate::addons::eu_en16931::new());
        builder
    }

    /// # Panics
    ///
    /// If an addon requires one that was never registered.
    pub fn build(self) -> Registry {
        for addon in self.addons.values() {
            if let Some(missing) = addon.requires.iter().find(|k| !self.addons.contains_key(*k)) {
                panic!("addon '{}' requires unregistered addon '{missing}'", addon.key);
            }
        }
        let alt_codes = self
            .regimes
            .values()
            .flat_map(|r| r.alt_country_codes.iter().map(|alt| (alt.clone(), r.country.clone())))
            .collect();
        debug!(
            regimes = self.regimes.len(),
            addons = self.addons.len(),
            "registry built"
        );
        Registry {
            regimes: self.regimes,
            alt_codes,
            addons: self.addons,
        }
    }
}

/// Read-only table of regime and addon definitions.
#[derive(Debug)]
pub struct Registry {
    regimes: BTreeMap<Code, RegimeDef>,
    alt_codes: HashMap<Code, Code>,
    addons: BTreeMap<Key, AddonDef>,
}

impl Registry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// A registry with every bundled regime and addon.
    #[cfg(feature = "regimes")]
    pub fn bundled() -> Registry {
        RegistryBuilder::new().with_bundled().build()
    }

    /// The regime for a country code or one of its alternative codes.
    pub fn regime_def(&self, country: &Code) -> Option<&RegimeDef> {
        self.regimes.get(country).or_else(|| {
            self.alt_codes
                .get(country)
                .and_then(|c| self.regimes.get(c))
        })
    }

    pub fn regime_def_for(&self, country: &Code) -> Result<&RegimeDef, FiskalError> {
        self.regime_def(country)
            .ok_or_else(|| FiskalError::RegimeNotFound(country.to_string()))
    }

    pub fn addon_def(&self, key: &Key) -> Option<&AddonDef> {
        self.addons.get(key)
    }

    pub fn addon_def_for(&self, key: &Key) -> Result<&AddonDef, FiskalError> {
        self.addon_def(key)
            .ok_or_else(|| FiskalError::AddonNotFound(key.to_string()))
    }

    /// Every regime, sorted by country code.
    pub fn all_regime_defs(&self) -> Vec<&RegimeDef> {
        self.regimes.values().collect()
    }

    /// Every addon, sorted by key.
    pub fn all_addon_defs(&self) -> Vec<&AddonDef> {
        self.addons.values().collect()
    }

    /// The addons to run for `keys`, each preceded by the addons it
    /// requires and without repeats.
    pub fn resolve_addons(&self, keys: &[Key]) -> Result<Vec<&AddonDef>, FiskalError> {
        let mut out: Vec<&AddonDef> = Vec::new();
        let mut stack = Vec::new();
        for key in keys {
            self.push_addon(key, &mut stack, &mut out)?;
        }
        Ok(out)
    }

    fn push_addon<'a>(
        &'a self,
        key: &Key,
        stack: &mut Vec<Key>,
        out: &mut Vec<&'a AddonDef>,
    ) -> Result<(), FiskalError> {
        if stack.contains(key) || out.iter().any(|a| &a.key == key) {
            return Ok(());
        }
        let def = self.addon_def_for(key)?;
        stack.push(key.clone());
        for req in &def.requires {
            self.push_addon(req, stack, out)?;
        }
        stack.pop();
        out.push(def);
        Ok(())
    }

    /// The definitions a document with this regime and addons runs under.
    pub fn context(&self, regime: &Code, addons: &[Key]) -> Result<Context<'_>, FiskalError> {
        let regime = self.regime_def_for(regime)?;
        Ok(Context {
            registry: self,
            regime,
            addons: self.resolve_addons(addons)?,
        })
    }

    /// Resolve the document's context and store the expanded addon list.
    fn prepare<D: Document>(&self, doc: &mut D) -> Result<Context<'_>, FiskalError> {
        let ctx = self.context(doc.regime(), doc.addons())?;
        doc.set_addons(ctx.addons.iter().map(|a| a.key.clone()).collect());
        trace!(
            regime = %ctx.regime.country,
            addons = ?doc.addons(),
            schema = doc.schema(),
            "document context"
        );
        Ok(ctx)
    }

    /// Run every normalizer over the document tree.
    pub fn normalize<D: Document>(&self, doc: &mut D) -> Result<(), FiskalError> {
        let ctx = self.prepare(doc)?;
        normalize_node(&ctx, doc);
        Ok(())
    }

    /// Check the document tree without changing it.
    pub fn validate<D: Document>(&self, doc: &D) -> Result<(), FiskalError> {
        let ctx = self.context(doc.regime(), doc.addons())?;
        let mut errs = ValidationErrors::new();
        validate_node(&ctx, doc, "", &mut errs);
        trace!(errors = errs.len(), "document validated");
        errs.into_result()
    }

    /// Normalize, apply scenarios, calculate and validate a document.
    ///
    /// Calculation and validation failures are reported together; a field
    /// that failed to calculate is not reported again by validation.
    pub fn process<D: Document>(&self, doc: &mut D) -> Result<(), FiskalError> {
        let ctx = self.prepare(doc)?;
        normalize_node(&ctx, doc);
        apply_scenarios(&ctx, doc);

        let mut errs = ValidationErrors::new();
        match doc.calculate(&ctx) {
            Ok(()) => {}
            Err(FiskalError::Validation(e)) => errs.extend(e),
            Err(e) => return Err(e),
        }
        let mut found = ValidationErrors::new();
        validate_node(&ctx, doc, "", &mut found);
        for e in found {
            if !errs.has_field(&e.field) {
                errs.push(e);
            }
        }
        trace!(errors = errs.len(), "document processed");
        errs.into_result()
    }

    /// The regime's correction definition for a schema merged with those
    /// of the addons. `None` if nobody defines one.
    pub fn correction_definition(
        &self,
        regime: &Code,
        addons: &[Key],
        schema: &str,
    ) -> Result<Option<CorrectionDefinition>, FiskalError> {
        let ctx = self.context(regime, addons)?;
        let defs = std::iter::once(&ctx.regime.corrections)
            .chain(ctx.addons.iter().map(|a| &a.corrections))
            .filter_map(|set| set.def(schema));
        Ok(defs.fold(None, |acc: Option<CorrectionDefinition>, def| match acc {
            Some(acc) => Some(acc.merge(def)),
            None => Some(def.clone()),
        }))
    }

    /// Keys of every extension defined by the regime or the addons.
    pub fn extension_keys(&self, regime: &Code, addons: &[Key]) -> Result<Vec<Key>, FiskalError> {
        let ctx = self.context(regime, addons)?;
        let keys: Vec<Key> = ctx.regime.extensions.iter().map(|e| e.key.clone()).collect();
        Ok(ctx.addons.iter().fold(keys, |acc, a| {
            let more: Vec<Key> = a.extensions.iter().map(|e| e.key.clone()).collect();
            append_unique_keys(acc, &more)
        }))
    }
}

impl Drop for Registry {
    fn drop(&mut self) {
        debug!(
            regimes = self.regimes.len(),
            addons = self.addons.len(),
            "registry closed"
        );
    }
}

fn normalize_node(ctx: &Context<'_>, node: &mut dyn Node) {
    node.for_each_child_mut(&mut |_, child| normalize_node(ctx, child));
    node.normalize(ctx);
    ctx.regime.normalizer.run(node);
    for addon in &ctx.addons {
        addon.normalizer.run(node);
    }
}

fn validate_node(ctx: &Context<'_>, node: &dyn Node, path: &str, errs: &mut ValidationErrors) {
    let mut found = node.validate(ctx);
    found.extend(ctx.regime.validator.run(node));
    for addon in &ctx.addons {
        found.extend(addon.validator.run(node));
    }
    if let Some(ext) = node.extensions() {
        found.extend(check_extensions(ctx, ext));
    }
    errs.extend(found.into_iter().map(|e| e.prefixed(path)));
    node.for_each_child(&mut |name, child| {
        validate_node(ctx, child, &join_path(path, name), errs);
    });
}

/// Every key must be defined by the regime or an addon, and its value must
/// be one of the defined codes.
fn check_extensions(ctx: &Context<'_>, ext: &Extensions) -> Vec<ValidationError> {
    ext.iter()
        .filter_map(|(key, value)| match ctx.extension_def(key) {
            Some(def) => def.check(value),
            None => Some(ValidationError::new(key.as_str(), "undefined")),
        })
        .map(|e| e.prefixed("ext"))
        .collect()
}

fn collect_extensions(node: &dyn Node, out: &mut Vec<Extensions>) {
    if let Some(ext) = node.extensions().filter(|e| !e.is_empty()) {
        out.push(ext.clone());
    }
    node.for_each_child(&mut |_, child| collect_extensions(child, out));
}

fn apply_scenarios<D: Document>(ctx: &Context<'_>, doc: &mut D) {
    let sets: Vec<_> = ctx
        .regime
        .scenario_set(doc.schema())
        .into_iter()
        .chain(ctx.addons.iter().filter_map(|a| a.scenario_set(doc.schema())))
        .collect();
    if sets.is_empty() {
        return;
    }
    let mut exts = Vec::new();
    collect_extensions(doc, &mut exts);
    let doc_type = doc.scenario_type();
    let mut summary = ScenarioSummary::default();
    for set in sets {
        set.summarize(&doc_type, doc.tags(), &exts, &mut summary);
    }
    trace!(notes = summary.notes.len(), "scenarios applied");
    doc.apply_scenarios(summary);
}
