//! Blueprint catalog: the read-mostly set of logic templates for one session refresh.
//!
//! A catalog is always built from a complete listing and replaced wholesale;
//! there is no incremental patching. Lookups of unknown ids never fail, they
//! tell the caller to fall back to raw editing.

use indexmap::IndexMap;
use tracing::warn;

use crate::schema::{Blueprint, BlueprintSpec, ParameterSpec, SelectOption};

/// Result of resolving a logic type against the catalog.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup<'a> {
    /// Known and renderable as structured fields.
    Renderable(&'a Blueprint),
    /// Known, but its schema cannot be rendered (e.g. a select without options).
    Unrenderable { reason: &'a str },
    /// Not in the catalog at all.
    Unknown,
}

/// Immutable snapshot of the blueprints served by the definition service.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BlueprintCatalog {
    blueprints: IndexMap<String, Blueprint>,
    /// Blueprint id -> why it cannot be rendered.
    unrenderable: IndexMap<String, String>,
    /// Wire forms, kept so the catalog can be served back unchanged.
    specs: IndexMap<String, BlueprintSpec>,
}

impl BlueprintCatalog {
    /// Build a catalog from a full listing. Invalid blueprints are kept as
    /// unrenderable entries rather than dropped.
    pub fn load(specs: IndexMap<String, BlueprintSpec>) -> Self {
        let mut blueprints = IndexMap::new();
        let mut unrenderable = IndexMap::new();
        for (id, spec) in &specs {
            match Blueprint::from_spec(id, spec) {
                Ok(blueprint) => {
                    blueprints.insert(id.clone(), blueprint);
                }
                Err(e) => {
                    warn!(blueprint_id = %id, error = %e, "blueprint cannot be rendered as fields");
                    unrenderable.insert(id.clone(), e.to_string());
                }
            }
        }
        Self {
            blueprints,
            unrenderable,
            specs,
        }
    }

    /// Renderable blueprint for `type_id`, if any.
    pub fn get(&self, type_id: &str) -> Option<&Blueprint> {
        self.blueprints.get(type_id)
    }

    pub fn lookup(&self, type_id: &str) -> Lookup<'_> {
        if let Some(blueprint) = self.blueprints.get(type_id) {
            return Lookup::Renderable(blueprint);
        }
        match self.unrenderable.get(type_id) {
            Some(reason) => Lookup::Unrenderable { reason },
            None => Lookup::Unknown,
        }
    }

    /// Whether `type_id` names any catalog entry, renderable or not.
    pub fn contains(&self, type_id: &str) -> bool {
        self.specs.contains_key(type_id)
    }

    /// Renderable blueprints sorted by label (ties broken by id), as listed in the selector.
    pub fn options(&self) -> Vec<&Blueprint> {
        let mut options: Vec<&Blueprint> = self.blueprints.values().collect();
        options.sort_by(|a, b| {
            a.label
                .to_lowercase()
                .cmp(&b.label.to_lowercase())
                .then_with(|| a.id.cmp(&b.id))
        });
        options
    }

    /// The blueprint a new definition starts with.
    pub fn first(&self) -> Option<&Blueprint> {
        self.options().into_iter().next()
    }

    /// Blueprints that can only be edited as raw JSON, with the reason.
    pub fn unrenderable(&self) -> impl Iterator<Item = (&str, &str)> {
        self.unrenderable.iter().map(|(id, reason)| (id.as_str(), reason.as_str()))
    }

    pub fn specs(&self) -> &IndexMap<String, BlueprintSpec> {
        &self.specs
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// The contact-data blueprints shipped with the local store.
    pub fn builtin() -> Self {
        Self::load(builtin_specs())
    }
}

fn builtin_specs() -> IndexMap<String, BlueprintSpec> {
    let mut specs = IndexMap::new();
    specs.insert(
        "duplicate_role_same_name".to_string(),
        BlueprintSpec::new(
            "Duplicate role for contact name",
            "Flags accounts with multiple contacts that share both name and role.",
        )
        .with_parameter(
            "min_count",
            ParameterSpec::number()
                .with_label("Minimum matching contacts")
                .with_min(2.0)
                .with_default(2)
                .with_help("Alert when at least this many contacts share the same name and role for an account."),
        ),
    );
    specs.insert(
        "missing_role".to_string(),
        BlueprintSpec::new(
            "Missing contact role",
            "Detects account-contact relations that do not specify a role.",
        ),
    );
    specs.insert(
        "same_name_different_role".to_string(),
        BlueprintSpec::new(
            "Same contact name with different roles",
            "Highlights contacts that have more than one role on the same account.",
        )
        .with_parameter(
            "min_unique_roles",
            ParameterSpec::number()
                .with_label("Minimum unique roles")
                .with_min(2.0)
                .with_default(2)
                .with_help("Alert when a contact name is associated with at least this many distinct roles."),
        ),
    );
    specs.insert(
        "duplicate_contact_point".to_string(),
        BlueprintSpec::new(
            "Duplicate contact point",
            "Finds duplicate emails or phone numbers stored for a contact.",
        )
        .with_parameter(
            "channel",
            ParameterSpec::select(vec![
                SelectOption::new("phone", "Phone"),
                SelectOption::new("email", "Email"),
            ])
            .with_label("Contact point type")
            .with_default("phone")
            .with_help("Choose which contact point to inspect for duplicates."),
        )
        .with_parameter(
            "min_count",
            ParameterSpec::number()
                .with_label("Minimum duplicates")
                .with_min(2.0)
                .with_default(2)
                .with_help("Alert when at least this many identical values exist for the chosen contact point."),
        ),
    );
    specs
}
