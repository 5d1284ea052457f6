use crate::schema::{Catalog, Faction, RawText, Role, RoleDef, RoleId, TableRules};
use anyhow::{bail, Context};
use mafia_core::{DEFAULT_MAFIA_ROLE, DEFAULT_TOWN_ROLE};
use serde::de::DeserializeOwned;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

const ROLES_FILE: &str = "roles.json";
const RULES_FILE: &str = "rules.json";
const BUILTIN_ROLES: &str = include_str!("../../../assets/roles.json");

pub fn load_catalog(dir: &Path, locale: Option<&str>) -> anyhow::Result<Catalog> {
    let path = dir.join(ROLES_FILE);
    let defs: Vec<RoleDef> = load_json(&path)?;
    build_catalog(defs, locale).with_context(|| format!("validate {}", path.display()))
}

/// Catalog compiled into the binary, for front ends started outside the
/// repository root.
pub fn builtin_catalog(locale: Option<&str>) -> anyhow::Result<Catalog> {
    let defs: Vec<RoleDef> =
        serde_json::from_str(BUILTIN_ROLES).context("parse builtin roles.json")?;
    build_catalog(defs, locale)
}

/// Prefers `dir/roles.json` and falls back to the builtin copy when absent.
pub fn load_catalog_or_builtin(dir: &Path, locale: Option<&str>) -> anyhow::Result<Catalog> {
    if dir.join(ROLES_FILE).exists() {
        load_catalog(dir, locale)
    } else {
        log::debug!("{} not found, using builtin catalog", dir.join(ROLES_FILE).display());
        builtin_catalog(locale)
    }
}

pub fn load_table_rules(dir: &Path) -> anyhow::Result<TableRules> {
    let path = dir.join(RULES_FILE);
    let rules: TableRules = if path.exists() {
        load_json(&path)?
    } else {
        TableRules::default()
    };
    if rules.min_players == 0 || rules.min_players > rules.max_players {
        bail!(
            "invalid player bounds {}..={} in {}",
            rules.min_players,
            rules.max_players,
            path.display()
        );
    }
    Ok(rules)
}

pub fn build_catalog(defs: Vec<RoleDef>, locale: Option<&str>) -> anyhow::Result<Catalog> {
    if defs.is_empty() {
        bail!("role catalog is empty");
    }
    let locale = normalize_locale(locale);
    let mut seen = HashSet::new();
    let mut roles = Vec::with_capacity(defs.len());
    for def in defs {
        if def.id.trim().is_empty() {
            bail!("role with empty id");
        }
        if !seen.insert(def.id.clone()) {
            bail!("duplicate role id {}", def.id);
        }
        roles.push(Role {
            id: RoleId::new(def.id.clone()),
            name: localize_name(&def.name, &def.names, &locale),
            description: localize_text(&def.description, &def.descriptions, &locale),
            image: def.image,
            faction: def.faction,
            actions: def.actions,
            player: None,
        });
    }
    let catalog = Catalog::new(roles);
    require_default(&catalog, DEFAULT_TOWN_ROLE, Faction::Town)?;
    require_default(&catalog, DEFAULT_MAFIA_ROLE, Faction::Mafia)?;
    Ok(catalog)
}

fn require_default(catalog: &Catalog, id: &str, faction: Faction) -> anyhow::Result<()> {
    match catalog.get(id) {
        Some(role) if role.faction == faction => Ok(()),
        Some(role) => bail!(
            "default role {id} must be {}, found {}",
            faction.id(),
            role.faction.id()
        ),
        None => bail!("missing default role {id}"),
    }
}

fn localize_name(base: &str, names: &HashMap<String, String>, locale: &str) -> String {
    if locale == "en_US" {
        return base.to_string();
    }
    for (key, value) in names {
        if normalize_locale(Some(key)) == locale {
            return value.clone();
        }
    }
    base.to_string()
}

fn localize_text(base: &RawText, texts: &HashMap<String, RawText>, locale: &str) -> String {
    if locale != "en_US" {
        for (key, value) in texts {
            if normalize_locale(Some(key)) == locale {
                return value.joined();
            }
        }
    }
    base.joined()
}

pub fn normalize_locale(locale: Option<&str>) -> String {
    let raw = locale.unwrap_or("en_US").trim();
    if raw.is_empty() {
        return "en_US".to_string();
    }
    let lowered = raw.replace('-', "_").to_ascii_lowercase();
    match lowered.as_str() {
        "fa" | "fa_ir" | "persian" | "farsi" => "fa_IR".to_string(),
        _ => "en_US".to_string(),
    }
}

fn load_json<T: DeserializeOwned>(path: impl AsRef<Path>) -> anyhow::Result<T> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let value = serde_json::from_str(&raw).with_context(|| format!("parse {}", path.display()))?;
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ActionType;

    fn def(id: &str, faction: Faction) -> RoleDef {
        RoleDef {
            id: id.to_string(),
            name: format!("{id} name"),
            names: HashMap::from([("fa".to_string(), format!("{id} fa"))]),
            description: RawText::Lines(vec!["one".to_string(), "two".to_string()]),
            descriptions: HashMap::new(),
            image: String::new(),
            faction,
            actions: vec![ActionType::None],
        }
    }

    #[test]
    fn normalizes_persian_aliases() {
        assert_eq!(normalize_locale(Some("fa")), "fa_IR");
        assert_eq!(normalize_locale(Some("fa-IR")), "fa_IR");
        assert_eq!(normalize_locale(Some("EN")), "en_US");
        assert_eq!(normalize_locale(None), "en_US");
        assert_eq!(normalize_locale(Some("  ")), "en_US");
        assert_eq!(normalize_locale(Some("de")), "en_US");
        assert_eq!(normalize_locale(Some("fr-FR")), "en_US");
    }

    #[test]
    fn localizes_names_and_joins_lines() {
        let catalog = build_catalog(
            vec![def("citizen", Faction::Town), def("mafia", Faction::Mafia)],
            Some("fa_IR"),
        )
        .expect("catalog");
        let citizen = catalog.get("citizen").expect("citizen");
        assert_eq!(citizen.name, "citizen fa");
        assert_eq!(citizen.description, "one\ntwo");

        let english = build_catalog(
            vec![def("citizen", Faction::Town), def("mafia", Faction::Mafia)],
            None,
        )
        .expect("catalog");
        assert_eq!(english.get("mafia").expect("mafia").name, "mafia name");
    }

    #[test]
    fn rejects_duplicates_and_missing_defaults() {
        let err = build_catalog(
            vec![
                def("citizen", Faction::Town),
                def("citizen", Faction::Town),
                def("mafia", Faction::Mafia),
            ],
            None,
        )
        .expect_err("duplicate");
        assert!(err.to_string().contains("duplicate role id"));

        let err = build_catalog(vec![def("citizen", Faction::Town)], None).expect_err("no mafia");
        assert!(err.to_string().contains("missing default role mafia"));

        let err = build_catalog(
            vec![def("citizen", Faction::Mafia), def("mafia", Faction::Mafia)],
            None,
        )
        .expect_err("wrong faction");
        assert!(err.to_string().contains("must be city"));
    }

    #[test]
    fn builtin_catalog_has_full_roster() {
        let catalog = builtin_catalog(None).expect("builtin");
        assert_eq!(catalog.len(), 17);
        assert_eq!(catalog.by_faction(Faction::Town).count(), 10);
        assert_eq!(catalog.by_faction(Faction::Mafia).count(), 6);
        assert_eq!(catalog.independent_ids(), vec![RoleId::new("joker")]);
        let persian = builtin_catalog(Some("fa")).expect("builtin fa");
        assert_eq!(persian.get("joker").expect("joker").name, "جوکر");
    }
}
