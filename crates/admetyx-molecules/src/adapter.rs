//! Descriptor adapter.
//!
//! The engine never parses structures itself. It asks a [`DescriptorService`] for
//! the descriptors of a structure and turns the service's [`ParseError`] into a
//! typed [`EngineError::InvalidStructure`] so a single bad structure cannot take a
//! batch down.

use std::collections::HashMap;
use std::sync::OnceLock;

use admetyx_common::{DescriptorVector, EngineError};
use regex::Regex;
use thiserror::Error;
use tracing::debug;

use crate::compound::Compound;

/// The structure notation could not be turned into descriptors.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("cannot parse '{structure}': {reason}")]
pub struct ParseError {
    pub structure: String,
    pub reason: String,
}

impl ParseError {
    pub fn new(structure: &str, reason: impl Into<String>) -> Self {
        Self { structure: structure.to_string(), reason: reason.into() }
    }
}

impl From<ParseError> for EngineError {
    fn from(err: ParseError) -> Self {
        EngineError::InvalidStructure { structure: err.structure, reason: err.reason }
    }
}

/// Source of physicochemical descriptors for a structure.
///
/// Implementations can use:
/// - A cheminformatics toolkit
/// - A curated lookup table (`StaticDescriptorService`)
/// - Atom-count heuristics (`HeuristicDescriptorService`)
pub trait DescriptorService: Send + Sync {
    fn descriptors(&self, structure: &str) -> Result<DescriptorVector, ParseError>;
}

/// Descriptors for a compound: its own if present, otherwise from `service`.
/// Either way the vector is validated before it reaches rules or models.
pub fn resolve(compound: &Compound, service: &dyn DescriptorService) -> admetyx_common::Result<DescriptorVector> {
    let descriptors = match compound.descriptors {
        Some(d) => d,
        None => service.descriptors(&compound.smiles)?,
    };
    descriptors.validate()?;
    Ok(descriptors)
}

// ── Raw output normalisation ────────────────────────────────────────────────

/// Heavy-atom count assumed when a service does not report one.
pub const DEFAULT_HEAVY_ATOMS: u32 = 25;
/// Molar refractivity assumed when a service does not report one.
pub const DEFAULT_MOLAR_REFRACTIVITY: f64 = 80.0;

/// Build a descriptor vector from a service's raw key/value output.
///
/// Accepts `rotbonds` / `rotatable_bonds` and `mr` / `molar_refractivity`. Counts
/// are rounded to the nearest integer and must not be negative.
pub fn from_raw(raw: &HashMap<String, f64>) -> admetyx_common::Result<DescriptorVector> {
    let get = |keys: &[&str]| keys.iter().find_map(|k| raw.get(*k).copied());
    let required = |keys: &[&str]| {
        get(keys).ok_or_else(|| EngineError::Input(format!("raw descriptors lack '{}'", keys[0])))
    };
    let count = |name: &str, value: f64| -> admetyx_common::Result<u32> {
        if !value.is_finite() || value < 0.0 {
            return Err(EngineError::Input(format!("count '{name}' must be a non-negative number ({value})")));
        }
        Ok(value.round() as u32)
    };

    let descriptors = DescriptorVector {
        mw: required(&["mw"])?,
        logp: required(&["logp"])?,
        hbd: count("hbd", required(&["hbd"])?)?,
        hba: count("hba", required(&["hba"])?)?,
        tpsa: required(&["tpsa"])?,
        rotatable_bonds: count("rotbonds", required(&["rotbonds", "rotatable_bonds"])?)?,
        qed: required(&["qed"])?,
        fsp3: required(&["fsp3"])?,
        heavy_atoms: match get(&["heavy_atoms"]) {
            Some(v) => count("heavy_atoms", v)?,
            None => DEFAULT_HEAVY_ATOMS,
        },
        molar_refractivity: get(&["mr", "molar_refractivity"]).unwrap_or(DEFAULT_MOLAR_REFRACTIVITY),
    };
    descriptors.validate()?;
    Ok(descriptors)
}

// ── Static lookup ───────────────────────────────────────────────────────────

/// Curated descriptors keyed by structure notation.
#[derive(Debug, Clone, Default)]
pub struct StaticDescriptorService {
    table: HashMap<String, DescriptorVector>,
}

impl StaticDescriptorService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, structure: &str, descriptors: DescriptorVector) -> Self {
        self.table.insert(structure.to_string(), descriptors);
        self
    }

    /// Table of every compound that carries descriptors.
    pub fn from_compounds(compounds: &[Compound]) -> Self {
        let table = compounds
            .iter()
            .filter_map(|c| c.descriptors.map(|d| (c.smiles.clone(), d)))
            .collect();
        Self { table }
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

impl DescriptorService for StaticDescriptorService {
    fn descriptors(&self, structure: &str) -> Result<DescriptorVector, ParseError> {
        self.table
            .get(structure)
            .copied()
            .ok_or_else(|| ParseError::new(structure, "no descriptors recorded for this structure"))
    }
}

// ── Heuristic estimator ─────────────────────────────────────────────────────

/// Rough descriptor estimates from atom counts, for when no toolkit is available.
///
/// Structures are first checked lexically: only organic-subset atoms, bracket
/// atoms, bonds, branches and ring-closure digits are accepted, branches and
/// brackets must balance, and every ring-closure label must be paired. The
/// estimates themselves are coarse and only meant to keep screening usable.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicDescriptorService;

impl HeuristicDescriptorService {
    pub fn new() -> Self {
        Self
    }
}

fn lazy_token_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        // bracket atom | two-letter halogen | organic atom | aromatic atom | %nn ring | digit ring | bond / branch / dot
        Regex::new(r"\[[^\[\]]*\]|Cl|Br|[BCNOPSFI]|[bcnops]|%\d{2}|\d|[-=#$:/\\().]")
            .expect("token regex is valid")
    })
}

fn lazy_bracket_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        // isotope, element, chirality, hydrogens, charge, atom class
        Regex::new(r"^\[\d*(?:[A-Z][a-z]?|[bcnops]|se|as)(?:@@?)?(?:H\d*)?(?:[+-]+\d*)?(?::\d+)?\]$")
            .expect("bracket atom regex is valid")
    })
}

fn lexical_error(structure: &str, pos: usize) -> ParseError {
    let reason = match structure[pos..].chars().next() {
        Some('[') => "unclosed bracket atom".to_string(),
        Some(c) => format!("unexpected character '{c}' at position {pos}"),
        None => "truncated structure".to_string(),
    };
    ParseError::new(structure, reason)
}

/// Lexical check of SMILES notation.
pub fn validate_smiles(structure: &str) -> Result<(), ParseError> {
    if structure.trim().is_empty() {
        return Err(ParseError::new(structure, "empty structure"));
    }

    let mut pos = 0;
    let mut depth = 0i32;
    let mut atoms = 0usize;
    let mut open_rings: HashMap<String, usize> = HashMap::new();

    for token in lazy_token_regex().find_iter(structure) {
        if token.start() != pos {
            return Err(lexical_error(structure, pos));
        }
        pos = token.end();
        let text = token.as_str();

        match text {
            "(" => {
                if atoms == 0 {
                    return Err(ParseError::new(structure, "branch opened before any atom"));
                }
                depth += 1;
            }
            ")" => {
                depth -= 1;
                if depth < 0 {
                    return Err(ParseError::new(structure, "unbalanced ')'"));
                }
            }
            t if t.starts_with('[') => {
                if !lazy_bracket_regex().is_match(t) {
                    return Err(ParseError::new(structure, format!("malformed bracket atom '{t}'")));
                }
                atoms += 1;
            }
            t if t.starts_with('%') || t.chars().all(|c| c.is_ascii_digit()) => {
                if atoms == 0 {
                    return Err(ParseError::new(structure, "ring closure before any atom"));
                }
                *open_rings.entry(t.trim_start_matches('%').to_string()).or_default() += 1;
            }
            t if t.chars().all(|c| c.is_ascii_alphabetic()) => atoms += 1,
            _ => {}
        }
    }

    if pos != structure.len() {
        return Err(lexical_error(structure, pos));
    }
    if depth != 0 {
        return Err(ParseError::new(structure, "unbalanced '('"));
    }
    if atoms == 0 {
        return Err(ParseError::new(structure, "no atoms"));
    }
    let mut unpaired: Vec<&String> =
        open_rings.iter().filter(|(_, n)| **n % 2 == 1).map(|(label, _)| label).collect();
    if !unpaired.is_empty() {
        unpaired.sort();
        return Err(ParseError::new(structure, format!("unpaired ring closure {}", unpaired[0])));
    }
    Ok(())
}

impl DescriptorService for HeuristicDescriptorService {
    fn descriptors(&self, structure: &str) -> Result<DescriptorVector, ParseError> {
        validate_smiles(structure)?;

        let count_of = |c: char| structure.matches(c).count() as u32;
        let n_atoms = structure
            .chars()
            .filter(|c| c.is_ascii_alphabetic() && "CNOPS".contains(c.to_ascii_uppercase()))
            .count() as u32;
        let (carbon, oxygen, nitrogen) = (count_of('C'), count_of('O'), count_of('N'));
        let aromatic_nitrogen = count_of('n');

        let mw = n_atoms as f64 * 12.0 + 18.0;
        let hba = (oxygen + nitrogen + aromatic_nitrogen).min(15);
        let rotatable = count_of('-') + structure.matches("CC").count() as u32 / 2;

        let descriptors = DescriptorVector {
            mw,
            logp: (carbon as f64 - oxygen as f64 - nitrogen as f64) * 0.5,
            hbd: (oxygen + nitrogen).min(10),
            hba,
            tpsa: hba as f64 * 12.0,
            rotatable_bonds: rotatable.min(12),
            qed: 0.5,
            fsp3: 0.3,
            heavy_atoms: n_atoms,
            molar_refractivity: mw / 4.0,
        };
        debug!(structure, mw, "heuristic descriptors estimated");
        Ok(descriptors)
    }
}
