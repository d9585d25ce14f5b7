//! Vocabulary namespaces converters draw their class and relation names from.
//!
//! Classes are written as `prefix:Local_Name` (e.g. `l4_de:Passenger_Car`);
//! the prefix identifies the [`Ontology`] and [`Ontology::iri`] expands it.

use std::collections::BTreeSet;
use std::fmt;
use thiserror::Error;

/// The layered traffic vocabularies plus the two criticality vocabularies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Ontology {
    Physics,
    Perception,
    GeoSparql,
    L1Core,
    L1De,
    L2Core,
    L2De,
    L3Core,
    L3De,
    L4Core,
    L4De,
    L5Core,
    L5De,
    L6Core,
    L6De,
    /// Criticality phenomena (only needed by downstream reasoning).
    Criticality,
    /// Formalized criticality phenomena (only needed by downstream reasoning).
    CriticalityFormalization,
}

impl Ontology {
    /// Vocabularies that are always available.
    pub const BASE: [Ontology; 15] = [
        Ontology::Physics,
        Ontology::Perception,
        Ontology::GeoSparql,
        Ontology::L1Core,
        Ontology::L1De,
        Ontology::L2Core,
        Ontology::L2De,
        Ontology::L3Core,
        Ontology::L3De,
        Ontology::L4Core,
        Ontology::L4De,
        Ontology::L5Core,
        Ontology::L5De,
        Ontology::L6Core,
        Ontology::L6De,
    ];

    /// Vocabularies loaded only on request.
    pub const EXTENDED: [Ontology; 2] = [Ontology::Criticality, Ontology::CriticalityFormalization];

    pub const fn prefix(self) -> &'static str {
        match self {
            Ontology::Physics => "physics",
            Ontology::Perception => "perception",
            Ontology::GeoSparql => "geo",
            Ontology::L1Core => "l1_core",
            Ontology::L1De => "l1_de",
            Ontology::L2Core => "l2_core",
            Ontology::L2De => "l2_de",
            Ontology::L3Core => "l3_core",
            Ontology::L3De => "l3_de",
            Ontology::L4Core => "l4_core",
            Ontology::L4De => "l4_de",
            Ontology::L5Core => "l5_core",
            Ontology::L5De => "l5_de",
            Ontology::L6Core => "l6_core",
            Ontology::L6De => "l6_de",
            Ontology::Criticality => "cp",
            Ontology::CriticalityFormalization => "cp_formal",
        }
    }

    pub const fn iri(self) -> &'static str {
        match self {
            Ontology::Physics => "http://purl.org/auto/physics#",
            Ontology::Perception => "http://purl.org/auto/perception#",
            Ontology::GeoSparql => "http://www.opengis.net/ont/geosparql#",
            Ontology::L1Core => "http://purl.org/auto/l1_core#",
            Ontology::L1De => "http://purl.org/auto/l1_de#",
            Ontology::L2Core => "http://purl.org/auto/l2_core#",
            Ontology::L2De => "http://purl.org/auto/l2_de#",
            Ontology::L3Core => "http://purl.org/auto/l3_core#",
            Ontology::L3De => "http://purl.org/auto/l3_de#",
            Ontology::L4Core => "http://purl.org/auto/l4_core#",
            Ontology::L4De => "http://purl.org/auto/l4_de#",
            Ontology::L5Core => "http://purl.org/auto/l5_core#",
            Ontology::L5De => "http://purl.org/auto/l5_de#",
            Ontology::L6Core => "http://purl.org/auto/l6_core#",
            Ontology::L6De => "http://purl.org/auto/l6_de#",
            Ontology::Criticality => "http://purl.org/auto/criticality_phenomena#",
            Ontology::CriticalityFormalization => {
                "http://purl.org/auto/criticality_phenomena_formalization#"
            }
        }
    }

    pub const fn is_extended(self) -> bool {
        matches!(
            self,
            Ontology::Criticality | Ontology::CriticalityFormalization
        )
    }

    /// Find the ontology owning a `prefix:Local` name.
    pub fn from_prefix(prefix: &str) -> Option<Self> {
        Self::BASE
            .iter()
            .chain(Self::EXTENDED.iter())
            .copied()
            .find(|o| o.prefix() == prefix)
    }
}

impl fmt::Display for Ontology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

/// A prefixed class name, e.g. `l1_core:Road`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Class(String);

impl Class {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Local part after the prefix.
    pub fn local_name(&self) -> &str {
        self.0.split_once(':').map(|(_, l)| l).unwrap_or(&self.0)
    }

    /// Full IRI, if the prefix belongs to a known ontology.
    pub fn iri(&self) -> Option<String> {
        let (prefix, local) = self.0.split_once(':')?;
        let ontology = Ontology::from_prefix(prefix)?;
        Some(format!("{}{}", ontology.iri(), local))
    }
}

impl AsRef<str> for Class {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Handle on one loaded ontology.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Namespace {
    ontology: Ontology,
}

impl Namespace {
    pub fn ontology(&self) -> Ontology {
        self.ontology
    }

    /// Class `local` in this namespace.
    pub fn class(&self, local: &str) -> Class {
        Class(format!("{}:{}", self.ontology.prefix(), local))
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum VocabularyError {
    #[error("vocabulary `{0}` is not loaded")]
    NotLoaded(Ontology),
}

/// The set of ontologies available to converters for one conversion run.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    loaded: BTreeSet<Ontology>,
}

impl Vocabulary {
    pub fn new(load_criticality: bool) -> Self {
        let mut loaded: BTreeSet<Ontology> = Ontology::BASE.into_iter().collect();
        if load_criticality {
            loaded.extend(Ontology::EXTENDED);
        }
        Self { loaded }
    }

    pub fn is_loaded(&self, ontology: Ontology) -> bool {
        self.loaded.contains(&ontology)
    }

    pub fn namespace(&self, ontology: Ontology) -> Result<Namespace, VocabularyError> {
        if self.is_loaded(ontology) {
            Ok(Namespace { ontology })
        } else {
            Err(VocabularyError::NotLoaded(ontology))
        }
    }

    pub fn loaded(&self) -> impl Iterator<Item = Ontology> + '_ {
        self.loaded.iter().copied()
    }
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self::new(false)
    }
}
