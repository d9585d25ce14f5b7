//! Knowledge graph store for traffic scene snapshots
//!
//! One [`KnowledgeGraph`] holds every node produced while converting a
//! recording snippet: the shared scenery and all scenes. Scenes and the
//! scenery each own a [`Partition`] (a bitmap of node ids), so "the graph of a
//! scene" is the partition view over the shared store.
//!
//! Storage layout:
//! 1. **String Interning**: class names, attribute keys/values and relation
//!    names are stored once and referenced by `StrId`
//! 2. **Columnar Nodes**: one primary class column plus sparse attribute columns
//! 3. **Class Bitmaps**: every class (primary or added later) maps to a
//!    Roaring bitmap of node ids, so `search(type)` is a bitmap intersection
//! 4. **Indexed Relations**: forward/backward indexes keyed by
//!    `(node, relation)`
//! 5. **Equivalences**: symmetric `identical_to` style links kept apart from
//!    ordinary relations

pub mod partition;
pub mod vocab;

use ahash::AHashMap;
use anyhow::{anyhow, Result};
use roaring::RoaringBitmap;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::ops::RangeInclusive;

pub use partition::Partition;
pub use vocab::{Class, Namespace, Ontology, Vocabulary, VocabularyError};

/// Relation name used for cross-scene identity links.
pub const IDENTICAL_TO: &str = "identical_to";

// ============================================================================
// String Interning
// ============================================================================

/// Interned string ID (4 bytes instead of 24+ for String)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(transparent)]
pub struct StrId(u32);

impl StrId {
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u32 {
        self.0
    }
}

/// String interner: maps strings to compact IDs
#[derive(Debug, Default)]
pub struct StringInterner {
    str_to_id: AHashMap<String, StrId>,
    id_to_str: Vec<String>,
}

impl StringInterner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern a string, returning its ID
    pub fn intern(&mut self, s: &str) -> StrId {
        if let Some(id) = self.str_to_id.get(s) {
            return *id;
        }

        let id = StrId(self.id_to_str.len() as u32);
        self.str_to_id.insert(s.to_string(), id);
        self.id_to_str.push(s.to_string());
        id
    }

    /// Look up an existing ID for a string without inserting.
    pub fn id_of(&self, s: &str) -> Option<StrId> {
        self.str_to_id.get(s).copied()
    }

    /// Look up string by ID
    pub fn lookup(&self, id: StrId) -> Option<&str> {
        self.id_to_str.get(id.0 as usize).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.id_to_str.len()
    }

    pub fn is_empty(&self) -> bool {
        self.id_to_str.is_empty()
    }
}

// ============================================================================
// Node Storage (Columnar)
// ============================================================================

/// Identifier of a graph node, unique within one [`KnowledgeGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(transparent)]
pub struct NodeId(u32);

impl NodeId {
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// Resolved, human-readable view of one node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeView {
    pub id: NodeId,
    /// Class the node was created with.
    pub class: String,
    /// Every class the node is a member of, primary class included, sorted.
    pub classes: Vec<String>,
    pub attrs: BTreeMap<String, String>,
}

/// Columnar node storage
#[derive(Debug, Default)]
pub struct NodeStore {
    /// Primary class column: node_id -> class
    classes: Vec<StrId>,
    /// Attribute columns: attr_name -> (node_id -> value)
    attrs: HashMap<StrId, HashMap<u32, StrId>>,
    /// Class index: class -> bitmap of node ids (includes added classes)
    class_index: HashMap<StrId, RoaringBitmap>,
    /// Nodes that have not been removed
    live: RoaringBitmap,
}

impl NodeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.live.len() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    pub fn contains(&self, id: u32) -> bool {
        self.live.contains(id)
    }

    /// Bitmap of all live node ids.
    pub fn live(&self) -> &RoaringBitmap {
        &self.live
    }

    /// Add a node
    pub fn add(&mut self, class: StrId, attrs: Vec<(StrId, StrId)>) -> u32 {
        let id = self.classes.len() as u32;
        self.classes.push(class);
        self.live.insert(id);

        self.class_index
            .entry(class)
            .or_insert_with(RoaringBitmap::new)
            .insert(id);

        for (attr_name, attr_value) in attrs {
            self.attrs
                .entry(attr_name)
                .or_insert_with(HashMap::new)
                .insert(id, attr_value);
        }

        id
    }

    /// Put a node into an additional class bitmap.
    pub fn add_class(&mut self, id: u32, class: StrId) {
        self.class_index
            .entry(class)
            .or_insert_with(RoaringBitmap::new)
            .insert(id);
    }

    /// Get live nodes by class
    pub fn by_class(&self, class: StrId) -> Option<&RoaringBitmap> {
        self.class_index.get(&class)
    }

    pub fn primary_class(&self, id: u32) -> Option<StrId> {
        if !self.contains(id) {
            return None;
        }
        self.classes.get(id as usize).copied()
    }

    pub fn get_attr(&self, id: u32, attr_name: StrId) -> Option<StrId> {
        self.attrs.get(&attr_name)?.get(&id).copied()
    }

    pub fn set_attr(&mut self, id: u32, attr_name: StrId, value: StrId) {
        self.attrs
            .entry(attr_name)
            .or_insert_with(HashMap::new)
            .insert(id, value);
    }

    /// Remove a node from every index. Its id is never reused.
    pub fn remove(&mut self, id: u32) -> bool {
        if !self.live.remove(id) {
            return false;
        }
        for bitmap in self.class_index.values_mut() {
            bitmap.remove(id);
        }
        for col in self.attrs.values_mut() {
            col.remove(&id);
        }
        true
    }

    fn classes_of(&self, id: u32) -> Vec<StrId> {
        self.class_index
            .iter()
            .filter(|(_, members)| members.contains(id))
            .map(|(class, _)| *class)
            .collect()
    }
}

// ============================================================================
// Relation Storage (Edge-List with Indexes)
// ============================================================================

/// A relation (edge) in the knowledge graph
#[derive(Debug, Clone, Copy)]
pub struct Relation {
    pub rel_type: StrId,
    pub source: u32,
    pub target: u32,
}

/// Resolved view of one relation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelationView {
    pub relation: String,
    pub source: NodeId,
    pub target: NodeId,
}

/// Indexed relation storage
#[derive(Debug, Default)]
pub struct RelationStore {
    /// All relations ever added (removed ones are tracked in `removed`)
    relations: Vec<Relation>,
    /// Forward index: (source, rel_type) -> relation IDs
    forward_index: BTreeMap<(u32, StrId), Vec<u32>>,
    /// Backward index: (target, rel_type) -> relation IDs
    backward_index: BTreeMap<(u32, StrId), Vec<u32>>,
    /// Type index: rel_type -> relation IDs
    type_index: HashMap<StrId, RoaringBitmap>,
    removed: RoaringBitmap,
}

impl RelationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live relations.
    pub fn len(&self) -> usize {
        self.relations.len() - self.removed.len() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of live relations for a given relation type.
    pub fn rel_type_count(&self, rel_type: StrId) -> usize {
        self.type_index
            .get(&rel_type)
            .map(|ids| ids.len() as usize)
            .unwrap_or(0)
    }

    /// Add a relation
    pub fn add(&mut self, rel: Relation) -> u32 {
        let id = self.relations.len() as u32;

        self.forward_index
            .entry((rel.source, rel.rel_type))
            .or_insert_with(Vec::new)
            .push(id);

        self.backward_index
            .entry((rel.target, rel.rel_type))
            .or_insert_with(Vec::new)
            .push(id);

        self.type_index
            .entry(rel.rel_type)
            .or_insert_with(RoaringBitmap::new)
            .insert(id);

        self.relations.push(rel);
        id
    }

    /// Get outgoing relations from source with given type
    pub fn outgoing(&self, source: u32, rel_type: StrId) -> Vec<&Relation> {
        self.forward_index
            .get(&(source, rel_type))
            .map(|ids| {
                ids.iter()
                    .filter_map(|&id| self.relations.get(id as usize))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Get outgoing relations from source (any type).
    pub fn outgoing_any(&self, source: u32) -> Vec<&Relation> {
        self.forward_index
            .range(keys_of(source))
            .flat_map(|(_, ids)| ids.iter().filter_map(|&id| self.relations.get(id as usize)))
            .collect()
    }

    /// Get incoming relations to target (any type).
    pub fn incoming_any(&self, target: u32) -> Vec<&Relation> {
        self.backward_index
            .range(keys_of(target))
            .flat_map(|(_, ids)| ids.iter().filter_map(|&id| self.relations.get(id as usize)))
            .collect()
    }

    /// Get all targets reachable from source via rel_type
    pub fn targets(&self, source: u32, rel_type: StrId) -> RoaringBitmap {
        let mut result = RoaringBitmap::new();
        for rel in self.outgoing(source, rel_type) {
            result.insert(rel.target);
        }
        result
    }

    /// Get all sources that reach `target` via `rel_type`.
    pub fn sources(&self, target: u32, rel_type: StrId) -> RoaringBitmap {
        let mut result = RoaringBitmap::new();
        if let Some(ids) = self.backward_index.get(&(target, rel_type)) {
            for &id in ids {
                if let Some(rel) = self.relations.get(id as usize) {
                    result.insert(rel.source);
                }
            }
        }
        result
    }

    /// Check whether an edge exists: `source -[rel_type]-> target`.
    pub fn has_edge(&self, source: u32, rel_type: StrId, target: u32) -> bool {
        let Some(ids) = self.forward_index.get(&(source, rel_type)) else {
            return false;
        };
        ids.iter()
            .filter_map(|&id| self.relations.get(id as usize))
            .any(|rel| rel.target == target)
    }

    /// Drop every relation that starts or ends at `node`.
    ///
    /// Touches only the index entries of `node` and of its neighbours.
    fn remove_touching(&mut self, node: u32) -> usize {
        let mut doomed: Vec<u32> = self
            .forward_index
            .range(keys_of(node))
            .chain(self.backward_index.range(keys_of(node)))
            .flat_map(|(_, ids)| ids.iter().copied())
            .collect();
        doomed.sort_unstable();
        doomed.dedup();

        for &id in &doomed {
            let Some(rel) = self.relations.get(id as usize).copied() else {
                continue;
            };
            unlink(&mut self.forward_index, (rel.source, rel.rel_type), id);
            unlink(&mut self.backward_index, (rel.target, rel.rel_type), id);
            if let Some(ids) = self.type_index.get_mut(&rel.rel_type) {
                ids.remove(id);
            }
            self.removed.insert(id);
        }
        doomed.len()
    }

    fn iter(&self) -> impl Iterator<Item = &Relation> + '_ {
        self.relations
            .iter()
            .enumerate()
            .filter(|(id, _)| !self.removed.contains(*id as u32))
            .map(|(_, rel)| rel)
    }
}

/// Every index key belonging to `node`.
fn keys_of(node: u32) -> RangeInclusive<(u32, StrId)> {
    (node, StrId(0))..=(node, StrId(u32::MAX))
}

fn unlink(index: &mut BTreeMap<(u32, StrId), Vec<u32>>, key: (u32, StrId), id: u32) {
    if let Some(ids) = index.get_mut(&key) {
        ids.retain(|&other| other != id);
        if ids.is_empty() {
            index.remove(&key);
        }
    }
}

// ============================================================================
// KnowledgeGraph: the complete store
// ============================================================================

/// Shared node/relation store for one converted snippet.
#[derive(Debug, Default)]
pub struct KnowledgeGraph {
    pub interner: StringInterner,
    pub nodes: NodeStore,
    pub relations: RelationStore,
    /// Equivalence index: node -> [(equivalent node, equivalence kind)]
    equivalences: HashMap<u32, Vec<(u32, StrId)>>,
}

impl KnowledgeGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node of the given class
    pub fn add_node(&mut self, class: &str, attrs: Vec<(&str, &str)>) -> NodeId {
        let class_id = self.interner.intern(class);
        let interned_attrs: Vec<(StrId, StrId)> = attrs
            .into_iter()
            .map(|(k, v)| (self.interner.intern(k), self.interner.intern(v)))
            .collect();
        NodeId(self.nodes.add(class_id, interned_attrs))
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.nodes.contains(node.0)
    }

    /// Add an additional class to an existing node (an extra `is_a`).
    pub fn add_class(&mut self, node: NodeId, class: &str) -> Result<()> {
        self.ensure_live(node)?;
        let class_id = self.interner.intern(class);
        self.nodes.add_class(node.0, class_id);
        Ok(())
    }

    /// Upsert a single node attribute.
    pub fn set_attr(&mut self, node: NodeId, key: &str, value: &str) -> Result<()> {
        self.ensure_live(node)?;
        let key_id = self.interner.intern(key);
        let value_id = self.interner.intern(value);
        self.nodes.set_attr(node.0, key_id, value_id);
        Ok(())
    }

    pub fn attr(&self, node: NodeId, key: &str) -> Option<&str> {
        let key_id = self.interner.id_of(key)?;
        let value_id = self.nodes.get_attr(node.0, key_id)?;
        self.interner.lookup(value_id)
    }

    /// Whether the node is a member of `class` (primary or added).
    pub fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.interner
            .id_of(class)
            .and_then(|id| self.nodes.by_class(id))
            .map(|members| members.contains(node.0))
            .unwrap_or(false)
    }

    /// Add a relation
    pub fn add_relation(&mut self, rel_type: &str, source: NodeId, target: NodeId) -> Result<u32> {
        self.ensure_live(source)?;
        self.ensure_live(target)?;
        let rel_type = self.interner.intern(rel_type);
        Ok(self.relations.add(Relation {
            rel_type,
            source: source.0,
            target: target.0,
        }))
    }

    /// Add a relation unless the identical edge already exists.
    ///
    /// Returns `true` when a new edge was created.
    pub fn add_relation_once(
        &mut self,
        rel_type: &str,
        source: NodeId,
        target: NodeId,
    ) -> Result<bool> {
        if self.has_edge(source, rel_type, target) {
            return Ok(false);
        }
        self.add_relation(rel_type, source, target)?;
        Ok(true)
    }

    pub fn has_edge(&self, source: NodeId, rel_type: &str, target: NodeId) -> bool {
        let Some(rel_type) = self.interner.id_of(rel_type) else {
            return false;
        };
        self.relations.has_edge(source.0, rel_type, target.0)
    }

    /// Follow a single relation from source
    pub fn targets(&self, source: NodeId, rel_type: &str) -> Vec<NodeId> {
        let Some(rel_type) = self.interner.id_of(rel_type) else {
            return Vec::new();
        };
        self.relations
            .targets(source.0, rel_type)
            .iter()
            .map(NodeId)
            .collect()
    }

    pub fn sources(&self, target: NodeId, rel_type: &str) -> Vec<NodeId> {
        let Some(rel_type) = self.interner.id_of(rel_type) else {
            return Vec::new();
        };
        self.relations
            .sources(target.0, rel_type)
            .iter()
            .map(NodeId)
            .collect()
    }

    /// Number of live relations with the given name.
    pub fn relation_count(&self, rel_type: &str) -> usize {
        self.interner
            .id_of(rel_type)
            .map(|id| self.relations.rel_type_count(id))
            .unwrap_or(0)
    }

    /// Add a symmetric equivalence (e.g. `identical_to`).
    ///
    /// Adding the same pair twice is a no-op.
    pub fn add_equivalence(&mut self, a: NodeId, b: NodeId, kind: &str) -> Result<bool> {
        self.ensure_live(a)?;
        self.ensure_live(b)?;
        let kind_id = self.interner.intern(kind);
        let forward = self.equivalences.entry(a.0).or_default();
        if forward.contains(&(b.0, kind_id)) {
            return Ok(false);
        }
        forward.push((b.0, kind_id));
        self.equivalences
            .entry(b.0)
            .or_default()
            .push((a.0, kind_id));
        Ok(true)
    }

    /// Nodes linked to `node` by an equivalence of `kind`.
    pub fn equivalents(&self, node: NodeId, kind: &str) -> Vec<NodeId> {
        let Some(kind_id) = self.interner.id_of(kind) else {
            return Vec::new();
        };
        self.equivalences
            .get(&node.0)
            .map(|links| {
                links
                    .iter()
                    .filter(|(_, k)| *k == kind_id)
                    .map(|(other, _)| NodeId(*other))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Total number of equivalence pairs of `kind`.
    pub fn equivalence_count(&self, kind: &str) -> usize {
        let Some(kind_id) = self.interner.id_of(kind) else {
            return 0;
        };
        let directed: usize = self
            .equivalences
            .values()
            .map(|links| links.iter().filter(|(_, k)| *k == kind_id).count())
            .sum();
        directed / 2
    }

    /// Remove a node together with its relations and equivalences.
    ///
    /// Returns `false` if the node was already gone.
    pub fn remove_node(&mut self, node: NodeId) -> bool {
        if !self.nodes.remove(node.0) {
            return false;
        }
        self.relations.remove_touching(node.0);
        if let Some(links) = self.equivalences.remove(&node.0) {
            for (other, _) in links {
                if let Some(back) = self.equivalences.get_mut(&other) {
                    back.retain(|(n, _)| *n != node.0);
                }
            }
        }
        true
    }

    /// Live nodes of `class` (primary or added).
    pub fn find_by_class(&self, class: &str) -> RoaringBitmap {
        self.interner
            .id_of(class)
            .and_then(|id| self.nodes.by_class(id))
            .cloned()
            .unwrap_or_default()
    }

    /// Resolve a node into human-readable strings.
    pub fn get_node(&self, node: NodeId) -> Option<NodeView> {
        let class_id = self.nodes.primary_class(node.0)?;
        let class = self.interner.lookup(class_id)?.to_string();

        let mut classes: Vec<String> = self
            .nodes
            .classes_of(node.0)
            .into_iter()
            .filter_map(|id| self.interner.lookup(id).map(str::to_string))
            .collect();
        classes.sort();

        let mut attrs = BTreeMap::new();
        for (attr_name_id, col) in &self.nodes.attrs {
            if let Some(value_id) = col.get(&node.0) {
                let (Some(name), Some(value)) = (
                    self.interner.lookup(*attr_name_id),
                    self.interner.lookup(*value_id),
                ) else {
                    continue;
                };
                attrs.insert(name.to_string(), value.to_string());
            }
        }

        Some(NodeView {
            id: node,
            class,
            classes,
            attrs,
        })
    }

    /// All live relations, in insertion order.
    pub fn relation_views(&self) -> Vec<RelationView> {
        self.relations
            .iter()
            .filter_map(|rel| {
                Some(RelationView {
                    relation: self.interner.lookup(rel.rel_type)?.to_string(),
                    source: NodeId(rel.source),
                    target: NodeId(rel.target),
                })
            })
            .collect()
    }

    /// Outgoing relations of `node` as `(relation, target)` pairs.
    pub fn outgoing(&self, node: NodeId) -> Vec<(String, NodeId)> {
        self.relations
            .outgoing_any(node.0)
            .into_iter()
            .filter_map(|rel| {
                Some((
                    self.interner.lookup(rel.rel_type)?.to_string(),
                    NodeId(rel.target),
                ))
            })
            .collect()
    }

    /// Incoming relations of `node` as `(relation, source)` pairs.
    pub fn incoming(&self, node: NodeId) -> Vec<(String, NodeId)> {
        self.relations
            .incoming_any(node.0)
            .into_iter()
            .filter_map(|rel| {
                Some((
                    self.interner.lookup(rel.rel_type)?.to_string(),
                    NodeId(rel.source),
                ))
            })
            .collect()
    }

    /// Number of live nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn ensure_live(&self, node: NodeId) -> Result<()> {
        if self.nodes.contains(node.0) {
            Ok(())
        } else {
            Err(anyhow!("unknown node id {node}"))
        }
    }
}
