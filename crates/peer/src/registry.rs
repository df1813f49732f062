use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use avaproof_core_types::{LimitedProofId, Proof, ProofId, PublicKey};
use avaproof_validation::VerifiedProof;
use tracing::debug;

use crate::NodeId;

/// What the registry knows about an admitted node.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct NodeEntry {
    pub proof_id: ProofId,
    pub limited_id: LimitedProofId,
    /// Key the node proved it holds: the proof master or a delegation's terminal key
    pub authority: PublicKey,
}

impl NodeEntry {
    pub fn new(verified: &VerifiedProof) -> Self {
        Self {
            proof_id: verified.proof_id,
            limited_id: verified.limited_id,
            authority: verified.authority,
        }
    }
}

/// A registered proof with the nodes currently bound to it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PeerSnapshot {
    pub proof: Arc<Proof>,
    pub nodes: Vec<NodeId>,
    /// Whether this is the node's own proof
    pub local: bool,
}

impl PeerSnapshot {
    pub fn proof_id(&self) -> &ProofId {
        self.proof.id()
    }

    pub fn limited_id(&self) -> &LimitedProofId {
        self.proof.limited_id()
    }
}

#[derive(Clone, Debug)]
struct ProofEntry {
    proof: Arc<Proof>,
    nodes: BTreeSet<NodeId>,
    local: bool,
}

impl ProofEntry {
    fn new(proof: Arc<Proof>, local: bool) -> Self {
        Self {
            proof,
            nodes: BTreeSet::new(),
            local,
        }
    }

    fn snapshot(&self) -> PeerSnapshot {
        PeerSnapshot {
            proof: Arc::clone(&self.proof),
            nodes: self.nodes.iter().copied().collect(),
            local: self.local,
        }
    }
}

#[derive(Debug, Default)]
struct State {
    proofs: BTreeMap<ProofId, ProofEntry>,
    nodes: BTreeMap<NodeId, NodeEntry>,
}

impl State {
    fn bind(&mut self, node: NodeId, entry: NodeEntry, proof: Arc<Proof>) -> Option<NodeEntry> {
        let previous = self.unbind(&node);

        self.proofs
            .entry(entry.proof_id)
            .or_insert_with(|| ProofEntry::new(proof, false))
            .nodes
            .insert(node);

        self.nodes.insert(node, entry);
        previous
    }

    /// Detach a node from its proof, dropping the proof once no node uses it.
    fn unbind(&mut self, node: &NodeId) -> Option<NodeEntry> {
        let entry = self.nodes.remove(node)?;

        if let Some(proof) = self.proofs.get_mut(&entry.proof_id) {
            proof.nodes.remove(node);

            if proof.nodes.is_empty() && !proof.local {
                self.proofs.remove(&entry.proof_id);
            }
        }

        Some(entry)
    }
}

/// Shared registry of admitted peers, keyed by proof id.
///
/// Cloning yields another handle to the same registry. Writers are serialized
/// and every read observes a consistent state.
#[derive(Clone, Debug, Default)]
pub struct PeerRegistry(Arc<RwLock<State>>);

impl PeerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, State> {
        self.0.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, State> {
        self.0.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Bind `node` to a verified proof, replacing any previous binding of that node.
    ///
    /// Returns the previous binding, if any.
    pub fn upsert(
        &self,
        node: NodeId,
        verified: &VerifiedProof,
        proof: Arc<Proof>,
    ) -> Option<NodeEntry> {
        let entry = NodeEntry::new(verified);
        let previous = self.write().bind(node, entry, proof);

        debug!(%node, proof_id = %entry.proof_id, replaced = previous.is_some(), "Peer registered");
        previous
    }

    /// Bind `node` to a verified proof unless it is already bound.
    ///
    /// Returns whether the binding was inserted.
    pub fn insert_if_absent(
        &self,
        node: NodeId,
        verified: &VerifiedProof,
        proof: Arc<Proof>,
    ) -> bool {
        let mut state = self.write();

        if state.nodes.contains_key(&node) {
            return false;
        }

        state.bind(node, NodeEntry::new(verified), proof);
        true
    }

    /// Register the node's own proof. It stays registered with no node bound to it.
    pub fn register_local(&self, proof: Arc<Proof>) {
        let proof_id = *proof.id();
        let mut state = self.write();

        state
            .proofs
            .entry(proof_id)
            .and_modify(|entry| entry.local = true)
            .or_insert_with(|| ProofEntry::new(proof, true));

        debug!(%proof_id, "Local proof registered");
    }

    /// Unbind a node, typically on disconnect.
    pub fn remove_node(&self, node: &NodeId) -> Option<NodeEntry> {
        let removed = self.write().unbind(node);

        if let Some(entry) = &removed {
            debug!(%node, proof_id = %entry.proof_id, "Peer removed");
        }

        removed
    }

    /// Drop a proof and every node bound to it.
    ///
    /// Returns the nodes that were bound, or `None` if the proof was not registered.
    pub fn evict_proof(&self, proof_id: &ProofId) -> Option<Vec<NodeId>> {
        let mut state = self.write();
        let entry = state.proofs.remove(proof_id)?;

        for node in &entry.nodes {
            state.nodes.remove(node);
        }

        debug!(%proof_id, nodes = entry.nodes.len(), "Proof evicted");
        Some(entry.nodes.into_iter().collect())
    }

    pub fn node(&self, node: &NodeId) -> Option<NodeEntry> {
        self.read().nodes.get(node).copied()
    }

    pub fn proof(&self, proof_id: &ProofId) -> Option<PeerSnapshot> {
        self.read().proofs.get(proof_id).map(ProofEntry::snapshot)
    }

    /// Find a registered proof by its limited id.
    pub fn proof_by_limited_id(&self, limited_id: &LimitedProofId) -> Option<PeerSnapshot> {
        self.read()
            .proofs
            .values()
            .find(|entry| entry.proof.limited_id() == limited_id)
            .map(ProofEntry::snapshot)
    }

    pub fn contains_proof(&self, proof_id: &ProofId) -> bool {
        self.read().proofs.contains_key(proof_id)
    }

    pub fn node_count(&self) -> usize {
        self.read().nodes.len()
    }

    pub fn proof_count(&self) -> usize {
        self.read().proofs.len()
    }

    /// All registered proofs with their nodes, ordered by proof id.
    pub fn snapshot(&self) -> Vec<PeerSnapshot> {
        self.read().proofs.values().map(ProofEntry::snapshot).collect()
    }
}
