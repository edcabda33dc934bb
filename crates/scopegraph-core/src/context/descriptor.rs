//! Building a context chain from persisted rows.
//!
//! Rows carry container descriptors without data plus a set of hierarchy
//! strings: dot-joined, hyphen-less ancestor ids ending in the row's own id.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::{ContextError, ContextResult};
use super::memory::{ContainerKind, MemoryContainer};
use super::node::ContextNode;
use super::tree::ContextTree;

/// Container metadata as stored with a context row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ContainerKind,
    #[serde(default)]
    pub exposed: bool,
}

/// One persisted context row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextDescriptor {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub environment_id: Uuid,
    #[serde(default)]
    pub memory_containers: Vec<ContainerDescriptor>,
    #[serde(default)]
    pub hierarchy: Vec<String>,
    #[serde(default)]
    pub refs: Vec<String>,
}

impl ContextDescriptor {
    /// The direct parent named by each hierarchy string.
    pub fn parent_ids(&self) -> ContextResult<Vec<Uuid>> {
        self.hierarchy
            .iter()
            .filter_map(|h| {
                let bits: Vec<&str> = h.split('.').collect();
                (bits.len() > 1).then(|| expand_uuid(bits[bits.len() - 2]))
            })
            .collect()
    }

    /// Every id of every hierarchy string.
    pub fn hierarchy_ids(&self) -> ContextResult<Vec<Vec<Uuid>>> {
        self.hierarchy
            .iter()
            .map(|h| h.split('.').map(expand_uuid).collect())
            .collect()
    }

    pub fn has_ref(&self, r: &str) -> bool {
        self.refs.iter().any(|x| x == r)
    }

    pub fn has_ref_from(&self, refs: &[String]) -> bool {
        refs.iter().any(|r| self.has_ref(r))
    }

    /// A context level with empty containers.
    pub fn to_node(&self) -> ContextResult<ContextNode> {
        let node = self
            .memory_containers
            .iter()
            .fold(ContextNode::new(&self.name, self.id), |node, mc| {
                node.with_container(MemoryContainer::new(&mc.name, mc.kind).exposed(mc.exposed))
            })
            .with_environment(self.environment_id)
            .with_refs(self.refs.clone())
            .with_parent_ids(self.parent_ids()?);
        Ok(node)
    }
}

impl ContextTree {
    /// Build a chain from rows ordered root first.
    pub fn from_descriptors(rows: &[ContextDescriptor]) -> ContextResult<ContextTree> {
        let mut nodes = Vec::with_capacity(rows.len());
        for (i, row) in rows.iter().enumerate() {
            if let Some(prev) = i.checked_sub(1).map(|p| &rows[p]) {
                let ancestry = row.hierarchy_ids()?;
                let declared = !ancestry.is_empty();
                if declared && !ancestry.iter().flatten().any(|id| *id == prev.id) {
                    return Err(ContextError::BrokenChain {
                        name: row.name.clone(),
                        id: row.id,
                        expected_parent: prev.id,
                    });
                }
            }
            nodes.push(row.to_node()?);
        }
        ContextTree::from_nodes(nodes)
    }
}

/// `id` as 32 lowercase hex digits.
pub fn strip_uuid(id: Uuid) -> String {
    id.simple().to_string()
}

/// Parse the 32-digit form produced by [`strip_uuid`].
pub fn expand_uuid(stripped: &str) -> ContextResult<Uuid> {
    let invalid = || ContextError::InvalidHierarchyId {
        value: stripped.to_string(),
    };
    if stripped.len() != 32 || !stripped.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(invalid());
    }
    Uuid::parse_str(stripped).map_err(|_| invalid())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(name: &str, id: Uuid, ancestors: &[Uuid]) -> ContextDescriptor {
        let mut path: Vec<String> = ancestors.iter().map(|a| strip_uuid(*a)).collect();
        path.push(strip_uuid(id));
        ContextDescriptor {
            id,
            name: name.to_string(),
            environment_id: Uuid::nil(),
            memory_containers: vec![ContainerDescriptor {
                name: "data".into(),
                kind: ContainerKind::Session,
                exposed: true,
            }],
            hierarchy: vec![path.join(".")],
            refs: vec![format!("ref-{name}")],
        }
    }

    #[test]
    fn strip_and_expand_round_trip() {
        let id = Uuid::new_v4();
        let stripped = strip_uuid(id);
        assert_eq!(stripped.len(), 32);
        assert!(!stripped.contains('-'));
        assert_eq!(expand_uuid(&stripped).unwrap(), id);
    }

    #[test]
    fn expand_rejects_garbage() {
        for bad in [
            "",
            "abc",
            "zz000000000000000000000000000000",
            "00000000-0000-0000-0000-000000000000",
        ] {
            assert!(matches!(
                expand_uuid(bad),
                Err(ContextError::InvalidHierarchyId { .. })
            ));
        }
    }

    #[test]
    fn parent_and_hierarchy_ids() {
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let r = row("user", c, &[a, b]);
        assert_eq!(r.parent_ids().unwrap(), vec![b]);
        assert_eq!(r.hierarchy_ids().unwrap(), vec![vec![a, b, c]]);
        assert!(r.has_ref("ref-user"));
        assert!(r.has_ref_from(&["nope".into(), "ref-user".into()]));
        assert!(row("env", a, &[]).parent_ids().unwrap().is_empty());
    }

    #[test]
    fn builds_chain_with_empty_containers() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let tree = ContextTree::from_descriptors(&[row("environment", a, &[]), row("user", b, &[a])])
            .unwrap();
        assert_eq!(tree.len(), 2);
        assert_eq!(tree.leaf().parent_id(), Some(a));
        assert_eq!(tree.leaf().parent_ids(), &[a]);
        let mc = tree.leaf().memory_container("data").unwrap();
        assert!(mc.exposed);
        assert!(mc.data.is_none());
    }

    #[test]
    fn empty_rows_fail() {
        assert_eq!(
            ContextTree::from_descriptors(&[]).unwrap_err(),
            ContextError::EmptyChain
        );
    }

    #[test]
    fn unrelated_rows_fail() {
        let (a, b, stranger) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let err = ContextTree::from_descriptors(&[row("environment", a, &[]), row("user", b, &[stranger])])
            .unwrap_err();
        assert!(matches!(err, ContextError::BrokenChain { expected_parent, .. } if expected_parent == a));
    }
}
