use std::collections::BTreeMap;
use serde_json::{Map, Value};
use crate::node::Node;

/// Class-name to node mapping handed to the host at load time
#[derive(Default)]
pub struct NodeRegistry {
    nodes: BTreeMap<&'static str, Box<dyn Node>>,
}

impl NodeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `node` under its descriptor's class name, replacing any
    /// node previously registered under the same name.
    pub fn register(&mut self, node: impl Node + 'static) {
        let class_name = node.descriptor().class_name;
        if self.nodes.insert(class_name, Box::new(node)).is_some() {
            log::warn!("Replaced existing node registration for {}", class_name);
        }
    }

    pub fn get(&self, class_name: &str) -> Option<&dyn Node> {
        self.nodes.get(class_name).map(|node| node.as_ref())
    }

    pub fn class_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.nodes.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Class name to display name
    pub fn display_names(&self) -> BTreeMap<&'static str, &'static str> {
        self.nodes
            .iter()
            .map(|(class_name, node)| (*class_name, node.descriptor().display_name))
            .collect()
    }

    /// Every registered node's manifest keyed by class name
    pub fn manifest(&self) -> Value {
        let entries: Map<String, Value> = self.nodes
            .iter()
            .map(|(class_name, node)| (class_name.to_string(), node.descriptor().manifest()))
            .collect();
        Value::Object(entries)
    }
}
