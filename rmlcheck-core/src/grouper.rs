//! Predicate → object grouping

use std::collections::HashMap;

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::index::{ObjectMapping, ValueKind};

/// One object declared under a predicate
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct GroupedObject {
    pub object: String,
    #[serde(rename = "type")]
    pub kind: ValueKind,
    pub rule: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub datatype: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

impl From<&ObjectMapping> for GroupedObject {
    fn from(m: &ObjectMapping) -> Self {
        Self {
            object: m.object.clone(),
            kind: m.kind,
            rule: m.rule.clone(),
            datatype: m.datatype.clone(),
            language: m.language.clone(),
        }
    }
}

/// Objects grouped by predicate value
///
/// Predicates keep their first-appearance order and objects keep input order.
/// Serializes as a JSON object in that order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PredicateObjectGroups {
    groups: Vec<(String, Vec<GroupedObject>)>,
    positions: HashMap<String, usize>,
}

impl PredicateObjectGroups {
    fn push(&mut self, predicate: &str, object: GroupedObject) {
        let pos = match self.positions.get(predicate) {
            Some(&pos) => pos,
            None => {
                let pos = self.groups.len();
                self.positions.insert(predicate.to_string(), pos);
                self.groups.push((predicate.to_string(), Vec::new()));
                pos
            }
        };
        self.groups[pos].1.push(object);
    }

    pub fn get(&self, predicate: &str) -> Option<&[GroupedObject]> {
        self.positions
            .get(predicate)
            .map(|&pos| self.groups[pos].1.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[GroupedObject])> {
        self.groups.iter().map(|(p, objs)| (p.as_str(), objs.as_slice()))
    }

    /// Number of distinct predicates
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Number of grouped objects across all predicates
    pub fn object_count(&self) -> usize {
        self.groups.iter().map(|(_, objs)| objs.len()).sum()
    }
}

impl Serialize for PredicateObjectGroups {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.groups.len()))?;
        for (predicate, objects) in &self.groups {
            map.serialize_entry(predicate, objects)?;
        }
        map.end()
    }
}

/// Group object mappings under their predicate
pub fn group_object_mappings<'a, I>(mappings: I) -> PredicateObjectGroups
where
    I: IntoIterator<Item = &'a ObjectMapping>,
{
    let mut groups = PredicateObjectGroups::default();
    for mapping in mappings {
        groups.push(&mapping.predicate, GroupedObject::from(mapping));
    }
    groups
}
