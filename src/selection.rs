use crate::catalog::{Catalog, Dimension, Measure, Member};
use crate::config::SelectionConfig;
use crate::query::Query;

/// Insertion-ordered set of member or cube names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameSet(Vec<String>);

impl NameSet {
    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|n| n == name)
    }

    /// Returns `false` if the name was already present.
    pub fn insert(&mut self, name: &str) -> bool {
        if self.contains(name) {
            return false;
        }
        self.0.push(name.to_string());
        true
    }

    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.0.len();
        self.0.retain(|n| n != name);
        self.0.len() != before
    }

    pub fn retain(&mut self, f: impl FnMut(&String) -> bool) {
        self.0.retain(f);
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.0.clone()
    }
}

/// Members of one cube, as listed under that cube's heading.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberGroup {
    pub cube_name: String,
    pub members: Vec<Member>,
}

/// Selected cubes, dimensions and measures.
///
/// Deselecting a cube drops every selected member owned by that cube.
/// Dimension and measure toggles are not checked against the selected cubes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionState {
    config: SelectionConfig,
    cubes: NameSet,
    dimensions: NameSet,
    measures: NameSet,
}

impl SelectionState {
    pub fn new(config: SelectionConfig) -> Self {
        SelectionState {
            config,
            ..Default::default()
        }
    }

    pub fn cubes(&self) -> &NameSet {
        &self.cubes
    }

    pub fn dimensions(&self) -> &NameSet {
        &self.dimensions
    }

    pub fn measures(&self) -> &NameSet {
        &self.measures
    }

    pub fn toggle_cube(&mut self, catalog: &Catalog, name: &str, included: bool) {
        if included {
            self.cubes.insert(name);
            if self.config.auto_include_dimensions_on_cube_select {
                if let Some(cube) = catalog.get_cube(name) {
                    for dimension in &cube.dimensions {
                        self.dimensions.insert(&dimension.name);
                    }
                }
            }
        } else {
            self.cubes.remove(name);
            let owned_by_cube = |member: &String| catalog.owner_of(member) == Some(name);
            self.dimensions.retain(|d| !owned_by_cube(d));
            self.measures.retain(|m| !owned_by_cube(m));
        }
    }

    pub fn toggle_dimension(&mut self, name: &str, included: bool) {
        if included {
            self.dimensions.insert(name);
        } else {
            self.dimensions.remove(name);
        }
    }

    pub fn toggle_measure(&mut self, name: &str, included: bool) {
        if included {
            self.measures.insert(name);
        } else {
            self.measures.remove(name);
        }
    }

    pub fn reset(&mut self) {
        self.cubes.clear();
        self.dimensions.clear();
        self.measures.clear();
    }

    pub fn query(&self) -> Query {
        Query::new(self.measures.to_vec(), self.dimensions.to_vec())
    }

    pub fn relevant_dimensions<'a>(&self, catalog: &'a Catalog) -> Vec<&'a Dimension> {
        catalog
            .cubes()
            .iter()
            .filter(|c| self.cubes.contains(&c.name))
            .flat_map(|c| c.dimensions.iter())
            .collect()
    }

    pub fn relevant_measures<'a>(&self, catalog: &'a Catalog) -> Vec<&'a Measure> {
        catalog
            .cubes()
            .iter()
            .filter(|c| self.cubes.contains(&c.name))
            .flat_map(|c| c.measures.iter())
            .collect()
    }

    pub fn grouped_dimensions(&self, catalog: &Catalog) -> Vec<MemberGroup> {
        group_by_cube(self.relevant_dimensions(catalog))
    }

    pub fn grouped_measures(&self, catalog: &Catalog) -> Vec<MemberGroup> {
        group_by_cube(self.relevant_measures(catalog))
    }

    /// Whether every selected member known to `catalog` belongs to a selected cube.
    pub fn is_consistent(&self, catalog: &Catalog) -> bool {
        self.dimensions
            .iter()
            .chain(self.measures.iter())
            .all(|member| match catalog.owner_of(member) {
                Some(owner) => self.cubes.contains(owner),
                None => true,
            })
    }
}

fn group_by_cube(members: Vec<&Member>) -> Vec<MemberGroup> {
    let mut groups: Vec<MemberGroup> = Vec::new();
    for member in members {
        match groups.last_mut() {
            Some(group) if group.cube_name == member.cube_name => {
                group.members.push(member.clone())
            }
            _ => groups.push(MemberGroup {
                cube_name: member.cube_name.clone(),
                members: vec![member.clone()],
            }),
        }
    }
    groups
}
