use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A dimension or measure exposed by a [`Cube`].
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub short_title: String,
    /// Name of the cube the member belongs to. Not part of the member's own
    /// metadata, it is filled in from the enclosing cube.
    #[serde(default)]
    pub cube_name: String,
    #[serde(rename = "type", default)]
    pub member_type: String,
}

pub type Dimension = Member;
pub type Measure = Member;

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Cube {
    pub name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub measures: Vec<Measure>,
    #[serde(default)]
    pub dimensions: Vec<Dimension>,
}

/// Body of `GET /meta`.
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct MetaResponse {
    #[serde(default)]
    pub cubes: Vec<Cube>,
}

/// Immutable view of the cubes served by the analytics backend.
///
/// Cube order follows the metadata response and is the order every derived
/// member listing uses.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    cubes: Vec<Cube>,
    owners: HashMap<String, usize>,
}

impl Catalog {
    pub fn new(cubes: Vec<Cube>) -> Self {
        let cubes: Vec<Cube> = cubes
            .into_iter()
            .map(|mut cube| {
                for member in cube.dimensions.iter_mut().chain(cube.measures.iter_mut()) {
                    member.cube_name = cube.name.clone();
                }
                cube
            })
            .collect();

        let mut owners = HashMap::new();
        for (idx, cube) in cubes.iter().enumerate() {
            for member in cube.dimensions.iter().chain(cube.measures.iter()) {
                owners.insert(member.name.clone(), idx);
            }
        }

        Catalog { cubes, owners }
    }

    pub fn from_meta(meta: MetaResponse) -> Self {
        Self::new(meta.cubes)
    }

    pub fn cubes(&self) -> &[Cube] {
        &self.cubes
    }

    pub fn is_empty(&self) -> bool {
        self.cubes.is_empty()
    }

    pub fn get_cube(&self, name: &str) -> Option<&Cube> {
        self.cubes.iter().find(|c| c.name == name)
    }

    /// Owning cube name of a dimension or measure, `None` for unknown members.
    pub fn owner_of(&self, member_name: &str) -> Option<&str> {
        self.owners
            .get(member_name)
            .map(|idx| self.cubes[*idx].name.as_str())
    }

    pub fn dimensions(&self) -> impl Iterator<Item = &Dimension> {
        self.cubes.iter().flat_map(|c| c.dimensions.iter())
    }

    pub fn measures(&self) -> impl Iterator<Item = &Measure> {
        self.cubes.iter().flat_map(|c| c.measures.iter())
    }
}
