use super::{ClientError, CubeApi};
use crate::catalog::{Cube, Member, MetaResponse};
use crate::query::{Annotation, LoadResponse, MemberAnnotation, Query};
use async_trait::async_trait;
use log::warn;
use std::collections::{BTreeSet, HashMap};

/// In-memory [`CubeApi`] serving a fixed catalog.
///
/// SQL previews are a plain listing of the requested members and result sets
/// carry annotations but no rows.
#[derive(Clone)]
pub struct LocalCubeApi {
    cubes: Vec<Cube>,
}

fn member(name: &str, title: &str, short_title: &str, member_type: &str) -> Member {
    Member {
        name: name.to_string(),
        title: title.to_string(),
        short_title: short_title.to_string(),
        cube_name: String::new(),
        member_type: member_type.to_string(),
    }
}

impl LocalCubeApi {
    pub fn new(cubes: Vec<Cube>) -> Self {
        LocalCubeApi { cubes }
    }

    /// `Orders` and `Users` cubes.
    pub fn mock() -> Self {
        let orders = Cube {
            name: "Orders".to_string(),
            title: "Orders".to_string(),
            measures: vec![
                member("Orders.count", "Orders Count", "Count", "number"),
                member("Orders.totalAmount", "Orders Total Amount", "Total Amount", "number"),
            ],
            dimensions: vec![
                member("Orders.id", "Orders Id", "Id", "number"),
                member("Orders.status", "Orders Status", "Status", "string"),
                member("Orders.createdAt", "Orders Created at", "Created at", "time"),
            ],
        };
        let users = Cube {
            name: "Users".to_string(),
            title: "Users".to_string(),
            measures: vec![member("Users.count", "Users Count", "Count", "number")],
            dimensions: vec![
                member("Users.city", "Users City", "City", "string"),
                member("Users.gender", "Users Gender", "Gender", "string"),
            ],
        };

        Self::new(vec![orders, users])
    }

    fn find_member(&self, name: &str) -> Option<(&Cube, &Member)> {
        self.cubes.iter().find_map(|cube| {
            cube.dimensions
                .iter()
                .chain(cube.measures.iter())
                .find(|m| m.name == name)
                .map(|m| (cube, m))
        })
    }

    fn check_members(&self, query: &Query) -> Result<(), ClientError> {
        for name in query.dimensions.iter().chain(query.measures.iter()) {
            if self.find_member(name).is_none() {
                return Err(ClientError::Api(format!("Member '{}' not found", name)));
            }
        }
        Ok(())
    }

    fn annotate(&self, names: &[String]) -> HashMap<String, MemberAnnotation> {
        names
            .iter()
            .filter_map(|name| self.find_member(name))
            .map(|(_, m)| {
                (
                    m.name.clone(),
                    MemberAnnotation {
                        title: m.title.clone(),
                        short_title: m.short_title.clone(),
                        member_type: m.member_type.clone(),
                    },
                )
            })
            .collect()
    }
}

#[async_trait]
impl CubeApi for LocalCubeApi {
    async fn meta(&self) -> Result<MetaResponse, ClientError> {
        Ok(MetaResponse {
            cubes: self.cubes.clone(),
        })
    }

    async fn sql(&self, query: &Query) -> Result<Option<String>, ClientError> {
        if query.is_empty() {
            return Ok(None);
        }
        if let Err(e) = self.check_members(query) {
            warn!("Backend did not generate SQL: {}", e);
            return Ok(None);
        }

        let columns: Vec<&str> = query
            .dimensions
            .iter()
            .chain(query.measures.iter())
            .map(String::as_str)
            .collect();
        let tables: BTreeSet<&str> = query
            .dimensions
            .iter()
            .chain(query.measures.iter())
            .filter_map(|name| self.find_member(name))
            .map(|(cube, _)| cube.name.as_str())
            .collect();

        Ok(Some(format!(
            "SELECT {} FROM {} LIMIT {}",
            columns.join(", "),
            tables.into_iter().collect::<Vec<_>>().join(", "),
            query.limit
        )))
    }

    async fn load(&self, query: &Query) -> Result<LoadResponse, ClientError> {
        self.check_members(query)?;
        Ok(LoadResponse {
            data: Vec::new(),
            annotation: Annotation {
                measures: self.annotate(&query.measures),
                dimensions: self.annotate(&query.dimensions),
            },
            error: None,
        })
    }
}
