mod domain;
mod domain_store;
mod value_map;
mod variable_id;

pub use domain::Domain;
pub(crate) use domain_store::DomainStore;
pub(crate) use value_map::ValueMap;
pub use variable_id::VariableId;
