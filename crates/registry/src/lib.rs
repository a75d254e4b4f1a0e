//! Contract registry for the Bullpen backend API.
//!
//! Each [`Operation`] maps to exactly one immutable [`ContractEntry`]
//! describing its method, path template, input schema and response schemas
//! by status code. The table is built once per process and only read
//! afterwards.

mod contract;
mod operation;
mod schema;

pub use contract::{ContractEntry, ContractRegistry, RegistryError, resolve};
pub use operation::{Operation, ResourceFamily};
pub use schema::{SchemaId, SchemaViolation, validate};
