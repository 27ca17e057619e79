//! Reading and writing single resources.

mod resource_gateway;

pub use resource_gateway::{GatewayError, LoadedResource, ResourceGateway, Result};
