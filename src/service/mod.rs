mod registry;

pub use registry::ServiceRegistry;
