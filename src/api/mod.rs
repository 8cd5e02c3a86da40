pub use mock::{assert_all_called, Mock};
pub use registry::{
    create_mock_server, global_registry, install_interceptor, reset_mock_servers,
    uninstall_interceptor, Registry, RegistryConfig,
};
pub use server::MockServer;
pub use spec::MockSpec;

mod mock;
mod output;
mod registry;
mod server;
mod spec;
