pub mod latest;
pub mod ls;
pub mod publish;
pub mod rt;
pub mod tables;

pub use latest::latest_command;
pub use ls::ls_command;
pub use publish::publish_command;
pub use rt::rt_command;
pub use tables::tables_command;
