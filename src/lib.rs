pub mod flow_field;
pub mod gpgpu;
pub mod logging;
pub mod math;
pub mod particles;
