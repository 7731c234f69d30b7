pub mod domain;
pub mod driver;
pub mod infra;

pub fn init() {
    tracing_subscriber::fmt::init();
}
