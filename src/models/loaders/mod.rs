pub mod work_spec_loader;

pub use work_spec_loader::load_work_spec;
