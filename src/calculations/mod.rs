pub mod backward_pass;
pub mod cascade;
pub mod critical_path;
pub mod dependency_dates;
pub mod forward_pass;
