pub mod cube_view;
pub mod job_helpers;
