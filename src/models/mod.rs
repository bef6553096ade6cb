pub mod dashboard_model;
pub mod figure_model;
