pub mod aggregate;
pub mod api;
pub mod control;
pub mod lookup;
pub mod model;
pub mod provider;
pub mod view;
