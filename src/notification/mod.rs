pub mod clock;
pub mod controller;
pub mod display;
pub mod effects;
pub mod grouping;
pub mod model;
pub mod push;
pub mod seed;
pub mod service;
pub mod session;
