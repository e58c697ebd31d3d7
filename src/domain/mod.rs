pub mod ai;
pub mod cell;
pub mod direction;
pub mod entity;
pub mod rules;
