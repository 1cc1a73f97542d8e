// Pipeline processing: cleaning, validation, and evaluation

pub mod cleaning;
pub mod quality_gate;
pub mod regression;
