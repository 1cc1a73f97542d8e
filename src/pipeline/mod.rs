// Data processing: CSV frames, cleaning, data checks and model scoring

pub mod frame;
pub mod processing;
