pub mod backup;
pub mod core;
pub mod progress;
pub mod reference;
pub mod subjects;
pub mod submissions;
