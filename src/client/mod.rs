mod studio;

pub use studio::*;
