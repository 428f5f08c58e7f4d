pub mod diagnostics;
pub mod error;
pub mod matrix_profile;
pub mod validation;
