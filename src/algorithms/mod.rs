pub mod common;
pub mod first_row;
pub mod recurrence;
pub mod stomp;
