mod common;
mod intake;
mod scheduling;
