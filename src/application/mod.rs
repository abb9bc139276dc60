// Application layer - analysis use cases over recorded sessions
pub mod chart_service;
pub mod error;
pub mod session_repository;
pub mod session_service;
