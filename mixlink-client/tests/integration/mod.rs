pub mod leave_tests;
pub mod transport_tests;
