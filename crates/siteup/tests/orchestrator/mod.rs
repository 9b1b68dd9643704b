/// Check pipeline tests
pub mod check_all_tests;
pub mod failure_tests;
