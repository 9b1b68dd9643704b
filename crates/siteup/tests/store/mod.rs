/// libsql observation store tests
pub mod libsql_tests;
